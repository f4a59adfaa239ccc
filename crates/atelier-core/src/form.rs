//! Command forms submitted by the admin console and the contact page.
//!
//! A form is the loosely-typed wire shape of an edit. [`Form::validate`]
//! turns it into the closed record it describes, or reports one message per
//! offending field. Nothing reaches the store without passing through here.

use std::{collections::BTreeMap, marker::PhantomData};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
  drive,
  entity::{Category, ContactMessage, GalleryImage, Project, Testimonial},
  record::Record,
  site::SiteContent,
};

// ─── Field errors ────────────────────────────────────────────────────────────

/// Per-field validation messages keyed by wire field name. Nested fields use
/// dotted paths (`about.imageUrl`, `projectImages.2`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  /// Record a message for `field`. The first message for a field wins.
  pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
    self.0.entry(field.into()).or_insert_with(|| message.into());
  }

  pub fn get(&self, field: &str) -> Option<&str> { self.0.get(field).map(String::as_str) }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.add(field, message);
    errors
  }

  /// `Ok(value)` when nothing was recorded.
  fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
    if self.is_empty() { Ok(value()) } else { Err(self) }
  }
}

// ─── Form trait ──────────────────────────────────────────────────────────────

pub trait Form: DeserializeOwned + Send + 'static {
  type Record: Record;

  fn validate(self) -> Result<Self::Record, FieldErrors>;
}

// ─── Field helpers ───────────────────────────────────────────────────────────

const REQUIRED: &str = "This field is required.";
const BAD_URL: &str = "Please enter a valid URL.";
const BAD_EMAIL: &str = "Please enter a valid email address.";

static EMAIL: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

fn required(errors: &mut FieldErrors, field: &str, value: String) -> String {
  let value = value.trim().to_string();
  if value.is_empty() {
    errors.add(field, REQUIRED);
  }
  value
}

/// Blank optional text becomes `None`.
fn optional(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn is_web_url(value: &str) -> bool {
  url::Url::parse(value)
    .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
    .unwrap_or(false)
}

/// An image reference: share links rewritten, then checked as http(s).
fn check_image_url(errors: &mut FieldErrors, field: &str, value: &str) -> String {
  let value = drive::normalize(value.trim()).into_owned();
  if value.is_empty() {
    errors.add(field, REQUIRED);
  } else if !is_web_url(&value) {
    errors.add(field, BAD_URL);
  }
  value
}

fn optional_image_url(
  errors: &mut FieldErrors,
  field: &str,
  value: Option<String>,
) -> Option<String> {
  optional(value).map(|v| check_image_url(errors, field, &v))
}

fn optional_link(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
  let value = optional(value)?;
  if !is_web_url(&value) {
    errors.add(field, BAD_URL);
  }
  Some(value)
}

// ─── Order coercion ──────────────────────────────────────────────────────────

/// The `order` field as it arrives from an HTML number input: a number, a
/// numeric string, an empty string, or `null`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OrderInput {
  Blank,
  Int(i64),
  Float(f64),
  Text(String),
}

impl Default for OrderInput {
  fn default() -> Self { Self::Int(0) }
}

impl From<i64> for OrderInput {
  fn from(n: i64) -> Self { Self::Int(n) }
}

impl OrderInput {
  /// Blank or empty text coerces to `0`; fractional or non-numeric input is
  /// rejected.
  pub fn resolve(&self) -> Result<i64, &'static str> {
    const WHOLE: &str = "Order must be a whole number.";
    let whole = |f: f64| {
      if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Ok(f as i64)
      } else {
        Err(WHOLE)
      }
    };
    match self {
      Self::Blank => Ok(0),
      Self::Int(n) => Ok(*n),
      Self::Float(f) => whole(*f),
      Self::Text(s) => {
        let s = s.trim();
        if s.is_empty() {
          return Ok(0);
        }
        match s.parse::<i64>() {
          Ok(n) => Ok(n),
          Err(_) => s.parse::<f64>().map_err(|_| "Order must be a number.").and_then(whole),
        }
      }
    }
  }
}

fn order(errors: &mut FieldErrors, value: &OrderInput) -> i64 {
  value.resolve().unwrap_or_else(|message| {
    errors.add("order", message);
    0
  })
}

// ─── Project ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectForm {
  pub title:               String,
  pub description:         String,
  pub project_category_id: String,
  pub image_url:           String,
  pub project_images:      Vec<String>,
  pub tools_used:          String,
  pub order:               OrderInput,
  pub problem:             Option<String>,
  pub solution:            Option<String>,
  pub outcome:             Option<String>,
}

impl Form for ProjectForm {
  type Record = Project;

  fn validate(self) -> Result<Project, FieldErrors> {
    let mut errors = FieldErrors::new();
    let title = required(&mut errors, "title", self.title);
    let description = required(&mut errors, "description", self.description);
    let project_category_id =
      required(&mut errors, "projectCategoryId", self.project_category_id);
    let image_url = check_image_url(&mut errors, "imageUrl", &self.image_url);
    let project_images = self
      .project_images
      .iter()
      .enumerate()
      .filter(|(_, u)| !u.trim().is_empty())
      .map(|(i, u)| check_image_url(&mut errors, &format!("projectImages.{i}"), u))
      .collect();
    let order = order(&mut errors, &self.order);

    errors.finish(|| Project {
      title,
      description,
      project_category_id,
      image_url,
      project_images,
      tools_used: self.tools_used.trim().to_string(),
      order,
      problem: optional(self.problem),
      solution: optional(self.solution),
      outcome: optional(self.outcome),
    })
  }
}

// ─── Categories ──────────────────────────────────────────────────────────────

/// Editor for either category collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryForm<C> {
  pub name:  String,
  pub order: OrderInput,
  #[serde(skip)]
  kind:      PhantomData<fn() -> C>,
}

impl<C> Default for CategoryForm<C> {
  fn default() -> Self {
    Self { name: String::new(), order: OrderInput::default(), kind: PhantomData }
  }
}

impl<C> CategoryForm<C> {
  pub fn new(name: impl Into<String>, order: impl Into<OrderInput>) -> Self {
    Self { name: name.into(), order: order.into(), kind: PhantomData }
  }
}

impl<C: Category> Form for CategoryForm<C> {
  type Record = C;

  fn validate(self) -> Result<C, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = required(&mut errors, "name", self.name);
    let order = order(&mut errors, &self.order);
    errors.finish(|| C::new(name, order))
  }
}

// ─── Gallery ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GalleryImageForm {
  pub title:               String,
  pub image_url:           String,
  pub gallery_category_id: String,
  pub order:               OrderInput,
}

impl Form for GalleryImageForm {
  type Record = GalleryImage;

  fn validate(self) -> Result<GalleryImage, FieldErrors> {
    let mut errors = FieldErrors::new();
    let title = required(&mut errors, "title", self.title);
    let image_url = check_image_url(&mut errors, "imageUrl", &self.image_url);
    let gallery_category_id =
      required(&mut errors, "galleryCategoryId", self.gallery_category_id);
    let order = order(&mut errors, &self.order);
    errors.finish(|| GalleryImage { title, image_url, gallery_category_id, order })
  }
}

// ─── Testimonials ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TestimonialForm {
  pub name:      String,
  pub role:      String,
  pub company:   Option<String>,
  pub content:   String,
  pub image_url: Option<String>,
  pub order:     OrderInput,
}

impl Form for TestimonialForm {
  type Record = Testimonial;

  fn validate(self) -> Result<Testimonial, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = required(&mut errors, "name", self.name);
    let role = required(&mut errors, "role", self.role);
    let content = required(&mut errors, "content", self.content);
    let image_url = optional_image_url(&mut errors, "imageUrl", self.image_url);
    let order = order(&mut errors, &self.order);
    errors.finish(|| Testimonial {
      name,
      role,
      company: optional(self.company),
      content,
      image_url,
      order,
    })
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// The public contact form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
  pub name:    String,
  pub email:   String,
  pub message: String,
}

impl Form for ContactForm {
  type Record = ContactMessage;

  fn validate(self) -> Result<ContactMessage, FieldErrors> {
    let mut errors = FieldErrors::new();
    let name = required(&mut errors, "name", self.name);
    let email = required(&mut errors, "email", self.email);
    if !email.is_empty() && !EMAIL.is_match(&email) {
      errors.add("email", BAD_EMAIL);
    }
    let message = required(&mut errors, "message", self.message);
    errors.finish(|| ContactMessage { name, email, message, is_read: false })
  }
}

// ─── Site content ────────────────────────────────────────────────────────────

/// Site content is edited as a whole document; only its URLs are checked.
impl Form for SiteContent {
  type Record = SiteContent;

  fn validate(mut self) -> Result<SiteContent, FieldErrors> {
    let mut errors = FieldErrors::new();

    self.about.image_url =
      optional_image_url(&mut errors, "about.imageUrl", Some(self.about.image_url))
        .unwrap_or_default();
    for (i, tool) in self.tools.iter_mut().enumerate() {
      tool.name = required(&mut errors, &format!("tools.{i}.name"), std::mem::take(&mut tool.name));
      tool.icon_url = optional_image_url(
        &mut errors,
        &format!("tools.{i}.iconUrl"),
        Some(std::mem::take(&mut tool.icon_url)),
      )
      .unwrap_or_default();
    }
    self.skills = self
      .skills
      .into_iter()
      .map(|s| s.trim().to_string())
      .filter(|s| !s.is_empty())
      .collect();

    let links = &mut self.social_links;
    links.instagram = optional_link(&mut errors, "socialLinks.instagram", links.instagram.take());
    links.linkedin = optional_link(&mut errors, "socialLinks.linkedin", links.linkedin.take());
    links.behance = optional_link(&mut errors, "socialLinks.behance", links.behance.take());
    links.dribbble = optional_link(&mut errors, "socialLinks.dribbble", links.dribbble.take());
    links.twitter = optional_link(&mut errors, "socialLinks.twitter", links.twitter.take());

    errors.finish(|| self)
  }
}
