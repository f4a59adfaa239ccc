//! Portfolio entities: projects, categories, gallery images, testimonials and
//! contact messages.
//!
//! Category references are soft: a project or gallery image may point at a
//! category id that no longer exists. Readers resolve such ids to
//! [`MISSING_CATEGORY`] instead of failing.

use serde::{Deserialize, Serialize};

use crate::record::{Collection, Record, Sort, SortField, Stored};

/// Display value for a category id that resolves to nothing.
pub const MISSING_CATEGORY: &str = "N/A";

// ─── Projects ────────────────────────────────────────────────────────────────

/// A portfolio project with its optional case-study prose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub title:               String,
  pub description:         String,
  /// Soft reference to [`ProjectCategory`].
  pub project_category_id: String,
  pub image_url:           String,
  /// Additional images, in display order.
  #[serde(default)]
  pub project_images:      Vec<String>,
  /// Free text, comma-separated.
  #[serde(default)]
  pub tools_used:          String,
  pub order:               i64,
  #[serde(default)]
  pub problem:             Option<String>,
  #[serde(default)]
  pub solution:            Option<String>,
  #[serde(default)]
  pub outcome:             Option<String>,
}

impl Record for Project {
  const COLLECTION: Collection = Collection::Projects;
}

impl Project {
  /// The individual tools named in `tools_used`, trimmed, blanks dropped.
  pub fn tools(&self) -> impl Iterator<Item = &str> {
    self.tools_used.split(',').map(str::trim).filter(|t| !t.is_empty())
  }
}

// ─── Categories ──────────────────────────────────────────────────────────────

/// Anything with a display name; used to resolve soft category references.
pub trait Named {
  fn name(&self) -> &str;
}

/// The two category collections share one shape and one editor.
pub trait Category: Record + Named {
  fn new(name: String, order: i64) -> Self;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCategory {
  /// Unique by convention only.
  pub name:  String,
  pub order: i64,
}

impl Record for ProjectCategory {
  const COLLECTION: Collection = Collection::ProjectCategories;
}

impl Named for ProjectCategory {
  fn name(&self) -> &str { &self.name }
}

impl Category for ProjectCategory {
  fn new(name: String, order: i64) -> Self { Self { name, order } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryCategory {
  pub name:  String,
  pub order: i64,
}

impl Record for GalleryCategory {
  const COLLECTION: Collection = Collection::GalleryCategories;
}

impl Named for GalleryCategory {
  fn name(&self) -> &str { &self.name }
}

impl Category for GalleryCategory {
  fn new(name: String, order: i64) -> Self { Self { name, order } }
}

/// Resolve a soft category reference to its display name.
pub fn category_name<'a, C: Named>(categories: &'a [Stored<C>], id: &str) -> &'a str {
  categories
    .iter()
    .find(|c| c.id == id)
    .map(|c| c.data.name())
    .unwrap_or(MISSING_CATEGORY)
}

// ─── Gallery ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImage {
  pub title:               String,
  pub image_url:           String,
  /// Soft reference to [`GalleryCategory`].
  pub gallery_category_id: String,
  pub order:               i64,
}

impl Record for GalleryImage {
  const COLLECTION: Collection = Collection::GalleryImages;
}

// ─── Testimonials ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
  pub name:      String,
  pub role:      String,
  #[serde(default)]
  pub company:   Option<String>,
  pub content:   String,
  #[serde(default)]
  pub image_url: Option<String>,
  pub order:     i64,
}

impl Record for Testimonial {
  const COLLECTION: Collection = Collection::Testimonials;
}

// ─── Contact messages ────────────────────────────────────────────────────────

/// A message left through the public contact form. Its timestamp is the
/// envelope's server-assigned `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
  pub name:    String,
  pub email:   String,
  pub message: String,
  /// Only the admin read/unread toggle changes this.
  #[serde(default)]
  pub is_read: bool,
}

impl Record for ContactMessage {
  const COLLECTION: Collection = Collection::ContactMessages;
  const DEFAULT_SORT: Sort = Sort::desc(SortField::CreatedAt);
}
