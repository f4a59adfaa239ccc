//! Collections, the `Record` trait and the stored envelope.
//!
//! Every entity is a closed struct bound to exactly one collection. The store
//! never hands out loosely-typed maps: it persists the serialised record next
//! to the schema version it was written with and the two server timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ─── Collection ──────────────────────────────────────────────────────────────

/// A named collection in the document store. The serialised form is the wire
/// name used in paths (`projects/<id>`).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumString,
  EnumIter,
)]
pub enum Collection {
  #[serde(rename = "projects")]
  #[strum(serialize = "projects")]
  Projects,
  #[serde(rename = "projectCategories")]
  #[strum(serialize = "projectCategories")]
  ProjectCategories,
  #[serde(rename = "galleryImages")]
  #[strum(serialize = "galleryImages")]
  GalleryImages,
  #[serde(rename = "galleryCategories")]
  #[strum(serialize = "galleryCategories")]
  GalleryCategories,
  #[serde(rename = "testimonials")]
  #[strum(serialize = "testimonials")]
  Testimonials,
  #[serde(rename = "contactMessages")]
  #[strum(serialize = "contactMessages")]
  ContactMessages,
  #[serde(rename = "siteContent")]
  #[strum(serialize = "siteContent")]
  SiteContent,
}

impl Collection {
  /// The admin list view an editor returns to after saving.
  pub fn admin_path(self) -> &'static str {
    match self {
      Self::Projects => "/admin/projects",
      Self::ProjectCategories => "/admin/project-categories",
      Self::GalleryImages => "/admin/gallery",
      Self::GalleryCategories => "/admin/gallery-categories",
      Self::Testimonials => "/admin/testimonials",
      Self::ContactMessages => "/admin/messages",
      Self::SiteContent => "/admin/site-content",
    }
  }

  /// `collection/id`, the path used in error events.
  pub fn doc_path(self, id: &str) -> String { format!("{}/{id}", self.as_ref()) }
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// The field a query orders by. Ties fall back to store-native order, which
/// callers must treat as arbitrary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
  /// The record's integer `order` field.
  Order,
  /// The record's `name` field.
  Name,
  /// The server-assigned creation timestamp.
  CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
  pub field:      SortField,
  pub descending: bool,
}

impl Sort {
  pub const fn asc(field: SortField) -> Self { Self { field, descending: false } }

  pub const fn desc(field: SortField) -> Self { Self { field, descending: true } }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A closed, versioned record type stored in one collection.
pub trait Record:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  const COLLECTION: Collection;
  /// Bumped whenever the persisted shape changes incompatibly.
  const SCHEMA_VERSION: u32 = 1;
  const DEFAULT_SORT: Sort = Sort::asc(SortField::Order);
}

/// A record together with its identity and server-assigned timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stored<T> {
  pub id:         String,
  #[serde(flatten)]
  pub data:       T,
  /// Set once when the document is first written.
  pub created_at: DateTime<Utc>,
  /// Refreshed on every write.
  pub updated_at: DateTime<Utc>,
}

/// Generate a fresh document id.
pub fn new_id() -> String { uuid::Uuid::new_v4().simple().to_string() }
