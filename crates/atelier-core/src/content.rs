//! Which parts of the public home page are shown.

use serde::Serialize;

use crate::{record::Collection, site::SiteContent};

/// Shown instead of the site while maintenance mode is on.
pub const MAINTENANCE_MESSAGE: &str =
  "We're currently performing scheduled maintenance. Please check back soon.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SectionKind {
  Hero,
  About,
  Stats,
  Portfolio,
  Gallery,
  Skills,
  Tools,
  Testimonials,
  Contact,
}

impl SectionKind {
  /// Collections this section reads besides site content.
  pub fn collections(self) -> &'static [Collection] {
    match self {
      Self::Portfolio => &[Collection::Projects, Collection::ProjectCategories],
      Self::Gallery => &[Collection::GalleryImages, Collection::GalleryCategories],
      Self::Testimonials => &[Collection::Testimonials],
      _ => &[],
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum HomePage {
  /// Maintenance mode short-circuits everything else.
  Maintenance { message: String },
  Live { sections: Vec<SectionKind> },
}

impl HomePage {
  pub fn shows(&self, section: SectionKind) -> bool {
    matches!(self, Self::Live { sections } if sections.contains(&section))
  }

  /// Whether any shown section reads `collection`.
  pub fn needs(&self, collection: Collection) -> bool {
    match self {
      Self::Maintenance { .. } => false,
      Self::Live { sections } => sections.iter().any(|s| s.collections().contains(&collection)),
    }
  }
}

/// Decide the page layout. The hero is always shown; every other section is
/// shown unless its visibility flag is explicitly `false`.
pub fn compose(content: &SiteContent) -> HomePage {
  if content.is_maintenance_mode_enabled {
    return HomePage::Maintenance { message: MAINTENANCE_MESSAGE.to_string() };
  }
  let v = &content.visibility;
  let flags = [
    (SectionKind::About, v.about),
    (SectionKind::Stats, v.stats),
    (SectionKind::Portfolio, v.portfolio),
    (SectionKind::Gallery, v.gallery),
    (SectionKind::Skills, v.skills),
    (SectionKind::Tools, v.tools),
    (SectionKind::Testimonials, v.testimonials),
    (SectionKind::Contact, v.contact),
  ];
  let sections = std::iter::once(SectionKind::Hero)
    .chain(flags.into_iter().filter(|(_, shown)| shown.unwrap_or(true)).map(|(s, _)| s))
    .collect();
  HomePage::Live { sections }
}
