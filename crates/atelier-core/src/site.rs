//! The singleton `siteContent/global` document.
//!
//! Every field carries a serde default so that a partially-filled document
//! (or none at all) still yields a usable [`SiteContent`]. Section visibility
//! flags are `Option<bool>`: absent means visible.

use serde::{Deserialize, Serialize};

use crate::record::{Collection, Record};

/// The fixed id of the singleton site content document.
pub const SITE_CONTENT_ID: &str = "global";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteContent {
  pub hero:                        Hero,
  pub about:                       About,
  pub stats:                       Vec<Stat>,
  pub skills:                      Vec<String>,
  pub tools:                       Vec<Tool>,
  pub sections:                    SectionCopy,
  pub visibility:                  SectionVisibility,
  pub theme:                       Theme,
  pub is_maintenance_mode_enabled: bool,
  pub is_animation_enabled:        Option<bool>,
  pub social_links:                SocialLinks,
  pub ai:                          AiSettings,
}

impl Record for SiteContent {
  const COLLECTION: Collection = Collection::SiteContent;
}

impl SiteContent {
  pub fn animations_enabled(&self) -> bool { self.is_animation_enabled.unwrap_or(true) }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Hero {
  pub title:    String,
  pub subtitle: String,
  pub cta_text: String,
  pub cta_link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct About {
  pub bio:       String,
  pub image_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stat {
  pub label: String,
  pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tool {
  pub name:     String,
  pub icon_url: String,
}

/// Title and description shown above a public section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionText {
  pub title:       String,
  pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionCopy {
  pub about:        SectionText,
  pub stats:        SectionText,
  pub portfolio:    SectionText,
  pub gallery:      SectionText,
  pub skills:       SectionText,
  pub tools:        SectionText,
  pub testimonials: SectionText,
  pub contact:      SectionText,
}

/// Per-section visibility. `None` is treated as visible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionVisibility {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub about:        Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stats:        Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub portfolio:    Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub gallery:      Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub skills:       Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tools:        Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub testimonials: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub contact:      Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
  #[default]
  Light,
  Dark,
}

impl Theme {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Light => "light",
      Self::Dark => "dark",
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocialLinks {
  pub instagram: Option<String>,
  pub linkedin:  Option<String>,
  pub behance:   Option<String>,
  pub dribbble:  Option<String>,
  pub twitter:   Option<String>,
}

impl SocialLinks {
  /// `(platform, url)` pairs for every link that is set and non-blank.
  pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
    [
      ("Instagram", &self.instagram),
      ("LinkedIn", &self.linkedin),
      ("Behance", &self.behance),
      ("Dribbble", &self.dribbble),
      ("Twitter", &self.twitter),
    ]
    .into_iter()
    .filter_map(|(name, url)| {
      url.as_deref().map(str::trim).filter(|u| !u.is_empty()).map(|u| (name, u))
    })
  }
}

/// Settings for model-assisted copy generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
  /// Model name forwarded to the hosted model; blank means the server default.
  pub model:      String,
  pub is_enabled: bool,
}

impl AiSettings {
  pub fn model(&self) -> Option<&str> {
    Some(self.model.trim()).filter(|m| !m.is_empty())
  }
}
