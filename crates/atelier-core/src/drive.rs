//! Cloud-drive share links.
//!
//! Editors often paste a "share" link to an image on a cloud drive. Those
//! pages are HTML, not images, so they are rewritten to the direct-view form
//! before being stored.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static FILE_LINK: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^https?://drive\.google\.com/file/d/([A-Za-z0-9_-]+)").unwrap()
});

static QUERY_LINK: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"^https?://drive\.google\.com/(?:open|uc)\?(?:[^#]*&)?id=([A-Za-z0-9_-]+)")
    .unwrap()
});

/// The file id of a recognised share link.
pub fn share_id(url: &str) -> Option<&str> {
  FILE_LINK
    .captures(url)
    .or_else(|| QUERY_LINK.captures(url))
    .and_then(|c| c.get(1))
    .map(|m| m.as_str())
}

/// Rewrite a recognised share link to its direct-view URL. Anything else is
/// returned unchanged.
pub fn normalize(url: &str) -> Cow<'_, str> {
  match share_id(url) {
    Some(id) => Cow::Owned(direct_view(id)),
    None => Cow::Borrowed(url),
  }
}

pub fn direct_view(id: &str) -> String {
  format!("https://drive.google.com/uc?export=view&id={id}")
}

#[cfg(test)]
mod tests {
  use super::*;

  const DIRECT: &str = "https://drive.google.com/uc?export=view&id=1AbC_d-9";

  #[test]
  fn file_links_are_rewritten() {
    assert_eq!(
      normalize("https://drive.google.com/file/d/1AbC_d-9/view?usp=sharing"),
      DIRECT
    );
  }

  #[test]
  fn open_and_uc_links_are_rewritten() {
    assert_eq!(normalize("https://drive.google.com/open?id=1AbC_d-9"), DIRECT);
    assert_eq!(normalize("https://drive.google.com/uc?id=1AbC_d-9"), DIRECT);
  }

  #[test]
  fn direct_links_are_stable() {
    assert_eq!(normalize(DIRECT), DIRECT);
  }

  #[test]
  fn other_urls_pass_through() {
    let url = "https://res.cloudinary.com/demo/image/upload/sample.jpg";
    assert!(matches!(normalize(url), Cow::Borrowed(u) if u == url));
  }
}
