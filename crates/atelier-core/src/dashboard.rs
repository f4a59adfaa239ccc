//! Admin dashboard summary.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
  Result,
  client::StoreClient,
  entity::{
    ContactMessage, GalleryCategory, GalleryImage, Project, ProjectCategory, Testimonial,
    category_name,
  },
  record::Stored,
  store::DocumentStore,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
  pub name:  String,
  pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
  pub projects:              usize,
  pub project_categories:    usize,
  pub gallery_images:        usize,
  pub gallery_categories:    usize,
  pub testimonials:          usize,
  pub messages:              usize,
  pub unread_messages:       usize,
  /// Sorted by name. Projects whose category is gone count under "N/A".
  pub projects_per_category: Vec<CategoryCount>,
}

pub fn projects_per_category(
  projects: &[Stored<Project>],
  categories: &[Stored<ProjectCategory>],
) -> Vec<CategoryCount> {
  let mut counts = BTreeMap::<&str, usize>::new();
  for p in projects {
    *counts.entry(category_name(categories, &p.data.project_category_id)).or_default() += 1;
  }
  counts
    .into_iter()
    .map(|(name, count)| CategoryCount { name: name.to_string(), count })
    .collect()
}

pub async fn load<S: DocumentStore + 'static>(client: &StoreClient<S>) -> Result<Dashboard> {
  let projects = client.list::<Project>().await?;
  let categories = client.list::<ProjectCategory>().await?;
  let messages = client.list::<ContactMessage>().await?;
  Ok(Dashboard {
    projects_per_category: projects_per_category(&projects, &categories),
    projects:              projects.len(),
    project_categories:    categories.len(),
    gallery_images:        client.list::<GalleryImage>().await?.len(),
    gallery_categories:    client.list::<GalleryCategory>().await?.len(),
    testimonials:          client.list::<Testimonial>().await?.len(),
    unread_messages:       messages.iter().filter(|m| !m.data.is_read).count(),
    messages:              messages.len(),
  })
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn stored<T>(id: &str, data: T) -> Stored<T> {
    let now = Utc::now();
    Stored { id: id.into(), data, created_at: now, updated_at: now }
  }

  fn project(category: &str) -> Project {
    Project {
      title:               "P".into(),
      description:         "D".into(),
      project_category_id: category.into(),
      image_url:           "https://example.com/p.png".into(),
      project_images:      vec![],
      tools_used:          String::new(),
      order:               0,
      problem:             None,
      solution:            None,
      outcome:             None,
    }
  }

  #[test]
  fn orphaned_projects_group_under_placeholder() {
    let categories = vec![stored("b", ProjectCategory { name: "Branding".into(), order: 1 })];
    let projects = vec![
      stored("1", project("b")),
      stored("2", project("b")),
      stored("3", project("deleted")),
    ];
    assert_eq!(
      projects_per_category(&projects, &categories),
      vec![
        CategoryCount { name: "Branding".into(), count: 2 },
        CategoryCount { name: "N/A".into(), count: 1 },
      ]
    );
  }
}
