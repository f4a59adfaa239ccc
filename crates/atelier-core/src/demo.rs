//! Demo data: fill the store with a fixed showcase, or wipe the showcase
//! collections.
//!
//! Both operations are single atomic batches. Testimonials, site content and
//! contact messages are never touched.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
  Result,
  client::StoreClient,
  entity::{Project, ProjectCategory},
  record::{Collection, new_id},
  store::{DocumentStore, WriteBatch},
};

/// Collections emptied by [`reset`].
pub const RESET_COLLECTIONS: [Collection; 4] = [
  Collection::Projects,
  Collection::ProjectCategories,
  Collection::GalleryImages,
  Collection::GalleryCategories,
];

const CATEGORIES: [(&str, i64); 3] = [("Branding", 1), ("Packaging", 2), ("Digital", 3)];

struct DemoProject {
  title:       &'static str,
  description: &'static str,
  category:    &'static str,
  image:       &'static str,
  tools:       &'static str,
}

const PROJECTS: [DemoProject; 4] = [
  DemoProject {
    title:       "Aura Branding",
    description: "A calm, modern identity for a wellness studio.",
    category:    "Branding",
    image:       "https://images.unsplash.com/photo-1558655146-d09347e92766",
    tools:       "Illustrator, Figma",
  },
  DemoProject {
    title:       "Verde Coffee Packaging",
    description: "Recyclable packaging system for a specialty roaster.",
    category:    "Packaging",
    image:       "https://images.unsplash.com/photo-1559056199-641a0ac8b55e",
    tools:       "Illustrator, Dimension",
  },
  DemoProject {
    title:       "Northwind Web Refresh",
    description: "Responsive marketing site and component library.",
    category:    "Digital",
    image:       "https://images.unsplash.com/photo-1547658719-da2b51169166",
    tools:       "Figma, Webflow",
  },
  DemoProject {
    title:       "Lumen Annual Report",
    description: "Editorial design for a nonprofit's yearly report.",
    category:    "Branding",
    image:       "https://images.unsplash.com/photo-1586281380349-632531db7ed4",
    tools:       "InDesign",
  },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FillSummary {
  pub categories: usize,
  pub projects:   usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResetSummary {
  pub deleted: usize,
}

/// Build the fill batch. Project category ids are resolved from the
/// categories planned in the same batch.
pub fn fill_batch() -> Result<(WriteBatch, FillSummary)> {
  let mut batch = WriteBatch::new();
  let mut ids = HashMap::new();
  for (name, order) in CATEGORIES {
    let id = new_id();
    batch.put(&id, &ProjectCategory { name: name.to_string(), order })?;
    ids.insert(name, id);
  }
  for (order, p) in (1..).zip(PROJECTS.iter()) {
    let project = Project {
      title:               p.title.to_string(),
      description:         p.description.to_string(),
      project_category_id: ids.get(p.category).cloned().unwrap_or_default(),
      image_url:           p.image.to_string(),
      project_images:      Vec::new(),
      tools_used:          p.tools.to_string(),
      order,
      problem:             None,
      solution:            None,
      outcome:             None,
    };
    batch.put(new_id(), &project)?;
  }
  Ok((batch, FillSummary { categories: CATEGORIES.len(), projects: PROJECTS.len() }))
}

/// Build a batch deleting every listed document.
pub fn reset_batch(docs: impl IntoIterator<Item = (Collection, String)>) -> WriteBatch {
  let mut batch = WriteBatch::new();
  for (collection, id) in docs {
    batch.delete(collection, id);
  }
  batch
}

pub async fn fill<S: DocumentStore + 'static>(client: &StoreClient<S>) -> Result<FillSummary> {
  let (batch, summary) = fill_batch()?;
  client.commit(batch).await?;
  Ok(summary)
}

pub async fn reset<S: DocumentStore + 'static>(client: &StoreClient<S>) -> Result<ResetSummary> {
  let mut docs = Vec::new();
  for collection in RESET_COLLECTIONS {
    let ids = client.list_ids(collection).await?;
    docs.extend(ids.into_iter().map(|id| (collection, id)));
  }
  let deleted = docs.len();
  client.commit(reset_batch(docs)).await?;
  Ok(ResetSummary { deleted })
}
