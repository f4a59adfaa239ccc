//! Read views that join or filter across collections.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/projects` | Each row carries `categoryName` ("N/A" when orphaned) |
//! | `GET`  | `/project-categories` | Optional `?sort=name\|order` |
//! | `GET`  | `/gallery-categories` | Optional `?sort=name\|order` |
//! | `GET`  | `/gallery` | Optional `?category=<id>\|all` |

use atelier_core::{
  client::StoreClient,
  entity::{Category, GalleryImage, Project, ProjectCategory, category_name},
  record::{Sort, SortField, Stored},
  store::DocumentStore,
};
use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Projects ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRow {
  #[serde(flatten)]
  pub project:       Stored<Project>,
  pub category_name: String,
}

pub fn project_rows(
  projects: Vec<Stored<Project>>,
  categories: &[Stored<ProjectCategory>],
) -> Vec<ProjectRow> {
  projects
    .into_iter()
    .map(|project| ProjectRow {
      category_name: category_name(categories, &project.data.project_category_id).to_string(),
      project,
    })
    .collect()
}

/// `GET /projects`
pub async fn list_projects<S>(
  State(client): State<StoreClient<S>>,
) -> Result<Json<Vec<ProjectRow>>, ApiError>
where
  S: DocumentStore + 'static,
{
  let projects = client.list::<Project>().await?;
  let categories = client.list::<ProjectCategory>().await?;
  Ok(Json(project_rows(projects, &categories)))
}

// ─── Categories ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SortParams {
  pub sort: Option<String>,
}

/// `GET /project-categories[?sort=name]`, `GET /gallery-categories[?sort=name]`
pub async fn list_categories<S, C>(
  State(client): State<StoreClient<S>>,
  Query(params): Query<SortParams>,
) -> Result<Json<Vec<Stored<C>>>, ApiError>
where
  S: DocumentStore + 'static,
  C: Category,
{
  let sort = match params.sort.as_deref() {
    None | Some("order") => C::DEFAULT_SORT,
    Some("name") => Sort::asc(SortField::Name),
    Some(other) => return Err(ApiError::BadRequest(format!("unknown sort {other:?}"))),
  };
  Ok(Json(client.list_sorted::<C>(sort).await?))
}

// ─── Gallery ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GalleryParams {
  /// A gallery category id, or `all`.
  pub category: Option<String>,
}

/// `GET /gallery[?category=<id>]`
pub async fn list_gallery<S>(
  State(client): State<StoreClient<S>>,
  Query(params): Query<GalleryParams>,
) -> Result<Json<Vec<Stored<GalleryImage>>>, ApiError>
where
  S: DocumentStore + 'static,
{
  let mut images = client.list::<GalleryImage>().await?;
  if let Some(category) = params.category.filter(|c| c != "all") {
    images.retain(|i| i.data.gallery_category_id == category);
  }
  Ok(Json(images))
}
