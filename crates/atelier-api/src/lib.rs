//! JSON REST API for Atelier.
//!
//! Exposes two axum [`Router`]s backed by any
//! [`atelier_core::store::DocumentStore`], each bound to a [`StoreClient`]
//! whose access level decides what it may touch. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", atelier_api::public_router(client.with_access(Access::Public)))
//! .nest("/api/admin", atelier_api::admin_router(client.with_access(Access::Admin)))
//! ```

pub mod catalog;
pub mod crud;
pub mod error;
pub mod messages;
pub mod site;

use atelier_core::{
  client::StoreClient,
  entity::{ContactMessage, GalleryCategory, GalleryImage, Project, ProjectCategory, Testimonial},
  form::{CategoryForm, GalleryImageForm, ProjectForm, TestimonialForm},
  store::DocumentStore,
};
use axum::{
  Router,
  routing::{get, post},
};

pub use error::ApiError;

/// Read-only routes for the public site.
pub fn public_router<S>(client: StoreClient<S>) -> Router<()>
where
  S: DocumentStore + 'static,
{
  Router::new()
    .route("/site-content", get(site::get_content::<S>))
    .route("/layout", get(site::layout::<S>))
    .route("/projects", get(catalog::list_projects::<S>))
    .route("/projects/{id}", get(crud::get_one::<S, Project>))
    .route("/project-categories", get(catalog::list_categories::<S, ProjectCategory>))
    .route("/gallery", get(catalog::list_gallery::<S>))
    .route("/gallery-categories", get(catalog::list_categories::<S, GalleryCategory>))
    .route("/testimonials", get(crud::list::<S, Testimonial>))
    .with_state(client)
}

/// Full CRUD over every collection plus the dashboard.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn admin_router<S>(client: StoreClient<S>) -> Router<()>
where
  S: DocumentStore + 'static,
{
  Router::new()
    // Projects
    .route(
      "/projects",
      get(catalog::list_projects::<S>).post(crud::create::<S, ProjectForm>),
    )
    .route(
      "/projects/{id}",
      get(crud::get_one::<S, Project>)
        .put(crud::update::<S, ProjectForm>)
        .delete(crud::delete::<S, Project>),
    )
    // Project categories
    .route(
      "/project-categories",
      get(catalog::list_categories::<S, ProjectCategory>)
        .post(crud::create::<S, CategoryForm<ProjectCategory>>),
    )
    .route(
      "/project-categories/{id}",
      get(crud::get_one::<S, ProjectCategory>)
        .put(crud::update::<S, CategoryForm<ProjectCategory>>)
        .delete(crud::delete::<S, ProjectCategory>),
    )
    // Gallery
    .route(
      "/gallery",
      get(catalog::list_gallery::<S>).post(crud::create::<S, GalleryImageForm>),
    )
    .route(
      "/gallery/{id}",
      get(crud::get_one::<S, GalleryImage>)
        .put(crud::update::<S, GalleryImageForm>)
        .delete(crud::delete::<S, GalleryImage>),
    )
    .route(
      "/gallery-categories",
      get(catalog::list_categories::<S, GalleryCategory>)
        .post(crud::create::<S, CategoryForm<GalleryCategory>>),
    )
    .route(
      "/gallery-categories/{id}",
      get(crud::get_one::<S, GalleryCategory>)
        .put(crud::update::<S, CategoryForm<GalleryCategory>>)
        .delete(crud::delete::<S, GalleryCategory>),
    )
    // Testimonials
    .route(
      "/testimonials",
      get(crud::list::<S, Testimonial>).post(crud::create::<S, TestimonialForm>),
    )
    .route(
      "/testimonials/{id}",
      get(crud::get_one::<S, Testimonial>)
        .put(crud::update::<S, TestimonialForm>)
        .delete(crud::delete::<S, Testimonial>),
    )
    // Messages
    .route("/messages", get(messages::list::<S>))
    .route(
      "/messages/{id}",
      get(messages::get_one::<S>).delete(crud::delete::<S, ContactMessage>),
    )
    .route("/messages/{id}/toggle-read", post(messages::toggle_read::<S>))
    // Site
    .route("/site-content", get(site::get_content::<S>).put(site::put_content::<S>))
    .route("/dashboard", get(site::dashboard::<S>))
    .with_state(client)
}
