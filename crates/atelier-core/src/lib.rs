//! Core types and trait definitions for the Atelier studio site.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod client;
pub mod content;
pub mod copywriting;
pub mod dashboard;
pub mod demo;
pub mod drive;
pub mod entity;
pub mod error;
pub mod events;
pub mod form;
pub mod live;
pub mod record;
pub mod rules;
pub mod site;
pub mod store;

pub use error::{Error, Result};
