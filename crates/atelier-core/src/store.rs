//! The `DocumentStore` trait and atomic write batches.
//!
//! The trait is implemented by storage backends (e.g. `atelier-store-sqlite`).
//! Consumers never call it directly: they go through
//! [`StoreClient`](crate::client::StoreClient), which applies the access rules
//! and reports failures on the error bus.

use std::future::Future;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::record::{Collection, Record, Sort, Stored};

// ─── Change feed ─────────────────────────────────────────────────────────────

/// Emitted by the store after every committed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
  pub collection: Collection,
  pub id:         String,
}

// ─── Batches ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
  /// Create or replace a document. An existing document keeps its
  /// `created_at`.
  Put { collection: Collection, id: String, body: Value, version: u32 },
  Delete { collection: Collection, id: String },
}

impl WriteOp {
  pub fn collection(&self) -> Collection {
    match self {
      Self::Put { collection, .. } | Self::Delete { collection, .. } => *collection,
    }
  }

  pub fn id(&self) -> &str {
    match self {
      Self::Put { id, .. } | Self::Delete { id, .. } => id,
    }
  }
}

/// A set of writes applied all-or-nothing by [`DocumentStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
  ops: Vec<WriteOp>,
}

impl WriteBatch {
  pub fn new() -> Self { Self::default() }

  /// Queue a full write of `data` under `id`.
  pub fn put<T: Record>(&mut self, id: impl Into<String>, data: &T) -> serde_json::Result<()> {
    self.ops.push(WriteOp::Put {
      collection: T::COLLECTION,
      id:         id.into(),
      body:       serde_json::to_value(data)?,
      version:    T::SCHEMA_VERSION,
    });
    Ok(())
  }

  pub fn delete(&mut self, collection: Collection, id: impl Into<String>) {
    self.ops.push(WriteOp::Delete { collection, id: id.into() });
  }

  pub fn ops(&self) -> &[WriteOp] { &self.ops }

  pub fn into_ops(self) -> Vec<WriteOp> { self.ops }

  pub fn len(&self) -> usize { self.ops.len() }

  pub fn is_empty(&self) -> bool { self.ops.is_empty() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a document store backend.
///
/// Writes are last-write-wins; there is no conflict detection. Server
/// timestamps are assigned by the store: `created_at` once on creation,
/// `updated_at` on every write.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve one document. Returns `None` if not found.
  fn get<T: Record>(
    &self,
    id: String,
  ) -> impl Future<Output = Result<Option<Stored<T>>, Self::Error>> + Send + '_;

  /// Every document of `T`'s collection in `sort` order. Ties fall back to
  /// insertion order.
  fn list<T: Record>(
    &self,
    sort: Sort,
  ) -> impl Future<Output = Result<Vec<Stored<T>>, Self::Error>> + Send + '_;

  /// Ids of every document in a collection.
  fn list_ids(
    &self,
    collection: Collection,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Create a document. A fresh id is generated when `id` is `None`; an
  /// existing document with the given id is an error.
  fn insert<T: Record>(
    &self,
    id: Option<String>,
    data: T,
  ) -> impl Future<Output = Result<Stored<T>, Self::Error>> + Send + '_;

  /// Shallow-merge `data`'s fields over an existing document. Returns `None`
  /// if there is nothing to update.
  fn update<T: Record>(
    &self,
    id: String,
    data: T,
  ) -> impl Future<Output = Result<Option<Stored<T>>, Self::Error>> + Send + '_;

  /// Merge into the document if it exists, otherwise create it.
  fn upsert<T: Record>(
    &self,
    id: String,
    data: T,
  ) -> impl Future<Output = Result<Stored<T>, Self::Error>> + Send + '_;

  /// Physically delete a document. Returns whether it existed.
  fn delete(
    &self,
    collection: Collection,
    id: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Apply every operation in `batch` atomically.
  fn commit(&self, batch: WriteBatch) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Subscribe to the change feed. Receivers that fall behind observe
  /// `Lagged` and should re-read.
  fn subscribe(&self) -> broadcast::Receiver<Change>;
}
