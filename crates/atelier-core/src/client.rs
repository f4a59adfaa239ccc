//! `StoreClient`: the access-checked way into a [`DocumentStore`].
//!
//! Every read and write is checked against the client's [`Access`] level.
//! Failures, whether rule rejections or backend errors, are published on the
//! injected [`ErrorNotifier`] before being returned. Nothing here panics on a
//! store error.

use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;

use crate::{
  Error, Result,
  events::{ErrorEvent, ErrorNotifier},
  live::Subscription,
  record::{Collection, Record, Sort, Stored, new_id},
  rules::{Access, Operation},
  store::{DocumentStore, WriteBatch},
};

// ─── Pending writes ──────────────────────────────────────────────────────────

/// A write that has been issued but not awaited. The id is known
/// immediately; the outcome is only visible through [`PendingWrite::settled`]
/// or the error bus.
#[derive(Debug)]
pub struct PendingWrite {
  pub id: String,
  handle: JoinHandle<Result<()>>,
}

impl PendingWrite {
  /// Wait for the write to finish.
  pub async fn settled(self) -> Result<()> { self.handle.await.map_err(Error::store)? }
}

// ─── Client ──────────────────────────────────────────────────────────────────

pub struct StoreClient<S> {
  store:    Arc<S>,
  access:   Access,
  notifier: Arc<dyn ErrorNotifier>,
}

impl<S> Clone for StoreClient<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      access:   self.access,
      notifier: self.notifier.clone(),
    }
  }
}

impl<S: DocumentStore + 'static> StoreClient<S> {
  pub fn new(store: Arc<S>, access: Access, notifier: Arc<dyn ErrorNotifier>) -> Self {
    Self { store, access, notifier }
  }

  /// The same store and bus under a different rule set.
  pub fn with_access(&self, access: Access) -> Self { Self { access, ..self.clone() } }

  pub fn access(&self) -> Access { self.access }

  pub fn notifier(&self) -> &Arc<dyn ErrorNotifier> { &self.notifier }

  // ── Failure reporting ─────────────────────────────────────────────────

  fn report(&self, path: String, operation: Operation, payload: Option<Value>, error: Error) -> Error {
    self.notifier.publish(ErrorEvent {
      path,
      operation,
      request_payload: payload,
      permission: error.is_permission_denied(),
      message: error.to_string(),
    });
    error
  }

  fn authorize(
    &self,
    collection: Collection,
    path: impl FnOnce() -> String,
    operation: Operation,
    payload: impl FnOnce() -> Option<Value>,
  ) -> Result<()> {
    if self.access.allows(collection, operation) {
      return Ok(());
    }
    let path = path();
    let denied = Error::PermissionDenied { path: path.clone(), operation };
    Err(self.report(path, operation, payload(), denied))
  }

  fn path_of(collection: Collection, id: Option<&str>) -> String {
    match id {
      Some(id) => collection.doc_path(id),
      None => collection.to_string(),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  pub async fn get<T: Record>(&self, id: &str) -> Result<Option<Stored<T>>> {
    let path = || T::COLLECTION.doc_path(id);
    self.authorize(T::COLLECTION, path, Operation::Get, || None)?;
    self
      .store
      .get::<T>(id.to_string())
      .await
      .map_err(|e| self.report(path(), Operation::Get, None, Error::store(e)))
  }

  /// Every document in `T`'s default order.
  pub async fn list<T: Record>(&self) -> Result<Vec<Stored<T>>> {
    self.list_sorted::<T>(T::DEFAULT_SORT).await
  }

  pub async fn list_sorted<T: Record>(&self, sort: Sort) -> Result<Vec<Stored<T>>> {
    let path = || T::COLLECTION.to_string();
    self.authorize(T::COLLECTION, path, Operation::List, || None)?;
    self
      .store
      .list::<T>(sort)
      .await
      .map_err(|e| self.report(path(), Operation::List, None, Error::store(e)))
  }

  pub async fn list_ids(&self, collection: Collection) -> Result<Vec<String>> {
    let path = || collection.to_string();
    self.authorize(collection, path, Operation::List, || None)?;
    self
      .store
      .list_ids(collection)
      .await
      .map_err(|e| self.report(path(), Operation::List, None, Error::store(e)))
  }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Create when `id` is `None`, otherwise merge into (or create) the
  /// document with that id.
  pub async fn save<T: Record>(&self, id: Option<String>, data: T) -> Result<Stored<T>> {
    let operation = if id.is_some() { Operation::Update } else { Operation::Create };
    let path = Self::path_of(T::COLLECTION, id.as_deref());
    let payload = || serde_json::to_value(&data).ok();
    self.authorize(T::COLLECTION, || path.clone(), operation, payload)?;

    let body = payload();
    let result = match id {
      Some(id) => self.store.upsert(id, data).await,
      None => self.store.insert(None, data).await,
    };
    result.map_err(|e| self.report(path, operation, body, Error::store(e)))
  }

  /// Merge into an existing document only. Returns `None` if it is gone.
  pub async fn update<T: Record>(&self, id: &str, data: T) -> Result<Option<Stored<T>>> {
    let path = T::COLLECTION.doc_path(id);
    let payload = || serde_json::to_value(&data).ok();
    self.authorize(T::COLLECTION, || path.clone(), Operation::Update, payload)?;

    let body = payload();
    self
      .store
      .update(id.to_string(), data)
      .await
      .map_err(|e| self.report(path, Operation::Update, body, Error::store(e)))
  }

  pub async fn delete(&self, collection: Collection, id: &str) -> Result<bool> {
    let path = || collection.doc_path(id);
    self.authorize(collection, path, Operation::Delete, || None)?;
    self
      .store
      .delete(collection, id.to_string())
      .await
      .map_err(|e| self.report(path(), Operation::Delete, None, Error::store(e)))
  }

  /// Apply a batch atomically. Every collection it touches must be writable.
  pub async fn commit(&self, batch: WriteBatch) -> Result<()> {
    let denied = batch.ops().iter().find(|op| !self.access.allows(op.collection(), Operation::Write));
    if let Some(op) = denied {
      let path = op.collection().doc_path(op.id());
      let error = Error::PermissionDenied { path: path.clone(), operation: Operation::Write };
      return Err(self.report(path, Operation::Write, None, error));
    }
    let path = batch
      .ops()
      .first()
      .map(|op| op.collection().to_string())
      .unwrap_or_default();
    self
      .store
      .commit(batch)
      .await
      .map_err(|e| self.report(path, Operation::Write, None, Error::store(e)))
  }

  /// Issue a save without waiting for it. The id is assigned up front so the
  /// caller can navigate immediately; failures surface on the error bus.
  pub fn submit<T: Record>(&self, id: Option<String>, data: T) -> PendingWrite {
    let (id, existing) = match id {
      Some(id) => (id, true),
      None => (new_id(), false),
    };
    let client = self.clone();
    let doc_id = id.clone();
    let handle = tokio::spawn(async move {
      if existing {
        client.save(Some(doc_id), data).await.map(drop)
      } else {
        client.create_with_id(doc_id, data).await.map(drop)
      }
    });
    PendingWrite { id, handle }
  }

  /// Issue a delete without waiting for it.
  pub fn remove(&self, collection: Collection, id: String) -> PendingWrite {
    let client = self.clone();
    let doc_id = id.clone();
    let handle =
      tokio::spawn(async move { client.delete(collection, &doc_id).await.map(drop) });
    PendingWrite { id, handle }
  }

  async fn create_with_id<T: Record>(&self, id: String, data: T) -> Result<Stored<T>> {
    let path = T::COLLECTION.doc_path(&id);
    let payload = || serde_json::to_value(&data).ok();
    self.authorize(T::COLLECTION, || path.clone(), Operation::Create, payload)?;

    let body = payload();
    self
      .store
      .insert(Some(id), data)
      .await
      .map_err(|e| self.report(path, Operation::Create, body, Error::store(e)))
  }

  // ── Live reads ────────────────────────────────────────────────────────

  /// Watch one document. `None` means there is nothing to watch yet and
  /// yields an idle, non-loading subscription without a listener.
  pub fn watch_doc<T: Record>(&self, id: Option<String>) -> Subscription<Stored<T>> {
    let Some(id) = id else {
      return Subscription::inert();
    };
    let client = self.clone();
    let doc_id = id.clone();
    Subscription::spawn(
      self.store.subscribe(),
      move |c| c.collection == T::COLLECTION && c.id == id,
      move || {
        let client = client.clone();
        let id = doc_id.clone();
        async move { client.get::<T>(&id).await }
      },
    )
  }

  /// Watch a whole collection. `None` means no query is ready yet and yields
  /// an idle subscription.
  pub fn watch_query<T: Record>(&self, sort: Option<Sort>) -> Subscription<Vec<Stored<T>>> {
    let Some(sort) = sort else {
      return Subscription::inert();
    };
    let client = self.clone();
    Subscription::spawn(
      self.store.subscribe(),
      |c| c.collection == T::COLLECTION,
      move || {
        let client = client.clone();
        async move { client.list_sorted::<T>(sort).await.map(Some) }
      },
    )
  }
}
