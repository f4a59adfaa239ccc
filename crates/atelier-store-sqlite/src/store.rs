//! [`SqliteStore`]: the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use atelier_core::{
  record::{Collection, Record, Sort, Stored, new_id},
  store::{Change, DocumentStore, WriteBatch, WriteOp},
};
use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;

use crate::{
  Error, Result,
  encode::{
    RAW_DOC_COLUMNS, RawDoc, check_version, encode_body, encode_dt, merge_bodies, now,
    order_clause,
  },
  schema::SCHEMA,
};

/// Capacity of the change feed. Slow subscribers see `Lagged` and re-read.
const CHANGE_CAPACITY: usize = 256;

// ─── Store ───────────────────────────────────────────────────────────────────

/// An Atelier document store backed by a single SQLite file.
///
/// Cloning is cheap; clones share the connection and the change feed.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  changes: broadcast::Sender<Change>,
}

/// Outcome of a read-modify-write executed on the database thread.
enum Merge {
  Missing,
  Newer(u32),
  Written(RawDoc),
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
    Ok(Self { conn, changes })
  }

  /// Rewrite a document's stored schema version.
  #[cfg(test)]
  pub(crate) async fn set_schema_version(&self, collection: Collection, id: &str, version: u32) -> Result<()> {
    let (collection, id) = (collection.to_string(), id.to_string());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE documents SET schema_version = ?3 WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![collection, id, version],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  fn notify(&self, collection: Collection, id: &str) {
    // Nobody listening is fine.
    let _ = self.changes.send(Change { collection, id: id.to_string() });
  }

  /// Merge `patch` into an existing document, or create it when `create` is
  /// set. Runs as one transaction.
  async fn merge<T: Record>(&self, id: String, data: &T, create: bool) -> Result<Option<Stored<T>>> {
    let patch = encode_body(data)?;
    let collection = T::COLLECTION.to_string();
    let version = T::SCHEMA_VERSION;
    let at = encode_dt(now());
    let doc_id = id.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existing: Option<(String, u32)> = tx
          .query_row(
            "SELECT body, schema_version FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection, doc_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let body = match existing {
          Some((_, found)) if found > version => return Ok(Merge::Newer(found)),
          Some((base, _)) => merge_bodies(&base, patch)
            .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?,
          None if create => serde_json::Value::Object(patch).to_string(),
          None => return Ok(Merge::Missing),
        };

        tx.execute(
          "INSERT INTO documents
             (collection, doc_id, body, schema_version, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)
           ON CONFLICT (collection, doc_id) DO UPDATE SET
             body = excluded.body,
             schema_version = excluded.schema_version,
             updated_at = excluded.updated_at",
          rusqlite::params![collection, doc_id, body, version, at],
        )?;
        let raw = tx.query_row(
          &format!(
            "SELECT {RAW_DOC_COLUMNS} FROM documents WHERE collection = ?1 AND doc_id = ?2"
          ),
          rusqlite::params![collection, doc_id],
          RawDoc::from_row,
        )?;
        tx.commit()?;
        Ok(Merge::Written(raw))
      })
      .await?;

    match outcome {
      Merge::Missing => Ok(None),
      Merge::Newer(found) => {
        check_version::<T>(T::COLLECTION, &id, found)?;
        Ok(None)
      }
      Merge::Written(raw) => {
        self.notify(T::COLLECTION, &id);
        Ok(Some(raw.decode()?))
      }
    }
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn get<T: Record>(&self, id: String) -> Result<Option<Stored<T>>> {
    let collection = T::COLLECTION.to_string();
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {RAW_DOC_COLUMNS} FROM documents WHERE collection = ?1 AND doc_id = ?2"
              ),
              rusqlite::params![collection, id],
              RawDoc::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawDoc::decode).transpose()
  }

  async fn list<T: Record>(&self, sort: Sort) -> Result<Vec<Stored<T>>> {
    let collection = T::COLLECTION.to_string();
    let sql = format!(
      "SELECT {RAW_DOC_COLUMNS} FROM documents WHERE collection = ?1 ORDER BY {}",
      order_clause(sort)
    );
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![collection], RawDoc::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    rows.into_iter().map(RawDoc::decode).collect()
  }

  async fn list_ids(&self, collection: Collection) -> Result<Vec<String>> {
    let collection = collection.to_string();
    let ids = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT doc_id FROM documents WHERE collection = ?1 ORDER BY rowid")?;
        let ids = stmt
          .query_map(rusqlite::params![collection], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
      })
      .await?;
    Ok(ids)
  }

  async fn insert<T: Record>(&self, id: Option<String>, data: T) -> Result<Stored<T>> {
    let id = id.unwrap_or_else(new_id);
    let body = serde_json::Value::Object(encode_body(&data)?).to_string();
    let created_at = now();
    let at = encode_dt(created_at);
    let collection = T::COLLECTION.to_string();
    let version = T::SCHEMA_VERSION;
    let doc_id = id.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO documents
             (collection, doc_id, body, schema_version, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)
           ON CONFLICT (collection, doc_id) DO NOTHING",
          rusqlite::params![collection, doc_id, body, version, at],
        )?;
        Ok(n == 1)
      })
      .await?;

    if !inserted {
      return Err(Error::DocumentExists(T::COLLECTION.doc_path(&id)));
    }
    self.notify(T::COLLECTION, &id);
    Ok(Stored { id, data, created_at, updated_at: created_at })
  }

  async fn update<T: Record>(&self, id: String, data: T) -> Result<Option<Stored<T>>> {
    self.merge(id, &data, false).await
  }

  async fn upsert<T: Record>(&self, id: String, data: T) -> Result<Stored<T>> {
    let path = T::COLLECTION.doc_path(&id);
    self
      .merge(id, &data, true)
      .await?
      .ok_or(Error::Core(atelier_core::Error::NotFound(path)))
  }

  async fn delete(&self, collection: Collection, id: String) -> Result<bool> {
    let name = collection.to_string();
    let doc_id = id.clone();
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![name, doc_id],
        )?)
      })
      .await?;
    if n > 0 {
      self.notify(collection, &id);
    }
    Ok(n > 0)
  }

  async fn commit(&self, batch: WriteBatch) -> Result<()> {
    if batch.is_empty() {
      return Ok(());
    }
    let ops = batch.into_ops();
    let touched: Vec<(Collection, String)> =
      ops.iter().map(|op| (op.collection(), op.id().to_string())).collect();
    let at = encode_dt(now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for op in ops {
          match op {
            WriteOp::Put { collection, id, body, version } => {
              tx.execute(
                "INSERT INTO documents
                   (collection, doc_id, body, schema_version, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                 ON CONFLICT (collection, doc_id) DO UPDATE SET
                   body = excluded.body,
                   schema_version = excluded.schema_version,
                   updated_at = excluded.updated_at",
                rusqlite::params![collection.to_string(), id, body.to_string(), version, at],
              )?;
            }
            WriteOp::Delete { collection, id } => {
              tx.execute(
                "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
                rusqlite::params![collection.to_string(), id],
              )?;
            }
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    for (collection, id) in touched {
      self.notify(collection, &id);
    }
    Ok(())
  }

  fn subscribe(&self) -> broadcast::Receiver<Change> { self.changes.subscribe() }
}
