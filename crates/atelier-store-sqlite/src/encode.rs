//! Encoding and decoding helpers between stored rows and typed records.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so they sort lexicographically. Bodies are compact JSON objects.

use atelier_core::record::{Collection, Record, Sort, SortField, Stored};
use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use serde_json::{Map, Value};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time at the precision the store keeps.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

// ─── Bodies ──────────────────────────────────────────────────────────────────

/// Serialise a record to the JSON object stored in `body`.
pub fn encode_body<T: Record>(data: &T) -> Result<Map<String, Value>> {
  match serde_json::to_value(data)? {
    Value::Object(map) => Ok(map),
    _ => Err(Error::NotAnObject(T::COLLECTION.to_string())),
  }
}

/// Shallow merge: every top-level field of `patch` replaces the stored one;
/// fields only present in `base` survive.
pub fn merge_bodies(base: &str, patch: Map<String, Value>) -> Result<String> {
  let mut merged = match serde_json::from_str(base)? {
    Value::Object(map) => map,
    _ => Map::new(),
  };
  merged.extend(patch);
  Ok(Value::Object(merged).to_string())
}

// ─── Sorting ─────────────────────────────────────────────────────────────────

/// `ORDER BY` clause for a sort. Ties fall back to insertion order.
pub fn order_clause(sort: Sort) -> &'static str {
  match (sort.field, sort.descending) {
    (SortField::Order, false) => "json_extract(body, '$.order') ASC, rowid ASC",
    (SortField::Order, true) => "json_extract(body, '$.order') DESC, rowid ASC",
    (SortField::Name, false) => "json_extract(body, '$.name') COLLATE NOCASE ASC, rowid ASC",
    (SortField::Name, true) => "json_extract(body, '$.name') COLLATE NOCASE DESC, rowid ASC",
    (SortField::CreatedAt, false) => "created_at ASC, rowid ASC",
    (SortField::CreatedAt, true) => "created_at DESC, rowid DESC",
  }
}

// ─── Raw row ─────────────────────────────────────────────────────────────────

/// A `documents` row as read from SQLite, before decoding.
#[derive(Debug)]
pub struct RawDoc {
  pub doc_id:         String,
  pub body:           String,
  pub schema_version: u32,
  pub created_at:     String,
  pub updated_at:     String,
}

pub const RAW_DOC_COLUMNS: &str = "doc_id, body, schema_version, created_at, updated_at";

impl RawDoc {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      doc_id:         row.get(0)?,
      body:           row.get(1)?,
      schema_version: row.get(2)?,
      created_at:     row.get(3)?,
      updated_at:     row.get(4)?,
    })
  }

  /// Decode into a typed record, refusing bodies written by a newer schema.
  pub fn decode<T: Record>(self) -> Result<Stored<T>> {
    check_version::<T>(T::COLLECTION, &self.doc_id, self.schema_version)?;
    Ok(Stored {
      data:       serde_json::from_str(&self.body)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      id:         self.doc_id,
    })
  }
}

pub fn check_version<T: Record>(collection: Collection, id: &str, found: u32) -> Result<()> {
  if found > T::SCHEMA_VERSION {
    return Err(
      atelier_core::Error::UnsupportedVersion {
        path: collection.doc_path(id),
        found,
        known: T::SCHEMA_VERSION,
      }
      .into(),
    );
  }
  Ok(())
}
