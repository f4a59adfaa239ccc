//! Access rules enforced by [`StoreClient`](crate::client::StoreClient).
//!
//! Anonymous visitors may read every public collection and leave a contact
//! message. Everything else requires the admin.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Collection;

/// The rule set a client is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
  Public,
  Admin,
}

/// The kind of store operation being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
  Get,
  List,
  Create,
  Update,
  Delete,
  /// An atomic multi-document batch.
  Write,
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Get => "get",
      Self::List => "list",
      Self::Create => "create",
      Self::Update => "update",
      Self::Delete => "delete",
      Self::Write => "write",
    })
  }
}

impl Access {
  pub fn allows(self, collection: Collection, op: Operation) -> bool {
    match self {
      Self::Admin => true,
      Self::Public => match op {
        Operation::Get | Operation::List => collection != Collection::ContactMessages,
        Operation::Create => collection == Collection::ContactMessages,
        Operation::Update | Operation::Delete | Operation::Write => false,
      },
    }
  }
}
