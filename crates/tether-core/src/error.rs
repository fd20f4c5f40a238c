//! Error types for `tether-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::gadget::Violation;

#[derive(Debug, Error)]
pub enum Error {
  /// One or more required-for-type fields were missing or invalid.
  /// Raised before any store write.
  #[error("validation failed: {}", format_violations(.0))]
  Validation(Vec<Violation>),

  #[error("gadget not found: {0}")]
  GadgetNotFound(Uuid),

  #[error("no gadget matches identifier {0:?}")]
  UnknownIdentifier(String),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("no user matches designator (brn: {brn:?}, tin: {tin:?})")]
  OwnerNotFound {
    brn: Option<String>,
    tin: Option<String>,
  },

  /// The caller does not own the gadget it is trying to move.
  #[error("caller {caller} does not own gadget {gadget}")]
  NotOwner { gadget: Uuid, caller: Uuid },

  #[error("a gadget with serial number {0:?} is already registered")]
  DuplicateSerial(String),

  #[error("a gadget with IMEI {0:?} is already registered")]
  DuplicateImei(String),

  #[error("a user with email {0:?} already exists")]
  DuplicateEmail(String),

  /// A BRN or TIN already designates another user.
  #[error("a user with designator {0:?} already exists")]
  DuplicateDesignator(String),

  /// New owner and current owner are the same user.
  #[error("gadget {gadget} already belongs to the designated owner")]
  SelfTransfer { gadget: Uuid },

  /// The owner's gadget-reference set disagrees with the gadget's owner
  /// column. Surfaced for operator remediation, never silently repaired.
  #[error("gadget {gadget} is owned by {user} but missing from their reference set")]
  RefSetMismatch { user: Uuid, gadget: Uuid },

  /// Neither a BRN nor a TIN was supplied where an owner designator is
  /// required.
  #[error("owner designator must carry a BRN or a TIN")]
  MissingDesignator,

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// An infrastructure failure inside a storage backend.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn format_violations(violations: &[Violation]) -> String {
  violations
    .iter()
    .map(|v| v.to_string())
    .collect::<Vec<_>>()
    .join("; ")
}
