//! Error type for `tether-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tether_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored row disagrees with its own device-type discriminant, e.g. a
  /// phone row with a NULL IMEI column.
  #[error("row decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Lift backend errors into the core taxonomy so the service and API layers
/// can match on domain failures without knowing about SQLite.
impl From<Error> for tether_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Core(core) => core,
      other => tether_core::Error::Store(Box::new(other)),
    }
  }
}

/// The `table.column` behind a UNIQUE constraint failure, if `err` is one.
pub(crate) fn unique_violation(err: &tokio_rusqlite::Error) -> Option<&str> {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    code,
    Some(message),
  )) = err
    && code.code == rusqlite::ErrorCode::ConstraintViolation
  {
    return message.strip_prefix("UNIQUE constraint failed: ");
  }
  None
}
