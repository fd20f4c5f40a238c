//! Notification records — the append-only event log behind transfers and
//! reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known `kind` discriminants. The field stays free-text so operator
/// tooling can add its own kinds without a schema change.
pub const KIND_TRANSFER: &str = "Transfer";
pub const KIND_REPORT: &str = "Report";

/// An immutable event addressed to one user, optionally about one gadget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub notification_id: Uuid,
  pub title:           String,
  pub message:         String,
  /// Server-assigned timestamp; never changes after creation.
  pub date:            DateTime<Utc>,
  pub user_id:         Uuid,
  pub kind:            String,
  pub gadget_id:       Option<Uuid>,
}

/// Input to [`crate::store::RegistryStore::append_notification`].
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub title:     String,
  pub message:   String,
  pub user_id:   Uuid,
  pub kind:      String,
  pub gadget_id: Option<Uuid>,
}

impl NewNotification {
  /// The notification appended when a single gadget changes hands.
  pub fn transfer(new_owner: Uuid, gadget_id: Uuid) -> Self {
    Self {
      title:     "Gadget Ownership Transferred".into(),
      message:   format!("You have been assigned ownership of gadget: {gadget_id}"),
      user_id:   new_owner,
      kind:      KIND_TRANSFER.into(),
      gadget_id: Some(gadget_id),
    }
  }

  /// The notification appended for a gadget's owner when a report is filed
  /// against it.
  pub fn report(owner: Uuid, gadget_id: Uuid) -> Self {
    Self {
      title:     "Gadget Reported".into(),
      message:   format!("A report has been filed for your gadget: {gadget_id}"),
      user_id:   owner,
      kind:      KIND_REPORT.into(),
      gadget_id: Some(gadget_id),
    }
  }
}
