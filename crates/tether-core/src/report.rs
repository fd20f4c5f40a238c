//! Lost/stolen report records — write-once, never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable report tied to one gadget. Filing a report does not change
/// the gadget itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
  pub report_id:           Uuid,
  pub gadget_id:           Uuid,
  pub date_last_seen:      DateTime<Utc>,
  pub location_last_seen:  String,
  pub contact_information: String,
  pub gadget_color:        Option<String>,
  pub person_reporting:    String,
  pub description:         String,
  pub report_date:         DateTime<Utc>,
  pub comments:            Option<String>,
  /// Server-assigned timestamp; never changes after creation.
  pub filed_at:            DateTime<Utc>,
}

/// The report body as submitted by a caller, before the gadget identifier
/// has been resolved to an id.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportFields {
  pub date_last_seen:      DateTime<Utc>,
  pub location_last_seen:  String,
  pub contact_information: String,
  pub gadget_color:        Option<String>,
  pub person_reporting:    String,
  pub description:         String,
  pub report_date:         DateTime<Utc>,
  pub comments:            Option<String>,
}

/// Input to [`crate::store::RegistryStore::file_report`]. `report_id` and
/// `filed_at` are assigned by the store; `gadget_id` comes from a prior
/// identifier resolution.
#[derive(Debug, Clone)]
pub struct NewReport {
  pub gadget_id:           Uuid,
  pub date_last_seen:      DateTime<Utc>,
  pub location_last_seen:  String,
  pub contact_information: String,
  pub gadget_color:        Option<String>,
  pub person_reporting:    String,
  pub description:         String,
  pub report_date:         DateTime<Utc>,
  pub comments:            Option<String>,
}
