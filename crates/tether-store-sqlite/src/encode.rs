//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Device variants are stored as flat nullable
//! columns gated by the `device_type` discriminant.

use chrono::{DateTime, Utc};
use tether_core::{
  gadget::{DeviceKind, DeviceSpec, Gadget, LaptopSpec, PhoneSpec},
  notification::Notification,
  report::Report,
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── DeviceKind ──────────────────────────────────────────────────────────────

pub fn encode_device_kind(k: DeviceKind) -> &'static str { k.as_str() }

pub fn decode_device_kind(s: &str) -> Result<DeviceKind> {
  match s {
    "phone" => Ok(DeviceKind::Phone),
    "laptop" => Ok(DeviceKind::Laptop),
    other => Err(Error::Decode(format!("unknown device type: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// The `gadgets` column list, in the order the `Raw` readers expect.
pub const GADGET_COLUMNS: &str = "gadget_id, owner_id, device_type, model, \
   brand, serial_number, color, description, purchase_location, \
   registration_date, storage_size, imei, sim_type, phone_number, network, \
   device_id, ram";

/// Raw strings read directly from a `gadgets` row.
pub struct RawGadget {
  pub gadget_id:         String,
  pub owner_id:          String,
  pub device_type:       String,
  pub model:             String,
  pub brand:             String,
  pub serial_number:     String,
  pub color:             Option<String>,
  pub description:       String,
  pub purchase_location: String,
  pub registration_date: String,
  pub storage_size:      String,
  pub imei:              Option<String>,
  pub sim_type:          Option<String>,
  pub phone_number:      Option<String>,
  pub network:           Option<String>,
  pub device_id:         Option<String>,
  pub ram:               Option<String>,
}

impl RawGadget {
  /// Read a row selected with [`GADGET_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      gadget_id:         row.get(0)?,
      owner_id:          row.get(1)?,
      device_type:       row.get(2)?,
      model:             row.get(3)?,
      brand:             row.get(4)?,
      serial_number:     row.get(5)?,
      color:             row.get(6)?,
      description:       row.get(7)?,
      purchase_location: row.get(8)?,
      registration_date: row.get(9)?,
      storage_size:      row.get(10)?,
      imei:              row.get(11)?,
      sim_type:          row.get(12)?,
      phone_number:      row.get(13)?,
      network:           row.get(14)?,
      device_id:         row.get(15)?,
      ram:               row.get(16)?,
    })
  }

  pub fn into_gadget(self) -> Result<Gadget> {
    let kind = decode_device_kind(&self.device_type)?;

    let spec = match kind {
      DeviceKind::Phone => DeviceSpec::Phone(PhoneSpec {
        imei:         self.imei.ok_or_else(|| variant_gap("phone", "imei"))?,
        sim_type:     self
          .sim_type
          .ok_or_else(|| variant_gap("phone", "sim_type"))?,
        phone_number: self
          .phone_number
          .ok_or_else(|| variant_gap("phone", "phone_number"))?,
        network:      self
          .network
          .ok_or_else(|| variant_gap("phone", "network"))?,
      }),
      DeviceKind::Laptop => DeviceSpec::Laptop(LaptopSpec {
        device_id: self
          .device_id
          .ok_or_else(|| variant_gap("laptop", "device_id"))?,
        ram:       self.ram.ok_or_else(|| variant_gap("laptop", "ram"))?,
      }),
    };

    Ok(Gadget {
      gadget_id:         decode_uuid(&self.gadget_id)?,
      owner_id:          decode_uuid(&self.owner_id)?,
      model:             self.model,
      brand:             self.brand,
      serial_number:     self.serial_number,
      color:             self.color,
      description:       self.description,
      purchase_location: self.purchase_location,
      registration_date: decode_dt(&self.registration_date)?,
      storage_size:      self.storage_size,
      spec,
    })
  }
}

fn variant_gap(kind: &str, column: &str) -> Error {
  Error::Decode(format!("{kind} row with NULL {column}"))
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:      String,
  pub created_at:   String,
  pub full_name:    String,
  pub email:        String,
  pub address:      Option<String>,
  pub phone_number: Option<String>,
  pub brn:          Option<String>,
  pub tin:          Option<String>,
  pub category:     Option<String>,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      created_at:   row.get(1)?,
      full_name:    row.get(2)?,
      email:        row.get(3)?,
      address:      row.get(4)?,
      phone_number: row.get(5)?,
      brn:          row.get(6)?,
      tin:          row.get(7)?,
      category:     row.get(8)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:      decode_uuid(&self.user_id)?,
      created_at:   decode_dt(&self.created_at)?,
      full_name:    self.full_name,
      email:        self.email,
      address:      self.address,
      phone_number: self.phone_number,
      brn:          self.brn,
      tin:          self.tin,
      category:     self.category,
    })
  }
}

/// The `users` column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str = "user_id, created_at, full_name, email, \
   address, phone_number, brn, tin, category";

/// Raw strings read directly from a `reports` row.
pub struct RawReport {
  pub report_id:           String,
  pub gadget_id:           String,
  pub date_last_seen:      String,
  pub location_last_seen:  String,
  pub contact_information: String,
  pub gadget_color:        Option<String>,
  pub person_reporting:    String,
  pub description:         String,
  pub report_date:         String,
  pub comments:            Option<String>,
  pub filed_at:            String,
}

impl RawReport {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      report_id:           row.get(0)?,
      gadget_id:           row.get(1)?,
      date_last_seen:      row.get(2)?,
      location_last_seen:  row.get(3)?,
      contact_information: row.get(4)?,
      gadget_color:        row.get(5)?,
      person_reporting:    row.get(6)?,
      description:         row.get(7)?,
      report_date:         row.get(8)?,
      comments:            row.get(9)?,
      filed_at:            row.get(10)?,
    })
  }

  pub fn into_report(self) -> Result<Report> {
    Ok(Report {
      report_id:           decode_uuid(&self.report_id)?,
      gadget_id:           decode_uuid(&self.gadget_id)?,
      date_last_seen:      decode_dt(&self.date_last_seen)?,
      location_last_seen:  self.location_last_seen,
      contact_information: self.contact_information,
      gadget_color:        self.gadget_color,
      person_reporting:    self.person_reporting,
      description:         self.description,
      report_date:         decode_dt(&self.report_date)?,
      comments:            self.comments,
      filed_at:            decode_dt(&self.filed_at)?,
    })
  }
}

/// The `reports` column list matching [`RawReport::from_row`].
pub const REPORT_COLUMNS: &str = "report_id, gadget_id, date_last_seen, \
   location_last_seen, contact_information, gadget_color, person_reporting, \
   description, report_date, comments, filed_at";

/// Raw strings read directly from a `notifications` row.
pub struct RawNotification {
  pub notification_id: String,
  pub title:           String,
  pub message:         String,
  pub date:            String,
  pub user_id:         String,
  pub kind:            String,
  pub gadget_id:       Option<String>,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      title:           row.get(1)?,
      message:         row.get(2)?,
      date:            row.get(3)?,
      user_id:         row.get(4)?,
      kind:            row.get(5)?,
      gadget_id:       row.get(6)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      notification_id: decode_uuid(&self.notification_id)?,
      title:           self.title,
      message:         self.message,
      date:            decode_dt(&self.date)?,
      user_id:         decode_uuid(&self.user_id)?,
      kind:            self.kind,
      gadget_id:       self
        .gadget_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
    })
  }
}

/// The `notifications` column list matching [`RawNotification::from_row`].
pub const NOTIFICATION_COLUMNS: &str = "notification_id, title, message, \
   date, user_id, kind, gadget_id";
