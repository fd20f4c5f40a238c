//! Gadget types — the registered devices the registry tracks ownership of.
//!
//! A gadget couples a set of common fields with a device-kind-specific
//! payload. The payload is a tagged union validated at construction, so a
//! phone without an IMEI (or a laptop without RAM) can never reach storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Device kind ─────────────────────────────────────────────────────────────

/// The device-type discriminant. Stored in the `device_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
  Phone,
  Laptop,
}

impl DeviceKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Phone => "phone",
      Self::Laptop => "laptop",
    }
  }
}

// ─── Variant payloads ────────────────────────────────────────────────────────

/// Fields required for (and only meaningful on) phones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneSpec {
  pub imei:         String,
  pub sim_type:     String,
  pub phone_number: String,
  pub network:      String,
}

/// Fields required for (and only meaningful on) laptops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaptopSpec {
  pub device_id: String,
  pub ram:       String,
}

/// The typed device payload. The variant name serves as the `device_type`
/// discriminant stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeviceSpec {
  Phone(PhoneSpec),
  Laptop(LaptopSpec),
}

impl DeviceSpec {
  pub fn kind(&self) -> DeviceKind {
    match self {
      Self::Phone(_) => DeviceKind::Phone,
      Self::Laptop(_) => DeviceKind::Laptop,
    }
  }

  /// The IMEI, if this device has one.
  pub fn imei(&self) -> Option<&str> {
    match self {
      Self::Phone(p) => Some(&p.imei),
      Self::Laptop(_) => None,
    }
  }
}

// ─── Gadget ──────────────────────────────────────────────────────────────────

/// A registered device. `owner_id` always refers to exactly one user, and
/// that user's gadget-reference set contains `gadget_id` (enforced by the
/// store's transfer transaction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gadget {
  pub gadget_id:         Uuid,
  pub owner_id:          Uuid,
  pub model:             String,
  pub brand:             String,
  pub serial_number:     String,
  pub color:             Option<String>,
  pub description:       String,
  pub purchase_location: String,
  pub registration_date: DateTime<Utc>,
  pub storage_size:      String,
  #[serde(flatten)]
  pub spec:              DeviceSpec,
}

impl Gadget {
  pub fn summary(&self) -> GadgetSummary {
    let (imei, ram) = match &self.spec {
      DeviceSpec::Phone(p) => (Some(p.imei.clone()), None),
      DeviceSpec::Laptop(l) => (None, Some(l.ram.clone())),
    };
    GadgetSummary {
      gadget_id: self.gadget_id,
      kind: self.spec.kind(),
      brand: self.brand.clone(),
      serial_number: self.serial_number.clone(),
      imei,
      ram,
      storage_size: self.storage_size.clone(),
      color: self.color.clone(),
    }
  }
}

/// The field projection returned by the gadget listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GadgetSummary {
  pub gadget_id:     Uuid,
  #[serde(rename = "type")]
  pub kind:          DeviceKind,
  pub brand:         String,
  pub serial_number: String,
  pub imei:          Option<String>,
  pub ram:           Option<String>,
  pub storage_size:  String,
  pub color:         Option<String>,
}

// ─── NewGadget ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::RegistryStore::add_gadget`]. `gadget_id` is
/// always assigned by the store. Built only via [`GadgetDraft::validate`].
#[derive(Debug, Clone)]
pub struct NewGadget {
  pub owner_id:          Uuid,
  pub model:             String,
  pub brand:             String,
  pub serial_number:     String,
  pub color:             Option<String>,
  pub description:       String,
  pub purchase_location: String,
  pub registration_date: DateTime<Utc>,
  pub storage_size:      String,
  pub spec:              DeviceSpec,
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
  pub field:   &'static str,
  pub problem: &'static str,
}

impl Violation {
  fn missing(field: &'static str, problem: &'static str) -> Self {
    Self { field, problem }
  }
}

impl std::fmt::Display for Violation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} {}", self.field, self.problem)
  }
}

/// The flat registration form, as submitted to `POST /gadgets/register`.
///
/// Every type-conditional field is optional here; [`GadgetDraft::validate`]
/// enforces the per-kind required sets and *drops* fields that do not apply
/// to the declared kind, so a type change can never leave stale phone fields
/// on a laptop record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GadgetDraft {
  #[serde(rename = "type")]
  pub kind:              Option<DeviceKind>,
  pub model:             Option<String>,
  pub brand:             Option<String>,
  pub serial_number:     Option<String>,
  pub color:             Option<String>,
  pub description:       Option<String>,
  pub purchase_location: Option<String>,
  pub registration_date: Option<DateTime<Utc>>,
  pub storage_size:      Option<String>,
  // phone-only
  pub imei:              Option<String>,
  pub sim_type:          Option<String>,
  pub phone_number:      Option<String>,
  pub network:           Option<String>,
  // laptop-only
  pub device_id:         Option<String>,
  pub ram:               Option<String>,
}

impl GadgetDraft {
  /// Check the common and per-kind required field sets and produce a typed
  /// [`NewGadget`] owned by `owner_id`.
  ///
  /// Returns [`Error::Validation`] with one entry per missing field. Runs
  /// entirely before any store write.
  pub fn validate(self, owner_id: Uuid) -> Result<NewGadget> {
    const REQUIRED: &str = "is required";
    const REQUIRED_PHONE: &str = "is required for phones";
    const REQUIRED_LAPTOP: &str = "is required for laptops";

    let mut violations = Vec::new();

    fn require(
      value: Option<String>,
      field: &'static str,
      problem: &'static str,
      violations: &mut Vec<Violation>,
    ) -> String {
      match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
          violations.push(Violation::missing(field, problem));
          String::new()
        }
      }
    }

    let kind = match self.kind {
      Some(k) => k,
      None => {
        violations.push(Violation::missing("type", REQUIRED));
        // Without a kind there is no variant to validate; report what we
        // can about the common fields and bail.
        DeviceKind::Phone
      }
    };

    let model = require(self.model, "model", REQUIRED, &mut violations);
    let brand = require(self.brand, "brand", REQUIRED, &mut violations);
    let serial_number =
      require(self.serial_number, "serial_number", REQUIRED, &mut violations);
    let description =
      require(self.description, "description", REQUIRED, &mut violations);
    let purchase_location = require(
      self.purchase_location,
      "purchase_location",
      REQUIRED,
      &mut violations,
    );
    let storage_size =
      require(self.storage_size, "storage_size", REQUIRED, &mut violations);

    let registration_date = match self.registration_date {
      Some(d) => d,
      None => {
        violations.push(Violation::missing("registration_date", REQUIRED));
        Utc::now()
      }
    };

    // Per-kind required sets. Fields belonging to the other kind are
    // intentionally discarded here, never persisted.
    let spec = match kind {
      DeviceKind::Phone => DeviceSpec::Phone(PhoneSpec {
        imei: require(self.imei, "imei", REQUIRED_PHONE, &mut violations),
        sim_type: require(
          self.sim_type,
          "sim_type",
          REQUIRED_PHONE,
          &mut violations,
        ),
        phone_number: require(
          self.phone_number,
          "phone_number",
          REQUIRED_PHONE,
          &mut violations,
        ),
        network: require(
          self.network,
          "network",
          REQUIRED_PHONE,
          &mut violations,
        ),
      }),
      DeviceKind::Laptop => DeviceSpec::Laptop(LaptopSpec {
        device_id: require(
          self.device_id,
          "device_id",
          REQUIRED_LAPTOP,
          &mut violations,
        ),
        ram: require(self.ram, "ram", REQUIRED_LAPTOP, &mut violations),
      }),
    };

    if !violations.is_empty() {
      return Err(Error::Validation(violations));
    }

    Ok(NewGadget {
      owner_id,
      model,
      brand,
      serial_number,
      color: self.color,
      description,
      purchase_location,
      registration_date,
      storage_size,
      spec,
    })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
