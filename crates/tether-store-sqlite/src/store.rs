//! [`SqliteStore`] — the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tether_core::{
  gadget::{DeviceSpec, Gadget, NewGadget},
  notification::{NewNotification, Notification},
  report::{NewReport, Report},
  store::{GadgetQuery, RegistryStore},
  user::{NewUser, OwnerDesignator, User},
};

use crate::{
  Error, Result,
  encode::{
    GADGET_COLUMNS, NOTIFICATION_COLUMNS, REPORT_COLUMNS, USER_COLUMNS,
    RawGadget, RawNotification, RawReport, RawUser, encode_device_kind,
    encode_dt, encode_uuid,
  },
  error::unique_violation,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tether registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// What happened inside the transfer transaction. Returned from the
/// `conn.call` closure so domain failures cross the thread boundary as data
/// rather than as database errors.
enum TransferStep {
  /// All four writes committed; the updated gadget row.
  Committed(RawGadget),
  /// The owner CAS matched no row because the gadget does not exist.
  GadgetMissing,
  /// The owner CAS matched no row because someone else owns the gadget now.
  OwnerChanged,
  /// The expected owner had no reference row; rolled back.
  RefMissing,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a single gadget row by an arbitrary WHERE clause over one
  /// parameter.
  async fn gadget_where(
    &self,
    clause: &'static str,
    param: String,
  ) -> Result<Option<Gadget>> {
    let raw: Option<RawGadget> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {GADGET_COLUMNS} FROM gadgets WHERE {clause}"),
              rusqlite::params![param],
              RawGadget::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGadget::into_gadget).transpose()
  }
}

/// Split a device spec into the flat nullable column values.
fn spec_columns(
  spec: &DeviceSpec,
) -> (
  Option<String>, // imei
  Option<String>, // sim_type
  Option<String>, // phone_number
  Option<String>, // network
  Option<String>, // device_id
  Option<String>, // ram
) {
  match spec {
    DeviceSpec::Phone(p) => (
      Some(p.imei.clone()),
      Some(p.sim_type.clone()),
      Some(p.phone_number.clone()),
      Some(p.network.clone()),
      None,
      None,
    ),
    DeviceSpec::Laptop(l) => (
      None,
      None,
      None,
      None,
      Some(l.device_id.clone()),
      Some(l.ram.clone()),
    ),
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  type Error = Error;

  // ── Gadgets ───────────────────────────────────────────────────────────────

  async fn add_gadget(&self, input: NewGadget) -> Result<Gadget> {
    let gadget = Gadget {
      gadget_id:         Uuid::new_v4(),
      owner_id:          input.owner_id,
      model:             input.model,
      brand:             input.brand,
      serial_number:     input.serial_number,
      color:             input.color,
      description:       input.description,
      purchase_location: input.purchase_location,
      registration_date: input.registration_date,
      storage_size:      input.storage_size,
      spec:              input.spec,
    };

    let gadget_id_str = encode_uuid(gadget.gadget_id);
    let owner_id_str  = encode_uuid(gadget.owner_id);
    let kind_str      = encode_device_kind(gadget.spec.kind()).to_owned();
    let model         = gadget.model.clone();
    let brand         = gadget.brand.clone();
    let serial        = gadget.serial_number.clone();
    let color         = gadget.color.clone();
    let description   = gadget.description.clone();
    let location      = gadget.purchase_location.clone();
    let reg_date_str  = encode_dt(gadget.registration_date);
    let storage       = gadget.storage_size.clone();
    let (imei, sim_type, phone_number, network, device_id, ram) =
      spec_columns(&gadget.spec);

    let outcome = self
      .conn
      .call(move |conn| {
        // The gadget row and its owner's reference commit together, so the
        // bidirectional invariant holds from the moment of registration.
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO gadgets (
             gadget_id, owner_id, device_type, model, brand, serial_number,
             color, description, purchase_location, registration_date,
             storage_size, imei, sim_type, phone_number, network,
             device_id, ram
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                     ?13, ?14, ?15, ?16, ?17)",
          rusqlite::params![
            gadget_id_str,
            owner_id_str,
            kind_str,
            model,
            brand,
            serial,
            color,
            description,
            location,
            reg_date_str,
            storage,
            imei,
            sim_type,
            phone_number,
            network,
            device_id,
            ram,
          ],
        )?;
        tx.execute(
          "INSERT OR IGNORE INTO user_gadgets (user_id, gadget_id)
           VALUES (?1, ?2)",
          rusqlite::params![owner_id_str, gadget_id_str],
        )?;
        tx.commit()?;
        Ok(())
      })
      .await;

    match outcome {
      Ok(()) => Ok(gadget),
      Err(err) => match unique_violation(&err) {
        Some("gadgets.serial_number") => Err(Error::Core(
          tether_core::Error::DuplicateSerial(gadget.serial_number),
        )),
        Some("gadgets.imei") => Err(Error::Core(
          tether_core::Error::DuplicateImei(
            gadget.spec.imei().unwrap_or_default().to_owned(),
          ),
        )),
        _ => Err(err.into()),
      },
    }
  }

  async fn get_gadget(&self, id: Uuid) -> Result<Option<Gadget>> {
    self.gadget_where("gadget_id = ?1", encode_uuid(id)).await
  }

  async fn find_gadget_by_identifier(
    &self,
    identifier: &str,
  ) -> Result<Option<Gadget>> {
    self
      .gadget_where("imei = ?1 OR serial_number = ?1", identifier.to_owned())
      .await
  }

  async fn list_gadgets(&self) -> Result<Vec<Gadget>> {
    let raws: Vec<RawGadget> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {GADGET_COLUMNS} FROM gadgets"))?;
        let rows = stmt
          .query_map([], RawGadget::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGadget::into_gadget).collect()
  }

  async fn gadgets_owned_by(&self, owner: Uuid) -> Result<Vec<Gadget>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawGadget> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {GADGET_COLUMNS} FROM gadgets WHERE owner_id = ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], RawGadget::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGadget::into_gadget).collect()
  }

  async fn search_gadgets(&self, query: &GadgetQuery) -> Result<Vec<Gadget>> {
    let pattern   = format!("%{}%", query.text);
    let owner_str = query.owner.map(encode_uuid);
    // Saturate instead of `as`-casting: a usize::MAX limit would wrap to -1,
    // which SQLite reads as LIMIT unlimited.
    let limit_val = query
      .limit
      .map_or(100, |n| i64::try_from(n).unwrap_or(i64::MAX));
    let offset_val = query
      .offset
      .map_or(0, |n| i64::try_from(n).unwrap_or(i64::MAX));

    let raws: Vec<RawGadget> = self
      .conn
      .call(move |conn| {
        let owner_clause = if owner_str.is_some() {
          "AND owner_id = ?2"
        } else {
          ""
        };

        let sql = format!(
          "SELECT {GADGET_COLUMNS} FROM gadgets
           WHERE (model LIKE ?1 OR brand LIKE ?1
                  OR serial_number LIKE ?1 OR imei LIKE ?1)
             {owner_clause}
           LIMIT ?3 OFFSET ?4"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              pattern,
              owner_str.as_deref(),
              limit_val,
              offset_val,
            ],
            RawGadget::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGadget::into_gadget).collect()
  }

  async fn set_gadget_owner(
    &self,
    gadget_id: Uuid,
    new_owner: Uuid,
  ) -> Result<Gadget> {
    let gadget_id_str = encode_uuid(gadget_id);
    let new_owner_str = encode_uuid(new_owner);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE gadgets SET owner_id = ?1 WHERE gadget_id = ?2",
          rusqlite::params![new_owner_str, gadget_id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::Core(tether_core::Error::GadgetNotFound(gadget_id)));
    }

    self
      .get_gadget(gadget_id)
      .await?
      .ok_or(Error::Core(tether_core::Error::GadgetNotFound(gadget_id)))
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    input.validate()?;

    let user = User {
      user_id:      Uuid::new_v4(),
      created_at:   Utc::now(),
      full_name:    input.full_name,
      email:        input.email,
      address:      input.address,
      phone_number: input.phone_number,
      brn:          input.brn,
      tin:          input.tin,
      category:     input.category,
    };

    let id_str       = encode_uuid(user.user_id);
    let at_str       = encode_dt(user.created_at);
    let full_name    = user.full_name.clone();
    let email        = user.email.clone();
    let address      = user.address.clone();
    let phone_number = user.phone_number.clone();
    let brn          = user.brn.clone();
    let tin          = user.tin.clone();
    let category     = user.category.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, created_at, full_name, email, address, phone_number,
             brn, tin, category
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            at_str,
            full_name,
            email,
            address,
            phone_number,
            brn,
            tin,
            category,
          ],
        )?;
        Ok(())
      })
      .await;

    match outcome {
      Ok(()) => Ok(user),
      Err(err) => match unique_violation(&err) {
        Some("users.email") => Err(Error::Core(
          tether_core::Error::DuplicateEmail(user.email),
        )),
        Some("users.brn") => Err(Error::Core(
          tether_core::Error::DuplicateDesignator(
            user.brn.unwrap_or_default(),
          ),
        )),
        Some("users.tin") => Err(Error::Core(
          tether_core::Error::DuplicateDesignator(
            user.tin.unwrap_or_default(),
          ),
        )),
        _ => Err(err.into()),
      },
    }
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_designator(
    &self,
    designator: &OwnerDesignator,
  ) -> Result<Option<User>> {
    // AND semantics: every supplied identifier must match the same record.
    // [`OwnerDesignator::new`] rejects the empty case; guard anyway so a
    // hand-built designator cannot match every user.
    if designator.brn.is_none() && designator.tin.is_none() {
      return Err(Error::Core(tether_core::Error::MissingDesignator));
    }

    let brn = designator.brn.clone();
    let tin = designator.tin.clone();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE (?1 IS NULL OR brn = ?1)
                   AND (?2 IS NULL OR tin = ?2)"
              ),
              rusqlite::params![brn, tin],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn gadget_refs(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare("SELECT gadget_id FROM user_gadgets WHERE user_id = ?1")?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|s| Uuid::parse_str(&s).map_err(Error::Uuid))
      .collect()
  }

  async fn add_gadget_ref(&self, user_id: Uuid, gadget_id: Uuid) -> Result<()> {
    let user_str   = encode_uuid(user_id);
    let gadget_str = encode_uuid(gadget_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO user_gadgets (user_id, gadget_id)
           VALUES (?1, ?2)",
          rusqlite::params![user_str, gadget_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove_gadget_ref(
    &self,
    user_id: Uuid,
    gadget_id: Uuid,
  ) -> Result<()> {
    let user_str   = encode_uuid(user_id);
    let gadget_str = encode_uuid(gadget_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM user_gadgets WHERE user_id = ?1 AND gadget_id = ?2",
          rusqlite::params![user_str, gadget_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn file_report(&self, input: NewReport) -> Result<Report> {
    let report = Report {
      report_id:           Uuid::new_v4(),
      gadget_id:           input.gadget_id,
      date_last_seen:      input.date_last_seen,
      location_last_seen:  input.location_last_seen,
      contact_information: input.contact_information,
      gadget_color:        input.gadget_color,
      person_reporting:    input.person_reporting,
      description:         input.description,
      report_date:         input.report_date,
      comments:            input.comments,
      filed_at:            Utc::now(),
    };

    let id_str        = encode_uuid(report.report_id);
    let gadget_str    = encode_uuid(report.gadget_id);
    let last_seen_str = encode_dt(report.date_last_seen);
    let location      = report.location_last_seen.clone();
    let contact       = report.contact_information.clone();
    let color         = report.gadget_color.clone();
    let person        = report.person_reporting.clone();
    let description   = report.description.clone();
    let report_dt_str = encode_dt(report.report_date);
    let comments      = report.comments.clone();
    let filed_at_str  = encode_dt(report.filed_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO reports (
             report_id, gadget_id, date_last_seen, location_last_seen,
             contact_information, gadget_color, person_reporting,
             description, report_date, comments, filed_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            gadget_str,
            last_seen_str,
            location,
            contact,
            color,
            person,
            description,
            report_dt_str,
            comments,
            filed_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(report)
  }

  async fn list_reports(&self) -> Result<Vec<Report>> {
    let raws: Vec<RawReport> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REPORT_COLUMNS} FROM reports ORDER BY filed_at DESC"
        ))?;
        let rows = stmt
          .query_map([], RawReport::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReport::into_report).collect()
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn append_notification(
    &self,
    input: NewNotification,
  ) -> Result<Notification> {
    let notification = Notification {
      notification_id: Uuid::new_v4(),
      title:           input.title,
      message:         input.message,
      date:            Utc::now(),
      user_id:         input.user_id,
      kind:            input.kind,
      gadget_id:       input.gadget_id,
    };

    let id_str     = encode_uuid(notification.notification_id);
    let title      = notification.title.clone();
    let message    = notification.message.clone();
    let date_str   = encode_dt(notification.date);
    let user_str   = encode_uuid(notification.user_id);
    let kind       = notification.kind.clone();
    let gadget_str = notification.gadget_id.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (
             notification_id, title, message, date, user_id, kind, gadget_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str, title, message, date_str, user_str, kind, gadget_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(notification)
  }

  async fn notifications_for_user(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<Notification>> {
    let id_str = encode_uuid(user_id);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTIFICATION_COLUMNS} FROM notifications
           WHERE user_id = ?1 ORDER BY date DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawNotification::into_notification)
      .collect()
  }

  // ── Transfer ──────────────────────────────────────────────────────────────

  async fn apply_transfer(
    &self,
    gadget_id: Uuid,
    expected_owner: Uuid,
    new_owner: Uuid,
    notification: NewNotification,
  ) -> Result<Gadget> {
    let gadget_id_str = encode_uuid(gadget_id);
    let expected_str  = encode_uuid(expected_owner);
    let new_owner_str = encode_uuid(new_owner);

    let note_id_str     = encode_uuid(Uuid::new_v4());
    let note_date_str   = encode_dt(Utc::now());
    let note_title      = notification.title;
    let note_message    = notification.message;
    let note_user_str   = encode_uuid(notification.user_id);
    let note_kind       = notification.kind;
    let note_gadget_str = notification.gadget_id.map(encode_uuid);

    let step = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Compare-and-swap on the owner column. Serialises concurrent
        // transfers of the same gadget: whoever commits first wins, the
        // other CAS matches nothing.
        let changed = tx.execute(
          "UPDATE gadgets SET owner_id = ?1
           WHERE gadget_id = ?2 AND owner_id = ?3",
          rusqlite::params![new_owner_str, gadget_id_str, expected_str],
        )?;

        if changed == 0 {
          let exists: bool = tx
            .query_row(
              "SELECT 1 FROM gadgets WHERE gadget_id = ?1",
              rusqlite::params![gadget_id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
          // Dropping the uncommitted transaction rolls back.
          return Ok(if exists {
            TransferStep::OwnerChanged
          } else {
            TransferStep::GadgetMissing
          });
        }

        let removed = tx.execute(
          "DELETE FROM user_gadgets WHERE user_id = ?1 AND gadget_id = ?2",
          rusqlite::params![expected_str, gadget_id_str],
        )?;
        if removed == 0 {
          return Ok(TransferStep::RefMissing);
        }

        tx.execute(
          "INSERT OR IGNORE INTO user_gadgets (user_id, gadget_id)
           VALUES (?1, ?2)",
          rusqlite::params![new_owner_str, gadget_id_str],
        )?;

        tx.execute(
          "INSERT INTO notifications (
             notification_id, title, message, date, user_id, kind, gadget_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            note_id_str,
            note_title,
            note_message,
            note_date_str,
            note_user_str,
            note_kind,
            note_gadget_str,
          ],
        )?;

        let raw = tx.query_row(
          &format!(
            "SELECT {GADGET_COLUMNS} FROM gadgets WHERE gadget_id = ?1"
          ),
          rusqlite::params![gadget_id_str],
          RawGadget::from_row,
        )?;

        tx.commit()?;
        Ok(TransferStep::Committed(raw))
      })
      .await?;

    match step {
      TransferStep::Committed(raw) => raw.into_gadget(),
      TransferStep::GadgetMissing => {
        Err(Error::Core(tether_core::Error::GadgetNotFound(gadget_id)))
      }
      TransferStep::OwnerChanged => Err(Error::Core(
        tether_core::Error::NotOwner {
          gadget: gadget_id,
          caller: expected_owner,
        },
      )),
      TransferStep::RefMissing => Err(Error::Core(
        tether_core::Error::RefSetMismatch {
          user:   expected_owner,
          gadget: gadget_id,
        },
      )),
    }
  }
}
