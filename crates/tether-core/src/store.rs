//! The `RegistryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `tether-store-sqlite`). Higher layers (`TransferService`, `tether-api`)
//! depend on this abstraction, not on any concrete backend.
//!
//! Gadgets, identities, and notifications are sections of one trait so a
//! single backend can give the transfer path one transactional boundary
//! across all of them.

use std::future::Future;

use uuid::Uuid;

use crate::{
  gadget::{Gadget, NewGadget},
  notification::{NewNotification, Notification},
  report::{NewReport, Report},
  user::{NewUser, OwnerDesignator, User},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RegistryStore::search_gadgets`].
#[derive(Debug, Clone, Default)]
pub struct GadgetQuery {
  /// Case-insensitive substring matched against model, brand, serial
  /// number, and IMEI.
  pub text:   String,
  /// Restrict to gadgets owned by this user.
  pub owner:  Option<Uuid>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Tether registry backend.
///
/// Gadget and user records are mutated only through registration and
/// transfer; reports and notifications are write-once. All methods return
/// `Send` futures so the trait can be used in multi-threaded async runtimes
/// (e.g. tokio with `axum`).
pub trait RegistryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Gadgets ───────────────────────────────────────────────────────────

  /// Persist a validated gadget and insert the owner's reference in the
  /// same transaction. Rejects duplicate serial numbers and IMEIs.
  fn add_gadget(
    &self,
    input: NewGadget,
  ) -> impl Future<Output = Result<Gadget, Self::Error>> + Send + '_;

  /// Retrieve a gadget by its internal id. Returns `None` if not found.
  fn get_gadget(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Gadget>, Self::Error>> + Send + '_;

  /// Exact-match lookup by IMEI or serial number — the identifier
  /// resolution pre-step; everything downstream works on internal ids.
  fn find_gadget_by_identifier<'a>(
    &'a self,
    identifier: &'a str,
  ) -> impl Future<Output = Result<Option<Gadget>, Self::Error>> + Send + 'a;

  /// All registered gadgets.
  fn list_gadgets(
    &self,
  ) -> impl Future<Output = Result<Vec<Gadget>, Self::Error>> + Send + '_;

  /// All gadgets whose `owner_id` is `owner`.
  fn gadgets_owned_by(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<Gadget>, Self::Error>> + Send + '_;

  /// Substring search over model / brand / serial number / IMEI.
  fn search_gadgets<'a>(
    &'a self,
    query: &'a GadgetQuery,
  ) -> impl Future<Output = Result<Vec<Gadget>, Self::Error>> + Send + 'a;

  /// Overwrite a gadget's owner without touching reference sets. The
  /// transfer path never uses this; it exists for operator remediation
  /// after a detected inconsistency.
  fn set_gadget_owner(
    &self,
    gadget_id: Uuid,
    new_owner: Uuid,
  ) -> impl Future<Output = Result<Gadget, Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Rejects duplicate emails.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by internal id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look a user up by BRN and/or TIN. When both are supplied, both must
  /// match the same record.
  fn find_user_by_designator<'a>(
    &'a self,
    designator: &'a OwnerDesignator,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// The user's gadget-reference set.
  fn gadget_refs(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Uuid>, Self::Error>> + Send + '_;

  /// Insert a reference into a user's set. Idempotent.
  fn add_gadget_ref(
    &self,
    user_id: Uuid,
    gadget_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove a reference from a user's set. Removing an absent reference is
  /// not an error.
  fn remove_gadget_ref(
    &self,
    user_id: Uuid,
    gadget_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reports ───────────────────────────────────────────────────────────

  /// Persist an immutable report. The referenced gadget is not modified.
  fn file_report(
    &self,
    input: NewReport,
  ) -> impl Future<Output = Result<Report, Self::Error>> + Send + '_;

  /// All reports, newest first.
  fn list_reports(
    &self,
  ) -> impl Future<Output = Result<Vec<Report>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  /// Append a notification. The `date` timestamp is set by the store.
  fn append_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  /// A user's notifications, newest first.
  fn notifications_for_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  // ── Transfer ──────────────────────────────────────────────────────────

  /// Execute one ownership change as a single atomic unit:
  ///
  /// 1. compare-and-swap `owner_id` from `expected_owner` to `new_owner`
  ///    (a miss on an existing gadget means a concurrent transfer won);
  /// 2. remove the gadget reference from `expected_owner`'s set — a
  ///    missing reference row aborts the whole unit with the backend's
  ///    ref-set-mismatch error;
  /// 3. insert the reference into `new_owner`'s set;
  /// 4. append `notification`.
  ///
  /// Either all four steps commit or none do; no partial state is ever
  /// observable.
  fn apply_transfer(
    &self,
    gadget_id: Uuid,
    expected_owner: Uuid,
    new_owner: Uuid,
    notification: NewNotification,
  ) -> impl Future<Output = Result<Gadget, Self::Error>> + Send + '_;
}
