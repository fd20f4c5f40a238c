//! Integration tests for `SqliteStore` and the transfer workflows against an
//! in-memory database.

use std::sync::Arc;

use chrono::Utc;
use tether_core::{
  Error as CoreError,
  auth::CallerIdentity,
  gadget::{DeviceKind, GadgetDraft},
  notification::{KIND_REPORT, KIND_TRANSFER, NewNotification},
  report::ReportFields,
  store::{GadgetQuery, RegistryStore},
  transfer::{TransferService, TransferTarget},
  user::{NewUser, OwnerDesignator, User},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_user(name: &str, email: &str, brn: Option<&str>, tin: Option<&str>) -> NewUser {
  NewUser {
    full_name:    name.into(),
    email:        email.into(),
    address:      None,
    phone_number: None,
    brn:          brn.map(str::to_owned),
    tin:          tin.map(str::to_owned),
    category:     None,
  }
}

async fn alice(s: &SqliteStore) -> User {
  s.add_user(new_user(
    "Alice Liddell",
    "alice@example.com",
    Some("BRN-A"),
    Some("TIN-A"),
  ))
  .await
  .unwrap()
}

async fn bob(s: &SqliteStore) -> User {
  s.add_user(new_user(
    "Bob Mbeki",
    "bob@example.com",
    Some("BRN-B"),
    Some("TIN-B"),
  ))
  .await
  .unwrap()
}

fn phone_draft(serial: &str, imei: &str) -> GadgetDraft {
  GadgetDraft {
    kind:              Some(DeviceKind::Phone),
    model:             Some("Pixel 8".into()),
    brand:             Some("Google".into()),
    serial_number:     Some(serial.into()),
    color:             Some("obsidian".into()),
    description:       Some("work phone".into()),
    purchase_location: Some("Kampala".into()),
    registration_date: Some(Utc::now()),
    storage_size:      Some("128GB".into()),
    imei:              Some(imei.into()),
    sim_type:          Some("nano".into()),
    phone_number:      Some("+256700000000".into()),
    network:           Some("MTN".into()),
    ..GadgetDraft::default()
  }
}

fn laptop_draft(serial: &str) -> GadgetDraft {
  GadgetDraft {
    kind:              Some(DeviceKind::Laptop),
    model:             Some("ThinkPad X1".into()),
    brand:             Some("Lenovo".into()),
    serial_number:     Some(serial.into()),
    description:       Some("dev laptop".into()),
    purchase_location: Some("Nairobi".into()),
    registration_date: Some(Utc::now()),
    storage_size:      Some("1TB".into()),
    device_id:         Some("LPT-0042".into()),
    ram:               Some("32GB".into()),
    ..GadgetDraft::default()
  }
}

fn caller(user: &User) -> CallerIdentity {
  CallerIdentity {
    user_id: user.user_id,
    brn:     user.brn.clone(),
    tin:     user.tin.clone(),
  }
}

fn tin_of(user: &User) -> OwnerDesignator {
  OwnerDesignator::new(None, user.tin.clone()).unwrap()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;
  let user = alice(&s).await;

  let fetched = s.get_user(user.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.user_id, user.user_id);
  assert_eq!(fetched.email, "alice@example.com");
  assert_eq!(fetched.brn.as_deref(), Some("BRN-A"));
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_rejected() {
  let s = store().await;
  alice(&s).await;

  let err = s
    .add_user(new_user("Other Alice", "alice@example.com", Some("BRN-X"), None))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateEmail(_))));
}

#[tokio::test]
async fn duplicate_brn_rejected() {
  let s = store().await;
  alice(&s).await;

  let err = s
    .add_user(new_user("Impostor", "impostor@example.com", Some("BRN-A"), None))
    .await
    .unwrap_err();
  assert!(
    matches!(err, Error::Core(CoreError::DuplicateDesignator(ref d)) if d == "BRN-A")
  );
}

#[tokio::test]
async fn duplicate_tin_rejected() {
  let s = store().await;
  alice(&s).await;

  let err = s
    .add_user(new_user("Impostor", "impostor@example.com", None, Some("TIN-A")))
    .await
    .unwrap_err();
  assert!(
    matches!(err, Error::Core(CoreError::DuplicateDesignator(ref d)) if d == "TIN-A")
  );
}

#[tokio::test]
async fn user_without_designator_rejected() {
  let s = store().await;
  let err = s
    .add_user(new_user("No Ids", "noid@example.com", None, None))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::MissingDesignator)));
}

#[tokio::test]
async fn find_user_by_single_designator() {
  let s = store().await;
  let user = alice(&s).await;

  let by_brn = s
    .find_user_by_designator(&OwnerDesignator::new(Some("BRN-A".into()), None).unwrap())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_brn.user_id, user.user_id);

  let by_tin = s
    .find_user_by_designator(&OwnerDesignator::new(None, Some("TIN-A".into())).unwrap())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_tin.user_id, user.user_id);
}

#[tokio::test]
async fn designator_with_both_ids_must_match_same_user() {
  let s = store().await;
  alice(&s).await;
  bob(&s).await;

  // Alice's BRN paired with Bob's TIN names nobody.
  let crossed = OwnerDesignator::new(Some("BRN-A".into()), Some("TIN-B".into())).unwrap();
  assert!(s.find_user_by_designator(&crossed).await.unwrap().is_none());

  let matched = OwnerDesignator::new(Some("BRN-A".into()), Some("TIN-A".into())).unwrap();
  assert!(s.find_user_by_designator(&matched).await.unwrap().is_some());
}

// ─── Gadgets ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_gadget_and_get() {
  let s = store().await;
  let owner = alice(&s).await;

  let input = phone_draft("SN1", "IMEI-1").validate(owner.user_id).unwrap();
  let gadget = s.add_gadget(input).await.unwrap();

  let fetched = s.get_gadget(gadget.gadget_id).await.unwrap().unwrap();
  assert_eq!(fetched.serial_number, "SN1");
  assert_eq!(fetched.owner_id, owner.user_id);
  assert_eq!(fetched.spec.kind(), DeviceKind::Phone);
}

#[tokio::test]
async fn registration_inserts_owner_reference() {
  let s = store().await;
  let owner = alice(&s).await;

  let input = laptop_draft("SN2").validate(owner.user_id).unwrap();
  let gadget = s.add_gadget(input).await.unwrap();

  let refs = s.gadget_refs(owner.user_id).await.unwrap();
  assert_eq!(refs, vec![gadget.gadget_id]);
}

#[tokio::test]
async fn duplicate_serial_rejected() {
  let s = store().await;
  let owner = alice(&s).await;

  s.add_gadget(phone_draft("SN1", "IMEI-1").validate(owner.user_id).unwrap())
    .await
    .unwrap();
  let err = s
    .add_gadget(phone_draft("SN1", "IMEI-2").validate(owner.user_id).unwrap())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateSerial(ref sn)) if sn == "SN1"));
}

#[tokio::test]
async fn duplicate_imei_rejected() {
  let s = store().await;
  let owner = alice(&s).await;

  s.add_gadget(phone_draft("SN1", "IMEI-1").validate(owner.user_id).unwrap())
    .await
    .unwrap();
  let err = s
    .add_gadget(phone_draft("SN2", "IMEI-1").validate(owner.user_id).unwrap())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateImei(_))));
}

#[tokio::test]
async fn find_gadget_by_imei_or_serial() {
  let s = store().await;
  let owner = alice(&s).await;

  let gadget = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(owner.user_id).unwrap())
    .await
    .unwrap();

  let by_serial = s.find_gadget_by_identifier("SN1").await.unwrap().unwrap();
  assert_eq!(by_serial.gadget_id, gadget.gadget_id);

  let by_imei = s.find_gadget_by_identifier("IMEI-1").await.unwrap().unwrap();
  assert_eq!(by_imei.gadget_id, gadget.gadget_id);

  assert!(s.find_gadget_by_identifier("nope").await.unwrap().is_none());
}

#[tokio::test]
async fn gadgets_owned_by_lists_only_that_owner() {
  let s = store().await;
  let a = alice(&s).await;
  let b = bob(&s).await;

  s.add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();
  s.add_gadget(laptop_draft("SN2").validate(a.user_id).unwrap())
    .await
    .unwrap();
  s.add_gadget(phone_draft("SN3", "IMEI-3").validate(b.user_id).unwrap())
    .await
    .unwrap();

  let owned = s.gadgets_owned_by(a.user_id).await.unwrap();
  assert_eq!(owned.len(), 2);
  assert!(owned.iter().all(|g| g.owner_id == a.user_id));
}

#[tokio::test]
async fn search_matches_model_and_restricts_to_owner() {
  let s = store().await;
  let a = alice(&s).await;
  let b = bob(&s).await;

  s.add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();
  s.add_gadget(phone_draft("SN2", "IMEI-2").validate(b.user_id).unwrap())
    .await
    .unwrap();
  s.add_gadget(laptop_draft("SN3").validate(a.user_id).unwrap())
    .await
    .unwrap();

  let all_pixels = s
    .search_gadgets(&GadgetQuery {
      text: "Pixel".into(),
      ..GadgetQuery::default()
    })
    .await
    .unwrap();
  assert_eq!(all_pixels.len(), 2);

  let alices_pixels = s
    .search_gadgets(&GadgetQuery {
      text:  "Pixel".into(),
      owner: Some(a.user_id),
      ..GadgetQuery::default()
    })
    .await
    .unwrap();
  assert_eq!(alices_pixels.len(), 1);
  assert_eq!(alices_pixels[0].owner_id, a.user_id);
}

#[tokio::test]
async fn search_limit_and_offset_saturate() {
  let s = store().await;
  let a = alice(&s).await;

  s.add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();
  s.add_gadget(phone_draft("SN2", "IMEI-2").validate(a.user_id).unwrap())
    .await
    .unwrap();

  let one = s
    .search_gadgets(&GadgetQuery {
      text:  "Pixel".into(),
      limit: Some(1),
      ..GadgetQuery::default()
    })
    .await
    .unwrap();
  assert_eq!(one.len(), 1);

  // usize::MAX must saturate, not wrap into SQLite's OFFSET/LIMIT -1.
  let past_the_end = s
    .search_gadgets(&GadgetQuery {
      text:   "Pixel".into(),
      offset: Some(usize::MAX),
      ..GadgetQuery::default()
    })
    .await
    .unwrap();
  assert!(past_the_end.is_empty());

  let uncapped = s
    .search_gadgets(&GadgetQuery {
      text:  "Pixel".into(),
      limit: Some(usize::MAX),
      ..GadgetQuery::default()
    })
    .await
    .unwrap();
  assert_eq!(uncapped.len(), 2);
}

// ─── Transfer — atomic unit ──────────────────────────────────────────────────

#[tokio::test]
async fn apply_transfer_moves_owner_refs_and_notifies() {
  let s = store().await;
  let a = alice(&s).await;
  let b = bob(&s).await;

  let gadget = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  let updated = s
    .apply_transfer(
      gadget.gadget_id,
      a.user_id,
      b.user_id,
      NewNotification::transfer(b.user_id, gadget.gadget_id),
    )
    .await
    .unwrap();
  assert_eq!(updated.owner_id, b.user_id);

  assert!(s.gadget_refs(a.user_id).await.unwrap().is_empty());
  assert_eq!(s.gadget_refs(b.user_id).await.unwrap(), vec![gadget.gadget_id]);

  let notes = s.notifications_for_user(b.user_id).await.unwrap();
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0].kind, KIND_TRANSFER);
  assert_eq!(notes[0].gadget_id, Some(gadget.gadget_id));
}

#[tokio::test]
async fn apply_transfer_cas_miss_is_not_owner() {
  let s = store().await;
  let a = alice(&s).await;
  let b = bob(&s).await;

  let gadget = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  // Bob claims to be the current owner; the CAS must not match.
  let err = s
    .apply_transfer(
      gadget.gadget_id,
      b.user_id,
      b.user_id,
      NewNotification::transfer(b.user_id, gadget.gadget_id),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NotOwner { .. })));

  // Nothing moved, nothing was notified.
  let unchanged = s.get_gadget(gadget.gadget_id).await.unwrap().unwrap();
  assert_eq!(unchanged.owner_id, a.user_id);
  assert!(s.notifications_for_user(b.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn apply_transfer_missing_gadget() {
  let s = store().await;
  let a = alice(&s).await;
  let b = bob(&s).await;

  let err = s
    .apply_transfer(
      Uuid::new_v4(),
      a.user_id,
      b.user_id,
      NewNotification::transfer(b.user_id, Uuid::new_v4()),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::GadgetNotFound(_))));
}

#[tokio::test]
async fn apply_transfer_rolls_back_on_ref_mismatch() {
  let s = store().await;
  let a = alice(&s).await;
  let b = bob(&s).await;

  let gadget = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  // Corrupt the reference set out-of-band.
  s.remove_gadget_ref(a.user_id, gadget.gadget_id).await.unwrap();

  let err = s
    .apply_transfer(
      gadget.gadget_id,
      a.user_id,
      b.user_id,
      NewNotification::transfer(b.user_id, gadget.gadget_id),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::RefSetMismatch { .. })));

  // The owner CAS inside the aborted transaction must have rolled back.
  let unchanged = s.get_gadget(gadget.gadget_id).await.unwrap().unwrap();
  assert_eq!(unchanged.owner_id, a.user_id);
  assert!(s.notifications_for_user(b.user_id).await.unwrap().is_empty());
}

// ─── Operator remediation ────────────────────────────────────────────────────

#[tokio::test]
async fn set_gadget_owner_overwrites_owner_column_only() {
  let s = store().await;
  let a = alice(&s).await;
  let b = bob(&s).await;

  let g = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  let updated = s.set_gadget_owner(g.gadget_id, b.user_id).await.unwrap();
  assert_eq!(updated.owner_id, b.user_id);

  // Reference sets are deliberately left alone; an operator repair
  // finishes with explicit ref edits.
  assert_eq!(s.gadget_refs(a.user_id).await.unwrap(), vec![g.gadget_id]);
  assert!(s.gadget_refs(b.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn set_gadget_owner_missing_gadget() {
  let s = store().await;
  let b = bob(&s).await;

  let err = s
    .set_gadget_owner(Uuid::new_v4(), b.user_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::GadgetNotFound(_))));
}

#[tokio::test]
async fn add_gadget_ref_is_idempotent() {
  let s = store().await;
  let a = alice(&s).await;
  let b = bob(&s).await;

  let g = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  s.add_gadget_ref(b.user_id, g.gadget_id).await.unwrap();
  s.add_gadget_ref(b.user_id, g.gadget_id).await.unwrap();
  assert_eq!(s.gadget_refs(b.user_id).await.unwrap(), vec![g.gadget_id]);
}

#[tokio::test]
async fn remediation_flow_restores_consistency() {
  let s = store().await;
  let a = alice(&s).await;
  let b = bob(&s).await;

  let g = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  // The full repair: flip the owner column, then fix both ref sets.
  s.set_gadget_owner(g.gadget_id, b.user_id).await.unwrap();
  s.remove_gadget_ref(a.user_id, g.gadget_id).await.unwrap();
  s.add_gadget_ref(b.user_id, g.gadget_id).await.unwrap();

  let repaired = s.get_gadget(g.gadget_id).await.unwrap().unwrap();
  assert_eq!(repaired.owner_id, b.user_id);
  assert!(s.gadget_refs(a.user_id).await.unwrap().is_empty());
  assert_eq!(s.gadget_refs(b.user_id).await.unwrap(), vec![g.gadget_id]);
}

// ─── Transfer — service pipeline ─────────────────────────────────────────────

#[tokio::test]
async fn transfer_single_by_serial_number() {
  // A owns G1 ("SN123") and transfers it to B, naming B by TIN.
  let s = Arc::new(store().await);
  let a = alice(&s).await;
  let b = bob(&s).await;
  let service = TransferService::new(s.clone());

  let g1 = s
    .add_gadget(phone_draft("SN123", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  let updated = service
    .transfer_single(
      &caller(&a),
      TransferTarget::Identifier("SN123".into()),
      &tin_of(&b),
    )
    .await
    .unwrap();

  assert_eq!(updated.owner_id, b.user_id);
  assert!(s.gadget_refs(a.user_id).await.unwrap().is_empty());
  assert_eq!(s.gadget_refs(b.user_id).await.unwrap(), vec![g1.gadget_id]);

  let notes = s.notifications_for_user(b.user_id).await.unwrap();
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0].kind, KIND_TRANSFER);
  assert_eq!(notes[0].user_id, b.user_id);
  assert_eq!(notes[0].gadget_id, Some(g1.gadget_id));
}

#[tokio::test]
async fn transfer_reflected_in_owned_listings() {
  let s = Arc::new(store().await);
  let a = alice(&s).await;
  let b = bob(&s).await;
  let service = TransferService::new(s.clone());

  let g = s
    .add_gadget(laptop_draft("SN9").validate(a.user_id).unwrap())
    .await
    .unwrap();

  service
    .transfer_single(&caller(&a), TransferTarget::Id(g.gadget_id), &tin_of(&b))
    .await
    .unwrap();

  let a_owned = s.gadgets_owned_by(a.user_id).await.unwrap();
  assert!(a_owned.iter().all(|x| x.gadget_id != g.gadget_id));
  let b_owned = s.gadgets_owned_by(b.user_id).await.unwrap();
  assert!(b_owned.iter().any(|x| x.gadget_id == g.gadget_id));
}

#[tokio::test]
async fn transfer_by_non_owner_fails_and_changes_nothing() {
  let s = Arc::new(store().await);
  let a = alice(&s).await;
  let b = bob(&s).await;
  let service = TransferService::new(s.clone());

  let g = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  let err = service
    .transfer_single(&caller(&b), TransferTarget::Id(g.gadget_id), &tin_of(&b))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::NotOwner { .. }));

  let unchanged = s.get_gadget(g.gadget_id).await.unwrap().unwrap();
  assert_eq!(unchanged.owner_id, a.user_id);
  assert_eq!(s.gadget_refs(a.user_id).await.unwrap(), vec![g.gadget_id]);
  assert!(s.notifications_for_user(b.user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn transfer_to_unknown_designator_fails_without_side_effects() {
  let s = Arc::new(store().await);
  let a = alice(&s).await;
  let service = TransferService::new(s.clone());

  let g = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  let ghost = OwnerDesignator::new(None, Some("TIN-GHOST".into())).unwrap();
  let err = service
    .transfer_single(&caller(&a), TransferTarget::Id(g.gadget_id), &ghost)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::OwnerNotFound { .. }));

  let unchanged = s.get_gadget(g.gadget_id).await.unwrap().unwrap();
  assert_eq!(unchanged.owner_id, a.user_id);
}

#[tokio::test]
async fn transfer_to_current_owner_rejected() {
  let s = Arc::new(store().await);
  let a = alice(&s).await;
  let service = TransferService::new(s.clone());

  let g = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  let err = service
    .transfer_single(&caller(&a), TransferTarget::Id(g.gadget_id), &tin_of(&a))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::SelfTransfer { .. }));
}

#[tokio::test]
async fn transfer_of_unknown_gadget_fails() {
  let s = Arc::new(store().await);
  let a = alice(&s).await;
  let b = bob(&s).await;
  let service = TransferService::new(s.clone());

  let err = service
    .transfer_single(&caller(&a), TransferTarget::Id(Uuid::new_v4()), &tin_of(&b))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::GadgetNotFound(_)));

  let err = service
    .transfer_single(
      &caller(&a),
      TransferTarget::Identifier("SN-MISSING".into()),
      &tin_of(&b),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::UnknownIdentifier(_)));
}

// ─── Transfer — batch policy ─────────────────────────────────────────────────

#[tokio::test]
async fn batch_transfers_owned_and_reports_skipped() {
  let s = Arc::new(store().await);
  let a = alice(&s).await;
  let b = bob(&s).await;
  let service = TransferService::new(s.clone());

  let g1 = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();
  // G2 belongs to Bob; Alice cannot move it.
  let g2 = s
    .add_gadget(laptop_draft("SN2").validate(b.user_id).unwrap())
    .await
    .unwrap();
  let missing = Uuid::new_v4();

  let outcome = service
    .transfer_batch(
      &caller(&a),
      &[g1.gadget_id, g2.gadget_id, missing],
      &tin_of(&b),
    )
    .await
    .unwrap();

  assert_eq!(outcome.transferred, vec![g1.gadget_id]);
  assert_eq!(outcome.skipped.len(), 2);
  assert_eq!(outcome.skipped[0].gadget_id, g2.gadget_id);
  assert_eq!(outcome.skipped[1].gadget_id, missing);

  // G1 moved; G2 untouched.
  assert_eq!(
    s.get_gadget(g1.gadget_id).await.unwrap().unwrap().owner_id,
    b.user_id
  );
  assert_eq!(
    s.get_gadget(g2.gadget_id).await.unwrap().unwrap().owner_id,
    b.user_id
  );
  assert_eq!(s.gadget_refs(b.user_id).await.unwrap().len(), 2);

  // One transfer committed, so exactly one notification.
  let notes = s.notifications_for_user(b.user_id).await.unwrap();
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0].gadget_id, Some(g1.gadget_id));
}

#[tokio::test]
async fn batch_to_unknown_designator_rejects_everything() {
  let s = Arc::new(store().await);
  let a = alice(&s).await;
  let service = TransferService::new(s.clone());

  let g = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  let ghost = OwnerDesignator::new(Some("BRN-GHOST".into()), None).unwrap();
  let err = service
    .transfer_batch(&caller(&a), &[g.gadget_id], &ghost)
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::OwnerNotFound { .. }));

  let unchanged = s.get_gadget(g.gadget_id).await.unwrap().unwrap();
  assert_eq!(unchanged.owner_id, a.user_id);
}

#[tokio::test]
async fn batch_skipping_self_transfer() {
  let s = Arc::new(store().await);
  let b = bob(&s).await;
  let service = TransferService::new(s.clone());

  // Already Bob's gadget, transferred to Bob by Bob.
  let g = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(b.user_id).unwrap())
    .await
    .unwrap();

  let outcome = service
    .transfer_batch(&caller(&b), &[g.gadget_id], &tin_of(&b))
    .await
    .unwrap();
  assert!(outcome.transferred.is_empty());
  assert_eq!(outcome.skipped.len(), 1);
}

// ─── Reports ─────────────────────────────────────────────────────────────────

fn report_fields() -> ReportFields {
  ReportFields {
    date_last_seen:      Utc::now(),
    location_last_seen:  "Ntinda".into(),
    contact_information: "+256700000001".into(),
    gadget_color:        Some("obsidian".into()),
    person_reporting:    "Carol".into(),
    description:         "left in a taxi".into(),
    report_date:         Utc::now(),
    comments:            None,
  }
}

#[tokio::test]
async fn file_report_by_identifier_and_notify_owner() {
  let s = Arc::new(store().await);
  let a = alice(&s).await;
  let service = TransferService::new(s.clone());

  let g = s
    .add_gadget(phone_draft("SN1", "IMEI-1").validate(a.user_id).unwrap())
    .await
    .unwrap();

  let report = service.file_report("IMEI-1", report_fields()).await.unwrap();
  assert_eq!(report.gadget_id, g.gadget_id);

  let listed = s.list_reports().await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].report_id, report.report_id);

  // The gadget itself is untouched; its owner is notified.
  let unchanged = s.get_gadget(g.gadget_id).await.unwrap().unwrap();
  assert_eq!(unchanged.owner_id, a.user_id);
  let notes = s.notifications_for_user(a.user_id).await.unwrap();
  assert_eq!(notes.len(), 1);
  assert_eq!(notes[0].kind, KIND_REPORT);
}

#[tokio::test]
async fn file_report_unknown_identifier_writes_nothing() {
  let s = Arc::new(store().await);
  let a = alice(&s).await;
  let service = TransferService::new(s.clone());

  let err = service
    .file_report("SN-MISSING", report_fields())
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::UnknownIdentifier(_)));
  assert!(s.list_reports().await.unwrap().is_empty());
  assert!(s.notifications_for_user(a.user_id).await.unwrap().is_empty());
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn notifications_are_scoped_to_their_user() {
  let s = store().await;
  let a = alice(&s).await;
  let b = bob(&s).await;

  s.append_notification(NewNotification {
    title:     "Hello".into(),
    message:   "for alice".into(),
    user_id:   a.user_id,
    kind:      "Communication".into(),
    gadget_id: None,
  })
  .await
  .unwrap();

  assert_eq!(s.notifications_for_user(a.user_id).await.unwrap().len(), 1);
  assert!(s.notifications_for_user(b.user_id).await.unwrap().is_empty());
}
