//! The ownership-transfer service.
//!
//! Validates single and batch transfers against the registry and delegates
//! the actual state change to the store's atomic transfer unit. Every
//! transfer that commits carries its notification inside the same
//! transaction; every failure leaves the registry untouched.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  auth::CallerIdentity,
  gadget::Gadget,
  notification::NewNotification,
  report::{NewReport, Report, ReportFields},
  store::RegistryStore,
  user::{OwnerDesignator, User},
};

// ─── Target resolution ───────────────────────────────────────────────────────

/// How a caller names the gadget to transfer. The internal id is canonical;
/// IMEI/serial lookup is a resolution pre-step, not an alternative key.
#[derive(Debug, Clone)]
pub enum TransferTarget {
  Id(Uuid),
  /// An IMEI or serial number, resolved to an id before the pipeline runs.
  Identifier(String),
}

// ─── Batch outcome ───────────────────────────────────────────────────────────

/// A gadget the batch declined to move, with the reason it was skipped.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedTransfer {
  pub gadget_id: Uuid,
  pub reason:    String,
}

/// Itemised result of a batch transfer. Nothing is ever silently dropped:
/// every requested gadget appears in exactly one of the two lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
  pub transferred: Vec<Uuid>,
  pub skipped:     Vec<SkippedTransfer>,
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// Ownership-transfer and report-intake workflows over any
/// [`RegistryStore`].
pub struct TransferService<S> {
  store: Arc<S>,
}

impl<S> TransferService<S>
where
  S: RegistryStore,
  S::Error: Into<Error>,
{
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Resolve a transfer target to a gadget record.
  async fn resolve_target(&self, target: &TransferTarget) -> Result<Gadget> {
    match target {
      TransferTarget::Id(id) => self
        .store
        .get_gadget(*id)
        .await
        .map_err(Into::into)?
        .ok_or(Error::GadgetNotFound(*id)),
      TransferTarget::Identifier(ident) => self
        .store
        .find_gadget_by_identifier(ident)
        .await
        .map_err(Into::into)?
        .ok_or_else(|| Error::UnknownIdentifier(ident.clone())),
    }
  }

  /// Resolve the transfer recipient by BRN/TIN.
  async fn resolve_new_owner(
    &self,
    designator: &OwnerDesignator,
  ) -> Result<User> {
    self
      .store
      .find_user_by_designator(designator)
      .await
      .map_err(Into::into)?
      .ok_or_else(|| Error::OwnerNotFound {
        brn: designator.brn.clone(),
        tin: designator.tin.clone(),
      })
  }

  /// Transfer one gadget from the caller to the user named by
  /// `designator`.
  ///
  /// Fails with `GadgetNotFound`/`UnknownIdentifier` if the target does not
  /// resolve, `NotOwner` if the caller does not own it, `OwnerNotFound` if
  /// the designator matches nobody, and `SelfTransfer` if the recipient
  /// already owns it. On success the owner column, both reference sets,
  /// and the `"Transfer"` notification have all committed together.
  pub async fn transfer_single(
    &self,
    caller: &CallerIdentity,
    target: TransferTarget,
    designator: &OwnerDesignator,
  ) -> Result<Gadget> {
    let gadget = self.resolve_target(&target).await?;

    if gadget.owner_id != caller.user_id {
      return Err(Error::NotOwner {
        gadget: gadget.gadget_id,
        caller: caller.user_id,
      });
    }

    let new_owner = self.resolve_new_owner(designator).await?;
    self.execute(&gadget, &new_owner).await
  }

  /// Transfer a set of gadgets, best-effort with itemised reporting.
  ///
  /// The recipient is resolved once up front; an unknown designator rejects
  /// the whole batch with no state change. Each gadget then runs the full
  /// single-transfer pipeline in its own transaction, so one bad gadget
  /// never blocks the rest and every skip carries its reason.
  pub async fn transfer_batch(
    &self,
    caller: &CallerIdentity,
    gadget_ids: &[Uuid],
    designator: &OwnerDesignator,
  ) -> Result<BatchOutcome> {
    let new_owner = self.resolve_new_owner(designator).await?;

    let mut outcome = BatchOutcome::default();
    for &gadget_id in gadget_ids {
      match self.transfer_one_of_batch(caller, gadget_id, &new_owner).await {
        Ok(_) => outcome.transferred.push(gadget_id),
        Err(err) => outcome.skipped.push(SkippedTransfer {
          gadget_id,
          reason: err.to_string(),
        }),
      }
    }
    Ok(outcome)
  }

  async fn transfer_one_of_batch(
    &self,
    caller: &CallerIdentity,
    gadget_id: Uuid,
    new_owner: &User,
  ) -> Result<Gadget> {
    let gadget = self
      .store
      .get_gadget(gadget_id)
      .await
      .map_err(Into::into)?
      .ok_or(Error::GadgetNotFound(gadget_id))?;

    if gadget.owner_id != caller.user_id {
      return Err(Error::NotOwner {
        gadget: gadget_id,
        caller: caller.user_id,
      });
    }

    self.execute(&gadget, new_owner).await
  }

  /// Run the validated transfer through the store's atomic unit.
  async fn execute(&self, gadget: &Gadget, new_owner: &User) -> Result<Gadget> {
    if new_owner.user_id == gadget.owner_id {
      return Err(Error::SelfTransfer {
        gadget: gadget.gadget_id,
      });
    }

    let notification =
      NewNotification::transfer(new_owner.user_id, gadget.gadget_id);

    let updated = self
      .store
      .apply_transfer(
        gadget.gadget_id,
        gadget.owner_id,
        new_owner.user_id,
        notification,
      )
      .await
      .map_err(Into::into)
      .inspect_err(|err| {
        if let Error::RefSetMismatch { user, gadget } = err {
          tracing::warn!(
            %user,
            %gadget,
            "reference set disagrees with gadget owner; transfer rolled back",
          );
        }
      })?;

    tracing::info!(
      gadget = %updated.gadget_id,
      from = %gadget.owner_id,
      to = %new_owner.user_id,
      "ownership transferred",
    );
    Ok(updated)
  }

  // ── Report intake ─────────────────────────────────────────────────────

  /// File a lost/stolen report against the gadget named by `identifier`
  /// (IMEI or serial number) and notify its owner. The gadget itself is
  /// not modified.
  pub async fn file_report(
    &self,
    identifier: &str,
    fields: ReportFields,
  ) -> Result<Report> {
    let gadget = self
      .store
      .find_gadget_by_identifier(identifier)
      .await
      .map_err(Into::into)?
      .ok_or_else(|| Error::UnknownIdentifier(identifier.to_owned()))?;

    let report = self
      .store
      .file_report(NewReport {
        gadget_id:           gadget.gadget_id,
        date_last_seen:      fields.date_last_seen,
        location_last_seen:  fields.location_last_seen,
        contact_information: fields.contact_information,
        gadget_color:        fields.gadget_color,
        person_reporting:    fields.person_reporting,
        description:         fields.description,
        report_date:         fields.report_date,
        comments:            fields.comments,
      })
      .await
      .map_err(Into::into)?;

    self
      .store
      .append_notification(NewNotification::report(
        gadget.owner_id,
        gadget.gadget_id,
      ))
      .await
      .map_err(Into::into)?;

    Ok(report)
  }
}
