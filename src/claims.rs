// Claim Arbitrator - serializes claim and verify operations on lost
// items with expected-version CAS. Under concurrent submission for the
// same item, at most one claimant observes success; the loser is told
// so and nothing is retried behind its back.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::entities::{Claim, EntityKind, ItemStatus, LostItem, Verification};
use crate::errors::CoreError;
use crate::identity::Session;
use crate::store::{EntityStore, StoreError};
use crate::transitions::validate_item_transition;

pub struct ClaimArbitrator<S> {
    store: Arc<S>,
}

impl<S: EntityStore<LostItem>> ClaimArbitrator<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Attach a claim by the session actor to an available item.
    ///
    /// Read the item, check it is claimable, then write the claim with
    /// the read version as the CAS expectation. Losing the CAS means a
    /// concurrent claim landed first, so the loss surfaces as
    /// `AlreadyClaimed` rather than being retried - a blind retry here
    /// would overwrite the claim that just won.
    pub async fn submit_claim(
        &self,
        session: &Session,
        item_id: &str,
        justification: &str,
        contact_info: &str,
    ) -> Result<String, CoreError> {
        if justification.trim().is_empty() {
            return Err(CoreError::Validation {
                reason: "claim justification must not be empty".to_string(),
            });
        }
        if contact_info.trim().is_empty() {
            return Err(CoreError::Validation {
                reason: "claim contact info must not be empty".to_string(),
            });
        }

        let current = self
            .store
            .get(item_id)
            .await
            .map_err(|e| CoreError::from_store(e, EntityKind::LostItem))?;

        // Status gate first so a claim on a claimed item reads as
        // AlreadyClaimed, not as a table violation.
        match current.status {
            ItemStatus::Available => {}
            ItemStatus::Claimed => {
                return Err(CoreError::AlreadyClaimed {
                    id: item_id.to_string(),
                })
            }
            ItemStatus::Returned => {
                return Err(CoreError::NotAvailable {
                    id: item_id.to_string(),
                })
            }
        }
        validate_item_transition(current.status, ItemStatus::Claimed, session.role)?;

        let claim = Claim::new(
            session.actor_id.clone(),
            justification.trim(),
            contact_info.trim(),
        );
        let claim_id = claim.id.clone();
        let mut next = current.clone();
        next.status = ItemStatus::Claimed;
        next.claim = Some(claim);

        match self.store.put(next, current.version).await {
            Ok(committed) => {
                info!(
                    entity.id = %item_id,
                    claim.id = %claim_id,
                    claimant.id = %session.actor_id,
                    version = committed.version,
                    "claim attached"
                );
                Ok(claim_id)
            }
            Err(StoreError::VersionConflict { .. }) => {
                warn!(
                    entity.id = %item_id,
                    claimant.id = %session.actor_id,
                    "claim lost the race"
                );
                Err(CoreError::AlreadyClaimed {
                    id: item_id.to_string(),
                })
            }
            Err(e) => Err(CoreError::from_store(e, EntityKind::LostItem)),
        }
    }

    /// Decide the live claim on an item.
    ///
    /// Approval returns the item (terminal) and stamps `returned_at`;
    /// rejection reopens it for other claimants. Either way the decided
    /// claim moves into the verification record, leaving the live claim
    /// slot empty.
    pub async fn decide_claim(
        &self,
        session: &Session,
        item_id: &str,
        approved: bool,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        let current = self
            .store
            .get(item_id)
            .await
            .map_err(|e| CoreError::from_store(e, EntityKind::LostItem))?;

        let claim = match (&current.status, current.claim.clone()) {
            (ItemStatus::Claimed, Some(claim)) => claim,
            _ => {
                return Err(CoreError::NotInClaimedState {
                    id: item_id.to_string(),
                })
            }
        };

        let requested = if approved {
            ItemStatus::Returned
        } else {
            ItemStatus::Available
        };
        validate_item_transition(current.status, requested, session.role)?;

        let now = Utc::now();
        let mut next = current.clone();
        next.status = requested;
        next.claim = None;
        next.verification = Some(Verification {
            decided_by: session.actor_id.clone(),
            approved,
            notes,
            decided_at: now,
            returned_at: approved.then_some(now),
            claim,
        });

        match self.store.put(next, current.version).await {
            Ok(committed) => {
                info!(
                    entity.id = %item_id,
                    approved,
                    decided.by = %session.actor_id,
                    version = committed.version,
                    "claim decided"
                );
                Ok(())
            }
            // The item changed under us; the claim we read is no longer
            // the live one, and retrying would decide someone else's
            // state.
            Err(StoreError::VersionConflict { .. }) => Err(CoreError::NotInClaimedState {
                id: item_id.to_string(),
            }),
            Err(e) => Err(CoreError::from_store(e, EntityKind::LostItem)),
        }
    }
}
