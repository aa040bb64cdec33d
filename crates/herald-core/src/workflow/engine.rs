//! Approval workflow orchestration
//!
//! Drives one draft through register → notify → decide → publish or
//! discard. External capabilities are injected behind traits; every
//! failure is converted into a reportable outcome rather than a crash.

use super::store::ApprovalStore;
use super::traits::{Notifier, Publisher};
use super::types::{ApprovalId, Decision, DecisionOutcome};
use crate::error::Result;
use std::sync::Arc;

pub struct ApprovalWorkflow {
    store: Arc<ApprovalStore>,
    notifier: Arc<dyn Notifier>,
    publisher: Arc<dyn Publisher>,
}

impl ApprovalWorkflow {
    pub fn new(
        store: Arc<ApprovalStore>,
        notifier: Arc<dyn Notifier>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            store,
            notifier,
            publisher,
        }
    }

    pub fn store(&self) -> &ApprovalStore {
        &self.store
    }

    /// Register a draft and send it to the reviewer.
    ///
    /// A notification failure propagates; the record stays `Pending`
    /// and is left to the expiry sweeper.
    pub async fn submit_for_approval(&self, content: &str) -> Result<ApprovalId> {
        let id = self.store.create(content)?;
        log::info!("Submitting approval request {}", id);

        self.notifier.send_approval_request(content, &id).await?;
        Ok(id)
    }

    /// Handle one human decision event.
    ///
    /// The store's atomic resolve guarantees at most one publish per
    /// record; duplicate events land on `AlreadyProcessed`. A failed
    /// publish is terminal and reported, never retried, since the
    /// publisher is not idempotent.
    pub async fn handle_decision(&self, decision: &Decision) -> DecisionOutcome {
        let id = decision.approval_id();

        let Some(record) = self.store.resolve(id, decision.action()) else {
            log::info!("Ignoring decision for {}: not pending", id);
            return DecisionOutcome::AlreadyProcessed;
        };

        match decision {
            Decision::Approve(_) => match self.publisher.publish(&record.content).await {
                Ok(post_id) => {
                    log::info!("Published approval {} as post {}", id, post_id);
                    DecisionOutcome::Published(post_id)
                }
                Err(e) => {
                    // The record stays Approved; re-publishing requires a
                    // fresh submission.
                    log::error!("Publish failed for approval {}: {}", id, e);
                    DecisionOutcome::PublishFailed
                }
            },
            Decision::Reject(_) => {
                log::info!("Discarded approval {}", id);
                DecisionOutcome::Discarded
            }
        }
    }
}
