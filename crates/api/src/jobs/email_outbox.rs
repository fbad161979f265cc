//! Outbox drain: delivers queued notification emails.
//!
//! Each run claims a batch of due rows and sends them one by one. A failed
//! send is retried with exponential backoff until the attempt limit, after
//! which the row is parked as failed. Delivery is at-least-once.

use chrono::Utc;
use persistence::entities::email_outbox::FailureTransition;
use persistence::entities::EmailOutboxEntity;
use persistence::repositories::EmailOutboxRepository;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use super::scheduler::{Job, JobFrequency};
use crate::middleware::metrics::{record_email_failed, record_email_sent};
use crate::services::email::{EmailMessage, EmailService};

/// Counts from one drain.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainOutcome {
    pub sent: usize,
    pub retrying: usize,
    pub failed: usize,
}

pub struct EmailOutboxJob {
    outbox: EmailOutboxRepository,
    email: EmailService,
    batch_size: i64,
}

impl EmailOutboxJob {
    pub fn new(pool: PgPool, email: EmailService, batch_size: i64) -> Self {
        Self {
            outbox: EmailOutboxRepository::new(pool),
            email,
            batch_size,
        }
    }

    /// Claims and delivers one batch.
    pub async fn drain(&self) -> Result<DrainOutcome, sqlx::Error> {
        let rows = self.outbox.claim_due(self.batch_size, Utc::now()).await?;
        let mut outcome = DrainOutcome::default();
        if rows.is_empty() {
            return Ok(outcome);
        }
        debug!(count = rows.len(), "Claimed outbox rows");

        for row in rows {
            match self.email.send(message_for(&row)).await {
                Ok(()) => {
                    self.outbox.mark_sent(row.id, Utc::now()).await?;
                    record_email_sent();
                    outcome.sent += 1;
                }
                Err(e) => {
                    let transition = self
                        .outbox
                        .record_failure(&row, &e.to_string(), Utc::now())
                        .await?;
                    match transition {
                        FailureTransition::Retry { attempts, delay } => {
                            warn!(
                                outbox_id = %row.id,
                                attempts,
                                retry_in_minutes = delay.num_minutes(),
                                error = %e,
                                "Email delivery failed, will retry"
                            );
                            record_email_failed(false);
                            outcome.retrying += 1;
                        }
                        FailureTransition::GiveUp { attempts } => {
                            warn!(
                                outbox_id = %row.id,
                                attempts,
                                error = %e,
                                "Email delivery failed, giving up"
                            );
                            record_email_failed(true);
                            outcome.failed += 1;
                        }
                    }
                }
            }
        }

        Ok(outcome)
    }
}

fn message_for(row: &EmailOutboxEntity) -> EmailMessage {
    EmailMessage {
        to: row.recipient.clone(),
        subject: row.subject.clone(),
        body_text: row.body.clone(),
    }
}

#[async_trait::async_trait]
impl Job for EmailOutboxJob {
    fn name(&self) -> &'static str {
        "email_outbox"
    }

    fn frequency(&self) -> JobFrequency {
        JobFrequency::Minutes(1)
    }

    async fn execute(&self) -> Result<(), String> {
        let outcome = self
            .drain()
            .await
            .map_err(|e| format!("Outbox drain failed: {}", e))?;

        if outcome != DrainOutcome::default() {
            info!(
                sent = outcome.sent,
                retrying = outcome.retrying,
                failed = outcome.failed,
                "Outbox drained"
            );
        }
        Ok(())
    }
}
