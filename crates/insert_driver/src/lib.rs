use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::INSERT_SEQUENCE,
    protocol::{DispatchOutcome, SubmitSignal},
};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Structural path of the insert field inside the algorithm controls row.
pub const TARGET_SELECTOR: &str = "#AlgorithmSpecificControls>td>input[type=Text]";
/// Pause after every submit and between busy checks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);
const EVENT_CAPACITY: usize = 1024;

/// Input control fed by the driver.
#[async_trait]
pub trait Target: Send + Sync {
    async fn set_value(&self, value: &str) -> Result<()>;
    async fn submit(&self, signal: SubmitSignal) -> Result<DispatchOutcome>;
    /// `true` while the control is still processing the previous submit.
    async fn is_busy(&self) -> Result<bool>;
}

/// Resolves the target control once at startup. `Ok(None)` means nothing matched.
pub trait TargetLocator {
    fn locate(&self, selector: &str) -> Result<Option<Arc<dyn Target>>>;
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("target control not found for selector '{selector}'")]
    TargetNotFound { selector: String },
    #[error("target lookup for '{selector}' failed: {source}")]
    Lookup {
        selector: String,
        source: anyhow::Error,
    },
    #[error("target failed during {operation} at cursor {cursor}: {source}")]
    Target {
        operation: &'static str,
        cursor: usize,
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Value written and submit dispatched; the fixed pause follows.
    Submitting { cursor: usize },
    /// Polling the busy flag before moving on.
    Waiting { cursor: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverEvent {
    Submitted {
        cursor: usize,
        value: i64,
        outcome: DispatchOutcome,
    },
    /// The target was still busy on poll number `polls` for this cursor.
    Polled { cursor: usize, polls: u64 },
    Advanced { cursor: usize },
    Finished { submitted: usize },
}

pub struct Driver {
    target: Arc<dyn Target>,
    events: broadcast::Sender<DriverEvent>,
}

impl Driver {
    pub fn new(target: Arc<dyn Target>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { target, events }
    }

    /// Looks the target up with [`TARGET_SELECTOR`]. A miss is fatal to the caller.
    pub fn attach(locator: &dyn TargetLocator) -> Result<Self, DriverError> {
        let target = locator
            .locate(TARGET_SELECTOR)
            .map_err(|source| DriverError::Lookup {
                selector: TARGET_SELECTOR.to_string(),
                source,
            })?
            .ok_or_else(|| DriverError::TargetNotFound {
                selector: TARGET_SELECTOR.to_string(),
            })?;
        Ok(Self::new(target))
    }

    pub fn sequence(&self) -> &'static [i64] {
        &INSERT_SEQUENCE
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DriverEvent> {
        self.events.subscribe()
    }

    /// Feeds every value of the sequence to the target, one at a time.
    ///
    /// There is no timeout: a target that never clears its busy flag keeps
    /// this future pending forever. Target errors are returned as-is and
    /// nothing is retried.
    pub async fn run(&self) -> Result<(), DriverError> {
        let sequence = self.sequence();
        for (cursor, &value) in sequence.iter().enumerate() {
            self.submit(cursor, value).await?;
            tokio::time::sleep(POLL_INTERVAL).await;
            self.wait_until_ready(cursor).await?;
            self.publish(DriverEvent::Advanced { cursor });
        }

        info!(submitted = sequence.len(), "insert sequence finished");
        self.publish(DriverEvent::Finished {
            submitted: sequence.len(),
        });
        Ok(())
    }

    async fn submit(&self, cursor: usize, value: i64) -> Result<(), DriverError> {
        info!(cursor, value, "insert");
        let phase = Phase::Submitting { cursor };
        debug!(?phase, "driver phase");

        self.target
            .set_value(&value.to_string())
            .await
            .map_err(|source| DriverError::Target {
                operation: "set_value",
                cursor,
                source,
            })?;

        let outcome = self
            .target
            .submit(SubmitSignal::enter())
            .await
            .map_err(|source| DriverError::Target {
                operation: "submit",
                cursor,
                source,
            })?;
        if outcome == DispatchOutcome::Canceled {
            debug!(cursor, value, "submit signal canceled by a listener");
        }

        self.publish(DriverEvent::Submitted {
            cursor,
            value,
            outcome,
        });
        Ok(())
    }

    async fn wait_until_ready(&self, cursor: usize) -> Result<(), DriverError> {
        let phase = Phase::Waiting { cursor };
        debug!(?phase, "driver phase");

        let mut polls = 0u64;
        while self.is_busy(cursor).await? {
            polls += 1;
            self.publish(DriverEvent::Polled { cursor, polls });
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        Ok(())
    }

    async fn is_busy(&self, cursor: usize) -> Result<bool, DriverError> {
        self.target
            .is_busy()
            .await
            .map_err(|source| DriverError::Target {
                operation: "is_busy",
                cursor,
                source,
            })
    }

    fn publish(&self, event: DriverEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
