use tracing::{Level, event};
use uuid::Uuid;

use crate::errors::Error;

/// Correlates the log events of one renewal exchange with the request that
/// triggered it.
#[derive(Clone, Debug)]
pub struct RenewalTelemetry {
    exchange_id: Uuid,
    trigger: String,
}

impl RenewalTelemetry {
    pub fn new(trigger: impl Into<String>) -> Self {
        Self {
            exchange_id: Uuid::new_v4(),
            trigger: trigger.into(),
        }
    }

    pub fn exchange_id(&self) -> Uuid {
        self.exchange_id
    }

    pub fn emit_start(&self) {
        event!(
            Level::INFO,
            exchange_id = %self.exchange_id,
            trigger = %self.trigger,
            "renewal.start"
        );
    }

    pub fn emit_success(&self, waiters: usize) {
        event!(
            Level::INFO,
            exchange_id = %self.exchange_id,
            trigger = %self.trigger,
            waiters,
            "renewal.success"
        );
    }

    pub fn emit_failure(&self, error: &Error, waiters: usize) {
        event!(
            Level::ERROR,
            exchange_id = %self.exchange_id,
            trigger = %self.trigger,
            waiters,
            error = %error,
            "renewal.failure"
        );
    }
}
