//! Orchestrator callback.
//!
//! Each run ends with exactly one GET to the orchestrator carrying the order
//! id, a status (2 success, 3 failure), a remark and the last business code.
//! The call bypasses the configured proxy and its failures are only logged.

use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use crate::client::SessionOutcome;
use crate::errors::{ErrorKind, SessionError};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

pub const STATUS_SUCCESS: u8 = 2;
pub const STATUS_FAILURE: u8 = 3;

/// Final result of a run, as reported to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub success: bool,
    pub remark: String,
    pub error_code: i64,
}

impl SessionReport {
    pub fn succeeded(remark: impl Into<String>) -> Self {
        Self {
            success: true,
            remark: remark.into(),
            error_code: 0,
        }
    }

    pub fn failed(remark: impl Into<String>, error_code: i64) -> Self {
        Self {
            success: false,
            remark: remark.into(),
            error_code,
        }
    }

    /// Builds the report for a finished run. `last_error_code` is the most
    /// recent business code the server sent, used when the error has none.
    pub fn from_result(result: &Result<SessionOutcome, SessionError>, last_error_code: Option<i64>) -> Self {
        match result {
            Ok(outcome) => Self::succeeded(format!(
                "run {} accepted ({} points)",
                outcome.run_record_code, outcome.points_uploaded
            )),
            Err(e) => {
                let remark = match e.kind() {
                    ErrorKind::AuthExpired => format!("authorization expired: {}", e.message()),
                    ErrorKind::BusinessRejected => e.message(),
                    ErrorKind::Transport | ErrorKind::Malformed => e.to_string(),
                };
                Self::failed(remark, e.code().or(last_error_code).unwrap_or(0))
            }
        }
    }

    pub fn status(&self) -> u8 {
        if self.success {
            STATUS_SUCCESS
        } else {
            STATUS_FAILURE
        }
    }
}

pub struct Reporter {
    client: Client,
    url: String,
}

impl Reporter {
    pub fn new(url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .no_proxy()
            .timeout(CALLBACK_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Sends the callback. Never fails the run.
    pub async fn report(&self, order_id: &str, report: &SessionReport) {
        let status = report.status().to_string();
        let error_code = report.error_code.to_string();
        let query = [
            ("orderid", order_id),
            ("status", status.as_str()),
            ("remark", report.remark.as_str()),
            ("error_code", error_code.as_str()),
        ];

        match self.client.get(&self.url).query(&query).send().await {
            Ok(response) if response.status().is_success() => {
                info!(order_id, status = %status, "Orchestrator notified");
            }
            Ok(response) => {
                warn!(order_id, http_status = response.status().as_u16(), "Callback rejected");
            }
            Err(e) => {
                warn!(order_id, "Callback failed: {e}");
            }
        }
    }
}
