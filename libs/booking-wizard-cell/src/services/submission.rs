use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::{BookingError, SubmissionError};
use crate::models::{BookingForm, BookingReceipt};

/// Destination for completed bookings.
#[async_trait]
pub trait BookingSink: Send + Sync {
    async fn submit(&self, form: &BookingForm) -> Result<BookingReceipt, SubmissionError>;
}

/// POSTs the completed form as JSON to the clinic's booking endpoint.
pub struct HttpBookingSink {
    client: Client,
    endpoint: String,
}

impl HttpBookingSink {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, BookingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BookingError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl BookingSink for HttpBookingSink {
    async fn submit(&self, form: &BookingForm) -> Result<BookingReceipt, SubmissionError> {
        debug!("Submitting booking for {} at {} {}", form.service, form.date, form.time);

        let response = self
            .client
            .post(&self.endpoint)
            .json(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SubmissionError::Transport("request timed out".to_string())
                } else {
                    SubmissionError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = match body.trim() {
                "" => status.canonical_reason().unwrap_or("unknown error").to_string(),
                text => text.to_string(),
            };
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let reference = match serde_json::from_str::<Value>(&body) {
            Ok(value) => match value.get("reference") {
                Some(Value::String(raw)) => Uuid::parse_str(raw).map_err(|_| {
                    SubmissionError::InvalidResponse(format!("malformed booking reference '{}'", raw))
                })?,
                Some(other) => {
                    return Err(SubmissionError::InvalidResponse(format!(
                        "booking reference must be a string, got {}",
                        other
                    )))
                }
                None => Uuid::new_v4(),
            },
            // Upstreams that answer with an empty or plain-text body still accepted the booking
            Err(_) => Uuid::new_v4(),
        };

        info!("Booking accepted upstream, reference {}", reference);
        Ok(BookingReceipt::new(reference))
    }
}

/// Accepts every booking and only logs it. Used when no upstream is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingBookingSink;

#[async_trait]
impl BookingSink for LoggingBookingSink {
    async fn submit(&self, form: &BookingForm) -> Result<BookingReceipt, SubmissionError> {
        let receipt = BookingReceipt::issue();
        info!(
            "Booking recorded locally: service={}, date={}, time={}, reference={}",
            form.service, form.date, form.time, receipt.reference
        );
        Ok(receipt)
    }
}

pub fn sink_from_config(config: &AppConfig) -> Result<Arc<dyn BookingSink>, BookingError> {
    match config.booking_submission_url.as_deref().filter(|_| config.is_submission_configured()) {
        Some(url) => {
            info!("Forwarding bookings to {}", url);
            let timeout = Duration::from_secs(config.booking_submission_timeout_secs);
            Ok(Arc::new(HttpBookingSink::new(url, timeout)?))
        }
        None => {
            info!("No booking upstream configured, using the logging sink");
            Ok(Arc::new(LoggingBookingSink))
        }
    }
}
