//! The contact form as seen from the page: field values, a submit button
//! whose label and disabled flag follow a [`SubmissionStatus`], and a client
//! that posts the form to `/api/contact`.
//!
//! The button never changes by direct mutation from the outside. Every
//! change goes through its status channel, so anything rendering the button
//! can `subscribe` and redraw from the current status alone.
use std::{
    collections::BTreeMap,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::watch;

use crate::error_chain_fmt;

pub const DEFAULT_BUTTON_LABEL: &str = "Submit";
pub const SENDING_LABEL: &str = "Sending…";
pub const SUCCEEDED_LABEL: &str = "Sent ✓ — your inquiry has been sent!";
pub const FAILED_LABEL: &str = "Failed to send — please try again";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionStatus {
    Idle,
    Sending,
    Succeeded,
    Failed,
}

impl SubmissionStatus {
    pub fn is_disabled(self) -> bool {
        self != SubmissionStatus::Idle
    }
}

pub struct SubmitButton {
    label: String,
    status: watch::Sender<SubmissionStatus>,
}

impl SubmitButton {
    pub fn new(label: impl Into<String>) -> Self {
        let (status, _) = watch::channel(SubmissionStatus::Idle);
        Self {
            label: label.into(),
            status,
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        *self.status.borrow()
    }

    /// The text currently shown on the button.
    pub fn label(&self) -> &str {
        match self.status() {
            SubmissionStatus::Idle => &self.label,
            SubmissionStatus::Sending => SENDING_LABEL,
            SubmissionStatus::Succeeded => SUCCEEDED_LABEL,
            SubmissionStatus::Failed => FAILED_LABEL,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.status().is_disabled()
    }

    pub fn subscribe(&self) -> watch::Receiver<SubmissionStatus> {
        self.status.subscribe()
    }

    /// Moves an idle button to `next`. Returns `false`, changing nothing,
    /// when the button is already disabled.
    fn try_begin(&self, next: SubmissionStatus) -> bool {
        self.status.send_if_modified(|status| {
            if *status == SubmissionStatus::Idle {
                *status = next;
                true
            } else {
                false
            }
        })
    }

    fn set(&self, next: SubmissionStatus) {
        self.status.send_replace(next);
    }
}

impl Default for SubmitButton {
    fn default() -> Self {
        Self::new(DEFAULT_BUTTON_LABEL)
    }
}

/// The form's field values, keyed by input name, plus its submit button.
#[derive(Default)]
pub struct ContactForm {
    fields: Mutex<BTreeMap<String, String>>,
    button: SubmitButton,
}

impl ContactForm {
    pub fn new(button: SubmitButton) -> Self {
        Self {
            fields: Mutex::default(),
            button,
        }
    }

    pub fn set_field(&self, name: impl Into<String>, value: impl Into<String>) {
        self.lock_fields().insert(name.into(), value.into());
    }

    pub fn field(&self, name: &str) -> Option<String> {
        self.lock_fields().get(name).cloned()
    }

    /// A snapshot of every field, ready to be serialized.
    pub fn fields(&self) -> BTreeMap<String, String> {
        self.lock_fields().clone()
    }

    /// Empties every input, keeping the field names.
    pub fn clear(&self) {
        self.lock_fields().values_mut().for_each(String::clear);
    }

    pub fn button(&self) -> &SubmitButton {
        &self.button
    }

    fn lock_fields(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.fields.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmissionPolicy {
    /// Report success as soon as the request is dispatched; never re-enable.
    Optimistic,
    /// Report the outcome only once the endpoint has answered.
    #[default]
    Confirmed,
}

/// How long the outcome stays on the button before it is restored.
#[derive(Clone, Copy, Debug)]
pub struct FeedbackWindows {
    pub success: Duration,
    pub failure: Duration,
}

impl Default for FeedbackWindows {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(15),
            failure: Duration::from_secs(4),
        }
    }
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// The button was already disabled; no request was made.
    Ignored,
    /// The request was sent without waiting for an answer.
    Dispatched,
    Delivered,
    Failed(SubmissionError),
}

#[derive(thiserror::Error)]
pub enum SubmissionError {
    #[error("Failed to reach the contact endpoint")]
    Transport(#[from] reqwest::Error),
    #[error("The contact endpoint answered {status}")]
    Rejected {
        status: StatusCode,
        error: Option<String>,
    },
}

impl std::fmt::Debug for SubmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

pub struct SubmissionClient {
    http_client: Client,
    endpoint: String,
    policy: SubmissionPolicy,
    windows: FeedbackWindows,
}

impl SubmissionClient {
    /// `base_url` is the site origin; the form always posts to `/api/contact`.
    pub fn new(base_url: &str, policy: SubmissionPolicy, windows: FeedbackWindows) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: format!("{}/api/contact", base_url.trim_end_matches('/')),
            policy,
            windows,
        }
    }

    #[tracing::instrument(name = "Submitting the contact form", skip_all, fields(policy = ?self.policy))]
    pub async fn submit(&self, form: &ContactForm) -> SubmissionOutcome {
        match self.policy {
            SubmissionPolicy::Optimistic => self.submit_optimistically(form),
            SubmissionPolicy::Confirmed => self.submit_and_confirm(form).await,
        }
    }

    fn submit_optimistically(&self, form: &ContactForm) -> SubmissionOutcome {
        let button = form.button();
        if !button.try_begin(SubmissionStatus::Succeeded) {
            return SubmissionOutcome::Ignored;
        }

        let request = self.http_client.post(&self.endpoint).json(&form.fields());
        // Delivery is not confirmed under this policy; failures are only traced.
        tokio::spawn(async move {
            if let Err(e) = request.send().await {
                tracing::debug!(error.cause_chain = ?e, "Fire-and-forget contact request failed.");
            }
        });

        form.clear();
        SubmissionOutcome::Dispatched
    }

    async fn submit_and_confirm(&self, form: &ContactForm) -> SubmissionOutcome {
        let button = form.button();
        if !button.try_begin(SubmissionStatus::Sending) {
            return SubmissionOutcome::Ignored;
        }

        let outcome = match self.post(&form.fields()).await {
            Ok(()) => {
                form.clear();
                button.set(SubmissionStatus::Succeeded);
                tokio::time::sleep(self.windows.success).await;
                SubmissionOutcome::Delivered
            }
            Err(e) => {
                tracing::warn!(error.cause_chain = ?e, "The contact form was not delivered.");
                button.set(SubmissionStatus::Failed);
                tokio::time::sleep(self.windows.failure).await;
                SubmissionOutcome::Failed(e)
            }
        };

        button.set(SubmissionStatus::Idle);
        outcome
    }

    async fn post(&self, fields: &BTreeMap<String, String>) -> Result<(), SubmissionError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(fields)
            .send()
            .await?;

        let status = response.status();
        let body = response.json::<Value>().await.ok();

        let acknowledged = body
            .as_ref()
            .and_then(|body| body.get("ok"))
            .map_or(false, is_truthy);

        if status.is_success() || acknowledged {
            Ok(())
        } else {
            let error = body
                .as_ref()
                .and_then(|body| body.get("error"))
                .and_then(Value::as_str)
                .map(str::to_owned);
            Err(SubmissionError::Rejected { status, error })
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
