use std::time::Duration;

use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{ContactRecipient, SenderIdentity},
    error_chain_fmt,
};

/// A client for the Resend transactional-email API.
pub struct EmailClient {
    api_key: Secret<String>,
    base_url: String,
    http_client: Client,
    sender: SenderIdentity,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: SenderIdentity,
        api_key: Secret<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            http_client,
            base_url,
            sender,
        })
    }

    #[tracing::instrument(
        name = "Sending an email through the provider",
        skip(self, recipient, subject, html_content, text_content),
        fields(recipient = %recipient.as_ref())
    )]
    pub async fn send_email(
        &self,
        recipient: &ContactRecipient,
        reply_to: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), EmailClientError> {
        let url = format!("{}/emails", self.base_url.trim_end_matches('/'));

        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: [recipient.as_ref()],
            reply_to,
            subject,
            html: html_content,
            text: text_content,
        };

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        // A failed read is a failed send; a body that does not decode is only
        // informational and is ignored.
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice::<SendEmailResponse>(&bytes).ok();

        if !status.is_success() {
            let message = body
                .and_then(|b| b.message)
                .unwrap_or_else(|| "no error message returned".into());
            return Err(EmailClientError::Rejected { status, message });
        }

        match body {
            Some(SendEmailResponse {
                error: Some(error), ..
            }) if !error.is_null() => Err(EmailClientError::Rejected {
                status,
                message: error.to_string(),
            }),
            Some(SendEmailResponse { id: Some(id), .. }) => {
                tracing::info!(email_id = %id, "The provider accepted the email.");
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
    message: Option<String>,
    error: Option<serde_json::Value>,
}

#[derive(thiserror::Error)]
pub enum EmailClientError {
    #[error("The email provider did not answer in time")]
    Timeout(#[source] reqwest::Error),
    #[error("Failed to reach the email provider")]
    Transport(#[source] reqwest::Error),
    #[error("The email provider rejected the email ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}

impl From<reqwest::Error> for EmailClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e)
        } else {
            Self::Transport(e)
        }
    }
}

impl std::fmt::Debug for EmailClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
