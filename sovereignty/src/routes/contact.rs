use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use axum_macros::debug_handler;
use http::StatusCode;
use serde::Serialize;
use tracing::{field::display, Span};

use crate::{
    domain::{ContactInquiry, ContactRecipient, InquiryPayload, MissingFields},
    email_client::{EmailClient, EmailClientError},
    error::ErrorBody,
    error_chain_fmt,
};

/// Body returned once an inquiry has been handed to the provider.
#[derive(Debug, Serialize)]
pub struct ContactAccepted {
    pub ok: bool,
}

#[cfg_attr(any(test, debug_assertions), debug_handler(state = crate::startup::AppState))]
#[tracing::instrument(
    name = "Relaying a contact inquiry",
    skip(email_client, recipient, body),
    fields(inquirer_name = tracing::field::Empty, inquirer_email = tracing::field::Empty)
)]
pub async fn contact(
    State(email_client): State<Arc<EmailClient>>,
    State(recipient): State<ContactRecipient>,
    WithRejection(body, _): WithRejection<Bytes, ContactError>,
) -> Result<impl IntoResponse, ContactError> {
    let inquiry: ContactInquiry = InquiryPayload::from_slice(&body).try_into()?;
    Span::current()
        .record("inquirer_name", &display(inquiry.name.as_ref()))
        .record("inquirer_email", &display(inquiry.email.as_ref()));

    send_inquiry(&email_client, &recipient, &inquiry).await?;

    tracing::info!("The inquiry has been relayed.");
    Ok((StatusCode::OK, Json(ContactAccepted { ok: true })))
}

/// Answers every method other than POST on the contact endpoint.
pub async fn method_not_allowed() -> Response {
    ErrorBody::respond(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

#[tracing::instrument(name = "Send the inquiry email", skip_all)]
async fn send_inquiry(
    email_client: &EmailClient,
    recipient: &ContactRecipient,
    inquiry: &ContactInquiry,
) -> Result<(), EmailClientError> {
    email_client
        .send_email(
            recipient,
            inquiry.email.as_ref(),
            &inquiry.subject(),
            &inquiry.html_body(),
            &inquiry.text_body(),
        )
        .await
}

#[allow(clippy::enum_variant_names)]
#[derive(thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    ValidationError(#[from] MissingFields),
    #[error("The email provider failed to send the inquiry")]
    SendError(#[source] EmailClientError),
    #[error("The email provider did not answer in time")]
    TimeoutError(#[source] EmailClientError),
    #[error(transparent)]
    BodyExtractionError(#[from] BytesRejection),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl From<EmailClientError> for ContactError {
    fn from(e: EmailClientError) -> Self {
        match e {
            EmailClientError::Rejected { .. } => Self::SendError(e),
            EmailClientError::Timeout(_) => Self::TimeoutError(e),
            EmailClientError::Transport(_) => {
                Self::UnexpectedError(anyhow::Error::new(e).context("Failed to relay the inquiry"))
            }
        }
    }
}

impl std::fmt::Debug for ContactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        match self {
            ContactError::ValidationError(ref e) => {
                tracing::warn!("{}", e);
                ErrorBody::respond(StatusCode::BAD_REQUEST, "Missing fields")
            }
            ContactError::SendError(_) => {
                tracing::error!("{:?}", self);
                ErrorBody::respond(StatusCode::INTERNAL_SERVER_ERROR, "Email failed to send")
            }
            ContactError::TimeoutError(_) => {
                tracing::error!("{:?}", self);
                ErrorBody::respond(StatusCode::BAD_GATEWAY, "Email provider timed out")
            }
            ContactError::BodyExtractionError(ref rejection)
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE =>
            {
                tracing::warn!("{}", rejection);
                ErrorBody::respond(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large")
            }
            ContactError::BodyExtractionError(_) | ContactError::UnexpectedError(_) => {
                tracing::error!("{:?}", self);
                ErrorBody::respond(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
            }
        }
    }
}
