use std::{future::Future, net::TcpListener, sync::Arc};

use anyhow::Context;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};

use crate::{
    configuration::Settings,
    domain::ContactRecipient,
    email_client::EmailClient,
    routes::{contact, health_check, home, method_not_allowed},
    telemetry::RouterExt,
};

pub struct Application {
    port: u16,
    server: std::pin::Pin<Box<dyn Future<Output = hyper::Result<()>> + Send>>,
}

impl Application {
    /// Resolves the email client from settings and binds the listener.
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let recipient = configuration
            .email_client
            .recipient()
            .map_err(anyhow::Error::msg)?;
        let email_client = configuration
            .email_client
            .client()
            .map_err(anyhow::Error::msg)?;

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("failed to bind {}", address))?;
        let port = listener.local_addr()?.port();

        let server = run(listener, email_client, recipient)?;

        Ok(Self {
            port,
            server: Box::pin(server),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> hyper::Result<()> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    recipient: ContactRecipient,
) -> Result<impl Future<Output = hyper::Result<()>> + Send, anyhow::Error> {
    // Build app state
    let app_state = AppState {
        email_client: Arc::new(email_client),
        recipient,
    };

    // Create a router that will contain and match all routes for the application
    let app = Router::new()
        .route("/", get(home))
        .route("/health_check", get(health_check))
        .route(
            "/api/contact",
            post(contact).fallback(method_not_allowed),
        )
        .add_axum_tracing_layer()
        .with_state(app_state);

    // Start the axum server and set up to use supplied listener
    let server = axum::Server::from_tcp(listener)
        .context("failed to create server from listener")?
        .serve(app.into_make_service());
    Ok(server)
}

#[derive(Clone)]
pub struct AppState {
    email_client: Arc<EmailClient>,
    recipient: ContactRecipient,
}

impl FromRef<AppState> for Arc<EmailClient> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.email_client.clone()
    }
}

impl FromRef<AppState> for ContactRecipient {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.recipient.clone()
    }
}
