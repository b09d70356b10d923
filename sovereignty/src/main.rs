use sovereignty::{configuration::get_configuration, startup::Application, telemetry};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Set up tracing
    let subscriber =
        telemetry::get_subscriber("sovereignty".into(), "info".into(), std::io::stdout);
    telemetry::init_subscriber(subscriber);

    // Set up configuration. A missing provider credential fails here, before binding.
    let configuration = get_configuration()?;

    let application = Application::build(configuration).await.map_err(|e| {
        tracing::error!(error.cause_chain = ?e, "failed to build the application");
        e
    })?;
    tracing::info!("Starting server and listening on port {}", application.port());

    application.run_until_stopped().await?;
    Ok(())
}
