use once_cell::sync::Lazy;
use sovereignty::{
    configuration::{get_configuration, Settings},
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};
use wiremock::MockServer;

static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(
            "test".into(),
            "sovereignty=debug,info".into(),
            std::io::stdout,
        );
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(
            "test".into(),
            "sovereignty=debug,info".into(),
            std::io::sink,
        );
        init_subscriber(subscriber);
    }
});

pub const TEST_SENDER: &str = "Sovereignty Test <onboarding@sovereignty.test>";
pub const TEST_RECIPIENT: &str = "inbox@sovereignty.test";

pub struct TestApp {
    pub address: String,
    pub email_server: MockServer,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Like [`spawn_app`], letting a test adjust the settings before startup.
pub async fn spawn_app_with(customise: impl FnOnce(&mut Settings)) -> TestApp {
    // Set up subscriber for logging, only first time per run. Other times use existing subscriber.
    Lazy::force(&TRACING);

    let email_server = MockServer::start().await;
    let configuration = {
        // Get the configuration from file
        let mut c = get_configuration().expect("Failed to read configuration");
        // Use a random OS port
        c.application.port = 0;
        c.email_client.base_url = email_server.uri();
        c.email_client.sender = TEST_SENDER.into();
        c.email_client.recipient = TEST_RECIPIENT.into();
        c.email_client.timeout_milliseconds = 500;
        customise(&mut c);
        c
    };

    // Start the server
    let app = Application::build(configuration)
        .await
        .expect("Failed to build application");
    let port = app.port();
    let address = format!("http://127.0.0.1:{}", port);
    tokio::spawn(app.run_until_stopped());

    TestApp {
        address,
        email_server,
    }
}

impl TestApp {
    pub async fn post_contact(&self, body: &serde_json::Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/api/contact", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_contact_raw(&self, body: &'static str) -> reqwest::Response {
        reqwest::Client::new()
            .post(&format!("{}/api/contact", &self.address))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// The JSON bodies of every request the provider mock has received.
    pub async fn sent_emails(&self) -> Vec<serde_json::Value> {
        self.email_server
            .received_requests()
            .await
            .expect("Request recording is disabled")
            .iter()
            .map(|r| serde_json::from_slice(&r.body).expect("Email body was not JSON"))
            .collect()
    }
}
