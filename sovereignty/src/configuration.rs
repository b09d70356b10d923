use std::path::Path;

use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::{
    domain::{ContactRecipient, SenderIdentity},
    email_client::EmailClient,
};

/// Sender used when `CONTACT_FROM` is not provided.
pub const DEFAULT_SENDER: &str = "Sovereignty Equestrian <onboarding@resend.dev>";
/// Inbox used when `CONTACT_TO` is not provided.
pub const DEFAULT_RECIPIENT: &str = "sovereigntyequestrian@gmail.com";
pub const DEFAULT_PROVIDER_URL: &str = "https://api.resend.com";
pub const DEFAULT_TIMEOUT_MILLISECONDS: u64 = 10_000;

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Grab the execution directory
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");

    load_settings(&base_path.join("configuration"), |key| std::env::var(key).ok())
}

/// Resolves settings from `configuration_directory`, reading the environment
/// selector and the provider overrides through `lookup`.
pub fn load_settings(
    configuration_directory: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Settings, config::ConfigError> {
    // Treat an empty value as unset.
    let variable = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    // Detect the running environment
    let environment: Environment = variable("APP_ENVIRONMENT")
        .unwrap_or_else(|| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    // Generate the name of the environment-specific config file.
    let environment_filename = format!("{}.yml", environment.as_str());

    let settings = config::Config::builder()
        .set_default("email_client.base_url", DEFAULT_PROVIDER_URL)?
        .set_default("email_client.sender", DEFAULT_SENDER)?
        .set_default("email_client.recipient", DEFAULT_RECIPIENT)?
        .set_default("email_client.timeout_milliseconds", DEFAULT_TIMEOUT_MILLISECONDS as i64)?
        .add_source(config::File::from(configuration_directory.join("base.yml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        // The provider-conventional variable names win over everything else.
        .set_override_option("email_client.api_key", variable("RESEND_API_KEY"))?
        .set_override_option("email_client.sender", variable("CONTACT_FROM"))?
        .set_override_option("email_client.recipient", variable("CONTACT_TO"))?
        .build()?;

    let settings = settings.try_deserialize::<Settings>();
    tracing::debug!("Settings values: {:?}", &settings);

    settings
}

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmailClientSettings {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub sender: String,
    pub recipient: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn client(self) -> Result<EmailClient, String> {
        let sender = self.sender()?;
        let timeout = self.timeout();
        EmailClient::new(self.base_url, sender, self.api_key, timeout)
            .map_err(|e| format!("Failed to build the email client: {}", e))
    }

    pub fn sender(&self) -> Result<SenderIdentity, String> {
        SenderIdentity::parse(self.sender.clone())
    }

    pub fn recipient(&self) -> Result<ContactRecipient, String> {
        ContactRecipient::parse(self.recipient.clone())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

/// The possible runtime environments for this application.
#[derive(Debug, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either 'local' or 'production'",
                other
            )),
        }
    }
}
