use serde::Deserialize;
use serde_json::Value;

/// The raw body of a contact submission.
///
/// Each field is kept as an untyped JSON value so that a wrong type is
/// reported the same way as a missing key.
#[derive(Debug, Default, Deserialize)]
pub struct InquiryPayload {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
}

impl InquiryPayload {
    /// Parses a request body. Empty input, invalid JSON and JSON that is not
    /// an object all yield an empty payload.
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(object @ Value::Object(_)) => serde_json::from_value(object).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// A required inquiry field: a non-empty JSON string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InquiryText(String);

impl InquiryText {
    pub fn parse(value: Option<Value>) -> Option<InquiryText> {
        match value {
            Some(Value::String(s)) if !s.is_empty() => Some(Self(s)),
            _ => None,
        }
    }
}

impl AsRef<str> for InquiryText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Missing or empty fields: {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

/// A validated name/email/message triple, alive for a single request.
#[derive(Clone, Debug)]
pub struct ContactInquiry {
    pub name: InquiryText,
    pub email: InquiryText,
    pub message: InquiryText,
}

impl TryFrom<InquiryPayload> for ContactInquiry {
    type Error = MissingFields;

    fn try_from(payload: InquiryPayload) -> Result<Self, Self::Error> {
        let name = InquiryText::parse(payload.name);
        let email = InquiryText::parse(payload.email);
        let message = InquiryText::parse(payload.message);

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) => Ok(Self {
                name,
                email,
                message,
            }),
            (name, email, message) => {
                let missing = [
                    ("name", name.is_none()),
                    ("email", email.is_none()),
                    ("message", message.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, is_missing)| is_missing.then_some(field))
                .collect();
                Err(MissingFields(missing))
            }
        }
    }
}

impl ContactInquiry {
    pub fn subject(&self) -> String {
        format!("New inquiry from {}", self.name.as_ref())
    }

    pub fn text_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\n\n{}",
            self.name.as_ref(),
            self.email.as_ref(),
            self.message.as_ref()
        )
    }

    pub fn html_body(&self) -> String {
        let message = html_escape::encode_safe(self.message.as_ref()).replace('\n', "<br>");
        format!(
            "<p><strong>Name:</strong> {}<br><strong>Email:</strong> {}</p><p>{}</p>",
            html_escape::encode_safe(self.name.as_ref()),
            html_escape::encode_safe(self.email.as_ref()),
            message
        )
    }
}
