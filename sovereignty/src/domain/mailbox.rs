/// The `from` identity outgoing inquiries are sent as, e.g.
/// `Sovereignty Equestrian <onboarding@resend.dev>`.
#[derive(Clone, Debug)]
pub struct SenderIdentity(String);

impl SenderIdentity {
    pub fn parse(value: String) -> Result<SenderIdentity, String> {
        if value.trim().is_empty() {
            Err("The sender identity cannot be blank".into())
        } else {
            Ok(Self(value))
        }
    }
}

impl AsRef<str> for SenderIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The inbox every inquiry is delivered to.
#[derive(Clone, Debug)]
pub struct ContactRecipient(String);

impl ContactRecipient {
    pub fn parse(value: String) -> Result<ContactRecipient, String> {
        if value.trim().is_empty() {
            Err("The contact recipient cannot be blank".into())
        } else {
            Ok(Self(value))
        }
    }
}

impl AsRef<str> for ContactRecipient {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
