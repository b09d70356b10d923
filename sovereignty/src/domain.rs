mod contact_inquiry;
mod mailbox;

pub use contact_inquiry::{ContactInquiry, InquiryPayload, InquiryText, MissingFields};
pub use mailbox::{ContactRecipient, SenderIdentity};
