mod contact;
mod health_check;
mod home;

pub use contact::{contact, method_not_allowed, ContactAccepted, ContactError};
pub use health_check::health_check;
pub use home::home;
