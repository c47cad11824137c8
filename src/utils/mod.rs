mod mailer;
pub use mailer::Mailer;

pub mod signal;
