pub mod models;
pub mod services;

pub use models::{BookingSnapshot, NotificationRequest};
pub use services::dispatcher::NotificationDispatcher;
pub use services::mailer::{FailingMailer, Mailer, NoopMailer, RecordingMailer, RelayMailer};
