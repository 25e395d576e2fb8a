pub mod traits;
pub mod notifiers;

pub use notifiers::{EmailNotifier, LogNotifier};
pub use traits::{NotificationEvent, NotificationResult, NotifierPlugin};

use std::sync::Arc;

use crate::config::AppConfig;
use crate::utils::error::Result;

/// Email when SMTP is fully configured, log output otherwise.
pub fn notifier_from_config(config: &AppConfig) -> Result<Arc<dyn NotifierPlugin>> {
    match (&config.notifications.to_address, config.email_enabled()) {
        (Some(to_address), true) => Ok(Arc::new(EmailNotifier::new(&config.notifications.smtp, to_address)?)),
        _ => Ok(Arc::new(LogNotifier::new())),
    }
}
