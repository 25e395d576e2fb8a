pub mod notifier;

pub use notifier::{NotificationEvent, NotificationResult, NotifierPlugin};

#[cfg(test)]
pub use notifier::MockNotifierPlugin;
