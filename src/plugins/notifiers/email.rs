use askama::Template;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::plugins::traits::{NotificationEvent, NotificationResult, NotifierPlugin};
use crate::utils::error::{AppError, Result};

#[derive(Template)]
#[template(path = "new_listing.html")]
struct NewListingTemplate<'a> {
    event: &'a NotificationEvent,
}

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    host: String,
}

impl EmailNotifier {
    pub fn new(smtp: &SmtpConfig, to_address: &str) -> Result<Self> {
        let from_address = smtp
            .from_address
            .as_deref()
            .ok_or_else(|| AppError::NotificationDelivery("No sender address configured".into()))?;

        let from = Mailbox::new(Some(smtp.from_name.clone()), parse_address(from_address)?);
        let to = Mailbox::new(None, parse_address(to_address)?);

        let builder = match (smtp.use_tls, smtp.implicit_tls) {
            (true, true) => AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host),
            (true, false) => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host),
            (false, _) => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)),
        }
        .map_err(|e| AppError::NotificationDelivery(format!("Invalid SMTP relay {}: {}", smtp.host, e)))?
        .port(smtp.port);

        let mailer = match (&smtp.username, &smtp.password) {
            (Some(username), Some(password)) => builder
                .credentials(Credentials::new(username.clone(), password.clone()))
                .build(),
            _ => builder.build(),
        };

        Ok(Self {
            mailer,
            from,
            to,
            host: smtp.host.clone(),
        })
    }

    fn format_text_body(&self, event: &NotificationEvent) -> String {
        let mut text = String::new();

        text.push_str(&format!("{}\n\n", event.name));
        text.push_str(&format!(
            "For sale: {} (was {}, {} new)\n",
            event.num_for_sale,
            event.previous_num_for_sale,
            event.new_listings()
        ));
        text.push_str(&format!("Lowest price: {}\n", event.formatted_price));
        if let Some(threshold) = &event.threshold {
            text.push_str(&format!("Your limit: {}\n", threshold));
        }
        text.push_str(&format!("\nView on Discogs: {}\n", event.url));

        text
    }

    fn format_html_body(&self, event: &NotificationEvent) -> Result<String> {
        Ok(NewListingTemplate { event }.render()?)
    }

    pub fn build_message(&self, event: &NotificationEvent) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(event.subject())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(self.format_text_body(event)),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(self.format_html_body(event)?),
                    ),
            )
            .map_err(|e| AppError::NotificationDelivery(format!("Failed to build email: {}", e)))
    }
}

fn parse_address(address: &str) -> Result<lettre::Address> {
    address
        .parse()
        .map_err(|e| AppError::NotificationDelivery(format!("Invalid email address '{}': {}", address, e)))
}

#[async_trait]
impl NotifierPlugin for EmailNotifier {
    fn name(&self) -> &str {
        "Email Notifier"
    }

    fn plugin_type(&self) -> &str {
        "email"
    }

    async fn notify(&self, event: &NotificationEvent) -> Result<NotificationResult> {
        let email = self.build_message(event)?;

        match self.mailer.send(email).await {
            Ok(_response) => {
                tracing::info!("Successfully notified {}", self.to);
                Ok(NotificationResult::delivered(format!("email-{}", event.id)))
            }
            Err(e) => Ok(NotificationResult::failed(e.to_string())),
        }
    }

    async fn test_connection(&self) -> Result<bool> {
        self.mailer
            .test_connection()
            .await
            .map_err(|e| AppError::NotificationDelivery(format!("SMTP connection to {} failed: {}", self.host, e)))
    }
}
