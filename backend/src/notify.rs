use std::time::Duration;

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::SmtpConfig;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl Mailer {
    pub fn from_config(config: &SmtpConfig) -> Option<Self> {
        let from: Mailbox = match config.username.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                warn!(error = %err, "SMTP_USERNAME is not a mailbox; notifications disabled");
                return None;
            }
        };

        let transport = match AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
        {
            Ok(builder) => builder
                .port(config.port)
                .credentials(Credentials::new(
                    config.username.clone(),
                    config.password.clone(),
                ))
                .build(),
            Err(err) => {
                warn!(error = %err, "invalid smtp relay; notifications disabled");
                return None;
            }
        };

        Some(Self { transport, from })
    }

    // Best-effort: every failure path is logged and swallowed.
    pub async fn send_reveal(&self, contact: &str, title: &str, selected: &str, result_url: &str) {
        let to: Mailbox = match contact.parse() {
            Ok(mailbox) => mailbox,
            Err(err) => {
                warn!(error = %err, "creator contact is not a mailbox; notification skipped");
                return;
            }
        };

        let message = match build_reveal(&self.from, to, title, selected, result_url) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "could not build notification email");
                return;
            }
        };

        match timeout(SEND_TIMEOUT, self.transport.send(message)).await {
            Ok(Ok(_)) => info!(to = contact, "sent reveal notification"),
            Ok(Err(err)) => warn!(error = %err, "notification send failed"),
            Err(_) => warn!("notification send timed out"),
        }
    }
}

fn build_reveal(
    from: &Mailbox,
    to: Mailbox,
    title: &str,
    selected: &str,
    result_url: &str,
) -> Result<Message, lettre::error::Error> {
    let body = format!(
        "Hello!\n\n\
         Your game, '{title}', has been played and the prize has been revealed!\n\n\
         The recipient chose: \"{selected}\"\n\n\
         You can view the final, permanent result here:\n\
         {result_url}\n\n\
         Happy gifting!\n"
    );

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(format!("Game reveal: '{title}' has been picked!"))
        .body(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_message_carries_title_option_and_url() {
        let from: Mailbox = "prizes@example.com".parse().unwrap();
        let to: Mailbox = "creator@example.com".parse().unwrap();
        let message = build_reveal(&from, to, "Gift", "Mug", "http://localhost:3000/game/abc")
            .unwrap();

        let rendered = String::from_utf8(message.formatted()).unwrap();
        assert!(rendered.contains("Subject: Game reveal: 'Gift' has been picked!"));
        assert!(rendered.contains("To: creator@example.com"));
        assert!(rendered.contains("From: prizes@example.com"));
        assert!(rendered.contains("\"Mug\""));
        assert!(rendered.contains("http://localhost:3000/game/abc"));
    }
}
