//! SMTP delivery of change notifications.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::SmtpTransportBuilder;
use lettre::{Address, Message, SmtpTransport, Transport};
use tracing::{debug, info, warn};

use super::subscribers::Subscriber;
use super::template::ChangeNotificationTemplate;
use super::Notifier;
use crate::config::{MailConfig, SmtpTls};
use crate::sync::ChangeReport;

/// Notifier that emails every subscriber over SMTP.
pub struct SmtpNotifier {
  from: Mailbox,
  transport: SmtpTransport,
}

impl SmtpNotifier {
  pub fn new(mail: &MailConfig, password: String) -> Result<Self> {
    let address: Address = mail
      .from_email
      .parse()
      .map_err(|e| eyre!("Invalid sender address {}: {}", mail.from_email, e))?;
    let from = Mailbox::new(Some(mail.from_name.clone()), address);

    let transport = transport_builder(mail)?
      .credentials(Credentials::new(mail.smtp_user.clone(), password))
      .build();

    Ok(Self { from, transport })
  }

  fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message> {
    let to: Mailbox = to
      .parse()
      .map_err(|e| eyre!("Invalid recipient address {}: {}", to, e))?;

    Message::builder()
      .from(self.from.clone())
      .to(to)
      .subject(subject)
      .header(ContentType::TEXT_HTML)
      .body(body.to_string())
      .map_err(|e| eyre!("Failed to build email: {}", e))
  }
}

/// Transport builder for the configured relay, port and encryption mode.
fn transport_builder(mail: &MailConfig) -> Result<SmtpTransportBuilder> {
  let builder = match mail.tls_mode() {
    SmtpTls::Wrapper => SmtpTransport::relay(&mail.smtp_server)
      .map_err(|e| eyre!("Failed to configure SMTP relay {}: {}", mail.smtp_server, e))?,
    SmtpTls::Starttls | SmtpTls::Auto => SmtpTransport::starttls_relay(&mail.smtp_server)
      .map_err(|e| eyre!("Failed to configure SMTP relay {}: {}", mail.smtp_server, e))?,
    SmtpTls::None => {
      warn!(server = %mail.smtp_server, "SMTP encryption disabled");
      SmtpTransport::builder_dangerous(&mail.smtp_server)
    }
  };

  Ok(builder.port(mail.smtp_port))
}

#[async_trait]
impl Notifier for SmtpNotifier {
  async fn send_change_notification(
    &self,
    report: &ChangeReport,
    recipients: &[Subscriber],
  ) -> Result<()> {
    let template = ChangeNotificationTemplate::new(report);
    let subject = template.subject();
    let body = template.to_string();

    let messages = recipients
      .iter()
      .map(|r| self.build_message(r.email(), &subject, &body))
      .collect::<Result<Vec<_>>>()?;

    let transport = self.transport.clone();
    let failed = tokio::task::spawn_blocking(move || {
      let mut failed = 0usize;
      for message in &messages {
        match transport.send(message) {
          Ok(_) => debug!(to = ?message.envelope().to(), "Email sent"),
          Err(e) => {
            warn!(to = ?message.envelope().to(), error = %e, "Could not send email");
            failed += 1;
          }
        }
      }
      failed
    })
    .await
    .map_err(|e| eyre!("Email task failed to execute: {}", e))?;

    if failed > 0 {
      return Err(eyre!(
        "Failed to deliver {} of {} notification emails",
        failed,
        recipients.len()
      ));
    }

    info!(recipients = recipients.len(), %subject, "Change notification sent");
    Ok(())
  }
}
