//! Outgoing notification email over SMTP.

use atelier_core::{entity::ContactMessage, record::Stored};
use lettre::{
  AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
  message::{Mailbox, header::ContentType},
  transport::smtp::authentication::Credentials,
};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
  pub host:     String,
  /// Defaults to the submission port for the relay.
  #[serde(default)]
  pub port:     Option<u16>,
  pub username: String,
  pub password: String,
  /// Sender mailbox, e.g. `Studio <noreply@studio.test>`.
  pub from:     String,
  /// Where contact notifications go.
  pub to:       String,
}

#[derive(Debug, Error)]
pub enum MailError {
  #[error("smtp: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),
  #[error("address: {0}")]
  Address(#[from] lettre::address::AddressError),
  #[error("message: {0}")]
  Message(#[from] lettre::error::Error),
}

pub struct Mailer {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  from:      Mailbox,
  to:        Mailbox,
}

impl Mailer {
  pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
    let from = config.from.parse()?;
    let to = config.to.parse()?;
    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
      .credentials(Credentials::new(config.username.clone(), config.password.clone()));
    if let Some(port) = config.port {
      builder = builder.port(port);
    }
    Ok(Self { transport: builder.build(), from, to })
  }

  /// Tell the studio about a new contact message.
  pub async fn notify_contact(&self, message: &Stored<ContactMessage>) -> Result<(), MailError> {
    let email = contact_email(self.from.clone(), self.to.clone(), message)?;
    self.transport.send(email).await?;
    tracing::info!(id = %message.id, "contact notification sent");
    Ok(())
  }
}

fn contact_email(
  from: Mailbox,
  to: Mailbox,
  message: &Stored<ContactMessage>,
) -> Result<Message, MailError> {
  let data = &message.data;
  let mut builder = Message::builder()
    .from(from)
    .to(to)
    .subject(format!("New contact message from {}", data.name))
    .header(ContentType::TEXT_PLAIN);
  if let Ok(reply_to) = format!("{} <{}>", data.name, data.email).parse::<Mailbox>() {
    builder = builder.reply_to(reply_to);
  }
  let body = format!(
    "Name: {}\nEmail: {}\nReceived: {}\n\n{}\n",
    data.name,
    data.email,
    message.created_at.to_rfc2822(),
    data.message,
  );
  Ok(builder.body(body)?)
}
