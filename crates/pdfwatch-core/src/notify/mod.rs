//! Notification capability: mail the changed document to a recipient list.
//!
//! [`SmtpNotifier`] delivers over SMTP with `lettre`; tests implement
//! [`Notifier`] with an in-memory recorder.

pub mod compose;

use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::error::NotifyError;

/// SMTP port that speaks TLS from the first byte; other ports use STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// One outgoing message: HTML body plus a single attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipients: Vec<String>,
    pub subject: String,
    pub html_body: String,
    pub attachment: Attachment,
}

pub trait Notifier {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        (**self).send(notification)
    }
}

/// SMTP relay account used for delivery.
#[derive(Debug, Clone)]
pub struct SmtpAccount {
    pub host: String,
    pub port: u16,
    /// Login name; also used as the `From` address.
    pub username: String,
    pub password: String,
}

pub struct SmtpNotifier {
    from: Mailbox,
    transport: SmtpTransport,
}

impl SmtpNotifier {
    pub fn new(account: &SmtpAccount) -> Result<Self, NotifyError> {
        let from = parse_mailbox(&account.username)?;
        let builder = if account.port == IMPLICIT_TLS_PORT {
            SmtpTransport::relay(&account.host)?
        } else {
            SmtpTransport::starttls_relay(&account.host)?
        };
        let transport = builder
            .port(account.port)
            .credentials(Credentials::new(
                account.username.clone(),
                account.password.clone(),
            ))
            .build();
        Ok(Self { from, transport })
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let message = build_message(&self.from, notification)?;
        self.transport.send(&message)?;
        tracing::info!(
            recipients = notification.recipients.len(),
            attachment = %notification.attachment.filename,
            "mail sent"
        );
        Ok(())
    }
}

/// Assemble the multipart/mixed message (HTML part + attachment).
pub fn build_message(from: &Mailbox, notification: &Notification) -> Result<Message, NotifyError> {
    if notification.recipients.is_empty() {
        return Err(NotifyError::NoRecipients);
    }

    let mut builder = Message::builder()
        .from(from.clone())
        .subject(notification.subject.clone());
    for to in &notification.recipients {
        builder = builder.to(parse_mailbox(to)?);
    }

    let attachment = &notification.attachment;
    let content_type = ContentType::parse(&attachment.content_type)
        .map_err(|_| NotifyError::ContentType(attachment.content_type.clone()))?;

    let message = builder.multipart(
        MultiPart::mixed()
            .singlepart(SinglePart::html(notification.html_body.clone()))
            .singlepart(
                MimeAttachment::new(attachment.filename.clone())
                    .body(attachment.bytes.clone(), content_type),
            ),
    )?;
    Ok(message)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| NotifyError::Address {
            address: address.to_string(),
            source,
        })
}
