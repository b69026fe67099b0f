//! Contact form delivery

use std::sync::Arc;

use super::email::{Mailer, OutgoingEmail};
use crate::{error::AppResult, forms::ContactForm};

const CONFIRMATION_TEMPLATE: &str = include_str!("../../templates/emails/contact_confirmation.html");

#[derive(Clone)]
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    mailbox: String,
}

impl ContactService {
    /// `mailbox` receives the messages
    pub fn new(mailer: Arc<dyn Mailer>, mailbox: String) -> Self {
        Self { mailer, mailbox }
    }

    /// Validate, confirm to the sender, then forward to the library mailbox
    pub async fn send(&self, form: ContactForm) -> AppResult<()> {
        form.validate_fields()?;
        let sender = form.email.trim().to_string();

        self.mailer
            .send(OutgoingEmail {
                subject: format!("Contact confirmation, title: {}", form.title),
                recipients: vec![sender.clone()],
                text: None,
                html: Some(CONFIRMATION_TEMPLATE.to_string()),
            })
            .await?;

        self.mailer
            .send(OutgoingEmail {
                subject: format!("Contact form: {}", form.title),
                recipients: vec![self.mailbox.clone()],
                text: Some(format!("Send by: {}\n\n{}", sender, form.message)),
                html: None,
            })
            .await?;

        tracing::info!("Contact message {:?} forwarded", form.title);
        Ok(())
    }
}
