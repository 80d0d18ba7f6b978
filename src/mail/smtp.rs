use super::{ContactEmail, MailError, Mailer};
use crate::utils::toml_config::{HatchConfig, MailConfig, SmtpTls};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Delivers contact emails through an authenticated SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    addressing: Addressing,
    endpoint: String,
}

/// Sender and recipient of every contact email.
#[derive(Debug, Clone)]
struct Addressing {
    from: Mailbox,
    to: Mailbox,
}

impl Addressing {
    fn new(config: &MailConfig, username: &str) -> Result<Self, MailError> {
        let sender: Address = username.parse().map_err(|e| {
            MailError::Message(format!("SMTP username '{}' is not an address: {}", username, e))
        })?;

        let recipient = match config.recipient {
            Some(ref recipient) => recipient.parse::<Address>().map_err(|e| {
                MailError::Message(format!("Recipient '{}' is not an address: {}", recipient, e))
            })?,
            None => sender.clone(),
        };

        Ok(Self {
            from: Mailbox::new(Some(config.from_name.clone()), sender),
            to: Mailbox::new(None, recipient),
        })
    }

    fn message(&self, email: &ContactEmail) -> Result<Message, MailError> {
        Message::builder()
            .from(self.from.clone())
            .reply_to(email.reply_to.clone())
            .to(self.to.clone())
            .subject(email.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(email.html.clone())
            .map_err(|e| MailError::Message(e.to_string()))
    }
}

impl SmtpMailer {
    /// Build a mailer from the config, reading credentials from the environment.
    ///
    /// Returns `Ok(None)` when the credential variables are unset so the
    /// server can still start; the contact endpoint then reports the missing
    /// configuration.
    pub fn from_config(config: &HatchConfig) -> Result<Option<Self>, MailError> {
        let (Ok(username), Ok(password)) = (config.mail_username(), config.mail_password()) else {
            tracing::warn!(
                "Mail credentials ({} / {}) are not set; contact form email is disabled",
                config.mail.username_env,
                config.mail.password_env
            );
            return Ok(None);
        };

        Self::new(&config.mail, username, password).map(Some)
    }

    pub fn new(config: &MailConfig, username: String, password: String) -> Result<Self, MailError> {
        let addressing = Addressing::new(config, &username)?;

        let builder = match config.tls {
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host),
            SmtpTls::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            }
        }
        .map_err(|e| MailError::classify(e.to_string()))?;

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            transport,
            addressing,
            endpoint: format!("smtp://{}:{}", config.smtp_host, config.smtp_port),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &ContactEmail) -> Result<(), MailError> {
        let message = self.addressing.message(email)?;

        tracing::debug!("Sending contact email via {}", self.endpoint);
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| {
                let code = e.status().and_then(|code| code.to_string().parse::<u16>().ok());
                MailError::from_status(code, e.to_string())
            })?;

        tracing::info!(code = %response.code(), "Contact email accepted by relay");
        Ok(())
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}
