use super::MailError;
use crate::types::{AppError, ContactRequest};
use crate::utils::toml_config::MailConfig;
use chrono::{DateTime, Utc};
use tera::Tera;

/// A contact request that passed validation. Fields are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: lettre::Address,
    pub company: Option<String>,
    pub message: String,
}

impl TryFrom<ContactRequest> for ContactSubmission {
    type Error = AppError;

    fn try_from(request: ContactRequest) -> Result<Self, Self::Error> {
        let name = request.name.trim();
        let email = request.email.trim();
        let message = request.message.trim();

        if name.is_empty() || email.is_empty() || message.is_empty() {
            return Err(AppError::InvalidInput(
                "Name, email, and message are required".to_string(),
            ));
        }

        let email = email.parse::<lettre::Address>().map_err(|_| {
            AppError::InvalidInput("Please provide a valid email address".to_string())
        })?;

        let company = request
            .company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Self {
            name: name.to_string(),
            email,
            company,
            message: message.to_string(),
        })
    }
}

/// Rendered email ready for a [`Mailer`](super::Mailer).
#[derive(Debug, Clone)]
pub struct ContactEmail {
    pub subject: String,
    pub html: String,
    /// The submitter, so a reply goes straight back to them
    pub reply_to: lettre::message::Mailbox,
    pub submitted_at: DateTime<Utc>,
}

/// Branding printed in the footer of every email.
#[derive(Debug, Clone)]
pub struct Branding {
    pub brand: String,
    pub tagline: String,
}

impl From<&MailConfig> for Branding {
    fn from(config: &MailConfig) -> Self {
        Self {
            brand: config.brand.clone(),
            tagline: config.tagline.clone(),
        }
    }
}

const CONTACT_EMAIL_TEMPLATE: &str = include_str!("contact_email.html");

impl ContactEmail {
    /// Render a submission into an email. Every submitted field is
    /// HTML-escaped; newlines in the message become `<br>`.
    pub fn compose(
        submission: &ContactSubmission,
        branding: &Branding,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, MailError> {
        let subject = format!(
            "New Contact Form Submission from {}",
            single_line(&submission.name)
        );

        let mut context = tera::Context::new();
        context.insert("name", &submission.name);
        context.insert("email", &submission.email.to_string());
        context.insert("company", submission.company.as_deref().unwrap_or_default());
        context.insert("message", &submission.message);
        context.insert("brand", &branding.brand);
        context.insert("tagline", &branding.tagline);
        context.insert("date", &submitted_at.format("%Y-%m-%d").to_string());
        context.insert("time", &submitted_at.format("%H:%M:%S").to_string());

        let html = Tera::one_off(CONTACT_EMAIL_TEMPLATE, &context, true)
            .map_err(|e| MailError::Message(format!("Failed to render contact email: {}", e)))?;

        let reply_to = lettre::message::Mailbox::new(
            Some(single_line(&submission.name)),
            submission.email.clone(),
        );

        Ok(Self {
            subject,
            html,
            reply_to,
            submitted_at,
        })
    }
}

// Header values must not carry line breaks
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            company: None,
            message: message.to_string(),
        }
    }

    fn branding() -> Branding {
        Branding {
            brand: "S-HATCH AI Solutions".to_string(),
            tagline: "Transform your business".to_string(),
        }
    }

    #[test]
    fn test_missing_fields_rejected() {
        for req in [
            request("", "ada@example.com", "hi"),
            request("Ada", "", "hi"),
            request("Ada", "ada@example.com", "   "),
        ] {
            let err = ContactSubmission::try_from(req).unwrap_err();
            assert!(
                matches!(err, AppError::InvalidInput(ref msg) if msg == "Name, email, and message are required")
            );
        }
    }

    #[test]
    fn test_invalid_email_rejected() {
        let err = ContactSubmission::try_from(request("Ada", "not an email", "hi")).unwrap_err();
        assert!(
            matches!(err, AppError::InvalidInput(ref msg) if msg == "Please provide a valid email address")
        );
    }

    #[test]
    fn test_submission_is_trimmed_and_blank_company_dropped() {
        let mut req = request("  Ada Lovelace ", " ada@example.com ", " Hello \n");
        req.company = Some("   ".to_string());

        let submission = ContactSubmission::try_from(req).unwrap();
        assert_eq!(submission.name, "Ada Lovelace");
        assert_eq!(submission.email.to_string(), "ada@example.com");
        assert_eq!(submission.message, "Hello");
        assert!(submission.company.is_none());
    }

    #[test]
    fn test_compose_escapes_user_input() {
        let mut req = request(
            "Mallory <script>",
            "mallory@example.com",
            "line one\n<b>line two</b>",
        );
        req.company = Some("Acme & Sons".to_string());
        let submission = ContactSubmission::try_from(req).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();

        let email = ContactEmail::compose(&submission, &branding(), at).unwrap();

        assert_eq!(
            email.subject,
            "New Contact Form Submission from Mallory <script>"
        );
        assert!(email.html.contains("Mallory &lt;script&gt;"));
        assert!(!email.html.contains("<script>"));
        assert!(email.html.contains("line one<br>&lt;b&gt;line two&lt;&#x2F;b&gt;"));
        assert!(email.html.contains("Acme &amp; Sons"));
        assert!(email.html.contains("on 2026-03-14 at 09:26:53 UTC"));
        assert!(email.html.contains("S-HATCH AI Solutions"));
        assert_eq!(email.reply_to.email.to_string(), "mallory@example.com");
    }

    #[test]
    fn test_compose_without_company_has_no_company_row() {
        let submission =
            ContactSubmission::try_from(request("Ada", "ada@example.com", "hi")).unwrap();
        let email = ContactEmail::compose(&submission, &branding(), Utc::now()).unwrap();
        assert!(!email.html.contains("Company:"));
    }

    #[test]
    fn test_compose_escapes_quotes_and_crlf() {
        let mut req = request(
            r#"<a href="x">'&'</a>"#,
            "ada@example.com",
            "first\r\nsecond",
        );
        req.company = Some(r#""Quoted" Co"#.to_string());
        let submission = ContactSubmission::try_from(req).unwrap();

        let email = ContactEmail::compose(&submission, &branding(), Utc::now()).unwrap();

        assert!(email
            .html
            .contains("&lt;a href=&quot;x&quot;&gt;&#x27;&amp;&#x27;&lt;&#x2F;a&gt;"));
        assert!(email.html.contains("&quot;Quoted&quot; Co"));
        assert!(email.html.contains("first<br>second"));
        assert!(!email.html.contains('\r'));
    }
}
