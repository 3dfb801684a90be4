//! Email service for account lifecycle mail and monthly reports.

use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use std::path::Path;

use crate::{config::Config, errors::Error, reports::MonthlySummary};

pub struct EmailService {
    transport: EmailTransport,
    from_email: String,
    from_name: String,
    base_url: String,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let email_config = &config.email;

        let transport = match &email_config.transport {
            crate::config::EmailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
            } => {
                if !use_tls {
                    tracing::warn!("SMTP TLS is disabled - this is not recommended for production");
                }

                let smtp_builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                } else {
                    Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host))
                }
                .map_err(|e| Error::Internal {
                    operation: format!("create SMTP transport: {e}"),
                })?
                .port(*port)
                .credentials(Credentials::new(username.clone(), password.clone()));

                EmailTransport::Smtp(smtp_builder.build())
            }
            crate::config::EmailTransportConfig::File { path } => {
                // File transport for development/testing
                let emails_dir = Path::new(path);
                if !emails_dir.exists() {
                    std::fs::create_dir_all(emails_dir).map_err(|e| Error::Internal {
                        operation: format!("create emails directory: {e}"),
                    })?;
                }
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(emails_dir))
            }
        };

        Ok(Self {
            transport,
            from_email: email_config.from_email.clone(),
            from_name: email_config.from_name.clone(),
            base_url: email_config.base_url.clone(),
        })
    }

    /// Account activation mail sent right after registration. The account
    /// cannot log in until the link is followed.
    pub async fn send_confirmation_email(&self, to_email: &str, username: &str, token: &str) -> Result<(), Error> {
        let confirm_link = format!(
            "{}/confirm-email?email={}&token={}",
            self.base_url,
            urlencode(to_email),
            urlencode(token)
        );

        let subject = "Confirm your email address";
        let body = confirmation_body(username, &confirm_link);

        self.send_email(to_email, Some(username), subject, &body).await
    }

    /// Greeting sent once the email address has been confirmed.
    pub async fn send_welcome_email(&self, to_email: &str, username: &str) -> Result<(), Error> {
        let subject = "Welcome to Ledgerly";
        let body = welcome_body(username);

        self.send_email(to_email, Some(username), subject, &body).await
    }

    pub async fn send_password_reset_email(&self, to_email: &str, username: &str, token: &str) -> Result<(), Error> {
        let reset_link = format!(
            "{}/reset-password?email={}&token={}",
            self.base_url,
            urlencode(to_email),
            urlencode(token)
        );

        let subject = "Password Reset Request";
        let body = password_reset_body(username, &reset_link);

        self.send_email(to_email, Some(username), subject, &body).await
    }

    /// Previous month's totals, sent by the report job at the start of each
    /// month.
    pub async fn send_monthly_report(&self, to_email: &str, username: &str, summary: &MonthlySummary) -> Result<(), Error> {
        let subject = format!("Your {} report", summary.month_label);
        let body = monthly_report_body(username, summary);

        self.send_email(to_email, Some(username), &subject, &body).await
    }

    async fn send_email(&self, to_email: &str, to_name: Option<&str>, subject: &str, body: &str) -> Result<(), Error> {
        let from = format!("{} <{}>", self.from_name, self.from_email)
            .parse::<Mailbox>()
            .map_err(|e| Error::Internal {
                operation: format!("parse from email: {e}"),
            })?;

        let to = if let Some(name) = to_name {
            format!("{name} <{to_email}>")
        } else {
            to_email.to_string()
        }
        .parse::<Mailbox>()
        .map_err(|e| Error::Internal {
            operation: format!("parse to email: {e}"),
        })?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_string())
            .map_err(|e| Error::Internal {
                operation: format!("build email message: {e}"),
            })?;

        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send SMTP email: {e}"),
                })?;
            }
            EmailTransport::File(file) => {
                file.send(message).await.map_err(|e| Error::Internal {
                    operation: format!("send file email: {e}"),
                })?;
            }
        }

        Ok(())
    }
}

/// Percent-encode a value for use in a link's query string.
fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn confirmation_body(username: &str, confirm_link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Confirm your email</title>
</head>
<body>
    <p>Hello {username},</p>

    <p>Thanks for signing up. Confirm your email address to activate your account:</p>

    <p><a href="{confirm_link}">Confirm your email</a></p>

    <p>Or copy and paste this link into your browser:</p>
    <p>{confirm_link}</p>

    <p>If you did not create this account, you can safely ignore this email.</p>
</body>
</html>"#
    )
}

fn welcome_body(username: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Welcome</title>
</head>
<body>
    <p>Hello {username},</p>

    <p>Your email address is confirmed and your account is ready. Log in to
    start tracking your wallets and transfers.</p>
</body>
</html>"#
    )
}

fn password_reset_body(username: &str, reset_link: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Password Reset Request</title>
</head>
<body>
    <p>Hello {username},</p>

    <p>We received a request to reset your password. If you didn't make this request, you can safely ignore this email.</p>

    <p><a href="{reset_link}">Reset your password</a></p>

    <p>Or copy and paste this link into your browser:</p>
    <p>{reset_link}</p>

    <p>This link expires shortly after it was requested.</p>
</body>
</html>"#
    )
}

fn monthly_report_body(username: &str, summary: &MonthlySummary) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Monthly report</title>
</head>
<body>
    <p>Hello {username},</p>

    <p>Here is your summary for {month}:</p>

    <ul>
        <li>Income: {income}</li>
        <li>Expenses: {expense}</li>
        <li>Net: {net}</li>
    </ul>
</body>
</html>"#,
        month = summary.month_label,
        income = crate::dashboard::format_currency(summary.income),
        expense = crate::dashboard::format_currency(summary.expense),
        net = crate::dashboard::format_currency(summary.income - summary.expense),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_config;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_email_service_creation() {
        let config = create_test_config();
        assert!(EmailService::new(&config).is_ok());
    }

    #[test]
    fn test_confirmation_body_contains_link() {
        let body = confirmation_body("alice", "http://localhost/confirm-email?email=a%40b.c&token=t");
        assert!(body.contains("Hello alice,"));
        assert!(body.contains("confirm-email?email=a%40b.c&token=t"));
    }

    #[test]
    fn test_monthly_report_body_formats_amounts() {
        let summary = MonthlySummary {
            month_label: "March 2026".to_string(),
            income: dec!(5000),
            expense: dec!(1200),
        };
        let body = monthly_report_body("bob", &summary);
        assert!(body.contains("March 2026"));
        assert!(body.contains("$5,000"));
        assert!(body.contains("$3,800"));
    }

    #[test]
    fn test_urlencode_escapes_email() {
        assert_eq!(urlencode("a@b.c"), "a%40b.c");
    }
}
