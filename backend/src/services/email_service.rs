//! SMTP delivery of verification and password-reset links.
//!
//! Built only when every SMTP setting is configured; otherwise `main` falls
//! back to `LogNotifier`.

use crate::config::EmailConfig;
use crate::errors::{ServiceError, ServiceResult};
use crate::services::notifier::Notifier;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::str::FromStr;

pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new EmailService instance
    pub fn new(config: EmailConfig) -> ServiceResult<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| ServiceError::validation(format!("Invalid SMTP host: {e}")))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, config })
    }

    /// Sends a generic email
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> ServiceResult<()> {
        let from_mailbox = Mailbox::from_str(&format!(
            "{} <{}>",
            self.config.from_name, self.config.from_email
        ))
        .map_err(|e| ServiceError::validation(format!("Invalid from email: {e}")))?;

        let to_mailbox = Mailbox::from_str(to_email)
            .map_err(|e| ServiceError::validation(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_content.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_content.to_string()),
                    ),
            )
            .map_err(|e| ServiceError::validation(format!("Failed to build email: {e}")))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| ServiceError::external_service(format!("Failed to send email: {e}")))?;

        Ok(())
    }

    fn verification_url(&self, token: &str) -> String {
        format!("{}/req/signup/verify?token={}", self.config.base_url, token)
    }

    fn reset_url(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.config.base_url, token)
    }
}

#[async_trait]
impl Notifier for EmailService {
    async fn send_verification_email(&self, email: &str, token: &str) -> ServiceResult<()> {
        let url = self.verification_url(token);
        let message = EmailMessage::verification(&url);
        self.send_email(email, message.subject, &message.html, &message.text)
            .await
    }

    async fn send_forgot_password_email(&self, email: &str, token: &str) -> ServiceResult<()> {
        let url = self.reset_url(token);
        let message = EmailMessage::password_reset(&url);
        self.send_email(email, message.subject, &message.html, &message.text)
            .await
    }
}

/// Rendered subject and bodies of an outbound message.
struct EmailMessage {
    subject: &'static str,
    html: String,
    text: String,
}

impl EmailMessage {
    fn verification(url: &str) -> Self {
        Self {
            subject: "Verify your email address",
            html: build_html(
                "Confirm your email",
                "Thanks for signing up! Click the button below to verify your email address:",
                "Verify Email",
                url,
                "This link will expire shortly. If you didn't create an account, you can safely ignore this email.",
            ),
            text: format!(
                r#"Confirm your email

Thanks for signing up! Open the link below to verify your email address:
{}

This link will expire shortly. If you didn't create an account, you can safely ignore this email.
"#,
                url
            ),
        }
    }

    fn password_reset(url: &str) -> Self {
        Self {
            subject: "Reset your password",
            html: build_html(
                "Password reset requested",
                "We received a request to reset your password. Click the button below to choose a new one:",
                "Reset Password",
                url,
                "This link will expire shortly. If you didn't request a reset, you can safely ignore this email.",
            ),
            text: format!(
                r#"Password reset requested

We received a request to reset your password. Open the link below to choose a new one:
{}

This link will expire shortly. If you didn't request a reset, you can safely ignore this email.
"#,
                url
            ),
        }
    }
}

fn build_html(heading: &str, intro: &str, button: &str, url: &str, footer: &str) -> String {
    format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <meta charset="UTF-8">
            <title>{heading}</title>
        </head>
        <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
            <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                <h2 style="color: #2c3e50;">{heading}</h2>

                <p>{intro}</p>

                <div style="text-align: center; margin: 30px 0;">
                    <a href="{url}"
                       style="background-color: #3498db; color: white; padding: 12px 30px;
                              text-decoration: none; border-radius: 5px; display: inline-block;">
                        {button}
                    </a>
                </div>

                <p>Or copy and paste this link into your browser:</p>
                <p style="word-break: break-all; color: #7f8c8d;">{url}</p>

                <hr style="border: none; border-top: 1px solid #ecf0f1; margin: 30px 0;">

                <p style="font-size: 12px; color: #7f8c8d;">{footer}</p>
            </div>
        </body>
        </html>
        "#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: "secret".to_string(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Storefront".to_string(),
            base_url: "https://shop.example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn links_point_at_the_frontend() {
        let service = EmailService::new(config()).unwrap();
        assert_eq!(
            service.verification_url("abc"),
            "https://shop.example.com/req/signup/verify?token=abc"
        );
        assert_eq!(
            service.reset_url("abc"),
            "https://shop.example.com/reset-password?token=abc"
        );
    }

    #[test]
    fn messages_embed_the_link_in_both_bodies() {
        let url = "https://shop.example.com/reset-password?token=abc";
        let message = EmailMessage::password_reset(url);
        assert_eq!(message.subject, "Reset your password");
        assert!(message.text.contains(url));
        assert_eq!(message.html.matches(url).count(), 2);

        let message = EmailMessage::verification(url);
        assert_eq!(message.subject, "Verify your email address");
        assert!(message.text.contains(url));
    }
}
