use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::Config;

/// Blocking SMTP send; callers run this on a blocking task.
pub fn send_email(
    config: &Config,
    to_email: &str,
    subject: &str,
    html_body: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if to_email.is_empty() {
        return Err("Email recipient cannot be empty".into());
    }
    if !to_email.contains('@') {
        return Err(format!("Invalid email address: {}", to_email).into());
    }

    let email = Message::builder()
        .from(config.mail_from.parse()?)
        .to(to_email.parse()?)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(html_body.to_string())?;

    let credentials = Credentials::new(
        config.smtp_username.clone(),
        config.smtp_password.clone(),
    );

    let mailer = SmtpTransport::relay(&config.smtp_host)?
        .credentials(credentials)
        .build();

    mailer.send(&email)?;

    tracing::info!("✓ Email sent successfully to {}", to_email);

    Ok(())
}
