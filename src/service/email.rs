use crate::config::EmailConfig;
use crate::error::app_error::AppError;
use lettre::message::header::ContentType;
use lettre::message::{MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Sends the reset link. `valid_minutes` is printed in the message so recipients know the deadline.
    pub async fn send_password_reset_email(&self, to_email: &str, to_name: &str, reset_token: &str, reset_url: &str, valid_minutes: i64) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::warn!(to = %to_email, "email delivery disabled, skipping password reset email");
            return Ok(());
        }

        let reset_link = reset_link(reset_url, reset_token);
        let html_body = render_reset_html(to_name, &reset_link, valid_minutes);
        let text_body = render_reset_text(to_name, &reset_link, valid_minutes);

        self.send_email(to_email, "Reset your Interview Gate password", &html_body, &text_body).await
    }

    async fn send_email(&self, to_email: &str, subject: &str, html_body: &str, text_body: &str) -> Result<(), AppError> {
        let email = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_address)
                    .parse()
                    .map_err(|e| AppError::email(format!("Invalid from address: {}", e)))?,
            )
            .to(to_email.parse().map_err(|e| AppError::email(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_PLAIN).body(text_body.to_string()))
                    .singlepart(SinglePart::builder().header(ContentType::TEXT_HTML).body(html_body.to_string())),
            )
            .map_err(|e| AppError::email(format!("Failed to build email: {}", e)))?;

        let creds = Credentials::new(self.config.smtp_username.clone(), self.config.smtp_password.clone());

        let mailer = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::email(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build();

        // SmtpTransport is blocking.
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::email(format!("Failed to spawn email sending task: {}", e)))?;

        result.map_err(|e| AppError::email(format!("Failed to send email: {}", e)))?;

        tracing::info!(to = %to_email, "password reset email sent");
        Ok(())
    }
}

fn reset_link(reset_url: &str, reset_token: &str) -> String {
    let separator = if reset_url.contains('?') { '&' } else { '?' };
    format!("{}{}token={}", reset_url, separator, reset_token)
}

fn render_reset_html(to_name: &str, reset_link: &str, valid_minutes: i64) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Reset your Interview Gate password</title>
</head>
<body style="margin:0;padding:24px;background-color:#F5F6F8;font-family:-apple-system,'Segoe UI',Roboto,Arial,sans-serif;color:#1B1D21;">
    <table role="presentation" width="100%" cellspacing="0" cellpadding="0" border="0">
      <tr>
        <td align="center">
          <table role="presentation" width="560" cellspacing="0" cellpadding="0" border="0" style="background-color:#FFFFFF;border-radius:12px;padding:28px;">
            <tr>
              <td>
                <h1 style="margin:0 0 16px;font-size:24px;">Reset your password</h1>
                <p style="margin:0 0 12px;">Hi {name},</p>
                <p style="margin:0 0 20px;">Someone asked to reset the password of your Interview Gate account. Use the button below to choose a new one.</p>
                <p style="margin:0 0 20px;"><a href="{link}" style="display:inline-block;background-color:#2F6FEB;color:#FFFFFF;text-decoration:none;font-weight:600;padding:12px 20px;border-radius:8px;">Choose a new password</a></p>
                <p style="margin:0 0 20px;color:#5A5F69;font-size:13px;">The link expires in {minutes} minutes and can be used once.</p>
                <p style="margin:0 0 8px;font-size:13px;">If the button does not work, paste this URL into your browser:</p>
                <p style="margin:0 0 20px;font-size:12px;word-break:break-all;color:#5A5F69;">{link}</p>
                <p style="margin:0;font-size:12px;color:#5A5F69;">If you did not request this, ignore this message. Your current password stays active.</p>
              </td>
            </tr>
          </table>
        </td>
      </tr>
    </table>
</body>
</html>
"##,
        name = to_name,
        link = reset_link,
        minutes = valid_minutes
    )
}

fn render_reset_text(to_name: &str, reset_link: &str, valid_minutes: i64) -> String {
    format!(
        r#"Interview Gate | Password reset

Hi {name},

Someone asked to reset the password of your Interview Gate account.
Choose a new password with the link below:
{link}

The link expires in {minutes} minutes and can be used once.

If you did not request this, ignore this message. Your current password stays active.
"#,
        name = to_name,
        link = reset_link,
        minutes = valid_minutes
    )
}
