use tracing::info;

/// Delivers password reset codes.
pub trait Mailer: Send + Sync {
    fn send_reset_code(&self, email: &str, code: &str) -> anyhow::Result<()>;
}

/// Writes the code to the log instead of sending mail.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_reset_code(&self, email: &str, code: &str) -> anyhow::Result<()> {
        info!("Password reset code for {}: {}", email, code);
        Ok(())
    }
}
