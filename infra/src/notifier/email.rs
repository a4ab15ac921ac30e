//! Verification email template

use chrono::Duration;

/// Rendered verification email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationEmail {
    pub subject: String,
    pub body: String,
}

impl VerificationEmail {
    /// Render the email for `code`, valid for `valid_for`
    pub fn render(subject: &str, code: &str, valid_for: Duration) -> Self {
        // Round up: 90 seconds reads as 2 minutes
        let minutes = ((valid_for.num_seconds() + 59) / 60).max(1);
        let unit = if minutes == 1 { "minute" } else { "minutes" };

        let body = format!(
            "Your verification code is: {code}\n\n\
             This code expires in {minutes} {unit}. \
             If you did not request it, you can ignore this email."
        );

        Self {
            subject: subject.to_string(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_code_and_validity() {
        let email = VerificationEmail::render("Verification Code", "482913", Duration::minutes(5));

        assert_eq!(email.subject, "Verification Code");
        assert!(email.body.contains("482913"));
        assert!(email.body.contains("5 minutes"));
    }

    #[test]
    fn test_validity_rounds_up() {
        let email = VerificationEmail::render("s", "1", Duration::seconds(90));
        assert!(email.body.contains("2 minutes"));

        let email = VerificationEmail::render("s", "1", Duration::seconds(30));
        assert!(email.body.contains("1 minute."));
    }
}
