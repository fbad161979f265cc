//! Outbound email composition.
//!
//! Builders here only produce recipient/subject/body triples. Delivery is
//! handled by the outbox and the email service.

use chrono::NaiveDate;

/// A composed email waiting to be enqueued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    fn new(recipient: &str, subject: &str, body: String) -> Self {
        Self {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body,
        }
    }

    /// Operator alert for a newly submitted movie request.
    pub fn movie_request_submitted(
        operator: &str,
        requester_email: &str,
        title: &str,
        message: Option<&str>,
    ) -> Self {
        let body = format!(
            "User {} requested: {}\nMessage: {}",
            requester_email,
            title,
            message.unwrap_or("(none)")
        );
        Self::new(operator, "New Movie Request", body)
    }

    /// Operator alert for a new registration.
    pub fn member_signup(operator: &str, email: &str, full_name: &str) -> Self {
        let body = format!("New member signed up.\nName: {}\nEmail: {}", full_name, email);
        Self::new(operator, "New Member Signup", body)
    }

    /// Operator alert when a member asks for their account to be removed.
    pub fn deletion_requested(operator: &str, email: &str) -> Self {
        let body = format!(
            "User {} requested account deletion. The account is now pending deletion.",
            email
        );
        Self::new(operator, "Account Deletion Request", body)
    }

    /// Confirmation sent to the member when a subscription starts.
    pub fn subscription_activated(
        email: &str,
        plan: &str,
        start: NaiveDate,
        expiry: NaiveDate,
    ) -> Self {
        let body = format!(
            "Your {} subscription is now active.\nStart: {}\nExpires: {}\n\nThank you for subscribing!",
            plan, start, expiry
        );
        Self::new(email, "Subscription Activated", body)
    }

    /// Operator alert for a self-service purchase.
    pub fn subscription_purchased(
        operator: &str,
        email: &str,
        plan: &str,
        months: u32,
        expiry: NaiveDate,
    ) -> Self {
        let body = format!(
            "User {} subscribed to {} for {} month(s). Expires: {}",
            email, plan, months, expiry
        );
        Self::new(operator, "New Subscription", body)
    }

    /// Renewal reminder ahead of expiry.
    pub fn subscription_expiring(email: &str, plan: &str, expiry: NaiveDate) -> Self {
        let body = format!(
            "Your {} subscription expires on {}. Renew to keep access.",
            plan, expiry
        );
        Self::new(email, "Subscription Expiring Soon", body)
    }

    /// Password reset link, valid for `valid_minutes`.
    pub fn password_reset(email: &str, reset_link: &str, valid_minutes: i64) -> Self {
        let body = format!(
            "Click to reset your password: {}\nThis link expires in {} minutes.",
            reset_link, valid_minutes
        );
        Self::new(email, "Reset your password", body)
    }

    /// One-time login code, valid for `valid_minutes`.
    pub fn login_code(email: &str, code: &str, valid_minutes: i64) -> Self {
        let body = format!(
            "Your one-time login code is: {}\nThis code expires in {} minutes.",
            code, valid_minutes
        );
        Self::new(email, "Your login code", body)
    }

    /// Notice sent when the sweep deactivates a lapsed subscription.
    pub fn subscription_expired(email: &str, plan: &str, expiry: NaiveDate) -> Self {
        let body = format!(
            "Your {} subscription has expired on {}. Renew at the platform to restore access.",
            plan, expiry
        );
        Self::new(email, "Subscription Expired", body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_request_submitted() {
        let n = Notification::movie_request_submitted(
            "ops@example.com",
            "fan@example.com",
            "Solaris",
            Some("the 1972 one"),
        );
        assert_eq!(n.recipient, "ops@example.com");
        assert_eq!(n.subject, "New Movie Request");
        assert_eq!(n.body, "User fan@example.com requested: Solaris\nMessage: the 1972 one");
    }

    #[test]
    fn test_movie_request_without_message() {
        let n = Notification::movie_request_submitted("ops@example.com", "a@b.c", "Ran", None);
        assert!(n.body.ends_with("Message: (none)"));
    }

    #[test]
    fn test_subscription_emails_include_dates() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let expiry = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();

        let activated = Notification::subscription_activated("m@x.io", "Basic", start, expiry);
        assert_eq!(activated.recipient, "m@x.io");
        assert!(activated.body.contains("Start: 2026-01-10"));
        assert!(activated.body.contains("Expires: 2026-04-10"));

        let purchased =
            Notification::subscription_purchased("ops@x.io", "m@x.io", "Basic", 3, expiry);
        assert_eq!(
            purchased.body,
            "User m@x.io subscribed to Basic for 3 month(s). Expires: 2026-04-10"
        );
    }

    #[test]
    fn test_sweep_emails() {
        let expiry = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        assert_eq!(
            Notification::subscription_expiring("m@x.io", "Basic", expiry).subject,
            "Subscription Expiring Soon"
        );
        let expired = Notification::subscription_expired("m@x.io", "Basic", expiry);
        assert_eq!(expired.subject, "Subscription Expired");
        assert!(expired.body.contains("2026-06-01"));
    }

    #[test]
    fn test_account_recovery_emails() {
        let reset = Notification::password_reset(
            "m@x.io",
            "http://localhost:5173/reset-password?token=abc",
            60,
        );
        assert_eq!(reset.recipient, "m@x.io");
        assert_eq!(reset.subject, "Reset your password");
        assert!(reset.body.contains("reset-password?token=abc"));
        assert!(reset.body.ends_with("expires in 60 minutes."));

        let code = Notification::login_code("m@x.io", "042917", 5);
        assert_eq!(code.subject, "Your login code");
        assert!(code.body.contains("042917"));
    }

    #[test]
    fn test_operator_alerts() {
        let signup = Notification::member_signup("ops@x.io", "new@x.io", "New Member");
        assert_eq!(signup.subject, "New Member Signup");
        assert!(signup.body.contains("new@x.io"));

        let deletion = Notification::deletion_requested("ops@x.io", "gone@x.io");
        assert_eq!(deletion.recipient, "ops@x.io");
        assert!(deletion.body.contains("gone@x.io"));
    }
}
