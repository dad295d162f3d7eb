//! API credentials.

use serde::{Deserialize, Serialize};

/// Credentials for the OAuth password grant.
///
/// Immutable for the lifetime of a login attempt. The `Debug`
/// implementation redacts the client secret and PIN.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Account number used as the OAuth username.
    #[serde(alias = "account_number")]
    pub username: String,
    /// Online banking PIN.
    pub pin: String,
}

impl Credentials {
    /// Create credentials.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        pin: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            pin: pin.into(),
        }
    }

    /// Names of the fields that are empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("username", &self.username),
            ("pin", &self.pin),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("username", &self.username)
            .field("pin", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret_and_pin() {
        let creds = Credentials::new("client", "top-secret", "12345678", "9876");
        let debug = format!("{creds:?}");
        assert!(debug.contains("client"));
        assert!(debug.contains("12345678"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("top-secret"));
        assert!(!debug.contains("9876"));
    }

    #[test]
    fn missing_fields_reports_blank_values() {
        let creds = Credentials::new("client", " ", "", "1234");
        assert_eq!(creds.missing_fields(), vec!["client_secret", "username"]);
    }

    #[test]
    fn account_number_alias_is_accepted() {
        let json = r#"{"client_id":"a","client_secret":"b","account_number":"c","pin":"d"}"#;
        let creds: Credentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.username, "c");
    }
}
