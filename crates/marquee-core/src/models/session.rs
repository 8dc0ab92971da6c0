use serde::{Deserialize, Serialize};

/// The signed-in user, as persisted across reloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub email: String,
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl SessionIdentity {
    /// Display name, falling back to the local part of the email.
    pub fn label(&self) -> &str {
        if !self.display_name.trim().is_empty() {
            return &self.display_name;
        }
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
    pub review_count: u32,
    pub watchlist_count: u32,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserSettings {
    pub display_name: Option<String>,
    pub preferred_language: Option<String>,
    pub email_notifications: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_json_shape() {
        let json = r#"{"user_id":3,"email":"a@b.com","display_name":"Ann","is_admin":false}"#;
        let id: SessionIdentity = serde_json::from_str(json).unwrap();
        assert_eq!(id.user_id, Some(3));
        assert_eq!(serde_json::to_string(&id).unwrap(), json);
    }

    #[test]
    fn test_identity_missing_optional_fields() {
        let json = r#"{"email":"a@b.com","display_name":""}"#;
        let id: SessionIdentity = serde_json::from_str(json).unwrap();
        assert_eq!(id.user_id, None);
        assert!(!id.is_admin);
        assert_eq!(id.label(), "a");
    }
}
