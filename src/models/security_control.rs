//! Security controls (antivirus, firewall, patching, ...) checked on every server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SecurityControl {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSecurityControl {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateSecurityControl {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_required() {
        let result: Result<CreateSecurityControl, _> =
            serde_json::from_str(r#"{"name": "Firewall"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn blank_category_is_invalid() {
        let input = CreateSecurityControl {
            name: "Backup".to_string(),
            description: None,
            category: String::new(),
        };
        assert!(input.validate().is_err());
    }
}
