//! Servers audited against security controls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Server {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateServer {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateServer {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_server_name_is_invalid() {
        let input = CreateServer {
            name: String::new(),
            description: None,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn partial_update_deserializes() {
        let input: UpdateServer = serde_json::from_str(r#"{"is_active": false}"#).unwrap();
        assert_eq!(input.is_active, Some(false));
        assert!(input.name.is_none());
        assert!(input.validate().is_ok());
    }
}
