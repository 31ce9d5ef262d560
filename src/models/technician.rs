//! Helpdesk technicians whose monthly case volumes are reported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Technician {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTechnician {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct UpdateTechnician {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_technician_rejects_bad_email() {
        let input = CreateTechnician {
            name: "Ana".to_string(),
            email: Some("not-an-email".to_string()),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn create_technician_without_email_is_valid() {
        let input: CreateTechnician = serde_json::from_str(r#"{"name": "Ana"}"#).unwrap();
        assert!(input.email.is_none());
        assert!(input.validate().is_ok());
    }
}
