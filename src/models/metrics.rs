//! Monthly metric records, one table per dashboard area.
//!
//! Rows are read with related entity names already joined (technician,
//! server, control) so the aggregation layer never sees raw foreign keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Helpdesk volume and satisfaction for one technician in one month.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HelpdeskRecord {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub technician_id: Uuid,
    pub technician_name: String,
    pub total_cases: i32,
    pub cases_glpi: i32,
    pub cases_other_sources: i32,
    /// Mean satisfaction score (0-5) over `total_cases` cases.
    pub satisfaction_average: f64,
    pub time_less_than_4h: i32,
    pub time_4_to_8h: i32,
    pub time_8_to_16h: i32,
    pub time_more_than_16h: i32,
    pub updated_at: DateTime<Utc>,
}

/// Endpoint protection status for one month.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EndpointRecord {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub computers_no_issues: i32,
    pub computers_warning: i32,
    pub computers_critical: i32,
    pub mobile_devices_protected: i32,
    pub mobile_devices_pending: i32,
    pub global_protection_percent: f64,
    pub updated_at: DateTime<Utc>,
}

/// Compliance of one server against one security control in one month.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServerSecurityRecord {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub server_id: Uuid,
    pub server_name: String,
    pub control_id: Uuid,
    pub control_name: String,
    pub status: ComplianceStatus,
    pub compliance_percent: f64,
    pub notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Default)]
#[sqlx(type_name = "compliance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComplianceStatus {
    Compliant,
    #[default]
    Warning,
    Critical,
}

/// Attack and block counts across the four defense vectors for one month.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CyberSecurityRecord {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub attacks_firewall: i32,
    pub attacks_antivirus: i32,
    pub attacks_microsoft365: i32,
    pub attacks_medr_soc: i32,
    pub blocked_firewall: i32,
    pub blocked_antivirus: i32,
    pub blocked_microsoft365: i32,
    pub blocked_medr_soc: i32,
    pub firewall_block_percent: f64,
    pub antivirus_block_percent: f64,
    pub microsoft365_block_percent: f64,
    pub medr_soc_block_percent: f64,
    pub updated_at: DateTime<Utc>,
}

/// Downtime and SLA figures for one month.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TechIncidentRecord {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub unavailability_hours: f64,
    pub available_hours_left: f64,
    pub sla_compliance: f64,
    pub annual_projection: f64,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

// Upsert payloads. Omitted numeric fields default to zero so the
// aggregation layer never sees missing values.

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertHelpdesk {
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    #[validate(range(min = 1, max = 12))]
    pub month: i32,
    pub technician_id: Uuid,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub total_cases: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub cases_glpi: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub cases_other_sources: i32,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0))]
    pub satisfaction_average: f64,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub time_less_than_4h: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub time_4_to_8h: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub time_8_to_16h: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub time_more_than_16h: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertEndpoint {
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    #[validate(range(min = 1, max = 12))]
    pub month: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub computers_no_issues: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub computers_warning: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub computers_critical: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub mobile_devices_protected: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub mobile_devices_pending: i32,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub global_protection_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertServerSecurity {
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    #[validate(range(min = 1, max = 12))]
    pub month: i32,
    pub server_id: Uuid,
    pub control_id: Uuid,
    #[serde(default)]
    pub status: ComplianceStatus,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub compliance_percent: f64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertCyberSecurity {
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    #[validate(range(min = 1, max = 12))]
    pub month: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub attacks_firewall: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub attacks_antivirus: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub attacks_microsoft365: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub attacks_medr_soc: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub blocked_firewall: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub blocked_antivirus: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub blocked_microsoft365: i32,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub blocked_medr_soc: i32,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub firewall_block_percent: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub antivirus_block_percent: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub microsoft365_block_percent: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub medr_soc_block_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpsertTechIncident {
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    #[validate(range(min = 1, max = 12))]
    pub month: i32,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub unavailability_hours: f64,
    #[serde(default)]
    pub available_hours_left: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 100.0))]
    pub sla_compliance: f64,
    #[serde(default)]
    pub annual_projection: f64,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_numeric_fields_default_to_zero() {
        let input: UpsertCyberSecurity =
            serde_json::from_str(r#"{"year": 2024, "month": 3, "attacks_firewall": 12}"#)
                .unwrap();
        assert_eq!(input.attacks_firewall, 12);
        assert_eq!(input.blocked_firewall, 0);
        assert_eq!(input.medr_soc_block_percent, 0.0);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn month_out_of_range_fails_validation() {
        let input: UpsertTechIncident =
            serde_json::from_str(r#"{"year": 2024, "month": 13}"#).unwrap();
        assert!(input.validate().is_err());
    }

    #[test]
    fn satisfaction_above_scale_fails_validation() {
        let input = UpsertHelpdesk {
            year: 2024,
            month: 1,
            technician_id: Uuid::nil(),
            total_cases: 10,
            cases_glpi: 8,
            cases_other_sources: 2,
            satisfaction_average: 5.5,
            time_less_than_4h: 10,
            time_4_to_8h: 0,
            time_8_to_16h: 0,
            time_more_than_16h: 0,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn compliance_status_defaults_to_warning() {
        let input: UpsertServerSecurity = serde_json::from_value(serde_json::json!({
            "year": 2024,
            "month": 5,
            "server_id": Uuid::nil(),
            "control_id": Uuid::nil(),
            "compliance_percent": 75.0
        }))
        .unwrap();
        assert_eq!(input.status, ComplianceStatus::Warning);
    }

    #[test]
    fn compliance_status_serialization() {
        let json = serde_json::to_string(&ComplianceStatus::Compliant).unwrap();
        assert_eq!(json, "\"compliant\"");
    }
}
