//! Monthly metric datasets: period-filtered listing and per-bucket upserts.
//!
//! Listings are ordered by `(year, month)`. Aggregation reads them
//! chronologically so the last value of a period (tech incidents) is stable;
//! the HTTP listings show the newest month first.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::metrics::{
    CyberSecurityRecord, EndpointRecord, HelpdeskRecord, ServerSecurityRecord,
    TechIncidentRecord, UpsertCyberSecurity, UpsertEndpoint, UpsertHelpdesk,
    UpsertServerSecurity, UpsertTechIncident,
};
use crate::services::period::PeriodWindow;

/// Optional entity filters on top of the period window.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricFilters {
    pub technician_id: Option<Uuid>,
    pub server_id: Option<Uuid>,
}

/// Direction of the `(year, month)` ordering of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    Chronological,
    NewestFirst,
}

impl ListOrder {
    fn sql(self) -> &'static str {
        match self {
            Self::Chronological => "ASC",
            Self::NewestFirst => "DESC",
        }
    }
}

const HELPDESK_COLUMNS: &str = r#"
    h.id, h.year, h.month, h.technician_id, t.name AS technician_name,
    h.total_cases, h.cases_glpi, h.cases_other_sources, h.satisfaction_average,
    h.time_less_than_4h, h.time_4_to_8h, h.time_8_to_16h, h.time_more_than_16h,
    h.updated_at
"#;

const SERVER_SECURITY_COLUMNS: &str = r#"
    ss.id, ss.year, ss.month, ss.server_id, s.name AS server_name,
    ss.control_id, c.name AS control_name, ss.status, ss.compliance_percent,
    ss.notes, ss.updated_at
"#;

/// List helpdesk records in the window, optionally for a single technician.
pub async fn list_helpdesk(
    pool: &PgPool,
    window: &PeriodWindow,
    technician_id: Option<Uuid>,
    order: ListOrder,
) -> Result<Vec<HelpdeskRecord>, AppError> {
    let dir = order.sql();
    let sql = format!(
        r#"
        SELECT {HELPDESK_COLUMNS}
        FROM helpdesk_cases h
        INNER JOIN technicians t ON t.id = h.technician_id
        WHERE ($1::INT IS NULL OR h.year = $1)
          AND ($2::INT[] IS NULL OR h.month = ANY($2))
          AND ($3::UUID IS NULL OR h.technician_id = $3)
        ORDER BY h.year {dir}, h.month {dir}, t.name ASC
        "#
    );

    let rows = sqlx::query_as::<_, HelpdeskRecord>(&sql)
        .bind(window.year)
        .bind(window.months.as_deref())
        .bind(technician_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// List endpoint protection records in the window.
pub async fn list_endpoints(
    pool: &PgPool,
    window: &PeriodWindow,
    order: ListOrder,
) -> Result<Vec<EndpointRecord>, AppError> {
    let dir = order.sql();
    let sql = format!(
        r#"
        SELECT id, year, month, computers_no_issues, computers_warning, computers_critical,
               mobile_devices_protected, mobile_devices_pending, global_protection_percent,
               updated_at
        FROM endpoint_protection
        WHERE ($1::INT IS NULL OR year = $1)
          AND ($2::INT[] IS NULL OR month = ANY($2))
        ORDER BY year {dir}, month {dir}
        "#
    );

    let rows = sqlx::query_as::<_, EndpointRecord>(&sql)
        .bind(window.year)
        .bind(window.months.as_deref())
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// List server × control compliance records in the window, optionally for one server.
pub async fn list_server_security(
    pool: &PgPool,
    window: &PeriodWindow,
    server_id: Option<Uuid>,
    order: ListOrder,
) -> Result<Vec<ServerSecurityRecord>, AppError> {
    let dir = order.sql();
    let sql = format!(
        r#"
        SELECT {SERVER_SECURITY_COLUMNS}
        FROM server_security ss
        INNER JOIN servers s ON s.id = ss.server_id
        INNER JOIN security_controls c ON c.id = ss.control_id
        WHERE ($1::INT IS NULL OR ss.year = $1)
          AND ($2::INT[] IS NULL OR ss.month = ANY($2))
          AND ($3::UUID IS NULL OR ss.server_id = $3)
        ORDER BY ss.year {dir}, ss.month {dir}, s.name ASC, c.name ASC
        "#
    );

    let rows = sqlx::query_as::<_, ServerSecurityRecord>(&sql)
        .bind(window.year)
        .bind(window.months.as_deref())
        .bind(server_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// List cybersecurity records in the window.
pub async fn list_cyber_security(
    pool: &PgPool,
    window: &PeriodWindow,
    order: ListOrder,
) -> Result<Vec<CyberSecurityRecord>, AppError> {
    let dir = order.sql();
    let sql = format!(
        r#"
        SELECT id, year, month,
               attacks_firewall, attacks_antivirus, attacks_microsoft365, attacks_medr_soc,
               blocked_firewall, blocked_antivirus, blocked_microsoft365, blocked_medr_soc,
               firewall_block_percent, antivirus_block_percent, microsoft365_block_percent,
               medr_soc_block_percent, updated_at
        FROM cyber_security
        WHERE ($1::INT IS NULL OR year = $1)
          AND ($2::INT[] IS NULL OR month = ANY($2))
        ORDER BY year {dir}, month {dir}
        "#
    );

    let rows = sqlx::query_as::<_, CyberSecurityRecord>(&sql)
        .bind(window.year)
        .bind(window.months.as_deref())
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// List tech incident records in the window.
pub async fn list_tech_incidents(
    pool: &PgPool,
    window: &PeriodWindow,
    order: ListOrder,
) -> Result<Vec<TechIncidentRecord>, AppError> {
    let dir = order.sql();
    let sql = format!(
        r#"
        SELECT id, year, month, unavailability_hours, available_hours_left,
               sla_compliance, annual_projection, description, updated_at
        FROM tech_incidents
        WHERE ($1::INT IS NULL OR year = $1)
          AND ($2::INT[] IS NULL OR month = ANY($2))
        ORDER BY year {dir}, month {dir}
        "#
    );

    let rows = sqlx::query_as::<_, TechIncidentRecord>(&sql)
        .bind(window.year)
        .bind(window.months.as_deref())
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert or replace the helpdesk record of one technician for one month.
pub async fn upsert_helpdesk(
    pool: &PgPool,
    input: &UpsertHelpdesk,
) -> Result<HelpdeskRecord, AppError> {
    input.validate()?;

    let sql = format!(
        r#"
        WITH h AS (
            INSERT INTO helpdesk_cases (year, month, technician_id, total_cases, cases_glpi,
                cases_other_sources, satisfaction_average, time_less_than_4h, time_4_to_8h,
                time_8_to_16h, time_more_than_16h)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (year, month, technician_id) DO UPDATE SET
                total_cases = EXCLUDED.total_cases,
                cases_glpi = EXCLUDED.cases_glpi,
                cases_other_sources = EXCLUDED.cases_other_sources,
                satisfaction_average = EXCLUDED.satisfaction_average,
                time_less_than_4h = EXCLUDED.time_less_than_4h,
                time_4_to_8h = EXCLUDED.time_4_to_8h,
                time_8_to_16h = EXCLUDED.time_8_to_16h,
                time_more_than_16h = EXCLUDED.time_more_than_16h,
                updated_at = NOW()
            RETURNING *
        )
        SELECT {HELPDESK_COLUMNS}
        FROM h
        INNER JOIN technicians t ON t.id = h.technician_id
        "#
    );

    let record = sqlx::query_as::<_, HelpdeskRecord>(&sql)
        .bind(input.year)
        .bind(input.month)
        .bind(input.technician_id)
        .bind(input.total_cases)
        .bind(input.cases_glpi)
        .bind(input.cases_other_sources)
        .bind(input.satisfaction_average)
        .bind(input.time_less_than_4h)
        .bind(input.time_4_to_8h)
        .bind(input.time_8_to_16h)
        .bind(input.time_more_than_16h)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::from_foreign_key_violation(e, "Unknown technician"))?;

    tracing::info!(
        year = record.year,
        month = record.month,
        technician = %record.technician_name,
        total_cases = record.total_cases,
        "Helpdesk record saved"
    );
    Ok(record)
}

/// Insert or replace the endpoint protection record of one month.
pub async fn upsert_endpoint(
    pool: &PgPool,
    input: &UpsertEndpoint,
) -> Result<EndpointRecord, AppError> {
    input.validate()?;

    let record = sqlx::query_as::<_, EndpointRecord>(
        r#"
        INSERT INTO endpoint_protection (year, month, computers_no_issues, computers_warning,
            computers_critical, mobile_devices_protected, mobile_devices_pending,
            global_protection_percent)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (year, month) DO UPDATE SET
            computers_no_issues = EXCLUDED.computers_no_issues,
            computers_warning = EXCLUDED.computers_warning,
            computers_critical = EXCLUDED.computers_critical,
            mobile_devices_protected = EXCLUDED.mobile_devices_protected,
            mobile_devices_pending = EXCLUDED.mobile_devices_pending,
            global_protection_percent = EXCLUDED.global_protection_percent,
            updated_at = NOW()
        RETURNING id, year, month, computers_no_issues, computers_warning, computers_critical,
                  mobile_devices_protected, mobile_devices_pending, global_protection_percent,
                  updated_at
        "#,
    )
    .bind(input.year)
    .bind(input.month)
    .bind(input.computers_no_issues)
    .bind(input.computers_warning)
    .bind(input.computers_critical)
    .bind(input.mobile_devices_protected)
    .bind(input.mobile_devices_pending)
    .bind(input.global_protection_percent)
    .fetch_one(pool)
    .await?;

    tracing::info!(year = record.year, month = record.month, "Endpoint record saved");
    Ok(record)
}

/// Insert or replace the compliance record of one server × control for one month.
pub async fn upsert_server_security(
    pool: &PgPool,
    input: &UpsertServerSecurity,
) -> Result<ServerSecurityRecord, AppError> {
    input.validate()?;

    let sql = format!(
        r#"
        WITH ss AS (
            INSERT INTO server_security (year, month, server_id, control_id, status,
                compliance_percent, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (year, month, server_id, control_id) DO UPDATE SET
                status = EXCLUDED.status,
                compliance_percent = EXCLUDED.compliance_percent,
                notes = EXCLUDED.notes,
                updated_at = NOW()
            RETURNING *
        )
        SELECT {SERVER_SECURITY_COLUMNS}
        FROM ss
        INNER JOIN servers s ON s.id = ss.server_id
        INNER JOIN security_controls c ON c.id = ss.control_id
        "#
    );

    let record = sqlx::query_as::<_, ServerSecurityRecord>(&sql)
        .bind(input.year)
        .bind(input.month)
        .bind(input.server_id)
        .bind(input.control_id)
        .bind(input.status)
        .bind(input.compliance_percent)
        .bind(&input.notes)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::from_foreign_key_violation(e, "Unknown server or control"))?;

    tracing::info!(
        year = record.year,
        month = record.month,
        server = %record.server_name,
        control = %record.control_name,
        compliance = record.compliance_percent,
        "Server security record saved"
    );
    Ok(record)
}

/// Insert or replace the cybersecurity record of one month.
pub async fn upsert_cyber_security(
    pool: &PgPool,
    input: &UpsertCyberSecurity,
) -> Result<CyberSecurityRecord, AppError> {
    input.validate()?;

    let record = sqlx::query_as::<_, CyberSecurityRecord>(
        r#"
        INSERT INTO cyber_security (year, month,
            attacks_firewall, attacks_antivirus, attacks_microsoft365, attacks_medr_soc,
            blocked_firewall, blocked_antivirus, blocked_microsoft365, blocked_medr_soc,
            firewall_block_percent, antivirus_block_percent, microsoft365_block_percent,
            medr_soc_block_percent)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (year, month) DO UPDATE SET
            attacks_firewall = EXCLUDED.attacks_firewall,
            attacks_antivirus = EXCLUDED.attacks_antivirus,
            attacks_microsoft365 = EXCLUDED.attacks_microsoft365,
            attacks_medr_soc = EXCLUDED.attacks_medr_soc,
            blocked_firewall = EXCLUDED.blocked_firewall,
            blocked_antivirus = EXCLUDED.blocked_antivirus,
            blocked_microsoft365 = EXCLUDED.blocked_microsoft365,
            blocked_medr_soc = EXCLUDED.blocked_medr_soc,
            firewall_block_percent = EXCLUDED.firewall_block_percent,
            antivirus_block_percent = EXCLUDED.antivirus_block_percent,
            microsoft365_block_percent = EXCLUDED.microsoft365_block_percent,
            medr_soc_block_percent = EXCLUDED.medr_soc_block_percent,
            updated_at = NOW()
        RETURNING id, year, month,
            attacks_firewall, attacks_antivirus, attacks_microsoft365, attacks_medr_soc,
            blocked_firewall, blocked_antivirus, blocked_microsoft365, blocked_medr_soc,
            firewall_block_percent, antivirus_block_percent, microsoft365_block_percent,
            medr_soc_block_percent, updated_at
        "#,
    )
    .bind(input.year)
    .bind(input.month)
    .bind(input.attacks_firewall)
    .bind(input.attacks_antivirus)
    .bind(input.attacks_microsoft365)
    .bind(input.attacks_medr_soc)
    .bind(input.blocked_firewall)
    .bind(input.blocked_antivirus)
    .bind(input.blocked_microsoft365)
    .bind(input.blocked_medr_soc)
    .bind(input.firewall_block_percent)
    .bind(input.antivirus_block_percent)
    .bind(input.microsoft365_block_percent)
    .bind(input.medr_soc_block_percent)
    .fetch_one(pool)
    .await?;

    tracing::info!(year = record.year, month = record.month, "Cybersecurity record saved");
    Ok(record)
}

/// Insert or replace the tech incident record of one month.
pub async fn upsert_tech_incident(
    pool: &PgPool,
    input: &UpsertTechIncident,
) -> Result<TechIncidentRecord, AppError> {
    input.validate()?;

    let record = sqlx::query_as::<_, TechIncidentRecord>(
        r#"
        INSERT INTO tech_incidents (year, month, unavailability_hours, available_hours_left,
            sla_compliance, annual_projection, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (year, month) DO UPDATE SET
            unavailability_hours = EXCLUDED.unavailability_hours,
            available_hours_left = EXCLUDED.available_hours_left,
            sla_compliance = EXCLUDED.sla_compliance,
            annual_projection = EXCLUDED.annual_projection,
            description = EXCLUDED.description,
            updated_at = NOW()
        RETURNING id, year, month, unavailability_hours, available_hours_left,
                  sla_compliance, annual_projection, description, updated_at
        "#,
    )
    .bind(input.year)
    .bind(input.month)
    .bind(input.unavailability_hours)
    .bind(input.available_hours_left)
    .bind(input.sla_compliance)
    .bind(input.annual_projection)
    .bind(&input.description)
    .fetch_one(pool)
    .await?;

    tracing::info!(year = record.year, month = record.month, "Tech incident record saved");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_order_directions() {
        assert_eq!(ListOrder::Chronological.sql(), "ASC");
        assert_eq!(ListOrder::NewestFirst.sql(), "DESC");
    }
}
