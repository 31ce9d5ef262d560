//! CSV export of monthly datasets.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::errors::AppError;
use crate::services::metrics::{self, ListOrder};
use crate::services::period::PeriodFilter;

/// Exportable monthly datasets, named as they appear in URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dataset {
    Helpdesk,
    Endpoints,
    ServerSecurity,
    #[serde(rename = "cybersecurity")]
    CyberSecurity,
    TechIncidents,
}

impl Dataset {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Helpdesk => "helpdesk",
            Self::Endpoints => "endpoints",
            Self::ServerSecurity => "server-security",
            Self::CyberSecurity => "cybersecurity",
            Self::TechIncidents => "tech-incidents",
        }
    }

    /// Download file name for a period, e.g. `helpdesk_2024-Q1.csv`.
    pub fn file_name(&self, filter: &PeriodFilter) -> String {
        format!("{}_{}.csv", self.slug(), filter.label().replace('*', "all"))
    }
}

/// Render the dataset rows of `filter`'s window as CSV with a header row.
pub async fn export_csv(
    pool: &PgPool,
    dataset: Dataset,
    filter: &PeriodFilter,
) -> Result<Vec<u8>, AppError> {
    let window = filter.resolve()?;

    let order = ListOrder::Chronological;
    let bytes = match dataset {
        Dataset::Helpdesk => to_csv(&metrics::list_helpdesk(pool, &window, None, order).await?)?,
        Dataset::Endpoints => to_csv(&metrics::list_endpoints(pool, &window, order).await?)?,
        Dataset::ServerSecurity => {
            to_csv(&metrics::list_server_security(pool, &window, None, order).await?)?
        }
        Dataset::CyberSecurity => {
            to_csv(&metrics::list_cyber_security(pool, &window, order).await?)?
        }
        Dataset::TechIncidents => {
            to_csv(&metrics::list_tech_incidents(pool, &window, order).await?)?
        }
    };

    tracing::info!(
        dataset = dataset.slug(),
        period = %filter.label(),
        bytes = bytes.len(),
        "Dataset exported"
    );
    Ok(bytes)
}

/// Serialize rows to CSV. Headers come from the row's field names.
pub fn to_csv<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::Internal(format!("CSV serialization failed: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metrics::{ComplianceStatus, ServerSecurityRecord};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn dataset_parses_from_url_segment() {
        let parsed: Dataset = serde_json::from_str("\"server-security\"").unwrap();
        assert_eq!(parsed, Dataset::ServerSecurity);
        let parsed: Dataset = serde_json::from_str("\"cybersecurity\"").unwrap();
        assert_eq!(parsed, Dataset::CyberSecurity);
        let parsed: Dataset = serde_json::from_str("\"tech-incidents\"").unwrap();
        assert_eq!(parsed, Dataset::TechIncidents);
    }

    #[test]
    fn file_name_includes_period() {
        let filter = PeriodFilter {
            year: Some(2024),
            month: None,
            quarter: Some(1),
        };
        assert_eq!(Dataset::Helpdesk.file_name(&filter), "helpdesk_2024-Q1.csv");
        assert_eq!(
            Dataset::TechIncidents.file_name(&PeriodFilter::default()),
            "tech-incidents_all.csv"
        );
    }

    #[test]
    fn csv_has_header_and_quotes_commas() {
        let rows = vec![ServerSecurityRecord {
            id: Uuid::nil(),
            year: 2024,
            month: 2,
            server_id: Uuid::nil(),
            server_name: "Web, primary".to_string(),
            control_id: Uuid::nil(),
            control_name: "Firewall".to_string(),
            status: ComplianceStatus::Critical,
            compliance_percent: 42.5,
            notes: None,
            updated_at: Utc::now(),
        }];

        let csv = String::from_utf8(to_csv(&rows).unwrap()).unwrap();
        let mut lines = csv.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("id,year,month,server_id,server_name"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Web, primary\""));
        assert!(row.contains(",critical,42.5,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_dataset_produces_empty_output() {
        let rows: Vec<ServerSecurityRecord> = Vec::new();
        assert!(to_csv(&rows).unwrap().is_empty());
    }
}
