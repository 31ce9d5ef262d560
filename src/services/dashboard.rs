//! Dashboard statistics: fetch the period's monthly records and aggregate them.

use serde::Serialize;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::services::aggregation::{self, AggregationOptions, DashboardStats, MonthlyRecords};
use crate::services::metrics::{self, ListOrder};
use crate::services::period::PeriodFilter;
use crate::services::registry;
use crate::services::trend::{calculate_trend, Trend};

/// Current period stats side by side with the preceding period.
#[derive(Debug, Serialize)]
pub struct DashboardComparison {
    pub period: String,
    pub previous_period: String,
    pub current: DashboardStats,
    pub previous: DashboardStats,
    pub trends: HeadlineTrends,
}

/// Period-over-period trends for the headline metric cards.
#[derive(Debug, Serialize)]
pub struct HeadlineTrends {
    pub total_cases: Trend,
    pub average_satisfaction: Trend,
    pub global_protection_percent: Trend,
    pub overall_compliance: Trend,
    pub total_attacks: Trend,
    pub overall_block_percent: Trend,
    pub total_unavailability_hours: Trend,
}

/// Fetch the five record collections for `filter` in parallel and aggregate them.
pub async fn get_stats(
    pool: &PgPool,
    filter: &PeriodFilter,
    options: AggregationOptions,
) -> Result<DashboardStats, AppError> {
    let window = filter.resolve()?;
    let order = ListOrder::Chronological;

    let (helpdesk, endpoints, server_security, cyber_security, tech_incidents, totals) =
        tokio::try_join!(
            metrics::list_helpdesk(pool, &window, None, order),
            metrics::list_endpoints(pool, &window, order),
            metrics::list_server_security(pool, &window, None, order),
            metrics::list_cyber_security(pool, &window, order),
            metrics::list_tech_incidents(pool, &window, order),
            registry::count_active(pool),
        )?;

    tracing::debug!(
        period = %filter.label(),
        helpdesk = helpdesk.len(),
        endpoints = endpoints.len(),
        server_security = server_security.len(),
        cyber_security = cyber_security.len(),
        tech_incidents = tech_incidents.len(),
        "Aggregating dashboard statistics"
    );

    let records = MonthlyRecords {
        helpdesk: &helpdesk,
        endpoints: &endpoints,
        server_security: &server_security,
        cyber_security: &cyber_security,
        tech_incidents: &tech_incidents,
    };
    Ok(aggregation::aggregate_with(&records, totals, options))
}

/// Compare `filter` with the period immediately before it. Requires a year.
pub async fn compare(
    pool: &PgPool,
    filter: &PeriodFilter,
    options: AggregationOptions,
) -> Result<DashboardComparison, AppError> {
    filter.resolve()?;
    let previous_filter = filter.previous().ok_or_else(|| {
        AppError::Validation(
            "a comparison needs a year whose previous period is in range".to_string(),
        )
    })?;

    let (current, previous) = tokio::try_join!(
        get_stats(pool, filter, options),
        get_stats(pool, &previous_filter, options),
    )?;

    let trends = headline_trends(&current, &previous);
    Ok(DashboardComparison {
        period: filter.label(),
        previous_period: previous_filter.label(),
        current,
        previous,
        trends,
    })
}

/// Trends of the headline metrics between two snapshots.
pub fn headline_trends(current: &DashboardStats, previous: &DashboardStats) -> HeadlineTrends {
    HeadlineTrends {
        total_cases: calculate_trend(
            current.helpdesk.total_cases as f64,
            previous.helpdesk.total_cases as f64,
        ),
        average_satisfaction: calculate_trend(
            current.helpdesk.average_satisfaction,
            previous.helpdesk.average_satisfaction,
        ),
        global_protection_percent: calculate_trend(
            current.endpoints.global_protection_percent,
            previous.endpoints.global_protection_percent,
        ),
        overall_compliance: calculate_trend(
            current.server_security.overall_compliance,
            previous.server_security.overall_compliance,
        ),
        total_attacks: calculate_trend(
            current.cyber_security.total_attacks as f64,
            previous.cyber_security.total_attacks as f64,
        ),
        overall_block_percent: calculate_trend(
            current.cyber_security.overall_block_percent,
            previous.cyber_security.overall_block_percent,
        ),
        total_unavailability_hours: calculate_trend(
            current.tech_incidents.total_unavailability_hours,
            previous.tech_incidents.total_unavailability_hours,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::trend::TrendDirection;

    #[test]
    fn headline_trends_compare_matching_fields() {
        let mut current = DashboardStats::default();
        current.helpdesk.total_cases = 150;
        current.cyber_security.total_attacks = 80;
        current.tech_incidents.total_unavailability_hours = 4.0;

        let mut previous = DashboardStats::default();
        previous.helpdesk.total_cases = 100;
        previous.cyber_security.total_attacks = 100;
        previous.tech_incidents.total_unavailability_hours = 4.0;

        let trends = headline_trends(&current, &previous);
        assert_eq!(trends.total_cases.direction, TrendDirection::Up);
        assert_eq!(trends.total_cases.percentage, 50.0);
        assert_eq!(trends.total_attacks.direction, TrendDirection::Down);
        assert_eq!(trends.total_attacks.value, -20.0);
        assert_eq!(trends.total_unavailability_hours.direction, TrendDirection::Stable);
        assert_eq!(trends.overall_compliance.percentage, 0.0);
    }
}
