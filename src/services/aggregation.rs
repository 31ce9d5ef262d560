//! Dashboard statistics aggregation over period-filtered monthly records.
//!
//! Pure functions only: callers hand in records that are already filtered to
//! a year/month/quarter window and sorted by ascending `(year, month)`. No
//! date filtering happens here, only accumulation.
//!
//! Two groups of outputs depend on record order:
//! - per-server and per-control compliance in [`ComplianceAveraging::Pairwise`]
//!   mode, where each new value is averaged with the running value;
//! - tech-incident `available_hours_left`, `sla_compliance` and
//!   `annual_projection`, which take the last record seen.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;

use crate::models::metrics::{
    CyberSecurityRecord, EndpointRecord, HelpdeskRecord, ServerSecurityRecord,
    TechIncidentRecord,
};

/// Aggregated snapshot rendered by the dashboard overview.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DashboardStats {
    pub helpdesk: HelpdeskStats,
    pub endpoints: EndpointStats,
    pub server_security: ServerSecurityStats,
    pub cyber_security: CyberSecurityStats,
    pub tech_incidents: TechIncidentStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct HelpdeskStats {
    pub total_cases: i64,
    pub average_satisfaction: f64,
    pub cases_by_technician: Vec<TechnicianCases>,
    pub time_distribution: TimeDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicianCases {
    pub technician_name: String,
    pub total_cases: i64,
}

/// Resolution-time buckets summed across records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct TimeDistribution {
    pub less_than_4h: i64,
    pub from_4_to_8h: i64,
    pub from_8_to_16h: i64,
    pub more_than_16h: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct EndpointStats {
    pub total_computers: i64,
    pub total_mobile_devices: i64,
    pub global_protection_percent: f64,
    pub computer_status: ComputerStatus,
    pub mobile_status: MobileStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct ComputerStatus {
    pub no_issues: i64,
    pub warning: i64,
    pub critical: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct MobileStatus {
    pub protected: i64,
    pub pending: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct ServerSecurityStats {
    pub total_servers: i64,
    pub total_controls: i64,
    pub overall_compliance: f64,
    pub server_compliance: Vec<ServerCompliance>,
    pub control_compliance: Vec<ControlCompliance>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerCompliance {
    pub server_name: String,
    pub compliance_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlCompliance {
    pub control_name: String,
    pub compliance_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct CyberSecurityStats {
    pub total_attacks: i64,
    pub total_blocked: i64,
    pub overall_block_percent: f64,
    /// Attack counts per vector (not blocked counts).
    pub attacks_by_vector: VectorCounts,
    pub block_percent_by_vector: VectorPercents,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct VectorCounts {
    pub firewall: i64,
    pub antivirus: i64,
    pub microsoft365: i64,
    pub medr_soc: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct VectorPercents {
    pub firewall: f64,
    pub antivirus: f64,
    pub microsoft365: f64,
    pub medr_soc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct TechIncidentStats {
    pub total_unavailability_hours: f64,
    pub available_hours_left: f64,
    pub sla_compliance: f64,
    pub annual_projection: f64,
}

/// How repeated compliance values for one server or control are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComplianceAveraging {
    /// `stored = (stored + new) / 2`, applied in record order. Later records
    /// weigh more than earlier ones once a key has three or more values.
    #[default]
    Pairwise,
    /// True arithmetic mean of every value seen for the key.
    Mean,
}

impl FromStr for ComplianceAveraging {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pairwise" => Ok(Self::Pairwise),
            "mean" => Ok(Self::Mean),
            other => Err(format!("unknown compliance averaging mode: {other}")),
        }
    }
}

/// Knobs for [`aggregate_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregationOptions {
    pub compliance_averaging: ComplianceAveraging,
}

/// Borrowed view over the five record collections of one period window.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonthlyRecords<'a> {
    pub helpdesk: &'a [HelpdeskRecord],
    pub endpoints: &'a [EndpointRecord],
    pub server_security: &'a [ServerSecurityRecord],
    pub cyber_security: &'a [CyberSecurityRecord],
    pub tech_incidents: &'a [TechIncidentRecord],
}

/// Counts of currently active registry entities, independent of the period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveTotals {
    pub servers: i64,
    pub controls: i64,
}

/// Build the dashboard snapshot using pairwise compliance averaging.
pub fn aggregate(
    helpdesk: &[HelpdeskRecord],
    endpoints: &[EndpointRecord],
    server_security: &[ServerSecurityRecord],
    cyber_security: &[CyberSecurityRecord],
    tech_incidents: &[TechIncidentRecord],
    total_active_servers: i64,
    total_active_controls: i64,
) -> DashboardStats {
    let records = MonthlyRecords {
        helpdesk,
        endpoints,
        server_security,
        cyber_security,
        tech_incidents,
    };
    let totals = ActiveTotals {
        servers: total_active_servers,
        controls: total_active_controls,
    };
    aggregate_with(&records, totals, AggregationOptions::default())
}

/// Build the dashboard snapshot with explicit options.
pub fn aggregate_with(
    records: &MonthlyRecords<'_>,
    totals: ActiveTotals,
    options: AggregationOptions,
) -> DashboardStats {
    DashboardStats {
        helpdesk: summarize_helpdesk(records.helpdesk),
        endpoints: summarize_endpoints(records.endpoints),
        server_security: summarize_server_security(
            records.server_security,
            totals,
            options.compliance_averaging,
        ),
        cyber_security: summarize_cyber_security(records.cyber_security),
        tech_incidents: summarize_tech_incidents(records.tech_incidents),
    }
}

/// Percentage of `value` over `total`, rounded to 2 decimals.
///
/// Returns 0 when `total` is 0. Rounding uses [`f64::round`] (half away from
/// zero), which is round-half-up for the non-negative values used here:
/// `calculate_percentage(1, 32)` is `3.13`, not `3.12`.
pub fn calculate_percentage(value: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (value as f64 / total as f64 * 100.0 * 100.0).round() / 100.0
}

pub fn summarize_helpdesk(records: &[HelpdeskRecord]) -> HelpdeskStats {
    let mut total_cases = 0i64;
    let mut weighted_satisfaction = 0.0f64;
    let mut time_distribution = TimeDistribution::default();
    let mut by_technician = OrderedGroups::<i64>::default();

    for record in records {
        let cases = i64::from(record.total_cases);
        total_cases += cases;
        weighted_satisfaction += record.satisfaction_average * cases as f64;

        time_distribution.less_than_4h += i64::from(record.time_less_than_4h);
        time_distribution.from_4_to_8h += i64::from(record.time_4_to_8h);
        time_distribution.from_8_to_16h += i64::from(record.time_8_to_16h);
        time_distribution.more_than_16h += i64::from(record.time_more_than_16h);

        by_technician.upsert(&record.technician_name, cases, |sum| *sum += cases);
    }

    let average_satisfaction = if total_cases > 0 {
        weighted_satisfaction / total_cases as f64
    } else {
        0.0
    };

    HelpdeskStats {
        total_cases,
        average_satisfaction,
        cases_by_technician: by_technician
            .into_entries()
            .map(|(technician_name, total_cases)| TechnicianCases {
                technician_name,
                total_cases,
            })
            .collect(),
        time_distribution,
    }
}

pub fn summarize_endpoints(records: &[EndpointRecord]) -> EndpointStats {
    let mut stats = EndpointStats::default();

    for record in records {
        let no_issues = i64::from(record.computers_no_issues);
        let warning = i64::from(record.computers_warning);
        let critical = i64::from(record.computers_critical);
        let protected = i64::from(record.mobile_devices_protected);
        let pending = i64::from(record.mobile_devices_pending);

        stats.total_computers += no_issues + warning + critical;
        stats.total_mobile_devices += protected + pending;
        stats.computer_status.no_issues += no_issues;
        stats.computer_status.warning += warning;
        stats.computer_status.critical += critical;
        stats.mobile_status.protected += protected;
        stats.mobile_status.pending += pending;
    }

    // Mean of each record's own percentage, not recomputed from counts.
    stats.global_protection_percent = mean(records.iter().map(|r| r.global_protection_percent));
    stats
}

pub fn summarize_server_security(
    records: &[ServerSecurityRecord],
    totals: ActiveTotals,
    averaging: ComplianceAveraging,
) -> ServerSecurityStats {
    let server_compliance = group_compliance(
        records.iter().map(|r| (r.server_name.as_str(), r.compliance_percent)),
        averaging,
    )
    .map(|(server_name, compliance_percent)| ServerCompliance {
        server_name,
        compliance_percent,
    })
    .collect();

    let control_compliance = group_compliance(
        records.iter().map(|r| (r.control_name.as_str(), r.compliance_percent)),
        averaging,
    )
    .map(|(control_name, compliance_percent)| ControlCompliance {
        control_name,
        compliance_percent,
    })
    .collect();

    ServerSecurityStats {
        total_servers: totals.servers,
        total_controls: totals.controls,
        overall_compliance: mean(records.iter().map(|r| r.compliance_percent)),
        server_compliance,
        control_compliance,
    }
}

pub fn summarize_cyber_security(records: &[CyberSecurityRecord]) -> CyberSecurityStats {
    let mut stats = CyberSecurityStats::default();

    for record in records {
        let attacks = VectorCounts {
            firewall: i64::from(record.attacks_firewall),
            antivirus: i64::from(record.attacks_antivirus),
            microsoft365: i64::from(record.attacks_microsoft365),
            medr_soc: i64::from(record.attacks_medr_soc),
        };

        stats.total_attacks +=
            attacks.firewall + attacks.antivirus + attacks.microsoft365 + attacks.medr_soc;
        stats.total_blocked += i64::from(record.blocked_firewall)
            + i64::from(record.blocked_antivirus)
            + i64::from(record.blocked_microsoft365)
            + i64::from(record.blocked_medr_soc);

        stats.attacks_by_vector.firewall += attacks.firewall;
        stats.attacks_by_vector.antivirus += attacks.antivirus;
        stats.attacks_by_vector.microsoft365 += attacks.microsoft365;
        stats.attacks_by_vector.medr_soc += attacks.medr_soc;
    }

    if stats.total_attacks > 0 {
        stats.overall_block_percent =
            calculate_percentage(stats.total_blocked, stats.total_attacks);
    }

    stats.block_percent_by_vector = VectorPercents {
        firewall: mean(records.iter().map(|r| r.firewall_block_percent)),
        antivirus: mean(records.iter().map(|r| r.antivirus_block_percent)),
        microsoft365: mean(records.iter().map(|r| r.microsoft365_block_percent)),
        medr_soc: mean(records.iter().map(|r| r.medr_soc_block_percent)),
    };

    stats
}

pub fn summarize_tech_incidents(records: &[TechIncidentRecord]) -> TechIncidentStats {
    records
        .iter()
        .fold(TechIncidentStats::default(), |acc, record| TechIncidentStats {
            total_unavailability_hours: acc.total_unavailability_hours
                + record.unavailability_hours,
            // Last record wins for the non-additive fields.
            available_hours_left: record.available_hours_left,
            sla_compliance: record.sla_compliance,
            annual_projection: record.annual_projection,
        })
}

/// Arithmetic mean, 0 for an empty sequence.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Running compliance value for one server or control.
#[derive(Debug, Clone, Copy)]
struct ComplianceAccumulator {
    running: f64,
    sum: f64,
    count: u32,
}

impl ComplianceAccumulator {
    fn new(value: f64) -> Self {
        Self {
            running: value,
            sum: value,
            count: 1,
        }
    }

    fn push(&mut self, value: f64) {
        self.running = (self.running + value) / 2.0;
        self.sum += value;
        self.count += 1;
    }

    fn value(&self, averaging: ComplianceAveraging) -> f64 {
        match averaging {
            ComplianceAveraging::Pairwise => self.running,
            ComplianceAveraging::Mean => self.sum / f64::from(self.count),
        }
    }
}

fn group_compliance<'a>(
    values: impl Iterator<Item = (&'a str, f64)>,
    averaging: ComplianceAveraging,
) -> impl Iterator<Item = (String, f64)> {
    let mut groups = OrderedGroups::<ComplianceAccumulator>::default();
    for (name, value) in values {
        groups.upsert(name, ComplianceAccumulator::new(value), |acc| acc.push(value));
    }
    groups
        .into_entries()
        .map(move |(name, acc)| (name, acc.value(averaging)))
}

/// Key → accumulator map that iterates in first-insertion order.
#[derive(Debug)]
struct OrderedGroups<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> Default for OrderedGroups<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> OrderedGroups<T> {
    /// Insert `initial` for a new key, otherwise apply `update` to the existing value.
    fn upsert(&mut self, key: &str, initial: T, update: impl FnOnce(&mut T)) {
        match self.index.get(key) {
            Some(&position) => update(&mut self.entries[position].1),
            None => {
                self.index.insert(key.to_string(), self.entries.len());
                self.entries.push((key.to_string(), initial));
            }
        }
    }

    fn into_entries(self) -> impl Iterator<Item = (String, T)> {
        self.entries.into_iter()
    }
}
