//! Seed script for development: populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env). Safe to run repeatedly: registry rows
//! are inserted once and monthly records are upserted.

use anyhow::Context;
use chrono::{Datelike, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use itdash::models::metrics::{
    ComplianceStatus, UpsertCyberSecurity, UpsertEndpoint, UpsertHelpdesk, UpsertServerSecurity,
    UpsertTechIncident,
};
use itdash::services::{auth, metrics};

const ADMIN_EMAIL: &str = "admin@itdashboard.local";
const ADMIN_PASSWORD: &str = "Admin123!";
const VIEWER_EMAIL: &str = "viewer@itdashboard.local";
const VIEWER_PASSWORD: &str = "Viewer123!";

/// Months of sample data generated, ending with the current month.
const SAMPLE_MONTHS: i32 = 6;

const TECHNICIANS: &[(&str, &str)] = &[
    ("Technician 1", "technician1@itdashboard.local"),
    ("Technician 2", "technician2@itdashboard.local"),
    ("Technician 3", "technician3@itdashboard.local"),
];

const SERVERS: &[(&str, &str)] = &[
    ("Web Server", "Main web server"),
    ("Database Server", "Primary database server"),
    ("Application Server", "Business applications"),
    ("Backup Server", "Backup storage"),
];

const CONTROLS: &[(&str, &str, &str)] = &[
    ("Antivirus", "Antivirus agent installed and updated", "Endpoint Protection"),
    ("Firewall", "Host firewall enabled", "Network Security"),
    ("Updates", "Operating system patch level", "Patch Management"),
    ("Backup", "Nightly backup verified", "Data Protection"),
    ("Monitoring", "Monitoring agent reporting", "Monitoring"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = itdash::db::create_pool(&db_url, 5).await?;
    itdash::db::run_migrations(&pool).await?;

    println!("=== IT Dashboard Seed Script ===");

    seed_user(&pool, ADMIN_EMAIL, ADMIN_PASSWORD, "Administrator", "Admin").await?;
    seed_user(&pool, VIEWER_EMAIL, VIEWER_PASSWORD, "Dashboard Viewer", "Viewer").await?;
    let technicians = seed_technicians(&pool).await?;
    let servers = seed_servers(&pool).await?;
    let controls = seed_controls(&pool).await?;
    seed_monthly_data(&pool, &technicians, &servers, &controls).await?;

    println!("\n=== Seed complete! ===");
    println!("Admin login: {ADMIN_EMAIL} / {ADMIN_PASSWORD}");
    println!("Viewer login: {VIEWER_EMAIL} / {VIEWER_PASSWORD}");

    Ok(())
}

async fn seed_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    name: &str,
    role: &str,
) -> anyhow::Result<()> {
    let hash = auth::hash_password(password)?;

    sqlx::query(
        "INSERT INTO users (email, password_hash, name, role)
         VALUES ($1, $2, $3, $4::user_role)
         ON CONFLICT (email) DO UPDATE SET password_hash = EXCLUDED.password_hash",
    )
    .bind(email)
    .bind(&hash)
    .bind(name)
    .bind(role)
    .execute(pool)
    .await?;

    println!("[done] User {email} ({role})");
    Ok(())
}

async fn seed_technicians(pool: &PgPool) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(TECHNICIANS.len());
    for (name, email) in TECHNICIANS {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO technicians (name, email) VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET email = EXCLUDED.email
             RETURNING id",
        )
        .bind(*name)
        .bind(*email)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }
    println!("[done] {} technicians", ids.len());
    Ok(ids)
}

async fn seed_servers(pool: &PgPool) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(SERVERS.len());
    for (name, description) in SERVERS {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO servers (name, description) VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET description = EXCLUDED.description
             RETURNING id",
        )
        .bind(*name)
        .bind(*description)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }
    println!("[done] {} servers", ids.len());
    Ok(ids)
}

async fn seed_controls(pool: &PgPool) -> anyhow::Result<Vec<Uuid>> {
    let mut ids = Vec::with_capacity(CONTROLS.len());
    for (name, description, category) in CONTROLS {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO security_controls (name, description, category) VALUES ($1, $2, $3)
             ON CONFLICT (name) DO UPDATE SET category = EXCLUDED.category
             RETURNING id",
        )
        .bind(*name)
        .bind(*description)
        .bind(*category)
        .fetch_one(pool)
        .await?;
        ids.push(id);
    }
    println!("[done] {} security controls", ids.len());
    Ok(ids)
}

/// Deterministic variation in `0..modulus` so reruns produce identical data.
fn jitter(seed: i32, salt: i32, modulus: i32) -> i32 {
    (seed * 37 + salt * 11).rem_euclid(modulus)
}

fn status_for(compliance: f64) -> ComplianceStatus {
    if compliance >= 90.0 {
        ComplianceStatus::Compliant
    } else if compliance >= 75.0 {
        ComplianceStatus::Warning
    } else {
        ComplianceStatus::Critical
    }
}

async fn seed_monthly_data(
    pool: &PgPool,
    technicians: &[Uuid],
    servers: &[Uuid],
    controls: &[Uuid],
) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let current = today.year() * 12 + today.month() as i32 - 1;

    for offset in 0..SAMPLE_MONTHS {
        let index = current - offset;
        let (year, month) = (index.div_euclid(12), index.rem_euclid(12) + 1);

        for (t, technician_id) in technicians.iter().enumerate() {
            let t = t as i32;
            let total = 30 + jitter(index, t, 25);
            let less_than_4h = total / 2;
            let from_4_to_8h = total / 4;
            let from_8_to_16h = total / 8;
            metrics::upsert_helpdesk(
                pool,
                &UpsertHelpdesk {
                    year,
                    month,
                    technician_id: *technician_id,
                    total_cases: total,
                    cases_glpi: total * 7 / 10,
                    cases_other_sources: total - total * 7 / 10,
                    satisfaction_average: 4.0 + f64::from(jitter(index, t, 10)) / 10.0,
                    time_less_than_4h: less_than_4h,
                    time_4_to_8h: from_4_to_8h,
                    time_8_to_16h: from_8_to_16h,
                    time_more_than_16h: total - less_than_4h - from_4_to_8h - from_8_to_16h,
                },
            )
            .await?;
        }

        metrics::upsert_endpoint(
            pool,
            &UpsertEndpoint {
                year,
                month,
                computers_no_issues: 150 + jitter(index, 1, 50),
                computers_warning: 5 + jitter(index, 2, 20),
                computers_critical: 1 + jitter(index, 3, 10),
                mobile_devices_protected: 80 + jitter(index, 4, 30),
                mobile_devices_pending: 2 + jitter(index, 5, 10),
                global_protection_percent: 85.0 + f64::from(jitter(index, 6, 100)) / 10.0,
            },
        )
        .await?;

        for (s, server_id) in servers.iter().enumerate() {
            for (c, control_id) in controls.iter().enumerate() {
                let compliance = 70.0 + f64::from(jitter(index, (s * 7 + c) as i32, 300)) / 10.0;
                metrics::upsert_server_security(
                    pool,
                    &UpsertServerSecurity {
                        year,
                        month,
                        server_id: *server_id,
                        control_id: *control_id,
                        status: status_for(compliance),
                        compliance_percent: compliance,
                        notes: None,
                    },
                )
                .await?;
            }
        }

        let attacks = [
            500 + jitter(index, 7, 1000),
            100 + jitter(index, 8, 200),
            50 + jitter(index, 9, 150),
            25 + jitter(index, 10, 100),
        ];
        let blocked = attacks.map(|a| a * 9 / 10);
        let percents = [0, 1, 2, 3].map(|v| 85.0 + f64::from(jitter(index, 11 + v, 130)) / 10.0);
        metrics::upsert_cyber_security(
            pool,
            &UpsertCyberSecurity {
                year,
                month,
                attacks_firewall: attacks[0],
                attacks_antivirus: attacks[1],
                attacks_microsoft365: attacks[2],
                attacks_medr_soc: attacks[3],
                blocked_firewall: blocked[0],
                blocked_antivirus: blocked[1],
                blocked_microsoft365: blocked[2],
                blocked_medr_soc: blocked[3],
                firewall_block_percent: percents[0],
                antivirus_block_percent: percents[1],
                microsoft365_block_percent: percents[2],
                medr_soc_block_percent: percents[3],
            },
        )
        .await?;

        let unavailability = 2.0 + f64::from(jitter(index, 15, 100)) / 10.0;
        metrics::upsert_tech_incident(
            pool,
            &UpsertTechIncident {
                year,
                month,
                unavailability_hours: unavailability,
                available_hours_left: 8760.0 - unavailability * f64::from(month),
                sla_compliance: 95.0 + f64::from(jitter(index, 16, 50)) / 10.0,
                annual_projection: 30.0 + f64::from(jitter(index, 17, 200)) / 10.0,
                description: None,
            },
        )
        .await?;

        println!("[done] Monthly data for {year}-{month:02}");
    }

    Ok(())
}
