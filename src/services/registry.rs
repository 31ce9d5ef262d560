//! Registry service: technicians, servers and security controls.
//!
//! These are the entities monthly records point at. Names are unique per
//! table; deleting an entity cascades to its monthly records.

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::errors::AppError;
use crate::models::security_control::{
    CreateSecurityControl, SecurityControl, UpdateSecurityControl,
};
use crate::models::server::{CreateServer, Server, UpdateServer};
use crate::models::technician::{CreateTechnician, Technician, UpdateTechnician};
use crate::services::aggregation::ActiveTotals;

// ── Technicians ────────────────────────────────────────────────────────────

pub async fn list_technicians(pool: &PgPool) -> Result<Vec<Technician>, AppError> {
    let rows = sqlx::query_as::<_, Technician>("SELECT * FROM technicians ORDER BY name ASC")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_technician(pool: &PgPool, id: Uuid) -> Result<Technician, AppError> {
    sqlx::query_as::<_, Technician>("SELECT * FROM technicians WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Technician {id} not found")))
}

pub async fn create_technician(
    pool: &PgPool,
    input: &CreateTechnician,
) -> Result<Technician, AppError> {
    input.validate()?;

    let technician = sqlx::query_as::<_, Technician>(
        "INSERT INTO technicians (name, email) VALUES ($1, $2) RETURNING *",
    )
    .bind(input.name.trim())
    .bind(&input.email)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        AppError::from_unique_violation(e, format!("Technician '{}' already exists", input.name))
    })?;

    tracing::info!(id = %technician.id, name = %technician.name, "Technician created");
    Ok(technician)
}

pub async fn update_technician(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateTechnician,
) -> Result<Technician, AppError> {
    input.validate()?;
    let existing = find_technician(pool, id).await?;

    let technician = sqlx::query_as::<_, Technician>(
        r#"
        UPDATE technicians SET
            name = COALESCE($2, name),
            email = COALESCE($3, email),
            is_active = COALESCE($4, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(input.name.as_deref().map(str::trim))
    .bind(&input.email)
    .bind(input.is_active)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_unique_violation(e, "Technician name already in use"))?;

    Ok(technician)
}

pub async fn delete_technician(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM technicians WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Technician {id} not found")));
    }
    tracing::info!(%id, "Technician deleted");
    Ok(())
}

// ── Servers ────────────────────────────────────────────────────────────────

pub async fn list_servers(pool: &PgPool) -> Result<Vec<Server>, AppError> {
    let rows = sqlx::query_as::<_, Server>("SELECT * FROM servers ORDER BY name ASC")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_server(pool: &PgPool, id: Uuid) -> Result<Server, AppError> {
    sqlx::query_as::<_, Server>("SELECT * FROM servers WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Server {id} not found")))
}

pub async fn create_server(pool: &PgPool, input: &CreateServer) -> Result<Server, AppError> {
    input.validate()?;

    let server = sqlx::query_as::<_, Server>(
        "INSERT INTO servers (name, description) VALUES ($1, $2) RETURNING *",
    )
    .bind(input.name.trim())
    .bind(&input.description)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        AppError::from_unique_violation(e, format!("Server '{}' already exists", input.name))
    })?;

    tracing::info!(id = %server.id, name = %server.name, "Server created");
    Ok(server)
}

pub async fn update_server(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateServer,
) -> Result<Server, AppError> {
    input.validate()?;
    let existing = find_server(pool, id).await?;

    let server = sqlx::query_as::<_, Server>(
        r#"
        UPDATE servers SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            is_active = COALESCE($4, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(input.name.as_deref().map(str::trim))
    .bind(&input.description)
    .bind(input.is_active)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_unique_violation(e, "Server name already in use"))?;

    Ok(server)
}

pub async fn delete_server(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM servers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Server {id} not found")));
    }
    tracing::info!(%id, "Server deleted");
    Ok(())
}

// ── Security controls ──────────────────────────────────────────────────────

pub async fn list_controls(pool: &PgPool) -> Result<Vec<SecurityControl>, AppError> {
    let rows =
        sqlx::query_as::<_, SecurityControl>("SELECT * FROM security_controls ORDER BY name ASC")
            .fetch_all(pool)
            .await?;
    Ok(rows)
}

pub async fn find_control(pool: &PgPool, id: Uuid) -> Result<SecurityControl, AppError> {
    sqlx::query_as::<_, SecurityControl>("SELECT * FROM security_controls WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Security control {id} not found")))
}

pub async fn create_control(
    pool: &PgPool,
    input: &CreateSecurityControl,
) -> Result<SecurityControl, AppError> {
    input.validate()?;

    let control = sqlx::query_as::<_, SecurityControl>(
        r#"
        INSERT INTO security_controls (name, description, category)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(input.name.trim())
    .bind(&input.description)
    .bind(input.category.trim())
    .fetch_one(pool)
    .await
    .map_err(|e| {
        AppError::from_unique_violation(
            e,
            format!("Security control '{}' already exists", input.name),
        )
    })?;

    tracing::info!(id = %control.id, name = %control.name, "Security control created");
    Ok(control)
}

pub async fn update_control(
    pool: &PgPool,
    id: Uuid,
    input: &UpdateSecurityControl,
) -> Result<SecurityControl, AppError> {
    input.validate()?;
    let existing = find_control(pool, id).await?;

    let control = sqlx::query_as::<_, SecurityControl>(
        r#"
        UPDATE security_controls SET
            name = COALESCE($2, name),
            description = COALESCE($3, description),
            category = COALESCE($4, category),
            is_active = COALESCE($5, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(existing.id)
    .bind(input.name.as_deref().map(str::trim))
    .bind(&input.description)
    .bind(input.category.as_deref().map(str::trim))
    .bind(input.is_active)
    .fetch_one(pool)
    .await
    .map_err(|e| AppError::from_unique_violation(e, "Security control name already in use"))?;

    Ok(control)
}

pub async fn delete_control(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM security_controls WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Security control {id} not found")));
    }
    tracing::info!(%id, "Security control deleted");
    Ok(())
}

/// Count active servers and security controls, independent of any period.
pub async fn count_active(pool: &PgPool) -> Result<ActiveTotals, AppError> {
    let (servers, controls) = tokio::try_join!(
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM servers WHERE is_active = true")
            .fetch_one(pool),
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM security_controls WHERE is_active = true"
        )
        .fetch_one(pool),
    )?;
    Ok(ActiveTotals { servers, controls })
}
