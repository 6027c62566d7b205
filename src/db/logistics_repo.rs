// src/db/logistics_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::logistics::{CreateLogisticsPayload, LogisticsEntry, UpdateLogisticsPayload},
    services::logistics_stats::{date_filter, DateFilter},
};

const ENTRY_COLUMNS: &str = r#"
    id, vehicle_plate, date,
    COALESCE(km_driven, 0) AS km_driven,
    COALESCE(diesel_liters, 0) AS diesel_liters,
    COALESCE(diesel_cost, 0) AS diesel_cost,
    maintenance_description,
    COALESCE(maintenance_cost, 0) AS maintenance_cost,
    driver, note
"#;

#[derive(Clone)]
pub struct LogisticsRepository {
    pool: PgPool,
}

impl LogisticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Lançamentos por ano e (opcionalmente) mês, do mais antigo ao mais novo.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        year: Option<i32>,
        month: Option<i32>,
    ) -> Result<Vec<LogisticsEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (first, last) = match date_filter(year, month) {
            DateFilter::All => (None, None),
            DateFilter::Between(first, last) => (Some(first), Some(last)),
            DateFilter::Nothing => return Ok(Vec::new()),
        };

        let entries = sqlx::query_as::<_, LogisticsEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM logistics_entries
            WHERE ($1::DATE IS NULL OR date BETWEEN $1 AND $2)
            ORDER BY date, created_at
            "#
        ))
        .bind(first)
        .bind(last)
        .fetch_all(executor)
        .await?;

        Ok(entries)
    }

    pub async fn list_plates<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plates = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT vehicle_plate FROM logistics_entries ORDER BY vehicle_plate",
        )
        .fetch_all(executor)
        .await?;

        Ok(plates)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &CreateLogisticsPayload,
    ) -> Result<LogisticsEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, LogisticsEntry>(&format!(
            r#"
            INSERT INTO logistics_entries (
                vehicle_plate, date, km_driven, diesel_liters, diesel_cost,
                maintenance_description, maintenance_cost, driver, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(&payload.vehicle_plate)
        .bind(payload.date)
        .bind(payload.km_driven)
        .bind(payload.diesel_liters)
        .bind(payload.diesel_cost)
        .bind(payload.maintenance_description.as_deref())
        .bind(payload.maintenance_cost)
        .bind(payload.driver.as_deref())
        .bind(payload.note.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(entry)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateLogisticsPayload,
    ) -> Result<LogisticsEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, LogisticsEntry>(&format!(
            r#"
            UPDATE logistics_entries SET
                vehicle_plate = COALESCE($2, vehicle_plate),
                date = COALESCE($3, date),
                km_driven = COALESCE($4, km_driven),
                diesel_liters = COALESCE($5, diesel_liters),
                diesel_cost = COALESCE($6, diesel_cost),
                maintenance_description = COALESCE($7, maintenance_description),
                maintenance_cost = COALESCE($8, maintenance_cost),
                driver = COALESCE($9, driver),
                note = COALESCE($10, note)
            WHERE id = $1
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.vehicle_plate.as_deref())
        .bind(payload.date)
        .bind(payload.km_driven)
        .bind(payload.diesel_liters)
        .bind(payload.diesel_cost)
        .bind(payload.maintenance_description.as_deref())
        .bind(payload.maintenance_cost)
        .bind(payload.driver.as_deref())
        .bind(payload.note.as_deref())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM logistics_entries WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
