// src/db/sales_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{CreateSalePayload, SalesFilter, SalesRecord, UpdateSalePayload},
};

// Nome do técnico vem do JOIN; vendas da fábrica ficam com NULL
const SALES_SELECT: &str = r#"
    SELECT
        s.id, s.technician_id, t.name AS technician_name,
        s.kind, s.category, s.subcategory, s.year, s.month,
        COALESCE(s.target_amount, 0) AS target_amount,
        COALESCE(s.actual_amount, 0) AS actual_amount,
        s.note
    FROM sales_records s
    LEFT JOIN technicians t ON t.id = s.technician_id
"#;

#[derive(Clone)]
pub struct SalesRepository {
    pool: PgPool,
}

impl SalesRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filter: &SalesFilter,
    ) -> Result<Vec<SalesRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, SalesRecord>(&format!(
            r#"{SALES_SELECT}
            WHERE ($1::INT IS NULL OR s.year = $1)
              AND ($2::INT IS NULL OR s.month = $2)
              AND ($3::sale_kind IS NULL OR s.kind = $3)
            ORDER BY s.year, s.month, s.created_at
            "#
        ))
        .bind(filter.year)
        .bind(filter.month)
        .bind(filter.kind)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    /// Vendas de um intervalo de anos, para a janela móvel.
    pub async fn list_years<'e, E>(
        &self,
        executor: E,
        from_year: i32,
        to_year: i32,
    ) -> Result<Vec<SalesRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, SalesRecord>(&format!(
            "{SALES_SELECT} WHERE s.year BETWEEN $1 AND $2 ORDER BY s.year, s.month, s.created_at"
        ))
        .bind(from_year)
        .bind(to_year)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<SalesRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, SalesRecord>(&format!("{SALES_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound)
    }

    // INSERT devolve só o id; a linha completa (com o nome do técnico) vem de find_by_id
    pub async fn create<'e, E>(&self, executor: E, payload: &CreateSalePayload) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sales_records (
                technician_id, kind, category, subcategory,
                year, month, target_amount, actual_amount, note
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(payload.technician_id)
        .bind(payload.kind)
        .bind(payload.category.trim())
        .bind(payload.subcategory.as_deref())
        .bind(payload.year)
        .bind(payload.month)
        .bind(payload.target_amount)
        .bind(payload.actual_amount)
        .bind(payload.note.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    /// Atualização parcial. `to_factory`, `clear_subcategory` e `clear_note`
    /// gravam NULL no campo correspondente.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateSalePayload,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE sales_records SET
                technician_id = CASE WHEN $2 THEN NULL ELSE COALESCE($3, technician_id) END,
                kind = COALESCE($4, kind),
                category = COALESCE($5, category),
                subcategory = CASE WHEN $12 THEN NULL ELSE COALESCE($6, subcategory) END,
                year = COALESCE($7, year),
                month = COALESCE($8, month),
                target_amount = COALESCE($9, target_amount),
                actual_amount = COALESCE($10, actual_amount),
                note = CASE WHEN $13 THEN NULL ELSE COALESCE($11, note) END
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(payload.to_factory)
        .bind(payload.technician_id)
        .bind(payload.kind)
        .bind(payload.category.as_deref().map(str::trim))
        .bind(payload.subcategory.as_deref())
        .bind(payload.year)
        .bind(payload.month)
        .bind(payload.target_amount)
        .bind(payload.actual_amount)
        .bind(payload.note.as_deref())
        .bind(payload.clear_subcategory)
        .bind(payload.clear_note)
        .fetch_optional(executor)
        .await?;

        updated.ok_or(AppError::NotFound)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM sales_records WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
