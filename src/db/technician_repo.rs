// src/db/technician_repo.rs
//
// Técnicos, metas mensais por técnico e metas da fábrica.

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{
        CreateQuotaPayload, CreateTechnicianPayload, FactoryQuota, FactoryQuotaPayload, Technician,
        TechnicianQuota, UpdateAmountsPayload, UpdateTechnicianPayload, UpsertQuotaPayload,
    },
};

const QUOTA_SELECT: &str = r#"
    SELECT
        q.id, q.technician_id, t.name AS technician_name, q.year, q.month,
        COALESCE(q.target_amount, 0) AS target_amount,
        COALESCE(q.actual_amount, 0) AS actual_amount
    FROM technician_quotas q
    JOIN technicians t ON t.id = q.technician_id
"#;

const FACTORY_COLUMNS: &str = "id, year, month, target_amount, actual_amount";

/// O que aconteceu com um cadastro ao ser "excluído".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Deleted,
    // Ainda referenciado por vendas ou metas
    Deactivated,
}

#[derive(Clone)]
pub struct TechnicianRepository {
    pool: PgPool,
}

impl TechnicianRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  TÉCNICOS
    // =========================================================================

    pub async fn list_technicians<'e, E>(
        &self,
        executor: E,
        include_inactive: bool,
    ) -> Result<Vec<Technician>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let technicians = sqlx::query_as::<_, Technician>(
            r#"
            SELECT id, name, base_monthly_target, active
            FROM technicians
            WHERE $1 OR active
            ORDER BY name ASC
            "#,
        )
        .bind(include_inactive)
        .fetch_all(executor)
        .await?;

        Ok(technicians)
    }

    pub async fn create_technician<'e, E>(
        &self,
        executor: E,
        payload: &CreateTechnicianPayload,
    ) -> Result<Technician, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let technician = sqlx::query_as::<_, Technician>(
            r#"
            INSERT INTO technicians (name, base_monthly_target)
            VALUES ($1, $2)
            RETURNING id, name, base_monthly_target, active
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.base_monthly_target)
        .fetch_one(executor)
        .await?;

        Ok(technician)
    }

    pub async fn update_technician<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateTechnicianPayload,
    ) -> Result<Technician, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Technician>(
            r#"
            UPDATE technicians SET
                name = COALESCE($2, name),
                base_monthly_target = COALESCE($3, base_monthly_target),
                active = COALESCE($4, active)
            WHERE id = $1
            RETURNING id, name, base_monthly_target, active
            "#,
        )
        .bind(id)
        .bind(payload.name.as_deref().map(str::trim))
        .bind(payload.base_monthly_target)
        .bind(payload.active)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    /// Exclui o técnico, ou só o desativa se ainda houver vendas/metas ligadas a ele.
    pub async fn remove_technician<'e, E>(&self, executor: E, id: Uuid) -> Result<Removal, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM sales_records WHERE technician_id = $1)
                OR EXISTS (SELECT 1 FROM technician_quotas WHERE technician_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let sql = if referenced {
            "UPDATE technicians SET active = FALSE WHERE id = $1"
        } else {
            "DELETE FROM technicians WHERE id = $1"
        };
        let result = sqlx::query(sql).bind(id).execute(&mut *tx).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        tx.commit().await?;

        Ok(if referenced { Removal::Deactivated } else { Removal::Deleted })
    }

    // =========================================================================
    //  METAS POR TÉCNICO
    // =========================================================================

    pub async fn list_quotas<'e, E>(
        &self,
        executor: E,
        year: i32,
        month: Option<i32>,
    ) -> Result<Vec<TechnicianQuota>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quotas = sqlx::query_as::<_, TechnicianQuota>(&format!(
            r#"{QUOTA_SELECT}
            WHERE q.year = $1 AND ($2::INT IS NULL OR q.month = $2)
            ORDER BY q.month, t.name
            "#
        ))
        .bind(year)
        .bind(month)
        .fetch_all(executor)
        .await?;

        Ok(quotas)
    }

    async fn find_quota<'e, E>(&self, executor: E, id: Uuid) -> Result<TechnicianQuota, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TechnicianQuota>(&format!("{QUOTA_SELECT} WHERE q.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Cria a meta; (técnico, ano, mês) repetido é DuplicateQuota.
    pub async fn create_quota<'e, E>(
        &self,
        executor: E,
        payload: &CreateQuotaPayload,
    ) -> Result<TechnicianQuota, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let name = sqlx::query_scalar::<_, String>("SELECT name FROM technicians WHERE id = $1")
            .bind(payload.technician_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound)?;

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM technician_quotas
                WHERE technician_id = $1 AND year = $2 AND month = $3
            )
            "#,
        )
        .bind(payload.technician_id)
        .bind(payload.year)
        .bind(payload.month)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            return Err(AppError::DuplicateQuota(name));
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO technician_quotas (technician_id, year, month, target_amount, actual_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(payload.technician_id)
        .bind(payload.year)
        .bind(payload.month)
        .bind(payload.target_amount)
        .bind(payload.actual_amount)
        .fetch_one(&mut *tx)
        .await?;

        let quota = self.find_quota(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(quota)
    }

    /// Grava pela chave natural; campos ausentes mantêm o valor atual (ou 0 na criação).
    pub async fn upsert_quota<'e, E>(
        &self,
        executor: E,
        payload: &UpsertQuotaPayload,
    ) -> Result<TechnicianQuota, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO technician_quotas (technician_id, year, month, target_amount, actual_amount)
            VALUES ($1, $2, $3, COALESCE($4::NUMERIC, 0), COALESCE($5::NUMERIC, 0))
            ON CONFLICT (technician_id, year, month) DO UPDATE SET
                target_amount = COALESCE($4, technician_quotas.target_amount),
                actual_amount = COALESCE($5, technician_quotas.actual_amount)
            RETURNING id
            "#,
        )
        .bind(payload.technician_id)
        .bind(payload.year)
        .bind(payload.month)
        .bind(payload.target_amount)
        .bind(payload.actual_amount)
        .fetch_one(&mut *tx)
        .await?;

        let quota = self.find_quota(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(quota)
    }

    pub async fn update_quota<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateAmountsPayload,
    ) -> Result<TechnicianQuota, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE technician_quotas SET
                target_amount = COALESCE($2, target_amount),
                actual_amount = COALESCE($3, actual_amount)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload.target_amount)
        .bind(payload.actual_amount)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        let quota = self.find_quota(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(quota)
    }

    pub async fn delete_quota<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM technician_quotas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Soma das metas do ano por técnico (usado no analytics).
    pub async fn yearly_targets<'e, E>(
        &self,
        executor: E,
        year: i32,
    ) -> Result<Vec<(Uuid, Decimal)>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, (Uuid, Decimal)>(
            r#"
            SELECT q.technician_id, COALESCE(SUM(q.target_amount), 0)
            FROM technician_quotas q
            WHERE q.year = $1
            GROUP BY q.technician_id
            "#,
        )
        .bind(year)
        .fetch_all(executor)
        .await?;

        Ok(rows)
    }

    // =========================================================================
    //  METAS DA FÁBRICA
    // =========================================================================

    pub async fn list_factory_quotas<'e, E>(
        &self,
        executor: E,
        year: i32,
    ) -> Result<Vec<FactoryQuota>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quotas = sqlx::query_as::<_, FactoryQuota>(&format!(
            "SELECT {FACTORY_COLUMNS} FROM factory_quotas WHERE year = $1 ORDER BY month"
        ))
        .bind(year)
        .fetch_all(executor)
        .await?;

        Ok(quotas)
    }

    pub async fn find_factory_quota<'e, E>(
        &self,
        executor: E,
        year: i32,
        month: i32,
    ) -> Result<Option<FactoryQuota>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quota = sqlx::query_as::<_, FactoryQuota>(&format!(
            "SELECT {FACTORY_COLUMNS} FROM factory_quotas WHERE year = $1 AND month = $2"
        ))
        .bind(year)
        .bind(month)
        .fetch_optional(executor)
        .await?;

        Ok(quota)
    }

    pub async fn upsert_factory_quota<'e, E>(
        &self,
        executor: E,
        payload: &FactoryQuotaPayload,
    ) -> Result<FactoryQuota, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quota = sqlx::query_as::<_, FactoryQuota>(&format!(
            r#"
            INSERT INTO factory_quotas (year, month, target_amount, actual_amount)
            VALUES ($1, $2, COALESCE($3::NUMERIC, 0), COALESCE($4::NUMERIC, 0))
            ON CONFLICT (year, month) DO UPDATE SET
                target_amount = COALESCE($3, factory_quotas.target_amount),
                actual_amount = COALESCE($4, factory_quotas.actual_amount)
            RETURNING {FACTORY_COLUMNS}
            "#
        ))
        .bind(payload.year)
        .bind(payload.month)
        .bind(payload.target_amount)
        .bind(payload.actual_amount)
        .fetch_one(executor)
        .await?;

        Ok(quota)
    }
}
