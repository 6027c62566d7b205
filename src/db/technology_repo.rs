// src/db/technology_repo.rs

use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::technician_repo::Removal,
    models::{
        sales::UpdateAmountsPayload,
        technology::{
            CreateCategoryQuotaPayload, CreateVendorPayload, CreateVendorQuotaPayload,
            TechnologyCategoryQuota, TechnologyFilter, TechnologyVendor, TechnologyVendorQuota,
            UpdateVendorPayload,
        },
    },
};

const VENDOR_COLUMNS: &str = "id, name, default_commission_percent, active";

const VENDOR_QUOTA_SELECT: &str = r#"
    SELECT
        q.id, q.vendor_id, v.name AS vendor_name, q.year, q.month, q.category,
        COALESCE(q.target_amount, 0) AS target_amount,
        COALESCE(q.actual_amount, 0) AS actual_amount
    FROM technology_vendor_quotas q
    JOIN technology_vendors v ON v.id = q.vendor_id
"#;

const CATEGORY_QUOTA_COLUMNS: &str = r#"
    id, year, month, category,
    COALESCE(target_amount, 0) AS target_amount,
    COALESCE(actual_amount, 0) AS actual_amount
"#;

#[derive(Clone)]
pub struct TechnologyRepository {
    pool: PgPool,
}

impl TechnologyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  VENDEDORES
    // =========================================================================

    pub async fn list_vendors<'e, E>(
        &self,
        executor: E,
        include_inactive: bool,
    ) -> Result<Vec<TechnologyVendor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vendors = sqlx::query_as::<_, TechnologyVendor>(&format!(
            "SELECT {VENDOR_COLUMNS} FROM technology_vendors WHERE $1 OR active ORDER BY name"
        ))
        .bind(include_inactive)
        .fetch_all(executor)
        .await?;

        Ok(vendors)
    }

    pub async fn create_vendor<'e, E>(
        &self,
        executor: E,
        payload: &CreateVendorPayload,
    ) -> Result<TechnologyVendor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let vendor = sqlx::query_as::<_, TechnologyVendor>(&format!(
            r#"
            INSERT INTO technology_vendors (name, default_commission_percent)
            VALUES ($1, $2)
            RETURNING {VENDOR_COLUMNS}
            "#
        ))
        .bind(payload.name.trim())
        .bind(payload.default_commission_percent)
        .fetch_one(executor)
        .await?;

        Ok(vendor)
    }

    pub async fn update_vendor<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateVendorPayload,
    ) -> Result<TechnologyVendor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TechnologyVendor>(&format!(
            r#"
            UPDATE technology_vendors SET
                name = COALESCE($2, name),
                default_commission_percent = COALESCE($3, default_commission_percent),
                active = COALESCE($4, active)
            WHERE id = $1
            RETURNING {VENDOR_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.name.as_deref().map(str::trim))
        .bind(payload.default_commission_percent)
        .bind(payload.active)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    /// Vendedor com metas lançadas é só desativado.
    pub async fn remove_vendor<'e, E>(&self, executor: E, id: Uuid) -> Result<Removal, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM technology_vendor_quotas WHERE vendor_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let sql = if referenced {
            "UPDATE technology_vendors SET active = FALSE WHERE id = $1"
        } else {
            "DELETE FROM technology_vendors WHERE id = $1"
        };
        let result = sqlx::query(sql).bind(id).execute(&mut *tx).await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        tx.commit().await?;

        Ok(if referenced { Removal::Deactivated } else { Removal::Deleted })
    }

    // =========================================================================
    //  METAS POR VENDEDOR
    // =========================================================================

    pub async fn list_vendor_quotas<'e, E>(
        &self,
        executor: E,
        filter: &TechnologyFilter,
    ) -> Result<Vec<TechnologyVendorQuota>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quotas = sqlx::query_as::<_, TechnologyVendorQuota>(&format!(
            r#"{VENDOR_QUOTA_SELECT}
            WHERE ($1::INT IS NULL OR q.year = $1)
              AND ($2::INT IS NULL OR q.month = $2)
              AND ($3::TEXT IS NULL OR q.category = $3)
            ORDER BY q.year, q.month, v.name, q.category
            "#
        ))
        .bind(filter.year)
        .bind(filter.month)
        .bind(filter.category.as_deref())
        .fetch_all(executor)
        .await?;

        Ok(quotas)
    }

    async fn find_vendor_quota<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<TechnologyVendorQuota, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TechnologyVendorQuota>(&format!("{VENDOR_QUOTA_SELECT} WHERE q.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create_vendor_quota<'e, E>(
        &self,
        executor: E,
        payload: &CreateVendorQuotaPayload,
    ) -> Result<TechnologyVendorQuota, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let category = payload.category.trim();

        let name = sqlx::query_scalar::<_, String>("SELECT name FROM technology_vendors WHERE id = $1")
            .bind(payload.vendor_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound)?;

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM technology_vendor_quotas
                WHERE vendor_id = $1 AND year = $2 AND month = $3 AND category = $4
            )
            "#,
        )
        .bind(payload.vendor_id)
        .bind(payload.year)
        .bind(payload.month)
        .bind(category)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            return Err(AppError::DuplicateQuota(format!("{} / {}", name, category)));
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO technology_vendor_quotas
                (vendor_id, year, month, category, target_amount, actual_amount)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(payload.vendor_id)
        .bind(payload.year)
        .bind(payload.month)
        .bind(category)
        .bind(payload.target_amount)
        .bind(payload.actual_amount)
        .fetch_one(&mut *tx)
        .await?;

        let quota = self.find_vendor_quota(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(quota)
    }

    pub async fn update_vendor_quota<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateAmountsPayload,
    ) -> Result<TechnologyVendorQuota, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE technology_vendor_quotas SET
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

        let quota = self.find_vendor_quota(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(quota)
    }

    pub async fn delete_vendor_quota<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM technology_vendor_quotas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // =========================================================================
    //  METAS POR CATEGORIA
    // =========================================================================

    pub async fn list_category_quotas<'e, E>(
        &self,
        executor: E,
        filter: &TechnologyFilter,
    ) -> Result<Vec<TechnologyCategoryQuota>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let quotas = sqlx::query_as::<_, TechnologyCategoryQuota>(&format!(
            r#"
            SELECT {CATEGORY_QUOTA_COLUMNS}
            FROM technology_category_quotas
            WHERE ($1::INT IS NULL OR year = $1)
              AND ($2::INT IS NULL OR month = $2)
              AND ($3::TEXT IS NULL OR category = $3)
            ORDER BY year, month, category
            "#
        ))
        .bind(filter.year)
        .bind(filter.month)
        .bind(filter.category.as_deref())
        .fetch_all(executor)
        .await?;

        Ok(quotas)
    }

    pub async fn create_category_quota<'e, E>(
        &self,
        executor: E,
        payload: &CreateCategoryQuotaPayload,
    ) -> Result<TechnologyCategoryQuota, AppError>
    where
        E: Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;
        let category = payload.category.trim();

        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM technology_category_quotas
                WHERE year = $1 AND month = $2 AND category = $3
            )
            "#,
        )
        .bind(payload.year)
        .bind(payload.month)
        .bind(category)
        .fetch_one(&mut *tx)
        .await?;

        if exists {
            return Err(AppError::DuplicateQuota(category.to_string()));
        }

        let quota = sqlx::query_as::<_, TechnologyCategoryQuota>(&format!(
            r#"
            INSERT INTO technology_category_quotas (year, month, category, target_amount, actual_amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {CATEGORY_QUOTA_COLUMNS}
            "#
        ))
        .bind(payload.year)
        .bind(payload.month)
        .bind(category)
        .bind(payload.target_amount)
        .bind(payload.actual_amount)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(quota)
    }

    pub async fn update_category_quota<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &UpdateAmountsPayload,
    ) -> Result<TechnologyCategoryQuota, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, TechnologyCategoryQuota>(&format!(
            r#"
            UPDATE technology_category_quotas SET
                target_amount = COALESCE($2, target_amount),
                actual_amount = COALESCE($3, actual_amount)
            WHERE id = $1
            RETURNING {CATEGORY_QUOTA_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(payload.target_amount)
        .bind(payload.actual_amount)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn delete_category_quota<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM technology_category_quotas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
