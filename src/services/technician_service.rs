// src/services/technician_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Removal, TechnicianRepository},
    models::sales::{
        CreateQuotaPayload, CreateTechnicianPayload, FactoryQuota, FactoryQuotaPayload, Technician,
        TechnicianQuota, UpdateAmountsPayload, UpdateTechnicianPayload, UpsertQuotaPayload,
    },
    services::aggregation::percent_of,
    views::{Entity, Mutation, MutationStatus},
};

impl TechnicianQuota {
    fn with_attainment(mut self) -> Self {
        self.attainment_percent = percent_of(self.actual_amount, self.target_amount);
        self
    }
}

impl FactoryQuota {
    fn with_attainment(mut self) -> Self {
        self.attainment_percent = percent_of(self.actual_amount, self.target_amount);
        self
    }
}

pub(crate) fn removal_status(removal: Removal) -> MutationStatus {
    match removal {
        Removal::Deleted => MutationStatus::Deleted,
        Removal::Deactivated => MutationStatus::Deactivated,
    }
}

#[derive(Clone)]
pub struct TechnicianService {
    repo: TechnicianRepository,
}

impl TechnicianService {
    pub fn new(repo: TechnicianRepository) -> Self {
        Self { repo }
    }

    // --- Técnicos ---

    pub async fn list_technicians(
        &self,
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<Technician>, AppError> {
        self.repo.list_technicians(pool, include_inactive).await
    }

    pub async fn create_technician(
        &self,
        pool: &PgPool,
        payload: &CreateTechnicianPayload,
    ) -> Result<Mutation<Technician>, AppError> {
        let technician = self.repo.create_technician(pool, payload).await?;
        Ok(Mutation::created(Entity::Technician, technician))
    }

    pub async fn update_technician(
        &self,
        pool: &PgPool,
        id: Uuid,
        payload: &UpdateTechnicianPayload,
    ) -> Result<Mutation<Technician>, AppError> {
        let technician = self.repo.update_technician(pool, id, payload).await?;
        Ok(Mutation::updated(Entity::Technician, technician))
    }

    pub async fn remove_technician(&self, pool: &PgPool, id: Uuid) -> Result<Mutation<()>, AppError> {
        let removal = self.repo.remove_technician(pool, id).await?;
        if removal == Removal::Deactivated {
            tracing::info!(technician_id = %id, "Técnico com histórico foi desativado");
        }
        Ok(Mutation::removed(Entity::Technician, removal_status(removal)))
    }

    // --- Metas por técnico ---

    pub async fn list_quotas(
        &self,
        pool: &PgPool,
        year: i32,
        month: Option<i32>,
    ) -> Result<Vec<TechnicianQuota>, AppError> {
        let quotas = self.repo.list_quotas(pool, year, month).await?;
        Ok(quotas.into_iter().map(TechnicianQuota::with_attainment).collect())
    }

    pub async fn create_quota(
        &self,
        pool: &PgPool,
        payload: &CreateQuotaPayload,
    ) -> Result<Mutation<TechnicianQuota>, AppError> {
        let quota = self.repo.create_quota(pool, payload).await?;
        Ok(Mutation::created(Entity::TechnicianQuota, quota.with_attainment()))
    }

    pub async fn upsert_quota(
        &self,
        pool: &PgPool,
        payload: &UpsertQuotaPayload,
    ) -> Result<Mutation<TechnicianQuota>, AppError> {
        let quota = self.repo.upsert_quota(pool, payload).await?;
        Ok(Mutation::updated(Entity::TechnicianQuota, quota.with_attainment()))
    }

    pub async fn update_quota(
        &self,
        pool: &PgPool,
        id: Uuid,
        payload: &UpdateAmountsPayload,
    ) -> Result<Mutation<TechnicianQuota>, AppError> {
        let quota = self.repo.update_quota(pool, id, payload).await?;
        Ok(Mutation::updated(Entity::TechnicianQuota, quota.with_attainment()))
    }

    pub async fn delete_quota(&self, pool: &PgPool, id: Uuid) -> Result<Mutation<()>, AppError> {
        self.repo.delete_quota(pool, id).await?;
        Ok(Mutation::removed(Entity::TechnicianQuota, MutationStatus::Deleted))
    }

    // --- Metas da fábrica ---

    pub async fn list_factory_quotas(&self, pool: &PgPool, year: i32) -> Result<Vec<FactoryQuota>, AppError> {
        let quotas = self.repo.list_factory_quotas(pool, year).await?;
        Ok(quotas.into_iter().map(FactoryQuota::with_attainment).collect())
    }

    pub async fn upsert_factory_quota(
        &self,
        pool: &PgPool,
        payload: &FactoryQuotaPayload,
    ) -> Result<Mutation<FactoryQuota>, AppError> {
        let quota = self.repo.upsert_factory_quota(pool, payload).await?;
        Ok(Mutation::updated(Entity::FactoryQuota, quota.with_attainment()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn quota_attainment_is_filled_after_fetch() {
        let quota = FactoryQuota {
            id: Uuid::new_v4(),
            year: 2026,
            month: 3,
            target_amount: Decimal::from(800),
            actual_amount: Decimal::from(600),
            attainment_percent: Decimal::ZERO,
        }
        .with_attainment();
        assert_eq!(quota.attainment_percent, Decimal::from(75));
    }

    #[test]
    fn referenced_records_report_deactivation() {
        assert_eq!(removal_status(Removal::Deactivated), MutationStatus::Deactivated);
        assert_eq!(removal_status(Removal::Deleted), MutationStatus::Deleted);
    }
}
