// src/services/logistics_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LogisticsRepository,
    models::{
        analytics::LogisticsSummary,
        logistics::{CreateLogisticsPayload, LogisticsEntry, UpdateLogisticsPayload},
    },
    services::logistics_stats::logistics_summary,
    views::{Entity, Mutation, MutationStatus},
};

#[derive(Clone)]
pub struct LogisticsService {
    repo: LogisticsRepository,
}

impl LogisticsService {
    pub fn new(repo: LogisticsRepository) -> Self {
        Self { repo }
    }

    pub async fn list(
        &self,
        pool: &PgPool,
        year: Option<i32>,
        month: Option<i32>,
    ) -> Result<Vec<LogisticsEntry>, AppError> {
        self.repo.list(pool, year, month).await
    }

    pub async fn plates(&self, pool: &PgPool) -> Result<Vec<String>, AppError> {
        self.repo.list_plates(pool).await
    }

    /// Cartões de resumo: totais e custos por veículo do período.
    pub async fn summary(
        &self,
        pool: &PgPool,
        year: Option<i32>,
        month: Option<i32>,
    ) -> Result<LogisticsSummary, AppError> {
        let entries = self.repo.list(pool, year, month).await?;
        Ok(logistics_summary(&entries))
    }

    pub async fn create(
        &self,
        pool: &PgPool,
        payload: CreateLogisticsPayload,
    ) -> Result<Mutation<LogisticsEntry>, AppError> {
        let entry = self.repo.create(pool, &payload.normalized()).await?;
        Ok(Mutation::created(Entity::LogisticsEntry, entry))
    }

    pub async fn update(
        &self,
        pool: &PgPool,
        id: Uuid,
        payload: UpdateLogisticsPayload,
    ) -> Result<Mutation<LogisticsEntry>, AppError> {
        let entry = self.repo.update(pool, id, &payload.normalized()).await?;
        Ok(Mutation::updated(Entity::LogisticsEntry, entry))
    }

    pub async fn delete(&self, pool: &PgPool, id: Uuid) -> Result<Mutation<()>, AppError> {
        self.repo.delete(pool, id).await?;
        Ok(Mutation::removed(Entity::LogisticsEntry, MutationStatus::Deleted))
    }
}
