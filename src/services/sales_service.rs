// src/services/sales_service.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SalesRepository,
    models::sales::{CreateSalePayload, SalesFilter, SalesRecord, UpdateSalePayload},
    views::{Entity, Mutation, MutationStatus},
};

#[derive(Clone)]
pub struct SalesService {
    repo: SalesRepository,
}

impl SalesService {
    pub fn new(repo: SalesRepository) -> Self {
        Self { repo }
    }

    pub async fn list<'e, E>(&self, executor: E, filter: &SalesFilter) -> Result<Vec<SalesRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list(executor, filter).await
    }

    // Grava e relê a linha para trazer o nome do técnico
    pub async fn create(
        &self,
        pool: &PgPool,
        payload: &CreateSalePayload,
    ) -> Result<Mutation<SalesRecord>, AppError> {
        let id = self.repo.create(pool, payload).await?;
        let record = self.repo.find_by_id(pool, id).await?;
        Ok(Mutation::created(Entity::Sale, record))
    }

    pub async fn update(
        &self,
        pool: &PgPool,
        id: Uuid,
        payload: &UpdateSalePayload,
    ) -> Result<Mutation<SalesRecord>, AppError> {
        self.repo.update(pool, id, payload).await?;
        let record = self.repo.find_by_id(pool, id).await?;
        Ok(Mutation::updated(Entity::Sale, record))
    }

    pub async fn delete(&self, pool: &PgPool, id: Uuid) -> Result<Mutation<()>, AppError> {
        self.repo.delete(pool, id).await?;
        Ok(Mutation::removed(Entity::Sale, MutationStatus::Deleted))
    }
}
