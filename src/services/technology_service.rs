// src/services/technology_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TechnologyRepository,
    models::{
        analytics::{CategorySummary, CommissionRuleView, TechnologySummary},
        sales::UpdateAmountsPayload,
        technology::{
            CreateCategoryQuotaPayload, CreateVendorPayload, CreateVendorQuotaPayload,
            TechnologyCategoryQuota, TechnologyFilter, TechnologyVendor, TechnologyVendorQuota,
            UpdateVendorPayload,
        },
    },
    services::{
        aggregation::{group_by_entity, percent_of, FACTORY_LABEL},
        commission::{fixed_categories, rule_for, rule_views, TechCategory},
        technician_service::removal_status,
    },
    views::{Entity, Mutation, MutationStatus},
};

impl TechnologyVendorQuota {
    fn with_attainment(mut self) -> Self {
        self.attainment_percent = percent_of(self.actual_amount, self.target_amount);
        self
    }
}

impl TechnologyCategoryQuota {
    fn with_attainment(mut self) -> Self {
        self.attainment_percent = percent_of(self.actual_amount, self.target_amount);
        self
    }
}

// Categorias conhecidas agrupam pelo rótulo da regra; as demais pelo próprio nome
fn canonical_category(category: &str) -> String {
    let rule = rule_for(category);
    if rule.category == TechCategory::General {
        category.trim().to_string()
    } else {
        rule.label.to_string()
    }
}

/// Resumo anual: as categorias fixas sempre aparecem, mesmo zeradas.
pub fn technology_summary(
    year: i32,
    category_quotas: &[TechnologyCategoryQuota],
    vendor_quotas: &[TechnologyVendorQuota],
) -> TechnologySummary {
    // (rótulo, previsto, realizado), fixas primeiro
    let mut sums: Vec<(String, Decimal, Decimal)> = fixed_categories()
        .map(|label| (label.to_string(), Decimal::ZERO, Decimal::ZERO))
        .collect();

    for quota in category_quotas {
        let label = canonical_category(&quota.category);
        let idx = match sums.iter().position(|(l, _, _)| *l == label) {
            Some(idx) => idx,
            None => {
                sums.push((label, Decimal::ZERO, Decimal::ZERO));
                sums.len() - 1
            }
        };
        sums[idx].1 += quota.target_amount;
        sums[idx].2 += quota.actual_amount;
    }

    let categories: Vec<CategorySummary> = sums
        .iter()
        .map(|(label, target, actual)| category_summary(label, *target, *actual))
        .collect();

    let total_target = categories.iter().map(|c| c.target_sum).sum();
    let total_actual = categories.iter().map(|c| c.actual_sum).sum();
    let total_commission = categories.iter().map(|c| c.commission).sum();

    TechnologySummary {
        year,
        categories,
        vendors: group_by_entity(vendor_quotas, |q| Some(q.vendor_name.as_str()), FACTORY_LABEL),
        total_target,
        total_actual,
        total_commission,
    }
}

fn category_summary(label: &str, target_sum: Decimal, actual_sum: Decimal) -> CategorySummary {
    let rule = rule_for(label);
    CategorySummary {
        category: label.to_string(),
        target_sum,
        actual_sum,
        attainment_percent: percent_of(actual_sum, target_sum),
        rule_label: rule.label.to_string(),
        rate_percent: rule.rate * Decimal::ONE_HUNDRED,
        commission: actual_sum * rule.rate,
    }
}

#[derive(Clone)]
pub struct TechnologyService {
    repo: TechnologyRepository,
}

impl TechnologyService {
    pub fn new(repo: TechnologyRepository) -> Self {
        Self { repo }
    }

    pub fn commission_rules(&self) -> Vec<CommissionRuleView> {
        rule_views()
    }

    pub async fn summary(&self, pool: &PgPool, year: i32) -> Result<TechnologySummary, AppError> {
        let filter = TechnologyFilter { year: Some(year), ..Default::default() };
        let (category_quotas, vendor_quotas) = tokio::try_join!(
            self.repo.list_category_quotas(pool, &filter),
            self.repo.list_vendor_quotas(pool, &filter),
        )?;
        Ok(technology_summary(year, &category_quotas, &vendor_quotas))
    }

    // --- Vendedores ---

    pub async fn list_vendors(
        &self,
        pool: &PgPool,
        include_inactive: bool,
    ) -> Result<Vec<TechnologyVendor>, AppError> {
        self.repo.list_vendors(pool, include_inactive).await
    }

    pub async fn create_vendor(
        &self,
        pool: &PgPool,
        payload: &CreateVendorPayload,
    ) -> Result<Mutation<TechnologyVendor>, AppError> {
        let vendor = self.repo.create_vendor(pool, payload).await?;
        Ok(Mutation::created(Entity::TechnologyVendor, vendor))
    }

    pub async fn update_vendor(
        &self,
        pool: &PgPool,
        id: Uuid,
        payload: &UpdateVendorPayload,
    ) -> Result<Mutation<TechnologyVendor>, AppError> {
        let vendor = self.repo.update_vendor(pool, id, payload).await?;
        Ok(Mutation::updated(Entity::TechnologyVendor, vendor))
    }

    pub async fn remove_vendor(&self, pool: &PgPool, id: Uuid) -> Result<Mutation<()>, AppError> {
        let removal = self.repo.remove_vendor(pool, id).await?;
        Ok(Mutation::removed(Entity::TechnologyVendor, removal_status(removal)))
    }

    // --- Metas por vendedor ---

    pub async fn list_vendor_quotas(
        &self,
        pool: &PgPool,
        filter: &TechnologyFilter,
    ) -> Result<Vec<TechnologyVendorQuota>, AppError> {
        let quotas = self.repo.list_vendor_quotas(pool, filter).await?;
        Ok(quotas.into_iter().map(TechnologyVendorQuota::with_attainment).collect())
    }

    pub async fn create_vendor_quota(
        &self,
        pool: &PgPool,
        payload: &CreateVendorQuotaPayload,
    ) -> Result<Mutation<TechnologyVendorQuota>, AppError> {
        let quota = self.repo.create_vendor_quota(pool, payload).await?;
        Ok(Mutation::created(Entity::TechnologyVendorQuota, quota.with_attainment()))
    }

    pub async fn update_vendor_quota(
        &self,
        pool: &PgPool,
        id: Uuid,
        payload: &UpdateAmountsPayload,
    ) -> Result<Mutation<TechnologyVendorQuota>, AppError> {
        let quota = self.repo.update_vendor_quota(pool, id, payload).await?;
        Ok(Mutation::updated(Entity::TechnologyVendorQuota, quota.with_attainment()))
    }

    pub async fn delete_vendor_quota(&self, pool: &PgPool, id: Uuid) -> Result<Mutation<()>, AppError> {
        self.repo.delete_vendor_quota(pool, id).await?;
        Ok(Mutation::removed(Entity::TechnologyVendorQuota, MutationStatus::Deleted))
    }

    // --- Metas por categoria ---

    pub async fn list_category_quotas(
        &self,
        pool: &PgPool,
        filter: &TechnologyFilter,
    ) -> Result<Vec<TechnologyCategoryQuota>, AppError> {
        let quotas = self.repo.list_category_quotas(pool, filter).await?;
        Ok(quotas.into_iter().map(TechnologyCategoryQuota::with_attainment).collect())
    }

    pub async fn create_category_quota(
        &self,
        pool: &PgPool,
        payload: &CreateCategoryQuotaPayload,
    ) -> Result<Mutation<TechnologyCategoryQuota>, AppError> {
        let quota = self.repo.create_category_quota(pool, payload).await?;
        Ok(Mutation::created(Entity::TechnologyCategoryQuota, quota.with_attainment()))
    }

    pub async fn update_category_quota(
        &self,
        pool: &PgPool,
        id: Uuid,
        payload: &UpdateAmountsPayload,
    ) -> Result<Mutation<TechnologyCategoryQuota>, AppError> {
        let quota = self.repo.update_category_quota(pool, id, payload).await?;
        Ok(Mutation::updated(Entity::TechnologyCategoryQuota, quota.with_attainment()))
    }

    pub async fn delete_category_quota(
        &self,
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Mutation<()>, AppError> {
        self.repo.delete_category_quota(pool, id).await?;
        Ok(Mutation::removed(Entity::TechnologyCategoryQuota, MutationStatus::Deleted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_quota(category: &str, target: i64, actual: i64) -> TechnologyCategoryQuota {
        TechnologyCategoryQuota {
            id: Uuid::new_v4(),
            year: 2026,
            month: 1,
            category: category.to_string(),
            target_amount: Decimal::from(target),
            actual_amount: Decimal::from(actual),
            attainment_percent: Decimal::ZERO,
        }
    }

    fn vendor_quota(vendor: &str, actual: i64) -> TechnologyVendorQuota {
        TechnologyVendorQuota {
            id: Uuid::new_v4(),
            vendor_id: Uuid::new_v4(),
            vendor_name: vendor.to_string(),
            year: 2026,
            month: 1,
            category: "SINAIS PTx Trimble".to_string(),
            target_amount: Decimal::ZERO,
            actual_amount: Decimal::from(actual),
            attainment_percent: Decimal::ZERO,
        }
    }

    #[test]
    fn fixed_categories_always_show_up() {
        let summary = technology_summary(2026, &[], &[]);
        assert_eq!(summary.categories.len(), 4);
        assert!(summary.categories.iter().all(|c| c.actual_sum.is_zero()));
        assert!(summary.vendors.is_empty());
        assert_eq!(summary.total_commission, Decimal::ZERO);
    }

    #[test]
    fn variants_are_folded_into_the_rule_category() {
        let quotas = vec![
            category_quota("SINAIS PTx Trimble", 20000, 10000),
            category_quota("sinais rtk", 0, 5000),
            category_quota("Drones", 1000, 1000),
        ];
        let summary = technology_summary(2026, &quotas, &[vendor_quota("Maria", 300)]);

        let signals = &summary.categories[0];
        assert_eq!(signals.actual_sum, Decimal::from(15000));
        assert_eq!(signals.commission, Decimal::from(690));
        assert_eq!(signals.attainment_percent, Decimal::from(75));

        let drones = summary.categories.last().unwrap();
        assert_eq!(drones.category, "Drones");
        assert_eq!(drones.commission, Decimal::from(100));

        assert_eq!(summary.total_actual, Decimal::from(16000));
        assert_eq!(summary.total_commission, Decimal::from(790));
        assert_eq!(summary.vendors.get("Maria").unwrap().actual_sum, Decimal::from(300));
    }
}
