// src/services/analytics_service.rs
//
// Visão anual: séries, janela móvel, crescimento, rankings e sazonalidade.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        validation::{check_year, into_result},
    },
    db::{LogisticsRepository, SalesRepository, TechnicianRepository, TechnologyRepository},
    models::{
        analytics::{AnalyticsKpis, AnnualAnalytics, EntityTotals, MonthlyPoint, SeasonalityPoint},
        logistics::LogisticsEntry,
        sales::{SaleKind, SalesRecord},
        technology::{TechnologyCategoryQuota, TechnologyFilter},
    },
    services::{
        aggregation::{
            group_by_entity, group_by_key, growth_series, monthly_series, percent_of, rank_top,
            rolling_window, sales_totals, DEFAULT_WINDOW_SIZE, FACTORY_LABEL,
        },
        logistics_stats::{logistics_monthly, logistics_totals},
    },
};

const TOP_PRODUCTS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct AnalyticsInputs {
    /// Vendas do ano anterior e do ano pedido (a janela móvel usa os dois)
    pub records: Vec<SalesRecord>,
    /// Id do técnico -> soma das metas do ano
    pub yearly_targets: Vec<(Uuid, Decimal)>,
    pub category_quotas: Vec<TechnologyCategoryQuota>,
    pub logistics_entries: Vec<LogisticsEntry>,
}

pub fn build_annual_analytics(year: i32, inputs: &AnalyticsInputs) -> AnnualAnalytics {
    let year_records: Vec<SalesRecord> = inputs
        .records
        .iter()
        .filter(|r| r.year == year)
        .cloned()
        .collect();

    let monthly = monthly_series(&year_records, year);
    let growth = growth_series(&monthly);

    let services: Vec<&SalesRecord> = year_records
        .iter()
        .filter(|r| r.kind == SaleKind::Service)
        .collect();
    let targets: HashMap<Uuid, Decimal> = inputs.yearly_targets.iter().copied().collect();
    let per_technician = ranked(
        group_by_key(
            &services,
            |r| r.technician_id,
            |r| r.technician_name.clone().unwrap_or_else(|| FACTORY_LABEL.to_string()),
        )
        .into_iter()
        .map(|(technician_id, mut t)| {
            // Com meta cadastrada no ano, ela substitui o previsto das vendas
            if let Some(target) = technician_id.and_then(|id| targets.get(&id)) {
                t.target_sum = *target;
                t.attainment_percent = percent_of(t.actual_sum, t.target_sum);
            }
            t
        })
        .collect(),
    );

    let technology_categories = technology_by_category(&year_records, &inputs.category_quotas, year);

    let logistics_year: Vec<LogisticsEntry> = inputs
        .logistics_entries
        .iter()
        .filter(|e| chrono::Datelike::year(&e.date) == year)
        .cloned()
        .collect();

    AnnualAnalytics {
        year,
        rolling: rolling_window(&inputs.records, year, DEFAULT_WINDOW_SIZE),
        growth,
        per_technician,
        technology_categories,
        logistics_monthly: logistics_monthly(&logistics_year, year),
        top_products: rank_top(&year_records, |r| r.category.as_str(), TOP_PRODUCTS),
        seasonality: seasonality(&monthly),
        kpis: kpis(&year_records, &monthly, &logistics_year),
        monthly,
    }
}

/// Vendas de tecnologia do ano por categoria. A meta da categoria, quando
/// cadastrada, substitui o previsto das vendas; categoria com meta e sem venda
/// aparece zerada.
pub fn technology_by_category(
    year_records: &[SalesRecord],
    category_quotas: &[TechnologyCategoryQuota],
    year: i32,
) -> Vec<EntityTotals> {
    let technology: Vec<&SalesRecord> = year_records
        .iter()
        .filter(|r| r.kind == SaleKind::Technology)
        .collect();

    let mut targets: BTreeMap<&str, Decimal> = BTreeMap::new();
    for quota in category_quotas.iter().filter(|q| q.year == year) {
        *targets.entry(quota.category.as_str()).or_insert(Decimal::ZERO) += quota.target_amount;
    }

    let mut categories =
        group_by_entity(&technology, |r| Some(r.category.as_str()), FACTORY_LABEL).into_vec();
    for category in &mut categories {
        if let Some(target) = targets.get(category.label.as_str()) {
            category.target_sum = *target;
            category.attainment_percent = percent_of(category.actual_sum, category.target_sum);
        }
    }

    for (label, target) in targets {
        if !categories.iter().any(|c| c.label == label) {
            categories.push(EntityTotals {
                label: label.to_string(),
                target_sum: target,
                actual_sum: Decimal::ZERO,
                attainment_percent: Decimal::ZERO,
                record_count: 0,
            });
        }
    }

    ranked(categories)
}

// Maior realizado primeiro; empates mantêm a ordem original
fn ranked(mut entities: Vec<EntityTotals>) -> Vec<EntityTotals> {
    entities.sort_by(|a, b| b.actual_sum.cmp(&a.actual_sum));
    entities
}

/// Desvio do atingimento em relação a 100%. Mês sem meta fica neutro.
pub fn seasonality(monthly: &[MonthlyPoint]) -> Vec<SeasonalityPoint> {
    monthly
        .iter()
        .map(|p| SeasonalityPoint {
            month_label: p.month_label.clone(),
            actual_sum: p.actual_sum,
            deviation_percent: if p.target_sum > Decimal::ZERO {
                p.attainment_percent - Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            },
        })
        .collect()
}

fn kpis(records: &[SalesRecord], monthly: &[MonthlyPoint], logistics: &[LogisticsEntry]) -> AnalyticsKpis {
    let months = Decimal::from(monthly.len().max(1));
    let mean_actual = monthly.iter().map(|p| p.actual_sum).sum::<Decimal>() / months;

    AnalyticsKpis {
        sales: sales_totals(records),
        months_target_met: monthly
            .iter()
            .filter(|p| p.target_sum > Decimal::ZERO && p.actual_sum >= p.target_sum)
            .count(),
        months_above_average: monthly.iter().filter(|p| p.actual_sum > mean_actual).count(),
        annual_growth_percent: annual_growth(monthly),
        logistics: logistics_totals(logistics),
    }
}

/// Dezembro contra janeiro; janeiro zerado usa base 1.
pub fn annual_growth(monthly: &[MonthlyPoint]) -> Decimal {
    let (Some(first), Some(last)) = (monthly.first(), monthly.last()) else {
        return Decimal::ZERO;
    };
    let base = if first.actual_sum > Decimal::ZERO { first.actual_sum } else { Decimal::ONE };
    (last.actual_sum - first.actual_sum) * Decimal::ONE_HUNDRED / base
}

#[derive(Clone)]
pub struct AnalyticsService {
    sales_repo: SalesRepository,
    technician_repo: TechnicianRepository,
    technology_repo: TechnologyRepository,
    logistics_repo: LogisticsRepository,
}

impl AnalyticsService {
    pub fn new(
        sales_repo: SalesRepository,
        technician_repo: TechnicianRepository,
        technology_repo: TechnologyRepository,
        logistics_repo: LogisticsRepository,
    ) -> Self {
        Self { sales_repo, technician_repo, technology_repo, logistics_repo }
    }

    pub async fn annual(&self, pool: &PgPool, year: i32) -> Result<AnnualAnalytics, AppError> {
        let mut errors = validator::ValidationErrors::new();
        check_year(&mut errors, "year", Some(year));
        into_result(errors)?;

        let filter = TechnologyFilter { year: Some(year), ..Default::default() };

        let (records, yearly_targets, category_quotas, logistics_entries) = tokio::try_join!(
            self.sales_repo.list_years(pool, year - 1, year),
            self.technician_repo.yearly_targets(pool, year),
            self.technology_repo.list_category_quotas(pool, &filter),
            self.logistics_repo.list(pool, Some(year), None),
        )?;

        let inputs = AnalyticsInputs { records, yearly_targets, category_quotas, logistics_entries };
        Ok(build_annual_analytics(year, &inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::aggregation::tests::record;

    fn inputs() -> AnalyticsInputs {
        AnalyticsInputs {
            records: vec![
                record(Some("Ana"), SaleKind::Service, "Revisão", 2026, 1, 1000, 1000),
                record(Some("Bruno"), SaleKind::Service, "Peças", 2026, 2, 1000, 3000),
                record(None, SaleKind::Technology, "Licenças", 2026, 12, 0, 2000),
                record(None, SaleKind::Service, "Peças", 2025, 12, 0, 500),
            ],
            ..Default::default()
        }
    }

    fn with_ana_target(mut inputs: AnalyticsInputs, target: i64) -> AnalyticsInputs {
        let ana_id = inputs.records[0].technician_id.unwrap();
        inputs.yearly_targets = vec![(ana_id, Decimal::from(target))];
        inputs
    }

    fn category_quota(category: &str, year: i32, month: i32, target: i64) -> TechnologyCategoryQuota {
        TechnologyCategoryQuota {
            id: Uuid::new_v4(),
            year,
            month,
            category: category.to_string(),
            target_amount: Decimal::from(target),
            actual_amount: Decimal::ZERO,
            attainment_percent: Decimal::ZERO,
        }
    }

    #[test]
    fn empty_year_is_structurally_complete() {
        let analytics = build_annual_analytics(2026, &AnalyticsInputs::default());
        assert_eq!(analytics.monthly.len(), 12);
        assert_eq!(analytics.growth.len(), 12);
        assert_eq!(analytics.logistics_monthly.len(), 12);
        assert_eq!(analytics.seasonality.len(), 12);
        assert!(analytics.rolling.is_empty());
        assert_eq!(analytics.kpis.annual_growth_percent, Decimal::ZERO);
    }

    #[test]
    fn technicians_are_ranked_and_use_yearly_targets() {
        let analytics = build_annual_analytics(2026, &with_ana_target(inputs(), 4000));
        let labels: Vec<&str> = analytics.per_technician.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Bruno", "Ana"]);

        let ana = &analytics.per_technician[1];
        assert_eq!(ana.target_sum, Decimal::from(4000));
        assert_eq!(ana.attainment_percent, Decimal::from(25));
    }

    #[test]
    fn rolling_window_reaches_into_previous_year() {
        let analytics = build_annual_analytics(2026, &inputs());
        assert_eq!(analytics.rolling.first().unwrap().period, "12/2025");
        // o ano anterior não entra nos totais do ano
        assert_eq!(analytics.kpis.sales.actual, Decimal::from(6000));
    }

    #[test]
    fn kpis_count_target_months_and_growth() {
        let analytics = build_annual_analytics(2026, &inputs());
        assert_eq!(analytics.kpis.months_target_met, 2);
        // média mensal = 500
        assert_eq!(analytics.kpis.months_above_average, 3);
        // (2000 - 1000) / 1000
        assert_eq!(analytics.kpis.annual_growth_percent, Decimal::from(100));
        assert_eq!(analytics.top_products[0].label, "Peças");
    }

    #[test]
    fn seasonality_is_neutral_without_target() {
        let analytics = build_annual_analytics(2026, &inputs());
        assert_eq!(analytics.seasonality[0].deviation_percent, Decimal::ZERO);
        assert_eq!(analytics.seasonality[1].deviation_percent, Decimal::from(200));
        assert_eq!(analytics.seasonality[11].deviation_percent, Decimal::ZERO);
    }

    #[test]
    fn homonym_technicians_keep_their_own_targets() {
        let mut inputs = with_ana_target(inputs(), 4000);
        inputs.records.push(record(Some("Ana"), SaleKind::Service, "Peças", 2026, 5, 0, 800));

        let analytics = build_annual_analytics(2026, &inputs);
        let anas: Vec<&EntityTotals> =
            analytics.per_technician.iter().filter(|t| t.label == "Ana").collect();
        assert_eq!(anas.len(), 2);
        assert_eq!(anas[0].actual_sum, Decimal::from(1000));
        assert_eq!(anas[0].target_sum, Decimal::from(4000));
        assert_eq!(anas[1].actual_sum, Decimal::from(800));
        assert_eq!(anas[1].target_sum, Decimal::ZERO);
    }

    #[test]
    fn technology_categories_come_from_technology_sales() {
        let mut inputs = AnalyticsInputs {
            records: vec![
                record(None, SaleKind::Technology, "Licenças", 2026, 3, 0, 2000),
                record(Some("Ana"), SaleKind::Service, "Revisão", 2026, 3, 0, 9000),
            ],
            ..Default::default()
        };

        let analytics = build_annual_analytics(2026, &inputs);
        assert_eq!(analytics.technology_categories.len(), 1);
        let licenses = &analytics.technology_categories[0];
        assert_eq!(licenses.label, "Licenças");
        assert_eq!(licenses.actual_sum, Decimal::from(2000));
        assert_eq!(licenses.record_count, 1);

        inputs.category_quotas = vec![
            category_quota("Licenças", 2026, 3, 1000),
            category_quota("Licenças", 2026, 4, 3000),
            category_quota("Sinais", 2026, 3, 500),
        ];
        let analytics = build_annual_analytics(2026, &inputs);
        let labels: Vec<&str> =
            analytics.technology_categories.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Licenças", "Sinais"]);

        let licenses = &analytics.technology_categories[0];
        assert_eq!(licenses.target_sum, Decimal::from(4000));
        assert_eq!(licenses.attainment_percent, Decimal::from(50));
        let signals = &analytics.technology_categories[1];
        assert_eq!(signals.actual_sum, Decimal::ZERO);
        assert_eq!(signals.record_count, 0);
    }

    #[tokio::test]
    async fn annual_rejects_years_out_of_range() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/painel")
            .unwrap();
        let service = AnalyticsService::new(
            SalesRepository::new(pool.clone()),
            TechnicianRepository::new(pool.clone()),
            TechnologyRepository::new(pool.clone()),
            LogisticsRepository::new(pool.clone()),
        );

        let result = service.annual(&pool, i32::MIN).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
