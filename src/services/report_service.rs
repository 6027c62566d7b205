// src/services/report_service.rs

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        validation::{check_month, check_year, into_result},
    },
    db::{LogisticsRepository, SalesRepository, TechnicianRepository},
    models::{
        logistics::LogisticsEntry,
        report::{
            MonthlyReport, ReportRankings, ReportTotals, ReportVariations, TechnicianPerformance,
        },
        sales::{FactoryQuota, SaleKind, SalesFilter, SalesRecord, TechnicianQuota},
    },
    services::{
        aggregation::{
            group_by_entity, month_name, monthly_series, percent_change, percent_of,
            previous_month, rank_top, sales_totals, FACTORY_LABEL,
        },
        commission::{commission_breakdown, GENERAL_TARGET_RATIO},
        logistics_stats::logistics_summary,
    },
};

const TOP_CATEGORIES: usize = 5;

/// Tudo o que o relatório mensal precisa. Coleção ausente = coleção vazia.
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    pub current_records: Vec<SalesRecord>,
    pub technician_quotas: Vec<TechnicianQuota>,
    pub factory_quota: Option<FactoryQuota>,
    pub logistics_entries: Vec<LogisticsEntry>,
    pub prior_month_records: Vec<SalesRecord>,
    pub prior_year_same_month_records: Vec<SalesRecord>,
    pub full_year_records: Vec<SalesRecord>,
}

/// Monta o relatório do mês a partir de dados já carregados. Não faz I/O.
pub fn build_monthly_report(year: i32, month: i32, inputs: &ReportInputs) -> MonthlyReport {
    let current = &inputs.current_records;

    let sales = sales_totals(current);
    let general_target = sales.target * GENERAL_TARGET_RATIO;
    let totals = ReportTotals {
        target: sales.target,
        actual: sales.actual,
        service_actual: sales.service_actual,
        technology_actual: sales.technology_actual,
        service_share_percent: percent_of(sales.service_actual, sales.actual),
        technology_share_percent: percent_of(sales.technology_actual, sales.actual),
        attainment_percent: sales.attainment_percent,
        record_count: sales.record_count,
        average_ticket: sales.average_ticket,
        general_target,
        difference_to_general_target: sales.actual - general_target,
    };

    let prior_month_actual = sum_actual(&inputs.prior_month_records);
    let prior_year_actual = sum_actual(&inputs.prior_year_same_month_records);
    let variations = ReportVariations {
        prior_month_actual,
        prior_year_actual,
        vs_prior_month_percent: percent_change(sales.actual, prior_month_actual),
        vs_prior_year_percent: percent_change(sales.actual, prior_year_actual),
    };

    let per_technician = technician_performance(inputs);

    let technology: Vec<&SalesRecord> = current
        .iter()
        .filter(|r| r.kind == SaleKind::Technology)
        .collect();
    let per_category =
        group_by_entity(&technology, |r| Some(r.category.as_str()), FACTORY_LABEL);
    let commissions =
        commission_breakdown(per_category.iter().map(|g| (g.label.as_str(), g.actual_sum)));

    let top_technician = per_technician
        .iter()
        .filter(|t| t.technician_id.is_some())
        .fold(None::<&TechnicianPerformance>, |best, t| match best {
            Some(b) if b.actual_sum >= t.actual_sum => Some(b),
            _ => Some(t),
        })
        .cloned();

    MonthlyReport {
        period: format!("{}/{}", month_name(month), year),
        year,
        month,
        totals,
        variations,
        per_technician,
        per_category,
        commissions,
        logistics: logistics_summary(&inputs.logistics_entries),
        rankings: ReportRankings {
            top_categories: rank_top(current, |r| r.category.as_str(), TOP_CATEGORIES),
            top_technician,
        },
        annual_trend: monthly_series(&inputs.full_year_records, year),
    }
}

fn sum_actual(records: &[SalesRecord]) -> Decimal {
    records.iter().map(|r| r.actual_amount).sum()
}

// Vendas de serviço por técnico, com a meta mensal de cada um.
// Agrupa pelo id do técnico; o nome serve só de rótulo.
fn technician_performance(inputs: &ReportInputs) -> Vec<TechnicianPerformance> {
    let quotas: HashMap<Uuid, &TechnicianQuota> = inputs
        .technician_quotas
        .iter()
        .map(|q| (q.technician_id, q))
        .collect();
    let factory_target = inputs
        .factory_quota
        .as_ref()
        .map(|f| f.target_amount)
        .unwrap_or(Decimal::ZERO);
    let quota_target = |technician_id: Option<Uuid>| match technician_id {
        Some(id) => quotas.get(&id).map(|q| q.target_amount).unwrap_or(Decimal::ZERO),
        None => factory_target,
    };

    let mut positions: HashMap<Option<Uuid>, usize> = HashMap::new();
    let mut rows: Vec<TechnicianPerformance> = Vec::new();

    for record in inputs
        .current_records
        .iter()
        .filter(|r| r.kind == SaleKind::Service)
    {
        let key = record.technician_id;
        let idx = match positions.get(&key) {
            Some(&idx) => idx,
            None => {
                let label = match key {
                    Some(id) => record
                        .technician_name
                        .clone()
                        .or_else(|| quotas.get(&id).map(|q| q.technician_name.clone()))
                        .unwrap_or_else(|| id.to_string()),
                    None => FACTORY_LABEL.to_string(),
                };
                rows.push(performance(key, &label, Decimal::ZERO, Decimal::ZERO, quota_target(key)));
                positions.insert(key, rows.len() - 1);
                rows.len() - 1
            }
        };
        let row = &mut rows[idx];
        row.planned_sum += record.target_amount;
        row.actual_sum += record.actual_amount;
    }

    for row in &mut rows {
        row.attainment_percent = attainment(row.actual_sum, row.planned_sum, row.quota_target);
    }

    // Técnicos com meta e sem venda também aparecem, zerados
    for quota in &inputs.technician_quotas {
        if !positions.contains_key(&Some(quota.technician_id)) {
            rows.push(performance(
                Some(quota.technician_id),
                &quota.technician_name,
                Decimal::ZERO,
                Decimal::ZERO,
                quota.target_amount,
            ));
        }
    }

    if inputs.factory_quota.is_some() && !positions.contains_key(&None) {
        rows.push(performance(None, FACTORY_LABEL, Decimal::ZERO, Decimal::ZERO, factory_target));
    }

    rows
}

// Sem meta cadastrada, compara com o previsto das vendas
fn attainment(actual_sum: Decimal, planned_sum: Decimal, quota_target: Decimal) -> Decimal {
    let base = if quota_target > Decimal::ZERO { quota_target } else { planned_sum };
    percent_of(actual_sum, base)
}

fn performance(
    technician_id: Option<Uuid>,
    label: &str,
    planned_sum: Decimal,
    actual_sum: Decimal,
    quota_target: Decimal,
) -> TechnicianPerformance {
    TechnicianPerformance {
        technician_id,
        label: label.to_string(),
        planned_sum,
        actual_sum,
        quota_target,
        attainment_percent: attainment(actual_sum, planned_sum, quota_target),
    }
}

#[derive(Clone)]
pub struct ReportService {
    sales_repo: SalesRepository,
    technician_repo: TechnicianRepository,
    logistics_repo: LogisticsRepository,
}

impl ReportService {
    pub fn new(
        sales_repo: SalesRepository,
        technician_repo: TechnicianRepository,
        logistics_repo: LogisticsRepository,
    ) -> Self {
        Self { sales_repo, technician_repo, logistics_repo }
    }

    /// Busca as sete coleções em paralelo e monta o relatório.
    pub async fn monthly_report(
        &self,
        pool: &PgPool,
        year: i32,
        month: i32,
    ) -> Result<MonthlyReport, AppError> {
        let mut errors = validator::ValidationErrors::new();
        check_year(&mut errors, "year", Some(year));
        check_month(&mut errors, "month", Some(month));
        into_result(errors)?;

        let (prior_year, prior_month) = previous_month(year, month);
        let current = SalesFilter::period(year, Some(month));
        let prior = SalesFilter::period(prior_year, Some(prior_month));
        let prior_year_same_month = SalesFilter::period(year - 1, Some(month));
        let full_year = SalesFilter::period(year, None);

        let (
            current_records,
            technician_quotas,
            factory_quota,
            logistics_entries,
            prior_month_records,
            prior_year_same_month_records,
            full_year_records,
        ) = tokio::try_join!(
            self.sales_repo.list(pool, &current),
            self.technician_repo.list_quotas(pool, year, Some(month)),
            self.technician_repo.find_factory_quota(pool, year, month),
            self.logistics_repo.list(pool, Some(year), Some(month)),
            self.sales_repo.list(pool, &prior),
            self.sales_repo.list(pool, &prior_year_same_month),
            self.sales_repo.list(pool, &full_year),
        )?;

        let inputs = ReportInputs {
            current_records,
            technician_quotas,
            factory_quota,
            logistics_entries,
            prior_month_records,
            prior_year_same_month_records,
            full_year_records,
        };

        tracing::debug!(
            year,
            month,
            records = inputs.current_records.len(),
            "Montando relatório mensal"
        );

        Ok(build_monthly_report(year, month, &inputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::aggregation::tests::record;

    fn quota(technician_id: Uuid, name: &str, target: i64) -> TechnicianQuota {
        TechnicianQuota {
            id: Uuid::new_v4(),
            technician_id,
            technician_name: name.to_string(),
            year: 2026,
            month: 3,
            target_amount: Decimal::from(target),
            actual_amount: Decimal::ZERO,
            attainment_percent: Decimal::ZERO,
        }
    }

    fn march_inputs() -> ReportInputs {
        let current = vec![
            record(Some("Ana"), SaleKind::Service, "Revisão", 2026, 3, 4000, 5000),
            record(None, SaleKind::Technology, "SINAIS PTx Trimble", 2026, 3, 3000, 2000),
        ];
        ReportInputs {
            full_year_records: current.clone(),
            current_records: current,
            ..Default::default()
        }
    }

    #[test]
    fn march_scenario_totals() {
        let report = build_monthly_report(2026, 3, &march_inputs());
        assert_eq!(report.period, "Março/2026");
        assert_eq!(report.totals.target, Decimal::from(7000));
        assert_eq!(report.totals.actual, Decimal::from(7000));
        assert_eq!(report.totals.service_actual, Decimal::from(5000));
        assert_eq!(report.totals.technology_actual, Decimal::from(2000));
        assert_eq!(report.totals.attainment_percent, Decimal::from(100));
        assert_eq!(report.totals.general_target, Decimal::from(5600));
        assert_eq!(report.totals.difference_to_general_target, Decimal::from(1400));
        assert_eq!(report.annual_trend.len(), 12);
        assert_eq!(report.annual_trend[2].actual_sum, Decimal::from(7000));
    }

    #[test]
    fn empty_inputs_give_zeroed_report() {
        let report = build_monthly_report(2026, 1, &ReportInputs::default());
        assert_eq!(report.totals, ReportTotals::default());
        assert_eq!(report.variations, ReportVariations::default());
        assert!(report.per_technician.is_empty());
        assert!(report.per_category.is_empty());
        assert_eq!(report.commissions.total, Decimal::ZERO);
        assert!(report.logistics.per_vehicle.is_empty());
        assert!(report.rankings.top_technician.is_none());
        assert_eq!(report.annual_trend.len(), 12);
    }

    #[test]
    fn variations_compare_with_prior_periods() {
        let inputs = ReportInputs {
            prior_month_records: vec![record(None, SaleKind::Service, "X", 2026, 2, 0, 3500)],
            prior_year_same_month_records: vec![record(None, SaleKind::Service, "X", 2025, 3, 0, 0)],
            ..march_inputs()
        };
        let report = build_monthly_report(2026, 3, &inputs);
        assert_eq!(report.variations.prior_month_actual, Decimal::from(3500));
        assert_eq!(report.variations.vs_prior_month_percent, Decimal::from(100));
        // base zerada
        assert_eq!(report.variations.vs_prior_year_percent, Decimal::ZERO);
    }

    #[test]
    fn technicians_are_joined_with_their_quotas() {
        let mut inputs = march_inputs();
        let ana_id = inputs.current_records[0].technician_id.unwrap();
        let other_id = Uuid::new_v4();
        inputs.technician_quotas = vec![quota(ana_id, "Ana", 10000), quota(other_id, "Bruno", 8000)];
        inputs.current_records.push(record(None, SaleKind::Service, "Peças", 2026, 3, 100, 300));
        inputs.factory_quota = Some(FactoryQuota {
            id: Uuid::new_v4(),
            year: 2026,
            month: 3,
            target_amount: Decimal::from(600),
            actual_amount: Decimal::ZERO,
            attainment_percent: Decimal::ZERO,
        });

        let report = build_monthly_report(2026, 3, &inputs);
        let rows = &report.per_technician;
        assert_eq!(rows.len(), 3);

        let ana = rows.iter().find(|r| r.label == "Ana").unwrap();
        assert_eq!(ana.quota_target, Decimal::from(10000));
        assert_eq!(ana.attainment_percent, Decimal::from(50));

        let factory = rows.iter().find(|r| r.label == FACTORY_LABEL).unwrap();
        assert_eq!(factory.technician_id, None);
        assert_eq!(factory.quota_target, Decimal::from(600));
        assert_eq!(factory.attainment_percent, Decimal::from(50));

        let bruno = rows.iter().find(|r| r.label == "Bruno").unwrap();
        assert_eq!(bruno.actual_sum, Decimal::ZERO);

        assert_eq!(report.rankings.top_technician.as_ref().unwrap().label, "Ana");
    }

    #[test]
    fn technicians_sharing_a_name_stay_apart() {
        let first = record(Some("João"), SaleKind::Service, "Revisão", 2026, 3, 0, 1000);
        let second = record(Some("João"), SaleKind::Service, "Peças", 2026, 3, 0, 3000);
        let (first_id, second_id) = (first.technician_id.unwrap(), second.technician_id.unwrap());
        let inputs = ReportInputs {
            technician_quotas: vec![quota(first_id, "João", 2000), quota(second_id, "João", 6000)],
            current_records: vec![first, second],
            ..Default::default()
        };

        let report = build_monthly_report(2026, 3, &inputs);
        let rows = &report.per_technician;
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.label == "João"));

        let by_id = |id: Uuid| rows.iter().find(|r| r.technician_id == Some(id)).unwrap();
        assert_eq!(by_id(first_id).actual_sum, Decimal::from(1000));
        assert_eq!(by_id(first_id).quota_target, Decimal::from(2000));
        assert_eq!(by_id(first_id).attainment_percent, Decimal::from(50));
        assert_eq!(by_id(second_id).actual_sum, Decimal::from(3000));
        assert_eq!(by_id(second_id).quota_target, Decimal::from(6000));
        assert_eq!(by_id(second_id).attainment_percent, Decimal::from(50));
    }

    #[tokio::test]
    async fn monthly_report_rejects_years_out_of_range() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/painel")
            .unwrap();
        let service = ReportService::new(
            SalesRepository::new(pool.clone()),
            TechnicianRepository::new(pool.clone()),
            LogisticsRepository::new(pool.clone()),
        );

        // a validação acontece antes de qualquer consulta
        for year in [i32::MIN, 1999, 2101] {
            let result = service.monthly_report(&pool, year, 3).await;
            assert!(matches!(result, Err(AppError::ValidationError(_))));
        }
    }

    #[test]
    fn technology_categories_carry_commissions() {
        let report = build_monthly_report(2026, 3, &march_inputs());
        assert_eq!(report.per_category.len(), 1);
        let signals = report.per_category.get("SINAIS PTx Trimble").unwrap();
        assert_eq!(signals.actual_sum, Decimal::from(2000));
        assert_eq!(report.commissions.total, Decimal::from(92));
    }

    #[test]
    fn rankings_keep_at_most_five_categories() {
        let mut inputs = ReportInputs::default();
        for (i, category) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            inputs.current_records.push(record(
                None,
                SaleKind::Service,
                category,
                2026,
                4,
                0,
                (i as i64 + 1) * 10,
            ));
        }
        let report = build_monthly_report(2026, 4, &inputs);
        let top = &report.rankings.top_categories;
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].label, "G");
    }
}
