// src/models/report.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::analytics::{
    CommissionBreakdown, EntityGroups, LogisticsSummary, MonthlyPoint, RankEntry,
};

/// Relatório mensal consolidado. Os nomes dos campos são o contrato com o front.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    #[schema(example = "Março/2026")]
    pub period: String,
    pub year: i32,
    pub month: i32,
    pub totals: ReportTotals,
    pub variations: ReportVariations,
    pub per_technician: Vec<TechnicianPerformance>,
    pub per_category: EntityGroups,
    pub commissions: CommissionBreakdown,
    pub logistics: LogisticsSummary,
    pub rankings: ReportRankings,
    pub annual_trend: Vec<MonthlyPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    pub target: Decimal,
    pub actual: Decimal,
    pub service_actual: Decimal,
    pub technology_actual: Decimal,
    pub service_share_percent: Decimal,
    pub technology_share_percent: Decimal,
    pub attainment_percent: Decimal,
    pub record_count: usize,
    pub average_ticket: Decimal,
    /// 80% do previsto total
    pub general_target: Decimal,
    pub difference_to_general_target: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportVariations {
    pub prior_month_actual: Decimal,
    pub prior_year_actual: Decimal,
    pub vs_prior_month_percent: Decimal,
    pub vs_prior_year_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianPerformance {
    /// `None` para a linha da fábrica
    pub technician_id: Option<Uuid>,
    pub label: String,
    pub planned_sum: Decimal,
    pub actual_sum: Decimal,
    pub quota_target: Decimal,
    pub attainment_percent: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRankings {
    pub top_categories: Vec<RankEntry>,
    pub top_technician: Option<TechnicianPerformance>,
}
