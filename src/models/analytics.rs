// src/models/analytics.rs
//
// Estruturas derivadas produzidas pelo motor de agregação. Nenhuma delas vem
// direto do banco: são sempre montadas a partir das linhas já buscadas.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

// --- Vendas ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    #[schema(example = 3)]
    pub month: i32,
    #[schema(example = "Mar")]
    pub month_label: String,
    pub target_sum: Decimal,
    pub actual_sum: Decimal,
    pub service_sum: Decimal,
    pub technology_sum: Decimal,
    pub attainment_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RollingPoint {
    #[schema(example = "03/2026")]
    pub period: String,
    pub year: i32,
    pub month: i32,
    pub target_sum: Decimal,
    pub actual_sum: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    #[serde(flatten)]
    pub point: MonthlyPoint,
    /// Variação do realizado contra o mês imediatamente anterior.
    pub growth_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityTotals {
    pub label: String,
    pub target_sum: Decimal,
    pub actual_sum: Decimal,
    pub attainment_percent: Decimal,
    pub record_count: usize,
}

/// Totais por entidade, na ordem em que cada rótulo apareceu pela primeira vez.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct EntityGroups(pub Vec<EntityTotals>);

impl EntityGroups {
    pub fn get(&self, label: &str) -> Option<&EntityTotals> {
        self.0.iter().find(|e| e.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityTotals> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<EntityTotals> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub label: String,
    pub value: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    pub target: Decimal,
    pub actual: Decimal,
    pub service_actual: Decimal,
    pub technology_actual: Decimal,
    pub attainment_percent: Decimal,
    pub record_count: usize,
    pub average_ticket: Decimal,
}

// --- Logística ---

/// Somatórios de custos com as razões recalculadas sobre os totais acumulados.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsTotals {
    pub diesel_cost: Decimal,
    pub maintenance_cost: Decimal,
    pub km_driven: Decimal,
    pub liters_used: Decimal,
    pub cost_per_km: Decimal,
    pub efficiency_km_per_liter: Decimal,
    pub entry_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsMonthlyPoint {
    pub month: i32,
    pub month_label: String,
    #[serde(flatten)]
    pub totals: LogisticsTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsSummary {
    pub totals: LogisticsTotals,
    /// Placa -> totais acumulados do veículo
    pub per_vehicle: BTreeMap<String, LogisticsTotals>,
}

// --- Tecnologia ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRuleView {
    #[schema(example = "SINAIS PTx Trimble")]
    pub label: String,
    pub prefixes: Vec<String>,
    #[schema(example = "4.6")]
    pub rate_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCommission {
    pub category: String,
    pub rule_label: String,
    pub rate_percent: Decimal,
    pub actual_amount: Decimal,
    pub commission: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionBreakdown {
    pub categories: Vec<CategoryCommission>,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub category: String,
    pub target_sum: Decimal,
    pub actual_sum: Decimal,
    pub attainment_percent: Decimal,
    pub rule_label: String,
    pub rate_percent: Decimal,
    pub commission: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnologySummary {
    pub year: i32,
    pub categories: Vec<CategorySummary>,
    pub vendors: EntityGroups,
    pub total_target: Decimal,
    pub total_actual: Decimal,
    pub total_commission: Decimal,
}

// --- Analytics anual ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalityPoint {
    pub month_label: String,
    pub actual_sum: Decimal,
    /// Atingimento menos 100 (negativo = abaixo da meta)
    pub deviation_percent: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsKpis {
    pub sales: SalesTotals,
    pub months_target_met: usize,
    pub months_above_average: usize,
    pub annual_growth_percent: Decimal,
    pub logistics: LogisticsTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnualAnalytics {
    pub year: i32,
    pub monthly: Vec<MonthlyPoint>,
    pub rolling: Vec<RollingPoint>,
    pub growth: Vec<GrowthPoint>,
    pub per_technician: Vec<EntityTotals>,
    pub technology_categories: Vec<EntityTotals>,
    pub logistics_monthly: Vec<LogisticsMonthlyPoint>,
    pub top_products: Vec<RankEntry>,
    pub seasonality: Vec<SeasonalityPoint>,
    pub kpis: AnalyticsKpis,
}
