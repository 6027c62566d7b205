// src/services/aggregation.rs
//
// Motor de agregação: funções puras sobre coleções já carregadas do banco.
// Entrada vazia gera saída zerada, nunca erro.

use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
};

use rust_decimal::Decimal;

use crate::models::{
    analytics::{
        EntityGroups, EntityTotals, GrowthPoint, MonthlyPoint, RankEntry, RollingPoint,
        SalesTotals,
    },
    sales::{FactoryQuota, SaleKind, SalesRecord, TechnicianQuota},
    technology::{TechnologyCategoryQuota, TechnologyVendorQuota},
};

/// Rótulo usado para registros sem técnico.
pub const FACTORY_LABEL: &str = "Fábrica";

pub const DEFAULT_WINDOW_SIZE: usize = 12;

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Qualquer linha que tenha meta e realizado pode ser agregada.
pub trait Amounts {
    fn target_amount(&self) -> Decimal;
    fn actual_amount(&self) -> Decimal;
}

impl<T: Amounts + ?Sized> Amounts for &T {
    fn target_amount(&self) -> Decimal {
        (**self).target_amount()
    }
    fn actual_amount(&self) -> Decimal {
        (**self).actual_amount()
    }
}

macro_rules! impl_amounts {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Amounts for $ty {
                fn target_amount(&self) -> Decimal {
                    self.target_amount
                }
                fn actual_amount(&self) -> Decimal {
                    self.actual_amount
                }
            }
        )*
    };
}

impl_amounts!(
    SalesRecord,
    TechnicianQuota,
    FactoryQuota,
    TechnologyVendorQuota,
    TechnologyCategoryQuota,
);

pub fn month_label(month: i32) -> &'static str {
    month_index(month).map(|i| MONTH_LABELS[i]).unwrap_or("?")
}

pub fn month_name(month: i32) -> &'static str {
    month_index(month).map(|i| MONTH_NAMES[i]).unwrap_or("?")
}

fn month_index(month: i32) -> Option<usize> {
    if (1..=12).contains(&month) {
        Some((month - 1) as usize)
    } else {
        None
    }
}

/// `part / whole × 100`, ou zero quando `whole <= 0`.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (part * Decimal::ONE_HUNDRED)
        .checked_div(whole)
        .unwrap_or(Decimal::ZERO)
}

/// Variação percentual de `current` sobre `base`; zero quando a base é zero.
pub fn percent_change(current: Decimal, base: Decimal) -> Decimal {
    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ((current - base) * Decimal::ONE_HUNDRED)
        .checked_div(base)
        .unwrap_or(Decimal::ZERO)
}

/// Mês anterior, atravessando a virada do ano.
pub fn previous_month(year: i32, month: i32) -> (i32, i32) {
    if month <= 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// Série de 12 pontos (Jan..Dez) do ano informado.
pub fn monthly_series(records: &[SalesRecord], year: i32) -> Vec<MonthlyPoint> {
    let mut points: Vec<MonthlyPoint> = (1..=12)
        .map(|month| MonthlyPoint {
            month,
            month_label: month_label(month).to_string(),
            target_sum: Decimal::ZERO,
            actual_sum: Decimal::ZERO,
            service_sum: Decimal::ZERO,
            technology_sum: Decimal::ZERO,
            attainment_percent: Decimal::ZERO,
        })
        .collect();

    for record in records.iter().filter(|r| r.year == year) {
        let Some(idx) = month_index(record.month) else {
            continue;
        };
        let point = &mut points[idx];
        point.target_sum += record.target_amount;
        point.actual_sum += record.actual_amount;
        match record.kind {
            SaleKind::Service => point.service_sum += record.actual_amount,
            SaleKind::Technology => point.technology_sum += record.actual_amount,
        }
    }

    for point in &mut points {
        point.attainment_percent = percent_of(point.actual_sum, point.target_sum);
    }
    points
}

/// Últimos `window_size` períodos com dados entre `end_year - 1` e `end_year`.
pub fn rolling_window(
    records: &[SalesRecord],
    end_year: i32,
    window_size: usize,
) -> Vec<RollingPoint> {
    // (ano, mês) ordena cronologicamente
    let mut periods: BTreeMap<(i32, i32), (Decimal, Decimal)> = BTreeMap::new();

    for record in records {
        if record.year < end_year.saturating_sub(1) || record.year > end_year {
            continue;
        }
        if month_index(record.month).is_none() {
            continue;
        }
        let sums = periods
            .entry((record.year, record.month))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        sums.0 += record.target_amount;
        sums.1 += record.actual_amount;
    }

    let skip = periods.len().saturating_sub(window_size);
    periods
        .into_iter()
        .skip(skip)
        .map(|((year, month), (target_sum, actual_sum))| RollingPoint {
            period: format!("{:02}/{}", month, year),
            year,
            month,
            target_sum,
            actual_sum,
        })
        .collect()
}

/// Agrupa por chave mantendo a ordem da primeira ocorrência.
/// Registros sem chave vão para `unkeyed_label`.
pub fn group_by_entity<T, F>(records: &[T], key_fn: F, unkeyed_label: &str) -> EntityGroups
where
    T: Amounts,
    F: Fn(&T) -> Option<&str>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<EntityTotals> = Vec::new();

    for record in records {
        let label = key_fn(record).unwrap_or(unkeyed_label);
        let idx = match positions.get(label) {
            Some(&idx) => idx,
            None => {
                groups.push(EntityTotals {
                    label: label.to_string(),
                    target_sum: Decimal::ZERO,
                    actual_sum: Decimal::ZERO,
                    attainment_percent: Decimal::ZERO,
                    record_count: 0,
                });
                positions.insert(label.to_string(), groups.len() - 1);
                groups.len() - 1
            }
        };
        let group = &mut groups[idx];
        group.target_sum += record.target_amount();
        group.actual_sum += record.actual_amount();
        group.record_count += 1;
    }

    for group in &mut groups {
        group.attainment_percent = percent_of(group.actual_sum, group.target_sum);
    }
    EntityGroups(groups)
}

/// Como `group_by_entity`, mas agrupa por uma chave própria. O rótulo vem do
/// primeiro registro de cada grupo e não participa do agrupamento.
pub fn group_by_key<T, K, F, L>(records: &[T], key_fn: F, label_fn: L) -> Vec<(K, EntityTotals)>
where
    T: Amounts,
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
    L: Fn(&T) -> String,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, EntityTotals)> = Vec::new();

    for record in records {
        let key = key_fn(record);
        let idx = match positions.get(&key) {
            Some(&idx) => idx,
            None => {
                groups.push((
                    key.clone(),
                    EntityTotals {
                        label: label_fn(record),
                        target_sum: Decimal::ZERO,
                        actual_sum: Decimal::ZERO,
                        attainment_percent: Decimal::ZERO,
                        record_count: 0,
                    },
                ));
                positions.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        let (_, group) = &mut groups[idx];
        group.target_sum += record.target_amount();
        group.actual_sum += record.actual_amount();
        group.record_count += 1;
    }

    for (_, group) in &mut groups {
        group.attainment_percent = percent_of(group.actual_sum, group.target_sum);
    }
    groups
}

/// Crescimento mês contra o mês anterior da própria série.
pub fn growth_series(series: &[MonthlyPoint]) -> Vec<GrowthPoint> {
    series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let growth_percent = if i == 0 {
                Decimal::ZERO
            } else {
                percent_change(point.actual_sum, series[i - 1].actual_sum)
            };
            GrowthPoint { point: point.clone(), growth_percent }
        })
        .collect()
}

/// Top `n` por realizado somado. Empates mantêm a ordem de aparição.
pub fn rank_top<T, F>(records: &[T], key_fn: F, n: usize) -> Vec<RankEntry>
where
    T: Amounts,
    F: Fn(&T) -> &str,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<RankEntry> = Vec::new();

    for record in records {
        let label = key_fn(record);
        let idx = *positions.entry(label).or_insert_with(|| {
            entries.push(RankEntry {
                label: label.to_string(),
                value: Decimal::ZERO,
                count: 0,
            });
            entries.len() - 1
        });
        entries[idx].value += record.actual_amount();
        entries[idx].count += 1;
    }

    // sort_by é estável
    entries.sort_by(|a, b| b.value.cmp(&a.value));
    entries.truncate(n);
    entries
}

pub fn sales_totals(records: &[SalesRecord]) -> SalesTotals {
    let mut totals = SalesTotals::default();
    for record in records {
        totals.target += record.target_amount;
        totals.actual += record.actual_amount;
        match record.kind {
            SaleKind::Service => totals.service_actual += record.actual_amount,
            SaleKind::Technology => totals.technology_actual += record.actual_amount,
        }
        totals.record_count += 1;
    }
    totals.attainment_percent = percent_of(totals.actual, totals.target);
    if totals.record_count > 0 {
        totals.average_ticket = totals.actual / Decimal::from(totals.record_count);
    }
    totals
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use uuid::Uuid;

    pub(crate) fn record(
        technician: Option<&str>,
        kind: SaleKind,
        category: &str,
        year: i32,
        month: i32,
        target: i64,
        actual: i64,
    ) -> SalesRecord {
        SalesRecord {
            id: Uuid::new_v4(),
            technician_id: technician.map(|_| Uuid::new_v4()),
            technician_name: technician.map(str::to_string),
            kind,
            category: category.to_string(),
            subcategory: None,
            year,
            month,
            target_amount: Decimal::from(target),
            actual_amount: Decimal::from(actual),
            note: None,
        }
    }

    fn march() -> Vec<SalesRecord> {
        vec![
            record(Some("Ana"), SaleKind::Service, "Revisão", 2026, 3, 4000, 5000),
            record(None, SaleKind::Technology, "Licenças PTx Trimble", 2026, 3, 3000, 2000),
        ]
    }

    #[test]
    fn monthly_series_always_has_twelve_points() {
        assert_eq!(monthly_series(&[], 2026).len(), 12);

        let series = monthly_series(&march(), 2026);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].month_label, "Jan");
        assert_eq!(series[11].month_label, "Dez");
    }

    #[test]
    fn monthly_series_preserves_the_year_total() {
        let mut records = march();
        records.push(record(None, SaleKind::Service, "Peças", 2026, 7, 100, 250));
        records.push(record(None, SaleKind::Service, "Peças", 2025, 7, 100, 999));

        let series = monthly_series(&records, 2026);
        let total: Decimal = series.iter().map(|p| p.actual_sum).sum();
        assert_eq!(total, Decimal::from(7250));
    }

    #[test]
    fn march_scenario() {
        let series = monthly_series(&march(), 2026);
        let point = &series[2];
        assert_eq!(point.target_sum, Decimal::from(7000));
        assert_eq!(point.actual_sum, Decimal::from(7000));
        assert_eq!(point.service_sum, Decimal::from(5000));
        assert_eq!(point.technology_sum, Decimal::from(2000));
        assert_eq!(point.attainment_percent, Decimal::from(100));
    }

    #[test]
    fn attainment_is_zero_without_target() {
        let records = vec![record(None, SaleKind::Service, "Peças", 2026, 1, 0, 500)];
        assert_eq!(monthly_series(&records, 2026)[0].attainment_percent, Decimal::ZERO);
        assert_eq!(percent_of(Decimal::from(5), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn rolling_window_keeps_last_periods_in_order() {
        let mut records = Vec::new();
        for month in 1..=12 {
            records.push(record(None, SaleKind::Service, "X", 2025, month, 10, 10));
        }
        for month in 1..=3 {
            records.push(record(None, SaleKind::Service, "X", 2026, month, 10, 10));
        }
        // fora da janela
        records.push(record(None, SaleKind::Service, "X", 2024, 12, 10, 10));
        records.push(record(None, SaleKind::Service, "X", 2027, 1, 10, 10));
        // mesmo período somado
        records.push(record(None, SaleKind::Service, "Y", 2026, 3, 5, 5));

        let window = rolling_window(&records, 2026, DEFAULT_WINDOW_SIZE);
        assert_eq!(window.len(), 12);
        assert_eq!(window[0].period, "04/2025");
        assert_eq!(window[11].period, "03/2026");
        assert_eq!(window[11].actual_sum, Decimal::from(15));
    }

    #[test]
    fn rolling_window_of_nothing_is_empty() {
        assert!(rolling_window(&[], 2026, 12).is_empty());
    }

    #[test]
    fn rolling_window_tolerates_extreme_years() {
        let records = vec![record(None, SaleKind::Service, "X", 2026, 1, 0, 1)];
        assert!(rolling_window(&records, i32::MIN, 12).is_empty());

        let edge = vec![record(None, SaleKind::Service, "X", i32::MIN, 5, 0, 1)];
        assert_eq!(rolling_window(&edge, i32::MIN, 12).len(), 1);
    }

    #[test]
    fn group_by_entity_sends_unkeyed_to_factory() {
        let mut records = march();
        records.push(record(Some("Bruno"), SaleKind::Service, "Peças", 2026, 3, 1000, 500));
        records.push(record(Some("Ana"), SaleKind::Service, "Peças", 2026, 3, 1000, 1000));

        let groups =
            group_by_entity(&records, |r| r.technician_name.as_deref(), FACTORY_LABEL);
        let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Ana", FACTORY_LABEL, "Bruno"]);

        let ana = groups.get("Ana").unwrap();
        assert_eq!(ana.actual_sum, Decimal::from(6000));
        assert_eq!(ana.record_count, 2);
        assert_eq!(ana.attainment_percent, Decimal::from(120));
        assert_eq!(groups.get("Bruno").unwrap().attainment_percent, Decimal::from(50));
    }

    #[test]
    fn group_by_entity_is_idempotent() {
        let records = march();
        fn key(r: &SalesRecord) -> Option<&str> {
            Some(r.category.as_str())
        }
        assert_eq!(
            group_by_entity(&records, key, FACTORY_LABEL),
            group_by_entity(&records, key, FACTORY_LABEL)
        );
    }

    #[test]
    fn group_by_key_keeps_homonyms_apart() {
        let records = vec![
            record(Some("João"), SaleKind::Service, "Revisão", 2026, 3, 1000, 500),
            record(Some("João"), SaleKind::Service, "Peças", 2026, 3, 1000, 2000),
            record(None, SaleKind::Service, "Peças", 2026, 3, 0, 100),
        ];
        let first_id = records[0].technician_id;

        let groups = group_by_key(
            &records,
            |r| r.technician_id,
            |r| r.technician_name.clone().unwrap_or_else(|| FACTORY_LABEL.to_string()),
        );
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].0, first_id);
        assert_eq!(groups[0].1.label, "João");
        assert_eq!(groups[0].1.attainment_percent, Decimal::from(50));
        assert_eq!(groups[1].1.label, "João");
        assert_eq!(groups[1].1.actual_sum, Decimal::from(2000));
        assert_eq!(groups[2].0, None);
        assert_eq!(groups[2].1.label, FACTORY_LABEL);
    }

    #[test]
    fn growth_handles_zero_bases() {
        let records = vec![
            record(None, SaleKind::Service, "X", 2026, 2, 0, 100),
            record(None, SaleKind::Service, "X", 2026, 3, 0, 150),
        ];
        let growth = growth_series(&monthly_series(&records, 2026));
        assert_eq!(growth.len(), 12);
        assert_eq!(growth[0].growth_percent, Decimal::ZERO);
        // janeiro zerado
        assert_eq!(growth[1].growth_percent, Decimal::ZERO);
        assert_eq!(growth[2].growth_percent, Decimal::from(50));
        assert_eq!(growth[3].growth_percent, Decimal::from(-100));
    }

    #[test]
    fn rank_top_is_descending_and_stable() {
        let records = vec![
            record(None, SaleKind::Service, "A", 2026, 1, 0, 100),
            record(None, SaleKind::Service, "B", 2026, 1, 0, 300),
            record(None, SaleKind::Service, "C", 2026, 1, 0, 100),
            record(None, SaleKind::Service, "D", 2026, 1, 0, 50),
            record(None, SaleKind::Service, "A", 2026, 2, 0, 0),
        ];
        let top = rank_top(&records, |r| r.category.as_str(), 3);
        assert_eq!(top.len(), 3);
        let labels: Vec<&str> = top.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["B", "A", "C"]);
        assert_eq!(top[1].count, 2);

        assert!(rank_top(&records, |r| r.category.as_str(), 0).is_empty());
    }

    #[test]
    fn sales_totals_compute_average_ticket() {
        let totals = sales_totals(&march());
        assert_eq!(totals.actual, Decimal::from(7000));
        assert_eq!(totals.average_ticket, Decimal::from(3500));
        assert_eq!(totals.attainment_percent, Decimal::from(100));

        assert_eq!(sales_totals(&[]), SalesTotals::default());
    }

    #[test]
    fn previous_month_wraps_january() {
        assert_eq!(previous_month(2026, 1), (2025, 12));
        assert_eq!(previous_month(2026, 3), (2026, 2));
    }
}
