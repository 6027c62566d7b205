// src/services/logistics_stats.rs

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    models::{
        analytics::{LogisticsMonthlyPoint, LogisticsSummary, LogisticsTotals},
        logistics::LogisticsEntry,
    },
    services::aggregation::month_label,
};

impl LogisticsTotals {
    /// Soma o lançamento e recalcula as duas razões sobre os totais acumulados.
    pub fn accumulate(&mut self, entry: &LogisticsEntry) {
        self.diesel_cost += entry.diesel_cost;
        self.maintenance_cost += entry.maintenance_cost;
        self.km_driven += entry.km_driven;
        self.liters_used += entry.diesel_liters;
        self.entry_count += 1;
        self.recompute_ratios();
    }

    pub fn total_cost(&self) -> Decimal {
        self.diesel_cost + self.maintenance_cost
    }

    fn recompute_ratios(&mut self) {
        self.cost_per_km = if self.km_driven > Decimal::ZERO {
            self.total_cost() / self.km_driven
        } else {
            Decimal::ZERO
        };
        self.efficiency_km_per_liter = if self.liters_used > Decimal::ZERO {
            self.km_driven / self.liters_used
        } else {
            Decimal::ZERO
        };
    }
}

pub fn logistics_totals(entries: &[LogisticsEntry]) -> LogisticsTotals {
    let mut totals = LogisticsTotals::default();
    for entry in entries {
        totals.accumulate(entry);
    }
    totals
}

/// 12 pontos do ano; meses sem lançamentos ficam zerados.
pub fn logistics_monthly(entries: &[LogisticsEntry], year: i32) -> Vec<LogisticsMonthlyPoint> {
    let mut months: Vec<LogisticsTotals> = vec![LogisticsTotals::default(); 12];
    for entry in entries.iter().filter(|e| e.date.year() == year) {
        months[entry.date.month0() as usize].accumulate(entry);
    }

    months
        .into_iter()
        .enumerate()
        .map(|(i, totals)| {
            let month = i as i32 + 1;
            LogisticsMonthlyPoint {
                month,
                month_label: month_label(month).to_string(),
                totals,
            }
        })
        .collect()
}

/// Placa -> totais do veículo. Placas já vêm normalizadas do cadastro.
pub fn per_vehicle_summary(entries: &[LogisticsEntry]) -> BTreeMap<String, LogisticsTotals> {
    let mut vehicles: BTreeMap<String, LogisticsTotals> = BTreeMap::new();
    for entry in entries {
        vehicles
            .entry(entry.vehicle_plate.clone())
            .or_default()
            .accumulate(entry);
    }
    vehicles
}

pub fn logistics_summary(entries: &[LogisticsEntry]) -> LogisticsSummary {
    LogisticsSummary {
        totals: logistics_totals(entries),
        per_vehicle: per_vehicle_summary(entries),
    }
}

/// Primeiro e último dia do mês, para filtros por intervalo de data.
pub fn month_bounds(year: i32, month: i32) -> Option<(NaiveDate, NaiveDate)> {
    let month = u32::try_from(month).ok()?;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// Intervalo de datas do filtro (ano inteiro ou um mês). Sem ano não há intervalo.
pub fn period_bounds(year: Option<i32>, month: Option<i32>) -> Option<(NaiveDate, NaiveDate)> {
    let year = year?;
    match month {
        Some(month) => month_bounds(year, month),
        None => Some((
            NaiveDate::from_ymd_opt(year, 1, 1)?,
            NaiveDate::from_ymd_opt(year, 12, 31)?,
        )),
    }
}

/// Como o repositório filtra os lançamentos por data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    All,
    Between(NaiveDate, NaiveDate),
    // Período que não existe no calendário: nenhum lançamento
    Nothing,
}

pub fn date_filter(year: Option<i32>, month: Option<i32>) -> DateFilter {
    match (year, month) {
        (None, None) => DateFilter::All,
        _ => match period_bounds(year, month) {
            Some((first, last)) => DateFilter::Between(first, last),
            None => DateFilter::Nothing,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn entry(plate: &str, date: (i32, u32, u32), km: i64, liters: i64, diesel: i64, maint: i64) -> LogisticsEntry {
        LogisticsEntry {
            id: Uuid::new_v4(),
            vehicle_plate: plate.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            km_driven: Decimal::from(km),
            diesel_liters: Decimal::from(liters),
            diesel_cost: Decimal::from(diesel),
            maintenance_description: None,
            maintenance_cost: Decimal::from(maint),
            driver: None,
            note: None,
        }
    }

    #[test]
    fn per_vehicle_ratios_are_cumulative() {
        let entries = vec![
            entry("ABC1D23", (2026, 3, 2), 100, 10, 50, 0),
            entry("ABC1D23", (2026, 3, 9), 200, 15, 80, 0),
            entry("XYZ9K88", (2026, 3, 9), 50, 5, 30, 100),
        ];
        let summary = per_vehicle_summary(&entries);
        let abc = &summary["ABC1D23"];
        assert_eq!(abc.km_driven, Decimal::from(300));
        assert_eq!(abc.cost_per_km, Decimal::from(130) / Decimal::from(300));
        assert_eq!(abc.efficiency_km_per_liter, Decimal::from(12));
        assert_eq!(abc.entry_count, 2);
        assert_eq!(summary["XYZ9K88"].cost_per_km, Decimal::from(130) / Decimal::from(50));
    }

    #[test]
    fn ratios_are_zero_without_km_or_liters() {
        let totals = logistics_totals(&[entry("ABC1D23", (2026, 1, 5), 0, 0, 0, 300)]);
        assert_eq!(totals.cost_per_km, Decimal::ZERO);
        assert_eq!(totals.efficiency_km_per_liter, Decimal::ZERO);
        assert_eq!(totals.maintenance_cost, Decimal::from(300));
    }

    #[test]
    fn monthly_has_twelve_points_for_the_year() {
        assert_eq!(logistics_monthly(&[], 2026).len(), 12);

        let entries = vec![
            entry("ABC1D23", (2026, 3, 2), 100, 10, 50, 0),
            entry("ABC1D23", (2025, 3, 2), 999, 99, 999, 0),
        ];
        let months = logistics_monthly(&entries, 2026);
        assert_eq!(months[2].month_label, "Mar");
        assert_eq!(months[2].totals.km_driven, Decimal::from(100));
        assert_eq!(months[2].totals.cost_per_km, Decimal::new(5, 1));
        assert_eq!(months[0].totals, LogisticsTotals::default());
    }

    #[test]
    fn month_bounds_cover_the_whole_month() {
        let (first, last) = month_bounds(2024, 2).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let (_, dec_last) = month_bounds(2026, 12).unwrap();
        assert_eq!(dec_last, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
        assert!(month_bounds(2026, 13).is_none());
    }

    #[test]
    fn period_without_month_is_the_whole_year() {
        let (first, last) = period_bounds(Some(2026), None).unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(2026, 12, 31).unwrap());
        assert!(period_bounds(None, Some(3)).is_none());
    }

    #[test]
    fn unrepresentable_periods_match_nothing() {
        assert_eq!(date_filter(None, None), DateFilter::All);
        assert_eq!(date_filter(None, Some(3)), DateFilter::Nothing);
        assert_eq!(date_filter(Some(300_000), Some(3)), DateFilter::Nothing);
        assert_eq!(date_filter(Some(2026), Some(13)), DateFilter::Nothing);
        assert_eq!(
            date_filter(Some(2026), Some(3)),
            DateFilter::Between(
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            )
        );
    }
}
