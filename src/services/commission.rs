// src/services/commission.rs
//
// Tabela de comissões da área de tecnologia. Adicionar uma categoria nova é
// acrescentar uma linha em COMMISSION_RULES.

use rust_decimal::Decimal;

use crate::models::analytics::{CategoryCommission, CommissionBreakdown, CommissionRuleView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechCategory {
    Signals,
    Licenses,
    Hardware,
    ClientTraining,
    General,
}

#[derive(Debug)]
pub struct CommissionRule {
    pub category: TechCategory,
    pub label: &'static str,
    pub prefixes: &'static [&'static str],
    /// Fração (0.046 = 4,6%)
    pub rate: Decimal,
}

/// Meta geral = 80% do previsto.
pub const GENERAL_TARGET_RATIO: Decimal = Decimal::from_parts(80, 0, 0, false, 2);

pub static COMMISSION_RULES: &[CommissionRule] = &[
    CommissionRule {
        category: TechCategory::Signals,
        label: "SINAIS PTx Trimble",
        prefixes: &["SINAIS", "SIGNAL"],
        rate: Decimal::from_parts(46, 0, 0, false, 3),
    },
    CommissionRule {
        category: TechCategory::Licenses,
        label: "Licenças PTx Trimble",
        prefixes: &["LICENÇA", "LICENCA", "LICENSE"],
        rate: Decimal::from_parts(10, 0, 0, false, 2),
    },
    CommissionRule {
        category: TechCategory::Hardware,
        label: "Hardwares PTx Trimble",
        prefixes: &["HARDWARE"],
        rate: Decimal::from_parts(10, 0, 0, false, 2),
    },
    CommissionRule {
        category: TechCategory::ClientTraining,
        label: "Treinamentos Clientes",
        prefixes: &["TREINAMENTO", "CLIENT TRAINING", "TRAINING"],
        rate: Decimal::from_parts(83, 0, 0, false, 2),
    },
];

pub static GENERAL_RULE: CommissionRule = CommissionRule {
    category: TechCategory::General,
    label: "Tecnologia Geral",
    prefixes: &[],
    rate: Decimal::from_parts(10, 0, 0, false, 2),
};

/// Categorias fixas mostradas no resumo de tecnologia.
pub fn fixed_categories() -> impl Iterator<Item = &'static str> {
    COMMISSION_RULES.iter().map(|r| r.label)
}

/// Regra aplicável à categoria: rótulo exato ou prefixo, sem diferenciar caixa.
pub fn rule_for(category: &str) -> &'static CommissionRule {
    let normalized = category.trim().to_uppercase();
    COMMISSION_RULES
        .iter()
        .find(|rule| {
            rule.label.to_uppercase() == normalized
                || rule.prefixes.iter().any(|p| normalized.starts_with(p))
        })
        .unwrap_or(&GENERAL_RULE)
}

pub fn classify(category: &str) -> TechCategory {
    rule_for(category).category
}

pub fn commission_for(category: &str, actual: Decimal) -> Decimal {
    actual * rule_for(category).rate
}

/// Comissão por categoria, na ordem em que chegaram, mais o total.
pub fn commission_breakdown<'a, I>(categories: I) -> CommissionBreakdown
where
    I: IntoIterator<Item = (&'a str, Decimal)>,
{
    let mut breakdown = CommissionBreakdown::default();
    for (category, actual_amount) in categories {
        let rule = rule_for(category);
        let commission = actual_amount * rule.rate;
        breakdown.total += commission;
        breakdown.categories.push(CategoryCommission {
            category: category.to_string(),
            rule_label: rule.label.to_string(),
            rate_percent: rule.rate * Decimal::ONE_HUNDRED,
            actual_amount,
            commission,
        });
    }
    breakdown
}

pub fn rule_views() -> Vec<CommissionRuleView> {
    COMMISSION_RULES
        .iter()
        .chain(std::iter::once(&GENERAL_RULE))
        .map(|rule| CommissionRuleView {
            label: rule.label.to_string(),
            prefixes: rule.prefixes.iter().map(|p| p.to_string()).collect(),
            rate_percent: rule.rate * Decimal::ONE_HUNDRED,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signals_pay_four_point_six_percent() {
        assert_eq!(
            commission_for("SINAIS PTx Trimble", Decimal::from(10000)),
            Decimal::from(460)
        );
        assert_eq!(commission_for("signal rtk", Decimal::from(10000)), Decimal::from(460));
    }

    #[test]
    fn client_training_pays_eighty_three_percent() {
        assert_eq!(
            commission_for("Treinamentos Clientes", Decimal::from(1000)),
            Decimal::from(830)
        );
    }

    #[test]
    fn matching_ignores_case_and_accents_variants() {
        assert_eq!(classify("licença anual"), TechCategory::Licenses);
        assert_eq!(classify("  LICENCA "), TechCategory::Licenses);
        assert_eq!(classify("hardwares ptx trimble"), TechCategory::Hardware);
        assert_eq!(classify("Drone"), TechCategory::General);
        assert_eq!(classify(""), TechCategory::General);
    }

    #[test]
    fn breakdown_sums_every_category() {
        let breakdown = commission_breakdown([
            ("SINAIS PTx Trimble", Decimal::from(10000)),
            ("Outro", Decimal::from(500)),
        ]);
        assert_eq!(breakdown.categories.len(), 2);
        assert_eq!(breakdown.categories[1].rule_label, GENERAL_RULE.label);
        assert_eq!(breakdown.total, Decimal::from(510));
        assert_eq!(breakdown.categories[0].rate_percent, Decimal::new(46, 1));
    }

    #[test]
    fn general_target_ratio_is_eighty_percent() {
        assert_eq!(GENERAL_TARGET_RATIO * Decimal::from(1000), Decimal::from(800));
        assert_eq!(rule_views().len(), COMMISSION_RULES.len() + 1);
    }
}
