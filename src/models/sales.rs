// src/models/sales.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::common::validation::{
    check_month, check_month_has_year, check_not_blank, check_not_negative, check_year,
    into_result, validate_not_blank, validate_not_negative,
};

// --- Enums (mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SaleKind {
    Service,    // Serviço
    Technology, // Tecnologia
}

// --- Structs ---

/// Venda prevista/realizada num mês. `technician_id = None` é venda da fábrica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesRecord {
    pub id: Uuid,
    pub technician_id: Option<Uuid>,

    // Vem do JOIN com technicians, somente leitura
    #[schema(example = "João Silva")]
    pub technician_name: Option<String>,

    pub kind: SaleKind,

    #[schema(example = "Revisão de colheitadeira")]
    pub category: String,
    pub subcategory: Option<String>,

    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 3)]
    pub month: i32,

    #[schema(example = "4000.00")]
    pub target_amount: Decimal,
    #[schema(example = "5000.00")]
    pub actual_amount: Decimal,

    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    pub id: Uuid,
    #[schema(example = "João Silva")]
    pub name: String,
    #[schema(example = "30000.00")]
    pub base_monthly_target: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianQuota {
    pub id: Uuid,
    pub technician_id: Uuid,
    pub technician_name: String,
    pub year: i32,
    pub month: i32,
    pub target_amount: Decimal,
    pub actual_amount: Decimal,

    // Calculado depois da busca (realizado / meta × 100)
    #[sqlx(default)]
    pub attainment_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactoryQuota {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    pub target_amount: Decimal,
    pub actual_amount: Decimal,

    #[sqlx(default)]
    pub attainment_percent: Decimal,
}

// --- Filtros ---

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SalesFilter {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub kind: Option<SaleKind>,
}

impl SalesFilter {
    pub fn period(year: i32, month: Option<i32>) -> Self {
        Self { year: Some(year), month, kind: None }
    }
}

impl Validate for SalesFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_year(&mut errors, "year", self.year);
        check_month(&mut errors, "month", self.month);
        into_result(errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TechnicianFilter {
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PeriodFilter {
    pub year: Option<i32>,
    pub month: Option<i32>,
}

impl Validate for PeriodFilter {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_year(&mut errors, "year", self.year);
        check_month(&mut errors, "month", self.month);
        check_month_has_year(&mut errors, self.year, self.month);
        into_result(errors)
    }
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSalePayload {
    pub technician_id: Option<Uuid>,
    pub kind: SaleKind,

    #[validate(custom(function = "validate_not_blank"))]
    pub category: String,
    pub subcategory: Option<String>,

    #[validate(range(min = 2000, max = 2100, message = "Ano inválido."))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "O mês deve estar entre 1 e 12."))]
    pub month: i32,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub target_amount: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub actual_amount: Decimal,

    pub note: Option<String>,
}

/// Atualização parcial: só os campos presentes são gravados.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSalePayload {
    pub technician_id: Option<Uuid>,
    // Remove o técnico, atribuindo a venda à fábrica
    #[serde(default)]
    pub to_factory: bool,
    pub kind: Option<SaleKind>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    // Apaga a subcategoria; vence `subcategory`
    #[serde(default)]
    pub clear_subcategory: bool,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub target_amount: Option<Decimal>,
    pub actual_amount: Option<Decimal>,
    pub note: Option<String>,
    // Apaga a observação; vence `note`
    #[serde(default)]
    pub clear_note: bool,
}

impl Validate for UpdateSalePayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_blank(&mut errors, "category", self.category.as_deref());
        check_year(&mut errors, "year", self.year);
        check_month(&mut errors, "month", self.month);
        check_not_negative(&mut errors, "targetAmount", self.target_amount.as_ref());
        check_not_negative(&mut errors, "actualAmount", self.actual_amount.as_ref());
        into_result(errors)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTechnicianPayload {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub base_monthly_target: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTechnicianPayload {
    pub name: Option<String>,
    pub base_monthly_target: Option<Decimal>,
    pub active: Option<bool>,
}

impl Validate for UpdateTechnicianPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_blank(&mut errors, "name", self.name.as_deref());
        check_not_negative(&mut errors, "baseMonthlyTarget", self.base_monthly_target.as_ref());
        into_result(errors)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuotaPayload {
    pub technician_id: Uuid,

    #[validate(range(min = 2000, max = 2100, message = "Ano inválido."))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "O mês deve estar entre 1 e 12."))]
    pub month: i32,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub target_amount: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub actual_amount: Decimal,
}

/// Grava meta e/ou realizado pela chave natural (técnico, ano, mês).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertQuotaPayload {
    pub technician_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub target_amount: Option<Decimal>,
    pub actual_amount: Option<Decimal>,
}

impl Validate for UpsertQuotaPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_year(&mut errors, "year", Some(self.year));
        check_month(&mut errors, "month", Some(self.month));
        check_not_negative(&mut errors, "targetAmount", self.target_amount.as_ref());
        check_not_negative(&mut errors, "actualAmount", self.actual_amount.as_ref());
        into_result(errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAmountsPayload {
    pub target_amount: Option<Decimal>,
    pub actual_amount: Option<Decimal>,
}

impl Validate for UpdateAmountsPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_negative(&mut errors, "targetAmount", self.target_amount.as_ref());
        check_not_negative(&mut errors, "actualAmount", self.actual_amount.as_ref());
        into_result(errors)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FactoryQuotaPayload {
    pub year: i32,
    pub month: i32,
    pub target_amount: Option<Decimal>,
    pub actual_amount: Option<Decimal>,
}

impl Validate for FactoryQuotaPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_year(&mut errors, "year", Some(self.year));
        check_month(&mut errors, "month", Some(self.month));
        check_not_negative(&mut errors, "targetAmount", self.target_amount.as_ref());
        check_not_negative(&mut errors, "actualAmount", self.actual_amount.as_ref());
        into_result(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale_payload() -> CreateSalePayload {
        CreateSalePayload {
            technician_id: None,
            kind: SaleKind::Service,
            category: "Revisão".into(),
            subcategory: None,
            year: 2026,
            month: 3,
            target_amount: Decimal::from(4000),
            actual_amount: Decimal::from(5000),
            note: None,
        }
    }

    #[test]
    fn valid_sale_passes() {
        assert!(sale_payload().validate().is_ok());
    }

    #[test]
    fn sale_rejects_blank_category_and_negative_amount() {
        let payload = CreateSalePayload {
            category: "  ".into(),
            actual_amount: Decimal::from(-1),
            ..sale_payload()
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("category"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn sale_rejects_month_out_of_range() {
        let payload = CreateSalePayload { month: 13, ..sale_payload() };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn partial_update_validates_only_present_fields() {
        assert!(UpdateSalePayload::default().validate().is_ok());

        let payload = UpdateSalePayload {
            target_amount: Some(Decimal::from(-10)),
            ..Default::default()
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn period_filter_rejects_invalid_month() {
        assert!(PeriodFilter { year: Some(2026), month: Some(0) }.validate().is_err());
        assert!(PeriodFilter::default().validate().is_ok());
    }

    #[test]
    fn period_filter_rejects_unbounded_years_and_month_without_year() {
        let errors = PeriodFilter { year: Some(300_000), month: Some(3) }.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("year"));

        let errors = PeriodFilter { year: None, month: Some(3) }.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("year"));

        assert!(PeriodFilter { year: Some(i32::MIN), month: None }.validate().is_err());
        assert!(SalesFilter { year: Some(-1), ..Default::default() }.validate().is_err());
    }

    #[test]
    fn upserts_and_updates_check_the_year() {
        let upsert = UpsertQuotaPayload {
            technician_id: Uuid::new_v4(),
            year: 1900,
            month: 3,
            target_amount: None,
            actual_amount: None,
        };
        assert!(upsert.validate().unwrap_err().field_errors().contains_key("year"));

        let factory = FactoryQuotaPayload { year: 3000, month: 3, target_amount: None, actual_amount: None };
        assert!(factory.validate().is_err());
        assert!(FactoryQuotaPayload { year: 2026, ..factory }.validate().is_ok());

        let update = UpdateSalePayload { year: Some(99), ..Default::default() };
        assert!(update.validate().is_err());
    }

    #[test]
    fn partial_update_can_clear_optional_text() {
        let payload: UpdateSalePayload =
            serde_json::from_str(r#"{"clearSubcategory": true, "clearNote": true}"#).unwrap();
        assert!(payload.clear_subcategory);
        assert!(payload.clear_note);
        assert!(payload.validate().is_ok());

        let payload: UpdateSalePayload = serde_json::from_str(r#"{"note": "ok"}"#).unwrap();
        assert!(!payload.clear_subcategory);
        assert!(!payload.clear_note);
        assert_eq!(payload.note.as_deref(), Some("ok"));
    }

    #[test]
    fn kind_uses_lowercase_on_the_wire() {
        let kind: SaleKind = serde_json::from_str("\"technology\"").unwrap();
        assert_eq!(kind, SaleKind::Technology);
        assert_eq!(serde_json::to_string(&SaleKind::Service).unwrap(), "\"service\"");
    }

    #[test]
    fn missing_amounts_default_to_zero() {
        let payload: CreateSalePayload = serde_json::from_str(
            r#"{"kind":"service","category":"Revisão","year":2026,"month":1}"#,
        )
        .unwrap();
        assert_eq!(payload.target_amount, Decimal::ZERO);
        assert_eq!(payload.actual_amount, Decimal::ZERO);
    }
}
