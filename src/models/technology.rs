// src/models/technology.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::common::validation::{
    check_month, check_not_blank, check_not_negative, check_year, into_result, validate_not_blank,
    validate_not_negative,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyVendor {
    pub id: Uuid,
    #[schema(example = "Maria Souza")]
    pub name: String,
    #[schema(example = "10.0")]
    pub default_commission_percent: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyVendorQuota {
    pub id: Uuid,
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub year: i32,
    pub month: i32,
    #[schema(example = "Licenças PTx Trimble")]
    pub category: String,
    pub target_amount: Decimal,
    pub actual_amount: Decimal,

    #[sqlx(default)]
    pub attainment_percent: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TechnologyCategoryQuota {
    pub id: Uuid,
    pub year: i32,
    pub month: i32,
    #[schema(example = "SINAIS PTx Trimble")]
    pub category: String,
    pub target_amount: Decimal,
    pub actual_amount: Decimal,

    #[sqlx(default)]
    pub attainment_percent: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TechnologyFilter {
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub category: Option<String>,
}

impl Validate for TechnologyFilter {
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
pub struct VendorFilter {
    #[serde(default)]
    pub include_inactive: bool,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorPayload {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default = "default_commission_percent")]
    pub default_commission_percent: Decimal,
}

fn default_commission_percent() -> Decimal {
    Decimal::TEN
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVendorPayload {
    pub name: Option<String>,
    pub default_commission_percent: Option<Decimal>,
    pub active: Option<bool>,
}

impl Validate for UpdateVendorPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_blank(&mut errors, "name", self.name.as_deref());
        check_not_negative(
            &mut errors,
            "defaultCommissionPercent",
            self.default_commission_percent.as_ref(),
        );
        into_result(errors)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVendorQuotaPayload {
    pub vendor_id: Uuid,

    #[validate(range(min = 2000, max = 2100, message = "Ano inválido."))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "O mês deve estar entre 1 e 12."))]
    pub month: i32,

    #[validate(custom(function = "validate_not_blank"))]
    pub category: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub target_amount: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub actual_amount: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryQuotaPayload {
    #[validate(range(min = 2000, max = 2100, message = "Ano inválido."))]
    pub year: i32,
    #[validate(range(min = 1, max = 12, message = "O mês deve estar entre 1 e 12."))]
    pub month: i32,

    #[validate(custom(function = "validate_not_blank"))]
    pub category: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub target_amount: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub actual_amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_commission_defaults_to_ten_percent() {
        let payload: CreateVendorPayload = serde_json::from_str(r#"{"name":"Maria"}"#).unwrap();
        assert_eq!(payload.default_commission_percent, Decimal::TEN);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn vendor_with_negative_commission_is_rejected() {
        let payload = CreateVendorPayload {
            name: "Maria".into(),
            default_commission_percent: Decimal::from(-1),
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn category_quota_requires_category() {
        let payload = CreateCategoryQuotaPayload {
            year: 2026,
            month: 5,
            category: String::new(),
            target_amount: Decimal::from(1000),
            actual_amount: Decimal::ZERO,
        };
        assert!(payload.validate().is_err());
    }
}
