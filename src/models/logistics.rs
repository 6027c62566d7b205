// src/models/logistics.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::common::validation::{
    check_not_blank, check_not_negative, into_result, validate_not_blank, validate_not_negative,
};

/// Um lançamento de custo de caminhão (abastecimento e/ou manutenção).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsEntry {
    pub id: Uuid,

    #[schema(example = "ABC1D23")]
    pub vehicle_plate: String,

    #[schema(value_type = String, format = Date, example = "2026-03-15")]
    pub date: NaiveDate,

    #[schema(example = "320.5")]
    pub km_driven: Decimal,
    #[schema(example = "45.0")]
    pub diesel_liters: Decimal,
    #[schema(example = "279.90")]
    pub diesel_cost: Decimal,

    #[schema(example = "Troca de óleo")]
    pub maintenance_description: Option<String>,
    #[schema(example = "0.00")]
    pub maintenance_cost: Decimal,

    pub driver: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLogisticsPayload {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 8, message = "A placa deve ter no máximo 8 caracteres.")
    )]
    pub vehicle_plate: String,

    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub km_driven: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub diesel_liters: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub diesel_cost: Decimal,

    pub maintenance_description: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub maintenance_cost: Decimal,

    pub driver: Option<String>,
    pub note: Option<String>,
}

impl CreateLogisticsPayload {
    // Placas são gravadas em maiúsculas e sem espaços nas pontas
    pub fn normalized(mut self) -> Self {
        self.vehicle_plate = normalize_plate(&self.vehicle_plate);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLogisticsPayload {
    pub vehicle_plate: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
    pub km_driven: Option<Decimal>,
    pub diesel_liters: Option<Decimal>,
    pub diesel_cost: Option<Decimal>,
    pub maintenance_description: Option<String>,
    pub maintenance_cost: Option<Decimal>,
    pub driver: Option<String>,
    pub note: Option<String>,
}

impl UpdateLogisticsPayload {
    pub fn normalized(mut self) -> Self {
        self.vehicle_plate = self.vehicle_plate.as_deref().map(normalize_plate);
        self
    }
}

impl Validate for UpdateLogisticsPayload {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_not_blank(&mut errors, "vehiclePlate", self.vehicle_plate.as_deref());
        check_not_negative(&mut errors, "kmDriven", self.km_driven.as_ref());
        check_not_negative(&mut errors, "dieselLiters", self.diesel_liters.as_ref());
        check_not_negative(&mut errors, "dieselCost", self.diesel_cost.as_ref());
        check_not_negative(&mut errors, "maintenanceCost", self.maintenance_cost.as_ref());
        into_result(errors)
    }
}

pub fn normalize_plate(plate: &str) -> String {
    plate.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateLogisticsPayload {
        CreateLogisticsPayload {
            vehicle_plate: " abc1d23 ".into(),
            date: NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            km_driven: Decimal::from(100),
            diesel_liters: Decimal::from(10),
            diesel_cost: Decimal::from(50),
            maintenance_description: None,
            maintenance_cost: Decimal::ZERO,
            driver: None,
            note: None,
        }
    }

    #[test]
    fn plate_is_normalized() {
        assert_eq!(payload().normalized().vehicle_plate, "ABC1D23");
    }

    #[test]
    fn negative_km_is_rejected() {
        let entry = CreateLogisticsPayload { km_driven: Decimal::from(-1), ..payload() };
        assert!(entry.validate().is_err());
    }

    #[test]
    fn blank_plate_is_rejected() {
        let entry = CreateLogisticsPayload { vehicle_plate: "   ".into(), ..payload() };
        assert!(entry.validate().is_err());
    }

    #[test]
    fn partial_update_rejects_negative_costs() {
        let update = UpdateLogisticsPayload {
            maintenance_cost: Some(Decimal::from(-20)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(UpdateLogisticsPayload::default().validate().is_ok());
    }
}
