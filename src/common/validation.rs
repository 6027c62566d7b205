// src/common/validation.rs

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

pub fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("O campo é obrigatório.".into());
        return Err(err);
    }
    Ok(())
}

pub fn validate_month(val: i32) -> Result<(), ValidationError> {
    if !(1..=12).contains(&val) {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &1);
        err.add_param("max".into(), &12);
        err.message = Some("O mês deve estar entre 1 e 12.".into());
        return Err(err);
    }
    Ok(())
}

pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;

pub fn validate_year(val: i32) -> Result<(), ValidationError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&val) {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &MIN_YEAR);
        err.add_param("max".into(), &MAX_YEAR);
        err.message = Some("Ano inválido.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Helpers para payloads parciais (PUT), onde todo campo é opcional
// ---

pub fn check_not_negative(errors: &mut ValidationErrors, field: &'static str, val: Option<&Decimal>) {
    if let Some(Err(e)) = val.map(validate_not_negative) {
        errors.add(field, e);
    }
}

pub fn check_not_blank(errors: &mut ValidationErrors, field: &'static str, val: Option<&str>) {
    if let Some(Err(e)) = val.map(validate_not_blank) {
        errors.add(field, e);
    }
}

pub fn check_month(errors: &mut ValidationErrors, field: &'static str, val: Option<i32>) {
    if let Some(Err(e)) = val.map(validate_month) {
        errors.add(field, e);
    }
}

pub fn check_year(errors: &mut ValidationErrors, field: &'static str, val: Option<i32>) {
    if let Some(Err(e)) = val.map(validate_year) {
        errors.add(field, e);
    }
}

// Filtro por mês só faz sentido dentro de um ano
pub fn check_month_has_year(errors: &mut ValidationErrors, year: Option<i32>, month: Option<i32>) {
    if month.is_some() && year.is_none() {
        let mut err = ValidationError::new("required");
        err.message = Some("Informe o ano ao filtrar por mês.".into());
        errors.add("year", err);
    }
}

pub fn into_result(errors: ValidationErrors) -> Result<(), ValidationErrors> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(validate_not_negative(&Decimal::from(-1)).is_err());
        assert!(validate_not_negative(&Decimal::ZERO).is_ok());
        assert!(validate_not_negative(&Decimal::new(1050, 2)).is_ok());
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(validate_not_blank("   ").is_err());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("ABC1D23").is_ok());
    }

    #[test]
    fn months_outside_the_calendar_are_rejected() {
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());
        assert!(validate_month(12).is_ok());
    }

    #[test]
    fn years_outside_the_supported_range_are_rejected() {
        assert!(validate_year(1999).is_err());
        assert!(validate_year(300_000).is_err());
        assert!(validate_year(i32::MIN).is_err());
        assert!(validate_year(2026).is_ok());
    }

    #[test]
    fn month_without_year_is_rejected() {
        let mut errors = ValidationErrors::new();
        check_month_has_year(&mut errors, None, Some(3));
        let errors = into_result(errors).unwrap_err();
        assert!(errors.field_errors().contains_key("year"));

        let mut errors = ValidationErrors::new();
        check_month_has_year(&mut errors, Some(2026), Some(3));
        check_month_has_year(&mut errors, None, None);
        assert!(into_result(errors).is_ok());
    }

    #[test]
    fn partial_checks_ignore_absent_fields() {
        let mut errors = ValidationErrors::new();
        check_not_negative(&mut errors, "dieselCost", None);
        check_not_blank(&mut errors, "vehiclePlate", None);
        check_month(&mut errors, "month", None);
        assert!(into_result(errors).is_ok());

        let mut errors = ValidationErrors::new();
        check_not_negative(&mut errors, "dieselCost", Some(&Decimal::from(-5)));
        check_month(&mut errors, "month", Some(14));
        let errors = into_result(errors).unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }
}
