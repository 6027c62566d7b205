// src/handlers/reports.rs

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, Utc};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{i18n::Locale, sequencing::RequestSeq},
    models::{analytics::AnnualAnalytics, report::MonthlyReport, sales::PeriodFilter},
};

pub fn current_year() -> i32 {
    Utc::now().year()
}

// Ano e mês ausentes caem no mês corrente
pub fn resolve_period(filter: &PeriodFilter) -> (i32, i32) {
    let today = Utc::now();
    (
        filter.year.unwrap_or(today.year()),
        filter.month.unwrap_or(today.month() as i32),
    )
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Servidor no ar"))
)]
pub async fn health() -> &'static str {
    "OK"
}

#[utoipa::path(
    get,
    path = "/api/reports/monthly",
    tag = "Reports",
    params(PeriodFilter),
    responses(
        (status = 200, description = "Relatório mensal consolidado", body = MonthlyReport),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_report(
    State(app_state): State<AppState>,
    locale: Locale,
    seq: RequestSeq,
    Query(filter): Query<PeriodFilter>,
) -> Result<Response, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let (year, month) = resolve_period(&filter);
    let report = app_state
        .report_service
        .monthly_report(&app_state.db_pool, year, month)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(seq.echo(Json(report)))
}

#[utoipa::path(
    get,
    path = "/api/reports/monthly/pdf",
    tag = "Reports",
    params(PeriodFilter),
    responses(
        (status = 200, description = "Relatório mensal em PDF", content_type = "application/pdf"),
        (status = 400, description = "Período inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_report_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<PeriodFilter>,
) -> Result<Response, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let (year, month) = resolve_period(&filter);
    let pdf_bytes = app_state
        .document_service
        .monthly_report_pdf(&app_state.db_pool, year, month)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(year, month, size = pdf_bytes.len(), "PDF do relatório mensal gerado");

    let disposition = format!("attachment; filename=\"relatorio_{year}_{month:02}.pdf\"");
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf_bytes).into_response())
}

#[utoipa::path(
    get,
    path = "/api/analytics",
    tag = "Reports",
    params(PeriodFilter),
    responses((status = 200, description = "Análise anual", body = AnnualAnalytics)),
    security(("api_jwt" = []))
)]
pub async fn annual_analytics(
    State(app_state): State<AppState>,
    locale: Locale,
    seq: RequestSeq,
    Query(filter): Query<PeriodFilter>,
) -> Result<Response, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let year = filter.year.unwrap_or_else(current_year);
    let analytics = app_state
        .analytics_service
        .annual(&app_state.db_pool, year)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(seq.echo(Json(analytics)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_period_is_kept() {
        let filter = PeriodFilter { year: Some(2025), month: Some(3) };
        assert_eq!(resolve_period(&filter), (2025, 3));
    }

    #[test]
    fn missing_month_falls_back_to_current() {
        let filter = PeriodFilter { year: Some(2024), month: None };
        let (year, month) = resolve_period(&filter);
        assert_eq!(year, 2024);
        assert!((1..=12).contains(&month));
    }
}
