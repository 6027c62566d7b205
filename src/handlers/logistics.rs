// src/handlers/logistics.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale, sequencing::RequestSeq},
    models::{
        analytics::LogisticsSummary,
        logistics::{CreateLogisticsPayload, LogisticsEntry, UpdateLogisticsPayload},
        sales::PeriodFilter,
    },
    views::Mutation,
};

#[utoipa::path(
    get,
    path = "/api/logistics",
    tag = "Logistics",
    params(PeriodFilter),
    responses(
        (status = 200, description = "Lançamentos de frota do período", body = Vec<LogisticsEntry>),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_entries(
    State(app_state): State<AppState>,
    locale: Locale,
    seq: RequestSeq,
    Query(filter): Query<PeriodFilter>,
) -> Result<Response, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let entries = app_state
        .logistics_service
        .list(&app_state.db_pool, filter.year, filter.month)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(seq.echo(Json(entries)))
}

#[utoipa::path(
    get,
    path = "/api/logistics/plates",
    tag = "Logistics",
    responses((status = 200, description = "Placas já lançadas", body = Vec<String>)),
    security(("api_jwt" = []))
)]
pub async fn list_plates(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<String>>, ApiError> {
    let plates = app_state
        .logistics_service
        .plates(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(plates))
}

#[utoipa::path(
    get,
    path = "/api/logistics/summary",
    tag = "Logistics",
    params(PeriodFilter),
    responses(
        (status = 200, description = "Totais e custos por veículo", body = LogisticsSummary),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn summary(
    State(app_state): State<AppState>,
    locale: Locale,
    seq: RequestSeq,
    Query(filter): Query<PeriodFilter>,
) -> Result<Response, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let summary = app_state
        .logistics_service
        .summary(&app_state.db_pool, filter.year, filter.month)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(seq.echo(Json(summary)))
}

#[utoipa::path(
    post,
    path = "/api/logistics",
    tag = "Logistics",
    request_body = CreateLogisticsPayload,
    responses(
        (status = 201, description = "Lançamento criado", body = Mutation<LogisticsEntry>),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateLogisticsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .logistics_service
        .create(&app_state.db_pool, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(user_id = %user.id, "Lançamento de frota criado");
    Ok((StatusCode::CREATED, Json(mutation)))
}

#[utoipa::path(
    put,
    path = "/api/logistics/{id}",
    tag = "Logistics",
    request_body = UpdateLogisticsPayload,
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 200, description = "Lançamento atualizado", body = Mutation<LogisticsEntry>),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateLogisticsPayload>,
) -> Result<Json<Mutation<LogisticsEntry>>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .logistics_service
        .update(&app_state.db_pool, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}

#[utoipa::path(
    delete,
    path = "/api/logistics/{id}",
    tag = "Logistics",
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 200, description = "Lançamento removido"),
        (status = 404, description = "Lançamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_entry(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Mutation<()>>, ApiError> {
    let mutation = app_state
        .logistics_service
        .delete(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(user_id = %user.id, entry_id = %id, "Lançamento de frota removido");
    Ok(Json(mutation))
}
