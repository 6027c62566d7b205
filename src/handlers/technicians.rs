// src/handlers/technicians.rs
//
// Técnicos, metas mensais por técnico e metas da fábrica.

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
    handlers::reports::current_year,
    middleware::{auth::AuthenticatedUser, i18n::Locale, sequencing::RequestSeq},
    models::sales::{
        CreateQuotaPayload, CreateTechnicianPayload, FactoryQuota, FactoryQuotaPayload,
        PeriodFilter, Technician, TechnicianFilter, TechnicianQuota, UpdateAmountsPayload,
        UpdateTechnicianPayload, UpsertQuotaPayload,
    },
    views::Mutation,
};

// --- Técnicos ---

#[utoipa::path(
    get,
    path = "/api/technicians",
    tag = "Technicians",
    params(TechnicianFilter),
    responses((status = 200, description = "Técnicos cadastrados", body = Vec<Technician>)),
    security(("api_jwt" = []))
)]
pub async fn list_technicians(
    State(app_state): State<AppState>,
    locale: Locale,
    seq: RequestSeq,
    Query(filter): Query<TechnicianFilter>,
) -> Result<Response, ApiError> {
    let technicians = app_state
        .technician_service
        .list_technicians(&app_state.db_pool, filter.include_inactive)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(seq.echo(Json(technicians)))
}

#[utoipa::path(
    post,
    path = "/api/technicians",
    tag = "Technicians",
    request_body = CreateTechnicianPayload,
    responses(
        (status = 201, description = "Técnico criado", body = Mutation<Technician>),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_technician(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateTechnicianPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technician_service
        .create_technician(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(user_id = %user.id, name = %payload.name, "Técnico cadastrado");
    Ok((StatusCode::CREATED, Json(mutation)))
}

#[utoipa::path(
    put,
    path = "/api/technicians/{id}",
    tag = "Technicians",
    request_body = UpdateTechnicianPayload,
    params(("id" = Uuid, Path, description = "ID do técnico")),
    responses(
        (status = 200, description = "Técnico atualizado", body = Mutation<Technician>),
        (status = 404, description = "Técnico não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_technician(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTechnicianPayload>,
) -> Result<Json<Mutation<Technician>>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technician_service
        .update_technician(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}

#[utoipa::path(
    delete,
    path = "/api/technicians/{id}",
    tag = "Technicians",
    params(("id" = Uuid, Path, description = "ID do técnico")),
    responses(
        (status = 200, description = "Técnico removido, ou desativado se tiver histórico"),
        (status = 404, description = "Técnico não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_technician(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Mutation<()>>, ApiError> {
    let mutation = app_state
        .technician_service
        .remove_technician(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(user_id = %user.id, technician_id = %id, status = ?mutation.status, "Técnico removido");
    Ok(Json(mutation))
}

// --- Metas por técnico ---

#[utoipa::path(
    get,
    path = "/api/technician-quotas",
    tag = "Technician Quotas",
    params(PeriodFilter),
    responses(
        (status = 200, description = "Metas do ano (e mês, se informado)", body = Vec<TechnicianQuota>),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_quotas(
    State(app_state): State<AppState>,
    locale: Locale,
    seq: RequestSeq,
    Query(filter): Query<PeriodFilter>,
) -> Result<Response, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let year = filter.year.unwrap_or_else(current_year);
    let quotas = app_state
        .technician_service
        .list_quotas(&app_state.db_pool, year, filter.month)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(seq.echo(Json(quotas)))
}

#[utoipa::path(
    post,
    path = "/api/technician-quotas",
    tag = "Technician Quotas",
    request_body = CreateQuotaPayload,
    responses(
        (status = 201, description = "Meta criada", body = Mutation<TechnicianQuota>),
        (status = 409, description = "Já existe meta para o técnico no mês")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateQuotaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technician_service
        .create_quota(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(
        user_id = %user.id,
        technician_id = %payload.technician_id,
        year = payload.year,
        month = payload.month,
        "Meta de técnico criada"
    );
    Ok((StatusCode::CREATED, Json(mutation)))
}

#[utoipa::path(
    put,
    path = "/api/technician-quotas",
    tag = "Technician Quotas",
    request_body = UpsertQuotaPayload,
    responses(
        (status = 200, description = "Meta gravada pela chave (técnico, ano, mês)", body = Mutation<TechnicianQuota>),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<UpsertQuotaPayload>,
) -> Result<Json<Mutation<TechnicianQuota>>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technician_service
        .upsert_quota(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}

#[utoipa::path(
    put,
    path = "/api/technician-quotas/{id}",
    tag = "Technician Quotas",
    request_body = UpdateAmountsPayload,
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, description = "Meta atualizada", body = Mutation<TechnicianQuota>),
        (status = 404, description = "Meta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAmountsPayload>,
) -> Result<Json<Mutation<TechnicianQuota>>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technician_service
        .update_quota(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}

#[utoipa::path(
    delete,
    path = "/api/technician-quotas/{id}",
    tag = "Technician Quotas",
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, description = "Meta removida"),
        (status = 404, description = "Meta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Mutation<()>>, ApiError> {
    let mutation = app_state
        .technician_service
        .delete_quota(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(user_id = %user.id, quota_id = %id, "Meta de técnico removida");
    Ok(Json(mutation))
}

// --- Metas da fábrica ---

#[utoipa::path(
    get,
    path = "/api/factory-quotas",
    tag = "Factory Quotas",
    params(PeriodFilter),
    responses((status = 200, description = "Metas da fábrica no ano", body = Vec<FactoryQuota>)),
    security(("api_jwt" = []))
)]
pub async fn list_factory_quotas(
    State(app_state): State<AppState>,
    locale: Locale,
    seq: RequestSeq,
    Query(filter): Query<PeriodFilter>,
) -> Result<Response, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let year = filter.year.unwrap_or_else(current_year);
    let quotas = app_state
        .technician_service
        .list_factory_quotas(&app_state.db_pool, year)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(seq.echo(Json(quotas)))
}

#[utoipa::path(
    put,
    path = "/api/factory-quotas",
    tag = "Factory Quotas",
    request_body = FactoryQuotaPayload,
    responses(
        (status = 200, description = "Meta da fábrica gravada", body = Mutation<FactoryQuota>),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_factory_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<FactoryQuotaPayload>,
) -> Result<Json<Mutation<FactoryQuota>>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technician_service
        .upsert_factory_quota(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(user_id = %user.id, year = payload.year, month = payload.month, "Meta da fábrica gravada");
    Ok(Json(mutation))
}
