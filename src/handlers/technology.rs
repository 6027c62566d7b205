// src/handlers/technology.rs

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
    models::{
        analytics::{CommissionRuleView, TechnologySummary},
        sales::{PeriodFilter, UpdateAmountsPayload},
        technology::{
            CreateCategoryQuotaPayload, CreateVendorPayload, CreateVendorQuotaPayload,
            TechnologyCategoryQuota, TechnologyFilter, TechnologyVendor, TechnologyVendorQuota,
            UpdateVendorPayload, VendorFilter,
        },
    },
    views::Mutation,
};

#[utoipa::path(
    get,
    path = "/api/technology/commission-rules",
    tag = "Technology",
    responses((status = 200, description = "Tabela de comissões por categoria", body = Vec<CommissionRuleView>)),
    security(("api_jwt" = []))
)]
pub async fn commission_rules(State(app_state): State<AppState>) -> Json<Vec<CommissionRuleView>> {
    Json(app_state.technology_service.commission_rules())
}

#[utoipa::path(
    get,
    path = "/api/technology/summary",
    tag = "Technology",
    params(PeriodFilter),
    responses((status = 200, description = "Resumo anual por categoria e vendedor", body = TechnologySummary)),
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

    let year = filter.year.unwrap_or_else(current_year);
    let summary = app_state
        .technology_service
        .summary(&app_state.db_pool, year)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(seq.echo(Json(summary)))
}

// --- Vendedores ---

#[utoipa::path(
    get,
    path = "/api/technology/vendors",
    tag = "Technology",
    params(VendorFilter),
    responses((status = 200, description = "Vendedores de tecnologia", body = Vec<TechnologyVendor>)),
    security(("api_jwt" = []))
)]
pub async fn list_vendors(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<VendorFilter>,
) -> Result<Json<Vec<TechnologyVendor>>, ApiError> {
    let vendors = app_state
        .technology_service
        .list_vendors(&app_state.db_pool, filter.include_inactive)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(vendors))
}

#[utoipa::path(
    post,
    path = "/api/technology/vendors",
    tag = "Technology",
    request_body = CreateVendorPayload,
    responses(
        (status = 201, description = "Vendedor criado", body = Mutation<TechnologyVendor>),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateVendorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technology_service
        .create_vendor(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(user_id = %user.id, name = %payload.name, "Vendedor cadastrado");
    Ok((StatusCode::CREATED, Json(mutation)))
}

#[utoipa::path(
    put,
    path = "/api/technology/vendors/{id}",
    tag = "Technology",
    request_body = UpdateVendorPayload,
    params(("id" = Uuid, Path, description = "ID do vendedor")),
    responses(
        (status = 200, description = "Vendedor atualizado", body = Mutation<TechnologyVendor>),
        (status = 404, description = "Vendedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVendorPayload>,
) -> Result<Json<Mutation<TechnologyVendor>>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technology_service
        .update_vendor(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}

#[utoipa::path(
    delete,
    path = "/api/technology/vendors/{id}",
    tag = "Technology",
    params(("id" = Uuid, Path, description = "ID do vendedor")),
    responses(
        (status = 200, description = "Vendedor removido, ou desativado se tiver metas"),
        (status = 404, description = "Vendedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_vendor(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Mutation<()>>, ApiError> {
    let mutation = app_state
        .technology_service
        .remove_vendor(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(user_id = %user.id, vendor_id = %id, status = ?mutation.status, "Vendedor removido");
    Ok(Json(mutation))
}

// --- Metas por vendedor ---

#[utoipa::path(
    get,
    path = "/api/technology/vendor-quotas",
    tag = "Technology",
    params(TechnologyFilter),
    responses(
        (status = 200, description = "Metas por vendedor", body = Vec<TechnologyVendorQuota>),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_vendor_quotas(
    State(app_state): State<AppState>,
    locale: Locale,
    seq: RequestSeq,
    Query(filter): Query<TechnologyFilter>,
) -> Result<Response, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let quotas = app_state
        .technology_service
        .list_vendor_quotas(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(seq.echo(Json(quotas)))
}

#[utoipa::path(
    post,
    path = "/api/technology/vendor-quotas",
    tag = "Technology",
    request_body = CreateVendorQuotaPayload,
    responses(
        (status = 201, description = "Meta criada", body = Mutation<TechnologyVendorQuota>),
        (status = 409, description = "Já existe meta para o vendedor no mês e categoria")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_vendor_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateVendorQuotaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technology_service
        .create_vendor_quota(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(user_id = %user.id, vendor_id = %payload.vendor_id, "Meta de vendedor criada");
    Ok((StatusCode::CREATED, Json(mutation)))
}

#[utoipa::path(
    put,
    path = "/api/technology/vendor-quotas/{id}",
    tag = "Technology",
    request_body = UpdateAmountsPayload,
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, description = "Meta atualizada", body = Mutation<TechnologyVendorQuota>),
        (status = 404, description = "Meta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_vendor_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAmountsPayload>,
) -> Result<Json<Mutation<TechnologyVendorQuota>>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technology_service
        .update_vendor_quota(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}

#[utoipa::path(
    delete,
    path = "/api/technology/vendor-quotas/{id}",
    tag = "Technology",
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, description = "Meta removida"),
        (status = 404, description = "Meta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_vendor_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Mutation<()>>, ApiError> {
    let mutation = app_state
        .technology_service
        .delete_vendor_quota(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}

// --- Metas por categoria ---

#[utoipa::path(
    get,
    path = "/api/technology/category-quotas",
    tag = "Technology",
    params(TechnologyFilter),
    responses(
        (status = 200, description = "Metas por categoria", body = Vec<TechnologyCategoryQuota>),
        (status = 400, description = "Filtro inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_category_quotas(
    State(app_state): State<AppState>,
    locale: Locale,
    seq: RequestSeq,
    Query(filter): Query<TechnologyFilter>,
) -> Result<Response, ApiError> {
    filter
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let quotas = app_state
        .technology_service
        .list_category_quotas(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(seq.echo(Json(quotas)))
}

#[utoipa::path(
    post,
    path = "/api/technology/category-quotas",
    tag = "Technology",
    request_body = CreateCategoryQuotaPayload,
    responses(
        (status = 201, description = "Meta criada", body = Mutation<TechnologyCategoryQuota>),
        (status = 409, description = "Já existe meta para a categoria no mês")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateCategoryQuotaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technology_service
        .create_category_quota(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    tracing::info!(user_id = %user.id, category = %payload.category, "Meta de categoria criada");
    Ok((StatusCode::CREATED, Json(mutation)))
}

#[utoipa::path(
    put,
    path = "/api/technology/category-quotas/{id}",
    tag = "Technology",
    request_body = UpdateAmountsPayload,
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, description = "Meta atualizada", body = Mutation<TechnologyCategoryQuota>),
        (status = 404, description = "Meta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAmountsPayload>,
) -> Result<Json<Mutation<TechnologyCategoryQuota>>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mutation = app_state
        .technology_service
        .update_category_quota(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}

#[utoipa::path(
    delete,
    path = "/api/technology/category-quotas/{id}",
    tag = "Technology",
    params(("id" = Uuid, Path, description = "ID da meta")),
    responses(
        (status = 200, description = "Meta removida"),
        (status = 404, description = "Meta não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category_quota(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Mutation<()>>, ApiError> {
    let mutation = app_state
        .technology_service
        .delete_category_quota(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(mutation))
}
