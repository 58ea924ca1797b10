// src/handlers/members.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        api::ApiMessage,
        member::{Member, MemberLookup, MemberPage},
    },
};

// ---
// Validação Customizada
// ---
// O desconto é um multiplicador: 0.95 paga 95% da conta. Fora de (0, 1]
// não faz sentido comercial.
fn validate_discount_rate(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::new(1, 2) || *val > Decimal::ONE {
        let mut err = ValidationError::new("range");
        err.message = Some("O desconto deve estar entre 0.01 e 1.00.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberPayload {
    #[validate(length(min = 1, max = 50, message = "O nome deve ter entre 1 e 50 caracteres."))]
    #[schema(example = "Dona Marta")]
    pub name: String,

    #[validate(length(min = 11, max = 20, message = "O telefone deve ter entre 11 e 20 dígitos."))]
    #[schema(example = "11987654321")]
    pub phone_number: String,

    #[validate(custom(function = "validate_discount_rate"))]
    #[schema(example = "0.95")]
    pub discount_rate: Decimal,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MemberListQuery {
    // Filtro por nome ou telefone (parcial).
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MemberLookupQuery {
    // Telefone exato, como digitado no caixa.
    pub phone: String,
}

// ---
// Handlers
// ---

// POST /api/members
#[utoipa::path(
    post,
    path = "/api/members",
    tag = "Members",
    request_body = MemberPayload,
    responses(
        (status = 201, description = "Membro cadastrado", body = Member),
        (status = 409, description = "Telefone já cadastrado")
    )
)]
pub async fn create_member(
    State(app_state): State<AppState>,
    Json(payload): Json<MemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let member = app_state
        .member_service
        .create_member(&payload.name, &payload.phone_number, payload.discount_rate)
        .await?;

    Ok((StatusCode::CREATED, Json(member)))
}

// PUT /api/members/{id}
#[utoipa::path(
    put,
    path = "/api/members/{id}",
    tag = "Members",
    params(("id" = i32, Path, description = "ID do membro")),
    request_body = MemberPayload,
    responses(
        (status = 200, description = "Cadastro atualizado", body = Member),
        (status = 404, description = "Membro não existe"),
        (status = 409, description = "Telefone já cadastrado")
    )
)]
pub async fn update_member(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<MemberPayload>,
) -> Result<Json<Member>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let member = app_state
        .member_service
        .update_member(id, &payload.name, &payload.phone_number, payload.discount_rate)
        .await?;

    Ok(Json(member))
}

// GET /api/members
#[utoipa::path(
    get,
    path = "/api/members",
    tag = "Members",
    params(MemberListQuery),
    responses(
        (status = 200, description = "Página de membros", body = MemberPage)
    )
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    Query(query): Query<MemberListQuery>,
) -> Result<Json<MemberPage>, AppError> {
    let page = app_state
        .member_service
        .list_members(query.search, query.page.unwrap_or(1), query.per_page.unwrap_or(10))
        .await?;

    Ok(Json(page))
}

// GET /api/members/lookup?phone=...
#[utoipa::path(
    get,
    path = "/api/members/lookup",
    tag = "Members",
    params(MemberLookupQuery),
    responses(
        (status = 200, description = "Membro localizado", body = MemberLookup),
        (status = 404, description = "Nenhum membro com esse telefone")
    )
)]
pub async fn lookup_member(
    State(app_state): State<AppState>,
    Query(query): Query<MemberLookupQuery>,
) -> Result<Json<MemberLookup>, AppError> {
    let member = app_state.member_service.lookup_by_phone(&query.phone).await?;

    Ok(Json(MemberLookup {
        success: true,
        id: member.id,
        name: member.name,
        discount: member.discount_rate,
    }))
}

// DELETE /api/members/{id}
#[utoipa::path(
    delete,
    path = "/api/members/{id}",
    tag = "Members",
    params(("id" = i32, Path, description = "ID do membro")),
    responses(
        (status = 200, description = "Membro excluído", body = ApiMessage),
        (status = 404, description = "Membro não existe"),
        (status = 409, description = "Membro possui pedidos registrados")
    )
)]
pub async fn delete_member(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiMessage>, AppError> {
    app_state.member_service.delete_member(id).await?;

    Ok(Json(ApiMessage::ok(format!("Membro #{id} excluído."))))
}
