// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        api::ApiMessage,
        order::{
            NewOrder, NewOrderLine, OrderDetail, OrderListFilter, OrderPage, SubmitOrderResponse,
        },
    },
};

// ---
// Validação Customizada
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---
// O carrinho chega pronto da tela do caixa: uma linha por produto, com os
// totais já calculados. O serviço confere a aritmética antes de gravar.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    pub product_id: i32,

    #[validate(range(min = 1, message = "A quantidade deve ser de no mínimo 1."))]
    #[schema(example = 3)]
    pub quantity: i32,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "8.50")]
    pub price: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "25.50")]
    pub subtotal: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderPayload {
    pub member_id: Option<i32>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "30.00")]
    pub original_amount: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "1.50")]
    pub discount_amount: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "28.50")]
    pub final_amount: Decimal,

    #[validate(nested)]
    pub items: Vec<OrderItemPayload>,
}

impl SubmitOrderPayload {
    fn into_new_order(self) -> NewOrder {
        NewOrder {
            member_id: self.member_id,
            original_amount: self.original_amount,
            discount_amount: self.discount_amount,
            final_amount: self.final_amount,
            lines: self
                .items
                .into_iter()
                .map(|item| NewOrderLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                    unit_price: item.price,
                    line_subtotal: item.subtotal,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub order_id: Option<i32>,
    // Telefone do membro (parcial).
    pub member_phone: Option<String>,
    // Formato YYYY-MM-DD; o dia final entra inteiro no filtro.
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

// ---
// Handlers
// ---

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = SubmitOrderPayload,
    responses(
        (status = 201, description = "Pedido registrado", body = SubmitOrderResponse),
        (status = 400, description = "Carrinho vazio, valores inconsistentes ou estoque insuficiente"),
        (status = 404, description = "Produto ou membro não existe")
    )
)]
pub async fn submit_order(
    State(app_state): State<AppState>,
    Json(payload): Json<SubmitOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let summary = app_state
        .order_service
        .place_order(&app_state.db_pool, payload.into_new_order())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitOrderResponse {
            success: true,
            message: "Pedido criado com sucesso.".to_string(),
            order_id: Some(summary.order.id),
        }),
    ))
}

// DELETE /api/orders/{id}
#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = i32, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido revertido: estoque devolvido e consumo estornado", body = ApiMessage),
        (status = 404, description = "Pedido não existe"),
        (status = 409, description = "Pedido não está mais ativo")
    )
)]
pub async fn reverse_order(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiMessage>, AppError> {
    let summary = app_state
        .order_service
        .reverse_order(&app_state.db_pool, id)
        .await?;

    Ok(Json(ApiMessage::ok(format!(
        "Pedido #{} excluído e estoque restaurado.",
        summary.order_id
    ))))
}

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Página de pedidos", body = OrderPage),
        (status = 400, description = "Data fora do intervalo suportado")
    )
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<OrderPage>, AppError> {
    let filter = OrderListFilter {
        order_id: query.order_id,
        member_phone: query.member_phone,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    let page = app_state
        .order_service
        .list_orders(filter, query.page.unwrap_or(1), query.per_page.unwrap_or(10))
        .await?;

    Ok(Json(page))
}

// GET /api/orders/{id}
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    params(("id" = i32, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido com itens e lucro bruto", body = OrderDetail),
        (status = 404, description = "Pedido não existe")
    )
)]
pub async fn order_detail(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<OrderDetail>, AppError> {
    let detail = app_state
        .order_service
        .get_order_detail(&app_state.db_pool, id)
        .await?;

    Ok(Json(detail))
}
