// src/handlers/catalog.rs

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
        catalog::{Category, Product, ProductForSale, ProductPage},
    },
};

// ---
// Validação Customizada
// ---
fn validate_min_price(val: &Decimal) -> Result<(), ValidationError> {
    if *val < Decimal::new(1, 2) {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.01);
        err.message = Some("O preço deve ser de no mínimo 0.01.".into());
        return Err(err);
    }
    Ok(())
}

// ---
// Payloads
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[validate(length(min = 1, max = 50, message = "O nome deve ter entre 1 e 50 caracteres."))]
    #[schema(example = "Frutas")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    #[schema(example = "Maçã Fuji")]
    pub name: String,

    pub category_id: i32,

    #[validate(custom(function = "validate_min_price"))]
    #[schema(example = "8.50")]
    pub retail_price: Decimal,

    #[validate(custom(function = "validate_min_price"))]
    #[schema(example = "5.20")]
    pub cost_price: Decimal,

    #[validate(length(min = 1, max = 20, message = "A unidade deve ter entre 1 e 20 caracteres."))]
    #[schema(example = "kg")]
    pub unit: String,

    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    #[schema(example = 120)]
    pub stock_quantity: i32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    // Filtro por nome (parcial, sem diferenciar maiúsculas).
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

// ---
// Handlers: Categorias
// ---

// POST /api/categories
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Catalog",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 409, description = "Nome de categoria já existe")
    )
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let category = app_state.catalog_service.create_category(&payload.name).await?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    responses(
        (status = 200, description = "Todas as categorias", body = [Category])
    )
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = app_state.catalog_service.list_categories().await?;
    Ok(Json(categories))
}

// DELETE /api/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = i32, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria excluída", body = ApiMessage),
        (status = 404, description = "Categoria não existe"),
        (status = 409, description = "Categoria ainda possui produtos")
    )
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiMessage>, AppError> {
    app_state
        .catalog_service
        .delete_category(&app_state.db_pool, id)
        .await?;

    Ok(Json(ApiMessage::ok(format!("Categoria #{id} excluída."))))
}

// ---
// Handlers: Produtos
// ---

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto cadastrado", body = Product),
        (status = 404, description = "Categoria não existe"),
        (status = 409, description = "Nome de produto já existe")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .catalog_service
        .create_product(
            &app_state.db_pool,
            &payload.name,
            payload.category_id,
            payload.retail_price,
            payload.cost_price,
            &payload.unit,
            payload.stock_quantity,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = i32, Path, description = "ID do produto")),
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto ou categoria não existe")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let product = app_state
        .catalog_service
        .update_product(
            &app_state.db_pool,
            id,
            &payload.name,
            payload.category_id,
            payload.retail_price,
            payload.cost_price,
            &payload.unit,
            payload.stock_quantity,
        )
        .await?;

    Ok(Json(product))
}

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Página de produtos", body = ProductPage)
    )
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductPage>, AppError> {
    let page = app_state
        .catalog_service
        .list_products(query.search, query.page.unwrap_or(1), query.per_page.unwrap_or(10))
        .await?;

    Ok(Json(page))
}

// GET /api/products/available
#[utoipa::path(
    get,
    path = "/api/products/available",
    tag = "Catalog",
    responses(
        (status = 200, description = "Produtos com estoque, sem preço de custo", body = [ProductForSale])
    )
)]
pub async fn available_products(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ProductForSale>>, AppError> {
    let products = app_state.catalog_service.available_products().await?;
    Ok(Json(products))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = i32, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto excluído", body = ApiMessage),
        (status = 404, description = "Produto não existe"),
        (status = 409, description = "Produto possui vendas registradas")
    )
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiMessage>, AppError> {
    app_state.catalog_service.delete_product(id).await?;

    Ok(Json(ApiMessage::ok(format!("Produto #{id} excluído."))))
}
