// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    #[schema(example = "Frutas")]
    pub name: String,
}

// --- 2. Produtos ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    #[schema(example = "Maçã Fuji")]
    pub name: String,
    pub category_id: i32,
    #[schema(example = "8.50")]
    pub retail_price: Decimal,
    #[schema(example = "5.20")]
    pub cost_price: Decimal,
    #[schema(example = "kg")]
    pub unit: String,
    #[schema(example = 120)]
    pub stock_quantity: i32,
}

// Visão do ponto de venda: nunca expõe o preço de custo.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductForSale {
    pub id: i32,
    pub name: String,
    pub unit: String,
    pub retail_price: Decimal,
    pub stock_quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}
