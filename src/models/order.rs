// src/models/order.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Completed,
    Cancelled,
}

// --- Structs de Persistência ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i32,
    pub order_date: DateTime<Utc>,
    pub member_id: Option<i32>,
    #[schema(example = "30.00")]
    pub original_amount: Decimal,
    #[schema(example = "1.50")]
    pub discount_amount: Decimal,
    #[schema(example = "28.50")]
    pub final_amount: Decimal,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    #[schema(example = 3)]
    pub quantity: i32,
    // Valores congelados no momento da venda.
    #[schema(example = "8.50")]
    pub price_at_sale: Decimal,
    #[schema(example = "5.20")]
    pub cost_at_sale: Decimal,
    #[schema(example = "25.50")]
    pub line_subtotal: Decimal,
}

// Linha da listagem de pedidos, já com os dados do membro resolvidos.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: i32,
    pub order_date: DateTime<Utc>,
    pub member_id: Option<i32>,
    pub member_name: Option<String>,
    pub member_phone: Option<String>,
    pub original_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub header: Order,
    pub member_name: Option<String>,
    pub items: Vec<OrderItem>,
    // final_amount menos a soma de (cost_at_sale * quantity).
    #[schema(example = "9.90")]
    pub gross_profit: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub items: Vec<OrderSummary>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

// --- Entrada de Pedido (montada pelo handler a partir do payload) ---

#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_subtotal: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub member_id: Option<i32>,
    pub original_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub lines: Vec<NewOrderLine>,
}

// --- Efeitos Aplicados ---
// O serviço devolve o que de fato mudou no estoque e no membro; o handler
// loga e responde a partir disso, sem refazer contas.

#[derive(Debug, Clone)]
pub struct StockAdjustment {
    pub product_id: i32,
    pub product_name: String,
    pub delta: i32,
    pub stock_after: i32,
}

#[derive(Debug, Clone)]
pub struct MemberAccrual {
    pub member_id: i32,
    pub amount: Decimal,
    pub total_spent_after: Decimal,
}

#[derive(Debug)]
pub struct PlacementSummary {
    pub order: Order,
    pub stock_changes: Vec<StockAdjustment>,
    pub member_accrual: Option<MemberAccrual>,
}

#[derive(Debug)]
pub struct ReversalSummary {
    pub order_id: i32,
    pub stock_changes: Vec<StockAdjustment>,
    pub member_refund: Option<MemberAccrual>,
}

// --- Filtros de Consulta ---

#[derive(Debug, Clone, Default)]
pub struct OrderListFilter {
    pub order_id: Option<i32>,
    pub member_phone: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// --- Respostas ---

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderResponse {
    pub success: bool,
    #[schema(example = "Pedido criado com sucesso.")]
    pub message: String,
    #[schema(example = 42)]
    pub order_id: Option<i32>,
}
