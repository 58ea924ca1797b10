// src/models/report.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// 1. Resumo (os cards do topo do painel)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    #[schema(example = "12480.90")]
    pub total_sales: Decimal,
    #[schema(example = 317)]
    pub completed_orders: i64,
    #[schema(example = "230.40")]
    pub today_sales: Decimal,
}

// 2. Gráfico de Vendas (últimos 30 dias)
#[derive(Debug, Clone, FromRow)]
pub struct DailySalesRow {
    pub day: NaiveDate,
    pub total: Decimal,
}

// Arrays paralelos prontos para o gráfico: um rótulo por dia da janela,
// com zero nos dias sem venda.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesTrend {
    pub dates: Vec<String>,
    pub amounts: Vec<Decimal>,
}

// 3. Ranking de Produtos (últimos 90 dias)
#[derive(Debug, Clone, FromRow)]
pub struct ProductSalesRow {
    pub product_name: String,
    pub total_quantity: i64,
    pub gross_profit: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    #[schema(example = "Maçã Fuji")]
    pub name: String,
    #[schema(example = "86.00")]
    pub value: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRanking {
    pub quantity_rank: Vec<RankEntry>,
    pub profit_rank: Vec<RankEntry>,
}
