// src/models/member.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: i32,
    #[schema(example = "Dona Marta")]
    pub name: String,
    #[schema(example = "11987654321")]
    pub phone_number: String,
    // Multiplicador aplicado no caixa: 0.95 = 5% de desconto, 1.00 = sem desconto.
    #[schema(example = "0.95")]
    pub discount_rate: Decimal,
    #[schema(example = "340.80")]
    pub total_spent: Decimal,
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberPage {
    pub items: Vec<Member>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
}

// Resposta enxuta da busca por telefone, usada pela tela do caixa.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberLookup {
    pub success: bool,
    pub id: i32,
    pub name: String,
    pub discount: Decimal,
}
