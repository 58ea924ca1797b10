// src/handlers/reports.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    models::report::{ProductRanking, ReportSummary, SalesTrend},
};

// GET /api/reports/summary
#[utoipa::path(
    get,
    path = "/api/reports/summary",
    tag = "Reports",
    responses(
        (status = 200, description = "Total vendido, pedidos concluídos e vendas de hoje", body = ReportSummary)
    )
)]
pub async fn summary(State(app_state): State<AppState>) -> Result<Json<ReportSummary>, AppError> {
    let summary = app_state.report_service.summary().await?;
    Ok(Json(summary))
}

// GET /api/reports/sales-trend
#[utoipa::path(
    get,
    path = "/api/reports/sales-trend",
    tag = "Reports",
    responses(
        (status = 200, description = "Vendas por dia dos últimos 30 dias, com zeros nos dias sem venda", body = SalesTrend)
    )
)]
pub async fn sales_trend(State(app_state): State<AppState>) -> Result<Json<SalesTrend>, AppError> {
    let trend = app_state.report_service.sales_trend().await?;
    Ok(Json(trend))
}

// GET /api/reports/product-ranking
#[utoipa::path(
    get,
    path = "/api/reports/product-ranking",
    tag = "Reports",
    responses(
        (status = 200, description = "Top 10 produtos por quantidade vendida e por lucro bruto (90 dias)", body = ProductRanking)
    )
)]
pub async fn product_ranking(
    State(app_state): State<AppState>,
) -> Result<Json<ProductRanking>, AppError> {
    let ranking = app_state.report_service.product_ranking().await?;
    Ok(Json(ranking))
}
