// src/docs.rs

use axum::Json;
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Catalog ---
        handlers::catalog::create_category,
        handlers::catalog::list_categories,
        handlers::catalog::delete_category,
        handlers::catalog::create_product,
        handlers::catalog::update_product,
        handlers::catalog::list_products,
        handlers::catalog::available_products,
        handlers::catalog::delete_product,

        // --- Members ---
        handlers::members::create_member,
        handlers::members::update_member,
        handlers::members::list_members,
        handlers::members::lookup_member,
        handlers::members::delete_member,

        // --- Orders ---
        handlers::orders::submit_order,
        handlers::orders::reverse_order,
        handlers::orders::list_orders,
        handlers::orders::order_detail,

        // --- Reports ---
        handlers::reports::summary,
        handlers::reports::sales_trend,
        handlers::reports::product_ranking,
    ),
    components(
        schemas(
            // --- Catalog ---
            models::catalog::Category,
            models::catalog::Product,
            models::catalog::ProductForSale,
            models::catalog::ProductPage,

            // --- Members ---
            models::member::Member,
            models::member::MemberPage,
            models::member::MemberLookup,

            // --- Orders ---
            models::order::OrderStatus,
            models::order::Order,
            models::order::OrderItem,
            models::order::OrderSummary,
            models::order::OrderDetail,
            models::order::OrderPage,
            models::order::SubmitOrderResponse,

            // --- Reports ---
            models::report::ReportSummary,
            models::report::SalesTrend,
            models::report::RankEntry,
            models::report::ProductRanking,

            // --- Payloads ---
            handlers::catalog::CategoryPayload,
            handlers::catalog::ProductPayload,
            handlers::members::MemberPayload,
            handlers::orders::OrderItemPayload,
            handlers::orders::SubmitOrderPayload,

            // --- Envelope ---
            models::api::ApiMessage,
        )
    ),
    tags(
        (name = "Catalog", description = "Categorias e Produtos"),
        (name = "Members", description = "Programa de Fidelidade"),
        (name = "Orders", description = "Caixa: Lançamento e Reversão de Pedidos"),
        (name = "Reports", description = "Indicadores e Gráficos de Vendas")
    )
)]
pub struct ApiDoc;

// GET /api/docs/openapi.json
// O documento é servido como JSON puro; qualquer visualizador OpenAPI
// externo consegue apontar para cá.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
