//src/main.rs

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::env;
use tokio::net::TcpListener;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;
#[cfg(test)]
mod tests;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Lida com o Result retornado por AppState::new()
    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Catálogo: categorias e produtos
    let category_routes = Router::new()
        .route(
            "/",
            post(handlers::catalog::create_category).get(handlers::catalog::list_categories),
        )
        .route("/{id}", delete(handlers::catalog::delete_category));

    let product_routes = Router::new()
        .route(
            "/",
            post(handlers::catalog::create_product).get(handlers::catalog::list_products),
        )
        .route("/available", get(handlers::catalog::available_products))
        .route(
            "/{id}",
            put(handlers::catalog::update_product).delete(handlers::catalog::delete_product),
        );

    // Membros do programa de fidelidade
    let member_routes = Router::new()
        .route(
            "/",
            post(handlers::members::create_member).get(handlers::members::list_members),
        )
        .route("/lookup", get(handlers::members::lookup_member))
        .route(
            "/{id}",
            put(handlers::members::update_member).delete(handlers::members::delete_member),
        );

    // Caixa: lançamento, consulta e reversão de pedidos
    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::orders::submit_order).get(handlers::orders::list_orders),
        )
        .route(
            "/{id}",
            get(handlers::orders::order_detail).delete(handlers::orders::reverse_order),
        );

    // Painel de vendas
    let report_routes = Router::new()
        .route("/summary", get(handlers::reports::summary))
        .route("/sales-trend", get(handlers::reports::sales_trend))
        .route("/product-ranking", get(handlers::reports::product_ranking));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(docs::openapi_json))
        .nest("/api/categories", category_routes)
        .nest("/api/products", product_routes)
        .nest("/api/members", member_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/reports", report_routes)
        .with_state(app_state);

    // Inicia o servidor
    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
