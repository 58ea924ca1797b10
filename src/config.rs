// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{CatalogRepository, MemberRepository, OrderRepository, ReportRepository},
    services::{CatalogService, MemberService, OrderService, ReportService},
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub catalog_service: CatalogService,
    pub member_service: MemberService,
    pub order_service: OrderService,
    pub report_service: ReportService,
}

impl AppState {
    // A assinatura retorna um Result: configuração quebrada não sobe servidor.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let member_repo = MemberRepository::new(db_pool.clone());
        let order_repo = OrderRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());

        let catalog_service = CatalogService::new(catalog_repo.clone());
        let member_service = MemberService::new(member_repo.clone());
        // O serviço de pedidos fala com as três tabelas dentro da mesma transação.
        let order_service = OrderService::new(order_repo, catalog_repo, member_repo);
        let report_service = ReportService::new(report_repo);

        Ok(Self {
            db_pool,
            catalog_service,
            member_service,
            order_service,
            report_service,
        })
    }
}
