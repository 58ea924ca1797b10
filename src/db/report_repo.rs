// src/db/report_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::report::{DailySalesRow, ProductSalesRow},
};

// Repositório de relatórios: só agregações sobre pedidos concluídos.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Resumo Geral (os três cards do painel)
    pub async fn get_summary(&self) -> Result<(Decimal, i64, Decimal), AppError> {
        // Transação só de leitura: snapshot consistente dos três números.
        let mut tx = self.pool.begin().await?;

        let total_sales = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(final_amount) FROM orders WHERE status = 'COMPLETED'",
        )
        .fetch_one(&mut *tx)
        .await?
        .unwrap_or(Decimal::ZERO);

        let completed_orders = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE status = 'COMPLETED'",
        )
        .fetch_one(&mut *tx)
        .await?;

        let today_sales = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(final_amount) FROM orders
            WHERE status = 'COMPLETED' AND order_date::date = CURRENT_DATE
            "#,
        )
        .fetch_one(&mut *tx)
        .await?
        .unwrap_or(Decimal::ZERO);

        tx.commit().await?;

        Ok((total_sales, completed_orders, today_sales))
    }

    // 2. Vendas por dia desde o corte (para o gráfico de linha)
    pub async fn daily_sales(&self, since: DateTime<Utc>) -> Result<Vec<DailySalesRow>, AppError> {
        let rows = sqlx::query_as::<_, DailySalesRow>(
            r#"
            SELECT order_date::date AS day, SUM(final_amount) AS total
            FROM orders
            WHERE status = 'COMPLETED' AND order_date >= $1
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // 3. Totais por produto desde o corte (base do ranking)
    pub async fn product_sales(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ProductSalesRow>, AppError> {
        let rows = sqlx::query_as::<_, ProductSalesRow>(
            r#"
            SELECT
                p.name AS product_name,
                SUM(oi.quantity) AS total_quantity,
                SUM((oi.price_at_sale - oi.cost_at_sale) * oi.quantity) AS gross_profit
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN products p ON p.id = oi.product_id
            WHERE o.status = 'COMPLETED' AND o.order_date >= $1
            GROUP BY p.id, p.name
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
