// src/db/order_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::order::{Order, OrderItem, OrderSummary},
};

// Repositório de pedidos e itens de pedido. As regras de negócio (validação
// de estoque, acúmulo do membro) moram no serviço; aqui é só SQL.
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_order<'e, E>(
        &self,
        executor: E,
        member_id: Option<i32>,
        original_amount: Decimal,
        discount_amount: Decimal,
        final_amount: Decimal,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (member_id, original_amount, discount_amount, final_amount)
            VALUES ($1, $2, $3, $4)
            RETURNING id, order_date, member_id, original_amount, discount_amount,
                      final_amount, status
            "#,
        )
        .bind(member_id)
        .bind(original_amount)
        .bind(discount_amount)
        .bind(final_amount)
        .fetch_one(executor)
        .await?;

        Ok(order)
    }

    pub async fn insert_order_item<'e, E>(
        &self,
        executor: E,
        order_id: i32,
        product_id: i32,
        quantity: i32,
        price_at_sale: Decimal,
        cost_at_sale: Decimal,
        line_subtotal: Decimal,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, product_id, quantity, price_at_sale,
                                     cost_at_sale, line_subtotal)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, order_id, product_id, quantity, price_at_sale,
                      cost_at_sale, line_subtotal
            "#,
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .bind(price_at_sale)
        .bind(cost_at_sale)
        .bind(line_subtotal)
        .fetch_one(executor)
        .await?;

        Ok(item)
    }

    pub async fn get_order<'e, E>(
        &self,
        executor: E,
        order_id: i32,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_date, member_id, original_amount, discount_amount,
                   final_amount, status
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(executor)
        .await?;

        Ok(order)
    }

    // Trava o cabeçalho do pedido; duas reversões simultâneas do mesmo
    // pedido ficam serializadas e a segunda falha no teste de estado.
    pub async fn get_order_for_update<'e, E>(
        &self,
        executor: E,
        order_id: i32,
    ) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_date, member_id, original_amount, discount_amount,
                   final_amount, status
            FROM orders
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(order_id)
        .fetch_optional(executor)
        .await?;

        Ok(order)
    }

    pub async fn list_order_items<'e, E>(
        &self,
        executor: E,
        order_id: i32,
    ) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, quantity, price_at_sale,
                   cost_at_sale, line_subtotal
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;

        Ok(items)
    }

    // O DELETE em 'orders' arrasta os itens junto (ON DELETE CASCADE).
    pub async fn delete_order<'e, E>(&self, executor: E, order_id: i32) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn list_orders(
        &self,
        order_id: Option<i32>,
        phone_like: Option<&str>,
        starts_at: Option<DateTime<Utc>>,
        ends_before: Option<DateTime<Utc>>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<OrderSummary>, AppError> {
        let orders = sqlx::query_as::<_, OrderSummary>(
            r#"
            SELECT o.id, o.order_date, o.member_id,
                   m.name AS member_name, m.phone_number AS member_phone,
                   o.original_amount, o.discount_amount, o.final_amount, o.status
            FROM orders o
            LEFT JOIN members m ON m.id = o.member_id
            WHERE ($1::int IS NULL OR o.id = $1)
              AND ($2::text IS NULL OR m.phone_number LIKE $2)
              AND ($3::timestamptz IS NULL OR o.order_date >= $3)
              AND ($4::timestamptz IS NULL OR o.order_date < $4)
            ORDER BY o.order_date DESC, o.id DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(order_id)
        .bind(phone_like)
        .bind(starts_at)
        .bind(ends_before)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn count_orders(
        &self,
        order_id: Option<i32>,
        phone_like: Option<&str>,
        starts_at: Option<DateTime<Utc>>,
        ends_before: Option<DateTime<Utc>>,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM orders o
            LEFT JOIN members m ON m.id = o.member_id
            WHERE ($1::int IS NULL OR o.id = $1)
              AND ($2::text IS NULL OR m.phone_number LIKE $2)
              AND ($3::timestamptz IS NULL OR o.order_date >= $3)
              AND ($4::timestamptz IS NULL OR o.order_date < $4)
            "#,
        )
        .bind(order_id)
        .bind(phone_like)
        .bind(starts_at)
        .bind(ends_before)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
