// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::catalog::{Category, Product, ProductForSale},
};

// Repositório do catálogo: todas as interações com 'categories' e 'products'.
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn create_category(&self, name: &str) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::CategoryNameAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    pub async fn get_category<'e, E>(
        &self,
        executor: E,
        category_id: i32,
    ) -> Result<Option<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
                .bind(category_id)
                .fetch_optional(executor)
                .await?;

        Ok(category)
    }

    pub async fn count_products_in_category<'e, E>(
        &self,
        executor: E,
        category_id: i32,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(executor)
                .await?;

        Ok(count)
    }

    pub async fn delete_category<'e, E>(&self, executor: E, category_id: i32) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  PRODUTOS
    // =========================================================================

    pub async fn insert_product<'e, E>(
        &self,
        executor: E,
        name: &str,
        category_id: i32,
        retail_price: Decimal,
        cost_price: Decimal,
        unit: &str,
        stock_quantity: i32,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, category_id, retail_price, cost_price, unit, stock_quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, category_id, retail_price, cost_price, unit, stock_quantity
            "#,
        )
        .bind(name)
        .bind(category_id)
        .bind(retail_price)
        .bind(cost_price)
        .bind(unit)
        .bind(stock_quantity)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::ProductNameAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        product_id: i32,
        name: &str,
        category_id: i32,
        retail_price: Decimal,
        cost_price: Decimal,
        unit: &str,
        stock_quantity: i32,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, category_id = $3, retail_price = $4,
                cost_price = $5, unit = $6, stock_quantity = $7
            WHERE id = $1
            RETURNING id, name, category_id, retail_price, cost_price, unit, stock_quantity
            "#,
        )
        .bind(product_id)
        .bind(name)
        .bind(category_id)
        .bind(retail_price)
        .bind(cost_price)
        .bind(unit)
        .bind(stock_quantity)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::ProductNameAlreadyExists(name.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn list_products(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id, retail_price, cost_price, unit, stock_quantity
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn count_products(&self, search: Option<&str>) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // Somente o que o caixa pode vender: estoque positivo, sem preço de custo.
    pub async fn list_products_in_stock(&self) -> Result<Vec<ProductForSale>, AppError> {
        let products = sqlx::query_as::<_, ProductForSale>(
            r#"
            SELECT id, name, unit, retail_price, stock_quantity
            FROM products
            WHERE stock_quantity > 0
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn get_product(&self, product_id: i32) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id, retail_price, cost_price, unit, stock_quantity
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    // Trava a linha do produto até o fim da transação. Quem chegar depois
    // espera e enxerga o estoque já debitado.
    pub async fn get_product_for_update<'e, E>(
        &self,
        executor: E,
        product_id: i32,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, category_id, retail_price, cost_price, unit, stock_quantity
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .fetch_optional(executor)
        .await?;

        Ok(product)
    }

    // Delta negativo debita (venda), positivo devolve (reversão).
    pub async fn adjust_stock<'e, E>(
        &self,
        executor: E,
        product_id: i32,
        delta: i32,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let stock_after = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + $2
            WHERE id = $1
            RETURNING stock_quantity
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;

        Ok(stock_after)
    }

    pub async fn delete_product(&self, product_id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::ProductHasSales;
                    }
                }
                e.into()
            })?;

        Ok(result.rows_affected())
    }
}
