// src/services/catalog_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::{db_utils::page_window, error::AppError},
    db::CatalogRepository,
    models::catalog::{Category, Product, ProductForSale, ProductPage},
};

#[derive(Clone)]
pub struct CatalogService {
    catalog_repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(catalog_repo: CatalogRepository) -> Self {
        Self { catalog_repo }
    }

    // --- CATEGORIAS ---

    pub async fn create_category(&self, name: &str) -> Result<Category, AppError> {
        self.catalog_repo.create_category(name).await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.catalog_repo.list_categories().await
    }

    // A contagem e o DELETE rodam na mesma transação; o FK RESTRICT é a
    // rede de segurança para corridas.
    pub async fn delete_category<'e, E>(&self, executor: E, category_id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let products = self
            .catalog_repo
            .count_products_in_category(&mut *tx, category_id)
            .await?;
        if products > 0 {
            return Err(AppError::CategoryInUse { products });
        }

        let deleted = self.catalog_repo.delete_category(&mut *tx, category_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("Categoria #{category_id}")));
        }

        tx.commit().await?;

        tracing::info!("Categoria #{} excluída", category_id);
        Ok(())
    }

    // --- PRODUTOS ---

    pub async fn create_product<'e, E>(
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
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A categoria precisa existir antes do INSERT.
        self.catalog_repo
            .get_category(&mut *tx, category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Categoria #{category_id}")))?;

        let product = self
            .catalog_repo
            .insert_product(
                &mut *tx,
                name,
                category_id,
                retail_price,
                cost_price,
                unit,
                stock_quantity,
            )
            .await?;

        tx.commit().await?;

        tracing::info!("Produto #{} (\"{}\") cadastrado", product.id, product.name);
        Ok(product)
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
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.catalog_repo
            .get_category(&mut *tx, category_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Categoria #{category_id}")))?;

        let product = self
            .catalog_repo
            .update_product(
                &mut *tx,
                product_id,
                name,
                category_id,
                retail_price,
                cost_price,
                unit,
                stock_quantity,
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Produto #{product_id}")))?;

        tx.commit().await?;
        Ok(product)
    }

    pub async fn list_products(
        &self,
        search: Option<String>,
        page: i64,
        per_page: i64,
    ) -> Result<ProductPage, AppError> {
        let (page, per_page, offset) = page_window(page, per_page);
        let pattern = search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let total = self.catalog_repo.count_products(pattern.as_deref()).await?;
        let items = self
            .catalog_repo
            .list_products(pattern.as_deref(), per_page, offset)
            .await?;

        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Ok(ProductPage {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn available_products(&self) -> Result<Vec<ProductForSale>, AppError> {
        self.catalog_repo.list_products_in_stock().await
    }

    pub async fn delete_product(&self, product_id: i32) -> Result<(), AppError> {
        let deleted = self.catalog_repo.delete_product(product_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("Produto #{product_id}")));
        }

        tracing::info!("Produto #{} excluído", product_id);
        Ok(())
    }
}
