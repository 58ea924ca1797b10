// src/db/member_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{common::error::AppError, models::member::Member};

// Repositório de membros do programa de fidelidade.
#[derive(Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_member(
        &self,
        name: &str,
        phone_number: &str,
        discount_rate: Decimal,
    ) -> Result<Member, AppError> {
        sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (name, phone_number, discount_rate)
            VALUES ($1, $2, $3)
            RETURNING id, name, phone_number, discount_rate, total_spent, registered_at
            "#,
        )
        .bind(name)
        .bind(phone_number)
        .bind(discount_rate)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::MemberPhoneAlreadyExists(phone_number.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn update_member(
        &self,
        member_id: i32,
        name: &str,
        phone_number: &str,
        discount_rate: Decimal,
    ) -> Result<Option<Member>, AppError> {
        sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET name = $2, phone_number = $3, discount_rate = $4
            WHERE id = $1
            RETURNING id, name, phone_number, discount_rate, total_spent, registered_at
            "#,
        )
        .bind(member_id)
        .bind(name)
        .bind(phone_number)
        .bind(discount_rate)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::MemberPhoneAlreadyExists(phone_number.to_string());
                }
            }
            e.into()
        })
    }

    pub async fn get_member<'e, E>(
        &self,
        executor: E,
        member_id: i32,
    ) -> Result<Option<Member>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, name, phone_number, discount_rate, total_spent, registered_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(member_id)
        .fetch_optional(executor)
        .await?;

        Ok(member)
    }

    // Busca exata por telefone, usada pela tela do caixa.
    pub async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Member>, AppError> {
        let member = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, name, phone_number, discount_rate, total_spent, registered_at
            FROM members
            WHERE phone_number = $1
            "#,
        )
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn list_members(
        &self,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Member>, AppError> {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT id, name, phone_number, discount_rate, total_spent, registered_at
            FROM members
            WHERE ($1::text IS NULL OR name ILIKE $1 OR phone_number LIKE $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    pub async fn count_members(&self, search: Option<&str>) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM members
            WHERE ($1::text IS NULL OR name ILIKE $1 OR phone_number LIKE $1)
            "#,
        )
        .bind(search)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    // Delta positivo acumula consumo (venda), negativo estorna (reversão).
    pub async fn adjust_total_spent<'e, E>(
        &self,
        executor: E,
        member_id: i32,
        delta: Decimal,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total_after = sqlx::query_scalar::<_, Decimal>(
            r#"
            UPDATE members
            SET total_spent = total_spent + $2
            WHERE id = $1
            RETURNING total_spent
            "#,
        )
        .bind(member_id)
        .bind(delta)
        .fetch_one(executor)
        .await?;

        Ok(total_after)
    }

    pub async fn delete_member(&self, member_id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(member_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_foreign_key_violation() {
                        return AppError::MemberHasOrders;
                    }
                }
                e.into()
            })?;

        Ok(result.rows_affected())
    }
}
