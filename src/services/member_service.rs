// src/services/member_service.rs

use rust_decimal::Decimal;

use crate::{
    common::{db_utils::page_window, error::AppError},
    db::MemberRepository,
    models::member::{Member, MemberPage},
};

#[derive(Clone)]
pub struct MemberService {
    member_repo: MemberRepository,
}

impl MemberService {
    pub fn new(member_repo: MemberRepository) -> Self {
        Self { member_repo }
    }

    pub async fn create_member(
        &self,
        name: &str,
        phone_number: &str,
        discount_rate: Decimal,
    ) -> Result<Member, AppError> {
        let member = self
            .member_repo
            .create_member(name, phone_number, discount_rate)
            .await?;

        tracing::info!("Membro #{} (\"{}\") cadastrado", member.id, member.name);
        Ok(member)
    }

    pub async fn update_member(
        &self,
        member_id: i32,
        name: &str,
        phone_number: &str,
        discount_rate: Decimal,
    ) -> Result<Member, AppError> {
        self.member_repo
            .update_member(member_id, name, phone_number, discount_rate)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Membro #{member_id}")))
    }

    pub async fn list_members(
        &self,
        search: Option<String>,
        page: i64,
        per_page: i64,
    ) -> Result<MemberPage, AppError> {
        let (page, per_page, offset) = page_window(page, per_page);
        let pattern = search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"));

        let total = self.member_repo.count_members(pattern.as_deref()).await?;
        let items = self
            .member_repo
            .list_members(pattern.as_deref(), per_page, offset)
            .await?;

        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Ok(MemberPage {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    // Busca do caixa: telefone exato, erro amigável quando não há cadastro.
    pub async fn lookup_by_phone(&self, phone_number: &str) -> Result<Member, AppError> {
        self.member_repo
            .find_by_phone(phone_number)
            .await?
            .ok_or_else(|| AppError::NotFound("Membro com esse telefone".to_string()))
    }

    pub async fn delete_member(&self, member_id: i32) -> Result<(), AppError> {
        let deleted = self.member_repo.delete_member(member_id).await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!("Membro #{member_id}")));
        }

        tracing::info!("Membro #{} excluído", member_id);
        Ok(())
    }
}
