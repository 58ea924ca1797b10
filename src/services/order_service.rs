// src/services/order_service.rs

use chrono::NaiveTime;
use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::{db_utils::page_window, error::AppError},
    db::{CatalogRepository, MemberRepository, OrderRepository},
    models::order::{
        MemberAccrual, NewOrder, Order, OrderDetail, OrderListFilter, OrderPage, OrderStatus,
        PlacementSummary, ReversalSummary, StockAdjustment,
    },
};

#[derive(Clone)]
pub struct OrderService {
    order_repo: OrderRepository,
    catalog_repo: CatalogRepository,
    member_repo: MemberRepository,
}

impl OrderService {
    pub fn new(
        order_repo: OrderRepository,
        catalog_repo: CatalogRepository,
        member_repo: MemberRepository,
    ) -> Self {
        Self {
            order_repo,
            catalog_repo,
            member_repo,
        }
    }

    // --- LANÇAMENTO DE PEDIDO ---
    // Tudo dentro de uma transação: cabeçalho, itens, débito de estoque e
    // acúmulo do membro entram juntos ou não entram.
    // Ordem de travamento compartilhada com a reversão: produtos em id
    // crescente, membro por último.
    pub async fn place_order<'e, E>(
        &self,
        executor: E,
        new_order: NewOrder,
    ) -> Result<PlacementSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Carrinho vazio e aritmética inconsistente caem antes de abrir transação.
        validate_new_order(&new_order)?;

        let mut tx = executor.begin().await?;

        // 1. O membro informado precisa existir. Leitura sem trava: a linha
        // do membro só é travada no acúmulo, depois dos produtos. O FK do
        // cabeçalho impede que o membro suma no meio da transação.
        let member = match new_order.member_id {
            Some(member_id) => {
                let member = self
                    .member_repo
                    .get_member(&mut *tx, member_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Membro #{member_id}")))?;
                Some(member)
            }
            None => None,
        };

        // 2. Cabeçalho do pedido.
        let order = self
            .order_repo
            .insert_order(
                &mut *tx,
                new_order.member_id,
                new_order.original_amount,
                new_order.discount_amount,
                new_order.final_amount,
            )
            .await?;

        // 3. Para cada linha: trava o produto, valida o saldo, debita e grava
        // o item com preço e custo congelados. Produtos em ordem crescente
        // de id, seja qual for a ordem do carrinho.
        let mut lines: Vec<_> = new_order.lines.iter().collect();
        lines.sort_unstable_by_key(|line| line.product_id);

        let mut stock_changes = Vec::with_capacity(lines.len());
        for line in lines {
            let product = self
                .catalog_repo
                .get_product_for_update(&mut *tx, line.product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Produto #{}", line.product_id)))?;

            if product.stock_quantity < line.quantity {
                // O retorno antecipado derruba a transação inteira.
                return Err(AppError::InsufficientStock {
                    product: product.name,
                    requested: line.quantity,
                    available: product.stock_quantity,
                });
            }

            let stock_after = self
                .catalog_repo
                .adjust_stock(&mut *tx, product.id, -line.quantity)
                .await?;

            self.order_repo
                .insert_order_item(
                    &mut *tx,
                    order.id,
                    product.id,
                    line.quantity,
                    line.unit_price,
                    product.cost_price,
                    line.line_subtotal,
                )
                .await?;

            let adjustment = StockAdjustment {
                product_id: product.id,
                product_name: product.name,
                delta: -line.quantity,
                stock_after,
            };
            tracing::debug!(
                "Pedido #{}: produto #{} \"{}\" {:+} (estoque -> {})",
                order.id,
                adjustment.product_id,
                adjustment.product_name,
                adjustment.delta,
                adjustment.stock_after
            );
            stock_changes.push(adjustment);
        }

        // 4. Acúmulo de consumo do membro. O UPDATE trava a linha só agora,
        // depois de todos os produtos.
        let member_accrual = match &member {
            Some(member) => {
                let total_spent_after = self
                    .member_repo
                    .adjust_total_spent(&mut *tx, member.id, new_order.final_amount)
                    .await?;
                let accrual = MemberAccrual {
                    member_id: member.id,
                    amount: new_order.final_amount,
                    total_spent_after,
                };
                tracing::debug!(
                    "Pedido #{}: membro #{} acumulou {} (total {})",
                    order.id,
                    accrual.member_id,
                    accrual.amount,
                    accrual.total_spent_after
                );
                Some(accrual)
            }
            None => None,
        };

        tx.commit().await?;

        tracing::info!(
            "Pedido #{} registrado: {} item(ns), total {}",
            order.id,
            stock_changes.len(),
            order.final_amount
        );

        Ok(PlacementSummary {
            order,
            stock_changes,
            member_accrual,
        })
    }

    // --- REVERSÃO DE PEDIDO ---
    // Imagem espelhada do lançamento: devolve estoque, estorna o acúmulo do
    // membro e apaga o pedido (os itens caem no CASCADE). Mesma ordem de
    // travamento do lançamento: produtos em id crescente, membro por último.
    pub async fn reverse_order<'e, E>(
        &self,
        executor: E,
        order_id: i32,
    ) -> Result<ReversalSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. O pedido precisa existir e ainda estar ativo. O FOR UPDATE
        // serializa duas reversões simultâneas do mesmo pedido.
        let order = self
            .order_repo
            .get_order_for_update(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pedido #{order_id}")))?;
        ensure_reversible(&order)?;

        // 2. Devolve cada item ao estoque, em ordem crescente de produto.
        let mut items = self.order_repo.list_order_items(&mut *tx, order_id).await?;
        items.sort_unstable_by_key(|item| item.product_id);

        let mut stock_changes = Vec::with_capacity(items.len());
        for item in &items {
            let product = self
                .catalog_repo
                .get_product_for_update(&mut *tx, item.product_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Produto #{}", item.product_id)))?;

            let stock_after = self
                .catalog_repo
                .adjust_stock(&mut *tx, item.product_id, item.quantity)
                .await?;

            let adjustment = StockAdjustment {
                product_id: product.id,
                product_name: product.name,
                delta: item.quantity,
                stock_after,
            };
            tracing::debug!(
                "Pedido #{}: produto #{} \"{}\" {:+} devolvido (estoque -> {})",
                order_id,
                adjustment.product_id,
                adjustment.product_name,
                adjustment.delta,
                adjustment.stock_after
            );
            stock_changes.push(adjustment);
        }

        // 3. Estorna o acúmulo do membro, se a referência ainda resolver.
        // O UPDATE trava a linha do membro por último, como no lançamento.
        let member_refund = match order.member_id {
            Some(member_id) => {
                match self.member_repo.get_member(&mut *tx, member_id).await? {
                    Some(member) => {
                        let total_spent_after = self
                            .member_repo
                            .adjust_total_spent(&mut *tx, member.id, -order.final_amount)
                            .await?;
                        let refund = MemberAccrual {
                            member_id: member.id,
                            amount: -order.final_amount,
                            total_spent_after,
                        };
                        tracing::debug!(
                            "Pedido #{}: membro #{} estornado em {} (total {})",
                            order_id,
                            refund.member_id,
                            refund.amount,
                            refund.total_spent_after
                        );
                        Some(refund)
                    }
                    None => {
                        // Referência solta (dado legado): segue sem estorno.
                        tracing::warn!(
                            "Pedido #{}: membro #{} não existe mais, estorno de consumo ignorado",
                            order_id,
                            member_id
                        );
                        None
                    }
                }
            }
            None => None,
        };

        // 4. Apaga o pedido por último; os itens vão junto via CASCADE.
        self.order_repo.delete_order(&mut *tx, order_id).await?;

        tx.commit().await?;

        tracing::info!(
            "Pedido #{} revertido: {} item(ns) devolvidos ao estoque",
            order_id,
            stock_changes.len()
        );

        Ok(ReversalSummary {
            order_id,
            stock_changes,
            member_refund,
        })
    }

    // --- CONSULTAS ---

    pub async fn list_orders(
        &self,
        filter: OrderListFilter,
        page: i64,
        per_page: i64,
    ) -> Result<OrderPage, AppError> {
        let (page, per_page, offset) = page_window(page, per_page);

        let phone_like = filter.member_phone.as_deref().map(|p| format!("%{p}%"));
        let starts_at = filter
            .start_date
            .map(|d| d.and_time(NaiveTime::MIN).and_utc());
        // Limite superior exclusivo: o dia final entra inteiro no filtro.
        // No fim do calendário não existe dia seguinte; é erro de validação.
        let ends_before = match filter.end_date {
            Some(d) => {
                let next_day = d.succ_opt().ok_or(AppError::DateOutOfRange(d))?;
                Some(next_day.and_time(NaiveTime::MIN).and_utc())
            }
            None => None,
        };

        let total = self
            .order_repo
            .count_orders(filter.order_id, phone_like.as_deref(), starts_at, ends_before)
            .await?;
        let items = self
            .order_repo
            .list_orders(
                filter.order_id,
                phone_like.as_deref(),
                starts_at,
                ends_before,
                per_page,
                offset,
            )
            .await?;

        let total_pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Ok(OrderPage {
            items,
            total,
            page,
            per_page,
            total_pages,
        })
    }

    pub async fn get_order_detail<'e, E>(
        &self,
        executor: E,
        order_id: i32,
    ) -> Result<OrderDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // Transação só de leitura: cabeçalho, itens e membro do mesmo snapshot.
        let mut tx = executor.begin().await?;

        let order = self
            .order_repo
            .get_order(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pedido #{order_id}")))?;

        let items = self.order_repo.list_order_items(&mut *tx, order_id).await?;

        let member_name = match order.member_id {
            Some(member_id) => self
                .member_repo
                .get_member(&mut *tx, member_id)
                .await?
                .map(|m| m.name),
            None => None,
        };

        tx.commit().await?;

        let total_cost: Decimal = items
            .iter()
            .map(|item| item.cost_at_sale * Decimal::from(item.quantity))
            .sum();
        let gross_profit = order.final_amount - total_cost;

        Ok(OrderDetail {
            header: order,
            member_name,
            items,
            gross_profit,
        })
    }
}

// Valida a aritmética do carrinho antes de tocar no banco. O payload chega
// com os totais calculados pela tela do caixa; aqui a gente confere tudo.
fn validate_new_order(new_order: &NewOrder) -> Result<(), AppError> {
    if new_order.lines.is_empty() {
        return Err(AppError::EmptyOrder);
    }

    let mut items_total = Decimal::ZERO;
    for (idx, line) in new_order.lines.iter().enumerate() {
        if line.quantity <= 0 {
            return Err(AppError::AmountMismatch(format!(
                "item {}: quantidade deve ser positiva",
                idx + 1
            )));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(AppError::AmountMismatch(format!(
                "item {}: preço negativo",
                idx + 1
            )));
        }

        // Multiplicação e soma conferidas: valores absurdos no payload
        // viram erro de validação, não estouro de aritmética.
        let expected = line
            .unit_price
            .checked_mul(Decimal::from(line.quantity))
            .ok_or_else(|| {
                AppError::AmountMismatch(format!(
                    "item {}: {} x {} excede o valor representável",
                    idx + 1,
                    line.unit_price,
                    line.quantity
                ))
            })?;
        if expected != line.line_subtotal {
            return Err(AppError::AmountMismatch(format!(
                "item {}: subtotal {} difere de {} x {}",
                idx + 1,
                line.line_subtotal,
                line.unit_price,
                line.quantity
            )));
        }
        items_total = items_total.checked_add(line.line_subtotal).ok_or_else(|| {
            AppError::AmountMismatch("soma dos itens excede o valor representável".to_string())
        })?;
    }

    if items_total != new_order.original_amount {
        return Err(AppError::AmountMismatch(format!(
            "soma dos itens {} difere do valor original {}",
            items_total, new_order.original_amount
        )));
    }

    if new_order.discount_amount < Decimal::ZERO {
        return Err(AppError::AmountMismatch("desconto negativo".to_string()));
    }

    if new_order.original_amount - new_order.discount_amount != new_order.final_amount {
        return Err(AppError::AmountMismatch(format!(
            "valor final {} difere de {} - {}",
            new_order.final_amount, new_order.original_amount, new_order.discount_amount
        )));
    }

    Ok(())
}

// Só pedidos ativos podem ser revertidos.
fn ensure_reversible(order: &Order) -> Result<(), AppError> {
    if order.status != OrderStatus::Completed {
        return Err(AppError::InvalidOrderState(order.id));
    }
    Ok(())
}
