//! Testes de fluxo contra um Postgres real.
//!
//! Todos ficam atrás de `#[ignore]` porque dependem de um banco acessível
//! via `DATABASE_URL`. Para rodar:
//!
//! ```text
//! DATABASE_URL=postgres://... cargo test -- --ignored --test-threads=1
//! ```
//!
//! Uma thread só: os testes de relatório comparam totais antes e depois
//! de uma venda, e escritas concorrentes bagunçariam a conta.
//!
//! Cada teste cria suas próprias categorias, produtos e membros com nomes
//! únicos, então a suíte pode rodar várias vezes no mesmo banco sem limpeza.

use std::sync::atomic::{AtomicU32, Ordering};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::common::error::AppError;
use crate::config::AppState;
use crate::db::{CatalogRepository, MemberRepository, OrderRepository};
use crate::models::catalog::Product;
use crate::models::member::Member;
use crate::models::order::{NewOrder, NewOrderLine, OrderListFilter};

static SEQ: AtomicU32 = AtomicU32::new(0);

async fn test_state() -> AppState {
    let app_state = AppState::new()
        .await
        .expect("DATABASE_URL deve apontar para um Postgres de teste");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("falha ao aplicar as migrações no banco de teste");

    app_state
}

// Sufixo único por processo e por chamada, para que a suíte possa rodar
// repetidas vezes no mesmo banco sem esbarrar nas constraints UNIQUE.
fn unique_name(base: &str) -> String {
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{} t{}-{}", base, std::process::id(), seq)
}

fn unique_phone() -> String {
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("relógio antes de 1970")
        .subsec_nanos();
    format!("9{:06}{:04}{:04}", std::process::id() % 1_000_000, seq % 10_000, nanos % 10_000)
}

async fn seed_product(
    state: &AppState,
    base_name: &str,
    retail_price: Decimal,
    cost_price: Decimal,
    stock_quantity: i32,
) -> Product {
    let category = state
        .catalog_service
        .create_category(&unique_name("Hortifruti"))
        .await
        .expect("categoria de teste");

    state
        .catalog_service
        .create_product(
            &state.db_pool,
            &unique_name(base_name),
            category.id,
            retail_price,
            cost_price,
            "kg",
            stock_quantity,
        )
        .await
        .expect("produto de teste")
}

async fn seed_member(state: &AppState, discount_rate: Decimal) -> Member {
    state
        .member_service
        .create_member(&unique_name("Dona Marta"), &unique_phone(), discount_rate)
        .await
        .expect("membro de teste")
}

fn cart_line(product: &Product, quantity: i32) -> NewOrderLine {
    NewOrderLine {
        product_id: product.id,
        quantity,
        unit_price: product.retail_price,
        line_subtotal: product.retail_price * Decimal::from(quantity),
    }
}

fn cart(member_id: Option<i32>, discount_amount: Decimal, lines: Vec<NewOrderLine>) -> NewOrder {
    let original_amount: Decimal = lines.iter().map(|line| line.line_subtotal).sum();
    NewOrder {
        member_id,
        original_amount,
        discount_amount,
        final_amount: original_amount - discount_amount,
        lines,
    }
}

async fn stock_of(state: &AppState, product_id: i32) -> i32 {
    CatalogRepository::new(state.db_pool.clone())
        .get_product(product_id)
        .await
        .expect("consulta de produto")
        .expect("produto deveria existir")
        .stock_quantity
}

async fn total_spent_of(state: &AppState, member_id: i32) -> Decimal {
    MemberRepository::new(state.db_pool.clone())
        .get_member(&state.db_pool, member_id)
        .await
        .expect("consulta de membro")
        .expect("membro deveria existir")
        .total_spent
}

// --- Lançamento de pedido ---

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn lancamento_debita_estoque_e_acumula_consumo() {
    let state = test_state().await;
    let manga = seed_product(&state, "Manga Palmer", dec!(8.50), dec!(5.20), 40).await;
    let alface = seed_product(&state, "Alface Crespa", dec!(3.00), dec!(1.10), 15).await;
    let member = seed_member(&state, dec!(0.95)).await;

    let new_order = cart(
        Some(member.id),
        dec!(1.45),
        vec![cart_line(&manga, 3), cart_line(&alface, 2)],
    );
    let final_amount = new_order.final_amount;

    let summary = state
        .order_service
        .place_order(&state.db_pool, new_order)
        .await
        .expect("pedido com estoque de sobra deveria passar");

    assert_eq!(summary.order.final_amount, final_amount);
    assert_eq!(summary.stock_changes.len(), 2);

    let manga_change = summary
        .stock_changes
        .iter()
        .find(|change| change.product_id == manga.id)
        .expect("ajuste de estoque da manga");
    assert_eq!(manga_change.product_name, manga.name);
    assert_eq!(manga_change.delta, -3);
    assert_eq!(manga_change.stock_after, 37);

    let alface_change = summary
        .stock_changes
        .iter()
        .find(|change| change.product_id == alface.id)
        .expect("ajuste de estoque da alface");
    assert_eq!(alface_change.product_name, alface.name);
    assert_eq!(alface_change.delta, -2);
    assert_eq!(alface_change.stock_after, 13);

    let accrual = summary.member_accrual.expect("pedido de membro acumula consumo");
    assert_eq!(accrual.member_id, member.id);
    assert_eq!(accrual.amount, final_amount);

    assert_eq!(stock_of(&state, manga.id).await, 37);
    assert_eq!(stock_of(&state, alface.id).await, 13);
    assert_eq!(total_spent_of(&state, member.id).await, final_amount);
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn venda_avulsa_sem_membro_nao_acumula_nada() {
    let state = test_state().await;
    let banana = seed_product(&state, "Banana Prata", dec!(6.00), dec!(3.40), 20).await;

    let summary = state
        .order_service
        .place_order(&state.db_pool, cart(None, dec!(0), vec![cart_line(&banana, 4)]))
        .await
        .expect("venda avulsa deveria passar");

    assert!(summary.order.member_id.is_none());
    assert!(summary.member_accrual.is_none());
    assert_eq!(stock_of(&state, banana.id).await, 16);
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn estoque_insuficiente_desfaz_o_pedido_inteiro() {
    let state = test_state().await;
    let tomate = seed_product(&state, "Tomate Italiano", dec!(7.90), dec!(4.00), 50).await;
    let uva = seed_product(&state, "Uva Niágara", dec!(12.00), dec!(7.50), 2).await;
    let member = seed_member(&state, dec!(0.90)).await;

    // A primeira linha passaria sozinha; a segunda pede mais do que há.
    let new_order = cart(
        Some(member.id),
        dec!(0),
        vec![cart_line(&tomate, 10), cart_line(&uva, 5)],
    );

    let err = state
        .order_service
        .place_order(&state.db_pool, new_order)
        .await
        .expect_err("pedido sem estoque deveria falhar");

    match err {
        AppError::InsufficientStock { requested, available, .. } => {
            assert_eq!(requested, 5);
            assert_eq!(available, 2);
        }
        other => panic!("esperava InsufficientStock, veio {other:?}"),
    }

    // Nada pode ter sobrado da transação: nem o débito da primeira linha,
    // nem o consumo do membro, nem o pedido em si.
    assert_eq!(stock_of(&state, tomate.id).await, 50);
    assert_eq!(stock_of(&state, uva.id).await, 2);
    assert_eq!(total_spent_of(&state, member.id).await, dec!(0));

    let page = state
        .order_service
        .list_orders(
            OrderListFilter { member_phone: Some(member.phone_number.clone()), ..Default::default() },
            1,
            10,
        )
        .await
        .expect("listagem de pedidos");
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn valores_inconsistentes_nao_gravam_nada() {
    let state = test_state().await;
    let laranja = seed_product(&state, "Laranja Pera", dec!(4.50), dec!(2.20), 30).await;

    let mut new_order = cart(None, dec!(0), vec![cart_line(&laranja, 2)]);
    // O caixa alega um total que não fecha com as linhas.
    new_order.final_amount = dec!(1.00);

    let err = state
        .order_service
        .place_order(&state.db_pool, new_order)
        .await
        .expect_err("valores que não fecham deveriam falhar");

    assert!(matches!(err, AppError::AmountMismatch(_)));
    assert_eq!(stock_of(&state, laranja.id).await, 30);
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn membro_inexistente_rejeita_o_pedido() {
    let state = test_state().await;
    let couve = seed_product(&state, "Couve Manteiga", dec!(2.50), dec!(0.90), 12).await;

    let err = state
        .order_service
        .place_order(&state.db_pool, cart(Some(2_000_000_000), dec!(0), vec![cart_line(&couve, 1)]))
        .await
        .expect_err("membro fantasma deveria falhar");

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(stock_of(&state, couve.id).await, 12);
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn carrinho_fora_de_ordem_debita_na_ordem_dos_produtos() {
    let state = test_state().await;
    // Criados em sequência: o id da pêra vem antes do id do figo.
    let pera = seed_product(&state, "Pêra Williams", dec!(11.00), dec!(7.00), 30).await;
    let figo = seed_product(&state, "Figo Roxo", dec!(15.00), dec!(9.50), 30).await;
    assert!(pera.id < figo.id);

    // O carrinho chega na ordem inversa; o débito sai em id crescente,
    // a mesma ordem que a reversão usa ao devolver.
    let summary = state
        .order_service
        .place_order(
            &state.db_pool,
            cart(None, dec!(0), vec![cart_line(&figo, 2), cart_line(&pera, 1)]),
        )
        .await
        .expect("lançamento");

    let debit_ids: Vec<i32> = summary
        .stock_changes
        .iter()
        .map(|change| change.product_id)
        .collect();
    assert_eq!(debit_ids, vec![pera.id, figo.id]);

    let reversal = state
        .order_service
        .reverse_order(&state.db_pool, summary.order.id)
        .await
        .expect("reversão");
    let restock_ids: Vec<i32> = reversal
        .stock_changes
        .iter()
        .map(|change| change.product_id)
        .collect();
    assert_eq!(restock_ids, vec![pera.id, figo.id]);

    assert_eq!(stock_of(&state, pera.id).await, 30);
    assert_eq!(stock_of(&state, figo.id).await, 30);
}

// --- Reversão de pedido ---

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn reversao_e_o_inverso_exato_do_lancamento() {
    let state = test_state().await;
    let abacaxi = seed_product(&state, "Abacaxi Pérola", dec!(9.90), dec!(6.00), 25).await;
    let member = seed_member(&state, dec!(0.95)).await;

    let summary = state
        .order_service
        .place_order(&state.db_pool, cart(Some(member.id), dec!(0.99), vec![cart_line(&abacaxi, 6)]))
        .await
        .expect("lançamento");
    let order_id = summary.order.id;
    assert_eq!(stock_of(&state, abacaxi.id).await, 19);

    let reversal = state
        .order_service
        .reverse_order(&state.db_pool, order_id)
        .await
        .expect("reversão de pedido concluído");

    assert_eq!(reversal.order_id, order_id);
    assert_eq!(reversal.stock_changes.len(), 1);
    assert_eq!(reversal.stock_changes[0].product_id, abacaxi.id);
    assert_eq!(reversal.stock_changes[0].product_name, abacaxi.name);
    assert_eq!(reversal.stock_changes[0].delta, 6);
    assert_eq!(reversal.stock_changes[0].stock_after, 25);

    let refund = reversal.member_refund.expect("estorno do consumo do membro");
    assert_eq!(refund.total_spent_after, dec!(0));

    // Tudo de volta ao estado anterior ao lançamento.
    assert_eq!(stock_of(&state, abacaxi.id).await, 25);
    assert_eq!(total_spent_of(&state, member.id).await, dec!(0));

    let err = state
        .order_service
        .get_order_detail(&state.db_pool, order_id)
        .await
        .expect_err("pedido revertido não deveria mais existir");
    assert!(matches!(err, AppError::NotFound(_)));

    let leftover_items = OrderRepository::new(state.db_pool.clone())
        .list_order_items(&state.db_pool, order_id)
        .await
        .expect("consulta de itens");
    assert!(leftover_items.is_empty());
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn segunda_reversao_do_mesmo_pedido_falha() {
    let state = test_state().await;
    let cheiro_verde = seed_product(&state, "Cheiro Verde", dec!(2.00), dec!(0.70), 10).await;

    let summary = state
        .order_service
        .place_order(&state.db_pool, cart(None, dec!(0), vec![cart_line(&cheiro_verde, 2)]))
        .await
        .expect("lançamento");

    state
        .order_service
        .reverse_order(&state.db_pool, summary.order.id)
        .await
        .expect("primeira reversão");

    let err = state
        .order_service
        .reverse_order(&state.db_pool, summary.order.id)
        .await
        .expect_err("segunda reversão deveria falhar");

    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(stock_of(&state, cheiro_verde.id).await, 10);
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn reversao_de_pedido_cancelado_nao_toca_o_estoque() {
    let state = test_state().await;
    let mamao = seed_product(&state, "Mamão Formosa", dec!(7.00), dec!(4.10), 18).await;

    let summary = state
        .order_service
        .place_order(&state.db_pool, cart(None, dec!(0), vec![cart_line(&mamao, 3)]))
        .await
        .expect("lançamento");

    sqlx::query("UPDATE orders SET status = 'CANCELLED' WHERE id = $1")
        .bind(summary.order.id)
        .execute(&state.db_pool)
        .await
        .expect("marcação manual de cancelado");

    let err = state
        .order_service
        .reverse_order(&state.db_pool, summary.order.id)
        .await
        .expect_err("pedido cancelado não pode ser revertido");

    assert!(matches!(err, AppError::InvalidOrderState(_)));
    // O estoque continua debitado: a reversão não chegou a tocar nele.
    assert_eq!(stock_of(&state, mamao.id).await, 15);
}

// --- Consultas ---

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn detalhe_do_pedido_traz_itens_e_lucro_bruto() {
    let state = test_state().await;
    let morango = seed_product(&state, "Morango", dec!(8.50), dec!(5.20), 30).await;
    let member = seed_member(&state, dec!(0.95)).await;

    let summary = state
        .order_service
        .place_order(&state.db_pool, cart(Some(member.id), dec!(1.50), vec![cart_line(&morango, 3)]))
        .await
        .expect("lançamento");

    let detail = state
        .order_service
        .get_order_detail(&state.db_pool, summary.order.id)
        .await
        .expect("detalhe do pedido");

    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].quantity, 3);
    assert_eq!(detail.items[0].price_at_sale, dec!(8.50));
    assert_eq!(detail.items[0].cost_at_sale, dec!(5.20));
    assert_eq!(detail.member_name.as_deref(), Some(member.name.as_str()));
    // 3 x 8,50 - 1,50 de desconto = 24,00; custo 3 x 5,20 = 15,60.
    assert_eq!(detail.header.final_amount, dec!(24.00));
    assert_eq!(detail.gross_profit, dec!(8.40));
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn listagem_de_pedidos_filtra_por_id() {
    let state = test_state().await;
    let pepino = seed_product(&state, "Pepino Japonês", dec!(3.80), dec!(1.60), 22).await;

    let summary = state
        .order_service
        .place_order(&state.db_pool, cart(None, dec!(0), vec![cart_line(&pepino, 2)]))
        .await
        .expect("lançamento");

    let page = state
        .order_service
        .list_orders(
            OrderListFilter { order_id: Some(summary.order.id), ..Default::default() },
            1,
            10,
        )
        .await
        .expect("listagem filtrada");

    assert_eq!(page.total, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, summary.order.id);
}

// --- Catálogo e membros ---

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn nome_de_produto_duplicado_e_rejeitado() {
    let state = test_state().await;
    let repolho = seed_product(&state, "Repolho Roxo", dec!(5.00), dec!(2.30), 9).await;

    let err = state
        .catalog_service
        .create_product(
            &state.db_pool,
            &repolho.name,
            repolho.category_id,
            dec!(5.00),
            dec!(2.30),
            "un",
            4,
        )
        .await
        .expect_err("nome repetido deveria falhar");

    assert!(matches!(err, AppError::ProductNameAlreadyExists(_)));
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn categoria_so_sai_depois_dos_produtos() {
    let state = test_state().await;
    let chuchu = seed_product(&state, "Chuchu", dec!(2.90), dec!(1.00), 7).await;

    let err = state
        .catalog_service
        .delete_category(&state.db_pool, chuchu.category_id)
        .await
        .expect_err("categoria com produto não pode sair");
    assert!(matches!(err, AppError::CategoryInUse { .. }));

    // Sem vendas, o produto pode ser excluído; depois a categoria libera.
    state
        .catalog_service
        .delete_product(chuchu.id)
        .await
        .expect("exclusão de produto sem vendas");
    state
        .catalog_service
        .delete_category(&state.db_pool, chuchu.category_id)
        .await
        .expect("exclusão de categoria vazia");
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn produto_vendido_nao_pode_ser_excluido() {
    let state = test_state().await;
    let beterraba = seed_product(&state, "Beterraba", dec!(4.20), dec!(1.80), 14).await;

    state
        .order_service
        .place_order(&state.db_pool, cart(None, dec!(0), vec![cart_line(&beterraba, 1)]))
        .await
        .expect("lançamento");

    let err = state
        .catalog_service
        .delete_product(beterraba.id)
        .await
        .expect_err("produto com histórico de venda não pode sair");

    assert!(matches!(err, AppError::ProductHasSales));
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn busca_de_membro_por_telefone() {
    let state = test_state().await;
    let member = seed_member(&state, dec!(0.90)).await;

    let lookup = state
        .member_service
        .lookup_by_phone(&member.phone_number)
        .await
        .expect("telefone cadastrado");
    assert_eq!(lookup.id, member.id);
    assert_eq!(lookup.discount_rate, dec!(0.90));

    let err = state
        .member_service
        .lookup_by_phone("00000000000")
        .await
        .expect_err("telefone desconhecido");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn listagem_de_produtos_pagina_o_resultado() {
    let state = test_state().await;
    let prefix = unique_name("Pimentão");

    let category = state
        .catalog_service
        .create_category(&unique_name("Legumes"))
        .await
        .expect("categoria de teste");
    for color in ["Verde", "Vermelho", "Amarelo"] {
        state
            .catalog_service
            .create_product(
                &state.db_pool,
                &format!("{prefix} {color}"),
                category.id,
                dec!(6.50),
                dec!(3.00),
                "un",
                5,
            )
            .await
            .expect("produto de teste");
    }

    let page = state
        .catalog_service
        .list_products(Some(prefix.clone()), 1, 2)
        .await
        .expect("listagem paginada");

    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_pages, 2);

    let page2 = state
        .catalog_service
        .list_products(Some(prefix.clone()), 2, 2)
        .await
        .expect("segunda página");
    assert_eq!(page2.items.len(), 1);
}

// --- Relatórios ---

#[tokio::test]
#[ignore = "requer Postgres acessível via DATABASE_URL"]
async fn relatorios_enxergam_a_venda_do_dia() {
    let state = test_state().await;
    let caqui = seed_product(&state, "Caqui Fuyu", dec!(10.00), dec!(4.00), 600).await;

    let before = state.report_service.summary().await.expect("resumo antes");

    let summary = state
        .order_service
        .place_order(&state.db_pool, cart(None, dec!(0), vec![cart_line(&caqui, 500)]))
        .await
        .expect("lançamento");

    let after = state.report_service.summary().await.expect("resumo depois");
    assert_eq!(after.completed_orders, before.completed_orders + 1);
    assert_eq!(after.total_sales, before.total_sales + summary.order.final_amount);
    assert_eq!(after.today_sales, before.today_sales + summary.order.final_amount);

    let trend = state.report_service.sales_trend().await.expect("série de vendas");
    assert_eq!(trend.dates.len(), 31);
    assert_eq!(trend.dates.len(), trend.amounts.len());
    let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(trend.dates.last(), Some(&today));

    // 500 unidades num produto recém-criado deveriam aparecer no ranking.
    let ranking = state.report_service.product_ranking().await.expect("ranking");
    assert!(ranking.quantity_rank.iter().any(|entry| entry.name == caqui.name));
    assert!(ranking.profit_rank.iter().any(|entry| entry.name == caqui.name));
}
