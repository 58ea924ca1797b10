use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Cada regra de negócio violada tem a sua variante; o handler nunca
// monta status HTTP na mão.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Pedido vazio")]
    EmptyOrder,

    #[error("Estoque insuficiente para \"{product}\"")]
    InsufficientStock {
        product: String,
        requested: i32,
        available: i32,
    },

    #[error("Valores do pedido inconsistentes: {0}")]
    AmountMismatch(String),

    #[error("Data {0} fora do intervalo suportado")]
    DateOutOfRange(chrono::NaiveDate),

    #[error("{0} não existe")]
    NotFound(String),

    #[error("Estado do pedido #{0} não permite a operação")]
    InvalidOrderState(i32),

    #[error("Categoria \"{0}\" já existe")]
    CategoryNameAlreadyExists(String),

    #[error("Produto \"{0}\" já existe")]
    ProductNameAlreadyExists(String),

    #[error("Telefone \"{0}\" já cadastrado")]
    MemberPhoneAlreadyExists(String),

    #[error("Categoria ainda possui {products} produto(s)")]
    CategoryInUse { products: i64 },

    #[error("Produto possui vendas registradas")]
    ProductHasSales,

    #[error("Membro possui pedidos registrados")]
    MemberHasOrders,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Validação devolve todos os detalhes, campo por campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "success": false,
                    "message": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::EmptyOrder => (
                StatusCode::BAD_REQUEST,
                "O pedido não pode ser vazio.".to_string(),
            ),
            AppError::InsufficientStock {
                product,
                requested,
                available,
            } => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Estoque insuficiente para \"{product}\" (pedido: {requested}, disponível: {available})."
                ),
            ),
            AppError::AmountMismatch(msg) => (
                StatusCode::BAD_REQUEST,
                format!("Valores do pedido inconsistentes: {msg}"),
            ),
            AppError::DateOutOfRange(date) => (
                StatusCode::BAD_REQUEST,
                format!("A data {date} está fora do intervalo suportado."),
            ),
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} não existe.")),
            AppError::InvalidOrderState(id) => (
                StatusCode::CONFLICT,
                format!("O pedido #{id} não está mais ativo e não pode ser revertido."),
            ),
            AppError::CategoryNameAlreadyExists(name) => (
                StatusCode::CONFLICT,
                format!("Já existe uma categoria chamada \"{name}\"."),
            ),
            AppError::ProductNameAlreadyExists(name) => (
                StatusCode::CONFLICT,
                format!("Já existe um produto chamado \"{name}\"."),
            ),
            AppError::MemberPhoneAlreadyExists(phone) => (
                StatusCode::CONFLICT,
                format!("O telefone \"{phone}\" já está cadastrado."),
            ),
            AppError::CategoryInUse { products } => (
                StatusCode::CONFLICT,
                format!("A categoria ainda possui {products} produto(s) e não pode ser excluída."),
            ),
            AppError::ProductHasSales => (
                StatusCode::CONFLICT,
                "O produto possui vendas registradas e não pode ser excluído.".to_string(),
            ),
            AppError::MemberHasOrders => (
                StatusCode::CONFLICT,
                "O membro possui pedidos registrados e não pode ser excluído.".to_string(),
            ),
            // A transação inteira foi desfeita; devolvemos a causa ao
            // operador do caixa e logamos o detalhe completo.
            AppError::DatabaseError(e) => {
                tracing::error!("Erro de banco de dados: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Falha no processamento da transação: {e}."),
                )
            }
            AppError::InternalServerError(e) => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros que só têm uma mensagem.
        let body = Json(json!({ "success": false, "message": error_message }));
        (status, body).into_response()
    }
}
