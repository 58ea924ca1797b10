// src/models/api.rs

use serde::Serialize;
use utoipa::ToSchema;

// Envelope padrão das operações que não devolvem um recurso.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiMessage {
    pub success: bool,
    #[schema(example = "Operação concluída com sucesso.")]
    pub message: String,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
