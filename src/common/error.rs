// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

// O erro da aplicação. Serviços e repositórios só conhecem este tipo;
// a tradução para HTTP acontece em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Meta duplicada para (entidade, ano, mês)
    #[error("Já existe uma meta para {0} neste período")]
    DuplicateQuota(String),

    #[error("Registro não encontrado")]
    NotFound,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Resposta de erro já traduzida, pronta para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateQuota(_) | AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::NotFound | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let status = self.status();
        let pt = locale.is_portuguese();

        let (error, details) = match &self {
            AppError::ValidationError(errors) => {
                let mut fields: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
                let message = if pt {
                    "Um ou mais campos são inválidos."
                } else {
                    "One or more fields are invalid."
                };
                (message.to_string(), Some(json!(fields)))
            }
            AppError::DuplicateQuota(entity) => {
                let message = if pt {
                    format!("Já existe uma meta para {} neste mês.", entity)
                } else {
                    format!("A quota for {} already exists for this month.", entity)
                };
                (message, None)
            }
            AppError::NotFound => (pick(pt, "Registro não encontrado.", "Record not found."), None),
            AppError::EmailAlreadyExists => (
                pick(pt, "Este e-mail já está em uso.", "This e-mail is already in use."),
                None,
            ),
            AppError::InvalidCredentials => (
                pick(pt, "E-mail ou senha inválidos.", "Invalid e-mail or password."),
                None,
            ),
            AppError::InvalidToken => (
                pick(
                    pt,
                    "Token de autenticação inválido ou ausente.",
                    "Missing or invalid authentication token.",
                ),
                None,
            ),
            AppError::UserNotFound => (pick(pt, "Usuário não encontrado.", "User not found."), None),
            e => {
                // Detalhes internos vão para o log, nunca para o cliente.
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (
                    pick(pt, "Ocorreu um erro inesperado.", "An unexpected error occurred."),
                    None,
                )
            }
        };

        ApiError { status, error, details }
    }
}

fn pick(pt: bool, portuguese: &str, english: &str) -> String {
    let message = if pt { portuguese } else { english };
    message.to_string()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Usado pelos middlewares, que não têm acesso ao idioma da requisição.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn english() -> Locale {
        Locale("en".to_string())
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("range");
        err.message = Some("O valor não pode ser negativo.".into());
        errors.add("actualAmount", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale::default());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "Um ou mais campos são inválidos.");
        let details = api.details.expect("details");
        assert_eq!(details["actualAmount"][0], "O valor não pode ser negativo.");
    }

    #[test]
    fn duplicate_quota_is_a_conflict() {
        let api = AppError::DuplicateQuota("João".into()).to_api_error(&english());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.error.contains("João"));
    }

    #[test]
    fn database_errors_hide_internals() {
        let api = AppError::DatabaseError(sqlx::Error::PoolTimedOut).to_api_error(&english());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "An unexpected error occurred.");
        assert!(api.details.is_none());
    }

    #[test]
    fn auth_errors_are_unauthorized() {
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
    }
}
