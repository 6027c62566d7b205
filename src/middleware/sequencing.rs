// src/middleware/sequencing.rs
//
// O front numera cada busca em `x-request-seq`; devolvemos o mesmo número
// na resposta para ele descartar respostas fora de ordem (ver views::ViewState).

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};

pub const REQUEST_SEQ_HEADER: HeaderName = HeaderName::from_static("x-request-seq");

/// Número de sequência da requisição, se veio um válido.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestSeq(pub Option<u64>);

impl RequestSeq {
    pub fn from_header(value: Option<&HeaderValue>) -> Self {
        RequestSeq(
            value
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok()),
        )
    }

    /// Devolve a resposta com o cabeçalho de sequência copiado.
    pub fn echo(self, body: impl IntoResponse) -> Response {
        let mut response = body.into_response();
        if let Some(seq) = self.0 {
            response
                .headers_mut()
                .insert(REQUEST_SEQ_HEADER, HeaderValue::from(seq));
        }
        response
    }
}

impl<S> FromRequestParts<S> for RequestSeq
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(RequestSeq::from_header(parts.headers.get(&REQUEST_SEQ_HEADER)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, Json};

    #[test]
    fn parses_numeric_header() {
        let value = HeaderValue::from_static(" 42 ");
        assert_eq!(RequestSeq::from_header(Some(&value)), RequestSeq(Some(42)));
        assert_eq!(RequestSeq::from_header(None), RequestSeq(None));

        let garbage = HeaderValue::from_static("abc");
        assert_eq!(RequestSeq::from_header(Some(&garbage)), RequestSeq(None));
    }

    #[test]
    fn echo_copies_the_sequence() {
        let response = RequestSeq(Some(7)).echo((StatusCode::OK, Json(1)));
        assert_eq!(response.headers()[&REQUEST_SEQ_HEADER], "7");

        let response = RequestSeq(None).echo(Json(1));
        assert!(response.headers().get(&REQUEST_SEQ_HEADER).is_none());
    }
}
