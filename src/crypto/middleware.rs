use crate::types::{AppError, Result};
use crate::AppState;
use axum::{
    body::{to_bytes, Body},
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::convert::Infallible;

/// Upper bound when buffering bodies in the envelope stages. The router's
/// request-size layer rejects large uploads before this is reached; the
/// bound here exists for responses.
const BODY_BUFFER_LIMIT: usize = 2 * 1024 * 1024;

/// Request extension marking that the inbound body arrived as an encrypted
/// envelope. Handlers echo this into their response so a client that speaks
/// ciphertext receives ciphertext.
#[derive(Debug, Clone, Copy)]
pub struct EncryptedExchange;

/// Extractor telling a handler whether the inbound body was an envelope.
/// Always succeeds; plaintext exchanges yield `EnvelopeFlag(false)`.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeFlag(pub bool);

impl<S> FromRequestParts<S> for EnvelopeFlag
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Infallible> {
        Ok(EnvelopeFlag(
            parts.extensions.get::<EncryptedExchange>().is_some(),
        ))
    }
}

/// Inbound pipeline stage: replaces a flagged request body with its
/// decrypted JSON document before validation or handlers run.
///
/// A body that is not JSON, or is JSON without `encrypted: true`, passes
/// through untouched. A flagged body that fails to decrypt or to parse
/// short-circuits with 400 and never reaches the handler.
pub async fn decrypt_request(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let (mut parts, body) = req.into_parts();

    let bytes = to_bytes(body, BODY_BUFFER_LIMIT)
        .await
        .map_err(|_| AppError::InvalidPayload("Invalid encrypted payload".to_string()))?;

    if let Ok(value) = serde_json::from_slice::<Value>(&bytes) {
        if value.get("encrypted").and_then(Value::as_bool) == Some(true) {
            let data = value
                .get("data")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    AppError::InvalidPayload("Invalid encrypted payload".to_string())
                })?;

            let plaintext = state.cipher.decrypt(data)?;
            let decrypted: Value = serde_json::from_str(&plaintext).map_err(|_| {
                AppError::InvalidPayload("Invalid encrypted payload".to_string())
            })?;

            let new_body = serde_json::to_vec(&decrypted)
                .map_err(|e| AppError::Internal(format!("Body re-serialization failed: {e}")))?;

            parts.extensions.insert(EncryptedExchange);
            parts
                .headers
                .insert(header::CONTENT_LENGTH, new_body.len().into());

            let req = Request::from_parts(parts, Body::from(new_body));
            return Ok(next.run(req).await);
        }
    }

    let req = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(req).await)
}

/// Outbound pipeline stage: when the handler's response envelope carries
/// `encrypted: true` and a `data` field, replaces `data` with its encrypted
/// serialized form. This is the last mutation applied to the body.
pub async fn encrypt_response(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let (mut parts, body) = response.into_parts();

    let bytes = match to_bytes(body, BODY_BUFFER_LIMIT).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return AppError::Internal(format!("Response buffering failed: {e}")).into_response();
        }
    };

    if let Ok(mut value) = serde_json::from_slice::<Value>(&bytes) {
        let flagged = value.get("encrypted").and_then(Value::as_bool) == Some(true)
            && value.get("data").is_some();

        if flagged {
            let data = value["data"].take();

            match state.cipher.encrypt(&data.to_string()) {
                Ok(ciphertext) => {
                    value["data"] = Value::String(ciphertext);

                    let new_body = match serde_json::to_vec(&value) {
                        Ok(body) => body,
                        Err(e) => {
                            return AppError::Internal(format!(
                                "Response re-serialization failed: {e}"
                            ))
                            .into_response();
                        }
                    };

                    parts
                        .headers
                        .insert(header::CONTENT_LENGTH, new_body.len().into());
                    return Response::from_parts(parts, Body::from(new_body));
                }
                Err(err) => return err.into_response(),
            }
        }
    }

    Response::from_parts(parts, Body::from(bytes))
}
