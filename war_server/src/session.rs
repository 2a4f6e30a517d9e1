use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use rand::Rng;
use std::convert::Infallible;
use tracing::info;
use war_core::SessionId;

use crate::error::AppError;
use crate::state::SharedState;

pub const COOKIE_NAME: &str = "session-id";

const SESSION_ID_BYTES: usize = 16;

pub fn generate_session_id() -> SessionId {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::rng().fill(&mut bytes);
    SessionId(hex::encode(bytes))
}

/// 把浏览器绑定到 `id` 的 `Set-Cookie` 值
pub fn session_cookie(id: &SessionId) -> String {
    format!("{COOKIE_NAME}={id}; Path=/; HttpOnly; Secure; SameSite=Strict")
}

/// 从请求的所有 `Cookie` 头中读取会话 cookie
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == COOKIE_NAME && !value.is_empty())
        .map(|(_, value)| SessionId(value.to_string()))
}

/// 请求携带的会话有效则直接返回，否则新开一个会话。
/// 第二个字段是新会话需要下发的 cookie。
pub async fn ensure_session(
    state: &SharedState,
    current: Option<SessionId>,
) -> Result<(SessionId, Option<String>), AppError> {
    if let Some(id) = current {
        let lookup = id.clone();
        if state.with_store(move |store| store.session_exists(&lookup)).await? {
            return Ok((id, None));
        }
    }

    let id = generate_session_id();
    let created = id.clone();
    state.with_store(move |store| store.create_session(&created)).await?;
    info!(session_id = %id, "opened session");
    let cookie = session_cookie(&id);
    Ok((id, Some(cookie)))
}

/// 请求携带的会话 cookie，不检查存储中是否存在
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<SessionId>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeSession(session_from_headers(&parts.headers)))
    }
}

/// 存储中存在的会话，否则以 400 拒绝
#[derive(Debug, Clone)]
pub struct RequireSession(pub SessionId);

impl FromRequestParts<SharedState> for RequireSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &SharedState) -> Result<Self, Self::Rejection> {
        let id = session_from_headers(&parts.headers).ok_or(AppError::InvalidSession)?;
        let lookup = id.clone();
        if state.with_store(move |store| store.session_exists(&lookup)).await? {
            Ok(RequireSession(id))
        } else {
            Err(AppError::InvalidSession)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_generated_ids_are_hex() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie(&SessionId("abc".into()));
        assert_eq!(cookie, "session-id=abc; Path=/; HttpOnly; Secure; SameSite=Strict");
    }

    #[test]
    fn test_session_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_from_headers(&headers), None);

        headers.append(COOKIE, HeaderValue::from_static("theme=dark; session-id=00ff"));
        assert_eq!(session_from_headers(&headers), Some(SessionId("00ff".into())));

        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("session-id=beef"));
        assert_eq!(session_from_headers(&headers), Some(SessionId("beef".into())));

        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("session-id=; other-session-id=1"));
        assert_eq!(session_from_headers(&headers), None);
    }
}
