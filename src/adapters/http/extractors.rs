use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::{HeaderMap, header::USER_AGENT, request::Parts},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    app_error::AppError,
    application::jwt::Claims,
    use_cases::auth::{AuthUseCases, ClientInfo},
};

/// Who is calling, as far as the request can tell.
pub struct RequestClient(pub ClientInfo);

impl<S: Send + Sync> FromRequestParts<S> for RequestClient {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = header_str(&parts.headers, USER_AGENT.as_str());
        let ip_address = forwarded_ip(&parts.headers).or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        });

        let device_info = match (&user_agent, &ip_address) {
            (None, None) => None,
            (ua, ip) => Some(format!(
                "{}|{}",
                ua.as_deref().unwrap_or("unknown"),
                ip.as_deref().unwrap_or("unknown")
            )),
        };

        Ok(RequestClient(ClientInfo {
            device_info,
            ip_address,
            user_agent,
        }))
    }
}

/// Claims of the bearer access token on the request.
pub struct CurrentUser(pub Claims);

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<AuthUseCases>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::InvalidToken)?;

        let auth = Arc::<AuthUseCases>::from_ref(state);
        let claims = auth.authenticate(bearer.token())?;
        Ok(CurrentUser(claims))
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(forwarded) = header_str(headers, "x-forwarded-for")
        && let Some(first) = forwarded.split(',').next()
    {
        let trimmed = first.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }
    header_str(headers, "x-real-ip")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn client_of(request: Request<()>) -> ClientInfo {
        let (mut parts, _) = request.into_parts();
        let RequestClient(info) = RequestClient::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        info
    }

    #[tokio::test]
    async fn first_forwarded_address_wins() {
        let request = Request::builder()
            .header("user-agent", "curl/8.0")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .header("x-real-ip", "10.0.0.2")
            .body(())
            .unwrap();

        let info = client_of(request).await;

        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.device_info.as_deref(), Some("curl/8.0|203.0.113.7"));
    }

    #[tokio::test]
    async fn falls_back_to_peer_address() {
        let mut request = Request::builder().body(()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 4000))));

        let info = client_of(request).await;

        assert_eq!(info.ip_address.as_deref(), Some("192.0.2.1"));
        assert_eq!(info.user_agent, None);
        assert_eq!(info.device_info.as_deref(), Some("unknown|192.0.2.1"));
    }

    #[tokio::test]
    async fn nothing_known_means_no_device() {
        let info = client_of(Request::builder().body(()).unwrap()).await;
        assert!(info.device_info.is_none());
    }
}
