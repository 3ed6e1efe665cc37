use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{
        api_response::ApiResponse,
        app_state::AppState,
        extractors::{CurrentUser, RequestClient},
    },
    app_error::{AppError, AppResult},
    use_cases::auth::RegisterInput,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/logout-all", post(logout_all))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterPayload {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    phone_number: Option<String>,
    #[serde(default)]
    marketing_consent: bool,
}

impl From<RegisterPayload> for RegisterInput {
    fn from(p: RegisterPayload) -> Self {
        RegisterInput {
            email: p.email,
            password: p.password,
            first_name: p.first_name,
            last_name: p.last_name,
            phone_number: p.phone_number.filter(|n| !n.trim().is_empty()),
            marketing_consent: p.marketing_consent,
        }
    }
}

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshPayload {
    refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokedSessions {
    revoked_sessions: u64,
}

async fn register(
    State(app_state): State<AppState>,
    RequestClient(client): RequestClient,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterPayload>, AppError>,
) -> AppResult<impl IntoResponse> {
    let auth = app_state
        .auth_use_cases
        .register(payload.into(), client)
        .await?;
    Ok(ApiResponse::ok(auth, "User registered successfully"))
}

async fn login(
    State(app_state): State<AppState>,
    RequestClient(client): RequestClient,
    WithRejection(Json(payload), _): WithRejection<Json<LoginPayload>, AppError>,
) -> AppResult<impl IntoResponse> {
    let auth = app_state
        .auth_use_cases
        .login(&payload.email, &payload.password, client)
        .await?;
    Ok(ApiResponse::ok(auth, "Login successful"))
}

async fn refresh(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RefreshPayload>, AppError>,
) -> AppResult<impl IntoResponse> {
    let auth = app_state
        .auth_use_cases
        .refresh(&payload.refresh_token)
        .await?;
    Ok(ApiResponse::ok(auth, "Token refreshed successfully"))
}

async fn logout(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<RefreshPayload>, AppError>,
) -> AppResult<impl IntoResponse> {
    app_state
        .auth_use_cases
        .logout(&payload.refresh_token)
        .await?;
    Ok(ApiResponse::<()>::ok_empty("Logout successful"))
}

async fn logout_all(
    State(app_state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> AppResult<impl IntoResponse> {
    let revoked = app_state
        .auth_use_cases
        .revoke_all(claims.user_id)
        .await?;
    Ok(ApiResponse::ok(
        RevokedSessions {
            revoked_sessions: revoked,
        },
        "Logged out from all devices",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::test_utils::TestAppStateBuilder;

    fn build_test_router(app_state: AppState) -> Router<()> {
        router().with_state(app_state)
    }

    fn server() -> TestServer {
        TestServer::new(build_test_router(TestAppStateBuilder::new().build())).unwrap()
    }

    fn registration(email: &str) -> Value {
        json!({
            "email": email,
            "password": "correct horse",
            "firstName": "Ada",
            "lastName": "Lovelace"
        })
    }

    #[tokio::test]
    async fn register_returns_token_pair() {
        let server = server();

        let response = server
            .post("/register")
            .json(&registration("ada@example.com"))
            .await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["data"]["tokenType"], "Bearer");
        assert_eq!(body["data"]["user"]["email"], "ada@example.com");
        assert!(body["data"]["user"].get("passwordHash").is_none());
        assert!(body["data"]["accessToken"].as_str().is_some());
    }

    #[tokio::test]
    async fn duplicate_email_returns_409() {
        let server = server();
        server
            .post("/register")
            .json(&registration("ada@example.com"))
            .await
            .assert_status(StatusCode::OK);

        server
            .post("/register")
            .json(&registration("ADA@example.com"))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn invalid_email_returns_400() {
        server()
            .post("/register")
            .json(&registration("not-an-email"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_password_returns_401() {
        let server = server();
        server
            .post("/register")
            .json(&registration("ada@example.com"))
            .await
            .assert_status(StatusCode::OK);

        server
            .post("/login")
            .json(&json!({ "email": "ada@example.com", "password": "wrong password" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rotated_refresh_token_is_rejected() {
        let server = server();
        let registered: Value = server
            .post("/register")
            .json(&registration("ada@example.com"))
            .await
            .json();
        let original = registered["data"]["refreshToken"].as_str().unwrap().to_string();

        let refreshed = server
            .post("/refresh")
            .json(&json!({ "refreshToken": original }))
            .await;
        refreshed.assert_status(StatusCode::OK);
        assert_ne!(refreshed.json::<Value>()["data"]["refreshToken"], original);

        server
            .post("/refresh")
            .json(&json!({ "refreshToken": original }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let server = server();
        let registered: Value = server
            .post("/register")
            .json(&registration("ada@example.com"))
            .await
            .json();
        let refresh_token = registered["data"]["refreshToken"].as_str().unwrap().to_string();

        server
            .post("/logout")
            .json(&json!({ "refreshToken": refresh_token }))
            .await
            .assert_status(StatusCode::OK);

        server
            .post("/refresh")
            .json(&json!({ "refreshToken": refresh_token }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_all_requires_access_token() {
        let server = server();
        let registered: Value = server
            .post("/register")
            .json(&registration("ada@example.com"))
            .await
            .json();
        let access = registered["data"]["accessToken"].as_str().unwrap().to_string();
        let refresh = registered["data"]["refreshToken"].as_str().unwrap().to_string();

        server
            .post("/logout-all")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/logout-all")
            .authorization_bearer(&refresh)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        let response = server
            .post("/logout-all")
            .authorization_bearer(&access)
            .await;
        response.assert_status(StatusCode::OK);
        assert_eq!(response.json::<Value>()["data"]["revokedSessions"], 1);
    }
}
