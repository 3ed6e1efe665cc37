use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::{api_response::ApiResponse, app_state::AppState},
    app_error::{AppError, AppResult},
    application::validators::is_valid_plan_code,
    domain::entities::membership_subscription::PaymentMethodType,
    use_cases::{membership::CreateSubscriptionInput, membership_plans::MembershipPlanProfile},
};

const MAX_PAYMENT_METHOD_ID_LEN: usize = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/plans/{plan_code}", get(get_plan))
        .route("/subscriptions", post(create_subscription))
        .route("/subscriptions/user/{user_id}", get(get_active_subscription))
        .route(
            "/subscriptions/user/{user_id}/history",
            get(get_subscription_history),
        )
        .route(
            "/subscriptions/{subscription_id}/cancel",
            put(cancel_subscription),
        )
        .route("/users/{user_id}/status", get(get_membership_status))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    #[serde(flatten)]
    plan: MembershipPlanProfile,
    formatted_price: String,
    billing_cycle_display: &'static str,
    trial_description: Option<String>,
}

impl From<MembershipPlanProfile> for PlanResponse {
    fn from(plan: MembershipPlanProfile) -> Self {
        Self {
            formatted_price: plan.formatted_price(),
            billing_cycle_display: plan.billing_cycle.display_name(),
            trial_description: plan.trial_description(),
            plan,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSubscriptionPayload {
    user_id: Uuid,
    plan_code: String,
    payment_method_id: String,
    payment_method_type: PaymentMethodType,
    #[serde(default = "default_auto_renew")]
    auto_renew: bool,
}

fn default_auto_renew() -> bool {
    true
}

#[derive(Deserialize)]
struct CancelQuery {
    reason: Option<String>,
}

/// Subscription writes report every business failure as a 400.
fn as_bad_request(action: &str, err: AppError) -> AppError {
    match err {
        AppError::NotFound => AppError::InvalidInput(format!("Failed to {action}: not found")),
        AppError::Conflict(msg) | AppError::InvalidInput(msg) => {
            AppError::InvalidInput(format!("Failed to {action}: {msg}"))
        }
        other => other,
    }
}

async fn list_plans(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let plans: Vec<PlanResponse> = app_state
        .membership_catalog_use_cases
        .list_active_paid_plans()
        .await?
        .into_iter()
        .map(PlanResponse::from)
        .collect();

    Ok(ApiResponse::ok(plans, "Shopster+ plans retrieved successfully"))
}

async fn get_plan(
    State(app_state): State<AppState>,
    WithRejection(Path(plan_code), _): WithRejection<Path<String>, AppError>,
) -> AppResult<impl IntoResponse> {
    let plan = app_state
        .membership_catalog_use_cases
        .find_by_code(&plan_code)
        .await?;

    Ok(ApiResponse::ok(PlanResponse::from(plan), "Plan found"))
}

async fn create_subscription(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateSubscriptionPayload>, AppError>,
) -> AppResult<impl IntoResponse> {
    let plan_code = payload.plan_code.trim();
    if !is_valid_plan_code(plan_code) {
        return Err(AppError::InvalidInput("Invalid plan code".into()));
    }
    if payload.payment_method_id.len() > MAX_PAYMENT_METHOD_ID_LEN {
        return Err(AppError::InvalidInput(format!(
            "Payment method ID must not exceed {MAX_PAYMENT_METHOD_ID_LEN} characters"
        )));
    }

    let subscription = app_state
        .membership_use_cases
        .create_subscription(CreateSubscriptionInput {
            user_id: payload.user_id,
            plan_code: plan_code.to_string(),
            payment_method_id: payload.payment_method_id,
            payment_method_type: payload.payment_method_type,
            auto_renew: payload.auto_renew,
        })
        .await
        .map_err(|e| as_bad_request("create subscription", e))?;

    Ok(ApiResponse::created(
        subscription,
        "Subscription created successfully",
    ))
}

async fn get_active_subscription(
    State(app_state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state
        .membership_use_cases
        .active_subscription(user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(ApiResponse::ok(subscription, "Active subscription found"))
}

async fn get_subscription_history(
    State(app_state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<impl IntoResponse> {
    let history = app_state
        .membership_use_cases
        .subscription_history(user_id)
        .await?;

    Ok(ApiResponse::ok(history, "Subscription history retrieved"))
}

async fn cancel_subscription(
    State(app_state): State<AppState>,
    WithRejection(Path(subscription_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Query(query), _): WithRejection<Query<CancelQuery>, AppError>,
) -> AppResult<impl IntoResponse> {
    let reason = query
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    let cancelled = app_state
        .membership_use_cases
        .cancel_subscription(subscription_id, reason)
        .await
        .map_err(|e| as_bad_request("cancel subscription", e))?;

    Ok(ApiResponse::ok(
        cancelled,
        "Subscription cancelled successfully",
    ))
}

async fn get_membership_status(
    State(app_state): State<AppState>,
    WithRejection(Path(user_id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<impl IntoResponse> {
    let status = app_state
        .membership_use_cases
        .membership_status(user_id)
        .await?;

    Ok(ApiResponse::ok(
        status.is_active_member,
        "Membership status retrieved",
    ))
}
