use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::DashboardSummary,
    error::AppResult,
    middleware::rbac::{RequireRole, StaffOnly},
    response::ApiResponse,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/resumo", get(summary))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/resumo",
    responses(
        (status = 200, description = "Order, revenue and customer aggregates", body = ApiResponse<DashboardSummary>),
        (status = 403, description = "Staff only")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn summary(
    State(state): State<AppState>,
    _staff: RequireRole<StaffOnly>,
) -> AppResult<Json<ApiResponse<DashboardSummary>>> {
    Ok(Json(dashboard_service::summary(&state).await?))
}
