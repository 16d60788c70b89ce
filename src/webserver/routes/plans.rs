use axum::response::Response;

use crate::subscription::all_plans;
use crate::webserver::utils::success_response;

/// GET /api/plans
pub async fn list_plans() -> Response {
    success_response(all_plans())
}
