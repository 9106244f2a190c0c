use actix_web::{get, web, Responder};
use common::response::R;
use common::AppError;
use serde_json::json;

use crate::state::AppState;

/// GET /api/common/health
/// 存活探针, 顺带报告链路网络
#[get("/api/common/health")]
pub async fn health(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    R::success(json!({
        "status": "up",
        "network": state.custodial.network(),
        "platform_address": state.custodial.platform_address(),
    }))
}
