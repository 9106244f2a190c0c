use actix_web::{post, web, Responder};
use common::models::AssessReq;
use common::response::R;
use common::AppError;

use crate::state::AppState;

/// POST /api/advisor/assess
/// 评估不落库, 仅返回定价与评级结果
#[post("/api/advisor/assess")]
pub async fn assess(
    req: web::Json<AssessReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let result = state.advisor.assess(&req.into_inner()).await?;
    R::success(result)
}
