use rust_decimal::Decimal;
use serde::Serialize;

/// 贷款评估结果
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentDto {
    pub risk_score: i32,
    pub risk_desc: String,
    pub monthly_payment_sol: Decimal,
    pub total_interest_sol: Decimal,
    /// 评语, 顾问未启用时为本地生成
    pub commentary: String,
}
