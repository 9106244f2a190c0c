use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 贷款评估请求, 不落库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessReq {
    /// 本金 (SOL)
    pub principal_sol: Decimal,
    /// 年化利率百分比
    pub annual_rate_pct: Decimal,
    /// 期数 (月)
    pub term_months: u32,
    /// 借款用途, 透传给评语生成, 不参与评级
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}
