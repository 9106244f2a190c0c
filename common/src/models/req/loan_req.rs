use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 创建贷款申请
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLoanReq {
    /// 借款人钱包地址 (base58)
    pub borrower_address: String,
    /// 本金 (SOL)
    pub principal_sol: Decimal,
    /// 年化利率百分比, 如 12.5 表示 12.5%
    pub annual_rate_pct: Decimal,
    /// 期数 (月)
    pub term_months: u32,
    /// 借款用途, 仅展示
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

/// 出资请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributeReq {
    pub loan_id: i64,
    /// 出资人钱包地址
    pub lender_address: String,
    /// 出资金额 (SOL)
    pub amount_sol: Decimal,
}

/// 还款请求, 始终核销最早一期可还分期
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepayReq {
    pub loan_id: i64,
}
