use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// 贷款创建结果
#[derive(Debug, Clone, Serialize)]
pub struct LoanCreatedDto {
    pub id: i64,
    pub loan_number: String,
    pub status: i32,
    pub status_desc: String,
    /// 每期应还 (SOL)
    pub monthly_payment_sol: Decimal,
    /// 总利息 (SOL)
    pub total_interest_sol: Decimal,
    pub risk_score: i32,
    pub risk_desc: String,
}

/// 出资结果
#[derive(Debug, Clone, Serialize)]
pub struct ContributeResultDto {
    pub loan_id: i64,
    /// 本次入账金额 (SOL)
    pub accepted_sol: Decimal,
    /// 累计出资 (SOL)
    pub funded_sol: Decimal,
    /// 本次出资后是否满额
    pub fully_funded: bool,
}

/// 分期明细
#[derive(Debug, Clone, Serialize)]
pub struct InstallmentDto {
    pub seq: i32,
    pub due_date: DateTime<Utc>,
    pub amount_sol: Decimal,
    pub status: i32,
    pub status_desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

/// 贷款详情, 含分期计划
#[derive(Debug, Clone, Serialize)]
pub struct LoanDetailDto {
    pub id: i64,
    pub loan_number: String,
    pub borrower_address: String,
    pub principal_sol: Decimal,
    pub annual_rate_pct: Decimal,
    pub term_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    pub status: i32,
    pub status_desc: String,
    pub risk_score: i32,
    pub risk_desc: String,
    pub funded_sol: Decimal,
    pub monthly_payment_sol: Decimal,
    pub total_interest_sol: Decimal,
    pub created_at: DateTime<Utc>,
    pub installments: Vec<InstallmentDto>,
}
