use common::enums::{LoanStatus, RiskScore};
use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 贷款申请单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppLoanRequest {
    pub id: Option<i64>,
    /// 对外展示编号, 形如 LN-XXXX
    pub loan_number: Option<String>,
    /// 借款人钱包地址 (base58)
    pub borrower_address: String,
    /// 本金 (SOL)
    pub principal_sol: Decimal,
    /// 年化利率百分比
    pub annual_rate_pct: Decimal,
    /// 期数 (月)
    pub term_months: i32,
    /// 借款用途, 仅展示
    pub purpose: Option<String>,
    /// 风险评级, 见 RiskScore
    pub risk_score: i32,
    /// 状态, 见 LoanStatus
    pub status: i32,
    /// 累计出资 (SOL)
    pub funded_sol: Decimal,
    /// 每期应还 (SOL)
    pub monthly_payment_sol: Decimal,
    /// 总利息 (SOL)
    pub total_interest_sol: Decimal,
    /// 放款完成时间
    pub disbursed_at: Option<DateTime>,
    /// 结清/违约时间
    pub closed_at: Option<DateTime>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(AppLoanRequest {}, "app_loan_request");

impl_select!(AppLoanRequest{select_by_id(id: i64) -> Option => "`where id = #{id} LIMIT 1`"});
impl_select!(AppLoanRequest{select_by_loan_number(loan_number: &str) -> Option => "`where loan_number = #{loan_number} LIMIT 1`"});
impl_select!(AppLoanRequest{select_open() => "`where status in (0, 1) order by create_time desc`"});
impl_select!(AppLoanRequest{select_by_status(status: i32) => "`where status = #{status} order by create_time desc`"});

impl AppLoanRequest {
    pub const TABLE_NAME: &'static str = "app_loan_request";

    pub fn status_enum(&self) -> Option<LoanStatus> {
        LoanStatus::from_code(self.status)
    }

    pub fn risk_enum(&self) -> Option<RiskScore> {
        RiskScore::from_code(self.risk_score)
    }

    /// 剩余可出资额度 (SOL)
    pub fn remaining_sol(&self) -> Decimal {
        self.principal_sol - self.funded_sol
    }
}
