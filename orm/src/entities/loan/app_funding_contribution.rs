use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 出资记录, 一笔贷款可有多位出资人
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppFundingContribution {
    pub id: Option<i64>,
    pub loan_id: i64,
    /// 出资人钱包地址 (base58)
    pub lender_address: String,
    /// 出资金额 (SOL)
    pub amount_sol: Decimal,
    pub create_time: Option<DateTime>,
}

crud!(AppFundingContribution {}, "app_funding_contribution");

impl_select!(AppFundingContribution{select_by_loan_id(loan_id: i64) => "`where loan_id = #{loan_id} order by create_time asc`"});
impl_select!(AppFundingContribution{select_by_lender(lender_address: &str) => "`where lender_address = #{lender_address} order by create_time desc`"});

impl AppFundingContribution {
    pub const TABLE_NAME: &'static str = "app_funding_contribution";
}
