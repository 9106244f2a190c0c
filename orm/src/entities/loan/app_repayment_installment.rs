use common::enums::InstallmentStatus;
use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 还款分期, 放款成功时整表生成
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppRepaymentInstallment {
    pub id: Option<i64>,
    pub loan_id: i64,
    /// 期号, 从 1 开始
    pub seq: i32,
    pub due_date: DateTime,
    /// 本期应还 (SOL)
    pub amount_sol: Decimal,
    /// 状态, 见 InstallmentStatus
    pub status: i32,
    pub paid_at: Option<DateTime>,
    /// 核销本期的转账流水
    pub transfer_record_id: Option<i64>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(AppRepaymentInstallment {}, "app_repayment_installment");

impl_select!(AppRepaymentInstallment{select_by_loan_id(loan_id: i64) => "`where loan_id = #{loan_id} order by seq asc`"});
impl_select!(AppRepaymentInstallment{select_next_payable(loan_id: i64) -> Option => "`where loan_id = #{loan_id} and status in (0, 2) order by seq asc LIMIT 1`"});
impl_select!(AppRepaymentInstallment{select_due_before(cutoff: &DateTime) => "`where status = 0 and due_date < #{cutoff}`"});

impl AppRepaymentInstallment {
    pub const TABLE_NAME: &'static str = "app_repayment_installment";

    pub fn status_enum(&self) -> Option<InstallmentStatus> {
        InstallmentStatus::from_code(self.status)
    }
}
