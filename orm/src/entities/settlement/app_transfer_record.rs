use common::enums::{TransferDirection, TransferOutcome};
use rbatis::rbdc::datetime::DateTime;
use rbatis::{crud, impl_select};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 托管账户转账流水
///
/// 幂等键唯一, 同一键重复提交直接复用原记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppTransferRecord {
    pub id: Option<i64>,
    /// 幂等键, disburse:{loan_id} 或 repay:{loan_id}:{seq}
    pub idempotency_key: String,
    /// 方向, 见 TransferDirection
    pub direction: i32,
    pub from_address: String,
    pub to_address: String,
    /// 金额 (SOL)
    pub amount_sol: Decimal,
    /// 金额 (lamports), 实际上链值
    pub lamports: i64,
    /// 结果, 见 TransferOutcome
    pub outcome: i32,
    /// 链上签名, 模拟成交时为空
    pub signature: Option<String>,
    pub error_msg: Option<String>,
    /// 已提交次数
    pub retry_count: i32,
    pub loan_id: Option<i64>,
    pub installment_seq: Option<i32>,
    /// 链上确认时间
    pub confirmed_at: Option<DateTime>,
    pub create_time: Option<DateTime>,
    pub update_time: Option<DateTime>,
}

crud!(AppTransferRecord {}, "app_transfer_record");

impl_select!(AppTransferRecord{select_by_id(id: i64) -> Option => "`where id = #{id} LIMIT 1`"});
impl_select!(AppTransferRecord{select_by_idempotency_key(idempotency_key: &str) -> Option => "`where idempotency_key = #{idempotency_key} LIMIT 1`"});
impl_select!(AppTransferRecord{select_pending_before(cutoff: &DateTime) => "`where outcome = 0 and create_time < #{cutoff} order by create_time asc`"});
impl_select!(AppTransferRecord{select_by_loan_id(loan_id: i64) => "`where loan_id = #{loan_id} order by create_time asc`"});

impl AppTransferRecord {
    pub const TABLE_NAME: &'static str = "app_transfer_record";

    pub fn direction_enum(&self) -> Option<TransferDirection> {
        TransferDirection::from_code(self.direction)
    }

    pub fn outcome_enum(&self) -> Option<TransferOutcome> {
        TransferOutcome::from_code(self.outcome)
    }
}
