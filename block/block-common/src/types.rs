use common::{AppError, AppResult};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 1 SOL = 10^9 lamports
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// SOL 金额转 lamports, 拒绝负数和不足一个 lamport 的尾数
pub fn sol_to_lamports(sol: Decimal) -> AppResult<u64> {
    if sol < Decimal::ZERO {
        return Err(AppError::validation(format!("金额不能为负: {}", sol)));
    }
    let lamports = sol * Decimal::from(LAMPORTS_PER_SOL);
    if lamports.fract() != Decimal::ZERO {
        return Err(AppError::validation(format!(
            "金额精度超过 1 lamport: {}",
            sol
        )));
    }
    lamports
        .to_u64()
        .ok_or_else(|| AppError::validation(format!("金额超出范围: {}", sol)))
}

/// lamports 转 SOL, 无损
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from_i128_with_scale(lamports as i128, 9).normalize()
}

/// 链上交易确认状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxConfirmState {
    /// 尚未出现在账本中
    Pending,
    /// 已确认
    Confirmed,
    /// 链上执行失败
    Failed(String),
}

/// 地址交易历史条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerTxSummary {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    /// 链上是否报错
    pub failed: bool,
    pub memo: Option<String>,
}
