use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// 账户余额
#[derive(Debug, Clone, Serialize)]
pub struct BalanceDto {
    pub address: String,
    pub lamports: u64,
    pub sol: Decimal,
    pub network: String,
}

/// 链上交易历史条目
#[derive(Debug, Clone, Serialize)]
pub struct HistoryItemDto {
    pub signature: String,
    pub slot: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_time: Option<i64>,
    /// 链上是否报错
    pub failed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub explorer_url: String,
}

/// 转账流水
#[derive(Debug, Clone, Serialize)]
pub struct TransferRecordDto {
    pub id: i64,
    pub idempotency_key: String,
    pub direction: i32,
    pub direction_desc: String,
    pub from_address: String,
    pub to_address: String,
    pub amount_sol: Decimal,
    pub outcome: i32,
    pub outcome_desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explorer_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
