use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 测试网领水请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirdropReq {
    /// 接收地址 (base58)
    pub address: String,
    /// 领取金额 (SOL)
    pub amount_sol: Decimal,
}

/// 交易历史查询参数
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    /// 返回条数, 默认 10
    pub limit: Option<usize>,
}
