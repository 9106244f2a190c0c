use async_trait::async_trait;
use common::AppResult;

use crate::types::{LedgerTxSummary, TxConfirmState};

/// 账本客户端抽象
///
/// 托管资金的所有链上操作都经由这里, 方便在测试中用脚本化实现替换
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// 平台托管账户地址 (base58)
    fn platform_address(&self) -> String;

    /// 网络名称, 如 devnet / mainnet-beta
    fn network(&self) -> &str;

    /// 浏览器链接
    fn explorer_url(&self, signature: &str) -> String;

    /// 查询地址余额 (lamports)
    async fn balance_lamports(&self, address: &str) -> AppResult<u64>;

    /// 从托管账户签名转出, 返回交易签名
    async fn transfer_from_platform(&self, to: &str, lamports: u64) -> AppResult<String>;

    /// 查询某笔交易的确认状态
    async fn confirm(&self, signature: &str) -> AppResult<TxConfirmState>;

    /// 测试网领水, 主网调用必须返回 UnsupportedOnMain
    async fn request_airdrop(&self, to: &str, lamports: u64) -> AppResult<String>;

    /// 地址最近交易历史, 最新在前
    async fn history(&self, address: &str, limit: usize) -> AppResult<Vec<LedgerTxSummary>>;
}
