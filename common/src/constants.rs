/// 应用常量定义

/// 贷款本金下限 (lamports), 低于此值的申请直接拒绝
pub const MIN_PRINCIPAL_LAMPORTS: u64 = 1_000_000;

/// 单笔贷款最大期数
pub const MAX_TERM_MONTHS: u32 = 120;

/// 幂等键前缀
pub mod idempotency {
    /// 放款: disburse:{loan_id}
    pub const DISBURSE_PREFIX: &str = "disburse:";

    /// 还款: repay:{loan_id}:{installment_seq}
    pub const REPAY_PREFIX: &str = "repay:";

    /// 领水: airdrop:{address}:{uuid}
    pub const AIRDROP_PREFIX: &str = "airdrop:";
}

/// Solana 网络名称
pub mod networks {
    pub const MAINNET: &str = "mainnet-beta";
    pub const DEVNET: &str = "devnet";
    pub const TESTNET: &str = "testnet";
}
