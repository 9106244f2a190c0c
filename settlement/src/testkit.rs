use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use block_common::{LedgerClient, LedgerTxSummary, TxConfirmState};
use common::constants::networks;
use common::{AppError, AppResult};

/// 脚本化账本, 供并发与重试场景测试使用
///
/// 提交和确认结果按脚本顺序弹出, 脚本耗尽后默认成功
pub struct MockLedger {
    network: String,
    balance: AtomicU64,
    seq: AtomicU64,
    submit_script: Mutex<VecDeque<AppResult<String>>>,
    confirm_script: Mutex<VecDeque<TxConfirmState>>,
}

impl MockLedger {
    pub fn with_network(network: &str) -> Self {
        Self {
            network: network.to_string(),
            balance: AtomicU64::new(u64::MAX / 2),
            seq: AtomicU64::new(0),
            submit_script: Mutex::new(VecDeque::new()),
            confirm_script: Mutex::new(VecDeque::new()),
        }
    }

    pub fn devnet() -> Self {
        Self::with_network(networks::DEVNET)
    }

    pub fn set_balance(&self, lamports: u64) {
        self.balance.store(lamports, Ordering::SeqCst);
    }

    pub fn script_submit(&self, result: AppResult<String>) {
        self.submit_script.lock().unwrap().push_back(result);
    }

    pub fn script_confirm(&self, state: TxConfirmState) {
        self.confirm_script.lock().unwrap().push_back(state);
    }

    fn next_signature(&self) -> String {
        format!("mock-sig-{}", self.seq.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    fn platform_address(&self) -> String {
        "MOCK_PLATFORM".to_string()
    }

    fn network(&self) -> &str {
        &self.network
    }

    fn explorer_url(&self, signature: &str) -> String {
        format!("mock://tx/{}", signature)
    }

    async fn balance_lamports(&self, _address: &str) -> AppResult<u64> {
        Ok(self.balance.load(Ordering::SeqCst))
    }

    async fn transfer_from_platform(&self, _to: &str, _lamports: u64) -> AppResult<String> {
        match self.submit_script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(self.next_signature()),
        }
    }

    async fn confirm(&self, _signature: &str) -> AppResult<TxConfirmState> {
        match self.confirm_script.lock().unwrap().pop_front() {
            Some(state) => Ok(state),
            None => Ok(TxConfirmState::Confirmed),
        }
    }

    async fn request_airdrop(&self, _to: &str, _lamports: u64) -> AppResult<String> {
        if self.network == networks::MAINNET {
            return Err(AppError::UnsupportedOnMain("领水仅限测试网".to_string()));
        }
        match self.submit_script.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(self.next_signature()),
        }
    }

    async fn history(&self, _address: &str, _limit: usize) -> AppResult<Vec<LedgerTxSummary>> {
        Ok(Vec::new())
    }
}
