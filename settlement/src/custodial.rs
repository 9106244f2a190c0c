use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use block_common::{sol_to_lamports, LedgerClient, LedgerTxSummary, TxConfirmState};
use common::config::PlatformConfig;
use common::constants::networks;
use common::enums::{TransferDirection, TransferOutcome};
use common::utils::snowflake::generate_id;
use common::{AppError, AppResult};
use log::{error, info, warn};
use orm::entities::AppTransferRecord;
use rbatis::rbdc::datetime::DateTime;
use rust_decimal::Decimal;
use tokio::sync::{mpsc, oneshot};
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;

use crate::store::SettlementStore;

/// 托管转账请求
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub idempotency_key: String,
    pub direction: TransferDirection,
    /// 对手方地址 (base58)
    pub counterparty: String,
    pub amount_sol: Decimal,
    pub loan_id: Option<i64>,
    pub installment_seq: Option<i32>,
}

struct Job {
    req: TransferRequest,
    reply: oneshot::Sender<AppResult<AppTransferRecord>>,
}

/// 托管账户管理器
///
/// 平台签名的所有转出走同一条队列, 串行执行.
/// 同一签名账户并发提交会互相挤掉最近区块哈希, 串行化是整个系统的
/// 并发正确性支点
pub struct CustodialManager {
    tx: mpsc::Sender<Job>,
    ledger: Arc<dyn LedgerClient>,
}

impl CustodialManager {
    /// 启动队列 worker 并返回句柄
    pub fn start(
        ledger: Arc<dyn LedgerClient>,
        store: Arc<dyn SettlementStore>,
        conf: PlatformConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(128);
        let worker_ledger = ledger.clone();
        tokio::spawn(async move {
            run_worker(rx, worker_ledger, store, conf).await;
        });
        Self { tx, ledger }
    }

    /// 提交一笔托管转账, 等待队列执行完成
    pub async fn execute(&self, req: TransferRequest) -> AppResult<AppTransferRecord> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Job {
                req,
                reply: reply_tx,
            })
            .await
            .map_err(|_| AppError::internal("托管转账队列已关闭"))?;
        reply_rx
            .await
            .map_err(|_| AppError::internal("托管转账任务中断"))?
    }

    pub fn platform_address(&self) -> String {
        self.ledger.platform_address()
    }

    pub fn network(&self) -> String {
        self.ledger.network().to_string()
    }

    pub fn explorer_url(&self, signature: &str) -> String {
        self.ledger.explorer_url(signature)
    }

    /// 托管账户链上余额, 以账本为准, 不做缓存
    pub async fn platform_balance_lamports(&self) -> AppResult<u64> {
        self.ledger
            .balance_lamports(&self.ledger.platform_address())
            .await
    }

    pub async fn balance_lamports(&self, address: &str) -> AppResult<u64> {
        self.ledger.balance_lamports(address).await
    }

    pub async fn history(&self, address: &str, limit: usize) -> AppResult<Vec<LedgerTxSummary>> {
        self.ledger.history(address, limit).await
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<Job>,
    ledger: Arc<dyn LedgerClient>,
    store: Arc<dyn SettlementStore>,
    conf: PlatformConfig,
) {
    info!("🚀 托管转账队列启动: platform={}", ledger.platform_address());
    while let Some(job) = rx.recv().await {
        let result = handle_transfer(ledger.as_ref(), store.as_ref(), &conf, &job.req).await;
        // 调用方可能已放弃等待, 丢弃失败即可
        let _ = job.reply.send(result);
    }
    info!("托管转账队列退出");
}

async fn handle_transfer(
    ledger: &dyn LedgerClient,
    store: &dyn SettlementStore,
    conf: &PlatformConfig,
    req: &TransferRequest,
) -> AppResult<AppTransferRecord> {
    // 校验先于一切落库动作, 失败不留半成品记录
    if req.direction == TransferDirection::TestFunding && ledger.network() == networks::MAINNET {
        return Err(AppError::UnsupportedOnMain("领水仅限测试网".to_string()));
    }
    if req.amount_sol <= Decimal::ZERO {
        return Err(AppError::validation(format!(
            "转账金额必须大于 0: {}",
            req.amount_sol
        )));
    }
    let lamports = sol_to_lamports(req.amount_sol)?;

    // 幂等检查: Pending/Confirmed/Simulated 直接复用, Failed 允许重新提交
    let mut record = match store.transfer_by_key(&req.idempotency_key).await? {
        Some(existing)
            if existing
                .outcome_enum()
                .map(|o| o.blocks_resubmission())
                .unwrap_or(true) =>
        {
            info!(
                "幂等命中, 复用转账记录: key={}, outcome={}",
                existing.idempotency_key, existing.outcome
            );
            return Ok(existing);
        }
        Some(mut failed) => {
            failed.outcome = TransferOutcome::Pending.get_code();
            failed.error_msg = None;
            failed.update_time = Some(DateTime::now());
            store.update_transfer(&failed).await?;
            failed
        }
        None => {
            let fresh = new_record(ledger, req, lamports);
            store.insert_transfer(&fresh).await?;
            fresh
        }
    };

    match req.direction {
        // 还款方向借款人密钥托管在外部密钥库, 当前环境记为模拟成交
        TransferDirection::Repayment => {
            record.outcome = TransferOutcome::Simulated.get_code();
            record.update_time = Some(DateTime::now());
            store.update_transfer(&record).await?;
            info!(
                "模拟还款入账: key={}, amount={} SOL",
                record.idempotency_key, record.amount_sol
            );
            Ok(record)
        }
        TransferDirection::Disbursement | TransferDirection::TestFunding => {
            submit_and_confirm(ledger, store, conf, req, lamports, &mut record).await
        }
    }
}

fn new_record(ledger: &dyn LedgerClient, req: &TransferRequest, lamports: u64) -> AppTransferRecord {
    let platform = ledger.platform_address();
    let (from, to) = match req.direction {
        TransferDirection::Disbursement => (platform, req.counterparty.clone()),
        TransferDirection::Repayment => (req.counterparty.clone(), platform),
        TransferDirection::TestFunding => ("faucet".to_string(), req.counterparty.clone()),
    };
    AppTransferRecord {
        id: Some(generate_id()),
        idempotency_key: req.idempotency_key.clone(),
        direction: req.direction.get_code(),
        from_address: from,
        to_address: to,
        amount_sol: req.amount_sol,
        lamports: lamports as i64,
        outcome: TransferOutcome::Pending.get_code(),
        signature: None,
        error_msg: None,
        retry_count: 0,
        loan_id: req.loan_id,
        installment_seq: req.installment_seq,
        confirmed_at: None,
        create_time: Some(DateTime::now()),
        update_time: Some(DateTime::now()),
    }
}

async fn submit_and_confirm(
    ledger: &dyn LedgerClient,
    store: &dyn SettlementStore,
    conf: &PlatformConfig,
    req: &TransferRequest,
    lamports: u64,
    record: &mut AppTransferRecord,
) -> AppResult<AppTransferRecord> {
    // 放款前核对托管余额, 不足直接判失败
    if req.direction == TransferDirection::Disbursement {
        let balance = ledger
            .balance_lamports(&ledger.platform_address())
            .await?;
        if balance < lamports {
            let msg = format!("托管余额 {} lamports, 放款需要 {}", balance, lamports);
            finalize_failed(store, record, &msg).await?;
            return Err(AppError::InsufficientBalance(msg));
        }
    }

    // 提交, 指数退避, 只对账本暂时不可用重试
    let attempts = AtomicU32::new(0);
    let strategy = ExponentialBackoff::from_millis(100)
        .max_delay(Duration::from_secs(2))
        .map(jitter)
        .take(conf.submit_retry_attempts.saturating_sub(1) as usize);
    let submit_result = match req.direction {
        TransferDirection::Disbursement => {
            RetryIf::spawn(
                strategy,
                || async {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    ledger
                        .transfer_from_platform(&req.counterparty, lamports)
                        .await
                },
                is_transient,
            )
            .await
        }
        TransferDirection::TestFunding => {
            RetryIf::spawn(
                strategy,
                || async {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    ledger.request_airdrop(&req.counterparty, lamports).await
                },
                is_transient,
            )
            .await
        }
        TransferDirection::Repayment => {
            return Err(AppError::internal("还款方向不走链上提交"));
        }
    };
    record.retry_count = attempts.load(Ordering::SeqCst) as i32;

    let signature = match submit_result {
        Ok(sig) => sig,
        Err(err) => {
            error!(
                "❌ 转账提交失败: key={}, attempts={}, err={}",
                record.idempotency_key, record.retry_count, err
            );
            finalize_failed(store, record, &err.to_string()).await?;
            return Err(err);
        }
    };

    record.signature = Some(signature.clone());
    record.update_time = Some(DateTime::now());
    store.update_transfer(record).await?;

    // 轮询确认, 预算耗尽后保持 Pending 交给对账任务
    for _ in 0..conf.confirm_poll_attempts {
        tokio::time::sleep(Duration::from_millis(conf.confirm_poll_interval_ms)).await;
        match ledger.confirm(&signature).await {
            Ok(TxConfirmState::Confirmed) => {
                record.outcome = TransferOutcome::Confirmed.get_code();
                record.confirmed_at = Some(DateTime::now());
                record.update_time = Some(DateTime::now());
                store.update_transfer(record).await?;
                info!(
                    "✅ 转账确认: key={}, signature={}",
                    record.idempotency_key, signature
                );
                return Ok(record.clone());
            }
            Ok(TxConfirmState::Failed(reason)) => {
                warn!(
                    "链上执行失败: key={}, signature={}, reason={}",
                    record.idempotency_key, signature, reason
                );
                finalize_failed(store, record, &reason).await?;
                return Ok(record.clone());
            }
            Ok(TxConfirmState::Pending) => {}
            Err(err) => {
                warn!("确认查询失败, 继续轮询: {}", err);
            }
        }
    }

    warn!(
        "⏳ 确认超时, 记录保持 Pending: key={}, signature={}",
        record.idempotency_key, signature
    );
    Err(AppError::ConfirmationTimeout(format!(
        "签名 {} 在 {} 次轮询内未确认",
        signature, conf.confirm_poll_attempts
    )))
}

fn is_transient(err: &AppError) -> bool {
    matches!(err, AppError::LedgerUnavailable(_))
}

async fn finalize_failed(
    store: &dyn SettlementStore,
    record: &mut AppTransferRecord,
    msg: &str,
) -> AppResult<()> {
    record.outcome = TransferOutcome::Failed.get_code();
    record.error_msg = Some(msg.to_string());
    record.update_time = Some(DateTime::now());
    store.update_transfer(record).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem::MemSettlementStore;
    use crate::testkit::MockLedger;

    fn fast_conf() -> PlatformConfig {
        PlatformConfig {
            confirm_poll_interval_ms: 1,
            ..PlatformConfig::default()
        }
    }

    fn disburse_req(key: &str) -> TransferRequest {
        TransferRequest {
            idempotency_key: key.to_string(),
            direction: TransferDirection::Disbursement,
            counterparty: "borrower-addr".to_string(),
            amount_sol: Decimal::from(2),
            loan_id: Some(1),
            installment_seq: None,
        }
    }

    #[tokio::test]
    async fn test_duplicate_key_reuses_record() {
        let ledger = Arc::new(MockLedger::devnet());
        let store = Arc::new(MemSettlementStore::new());
        let manager = CustodialManager::start(ledger, store.clone(), fast_conf());

        let first = manager.execute(disburse_req("disburse:1")).await.unwrap();
        assert_eq!(first.outcome, TransferOutcome::Confirmed.get_code());

        let second = manager.execute(disburse_req("disburse:1")).await.unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.signature, first.signature);
    }

    #[tokio::test]
    async fn test_submit_retries_then_succeeds() {
        let ledger = Arc::new(MockLedger::devnet());
        ledger.script_submit(Err(AppError::LedgerUnavailable("rpc down".to_string())));
        ledger.script_submit(Err(AppError::LedgerUnavailable("rpc down".to_string())));
        ledger.script_submit(Ok("sig-ok".to_string()));
        let store = Arc::new(MemSettlementStore::new());
        let manager = CustodialManager::start(ledger, store.clone(), fast_conf());

        let record = manager.execute(disburse_req("disburse:2")).await.unwrap();
        assert_eq!(record.outcome, TransferOutcome::Confirmed.get_code());
        assert_eq!(record.retry_count, 3);
        assert_eq!(record.signature.as_deref(), Some("sig-ok"));
    }

    #[tokio::test]
    async fn test_submit_exhaustion_marks_failed() {
        let ledger = Arc::new(MockLedger::devnet());
        for _ in 0..3 {
            ledger.script_submit(Err(AppError::LedgerUnavailable("rpc down".to_string())));
        }
        let store = Arc::new(MemSettlementStore::new());
        let manager = CustodialManager::start(ledger, store.clone(), fast_conf());

        let err = manager.execute(disburse_req("disburse:3")).await;
        assert!(matches!(err, Err(AppError::LedgerUnavailable(_))));

        let record = store.transfer_by_key("disburse:3").await.unwrap().unwrap();
        assert_eq!(record.outcome, TransferOutcome::Failed.get_code());
        // 失败记录允许重新提交
        let retried = manager.execute(disburse_req("disburse:3")).await.unwrap();
        assert_eq!(retried.outcome, TransferOutcome::Confirmed.get_code());
        assert_eq!(retried.id, record.id);
    }

    #[tokio::test]
    async fn test_insufficient_balance_surfaces() {
        let ledger = Arc::new(MockLedger::devnet());
        ledger.set_balance(0);
        let store = Arc::new(MemSettlementStore::new());
        let manager = CustodialManager::start(ledger, store.clone(), fast_conf());

        let err = manager.execute(disburse_req("disburse:4")).await;
        assert!(matches!(err, Err(AppError::InsufficientBalance(_))));
        let record = store.transfer_by_key("disburse:4").await.unwrap().unwrap();
        assert_eq!(record.outcome, TransferOutcome::Failed.get_code());
    }

    #[tokio::test]
    async fn test_repayment_recorded_simulated() {
        let ledger = Arc::new(MockLedger::devnet());
        let store = Arc::new(MemSettlementStore::new());
        let manager = CustodialManager::start(ledger, store.clone(), fast_conf());

        let record = manager
            .execute(TransferRequest {
                idempotency_key: "repay:1:1".to_string(),
                direction: TransferDirection::Repayment,
                counterparty: "borrower-addr".to_string(),
                amount_sol: Decimal::ONE,
                loan_id: Some(1),
                installment_seq: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(record.outcome, TransferOutcome::Simulated.get_code());
        assert!(record.signature.is_none());
    }

    #[tokio::test]
    async fn test_airdrop_rejected_on_main_without_record() {
        let ledger = Arc::new(MockLedger::with_network("mainnet-beta"));
        let store = Arc::new(MemSettlementStore::new());
        let manager = CustodialManager::start(ledger, store.clone(), fast_conf());

        let err = manager
            .execute(TransferRequest {
                idempotency_key: "airdrop:x".to_string(),
                direction: TransferDirection::TestFunding,
                counterparty: "someone".to_string(),
                amount_sol: Decimal::ONE,
                loan_id: None,
                installment_seq: None,
            })
            .await;
        assert!(matches!(err, Err(AppError::UnsupportedOnMain(_))));
        // 校验失败不留记录
        assert!(store.transfer_by_key("airdrop:x").await.unwrap().is_none());
    }
}
