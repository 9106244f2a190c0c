use std::sync::Arc;
use std::time::Duration;

use block_common::{LedgerClient, TxConfirmState};
use common::config::PlatformConfig;
use common::enums::{TransferDirection, TransferOutcome};
use common::AppResult;
use log::{info, warn};
use orm::entities::AppTransferRecord;
use rbatis::rbdc::datetime::DateTime;

use crate::loan::LoanService;
use crate::store::SettlementStore;

/// 一轮对账的统计
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepSummary {
    pub examined: usize,
    pub confirmed: usize,
    pub failed: usize,
    pub still_pending: usize,
}

/// 确认对账任务
///
/// 接管确认超时后滞留 Pending 的转账记录: 按签名查链上终态,
/// 把贷款状态机推进到与链上一致. 只处理超过最小滞留时长的记录,
/// 避免和在线确认轮询抢同一笔
pub struct ConfirmationSweep {
    store: Arc<dyn SettlementStore>,
    ledger: Arc<dyn LedgerClient>,
    loans: Arc<LoanService>,
    conf: PlatformConfig,
}

impl ConfirmationSweep {
    pub fn new(
        store: Arc<dyn SettlementStore>,
        ledger: Arc<dyn LedgerClient>,
        loans: Arc<LoanService>,
        conf: PlatformConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            loans,
            conf,
        }
    }

    /// 滞留轮询的重试预算, 超过后不再等待链上结果, 直接判失败
    fn retry_budget(&self) -> i32 {
        (self.conf.submit_retry_attempts * self.conf.confirm_poll_attempts) as i32
    }

    pub async fn run_once(&self) -> AppResult<SweepSummary> {
        let cutoff = DateTime::from_timestamp_millis(
            DateTime::now().unix_timestamp_millis()
                - self.conf.sweep_min_pending_age_secs * 1000,
        );
        let stale = self.store.pending_transfers_before(&cutoff).await?;
        let mut summary = SweepSummary {
            examined: stale.len(),
            ..SweepSummary::default()
        };

        for mut record in stale {
            let signature = match record.signature.clone() {
                Some(sig) => sig,
                None => {
                    // 提交从未落链, 没有可查询的签名, 直接判失败
                    self.settle_failed(&mut record, "提交未落链").await?;
                    summary.failed += 1;
                    continue;
                }
            };

            match self.ledger.confirm(&signature).await {
                Ok(TxConfirmState::Confirmed) => {
                    record.outcome = TransferOutcome::Confirmed.get_code();
                    record.confirmed_at = Some(DateTime::now());
                    record.update_time = Some(DateTime::now());
                    self.store.update_transfer(&record).await?;
                    if let (TransferDirection::Disbursement, Some(loan_id)) =
                        (direction_of(&record), record.loan_id)
                    {
                        self.loans.activate(loan_id).await?;
                    }
                    info!(
                        "✅ 对账确认: key={}, signature={}",
                        record.idempotency_key, signature
                    );
                    summary.confirmed += 1;
                }
                Ok(TxConfirmState::Failed(reason)) => {
                    self.settle_failed(&mut record, &reason).await?;
                    summary.failed += 1;
                }
                Ok(TxConfirmState::Pending) => {
                    record.retry_count += 1;
                    if record.retry_count >= self.retry_budget() {
                        self.settle_failed(&mut record, "对账重试预算耗尽").await?;
                        summary.failed += 1;
                    } else {
                        record.update_time = Some(DateTime::now());
                        self.store.update_transfer(&record).await?;
                        summary.still_pending += 1;
                    }
                }
                Err(err) => {
                    warn!(
                        "对账查询失败, 留到下一轮: key={}, err={}",
                        record.idempotency_key, err
                    );
                    summary.still_pending += 1;
                }
            }
        }

        if summary.examined > 0 {
            info!(
                "对账完成: examined={}, confirmed={}, failed={}, pending={}",
                summary.examined, summary.confirmed, summary.failed, summary.still_pending
            );
        }
        Ok(summary)
    }

    /// 周期执行, 供后台任务进程调用
    pub async fn run_forever(&self) {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.conf.sweep_interval_secs));
        loop {
            ticker.tick().await;
            if let Err(err) = self.run_once().await {
                warn!("对账轮次异常: {}", err);
            }
        }
    }

    async fn settle_failed(&self, record: &mut AppTransferRecord, reason: &str) -> AppResult<()> {
        warn!(
            "❌ 对账判失败: key={}, reason={}",
            record.idempotency_key, reason
        );
        record.outcome = TransferOutcome::Failed.get_code();
        record.error_msg = Some(reason.to_string());
        record.update_time = Some(DateTime::now());
        self.store.update_transfer(record).await?;
        if let (TransferDirection::Disbursement, Some(loan_id)) =
            (direction_of(record), record.loan_id)
        {
            self.loans.revert_disbursing(loan_id, reason).await?;
        }
        Ok(())
    }
}

fn direction_of(record: &AppTransferRecord) -> TransferDirection {
    record
        .direction_enum()
        .unwrap_or(TransferDirection::Disbursement)
}
