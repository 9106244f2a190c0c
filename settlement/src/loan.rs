use std::sync::Arc;

use block_common::sol_to_lamports;
use common::config::PlatformConfig;
use common::constants::{idempotency, MIN_PRINCIPAL_LAMPORTS};
use common::enums::{InstallmentStatus, LoanStatus, TransferDirection};
use common::utils::snowflake::generate_id;
use common::utils::serial::loan_number_for_id;
use common::{AppError, AppResult};
use chrono::{Months, TimeZone, Utc};
use log::{error, info, warn};
use orm::entities::{AppLoanRequest, AppRepaymentInstallment, AppTransferRecord};
use rbatis::rbdc::datetime::DateTime;
use rust_decimal::Decimal;

use crate::amortization::{assess_risk, compute_installment, total_interest};
use crate::custodial::{CustodialManager, TransferRequest};
use crate::store::SettlementStore;

/// 逾期处置策略
///
/// 对账任务只负责把到期未还的分期标记为逾期, 是否进一步判定违约由策略决定
pub trait DelinquencyPolicy: Send + Sync {
    fn should_default(&self, loan: &AppLoanRequest, installment: &AppRepaymentInstallment) -> bool;
}

/// 默认策略: 只标记逾期, 从不自动违约, 违约判定留给人工
pub struct NoAutoDefault;

impl DelinquencyPolicy for NoAutoDefault {
    fn should_default(&self, _loan: &AppLoanRequest, _installment: &AppRepaymentInstallment) -> bool {
        false
    }
}

/// 一笔还款的结果
#[derive(Debug, Clone)]
pub struct RepaymentOutcome {
    pub installment: AppRepaymentInstallment,
    pub transfer: AppTransferRecord,
    pub loan_completed: bool,
}

/// 逾期巡检统计
#[derive(Debug, Clone, Copy, Default)]
pub struct OverdueSummary {
    pub marked_late: usize,
    pub defaulted: usize,
}

/// 贷款生命周期服务
///
/// 状态流转集中在这里, 放款和还款的资金动作委托给托管队列
pub struct LoanService {
    store: Arc<dyn SettlementStore>,
    custodial: Arc<CustodialManager>,
    conf: PlatformConfig,
    policy: Arc<dyn DelinquencyPolicy>,
}

impl LoanService {
    pub fn new(
        store: Arc<dyn SettlementStore>,
        custodial: Arc<CustodialManager>,
        conf: PlatformConfig,
        policy: Arc<dyn DelinquencyPolicy>,
    ) -> Self {
        Self {
            store,
            custodial,
            conf,
            policy,
        }
    }

    /// 发布贷款申请
    ///
    /// 创建时即敲定每期金额, 总利息和风险评级, 后续不再重算
    pub async fn create(
        &self,
        borrower_address: &str,
        principal_sol: Decimal,
        annual_rate_pct: Decimal,
        term_months: u32,
        purpose: Option<String>,
    ) -> AppResult<AppLoanRequest> {
        if borrower_address.is_empty() {
            return Err(AppError::validation("借款人地址不能为空"));
        }
        let lamports = sol_to_lamports(principal_sol)?;
        if lamports < MIN_PRINCIPAL_LAMPORTS {
            return Err(AppError::validation(format!(
                "本金低于下限 {} lamports: {}",
                MIN_PRINCIPAL_LAMPORTS, lamports
            )));
        }

        let monthly = compute_installment(principal_sol, annual_rate_pct, term_months)?;
        let interest = total_interest(principal_sol, annual_rate_pct, term_months)?;
        let risk = assess_risk(
            principal_sol,
            annual_rate_pct,
            term_months,
            purpose.as_deref(),
            &self.conf,
        );

        let id = generate_id();
        let loan = AppLoanRequest {
            id: Some(id),
            loan_number: Some(loan_number_for_id(id)),
            borrower_address: borrower_address.to_string(),
            principal_sol,
            annual_rate_pct,
            term_months: term_months as i32,
            purpose,
            risk_score: risk.get_code(),
            status: LoanStatus::Requested.get_code(),
            funded_sol: Decimal::ZERO,
            monthly_payment_sol: monthly,
            total_interest_sol: interest,
            disbursed_at: None,
            closed_at: None,
            create_time: Some(DateTime::now()),
            update_time: None,
        };
        self.store.insert_loan(&loan).await?;
        info!(
            "📋 贷款发布: loan_number={}, principal={} SOL, risk={}",
            loan.loan_number.as_deref().unwrap_or("-"),
            loan.principal_sol,
            risk.description()
        );
        Ok(loan)
    }

    pub async fn loan_by_id(&self, loan_id: i64) -> AppResult<AppLoanRequest> {
        self.store
            .loan_by_id(loan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("贷款不存在: {}", loan_id)))
    }

    pub async fn list_open(&self) -> AppResult<Vec<AppLoanRequest>> {
        self.store.open_loans().await
    }

    pub async fn installments(&self, loan_id: i64) -> AppResult<Vec<AppRepaymentInstallment>> {
        self.store.installments_by_loan(loan_id).await
    }

    pub async fn transfers(&self, loan_id: i64) -> AppResult<Vec<AppTransferRecord>> {
        self.store.transfers_by_loan(loan_id).await
    }

    /// 放款
    ///
    /// 满额后才可放款; Disbursing 状态允许重入, 幂等键保证不会重复转账.
    /// 确认超时保持 Disbursing 交给对账任务, 其余失败回退到满额可重试
    pub async fn disburse(&self, loan_id: i64) -> AppResult<AppTransferRecord> {
        let mut loan = self.loan_by_id(loan_id).await?;
        let status = loan
            .status_enum()
            .ok_or_else(|| AppError::internal(format!("贷款状态码非法: {}", loan.status)))?;
        if !matches!(status, LoanStatus::FullyFunded | LoanStatus::Disbursing) {
            return Err(AppError::business(format!(
                "当前状态不可放款: {}",
                status.description()
            )));
        }

        if status == LoanStatus::FullyFunded {
            loan.status = LoanStatus::Disbursing.get_code();
            loan.update_time = Some(DateTime::now());
            self.store.update_loan(&loan).await?;
        }

        let req = TransferRequest {
            idempotency_key: format!("{}{}", idempotency::DISBURSE_PREFIX, loan_id),
            direction: TransferDirection::Disbursement,
            counterparty: loan.borrower_address.clone(),
            amount_sol: loan.principal_sol,
            loan_id: Some(loan_id),
            installment_seq: None,
        };
        match self.custodial.execute(req).await {
            Ok(record) => {
                let settled = record
                    .outcome_enum()
                    .map(|o| o.is_settled())
                    .unwrap_or(false);
                if settled {
                    self.activate(loan_id).await?;
                    info!(
                        "✅ 放款成功: loan_id={}, signature={:?}",
                        loan_id, record.signature
                    );
                } else {
                    self.revert_disbursing(loan_id, record.error_msg.as_deref().unwrap_or("链上执行失败"))
                        .await?;
                }
                Ok(record)
            }
            Err(AppError::ConfirmationTimeout(msg)) => {
                warn!("放款确认超时, 等待对账任务接管: loan_id={}", loan_id);
                Err(AppError::ConfirmationTimeout(msg))
            }
            Err(err) => {
                self.revert_disbursing(loan_id, &err.to_string()).await?;
                Err(err)
            }
        }
    }

    /// 还款当前应还的一期
    ///
    /// 只允许按期号顺序核销, 不支持跳期和部分还款
    pub async fn repay(&self, loan_id: i64) -> AppResult<RepaymentOutcome> {
        let loan = self.loan_by_id(loan_id).await?;
        let status = loan
            .status_enum()
            .ok_or_else(|| AppError::internal(format!("贷款状态码非法: {}", loan.status)))?;
        if status != LoanStatus::Active {
            return Err(AppError::business(format!(
                "当前状态不可还款: {}",
                status.description()
            )));
        }

        let mut installment = self
            .store
            .next_payable_installment(loan_id)
            .await?
            .ok_or_else(|| AppError::business(format!("无待还分期: {}", loan_id)))?;

        let req = TransferRequest {
            idempotency_key: format!(
                "{}{}:{}",
                idempotency::REPAY_PREFIX,
                loan_id,
                installment.seq
            ),
            direction: TransferDirection::Repayment,
            counterparty: loan.borrower_address.clone(),
            amount_sol: installment.amount_sol,
            loan_id: Some(loan_id),
            installment_seq: Some(installment.seq),
        };
        let transfer = self.custodial.execute(req).await?;
        let settled = transfer
            .outcome_enum()
            .map(|o| o.is_settled())
            .unwrap_or(false);
        if !settled {
            return Err(AppError::business(format!(
                "还款未成交: loan_id={}, seq={}",
                loan_id, installment.seq
            )));
        }

        installment.status = InstallmentStatus::Paid.get_code();
        installment.paid_at = Some(DateTime::now());
        installment.transfer_record_id = transfer.id;
        installment.update_time = Some(DateTime::now());
        self.store.update_installment(&installment).await?;

        let all_paid = self
            .store
            .installments_by_loan(loan_id)
            .await?
            .iter()
            .all(|i| i.status == InstallmentStatus::Paid.get_code());
        if all_paid {
            let mut loan = self.loan_by_id(loan_id).await?;
            loan.status = LoanStatus::Completed.get_code();
            loan.closed_at = Some(DateTime::now());
            loan.update_time = Some(DateTime::now());
            self.store.update_loan(&loan).await?;
            info!("🎉 贷款结清: loan_id={}", loan_id);
        } else {
            info!(
                "还款入账: loan_id={}, seq={}, amount={} SOL",
                loan_id, installment.seq, installment.amount_sol
            );
        }

        Ok(RepaymentOutcome {
            installment,
            transfer,
            loan_completed: all_paid,
        })
    }

    /// 放款成交后的激活: 记录放款时间并生成还款计划表
    ///
    /// 计划表已存在时跳过生成, 放款重入不会产生重复分期
    pub(crate) async fn activate(&self, loan_id: i64) -> AppResult<()> {
        let mut loan = self.loan_by_id(loan_id).await?;
        if loan.status == LoanStatus::Active.get_code() {
            return Ok(());
        }

        let existing = self.store.installments_by_loan(loan_id).await?;
        if existing.is_empty() {
            let rows = build_schedule(&loan)?;
            self.store.insert_installments(&rows).await?;
            info!(
                "还款计划生成: loan_id={}, {} 期, 每期 {} SOL",
                loan_id, loan.term_months, loan.monthly_payment_sol
            );
        }

        loan.status = LoanStatus::Active.get_code();
        loan.disbursed_at = Some(DateTime::now());
        loan.update_time = Some(DateTime::now());
        self.store.update_loan(&loan).await
    }

    /// 放款失败回退到满额, 资金未出, 允许重试
    pub(crate) async fn revert_disbursing(&self, loan_id: i64, reason: &str) -> AppResult<()> {
        error!("⚠️ 放款失败, 回退到满额状态: loan_id={}, reason={}", loan_id, reason);
        let mut loan = self.loan_by_id(loan_id).await?;
        loan.status = LoanStatus::FullyFunded.get_code();
        loan.update_time = Some(DateTime::now());
        self.store.update_loan(&loan).await
    }

    /// 逾期巡检: 到期未还的分期标记为逾期, 按策略判定是否违约
    pub async fn mark_overdue(&self) -> AppResult<OverdueSummary> {
        let now = DateTime::now();
        let due = self.store.installments_due_before(&now).await?;
        let mut summary = OverdueSummary::default();

        for mut installment in due {
            let loan = self.loan_by_id(installment.loan_id).await?;
            if self.policy.should_default(&loan, &installment) {
                installment.status = InstallmentStatus::Missed.get_code();
                installment.update_time = Some(DateTime::now());
                self.store.update_installment(&installment).await?;

                let mut loan = loan;
                loan.status = LoanStatus::Defaulted.get_code();
                loan.closed_at = Some(DateTime::now());
                loan.update_time = Some(DateTime::now());
                self.store.update_loan(&loan).await?;
                warn!(
                    "⚠️ 贷款违约: loan_id={}, seq={}",
                    installment.loan_id, installment.seq
                );
                summary.defaulted += 1;
            } else {
                installment.status = InstallmentStatus::Late.get_code();
                installment.update_time = Some(DateTime::now());
                self.store.update_installment(&installment).await?;
                warn!(
                    "分期逾期: loan_id={}, seq={}, due={}",
                    installment.loan_id, installment.seq, installment.due_date
                );
                summary.marked_late += 1;
            }
        }
        Ok(summary)
    }
}

/// 从放款时刻起按月生成计划表, 期号从 1 开始
fn build_schedule(loan: &AppLoanRequest) -> AppResult<Vec<AppRepaymentInstallment>> {
    let loan_id = loan
        .id
        .ok_or_else(|| AppError::internal("贷款缺少 id, 无法生成计划表"))?;
    let start_ms = DateTime::now().unix_timestamp_millis();
    let start = Utc
        .timestamp_millis_opt(start_ms)
        .single()
        .ok_or_else(|| AppError::internal(format!("放款时间戳非法: {}", start_ms)))?;

    let months = loan.term_months.max(0) as u32;
    let mut rows = Vec::with_capacity(months as usize);
    for seq in 1..=months {
        let due = start
            .checked_add_months(Months::new(seq))
            .ok_or_else(|| AppError::internal(format!("到期日计算溢出: seq={}", seq)))?;
        rows.push(AppRepaymentInstallment {
            id: Some(generate_id()),
            loan_id,
            seq: seq as i32,
            due_date: DateTime::from_timestamp_millis(due.timestamp_millis()),
            amount_sol: loan.monthly_payment_sol,
            status: InstallmentStatus::Pending.get_code(),
            paid_at: None,
            transfer_record_id: None,
            create_time: Some(DateTime::now()),
            update_time: None,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem::MemSettlementStore;
    use crate::testkit::MockLedger;
    use common::enums::{RiskScore, TransferOutcome};
    use std::str::FromStr;

    fn fast_conf() -> PlatformConfig {
        PlatformConfig {
            confirm_poll_interval_ms: 1,
            ..PlatformConfig::default()
        }
    }

    fn service(
        store: Arc<MemSettlementStore>,
        ledger: Arc<MockLedger>,
    ) -> LoanService {
        let conf = fast_conf();
        let custodial = Arc::new(CustodialManager::start(ledger, store.clone(), conf.clone()));
        LoanService::new(store, custodial, conf, Arc::new(NoAutoDefault))
    }

    async fn funded_loan(svc: &LoanService, store: &MemSettlementStore, principal: &str) -> i64 {
        let loan = svc
            .create(
                "borrower",
                Decimal::from_str(principal).unwrap(),
                Decimal::from(10),
                3,
                None,
            )
            .await
            .unwrap();
        let loan_id = loan.id.unwrap();
        let mut loan = store.loan_by_id(loan_id).await.unwrap().unwrap();
        loan.funded_sol = loan.principal_sol;
        loan.status = LoanStatus::FullyFunded.get_code();
        store.update_loan(&loan).await.unwrap();
        loan_id
    }

    #[tokio::test]
    async fn test_create_assigns_number_and_pricing() {
        let store = Arc::new(MemSettlementStore::new());
        let svc = service(store.clone(), Arc::new(MockLedger::devnet()));

        let loan = svc
            .create("borrower", Decimal::from(500), Decimal::from(10), 12, None)
            .await
            .unwrap();
        assert!(loan.loan_number.as_deref().unwrap().starts_with("LN-"));
        assert_eq!(loan.status, LoanStatus::Requested.get_code());
        assert_eq!(loan.risk_score, RiskScore::Medium.get_code());
        assert_eq!(loan.monthly_payment_sol.round_dp(2), Decimal::from_str("43.96").unwrap());
        assert!(loan.total_interest_sol > Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_create_rejects_dust_principal() {
        let store = Arc::new(MemSettlementStore::new());
        let svc = service(store, Arc::new(MockLedger::devnet()));

        // 0.0001 SOL = 100_000 lamports, 低于下限
        let err = svc
            .create(
                "borrower",
                Decimal::from_str("0.0001").unwrap(),
                Decimal::from(10),
                12,
                None,
            )
            .await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_disburse_activates_and_builds_schedule() {
        let store = Arc::new(MemSettlementStore::new());
        let svc = service(store.clone(), Arc::new(MockLedger::devnet()));
        let loan_id = funded_loan(&svc, &store, "100").await;

        let record = svc.disburse(loan_id).await.unwrap();
        assert_eq!(record.outcome, TransferOutcome::Confirmed.get_code());

        let loan = store.loan_by_id(loan_id).await.unwrap().unwrap();
        assert_eq!(loan.status, LoanStatus::Active.get_code());
        assert!(loan.disbursed_at.is_some());

        let schedule = store.installments_by_loan(loan_id).await.unwrap();
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule[0].seq, 1);
        assert!(schedule[0].due_date < schedule[2].due_date);
    }

    #[tokio::test]
    async fn test_disburse_requires_full_funding() {
        let store = Arc::new(MemSettlementStore::new());
        let svc = service(store.clone(), Arc::new(MockLedger::devnet()));
        let loan = svc
            .create("borrower", Decimal::from(100), Decimal::from(10), 3, None)
            .await
            .unwrap();

        let err = svc.disburse(loan.id.unwrap()).await;
        assert!(matches!(err, Err(AppError::Business(_))));
    }

    #[tokio::test]
    async fn test_disburse_failure_reverts_then_retry_succeeds() {
        let store = Arc::new(MemSettlementStore::new());
        let ledger = Arc::new(MockLedger::devnet());
        // 首次放款三连失败耗尽重试预算
        for _ in 0..3 {
            ledger.script_submit(Err(AppError::LedgerUnavailable("rpc down".to_string())));
        }
        let svc = service(store.clone(), ledger);
        let loan_id = funded_loan(&svc, &store, "100").await;

        let err = svc.disburse(loan_id).await;
        assert!(matches!(err, Err(AppError::LedgerUnavailable(_))));
        let loan = store.loan_by_id(loan_id).await.unwrap().unwrap();
        assert_eq!(loan.status, LoanStatus::FullyFunded.get_code());
        assert!(store.installments_by_loan(loan_id).await.unwrap().is_empty());

        // 重试成功, 激活一次, 计划表只生成一份
        svc.disburse(loan_id).await.unwrap();
        let loan = store.loan_by_id(loan_id).await.unwrap().unwrap();
        assert_eq!(loan.status, LoanStatus::Active.get_code());
        assert_eq!(store.installments_by_loan(loan_id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_repay_in_sequence_until_completed() {
        let store = Arc::new(MemSettlementStore::new());
        let svc = service(store.clone(), Arc::new(MockLedger::devnet()));
        let loan_id = funded_loan(&svc, &store, "100").await;
        svc.disburse(loan_id).await.unwrap();

        let first = svc.repay(loan_id).await.unwrap();
        assert_eq!(first.installment.seq, 1);
        assert!(!first.loan_completed);
        assert_eq!(first.transfer.outcome, TransferOutcome::Simulated.get_code());

        let second = svc.repay(loan_id).await.unwrap();
        assert_eq!(second.installment.seq, 2);

        let last = svc.repay(loan_id).await.unwrap();
        assert_eq!(last.installment.seq, 3);
        assert!(last.loan_completed);

        let loan = store.loan_by_id(loan_id).await.unwrap().unwrap();
        assert_eq!(loan.status, LoanStatus::Completed.get_code());
        assert!(loan.closed_at.is_some());

        // 结清后不再接受还款
        let extra = svc.repay(loan_id).await;
        assert!(matches!(extra, Err(AppError::Business(_))));
    }

    #[tokio::test]
    async fn test_repay_requires_active() {
        let store = Arc::new(MemSettlementStore::new());
        let svc = service(store.clone(), Arc::new(MockLedger::devnet()));
        let loan = svc
            .create("borrower", Decimal::from(100), Decimal::from(10), 3, None)
            .await
            .unwrap();

        let err = svc.repay(loan.id.unwrap()).await;
        assert!(matches!(err, Err(AppError::Business(_))));
    }

    #[tokio::test]
    async fn test_mark_overdue_flags_late_but_no_default() {
        let store = Arc::new(MemSettlementStore::new());
        let svc = service(store.clone(), Arc::new(MockLedger::devnet()));
        let loan_id = funded_loan(&svc, &store, "100").await;
        svc.disburse(loan_id).await.unwrap();

        // 把第一期到期日拨回过去
        let mut rows = store.installments_by_loan(loan_id).await.unwrap();
        rows[0].due_date = DateTime::from_timestamp_millis(
            DateTime::now().unix_timestamp_millis() - 86_400_000,
        );
        store.update_installment(&rows[0]).await.unwrap();

        let summary = svc.mark_overdue().await.unwrap();
        assert_eq!(summary.marked_late, 1);
        assert_eq!(summary.defaulted, 0);

        let rows = store.installments_by_loan(loan_id).await.unwrap();
        assert_eq!(rows[0].status, InstallmentStatus::Late.get_code());
        let loan = store.loan_by_id(loan_id).await.unwrap().unwrap();
        assert_eq!(loan.status, LoanStatus::Active.get_code());

        // 逾期分期仍可还
        let outcome = svc.repay(loan_id).await.unwrap();
        assert_eq!(outcome.installment.seq, 1);
    }

    #[tokio::test]
    async fn test_policy_default_closes_loan() {
        struct AlwaysDefault;
        impl DelinquencyPolicy for AlwaysDefault {
            fn should_default(
                &self,
                _loan: &AppLoanRequest,
                _installment: &AppRepaymentInstallment,
            ) -> bool {
                true
            }
        }

        let store = Arc::new(MemSettlementStore::new());
        let conf = fast_conf();
        let custodial = Arc::new(CustodialManager::start(
            Arc::new(MockLedger::devnet()),
            store.clone(),
            conf.clone(),
        ));
        let svc = LoanService::new(store.clone(), custodial, conf, Arc::new(AlwaysDefault));
        let loan_id = funded_loan(&svc, &store, "100").await;
        svc.disburse(loan_id).await.unwrap();

        let mut rows = store.installments_by_loan(loan_id).await.unwrap();
        rows[0].due_date = DateTime::from_timestamp_millis(
            DateTime::now().unix_timestamp_millis() - 86_400_000,
        );
        store.update_installment(&rows[0]).await.unwrap();

        let summary = svc.mark_overdue().await.unwrap();
        assert_eq!(summary.defaulted, 1);

        let rows = store.installments_by_loan(loan_id).await.unwrap();
        assert_eq!(rows[0].status, InstallmentStatus::Missed.get_code());
        let loan = store.loan_by_id(loan_id).await.unwrap().unwrap();
        assert_eq!(loan.status, LoanStatus::Defaulted.get_code());
        assert!(loan.closed_at.is_some());
    }
}
