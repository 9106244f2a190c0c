use async_trait::async_trait;
use common::AppResult;
use orm::entities::{
    AppFundingContribution, AppLoanRequest, AppRepaymentInstallment, AppTransferRecord,
};
use rbatis::rbdc::datetime::DateTime;

pub mod db;
#[cfg(test)]
pub mod mem;

pub use db::DbSettlementStore;

/// 结算持久层抽象
///
/// 生产环境走 rbatis + MySQL, 测试用内存实现跑并发与重试场景.
/// 所有记录的 id 由调用方用雪花算法预先分配
#[async_trait]
pub trait SettlementStore: Send + Sync {
    async fn insert_loan(&self, loan: &AppLoanRequest) -> AppResult<()>;
    async fn update_loan(&self, loan: &AppLoanRequest) -> AppResult<()>;
    async fn loan_by_id(&self, id: i64) -> AppResult<Option<AppLoanRequest>>;
    /// 尚在募集中的贷款 (Requested/PartiallyFunded)
    async fn open_loans(&self) -> AppResult<Vec<AppLoanRequest>>;

    async fn insert_contribution(&self, row: &AppFundingContribution) -> AppResult<()>;
    async fn contributions_by_loan(&self, loan_id: i64) -> AppResult<Vec<AppFundingContribution>>;

    async fn insert_installments(&self, rows: &[AppRepaymentInstallment]) -> AppResult<()>;
    async fn installments_by_loan(&self, loan_id: i64)
        -> AppResult<Vec<AppRepaymentInstallment>>;
    /// 最早一期仍可核销的分期 (Pending/Late), 按期号升序
    async fn next_payable_installment(
        &self,
        loan_id: i64,
    ) -> AppResult<Option<AppRepaymentInstallment>>;
    async fn update_installment(&self, row: &AppRepaymentInstallment) -> AppResult<()>;
    /// 到期未还的分期 (status = Pending 且 due_date < cutoff)
    async fn installments_due_before(
        &self,
        cutoff: &DateTime,
    ) -> AppResult<Vec<AppRepaymentInstallment>>;

    async fn insert_transfer(&self, row: &AppTransferRecord) -> AppResult<()>;
    async fn update_transfer(&self, row: &AppTransferRecord) -> AppResult<()>;
    async fn transfer_by_key(&self, key: &str) -> AppResult<Option<AppTransferRecord>>;
    async fn transfers_by_loan(&self, loan_id: i64) -> AppResult<Vec<AppTransferRecord>>;
    /// 创建时间早于 cutoff 且仍为 Pending 的转账, 交给对账任务收敛
    async fn pending_transfers_before(
        &self,
        cutoff: &DateTime,
    ) -> AppResult<Vec<AppTransferRecord>>;
}
