use std::sync::Mutex;

use async_trait::async_trait;
use common::enums::{InstallmentStatus, TransferOutcome};
use common::{AppError, AppResult};
use orm::entities::{
    AppFundingContribution, AppLoanRequest, AppRepaymentInstallment, AppTransferRecord,
};
use rbatis::rbdc::datetime::DateTime;

use super::SettlementStore;

/// 测试用内存实现, 语义与 DbSettlementStore 对齐
#[derive(Default)]
pub struct MemSettlementStore {
    inner: Mutex<State>,
}

#[derive(Default)]
struct State {
    loans: Vec<AppLoanRequest>,
    contributions: Vec<AppFundingContribution>,
    installments: Vec<AppRepaymentInstallment>,
    transfers: Vec<AppTransferRecord>,
}

impl MemSettlementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettlementStore for MemSettlementStore {
    async fn insert_loan(&self, loan: &AppLoanRequest) -> AppResult<()> {
        self.inner.lock().unwrap().loans.push(loan.clone());
        Ok(())
    }

    async fn update_loan(&self, loan: &AppLoanRequest) -> AppResult<()> {
        let mut state = self.inner.lock().unwrap();
        let slot = state
            .loans
            .iter_mut()
            .find(|l| l.id == loan.id)
            .ok_or_else(|| AppError::not_found(format!("贷款不存在: {:?}", loan.id)))?;
        *slot = loan.clone();
        Ok(())
    }

    async fn loan_by_id(&self, id: i64) -> AppResult<Option<AppLoanRequest>> {
        let state = self.inner.lock().unwrap();
        Ok(state.loans.iter().find(|l| l.id == Some(id)).cloned())
    }

    async fn open_loans(&self) -> AppResult<Vec<AppLoanRequest>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .loans
            .iter()
            .filter(|l| l.status == 0 || l.status == 1)
            .cloned()
            .collect())
    }

    async fn insert_contribution(&self, row: &AppFundingContribution) -> AppResult<()> {
        self.inner.lock().unwrap().contributions.push(row.clone());
        Ok(())
    }

    async fn contributions_by_loan(&self, loan_id: i64) -> AppResult<Vec<AppFundingContribution>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .contributions
            .iter()
            .filter(|c| c.loan_id == loan_id)
            .cloned()
            .collect())
    }

    async fn insert_installments(&self, rows: &[AppRepaymentInstallment]) -> AppResult<()> {
        self.inner
            .lock()
            .unwrap()
            .installments
            .extend_from_slice(rows);
        Ok(())
    }

    async fn installments_by_loan(
        &self,
        loan_id: i64,
    ) -> AppResult<Vec<AppRepaymentInstallment>> {
        let state = self.inner.lock().unwrap();
        let mut rows: Vec<_> = state
            .installments
            .iter()
            .filter(|i| i.loan_id == loan_id)
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.seq);
        Ok(rows)
    }

    async fn next_payable_installment(
        &self,
        loan_id: i64,
    ) -> AppResult<Option<AppRepaymentInstallment>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .installments
            .iter()
            .filter(|i| {
                i.loan_id == loan_id
                    && i.status_enum().map(|s| s.is_payable()).unwrap_or(false)
            })
            .min_by_key(|i| i.seq)
            .cloned())
    }

    async fn update_installment(&self, row: &AppRepaymentInstallment) -> AppResult<()> {
        let mut state = self.inner.lock().unwrap();
        let slot = state
            .installments
            .iter_mut()
            .find(|i| i.id == row.id)
            .ok_or_else(|| AppError::not_found(format!("分期不存在: {:?}", row.id)))?;
        *slot = row.clone();
        Ok(())
    }

    async fn installments_due_before(
        &self,
        cutoff: &DateTime,
    ) -> AppResult<Vec<AppRepaymentInstallment>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .installments
            .iter()
            .filter(|i| {
                i.status == InstallmentStatus::Pending.get_code() && i.due_date < *cutoff
            })
            .cloned()
            .collect())
    }

    async fn insert_transfer(&self, row: &AppTransferRecord) -> AppResult<()> {
        self.inner.lock().unwrap().transfers.push(row.clone());
        Ok(())
    }

    async fn update_transfer(&self, row: &AppTransferRecord) -> AppResult<()> {
        let mut state = self.inner.lock().unwrap();
        let slot = state
            .transfers
            .iter_mut()
            .find(|t| t.id == row.id)
            .ok_or_else(|| AppError::not_found(format!("转账记录不存在: {:?}", row.id)))?;
        *slot = row.clone();
        Ok(())
    }

    async fn transfer_by_key(&self, key: &str) -> AppResult<Option<AppTransferRecord>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .transfers
            .iter()
            .find(|t| t.idempotency_key == key)
            .cloned())
    }

    async fn transfers_by_loan(&self, loan_id: i64) -> AppResult<Vec<AppTransferRecord>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .transfers
            .iter()
            .filter(|t| t.loan_id == Some(loan_id))
            .cloned()
            .collect())
    }

    async fn pending_transfers_before(
        &self,
        cutoff: &DateTime,
    ) -> AppResult<Vec<AppTransferRecord>> {
        let state = self.inner.lock().unwrap();
        Ok(state
            .transfers
            .iter()
            .filter(|t| {
                t.outcome == TransferOutcome::Pending.get_code()
                    && t.create_time.as_ref().map(|ts| *ts < *cutoff).unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}
