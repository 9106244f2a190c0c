use async_trait::async_trait;
use common::AppResult;
use orm::entities::{
    AppFundingContribution, AppLoanRequest, AppRepaymentInstallment, AppTransferRecord,
};
use rbatis::rbdc::datetime::DateTime;
use rbatis::RBatis;

use super::SettlementStore;

/// rbatis + MySQL 实现
#[derive(Clone)]
pub struct DbSettlementStore {
    rb: RBatis,
}

impl DbSettlementStore {
    pub fn new(rb: RBatis) -> Self {
        Self { rb }
    }
}

#[async_trait]
impl SettlementStore for DbSettlementStore {
    async fn insert_loan(&self, loan: &AppLoanRequest) -> AppResult<()> {
        AppLoanRequest::insert(&self.rb, loan).await?;
        Ok(())
    }

    async fn update_loan(&self, loan: &AppLoanRequest) -> AppResult<()> {
        AppLoanRequest::update_by_column(&self.rb, loan, "id").await?;
        Ok(())
    }

    async fn loan_by_id(&self, id: i64) -> AppResult<Option<AppLoanRequest>> {
        Ok(AppLoanRequest::select_by_id(&self.rb, id).await?)
    }

    async fn open_loans(&self) -> AppResult<Vec<AppLoanRequest>> {
        Ok(AppLoanRequest::select_open(&self.rb).await?)
    }

    async fn insert_contribution(&self, row: &AppFundingContribution) -> AppResult<()> {
        AppFundingContribution::insert(&self.rb, row).await?;
        Ok(())
    }

    async fn contributions_by_loan(&self, loan_id: i64) -> AppResult<Vec<AppFundingContribution>> {
        Ok(AppFundingContribution::select_by_loan_id(&self.rb, loan_id).await?)
    }

    async fn insert_installments(&self, rows: &[AppRepaymentInstallment]) -> AppResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        AppRepaymentInstallment::insert_batch(&self.rb, rows, rows.len() as u64).await?;
        Ok(())
    }

    async fn installments_by_loan(
        &self,
        loan_id: i64,
    ) -> AppResult<Vec<AppRepaymentInstallment>> {
        Ok(AppRepaymentInstallment::select_by_loan_id(&self.rb, loan_id).await?)
    }

    async fn next_payable_installment(
        &self,
        loan_id: i64,
    ) -> AppResult<Option<AppRepaymentInstallment>> {
        Ok(AppRepaymentInstallment::select_next_payable(&self.rb, loan_id).await?)
    }

    async fn update_installment(&self, row: &AppRepaymentInstallment) -> AppResult<()> {
        AppRepaymentInstallment::update_by_column(&self.rb, row, "id").await?;
        Ok(())
    }

    async fn installments_due_before(
        &self,
        cutoff: &DateTime,
    ) -> AppResult<Vec<AppRepaymentInstallment>> {
        Ok(AppRepaymentInstallment::select_due_before(&self.rb, cutoff).await?)
    }

    async fn insert_transfer(&self, row: &AppTransferRecord) -> AppResult<()> {
        AppTransferRecord::insert(&self.rb, row).await?;
        Ok(())
    }

    async fn update_transfer(&self, row: &AppTransferRecord) -> AppResult<()> {
        AppTransferRecord::update_by_column(&self.rb, row, "id").await?;
        Ok(())
    }

    async fn transfer_by_key(&self, key: &str) -> AppResult<Option<AppTransferRecord>> {
        Ok(AppTransferRecord::select_by_idempotency_key(&self.rb, key).await?)
    }

    async fn transfers_by_loan(&self, loan_id: i64) -> AppResult<Vec<AppTransferRecord>> {
        Ok(AppTransferRecord::select_by_loan_id(&self.rb, loan_id).await?)
    }

    async fn pending_transfers_before(
        &self,
        cutoff: &DateTime,
    ) -> AppResult<Vec<AppTransferRecord>> {
        Ok(AppTransferRecord::select_pending_before(&self.rb, cutoff).await?)
    }
}
