pub mod advisor;
pub mod common;
pub mod loan;
pub mod wallet;

use chrono::{TimeZone, Utc};
use common::models::{InstallmentDto, LoanDetailDto, TransferRecordDto};
use common::{AppError, AppResult};
use orm::entities::{AppLoanRequest, AppRepaymentInstallment, AppTransferRecord};
use settlement::CustodialManager;

fn to_utc(ts: &rbatis::rbdc::datetime::DateTime) -> chrono::DateTime<Utc> {
    Utc.timestamp_millis_opt(ts.unix_timestamp_millis())
        .single()
        .unwrap_or_default()
}

fn installment_dto(row: &AppRepaymentInstallment) -> InstallmentDto {
    InstallmentDto {
        seq: row.seq,
        due_date: to_utc(&row.due_date),
        amount_sol: row.amount_sol,
        status: row.status,
        status_desc: row
            .status_enum()
            .map(|s| s.description())
            .unwrap_or_else(|| "未知".to_string()),
        paid_at: row.paid_at.as_ref().map(to_utc),
    }
}

fn loan_dto(
    loan: &AppLoanRequest,
    installments: &[AppRepaymentInstallment],
) -> AppResult<LoanDetailDto> {
    let id = loan
        .id
        .ok_or_else(|| AppError::internal("贷款记录缺少 id"))?;
    Ok(LoanDetailDto {
        id,
        loan_number: loan.loan_number.clone().unwrap_or_default(),
        borrower_address: loan.borrower_address.clone(),
        principal_sol: loan.principal_sol,
        annual_rate_pct: loan.annual_rate_pct,
        term_months: loan.term_months.max(0) as u32,
        purpose: loan.purpose.clone(),
        status: loan.status,
        status_desc: loan
            .status_enum()
            .map(|s| s.description())
            .unwrap_or_else(|| "未知".to_string()),
        risk_score: loan.risk_score,
        risk_desc: loan
            .risk_enum()
            .map(|r| r.description())
            .unwrap_or_else(|| "未知".to_string()),
        funded_sol: loan.funded_sol,
        monthly_payment_sol: loan.monthly_payment_sol,
        total_interest_sol: loan.total_interest_sol,
        created_at: loan
            .create_time
            .as_ref()
            .map(to_utc)
            .unwrap_or_default(),
        installments: installments.iter().map(installment_dto).collect(),
    })
}

fn transfer_dto(record: &AppTransferRecord, custodial: &CustodialManager) -> TransferRecordDto {
    TransferRecordDto {
        id: record.id.unwrap_or_default(),
        idempotency_key: record.idempotency_key.clone(),
        direction: record.direction,
        direction_desc: record
            .direction_enum()
            .map(|d| d.description())
            .unwrap_or_else(|| "未知".to_string()),
        from_address: record.from_address.clone(),
        to_address: record.to_address.clone(),
        amount_sol: record.amount_sol,
        outcome: record.outcome,
        outcome_desc: record
            .outcome_enum()
            .map(|o| o.description())
            .unwrap_or_else(|| "未知".to_string()),
        signature: record.signature.clone(),
        explorer_url: record
            .signature
            .as_ref()
            .map(|sig| custodial.explorer_url(sig)),
        created_at: record
            .create_time
            .as_ref()
            .map(to_utc)
            .unwrap_or_default(),
    }
}
