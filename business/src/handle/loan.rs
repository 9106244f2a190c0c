use actix_web::{get, post, web, Responder};
use common::models::{ContributeReq, ContributeResultDto, CreateLoanReq, LoanCreatedDto, RepayReq};
use common::response::R;
use common::AppError;

use super::{loan_dto, transfer_dto};
use crate::state::AppState;

/// POST /api/loan/create
#[post("/api/loan/create")]
pub async fn create(
    req: web::Json<CreateLoanReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let req = req.into_inner();
    let loan = state
        .loans
        .create(
            &req.borrower_address,
            req.principal_sol,
            req.annual_rate_pct,
            req.term_months,
            req.purpose,
        )
        .await?;

    R::success(LoanCreatedDto {
        id: loan.id.unwrap_or_default(),
        loan_number: loan.loan_number.clone().unwrap_or_default(),
        status: loan.status,
        status_desc: loan
            .status_enum()
            .map(|s| s.description())
            .unwrap_or_else(|| "未知".to_string()),
        monthly_payment_sol: loan.monthly_payment_sol,
        total_interest_sol: loan.total_interest_sol,
        risk_score: loan.risk_score,
        risk_desc: loan
            .risk_enum()
            .map(|r| r.description())
            .unwrap_or_else(|| "未知".to_string()),
    })
}

/// POST /api/loan/contribute
#[post("/api/loan/contribute")]
pub async fn contribute(
    req: web::Json<ContributeReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let req = req.into_inner();
    let outcome = state
        .funding
        .contribute(req.loan_id, &req.lender_address, req.amount_sol)
        .await?;

    R::success(ContributeResultDto {
        loan_id: req.loan_id,
        accepted_sol: outcome.contribution.amount_sol,
        funded_sol: outcome.funded_sol,
        fully_funded: outcome.fully_funded,
    })
}

/// GET /api/loan/list
/// 市场页信息流, 只返回仍可出资的申请, 不带分期明细
#[get("/api/loan/list")]
pub async fn list(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let loans = state.loans.list_open().await?;
    let rows = loans
        .iter()
        .map(|loan| loan_dto(loan, &[]))
        .collect::<Result<Vec<_>, _>>()?;
    R::success(rows)
}

/// GET /api/loan/{id}
#[get("/api/loan/{id}")]
pub async fn detail(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let loan_id = path.into_inner();
    let loan = state.loans.loan_by_id(loan_id).await?;
    let installments = state.loans.installments(loan_id).await?;
    R::success(loan_dto(&loan, &installments)?)
}

/// POST /api/loan/repay
/// 核销最早一期可还分期
#[post("/api/loan/repay")]
pub async fn repay(
    req: web::Json<RepayReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let outcome = state.loans.repay(req.loan_id).await?;
    R::success(transfer_dto(&outcome.transfer, &state.custodial))
}
