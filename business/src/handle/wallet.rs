use actix_web::{get, post, web, Responder};
use block_common::lamports_to_sol;
use common::constants::idempotency;
use common::enums::TransferDirection;
use common::models::{AirdropReq, BalanceDto, HistoryItemDto, HistoryQuery};
use common::response::R;
use common::AppError;
use settlement::TransferRequest;

use super::transfer_dto;
use crate::state::AppState;

/// GET /api/wallet/platform
/// 托管账户余额与网络信息, 余额以链上为准
#[get("/api/wallet/platform")]
pub async fn platform(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let address = state.custodial.platform_address();
    let lamports = state.custodial.platform_balance_lamports().await?;
    R::success(BalanceDto {
        address,
        lamports,
        sol: lamports_to_sol(lamports),
        network: state.custodial.network(),
    })
}

/// GET /api/wallet/balance/{address}
#[get("/api/wallet/balance/{address}")]
pub async fn balance(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let address = path.into_inner();
    let lamports = state.custodial.balance_lamports(&address).await?;
    R::success(BalanceDto {
        address,
        lamports,
        sol: lamports_to_sol(lamports),
        network: state.custodial.network(),
    })
}

/// GET /api/wallet/history/{address}?limit=10
#[get("/api/wallet/history/{address}")]
pub async fn history(
    path: web::Path<String>,
    query: web::Query<HistoryQuery>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let address = path.into_inner();
    let limit = query.limit.unwrap_or(10);
    let items = state.custodial.history(&address, limit).await?;
    let rows: Vec<HistoryItemDto> = items
        .into_iter()
        .map(|tx| HistoryItemDto {
            explorer_url: state.custodial.explorer_url(&tx.signature),
            signature: tx.signature,
            slot: tx.slot,
            block_time: tx.block_time,
            failed: tx.failed,
            memo: tx.memo,
        })
        .collect();
    R::success(rows)
}

/// POST /api/wallet/airdrop
/// 测试网领水, 主网直接拒绝
#[post("/api/wallet/airdrop")]
pub async fn airdrop(
    req: web::Json<AirdropReq>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let req = req.into_inner();
    log::info!("领水请求: address={}, amount={} SOL", req.address, req.amount_sol);
    let record = state
        .custodial
        .execute(TransferRequest {
            idempotency_key: format!(
                "{}{}:{}",
                idempotency::AIRDROP_PREFIX,
                req.address,
                uuid::Uuid::new_v4()
            ),
            direction: TransferDirection::TestFunding,
            counterparty: req.address,
            amount_sol: req.amount_sol,
            loan_id: None,
            installment_seq: None,
        })
        .await?;
    R::success(transfer_dto(&record, &state.custodial))
}
