use std::collections::HashMap;
use std::sync::Arc;

use common::enums::LoanStatus;
use common::utils::snowflake::generate_id;
use common::{AppError, AppResult};
use log::{error, info};
use orm::entities::AppFundingContribution;
use rbatis::rbdc::datetime::DateTime;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::events::{LoanEvent, LoanEventSender};
use crate::store::SettlementStore;

/// 出资结果
#[derive(Debug, Clone)]
pub struct ContributionOutcome {
    pub contribution: AppFundingContribution,
    /// 本次出资后的累计金额 (SOL)
    pub funded_sol: Decimal,
    pub fully_funded: bool,
}

/// 出资归集器
///
/// 额度判定和 funded_sol 写入在同一个临界区内完成, 锁粒度为单笔贷款,
/// 不同贷款的出资互不阻塞
pub struct FundingAggregator {
    store: Arc<dyn SettlementStore>,
    events: LoanEventSender,
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl FundingAggregator {
    pub fn new(store: Arc<dyn SettlementStore>, events: LoanEventSender) -> Self {
        Self {
            store,
            events,
            locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_for(&self, loan_id: i64) -> Arc<Mutex<()>> {
        let mut map = self.locks.lock().await;
        map.entry(loan_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 记录一笔出资
    ///
    /// 超出剩余额度整笔拒绝, 不做部分成交; 恰好补满时发出满额事件
    pub async fn contribute(
        &self,
        loan_id: i64,
        lender_address: &str,
        amount_sol: Decimal,
    ) -> AppResult<ContributionOutcome> {
        if amount_sol <= Decimal::ZERO {
            return Err(AppError::validation(format!(
                "出资金额必须大于 0: {}",
                amount_sol
            )));
        }
        if lender_address.is_empty() {
            return Err(AppError::validation("出资人地址不能为空"));
        }

        let lock = self.lock_for(loan_id).await;
        let _guard = lock.lock().await;

        let mut loan = self
            .store
            .loan_by_id(loan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("贷款不存在: {}", loan_id)))?;

        let status = loan
            .status_enum()
            .ok_or_else(|| AppError::internal(format!("贷款状态码非法: {}", loan.status)))?;
        if !status.accepts_funding() {
            return Err(AppError::business(format!(
                "当前状态不接受出资: {}",
                status.description()
            )));
        }

        let new_funded = loan.funded_sol + amount_sol;
        if new_funded > loan.principal_sol {
            return Err(AppError::Overfund(format!(
                "剩余额度 {} SOL, 本次出资 {} SOL",
                loan.remaining_sol(),
                amount_sol
            )));
        }

        let contribution = AppFundingContribution {
            id: Some(generate_id()),
            loan_id,
            lender_address: lender_address.to_string(),
            amount_sol,
            create_time: Some(DateTime::now()),
        };
        self.store.insert_contribution(&contribution).await?;

        let fully_funded = new_funded == loan.principal_sol;
        loan.funded_sol = new_funded;
        loan.status = if fully_funded {
            LoanStatus::FullyFunded.get_code()
        } else {
            LoanStatus::PartiallyFunded.get_code()
        };
        loan.update_time = Some(DateTime::now());
        self.store.update_loan(&loan).await?;

        if fully_funded {
            info!(
                "💰 贷款满额: loan_id={}, principal={} SOL",
                loan_id, loan.principal_sol
            );
            if let Err(e) = self.events.send(LoanEvent::FullyFunded { loan_id }) {
                error!("满额事件投递失败: loan_id={}, err={}", loan_id, e);
            }
        }

        Ok(ContributionOutcome {
            contribution,
            funded_sol: new_funded,
            fully_funded,
        })
    }
}
