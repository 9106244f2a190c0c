// 结算引擎
// 分期计算, 出资归集, 贷款状态机, 托管转账与后台对账

pub mod amortization;
pub mod custodial;
pub mod events;
pub mod funding;
pub mod loan;
pub mod store;
pub mod sweep;

#[cfg(test)]
pub(crate) mod testkit;

pub use custodial::{CustodialManager, TransferRequest};
pub use events::{loan_event_channel, LoanEvent, LoanEventReceiver, LoanEventSender};
pub use funding::{ContributionOutcome, FundingAggregator};
pub use loan::{DelinquencyPolicy, LoanService, NoAutoDefault, OverdueSummary, RepaymentOutcome};
pub use store::{DbSettlementStore, SettlementStore};
pub use sweep::{ConfirmationSweep, SweepSummary};
