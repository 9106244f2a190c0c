pub mod dto;
pub mod req;

pub use dto::advisor::AssessmentDto;
pub use dto::loan::{ContributeResultDto, InstallmentDto, LoanCreatedDto, LoanDetailDto};
pub use dto::wallet::{BalanceDto, HistoryItemDto, TransferRecordDto};
pub use req::advisor_req::AssessReq;
pub use req::loan_req::{ContributeReq, CreateLoanReq, RepayReq};
pub use req::wallet_req::{AirdropReq, HistoryQuery};
