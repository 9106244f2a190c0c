pub mod installment_status;
pub mod loan_status;
pub mod risk_score;
pub mod transfer;

pub use installment_status::InstallmentStatus;
pub use loan_status::LoanStatus;
pub use risk_score::RiskScore;
pub use transfer::{TransferDirection, TransferOutcome};
