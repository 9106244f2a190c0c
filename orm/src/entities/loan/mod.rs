pub mod app_funding_contribution;
pub mod app_loan_request;
pub mod app_repayment_installment;

pub use app_funding_contribution::AppFundingContribution;
pub use app_loan_request::AppLoanRequest;
pub use app_repayment_installment::AppRepaymentInstallment;
