pub mod advisor_req;
pub mod loan_req;
pub mod wallet_req;
