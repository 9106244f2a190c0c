use std::sync::Arc;

use settlement::{CustodialManager, FundingAggregator, LoanService};

use crate::service::advisor_service::AdvisorService;

#[derive(Clone)]
pub struct AppState {
    pub loans: Arc<LoanService>,
    pub funding: Arc<FundingAggregator>,
    pub custodial: Arc<CustodialManager>,
    pub advisor: Arc<AdvisorService>,
}
