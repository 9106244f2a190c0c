pub mod advisor;
pub mod loan;
pub mod wallet;
