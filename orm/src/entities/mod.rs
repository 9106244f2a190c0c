pub mod loan;
pub mod settlement;

// Re-export all entities
pub use loan::*;
pub use settlement::*;
