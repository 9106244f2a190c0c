pub mod serial;
pub mod snowflake;

pub use serial::loan_number_for_id;
pub use snowflake::{generate_id, generate_id_string};
