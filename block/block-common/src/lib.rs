// 链层公共抽象
// 账本客户端 trait 与链无关的类型定义

pub mod ledger;
pub mod types;

pub use ledger::LedgerClient;
pub use types::{lamports_to_sol, sol_to_lamports, LedgerTxSummary, TxConfirmState, LAMPORTS_PER_SOL};
