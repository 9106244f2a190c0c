// Solana 账本客户端
// 托管账户的链上读写都走这里

pub mod client;

pub use client::SolLedgerClient;
