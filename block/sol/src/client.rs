use std::str::FromStr;

use async_trait::async_trait;
use block_common::{LedgerClient, LedgerTxSummary, TxConfirmState};
use common::config::SolanaConfig;
use common::constants::networks;
use common::{AppError, AppResult};
use log::{info, warn};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_sdk::bs58;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::system_instruction;
use solana_sdk::transaction::Transaction;

/// Solana 账本客户端
///
/// 持有平台托管账户密钥, 所有转出交易由它签名
pub struct SolLedgerClient {
    rpc: RpcClient,
    platform: Keypair,
    network: String,
}

fn parse_pubkey(address: &str) -> AppResult<Pubkey> {
    Pubkey::from_str(address).map_err(|_| AppError::validation(format!("地址无效: {}", address)))
}

fn parse_signature(signature: &str) -> AppResult<Signature> {
    Signature::from_str(signature)
        .map_err(|_| AppError::validation(format!("签名无效: {}", signature)))
}

fn rpc_err(err: solana_client::client_error::ClientError) -> AppError {
    AppError::LedgerUnavailable(err.to_string())
}

impl SolLedgerClient {
    pub fn new(conf: &SolanaConfig) -> AppResult<Self> {
        let endpoint = conf.endpoint();
        let rpc = RpcClient::new_with_commitment(endpoint.clone(), CommitmentConfig::confirmed());

        let platform = match conf.platform_secret.as_deref() {
            Some(secret) if !secret.is_empty() => {
                let bytes = bs58::decode(secret)
                    .into_vec()
                    .map_err(|e| AppError::Config(format!("平台私钥解码失败: {}", e)))?;
                Keypair::from_bytes(&bytes)
                    .map_err(|e| AppError::Config(format!("平台私钥无效: {}", e)))?
            }
            _ => {
                // 未配置私钥时生成临时账户, 仅限演示环境
                warn!("⚠️ 未配置平台私钥, 使用临时生成的托管账户");
                Keypair::new()
            }
        };

        info!(
            "🔗 Solana 客户端就绪: network={}, endpoint={}, platform={}",
            conf.network,
            endpoint,
            platform.pubkey()
        );

        Ok(Self {
            rpc,
            platform,
            network: conf.network.clone(),
        })
    }
}

#[async_trait]
impl LedgerClient for SolLedgerClient {
    fn platform_address(&self) -> String {
        self.platform.pubkey().to_string()
    }

    fn network(&self) -> &str {
        &self.network
    }

    fn explorer_url(&self, signature: &str) -> String {
        if self.network == networks::MAINNET {
            format!("https://explorer.solana.com/tx/{}", signature)
        } else {
            format!(
                "https://explorer.solana.com/tx/{}?cluster={}",
                signature, self.network
            )
        }
    }

    async fn balance_lamports(&self, address: &str) -> AppResult<u64> {
        let pubkey = parse_pubkey(address)?;
        self.rpc.get_balance(&pubkey).await.map_err(rpc_err)
    }

    async fn transfer_from_platform(&self, to: &str, lamports: u64) -> AppResult<String> {
        let to_pubkey = parse_pubkey(to)?;
        let instruction =
            system_instruction::transfer(&self.platform.pubkey(), &to_pubkey, lamports);

        let blockhash = self.rpc.get_latest_blockhash().await.map_err(rpc_err)?;
        let tx = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.platform.pubkey()),
            &[&self.platform],
            blockhash,
        );

        let signature = self.rpc.send_transaction(&tx).await.map_err(rpc_err)?;
        Ok(signature.to_string())
    }

    async fn confirm(&self, signature: &str) -> AppResult<TxConfirmState> {
        let sig = parse_signature(signature)?;
        match self.rpc.get_signature_status(&sig).await.map_err(rpc_err)? {
            None => Ok(TxConfirmState::Pending),
            Some(Ok(())) => Ok(TxConfirmState::Confirmed),
            Some(Err(e)) => Ok(TxConfirmState::Failed(e.to_string())),
        }
    }

    async fn request_airdrop(&self, to: &str, lamports: u64) -> AppResult<String> {
        if self.network == networks::MAINNET {
            return Err(AppError::UnsupportedOnMain("领水仅限测试网".to_string()));
        }
        let pubkey = parse_pubkey(to)?;
        let signature = self
            .rpc
            .request_airdrop(&pubkey, lamports)
            .await
            .map_err(rpc_err)?;
        Ok(signature.to_string())
    }

    async fn history(&self, address: &str, limit: usize) -> AppResult<Vec<LedgerTxSummary>> {
        let pubkey = parse_pubkey(address)?;
        let config = GetConfirmedSignaturesForAddress2Config {
            limit: Some(limit),
            ..Default::default()
        };
        let items = self
            .rpc
            .get_signatures_for_address_with_config(&pubkey, config)
            .await
            .map_err(rpc_err)?;

        Ok(items
            .into_iter()
            .map(|s| LedgerTxSummary {
                signature: s.signature,
                slot: s.slot,
                block_time: s.block_time,
                failed: s.err.is_some(),
                memo: s.memo,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn devnet_conf() -> SolanaConfig {
        SolanaConfig {
            network: "devnet".to_string(),
            rpc_url: None,
            platform_secret: None,
        }
    }

    #[test]
    fn test_explorer_url_carries_cluster_off_main() {
        let client = SolLedgerClient::new(&devnet_conf()).unwrap();
        let url = client.explorer_url("abc");
        assert_eq!(url, "https://explorer.solana.com/tx/abc?cluster=devnet");
    }

    #[test]
    fn test_ephemeral_platform_keypair_when_secret_absent() {
        let a = SolLedgerClient::new(&devnet_conf()).unwrap();
        let b = SolLedgerClient::new(&devnet_conf()).unwrap();
        assert_ne!(a.platform_address(), b.platform_address());
    }

    #[tokio::test]
    async fn test_airdrop_rejected_on_main_network() {
        let conf = SolanaConfig {
            network: "mainnet-beta".to_string(),
            rpc_url: None,
            platform_secret: None,
        };
        let client = SolLedgerClient::new(&conf).unwrap();
        let err = client.request_airdrop("11111111111111111111111111111111", 1).await;
        assert!(matches!(err, Err(AppError::UnsupportedOnMain(_))));
    }
}
