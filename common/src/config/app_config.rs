use config::{Config, ConfigError, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub solana: SolanaConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Solana 链配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolanaConfig {
    /// 网络: mainnet-beta / devnet / testnet
    pub network: String,
    /// RPC 端点, 为空时按网络名推导官方端点
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// 平台托管账户私钥 (base58), 生产环境只允许从环境变量注入
    #[serde(default)]
    pub platform_secret: Option<String>,
}

impl SolanaConfig {
    pub fn endpoint(&self) -> String {
        match &self.rpc_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => format!("https://api.{}.solana.com", self.network),
        }
    }

    pub fn is_main_network(&self) -> bool {
        self.network == "mainnet-beta"
    }
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            network: "devnet".to_string(),
            rpc_url: None,
            platform_secret: None,
        }
    }
}

/// 平台业务参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// 本金超过该阈值时风险上调一档 (SOL)
    pub risk_principal_threshold: Decimal,
    /// 年利率超过该上限时风险上调一档 (%)
    pub risk_rate_ceiling: Decimal,
    /// 链上提交的最大重试次数
    pub submit_retry_attempts: u32,
    /// 确认轮询的最大次数
    pub confirm_poll_attempts: u32,
    /// 确认轮询的基础间隔 (毫秒), 指数退避的起点
    pub confirm_poll_interval_ms: u64,
    /// 后台对账任务的执行间隔 (秒)
    pub sweep_interval_secs: u64,
    /// Pending 转账记录存在多久之后才由对账任务接管 (秒)
    pub sweep_min_pending_age_secs: i64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            risk_principal_threshold: Decimal::from(100),
            risk_rate_ceiling: Decimal::from(15),
            submit_retry_attempts: 3,
            confirm_poll_attempts: 10,
            confirm_poll_interval_ms: 500,
            sweep_interval_secs: 60,
            sweep_min_pending_age_secs: 120,
        }
    }
}

/// 顾问文本服务配置, 端点静态配置, 不做运行期探测
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub enabled: bool,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "http://127.0.0.1:3001/api/advisor".to_string(),
            api_key: None,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
}

impl AppConfig {
    /// 从配置文件加载配置
    pub fn from_file(config_path: &str) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // 加载默认配置
            .add_source(File::with_name(config_path).required(false))
            // 加载环境特定配置
            .add_source(File::with_name(&format!("{}.{}", config_path, run_mode)).required(false))
            // 从环境变量加载配置（前缀为 APP_）
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// 从嵌入的配置内容加载（支持编译时嵌入）
    pub fn from_embedded(
        default_config: &str,
        prod_config: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let mut builder = Config::builder()
            // 加载嵌入的默认配置
            .add_source(File::from_str(default_config, FileFormat::Toml));

        // 如果是生产环境且提供了生产配置，加载生产配置覆盖默认配置
        if run_mode == "production" {
            if let Some(prod_cfg) = prod_config {
                builder = builder.add_source(File::from_str(prod_cfg, FileFormat::Toml));
            }
        }

        // 从环境变量加载配置（优先级最高）
        let config = builder
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// 智能加载配置：优先从文件加载，如果失败则从嵌入资源加载
    pub fn from_file_or_embedded(
        config_path: &str,
        default_config: &str,
        prod_config: Option<&str>,
    ) -> Result<Self, ConfigError> {
        match Self::from_file(config_path) {
            Ok(config) => {
                println!("从文件系统加载配置: {}", config_path);
                Ok(config)
            }
            Err(e) => {
                println!("文件系统加载配置失败: {}，使用嵌入配置", e);
                Self::from_embedded(default_config, prod_config)
            }
        }
    }
}
