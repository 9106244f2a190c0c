// 配置模块

pub mod app_config;
pub mod db_conf;

pub use app_config::{
    AdvisorConfig, AppConfig, DatabaseConfig, LogConfig, PlatformConfig, ServerConfig,
    SolanaConfig,
};
pub use db_conf::{get_db, init_db, test_connection, DbConfig};
