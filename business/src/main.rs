use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use block_common::LedgerClient;
use block_sol::SolLedgerClient;
use common::middleware::error_handler;
use common::AppConfig;
use settlement::store::DbSettlementStore;
use settlement::{
    loan_event_channel, CustodialManager, FundingAggregator, LoanEvent, LoanService, NoAutoDefault,
    SettlementStore,
};

use crate::service::advisor_service::AdvisorService;

mod handle;
mod service;
mod state;

fn io_err(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 嵌入配置文件（编译时加载）
    const DEFAULT_CONFIG: &str = include_str!("../config.toml");
    const PROD_CONFIG: &str = include_str!("../config.production.toml");

    let config =
        AppConfig::from_file_or_embedded("business/config", DEFAULT_CONFIG, Some(PROD_CONFIG))
            .expect("配置加载失败");

    std::env::set_var("RUST_LOG", &config.log.level);
    common::init_logger();

    log::info!("启动借贷结算 API 服务...");

    let db_config = common::DbConfig::new(
        config.database.url.clone(),
        config.database.max_connections as u64,
    );
    common::init_db(&db_config)
        .await
        .expect("数据库连接池初始化失败");
    if let Err(e) = common::test_db_connection().await {
        log::error!("数据库连接测试失败: {}", e);
    }

    let store: Arc<dyn SettlementStore> =
        Arc::new(DbSettlementStore::new(common::get_db().clone()));

    let ledger = Arc::new(SolLedgerClient::new(&config.solana).map_err(io_err)?);
    log::info!(
        "🔗 账本连接就绪: network={}, platform={}",
        ledger.network(),
        ledger.platform_address()
    );

    let custodial = Arc::new(CustodialManager::start(
        ledger,
        store.clone(),
        config.platform.clone(),
    ));
    let loans = Arc::new(LoanService::new(
        store.clone(),
        custodial.clone(),
        config.platform.clone(),
        Arc::new(NoAutoDefault),
    ));
    let (event_tx, mut event_rx) = loan_event_channel();
    let funding = Arc::new(FundingAggregator::new(store.clone(), event_tx));
    let advisor = Arc::new(
        AdvisorService::new(config.advisor.clone(), config.platform.clone()).map_err(io_err)?,
    );

    // 满额即触发放款, 放款失败回退后可由运营重试
    let disburse_loans = loans.clone();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                LoanEvent::FullyFunded { loan_id } => {
                    if let Err(e) = disburse_loans.disburse(loan_id).await {
                        log::error!("自动放款失败: loan_id={}, err={}", loan_id, e);
                    }
                }
            }
        }
    });

    let state = state::AppState {
        loans,
        funding,
        custodial,
        advisor,
    };
    let state_data = web::Data::new(state.clone());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("🚀 启动 Actix Web 服务器: {}", addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            // 注册 JSON 和 Query 错误处理器
            .app_data(error_handler::json_config())
            .app_data(error_handler::query_config())
            .app_data(state_data.clone())
            .service(handle::common::health)
            .service(handle::loan::create)
            .service(handle::loan::contribute)
            .service(handle::loan::list)
            .service(handle::loan::detail)
            .service(handle::loan::repay)
            .service(handle::wallet::platform)
            .service(handle::wallet::balance)
            .service(handle::wallet::history)
            .service(handle::wallet::airdrop)
            .service(handle::advisor::assess)
    })
    .bind(&addr)?
    .run()
    .await
}
