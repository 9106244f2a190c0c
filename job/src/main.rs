use std::sync::Arc;
use std::time::Duration;

use block_common::LedgerClient;
use block_sol::SolLedgerClient;
use common::AppConfig;
use settlement::store::DbSettlementStore;
use settlement::{
    ConfirmationSweep, CustodialManager, LoanService, NoAutoDefault, SettlementStore,
};
use tokio_cron_scheduler::{Job, JobScheduler};

fn io_err(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    const DEFAULT_CONFIG: &str = include_str!("../config.toml");

    let config = AppConfig::from_file_or_embedded("job/config", DEFAULT_CONFIG, None)
        .expect("配置加载失败");

    std::env::set_var("RUST_LOG", &config.log.level);
    common::init_logger();

    log::info!("启动结算后台任务进程...");

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
        ledger.clone(),
        store.clone(),
        config.platform.clone(),
    ));
    let loans = Arc::new(LoanService::new(
        store.clone(),
        custodial,
        config.platform.clone(),
        Arc::new(NoAutoDefault),
    ));
    let sweep = Arc::new(ConfirmationSweep::new(
        store,
        ledger,
        loans.clone(),
        config.platform.clone(),
    ));

    let interval = Duration::from_secs(config.platform.sweep_interval_secs);
    let scheduler = JobScheduler::new().await.map_err(io_err)?;

    // 滞留转账对账
    let sweep_job = {
        let sweep = sweep.clone();
        Job::new_repeated_async(interval, move |_id, _sched| {
            let sweep = sweep.clone();
            Box::pin(async move {
                log::info!("⏰ 对账任务触发");
                match sweep.run_once().await {
                    Ok(summary) => log::info!(
                        "对账轮次结束: examined={}, confirmed={}, failed={}, pending={}",
                        summary.examined,
                        summary.confirmed,
                        summary.failed,
                        summary.still_pending
                    ),
                    Err(e) => log::error!("对账轮次异常: {}", e),
                }
            })
        })
        .map_err(io_err)?
    };
    scheduler.add(sweep_job).await.map_err(io_err)?;

    // 逾期分期巡检
    let overdue_job = {
        let loans = loans.clone();
        Job::new_repeated_async(interval, move |_id, _sched| {
            let loans = loans.clone();
            Box::pin(async move {
                log::info!("⏰ 逾期巡检触发");
                match loans.mark_overdue().await {
                    Ok(summary) => log::info!(
                        "逾期巡检结束: late={}, defaulted={}",
                        summary.marked_late,
                        summary.defaulted
                    ),
                    Err(e) => log::error!("逾期巡检异常: {}", e),
                }
            })
        })
        .map_err(io_err)?
    };
    scheduler.add(overdue_job).await.map_err(io_err)?;

    scheduler.start().await.map_err(io_err)?;
    log::info!("✅ 后台任务已就绪, 间隔 {} 秒", interval.as_secs());

    tokio::signal::ctrl_c().await?;
    log::info!("收到退出信号, 后台任务进程关闭");
    Ok(())
}
