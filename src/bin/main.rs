use anyhow::{Context, Result};
use qa_report::config::{config_path_from_env, AppConfig};
use qa_report::monitor::init_logging;
use qa_report::reconcile::{self, ReconciliationPlan};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 初始化配置
    let config_path = config_path_from_env();
    let app_config = AppConfig::load(&config_path)
        .with_context(|| format!("無法加載配置: {}", config_path.display()))?;

    // 初始化日誌系統，guard 需持有到結束以寫出緩衝
    let _guard = init_logging(&app_config.log)?;
    info!("Starting data quality checks...");

    match reconcile::run(&app_config, &ReconciliationPlan::default()).await {
        Ok(_report) => {
            info!("Data quality checks completed.");
            Ok(())
        }
        Err(err) => {
            error!("Data quality checks aborted: {:#}", err);
            Err(err)
        }
    }
}
