use clap::Parser;
use solar_order::utils::error::ErrorSeverity;
use solar_order::utils::{logger, validation::Validate};
use solar_order::{CliConfig, LocalStorage, OrderEngine, OrderPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting solar-order CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let dry_run = config.dry_run;
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = OrderPipeline::new(storage, config);
    let engine = OrderEngine::new(pipeline);

    match engine.run().await {
        Ok(_) if dry_run => {
            println!("\n🔍 Dry run complete, nothing written");
        }
        Ok(output_path) => {
            tracing::info!("✅ Order generated");
            println!("\n✅ Order saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Order generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
