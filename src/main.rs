use clap::Parser;
use trip_stats::config::{Command, LogFormat};
use trip_stats::core::verify::VerificationOutcome;
use trip_stats::core::{ConfigProvider, Pipeline};
use trip_stats::utils::error::EtlError;
use trip_stats::utils::{logger, validation::Validate};
use trip_stats::{
    CliConfig, ColumnExtractPipeline, DataVerifier, EtlEngine, LocalStorage, PipelineSequence,
    StatsReportPipeline, TomlConfig, TripFormatPipeline,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("🚀 Starting trip-stats");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match cli.settings().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let monitor_enabled = cli.monitor || config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.data_dir().to_string());

    let result = match &cli.command {
        Command::Extract { .. } => {
            let pipeline = ColumnExtractPipeline::new(storage, config);
            run_single(pipeline, monitor_enabled).await
        }
        Command::Format { .. } => {
            let pipeline = TripFormatPipeline::new(storage, config);
            run_single(pipeline, monitor_enabled).await
        }
        Command::Report { .. } => {
            let pipeline = StatsReportPipeline::new(storage, config);
            run_single(pipeline, monitor_enabled).await
        }
        Command::Verify { .. } => {
            let target = config.verify_target().to_string();
            let verifier = DataVerifier::new(storage, config);
            verifier.verify(&target).await.map(report_verdict)
        }
        Command::Run { verify } => run_all(storage, config, monitor_enabled, *verify).await,
    };

    match result {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = e.severity().exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

async fn run_single<P: Pipeline>(pipeline: P, monitor_enabled: bool) -> Result<i32, EtlError> {
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);
    let output_path = engine.run().await?;

    tracing::info!("✅ Stage completed successfully!");
    println!("✅ Stage completed successfully!");
    println!("📁 Output saved to: {}", output_path);
    Ok(0)
}

async fn run_all(
    storage: LocalStorage,
    config: TomlConfig,
    monitor_enabled: bool,
    verify: bool,
) -> Result<i32, EtlError> {
    let sequence = PipelineSequence::new(monitor_enabled)
        .add_pipeline(
            "extract",
            Box::new(ColumnExtractPipeline::new(storage.clone(), config.clone())),
        )
        .add_pipeline(
            "format",
            Box::new(TripFormatPipeline::new(storage.clone(), config.clone())),
        )
        .add_pipeline(
            "report",
            Box::new(StatsReportPipeline::new(storage.clone(), config.clone())),
        );

    let results = sequence.execute().await?;
    println!("✅ Pipeline sequence completed successfully!");
    for result in &results {
        println!(
            "📁 {}: {} rows -> {} ({:.2?})",
            result.pipeline_name, result.rows, result.output_path, result.duration
        );
    }

    if !verify {
        return Ok(0);
    }

    let targets = [
        config.relevant_file().to_string(),
        config.formatted_file().to_string(),
    ];
    let verifier = DataVerifier::new(storage, config);
    let outcome = verifier
        .verify_all(&[targets[0].as_str(), targets[1].as_str()])
        .await?;
    Ok(report_verdict(outcome))
}

/// Prints the verdict line and maps it to an exit code.
fn report_verdict(outcome: VerificationOutcome) -> i32 {
    println!("{}", outcome.verdict());
    if outcome.is_verified() {
        0
    } else {
        1
    }
}
