// ==========================================
// 三表导入系统 - 命令行主入口
// ==========================================
// 流程: 解析参数 → 加载配置 → 初始化日志 → 执行子命令 → 打印报告
// ==========================================

use anyhow::{Context, Result};
use clap::Parser;
use resource_ingest::cli::{render_json, render_text, run_check, Cli, Command, ReportFormat};
use resource_ingest::config::IngestConfig;
use resource_ingest::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = IngestConfig::load(cli.config.as_deref()).context("无法加载配置")?;

    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    if cli.json_logs {
        logging::init_json(level);
    } else {
        logging::init(level);
    }

    tracing::info!(version = resource_ingest::VERSION, "{} 启动", resource_ingest::APP_NAME);

    match cli.command {
        Command::Check(args) => {
            let report = run_check(&args, &config).context("检查失败")?;

            let output = match args.format {
                ReportFormat::Text => render_text(&report),
                ReportFormat::Json => render_json(&report, config.pretty_output)?,
            };
            println!("{}", output.trim_end());

            if args.fail_on_findings && report.has_problems() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
