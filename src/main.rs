//! # Visham 情绪检测器 — 命令行入口
//!
//! 本文件只负责参数解析、日志初始化与结果输出，扮演宿主 UI 的角色。
//! 业务逻辑分布在 `analyzer` 各子模块中，详见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use visham_detector::analyzer::{AnalysisConfig, AnalysisServiceState, ImageSource};
use visham_detector::{AppError, settings};

/// Hungry-angry detector: scores a selfie from its brightness and contrast.
#[derive(Parser, Debug)]
#[command(name = "visham", version, about)]
struct Args {
    /// Image file to analyze
    #[arg(required_unless_present = "base64", conflicts_with = "base64")]
    input: Option<PathBuf>,

    /// Analyze a Base64 payload or `data:image/...;base64,` URL instead of a file
    #[arg(long)]
    base64: Option<String>,

    /// JSON settings file overriding limits, profile and thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resampling profile: quality, balanced or speed
    #[arg(long)]
    profile: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Include a PNG data URL of the normalized 256x256 frame
    #[arg(long)]
    preview: bool,

    /// Print this many extra quotes after the report
    #[arg(long, default_value_t = 0)]
    quotes: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("分析失败: {err}");
            eprintln!("{}", err.diagnostic());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = AnalysisConfig::default();
    if let Some(path) = &args.config {
        settings::load_settings(path)?.apply_to(&mut config)?;
        log::info!("已加载设置文件: {}", path.display());
    }

    let service = AnalysisServiceState::with_config(config);
    if let Some(profile) = &args.profile {
        service.set_performance_profile(profile)?;
    }

    let source = match (args.input, args.base64) {
        (Some(path), _) => ImageSource::FilePath(path.to_string_lossy().into_owned()),
        (None, Some(data)) => ImageSource::Base64(data),
        (None, None) => {
            return Err(AppError::Settings("缺少输入：请提供图片路径或 --base64".to_string()));
        }
    };

    let report = service.analyze(source, args.preview)?;
    let extra_quotes: Vec<&str> = (0..args.quotes).map(|_| service.another_quote()).collect();

    if args.json {
        let mut json = serde_json::to_value(&report)
            .map_err(|e| AppError::Settings(format!("序列化结果失败: {}", e)))?;
        if !extra_quotes.is_empty() {
            json["extra_quotes"] = serde_json::Value::from(extra_quotes);
        }
        let json = serde_json::to_string_pretty(&json)
            .map_err(|e| AppError::Settings(format!("序列化结果失败: {}", e)))?;
        println!("{json}");
        return Ok(());
    }

    println!("{}", report.result.label);
    println!("{}% Visham", report.result.score);
    println!();
    println!("{}", report.toast);
    println!("Share: {}", report.share_text);
    println!("\"{}\"", report.quote);
    for quote in &extra_quotes {
        println!("\"{quote}\"");
    }
    if let Some(preview) = &report.preview {
        println!();
        println!("{preview}");
    }

    Ok(())
}
