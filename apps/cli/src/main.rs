//! # SOLO PMSM 速度控制演示
//!
//! ```bash
//! # 默认配置：115200 bps，设备地址 0
//! solo-pmsm-speed ttyS0
//!
//! # 从 TOML 读取配置，严格模式，跑 5 个循环后退出
//! solo-pmsm-speed --config bench.toml --strict --cycles 5 /dev/ttyUSB0
//! ```
//!
//! 测量值输出到 stdout，日志输出到 stderr（`RUST_LOG` 控制级别）。

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use solo_control::{
    BringUp, ConsoleReporter, ControlCycle, ControlError, RunConfig, ShutdownToken,
    shutdown_channel,
};
use solo_driver::{SerialPortTransport, Solo, SoloBuilder};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod args;

use args::{Args, USAGE};

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            // 打印帮助/版本后以 0 退出
            e.exit()
        },
        Err(e) => {
            println!("{}", USAGE);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        },
    };

    // 初始化日志（stderr，stdout 只输出测量值）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("solo=info")),
        )
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    let (trigger, token) = shutdown_channel();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived interrupt signal. Shutting down...");
        trigger.fire();
    })
    .context("Failed to install Ctrl+C handler")?;

    let mut solo = SoloBuilder::new()
        .port(&args.port)
        .config(config.connection.clone())
        .build()?;

    match BringUp::new(&config).run(&mut solo, &token) {
        Ok(report) => info!(
            "Bring-up complete after {} reconnect attempts",
            report.connect_attempts
        ),
        Err(ControlError::Cancelled) => {
            info!("Shutdown requested during bring-up");
            return Ok(());
        },
        Err(e) => return Err(e.into()),
    }

    run_cycle(&config, &mut solo, &token)
}

/// 运行控制循环，结束时（含出错）按配置将电机停下
fn run_cycle(
    config: &RunConfig,
    solo: &mut Solo<SerialPortTransport>,
    token: &ShutdownToken,
) -> Result<()> {
    let cycle = ControlCycle::new(config);
    let mut reporter = ConsoleReporter::stdout();
    let result = cycle.run(solo, token, &mut reporter);

    if config.stop_on_shutdown
        && let Err(e) = cycle.stop(solo)
    {
        warn!("{}", e);
    }

    let summary = result?;
    info!(
        "Finished {} cycles ({} samples, {} tolerated failures)",
        summary.cycles, summary.samples, summary.failures
    );
    Ok(())
}
