//! 命令行参数

use std::path::PathBuf;

use clap::Parser;
use solo_control::{FailurePolicy, RunConfig};
use solo_driver::UartBaudrate;

/// 参数个数错误时输出到 stdout 的用法说明
pub const USAGE: &str = "Usage: solo-pmsm-speed <device name e.g. ttyS0>";

/// SOLO PMSM 速度控制演示
///
/// 连接控制器、写入电机配置、启动参数辨识，然后在反转 1500 RPM
/// 与正转 3000 RPM 之间循环，打印速度与 Iq 反馈。
#[derive(Parser, Debug)]
#[command(name = "solo-pmsm-speed")]
#[command(about = "PMSM speed-control demo for SOLO motor controllers", long_about = None)]
#[command(version)]
pub struct Args {
    /// 串口设备（如 ttyS0、/dev/ttyUSB0、COM3）
    pub port: String,

    /// TOML 运行配置文件
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 设备地址
    #[arg(long, value_name = "N")]
    pub address: Option<u8>,

    /// 波特率（115200 或 937500）
    #[arg(long, value_name = "BPS", value_parser = parse_baudrate)]
    pub baud: Option<UartBaudrate>,

    /// 最大重连次数（默认无限重试）
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// 任一命令失败即退出
    #[arg(long)]
    pub strict: bool,

    /// 运行指定循环数后退出（默认直到 Ctrl+C）
    #[arg(long, value_name = "N")]
    pub cycles: Option<u64>,

    /// 退出时不将速度参考置 0
    #[arg(long)]
    pub no_stop_on_exit: bool,
}

fn parse_baudrate(value: &str) -> Result<UartBaudrate, String> {
    let bps: u32 = value
        .parse()
        .map_err(|_| format!("invalid baud rate '{}'", value))?;
    UartBaudrate::try_from(bps).map_err(|_| "supported baud rates: 115200, 937500".to_string())
}

impl Args {
    /// 用命令行选项覆盖配置文件中的值
    pub fn apply_overrides(&self, config: &mut RunConfig) {
        if let Some(address) = self.address {
            config.connection.device_address = address;
        }
        if let Some(baud) = self.baud {
            config.connection.baud_rate = baud;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.retry.max_attempts = Some(max_attempts);
        }
        if self.strict {
            config.failure_policy = FailurePolicy::Strict;
        }
        if let Some(cycles) = self.cycles {
            config.cycle.max_cycles = Some(cycles);
        }
        if self.no_stop_on_exit {
            config.stop_on_shutdown = false;
        }
    }
}
