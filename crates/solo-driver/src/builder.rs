//! Builder 模式实现
//!
//! 提供链式构造 `Solo` 实例的便捷方式。

use std::time::Duration;

use solo_protocol::UartBaudrate;
use solo_serial::{LinkSettings, SerialPortTransport};
use tracing::{info, warn};

use crate::{ConnectionConfig, DriverError, Solo, SoloMotorController};

/// Solo Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use solo_driver::{SoloBuilder, UartBaudrate};
///
/// let solo = SoloBuilder::new()
///     .port("/dev/ttyACM0")
///     .device_address(0)
///     .baud_rate(UartBaudrate::Rate115200)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct SoloBuilder {
    /// 串口名称
    ///
    /// - Windows: "COM3"
    /// - Linux/macOS: "/dev/ttyACM0"、"ttyS0"（自动补全 `/dev/` 前缀）
    port: Option<String>,
    config: ConnectionConfig,
}

impl SoloBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置串口（必需）
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// 整体替换连接参数
    pub fn config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn device_address(mut self, address: u8) -> Self {
        self.config.device_address = address;
        self
    }

    pub fn baud_rate(mut self, baud_rate: UartBaudrate) -> Self {
        self.config.baud_rate = baud_rate;
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.config.command_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn packet_failure_trials(mut self, trials: u32) -> Self {
        self.config.packet_failure_trials = trials;
        self
    }

    pub fn auto_connect(mut self, auto_connect: bool) -> Self {
        self.config.auto_connect = auto_connect;
        self
    }

    /// 构建 Solo 实例
    ///
    /// 开启 `auto_connect` 时立即尝试打开端口；打开失败只记录日志，
    /// 由上层的健康检查与重连逻辑处理。
    ///
    /// # Errors
    /// - `DriverError::InvalidInput`: 未指定串口
    pub fn build(self) -> Result<Solo<SerialPortTransport>, DriverError> {
        let port = self
            .port
            .as_deref()
            .map(normalize_port_name)
            .ok_or_else(|| DriverError::InvalidInput("serial port is required".to_string()))?;

        let settings = LinkSettings {
            port,
            baud_rate: self.config.baud_rate.bits_per_second(),
            read_timeout: self.config.command_timeout(),
        };
        info!(
            "Using serial port {} at {} bps (device address {})",
            settings.port, settings.baud_rate, self.config.device_address
        );

        let auto_connect = self.config.auto_connect;
        let mut solo = Solo::new(SerialPortTransport::new(settings), self.config);
        if auto_connect {
            if let Err(e) = solo.connect() {
                warn!("Initial connect failed: {}", e);
            }
        }
        Ok(solo)
    }
}

/// 补全 Unix 设备路径（"ttyS0" -> "/dev/ttyS0"）
fn normalize_port_name(port: &str) -> String {
    if cfg!(unix) && !port.contains('/') {
        format!("/dev/{}", port)
    } else {
        port.to_string()
    }
}
