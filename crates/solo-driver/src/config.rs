//! 连接参数

use std::time::Duration;

use solo_protocol::UartBaudrate;

/// 串口连接参数
///
/// 默认值对应台架常用配置：地址 0、115200 bps、100 ms 命令超时、
/// 每个包最多尝试 10 次、创建时自动连接。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConnectionConfig {
    /// 总线上的设备地址
    pub device_address: u8,

    /// UART 波特率
    pub baud_rate: UartBaudrate,

    /// 单个命令等待应答的超时（毫秒）
    pub command_timeout_ms: u64,

    /// 单个包的最大尝试次数（超时或应答损坏时重发）
    pub packet_failure_trials: u32,

    /// Builder 创建句柄时是否立即打开端口
    pub auto_connect: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            device_address: 0,
            baud_rate: UartBaudrate::Rate115200,
            command_timeout_ms: 100,
            packet_failure_trials: 10,
            auto_connect: true,
        }
    }
}

impl ConnectionConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}
