//! 驱动层错误类型定义

use solo_protocol::{CommandCode, ProtocolError};
use solo_serial::SerialError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 串口错误
    #[error("Serial error: {0}")]
    Serial(#[from] SerialError),

    /// 协议编解码错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 端口未连接
    #[error("Not connected")]
    NotConnected,

    /// 设备拒绝命令（应答数据域 0xEEEEEEEE）
    #[error("Command {command:?} rejected by device")]
    Rejected { command: CommandCode },

    /// 应答与请求不匹配
    #[error("Unexpected response: expected {expected:?}, got {actual:?}")]
    UnexpectedResponse {
        expected: CommandCode,
        actual: CommandCode,
    },

    /// 应答来自其他地址的设备
    #[error("Response from address {actual}, expected {expected}")]
    WrongAddress { expected: u8, actual: u8 },

    /// 多次重发后仍无有效应答
    #[error("No valid response to {command:?} after {attempts} attempts")]
    RetriesExhausted { command: CommandCode, attempts: u32 },

    /// 无效输入
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DriverError {
    /// 重试也无法恢复的设备错误（权限不足、端口参数无效）
    pub fn is_fatal(&self) -> bool {
        matches!(self, DriverError::Serial(SerialError::Device(e)) if e.is_fatal())
    }

    /// 是否值得重发同一个包
    pub(crate) fn is_transient(&self) -> bool {
        matches!(
            self,
            DriverError::Serial(SerialError::Timeout)
                | DriverError::Protocol(_)
                | DriverError::UnexpectedResponse { .. }
                | DriverError::WrongAddress { .. }
        )
    }
}
