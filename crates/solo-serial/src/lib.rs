//! # SOLO Serial Transport Layer
//!
//! 串口硬件抽象层，提供统一的字节流收发接口。

use std::time::Duration;
use thiserror::Error;

pub mod port;

#[cfg(feature = "mock")]
pub mod mock;

pub use port::SerialPortTransport;

#[cfg(feature = "mock")]
pub use mock::{MockDeviceState, MockTransport};

/// 串口层统一错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] SerialDeviceError),
    #[error("Read timeout")]
    Timeout,
    #[error("Port not open")]
    NotOpen,
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialDeviceErrorKind {
    Unknown,
    NotFound,
    AccessDenied,
    Busy,
    InvalidConfig,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct SerialDeviceError {
    pub kind: SerialDeviceErrorKind,
    pub message: String,
}

impl SerialDeviceError {
    pub fn new(kind: SerialDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            SerialDeviceErrorKind::AccessDenied | SerialDeviceErrorKind::InvalidConfig
        )
    }
}

/// 串口链路参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    /// 端口名（如 "COM3" 或 "/dev/ttyS0"）
    pub port: String,
    /// 波特率（bps）
    pub baud_rate: u32,
    /// 单次读取超时
    pub read_timeout: Duration,
}

/// 串口传输抽象
///
/// 打开/关闭由上层驱动控制，便于失败后重新连接。
pub trait SerialTransport {
    /// 打开（或重新打开）端口
    fn open(&mut self) -> Result<(), SerialError>;

    /// 关闭端口，未打开时无操作
    fn close(&mut self);

    fn is_open(&self) -> bool;

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError>;

    /// 读满 `buf`，超时返回 `SerialError::Timeout`
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SerialError>;

    /// 丢弃接收缓冲中的残留字节
    fn clear_input(&mut self) -> Result<(), SerialError> {
        Ok(())
    }
}

impl<T: SerialTransport + ?Sized> SerialTransport for Box<T> {
    fn open(&mut self) -> Result<(), SerialError> {
        (**self).open()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        (**self).write_all(bytes)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SerialError> {
        (**self).read_exact(buf)
    }

    fn clear_input(&mut self) -> Result<(), SerialError> {
        (**self).clear_input()
    }
}
