//! # SOLO Protocol
//!
//! SOLO 电机控制器 UART 协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `commands`: 命令码定义
//! - `types`: 协议枚举（方向、电机类型、控制模式等）
//! - `fixed`: 定点数编解码
//! - `limits`: 参数范围校验
//!
//! ## 包格式
//!
//! 每个请求/应答都是固定 10 字节：
//!
//! ```text
//! FF FF | ADDR | CMD | D0 D1 D2 D3 | CRC | FE
//! ```
//!
//! 数据域使用大端字节序，CRC 字节保留（固定为 0x00）。

pub mod commands;
pub mod fixed;
pub mod limits;
pub mod types;

pub use commands::CommandCode;
pub use fixed::{decode_fixed, encode_fixed};
pub use types::*;

use thiserror::Error;

/// 包头（两个字节）
pub const PACKET_HEADER: [u8; 2] = [0xFF, 0xFF];

/// 包尾
pub const PACKET_TRAILER: u8 = 0xFE;

/// CRC 占位字节
pub const PACKET_CRC: u8 = 0x00;

/// 包长度
pub const PACKET_LEN: usize = 10;

/// 设备拒绝命令时返回的数据域
pub const ERROR_DATA: [u8; 4] = [0xEE, 0xEE, 0xEE, 0xEE];

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Invalid packet length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid packet framing: {0}")]
    InvalidFraming(&'static str),

    #[error("Unknown command code: 0x{code:02X}")]
    UnknownCommand { code: u8 },

    #[error("Value out of range for {field}: {value} not in [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: &'static str, value: u32 },
}

/// SOLO UART 数据包
///
/// 请求和应答共用同一格式。设备按原样回显地址和命令码，
/// 写命令成功时回显写入的数据，读命令时数据域携带寄存器值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoloPacket {
    /// 设备地址（总线上 0-254）
    pub address: u8,

    /// 命令码
    pub command: CommandCode,

    /// 数据域（大端）
    pub data: [u8; 4],
}

impl SoloPacket {
    pub fn new(address: u8, command: CommandCode, data: [u8; 4]) -> Self {
        Self {
            address,
            command,
            data,
        }
    }

    /// 构建读请求（数据域为 0）
    pub fn read_request(address: u8, command: CommandCode) -> Self {
        Self::new(address, command, [0; 4])
    }

    /// 编码为线上字节
    pub fn encode(&self) -> [u8; PACKET_LEN] {
        let cmd: u8 = self.command.into();
        [
            PACKET_HEADER[0],
            PACKET_HEADER[1],
            self.address,
            cmd,
            self.data[0],
            self.data[1],
            self.data[2],
            self.data[3],
            PACKET_CRC,
            PACKET_TRAILER,
        ]
    }

    /// 从线上字节解码
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() != PACKET_LEN {
            return Err(ProtocolError::InvalidLength {
                expected: PACKET_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0..2] != PACKET_HEADER {
            return Err(ProtocolError::InvalidFraming("missing 0xFFFF header"));
        }
        if bytes[9] != PACKET_TRAILER {
            return Err(ProtocolError::InvalidFraming("missing 0xFE trailer"));
        }

        let command = CommandCode::try_from(bytes[3])
            .map_err(|_| ProtocolError::UnknownCommand { code: bytes[3] })?;

        Ok(Self {
            address: bytes[2],
            command,
            data: [bytes[4], bytes[5], bytes[6], bytes[7]],
        })
    }

    /// 数据域解释为 i32（速度等有符号整型反馈）
    pub fn data_i32(&self) -> i32 {
        i32::from_be_bytes(self.data)
    }

    /// 数据域解释为定点数
    pub fn data_fixed(&self) -> f32 {
        decode_fixed(self.data)
    }

    /// 设备是否拒绝了该命令
    pub fn is_error(&self) -> bool {
        self.data == ERROR_DATA
    }
}

/// u32 转大端字节序
pub fn u32_to_bytes_be(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// i32 转大端字节序
pub fn i32_to_bytes_be(value: i32) -> [u8; 4] {
    value.to_be_bytes()
}
