//! 驱动层模块
//!
//! 本模块提供 SOLO 电机控制器的设备驱动功能，包括：
//! - 能力接口 [`SoloMotorController`]（上层只依赖此 trait）
//! - 基于串口的实现 [`Solo`]（请求/应答、按包重试）
//! - Builder 与连接参数
//!
//! # 使用场景
//!
//! 适用于需要直接读写控制器寄存器的场景。
//! 上电配置与控制循环见 `solo-control`。

mod builder;
mod config;
mod controller;
mod error;
mod solo;

pub use builder::SoloBuilder;
pub use config::ConnectionConfig;
pub use controller::SoloMotorController;
pub use error::DriverError;
pub use solo::Solo;

pub use solo_serial::SerialPortTransport;

pub use solo_protocol::{
    Action, CommandCode, CommandMode, ControlMode, Direction, FeedbackControlMode, MotorType,
    UartBaudrate,
};
