//! 协议枚举
//!
//! 所有枚举写入时编码为 u32 大端数据域。

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::ProtocolError;

/// 为协议枚举生成数据域编解码
macro_rules! impl_data_enum {
    ($ty:ty, $field:literal) => {
        impl $ty {
            /// 编码为数据域
            pub fn to_data(self) -> [u8; 4] {
                u32::from(u8::from(self)).to_be_bytes()
            }

            /// 从数据域解码
            pub fn from_data(data: [u8; 4]) -> Result<Self, ProtocolError> {
                let raw = u32::from_be_bytes(data);
                u8::try_from(raw)
                    .ok()
                    .and_then(|v| <$ty>::try_from(v).ok())
                    .ok_or(ProtocolError::InvalidValue {
                        field: $field,
                        value: raw,
                    })
            }
        }
    };
}

/// 电机旋转方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Direction {
    Counterclockwise = 0,
    Clockwise = 1,
}

/// 命令来源：模拟量输入或数字通信
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum CommandMode {
    Analogue = 0,
    Digital = 1,
}

/// 电机类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum MotorType {
    Dc = 0,
    BldcPmsm = 1,
    Acim = 2,
    BldcPmsmUltrafast = 3,
}

/// 反馈来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum FeedbackControlMode {
    SensorLess = 0,
    Encoders = 1,
    HallSensors = 2,
}

/// 控制模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum ControlMode {
    Speed = 0,
    Torque = 1,
    Position = 2,
}

/// 长时动作（如电机参数辨识）的启停
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Action {
    Stop = 0,
    Start = 1,
}

impl_data_enum!(Direction, "direction");
impl_data_enum!(CommandMode, "command_mode");
impl_data_enum!(MotorType, "motor_type");
impl_data_enum!(FeedbackControlMode, "feedback_control_mode");
impl_data_enum!(ControlMode, "control_mode");
impl_data_enum!(Action, "action");

/// UART 波特率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub enum UartBaudrate {
    Rate937500,
    #[default]
    Rate115200,
}

impl UartBaudrate {
    pub fn bits_per_second(self) -> u32 {
        match self {
            UartBaudrate::Rate937500 => 937_500,
            UartBaudrate::Rate115200 => 115_200,
        }
    }
}

impl From<UartBaudrate> for u32 {
    fn from(rate: UartBaudrate) -> Self {
        rate.bits_per_second()
    }
}

impl TryFrom<u32> for UartBaudrate {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            937_500 => Ok(UartBaudrate::Rate937500),
            115_200 => Ok(UartBaudrate::Rate115200),
            other => Err(ProtocolError::InvalidValue {
                field: "uart_baudrate",
                value: other,
            }),
        }
    }
}
