//! 命令码定义
//!
//! 写命令位于 0x01..=0x26，读命令位于 0x81..=0xA2。

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// SOLO UART 命令码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum CommandCode {
    // ---- 写命令 ----
    DeviceAddress = 0x01,
    CommandMode = 0x02,
    CurrentLimit = 0x03,
    TorqueReferenceIq = 0x04,
    SpeedReference = 0x05,
    PowerReference = 0x06,
    MotorParametersIdentification = 0x07,
    EmergencyStop = 0x08,
    OutputPwmFrequencyKhz = 0x09,
    SpeedControllerKp = 0x0A,
    SpeedControllerKi = 0x0B,
    MotorDirection = 0x0C,
    MotorResistance = 0x0D,
    MotorInductance = 0x0E,
    MotorPolesCounts = 0x0F,
    IncrementalEncoderLines = 0x10,
    SpeedLimit = 0x11,
    FeedbackControlMode = 0x13,
    ResetFactory = 0x14,
    MotorType = 0x15,
    ControlMode = 0x16,
    CurrentControllerKp = 0x17,
    CurrentControllerKi = 0x18,
    UartBaudrate = 0x26,

    // ---- 读命令 ----
    ReadDeviceAddress = 0x81,
    BusVoltage = 0x86,
    ReadSpeedControllerKp = 0x89,
    ReadSpeedControllerKi = 0x8A,
    ReadOutputPwmFrequencyHz = 0x8B,
    ReadCurrentLimit = 0x8C,
    QuadratureCurrentIqFeedback = 0x8D,
    MagneticCurrentIdFeedback = 0x8E,
    ReadMotorPolesCounts = 0x8F,
    ReadIncrementalEncoderLines = 0x90,
    BoardTemperature = 0x93,
    SpeedFeedback = 0x96,
    ReadMotorType = 0x97,
    ReadFeedbackControlMode = 0x99,
    ReadCommandMode = 0x9A,
    ReadControlMode = 0x9B,
    ErrorRegister = 0xA1,
    DeviceFirmwareVersion = 0xA2,
}

impl CommandCode {
    /// 是否为读命令
    pub fn is_read(self) -> bool {
        u8::from(self) >= 0x80
    }
}
