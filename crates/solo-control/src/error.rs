//! 控制层错误类型

use std::fmt;

use solo_driver::DriverError;
use thiserror::Error;

/// 上电配置步骤（按执行顺序）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigStep {
    PwmFrequency,
    CurrentLimit,
    PoleCount,
    EncoderLines,
    CommandMode,
    MotorType,
    FeedbackMode,
    SpeedKp,
    SpeedKi,
    ControlMode,
    Identification,
}

impl ConfigStep {
    /// 写入配置的固定顺序（不含辨识）
    pub const SEQUENCE: [ConfigStep; 10] = [
        ConfigStep::PwmFrequency,
        ConfigStep::CurrentLimit,
        ConfigStep::PoleCount,
        ConfigStep::EncoderLines,
        ConfigStep::CommandMode,
        ConfigStep::MotorType,
        ConfigStep::FeedbackMode,
        ConfigStep::SpeedKp,
        ConfigStep::SpeedKi,
        ConfigStep::ControlMode,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConfigStep::PwmFrequency => "output PWM frequency",
            ConfigStep::CurrentLimit => "current limit",
            ConfigStep::PoleCount => "motor pole count",
            ConfigStep::EncoderLines => "incremental encoder lines",
            ConfigStep::CommandMode => "command mode",
            ConfigStep::MotorType => "motor type",
            ConfigStep::FeedbackMode => "feedback control mode",
            ConfigStep::SpeedKp => "speed controller Kp",
            ConfigStep::SpeedKi => "speed controller Ki",
            ConfigStep::ControlMode => "control mode",
            ConfigStep::Identification => "motor parameters identification",
        }
    }
}

impl fmt::Display for ConfigStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 控制层错误类型
#[derive(Error, Debug)]
pub enum ControlError {
    /// 达到最大重连次数仍未连通
    #[error("Connection not established after {attempts} reconnect attempts")]
    ConnectionExhausted { attempts: u32 },

    /// 严格模式下配置步骤失败
    #[error("Failed to set {step}: {source}")]
    Configuration {
        step: ConfigStep,
        source: DriverError,
    },

    /// 严格模式下控制循环中的命令或采样失败
    #[error("Failed to {action}: {source}")]
    Command {
        action: &'static str,
        source: DriverError,
    },

    /// 收到关闭请求
    #[error("Cancelled by shutdown request")]
    Cancelled,
}
