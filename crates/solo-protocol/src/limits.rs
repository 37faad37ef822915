//! 参数范围校验
//!
//! 在发送任何字节之前校验写入值，超出范围直接返回错误。

use crate::ProtocolError;

pub const PWM_FREQUENCY_KHZ: (u32, u32) = (8, 80);
pub const CURRENT_LIMIT_A: (f32, f32) = (0.0, 32.0);
pub const MOTOR_POLES: (u32, u32) = (1, 254);
pub const ENCODER_LINES: (u32, u32) = (1, 200_000);
pub const SPEED_CONTROLLER_GAIN: (f32, f32) = (0.0, 300.0);
pub const SPEED_REFERENCE_RPM: (u32, u32) = (0, 30_000);

/// 整型参数范围校验
pub fn check_u32(field: &'static str, value: u32, range: (u32, u32)) -> Result<u32, ProtocolError> {
    if value < range.0 || value > range.1 {
        return Err(ProtocolError::OutOfRange {
            field,
            value: f64::from(value),
            min: f64::from(range.0),
            max: f64::from(range.1),
        });
    }
    Ok(value)
}

/// 浮点参数范围校验
pub fn check_f32(field: &'static str, value: f32, range: (f32, f32)) -> Result<f32, ProtocolError> {
    if !(range.0..=range.1).contains(&value) {
        return Err(ProtocolError::OutOfRange {
            field,
            value: f64::from(value),
            min: f64::from(range.0),
            max: f64::from(range.1),
        });
    }
    Ok(value)
}
