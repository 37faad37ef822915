//! 定点数编解码
//!
//! SOLO 使用 32 位有符号定点数传输浮点参数：小数部分 17 位，
//! 即 `raw = trunc(value * 2^17)`，负数按补码存放。

use crate::ProtocolError;

/// 小数位缩放因子（2^17）
pub const FIXED_SCALE: f64 = 131_072.0;

/// 可表示的绝对值上界（2^31 / 2^17）
pub const FIXED_MAX_ABS: f64 = 16_384.0;

/// 浮点数编码为定点数据域
pub fn encode_fixed(field: &'static str, value: f32) -> Result<[u8; 4], ProtocolError> {
    let value = f64::from(value);
    if !value.is_finite() || value.abs() >= FIXED_MAX_ABS {
        return Err(ProtocolError::OutOfRange {
            field,
            value,
            min: -FIXED_MAX_ABS,
            max: FIXED_MAX_ABS,
        });
    }
    let raw = (value * FIXED_SCALE) as i32;
    Ok(raw.to_be_bytes())
}

/// 定点数据域解码为浮点数
pub fn decode_fixed(data: [u8; 4]) -> f32 {
    (f64::from(i32::from_be_bytes(data)) / FIXED_SCALE) as f32
}
