//! 运行配置
//!
//! 所有参数集中在 [`RunConfig`]，启动时构造一次，
//! 以引用形式传给上电流程和控制循环。可从 TOML 文件加载，缺省字段取默认值。

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use solo_driver::ConnectionConfig;
use solo_protocol::{CommandMode, ControlMode, Direction, FeedbackControlMode, MotorType};
use thiserror::Error;

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 设置命令失败时的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// 记录警告并继续
    #[default]
    Permissive,
    /// 立即中止
    Strict,
}

/// 电机与控制器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotorSetup {
    /// 输出 PWM 频率（kHz）
    pub pwm_frequency_khz: u32,
    /// 电机极数
    pub pole_count: u32,
    /// 电流限制（A）
    pub current_limit_a: f32,
    /// 编码器线数（四倍频前 PPR）
    pub encoder_lines: u32,
    pub speed_kp: f32,
    pub speed_ki: f32,
    pub command_mode: CommandMode,
    pub motor_type: MotorType,
    pub feedback_mode: FeedbackControlMode,
    pub control_mode: ControlMode,
    /// 是否执行电机参数辨识
    pub run_identification: bool,
    /// 辨识等待时间（毫秒）
    ///
    /// 控制器不报告辨识完成，这是一个经验上界。
    pub identification_settle_ms: u64,
}

impl Default for MotorSetup {
    fn default() -> Self {
        // teknic M-2310P-LN-04K 台架电机
        Self {
            pwm_frequency_khz: 20,
            pole_count: 8,
            current_limit_a: 7.0,
            encoder_lines: 1000,
            speed_kp: 0.15,
            speed_ki: 0.005,
            command_mode: CommandMode::Digital,
            motor_type: MotorType::BldcPmsm,
            feedback_mode: FeedbackControlMode::Encoders,
            control_mode: ControlMode::Speed,
            run_identification: true,
            identification_settle_ms: 2000,
        }
    }
}

impl MotorSetup {
    pub fn identification_settle(&self) -> Duration {
        Duration::from_millis(self.identification_settle_ms)
    }
}

/// 连接重试策略
///
/// 默认：无限重试，固定 500 ms 间隔。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub backoff_ms: u64,
    /// 最大重连次数，`None` 表示不限
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    /// 每次失败后间隔的放大倍数（1.0 为固定间隔）
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            backoff_ms: 500,
            max_attempts: None,
            backoff_multiplier: 1.0,
            max_backoff_ms: 500,
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次重连（从 1 开始）前的等待时间
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.backoff_ms as f64;
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let grown = base * self.backoff_multiplier.max(1.0).powi(exponent);
        let cap = self.max_backoff_ms.max(self.backoff_ms) as f64;
        Duration::from_millis(grown.min(cap) as u64)
    }
}

/// 控制循环中的一个阶段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub label: String,
    pub direction: Direction,
    pub speed_reference_rpm: u32,
}

impl Phase {
    pub fn new(label: impl Into<String>, direction: Direction, speed_reference_rpm: u32) -> Self {
        Self {
            label: label.into(),
            direction,
            speed_reference_rpm,
        }
    }
}

/// 控制循环计划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CyclePlan {
    /// 下发指令到采样之间的等待（毫秒）
    pub settle_ms: u64,
    /// 采样后的保持时间（毫秒）
    pub hold_ms: u64,
    /// 完整循环次数上限，`None` 表示一直运行到收到关闭请求
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cycles: Option<u64>,
    /// 按顺序执行的阶段
    pub phases: Vec<Phase>,
}

impl Default for CyclePlan {
    fn default() -> Self {
        Self {
            phases: vec![
                Phase::new("reverse", Direction::Counterclockwise, 1500),
                Phase::new("forward", Direction::Clockwise, 3000),
            ],
            settle_ms: 300,
            hold_ms: 3000,
            max_cycles: None,
        }
    }
}

impl CyclePlan {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

/// 完整运行配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub failure_policy: FailurePolicy,
    /// 退出时将速度参考置 0
    pub stop_on_shutdown: bool,
    pub connection: ConnectionConfig,
    pub motor: MotorSetup,
    pub retry: RetryPolicy,
    pub cycle: CyclePlan,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            stop_on_shutdown: true,
            connection: ConnectionConfig::default(),
            motor: MotorSetup::default(),
            retry: RetryPolicy::default(),
            cycle: CyclePlan::default(),
        }
    }
}

impl RunConfig {
    /// 从 TOML 文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle.phases.is_empty() {
            return Err(ConfigError::Invalid("cycle.phases must not be empty".to_string()));
        }
        if self.connection.packet_failure_trials == 0 {
            return Err(ConfigError::Invalid(
                "connection.packet_failure_trials must be at least 1".to_string(),
            ));
        }
        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::Invalid(
                "retry.backoff_multiplier must be >= 1.0".to_string(),
            ));
        }
        Ok(())
    }
}
