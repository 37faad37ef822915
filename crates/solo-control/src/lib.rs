//! # SOLO Control
//!
//! 台架控制流程：
//!
//! 1. [`BringUp`]：等待通信正常 → 按固定顺序写入配置 → 电机参数辨识
//! 2. [`ControlCycle`]：反转/正转两个阶段交替执行，每阶段
//!    下发方向与速度 → 稳定等待 → 采样反馈 → 上报 → 保持等待
//!
//! 两个组件都只持有 [`RunConfig`] 的引用，等待通过 [`Pacer`] 完成，
//! 关闭请求经 [`ShutdownToken`] 传递，因此可以在测试中确定性地驱动。

mod bring_up;
mod config;
mod cycle;
mod error;
mod report;
mod shutdown;

pub use bring_up::{BringUp, BringUpReport};
pub use config::{
    ConfigError, CyclePlan, FailurePolicy, MotorSetup, Phase, RetryPolicy, RunConfig,
};
pub use cycle::{ControlCycle, CycleSummary};
pub use error::{ConfigStep, ControlError};
pub use report::{ConsoleReporter, FeedbackSample, FeedbackSink};
pub use shutdown::{Pacer, ShutdownToken, ShutdownTrigger, WaitOutcome, shutdown_channel};
