//! 速度控制循环
//!
//! 每个阶段：下发方向 → 下发速度参考 → 稳定等待 → 采样 → 上报 → 保持等待。
//! 稳定等待是速度环收敛时间的固定近似，控制器不回报"已到达参考"。

use solo_driver::{DriverError, SoloMotorController};
use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, Phase, RunConfig};
use crate::error::ControlError;
use crate::report::{FeedbackSample, FeedbackSink};
use crate::shutdown::{Pacer, WaitOutcome};

/// 循环运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// 完整执行的循环数
    pub cycles: u64,
    /// 成功上报的采样数
    pub samples: u64,
    /// 宽松模式下被容忍的失败次数
    pub failures: u64,
}

/// 单个阶段在何处结束
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseEnd {
    Completed,
    /// 稳定等待被打断，本阶段没有采样
    CancelledBeforeSample,
    /// 保持等待被打断，本阶段已完成采样
    CancelledDuringHold,
}

/// 控制循环
pub struct ControlCycle<'a> {
    config: &'a RunConfig,
}

impl<'a> ControlCycle<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// 运行直到收到关闭请求或达到 `max_cycles`
    ///
    /// 关闭请求不视为错误，正常返回统计。
    pub fn run<C, P, S>(
        &self,
        device: &mut C,
        pacer: &P,
        sink: &mut S,
    ) -> Result<CycleSummary, ControlError>
    where
        C: SoloMotorController + ?Sized,
        P: Pacer + ?Sized,
        S: FeedbackSink + ?Sized,
    {
        let plan = &self.config.cycle;
        let mut summary = CycleSummary::default();
        info!("Starting control cycle ({} phases)", plan.phases.len());

        loop {
            if plan.max_cycles.is_some_and(|max| summary.cycles >= max) {
                info!("Completed {} cycles", summary.cycles);
                return Ok(summary);
            }

            for (index, phase) in plan.phases.iter().enumerate() {
                if pacer.is_cancelled() {
                    info!("Control cycle stopped after {} cycles", summary.cycles);
                    return Ok(summary);
                }
                let end = self.run_phase(device, pacer, sink, phase, &mut summary)?;
                if end == PhaseEnd::Completed {
                    continue;
                }
                // 最后一个阶段已采样，只是保持等待被打断，本轮算完成
                if end == PhaseEnd::CancelledDuringHold && index + 1 == plan.phases.len() {
                    summary.cycles += 1;
                }
                info!("Control cycle stopped after {} cycles", summary.cycles);
                return Ok(summary);
            }
            summary.cycles += 1;
        }
    }

    fn run_phase<C, P, S>(
        &self,
        device: &mut C,
        pacer: &P,
        sink: &mut S,
        phase: &Phase,
        summary: &mut CycleSummary,
    ) -> Result<PhaseEnd, ControlError>
    where
        C: SoloMotorController + ?Sized,
        P: Pacer + ?Sized,
        S: FeedbackSink + ?Sized,
    {
        let plan = &self.config.cycle;
        debug!(
            "Phase {}: {:?} @ {} RPM",
            phase.label, phase.direction, phase.speed_reference_rpm
        );

        let result = device.set_motor_direction(phase.direction);
        self.tolerate("set motor direction", result, summary)?;
        let result = device.set_speed_reference(phase.speed_reference_rpm);
        self.tolerate("set speed reference", result, summary)?;

        if pacer.wait(plan.settle()).is_cancelled() {
            return Ok(PhaseEnd::CancelledBeforeSample);
        }

        // 速度读取失败时不再读 Iq，避免在掉线设备上再耗一轮重试
        match device.speed_feedback() {
            Ok(speed_rpm) => match device.quadrature_current_iq_feedback() {
                Ok(iq_current_a) => {
                    sink.report(&FeedbackSample {
                        cycle: summary.cycles,
                        phase: phase.label.clone(),
                        speed_rpm,
                        iq_current_a,
                    });
                    summary.samples += 1;
                },
                Err(e) => self.tolerate("read Iq feedback", Err(e), summary)?,
            },
            Err(e) => self.tolerate("read speed feedback", Err(e), summary)?,
        }

        match pacer.wait(plan.hold()) {
            WaitOutcome::Elapsed => Ok(PhaseEnd::Completed),
            WaitOutcome::Cancelled => Ok(PhaseEnd::CancelledDuringHold),
        }
    }

    /// 宽松模式记录并继续，严格模式返回错误
    fn tolerate(
        &self,
        action: &'static str,
        result: Result<(), DriverError>,
        summary: &mut CycleSummary,
    ) -> Result<(), ControlError> {
        let Err(source) = result else {
            return Ok(());
        };
        match self.config.failure_policy {
            FailurePolicy::Strict => Err(ControlError::Command { action, source }),
            FailurePolicy::Permissive => {
                warn!("Failed to {}: {}", action, source);
                summary.failures += 1;
                Ok(())
            },
        }
    }

    /// 停机：速度参考置 0
    pub fn stop<C>(&self, device: &mut C) -> Result<(), ControlError>
    where
        C: SoloMotorController + ?Sized,
    {
        info!("Stopping motor");
        device
            .set_speed_reference(0)
            .map_err(|source| ControlError::Command {
                action: "stop motor",
                source,
            })
    }
}
