//! 上电流程
//!
//! 1. 等待通信正常（失败则按重试策略重连）
//! 2. 按固定顺序写入配置
//! 3. 启动电机参数辨识并等待固定时长

use solo_driver::{Action, DriverError, SoloMotorController};
use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, RunConfig};
use crate::error::{ConfigStep, ControlError};
use crate::shutdown::Pacer;

/// 上电结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BringUpReport {
    /// 重连次数（首次检查即正常时为 0）
    pub connect_attempts: u32,
    /// 宽松模式下失败但被跳过的步骤
    pub failed_steps: Vec<ConfigStep>,
}

impl BringUpReport {
    pub fn is_clean(&self) -> bool {
        self.failed_steps.is_empty()
    }
}

/// 上电流程
pub struct BringUp<'a> {
    config: &'a RunConfig,
}

impl<'a> BringUp<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self { config }
    }

    /// 执行完整上电流程
    ///
    /// 只有健康检查通过后才会发送配置命令。
    ///
    /// # Errors
    /// - `ControlError::ConnectionExhausted`: 超过最大重连次数
    /// - `ControlError::Configuration`: 严格模式下某步配置失败
    /// - `ControlError::Cancelled`: 等待期间收到关闭请求
    pub fn run<C, P>(&self, device: &mut C, pacer: &P) -> Result<BringUpReport, ControlError>
    where
        C: SoloMotorController + ?Sized,
        P: Pacer + ?Sized,
    {
        let connect_attempts = self.await_connection(device, pacer)?;
        info!("Solo connected!");
        ensure_running(pacer)?;

        let mut report = BringUpReport {
            connect_attempts,
            failed_steps: Vec::new(),
        };
        self.configure(device, pacer, &mut report)?;
        self.identify(device, pacer, &mut report)?;

        if !report.is_clean() {
            warn!("Bring-up finished with failed steps: {:?}", report.failed_steps);
        }
        Ok(report)
    }

    /// 等待通信正常，返回重连次数
    pub fn await_connection<C, P>(&self, device: &mut C, pacer: &P) -> Result<u32, ControlError>
    where
        C: SoloMotorController + ?Sized,
        P: Pacer + ?Sized,
    {
        let retry = &self.config.retry;
        let mut attempts = 0u32;

        while !device.communication_is_working() {
            if retry.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(ControlError::ConnectionExhausted { attempts });
            }
            attempts += 1;

            warn!("Solo connection failed. Retry");
            if pacer.wait(retry.delay_for(attempts)).is_cancelled() {
                return Err(ControlError::Cancelled);
            }
            match device.connect() {
                Ok(()) => {},
                // 权限或配置错误不会自行恢复，提示操作者
                Err(e) if e.is_fatal() => warn!("Reconnect attempt {} failed: {}", attempts, e),
                Err(e) => debug!("Reconnect attempt {} failed: {}", attempts, e),
            }
        }

        Ok(attempts)
    }

    /// 按固定顺序写入全部配置，每个 setter 调用一次
    ///
    /// 每步之前检查关闭请求，收到后不再发送任何命令。
    pub fn configure<C, P>(
        &self,
        device: &mut C,
        pacer: &P,
        report: &mut BringUpReport,
    ) -> Result<(), ControlError>
    where
        C: SoloMotorController + ?Sized,
        P: Pacer + ?Sized,
    {
        let motor = &self.config.motor;

        for step in ConfigStep::SEQUENCE {
            ensure_running(pacer)?;
            let result = match step {
                ConfigStep::PwmFrequency => {
                    device.set_output_pwm_frequency_khz(motor.pwm_frequency_khz)
                },
                ConfigStep::CurrentLimit => device.set_current_limit(motor.current_limit_a),
                ConfigStep::PoleCount => device.set_motor_poles_counts(motor.pole_count),
                ConfigStep::EncoderLines => {
                    device.set_incremental_encoder_lines(motor.encoder_lines)
                },
                ConfigStep::CommandMode => device.set_command_mode(motor.command_mode),
                ConfigStep::MotorType => device.set_motor_type(motor.motor_type),
                ConfigStep::FeedbackMode => device.set_feedback_control_mode(motor.feedback_mode),
                ConfigStep::SpeedKp => device.set_speed_controller_kp(motor.speed_kp),
                ConfigStep::SpeedKi => device.set_speed_controller_ki(motor.speed_ki),
                ConfigStep::ControlMode => device.set_control_mode(motor.control_mode),
                ConfigStep::Identification => continue,
            };
            self.check(step, result, report)?;
        }

        Ok(())
    }

    /// 启动电机参数辨识（必须在设置电机类型之后）
    ///
    /// 控制器不提供完成标志，固定等待 `identification_settle_ms`。
    /// 辨识结果由控制器保存，断电后仍然有效。
    fn identify<C, P>(
        &self,
        device: &mut C,
        pacer: &P,
        report: &mut BringUpReport,
    ) -> Result<(), ControlError>
    where
        C: SoloMotorController + ?Sized,
        P: Pacer + ?Sized,
    {
        let motor = &self.config.motor;
        if !motor.run_identification {
            debug!("Motor identification skipped");
            return Ok(());
        }

        // 辨识会让电机通电，关闭请求之后不能再启动
        ensure_running(pacer)?;
        let result = device.motor_parameters_identification(Action::Start);
        self.check(ConfigStep::Identification, result, report)?;
        info!("Identifying the Motor");

        if pacer.wait(motor.identification_settle()).is_cancelled() {
            return Err(ControlError::Cancelled);
        }
        Ok(())
    }

    fn check(
        &self,
        step: ConfigStep,
        result: Result<(), DriverError>,
        report: &mut BringUpReport,
    ) -> Result<(), ControlError> {
        match result {
            Ok(()) => {
                debug!("Set {}", step);
                Ok(())
            },
            Err(source) => match self.config.failure_policy {
                FailurePolicy::Strict => Err(ControlError::Configuration { step, source }),
                FailurePolicy::Permissive => {
                    warn!("Failed to set {}: {}; continuing", step, source);
                    report.failed_steps.push(step);
                    Ok(())
                },
            },
        }
    }
}

fn ensure_running<P: Pacer + ?Sized>(pacer: &P) -> Result<(), ControlError> {
    if pacer.is_cancelled() {
        return Err(ControlError::Cancelled);
    }
    Ok(())
}
