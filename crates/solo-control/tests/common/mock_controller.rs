//! Mock 控制器与记录型 Pacer
//!
//! 两者写入同一条事件日志，测试据此检查命令与等待的相对顺序。

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use solo_control::{Pacer, ShutdownTrigger, WaitOutcome};
use solo_driver::{
    Action, CommandMode, ControlMode, Direction, DriverError, FeedbackControlMode, MotorType,
    SoloMotorController,
};

/// 控制器调用或等待事件
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connect,
    HealthCheck(bool),
    PwmFrequency(u32),
    CurrentLimit(f32),
    PoleCount(u32),
    EncoderLines(u32),
    CommandMode(CommandMode),
    MotorType(MotorType),
    FeedbackMode(FeedbackControlMode),
    SpeedKp(f32),
    SpeedKi(f32),
    ControlMode(ControlMode),
    Direction(Direction),
    SpeedReference(u32),
    Identification(Action),
    ReadSpeed,
    ReadIq,
    ReadTemperature,
    Wait(Duration),
}

impl Event {
    /// 是否为上电配置 setter
    pub fn is_config_setter(&self) -> bool {
        matches!(
            self,
            Event::PwmFrequency(_)
                | Event::CurrentLimit(_)
                | Event::PoleCount(_)
                | Event::EncoderLines(_)
                | Event::CommandMode(_)
                | Event::MotorType(_)
                | Event::FeedbackMode(_)
                | Event::SpeedKp(_)
                | Event::SpeedKi(_)
                | Event::ControlMode(_)
        )
    }
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn new_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// 模拟控制器
pub struct MockController {
    log: EventLog,
    /// 前 N 次健康检查返回 false
    pub unhealthy_checks: u32,
    /// 返回错误的操作名（如 "speed_kp"、"read_speed"）
    pub failing: Vec<&'static str>,
    pub speed_rpm: i32,
    pub iq_current_a: f32,
    /// 执行到该操作时触发关闭（模拟操作中途按下 Ctrl+C）
    shutdown_on: Option<(&'static str, ShutdownTrigger)>,
}

impl MockController {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            unhealthy_checks: 0,
            failing: Vec::new(),
            speed_rpm: 1500,
            iq_current_a: 2.0,
            shutdown_on: None,
        }
    }

    pub fn unhealthy_for(mut self, checks: u32) -> Self {
        self.unhealthy_checks = checks;
        self
    }

    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.failing.push(operation);
        self
    }

    pub fn shutdown_on(mut self, operation: &'static str, trigger: ShutdownTrigger) -> Self {
        self.shutdown_on = Some((operation, trigger));
        self
    }

    fn record(&self, event: Event, operation: &'static str) -> Result<(), DriverError> {
        self.log.borrow_mut().push(event);
        if let Some((target, trigger)) = &self.shutdown_on
            && *target == operation
        {
            trigger.fire();
        }
        if self.failing.contains(&operation) {
            Err(DriverError::RetriesExhausted {
                command: solo_driver::CommandCode::BoardTemperature,
                attempts: 10,
            })
        } else {
            Ok(())
        }
    }
}

impl SoloMotorController for MockController {
    fn connect(&mut self) -> Result<(), DriverError> {
        self.record(Event::Connect, "connect")
    }

    fn communication_is_working(&mut self) -> bool {
        let healthy = if self.unhealthy_checks > 0 {
            self.unhealthy_checks -= 1;
            false
        } else {
            true
        };
        self.log.borrow_mut().push(Event::HealthCheck(healthy));
        healthy
    }

    fn set_output_pwm_frequency_khz(&mut self, khz: u32) -> Result<(), DriverError> {
        self.record(Event::PwmFrequency(khz), "pwm_frequency")
    }

    fn set_current_limit(&mut self, amps: f32) -> Result<(), DriverError> {
        self.record(Event::CurrentLimit(amps), "current_limit")
    }

    fn set_motor_poles_counts(&mut self, poles: u32) -> Result<(), DriverError> {
        self.record(Event::PoleCount(poles), "pole_count")
    }

    fn set_incremental_encoder_lines(&mut self, lines: u32) -> Result<(), DriverError> {
        self.record(Event::EncoderLines(lines), "encoder_lines")
    }

    fn set_command_mode(&mut self, mode: CommandMode) -> Result<(), DriverError> {
        self.record(Event::CommandMode(mode), "command_mode")
    }

    fn set_motor_type(&mut self, motor_type: MotorType) -> Result<(), DriverError> {
        self.record(Event::MotorType(motor_type), "motor_type")
    }

    fn set_feedback_control_mode(&mut self, mode: FeedbackControlMode) -> Result<(), DriverError> {
        self.record(Event::FeedbackMode(mode), "feedback_mode")
    }

    fn set_speed_controller_kp(&mut self, kp: f32) -> Result<(), DriverError> {
        self.record(Event::SpeedKp(kp), "speed_kp")
    }

    fn set_speed_controller_ki(&mut self, ki: f32) -> Result<(), DriverError> {
        self.record(Event::SpeedKi(ki), "speed_ki")
    }

    fn set_control_mode(&mut self, mode: ControlMode) -> Result<(), DriverError> {
        self.record(Event::ControlMode(mode), "control_mode")
    }

    fn set_motor_direction(&mut self, direction: Direction) -> Result<(), DriverError> {
        self.record(Event::Direction(direction), "direction")
    }

    fn set_speed_reference(&mut self, rpm: u32) -> Result<(), DriverError> {
        self.record(Event::SpeedReference(rpm), "speed_reference")
    }

    fn motor_parameters_identification(&mut self, action: Action) -> Result<(), DriverError> {
        self.record(Event::Identification(action), "identification")
    }

    fn speed_feedback(&mut self) -> Result<i32, DriverError> {
        self.record(Event::ReadSpeed, "read_speed")?;
        Ok(self.speed_rpm)
    }

    fn quadrature_current_iq_feedback(&mut self) -> Result<f32, DriverError> {
        self.record(Event::ReadIq, "read_iq")?;
        Ok(self.iq_current_a)
    }

    fn board_temperature(&mut self) -> Result<f32, DriverError> {
        self.record(Event::ReadTemperature, "read_temperature")?;
        Ok(25.0)
    }
}

/// 不真正睡眠、只记录时长的 Pacer
pub struct RecordingPacer {
    log: EventLog,
    /// 第 N 次等待被关闭请求打断
    cancel_at: Option<usize>,
    waits: Cell<usize>,
    cancelled: Cell<bool>,
}

impl RecordingPacer {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            cancel_at: None,
            waits: Cell::new(0),
            cancelled: Cell::new(false),
        }
    }

    pub fn cancel_at(mut self, wait_index: usize) -> Self {
        self.cancel_at = Some(wait_index);
        self
    }

    pub fn waits(&self) -> usize {
        self.waits.get()
    }
}

impl Pacer for RecordingPacer {
    fn wait(&self, duration: Duration) -> WaitOutcome {
        if self.cancelled.get() {
            return WaitOutcome::Cancelled;
        }
        self.log.borrow_mut().push(Event::Wait(duration));
        let count = self.waits.get() + 1;
        self.waits.set(count);
        if self.cancel_at == Some(count) {
            self.cancelled.set(true);
            return WaitOutcome::Cancelled;
        }
        WaitOutcome::Elapsed
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
