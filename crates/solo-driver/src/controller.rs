//! 控制器能力接口
//!
//! 上电配置与控制循环只依赖这个 trait，真实串口实现和测试替身都实现它。

use solo_protocol::{Action, CommandMode, ControlMode, Direction, FeedbackControlMode, MotorType};

use crate::DriverError;

/// SOLO 控制器的能力接口
///
/// 所有 setter 在设备确认后返回 `Ok(())`；是否检查返回值由调用方决定。
pub trait SoloMotorController {
    /// 打开（或重新打开）底层传输
    fn connect(&mut self) -> Result<(), DriverError>;

    /// 探测通信是否正常
    ///
    /// 默认实现读取板温，收到有效应答即认为正常。
    fn communication_is_working(&mut self) -> bool {
        self.board_temperature().is_ok()
    }

    fn set_output_pwm_frequency_khz(&mut self, khz: u32) -> Result<(), DriverError>;

    fn set_current_limit(&mut self, amps: f32) -> Result<(), DriverError>;

    fn set_motor_poles_counts(&mut self, poles: u32) -> Result<(), DriverError>;

    /// 增量编码器线数（四倍频前的 PPR）
    fn set_incremental_encoder_lines(&mut self, lines: u32) -> Result<(), DriverError>;

    fn set_command_mode(&mut self, mode: CommandMode) -> Result<(), DriverError>;

    fn set_motor_type(&mut self, motor_type: MotorType) -> Result<(), DriverError>;

    fn set_feedback_control_mode(&mut self, mode: FeedbackControlMode) -> Result<(), DriverError>;

    fn set_speed_controller_kp(&mut self, kp: f32) -> Result<(), DriverError>;

    fn set_speed_controller_ki(&mut self, ki: f32) -> Result<(), DriverError>;

    fn set_control_mode(&mut self, mode: ControlMode) -> Result<(), DriverError>;

    fn set_motor_direction(&mut self, direction: Direction) -> Result<(), DriverError>;

    /// 速度参考（RPM，方向由 `set_motor_direction` 决定）
    fn set_speed_reference(&mut self, rpm: u32) -> Result<(), DriverError>;

    /// 启动/停止电机参数辨识
    ///
    /// 设备不提供完成标志，调用方需自行等待。
    fn motor_parameters_identification(&mut self, action: Action) -> Result<(), DriverError>;

    /// 速度反馈（RPM）
    fn speed_feedback(&mut self) -> Result<i32, DriverError>;

    /// 交轴电流 Iq 反馈（A）
    fn quadrature_current_iq_feedback(&mut self) -> Result<f32, DriverError>;

    /// 板温（°C）
    fn board_temperature(&mut self) -> Result<f32, DriverError>;
}
