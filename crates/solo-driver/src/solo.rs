//! 串口控制器实现

use solo_protocol::limits::{self, check_f32, check_u32};
use solo_protocol::{
    Action, CommandCode, CommandMode, ControlMode, Direction, FeedbackControlMode, MotorType,
    PACKET_LEN, SoloPacket, encode_fixed, u32_to_bytes_be,
};
use solo_serial::SerialTransport;
use tracing::{debug, warn};

use crate::{ConnectionConfig, DriverError, SoloMotorController};

/// 通过串口连接的 SOLO 控制器
///
/// 每条命令是一次请求/应答交换；超时或应答损坏时清空接收缓冲并重发，
/// 最多 `packet_failure_trials` 次。
pub struct Solo<T: SerialTransport> {
    transport: T,
    config: ConnectionConfig,
}

impl<T: SerialTransport> Solo<T> {
    /// 用已有传输创建句柄（不打开端口）
    pub fn new(transport: T, config: ConnectionConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
    }

    fn exchange_once(&mut self, request: &SoloPacket) -> Result<SoloPacket, DriverError> {
        self.transport.write_all(&request.encode())?;

        let mut buf = [0u8; PACKET_LEN];
        self.transport.read_exact(&mut buf)?;
        let reply = SoloPacket::decode(&buf)?;

        if reply.address != request.address {
            return Err(DriverError::WrongAddress {
                expected: request.address,
                actual: reply.address,
            });
        }
        if reply.command != request.command {
            return Err(DriverError::UnexpectedResponse {
                expected: request.command,
                actual: reply.command,
            });
        }
        if reply.is_error() {
            return Err(DriverError::Rejected {
                command: request.command,
            });
        }
        Ok(reply)
    }

    /// 发送命令并等待匹配的应答
    fn exchange(&mut self, command: CommandCode, data: [u8; 4]) -> Result<SoloPacket, DriverError> {
        if !self.transport.is_open() {
            return Err(DriverError::NotConnected);
        }

        let request = SoloPacket::new(self.config.device_address, command, data);
        let attempts = self.config.packet_failure_trials.max(1);

        for attempt in 1..=attempts {
            match self.exchange_once(&request) {
                Ok(reply) => return Ok(reply),
                Err(e) if e.is_transient() => {
                    debug!("{:?} attempt {}/{} failed: {}", command, attempt, attempts, e);
                    if let Err(clear_err) = self.transport.clear_input() {
                        warn!("Failed to clear serial input: {}", clear_err);
                    }
                },
                Err(e) => return Err(e),
            }
        }

        Err(DriverError::RetriesExhausted { command, attempts })
    }

    fn write(&mut self, command: CommandCode, data: [u8; 4]) -> Result<(), DriverError> {
        debug!("Write {:?} = {:02X?}", command, data);
        self.exchange(command, data).map(|_| ())
    }

    fn read(&mut self, command: CommandCode) -> Result<SoloPacket, DriverError> {
        self.exchange(command, [0; 4])
    }
}

impl<T: SerialTransport> SoloMotorController for Solo<T> {
    fn connect(&mut self) -> Result<(), DriverError> {
        self.transport.open()?;
        Ok(())
    }

    fn set_output_pwm_frequency_khz(&mut self, khz: u32) -> Result<(), DriverError> {
        let khz = check_u32("pwm_frequency_khz", khz, limits::PWM_FREQUENCY_KHZ)?;
        self.write(CommandCode::OutputPwmFrequencyKhz, u32_to_bytes_be(khz))
    }

    fn set_current_limit(&mut self, amps: f32) -> Result<(), DriverError> {
        let amps = check_f32("current_limit", amps, limits::CURRENT_LIMIT_A)?;
        self.write(CommandCode::CurrentLimit, encode_fixed("current_limit", amps)?)
    }

    fn set_motor_poles_counts(&mut self, poles: u32) -> Result<(), DriverError> {
        let poles = check_u32("motor_poles", poles, limits::MOTOR_POLES)?;
        self.write(CommandCode::MotorPolesCounts, u32_to_bytes_be(poles))
    }

    fn set_incremental_encoder_lines(&mut self, lines: u32) -> Result<(), DriverError> {
        let lines = check_u32("encoder_lines", lines, limits::ENCODER_LINES)?;
        self.write(CommandCode::IncrementalEncoderLines, u32_to_bytes_be(lines))
    }

    fn set_command_mode(&mut self, mode: CommandMode) -> Result<(), DriverError> {
        self.write(CommandCode::CommandMode, mode.to_data())
    }

    fn set_motor_type(&mut self, motor_type: MotorType) -> Result<(), DriverError> {
        self.write(CommandCode::MotorType, motor_type.to_data())
    }

    fn set_feedback_control_mode(&mut self, mode: FeedbackControlMode) -> Result<(), DriverError> {
        self.write(CommandCode::FeedbackControlMode, mode.to_data())
    }

    fn set_speed_controller_kp(&mut self, kp: f32) -> Result<(), DriverError> {
        let kp = check_f32("speed_kp", kp, limits::SPEED_CONTROLLER_GAIN)?;
        self.write(CommandCode::SpeedControllerKp, encode_fixed("speed_kp", kp)?)
    }

    fn set_speed_controller_ki(&mut self, ki: f32) -> Result<(), DriverError> {
        let ki = check_f32("speed_ki", ki, limits::SPEED_CONTROLLER_GAIN)?;
        self.write(CommandCode::SpeedControllerKi, encode_fixed("speed_ki", ki)?)
    }

    fn set_control_mode(&mut self, mode: ControlMode) -> Result<(), DriverError> {
        self.write(CommandCode::ControlMode, mode.to_data())
    }

    fn set_motor_direction(&mut self, direction: Direction) -> Result<(), DriverError> {
        self.write(CommandCode::MotorDirection, direction.to_data())
    }

    fn set_speed_reference(&mut self, rpm: u32) -> Result<(), DriverError> {
        let rpm = check_u32("speed_reference", rpm, limits::SPEED_REFERENCE_RPM)?;
        self.write(CommandCode::SpeedReference, u32_to_bytes_be(rpm))
    }

    fn motor_parameters_identification(&mut self, action: Action) -> Result<(), DriverError> {
        self.write(CommandCode::MotorParametersIdentification, action.to_data())
    }

    fn speed_feedback(&mut self) -> Result<i32, DriverError> {
        Ok(self.read(CommandCode::SpeedFeedback)?.data_i32())
    }

    fn quadrature_current_iq_feedback(&mut self) -> Result<f32, DriverError> {
        Ok(self.read(CommandCode::QuadratureCurrentIqFeedback)?.data_fixed())
    }

    fn board_temperature(&mut self) -> Result<f32, DriverError> {
        Ok(self.read(CommandCode::BoardTemperature)?.data_fixed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solo_serial::{MockDeviceState, MockTransport};

    fn connected(state: MockDeviceState) -> Solo<MockTransport> {
        let mut solo = Solo::new(MockTransport::with_state(state), ConnectionConfig::default());
        solo.connect().unwrap();
        solo
    }

    #[test]
    fn test_commands_before_connect_fail() {
        let mut solo = Solo::new(MockTransport::new(), ConnectionConfig::default());
        assert!(!solo.is_connected());
        assert!(matches!(
            solo.set_speed_reference(100),
            Err(DriverError::NotConnected)
        ));
        assert!(!solo.communication_is_working());
    }

    #[test]
    fn test_setter_writes_expected_bytes() {
        let mut solo = connected(MockDeviceState::default());
        solo.set_current_limit(7.0).unwrap();
        solo.set_motor_direction(Direction::Clockwise).unwrap();

        let state = solo.transport().state();
        let state = state.lock();
        assert_eq!(state.registers[&CommandCode::CurrentLimit], [0x00, 0x0E, 0x00, 0x00]);
        assert_eq!(state.registers[&CommandCode::MotorDirection], [0, 0, 0, 1]);
    }

    #[test]
    fn test_out_of_range_sends_nothing() {
        let mut solo = connected(MockDeviceState::default());
        let err = solo.set_output_pwm_frequency_khz(200).unwrap_err();
        assert!(matches!(err, DriverError::Protocol(_)));
        assert!(solo.transport().state().lock().received.is_empty());
    }

    #[test]
    fn test_retries_after_dropped_replies() {
        let mut solo = connected(MockDeviceState {
            drop_replies: 3,
            speed_feedback_rpm: 1234,
            ..Default::default()
        });
        assert_eq!(solo.speed_feedback().unwrap(), 1234);
        assert_eq!(solo.transport().state().lock().received.len(), 4);
    }

    #[test]
    fn test_retries_exhausted() {
        let mut solo = connected(MockDeviceState {
            unresponsive: true,
            ..Default::default()
        });
        let err = solo.board_temperature().unwrap_err();
        assert!(matches!(
            err,
            DriverError::RetriesExhausted {
                command: CommandCode::BoardTemperature,
                attempts: 10
            }
        ));
        assert!(!solo.communication_is_working());
    }

    #[test]
    fn test_rejected_is_not_retried() {
        let mut state = MockDeviceState::default();
        state.rejected.insert(CommandCode::ControlMode);
        let mut solo = connected(state);
        let err = solo.set_control_mode(ControlMode::Speed).unwrap_err();
        assert!(matches!(err, DriverError::Rejected { .. }));
        assert_eq!(solo.transport().state().lock().received.len(), 1);
    }

    #[test]
    fn test_device_address_is_used() {
        let mut solo = Solo::new(
            MockTransport::with_state(MockDeviceState {
                address: 5,
                ..Default::default()
            }),
            ConnectionConfig {
                device_address: 5,
                ..Default::default()
            },
        );
        solo.connect().unwrap();
        assert!(solo.communication_is_working());
    }

    #[test]
    fn test_retries_after_malformed_and_mismatched_replies() {
        let mut solo = connected(MockDeviceState {
            corrupt_replies: 1,
            wrong_command_replies: 1,
            wrong_address_replies: 1,
            speed_feedback_rpm: 1500,
            ..Default::default()
        });
        assert_eq!(solo.speed_feedback().unwrap(), 1500);
        assert_eq!(solo.transport().state().lock().received.len(), 4);
    }

    #[test]
    fn test_persistent_wrong_address_exhausts_retries() {
        let mut solo = connected(MockDeviceState {
            wrong_address_replies: u32::MAX,
            ..Default::default()
        });
        let err = solo.set_motor_direction(Direction::Clockwise).unwrap_err();
        assert!(matches!(
            err,
            DriverError::RetriesExhausted {
                command: CommandCode::MotorDirection,
                attempts: 10
            }
        ));
    }

    #[test]
    fn test_persistent_wrong_command_exhausts_retries() {
        let mut solo = Solo::new(
            MockTransport::with_state(MockDeviceState {
                wrong_command_replies: u32::MAX,
                board_temperature_c: 30.0,
                ..Default::default()
            }),
            ConnectionConfig {
                packet_failure_trials: 2,
                ..Default::default()
            },
        );
        solo.connect().unwrap();
        assert!(!solo.communication_is_working());
        assert_eq!(solo.transport().state().lock().received.len(), 2);
    }
}
