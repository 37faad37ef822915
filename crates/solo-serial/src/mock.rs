//! Mock 串口
//!
//! 模拟一台 SOLO 控制器：解析写入的请求包，记录命令，
//! 按协议生成应答。用于无硬件测试。

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;
use solo_protocol::{CommandCode, ERROR_DATA, PACKET_LEN, SoloPacket, encode_fixed};

use crate::{SerialDeviceError, SerialDeviceErrorKind, SerialError, SerialTransport};

/// 模拟设备状态
#[derive(Debug, Clone)]
pub struct MockDeviceState {
    /// 设备地址，地址不匹配的请求不应答
    pub address: u8,
    /// 剩余的打开失败次数
    pub fail_opens: u32,
    /// 累计打开次数
    pub open_attempts: u32,
    /// 完全不应答（模拟掉电/断线）
    pub unresponsive: bool,
    /// 接下来 N 个请求不应答
    pub drop_replies: u32,
    /// 接下来 N 个应答包尾损坏
    pub corrupt_replies: u32,
    /// 接下来 N 个应答带错误的命令码
    pub wrong_command_replies: u32,
    /// 接下来 N 个应答带错误的地址
    pub wrong_address_replies: u32,
    /// 拒绝的命令（应答 0xEEEEEEEE）
    pub rejected: HashSet<CommandCode>,
    /// 写命令最后写入的数据
    pub registers: HashMap<CommandCode, [u8; 4]>,
    /// 速度反馈（RPM）
    pub speed_feedback_rpm: i32,
    /// Iq 反馈（A）
    pub iq_feedback_a: f32,
    /// 板温（°C）
    pub board_temperature_c: f32,
    /// 收到的全部请求（按顺序）
    pub received: Vec<SoloPacket>,
    /// 待读出的应答字节
    pub pending: VecDeque<u8>,
}

impl Default for MockDeviceState {
    fn default() -> Self {
        Self {
            address: 0,
            fail_opens: 0,
            open_attempts: 0,
            unresponsive: false,
            drop_replies: 0,
            corrupt_replies: 0,
            wrong_command_replies: 0,
            wrong_address_replies: 0,
            rejected: HashSet::new(),
            registers: HashMap::new(),
            speed_feedback_rpm: 0,
            iq_feedback_a: 0.0,
            board_temperature_c: 25.0,
            received: Vec::new(),
            pending: VecDeque::new(),
        }
    }
}

impl MockDeviceState {
    /// 收到的写命令码序列（不含读命令）
    pub fn write_commands(&self) -> Vec<CommandCode> {
        self.received
            .iter()
            .map(|p| p.command)
            .filter(|c| !c.is_read())
            .collect()
    }

    fn reply_for(&mut self, request: SoloPacket) -> Option<SoloPacket> {
        if request.address != self.address || self.unresponsive {
            return None;
        }
        if self.drop_replies > 0 {
            self.drop_replies -= 1;
            return None;
        }
        if self.rejected.contains(&request.command) {
            return Some(SoloPacket::new(request.address, request.command, ERROR_DATA));
        }

        let data = match request.command {
            CommandCode::SpeedFeedback => self.speed_feedback_rpm.to_be_bytes(),
            CommandCode::QuadratureCurrentIqFeedback => {
                encode_fixed("iq", self.iq_feedback_a).unwrap_or([0; 4])
            },
            CommandCode::BoardTemperature => {
                encode_fixed("temperature", self.board_temperature_c).unwrap_or([0; 4])
            },
            cmd if cmd.is_read() => [0; 4],
            cmd => {
                self.registers.insert(cmd, request.data);
                request.data
            },
        };
        Some(SoloPacket::new(request.address, request.command, data))
    }

    /// 按注入的故障改写应答，每个应答最多一种故障
    fn reply_bytes(&mut self, reply: SoloPacket) -> [u8; PACKET_LEN] {
        let mut bytes = reply.encode();
        if self.corrupt_replies > 0 {
            self.corrupt_replies -= 1;
            bytes[PACKET_LEN - 1] = 0x00;
        } else if self.wrong_command_replies > 0 {
            self.wrong_command_replies -= 1;
            let other = if reply.command == CommandCode::SpeedFeedback {
                CommandCode::BoardTemperature
            } else {
                CommandCode::SpeedFeedback
            };
            bytes[3] = other.into();
        } else if self.wrong_address_replies > 0 {
            self.wrong_address_replies -= 1;
            bytes[2] = reply.address.wrapping_add(1);
        }
        bytes
    }
}

/// Mock 串口传输
pub struct MockTransport {
    state: Arc<Mutex<MockDeviceState>>,
    open: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::with_state(MockDeviceState::default())
    }

    pub fn with_state(state: MockDeviceState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            open: false,
        }
    }

    /// 共享的设备状态句柄（测试中用于注入故障和检查命令）
    pub fn state(&self) -> Arc<Mutex<MockDeviceState>> {
        Arc::clone(&self.state)
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialTransport for MockTransport {
    fn open(&mut self) -> Result<(), SerialError> {
        let mut state = self.state.lock();
        state.open_attempts += 1;
        if state.fail_opens > 0 {
            state.fail_opens -= 1;
            self.open = false;
            return Err(SerialError::Device(SerialDeviceError::new(
                SerialDeviceErrorKind::NotFound,
                "mock port unavailable",
            )));
        }
        state.pending.clear();
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        if !self.open {
            return Err(SerialError::NotOpen);
        }
        let mut state = self.state.lock();
        // 畸形包被设备静默丢弃
        let Ok(request) = SoloPacket::decode(bytes) else {
            return Ok(());
        };
        state.received.push(request);
        if let Some(reply) = state.reply_for(request) {
            let bytes = state.reply_bytes(reply);
            state.pending.extend(bytes);
        }
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SerialError> {
        if !self.open {
            return Err(SerialError::NotOpen);
        }
        let mut state = self.state.lock();
        if state.pending.len() < buf.len() {
            state.pending.clear();
            return Err(SerialError::Timeout);
        }
        for byte in buf.iter_mut() {
            *byte = state.pending.pop_front().unwrap_or_default();
        }
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), SerialError> {
        self.state.lock().pending.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solo_protocol::u32_to_bytes_be;

    fn exchange(
        transport: &mut MockTransport,
        packet: SoloPacket,
    ) -> Result<SoloPacket, SerialError> {
        transport.write_all(&packet.encode())?;
        let mut buf = [0u8; PACKET_LEN];
        transport.read_exact(&mut buf)?;
        Ok(SoloPacket::decode(&buf).unwrap())
    }

    #[test]
    fn test_write_is_echoed_and_stored() {
        let mut transport = MockTransport::new();
        transport.open().unwrap();
        let request = SoloPacket::new(0, CommandCode::SpeedReference, u32_to_bytes_be(1500));
        let reply = exchange(&mut transport, request).unwrap();
        assert_eq!(reply, request);
        assert_eq!(
            transport.state().lock().registers[&CommandCode::SpeedReference],
            u32_to_bytes_be(1500)
        );
    }

    #[test]
    fn test_feedback_reads() {
        let mut transport = MockTransport::new();
        {
            let state = transport.state();
            let mut state = state.lock();
            state.speed_feedback_rpm = -1500;
            state.iq_feedback_a = 2.0;
        }
        transport.open().unwrap();
        let speed = exchange(
            &mut transport,
            SoloPacket::read_request(0, CommandCode::SpeedFeedback),
        )
        .unwrap();
        assert_eq!(speed.data_i32(), -1500);
        let iq = exchange(
            &mut transport,
            SoloPacket::read_request(0, CommandCode::QuadratureCurrentIqFeedback),
        )
        .unwrap();
        assert_eq!(iq.data_fixed(), 2.0);
    }

    #[test]
    fn test_failed_opens_then_success() {
        let mut transport = MockTransport::with_state(MockDeviceState {
            fail_opens: 2,
            ..Default::default()
        });
        assert!(transport.open().is_err());
        assert!(transport.open().is_err());
        assert!(transport.open().is_ok());
        assert_eq!(transport.state().lock().open_attempts, 3);
    }

    #[test]
    fn test_unresponsive_and_wrong_address_time_out() {
        let mut transport = MockTransport::with_state(MockDeviceState {
            address: 3,
            ..Default::default()
        });
        transport.open().unwrap();
        let request = SoloPacket::read_request(0, CommandCode::BoardTemperature);
        let err = exchange(&mut transport, request);
        assert!(matches!(err, Err(SerialError::Timeout)));

        transport.state().lock().unresponsive = true;
        let request = SoloPacket::read_request(3, CommandCode::BoardTemperature);
        let err = exchange(&mut transport, request);
        assert!(matches!(err, Err(SerialError::Timeout)));
    }

    #[test]
    fn test_rejected_command_replies_error_data() {
        let mut transport = MockTransport::new();
        transport.state().lock().rejected.insert(CommandCode::CurrentLimit);
        transport.open().unwrap();
        let reply = exchange(
            &mut transport,
            SoloPacket::new(0, CommandCode::CurrentLimit, [0, 0x0E, 0, 0]),
        )
        .unwrap();
        assert!(reply.is_error());
    }

    #[test]
    fn test_injected_reply_faults() {
        let mut transport = MockTransport::with_state(MockDeviceState {
            corrupt_replies: 1,
            wrong_command_replies: 1,
            wrong_address_replies: 1,
            ..Default::default()
        });
        transport.open().unwrap();
        let request = SoloPacket::read_request(0, CommandCode::SpeedFeedback);
        let mut raw = || {
            transport.write_all(&request.encode()).unwrap();
            let mut buf = [0u8; PACKET_LEN];
            transport.read_exact(&mut buf).unwrap();
            buf
        };

        let corrupt = raw();
        assert_eq!(corrupt[PACKET_LEN - 1], 0x00);
        assert!(SoloPacket::decode(&corrupt).is_err());

        let wrong_command = SoloPacket::decode(&raw()).unwrap();
        assert_eq!(wrong_command.command, CommandCode::BoardTemperature);

        let wrong_address = SoloPacket::decode(&raw()).unwrap();
        assert_eq!(wrong_address.address, 1);

        assert_eq!(SoloPacket::decode(&raw()).unwrap(), request);
    }
}
