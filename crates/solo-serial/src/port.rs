//! 基于 `serialport` 的串口实现
//!
//! 固定 8N1、无流控，读超时等于命令超时。

use std::io::{self, Read, Write};

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, trace};

use crate::{LinkSettings, SerialDeviceError, SerialDeviceErrorKind, SerialError, SerialTransport};

/// 系统串口传输
pub struct SerialPortTransport {
    settings: LinkSettings,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortTransport {
    /// 创建传输对象（不打开端口）
    pub fn new(settings: LinkSettings) -> Self {
        Self {
            settings,
            port: None,
        }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>, SerialError> {
        self.port.as_mut().ok_or(SerialError::NotOpen)
    }
}

fn map_open_error(port: &str, err: serialport::Error) -> SerialError {
    let kind = match err.kind() {
        serialport::ErrorKind::NoDevice => SerialDeviceErrorKind::NotFound,
        serialport::ErrorKind::InvalidInput => SerialDeviceErrorKind::InvalidConfig,
        serialport::ErrorKind::Io(io::ErrorKind::NotFound) => SerialDeviceErrorKind::NotFound,
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => {
            SerialDeviceErrorKind::AccessDenied
        },
        serialport::ErrorKind::Io(io::ErrorKind::ResourceBusy) => SerialDeviceErrorKind::Busy,
        _ => SerialDeviceErrorKind::Unknown,
    };
    SerialError::Device(SerialDeviceError::new(
        kind,
        format!("{}: {}", port, err.description),
    ))
}

fn map_io_error(err: io::Error) -> SerialError {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => SerialError::Timeout,
        _ => SerialError::Io(err),
    }
}

impl SerialTransport for SerialPortTransport {
    fn open(&mut self) -> Result<(), SerialError> {
        // 重新打开前先释放旧句柄
        self.port = None;

        let port = serialport::new(&self.settings.port, self.settings.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.settings.read_timeout)
            .open()
            .map_err(|e| map_open_error(&self.settings.port, e))?;

        debug!(
            "Opened serial port {} at {} bps",
            self.settings.port, self.settings.baud_rate
        );
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!("Closed serial port {}", self.settings.port);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        trace!("TX {}", hex::encode(bytes));
        let port = self.port_mut()?;
        port.write_all(bytes).map_err(map_io_error)?;
        port.flush().map_err(map_io_error)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), SerialError> {
        let port = self.port_mut()?;
        port.read_exact(buf).map_err(map_io_error)?;
        trace!("RX {}", hex::encode(&*buf));
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), SerialError> {
        self.port_mut()?
            .clear(ClearBuffer::Input)
            .map_err(|e| SerialError::Io(e.into()))
    }
}
