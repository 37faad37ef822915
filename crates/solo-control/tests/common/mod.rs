//! 测试公共设施

#![allow(dead_code)]

pub mod mock_controller;

pub use mock_controller::{Event, EventLog, MockController, RecordingPacer, new_log};
