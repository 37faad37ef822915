//! 反馈上报

use std::io::{self, Write};

use tracing::warn;

/// 一次阶段采样
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackSample {
    /// 所在循环序号（从 0 开始）
    pub cycle: u64,
    /// 阶段标签
    pub phase: String,
    /// 速度反馈（RPM）
    pub speed_rpm: i32,
    /// Iq 反馈（A），与转矩成正比
    pub iq_current_a: f32,
}

/// 反馈接收方
pub trait FeedbackSink {
    fn report(&mut self, sample: &FeedbackSample);
}

impl FeedbackSink for Vec<FeedbackSample> {
    fn report(&mut self, sample: &FeedbackSample) {
        self.push(sample.clone());
    }
}

/// 控制台输出
///
/// 每次采样输出两行：
///
/// ```text
/// Measured Speed[RPM]: 1500
/// Measured Iq/Torque[A]: 2
/// ```
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FeedbackSink for ConsoleReporter<W> {
    fn report(&mut self, sample: &FeedbackSample) {
        let result = writeln!(self.out, "Measured Speed[RPM]: {}", sample.speed_rpm)
            .and_then(|_| writeln!(self.out, "Measured Iq/Torque[A]: {}", sample.iq_current_a))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            warn!("Failed to write feedback: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(speed_rpm: i32, iq_current_a: f32) -> FeedbackSample {
        FeedbackSample {
            cycle: 0,
            phase: "reverse".to_string(),
            speed_rpm,
            iq_current_a,
        }
    }

    #[test]
    fn test_console_format() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.report(&sample(1500, 2.0));
        reporter.report(&sample(-2998, 0.75));
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            text,
            "Measured Speed[RPM]: 1500\nMeasured Iq/Torque[A]: 2\n\
             Measured Speed[RPM]: -2998\nMeasured Iq/Torque[A]: 0.75\n"
        );
    }

    #[test]
    fn test_vec_sink_collects() {
        let mut samples: Vec<FeedbackSample> = Vec::new();
        samples.report(&sample(1, 0.5));
        assert_eq!(samples, vec![sample(1, 0.5)]);
    }
}
