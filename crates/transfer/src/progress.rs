use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;

use cofre_protocol::types::TransferMode;

/// A progress snapshot for one transfer.
///
/// In chunked mode `percent` advances per acknowledged chunk
/// (`(index + 1) / total_chunks * 100`); in single mode it tracks bytes of
/// the request body on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferUpdate {
    /// Remote name of the file being transferred.
    pub file: String,
    pub mode: TransferMode,
    pub transferred_bytes: u64,
    pub total_bytes: u64,
    /// 0–100.
    pub percent: f64,
}

/// Sends progress updates without ever blocking the transfer.
///
/// Wraps an mpsc sender; when the receiver lags, updates are dropped on
/// the floor rather than stalling the chunk loop. A disabled sender
/// swallows everything, so library callers that don't care about progress
/// pay nothing.
#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: Option<mpsc::Sender<TransferUpdate>>,
}

impl ProgressSender {
    /// A sender that reports into `tx`.
    pub fn new(tx: mpsc::Sender<TransferUpdate>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sender that discards every update.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Reports one update. Never blocks; drops on a full channel.
    pub fn send(&self, update: TransferUpdate) {
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(update);
        }
    }
}

/// Creates a progress channel with the given buffer capacity.
pub fn progress_channel(capacity: usize) -> (ProgressSender, mpsc::Receiver<TransferUpdate>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ProgressSender::new(tx), rx)
}

// ---------------------------------------------------------------------------
// SpeedCalculator
// ---------------------------------------------------------------------------

struct SpeedSample {
    bytes: u64,
    timestamp: Instant,
}

/// Transfer speed over a sliding window of samples.
pub struct SpeedCalculator {
    inner: Mutex<SpeedInner>,
}

struct SpeedInner {
    samples: VecDeque<SpeedSample>,
    max_samples: usize,
    window: Duration,
}

impl Default for SpeedCalculator {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 100)
    }
}

impl SpeedCalculator {
    /// Creates a calculator keeping at most `max_samples` samples inside
    /// the `window`.
    pub fn new(window: Duration, max_samples: usize) -> Self {
        Self {
            inner: Mutex::new(SpeedInner {
                samples: VecDeque::new(),
                max_samples,
                window,
            }),
        }
    }

    /// Records `bytes` transferred at the current instant.
    pub fn add_sample(&self, bytes: u64) {
        let mut s = self.inner.lock().unwrap();
        let now = Instant::now();
        s.samples.push_back(SpeedSample {
            bytes,
            timestamp: now,
        });

        let cutoff = now - s.window;
        while s
            .samples
            .front()
            .is_some_and(|sample| sample.timestamp < cutoff)
        {
            s.samples.pop_front();
        }
        while s.samples.len() > s.max_samples {
            s.samples.pop_front();
        }
    }

    /// Average speed in bytes/second over the window. 0.0 with fewer than
    /// two samples.
    pub fn bytes_per_second(&self) -> f64 {
        let s = self.inner.lock().unwrap();
        if s.samples.len() < 2 {
            return 0.0;
        }

        let first = &s.samples[0];
        let last = &s.samples[s.samples.len() - 1];
        let elapsed = last.timestamp.duration_since(first.timestamp);
        if elapsed.is_zero() {
            return 0.0;
        }

        let total: u64 = s.samples.iter().map(|sample| sample.bytes).sum();
        total as f64 / elapsed.as_secs_f64()
    }

    /// Estimated time to move `remaining_bytes`, `None` at zero speed.
    pub fn eta(&self, remaining_bytes: u64) -> Option<Duration> {
        let speed = self.bytes_per_second();
        if speed <= 0.0 {
            return None;
        }
        Some(Duration::from_secs_f64(remaining_bytes as f64 / speed))
    }

    /// Drops all samples.
    pub fn reset(&self) {
        self.inner.lock().unwrap().samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_sender_swallows_updates() {
        let sender = ProgressSender::disabled();
        sender.send(TransferUpdate {
            file: "a.bin".into(),
            mode: TransferMode::Single,
            transferred_bytes: 1,
            total_bytes: 2,
            percent: 50.0,
        });
        // No panic, nothing to assert.
    }

    #[tokio::test]
    async fn sender_delivers_updates() {
        let (sender, mut rx) = progress_channel(8);
        sender.send(TransferUpdate {
            file: "a.bin".into(),
            mode: TransferMode::Chunked,
            transferred_bytes: 5,
            total_bytes: 10,
            percent: 50.0,
        });
        let update = rx.recv().await.unwrap();
        assert_eq!(update.file, "a.bin");
        assert_eq!(update.percent, 50.0);
    }

    #[tokio::test]
    async fn full_channel_drops_instead_of_blocking() {
        let (sender, mut rx) = progress_channel(1);
        for i in 0..10 {
            sender.send(TransferUpdate {
                file: "a.bin".into(),
                mode: TransferMode::Chunked,
                transferred_bytes: i,
                total_bytes: 10,
                percent: i as f64 * 10.0,
            });
        }
        // Exactly one update fits; the rest were dropped.
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn speed_zero_without_samples() {
        let calc = SpeedCalculator::default();
        assert_eq!(calc.bytes_per_second(), 0.0);
        assert!(calc.eta(1000).is_none());
    }

    #[test]
    fn speed_zero_with_single_sample() {
        let calc = SpeedCalculator::default();
        calc.add_sample(100);
        assert_eq!(calc.bytes_per_second(), 0.0);
    }

    #[test]
    fn speed_positive_with_spaced_samples() {
        let calc = SpeedCalculator::new(Duration::from_secs(10), 100);
        calc.add_sample(500);
        std::thread::sleep(Duration::from_millis(50));
        calc.add_sample(500);

        assert!(calc.bytes_per_second() > 0.0);
        assert!(calc.eta(10_000).unwrap().as_secs_f64() > 0.0);
    }

    #[test]
    fn sample_count_is_bounded() {
        let calc = SpeedCalculator::new(Duration::from_secs(60), 5);
        for i in 0..20 {
            calc.add_sample(i * 10);
        }
        assert!(calc.inner.lock().unwrap().samples.len() <= 5);
    }

    #[test]
    fn reset_clears_samples() {
        let calc = SpeedCalculator::default();
        calc.add_sample(100);
        calc.add_sample(200);
        calc.reset();
        assert_eq!(calc.bytes_per_second(), 0.0);
    }
}
