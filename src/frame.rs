use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Wall-clock delta between consecutive frames.
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Seconds since the previous call; zero on the first.
    pub fn delta(&mut self) -> f32 {
        self.delta_at(Instant::now())
    }

    fn delta_at(&mut self, now: Instant) -> f32 {
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        delta
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Gate for the per-frame update. Started once the character is in the
/// scene; never stopped.
#[derive(Debug, Default)]
pub struct FrameDriver {
    running: bool,
    frames: u64,
}

/// One frame's worth of work handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    pub index: u64,
    pub delta: f32,
}

impl FrameDriver {
    pub fn start(&mut self) {
        if !self.running {
            log::debug!("Frame driver started");
        }
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// `None` until started.
    pub fn tick(&mut self, delta: f32) -> Option<FrameTick> {
        if !self.running {
            return None;
        }
        let tick = FrameTick {
            index: self.frames,
            delta,
        };
        self.frames += 1;
        Some(tick)
    }
}

const STATS_WINDOW: Duration = Duration::from_secs(1);

/// Rolling frame-rate over the last second.
#[derive(Debug, Default)]
pub struct FrameStats {
    samples: VecDeque<(Instant, f32)>,
    frames: u64,
}

impl FrameStats {
    pub fn record(&mut self, tick: FrameTick) {
        self.frames = tick.index + 1;
        self.record_at(Instant::now(), tick.delta);
    }

    /// Frames rendered since the driver started.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn record_at(&mut self, now: Instant, delta: f32) {
        self.samples.push_back((now, delta));
        while let Some(&(at, _)) = self.samples.front() {
            if now.saturating_duration_since(at) > STATS_WINDOW {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn fps(&self) -> f32 {
        let total: f32 = self.samples.iter().map(|(_, d)| d).sum();
        if total > 0.0 {
            self.samples.len() as f32 / total
        } else {
            0.0
        }
    }

    pub fn frame_ms(&self) -> f32 {
        self.samples.back().map(|(_, d)| d * 1000.0).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_ticks_only_after_start() {
        let mut driver = FrameDriver::default();
        assert_eq!(driver.tick(0.016), None);

        driver.start();
        driver.start();
        assert_eq!(driver.tick(0.016), Some(FrameTick { index: 0, delta: 0.016 }));
        assert_eq!(driver.tick(0.016).map(|t| t.index), Some(1));
    }

    #[test]
    fn stats_count_frames_from_ticks() {
        let mut driver = FrameDriver::default();
        let mut stats = FrameStats::default();
        driver.start();
        for _ in 0..3 {
            if let Some(tick) = driver.tick(0.02) {
                stats.record(tick);
            }
        }
        assert_eq!(stats.frames(), 3);
        assert!((stats.frame_ms() - 20.0).abs() < 1e-3);
    }

    #[test]
    fn clock_first_delta_is_zero() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        assert_eq!(clock.delta_at(start), 0.0);
        let delta = clock.delta_at(start + Duration::from_millis(250));
        assert!((delta - 0.25).abs() < 1e-4);
    }

    #[test]
    fn stats_drop_samples_older_than_a_second() {
        let mut stats = FrameStats::default();
        let start = Instant::now();
        stats.record_at(start, 0.5);
        for i in 1..=4 {
            stats.record_at(start + Duration::from_millis(1000 + i * 100), 0.1);
        }
        assert_eq!(stats.samples.len(), 4);
        assert!((stats.fps() - 10.0).abs() < 1e-3);
        assert!((stats.frame_ms() - 100.0).abs() < 1e-3);
    }
}
