use std::{
    collections::VecDeque,
    thread,
    time::{Duration, Instant},
};

/// Per-tick instruction returned by a step function to the [`FrameLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Request the next tick; the time origin is unchanged.
    Continue,
    /// Reset the time origin to the current tick.
    Restart,
    /// Keep polling without advancing elapsed time.
    Pause,
    /// Cancel the frame source and return.
    Stop,
}

/// Host primitive that delivers frame timestamps.
///
/// Timestamps are milliseconds on an arbitrary monotonic clock and must be
/// non-decreasing. Returning `None` means the source will not fire again.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<f64>;

    /// Tells the source that no further frames will be requested.
    fn cancel(&mut self) {}
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn next_frame(&mut self) -> Option<f64> {
        (**self).next_frame()
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }
}

/// Real-time frame source that paces frames at a fixed rate using the
/// current thread.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    frame_interval: Duration,
    started: Option<Instant>,
    next_deadline: Option<Instant>,
    cancelled: bool,
}

impl PlaybackClock {
    /// Creates a clock that fires `fps` times per second.
    pub fn with_fps(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            frame_interval: Duration::from_secs_f64(1.0 / f64::from(fps)),
            started: None,
            next_deadline: None,
            cancelled: false,
        }
    }

    /// Forgets the first frame so the clock can drive another loop.
    pub fn reset(&mut self) {
        self.started = None;
        self.next_deadline = None;
        self.cancelled = false;
    }
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::with_fps(60)
    }
}

impl FrameSource for PlaybackClock {
    fn next_frame(&mut self) -> Option<f64> {
        if self.cancelled {
            return None;
        }

        let now = Instant::now();
        let Some(started) = self.started else {
            self.started = Some(now);
            self.next_deadline = Some(now + self.frame_interval);
            return Some(0.0);
        };

        let deadline = self.next_deadline.unwrap_or(now);
        if now < deadline {
            thread::sleep(deadline - now);
            self.next_deadline = Some(deadline + self.frame_interval);
        } else {
            // Fell behind; pace from now instead of bursting to catch up.
            self.next_deadline = Some(now + self.frame_interval);
        }

        Some(started.elapsed().as_secs_f64() * 1000.0)
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }
}

#[derive(Debug, Clone)]
enum Script {
    Listed(VecDeque<f64>),
    /// `index * interval` for every index whose timestamp is within `until`.
    Stepped { interval: f64, until: f64, next: u64 },
}

impl Default for Script {
    fn default() -> Self {
        Self::Listed(VecDeque::new())
    }
}

/// Synthetic frame source replaying scripted timestamps. Used to drive
/// animations deterministically from tests and from the `sample` command.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFrames {
    script: Script,
    delivered: usize,
    cancelled: bool,
}

impl ScriptedFrames {
    pub fn new(timestamps: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: Script::Listed(timestamps.into_iter().collect()),
            delivered: 0,
            cancelled: false,
        }
    }

    /// Evenly spaced timestamps `0, interval, 2 * interval, ...` up to and
    /// including `until`. Frames are computed on demand.
    pub fn every(interval: f64, until: f64) -> Self {
        let interval = if interval > 0.0 && interval.is_finite() {
            interval
        } else {
            1.0
        };
        Self {
            script: Script::Stepped {
                interval,
                until,
                next: 0,
            },
            delivered: 0,
            cancelled: false,
        }
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Frames left to deliver, saturating at `usize::MAX`.
    pub fn remaining(&self) -> usize {
        match &self.script {
            Script::Listed(pending) => pending.len(),
            Script::Stepped {
                interval,
                until,
                next,
            } => {
                let last = (until / interval).floor();
                if last.is_nan() || last < *next as f64 {
                    0
                } else {
                    // Float to int casts saturate.
                    ((last - *next as f64) as usize).saturating_add(1)
                }
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

impl FrameSource for ScriptedFrames {
    fn next_frame(&mut self) -> Option<f64> {
        if self.cancelled {
            return None;
        }
        let frame = match &mut self.script {
            Script::Listed(pending) => pending.pop_front()?,
            Script::Stepped {
                interval,
                until,
                next,
            } => {
                let at = *next as f64 * *interval;
                if until.is_nan() || at > *until {
                    return None;
                }
                *next += 1;
                at
            }
        };
        self.delivered += 1;
        Some(frame)
    }

    fn cancel(&mut self) {
        self.cancelled = true;
    }
}

/// Elapsed-time bookkeeping for one run of the loop.
#[derive(Debug, Default, Clone)]
struct LoopClock {
    origin: Option<f64>,
    paused_at: Option<f64>,
    paused_total: f64,
}

impl LoopClock {
    fn elapsed(&mut self, now: f64) -> f64 {
        let origin = *self.origin.get_or_insert(now);
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += (now - paused_at).max(0.0);
        }
        (now - origin - self.paused_total).max(0.0)
    }

    fn observe(&mut self, signal: Signal, now: f64) {
        match signal {
            Signal::Continue | Signal::Stop => {}
            Signal::Restart => {
                self.origin = Some(now);
                self.paused_total = 0.0;
            }
            Signal::Pause => self.paused_at = Some(now),
        }
    }
}

/// Pumps frame timestamps into a step function until it signals
/// [`Signal::Stop`]. The loop knows nothing about what the step computes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameLoop;

impl FrameLoop {
    /// Runs `step` once per frame with the time elapsed since the loop's
    /// origin, excluding time spent paused.
    ///
    /// Returns when `step` yields [`Signal::Stop`] or when the source stops
    /// producing frames. There is no timeout: a source that never fires keeps
    /// the caller blocked.
    pub fn run<S, F>(mut source: S, mut step: F)
    where
        S: FrameSource,
        F: FnMut(f64) -> Signal,
    {
        let mut clock = LoopClock::default();
        let mut ticks = 0usize;

        while let Some(now) = source.next_frame() {
            let elapsed = clock.elapsed(now);
            let signal = step(elapsed);
            ticks += 1;

            if signal == Signal::Stop {
                source.cancel();
                tracing::debug!(ticks, "frame loop stopped");
                return;
            }
            clock.observe(signal, now);
        }

        tracing::debug!(ticks, "frame source exhausted");
    }
}
