use std::{
    fmt,
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use serde::{Deserialize, Serialize};

use crate::{
    AnimateError, AnimationConfig, Easing, FrameLoop, FrameSource, Result, Signal, TimingFunction,
};

/// Playback direction, named after the CSS `animation-direction` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Normal,
    Reverse,
    Alternate,
    AlternateReverse,
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Reverse => "reverse",
            Self::Alternate => "alternate",
            Self::AlternateReverse => "alternate-reverse",
        }
    }

    /// Whether the first iteration runs from `to` towards `from`.
    pub fn starts_reversed(self) -> bool {
        matches!(self, Self::Reverse | Self::AlternateReverse)
    }

    /// Whether the direction flips at every iteration boundary.
    pub fn alternates(self) -> bool {
        matches!(self, Self::Alternate | Self::AlternateReverse)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = AnimateError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "reverse" => Ok(Self::Reverse),
            "alternate" => Ok(Self::Alternate),
            "alternate-reverse" | "alternate_reverse" => Ok(Self::AlternateReverse),
            other => Err(AnimateError::invalid(format!("unknown direction `{other}`"))),
        }
    }
}

/// Value delivered to the transition callback once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Linear progress of the current iteration, clamped to `[0, 1]`.
    pub progress: f64,
    /// Eased value mapped onto the animation range.
    pub value: f64,
}

#[derive(Debug, Default)]
struct ControlFlags {
    stopped: AtomicBool,
    paused: AtomicBool,
    restart: AtomicBool,
    running: AtomicBool,
}

/// Cloneable control surface for an [`Animation`].
///
/// Every operation only flips a flag; the running loop observes it on its
/// next tick. Handles may be moved to other threads.
#[derive(Debug, Clone, Default)]
pub struct Controls {
    flags: Arc<ControlFlags>,
}

impl Controls {
    /// Requests that a running animation start over from its first
    /// iteration. Has no effect on an idle animation.
    pub fn restart(&self) {
        self.flags.restart.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.flags.stopped.store(true, Ordering::SeqCst);
    }

    pub fn pause(&self) {
        self.flags.paused.store(true, Ordering::SeqCst);
    }

    /// Resumes a paused animation (the `continue` operation).
    pub fn resume(&self) {
        self.flags.paused.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flags.stopped.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::SeqCst)
    }

    /// Whether a frame loop is currently driving the animation.
    pub fn is_running(&self) -> bool {
        self.flags.running.load(Ordering::SeqCst)
    }

    fn begin(&self) {
        self.flags.stopped.store(false, Ordering::SeqCst);
        self.flags.restart.store(false, Ordering::SeqCst);
        self.flags.running.store(true, Ordering::SeqCst);
    }

    fn finish(&self) {
        self.flags.running.store(false, Ordering::SeqCst);
    }

    fn take_restart(&self) -> bool {
        self.flags.restart.swap(false, Ordering::SeqCst)
    }
}

/// Mutable state of one playback, recreated by every [`Animation::start`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    sign: f64,
    iteration: u32,
}

impl PlaybackState {
    pub fn new(direction: Direction) -> Self {
        Self {
            sign: if direction.starts_reversed() { -1.0 } else { 1.0 },
            iteration: 0,
        }
    }

    /// Zero-based index of the iteration currently playing.
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Whether the current iteration reports values from `to` towards `from`.
    pub fn is_reversed(&self) -> bool {
        self.sign < 0.0
    }
}

type TransitionFn = Box<dyn FnMut(Tick)>;
type DoneFn = Box<dyn FnMut()>;

/// Interpolates `from..to` over `duration` milliseconds, once per frame.
pub struct Animation {
    from: f64,
    to: f64,
    duration: f64,
    iteration_count: u32,
    timing: TimingFunction,
    direction: Direction,
    transition: TransitionFn,
    done: Option<DoneFn>,
    controls: Controls,
}

impl Animation {
    /// Starts describing an animation over `from..to` lasting `duration`
    /// milliseconds per iteration.
    pub fn builder(from: f64, to: f64, duration: f64) -> AnimationBuilder {
        AnimationBuilder::new(from, to, duration)
    }

    pub fn controls(&self) -> Controls {
        self.controls.clone()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn iteration_count(&self) -> u32 {
        self.iteration_count
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Plays the animation on `source` and blocks until it stops.
    ///
    /// Clears a previous `stop` request and starts again from iteration zero.
    /// The paused flag is left as is, so an animation paused before `start`
    /// idles until resumed.
    pub fn start<S: FrameSource>(&mut self, source: S) {
        self.controls.begin();
        tracing::debug!(
            from = self.from,
            to = self.to,
            duration = self.duration,
            iterations = self.iteration_count,
            direction = %self.direction,
            "animation started"
        );

        let mut state = PlaybackState::new(self.direction);
        FrameLoop::run(source, |elapsed| self.step(&mut state, elapsed));

        self.controls.finish();
        tracing::debug!(iteration = state.iteration, "animation idle");
    }

    /// Advances `state` to `elapsed` milliseconds into the current iteration
    /// and reports what the frame loop should do next.
    pub fn step(&mut self, state: &mut PlaybackState, elapsed: f64) -> Signal {
        if self.controls.is_stopped() {
            return Signal::Stop;
        }
        if self.controls.take_restart() {
            *state = PlaybackState::new(self.direction);
            tracing::debug!("animation restarted from the first iteration");
            return Signal::Restart;
        }
        if self.controls.is_paused() {
            return Signal::Pause;
        }

        let progress = (elapsed / self.duration).min(1.0);
        let eased = self.from + (self.to - self.from) * self.timing.apply(progress);
        let value = if state.is_reversed() {
            self.from + (self.to - eased)
        } else {
            eased
        };

        (self.transition)(Tick { progress, value });

        if progress < 1.0 {
            return Signal::Continue;
        }

        state.iteration += 1;
        if self.direction.alternates() {
            state.sign = -state.sign;
        }

        if state.iteration < self.iteration_count {
            tracing::trace!(iteration = state.iteration, "next iteration");
            return Signal::Restart;
        }

        if let Some(done) = self.done.as_mut() {
            done();
        }
        Signal::Stop
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("iteration_count", &self.iteration_count)
            .field("timing", &self.timing)
            .field("direction", &self.direction)
            .field("controls", &self.controls)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Animation`]. Defaults: one iteration, linear timing,
/// [`Direction::Normal`], no `done` callback.
pub struct AnimationBuilder {
    from: f64,
    to: f64,
    duration: f64,
    iteration_count: u32,
    timing: TimingFunction,
    direction: Direction,
    transition: Option<TransitionFn>,
    done: Option<DoneFn>,
    controls: Controls,
}

impl AnimationBuilder {
    pub fn new(from: f64, to: f64, duration: f64) -> Self {
        Self {
            from,
            to,
            duration,
            iteration_count: 1,
            timing: TimingFunction::default(),
            direction: Direction::default(),
            transition: None,
            done: None,
            controls: Controls::default(),
        }
    }

    /// Seeds a builder from a deserialised config. Callbacks still have to be
    /// attached before [`build`](Self::build).
    pub fn from_config(config: &AnimationConfig) -> Self {
        let builder = Self::new(config.from, config.to, config.duration_ms)
            .iteration_count(config.iteration_count)
            .direction(config.direction);
        match config.easing.as_deref() {
            Some(name) => builder.easing_name(name),
            None => builder,
        }
    }

    /// Handle to the controls of the animation being built, so callbacks can
    /// capture it before the animation exists.
    pub fn controls(&self) -> Controls {
        self.controls.clone()
    }

    pub fn iteration_count(mut self, count: u32) -> Self {
        self.iteration_count = count;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.timing = TimingFunction::Named(easing);
        self
    }

    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }

    /// Selects a named curve. Unknown names fall back to linear timing.
    pub fn easing_name(self, name: &str) -> Self {
        match Easing::from_name(name) {
            Some(easing) => self.easing(easing),
            None => {
                tracing::warn!(name, "unknown easing curve, falling back to linear");
                self.easing(Easing::Linear)
            }
        }
    }

    pub fn on_transition<F>(mut self, transition: F) -> Self
    where
        F: FnMut(Tick) + 'static,
    {
        self.transition = Some(Box::new(transition));
        self
    }

    pub fn on_done<F>(mut self, done: F) -> Self
    where
        F: FnMut() + 'static,
    {
        self.done = Some(Box::new(done));
        self
    }

    /// Validates the parameters and produces the animation.
    pub fn build(self) -> Result<Animation> {
        if !self.from.is_finite() || !self.to.is_finite() {
            return Err(AnimateError::invalid(format!(
                "range bounds must be finite, got {}..{}",
                self.from, self.to
            )));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(AnimateError::invalid(format!(
                "duration must be a positive number of milliseconds, got {}",
                self.duration
            )));
        }
        if self.iteration_count < 1 {
            return Err(AnimateError::invalid("iteration count must be at least 1"));
        }
        let Some(transition) = self.transition else {
            return Err(AnimateError::invalid("a transition callback is required"));
        };

        Ok(Animation {
            from: self.from,
            to: self.to,
            duration: self.duration,
            iteration_count: self.iteration_count,
            timing: self.timing,
            direction: self.direction,
            transition,
            done: self.done,
            controls: self.controls,
        })
    }
}

impl fmt::Debug for AnimationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationBuilder")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("duration", &self.duration)
            .field("iteration_count", &self.iteration_count)
            .field("timing", &self.timing)
            .field("direction", &self.direction)
            .field("has_transition", &self.transition.is_some())
            .field("has_done", &self.done.is_some())
            .finish()
    }
}
