use tracing::{debug, info};

use crate::engine::{CountdownMode, Mode, TickOutcome, TimerEngine};
use crate::util::format_time;
use crate::wave::{self, ColorPair, WaveAnimator};

pub const DEFAULT_TASK: &str = "Focus on your work";

/// Trimmed task text, never empty
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskLabel(String);

impl TaskLabel {
    pub fn new(text: &str) -> Self {
        match text.trim() {
            "" => Self::default(),
            trimmed => Self(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TaskLabel {
    fn default() -> Self {
        Self(DEFAULT_TASK.to_string())
    }
}

impl std::fmt::Display for TaskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the host UI needs to draw one frame
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub mode: Mode,
    pub remaining: u32,
    pub total_duration: u32,
    pub running: bool,
    pub task_label: String,
    pub noise_enabled: bool,
    pub fill_fraction: f64,
    pub phase: u32,
    pub colors: ColorPair,
}

impl Snapshot {
    /// `MM:SS` text for the time overlay
    pub fn time_text(&self) -> String {
        format_time(i64::from(self.remaining))
    }

    pub fn status_text(&self) -> &'static str {
        match (self.mode, self.running) {
            (Mode::Flow, _) => "Flow",
            (_, true) => "Running",
            (_, false) => "Paused",
        }
    }
}

/// A single focus timer with its wave animation and user-facing extras
#[derive(Clone, Debug)]
pub struct FocusSession {
    engine: TimerEngine,
    animator: WaveAnimator,
    task: TaskLabel,
    noise_enabled: bool,
}

impl FocusSession {
    pub fn new(start_mode: CountdownMode, task: &str, noise_enabled: bool) -> Self {
        Self {
            engine: TimerEngine::with_mode(start_mode),
            animator: WaveAnimator::new(),
            task: TaskLabel::new(task),
            noise_enabled,
        }
    }

    pub fn mode(&self) -> Mode {
        self.engine.mode()
    }

    /// Seconds left for a countdown, seconds elapsed in Flow
    pub fn remaining(&self) -> u32 {
        self.engine.remaining()
    }

    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    pub fn task(&self) -> &TaskLabel {
        &self.task
    }

    pub fn set_task(&mut self, text: &str) {
        self.task = TaskLabel::new(text);
        info!(task = %self.task, "task updated");
    }

    pub fn noise_enabled(&self) -> bool {
        self.noise_enabled
    }

    pub fn toggle_noise(&mut self) {
        self.noise_enabled = !self.noise_enabled;
        debug!(enabled = self.noise_enabled, "ambient noise toggled");
    }

    pub fn toggle(&mut self) {
        self.engine.toggle();
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }

    pub fn switch_mode(&mut self, mode: CountdownMode) -> bool {
        self.engine.switch_mode(mode)
    }

    /// Once-per-second countdown step
    pub fn on_tick(&mut self) -> TickOutcome {
        self.engine.tick()
    }

    /// Animation step. The phase only moves while the timer runs.
    pub fn on_frame(&mut self) {
        if self.engine.is_running() {
            self.animator.advance();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.engine.state();
        let params = wave::render(
            state.remaining,
            state.total_duration,
            state.mode,
            self.animator.phase(),
        );
        Snapshot {
            mode: state.mode,
            remaining: state.remaining,
            total_duration: state.total_duration,
            running: state.running,
            task_label: self.task.to_string(),
            noise_enabled: self.noise_enabled,
            fill_fraction: params.fill_fraction,
            phase: params.phase,
            colors: params.colors,
        }
    }
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::new(CountdownMode::Focus, DEFAULT_TASK, false)
    }
}
