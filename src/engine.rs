use tracing::{debug, info};

/// Length of a focus countdown in seconds (25 minutes)
pub const FOCUS_DURATION: u32 = 25 * 60;
/// Length of a break countdown in seconds (5 minutes)
pub const BREAK_DURATION: u32 = 5 * 60;

/// Displayed timer mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Mode {
    Focus,
    Break,
    Flow,
}

impl Mode {
    /// Countdown length for the mode. Flow counts up and has none.
    pub fn total_duration(self) -> u32 {
        match self {
            Mode::Focus => FOCUS_DURATION,
            Mode::Break => BREAK_DURATION,
            Mode::Flow => 0,
        }
    }

    /// The selectable mode this corresponds to, `None` for Flow
    pub fn countdown(self) -> Option<CountdownMode> {
        match self {
            Mode::Focus => Some(CountdownMode::Focus),
            Mode::Break => Some(CountdownMode::Break),
            Mode::Flow => None,
        }
    }
}

/// The two modes a user can pick explicitly. Flow is only ever entered by
/// a countdown running out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum CountdownMode {
    Focus,
    Break,
}

impl CountdownMode {
    pub fn total_duration(self) -> u32 {
        Mode::from(self).total_duration()
    }

    /// The other selectable mode
    pub fn other(self) -> Self {
        match self {
            CountdownMode::Focus => CountdownMode::Break,
            CountdownMode::Break => CountdownMode::Focus,
        }
    }
}

impl From<CountdownMode> for Mode {
    fn from(mode: CountdownMode) -> Self {
        match mode {
            CountdownMode::Focus => Mode::Focus,
            CountdownMode::Break => Mode::Break,
        }
    }
}

// Remaining time lives inside the variant it belongs to so a Flow timer can
// never carry a finite duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Clock {
    Countdown { mode: CountdownMode, remaining: u32 },
    Flow { elapsed: u32 },
}

impl Clock {
    fn full(mode: CountdownMode) -> Self {
        Clock::Countdown {
            mode,
            remaining: mode.total_duration(),
        }
    }
}

/// Point-in-time copy of the engine state handed to renderers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerState {
    pub mode: Mode,
    pub remaining: u32,
    pub total_duration: u32,
    pub running: bool,
}

/// What a single `tick` did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Timer was paused, nothing changed
    Idle,
    CountedDown,
    /// Countdown ran out and the timer rolled over into Flow
    EnteredFlow,
    CountedUp,
}

/// Focus/break/flow state machine advanced once per second
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimerEngine {
    clock: Clock,
    running: bool,
}

impl TimerEngine {
    /// Paused focus countdown at full length
    pub fn new() -> Self {
        Self::with_mode(CountdownMode::Focus)
    }

    pub fn with_mode(mode: CountdownMode) -> Self {
        Self {
            clock: Clock::full(mode),
            running: false,
        }
    }

    pub fn mode(&self) -> Mode {
        match self.clock {
            Clock::Countdown { mode, .. } => mode.into(),
            Clock::Flow { .. } => Mode::Flow,
        }
    }

    /// Seconds left for a countdown, seconds elapsed in Flow
    pub fn remaining(&self) -> u32 {
        match self.clock {
            Clock::Countdown { remaining, .. } => remaining,
            Clock::Flow { elapsed } => elapsed,
        }
    }

    pub fn total_duration(&self) -> u32 {
        self.mode().total_duration()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> TimerState {
        TimerState {
            mode: self.mode(),
            remaining: self.remaining(),
            total_duration: self.total_duration(),
            running: self.running,
        }
    }

    pub fn toggle(&mut self) {
        self.running = !self.running;
        info!(mode = %self.mode(), running = self.running, "timer toggled");
    }

    /// Stops the timer and refills it. Any Flow state returns to Focus.
    pub fn reset(&mut self) {
        self.running = false;
        self.clock = match self.clock {
            Clock::Countdown { mode, .. } => Clock::full(mode),
            Clock::Flow { .. } => Clock::full(CountdownMode::Focus),
        };
        info!(mode = %self.mode(), remaining = self.remaining(), "timer reset");
    }

    /// Stops the timer and loads a full countdown for `mode`.
    ///
    /// Mode selection is not offered while in Flow: the call is ignored and
    /// `false` is returned. Use [`TimerEngine::reset`] to leave Flow.
    pub fn switch_mode(&mut self, mode: CountdownMode) -> bool {
        if let Clock::Flow { .. } = self.clock {
            debug!(requested = %mode, "mode switch ignored while in flow");
            return false;
        }
        self.running = false;
        self.clock = Clock::full(mode);
        info!(mode = %mode, "mode switched");
        true
    }

    /// Advances the clock by one second.
    ///
    /// A countdown at one second or less rolls straight into a running Flow
    /// at zero in the same step.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }
        let (clock, outcome) = match self.clock {
            Clock::Flow { elapsed } => (
                Clock::Flow {
                    elapsed: elapsed.saturating_add(1),
                },
                TickOutcome::CountedUp,
            ),
            Clock::Countdown { remaining, .. } if remaining <= 1 => {
                (Clock::Flow { elapsed: 0 }, TickOutcome::EnteredFlow)
            }
            Clock::Countdown { mode, remaining } => (
                Clock::Countdown {
                    mode,
                    remaining: remaining - 1,
                },
                TickOutcome::CountedDown,
            ),
        };
        self.clock = clock;
        self.running = true;
        if outcome == TickOutcome::EnteredFlow {
            info!("countdown finished, entering flow");
        }
        outcome
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}
