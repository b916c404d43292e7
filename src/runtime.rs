use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{debug, warn};

/// Countdown cadence
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);
/// How long the runner waits for input when no schedule is armed
pub const IDLE_INTERVAL: Duration = Duration::from_millis(250);

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum TimerEvent {
    Key(KeyEvent),
    Resize,
    /// Countdown schedule fired
    Tick,
    /// Animation schedule fired
    Frame,
    /// Nothing happened within the idle interval
    Idle,
    /// The input source hung up; no further keys will arrive
    Closed,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait TimerEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TimerEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<TimerEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(TimerEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(TimerEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TimerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TimerEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TimerEvent>) -> Self {
        Self { rx }
    }
}

impl TimerEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TimerEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// A periodic schedule that is either armed with a next deadline or idle.
#[derive(Debug)]
pub struct Schedule<T: Ticker> {
    ticker: T,
    next_due: Option<Instant>,
}

impl<T: Ticker> Schedule<T> {
    pub fn new(ticker: T) -> Self {
        Self {
            ticker,
            next_due: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// First firing one interval from `now`. Already armed schedules keep
    /// their cadence.
    pub fn arm(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.ticker.interval());
        }
    }

    /// Drops the pending deadline; nothing fires until re-armed
    pub fn disarm(&mut self) {
        self.next_due = None;
    }

    /// Time until the next deadline, zero if overdue, `None` if idle
    pub fn due_in(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Consumes the current deadline if it has passed. Missed periods are
    /// skipped rather than replayed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if due <= now => {
                let next = due + self.ticker.interval();
                self.next_due = Some(if next <= now {
                    now + self.ticker.interval()
                } else {
                    next
                });
                true
            }
            _ => false,
        }
    }
}

/// Runner that multiplexes input events with the countdown and animation
/// schedules on a single thread.
pub struct Runner<E: TimerEventSource, T: Ticker> {
    event_source: E,
    countdown: Schedule<T>,
    animation: Schedule<T>,
    idle: Duration,
}

impl<E: TimerEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, tick: T, frame: T) -> Self {
        Self {
            event_source,
            countdown: Schedule::new(tick),
            animation: Schedule::new(frame),
            idle: IDLE_INTERVAL,
        }
    }

    pub fn with_idle(mut self, idle: Duration) -> Self {
        self.idle = idle;
        self
    }

    pub fn countdown_armed(&self) -> bool {
        self.countdown.is_armed()
    }

    pub fn animation_armed(&self) -> bool {
        self.animation.is_armed()
    }

    /// Arms or disarms both schedules to follow the timer's running flag.
    /// Call after every state change that can start or stop the timer.
    pub fn sync(&mut self, running: bool) {
        let was_armed = self.countdown.is_armed() || self.animation.is_armed();
        if running {
            let now = Instant::now();
            self.countdown.arm(now);
            self.animation.arm(now);
        } else {
            self.countdown.disarm();
            self.animation.disarm();
        }
        if was_armed != running {
            debug!(running, "schedules synced");
        }
    }

    /// Blocks until the next event: an input event, a due schedule, or the
    /// idle interval running out. Input already queued is delivered before
    /// any schedule, and countdown wins when both schedules are due.
    pub fn step(&mut self) -> TimerEvent {
        loop {
            match self.event_source.recv_timeout(Duration::ZERO) {
                Ok(ev) => return ev,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return self.closed(),
            }

            let now = Instant::now();
            if self.countdown.fire(now) {
                return TimerEvent::Tick;
            }
            if self.animation.fire(now) {
                return TimerEvent::Frame;
            }

            let deadline = [self.countdown.due_in(now), self.animation.due_in(now)]
                .into_iter()
                .flatten()
                .min();
            let timeout = deadline.unwrap_or(self.idle);

            match self.event_source.recv_timeout(timeout) {
                Ok(ev) => return ev,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return self.closed(),
            }

            if deadline.is_none() {
                return TimerEvent::Idle;
            }
        }
    }

    fn closed(&mut self) -> TimerEvent {
        warn!("input source disconnected");
        self.countdown.disarm();
        self.animation.disarm();
        TimerEvent::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wave::FRAME_INTERVAL_MS;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::mpsc;

    fn runner(
        rx: Receiver<TimerEvent>,
        tick_ms: u64,
        frame_ms: u64,
    ) -> Runner<TestEventSource, FixedTicker> {
        Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(tick_ms)),
            FixedTicker::new(Duration::from_millis(frame_ms)),
        )
        .with_idle(Duration::from_millis(1))
    }

    #[test]
    fn step_returns_idle_when_nothing_armed() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = runner(rx, 10, 1);

        match runner.step() {
            TimerEvent::Idle => {}
            other => panic!("expected Idle, got {other:?}"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(TimerEvent::Resize).unwrap();
        let mut runner = runner(rx, 10, 5);

        match runner.step() {
            TimerEvent::Resize => {}
            other => panic!("expected Resize event, got {other:?}"),
        }
    }

    #[test]
    fn sync_arms_and_disarms_both_schedules() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = runner(rx, 10, 5);

        runner.sync(true);
        assert!(runner.countdown_armed());
        assert!(runner.animation_armed());

        runner.sync(false);
        assert!(!runner.countdown_armed());
        assert!(!runner.animation_armed());
    }

    #[test]
    fn frames_outnumber_ticks() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = runner(rx, 40, 4);
        runner.sync(true);

        let (mut ticks, mut frames) = (0, 0);
        while ticks < 3 {
            match runner.step() {
                TimerEvent::Tick => ticks += 1,
                TimerEvent::Frame => frames += 1,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(frames > ticks, "frames={frames} ticks={ticks}");
    }

    #[test]
    fn disarmed_schedules_never_fire() {
        let (_tx, rx) = mpsc::channel();
        let mut runner = runner(rx, 2, 1);
        runner.sync(true);
        runner.sync(false);

        std::thread::sleep(Duration::from_millis(10));
        for _ in 0..5 {
            match runner.step() {
                TimerEvent::Idle => {}
                other => panic!("expected Idle after disarm, got {other:?}"),
            }
        }
    }

    #[test]
    fn schedule_rearm_keeps_cadence() {
        let mut schedule = Schedule::new(FixedTicker::new(Duration::from_secs(1)));
        let start = Instant::now();
        schedule.arm(start);
        schedule.arm(start + Duration::from_millis(600));
        assert_eq!(
            schedule.due_in(start + Duration::from_millis(600)),
            Some(Duration::from_millis(400))
        );
    }

    #[test]
    fn schedule_skips_missed_periods() {
        let mut schedule = Schedule::new(FixedTicker::new(Duration::from_secs(1)));
        let start = Instant::now();
        schedule.arm(start);

        let late = start + Duration::from_millis(3500);
        assert!(schedule.fire(late));
        assert!(!schedule.fire(late));
        assert_eq!(schedule.due_in(late), Some(Duration::from_secs(1)));
    }

    #[test]
    fn schedule_keeps_phase_when_on_time() {
        let mut schedule = Schedule::new(FixedTicker::new(Duration::from_secs(1)));
        let start = Instant::now();
        schedule.arm(start);

        let slightly_late = start + Duration::from_millis(1100);
        assert!(schedule.fire(slightly_late));
        assert_eq!(
            schedule.due_in(slightly_late),
            Some(Duration::from_millis(900))
        );
    }

    #[test]
    fn idle_schedule_has_no_deadline() {
        let mut schedule = Schedule::new(FixedTicker::new(Duration::from_millis(50)));
        assert_eq!(schedule.due_in(Instant::now()), None);
        assert!(!schedule.fire(Instant::now()));
    }

    #[test]
    fn queued_key_beats_overdue_tick() {
        let (tx, rx) = mpsc::channel();
        let mut runner = runner(rx, 20, 1000);
        runner.sync(true);

        std::thread::sleep(Duration::from_millis(5));
        tx.send(TimerEvent::Key(KeyEvent::new(
            KeyCode::Char(' '),
            KeyModifiers::NONE,
        )))
        .unwrap();
        std::thread::sleep(Duration::from_millis(30));

        match runner.step() {
            TimerEvent::Key(key) => assert_eq!(key.code, KeyCode::Char(' ')),
            other => panic!("expected the queued key first, got {other:?}"),
        }
        // The overdue tick is still there once input is drained
        match runner.step() {
            TimerEvent::Tick => {}
            other => panic!("expected Tick, got {other:?}"),
        }
    }

    #[test]
    fn disconnected_source_reports_closed() {
        let (tx, rx) = mpsc::channel();
        let mut runner = runner(rx, 10, 5);
        runner.sync(true);
        drop(tx);

        match runner.step() {
            TimerEvent::Closed => {}
            other => panic!("expected Closed, got {other:?}"),
        }
        assert!(!runner.countdown_armed());
        assert!(!runner.animation_armed());
    }

    #[test]
    fn pending_events_drain_before_closed() {
        let (tx, rx) = mpsc::channel();
        tx.send(TimerEvent::Resize).unwrap();
        drop(tx);
        let mut runner = runner(rx, 10, 5);

        assert!(matches!(runner.step(), TimerEvent::Resize));
        assert!(matches!(runner.step(), TimerEvent::Closed));
    }

    #[test]
    fn twenty_frames_per_tick() {
        assert_eq!(TICK_INTERVAL, Duration::from_millis(FRAME_INTERVAL_MS * 20));
    }
}
