use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::protocol::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub phase_index: usize,
    pub phase: Option<Phase>,
    pub round: u32,
    pub remaining_in_phase: u32,
    pub remaining_total: u32,
    pub elapsed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickEvent {
    /// The timer was not running.
    Ignored,
    Counted { remaining: u32 },
    PhaseStarted { index: usize, phase: Phase },
    Completed,
}

type CompletionCallback = Box<dyn FnMut() + Send>;

/// One-second countdown over a list of phases.
pub struct IntervalTimer {
    phases: Vec<Phase>,
    index: usize,
    remaining: u32,
    elapsed: u32,
    state: TimerState,
    on_complete: Option<CompletionCallback>,
}

impl IntervalTimer {
    pub fn new(phases: Vec<Phase>) -> Self {
        let remaining = phases.first().map(|p| p.seconds).unwrap_or_default();
        Self {
            phases,
            index: 0,
            remaining,
            elapsed: 0,
            state: TimerState::Idle,
            on_complete: None,
        }
    }

    pub fn with_on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn current_phase(&self) -> Option<&Phase> {
        match self.state {
            TimerState::Completed => None,
            _ => self.phases.get(self.index),
        }
    }

    pub fn current_round(&self) -> u32 {
        self.current_phase().map(|p| p.round).unwrap_or_default()
    }

    pub fn remaining_in_phase(&self) -> u32 {
        match self.state {
            TimerState::Completed => 0,
            _ => self.remaining,
        }
    }

    pub fn remaining_total(&self) -> u32 {
        if self.state == TimerState::Completed {
            return 0;
        }
        let upcoming: u32 = self
            .phases
            .iter()
            .skip(self.index + 1)
            .map(|p| p.seconds)
            .sum();
        self.remaining + upcoming
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn start(&mut self) {
        if self.state != TimerState::Idle {
            return;
        }
        if self.phases.is_empty() {
            self.complete();
        } else {
            self.state = TimerState::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.elapsed = 0;
        self.remaining = self.phases.first().map(|p| p.seconds).unwrap_or_default();
        self.state = TimerState::Idle;
    }

    /// Advances the countdown by one second.
    pub fn tick(&mut self) -> TickEvent {
        self.advance_by(1)
    }

    /// Runs out the rest of the current phase in one step.
    pub fn finish_phase(&mut self) -> TickEvent {
        self.advance_by(self.remaining)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            state: self.state,
            phase_index: self.index,
            phase: self.current_phase().cloned(),
            round: self.current_round(),
            remaining_in_phase: self.remaining_in_phase(),
            remaining_total: self.remaining_total(),
            elapsed: self.elapsed,
        }
    }

    fn advance_by(&mut self, seconds: u32) -> TickEvent {
        if self.state != TimerState::Running {
            return TickEvent::Ignored;
        }

        self.remaining = self.remaining.saturating_sub(seconds);
        self.elapsed += seconds;

        if self.remaining > 0 {
            return TickEvent::Counted {
                remaining: self.remaining,
            };
        }

        match self.phases.get(self.index + 1) {
            Some(next) => {
                self.index += 1;
                self.remaining = next.seconds;
                TickEvent::PhaseStarted {
                    index: self.index,
                    phase: next.clone(),
                }
            }
            None => {
                self.complete();
                TickEvent::Completed
            }
        }
    }

    fn complete(&mut self) {
        self.state = TimerState::Completed;
        self.remaining = 0;
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
    }
}

/// Ticks a shared timer every `period` until it completes or is reset.
///
/// Other holders of the handle may pause or resume the timer meanwhile;
/// dropping the returned future stops the ticking.
pub async fn run_timer(timer: Arc<Mutex<IntervalTimer>>, period: Duration) -> TimerState {
    let mut ticker = tokio::time::interval(period);
    // The first interval tick resolves immediately.
    ticker.tick().await;

    timer.lock().await.start();

    loop {
        {
            let guard = timer.lock().await;
            match guard.state() {
                TimerState::Completed | TimerState::Idle => return guard.state(),
                _ => {}
            }
        }

        ticker.tick().await;
        let event = timer.lock().await.tick();
        match event {
            TickEvent::PhaseStarted { index, phase } => {
                debug!(index, round = phase.round, kind = ?phase.kind, "Timer phase started");
            }
            TickEvent::Counted { remaining } => trace!(remaining, "Timer tick"),
            TickEvent::Completed | TickEvent::Ignored => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub start_second: u32,
    pub phase: Phase,
}

/// Replays `phases` through a timer and records when each phase begins.
/// Each phase is run out in one step, so the cost follows the number of
/// phases rather than the session length.
pub fn timeline(phases: Vec<Phase>) -> Vec<TimelineEntry> {
    let mut entries = Vec::with_capacity(phases.len());
    let mut timer = IntervalTimer::new(phases);

    timer.start();
    if let Some(first) = timer.current_phase() {
        entries.push(TimelineEntry {
            start_second: 0,
            phase: first.clone(),
        });
    }

    loop {
        match timer.finish_phase() {
            TickEvent::PhaseStarted { phase, .. } => entries.push(TimelineEntry {
                start_second: timer.elapsed(),
                phase,
            }),
            TickEvent::Counted { .. } => {}
            TickEvent::Completed | TickEvent::Ignored => break,
        }
    }

    entries
}

const LIVE_TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveTimerStatus {
    pub session_id: i64,
    #[serde(flatten)]
    pub timer: TimerSnapshot,
}

struct LiveTimer {
    session_id: i64,
    timer: Arc<Mutex<IntervalTimer>>,
    driver: JoinHandle<TimerState>,
}

/// Server-driven session timers, at most one per user.
pub struct LiveTimers {
    period: Duration,
    timers: Mutex<HashMap<i64, LiveTimer>>,
}

impl Default for LiveTimers {
    fn default() -> Self {
        Self::new(LIVE_TICK_PERIOD)
    }
}

impl LiveTimers {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            timers: Mutex::new(HashMap::new()),
        }
    }

    /// Starts a timer over `phases`, replacing any timer the user already had.
    pub async fn start(
        &self,
        user_id: i64,
        session_id: i64,
        phases: Vec<Phase>,
    ) -> LiveTimerStatus {
        let mut timer = IntervalTimer::new(phases).with_on_complete(move || {
            info!(user_id, session_id, "Live session timer completed");
        });
        timer.start();
        let snapshot = timer.snapshot();

        let timer = Arc::new(Mutex::new(timer));
        let driver = tokio::spawn(run_timer(timer.clone(), self.period));

        let live = LiveTimer {
            session_id,
            timer,
            driver,
        };
        if let Some(previous) = self.timers.lock().await.insert(user_id, live) {
            debug!(user_id, session_id = previous.session_id, "Replacing live timer");
            previous.driver.abort();
        }

        LiveTimerStatus {
            session_id,
            timer: snapshot,
        }
    }

    pub async fn status(&self, user_id: i64) -> Option<LiveTimerStatus> {
        let timers = self.timers.lock().await;
        let live = timers.get(&user_id)?;
        let snapshot = live.timer.lock().await.snapshot();
        Some(LiveTimerStatus {
            session_id: live.session_id,
            timer: snapshot,
        })
    }

    pub async fn pause(&self, user_id: i64) -> Option<LiveTimerStatus> {
        self.update(user_id, IntervalTimer::pause).await
    }

    pub async fn resume(&self, user_id: i64) -> Option<LiveTimerStatus> {
        self.update(user_id, IntervalTimer::resume).await
    }

    /// Rewinds to the first phase and counts down again.
    pub async fn restart(&self, user_id: i64) -> Option<LiveTimerStatus> {
        let mut timers = self.timers.lock().await;
        let live = timers.get_mut(&user_id)?;

        live.driver.abort();
        let snapshot = {
            let mut timer = live.timer.lock().await;
            timer.reset();
            timer.start();
            timer.snapshot()
        };
        live.driver = tokio::spawn(run_timer(live.timer.clone(), self.period));

        Some(LiveTimerStatus {
            session_id: live.session_id,
            timer: snapshot,
        })
    }

    /// Returns false when the user had no timer.
    pub async fn stop(&self, user_id: i64) -> bool {
        match self.timers.lock().await.remove(&user_id) {
            Some(live) => {
                live.driver.abort();
                true
            }
            None => false,
        }
    }

    async fn update(
        &self,
        user_id: i64,
        action: fn(&mut IntervalTimer),
    ) -> Option<LiveTimerStatus> {
        let timers = self.timers.lock().await;
        let live = timers.get(&user_id)?;
        let snapshot = {
            let mut timer = live.timer.lock().await;
            action(&mut *timer);
            timer.snapshot()
        };
        Some(LiveTimerStatus {
            session_id: live.session_id,
            timer: snapshot,
        })
    }
}
