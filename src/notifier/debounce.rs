use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    /// A burst is in progress; recompute once `deadline` passes quietly
    PendingRecompute { deadline: Instant },
}

/// Collapses bursts of change events into one recompute per settled burst.
///
/// There is a single deadline: a change while pending moves it instead of
/// scheduling another recompute.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: DebounceState::Idle,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Idle => None,
            DebounceState::PendingRecompute { deadline } => Some(deadline),
        }
    }

    pub fn on_change(&mut self, now: Instant) {
        self.state = DebounceState::PendingRecompute {
            deadline: now + self.delay,
        };
    }

    /// Returns true, and goes idle, when the pending deadline has passed
    pub fn on_fire(&mut self, now: Instant) -> bool {
        match self.state {
            DebounceState::PendingRecompute { deadline } if now >= deadline => {
                self.state = DebounceState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Drive the state machine from `changes` until the sender side closes,
    /// awaiting `on_settle` after each settled burst
    pub async fn run<F, Fut>(mut self, mut changes: mpsc::Receiver<()>, mut on_settle: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        loop {
            match self.deadline() {
                None => match changes.recv().await {
                    Some(()) => self.on_change(Instant::now()),
                    None => break,
                },
                Some(deadline) => {
                    tokio::select! {
                        change = changes.recv() => match change {
                            Some(()) => self.on_change(Instant::now()),
                            None => break,
                        },
                        () = sleep_until(deadline) => {
                            if self.on_fire(Instant::now()) {
                                on_settle().await;
                            }
                        }
                    }
                }
            }
        }
    }
}
