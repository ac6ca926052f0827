use crate::host::Host;
use crate::queue::{CastRequest, PendingQueue};
use crate::runner::{CastRunner, RunnerEvent};
use crate::timer::Timer;
use crate::timing::Timings;

/// Top-level position of the cast machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing queued, nothing to restore.
    Idle,
    /// Requests are queued or one is in flight.
    Casting,
    /// Queue drained; deciding whether the original skill needs restoring.
    Restoring,
    /// Watching the client until the original skill is back and stays put.
    WaitRestore,
}

/// Skill selection in effect before the first cast of a burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub skill_id: u16,
    pub weapon_set: u8,
}

/// Outcome of one transition-table arm.
enum Step {
    Continue,
    Wait,
}

/// Orders trigger events into a confirmed sequence of casts and restores
/// the user's original selection once the stream drains.
///
/// Everything runs on one control thread: trigger delivery, timer fires and
/// state transitions are serialized, and all waiting is "return and resume
/// via `poll`". Transitions only happen inside the crank.
pub struct Sequencer {
    state: State,
    crank_count: u32,
    in_dispatch: bool,
    queue: PendingQueue,
    runner: CastRunner,
    snapshot: Option<Snapshot>,
    restore_timer: Timer,
    /// When the current restore attempt entered the wait; base of the
    /// give-up ceiling. Survives re-issues so the attempt stays bounded.
    restore_epoch: Option<u64>,
    timings: Timings,
}

impl Sequencer {
    pub fn new(timings: Timings) -> Self {
        Self {
            state: State::Idle,
            crank_count: 0,
            in_dispatch: false,
            queue: PendingQueue::new(),
            runner: CastRunner::new(timings),
            snapshot: None,
            restore_timer: Timer::default(),
            restore_epoch: None,
            timings,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.snapshot
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_runner_active(&self) -> bool {
        self.runner.is_running()
    }

    /// Accept a resolved trigger and crank the machine.
    pub fn submit(&mut self, host: &mut dyn Host, request: CastRequest, now: u64) {
        tracing::debug!(
            skill = request.skill_id,
            key = request.trigger_key,
            "cast queued"
        );
        self.queue.push(request);
        self.crank(host, now);
    }

    /// Cancel everything and return to `Idle`: the active cast, any pending
    /// timer, queued work and the snapshot. Idempotent; called on session
    /// boundaries and when the helper is toggled off.
    pub fn stop(&mut self) {
        self.runner.cancel();
        self.restore_timer.cancel();
        self.queue.clear();
        self.snapshot = None;
        self.restore_epoch = None;
        self.crank_count = 0;
        self.state = State::Idle;
    }

    /// Deliver due timers. The embedding loop calls this whenever the time
    /// reported by `next_wake` has passed.
    pub fn poll(&mut self, host: &mut dyn Host, now: u64) {
        if let Some(RunnerEvent::Done) = self.runner.poll(host, now) {
            self.signal_runner_done(host, now);
        }
        if self.restore_timer.fire_due(now) {
            self.crank(host, now);
        }
    }

    /// Earliest scheduled resume, if any timer is armed.
    pub fn next_wake(&self) -> Option<u64> {
        match (self.runner.next_wake(), self.restore_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn signal_runner_done(&mut self, host: &mut dyn Host, now: u64) {
        self.crank(host, now);
    }

    /// Reentrancy-guarded dispatch. Every stimulus lands here; the owning
    /// invocation drains one full pass per recorded stimulus, so work
    /// recorded mid-pass is picked up by the loop instead of recursing.
    fn crank(&mut self, host: &mut dyn Host, now: u64) {
        self.crank_count += 1;
        if self.crank_count > 1 {
            return;
        }
        while self.crank_count > 0 {
            self.dispatch(host, now);
            self.crank_count -= 1;
        }
    }

    /// One pass: run the transition table until an arm needs to wait.
    fn dispatch(&mut self, host: &mut dyn Host, now: u64) {
        debug_assert!(!self.in_dispatch, "dispatch pass must never nest");
        self.in_dispatch = true;
        loop {
            let step = match self.state {
                State::Idle => self.on_idle(),
                State::Casting => self.on_casting(host, now),
                State::Restoring => self.on_restoring(),
                State::WaitRestore => self.on_wait_restore(host, now),
            };
            if matches!(step, Step::Wait) {
                break;
            }
        }
        self.in_dispatch = false;
    }

    fn on_idle(&mut self) -> Step {
        if self.queue.is_empty() {
            return Step::Wait;
        }
        self.state = State::Casting;
        Step::Continue
    }

    fn on_casting(&mut self, host: &mut dyn Host, now: u64) -> Step {
        if self.runner.is_running() {
            return Step::Wait;
        }
        if self.queue.is_empty() {
            self.state = State::Restoring;
            return Step::Continue;
        }
        let request = self
            .queue
            .pop()
            .expect("casting arm checked the queue is non-empty");
        self.begin_cast(host, request, now);
        Step::Wait
    }

    fn on_restoring(&mut self) -> Step {
        if !self.queue.is_empty() {
            self.state = State::Casting;
            return Step::Continue;
        }
        if self.snapshot.is_none() {
            self.state = State::Idle;
            return Step::Continue;
        }
        self.state = State::WaitRestore;
        Step::Continue
    }

    fn on_wait_restore(&mut self, host: &mut dyn Host, now: u64) -> Step {
        if !self.queue.is_empty() {
            // New work preempts restoration; the next burst records its own
            // baseline from whatever is current.
            self.snapshot = None;
            self.finish_wait_restore();
            self.state = State::Casting;
            return Step::Continue;
        }
        let Some(snapshot) = self.snapshot else {
            self.finish_wait_restore();
            self.state = State::Idle;
            return Step::Continue;
        };
        if host.weapon_set() != snapshot.weapon_set {
            tracing::debug!("weapon set changed, dropping restore");
            return self.abandon_restore();
        }
        let epoch = match self.restore_epoch {
            None => {
                self.restore_epoch = Some(now);
                self.restore_timer
                    .schedule(now, self.timings.restore_delay_ms);
                return Step::Wait;
            }
            Some(epoch) => epoch,
        };
        if self.restore_timer.is_pending() {
            return Step::Wait;
        }
        if now.saturating_sub(epoch) >= self.timings.restore_timeout_ms {
            if host.current_selection() == Some(snapshot.skill_id) {
                tracing::debug!(skill = snapshot.skill_id, "restore settled");
            } else {
                tracing::warn!(
                    skill = snapshot.skill_id,
                    "original skill never came back, giving up"
                );
            }
            return self.abandon_restore();
        }
        if host.current_selection() != Some(snapshot.skill_id) {
            tracing::debug!(skill = snapshot.skill_id, "re-selecting original skill");
            host.set_selection(snapshot.skill_id);
            self.restore_timer
                .schedule(now, self.timings.restore_delay_ms);
            return Step::Continue;
        }
        if host.user_override_active() {
            tracing::debug!("user is picking a skill, leaving selection alone");
            return self.abandon_restore();
        }
        self.restore_timer
            .schedule(now, self.timings.restore_poll_ms);
        Step::Wait
    }

    fn abandon_restore(&mut self) -> Step {
        self.snapshot = None;
        self.finish_wait_restore();
        self.state = State::Idle;
        Step::Continue
    }

    fn finish_wait_restore(&mut self) {
        self.restore_epoch = None;
        self.restore_timer.cancel();
    }

    fn begin_cast(&mut self, host: &mut dyn Host, request: CastRequest, now: u64) {
        if self.snapshot.is_none() {
            // Baseline for the eventual restore, captured once per burst.
            // An unknown selection retries the capture on the next cast.
            if let Some(skill_id) = host.current_selection() {
                self.snapshot = Some(Snapshot {
                    skill_id,
                    weapon_set: host.weapon_set(),
                });
            }
        }
        self.runner.start(host, request, now);
    }
}
