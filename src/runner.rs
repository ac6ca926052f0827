use crate::host::{Host, Point};
use crate::queue::CastRequest;
use crate::timer::Timer;
use crate::timing::Timings;

/// Where a paused cast resumes when the runner's timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Polling the client until the requested skill becomes current.
    Confirm,
    /// Click injected; waiting out the settle delay.
    Finish,
}

/// The cast currently being executed, plus its resume bookkeeping. Only
/// plain data lives here so the machine stays inspectable mid-flight.
#[derive(Debug)]
struct Work {
    request: CastRequest,
    retries: u32,
    pos: Point,
    phase: Phase,
}

/// Outcome of driving the runner one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerEvent {
    /// Still working; a timer is armed.
    Pending,
    /// The request finished, successfully or abandoned.
    Done,
}

/// Executes a single cast request: select the skill, poll until the client
/// confirms it, click at the pointer, settle. One request at a time.
#[derive(Debug)]
pub struct CastRunner {
    work: Option<Work>,
    timer: Timer,
    timings: Timings,
}

impl CastRunner {
    pub fn new(timings: Timings) -> Self {
        Self {
            work: None,
            timer: Timer::default(),
            timings,
        }
    }

    pub fn is_running(&self) -> bool {
        self.work.is_some()
    }

    pub fn next_wake(&self) -> Option<u64> {
        self.timer.deadline()
    }

    /// Begin a cast. The runner always goes asynchronous from here: either
    /// the confirm poll or the post-click settle timer is armed on return.
    /// If the requested skill is already current the selection is skipped
    /// and the click goes out immediately.
    pub fn start(&mut self, host: &mut dyn Host, request: CastRequest, now: u64) {
        debug_assert!(self.work.is_none(), "runner started while already running");
        let mut work = Work {
            request,
            retries: 0,
            pos: Point::default(),
            phase: Phase::Confirm,
        };
        if host.current_selection() == Some(request.skill_id) {
            tracing::debug!(skill = request.skill_id, "skill already current, clicking");
            self.inject(host, &mut work, now);
        } else {
            tracing::debug!(skill = request.skill_id, "selecting skill");
            host.set_selection(request.skill_id);
            self.timer.schedule(now, self.timings.confirm_poll_ms);
        }
        self.work = Some(work);
    }

    /// Deliver a due timer, resuming the cast at its stored phase. Returns
    /// `None` when no timer was due.
    pub fn poll(&mut self, host: &mut dyn Host, now: u64) -> Option<RunnerEvent> {
        if !self.timer.fire_due(now) {
            return None;
        }
        Some(self.resume(host, now))
    }

    /// Abort without the done notification. Only `stop` uses this; it
    /// resets the surrounding sequencer state itself.
    pub fn cancel(&mut self) {
        self.timer.cancel();
        self.work = None;
    }

    fn resume(&mut self, host: &mut dyn Host, now: u64) -> RunnerEvent {
        let Some(mut work) = self.work.take() else {
            return RunnerEvent::Done;
        };
        match work.phase {
            Phase::Confirm => {
                if !host.eligible() {
                    tracing::debug!(
                        skill = work.request.skill_id,
                        "client left castable state, abandoning"
                    );
                    return RunnerEvent::Done;
                }
                if host.current_selection() == Some(work.request.skill_id) {
                    self.inject(host, &mut work, now);
                    self.work = Some(work);
                    return RunnerEvent::Pending;
                }
                work.retries += 1;
                if work.retries >= self.timings.confirm_retry_limit {
                    tracing::warn!(
                        skill = work.request.skill_id,
                        retries = work.retries,
                        "selection never confirmed, abandoning cast"
                    );
                    return RunnerEvent::Done;
                }
                self.timer.schedule(now, self.timings.confirm_poll_ms);
                self.work = Some(work);
                RunnerEvent::Pending
            }
            Phase::Finish => {
                tracing::debug!(skill = work.request.skill_id, "cast complete");
                RunnerEvent::Done
            }
        }
    }

    fn inject(&mut self, host: &mut dyn Host, work: &mut Work, now: u64) {
        work.pos = host.pointer_pos();
        host.pointer_down(work.pos);
        host.pointer_up(work.pos);
        work.phase = Phase::Finish;
        self.timer.schedule(now, self.timings.settle_ms);
    }
}
