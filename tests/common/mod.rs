#![allow(dead_code)]

use quickcast::engine::CastEngine;
use quickcast::host::{Host, HostState, InputInjector, Point};
use quickcast::sequencer::Sequencer;

/// Scripted stand-in for the game client. Selection changes apply
/// immediately unless `apply_selection` is cleared, in which case the call
/// is only recorded and the test flips the visible selection by hand.
pub struct SimHost {
    pub selection: Option<u16>,
    pub weapon_set: u8,
    pub eligible: bool,
    pub user_override: bool,
    pub pointer: Point,
    pub apply_selection: bool,
    pub set_calls: Vec<u16>,
    pub downs: Vec<Point>,
    pub ups: Vec<Point>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self {
            selection: Some(1),
            weapon_set: 0,
            eligible: true,
            user_override: false,
            pointer: Point { x: 640, y: 360 },
            apply_selection: true,
            set_calls: Vec::new(),
            downs: Vec::new(),
            ups: Vec::new(),
        }
    }
}

impl HostState for SimHost {
    fn current_selection(&self) -> Option<u16> {
        self.selection
    }

    fn weapon_set(&self) -> u8 {
        self.weapon_set
    }

    fn user_override_active(&self) -> bool {
        self.user_override
    }

    fn eligible(&self) -> bool {
        self.eligible
    }

    fn pointer_pos(&self) -> Point {
        self.pointer
    }

    fn set_selection(&mut self, skill_id: u16) {
        self.set_calls.push(skill_id);
        if self.apply_selection {
            self.selection = Some(skill_id);
        }
    }
}

impl InputInjector for SimHost {
    fn pointer_down(&mut self, pos: Point) {
        self.downs.push(pos);
    }

    fn pointer_up(&mut self, pos: Point) {
        self.ups.push(pos);
    }
}

/// Advance the simulated clock to each scheduled wake-up in turn until the
/// sequencer goes quiet or `max_steps` fires have been delivered.
pub fn pump(seq: &mut Sequencer, host: &mut dyn Host, clock: &mut u64, max_steps: u32) {
    for _ in 0..max_steps {
        let Some(wake) = seq.next_wake() else { return };
        *clock = (*clock).max(wake);
        seq.poll(host, *clock);
    }
}

/// Like [`pump`] but stops once the given time is reached, leaving later
/// wake-ups undelivered so a test can intervene mid-flight.
pub fn pump_until(seq: &mut Sequencer, host: &mut dyn Host, clock: &mut u64, until: u64) {
    loop {
        let Some(wake) = seq.next_wake() else { return };
        if wake > until {
            return;
        }
        *clock = (*clock).max(wake);
        seq.poll(host, *clock);
    }
}

/// Engine-level variant of [`pump`].
pub fn pump_engine(engine: &mut CastEngine<SimHost>, clock: &mut u64, max_steps: u32) {
    for _ in 0..max_steps {
        let Some(wake) = engine.next_wake() else { return };
        *clock = (*clock).max(wake);
        engine.tick(*clock);
    }
}
