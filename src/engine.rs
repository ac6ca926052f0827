use std::collections::HashMap;

use crate::host::Host;
use crate::hotkey::Hotkey;
use crate::queue::CastRequest;
use crate::sequencer::Sequencer;
use crate::settings::Settings;

/// Long-lived context wiring the hook layer to the sequencer: the enabled
/// gate, the key-to-skill bindings, the toggle chord and session lifecycle.
/// Constructed once at startup and passed around by the embedding loop; no
/// global state.
pub struct CastEngine<H: Host> {
    host: H,
    sequencer: Sequencer,
    bindings: HashMap<u32, u16>,
    enabled: bool,
    toggle_key: Option<Hotkey>,
}

impl<H: Host> CastEngine<H> {
    pub fn new(host: H, settings: &Settings) -> Self {
        Self {
            host,
            sequencer: Sequencer::new(settings.timings()),
            bindings: settings.resolved_bindings(),
            enabled: settings.enabled,
            toggle_key: settings.toggle_key(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Handle a trigger key press. Returns true when the key mapped to a
    /// cast and was queued; the hook layer swallows handled keys and passes
    /// everything else through to the client.
    pub fn on_trigger(&mut self, vk: u32, now: u64) -> bool {
        if !self.enabled || !self.host.eligible() {
            return false;
        }
        let Some(&skill_id) = self.bindings.get(&vk) else {
            tracing::debug!(vk, "no skill bound to key");
            return false;
        };
        self.sequencer.submit(
            &mut self.host,
            CastRequest {
                trigger_key: vk,
                skill_id,
                requested_at: now,
            },
            now,
        );
        true
    }

    /// Flip the enabled gate. Disabling cancels all in-flight and queued
    /// work. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.enabled {
            self.sequencer.stop();
            self.enabled = false;
        } else {
            self.enabled = true;
        }
        tracing::info!(enabled = self.enabled, "cast helper toggled");
        self.enabled
    }

    /// True when the pressed key is the configured toggle chord.
    pub fn matches_toggle(&self, vk: u32, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.toggle_key
            .map(|key| key.matches(vk, ctrl, shift, alt))
            .unwrap_or(false)
    }

    /// Whether the toggle chord should be swallowed rather than forwarded.
    /// Bare keys are forwarded so the client still sees them; chords with
    /// Ctrl or Alt are consumed.
    pub fn swallow_toggle(&self) -> bool {
        self.toggle_key
            .map(|key| key.ctrl || key.alt)
            .unwrap_or(false)
    }

    pub fn on_session_start(&mut self) {
        self.sequencer.stop();
    }

    pub fn on_session_end(&mut self) {
        self.sequencer.stop();
    }

    /// Deliver due timers. Call whenever `next_wake` has passed.
    pub fn tick(&mut self, now: u64) {
        self.sequencer.poll(&mut self.host, now);
    }

    pub fn next_wake(&self) -> Option<u64> {
        self.sequencer.next_wake()
    }
}
