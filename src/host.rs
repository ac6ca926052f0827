/// Screen coordinates used for injected pointer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Live view of the game client consumed by the cast machinery.
///
/// Every query is best-effort and non-throwing; success of `set_selection`
/// is inferred by polling `current_selection`, never from a return value.
pub trait HostState {
    /// Currently selected skill, or `None` when nothing (known) is bound.
    fn current_selection(&self) -> Option<u16>;

    /// Which of the two weapon sets is active.
    fn weapon_set(&self) -> u8;

    /// True while the user is interacting with the skill selection UI.
    fn user_override_active(&self) -> bool;

    /// True while the client is in a state where casting makes sense. A
    /// false answer at any checkpoint aborts the workflow in progress.
    fn eligible(&self) -> bool;

    /// Last observed pointer position in screen coordinates.
    fn pointer_pos(&self) -> Point;

    /// Request a new skill selection.
    fn set_selection(&mut self, skill_id: u16);
}

/// Synthesizes pointer events into the client.
pub trait InputInjector {
    fn pointer_down(&mut self, pos: Point);
    fn pointer_up(&mut self, pos: Point);
}

/// Everything the sequencer needs from the outside world.
pub trait Host: HostState + InputInjector {}

impl<T: HostState + InputInjector> Host for T {}
