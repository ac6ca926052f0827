use once_cell::sync::Lazy;
use std::collections::HashMap;

/// A parsed key chord: a Win32 virtual-key code plus required modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hotkey {
    pub vk: u32,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Hotkey {
    /// True when a pressed key with the given modifier state matches this
    /// chord exactly.
    pub fn matches(&self, vk: u32, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.vk == vk && self.ctrl == ctrl && self.shift == shift && self.alt == alt
    }
}

static VK_NAMES: Lazy<HashMap<String, u32>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for n in 0..24u32 {
        map.insert(format!("F{}", n + 1), 0x70 + n);
    }
    for (i, c) in ('A'..='Z').enumerate() {
        map.insert(c.to_string(), 0x41 + i as u32);
    }
    for (i, c) in ('0'..='9').enumerate() {
        map.insert(c.to_string(), 0x30 + i as u32);
    }
    let named = [
        ("SPACE", 0x20u32),
        ("TAB", 0x09),
        ("ENTER", 0x0D),
        ("RETURN", 0x0D),
        ("ESC", 0x1B),
        ("ESCAPE", 0x1B),
        ("BACKSPACE", 0x08),
        ("DELETE", 0x2E),
        ("INSERT", 0x2D),
        ("HOME", 0x24),
        ("END", 0x23),
        ("PAGEUP", 0x21),
        ("PAGEDOWN", 0x22),
        ("LEFT", 0x25),
        ("UP", 0x26),
        ("RIGHT", 0x27),
        ("DOWN", 0x28),
        ("CAPSLOCK", 0x14),
    ];
    for (name, vk) in named {
        map.insert(name.to_string(), vk);
    }
    map
});

/// Look up the virtual-key code for a bare key name like `"F5"` or `"Q"`.
pub fn virtual_key_from_name(name: &str) -> Option<u32> {
    VK_NAMES.get(&name.trim().to_ascii_uppercase()).copied()
}

/// Parse a chord string like `"Ctrl+Shift+F5"` into a [`Hotkey`]. Returns
/// `None` when no key or an unknown key is named.
pub fn parse_hotkey(s: &str) -> Option<Hotkey> {
    let mut ctrl = false;
    let mut shift = false;
    let mut alt = false;
    let mut vk = None;

    for part in s.split('+') {
        let upper = part.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => ctrl = true,
            "SHIFT" => shift = true,
            "ALT" => alt = true,
            "" => {}
            _ => vk = Some(*VK_NAMES.get(&upper)?),
        }
    }

    vk.map(|vk| Hotkey {
        vk,
        ctrl,
        shift,
        alt,
    })
}
