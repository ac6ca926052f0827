//! Windows plumbing: synthetic click injection and the low-level keyboard
//! hook that feeds trigger keys to the embedding control loop. Everything
//! here is a thin wrapper over Win32; the decisions live in [`crate::engine`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Mutex;

use anyhow::anyhow;
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;

use crate::host::{InputInjector, Point};
use crate::hotkey::Hotkey;

/// Marker attached to injected events so a hook can tell them from real
/// user input.
pub const INJECT_TAG: usize = 0x5143_494E_4A; // "QC_INJ"

/// A trigger key observed by the hook, with the modifier state at press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub vk: u32,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

/// Clicks at the live cursor position via `SendInput`.
///
/// The position handed in by the runner is the cursor position it just
/// observed, so the click is sent in place rather than warped.
#[derive(Debug, Default)]
pub struct WinInjector;

impl WinInjector {
    fn send_button(&self, down: bool) {
        use windows::Win32::UI::Input::KeyboardAndMouse::{
            SendInput, INPUT, INPUT_0, INPUT_MOUSE, MOUSEEVENTF_RIGHTDOWN, MOUSEEVENTF_RIGHTUP,
            MOUSEINPUT,
        };

        let flags = if down {
            MOUSEEVENTF_RIGHTDOWN
        } else {
            MOUSEEVENTF_RIGHTUP
        };
        let input = INPUT {
            r#type: INPUT_MOUSE,
            Anonymous: INPUT_0 {
                mi: MOUSEINPUT {
                    dx: 0,
                    dy: 0,
                    mouseData: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: INJECT_TAG,
                },
            },
        };
        let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if sent == 0 {
            warn!("SendInput returned 0");
        }
    }
}

impl InputInjector for WinInjector {
    fn pointer_down(&mut self, _pos: Point) {
        self.send_button(true);
    }

    fn pointer_up(&mut self, _pos: Point) {
        self.send_button(false);
    }
}

/// Current cursor position in screen coordinates.
pub fn cursor_pos() -> Option<Point> {
    use windows::Win32::Foundation::POINT;
    use windows::Win32::UI::WindowsAndMessaging::GetCursorPos;

    let mut pt = POINT::default();
    unsafe { GetCursorPos(&mut pt) }.ok()?;
    Some(Point { x: pt.x, y: pt.y })
}

struct HookShared {
    enabled: AtomicBool,
    sender: Mutex<Option<Sender<KeyEvent>>>,
    /// Chords the hook consumes instead of forwarding to the client.
    swallow: Mutex<Vec<Hotkey>>,
}

static HOOK_SHARED: Lazy<HookShared> = Lazy::new(|| HookShared {
    enabled: AtomicBool::new(false),
    sender: Mutex::new(None),
    swallow: Mutex::new(Vec::new()),
});

struct HookThread {
    thread_id: u32,
    join: std::thread::JoinHandle<()>,
}

/// Owns the `WH_KEYBOARD_LL` hook thread. Keydown events are delivered to
/// the channel handed to `install`; the embedding loop turns them into
/// `on_trigger` / `toggle` calls.
#[derive(Default)]
pub struct KeyHook {
    hook_thread: Option<HookThread>,
}

impl KeyHook {
    /// Install the hook on its own message-loop thread. `swallow` lists the
    /// chords the hook consumes (the toggle chord when it carries Ctrl or
    /// Alt); everything else is passed through to the client.
    pub fn install(&mut self, sender: Sender<KeyEvent>, swallow: Vec<Hotkey>) -> anyhow::Result<()> {
        if self.hook_thread.is_some() {
            return Ok(());
        }

        if let Ok(mut guard) = HOOK_SHARED.sender.lock() {
            *guard = Some(sender);
        }
        if let Ok(mut guard) = HOOK_SHARED.swallow.lock() {
            *guard = swallow;
        }
        HOOK_SHARED.enabled.store(true, Ordering::Release);

        use std::time::Duration;
        use windows::Win32::System::LibraryLoader::GetModuleHandleW;
        use windows::Win32::System::Threading::GetCurrentThreadId;
        use windows::Win32::UI::WindowsAndMessaging::{
            DispatchMessageW, GetMessageW, PeekMessageW, SetWindowsHookExW, TranslateMessage,
            UnhookWindowsHookEx, MSG, PM_NOREMOVE, WH_KEYBOARD_LL,
        };

        // Handshake so install() only returns once the hook is actually up.
        let (ready_tx, ready_rx) = std::sync::mpsc::sync_channel::<anyhow::Result<u32>>(1);

        let join = std::thread::spawn(move || {
            // Ensure the thread has a message queue.
            let mut msg = MSG::default();
            unsafe {
                let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
            }

            let thread_id = unsafe { GetCurrentThreadId() };

            let hmodule = match unsafe { GetModuleHandleW(None) } {
                Ok(h) => h,
                Err(e) => {
                    let _ = ready_tx.send(Err(anyhow!(e)));
                    return;
                }
            };

            let hook = match unsafe {
                SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), hmodule, 0)
            } {
                Ok(h) if !h.0.is_null() => h,
                Ok(_) => {
                    let _ = ready_tx.send(Err(anyhow!(windows::core::Error::from_win32())));
                    return;
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(anyhow!(e)));
                    return;
                }
            };

            let _ = ready_tx.send(Ok(thread_id));
            debug!("keyboard hook installed");

            // Message loop keeps WH_KEYBOARD_LL callbacks flowing.
            loop {
                let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
                if r.0 == 0 || r.0 == -1 {
                    break;
                }
                unsafe {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }

            unsafe {
                let _ = UnhookWindowsHookEx(hook);
            }
        });

        let thread_id = ready_rx
            .recv_timeout(Duration::from_secs(2))
            .map_err(|_| anyhow!("hook thread did not signal readiness"))??;

        self.hook_thread = Some(HookThread { thread_id, join });
        info!("trigger key hook ready");
        Ok(())
    }

    pub fn uninstall(&mut self) -> anyhow::Result<()> {
        // Stop dispatch first so no new events flow while shutting down.
        HOOK_SHARED.enabled.store(false, Ordering::Release);
        if let Ok(mut guard) = HOOK_SHARED.sender.lock() {
            *guard = None;
        }

        if let Some(th) = self.hook_thread.take() {
            use windows::Win32::Foundation::{LPARAM, WPARAM};
            use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};
            unsafe {
                let _ = PostThreadMessageW(th.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
            }
            if th.join.join().is_err() {
                error!("hook thread panicked during shutdown");
            }
        }

        Ok(())
    }
}

unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: windows::Win32::Foundation::WPARAM,
    l_param: windows::Win32::Foundation::LPARAM,
) -> windows::Win32::Foundation::LRESULT {
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        GetAsyncKeyState, VK_CONTROL, VK_MENU, VK_SHIFT,
    };
    use windows::Win32::UI::WindowsAndMessaging::{
        CallNextHookEx, HC_ACTION, KBDLLHOOKSTRUCT, KBDLLHOOKSTRUCT_FLAGS, WM_KEYDOWN,
        WM_SYSKEYDOWN,
    };

    if n_code == HC_ACTION as i32 {
        let msg = w_param.0 as u32;
        if msg == WM_KEYDOWN || msg == WM_SYSKEYDOWN {
            let info = &*(l_param.0 as *const KBDLLHOOKSTRUCT);
            let injected = (info.flags & KBDLLHOOKSTRUCT_FLAGS(0x10)) != KBDLLHOOKSTRUCT_FLAGS(0);
            if !injected && HOOK_SHARED.enabled.load(Ordering::Acquire) {
                let event = KeyEvent {
                    vk: info.vkCode,
                    ctrl: (GetAsyncKeyState(VK_CONTROL.0 as i32) as u16 & 0x8000) != 0,
                    shift: (GetAsyncKeyState(VK_SHIFT.0 as i32) as u16 & 0x8000) != 0,
                    alt: (GetAsyncKeyState(VK_MENU.0 as i32) as u16 & 0x8000) != 0,
                };
                if let Ok(guard) = HOOK_SHARED.sender.try_lock() {
                    if let Some(sender) = guard.as_ref() {
                        let _ = sender.send(event);
                    }
                }
                if let Ok(guard) = HOOK_SHARED.swallow.try_lock() {
                    if guard
                        .iter()
                        .any(|chord| chord.matches(event.vk, event.ctrl, event.shift, event.alt))
                    {
                        return windows::Win32::Foundation::LRESULT(1);
                    }
                }
            }
        }
    }

    CallNextHookEx(
        windows::Win32::UI::WindowsAndMessaging::HHOOK(std::ptr::null_mut()),
        n_code,
        w_param,
        l_param,
    )
}
