//! Alternate-screen and cursor management with panic-safe cleanup.

use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io::{self, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while a [`ScreenGuard`] owns the terminal (read by the panic hook).
pub(crate) static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Guard that switches to the alternate screen and hides the cursor, and
/// restores both when dropped. Covers normal exit, error returns and panics.
pub struct ScreenGuard<W: Write> {
    out: W,
    active: bool,
}

impl<W: Write> ScreenGuard<W> {
    /// Enter the alternate screen on `out` and hide the cursor.
    pub fn enter(mut out: W) -> io::Result<Self> {
        install_panic_hook();

        crossterm::execute!(out, EnterAlternateScreen, Hide)?;
        SCREEN_ACTIVE.store(true, Ordering::SeqCst);

        Ok(Self { out, active: true })
    }

    /// Restore the screen now; the later drop becomes a no-op.
    pub fn exit(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            SCREEN_ACTIVE.store(false, Ordering::SeqCst);
            crossterm::execute!(self.out, Show, LeaveAlternateScreen)?;
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Writer the frames are drawn into while the guard is held.
    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }
}

impl<W: Write> Drop for ScreenGuard<W> {
    fn drop(&mut self) {
        // Best-effort cleanup - ignore errors during drop
        let _ = self.exit();
    }
}

/// Install a panic hook that restores the terminal before the panic message
/// is printed. Installed at most once per process.
pub(crate) fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if SCREEN_ACTIVE.swap(false, Ordering::SeqCst) {
            let _ = crossterm::execute!(io::stdout(), Show, LeaveAlternateScreen);
        }
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_drop_writes_restore_sequences() {
        let mut buf = Vec::new();
        {
            let guard = ScreenGuard::enter(&mut buf).unwrap();
            assert!(guard.is_active());
        }
        let s = String::from_utf8(buf).unwrap();
        assert!(s.starts_with("\x1b[?1049h"));
        assert!(s.contains("\x1b[?25l"));
        assert!(s.contains("\x1b[?25h"));
        assert!(s.ends_with("\x1b[?1049l"));
    }

    #[test]
    fn test_manual_exit_is_idempotent() {
        let mut buf = Vec::new();
        let mut guard = ScreenGuard::enter(&mut buf).unwrap();
        guard.exit().unwrap();
        assert!(!guard.is_active());
        guard.exit().unwrap();
        drop(guard);
        let s = String::from_utf8(buf).unwrap();
        assert_eq!(s.matches("\x1b[?1049l").count(), 1);
    }

    #[test]
    fn test_panic_hook_installation() {
        install_panic_hook();
        install_panic_hook();
    }
}
