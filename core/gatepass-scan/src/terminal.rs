//! Terminal plumbing: raw mode, key translation, operator output.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use gatepass_core::{Key, KeyPress, Notifier, Severity, TracingNotifier};
use std::io::{self, Write};
use std::sync::Mutex;

/// Holds the terminal in raw mode; restores it on drop, including on panic
/// unwinding out of the listen loop.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            tracing::warn!(error = %err, "Failed to restore terminal mode");
        }
    }
}

/// Ctrl+C and Ctrl+D leave the listen loop. Raw mode swallows SIGINT.
pub fn is_quit(event: &KeyEvent) -> bool {
    event.kind == KeyEventKind::Press
        && event.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(event.code, KeyCode::Char('c') | KeyCode::Char('d'))
}

/// Translates a crossterm key event. Releases and repeats yield `None`.
///
/// The terminal has no focus concept, so every press is reported with
/// [`gatepass_core::FocusTarget::None`].
pub fn key_press(event: &KeyEvent) -> Option<KeyPress> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let chorded = event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER);

    let key = match event.code {
        KeyCode::Char(c) if chorded => Key::Other(format!("{:?}+{}", event.modifiers, c)),
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::F(n) => Key::Function(n),
        other => Key::Other(format!("{:?}", other)),
    };
    Some(KeyPress::new(key))
}

/// Prints notifications as lines and mirrors them to the log file. Uses
/// `\r\n` so output stays aligned while the terminal is in raw mode.
#[derive(Default)]
pub struct TerminalNotifier {
    out: Mutex<()>,
    log: TracingNotifier,
}

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.log.notify(message, severity);
        let _lock = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "{}\r\n", format_line(message, severity));
        let _ = stdout.flush();
    }
}

fn format_line(message: &str, severity: Severity) -> String {
    let tag = match severity {
        Severity::Success => "[ok]",
        Severity::Error => "[error]",
        Severity::Info => "[info]",
    };
    format!("{} {}", tag, message)
}
