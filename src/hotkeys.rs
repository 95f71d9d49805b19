use crate::context::Corner;
use std::{
    io::{self, BufRead},
    sync::mpsc::Sender,
    thread::{self, JoinHandle},
};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Capture(Corner),
    Start,
    Cancel,
    Reload,
    Quit,
}

/// Keys the Ctrl+Alt combos care about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(feature = "hooks"), allow(dead_code))]
pub enum ComboKey {
    Ctrl,
    Alt,
    Digit(u8),
    R,
    Other,
}

/// Tracks held modifiers and turns Ctrl+Alt+<key> presses into commands.
#[derive(Default, Debug)]
#[cfg_attr(not(feature = "hooks"), allow(dead_code))]
pub struct ComboTracker {
    ctrl: bool,
    alt: bool,
}

#[cfg_attr(not(feature = "hooks"), allow(dead_code))]
impl ComboTracker {
    pub fn press(&mut self, key: ComboKey) -> Option<Command> {
        match key {
            ComboKey::Ctrl => self.ctrl = true,
            ComboKey::Alt => self.alt = true,
            _ if self.ctrl && self.alt => return combo_command(key),
            _ => {}
        }
        None
    }

    pub fn release(&mut self, key: ComboKey) {
        match key {
            ComboKey::Ctrl => self.ctrl = false,
            ComboKey::Alt => self.alt = false,
            _ => {}
        }
    }
}

#[cfg_attr(not(feature = "hooks"), allow(dead_code))]
fn combo_command(key: ComboKey) -> Option<Command> {
    match key {
        ComboKey::Digit(1) => Some(Command::Capture(Corner::TopLeft)),
        ComboKey::Digit(2) => Some(Command::Capture(Corner::TopRight)),
        ComboKey::Digit(3) => Some(Command::Capture(Corner::BottomLeft)),
        ComboKey::Digit(0) => Some(Command::Start),
        ComboKey::Digit(9) => Some(Command::Cancel),
        ComboKey::R => Some(Command::Reload),
        _ => None,
    }
}

pub fn parse_console_line(line: &str) -> Option<Command> {
    match line.trim().to_lowercase().as_str() {
        "1" => Some(Command::Capture(Corner::TopLeft)),
        "2" => Some(Command::Capture(Corner::TopRight)),
        "3" => Some(Command::Capture(Corner::BottomLeft)),
        "0" | "start" => Some(Command::Start),
        "9" | "stop" | "cancel" => Some(Command::Cancel),
        "r" | "reload" => Some(Command::Reload),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Reads commands from stdin until EOF.
pub fn spawn_console(tx: Sender<Command>) -> JoinHandle<()> {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_console_line(&line) {
                Some(cmd) => {
                    if tx.send(cmd).is_err() {
                        break;
                    }
                }
                None => warn!("Unknown command {:?} (use 1, 2, 3, 0, 9, r, q)", line.trim()),
            }
        }
    })
}

#[cfg(feature = "hooks")]
fn combo_key(key: rdev::Key) -> ComboKey {
    use rdev::Key;
    match key {
        Key::ControlLeft | Key::ControlRight => ComboKey::Ctrl,
        Key::Alt | Key::AltGr => ComboKey::Alt,
        Key::Num0 => ComboKey::Digit(0),
        Key::Num1 => ComboKey::Digit(1),
        Key::Num2 => ComboKey::Digit(2),
        Key::Num3 => ComboKey::Digit(3),
        Key::Num9 => ComboKey::Digit(9),
        Key::KeyR => ComboKey::R,
        _ => ComboKey::Other,
    }
}

/// Global Ctrl+Alt hotkeys through a system-wide keyboard hook.
#[cfg(feature = "hooks")]
pub fn spawn_hotkeys(tx: Sender<Command>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut tracker = ComboTracker::default();
        let result = rdev::listen(move |event| match event.event_type {
            rdev::EventType::KeyPress(key) => {
                if let Some(cmd) = tracker.press(combo_key(key)) {
                    let _ = tx.send(cmd);
                }
            }
            rdev::EventType::KeyRelease(key) => tracker.release(combo_key(key)),
            _ => {}
        });
        if let Err(e) = result {
            warn!("Hotkey listener stopped: {:?}", e);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combo_requires_both_modifiers() {
        let mut t = ComboTracker::default();
        assert_eq!(t.press(ComboKey::Digit(0)), None);
        t.press(ComboKey::Ctrl);
        assert_eq!(t.press(ComboKey::Digit(0)), None);
        t.press(ComboKey::Alt);
        assert_eq!(t.press(ComboKey::Digit(0)), Some(Command::Start));
        assert_eq!(t.press(ComboKey::Digit(9)), Some(Command::Cancel));
        assert_eq!(t.press(ComboKey::R), Some(Command::Reload));
        assert_eq!(t.press(ComboKey::Digit(1)), Some(Command::Capture(Corner::TopLeft)));
        assert_eq!(t.press(ComboKey::Other), None);

        t.release(ComboKey::Alt);
        assert_eq!(t.press(ComboKey::Digit(2)), None);
    }

    #[test]
    fn test_console_lines() {
        assert_eq!(parse_console_line(" 2 "), Some(Command::Capture(Corner::TopRight)));
        assert_eq!(parse_console_line("3"), Some(Command::Capture(Corner::BottomLeft)));
        assert_eq!(parse_console_line("START"), Some(Command::Start));
        assert_eq!(parse_console_line("9"), Some(Command::Cancel));
        assert_eq!(parse_console_line("r"), Some(Command::Reload));
        assert_eq!(parse_console_line("q"), Some(Command::Quit));
        assert_eq!(parse_console_line("7"), None);
    }
}
