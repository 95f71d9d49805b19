use crate::error::PointerError;
use enigo::{KeyboardControllable, MouseButton, MouseControllable};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::Rng;
use std::{
    ops::{Deref, DerefMut},
    thread,
    time::Duration,
};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ClickButton {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierKey {
    Shift,
}

/// Pointer and keyboard primitives a run drives.
pub trait Pointer {
    /// Glide to `(x, y)` over roughly `duration`.
    fn move_to(&mut self, x: i32, y: i32, duration: Duration) -> Result<(), PointerError>;
    fn click(&mut self, button: ClickButton) -> Result<(), PointerError>;
    fn key_down(&mut self, key: ModifierKey) -> Result<(), PointerError>;
    fn key_up(&mut self, key: ModifierKey) -> Result<(), PointerError>;
    fn position(&mut self) -> Result<(i32, i32), PointerError>;
}

pub trait Pause {
    fn pause(&mut self, duration: Duration);
}

pub struct ThreadPause;

impl Pause for ThreadPause {
    fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Holds a modifier key down until dropped, on every exit path.
pub struct ModifierGuard<'a> {
    pointer: &'a mut dyn Pointer,
    key: ModifierKey,
}

impl<'a> ModifierGuard<'a> {
    pub fn hold(pointer: &'a mut dyn Pointer, key: ModifierKey) -> Result<Self, PointerError> {
        pointer.key_down(key)?;
        Ok(Self { pointer, key })
    }
}

impl<'a> Deref for ModifierGuard<'a> {
    type Target = dyn Pointer + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.pointer
    }
}

impl<'a> DerefMut for ModifierGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.pointer
    }
}

impl Drop for ModifierGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.pointer.key_up(self.key) {
            warn!("Failed to release {:?}: {}", self.key, e);
        }
    }
}

// -------------- enigo backend --------------

static ENIGO: Lazy<Mutex<enigo::Enigo>> = Lazy::new(|| Mutex::new(enigo::Enigo::new()));

/// Finest step of a timed glide.
const STEP: Duration = Duration::from_millis(5);
const MAX_STEPS: u32 = 50;

pub struct EnigoPointer;

impl EnigoPointer {
    pub fn main_display_size() -> (i32, i32) {
        let (w, h) = ENIGO.lock().main_display_size();
        (w as i32, h as i32)
    }
}

impl Pointer for EnigoPointer {
    fn move_to(&mut self, x: i32, y: i32, duration: Duration) -> Result<(), PointerError> {
        let start = ENIGO.lock().mouse_location();
        move_mouse_human(start, (x, y), duration);
        Ok(())
    }

    fn click(&mut self, button: ClickButton) -> Result<(), PointerError> {
        let button = match button {
            ClickButton::Left => MouseButton::Left,
            ClickButton::Right => MouseButton::Right,
        };
        ENIGO.lock().mouse_click(button);
        Ok(())
    }

    fn key_down(&mut self, key: ModifierKey) -> Result<(), PointerError> {
        ENIGO.lock().key_down(enigo_key(key));
        Ok(())
    }

    fn key_up(&mut self, key: ModifierKey) -> Result<(), PointerError> {
        ENIGO.lock().key_up(enigo_key(key));
        Ok(())
    }

    fn position(&mut self) -> Result<(i32, i32), PointerError> {
        Ok(ENIGO.lock().mouse_location())
    }
}

fn enigo_key(key: ModifierKey) -> enigo::Key {
    match key {
        ModifierKey::Shift => enigo::Key::Shift,
    }
}

/// Glides along a shallow cubic Bézier arc so the path is not a ruler line,
/// spreading the steps evenly over `duration`.
pub fn move_mouse_human(start: (i32, i32), end: (i32, i32), duration: Duration) {
    let steps = glide_steps(duration);
    if steps <= 1 {
        ENIGO.lock().mouse_move_to(end.0, end.1);
        return;
    }

    let mut rng = rand::thread_rng();
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let distance = ((dx as f64).powi(2) + (dy as f64).powi(2)).sqrt();
    // Wobble scales with distance; short hops between neighbouring cells stay tight.
    let wobble = ((distance / 8.0) as i32).clamp(0, 20);
    let control1 = (
        start.0 + dx / 3 + rng.gen_range(-wobble..=wobble),
        start.1 + dy / 3 + rng.gen_range(-wobble..=wobble),
    );
    let control2 = (
        start.0 + 2 * dx / 3 + rng.gen_range(-wobble..=wobble),
        start.1 + 2 * dy / 3 + rng.gen_range(-wobble..=wobble),
    );

    let per_step = duration / steps;
    for (x, y) in bezier_path(start, control1, control2, end, steps) {
        ENIGO.lock().mouse_move_to(x, y);
        thread::sleep(per_step);
    }
}

fn glide_steps(duration: Duration) -> u32 {
    ((duration.as_millis() / STEP.as_millis()) as u32).min(MAX_STEPS)
}

/// Points `1..=steps` of a cubic Bézier curve; the last one is exactly `end`.
fn bezier_path(
    start: (i32, i32),
    control1: (i32, i32),
    control2: (i32, i32),
    end: (i32, i32),
    steps: u32,
) -> Vec<(i32, i32)> {
    let axis = |p0: i32, p1: i32, p2: i32, p3: i32, t: f64| {
        (1.0 - t).powi(3) * p0 as f64
            + 3.0 * (1.0 - t).powi(2) * t * p1 as f64
            + 3.0 * (1.0 - t) * t.powi(2) * p2 as f64
            + t.powi(3) * p3 as f64
    };

    (1..=steps)
        .map(|i| {
            if i == steps {
                return end;
            }
            let t = i as f64 / steps as f64;
            let x = axis(start.0, control1.0, control2.0, end.0, t);
            let y = axis(start.1, control1.1, control2.1, end.1, t);
            (x.round() as i32, y.round() as i32)
        })
        .collect()
}
