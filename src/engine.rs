use crate::{
    error::ClickerError,
    geometry::GridGeometry,
    planner::{ends_unit, Cell, ScanOrder},
    pointer::{ClickButton, ModifierGuard, ModifierKey, Pause, Pointer},
    random::RandomSource,
    timing::{secs, RestProfile, Speed, TimingProfile, DEFAULT_JITTER_PX, DEFAULT_START_DELAY_SECS},
};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};
use tracing::{debug, info};

/// Parking the pointer here aborts a run.
pub const FAILSAFE_CORNER: (i32, i32) = (0, 0);

/// Startup waits are sliced so a cancel lands quickly.
const START_SLICE: Duration = Duration::from_millis(50);

/// Knobs that come from the command line rather than the config file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunOptions {
    pub start_delay: Duration,
    pub jitter: i32,
    pub button: ClickButton,
    pub failsafe: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            start_delay: secs(DEFAULT_START_DELAY_SECS),
            jitter: DEFAULT_JITTER_PX,
            button: ClickButton::Left,
            failsafe: true,
        }
    }
}

/// Everything a run needs, fixed when the run is requested.
#[derive(Clone, Debug)]
pub struct RunPlan {
    pub sequence: Vec<Cell>,
    pub order: ScanOrder,
    pub speed: Speed,
    pub grid: GridGeometry,
    pub timing: TimingProfile,
    pub rests: RestProfile,
    pub options: RunOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { clicks: u32 },
    Cancelled { clicks: u32 },
}

pub struct Collaborators<'a> {
    pub pointer: &'a mut dyn Pointer,
    pub rng: &'a mut dyn RandomSource,
    pub pause: &'a mut dyn Pause,
}

fn cancelled(flag: &AtomicBool) -> bool {
    flag.load(Ordering::SeqCst)
}

/// Waits out the startup delay. Returns `false` if cancelled meanwhile.
pub fn wait_for_start(delay: Duration, cancel: &AtomicBool, pause: &mut dyn Pause) -> bool {
    let mut remaining = delay;
    while !remaining.is_zero() {
        if cancelled(cancel) {
            return false;
        }
        let slice = remaining.min(START_SLICE);
        pause.pause(slice);
        remaining -= slice;
    }
    !cancelled(cancel)
}

/// Clicks every cell of `plan.sequence` in order while holding Shift.
///
/// The cancel flag is checked before each step. Shift is released on every
/// exit, including pointer errors and the fail-safe.
pub fn click_pass(plan: &RunPlan, cancel: &AtomicBool, io: Collaborators<'_>) -> Result<RunOutcome, ClickerError> {
    let Collaborators { pointer, rng, pause } = io;
    let mut pointer = ModifierGuard::hold(pointer, ModifierKey::Shift)?;

    let jitter = plan.options.jitter.abs() as i64;
    let mut clicks: u32 = 0;
    let mut next_burst_at = plan.rests.sample_burst_gap(rng);

    for (idx, cell) in plan.sequence.iter().enumerate() {
        if cancelled(cancel) {
            return Ok(RunOutcome::Cancelled { clicks });
        }

        if plan.options.failsafe {
            let (px, py) = pointer.position()?;
            if (px, py) == FAILSAFE_CORNER {
                return Err(ClickerError::FailSafe { x: px, y: py });
            }
        }

        let (cx, cy) = plan.grid.center(cell.row, cell.column);
        let x = (cx + rng.int_inclusive(-jitter, jitter) as f64).round() as i32;
        let y = (cy + rng.int_inclusive(-jitter, jitter) as f64).round() as i32;

        pointer.move_to(x, y, plan.timing.sample_move_duration(rng))?;
        pointer.click(plan.options.button)?;
        clicks += 1;
        debug!(row = cell.row, column = cell.column, x, y, clicks, "clicked");

        pause.pause(plan.timing.sample_click_delay(rng));

        if clicks >= next_burst_at && !cancelled(cancel) {
            let rest = plan.rests.sample_burst_rest(rng);
            debug!("burst rest {:.2}s after {} clicks", rest.as_secs_f64(), clicks);
            pause.pause(rest);
            next_burst_at = clicks + plan.rests.sample_burst_gap(rng);
        }

        if !cancelled(cancel) && ends_unit(plan.order, &plan.sequence, idx) {
            pause.pause(plan.rests.sample_unit_rest(rng));
        }
    }

    info!("Click pass finished after {} clicks", clicks);
    Ok(RunOutcome::Completed { clicks })
}
