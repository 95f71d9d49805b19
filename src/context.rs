use crate::{
    config::GridConfig,
    engine::{self, Collaborators, RunOptions, RunOutcome, RunPlan},
    error::ClickerError,
    geometry::{CalibrationPoints, GridGeometry, Point},
    planner,
    random::RandomSource,
    timing::{RestProfile, TimingProfile},
};
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicBool, AtomicU8, Ordering},
    Arc,
};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
}

impl Corner {
    pub fn label(self) -> &'static str {
        match self {
            Corner::TopLeft => "p00 (top-left of first cell)",
            Corner::TopRight => "pTR (top-right of top-right cell)",
            Corner::BottomLeft => "pBL (bottom-left of bottom-left cell)",
        }
    }
}

/// Capture slots; any of them may still be empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Calibration {
    pub top_left: Option<Point>,
    pub top_right: Option<Point>,
    pub bottom_left: Option<Point>,
}

impl Calibration {
    pub fn set(&mut self, corner: Corner, point: Point) {
        match corner {
            Corner::TopLeft => self.top_left = Some(point),
            Corner::TopRight => self.top_right = Some(point),
            Corner::BottomLeft => self.bottom_left = Some(point),
        }
    }

    pub fn complete(&self) -> Result<CalibrationPoints, ClickerError> {
        match (self.top_left, self.top_right, self.bottom_left) {
            (Some(top_left), Some(top_right), Some(bottom_left)) => {
                Ok(CalibrationPoints { top_left, top_right, bottom_left })
            }
            _ => {
                let missing: Vec<&str> = [
                    (self.top_left, "p00"),
                    (self.top_right, "pTR"),
                    (self.bottom_left, "pBL"),
                ]
                .iter()
                .filter(|(point, _)| point.is_none())
                .map(|(_, name)| *name)
                .collect();
                Err(ClickerError::IncompleteCalibration { missing: missing.join(", ") })
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RunPhase {
    Idle = 0,
    Starting = 1,
    Running = 2,
}

impl RunPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => RunPhase::Starting,
            2 => RunPhase::Running,
            _ => RunPhase::Idle,
        }
    }
}

/// State shared by the control surface and the run thread.
///
/// Captures and reloads write calibration/config; only a [`RunTicket`]
/// moves the phase. A run works from its own snapshot, so later writes only
/// reach the next run.
#[derive(Debug)]
pub struct RunContext {
    calibration: Mutex<Calibration>,
    config: Mutex<GridConfig>,
    phase: AtomicU8,
    cancel: AtomicBool,
}

impl RunContext {
    pub fn new(config: GridConfig) -> Self {
        Self {
            calibration: Mutex::new(Calibration::default()),
            config: Mutex::new(config),
            phase: AtomicU8::new(RunPhase::Idle as u8),
            cancel: AtomicBool::new(false),
        }
    }

    pub fn capture(&self, corner: Corner, point: Point) {
        self.calibration.lock().set(corner, point);
    }

    pub fn calibration(&self) -> Calibration {
        *self.calibration.lock()
    }

    pub fn config(&self) -> GridConfig {
        *self.config.lock()
    }

    pub fn set_config(&self, config: GridConfig) {
        *self.config.lock() = config;
    }

    pub fn phase(&self) -> RunPhase {
        RunPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Flags the active run to stop. Returns `false` when nothing is running.
    pub fn cancel(&self) -> bool {
        if self.phase() == RunPhase::Idle {
            return false;
        }
        self.cancel.store(true, Ordering::SeqCst);
        true
    }

    /// Snapshots calibration and config into a plan and claims the run slot.
    ///
    /// Fails without touching any state when a run is already active or the
    /// calibration does not yield a usable grid.
    pub fn begin(
        self: &Arc<Self>,
        options: RunOptions,
        rng: &mut dyn RandomSource,
    ) -> Result<(RunTicket, RunPlan), ClickerError> {
        if self.phase() != RunPhase::Idle {
            return Err(ClickerError::AlreadyRunning);
        }

        let points = self.calibration.lock().complete()?;
        let config = self.config();
        let grid = GridGeometry::resolve(&points, config.columns, config.rows)?;
        let plan = RunPlan {
            sequence: planner::plan(config.columns, config.rows, config.scan_order, rng),
            order: config.scan_order,
            speed: config.speed,
            grid,
            timing: TimingProfile::for_speed(config.speed),
            rests: RestProfile::default(),
            options,
        };

        self.phase
            .compare_exchange(RunPhase::Idle as u8, RunPhase::Starting as u8, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ClickerError::AlreadyRunning)?;
        self.cancel.store(false, Ordering::SeqCst);

        Ok((RunTicket { ctx: Arc::clone(self) }, plan))
    }
}

/// The claimed run slot. Dropping it returns the context to idle.
#[derive(Debug)]
pub struct RunTicket {
    ctx: Arc<RunContext>,
}

impl RunTicket {
    /// Waits the startup delay, then clicks through the plan.
    pub fn execute(self, plan: &RunPlan, io: Collaborators<'_>) -> Result<RunOutcome, ClickerError> {
        if !engine::wait_for_start(plan.options.start_delay, &self.ctx.cancel, &mut *io.pause) {
            warn!("Run cancelled before the first click");
            return Ok(RunOutcome::Cancelled { clicks: 0 });
        }

        self.ctx.phase.store(RunPhase::Running as u8, Ordering::SeqCst);
        let result = engine::click_pass(plan, &self.ctx.cancel, io);
        match &result {
            Ok(RunOutcome::Completed { clicks }) => info!("Done. Total clicks: {}", clicks),
            Ok(RunOutcome::Cancelled { clicks }) => warn!("Stopped early. Clicks made: {}", clicks),
            Err(e) => warn!("Run aborted: {}", e),
        }
        result
    }
}

impl Drop for RunTicket {
    fn drop(&mut self) {
        self.ctx.phase.store(RunPhase::Idle as u8, Ordering::SeqCst);
        self.ctx.cancel.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        planner::ScanOrder,
        pointer::recording::{RecordingPause, RecordingPointer},
        random::{scripted::Scripted, RandRandom},
        timing::Speed,
    };
    use rand::{rngs::StdRng, SeedableRng};
    use std::time::Duration;

    fn calibrated(config: GridConfig) -> Arc<RunContext> {
        let ctx = Arc::new(RunContext::new(config));
        ctx.capture(Corner::TopLeft, Point::new(0, 0));
        ctx.capture(Corner::TopRight, Point::new(240, 0));
        ctx.capture(Corner::BottomLeft, Point::new(0, 120));
        ctx
    }

    fn quick() -> RunOptions {
        RunOptions { start_delay: Duration::ZERO, ..RunOptions::default() }
    }

    #[test]
    fn test_incomplete_calibration_names_missing_points() {
        let ctx = Arc::new(RunContext::new(GridConfig::default()));
        ctx.capture(Corner::TopRight, Point::new(240, 0));
        let err = ctx.begin(quick(), &mut Scripted::new(&[], 0.5)).unwrap_err();
        match err {
            ClickerError::IncompleteCalibration { missing } => assert_eq!(missing, "p00, pBL"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(ctx.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_invalid_calibration_never_enters_starting() {
        let ctx = calibrated(GridConfig::default());
        ctx.capture(Corner::TopRight, Point::new(-10, 0));
        let err = ctx.begin(quick(), &mut Scripted::new(&[], 0.5)).unwrap_err();
        assert!(matches!(err, ClickerError::InvalidCalibration { .. }));
        assert_eq!(ctx.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let ctx = calibrated(GridConfig::default());
        let (ticket, plan) = ctx.begin(quick(), &mut Scripted::new(&[], 0.5)).unwrap();
        assert_eq!(ctx.phase(), RunPhase::Starting);

        let err = ctx.begin(quick(), &mut Scripted::new(&[], 0.5)).unwrap_err();
        assert!(matches!(err, ClickerError::AlreadyRunning));
        assert_eq!(ctx.phase(), RunPhase::Starting);
        assert_eq!(plan.sequence.len(), 24 * 12);

        drop(ticket);
        assert_eq!(ctx.phase(), RunPhase::Idle);
        assert!(ctx.begin(quick(), &mut Scripted::new(&[], 0.5)).is_ok());
    }

    #[test]
    fn test_plan_is_a_snapshot() {
        let ctx = calibrated(GridConfig::default());
        let (_ticket, plan) = ctx.begin(quick(), &mut Scripted::new(&[], 0.5)).unwrap();

        ctx.capture(Corner::TopRight, Point::new(480, 0));
        ctx.set_config(GridConfig { columns: 2, rows: 2, speed: Speed::Fast, scan_order: ScanOrder::Random });

        assert_eq!(plan.grid.cell.width, 10.0);
        assert_eq!(plan.sequence.len(), 24 * 12);
        assert_eq!(plan.order, ScanOrder::ColumnMajor);
        assert_eq!(plan.timing, TimingProfile::for_speed(Speed::Human));
    }

    #[test]
    fn test_execute_runs_to_completion_and_returns_to_idle() {
        let ctx = calibrated(GridConfig { columns: 3, rows: 2, ..GridConfig::default() });
        let mut rng = RandRandom(StdRng::seed_from_u64(21));
        let (ticket, plan) = ctx.begin(quick(), &mut rng).unwrap();
        let mut pointer = RecordingPointer::new();
        let mut pause = RecordingPause::default();

        let outcome = ticket
            .execute(&plan, Collaborators { pointer: &mut pointer, rng: &mut rng, pause: &mut pause })
            .unwrap();

        assert_eq!(outcome, RunOutcome::Completed { clicks: 6 });
        assert_eq!(ctx.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_cancel_during_startup_skips_the_modifier() {
        let ctx = calibrated(GridConfig::default());
        let (ticket, plan) = ctx.begin(RunOptions::default(), &mut Scripted::new(&[], 0.5)).unwrap();
        assert!(ctx.cancel());

        let mut pointer = RecordingPointer::new();
        let mut pause = RecordingPause::default();
        let mut rng = Scripted::new(&[], 0.5);
        let outcome = ticket
            .execute(&plan, Collaborators { pointer: &mut pointer, rng: &mut rng, pause: &mut pause })
            .unwrap();

        assert_eq!(outcome, RunOutcome::Cancelled { clicks: 0 });
        assert!(pointer.events.is_empty());
        assert_eq!(ctx.phase(), RunPhase::Idle);
    }

    #[test]
    fn test_cancel_when_idle_is_a_no_op() {
        let ctx = calibrated(GridConfig::default());
        assert!(!ctx.cancel());
        let (_ticket, _plan) = ctx.begin(quick(), &mut Scripted::new(&[], 0.5)).unwrap();
        // A stale cancel from before the start does not leak into the new run.
        assert!(!ctx.cancel.load(Ordering::SeqCst));
    }
}
