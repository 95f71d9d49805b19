use crate::{
    config::GridConfig,
    context::{Corner, RunContext},
    engine::{Collaborators, RunOptions},
    geometry::Point,
    hotkeys::Command,
    pointer::{EnigoPointer, Pointer, ThreadPause},
    random::RandRandom,
    screen::{self, ScreenRect},
};
use std::{
    ops::ControlFlow,
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
};
use tracing::{info, warn};

/// Dispatches control-surface commands; runs go to a worker thread.
pub struct App {
    ctx: Arc<RunContext>,
    config_path: PathBuf,
    options: RunOptions,
    displays: Vec<ScreenRect>,
    job: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(ctx: Arc<RunContext>, config_path: PathBuf, options: RunOptions, displays: Vec<ScreenRect>) -> Self {
        Self { ctx, config_path, options, displays, job: None }
    }

    pub fn handle(&mut self, cmd: Command, pointer: &mut dyn Pointer) -> ControlFlow<()> {
        match cmd {
            Command::Capture(corner) => self.capture(corner, pointer),
            Command::Start => self.start(),
            Command::Cancel => {
                if self.ctx.cancel() {
                    warn!("Stop requested -> run stopping...");
                }
            }
            Command::Reload => self.reload(),
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn capture(&self, corner: Corner, pointer: &mut dyn Pointer) {
        let (x, y) = match pointer.position() {
            Ok(pos) => pos,
            Err(e) => {
                warn!("Could not read pointer position: {}", e);
                return;
            }
        };
        let point = Point::new(x, y);
        self.ctx.capture(corner, point);
        info!("Captured {} = ({}, {})", corner.label(), x, y);
        if self.ctx.calibration().complete().is_ok() {
            info!("All three points captured, ready to start");
        }
        if screen::is_on_screen(&self.displays, point) == Some(false) {
            warn!("({}, {}) is not on any display, recalibrate if this was unintended", x, y);
        }
    }

    fn start(&mut self) {
        let mut rng = RandRandom::thread();
        let (ticket, plan) = match self.ctx.begin(self.options, &mut rng) {
            Ok(claimed) => claimed,
            Err(e) => {
                warn!("Not starting: {}", e);
                return;
            }
        };

        if let Some(finished) = self.job.take() {
            let _ = finished.join();
        }

        info!(
            "Starting in {:.1}s ... cell = {:.2}x{:.2}px | speed={} | order={}",
            plan.options.start_delay.as_secs_f64(),
            plan.grid.cell.width,
            plan.grid.cell.height,
            plan.speed as u8,
            plan.order as u8
        );

        self.job = Some(thread::spawn(move || {
            let mut pointer = EnigoPointer;
            let mut rng = RandRandom::thread();
            let mut pause = ThreadPause;
            let _ = ticket.execute(&plan, Collaborators { pointer: &mut pointer, rng: &mut rng, pause: &mut pause });
        }));
    }

    fn reload(&self) {
        match GridConfig::load_or_create(&self.config_path, &self.ctx.config()) {
            Ok(config) => {
                self.ctx.set_config(config);
                info!("Config reloaded (applies to next run).");
            }
            Err(e) => warn!("Config reload failed, keeping the previous settings: {}", e),
        }
    }

    /// Stops any active run and waits for it so the modifier is released.
    pub fn shutdown(&mut self) {
        self.ctx.cancel();
        if let Some(job) = self.job.take() {
            if job.join().is_err() {
                warn!("Run thread panicked");
            }
        }
    }
}
