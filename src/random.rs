use crate::planner::Cell;
use rand::{seq::SliceRandom, Rng};

/// Source of every random decision a run makes, so tests can script them.
pub trait RandomSource {
    /// Integer in `lo..=hi`.
    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64;

    /// Float in `[0, 1)`.
    fn unit(&mut self) -> f64;

    fn shuffle_cells(&mut self, cells: &mut [Cell]);

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.unit()
    }

    /// Triangular distribution on `[lo, hi]` peaking at `mode` (inverse CDF).
    fn triangular(&mut self, lo: f64, hi: f64, mode: f64) -> f64 {
        if hi <= lo {
            return lo;
        }
        let mode = mode.clamp(lo, hi);
        let u = self.unit();
        let split = (mode - lo) / (hi - lo);
        if u < split {
            lo + (u * (hi - lo) * (mode - lo)).sqrt()
        } else {
            hi - ((1.0 - u) * (hi - lo) * (hi - mode)).sqrt()
        }
    }
}

/// `RandomSource` over any `rand` generator.
pub struct RandRandom<R: Rng>(pub R);

impl RandRandom<rand::rngs::ThreadRng> {
    pub fn thread() -> Self {
        Self(rand::thread_rng())
    }
}

impl<R: Rng> RandomSource for RandRandom<R> {
    fn int_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.0.gen_range(lo..=hi)
    }

    fn unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }

    fn shuffle_cells(&mut self, cells: &mut [Cell]) {
        cells.shuffle(&mut self.0);
    }
}
