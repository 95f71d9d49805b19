use crate::error::ClickerError;
use tracing::info;

/// Integer screen coordinate, as captured from the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The three calibration corners of a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationPoints {
    /// Top-left of the first (top-left) cell.
    pub top_left: Point,
    /// Top-right of the top-right cell.
    pub top_right: Point,
    /// Bottom-left of the bottom-left cell.
    pub bottom_left: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSize {
    pub width: f64,
    pub height: f64,
}

/// Calibrated grid: origin plus a uniform cell pitch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridGeometry {
    pub origin: Point,
    pub cell: CellSize,
}

impl GridGeometry {
    pub fn resolve(points: &CalibrationPoints, columns: u32, rows: u32) -> Result<Self, ClickerError> {
        let cell = resolve_cell_size(points, columns, rows)?;
        Ok(Self { origin: points.top_left, cell })
    }

    /// Center of cell `(row, column)`; rows grow downward, columns rightward.
    pub fn center(&self, row: u32, column: u32) -> (f64, f64) {
        let x = self.origin.x as f64 + column as f64 * self.cell.width + self.cell.width / 2.0;
        let y = self.origin.y as f64 + row as f64 * self.cell.height + self.cell.height / 2.0;
        (x, y)
    }
}

pub fn resolve_cell_size(points: &CalibrationPoints, columns: u32, rows: u32) -> Result<CellSize, ClickerError> {
    let width = points.top_right.x - points.top_left.x;
    let height = points.bottom_left.y - points.top_left.y;
    if width <= 0 || height <= 0 {
        return Err(ClickerError::InvalidCalibration { width, height });
    }

    let cell = CellSize {
        width: width as f64 / columns.max(1) as f64,
        height: height as f64 / rows.max(1) as f64,
    };
    if cell.width.round() == 0.0 || cell.height.round() == 0.0 {
        return Err(ClickerError::DegenerateCellSize { width: cell.width, height: cell.height });
    }

    info!("Cell size = {:.2} x {:.2} px", cell.width, cell.height);
    Ok(cell)
}
