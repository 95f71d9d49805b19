use crate::random::RandomSource;

/// One grid square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: u32,
    pub column: u32,
}

impl Cell {
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanOrder {
    /// Top to bottom, then left to right.
    ColumnMajor = 1,
    /// Left to right, then top to bottom.
    RowMajor = 2,
    /// Every cell once, shuffled per run.
    Random = 3,
}

impl ScanOrder {
    pub fn from_setting(value: u8) -> Self {
        match value {
            2 => ScanOrder::RowMajor,
            3 => ScanOrder::Random,
            _ => ScanOrder::ColumnMajor,
        }
    }

    /// Grouping key for unit rests; `None` when the order has no units.
    pub fn unit_of(self, cell: Cell) -> Option<u32> {
        match self {
            ScanOrder::ColumnMajor => Some(cell.column),
            ScanOrder::RowMajor => Some(cell.row),
            ScanOrder::Random => None,
        }
    }
}

pub fn plan(columns: u32, rows: u32, order: ScanOrder, rng: &mut dyn RandomSource) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(columns as usize * rows as usize);
    match order {
        ScanOrder::ColumnMajor => {
            for column in 0..columns {
                cells.extend((0..rows).map(|row| Cell::new(row, column)));
            }
        }
        ScanOrder::RowMajor | ScanOrder::Random => {
            for row in 0..rows {
                cells.extend((0..columns).map(|column| Cell::new(row, column)));
            }
            if order == ScanOrder::Random {
                rng.shuffle_cells(&mut cells);
            }
        }
    }
    cells
}

/// True when step `idx` closes a unit: the next cell belongs to another
/// unit, or there is no next cell.
pub fn ends_unit(order: ScanOrder, sequence: &[Cell], idx: usize) -> bool {
    let Some(unit) = sequence.get(idx).and_then(|cell| order.unit_of(*cell)) else {
        return false;
    };
    match sequence.get(idx + 1) {
        Some(next) => order.unit_of(*next) != Some(unit),
        None => true,
    }
}
