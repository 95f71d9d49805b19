use crate::{geometry::Point, pointer::EnigoPointer};
use display_info::DisplayInfo;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub primary: bool,
}

impl ScreenRect {
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x
            && p.y >= self.y
            && (p.x as i64) < self.x as i64 + self.width as i64
            && (p.y as i64) < self.y as i64 + self.height as i64
    }
}

/// Every attached display, falling back to the main display size.
pub fn displays() -> Vec<ScreenRect> {
    match DisplayInfo::all() {
        Ok(all) if !all.is_empty() => all
            .iter()
            .map(|d| ScreenRect { x: d.x, y: d.y, width: d.width, height: d.height, primary: d.is_primary })
            .collect(),
        Ok(_) => main_display_only(),
        Err(e) => {
            warn!("Display query failed ({}), assuming the main display only", e);
            main_display_only()
        }
    }
}

fn main_display_only() -> Vec<ScreenRect> {
    let (w, h) = EnigoPointer::main_display_size();
    if w <= 0 || h <= 0 {
        return Vec::new();
    }
    vec![ScreenRect { x: 0, y: 0, width: w as u32, height: h as u32, primary: true }]
}

/// `(min_x, min_y, max_x, max_y)` of the union of all displays.
pub fn total_bounds(rects: &[ScreenRect]) -> Option<(i32, i32, i32, i32)> {
    rects.iter().fold(None, |acc, r| {
        let max_x = r.x + r.width as i32;
        let max_y = r.y + r.height as i32;
        Some(match acc {
            None => (r.x, r.y, max_x, max_y),
            Some((a, b, c, d)) => (a.min(r.x), b.min(r.y), c.max(max_x), d.max(max_y)),
        })
    })
}

/// `None` when no display layout is known.
pub fn is_on_screen(rects: &[ScreenRect], p: Point) -> Option<bool> {
    if rects.is_empty() {
        debug!("No display layout known, skipping on-screen check");
        return None;
    }
    Some(rects.iter().any(|r| r.contains(p)))
}
