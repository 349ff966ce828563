//! Rectangle placement helpers exposed to scene code.
//!
//! All functions are pure: they only depend on the area they are given.

use kurbo::{Rect, Size};

/// Shrink `area` by `padding` on every side. Never produces a negative size.
pub fn inset(area: Rect, padding: f64) -> Rect {
    let p = padding.max(0.0);
    let w = (area.width() - 2.0 * p).max(0.0);
    let h = (area.height() - 2.0 * p).max(0.0);
    Rect::from_origin_size((area.x0 + p, area.y0 + p), Size::new(w, h))
}

/// Rectangle of `size` centered inside `area`.
pub fn center(area: Rect, size: Size) -> Rect {
    let c = area.center();
    Rect::from_center_size(c, size)
}

/// Split `area` into `count` cells laid out row-major over `columns` columns.
///
/// Cells share the available space equally after subtracting `gap` between neighbors.
pub fn grid(area: Rect, count: usize, columns: usize, gap: f64) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let columns = columns.clamp(1, count);
    let rows = count.div_ceil(columns);
    let gap = gap.max(0.0);

    let cell_w = ((area.width() - gap * (columns - 1) as f64) / columns as f64).max(0.0);
    let cell_h = ((area.height() - gap * (rows - 1) as f64) / rows as f64).max(0.0);

    (0..count)
        .map(|i| {
            let col = (i % columns) as f64;
            let row = (i / columns) as f64;
            Rect::from_origin_size(
                (
                    area.x0 + col * (cell_w + gap),
                    area.y0 + row * (cell_h + gap),
                ),
                Size::new(cell_w, cell_h),
            )
        })
        .collect()
}

/// `count` equal cells side by side.
pub fn row(area: Rect, count: usize, gap: f64) -> Vec<Rect> {
    grid(area, count, count, gap)
}

/// `count` equal cells stacked top to bottom.
pub fn column(area: Rect, count: usize, gap: f64) -> Vec<Rect> {
    grid(area, count, 1, gap)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/mod.rs"]
mod tests;
