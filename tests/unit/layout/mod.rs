use super::*;

fn canvas() -> Rect {
    Rect::new(0.0, 0.0, 1000.0, 500.0)
}

#[test]
fn inset_shrinks_every_side() {
    assert_eq!(inset(canvas(), 50.0), Rect::new(50.0, 50.0, 950.0, 450.0));
    assert_eq!(inset(canvas(), 5000.0).area(), 0.0);
}

#[test]
fn center_places_size_in_the_middle() {
    let r = center(canvas(), Size::new(200.0, 100.0));
    assert_eq!(r, Rect::new(400.0, 200.0, 600.0, 300.0));
}

#[test]
fn grid_is_row_major_with_gaps() {
    let cells = grid(canvas(), 4, 2, 100.0);
    assert_eq!(cells.len(), 4);
    assert_eq!(cells[0], Rect::new(0.0, 0.0, 450.0, 200.0));
    assert_eq!(cells[1], Rect::new(550.0, 0.0, 1000.0, 200.0));
    assert_eq!(cells[2], Rect::new(0.0, 300.0, 450.0, 500.0));
}

#[test]
fn grid_handles_degenerate_inputs() {
    assert!(grid(canvas(), 0, 3, 10.0).is_empty());
    // More columns than items collapse to one row.
    let cells = grid(canvas(), 2, 10, 0.0);
    assert_eq!(cells[1].x0, 500.0);
    assert_eq!(cells[1].height(), 500.0);
}

#[test]
fn row_and_column_split_one_axis() {
    let r = row(canvas(), 4, 0.0);
    assert!(r.iter().all(|c| c.width() == 250.0 && c.height() == 500.0));
    let c = column(canvas(), 5, 0.0);
    assert!(c.iter().all(|c| c.width() == 1000.0 && c.height() == 100.0));
}
