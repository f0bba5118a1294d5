//! Navigation queries over the installed city footprint.

use alienu_core::{CellCoord, NavigationQuery, OccupancyGrid};
use glam::Vec3;

/// Navigable surface made of every free cell of the arena grid.
///
/// Cell `(x, y)` is centred on world position `(x, floor, y)`; buildings carve
/// their whole cell out of the surface. Without an installed city there is no
/// surface and every query misses.
#[derive(Clone, Copy, Debug)]
pub struct ArenaNavigation<'a> {
    grid: Option<&'a OccupancyGrid>,
    floor_height: f32,
}

impl<'a> ArenaNavigation<'a> {
    pub(crate) fn new(grid: Option<&'a OccupancyGrid>, floor_height: f32) -> Self {
        Self { grid, floor_height }
    }

    fn cell_center(&self, cell: CellCoord) -> Vec3 {
        Vec3::new(
            cell.column() as f32,
            self.floor_height,
            cell.row() as f32,
        )
    }
}

impl NavigationQuery for ArenaNavigation<'_> {
    fn sample_navigable_point(&self, near: Vec3, radius: f32) -> Option<Vec3> {
        let grid = self.grid?;
        if radius < 0.0 || !near.is_finite() {
            return None;
        }

        let (width, height) = grid.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let (min_column, max_column) = axis_window(near.x, radius, width)?;
        let (min_row, max_row) = axis_window(near.z, radius, height)?;

        let mut best: Option<(f32, Vec3)> = None;
        for column in min_column..=max_column {
            for row in min_row..=max_row {
                let cell = CellCoord::new(column, row);
                if grid.is_occupied(cell) {
                    continue;
                }

                let center = self.cell_center(cell);
                let distance = center.distance(near);
                if distance > radius {
                    continue;
                }

                if best.map_or(true, |(closest, _)| distance < closest) {
                    best = Some((distance, center));
                }
            }
        }

        best.map(|(_, point)| point)
    }
}

/// Inclusive range of cell indices whose centres may lie within `radius` of
/// `coordinate` along one axis.
fn axis_window(coordinate: f32, radius: f32, extent: u32) -> Option<(u32, u32)> {
    let last = extent.checked_sub(1)? as f32;
    let low = (coordinate - radius).ceil().max(0.0);
    let high = (coordinate + radius).floor().min(last);
    if low > high {
        return None;
    }
    Some((low as u32, high as u32))
}
