//! Footprint spreading over the occupancy grid.

use alienu_core::{CellCoord, OccupancyGrid};
use rand::Rng;

/// How far each seed spreads its footprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthPolicy {
    /// Every seed spreads by the same Chebyshev radius.
    Fixed(u32),
    /// Each seed draws its radius uniformly from `min..=max`.
    PerPass {
        /// Smallest radius that may be drawn.
        min: u32,
        /// Largest radius that may be drawn.
        max: u32,
    },
}

/// Parameters for a single spreading pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpreadSettings {
    /// Number of seeds the pass tries to place.
    pub target_points: u32,
    /// Consecutive failed draws tolerated before a seed is abandoned.
    pub attempt_limit: u32,
    /// Radius policy applied around each seed.
    pub depth: DepthPolicy,
}

/// Tally of what a spreading pass achieved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpreadReport {
    /// Seeds that landed on a free cell.
    pub seeded: u32,
    /// Seeds given up after exhausting their attempts.
    pub abandoned: u32,
    /// Random cells drawn across the whole pass.
    pub draws: u64,
    /// Largest number of draws spent on a single seed.
    pub max_draws_per_point: u32,
    /// Cells that switched from free to reserved.
    pub cells_reserved: u64,
}

/// Seeds random free cells and reserves the square neighbourhood around each.
///
/// A saturated grid yields fewer seeds than requested; the pass never fails.
pub fn spread_footprints<R>(
    grid: &mut OccupancyGrid,
    settings: &SpreadSettings,
    rng: &mut R,
) -> SpreadReport
where
    R: Rng + ?Sized,
{
    let mut report = SpreadReport::default();
    let mut depth = match settings.depth {
        DepthPolicy::Fixed(depth) => depth,
        DepthPolicy::PerPass { min, .. } => min,
    };

    for _ in 0..settings.target_points {
        let (seed, draws) = draw_seed(grid, settings.attempt_limit, rng);
        report.draws += u64::from(draws);
        report.max_draws_per_point = report.max_draws_per_point.max(draws);

        let Some(seed) = seed else {
            report.abandoned += 1;
            continue;
        };

        report.seeded += 1;
        if let DepthPolicy::PerPass { min, max } = settings.depth {
            depth = rng.gen_range(min..=max);
        }
        report.cells_reserved += reserve_neighbourhood(grid, seed, depth);
    }

    if report.abandoned > 0 {
        log::debug!(
            "abandoned {} of {} footprint seeds after {} attempts each",
            report.abandoned,
            settings.target_points,
            settings.attempt_limit.saturating_add(1)
        );
    }

    report
}

/// Draws random cells until a free one turns up or the attempt limit runs out.
///
/// Returns the seed, if any, and the number of cells drawn, which never
/// exceeds `attempt_limit + 1`.
pub fn draw_seed<R>(
    grid: &OccupancyGrid,
    attempt_limit: u32,
    rng: &mut R,
) -> (Option<CellCoord>, u32)
where
    R: Rng + ?Sized,
{
    if grid.is_empty() {
        return (None, 0);
    }

    let (width, height) = grid.dimensions();
    let mut draws = 0;
    loop {
        let cell = CellCoord::new(rng.gen_range(0..width), rng.gen_range(0..height));
        draws += 1;
        if can_populate(grid, cell) {
            return (Some(cell), draws);
        }
        if draws > attempt_limit {
            return (None, draws);
        }
    }
}

fn can_populate(grid: &OccupancyGrid, cell: CellCoord) -> bool {
    let (x, y) = (i64::from(cell.column()), i64::from(cell.row()));
    grid.is_on_grid(x, y) && !grid.is_occupied(cell)
}

/// Reserves every on-grid cell within Chebyshev distance `depth` of `center`.
fn reserve_neighbourhood(grid: &mut OccupancyGrid, center: CellCoord, depth: u32) -> u64 {
    let depth = i64::from(depth);
    let (cx, cy) = (i64::from(center.column()), i64::from(center.row()));
    let mut reserved = 0;

    for dx in -depth..=depth {
        for dy in -depth..=depth {
            let (x, y) = (cx + dx, cy + dy);
            if !grid.is_on_grid(x, y) {
                continue;
            }
            if let Ok(true) = grid.set(x, y) {
                reserved += 1;
            }
        }
    }

    reserved
}
