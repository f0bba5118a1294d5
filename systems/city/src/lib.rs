#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural city generation for the arena.
//!
//! Generation runs in two passes over an [`OccupancyGrid`]: the footprint
//! spreader reserves square neighbourhoods around random seeds, then every
//! reserved cell is extruded into a stack of segments picked from the building
//! catalog. The result is a [`CityPlan`] that the world installs and that
//! adapters instantiate through a [`RenderableFactory`].

use alienu_core::{BuildingSpec, CityPlan, Ground, OccupancyGrid, RenderableFactory, Tier};
use glam::Vec3;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

mod extrude;
mod spread;

pub use extrude::extrude;
pub use spread::{draw_seed, spread_footprints, DepthPolicy, SpreadReport, SpreadSettings};

/// Thickness of the ground slab beneath the city.
const GROUND_THICKNESS: f32 = 0.05;

/// Tallest height limit a building may be extruded to.
pub const MAX_HEIGHT_LIMIT: u32 = 1_024;

/// Errors raised while generating a city.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CityError {
    /// No building styles were supplied.
    #[error("building catalog is empty")]
    EmptyCatalog,
    /// A building style lacks meshes or materials for one of its tiers.
    #[error("building `{building}` has no {tier:?} variants")]
    EmptyVariants {
        /// Name of the offending style.
        building: String,
        /// Tier whose variant arrays are empty.
        tier: Tier,
    },
    /// Minimum spread depth exceeds the maximum.
    #[error("depth range {min}..={max} is empty")]
    InvalidDepthRange {
        /// Configured minimum depth.
        min: u32,
        /// Configured maximum depth.
        max: u32,
    },
    /// Minimum building height exceeds the maximum.
    #[error("height range {min}..={max} is empty")]
    InvalidHeightRange {
        /// Configured minimum height.
        min: u32,
        /// Configured maximum height.
        max: u32,
    },
    /// Requested height limit exceeds [`MAX_HEIGHT_LIMIT`].
    #[error("height limit {requested} exceeds the cap of {}", MAX_HEIGHT_LIMIT)]
    HeightLimitTooLarge {
        /// Height limit that was asked for.
        requested: u32,
    },
}

/// Tunable parameters for city generation.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Number of grid columns.
    pub width: u32,
    /// Number of grid rows.
    pub height: u32,
    /// Seeds the footprint spreader tries to place.
    pub target_points: u32,
    /// Failed draws tolerated per seed before it is abandoned.
    pub attempt_limit: u32,
    /// Smallest footprint radius drawn per seed.
    pub depth_min: u32,
    /// Largest footprint radius drawn per seed.
    pub depth_max: u32,
    /// Footprint radius used when depth is not randomized.
    pub fixed_depth: u32,
    /// Draws a fresh radius for every seed when set.
    pub randomize_depth_per_pass: bool,
    /// Lowest roof level a building may have.
    pub min_height: u32,
    /// Highest roof level a building may have.
    pub max_height: u32,
    /// Height of the ground plane in world units.
    pub floor_height: f32,
    /// Seed for the generation RNG.
    pub seed: u64,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            target_points: 24,
            attempt_limit: 16,
            depth_min: 0,
            depth_max: 6,
            fixed_depth: 1,
            randomize_depth_per_pass: true,
            min_height: 1,
            max_height: 5,
            floor_height: 0.0,
            seed: 0,
        }
    }
}

impl CityConfig {
    /// Rejects empty depth or height ranges.
    pub fn validate(&self) -> Result<(), CityError> {
        if self.randomize_depth_per_pass && self.depth_min > self.depth_max {
            return Err(CityError::InvalidDepthRange {
                min: self.depth_min,
                max: self.depth_max,
            });
        }
        if self.min_height > self.max_height {
            return Err(CityError::InvalidHeightRange {
                min: self.min_height,
                max: self.max_height,
            });
        }
        if self.max_height > MAX_HEIGHT_LIMIT {
            return Err(CityError::HeightLimitTooLarge {
                requested: self.max_height,
            });
        }
        Ok(())
    }

    /// Spreader settings derived from the configuration.
    #[must_use]
    pub fn spread_settings(&self) -> SpreadSettings {
        let depth = if self.randomize_depth_per_pass {
            DepthPolicy::PerPass {
                min: self.depth_min,
                max: self.depth_max,
            }
        } else {
            DepthPolicy::Fixed(self.fixed_depth)
        };

        SpreadSettings {
            target_points: self.target_points,
            attempt_limit: self.attempt_limit,
            depth,
        }
    }
}

/// Diagnostics gathered while generating a city.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Outcome of the footprint pass.
    pub spread: SpreadReport,
    /// Buildings that were fully extruded.
    pub buildings_built: u32,
    /// Buildings skipped because their style was incomplete.
    pub buildings_aborted: u32,
    /// Segments across all built buildings.
    pub segments: u64,
}

/// Generated city together with its diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct CityBuild {
    /// Layout ready to be installed in the world.
    pub plan: CityPlan,
    /// What happened along the way.
    pub report: GenerationReport,
}

/// City generator bound to a configuration.
#[derive(Clone, Debug)]
pub struct CityGeneration {
    config: CityConfig,
}

impl CityGeneration {
    /// Creates a generator for the provided configuration.
    #[must_use]
    pub fn new(config: CityConfig) -> Self {
        Self { config }
    }

    /// Configuration the generator was created with.
    #[must_use]
    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    /// Spreads footprints and extrudes a building on every reserved cell.
    ///
    /// Each building draws its height limit first and its style second.
    /// Incomplete styles abort only the building that picked them.
    pub fn generate<R>(&self, catalog: &[BuildingSpec], rng: &mut R) -> Result<CityBuild, CityError>
    where
        R: Rng + ?Sized,
    {
        if let Err(error) = self.config.validate() {
            log::error!("city configuration rejected: {error}");
            return Err(error);
        }
        if catalog.is_empty() {
            log::error!("cannot generate a city without building styles");
            return Err(CityError::EmptyCatalog);
        }

        let config = &self.config;
        let mut grid = OccupancyGrid::new(config.width, config.height);
        let spread = spread_footprints(&mut grid, &config.spread_settings(), rng);

        let mut report = GenerationReport {
            spread,
            ..GenerationReport::default()
        };
        let mut buildings = Vec::new();
        for cell in grid.occupied_cells() {
            let height_limit = rng.gen_range(config.min_height..=config.max_height);
            let spec = &catalog[rng.gen_range(0..catalog.len())];

            match extrude(cell, height_limit, spec, config.floor_height, rng) {
                Ok(building) => {
                    report.buildings_built += 1;
                    report.segments += building.segments.len() as u64;
                    buildings.push(building);
                }
                Err(error) => {
                    report.buildings_aborted += 1;
                    log::warn!(
                        "skipping building at ({}, {}): {error}",
                        cell.column(),
                        cell.row()
                    );
                }
            }
        }

        log::info!(
            "generated {} buildings ({} segments) on {} of {} seeds, {} aborted",
            report.buildings_built,
            report.segments,
            report.spread.seeded,
            config.target_points,
            report.buildings_aborted
        );

        let ground = ground_for(&grid, config.floor_height);
        Ok(CityBuild {
            plan: CityPlan {
                grid,
                buildings,
                ground,
            },
            report,
        })
    }
}

/// Ground slab covering the whole grid, centred under its middle cell.
#[must_use]
pub fn ground_for(grid: &OccupancyGrid, floor_height: f32) -> Ground {
    let (width, height) = grid.dimensions();
    Ground {
        center: Vec3::new(
            (width / 2) as f32 - 0.5,
            floor_height,
            (height / 2) as f32 - 0.5,
        ),
        size: Vec3::new(width as f32, GROUND_THICKNESS, height as f32),
    }
}

/// Hands every piece of the plan to `factory`.
///
/// Ground-level segments hang off the ground handle; every other segment hangs
/// off the segment below it. Returns the number of segments produced.
pub fn instantiate<F>(plan: &CityPlan, factory: &mut F) -> usize
where
    F: RenderableFactory,
{
    let ground = factory.spawn_ground(&plan.ground);
    let mut spawned = 0;

    for building in &plan.buildings {
        let mut handles: Vec<F::Handle> = Vec::with_capacity(building.segments.len());
        for segment in &building.segments {
            let parent = match segment.parent {
                Some(index) => handles.get(index).copied(),
                None => Some(ground),
            };
            handles.push(factory.spawn_segment(segment, parent));
            spawned += 1;
        }
    }

    spawned
}
