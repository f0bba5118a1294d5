#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Alienu arena.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The occupancy grid used as the city footprint map and the timer queue that
//! replaces delayed cycles also live here so every crate agrees on them.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

mod grid;
mod timers;

pub use grid::{GridError, OccupancyGrid};
pub use timers::{delay_from_secs, ExpiredTimer, TimerHandle, TimerQueue};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the Alienu arena.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Installs a freshly generated city as the arena.
    InstallCity {
        /// City layout produced by the generation system.
        plan: CityPlan,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy enters the arena.
    SpawnEnemy {
        /// World position the enemy appears at.
        position: Vec3,
        /// Durability and cadence assigned to the enemy.
        stats: EnemyStats,
        /// Whether the enemy's death counts toward the current wave.
        tracked: bool,
    },
    /// Points an enemy at a new world position.
    AssignEnemyTarget {
        /// Enemy receiving the target.
        enemy: EnemyId,
        /// Position the enemy should pursue.
        target: Vec3,
    },
    /// Applies damage to an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: f32,
    },
    /// Relays the player ship's latest position.
    MovePlayer {
        /// Position of the ship in world units.
        position: Vec3,
    },
    /// Applies damage to the player ship.
    DamagePlayer {
        /// Amount of health removed from the ship's health target.
        amount: f32,
    },
    /// Reports whether the player is holding the boost control.
    SetBoosting {
        /// True while boost is requested.
        active: bool,
    },
    /// Ends the session with the provided outcome.
    EndGame {
        /// Outcome to display.
        outcome: GameOutcome,
    },
    /// Resets enemies, the ship and the outcome while keeping the city.
    Restart,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that a city layout became the arena.
    CityInstalled {
        /// Number of buildings standing in the arena.
        buildings: u32,
        /// Number of grid cells reserved for footprints.
        occupied_cells: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the arena.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Position the enemy spawned at.
        position: Vec3,
        /// Stats applied to the enemy.
        stats: EnemyStats,
        /// Whether the enemy counts toward the current wave.
        tracked: bool,
    },
    /// Reports that an enemy absorbed damage and survived.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Health left after the hit.
        remaining_health: f32,
    },
    /// Reports that an enemy was destroyed.
    EnemyDied {
        /// Enemy that was destroyed.
        enemy: EnemyId,
        /// Whether the enemy counted toward the current wave.
        tracked: bool,
    },
    /// Reports that the player ship absorbed damage.
    PlayerDamaged {
        /// Health the ship is converging toward after the hit.
        health_target: f32,
    },
    /// Reports that the player ship was destroyed.
    PlayerDied,
    /// Announces that the session reached a terminal outcome.
    GameEnded {
        /// Outcome of the session.
        outcome: GameOutcome,
    },
    /// Confirms that the session was reset.
    Restarted,
}

/// Terminal result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameOutcome {
    /// Every wave up to the wave limit was cleared.
    Victory,
    /// The player ship was destroyed.
    Defeat,
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Durability and fire cadence assigned to an enemy when it spawns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Health the enemy starts with.
    pub max_health: f32,
    /// Shots fired per second while the target is in range.
    pub fire_rate: f32,
    /// Distance within which the enemy fires at the player.
    pub range: f32,
    /// Health removed from the ship by each shot.
    pub projectile_damage: f32,
}

/// Location of a single grid cell expressed as column (x) and row (z).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Vertical class of a building segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Ground-level segment.
    Bottom,
    /// Any segment between the ground and the roof.
    Mid,
    /// Roof segment.
    Top,
}

impl Tier {
    /// Resolves the tier of the segment at `level` in a building whose top
    /// sits at `height_limit`.
    ///
    /// The roof wins over the ground floor, so a building with a height limit
    /// of zero consists of a single top segment.
    #[must_use]
    pub const fn for_level(level: u32, height_limit: u32) -> Self {
        if level >= height_limit {
            Self::Top
        } else if level == 0 {
            Self::Bottom
        } else {
            Self::Mid
        }
    }
}

/// Name of a mesh or material asset resolved by the renderer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetKey(String);

impl AssetKey {
    /// Wraps an asset name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrowed asset name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Color tint applied on top of a segment material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tint {
    red: u8,
    green: u8,
    blue: u8,
}

impl Tint {
    /// Creates a new tint from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the tint.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the tint.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the tint.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Selectable mesh and material variants for one tier of a building.
///
/// Variants are paired by index: picking variant `i` uses `meshes[i]` with
/// `materials[i]`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierVariants {
    /// Mesh variants available for the tier.
    #[serde(default)]
    pub meshes: Vec<AssetKey>,
    /// Material variants available for the tier.
    #[serde(default)]
    pub materials: Vec<AssetKey>,
}

impl TierVariants {
    /// Number of complete mesh/material pairs that can be selected.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.meshes.len().min(self.materials.len())
    }

    /// Reports whether either variant array is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty() || self.materials.is_empty()
    }
}

/// Catalog entry describing how a building style looks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingSpec {
    /// Display name of the building style.
    pub name: String,
    /// Ground floor variants.
    #[serde(default)]
    pub bottom: TierVariants,
    /// Middle floor variants.
    #[serde(default)]
    pub mid: TierVariants,
    /// Roof variants.
    #[serde(default)]
    pub top: TierVariants,
    /// Tints every segment with a random color when set.
    #[serde(default)]
    pub randomize_colors: bool,
}

impl BuildingSpec {
    /// Variants registered for the provided tier.
    #[must_use]
    pub fn variants(&self, tier: Tier) -> &TierVariants {
        match tier {
            Tier::Bottom => &self.bottom,
            Tier::Mid => &self.mid,
            Tier::Top => &self.top,
        }
    }

    /// First tier whose variant arrays are empty, if any.
    #[must_use]
    pub fn first_empty_tier(&self) -> Option<Tier> {
        [Tier::Top, Tier::Mid, Tier::Bottom]
            .into_iter()
            .find(|tier| self.variants(*tier).is_empty())
    }
}

/// One stacked segment of a building.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingSegment {
    /// Zero-based level of the segment above the ground.
    pub level: u32,
    /// Tier the segment was selected from.
    pub tier: Tier,
    /// Mesh asset rendered for the segment.
    pub mesh: AssetKey,
    /// Material asset applied to the mesh.
    pub material: AssetKey,
    /// Optional color tint applied over the material.
    pub tint: Option<Tint>,
    /// World position of the segment origin.
    pub position: Vec3,
    /// Index of the segment this one is stacked on.
    pub parent: Option<usize>,
}

/// Building standing on a single grid cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingInstance {
    /// Grid cell the building stands on.
    pub cell: CellCoord,
    /// Catalog entry the building was built from.
    pub style: String,
    /// Level of the roof segment.
    pub height_limit: u32,
    /// Segments ordered from the ground up.
    pub segments: Vec<BuildingSegment>,
}

/// Flat ground slab spanning the arena grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ground {
    /// Center of the slab in world units.
    pub center: Vec3,
    /// Extent of the slab along each axis.
    pub size: Vec3,
}

/// Complete arena layout produced by city generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityPlan {
    /// Footprint occupancy of the arena.
    pub grid: OccupancyGrid,
    /// Buildings extruded on occupied cells.
    pub buildings: Vec<BuildingInstance>,
    /// Ground slab beneath the city.
    pub ground: Ground,
}

impl CityPlan {
    /// Center of the arena at ground level used as the spawn anchor.
    #[must_use]
    pub fn arena_center(&self) -> Vec3 {
        let (width, height) = self.grid.dimensions();
        Vec3::new(width as f32 / 2.0, 0.0, height as f32 / 2.0)
    }

    /// Total number of segments across every building.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.buildings
            .iter()
            .map(|building| building.segments.len())
            .sum()
    }
}

/// Navigation query service used to place entities on walkable ground.
pub trait NavigationQuery {
    /// Returns the navigable point nearest to `near` within `radius`.
    fn sample_navigable_point(&self, near: Vec3, radius: f32) -> Option<Vec3>;
}

/// Factory that turns generated layout into visible objects.
pub trait RenderableFactory {
    /// Handle identifying a produced object so children can be parented to it.
    type Handle: Copy;

    /// Produces the ground slab.
    fn spawn_ground(&mut self, ground: &Ground) -> Self::Handle;

    /// Produces a building segment, parented to `parent` when provided.
    fn spawn_segment(
        &mut self,
        segment: &BuildingSegment,
        parent: Option<Self::Handle>,
    ) -> Self::Handle;
}
