#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Alienu arena.

use alienu_core::{BuildingInstance, BuildingSpec, Command, Event};
use alienu_system_city::{CityError, CityGeneration, GenerationReport};
use alienu_world::{self as world, query, World};
use rand::Rng;

/// Produces the arena and the data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the buildings standing in the arena for presentation purposes.
    #[must_use]
    pub fn buildings<'world>(&self, world: &'world World) -> &'world [BuildingInstance] {
        query::buildings(world)
    }

    /// Generates a city and installs it as the arena.
    ///
    /// Nothing is installed when generation fails.
    pub fn build_arena<R>(
        &self,
        world: &mut World,
        generation: &CityGeneration,
        catalog: &[BuildingSpec],
        rng: &mut R,
        out_events: &mut Vec<Event>,
    ) -> Result<GenerationReport, CityError>
    where
        R: Rng + ?Sized,
    {
        let build = generation.generate(catalog, rng)?;
        let (width, height) = build.plan.grid.dimensions();
        log::info!(
            "installing {width}x{height} arena with {} buildings",
            build.plan.buildings.len()
        );
        world::apply(world, Command::InstallCity { plan: build.plan }, out_events);
        Ok(build.report)
    }
}
