//! Game configuration loaded from a toml file.

use std::{fs, path::Path};

use alienu_core::{AssetKey, BuildingSpec, TierVariants};
use alienu_system_city::CityConfig;
use alienu_system_waves::WaveConfig;
use alienu_world::ShipConfig;
use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Every tunable of a session. Missing sections fall back to defaults.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct GameConfig {
    pub(crate) city: CityConfig,
    pub(crate) waves: WaveConfig,
    pub(crate) ship: ShipConfig,
    pub(crate) catalog: Vec<BuildingSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            city: CityConfig::default(),
            waves: WaveConfig::default(),
            ship: ShipConfig::default(),
            catalog: default_catalog(),
        }
    }
}

impl GameConfig {
    /// Reads and validates the configuration stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read game config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid game config at {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse game config toml")?;
        config.city.validate().context("invalid [city] section")?;
        if config.catalog.is_empty() {
            bail!("config lists no [[catalog]] building styles");
        }
        if config.waves.wave_limit == 0 {
            bail!("[waves] wave_limit must be at least 1");
        }
        Ok(config)
    }

    /// Uses `seed` for both city generation and spawn placement.
    pub(crate) fn reseed(&mut self, seed: u64) {
        self.city.seed = seed;
        self.waves.seed = seed;
    }
}

fn variants(style: &str, tier: &str, count: usize) -> TierVariants {
    TierVariants {
        meshes: (0..count)
            .map(|index| AssetKey::new(format!("{style}/{tier}_{index}.mesh")))
            .collect(),
        materials: (0..count)
            .map(|index| AssetKey::new(format!("{style}/{tier}_{index}.mat")))
            .collect(),
    }
}

fn default_catalog() -> Vec<BuildingSpec> {
    vec![
        BuildingSpec {
            name: "apartment".to_owned(),
            bottom: variants("apartment", "bottom", 2),
            mid: variants("apartment", "mid", 3),
            top: variants("apartment", "top", 2),
            randomize_colors: true,
        },
        BuildingSpec {
            name: "office".to_owned(),
            bottom: variants("office", "bottom", 1),
            mid: variants("office", "mid", 2),
            top: variants("office", "top", 1),
            randomize_colors: false,
        },
        BuildingSpec {
            name: "spire".to_owned(),
            bottom: variants("spire", "bottom", 1),
            mid: variants("spire", "mid", 1),
            top: variants("spire", "top", 3),
            randomize_colors: false,
        },
    ]
}
