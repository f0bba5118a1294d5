//! Vertical extrusion of a single building.

use alienu_core::{BuildingInstance, BuildingSegment, BuildingSpec, CellCoord, Tier, Tint};
use glam::Vec3;
use rand::Rng;

use crate::{CityError, MAX_HEIGHT_LIMIT};

/// Stacks `height_limit + 1` segments on `cell` using variants from `spec`.
///
/// Segment `level` sits `level` units above `floor_height` and is parented to
/// the segment directly below it. A style with any empty variant array aborts
/// the building before a single segment is produced, as does a
/// `height_limit` above [`MAX_HEIGHT_LIMIT`].
pub fn extrude<R>(
    cell: CellCoord,
    height_limit: u32,
    spec: &BuildingSpec,
    floor_height: f32,
    rng: &mut R,
) -> Result<BuildingInstance, CityError>
where
    R: Rng + ?Sized,
{
    if height_limit > MAX_HEIGHT_LIMIT {
        return Err(CityError::HeightLimitTooLarge {
            requested: height_limit,
        });
    }
    if let Some(tier) = spec.first_empty_tier() {
        return Err(CityError::EmptyVariants {
            building: spec.name.clone(),
            tier,
        });
    }

    let mut segments = Vec::with_capacity(height_limit as usize + 1);
    let mut parent = None;
    for level in 0..=height_limit {
        let tier = Tier::for_level(level, height_limit);
        let variants = spec.variants(tier);
        let pick = rng.gen_range(0..variants.pair_count());
        let tint = spec
            .randomize_colors
            .then(|| Tint::from_rgb(rng.gen(), rng.gen(), rng.gen()));

        segments.push(BuildingSegment {
            level,
            tier,
            mesh: variants.meshes[pick].clone(),
            material: variants.materials[pick].clone(),
            tint,
            position: Vec3::new(
                cell.column() as f32,
                floor_height + level as f32,
                cell.row() as f32,
            ),
            parent,
        });
        parent = Some(level as usize);
    }

    Ok(BuildingInstance {
        cell,
        style: spec.name.clone(),
        height_limit,
        segments,
    })
}
