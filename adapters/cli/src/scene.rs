//! Headless scene that tallies what a renderer would have spawned.

use std::collections::BTreeMap;

use alienu_core::{AssetKey, BuildingSegment, Ground, RenderableFactory, Tier};

/// Handle of an object spawned into a [`SceneTally`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct SceneHandle(usize);

#[derive(Debug)]
struct SceneNode {
    parent: Option<SceneHandle>,
}

/// Records spawned objects and their hierarchy without drawing anything.
#[derive(Debug, Default)]
pub(crate) struct SceneTally {
    nodes: Vec<SceneNode>,
    grounds: usize,
    tiers: BTreeMap<Tier, usize>,
    meshes: BTreeMap<AssetKey, usize>,
    tinted: usize,
}

impl SceneTally {
    fn push(&mut self, parent: Option<SceneHandle>) -> SceneHandle {
        self.nodes.push(SceneNode { parent });
        SceneHandle(self.nodes.len() - 1)
    }

    /// Number of parent links between `handle` and the root.
    pub(crate) fn depth(&self, handle: SceneHandle) -> usize {
        let mut depth = 0;
        let mut current = self.nodes.get(handle.0).and_then(|node| node.parent);
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes.get(parent.0).and_then(|node| node.parent);
        }
        depth
    }

    pub(crate) fn max_depth(&self) -> usize {
        (0..self.nodes.len())
            .map(|index| self.depth(SceneHandle(index)))
            .max()
            .unwrap_or(0)
    }

    pub(crate) fn summary(&self) -> String {
        let tier = |tier: Tier| self.tiers.get(&tier).copied().unwrap_or(0);
        format!(
            "{} ground, {} segments ({} bottom, {} mid, {} top), {} tinted, {} distinct meshes, tallest stack {}",
            self.grounds,
            self.nodes.len() - self.grounds,
            tier(Tier::Bottom),
            tier(Tier::Mid),
            tier(Tier::Top),
            self.tinted,
            self.meshes.len(),
            self.max_depth(),
        )
    }
}

impl RenderableFactory for SceneTally {
    type Handle = SceneHandle;

    fn spawn_ground(&mut self, _ground: &Ground) -> SceneHandle {
        self.grounds += 1;
        self.push(None)
    }

    fn spawn_segment(&mut self, segment: &BuildingSegment, parent: Option<SceneHandle>) -> SceneHandle {
        *self.tiers.entry(segment.tier).or_default() += 1;
        *self.meshes.entry(segment.mesh.clone()).or_default() += 1;
        if segment.tint.is_some() {
            self.tinted += 1;
        }
        self.push(parent)
    }
}
