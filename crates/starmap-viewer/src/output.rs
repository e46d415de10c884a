//! Accumulates draw plans across render passes for the JSON output.

use std::collections::BTreeMap;

use serde::Serialize;
use starmap_render::{DrawPlan, RegionRender};
use starmap_world::{LayerDirty, RegionCoord};

#[derive(Debug, Clone, Default, Serialize)]
pub struct RegionPlans {
    pub x: i32,
    pub y: i32,
    /// `false` while a layer is still waiting on assets.
    pub complete: bool,
    pub background: DrawPlan,
    pub foreground: DrawPlan,
    #[serde(skip)]
    pending: LayerDirty,
}

/// Latest plans of the requested regions.
#[derive(Debug, Default)]
pub struct PlanSet {
    regions: BTreeMap<RegionCoord, Option<RegionPlans>>,
}

impl PlanSet {
    pub fn new(wanted: impl IntoIterator<Item = RegionCoord>) -> Self {
        Self {
            regions: wanted.into_iter().map(|coord| (coord, None)).collect(),
        }
    }

    /// Replace the layers `render` composited. Renders of regions that were
    /// not requested are ignored.
    pub fn apply(&mut self, render: RegionRender) {
        let Some(entry) = self.regions.get_mut(&render.coord) else {
            return;
        };
        let plans = entry.get_or_insert_with(|| RegionPlans {
            x: render.coord.x,
            y: render.coord.y,
            ..RegionPlans::default()
        });
        if render.rendered.background {
            plans.background = render.background;
            plans.pending.background = render.dirty.background;
        }
        if render.rendered.foreground {
            plans.foreground = render.foreground;
            plans.pending.foreground = render.dirty.foreground;
        }
        plans.complete = !plans.pending.any();
    }

    /// Whether `coord` is one of the requested regions.
    pub fn wants(&self, coord: RegionCoord) -> bool {
        self.regions.contains_key(&coord)
    }

    pub fn get(&self, coord: RegionCoord) -> Option<&RegionPlans> {
        self.regions.get(&coord).and_then(Option::as_ref)
    }

    /// Requested regions that never produced a plan.
    pub fn missing(&self) -> Vec<RegionCoord> {
        self.regions
            .iter()
            .filter(|(_, plans)| plans.is_none())
            .map(|(&coord, _)| coord)
            .collect()
    }

    /// Number of regions with a plan.
    pub fn len(&self) -> usize {
        self.regions.values().filter(|plans| plans.is_some()).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        let plans: Vec<&RegionPlans> = self.regions.values().flatten().collect();
        serde_json::to_string_pretty(&plans)
    }
}
