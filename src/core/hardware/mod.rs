//! 壓載式支架的硬體計數。
//!
//! Every racking system walks the same occupancy grid, classifies each
//! occupied cell by its left/top neighbors and adds that case's increments
//! to its own counters. Counters never touch the catalog; the BOM deriver
//! turns them into part requests.

pub mod dual_dome;
pub mod ecofoot2;
pub mod ecofoot5d;

use crate::core::grid::{NeighborCase, OccupancyGrid};
use crate::utils::error::{OrderError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use dual_dome::{ClampSize, DualDome};
pub use ecofoot2::EcoFoot2;
pub use ecofoot5d::EcoFoot5D;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HardwarePiece {
    PanelClip,
    Base,
    Clamp,
    Deflector,
    BallastTray,
    MidSupport,
    GroundLug,
    Peak,
    ProtectionMat,
    SpacerPad,
    MidClamp,
    EndClamp,
    BallastPorter,
    CornerStrutKit,
    Weeb,
}

impl fmt::Display for HardwarePiece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HardwarePiece::PanelClip => "panel clip",
            HardwarePiece::Base => "base",
            HardwarePiece::Clamp => "clamp",
            HardwarePiece::Deflector => "deflector",
            HardwarePiece::BallastTray => "ballast tray",
            HardwarePiece::MidSupport => "mid support",
            HardwarePiece::GroundLug => "ground lug",
            HardwarePiece::Peak => "peak",
            HardwarePiece::ProtectionMat => "protection mat",
            HardwarePiece::SpacerPad => "spacer pad",
            HardwarePiece::MidClamp => "mid clamp",
            HardwarePiece::EndClamp => "end clamp",
            HardwarePiece::BallastPorter => "ballast porter",
            HardwarePiece::CornerStrutKit => "corner strut kit",
            HardwarePiece::Weeb => "weeb",
        };
        f.write_str(name)
    }
}

/// Full set of counts produced by one racking system for one grid, in the
/// order the pieces are requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareCounts {
    panels: u32,
    items: Vec<(HardwarePiece, u32)>,
}

impl HardwareCounts {
    fn zeroed(pieces: &[HardwarePiece]) -> Self {
        Self {
            panels: 0,
            items: pieces.iter().map(|&p| (p, 0)).collect(),
        }
    }

    fn add(&mut self, piece: HardwarePiece, amount: u32) {
        if let Some(entry) = self.items.iter_mut().find(|(p, _)| *p == piece) {
            entry.1 = entry.1.saturating_add(amount);
        }
    }

    fn set(&mut self, piece: HardwarePiece, amount: u32) {
        if let Some(entry) = self.items.iter_mut().find(|(p, _)| *p == piece) {
            entry.1 = amount;
        }
    }

    /// Panels the layout holds, as counted by the racking system.
    pub fn panels(&self) -> u32 {
        self.panels
    }

    /// An empty layout orders nothing, whatever its extra count.
    pub fn is_empty(&self) -> bool {
        self.panels == 0
    }

    pub fn get(&self, piece: HardwarePiece) -> u32 {
        self.items
            .iter()
            .find(|(p, _)| *p == piece)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HardwarePiece, u32)> + '_ {
        self.items.iter().copied()
    }
}

/// Per-system increment tables over the four neighbor cases.
pub trait HardwareCounter {
    /// Every piece the system reports, in request order.
    fn pieces(&self) -> &'static [HardwarePiece];

    fn count(&self, grid: &OccupancyGrid, extra: u32) -> HardwareCounts;
}

/// Shared grid pass: `per_cell` is added for every visited panel, then the
/// case table for its neighbor case. `panels_per_cell` is how many physical
/// panels one grid cell stands for.
pub(crate) fn tally_grid(
    grid: &OccupancyGrid,
    pieces: &[HardwarePiece],
    row_step: usize,
    panels_per_cell: u32,
    per_cell: &[(HardwarePiece, u32)],
    per_case: impl Fn(NeighborCase) -> &'static [(HardwarePiece, u32)],
) -> HardwareCounts {
    let mut counts = HardwareCounts::zeroed(pieces);
    for (_, _, case) in grid.cells(row_step) {
        counts.panels = counts.panels.saturating_add(panels_per_cell);
        for &(piece, n) in per_cell.iter().chain(per_case(case)) {
            counts.add(piece, n);
        }
    }
    counts
}

/// Adds the manual overage to the listed counters. Empty layouts are left
/// untouched.
pub(crate) fn apply_extra(counts: &mut HardwareCounts, extra: u32, accumulated: &[HardwarePiece]) {
    if counts.is_empty() {
        return;
    }
    for &piece in accumulated {
        counts.add(piece, extra);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// 三種壓載支架系統
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RackingSystem {
    DualDome,
    EcoFoot2 { orientation: Orientation },
    EcoFoot5D,
}

impl RackingSystem {
    /// Catalog category the system's parts are filed under.
    pub fn category(&self) -> &'static str {
        match self {
            RackingSystem::DualDome => "DDome",
            RackingSystem::EcoFoot2 { .. } => "ecofoot2+",
            RackingSystem::EcoFoot5D => "EcoFoot5D",
        }
    }

    pub fn with_orientation(self, orientation: Orientation) -> Self {
        match self {
            RackingSystem::EcoFoot2 { .. } => RackingSystem::EcoFoot2 { orientation },
            other => other,
        }
    }
}

impl FromStr for RackingSystem {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "dualdome" | "ddome" => Ok(RackingSystem::DualDome),
            "ecofoot2" | "ecofoot2plus" => Ok(RackingSystem::EcoFoot2 {
                orientation: Orientation::default(),
            }),
            "ecofoot5d" | "ecofoot5" => Ok(RackingSystem::EcoFoot5D),
            _ => Err(OrderError::InvalidConfigValueError {
                field: "ballast.racking".to_string(),
                value: s.to_string(),
                reason: "Expected one of: dual_dome, ecofoot2, ecofoot5d".to_string(),
            }),
        }
    }
}

impl HardwareCounter for RackingSystem {
    fn pieces(&self) -> &'static [HardwarePiece] {
        match self {
            RackingSystem::DualDome => DualDome.pieces(),
            RackingSystem::EcoFoot2 { .. } => EcoFoot2.pieces(),
            RackingSystem::EcoFoot5D => EcoFoot5D.pieces(),
        }
    }

    fn count(&self, grid: &OccupancyGrid, extra: u32) -> HardwareCounts {
        match self {
            RackingSystem::DualDome => DualDome.count(grid, extra),
            RackingSystem::EcoFoot2 { .. } => EcoFoot2.count(grid, extra),
            RackingSystem::EcoFoot5D => EcoFoot5D.count(grid, extra),
        }
    }
}
