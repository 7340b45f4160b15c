use super::HardwarePiece::*;
use super::{apply_extra, tally_grid, HardwareCounter, HardwareCounts, HardwarePiece};
use crate::core::grid::{NeighborCase, OccupancyGrid};

const PIECES: &[HardwarePiece] = &[
    PanelClip,
    Peak,
    Base,
    ProtectionMat,
    SpacerPad,
    MidClamp,
    EndClamp,
    BallastPorter,
    CornerStrutKit,
    GroundLug,
    Weeb,
];

const ACCUMULATED: &[HardwarePiece] = &[
    PanelClip,
    Peak,
    Base,
    ProtectionMat,
    MidClamp,
    EndClamp,
    BallastPorter,
    CornerStrutKit,
    GroundLug,
];

/// Spacer pads shipped with every dome layout.
const SPACER_PADS: u32 = 4;

/// East-west dome system. Panels sit back to back, so only even rows are
/// walked and each occupied cell stands for a pair of panels.
#[derive(Debug, Clone, Copy, Default)]
pub struct DualDome;

impl DualDome {
    fn case_increments(case: NeighborCase) -> &'static [(HardwarePiece, u32)] {
        match case {
            NeighborCase::InteriorCorner => &[(Base, 1), (MidClamp, 4), (Peak, 1), (CornerStrutKit, 2)],
            NeighborCase::TopEdge => &[(Base, 2), (EndClamp, 8), (Peak, 2), (CornerStrutKit, 4)],
            NeighborCase::LeftEdge => &[(Base, 2), (MidClamp, 4), (Peak, 1), (CornerStrutKit, 2)],
            NeighborCase::Isolated => &[
                (GroundLug, 2),
                (Base, 4),
                (EndClamp, 8),
                (Peak, 2),
                (CornerStrutKit, 4),
            ],
        }
    }
}

impl HardwareCounter for DualDome {
    fn pieces(&self) -> &'static [HardwarePiece] {
        PIECES
    }

    fn count(&self, grid: &OccupancyGrid, extra: u32) -> HardwareCounts {
        let mut counts = tally_grid(
            grid,
            PIECES,
            2,
            2,
            &[(BallastPorter, 2), (PanelClip, 2)],
            Self::case_increments,
        );
        if counts.is_empty() {
            return counts;
        }

        let mat = counts.get(Peak).saturating_add(counts.get(Base));
        counts.set(ProtectionMat, mat);
        apply_extra(&mut counts, extra, ACCUMULATED);

        counts.set(SpacerPad, SPACER_PADS);
        let weeb = counts.get(EndClamp).saturating_add(counts.get(MidClamp));
        counts.set(Weeb, weeb);
        counts
    }
}

/// Dome clamp matching the panel frame width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampSize {
    Mm33,
    Mm40,
    /// No dome clamp fits; requests carry a visible sentinel instead.
    Incompatible,
}

impl ClampSize {
    pub fn for_panel_width(width_mm: f64) -> Self {
        if width_mm > 32.0 && width_mm < 34.0 {
            ClampSize::Mm33
        } else if width_mm > 39.0 && width_mm < 42.0 {
            ClampSize::Mm40
        } else {
            ClampSize::Incompatible
        }
    }

    pub fn is_compatible(&self) -> bool {
        !matches!(self, ClampSize::Incompatible)
    }

    /// Token used in the clamp's catalog match key.
    pub fn label(&self) -> &'static str {
        match self {
            ClampSize::Mm33 => "33",
            ClampSize::Mm40 => "40",
            ClampSize::Incompatible => "DDome clamp incompatible with panel width",
        }
    }
}
