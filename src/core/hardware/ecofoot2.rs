use super::{apply_extra, tally_grid, HardwareCounter, HardwareCounts, HardwarePiece};
use crate::core::grid::{NeighborCase, OccupancyGrid};
use super::HardwarePiece::*;

const PIECES: &[HardwarePiece] = &[PanelClip, Base, Clamp, Deflector, GroundLug];

/// Low-profile two-piece ballast system, one grid cell per panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcoFoot2;

impl EcoFoot2 {
    fn case_increments(case: NeighborCase) -> &'static [(HardwarePiece, u32)] {
        match case {
            NeighborCase::InteriorCorner => &[(Base, 1), (Clamp, 2)],
            NeighborCase::TopEdge => &[(Base, 2), (Clamp, 4), (GroundLug, 1)],
            NeighborCase::LeftEdge => &[(Base, 2), (Clamp, 2)],
            NeighborCase::Isolated => &[(Base, 4), (Clamp, 4), (GroundLug, 1)],
        }
    }
}

impl HardwareCounter for EcoFoot2 {
    fn pieces(&self) -> &'static [HardwarePiece] {
        PIECES
    }

    fn count(&self, grid: &OccupancyGrid, extra: u32) -> HardwareCounts {
        let mut counts = tally_grid(
            grid,
            PIECES,
            1,
            1,
            &[(PanelClip, 1), (Deflector, 1)],
            Self::case_increments,
        );
        apply_extra(&mut counts, extra, PIECES);
        counts
    }
}
