use super::{apply_extra, tally_grid, HardwareCounter, HardwareCounts, HardwarePiece};
use crate::core::grid::{NeighborCase, OccupancyGrid};
use super::HardwarePiece::*;

const PIECES: &[HardwarePiece] = &[
    PanelClip,
    Base,
    Clamp,
    Deflector,
    BallastTray,
    MidSupport,
    GroundLug,
];

const ACCUMULATED: &[HardwarePiece] = &[PanelClip, Base, Clamp, Deflector, BallastTray, GroundLug];

/// Low-profile five-piece ballast system. A panel with nothing above it
/// (left-edge and isolated cases) takes a second tray; mid supports follow
/// the tray count.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcoFoot5D;

impl EcoFoot5D {
    fn case_increments(case: NeighborCase) -> &'static [(HardwarePiece, u32)] {
        match case {
            NeighborCase::InteriorCorner => &[(Base, 1), (Clamp, 2)],
            NeighborCase::TopEdge => &[(Base, 2), (Clamp, 4)],
            NeighborCase::LeftEdge => &[(BallastTray, 1), (Base, 2), (Clamp, 2)],
            NeighborCase::Isolated => &[(BallastTray, 1), (Base, 4), (Clamp, 4), (GroundLug, 1)],
        }
    }
}

impl HardwareCounter for EcoFoot5D {
    fn pieces(&self) -> &'static [HardwarePiece] {
        PIECES
    }

    fn count(&self, grid: &OccupancyGrid, extra: u32) -> HardwareCounts {
        let mut counts = tally_grid(
            grid,
            PIECES,
            1,
            1,
            &[(PanelClip, 1), (Deflector, 1), (BallastTray, 1)],
            Self::case_increments,
        );
        apply_extra(&mut counts, extra, ACCUMULATED);
        let trays = counts.get(BallastTray);
        counts.set(MidSupport, trays);
        counts
    }
}
