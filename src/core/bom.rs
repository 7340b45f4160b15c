use crate::config::project::{Attachment, Platform, ProjectConfig};
use crate::core::catalog::PartCatalog;
use crate::core::grid::OccupancyGrid;
use crate::core::hardware::{ClampSize, HardwareCounter, HardwarePiece, Orientation, RackingSystem};
use crate::utils::error::Result;

/// One ballasted roof area.
#[derive(Debug, Clone, PartialEq)]
pub struct BallastArea {
    pub system: RackingSystem,
    pub grid: OccupancyGrid,
    pub extra: u32,
}

/// Quantities derived from the project before any part is requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedTotals {
    pub pitched_panels: u32,
    pub ballasted_panels: u32,
    pub total_panels: u32,
    pub system_wattage: u32,
    pub breakers: u32,
    pub qcable_portrait: u32,
    pub qcable_landscape: u32,
    pub attachments: u32,
}

/// 推導上下文：專案參數、零件目錄與衍生數量，在推導過程中明確傳遞。
#[derive(Debug, Clone)]
pub struct DerivationContext {
    pub project: ProjectConfig,
    pub areas: Vec<BallastArea>,
    pub totals: DerivedTotals,
    pub catalog: PartCatalog,
}

impl DerivationContext {
    pub fn new(project: ProjectConfig, catalog: PartCatalog) -> Result<Self> {
        let areas = project
            .ballast
            .iter()
            .map(|area| {
                Ok(BallastArea {
                    system: area.racking_system()?,
                    grid: area.grid()?,
                    extra: area.extra,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let totals = derive_totals(&project, &areas);
        Ok(Self {
            project,
            areas,
            totals,
            catalog,
        })
    }
}

fn derive_totals(project: &ProjectConfig, areas: &[BallastArea]) -> DerivedTotals {
    let pitched_panels = project.pitched_panel_count();
    let ballasted_panels: u32 = areas.iter().map(|a| a.grid.occupied_count()).sum();
    let total_panels = pitched_panels.saturating_add(ballasted_panels);

    let device = project.system.panel_level_device.to_lowercase();
    let per_breaker = if device.contains('+') {
        13
    } else if device.contains('x') {
        12
    } else {
        16
    };

    let (raw_portrait, raw_landscape, attachments) = project
        .pitched
        .as_ref()
        .map(|p| (p.qcable_portrait, p.qcable_landscape, p.effective_attachment_count()))
        .unwrap_or((0, 0, 0));

    let with_ends = |raw: u32| if raw > 0 { raw.saturating_add(2) } else { 0 };
    let occupied_areas = areas.iter().filter(|a| !a.grid.is_empty()).count() as u32;

    DerivedTotals {
        pitched_panels,
        ballasted_panels,
        total_panels,
        system_wattage: total_panels.saturating_mul(project.system.panel_wattage),
        breakers: total_panels.div_ceil(per_breaker),
        qcable_portrait: with_ends(raw_portrait),
        qcable_landscape: with_ends(raw_landscape)
            .saturating_add(2 * occupied_areas)
            .saturating_add(ballasted_panels),
        attachments,
    }
}

/// Turns project parameters and grid counts into catalog requests, in a fixed
/// order. Misses are left on the catalog for the report.
pub struct BomDeriver {
    context: DerivationContext,
}

impl BomDeriver {
    pub fn new(project: ProjectConfig, catalog: PartCatalog) -> Result<Self> {
        Ok(Self {
            context: DerivationContext::new(project, catalog)?,
        })
    }

    pub fn from_context(context: DerivationContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &DerivationContext {
        &self.context
    }

    pub fn derive(mut self) -> DerivationContext {
        let totals = self.context.totals.clone();
        tracing::info!(
            "🔧 Deriving order for {}: {} panels ({} pitched, {} ballasted), {} W",
            self.context.project.project.customer_name,
            totals.total_panels,
            totals.pitched_panels,
            totals.ballasted_panels,
            totals.system_wattage
        );

        if totals.total_panels == 0 {
            tracing::warn!("No panels in project, nothing to order");
            return self.context;
        }

        let panel_type = self.context.project.system.panel_type.clone();
        self.request("modules", &panel_type, totals.total_panels);

        match self.context.project.system.platform {
            Platform::SolarEdge => self.add_solaredge(&totals),
            Platform::Enphase => self.add_enphase(&totals),
        }
        self.add_fuses_and_disconnects();

        if totals.pitched_panels > 0 {
            self.add_pitched_racking(&totals);
        }

        if totals.ballasted_panels > 0 {
            let areas = self.context.areas.clone();
            for area in &areas {
                self.add_ballast_area(area);
            }
        }

        let misses = self.context.catalog.misses().len();
        if misses > 0 {
            tracing::warn!("⚠️ {} part request(s) could not be resolved", misses);
        }
        self.context
    }

    /// Misses stay on the catalog for the report.
    fn request(&mut self, category: &str, name_fragment: &str, quantity: u32) {
        self.context.catalog.request(category, name_fragment, quantity);
    }

    fn add_solaredge(&mut self, totals: &DerivedTotals) {
        let system = self.context.project.system.clone();
        let category = "solaredge";
        self.request(category, &system.inverter, system.inverter_count);
        self.request(category, &system.panel_level_device, totals.total_panels);
        self.request(category, "cell kit", system.cell_kit_count);
        if system.consumption_monitoring {
            self.request(category, "CT", 2);
            self.request(category, "energy meter", 1);
        }
    }

    fn add_enphase(&mut self, totals: &DerivedTotals) {
        let system = self.context.project.system.clone();
        let category = "enphase";
        self.request(category, &system.panel_level_device, totals.total_panels);
        self.request(category, "cell kit", system.cell_kit_count);
        self.request(category, "Qcable Portrait", totals.qcable_portrait);
        self.request(category, "Qcable Landscape", totals.qcable_landscape);
        self.request(
            category,
            "sealing cap",
            totals
                .qcable_portrait
                .saturating_add(totals.qcable_landscape)
                .saturating_sub(totals.total_panels),
        );
        self.request(category, "terminator cap", totals.breakers.saturating_add(1));

        if system.iq_combiner {
            self.request(category, "combiner", 1);
            self.request(category, "solar breaker", totals.breakers);
        } else {
            self.request(category, "envoy", 1);
        }
        if system.consumption_monitoring {
            self.request(category, "ct", 2);
        }
    }

    fn add_fuses_and_disconnects(&mut self) {
        let category = "Fuses and Disconnects";
        let disconnect = self.context.project.system.disconnect_rating;
        let fuse = self.context.project.system.fuse_rating;
        self.request(category, &format!("{}A Disconnect", disconnect), 1);
        self.request(category, &format!("{}A Fuse", fuse), 2);
        if fuse > disconnect {
            self.request(category, "reducer", 2);
        }
    }

    fn add_pitched_racking(&mut self, totals: &DerivedTotals) {
        let Some(pitched) = self.context.project.pitched.clone() else {
            return;
        };
        let attachments = totals.attachments;
        let rail = if pitched.attachment == Some(Attachment::Curb) {
            "XR100"
        } else {
            "XR10"
        };
        let thickness = self.context.project.panel.thickness_mm;

        let category = "IronRidge";
        self.request(category, "rail bolt", attachments);
        self.request(category, rail, pitched.rail_count);
        self.request(category, &format!("{} splice", rail), pitched.splice_bar_count);
        self.request(category, "UFO", pitched.mid_clamp_count);
        self.request(category, &format!("sleeve {}", thickness), pitched.stopper_sleeve_count);
        self.request(category, "lug", pitched.ground_lug_count);
        // 1.3 T bolts per panel, rounded up
        self.request(category, "T Bolt", totals.pitched_panels.saturating_mul(13).div_ceil(10));

        match pitched.attachment {
            Some(Attachment::Quickmount) => {
                self.request("quickmount", "QM Flashing Kit", attachments);
            }
            Some(kind @ (Attachment::RoofTechRafter | Attachment::RoofTechDeck)) => {
                let screws_per = if kind == Attachment::RoofTechRafter { 2 } else { 5 };
                let category = "roof tech";
                self.request(category, "base", attachments);
                self.request(category, "bolt", attachments);
                self.request(category, "screw", attachments.saturating_mul(screws_per));
                self.request(category, "LFoot", attachments);
            }
            Some(Attachment::Curb) => {
                let category = "curb attachment";
                self.request(category, "curb kit", attachments);
                self.request(category, "standoff", attachments);
                self.request(category, "LFoot", attachments);
                self.request(category, "Lag Screw", attachments.saturating_mul(2));
                if pitched.tilt_leg_inches > 0 {
                    self.request(
                        category,
                        &format!("{}\" tilt leg kit", pitched.tilt_leg_inches),
                        attachments,
                    );
                }
            }
            Some(Attachment::S5) => {
                self.request("S5", "S5", attachments);
                self.request("S5", "Lfoot", attachments);
            }
            None => {}
        }
    }

    fn add_ballast_area(&mut self, area: &BallastArea) {
        let counts = area.system.count(&area.grid, area.extra);
        if counts.is_empty() {
            return;
        }
        tracing::info!(
            "🧱 {} area: {} panels, extra {}",
            area.system.category(),
            counts.panels(),
            area.extra
        );

        let clamp = ClampSize::for_panel_width(self.context.project.panel.width_mm);
        if area.system == RackingSystem::DualDome && !clamp.is_compatible() {
            tracing::warn!(
                "⚠️ No dome clamp fits a {} mm panel frame",
                self.context.project.panel.width_mm
            );
        }

        let category = area.system.category();
        for (piece, quantity) in counts.iter() {
            let fragment = match_fragment(area.system, piece, clamp);
            self.request(category, &fragment, quantity);
        }
    }
}

/// Catalog match text for a racking piece.
fn match_fragment(system: RackingSystem, piece: HardwarePiece, clamp: ClampSize) -> String {
    match (system, piece) {
        (_, HardwarePiece::PanelClip) => "clip".to_string(),
        (_, HardwarePiece::ProtectionMat) => "mat".to_string(),
        (_, HardwarePiece::BallastTray) => "tray".to_string(),
        (_, HardwarePiece::CornerStrutKit) => "corner strut".to_string(),
        (_, HardwarePiece::MidClamp) => format!("mid {}", clamp.label()),
        (_, HardwarePiece::EndClamp) => format!("end {}", clamp.label()),
        (RackingSystem::EcoFoot2 { orientation }, HardwarePiece::Deflector) => match orientation {
            Orientation::Landscape => "deflector landscape".to_string(),
            Orientation::Portrait => "deflector portrait".to_string(),
        },
        (_, other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{CostMode, PartRecord};
    use rust_decimal::Decimal;

    fn project(toml_body: &str) -> ProjectConfig {
        let base = r#"
[project]
customer_name = "Test Customer"

[system]
platform = "enphase"
panel_type = "rec 400"
panel_wattage = 400
panel_level_device = "iq8+"
cell_kit_count = 1
disconnect_rating = 60
fuse_rating = 60

[panel]
width_mm = 40
thickness_mm = 30
"#;
        ProjectConfig::from_toml_str(&format!("{}{}", base, toml_body)).unwrap()
    }

    fn catalog(rows: &[(&str, &str, u32, &str)]) -> PartCatalog {
        let mut catalog = PartCatalog::new(CostMode::Legacy);
        for (category, name, pkg, key) in rows {
            catalog.load(PartRecord::new(*category, *name, *pkg, 0, Decimal::ONE, key));
        }
        catalog
    }

    fn quantity_of(context: &DerivationContext, name: &str) -> u32 {
        context
            .catalog
            .parts()
            .iter()
            .find(|p| p.display_name == name)
            .map(|p| p.quantity)
            .unwrap_or_else(|| panic!("no part named {}", name))
    }

    #[test]
    fn test_totals_for_mixed_project() {
        let p = project(
            r####"
[pitched]
attachment = "quickmount"
panel_count = 10
qcable_portrait = 10
attachment_count = 20
attachment_override = 16

[[ballast]]
racking = "ecofoot5d"
layout = ["##", "##"]

[[ballast]]
racking = "ddome"
layout = []
"####,
        );
        let ctx = DerivationContext::new(p, PartCatalog::default()).unwrap();
        let t = &ctx.totals;
        assert_eq!(t.pitched_panels, 10);
        assert_eq!(t.ballasted_panels, 4);
        assert_eq!(t.total_panels, 14);
        assert_eq!(t.system_wattage, 5600);
        // "iq8+" -> 13 per breaker
        assert_eq!(t.breakers, 2);
        assert_eq!(t.qcable_portrait, 12);
        // no raw landscape, one occupied area, four ballasted panels
        assert_eq!(t.qcable_landscape, 2 + 4);
        assert_eq!(t.attachments, 16);
    }

    #[test]
    fn test_enphase_combiner_requests() {
        let mut p = project("[pitched]\nattachment = \"s5\"\npanel_count = 20\nqcable_portrait = 20\n");
        p.system.iq_combiner = true;
        let cat = catalog(&[
            ("Modules", "REC 400", 1, "rec 400"),
            ("Enphase", "IQ8+", 1, "iq8+"),
            ("Enphase", "Q Cable Portrait", 1, "qcable portrait"),
            ("Enphase", "Sealing Cap", 1, "sealing cap"),
            ("Enphase", "Terminator Cap", 1, "terminator cap"),
            ("Enphase", "IQ Combiner 4", 1, "combiner"),
            ("Enphase", "20A Solar Breaker", 1, "solar breaker"),
            ("Fuses and Disconnects", "60A Disconnect", 1, "60a disconnect"),
            ("Fuses and Disconnects", "60A Fuse", 1, "60a fuse"),
        ]);
        let ctx = BomDeriver::new(p, cat).unwrap().derive();

        assert_eq!(quantity_of(&ctx, "REC 400"), 20);
        assert_eq!(quantity_of(&ctx, "IQ8+"), 20);
        assert_eq!(quantity_of(&ctx, "Q Cable Portrait"), 22);
        assert_eq!(quantity_of(&ctx, "Sealing Cap"), 2);
        // ceil(20 / 13) = 2 breakers
        assert_eq!(quantity_of(&ctx, "Terminator Cap"), 3);
        assert_eq!(quantity_of(&ctx, "20A Solar Breaker"), 2);
        assert_eq!(quantity_of(&ctx, "IQ Combiner 4"), 1);
        assert_eq!(quantity_of(&ctx, "60A Disconnect"), 1);
        assert_eq!(quantity_of(&ctx, "60A Fuse"), 2);
        // cell kit, landscape cable, S5 hardware and racking are not in this catalog
        assert!(ctx
            .catalog
            .misses()
            .iter()
            .any(|m| m.name_fragment == "cell kit"));
    }

    #[test]
    fn test_roof_tech_rafter_screws_and_t_bolts() {
        let p = project(
            "[pitched]\nattachment = \"roof_tech_rafter\"\npanel_count = 7\nattachment_count = 12\n",
        );
        let cat = catalog(&[
            ("IronRidge", "T Bolt", 1, "t bolt"),
            ("Roof Tech", "RT Mini Screw", 1, "screw"),
            ("Roof Tech", "RT Mini Base", 1, "base"),
        ]);
        let ctx = BomDeriver::new(p, cat).unwrap().derive();
        // ceil(7 * 1.3) = 10
        assert_eq!(quantity_of(&ctx, "T Bolt"), 10);
        assert_eq!(quantity_of(&ctx, "RT Mini Screw"), 24);
        assert_eq!(quantity_of(&ctx, "RT Mini Base"), 12);
    }

    #[test]
    fn test_ecofoot2_area_requests() {
        let p = project(
            r####"
[[ballast]]
racking = "ecofoot2"
orientation = "landscape"
layout = ["#"]
"####,
        );
        let cat = catalog(&[
            ("EcoFoot2+", "Base", 1, "base"),
            ("EcoFoot2+", "Clamp", 1, "clamp"),
            ("EcoFoot2+", "Deflector Portrait", 1, "deflector portrait"),
            ("EcoFoot2+", "Deflector Landscape", 1, "deflector landscape"),
            ("EcoFoot2+", "Ground Lug", 1, "ground lug"),
            ("EcoFoot2+", "Panel Clip", 1, "clip"),
        ]);
        let ctx = BomDeriver::new(p, cat).unwrap().derive();
        assert_eq!(quantity_of(&ctx, "Base"), 4);
        assert_eq!(quantity_of(&ctx, "Clamp"), 4);
        assert_eq!(quantity_of(&ctx, "Deflector Landscape"), 1);
        assert_eq!(quantity_of(&ctx, "Deflector Portrait"), 0);
        assert_eq!(quantity_of(&ctx, "Ground Lug"), 1);
        assert_eq!(quantity_of(&ctx, "Panel Clip"), 1);
    }

    #[test]
    fn test_dome_with_incompatible_clamp_is_reported() {
        let mut p = project("[[ballast]]\nracking = \"dual_dome\"\nlayout = [\"##\"]\n");
        p.panel.width_mm = 35.0;
        let cat = catalog(&[
            ("DDome", "Dome Peak", 1, "peak"),
            ("DDome", "Mid Clamp 40mm", 1, "mid 40"),
            ("DDome", "Spacer Pad", 1, "spacer pad"),
        ]);
        let ctx = BomDeriver::new(p, cat).unwrap().derive();
        assert_eq!(quantity_of(&ctx, "Dome Peak"), 3);
        assert_eq!(quantity_of(&ctx, "Mid Clamp 40mm"), 0);
        assert_eq!(quantity_of(&ctx, "Spacer Pad"), 4);

        let report = ctx.catalog.report(false, ctx.totals.system_wattage);
        assert!(report.contains("mid DDome clamp incompatible with panel width Part not found"));
        assert!(report.contains("end DDome clamp incompatible with panel width Part not found"));
    }

    #[test]
    fn test_empty_ballast_area_requests_nothing() {
        let p = project(
            "[pitched]\nattachment = \"s5\"\npanel_count = 2\n\n[[ballast]]\nracking = \"ecofoot5d\"\nextra = 3\nlayout = []\n",
        );
        let ctx = BomDeriver::new(p, PartCatalog::default()).unwrap().derive();
        assert!(ctx
            .catalog
            .misses()
            .iter()
            .all(|m| m.category != "EcoFoot5D"));
    }

    #[test]
    fn test_oversized_counts_saturate() {
        let p = project(
            "[pitched]\nattachment = \"curb\"\npanel_count = 11000000\nqcable_landscape = 4294967295\nattachment_count = 4294967295\n",
        );
        let ctx = DerivationContext::new(p, PartCatalog::default()).unwrap();
        assert_eq!(ctx.totals.system_wattage, u32::MAX);
        assert_eq!(ctx.totals.qcable_landscape, u32::MAX);

        let ctx = BomDeriver::from_context(ctx).derive();
        assert!(ctx
            .catalog
            .misses()
            .iter()
            .any(|m| m.name_fragment == "Lag Screw" && m.raw_quantity == u32::MAX));
    }

    #[test]
    fn test_no_panels_no_requests() {
        let p = project("");
        let ctx = BomDeriver::new(p, PartCatalog::default()).unwrap().derive();
        assert!(ctx.catalog.misses().is_empty());
        assert_eq!(ctx.totals.system_wattage, 0);
    }

    #[test]
    fn test_match_fragments() {
        let clamp = ClampSize::Mm33;
        assert_eq!(
            match_fragment(RackingSystem::DualDome, HardwarePiece::MidClamp, clamp),
            "mid 33"
        );
        assert_eq!(
            match_fragment(RackingSystem::EcoFoot5D, HardwarePiece::MidSupport, clamp),
            "mid support"
        );
        assert_eq!(
            match_fragment(RackingSystem::DualDome, HardwarePiece::SpacerPad, clamp),
            "spacer pad"
        );
        assert_eq!(
            match_fragment(RackingSystem::EcoFoot5D, HardwarePiece::Deflector, clamp),
            "deflector"
        );
    }
}
