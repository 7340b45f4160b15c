use crate::core::grid::OccupancyGrid;
use crate::core::hardware::{Orientation, RackingSystem};
use crate::domain::model::CostMode;
use crate::utils::error::{OrderError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Most ballast areas one project may carry.
pub const MAX_BALLAST_AREAS: usize = 2;
/// Upper bound for any count entered by hand (panels, rails, cables, extra).
pub const MAX_ITEM_COUNT: u32 = 100_000;
pub const MAX_PANEL_WATTAGE: u32 = 2_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectInfo,
    pub system: SystemConfig,
    pub panel: PanelConfig,
    pub pitched: Option<PitchedConfig>,
    #[serde(default)]
    pub ballast: Vec<BallastConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub customer_name: String,
    #[serde(default)]
    pub delivery_date: String,
    #[serde(default)]
    pub lead_source: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    SolarEdge,
    Enphase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub platform: Platform,
    /// Enphase only: IQ Combiner instead of an Envoy.
    #[serde(default)]
    pub iq_combiner: bool,
    pub panel_type: String,
    pub panel_wattage: u32,
    pub panel_level_device: String,
    #[serde(default)]
    pub inverter: String,
    #[serde(default)]
    pub inverter_count: u32,
    #[serde(default)]
    pub cell_kit_count: u32,
    pub disconnect_rating: u32,
    pub fuse_rating: u32,
    #[serde(default)]
    pub consumption_monitoring: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub height_mm: f64,
    /// Frame width; selects the dome clamp.
    pub width_mm: f64,
    /// Frame thickness; selects the stopper sleeve.
    pub thickness_mm: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attachment {
    Quickmount,
    RoofTechRafter,
    RoofTechDeck,
    Curb,
    S5,
}

/// 斜屋頂導軌系統的數量（由導軌佈局試算表得出）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PitchedConfig {
    pub attachment: Option<Attachment>,
    pub tilt_leg_inches: u32,
    pub attachment_override: Option<u32>,
    pub panel_count: u32,
    pub rail_count: u32,
    pub splice_bar_count: u32,
    pub mid_clamp_count: u32,
    pub stopper_sleeve_count: u32,
    pub ground_lug_count: u32,
    pub attachment_count: u32,
    pub qcable_portrait: u32,
    pub qcable_landscape: u32,
}

impl PitchedConfig {
    pub fn effective_attachment_count(&self) -> u32 {
        self.attachment_override.unwrap_or(self.attachment_count)
    }

    fn counts(&self) -> [(&'static str, u32); 11] {
        [
            ("pitched.tilt_leg_inches", self.tilt_leg_inches),
            ("pitched.attachment_override", self.attachment_override.unwrap_or(0)),
            ("pitched.panel_count", self.panel_count),
            ("pitched.rail_count", self.rail_count),
            ("pitched.splice_bar_count", self.splice_bar_count),
            ("pitched.mid_clamp_count", self.mid_clamp_count),
            ("pitched.stopper_sleeve_count", self.stopper_sleeve_count),
            ("pitched.ground_lug_count", self.ground_lug_count),
            ("pitched.attachment_count", self.attachment_count),
            ("pitched.qcable_portrait", self.qcable_portrait),
            ("pitched.qcable_landscape", self.qcable_landscape),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallastConfig {
    pub racking: String,
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub extra: u32,
    #[serde(default)]
    pub layout: Vec<String>,
}

impl BallastConfig {
    pub fn racking_system(&self) -> Result<RackingSystem> {
        let system: RackingSystem = self.racking.parse()?;
        Ok(system.with_orientation(self.orientation.unwrap_or_default()))
    }

    pub fn grid(&self) -> Result<OccupancyGrid> {
        OccupancyGrid::parse_rows(self.layout.as_slice())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub cost_mode: Option<CostMode>,
}

impl ProjectConfig {
    /// 從 TOML 檔案載入專案
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OrderError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析專案
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| OrderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CUSTOMER_ADDRESS})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OrderError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn cost_mode(&self) -> CostMode {
        self.output
            .as_ref()
            .and_then(|o| o.cost_mode)
            .unwrap_or_default()
    }

    pub fn pitched_panel_count(&self) -> u32 {
        self.pitched.as_ref().map(|p| p.panel_count).unwrap_or(0)
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("project.customer_name", &self.project.customer_name)?;
        validation::validate_non_empty_string("system.panel_type", &self.system.panel_type)?;
        validation::validate_non_empty_string(
            "system.panel_level_device",
            &self.system.panel_level_device,
        )?;
        validation::validate_range(
            "system.panel_wattage",
            self.system.panel_wattage,
            1,
            MAX_PANEL_WATTAGE,
        )?;
        validation::validate_positive_number(
            "system.disconnect_rating",
            self.system.disconnect_rating,
            1,
        )?;
        validation::validate_positive_number("system.fuse_rating", self.system.fuse_rating, 1)?;

        validation::validate_range(
            "system.inverter_count",
            self.system.inverter_count,
            0,
            MAX_ITEM_COUNT,
        )?;
        validation::validate_range(
            "system.cell_kit_count",
            self.system.cell_kit_count,
            0,
            MAX_ITEM_COUNT,
        )?;

        if self.system.platform == Platform::SolarEdge {
            validation::validate_non_empty_string("system.inverter", &self.system.inverter)?;
        }

        if let Some(pitched) = &self.pitched {
            if pitched.panel_count > 0 && pitched.attachment.is_none() {
                return Err(OrderError::MissingConfigError {
                    field: "pitched.attachment".to_string(),
                });
            }
            for (field, value) in pitched.counts() {
                validation::validate_range(field, value, 0, MAX_ITEM_COUNT)?;
            }
        }

        validation::validate_range("ballast", self.ballast.len(), 0, MAX_BALLAST_AREAS)?;
        for area in &self.ballast {
            validation::validate_range("ballast.extra", area.extra, 0, MAX_ITEM_COUNT)?;
            area.racking_system()?;
            area.grid()?;
        }

        Ok(())
    }
}

impl Validate for ProjectConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r####"
[project]
customer_name = "Jane Smith"
delivery_date = "2026-11-02"
lead_source = "Referral"
address = "12 Elm St"

[system]
platform = "enphase"
iq_combiner = true
panel_type = "rec 400"
panel_wattage = 400
panel_level_device = "iq8+"
cell_kit_count = 1
disconnect_rating = 60
fuse_rating = 40

[panel]
height_mm = 1721
width_mm = 40
thickness_mm = 30

[pitched]
attachment = "quickmount"
panel_count = 10
rail_count = 6
attachment_count = 18

[[ballast]]
racking = "ecofoot2"
orientation = "landscape"
extra = 2
layout = ["###", "##."]
"####;

    #[test]
    fn test_parse_project() {
        let config = ProjectConfig::from_toml_str(BASIC).unwrap();
        assert_eq!(config.project.customer_name, "Jane Smith");
        assert_eq!(config.system.platform, Platform::Enphase);
        assert!(config.system.iq_combiner);
        assert_eq!(config.pitched_panel_count(), 10);
        assert_eq!(config.cost_mode(), CostMode::Legacy);
        assert!(config.validate().is_ok());

        let area = &config.ballast[0];
        assert_eq!(
            area.racking_system().unwrap(),
            RackingSystem::EcoFoot2 {
                orientation: Orientation::Landscape
            }
        );
        assert_eq!(area.grid().unwrap().occupied_count(), 5);
    }

    #[test]
    fn test_attachment_override() {
        let mut pitched = PitchedConfig {
            attachment_count: 18,
            ..PitchedConfig::default()
        };
        assert_eq!(pitched.effective_attachment_count(), 18);
        pitched.attachment_override = Some(0);
        assert_eq!(pitched.effective_attachment_count(), 0);
    }

    #[test]
    fn test_cost_mode_from_output_section() {
        let content = format!("{}\n[output]\ncost_mode = \"incremental\"\n", BASIC);
        let config = ProjectConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.cost_mode(), CostMode::Incremental);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SOLAR_ORDER_TEST_ADDRESS", "99 Sunny Rd");
        let content = BASIC.replace("12 Elm St", "${SOLAR_ORDER_TEST_ADDRESS}");
        let config = ProjectConfig::from_toml_str(&content).unwrap();
        assert_eq!(config.project.address, "99 Sunny Rd");
        std::env::remove_var("SOLAR_ORDER_TEST_ADDRESS");
    }

    #[test]
    fn test_validation_failures() {
        let config = ProjectConfig::from_toml_str(&BASIC.replace("Jane Smith", " ")).unwrap();
        assert!(matches!(
            config.validate(),
            Err(OrderError::MissingConfigError { .. })
        ));

        let config =
            ProjectConfig::from_toml_str(&BASIC.replace("racking = \"ecofoot2\"", "racking = \"unirac\""))
                .unwrap();
        assert!(config.validate().is_err());

        let three_areas = format!(
            "{}{}{}",
            BASIC,
            "\n[[ballast]]\nracking = \"ddome\"\n",
            "\n[[ballast]]\nracking = \"ecofoot5d\"\n"
        );
        let config = ProjectConfig::from_toml_str(&three_areas).unwrap();
        assert!(config.validate().is_err());

        let wide = BASIC.replace("\"##.\"", "\"###############\"");
        let config = ProjectConfig::from_toml_str(&wide).unwrap();
        assert!(matches!(config.validate(), Err(OrderError::LayoutError { .. })));
    }

    #[test]
    fn test_validation_caps_hand_entered_counts() {
        let too_many_panels = BASIC.replace("panel_count = 10", "panel_count = 11000000");
        let config = ProjectConfig::from_toml_str(&too_many_panels).unwrap();
        assert!(matches!(
            config.validate(),
            Err(OrderError::InvalidConfigValueError { ref field, .. }) if field == "pitched.panel_count"
        ));

        let too_many_watts = BASIC.replace("panel_wattage = 400", "panel_wattage = 400000");
        let config = ProjectConfig::from_toml_str(&too_many_watts).unwrap();
        assert!(matches!(
            config.validate(),
            Err(OrderError::InvalidConfigValueError { ref field, .. }) if field == "system.panel_wattage"
        ));

        let huge_extra = BASIC.replace("extra = 2", "extra = 4294967295");
        let config = ProjectConfig::from_toml_str(&huge_extra).unwrap();
        assert!(matches!(
            config.validate(),
            Err(OrderError::InvalidConfigValueError { ref field, .. }) if field == "ballast.extra"
        ));

        let at_limit = BASIC.replace("extra = 2", &format!("extra = {}", MAX_ITEM_COUNT));
        assert!(ProjectConfig::from_toml_str(&at_limit).unwrap().validate().is_ok());
    }

    #[test]
    fn test_malformed_toml() {
        let err = ProjectConfig::from_toml_str("[project\ncustomer_name = 1").unwrap_err();
        assert!(matches!(err, OrderError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_project_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = ProjectConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.ballast.len(), 1);
    }
}
