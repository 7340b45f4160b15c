use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 一個可採購的零件。`quantity` 為目前需要訂購的包裝數量。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartRecord {
    pub category: String,
    pub display_name: String,
    /// Units per purchasable package, always at least 1.
    pub package_quantity: u32,
    pub quantity: u32,
    pub unit_price: Decimal,
    /// Lower-cased token matched by substring during request resolution.
    pub match_key: String,
}

impl PartRecord {
    pub fn new(
        category: impl Into<String>,
        display_name: impl Into<String>,
        package_quantity: u32,
        quantity: u32,
        unit_price: Decimal,
        match_key: &str,
    ) -> Self {
        Self {
            category: category.into(),
            display_name: display_name.into(),
            package_quantity: package_quantity.max(1),
            quantity,
            unit_price,
            match_key: match_key.to_lowercase(),
        }
    }

    pub fn extended_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Packages to order for `raw` individual units.
    pub fn packages_for(&self, raw: u32) -> u32 {
        if self.package_quantity > 1 {
            raw.div_ceil(self.package_quantity)
        } else {
            raw
        }
    }

    /// `qty - name` columns shared by every report line.
    pub fn order_line(&self) -> String {
        format!("{:<4}- {:<50}", self.quantity, self.display_name)
    }
}

/// How category running costs are updated on load and on request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostMode {
    /// Reproduces historical reports: a pre-quantified part overwrites its
    /// category cost on load, and each request adds `unit_price * new total`.
    #[default]
    Legacy,
    /// Category cost is the sum of every quantity actually added.
    Incremental,
}

impl std::str::FromStr for CostMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(CostMode::Legacy),
            "incremental" => Ok(CostMode::Incremental),
            other => Err(format!("unknown cost mode '{}' (expected legacy or incremental)", other)),
        }
    }
}

/// 一筆未能對應到目錄的零件請求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionMiss {
    pub category: String,
    pub name_fragment: String,
    pub raw_quantity: u32,
}

impl std::fmt::Display for ResolutionMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {} Part not found", self.category, self.name_fragment)
    }
}

/// Outcome of a single catalog request. A miss is a value, not an error:
/// the batch keeps going without that line item.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Added {
        record_index: usize,
        added: u32,
        confirmation: String,
    },
    NotFound(ResolutionMiss),
}

impl Resolution {
    pub fn is_added(&self) -> bool {
        matches!(self, Resolution::Added { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_package_rounding() {
        let single = PartRecord::new("Modules", "Panel", 1, 0, Decimal::ONE, "panel");
        assert_eq!(single.packages_for(10), 10);

        let boxed = PartRecord::new("IronRidge", "T Bolt (box of 4)", 4, 0, Decimal::ONE, "t bolt");
        assert_eq!(boxed.packages_for(10), 3);
        assert_eq!(boxed.packages_for(8), 2);
        assert_eq!(boxed.packages_for(0), 0);
    }

    #[test]
    fn test_match_key_lowercased_and_package_floor() {
        let part = PartRecord::new("Enphase", "IQ8+", 0, 0, Decimal::ONE, "IQ8 Plus");
        assert_eq!(part.match_key, "iq8 plus");
        assert_eq!(part.package_quantity, 1);
    }

    #[test]
    fn test_order_line_columns() {
        let mut part = PartRecord::new(
            "Modules",
            "REC 400",
            1,
            12,
            Decimal::from_str("250.00").unwrap(),
            "rec",
        );
        let line = part.order_line();
        assert!(line.starts_with("12  - REC 400"));
        assert_eq!(line.len(), 4 + 2 + 50);

        part.quantity = 12345;
        assert!(part.order_line().starts_with("12345- REC 400"));
        assert_eq!(part.extended_price(), Decimal::from_str("3086250").unwrap());
    }

    #[test]
    fn test_miss_display() {
        let miss = ResolutionMiss {
            category: "DDome".to_string(),
            name_fragment: "mid 33".to_string(),
            raw_quantity: 4,
        };
        assert_eq!(miss.to_string(), "DDome - mid 33 Part not found");
    }
}
