use crate::domain::model::{CostMode, PartRecord, Resolution, ResolutionMiss};
use crate::utils::format::format_money;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Running cost of one category, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    pub category: String,
    pub cost: Decimal,
}

/// 零件目錄：依載入順序保存零件，並追蹤每個類別的累計成本。
///
/// Loading strictly precedes requests, which strictly precede reporting.
/// Running totals are read-modify-write, so a shared catalog needs a single
/// owner (or one lock around it).
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    parts: Vec<PartRecord>,
    categories: Vec<CategoryCost>,
    category_index: HashMap<String, usize>,
    misses: Vec<ResolutionMiss>,
    cost_mode: CostMode,
}

impl PartCatalog {
    pub fn new(cost_mode: CostMode) -> Self {
        Self {
            cost_mode,
            ..Self::default()
        }
    }

    pub fn cost_mode(&self) -> CostMode {
        self.cost_mode
    }

    /// Appends a part. A pre-filled quantity is charged to its category: a
    /// new category starts at `quantity * unit_price`; for a known category
    /// `Legacy` overwrites the running cost with it and `Incremental` adds it.
    pub fn load(&mut self, record: PartRecord) {
        let seeded = record.extended_price();

        match self.category_index.get(&record.category).copied() {
            None => {
                self.category_index
                    .insert(record.category.clone(), self.categories.len());
                self.categories.push(CategoryCost {
                    category: record.category.clone(),
                    cost: seeded,
                });
            }
            Some(idx) if record.quantity > 0 => {
                let entry = &mut self.categories[idx];
                entry.cost = match self.cost_mode {
                    CostMode::Legacy => seeded,
                    CostMode::Incremental => entry.cost + seeded,
                };
            }
            Some(_) => {}
        }

        tracing::trace!("Loaded part: {} / {}", record.category, record.display_name);
        self.parts.push(record);
    }

    /// Resolves `(category, name_fragment)` to the first loaded part whose
    /// category and match key contain them (case-insensitive), then adds
    /// `raw_quantity` rounded up to whole packages.
    pub fn request(&mut self, category: &str, name_fragment: &str, raw_quantity: u32) -> Resolution {
        let category_needle = category.to_lowercase();
        let name_needle = name_fragment.to_lowercase();

        let found = self.parts.iter().position(|p| {
            p.category.to_lowercase().contains(&category_needle)
                && p.match_key.to_lowercase().contains(&name_needle)
        });

        let Some(record_index) = found else {
            let miss = ResolutionMiss {
                category: category.to_string(),
                name_fragment: name_fragment.to_string(),
                raw_quantity,
            };
            tracing::warn!("⚠️ {}", miss);
            self.misses.push(miss.clone());
            return Resolution::NotFound(miss);
        };

        let part = &mut self.parts[record_index];
        let added = part.packages_for(raw_quantity);
        part.quantity = part.quantity.saturating_add(added);

        let charge = match self.cost_mode {
            CostMode::Legacy => part.unit_price * Decimal::from(part.quantity),
            CostMode::Incremental => part.unit_price * Decimal::from(added),
        };
        let confirmation = format!("Part Added: {}", part.order_line());

        if let Some(&idx) = self.category_index.get(&part.category) {
            self.categories[idx].cost += charge;
        }

        tracing::debug!("{}", confirmation.trim_end());
        Resolution::Added {
            record_index,
            added,
            confirmation,
        }
    }

    pub fn parts(&self) -> &[PartRecord] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn category_costs(&self) -> &[CategoryCost] {
        &self.categories
    }

    pub fn category_cost(&self, category: &str) -> Option<Decimal> {
        self.category_index
            .get(category)
            .map(|&idx| self.categories[idx].cost)
    }

    /// Sum of every positive category cost, as reported.
    pub fn total_cost(&self) -> Decimal {
        self.categories
            .iter()
            .filter(|c| c.cost > Decimal::ZERO)
            .map(|c| c.cost)
            .sum()
    }

    pub fn misses(&self) -> &[ResolutionMiss] {
        &self.misses
    }

    /// Parts with something to order, in load order.
    pub fn ordered_parts(&self) -> impl Iterator<Item = &PartRecord> {
        self.parts.iter().filter(|p| p.quantity > 0)
    }

    /// Renders the grouped order. A header is written each time the category
    /// changes between consecutive listed parts, so a category split across
    /// the load order gets one header per run.
    ///
    /// `reference_wattage` must be positive when `include_cost` is set; a zero
    /// wattage prints `n/a` for price-per-watt.
    pub fn report(&self, include_cost: bool, reference_wattage: u32) -> String {
        let mut out = String::new();
        let mut current_category: Option<&str> = None;

        for part in self.ordered_parts() {
            if current_category != Some(part.category.as_str()) {
                current_category = Some(part.category.as_str());
                out.push_str(&format!("\n\n{}:", part.category));
            }
            out.push('\n');
            out.push_str(&part.order_line());
            if include_cost {
                out.push_str(&format!(
                    "{:<12}({} each)",
                    format_money(part.extended_price()),
                    format_money(part.unit_price)
                ));
            }
        }

        if include_cost {
            out.push_str("\n\n\n");
            for entry in self.categories.iter().filter(|c| c.cost > Decimal::ZERO) {
                out.push_str(&format!(
                    "{:<56}{:<12}(ppw = {})\n",
                    entry.category,
                    format_money(entry.cost),
                    price_per_watt(entry.cost, reference_wattage)
                ));
            }

            let total = self.total_cost();
            out.push_str(&format!("\n\nTotal Cost: {}", format_money(total)));
            out.push_str(&format!(
                "\nTotal ppW:  {}\n",
                price_per_watt(total, reference_wattage)
            ));
        }

        if !self.misses.is_empty() {
            out.push_str("\n\nUnresolved requests:");
            for miss in &self.misses {
                out.push_str(&format!("\n{} (needed {})", miss, miss.raw_quantity));
            }
            out.push('\n');
        }

        out
    }

    /// Machine-readable view of the final catalog state.
    pub fn summary(&self, reference_wattage: u32) -> OrderSummary {
        let lines = self
            .ordered_parts()
            .map(|p| OrderLine {
                category: p.category.clone(),
                name: p.display_name.clone(),
                quantity: p.quantity,
                unit_price: p.unit_price,
                extended_price: p.extended_price(),
            })
            .collect();

        let total_cost = self.total_cost();
        OrderSummary {
            cost_mode: self.cost_mode,
            reference_wattage,
            lines,
            categories: self
                .categories
                .iter()
                .filter(|c| c.cost > Decimal::ZERO)
                .cloned()
                .collect(),
            total_cost,
            price_per_watt: (reference_wattage > 0)
                .then(|| total_cost / Decimal::from(reference_wattage)),
            unresolved: self.misses.clone(),
        }
    }
}

fn price_per_watt(cost: Decimal, reference_wattage: u32) -> String {
    if reference_wattage == 0 {
        return "n/a".to_string();
    }
    format_money(cost / Decimal::from(reference_wattage))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub category: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub extended_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSummary {
    pub cost_mode: CostMode,
    pub reference_wattage: u32,
    pub lines: Vec<OrderLine>,
    pub categories: Vec<CategoryCost>,
    pub total_cost: Decimal,
    pub price_per_watt: Option<Decimal>,
    pub unresolved: Vec<ResolutionMiss>,
}
