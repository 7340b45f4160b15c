use crate::core::catalog::PartCatalog;
use crate::domain::model::{CostMode, PartRecord};
use crate::utils::error::{OrderError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

/// One row of the exported parts-list sheet. Every field is read as text so
/// spacer rows and spreadsheet formatting survive until validation.
#[derive(Debug, Deserialize)]
struct PartRow {
    #[serde(default)]
    category: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    package_quantity: String,
    #[serde(default)]
    quantity: String,
    #[serde(default)]
    unit_price: String,
    #[serde(default)]
    match_key: String,
}

/// 解析零件清單 CSV，依檔案順序回傳零件。分類欄空白的列會被略過。
pub fn parse_parts_csv(data: &[u8]) -> Result<Vec<PartRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let mut parts = Vec::new();
    for (i, row) in reader.deserialize::<PartRow>().enumerate() {
        let row = row?;
        // header is line 1
        let line = i + 2;
        if row.category.is_empty() {
            continue;
        }

        let package_quantity = parse_count(line, "package_quantity", &row.package_quantity, 1)?;
        if package_quantity == 0 {
            return Err(invalid(line, "package_quantity", &row.package_quantity, "must be at least 1"));
        }
        let quantity = parse_count(line, "quantity", &row.quantity, 0)?;
        let unit_price = parse_price(line, &row.unit_price)?;

        parts.push(PartRecord::new(
            row.category,
            row.name,
            package_quantity,
            quantity,
            unit_price,
            &row.match_key,
        ));
    }

    tracing::debug!("Parsed {} parts from parts list", parts.len());
    Ok(parts)
}

/// Parses the sheet and loads every part, in file order.
pub fn load_catalog(data: &[u8], cost_mode: CostMode) -> Result<PartCatalog> {
    let mut catalog = PartCatalog::new(cost_mode);
    for part in parse_parts_csv(data)? {
        catalog.load(part);
    }
    Ok(catalog)
}

fn parse_count(line: usize, field: &str, raw: &str, blank: u32) -> Result<u32> {
    if raw.is_empty() {
        return Ok(blank);
    }
    raw.parse::<u32>()
        .map_err(|_| invalid(line, field, raw, "expected a whole, non-negative number"))
}

fn parse_price(line: usize, raw: &str) -> Result<Decimal> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let price = Decimal::from_str(cleaned)
        .map_err(|_| invalid(line, "unit_price", raw, "expected a price such as $12.50"))?;
    if price.is_sign_negative() {
        return Err(invalid(line, "unit_price", raw, "price cannot be negative"));
    }
    Ok(price)
}

fn invalid(line: usize, field: &str, value: &str, reason: &str) -> OrderError {
    OrderError::InvalidConfigValueError {
        field: format!("parts list line {} {}", line, field),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
