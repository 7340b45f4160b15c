use rust_decimal::{Decimal, RoundingStrategy};

/// 金額格式：`$1,234.56`（四捨五入到分）
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let mut magnitude = rounded.abs();
    magnitude.rescale(2);
    let text = magnitude.to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("${}{}.{}", sign, grouped, cents)
}

/// Left-aligned label column used by the customer block of the order header.
pub fn format_label(label: &str, value: &str, width: usize) -> String {
    let label = if label.chars().count() > width {
        let cut: String = label.chars().take(width.saturating_sub(3)).collect();
        format!("{}.", cut)
    } else {
        label.to_string()
    };
    format!("{:<width$}{}", label, value, width = width)
}
