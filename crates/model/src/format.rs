//! Price and period display formatting.
//!
//! Prices flow through the system in manwon; user-facing strings use the
//! customary eok notation ("12.5억원").

/// Format a manwon price as "X.Y억원". Zero or non-finite prices render as
/// "정보 없음" (no data).
pub fn format_price_eok(price_manwon: f64) -> String {
    if !price_manwon.is_finite() || price_manwon == 0.0 {
        return "정보 없음".to_string();
    }
    format!("{:.1}억원", price_manwon / 10_000.0)
}

/// Format a manwon price as "X억 Y만원", dropping zero components.
pub fn format_price_kor(price_manwon: f64) -> String {
    if !price_manwon.is_finite() {
        return "정보 없음".to_string();
    }
    let eok = (price_manwon / 10_000.0).trunc() as i64;
    let man = (price_manwon % 10_000.0).trunc() as i64;
    match (eok > 0, man > 0) {
        (true, true) => format!("{}억 {}만원", eok, group_thousands(man)),
        (true, false) => format!("{}억원", eok),
        _ => format!("{}만원", group_thousands(man)),
    }
}

/// Format a YYYYMM period as "YYYY-MM".
pub fn format_period(period: u32) -> String {
    format!("{}-{:02}", period / 100, period % 100)
}

fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
