//! Number formatting for cards, tables and chart axes

/// Thousands-separated whole number, e.g. `1,234,568`
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative {
        format!("-{}", out)
    } else {
        out
    }
}

pub fn rupiah(value: f64) -> String {
    format!("Rp {}", thousands(value))
}

/// Signed delta for the projection card
pub fn signed(value: f64) -> String {
    if value >= 0.0 {
        format!("+{}", thousands(value))
    } else {
        thousands(value)
    }
}

/// Short axis label, e.g. `4.3M`
pub fn compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{:.0}", value)
    }
}

pub fn percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.4), "999");
        assert_eq!(thousands(1_234_567.8), "1,234,568");
        assert_eq!(thousands(-45_000.0), "-45,000");
        assert_eq!(rupiah(5_000_000.0), "Rp 5,000,000");
    }

    #[test]
    fn test_signed_and_compact() {
        assert_eq!(signed(1500.0), "+1,500");
        assert_eq!(signed(-1500.0), "-1,500");
        assert_eq!(compact(4_300_000.0), "4.3M");
        assert_eq!(compact(950.0), "950");
        assert_eq!(percent(0.875), "87.50%");
    }
}
