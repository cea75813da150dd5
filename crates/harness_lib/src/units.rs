/// Number of yocto units in one NEAR.
pub const YOCTO_PER_NEAR: u128 = 1_000_000_000_000_000_000_000_000;

/// One teragas.
pub const TGAS: u64 = 1_000_000_000_000;

const NEAR_DECIMALS: usize = 24;

/// Parse a decimal NEAR amount ("0.1", "100") into yocto units.
pub fn parse_near_amount(amount: &str) -> Option<u128> {
    let amount = amount.trim();
    let (whole, frac) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > NEAR_DECIMALS
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac: u128 = if frac.is_empty() {
        0
    } else {
        let padded = format!("{frac:0<width$}", width = NEAR_DECIMALS);
        padded.parse().ok()?
    };

    whole.checked_mul(YOCTO_PER_NEAR)?.checked_add(frac)
}

/// Format yocto units as NEAR with a fixed number of decimals, rounding half up.
pub fn format_near_amount(yocto: u128, decimals: usize) -> String {
    let decimals = decimals.min(NEAR_DECIMALS);
    let unit = 10u128.pow((NEAR_DECIMALS - decimals) as u32);
    let rounded = yocto.saturating_add(unit / 2);

    let whole = rounded / YOCTO_PER_NEAR;
    if decimals == 0 {
        return whole.to_string();
    }
    let frac = (rounded % YOCTO_PER_NEAR) / unit;
    format!("{whole}.{frac:0width$}", width = decimals)
}
