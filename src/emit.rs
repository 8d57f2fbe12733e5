use std::io::Write;

use super::histogram::{Histogram, Row};
use super::Result;

/// Digits after the decimal point in every rendered number.
pub const PRECISION: usize = 10;

/// Render `v` the way C's `%.10e` does: a signed mantissa with ten
/// decimals and an exponent of at least two digits (`2.5000000000e-01`).
pub fn scientific(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    let s = format!("{:.*e}", PRECISION, v);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => s,
    }
}

/// Format one row: center, value and uncertainty separated by two spaces.
pub fn format_row(row: &Row) -> String {
    format!("{}  {}  {}", scientific(row.center), scientific(row.value), scientific(row.uncertainty))
}

/// Write one line per bin, in ascending order, to `out`.
pub fn write_rows<W: Write>(hist: &Histogram, out: &mut W) -> Result<()> {
    for row in hist.rows() {
        writeln!(out, "{}", format_row(&row))?;
    }
    out.flush()?;
    Ok(())
}
