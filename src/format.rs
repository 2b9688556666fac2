//! Canonical short-string rendering of physical quantities.
//!
//! The same rendering is used in output file names and in the condition
//! tokens written to data headers, so it has to be deterministic and parse
//! back (via `str::parse::<f64>`) to the same quantity within three
//! significant decimals.
//!
//! Magnitudes in `(0.001, 1000)` use fixed-point notation, everything else
//! scientific notation with a sign and an at-least-two-digit exponent
//! (`1e+03`, `4.320e-05`). At most three decimals are ever shown.
//!
//! | value       | canonical     |
//! |-------------|---------------|
//! | `2.0`       | `2`           |
//! | `2.1`       | `2.100`       |
//! | `999.9999`  | `1e+03`       |
//! | `0.0000432` | `4.320e-05`   |
//! | `0.0009`    | `9e-04`       |

use std::fmt;

/// Fixed-point / scientific switch points
const SCIENTIFIC_BELOW: f64 = 1e-3;
const SCIENTIFIC_ABOVE: f64 = 1e3;

/// Nudges applied before rendering so that values a hair below a rounding
/// boundary (binary representation error) land on the intended side.
const LARGE_NUDGE: f64 = 1e-3;
const SMALL_NUDGE: f64 = 1e-7;

/// Decimal digits used whenever a fractional part is worth showing
const FRACTION_DIGITS: usize = 3;

/// Notation a value is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notation {
    /// Plain decimal, e.g. `0.350`
    Fixed,
    /// Mantissa and exponent, e.g. `4.320e-05`
    Scientific,
}

/// Resolved rendering decision for one magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendering {
    /// Notation to render in
    pub notation: Notation,
    /// Digits after the decimal point (0 or 3)
    pub decimals: usize,
}

impl Rendering {
    /// Decide how a non-negative magnitude is rendered.
    ///
    /// Returns the adjusted magnitude that must be rendered along with the
    /// decision. `magnitude` must be finite and non-negative.
    pub fn resolve(magnitude: f64) -> (f64, Self) {
        let mut value = magnitude;
        if value + LARGE_NUDGE > SCIENTIFIC_ABOVE {
            value += LARGE_NUDGE;
        } else if value + SMALL_NUDGE > SCIENTIFIC_BELOW {
            value += SMALL_NUDGE;
        }
        if value >= SCIENTIFIC_ABOVE {
            value = value.floor();
        }

        let fraction = value - value.floor();
        let mut decimals = if fraction > 0.0 && fraction >= SCIENTIFIC_BELOW {
            FRACTION_DIGITS
        } else {
            0
        };

        let notation = if value <= SCIENTIFIC_BELOW || value >= SCIENTIFIC_ABOVE {
            // Keep the mantissa digits when dropping them would hide
            // significant figures (4.32e-05 must not become 4e-05).
            let trial = render(value, Notation::Scientific, FRACTION_DIGITS);
            if trial.matches('0').count() < 3 {
                decimals = FRACTION_DIGITS;
            }
            Notation::Scientific
        } else {
            Notation::Fixed
        };

        (value, Self { notation, decimals })
    }
}

/// Render `value` in its canonical form.
///
/// Defined for every finite value; non-finite input is the caller's problem
/// and produces an unspecified string.
///
/// ```
/// use spectracrawl::format::canonical;
///
/// assert_eq!(canonical(300.0), "300");
/// assert_eq!(canonical(0.35), "0.350");
/// assert_eq!(canonical(-1000.0), "-1e+03");
/// assert_eq!(canonical(0.0000432), "4.320e-05");
/// ```
pub fn canonical(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude == 0.0 {
        return "0".to_string();
    }
    let (magnitude, rendering) = Rendering::resolve(magnitude);
    let body = render(magnitude, rendering.notation, rendering.decimals);
    if value.is_sign_negative() {
        format!("-{}", body)
    } else {
        body
    }
}

/// `Display` adapter for [`canonical`], handy inside `format!`.
#[derive(Debug, Clone, Copy)]
pub struct Canonical(pub f64);

impl fmt::Display for Canonical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical(self.0))
    }
}

fn render(value: f64, notation: Notation, decimals: usize) -> String {
    match notation {
        Notation::Fixed => format!("{:.*}", decimals, value),
        Notation::Scientific => render_scientific(value, decimals),
    }
}

/// Scientific notation with an explicit exponent sign and at least two
/// exponent digits (`1.000e+03`, `4e-05`).
fn render_scientific(value: f64, decimals: usize) -> String {
    let raw = format!("{:.*e}", decimals, value);
    match raw.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            let padding = if digits.len() < 2 { "0" } else { "" };
            format!("{}e{}{}{}", mantissa, sign, padding, digits)
        }
        None => raw,
    }
}
