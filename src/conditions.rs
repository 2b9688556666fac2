//! Physical run conditions and their compact token form.
//!
//! A simulation table carries its conditions in the header row as a
//! `/`-joined token list, e.g. `CH4/x=1e-06/T=300K/P=1atm/L=100cm`. The same
//! tokens (with `,` as separator) make up the merged output file name.

use std::fmt;
use std::str::FromStr;

use crate::format::Canonical;

/// Separator between condition tokens in a data header
pub const HEADER_SEPARATOR: char = '/';

/// Errors raised while decoding condition tokens
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConditionError {
    /// Token contains more than one `=`
    #[error("Malformed condition token: {0:?}")]
    MalformedToken(String),

    /// Key outside `x`, `T`, `P`, `L`
    #[error("Unknown condition key {key:?} (value {value:?})")]
    UnknownKey {
        /// Offending key
        key: String,
        /// Value that came with it
        value: String,
    },

    /// Value does not parse as a real number once its unit is stripped
    #[error("Non-numeric value {value:?} for condition {key:?}")]
    NonNumericValue {
        /// Condition key
        key: String,
        /// Raw value, unit already removed
        value: String,
    },
}

/// Physical scenario shared by every run of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionSet {
    /// Gas identifier (e.g. "CH4", "H2O")
    pub gas_id: String,
    /// Concentration in parts per million
    pub ppm: f64,
    /// Temperature in K
    pub temperature: f64,
    /// Pressure in atm
    pub pressure: f64,
    /// Optical path length in cm
    pub path_length: f64,
}

impl ConditionSet {
    /// Mole fraction corresponding to [`Self::ppm`]
    pub fn mole_fraction(&self) -> f64 {
        self.ppm * 1e-6
    }

    /// Serialize into the canonical ordered token list:
    /// `[gas, x=…, T=…K, P=…atm, L=…cm]`.
    pub fn to_tokens(&self) -> Vec<String> {
        vec![
            self.gas_id.clone(),
            format!("x={}", Canonical(self.mole_fraction())),
            format!("T={}K", Canonical(self.temperature)),
            format!("P={}atm", Canonical(self.pressure)),
            format!("L={}cm", Canonical(self.path_length)),
        ]
    }

    /// Decode a token list.
    ///
    /// A token without `=` is the gas identifier. Keyed tokens have their unit
    /// suffix stripped before parsing; `x` is a mole fraction and is stored as
    /// ppm. Keys that are absent keep their default of zero.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, ConditionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut conditions = Self::default();
        for token in tokens {
            let token = token.as_ref();
            let mut parts = token.split('=');
            let key = parts.next().unwrap_or_default();
            let value = match (parts.next(), parts.next()) {
                (None, _) => {
                    conditions.gas_id = key.to_string();
                    continue;
                }
                (Some(value), None) => value,
                (Some(_), Some(_)) => {
                    return Err(ConditionError::MalformedToken(token.to_string()));
                }
            };

            match key {
                "x" => conditions.ppm = parse_value(key, value, "")? * 1e6,
                "T" => conditions.temperature = parse_value(key, value, "K")?,
                "P" => conditions.pressure = parse_value(key, value, "atm")?,
                "L" => conditions.path_length = parse_value(key, value, "cm")?,
                _ => {
                    return Err(ConditionError::UnknownKey {
                        key: key.to_string(),
                        value: value.to_string(),
                    })
                }
            }
        }
        Ok(conditions)
    }
}

fn parse_value(key: &str, value: &str, unit: &str) -> Result<f64, ConditionError> {
    let number = value.strip_suffix(unit).unwrap_or(value);
    number
        .parse::<f64>()
        .map_err(|_| ConditionError::NonNumericValue {
            key: key.to_string(),
            value: number.to_string(),
        })
}

/// Split a header cell into its raw condition tokens.
pub fn split_header(cell: &str) -> Vec<String> {
    cell.split(HEADER_SEPARATOR).map(str::to_string).collect()
}

/// Join raw condition tokens into a header cell.
pub fn join_header<S: AsRef<str>>(tokens: &[S]) -> String {
    let separator = HEADER_SEPARATOR.to_string();
    let parts: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();
    parts.join(separator.as_str())
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&join_header(&self.to_tokens()))
    }
}

impl FromStr for ConditionSet {
    type Err = ConditionError;

    /// Parse a `/`-joined header cell
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tokens(s.split(HEADER_SEPARATOR))
    }
}
