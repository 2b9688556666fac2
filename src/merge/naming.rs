use crate::conditions::ConditionSet;

/// Separator between file name fields
const FIELD_SEPARATOR: &str = ",";

/// Extension of merged output files
pub const OUTPUT_EXTENSION: &str = "csv";

/// Derive the merged output file name.
///
/// `nu=<min>-<max>,<gas>,x=…,T=…K,P=…atm,L=…cm.csv`, where the spectral
/// bounds are truncated towards zero and every condition value is rendered in
/// canonical form.
pub fn output_file_name(conditions: &ConditionSet, nu_min: f64, nu_max: f64) -> String {
    format!(
        "nu={}-{}{}{}.{}",
        nu_min as i64,
        nu_max as i64,
        FIELD_SEPARATOR,
        conditions.to_tokens().join(FIELD_SEPARATOR),
        OUTPUT_EXTENSION
    )
}
