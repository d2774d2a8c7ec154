//! Machine-readable contracts shared by the janno reconciliation engine and its
//! command-line front end.

use serde::{Deserialize, Serialize};

/// The single token that stands for "no value" in a janno file.
pub const MISSING_VALUE: &str = "n/a";

/// Separator for list-valued janno cells.
pub const LIST_SEPARATOR: &str = ";";

/// Suffix appended to the janno path when running in safe mode.
pub const SAFE_MODE_SUFFIX: &str = ".new";

/// Output columns, in file order. This list is the contract of the written table.
pub const JANNO_COLUMNS: [&str; 52] = [
    "Poseidon_ID",
    "Genetic_Sex",
    "Group_Name",
    "Alternative_IDs",
    "Main_ID",
    "Relation_To",
    "Relation_Degree",
    "Relation_Type",
    "Relation_Note",
    "Collection_ID",
    "Country",
    "Country_ISO",
    "Location",
    "Site",
    "Latitude",
    "Longitude",
    "Date_Type",
    "Date_C14_Labnr",
    "Date_C14_Uncal_BP",
    "Date_C14_Uncal_BP_Err",
    "Date_BC_AD_Start",
    "Date_BC_AD_Median",
    "Date_BC_AD_Stop",
    "Date_Note",
    "MT_Haplogroup",
    "Y_Haplogroup",
    "Source_Tissue",
    "Nr_Libraries",
    "Library_Names",
    "Capture_Type",
    "UDG",
    "Library_Built",
    "Genotype_Ploidy",
    "Data_Preparation_Pipeline_URL",
    "Endogenous",
    "Nr_SNPs",
    "Coverage_on_Target_SNPs",
    "Damage",
    "Contamination",
    "Contamination_Err",
    "Contamination_Meas",
    "Contamination_Note",
    "Genetic_Source_Accession_IDs",
    "Primary_Contact",
    "Publication",
    "Note",
    "Keywords",
    "Eager_ID",
    "RateX",
    "RateY",
    "RateErrX",
    "RateErrY",
];

/// True for any spelling of "no value" found in janno or manifest cells.
pub fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == MISSING_VALUE
}

/// Maps a possibly-absent value onto its janno cell text.
pub fn cell_text(value: Option<&str>) -> String {
    match value {
        Some(v) if !is_missing(v) => v.to_string(),
        _ => MISSING_VALUE.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LostInJoin {
    pub stage: String,
    pub key: String,
}

/// Summary of one reconciliation run, printed by the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunReport {
    pub individuals_aggregated: usize,
    pub janno_rows: usize,
    pub rows_updated: usize,
    pub unmatched_individuals: Vec<String>,
    pub lost_in_joins: Vec<LostInJoin>,
    pub missing_optional_sources: Vec<String>,
    pub unparseable_numeric_fields: usize,
    pub output_path: String,
}
