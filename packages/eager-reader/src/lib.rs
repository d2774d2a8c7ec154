//! Readers for the QC result files written by the nf-core/eager pipeline.
//!
//! Every reader returns plain records keyed by the identifier the tool itself
//! wrote (usually a BAM-derived library or sample name). Identifier clean-up and
//! numeric interpretation of free-text fields are left to the caller.

mod error;

pub use error::EagerError;

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DAMAGEPROFILER_DIR: &str = "damageprofiler";
pub const ENDORSPY_DIR: &str = "endorspy";
pub const GENOTYPING_DIR: &str = "genotyping";
pub const NUCLEAR_CONTAMINATION_FILE: &str = "nuclear_contamination/nuclear_contamination_mqc.json";
pub const SEXDET_FILE: &str = "sex_determination/SexDet.json";

/// One DamageProfiler run over one deduplicated library BAM.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageRecord {
    pub raw_id: String,
    pub read_count: u64,
    /// C→T misincorporation at the first 5' position.
    pub dmg_5p_1bp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndogenousRecord {
    pub raw_id: String,
    pub endogenous_dna: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnpCoverageRecord {
    pub sample: String,
    pub covered_snps: Option<u64>,
    pub total_snps: Option<u64>,
}

/// ANGSD nuclear contamination. Fields stay as written since the tool emits
/// "N/A" and similar markers in place of numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct ContaminationRecord {
    pub raw_id: String,
    pub num_snps: String,
    pub estimate: String,
    pub std_err: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SexDetRecord {
    pub sample: String,
    pub rate_x: Option<f64>,
    pub rate_y: Option<f64>,
    pub rate_err_x: Option<f64>,
    pub rate_err_y: Option<f64>,
}

#[derive(Deserialize)]
struct DamageProfilerJson {
    metadata: DamageProfilerMetadata,
    #[serde(default)]
    dmg_5p: Vec<f64>,
    #[serde(default)]
    lendist_fw: BTreeMap<String, u64>,
    #[serde(default)]
    lendist_rv: BTreeMap<String, u64>,
}

#[derive(Deserialize)]
struct DamageProfilerMetadata {
    sample_name: String,
}

/// MultiQC "custom content" / general-stats layout: `{"data": {id: {...}}}`.
#[derive(Deserialize)]
struct MultiqcJson<T> {
    data: BTreeMap<String, T>,
}

#[derive(Deserialize)]
struct EndorspyStats {
    endogenous_dna: Option<f64>,
}

#[derive(Deserialize)]
struct SnpCoverageStats {
    #[serde(rename = "Covered_Snps")]
    covered_snps: Option<u64>,
    #[serde(rename = "Total_Snps")]
    total_snps: Option<u64>,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, EagerError> {
    let text = fs::read_to_string(path).map_err(|e| EagerError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| EagerError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn value_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn value_f64(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn read_damageprofiler_json(path: &Path) -> Result<DamageRecord, EagerError> {
    let parsed: DamageProfilerJson = read_json(path)?;
    let read_count = parsed
        .lendist_fw
        .values()
        .chain(parsed.lendist_rv.values())
        .sum();
    Ok(DamageRecord {
        raw_id: parsed.metadata.sample_name,
        read_count,
        dmg_5p_1bp: parsed.dmg_5p.first().copied(),
    })
}

pub fn read_endorspy_json(path: &Path) -> Result<Vec<EndogenousRecord>, EagerError> {
    let parsed: MultiqcJson<EndorspyStats> = read_json(path)?;
    Ok(parsed
        .data
        .into_iter()
        .map(|(raw_id, stats)| EndogenousRecord {
            raw_id,
            endogenous_dna: stats.endogenous_dna,
        })
        .collect())
}

pub fn read_snp_coverage_json(path: &Path) -> Result<Vec<SnpCoverageRecord>, EagerError> {
    let parsed: MultiqcJson<SnpCoverageStats> = read_json(path)?;
    Ok(parsed
        .data
        .into_iter()
        .map(|(sample, stats)| SnpCoverageRecord {
            sample,
            covered_snps: stats.covered_snps,
            total_snps: stats.total_snps,
        })
        .collect())
}

pub fn read_nuclear_contamination_json(
    path: &Path,
) -> Result<Vec<ContaminationRecord>, EagerError> {
    let parsed: MultiqcJson<BTreeMap<String, Value>> = read_json(path)?;
    Ok(parsed
        .data
        .into_iter()
        .map(|(raw_id, fields)| ContaminationRecord {
            raw_id,
            num_snps: value_text(fields.get("Num_SNPs")),
            estimate: value_text(fields.get("Method1_ML_estimate")),
            std_err: value_text(fields.get("Method1_ML_SE")),
        })
        .collect())
}

pub fn read_sexdet_json(path: &Path) -> Result<Vec<SexDetRecord>, EagerError> {
    let parsed: BTreeMap<String, Value> = read_json(path)?;
    let mut records = Vec::with_capacity(parsed.len());
    for (sample, entry) in parsed {
        if sample == "Metadata" {
            continue;
        }
        let Value::Object(fields) = entry else {
            return Err(EagerError::Layout {
                path: path.to_path_buf(),
                message: format!("entry '{sample}' is not an object"),
            });
        };
        records.push(SexDetRecord {
            sample,
            rate_x: value_f64(fields.get("RateX")),
            rate_y: value_f64(fields.get("RateY")),
            rate_err_x: value_f64(fields.get("RateErrX")),
            rate_err_y: value_f64(fields.get("RateErrY")),
        });
    }
    Ok(records)
}

/// Layout of one eager result directory.
#[derive(Debug, Clone)]
pub struct EagerResultDir {
    root: PathBuf,
}

impl EagerResultDir {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, EagerError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(EagerError::MissingDirectory(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `damageprofiler/*/*.json`
    pub fn damageprofiler_jsons(&self) -> Result<Vec<PathBuf>, EagerError> {
        let dir = self.required_dir(DAMAGEPROFILER_DIR)?;
        let mut ret = vec![];
        for sub in sorted_entries(&dir)? {
            if sub.is_dir() {
                ret.extend(json_files_in(&sub)?);
            }
        }
        Ok(ret)
    }

    /// `endorspy/*.json`
    pub fn endorspy_jsons(&self) -> Result<Vec<PathBuf>, EagerError> {
        json_files_in(&self.required_dir(ENDORSPY_DIR)?)
    }

    /// `genotyping/*.json`
    pub fn snp_coverage_jsons(&self) -> Result<Vec<PathBuf>, EagerError> {
        json_files_in(&self.required_dir(GENOTYPING_DIR)?)
    }

    /// Returns `None` when the run did not produce contamination estimates.
    pub fn nuclear_contamination_json(&self) -> Option<PathBuf> {
        Some(self.root.join(NUCLEAR_CONTAMINATION_FILE)).filter(|p| p.is_file())
    }

    pub fn sexdet_json(&self) -> Option<PathBuf> {
        Some(self.root.join(SEXDET_FILE)).filter(|p| p.is_file())
    }

    fn required_dir(&self, name: &str) -> Result<PathBuf, EagerError> {
        let dir = self.root.join(name);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(EagerError::MissingDirectory(dir))
        }
    }
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, EagerError> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| EagerError::io(dir, e))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| EagerError::io(dir, e))?;
    entries.sort();
    Ok(entries)
}

fn json_files_in(dir: &Path) -> Result<Vec<PathBuf>, EagerError> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect())
}

pub fn compile_damage_table(paths: &[PathBuf]) -> Result<Vec<DamageRecord>, EagerError> {
    paths.iter().map(|p| read_damageprofiler_json(p)).collect()
}

pub fn compile_endogenous_table(paths: &[PathBuf]) -> Result<Vec<EndogenousRecord>, EagerError> {
    let mut ret = vec![];
    for path in paths {
        ret.extend(read_endorspy_json(path)?);
    }
    Ok(ret)
}

pub fn compile_snp_coverage_table(
    paths: &[PathBuf],
) -> Result<Vec<SnpCoverageRecord>, EagerError> {
    let mut ret = vec![];
    for path in paths {
        ret.extend(read_snp_coverage_json(path)?);
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_read_damageprofiler_json() {
        let td = tempfile::tempdir().unwrap();
        let path = write(
            td.path(),
            "dmg.json",
            r#"{"metadata": {"sample_name": "ABC001_LIB1_rmdup.bam"},
                "dmg_5p": [0.21, 0.1, 0.05],
                "lendist_fw": {"35": 10, "36": 20},
                "lendist_rv": {"35": 5}}"#,
        );
        let rec = read_damageprofiler_json(&path).unwrap();
        assert_eq!(rec.raw_id, "ABC001_LIB1_rmdup.bam");
        assert_eq!(rec.read_count, 35);
        assert_eq!(rec.dmg_5p_1bp, Some(0.21));
    }

    #[test]
    fn test_read_nuclear_contamination_keeps_text() {
        let td = tempfile::tempdir().unwrap();
        let path = write(
            td.path(),
            "c.json",
            r#"{"id": "nuclear_contamination", "data": {
                "A_LIB1": {"Num_SNPs": 150, "Method1_ML_estimate": 0.012, "Method1_ML_SE": "N/A"},
                "A_LIB2": {"Num_SNPs": "40"}}}"#,
        );
        let recs = read_nuclear_contamination_json(&path).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].num_snps, "150");
        assert_eq!(recs[0].estimate, "0.012");
        assert_eq!(recs[0].std_err, "N/A");
        assert_eq!(recs[1].estimate, "");
    }

    #[test]
    fn test_read_sexdet_skips_metadata() {
        let td = tempfile::tempdir().unwrap();
        let path = write(
            td.path(),
            "SexDet.json",
            r#"{"Metadata": {"version": "1.1.2"},
                "ABC001": {"RateX": 0.51, "RateY": 0.002, "RateErrX": 0.01, "RateErrY": 0.001}}"#,
        );
        let recs = read_sexdet_json(&path).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].sample, "ABC001");
        assert_eq!(recs[0].rate_y, Some(0.002));
    }

    #[test]
    fn test_sexdet_rejects_non_object_entry() {
        let td = tempfile::tempdir().unwrap();
        let path = write(td.path(), "SexDet.json", r#"{"ABC001": 3}"#);
        assert!(matches!(
            read_sexdet_json(&path),
            Err(EagerError::Layout { .. })
        ));
    }

    #[test]
    fn test_result_dir_discovery() {
        let td = tempfile::tempdir().unwrap();
        write(td.path(), "damageprofiler/B_LIB1/dmg.json", "{}");
        write(td.path(), "damageprofiler/A_LIB1/dmg.json", "{}");
        write(td.path(), "damageprofiler/A_LIB1/notes.txt", "");
        write(td.path(), "endorspy/x_mqc.json", "{}");
        let dir = EagerResultDir::new(td.path()).unwrap();
        let dmg = dir.damageprofiler_jsons().unwrap();
        assert_eq!(dmg.len(), 2);
        assert!(dmg[0].ends_with("A_LIB1/dmg.json"));
        assert_eq!(dir.endorspy_jsons().unwrap().len(), 1);
        assert!(matches!(
            dir.snp_coverage_jsons(),
            Err(EagerError::MissingDirectory(_))
        ));
        assert!(dir.nuclear_contamination_json().is_none());
    }

    #[test]
    fn test_compile_snp_coverage_table() {
        let td = tempfile::tempdir().unwrap();
        let a = write(
            td.path(),
            "genotyping/a.json",
            r#"{"data": {"ABC001": {"Covered_Snps": 1200, "Total_Snps": 1233013}}}"#,
        );
        let b = write(
            td.path(),
            "genotyping/b.json",
            r#"{"data": {"ABC002_ss": {"Covered_Snps": 80}}}"#,
        );
        let recs = compile_snp_coverage_table(&[a, b]).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].covered_snps, Some(1200));
        assert_eq!(recs[1].sample, "ABC002_ss");
        assert_eq!(recs[1].total_snps, None);
    }
}
