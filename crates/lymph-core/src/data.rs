//! Patient data and the compression step that turns a raw table into a
//! per-T-stage marginalization matrix `C` and multiplicity vector `f`.
//!
//! Compressing before likelihood evaluation means the cost of a query scales
//! with the number of *distinct* diagnosis patterns per T-stage rather than
//! the number of patients, which matters once a cohort has thousands of rows
//! sharing only a handful of diagnostic footprints.

use lymph_error::{LymphError, LymphResult};
use lymph_tensor::Tensor;
use std::collections::HashMap;

/// One patient's raw T-stage and per-(modality, LNL) diagnosis. `diagnosis`
/// is laid out `modality-major`: entry `m * num_lnls + ell` is modality `m`'s
/// report for LNL `ell`, `None` meaning missing. Modality and LNL order must
/// match the order used to build the observation matrix (`modalities` map
/// iteration order, LNL position order).
#[derive(Debug, Clone)]
pub struct PatientRow {
    pub t_stage: String,
    pub diagnosis: Vec<Option<bool>>,
}

/// A patient row before T-stage coarsening: `t_stage` is the raw numeric
/// clinical T-category (0-4), mapped down to a coarse stage name (e.g.
/// "early"/"late") by a [`TStageMapper`] before compression.
#[derive(Debug, Clone)]
pub struct RawPatientRow {
    pub t_stage: u8,
    pub diagnosis: Vec<Option<bool>>,
}

/// Maps a raw numeric T-category to a coarse T-stage name, failing on a
/// category the caller's ontology doesn't recognize.
pub type TStageMapper = fn(u8) -> LymphResult<String>;

/// `T in {0,1,2} -> "early"`, `T in {3,4} -> "late"`, anything else an error.
pub fn default_t_stage_mapper(t: u8) -> LymphResult<String> {
    match t {
        0 | 1 | 2 => Ok("early".to_string()),
        3 | 4 => Ok("late".to_string()),
        other => Err(LymphError::InvalidArgument(
            format!("T-stage {other} has no default early/late mapping").into(),
        )),
    }
}

#[derive(Debug, Clone)]
pub struct PatientTable {
    num_modalities: usize,
    num_lnls: usize,
    rows: Vec<PatientRow>,
}

impl PatientTable {
    pub fn new(num_modalities: usize, num_lnls: usize, rows: Vec<PatientRow>) -> LymphResult<Self> {
        let expected = num_modalities * num_lnls;
        for (idx, row) in rows.iter().enumerate() {
            if row.diagnosis.len() != expected {
                return Err(LymphError::InvalidArgument(
                    format!(
                        "row {idx}: diagnosis has {} entries, expected {expected}",
                        row.diagnosis.len()
                    )
                    .into(),
                ));
            }
        }
        Ok(Self { num_modalities, num_lnls, rows })
    }

    /// Builds a table from raw numeric T-categories, coarsening each through
    /// `mapper` (use [`default_t_stage_mapper`] for the standard
    /// early/late split).
    pub fn from_raw(
        num_modalities: usize,
        num_lnls: usize,
        rows: Vec<RawPatientRow>,
        mapper: TStageMapper,
    ) -> LymphResult<Self> {
        let mapped = rows
            .into_iter()
            .map(|row| {
                mapper(row.t_stage).map(|t_stage| PatientRow { t_stage, diagnosis: row.diagnosis })
            })
            .collect::<LymphResult<Vec<_>>>()?;
        Self::new(num_modalities, num_lnls, mapped)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn t_stages(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if !seen.contains(&row.t_stage) {
                seen.push(row.t_stage.clone());
            }
        }
        seen
    }

    pub fn rows(&self) -> &[PatientRow] {
        &self.rows
    }
}

/// The indicator column for one diagnosis pattern: `col[z] == 1.0` iff
/// observation index `z` agrees with every non-missing entry of `diagnosis`.
/// Built by enumerating only the free (missing) bit positions rather than
/// every `z` in `0..2^(num_modalities*num_lnls)`, so an all-missing diagnosis
/// (the all-ones column) costs the same as any other.
pub fn diagnosis_column(num_bits: usize, diagnosis: &[Option<bool>]) -> Vec<f64> {
    let free_positions: Vec<usize> = (0..num_bits).filter(|&i| diagnosis[i].is_none()).collect();
    let fixed_base: usize = (0..num_bits)
        .filter_map(|i| diagnosis[i].map(|b| if b { 1usize << i } else { 0 }))
        .sum();

    let mut col = vec![0.0; 1usize << num_bits];
    for mask in 0..(1usize << free_positions.len()) {
        let mut z = fixed_base;
        for (k, &pos) in free_positions.iter().enumerate() {
            if (mask >> k) & 1 == 1 {
                z |= 1 << pos;
            }
        }
        col[z] = 1.0;
    }
    col
}

/// One T-stage's compressed patient data: the marginalization matrix and the
/// multiplicity of each of its columns.
#[derive(Clone)]
pub struct Compressed {
    pub c: Tensor<f64>,
    pub f: Vec<f64>,
}

/// Groups rows by T-stage and collapses each group's diagnosis columns into
/// a marginalization matrix with one column per distinct pattern, dropping
/// fully-missing (all-ones) columns since they carry no information and
/// would otherwise inflate every state's apparent observation probability to
/// 1 for free.
pub fn compress(table: &PatientTable) -> HashMap<String, Compressed> {
    let num_bits = table.num_modalities * table.num_lnls;
    let num_obs = 1usize << num_bits;

    let mut by_stage: HashMap<String, HashMap<Vec<u8>, f64>> = HashMap::new();
    for row in table.rows() {
        let col = diagnosis_column(num_bits, &row.diagnosis);
        if col.iter().all(|&v| v == 1.0) {
            continue;
        }
        let key: Vec<u8> = col.iter().map(|&v| v as u8).collect();
        *by_stage
            .entry(row.t_stage.clone())
            .or_default()
            .entry(key)
            .or_insert(0.0) += 1.0;
    }

    by_stage
        .into_iter()
        .map(|(stage, patterns)| {
            let n_patterns = patterns.len();
            let mut c = Tensor::zeros((num_obs, n_patterns.max(1)));
            let mut f = Vec::with_capacity(n_patterns);
            for (col_idx, (key, count)) in patterns.into_iter().enumerate() {
                for (z, &bit) in key.iter().enumerate() {
                    *c.get_mut(&[z, col_idx]) = bit as f64;
                }
                f.push(count);
            }
            (stage, Compressed { c, f })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_missing_diagnosis_is_the_all_ones_column() {
        let col = diagnosis_column(3, &[None, None, None]);
        assert!(col.iter().all(|&v| v == 1.0));
    }

    #[test]
    fn fully_observed_diagnosis_is_a_single_one() {
        let col = diagnosis_column(2, &[Some(true), Some(false)]);
        assert_eq!(col.iter().filter(|&&v| v == 1.0).count(), 1);
        assert_eq!(col[0b01], 1.0);
    }

    #[test]
    fn compress_drops_all_missing_rows_and_merges_duplicates() {
        let rows = vec![
            PatientRow { t_stage: "early".into(), diagnosis: vec![Some(true), Some(false)] },
            PatientRow { t_stage: "early".into(), diagnosis: vec![Some(true), Some(false)] },
            PatientRow { t_stage: "early".into(), diagnosis: vec![None, None] },
        ];
        let table = PatientTable::new(1, 2, rows).unwrap();
        let compressed = compress(&table);
        let early = &compressed["early"];
        assert_eq!(early.f.len(), 1);
        assert_eq!(early.f[0], 2.0);
    }

    #[test]
    fn default_t_stage_mapper_splits_early_and_late() {
        assert_eq!(default_t_stage_mapper(0).unwrap(), "early");
        assert_eq!(default_t_stage_mapper(2).unwrap(), "early");
        assert_eq!(default_t_stage_mapper(3).unwrap(), "late");
        assert_eq!(default_t_stage_mapper(4).unwrap(), "late");
        assert!(default_t_stage_mapper(5).is_err());
    }

    #[test]
    fn from_raw_maps_numeric_t_stages() {
        let rows = vec![
            RawPatientRow { t_stage: 1, diagnosis: vec![Some(true)] },
            RawPatientRow { t_stage: 4, diagnosis: vec![Some(false)] },
        ];
        let table = PatientTable::from_raw(1, 1, rows, default_t_stage_mapper).unwrap();
        assert_eq!(table.t_stages(), vec!["early".to_string(), "late".to_string()]);
    }

    #[test]
    fn from_raw_rejects_unmapped_t_stage() {
        let rows = vec![RawPatientRow { t_stage: 9, diagnosis: vec![Some(true)] }];
        assert!(PatientTable::from_raw(1, 1, rows, default_t_stage_mapper).is_err());
    }

    #[test]
    fn rows_partition_by_t_stage() {
        let rows = vec![
            PatientRow { t_stage: "early".into(), diagnosis: vec![Some(true)] },
            PatientRow { t_stage: "late".into(), diagnosis: vec![Some(false)] },
        ];
        let table = PatientTable::new(1, 1, rows).unwrap();
        let compressed = compress(&table);
        assert_eq!(compressed.len(), 2);
        assert!(compressed.contains_key("early"));
        assert!(compressed.contains_key("late"));
    }
}
