use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{
    CompanySize, EmploymentType, ExperienceLevel, FieldSelector, Record, RecordTable,
    RemoteArrangement,
};
use crate::error::AggregateError;

// ---------------------------------------------------------------------------
// Bin configuration
// ---------------------------------------------------------------------------

/// Fixed-width bins over `[0, upper_bound]`.
///
/// Bin `i` covers `[i·width, (i+1)·width)`; the last bin is closed on the
/// right and ends exactly at `upper_bound`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinConfig {
    width: f64,
    upper_bound: f64,
}

impl BinConfig {
    pub const DEFAULT_WIDTH: f64 = 25_000.0;
    pub const DEFAULT_UPPER_BOUND: f64 = 200_000.0;
    /// Most bins a configuration may produce.
    pub const MAX_BINS: usize = 10_000;

    pub fn new(width: f64, upper_bound: f64) -> Result<Self, AggregateError> {
        let valid = width.is_finite() && upper_bound.is_finite() && width > 0.0 && upper_bound >= width;
        let bins = upper_bound / width;
        if !valid || !bins.is_finite() || bins.ceil() > Self::MAX_BINS as f64 {
            return Err(AggregateError::InvalidConfiguration { width, upper_bound });
        }
        Ok(Self { width, upper_bound })
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    /// Number of bins, including a shorter trailing one when `upper_bound`
    /// is not a multiple of `width`.
    pub fn bin_count(&self) -> usize {
        (self.upper_bound / self.width).ceil() as usize
    }

    /// `[start, end]` edges of bin `index`.
    pub fn bin_range(&self, index: usize) -> (f64, f64) {
        let start = index as f64 * self.width;
        let end = ((index + 1) as f64 * self.width).min(self.upper_bound);
        (start, end)
    }

    /// Bin holding `value`, or `None` outside `[0, upper_bound]`.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        if !(0.0..=self.upper_bound).contains(&value) {
            return None;
        }
        let last = self.bin_count() - 1;
        Some(((value / self.width).floor() as usize).min(last))
    }
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            upper_bound: Self::DEFAULT_UPPER_BOUND,
        }
    }
}

// ---------------------------------------------------------------------------
// Cross-tabulation key
// ---------------------------------------------------------------------------

/// How a record's raw code becomes a histogram subkey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubkeyDerivation {
    /// Use the selector's code unchanged.
    #[default]
    Code,
    /// Read the remote ratio as a [`RemoteArrangement`] label.
    RemoteArrangement,
}

/// The categorical split applied inside every bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTab {
    pub selector: FieldSelector,
    pub derivation: SubkeyDerivation,
    /// Every subkey reported per bin, in stacking order.
    pub keys: Vec<String>,
}

impl CrossTab {
    pub fn new(selector: FieldSelector, derivation: SubkeyDerivation, keys: Vec<String>) -> Self {
        Self {
            selector,
            derivation,
            keys,
        }
    }

    /// Subkey of `record`; the record itself is left untouched.
    pub fn subkey(&self, record: &Record) -> Cow<'static, str> {
        match self.derivation {
            SubkeyDerivation::Code => self.selector.code(record),
            SubkeyDerivation::RemoteArrangement => {
                Cow::Borrowed(RemoteArrangement::from_ratio(record.remote_ratio).label())
            }
        }
    }
}

fn owned(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

/// The four splits offered by the explorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingCriterion {
    #[default]
    ExperienceLevel,
    EmploymentType,
    CompanySize,
    RemoteRatio,
}

impl GroupingCriterion {
    pub const ALL: [Self; 4] = [
        Self::ExperienceLevel,
        Self::EmploymentType,
        Self::CompanySize,
        Self::RemoteRatio,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::ExperienceLevel => "Experience Level",
            Self::EmploymentType => "Employment Type",
            Self::CompanySize => "Company Size",
            Self::RemoteRatio => "Remote Ratio",
        }
    }

    pub fn cross_tab(self) -> CrossTab {
        match self {
            Self::ExperienceLevel => CrossTab::new(
                FieldSelector::ExperienceLevel,
                SubkeyDerivation::Code,
                owned(&ExperienceLevel::ALL.map(ExperienceLevel::code)),
            ),
            Self::EmploymentType => CrossTab::new(
                FieldSelector::EmploymentType,
                SubkeyDerivation::Code,
                owned(&EmploymentType::ALL.map(EmploymentType::code)),
            ),
            Self::CompanySize => CrossTab::new(
                FieldSelector::CompanySize,
                SubkeyDerivation::Code,
                owned(&CompanySize::ALL.map(CompanySize::code)),
            ),
            Self::RemoteRatio => CrossTab::new(
                FieldSelector::RemoteRatio,
                SubkeyDerivation::RemoteArrangement,
                owned(&RemoteArrangement::ALL.map(RemoteArrangement::label)),
            ),
        }
    }

    /// Display label for a subkey of this criterion.
    pub fn label_for(self, key: &str) -> &str {
        match (self, key) {
            (Self::ExperienceLevel, "EN") => "Junior",
            (Self::ExperienceLevel, "MI") => "Mid Level",
            (Self::ExperienceLevel, "SE") => "Senior",
            (Self::ExperienceLevel, "EX") => "Executive",
            (Self::EmploymentType, "FT") => "Full Time",
            (Self::EmploymentType, "PT") => "Part Time",
            (Self::EmploymentType, "CT") => "Contract",
            (Self::EmploymentType, "FL") => "Freelancer",
            (Self::CompanySize, "S") => "Small",
            (Self::CompanySize, "M") => "Medium",
            (Self::CompanySize, "L") => "Large",
            _ => key,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// One salary interval with per-subkey job counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub range_start: f64,
    pub range_end: f64,
    /// Always holds every expected subkey, zero when nothing fell there.
    pub counts_by_subkey: BTreeMap<String, usize>,
    pub total_count: usize,
}

impl HistogramBin {
    pub fn count(&self, key: &str) -> usize {
        self.counts_by_subkey.get(key).copied().unwrap_or(0)
    }

    /// `"25000 - 50000"` style label.
    pub fn range_label(&self) -> String {
        format!("{} - {}", self.range_start, self.range_end)
    }
}

// ---------------------------------------------------------------------------
// Binning
// ---------------------------------------------------------------------------

/// Bucket every record's salary into `config` and count records per
/// `cross_tab` subkey inside each bucket.
///
/// Records outside `[0, upper_bound]` are not counted.  A subkey outside
/// `cross_tab.keys` is reported as [`AggregateError::UnmappedCode`].
pub fn bin_records(
    table: &RecordTable,
    config: &BinConfig,
    cross_tab: &CrossTab,
) -> Result<Vec<HistogramBin>, AggregateError> {
    if table.is_empty() {
        return Err(AggregateError::EmptyDataset);
    }

    let empty_counts: BTreeMap<String, usize> =
        cross_tab.keys.iter().map(|k| (k.clone(), 0)).collect();
    let mut bins: Vec<HistogramBin> = (0..config.bin_count())
        .map(|i| {
            let (range_start, range_end) = config.bin_range(i);
            HistogramBin {
                range_start,
                range_end,
                counts_by_subkey: empty_counts.clone(),
                total_count: 0,
            }
        })
        .collect();

    let mut out_of_range = 0usize;
    for (row, record) in table.iter().enumerate() {
        let Some(index) = config.bin_index(record.salary_usd) else {
            out_of_range += 1;
            continue;
        };
        let key = cross_tab.subkey(record);
        let bin = &mut bins[index];
        let Some(count) = bin.counts_by_subkey.get_mut(key.as_ref()) else {
            return Err(AggregateError::UnmappedCode {
                row,
                field: cross_tab.selector,
                code: key.into_owned(),
            });
        };
        *count += 1;
        bin.total_count += 1;
    }

    if out_of_range > 0 {
        log::debug!(
            "{out_of_range} records outside [0, {}] left out of the histogram",
            config.upper_bound
        );
    }
    Ok(bins)
}
