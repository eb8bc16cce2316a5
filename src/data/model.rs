use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Categorical codes
// ---------------------------------------------------------------------------

/// Seniority of the position (`experience_level` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub const ALL: [Self; 4] = [Self::Entry, Self::Mid, Self::Senior, Self::Executive];

    /// The two-letter code used in the dataset.
    pub fn code(self) -> &'static str {
        match self {
            Self::Entry => "EN",
            Self::Mid => "MI",
            Self::Senior => "SE",
            Self::Executive => "EX",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.code() == code)
    }
}

/// Contract kind (`employment_type` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
}

impl EmploymentType {
    pub const ALL: [Self; 4] = [Self::FullTime, Self::PartTime, Self::Contract, Self::Freelance];

    pub fn code(self) -> &'static str {
        match self {
            Self::FullTime => "FT",
            Self::PartTime => "PT",
            Self::Contract => "CT",
            Self::Freelance => "FL",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.code() == code)
    }
}

/// Employer head-count bucket (`company_size` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CompanySize {
    Small,
    Medium,
    Large,
}

impl CompanySize {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    pub fn code(self) -> &'static str {
        match self {
            Self::Small => "S",
            Self::Medium => "M",
            Self::Large => "L",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.code() == code)
    }
}

/// Allowed values of the `remote_ratio` column.
pub const REMOTE_RATIOS: [u8; 3] = [0, 50, 100];

/// Three-way reading of the raw remote ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RemoteArrangement {
    OnSite,
    Hybrid,
    Remote,
}

impl RemoteArrangement {
    pub const ALL: [Self; 3] = [Self::OnSite, Self::Hybrid, Self::Remote];

    /// 100 is fully remote, 50 is hybrid, everything else counts as on-site.
    pub fn from_ratio(ratio: u8) -> Self {
        match ratio {
            100 => Self::Remote,
            50 => Self::Hybrid,
            _ => Self::OnSite,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OnSite => "On-site",
            Self::Hybrid => "Hybrid",
            Self::Remote => "Remote",
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// A single job posting.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Annual salary converted to USD, never negative.
    pub salary_usd: f64,
    pub work_year: i32,
    pub experience_level: ExperienceLevel,
    pub employment_type: EmploymentType,
    pub company_size: CompanySize,
    /// One of [`REMOTE_RATIOS`].
    pub remote_ratio: u8,
}

// ---------------------------------------------------------------------------
// FieldSelector – which categorical column to read
// ---------------------------------------------------------------------------

/// The record fields that can be grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSelector {
    WorkYear,
    ExperienceLevel,
    EmploymentType,
    CompanySize,
    RemoteRatio,
}

impl FieldSelector {
    /// Column header in the source file.
    pub fn column(self) -> &'static str {
        match self {
            Self::WorkYear => "work_year",
            Self::ExperienceLevel => "experience_level",
            Self::EmploymentType => "employment_type",
            Self::CompanySize => "company_size",
            Self::RemoteRatio => "remote_ratio",
        }
    }

    /// Raw categorical code of `record` under this selector.
    ///
    /// Numeric fields are rendered as their decimal text, so remote ratio
    /// codes are `"0"`, `"50"` and `"100"`.
    pub fn code(self, record: &Record) -> Cow<'static, str> {
        match self {
            Self::WorkYear => Cow::Owned(record.work_year.to_string()),
            Self::ExperienceLevel => Cow::Borrowed(record.experience_level.code()),
            Self::EmploymentType => Cow::Borrowed(record.employment_type.code()),
            Self::CompanySize => Cow::Borrowed(record.company_size.code()),
            Self::RemoteRatio => Cow::Owned(record.remote_ratio.to_string()),
        }
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// RecordTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The parsed dataset. Aggregations borrow it and never mutate it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    records: Vec<Record>,
}

impl RecordTable {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
