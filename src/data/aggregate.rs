use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{FieldSelector, RecordTable};
use crate::error::AggregateError;

// ---------------------------------------------------------------------------
// Code → label mapping
// ---------------------------------------------------------------------------

/// Ordered mapping from raw categorical codes to display labels.
///
/// Several codes may share a label; their records then land in one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMapping {
    entries: Vec<(String, String)>,
}

impl CodeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the label for `code`.
    pub fn with(mut self, code: impl Into<String>, label: impl Into<String>) -> Self {
        let code = code.into();
        let label = label.into();
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some(entry) => entry.1 = label,
            None => self.entries.push((code, label)),
        }
        self
    }

    pub fn label_for(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, l)| l.as_str())
    }

    /// Position of the first entry carrying `label`.
    fn rank_of(&self, label: &str) -> usize {
        self.entries
            .iter()
            .position(|(_, l)| l == label)
            .unwrap_or(usize::MAX)
    }

}

impl<C: Into<String>, L: Into<String>> FromIterator<(C, L)> for CodeMapping {
    fn from_iter<I: IntoIterator<Item = (C, L)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |mapping, (code, label)| mapping.with(code, label))
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with a record whose code is missing from the mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedPolicy {
    /// Leave the record out of every group and log a warning with the count.
    #[default]
    Exclude,
    /// Fail with [`AggregateError::UnmappedCode`] on the first such record.
    Reject,
}

/// Output ordering of [`GroupSummary`] rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelOrder {
    #[default]
    Ascending,
    Descending,
    /// Order in which labels first appear in the [`CodeMapping`].
    Mapping,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    pub unmapped: UnmappedPolicy,
    pub order: LabelOrder,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Mean salary and job count for one mapped label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub label: String,
    pub mean_salary: i64,
    pub job_count: usize,
}

/// Mean salary for one work year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub year: i32,
    pub mean_salary: i64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> i64 {
        round_half_up(self.sum / self.count as f64)
    }
}

/// Round to the nearest integer with ties away from zero, which is upward
/// for the non-negative means produced here.
pub fn round_half_up(value: f64) -> i64 {
    value.round() as i64
}

// ---------------------------------------------------------------------------
// Categorical aggregation
// ---------------------------------------------------------------------------

/// Group `table` by the label that `mapping` assigns to each record's code
/// under `selector`, producing one [`GroupSummary`] per label present.
///
/// Sum and count are gathered in a single pass; the count of a group is
/// exactly the number of records mapped to its label.
pub fn aggregate_by(
    table: &RecordTable,
    selector: FieldSelector,
    mapping: &CodeMapping,
    options: AggregateOptions,
) -> Result<Vec<GroupSummary>, AggregateError> {
    if table.is_empty() {
        return Err(AggregateError::EmptyDataset);
    }

    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    let mut unmapped = 0usize;

    for (row, record) in table.iter().enumerate() {
        let code = selector.code(record);
        match mapping.label_for(&code) {
            Some(label) => groups.entry(label).or_default().push(record.salary_usd),
            None => match options.unmapped {
                UnmappedPolicy::Exclude => unmapped += 1,
                UnmappedPolicy::Reject => {
                    return Err(AggregateError::UnmappedCode {
                        row,
                        field: selector,
                        code: code.into_owned(),
                    })
                }
            },
        }
    }

    if unmapped > 0 {
        log::warn!("{unmapped} of {} records have no label for {selector}; excluded", table.len());
    }

    let mut summaries: Vec<GroupSummary> = groups
        .into_iter()
        .map(|(label, acc)| GroupSummary {
            label: label.to_string(),
            mean_salary: acc.mean(),
            job_count: acc.count,
        })
        .collect();

    match options.order {
        LabelOrder::Ascending => {}
        LabelOrder::Descending => summaries.reverse(),
        LabelOrder::Mapping => summaries.sort_by_key(|s| mapping.rank_of(&s.label)),
    }
    Ok(summaries)
}

/// Mean salary per work year, ascending by year.
pub fn yearly_means(table: &RecordTable) -> Result<Vec<TrendPoint>, AggregateError> {
    if table.is_empty() {
        return Err(AggregateError::EmptyDataset);
    }

    let mut years: BTreeMap<i32, Accumulator> = BTreeMap::new();
    for record in table {
        years.entry(record.work_year).or_default().push(record.salary_usd);
    }

    Ok(years
        .into_iter()
        .map(|(year, acc)| TrendPoint {
            year,
            mean_salary: acc.mean(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::Record;

    fn experience_mapping() -> CodeMapping {
        [("EN", "Junior"), ("EX", "Executive")].into_iter().collect()
    }

    fn table(records: Vec<Record>) -> RecordTable {
        RecordTable::from_records(records)
    }

    #[test]
    fn groups_mean_and_count_per_label() {
        let t = table(vec![
            record(50000.0, "EN"),
            record(150000.0, "EX"),
            record(90000.0, "EN"),
        ]);
        let out = aggregate_by(
            &t,
            FieldSelector::ExperienceLevel,
            &experience_mapping(),
            AggregateOptions {
                order: LabelOrder::Mapping,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(
            out,
            vec![
                GroupSummary {
                    label: "Junior".into(),
                    mean_salary: 70000,
                    job_count: 2
                },
                GroupSummary {
                    label: "Executive".into(),
                    mean_salary: 150000,
                    job_count: 1
                },
            ]
        );
    }

    #[test]
    fn label_order_options() {
        let t = table(vec![
            record(1.0, "EN"),
            record(2.0, "EX"),
            record(3.0, "SE"),
        ]);
        let mapping: CodeMapping = [("SE", "Senior"), ("EN", "Junior"), ("EX", "Executive")]
            .into_iter()
            .collect();
        let labels = |order| {
            aggregate_by(
                &t,
                FieldSelector::ExperienceLevel,
                &mapping,
                AggregateOptions {
                    order,
                    ..Default::default()
                },
            )
            .unwrap()
            .into_iter()
            .map(|s| s.label)
            .collect::<Vec<_>>()
        };

        assert_eq!(labels(LabelOrder::Ascending), ["Executive", "Junior", "Senior"]);
        assert_eq!(labels(LabelOrder::Descending), ["Senior", "Junior", "Executive"]);
        assert_eq!(labels(LabelOrder::Mapping), ["Senior", "Junior", "Executive"]);
    }

    #[test]
    fn mean_rounds_half_up() {
        let t = table(vec![record(100000.0, "EN"), record(100001.0, "EN")]);
        let out = aggregate_by(
            &t,
            FieldSelector::ExperienceLevel,
            &experience_mapping(),
            AggregateOptions::default(),
        )
        .unwrap();
        assert_eq!(out[0].mean_salary, 100001);
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(0.49999999999999994), 0);
        assert_eq!(round_half_up(69999.5), 70000);
    }

    #[test]
    fn unmapped_codes_are_excluded_or_rejected() {
        let t = table(vec![
            record(10.0, "EN"),
            record(99.0, "MI"),
            record(30.0, "EN"),
        ]);

        let excluded = aggregate_by(
            &t,
            FieldSelector::ExperienceLevel,
            &experience_mapping(),
            AggregateOptions::default(),
        )
        .unwrap();
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].job_count, 2);
        assert_eq!(excluded[0].mean_salary, 20);

        let rejected = aggregate_by(
            &t,
            FieldSelector::ExperienceLevel,
            &experience_mapping(),
            AggregateOptions {
                unmapped: UnmappedPolicy::Reject,
                ..Default::default()
            },
        );
        assert_eq!(
            rejected,
            Err(AggregateError::UnmappedCode {
                row: 1,
                field: FieldSelector::ExperienceLevel,
                code: "MI".into(),
            })
        );
    }

    #[test]
    fn codes_sharing_a_label_merge() {
        let t = table(vec![record(10.0, "EN"), record(20.0, "MI")]);
        let mapping: CodeMapping = [("EN", "Early"), ("MI", "Early")].into_iter().collect();
        let out = aggregate_by(
            &t,
            FieldSelector::ExperienceLevel,
            &mapping,
            AggregateOptions::default(),
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].job_count, 2);
        assert_eq!(out[0].mean_salary, 15);
    }

    #[test]
    fn remote_ratio_maps_integer_codes() {
        let mut onsite = record(40000.0, "EN");
        onsite.remote_ratio = 0;
        let mut remote = record(80000.0, "EN");
        remote.remote_ratio = 100;
        let mapping: CodeMapping = [("0", "Fully Onsite"), ("50", "Hybrid"), ("100", "Fully Remote")]
            .into_iter()
            .collect();
        let out = aggregate_by(
            &table(vec![onsite, remote]),
            FieldSelector::RemoteRatio,
            &mapping,
            AggregateOptions::default(),
        )
        .unwrap();
        assert_eq!(out[0].label, "Fully Onsite");
        assert_eq!(out[1].label, "Fully Remote");
        assert_eq!(out[1].mean_salary, 80000);
    }

    #[test]
    fn empty_table_is_an_error() {
        let empty = RecordTable::default();
        assert_eq!(
            aggregate_by(
                &empty,
                FieldSelector::CompanySize,
                &experience_mapping(),
                AggregateOptions::default()
            ),
            Err(AggregateError::EmptyDataset)
        );
        assert_eq!(yearly_means(&empty), Err(AggregateError::EmptyDataset));
    }

    #[test]
    fn yearly_means_ascend_by_year() {
        let mut a = record(100.0, "EN");
        a.work_year = 2022;
        let mut b = record(51.0, "EN");
        b.work_year = 2020;
        let mut c = record(50.0, "EN");
        c.work_year = 2020;
        let out = yearly_means(&table(vec![a, b, c])).unwrap();
        assert_eq!(
            out,
            vec![
                TrendPoint {
                    year: 2020,
                    mean_salary: 51
                },
                TrendPoint {
                    year: 2022,
                    mean_salary: 100
                },
            ]
        );
    }
}
