//! Property tests for the aggregation and binning engine.
//!
//! Strategies generate arbitrary but valid salary tables; properties check
//! conservation of counts and purity for ALL inputs, not just fixtures.

use proptest::prelude::*;

use salary_scenes::data::aggregate::{
    aggregate_by, round_half_up, AggregateOptions, CodeMapping, LabelOrder,
};
use salary_scenes::data::histogram::{bin_records, BinConfig, GroupingCriterion};
use salary_scenes::data::model::{
    CompanySize, EmploymentType, ExperienceLevel, FieldSelector, Record, RecordTable,
    REMOTE_RATIOS,
};

// ---------------------------------------------------------------------------
// Strategy generators
// ---------------------------------------------------------------------------

/// Salaries cluster below the default histogram ceiling with a tail above it.
fn arb_salary() -> impl Strategy<Value = f64> {
    prop_oneof![
        4 => (0u32..=200_000).prop_map(f64::from),
        1 => (200_001u32..600_000).prop_map(f64::from),
        1 => prop::sample::select(vec![0.0, 25_000.0, 50_000.0, 175_000.0, 200_000.0]),
    ]
}

fn arb_record() -> impl Strategy<Value = Record> {
    (
        arb_salary(),
        2020i32..=2023,
        prop::sample::select(ExperienceLevel::ALL.to_vec()),
        prop::sample::select(EmploymentType::ALL.to_vec()),
        prop::sample::select(CompanySize::ALL.to_vec()),
        prop::sample::select(REMOTE_RATIOS.to_vec()),
    )
        .prop_map(
            |(salary_usd, work_year, experience_level, employment_type, company_size, remote_ratio)| {
                Record {
                    salary_usd,
                    work_year,
                    experience_level,
                    employment_type,
                    company_size,
                    remote_ratio,
                }
            },
        )
}

fn arb_table(max_len: usize) -> impl Strategy<Value = RecordTable> {
    proptest::collection::vec(arb_record(), 1..=max_len).prop_map(RecordTable::from_records)
}

/// A mapping covering an arbitrary subset of the experience codes.
fn arb_partial_mapping() -> impl Strategy<Value = CodeMapping> {
    proptest::sample::subsequence(ExperienceLevel::ALL.to_vec(), 0..=4).prop_map(|levels| {
        levels
            .into_iter()
            .map(|l| (l.code(), format!("label-{}", l.code())))
            .collect()
    })
}

fn arb_criterion() -> impl Strategy<Value = GroupingCriterion> {
    prop::sample::select(GroupingCriterion::ALL.to_vec())
}

fn arb_bin_config() -> impl Strategy<Value = BinConfig> {
    (1u32..=50, 1u32..=20).prop_map(|(width_k, bins)| {
        let width = f64::from(width_k) * 5_000.0;
        BinConfig::new(width, width * f64::from(bins)).unwrap()
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn job_counts_sum_to_mapped_records(table in arb_table(200), mapping in arb_partial_mapping()) {
        let mapped = table
            .iter()
            .filter(|r| mapping.label_for(r.experience_level.code()).is_some())
            .count();
        let groups = aggregate_by(
            &table,
            FieldSelector::ExperienceLevel,
            &mapping,
            AggregateOptions::default(),
        )
        .unwrap();
        prop_assert_eq!(groups.iter().map(|g| g.job_count).sum::<usize>(), mapped);
    }

    #[test]
    fn bin_totals_sum_to_in_range_records(
        table in arb_table(200),
        config in arb_bin_config(),
        criterion in arb_criterion(),
    ) {
        let in_range = table
            .iter()
            .filter(|r| (0.0..=config.upper_bound()).contains(&r.salary_usd))
            .count();
        let bins = bin_records(&table, &config, &criterion.cross_tab()).unwrap();

        prop_assert_eq!(bins.iter().map(|b| b.total_count).sum::<usize>(), in_range);
        for bin in &bins {
            prop_assert_eq!(bin.counts_by_subkey.values().sum::<usize>(), bin.total_count);
            prop_assert_eq!(bin.counts_by_subkey.len(), criterion.cross_tab().keys.len());
        }
        for pair in bins.windows(2) {
            prop_assert_eq!(pair[0].range_end, pair[1].range_start);
        }
        prop_assert_eq!(bins.first().map(|b| b.range_start), Some(0.0));
        prop_assert_eq!(bins.last().map(|b| b.range_end), Some(config.upper_bound()));
    }

    #[test]
    fn aggregation_and_binning_are_pure(table in arb_table(100), criterion in arb_criterion()) {
        let mapping: CodeMapping = ExperienceLevel::ALL.iter().map(|l| (l.code(), l.code())).collect();
        let options = AggregateOptions { order: LabelOrder::Descending, ..Default::default() };
        let snapshot = table.clone();

        let first = aggregate_by(&table, FieldSelector::ExperienceLevel, &mapping, options);
        let second = aggregate_by(&table, FieldSelector::ExperienceLevel, &mapping, options);
        prop_assert_eq!(first, second);

        let cross_tab = criterion.cross_tab();
        let config = BinConfig::default();
        prop_assert_eq!(
            bin_records(&table, &config, &cross_tab),
            bin_records(&table, &config, &cross_tab)
        );
        prop_assert_eq!(table, snapshot);
    }

    #[test]
    fn group_mean_is_rounded_arithmetic_mean(salaries in proptest::collection::vec(0u32..1_000_000, 1..50)) {
        let records: Vec<Record> = salaries
            .iter()
            .map(|&s| Record {
                salary_usd: f64::from(s),
                work_year: 2023,
                experience_level: ExperienceLevel::Senior,
                employment_type: EmploymentType::FullTime,
                company_size: CompanySize::Large,
                remote_ratio: 100,
            })
            .collect();
        let mapping: CodeMapping = [("SE", "Senior")].into_iter().collect();
        let groups = aggregate_by(
            &RecordTable::from_records(records),
            FieldSelector::ExperienceLevel,
            &mapping,
            AggregateOptions::default(),
        )
        .unwrap();

        let sum: u64 = salaries.iter().map(|&s| u64::from(s)).sum();
        let expected = round_half_up(sum as f64 / salaries.len() as f64);
        prop_assert_eq!(groups.len(), 1);
        prop_assert_eq!(groups[0].mean_salary, expected);
        prop_assert_eq!(groups[0].job_count, salaries.len());
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn default_histogram_places_boundary_in_upper_bin() {
    let record = Record {
        salary_usd: 25_000.0,
        work_year: 2023,
        experience_level: ExperienceLevel::Entry,
        employment_type: EmploymentType::PartTime,
        company_size: CompanySize::Small,
        remote_ratio: 50,
    };
    let bins = bin_records(
        &RecordTable::from_records(vec![record]),
        &BinConfig::default(),
        &GroupingCriterion::EmploymentType.cross_tab(),
    )
    .unwrap();
    assert_eq!(bins[0].total_count, 0);
    assert_eq!((bins[1].range_start, bins[1].range_end), (25_000.0, 50_000.0));
    assert_eq!(bins[1].count("PT"), 1);
    assert_eq!(bins[1].count("FT"), 0);
}
