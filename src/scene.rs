use crate::config::ViewerConfig;
use crate::data::aggregate::{aggregate_by, yearly_means, CodeMapping, GroupSummary, TrendPoint};
use crate::data::histogram::{bin_records, GroupingCriterion, HistogramBin};
use crate::data::model::{FieldSelector, RecordTable};
use crate::error::{AggregateError, SceneError};

// ---------------------------------------------------------------------------
// Scene catalogue
// ---------------------------------------------------------------------------

/// What a scene computes from the record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    /// Mean salary per work year.
    Trend,
    /// Mean salary and job count per mapped category.
    Comparison {
        selector: FieldSelector,
        mapping: &'static [(&'static str, &'static str)],
    },
    /// Salary histogram split by a user-chosen [`GroupingCriterion`].
    Explore,
}

/// One chart configuration of the slideshow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scene {
    /// Navigation button text.
    pub title: &'static str,
    pub chart_title: &'static str,
    /// Heading of the job-count pie (comparison scenes only).
    pub pie_title: &'static str,
    pub x_axis: &'static str,
    pub y_axis: &'static str,
    /// Narrative paragraphs shown beside the chart.
    pub caption: &'static [&'static str],
    pub kind: SceneKind,
}

const INTRO: &str = "This visualization is based on a dataset of data scientist salaries. \
It covers salary, experience level, employment type, company size and remote arrangement, \
and is meant to help data scientists understand the salary distribution and how it relates \
to these attributes.";

pub static SCENES: [Scene; 6] = [
    Scene {
        title: "Trend",
        chart_title: "Average Salary by Year",
        pie_title: "",
        x_axis: "Year",
        y_axis: "Salary in USD",
        caption: &[
            INTRO,
            "Average salary remained stable until 2021, after which it began to rise significantly.",
        ],
        kind: SceneKind::Trend,
    },
    Scene {
        title: "Experience",
        chart_title: "Experience Level vs Salary",
        pie_title: "Job Count by Experience Level",
        x_axis: "Experience Level",
        y_axis: "Salary in USD",
        caption: &[
            "This chart compares the average salary across different experience levels.",
            "Executive level jobs have the highest average salary, but there are fewer jobs at that level.",
            "Senior level jobs have the second highest average salary and outnumber every other level.",
        ],
        kind: SceneKind::Comparison {
            selector: FieldSelector::ExperienceLevel,
            mapping: &[
                ("EN", "Junior"),
                ("MI", "Mid Level"),
                ("SE", "Senior"),
                ("EX", "Executive"),
            ],
        },
    },
    Scene {
        title: "Employment",
        chart_title: "Employment Type vs Salary",
        pie_title: "Job Count by Employment Type",
        x_axis: "Employment Type",
        y_axis: "Salary in USD",
        caption: &[
            "This chart shows the average salary by type of employment.",
            "Full Time jobs have the highest average salary and the highest number of jobs.",
            "Employers prefer full time employees for data scientist positions: almost every job is full time.",
        ],
        kind: SceneKind::Comparison {
            selector: FieldSelector::EmploymentType,
            mapping: &[
                ("FT", "Full Time"),
                ("CT", "Contract"),
                ("PT", "Part Time"),
                ("FL", "Freelancer"),
            ],
        },
    },
    Scene {
        title: "Company",
        chart_title: "Company Size vs Salary",
        pie_title: "Job Count by Company Size",
        x_axis: "Company Size",
        y_axis: "Salary in USD",
        caption: &[
            "This chart illustrates the average salary based on company size.",
            "Medium size companies have the highest average salary and the highest number of jobs.",
        ],
        kind: SceneKind::Comparison {
            selector: FieldSelector::CompanySize,
            mapping: &[("S", "Small"), ("M", "Medium"), ("L", "Large")],
        },
    },
    Scene {
        title: "Remote Jobs",
        chart_title: "Job Location vs Salary",
        pie_title: "Job Count by Remote Type",
        x_axis: "Remote Type",
        y_axis: "Salary in USD",
        caption: &[
            "This chart details the average salary for various remote work arrangements.",
            "Fully remote and fully onsite jobs have almost the same salary and number of jobs.",
            "Hybrid data scientist jobs have the lowest average salary and the fewest jobs.",
        ],
        kind: SceneKind::Comparison {
            selector: FieldSelector::RemoteRatio,
            mapping: &[("0", "Fully Onsite"), ("50", "Hybrid"), ("100", "Fully Remote")],
        },
    },
    Scene {
        title: "Explore!",
        chart_title: "Salary Distribution",
        pie_title: "",
        x_axis: "Salary Range (USD)",
        y_axis: "Number of Jobs",
        caption: &[
            "Explore the salary distribution across different job types. Hover over the bars to see \
             the number of jobs in each salary range, and pick a grouping to split the bars by.",
        ],
        kind: SceneKind::Explore,
    },
];

/// Aggregated data ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneData {
    Trend(Vec<TrendPoint>),
    Comparison(Vec<GroupSummary>),
    Explore {
        criterion: GroupingCriterion,
        bins: Vec<HistogramBin>,
    },
}

impl Scene {
    /// Code → label mapping of a comparison scene.
    pub fn mapping(&self) -> Option<CodeMapping> {
        match self.kind {
            SceneKind::Comparison { mapping, .. } => Some(mapping.iter().copied().collect()),
            _ => None,
        }
    }

    /// Run this scene's aggregation.  `criterion` only matters for Explore.
    pub fn compute(
        &self,
        table: &RecordTable,
        config: &ViewerConfig,
        criterion: GroupingCriterion,
    ) -> Result<SceneData, AggregateError> {
        match self.kind {
            SceneKind::Trend => yearly_means(table).map(SceneData::Trend),
            SceneKind::Comparison { selector, mapping } => {
                let mapping: CodeMapping = mapping.iter().copied().collect();
                aggregate_by(table, selector, &mapping, config.aggregate_options())
                    .map(SceneData::Comparison)
            }
            SceneKind::Explore => {
                let bin_config = config.bin_config()?;
                let bins = bin_records(table, &bin_config, &criterion.cross_tab())?;
                Ok(SceneData::Explore { criterion, bins })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scene controller
// ---------------------------------------------------------------------------

/// Snapshot of the navigation position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneState {
    pub index: usize,
    /// Highest index visited so far; buttons up to here are enabled.
    pub furthest: usize,
}

/// Sole owner of the current scene index.
#[derive(Debug, Clone)]
pub struct SceneController {
    scenes: &'static [Scene],
    state: SceneState,
}

impl Default for SceneController {
    /// Starts on the first of [`SCENES`].
    fn default() -> Self {
        Self {
            scenes: &SCENES,
            state: SceneState {
                index: 0,
                furthest: 0,
            },
        }
    }
}

impl SceneController {

    pub fn state(&self) -> SceneState {
        self.state
    }

    pub fn current(&self) -> &'static Scene {
        &self.scenes[self.state.index]
    }

    pub fn scenes(&self) -> &'static [Scene] {
        self.scenes
    }

    /// Move to the next scene, wrapping back to the first after the last.
    pub fn advance(&mut self) -> SceneState {
        self.state.index = (self.state.index + 1) % self.scenes.len();
        self.state.furthest = self.state.furthest.max(self.state.index);
        log::info!("scene {} ({})", self.state.index, self.current().title);
        self.state
    }

    /// Jump to an already reached scene.
    pub fn go_to(&mut self, index: usize) -> Result<SceneState, SceneError> {
        let count = self.scenes.len();
        if index >= count {
            return Err(SceneError::OutOfRange { index, count });
        }
        if index > self.state.furthest {
            return Err(SceneError::Locked { index });
        }
        self.state.index = index;
        log::info!("scene {} ({})", index, self.current().title);
        Ok(self.state)
    }

    /// Whether the button for `index` is usable.
    pub fn is_enabled(&self, index: usize) -> bool {
        index < self.scenes.len() && index <= self.state.furthest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::{CompanySize, EmploymentType, ExperienceLevel, REMOTE_RATIOS};

    #[test]
    fn advance_unlocks_and_wraps() {
        let mut controller = SceneController::default();
        assert!(controller.is_enabled(0));
        assert!(!controller.is_enabled(1));

        for expected in 1..SCENES.len() {
            assert_eq!(controller.advance().index, expected);
        }
        let wrapped = controller.advance();
        assert_eq!(wrapped.index, 0);
        assert_eq!(wrapped.furthest, SCENES.len() - 1);
        assert!(controller.is_enabled(SCENES.len() - 1));
        assert!(!controller.is_enabled(SCENES.len()));
    }

    #[test]
    fn go_to_respects_reached_scenes() {
        let mut controller = SceneController::default();
        assert_eq!(controller.go_to(3), Err(SceneError::Locked { index: 3 }));
        assert_eq!(
            controller.go_to(6),
            Err(SceneError::OutOfRange { index: 6, count: 6 })
        );

        controller.advance();
        controller.advance();
        let state = controller.go_to(1).unwrap();
        assert_eq!(state, SceneState { index: 1, furthest: 2 });
        assert_eq!(controller.current().title, "Experience");
    }

    #[test]
    fn each_kind_computes_its_data() {
        let mut exec = record(150000.0, "EX");
        exec.remote_ratio = 100;
        let table = RecordTable::from_records(vec![record(50000.0, "EN"), exec, record(90000.0, "EN")]);
        let config = ViewerConfig::default();
        let criterion = GroupingCriterion::RemoteRatio;

        match SCENES[0].compute(&table, &config, criterion).unwrap() {
            SceneData::Trend(points) => assert_eq!(points.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
        match SCENES[1].compute(&table, &config, criterion).unwrap() {
            SceneData::Comparison(rows) => {
                assert_eq!(rows[0].label, "Executive");
                assert_eq!(rows[1].label, "Junior");
                assert_eq!(rows[1].mean_salary, 70000);
            }
            other => panic!("unexpected {other:?}"),
        }
        match SCENES[4].compute(&table, &config, criterion).unwrap() {
            SceneData::Comparison(rows) => {
                assert_eq!(rows.iter().map(|r| r.job_count).sum::<usize>(), 3);
                assert!(rows.iter().any(|r| r.label == "Fully Remote" && r.job_count == 1));
            }
            other => panic!("unexpected {other:?}"),
        }
        match SCENES[5].compute(&table, &config, criterion).unwrap() {
            SceneData::Explore { criterion: c, bins } => {
                assert_eq!(c, GroupingCriterion::RemoteRatio);
                assert_eq!(bins[6].count("Remote"), 1);
                assert_eq!(bins[2].count("On-site"), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn comparison_mappings_cover_every_code() {
        for scene in &SCENES {
            let SceneKind::Comparison { selector, .. } = scene.kind else {
                assert!(scene.mapping().is_none(), "{}", scene.title);
                continue;
            };
            let mapping = scene.mapping().unwrap();
            let codes: Vec<String> = match selector {
                FieldSelector::ExperienceLevel => {
                    ExperienceLevel::ALL.iter().map(|v| v.code().to_string()).collect()
                }
                FieldSelector::EmploymentType => {
                    EmploymentType::ALL.iter().map(|v| v.code().to_string()).collect()
                }
                FieldSelector::CompanySize => {
                    CompanySize::ALL.iter().map(|v| v.code().to_string()).collect()
                }
                FieldSelector::RemoteRatio => REMOTE_RATIOS.iter().map(u8::to_string).collect(),
                FieldSelector::WorkYear => panic!("{} groups by year", scene.title),
            };
            for code in codes {
                assert!(mapping.label_for(&code).is_some(), "{}: {code}", scene.title);
            }
        }
    }

    #[test]
    fn oversized_bin_counts_fail_instead_of_allocating() {
        let config = ViewerConfig {
            bin_width: 1e-300,
            ..Default::default()
        };
        let table = RecordTable::from_records(vec![record(1.0, "EN")]);
        assert!(matches!(
            SCENES[5].compute(&table, &config, GroupingCriterion::default()),
            Err(AggregateError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn errors_reach_the_caller() {
        let config = ViewerConfig {
            bin_width: -1.0,
            ..Default::default()
        };
        let table = RecordTable::from_records(vec![record(1.0, "EN")]);
        assert!(matches!(
            SCENES[5].compute(&table, &config, GroupingCriterion::default()),
            Err(AggregateError::InvalidConfiguration { .. })
        ));
        assert_eq!(
            SCENES[2].compute(&RecordTable::default(), &ViewerConfig::default(), GroupingCriterion::default()),
            Err(AggregateError::EmptyDataset)
        );
    }
}
