// Hypothesis assessment for strategy comparisons
//
// Picks the test from the shape of the data (paired by round -> Wilcoxon
// signed-rank, otherwise Mann-Whitney U), enforces the minimum sample size,
// and reports the mean change and, where requested, Cohen's d.

use crate::derive::{mean, percent_change, std_dev, Metric};
use crate::hypothesis::config::HypothesisConfig;
use crate::hypothesis::rank_tests::{
    mann_whitney_u, wilcoxon_signed_rank, Alternative, PValueMethod, RankTestResult,
};
use crate::record::{DerivedRecord, Strategy};
use anyhow::Result;
use std::collections::BTreeMap;

/// One fixed comparison between a control and a treatment strategy
#[derive(Debug, Clone, PartialEq)]
pub struct HypothesisSpec {
    /// Short identifier, e.g. "H1"
    pub id: &'static str,
    pub description: &'static str,
    pub metric: Metric,
    pub control: Strategy,
    pub treatment: Strategy,
    /// Direction of control relative to treatment
    pub alternative: Alternative,
    /// Report Cohen's d alongside the test
    pub effect_size: bool,
}

/// Hypotheses for the `/usr/bin/time -v` pipeline
pub fn simple_hypotheses() -> Vec<HypothesisSpec> {
    vec![
        HypothesisSpec {
            id: "H1",
            description: "TIA reduces wall time vs baseline",
            metric: Metric::WallTime,
            control: Strategy::Baseline,
            treatment: Strategy::Tia,
            alternative: Alternative::Greater,
            effect_size: false,
        },
        HypothesisSpec {
            id: "H2",
            description: "Parallel EDP differs from baseline",
            metric: Metric::Edp,
            control: Strategy::Baseline,
            treatment: Strategy::Parallel,
            alternative: Alternative::TwoSided,
            effect_size: false,
        },
    ]
}

/// Hypotheses for the measured-energy pipeline
pub fn eco_hypotheses() -> Vec<HypothesisSpec> {
    vec![
        HypothesisSpec {
            id: "H1",
            description: "TIA reduces energy vs baseline",
            metric: Metric::Energy,
            control: Strategy::Baseline,
            treatment: Strategy::Tia,
            alternative: Alternative::Greater,
            effect_size: true,
        },
        HypothesisSpec {
            id: "H2",
            description: "Parallel has higher EDP than baseline",
            metric: Metric::Edp,
            control: Strategy::Baseline,
            treatment: Strategy::Parallel,
            alternative: Alternative::Less,
            effect_size: false,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    MannWhitneyU,
    WilcoxonSignedRank,
}

impl TestKind {
    pub fn name(&self) -> &'static str {
        match self {
            TestKind::MannWhitneyU => "Mann-Whitney U",
            TestKind::WilcoxonSignedRank => "Wilcoxon signed-rank",
        }
    }
}

/// Cohen's d with its conventional magnitude
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectSize {
    pub cohens_d: f64,
}

impl EffectSize {
    /// (mean_c − mean_t) / sqrt((sd_c² + sd_t²) / 2)
    pub fn from_samples(control: &[f64], treatment: &[f64]) -> Option<Self> {
        let diff = mean(control)? - mean(treatment)?;
        let sd_c = std_dev(control)?;
        let sd_t = std_dev(treatment)?;
        let pooled = ((sd_c.powi(2) + sd_t.powi(2)) / 2.0).sqrt();
        if pooled == 0.0 {
            return None;
        }
        Some(Self {
            cohens_d: diff / pooled,
        })
    }

    pub fn magnitude(&self) -> &'static str {
        let d = self.cohens_d.abs();
        if d > 0.8 {
            "large"
        } else if d > 0.5 {
            "medium"
        } else {
            "small"
        }
    }
}

/// A comparison that was actually tested
#[derive(Debug, Clone, PartialEq)]
pub struct TestedHypothesis {
    pub kind: TestKind,
    pub test: RankTestResult,
    pub significant: bool,
    pub control_n: usize,
    pub treatment_n: usize,
    pub control_mean: f64,
    pub treatment_mean: f64,
    /// (control − treatment) / control × 100
    pub reduction_pct: Option<f64>,
    pub effect_size: Option<EffectSize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HypothesisOutcome {
    Tested(TestedHypothesis),
    /// Fewer samples than `min_sample_size` in at least one group
    InsufficientData {
        control_n: usize,
        treatment_n: usize,
        required: usize,
    },
}

#[derive(Debug, Clone)]
pub struct HypothesisAssessment {
    pub spec: HypothesisSpec,
    pub outcome: HypothesisOutcome,
    pub config: HypothesisConfig,
}

impl HypothesisAssessment {
    pub fn is_tested(&self) -> bool {
        matches!(self.outcome, HypothesisOutcome::Tested(_))
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = format!(
            "📊 {}: {} vs {} ({})\n",
            self.spec.id, self.spec.treatment, self.spec.control, self.spec.metric
        );
        report.push_str(&format!("   {}\n", self.spec.description));

        match &self.outcome {
            HypothesisOutcome::InsufficientData {
                control_n,
                treatment_n,
                required,
            } => {
                report.push_str(&format!(
                    "   ⚠️ Insufficient data ({}: {}, {}: {}; need >= {} each)\n",
                    self.spec.control, control_n, self.spec.treatment, treatment_n, required
                ));
            }
            HypothesisOutcome::Tested(t) => {
                let method = match t.test.method {
                    PValueMethod::Exact => "exact",
                    PValueMethod::Asymptotic => "normal approx.",
                };
                report.push_str(&format!(
                    "   Test: {} ({}, {}), n = {}/{}\n",
                    t.kind.name(),
                    self.spec.alternative.describe(),
                    method,
                    t.control_n,
                    t.treatment_n
                ));
                report.push_str(&format!(
                    "   Means: {} = {:.2}, {} = {:.2}\n",
                    self.spec.control, t.control_mean, self.spec.treatment, t.treatment_mean
                ));
                match t.reduction_pct {
                    Some(pct) if pct >= 0.0 => {
                        report.push_str(&format!("   Mean reduction: {:.1}%\n", pct))
                    }
                    Some(pct) => report.push_str(&format!("   Mean increase: {:.1}%\n", -pct)),
                    None => report.push_str("   Mean change: undefined (zero control mean)\n"),
                }
                report.push_str(&format!(
                    "   Statistic: {:.2}, p-value: {:.4}\n",
                    t.test.statistic, t.test.pvalue
                ));
                if let Some(effect) = t.effect_size {
                    report.push_str(&format!(
                        "   Cohen's d: {:.2} ({})\n",
                        effect.cohens_d,
                        effect.magnitude()
                    ));
                }
                let conclusion = if t.significant {
                    "✅ Reject H0"
                } else {
                    "❌ Do not reject H0"
                };
                report.push_str(&format!(
                    "   Conclusion: {} (alpha = {})\n",
                    conclusion, self.config.significance_level
                ));
            }
        }

        report
    }
}

/// Samples of both groups, aligned by round when the data allows pairing
struct Samples {
    control: Vec<f64>,
    treatment: Vec<f64>,
    paired: bool,
}

fn group_by_round(records: &[DerivedRecord], strategy: Strategy, metric: Metric) -> Option<BTreeMap<u32, f64>> {
    let mut by_round = BTreeMap::new();
    for record in records.iter().filter(|r| r.strategy() == Some(strategy)) {
        let Some(value) = metric.value(record) else {
            continue;
        };
        let round = record.record.round?;
        if by_round.insert(round, value).is_some() {
            // duplicate round: pairing would be ambiguous
            return None;
        }
    }
    Some(by_round)
}

fn gather_samples(records: &[DerivedRecord], spec: &HypothesisSpec) -> Samples {
    let control = group_by_round(records, spec.control, spec.metric);
    let treatment = group_by_round(records, spec.treatment, spec.metric);

    if let (Some(c), Some(t)) = (control, treatment) {
        if !c.is_empty() && c.keys().eq(t.keys()) {
            return Samples {
                control: c.into_values().collect(),
                treatment: t.into_values().collect(),
                paired: true,
            };
        }
    }

    Samples {
        control: crate::derive::metric_values(records, spec.control, spec.metric),
        treatment: crate::derive::metric_values(records, spec.treatment, spec.metric),
        paired: false,
    }
}

/// Assess one hypothesis over the derived records
pub fn assess_hypothesis(
    records: &[DerivedRecord],
    spec: &HypothesisSpec,
    config: &HypothesisConfig,
) -> Result<HypothesisAssessment> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let samples = gather_samples(records, spec);
    let control_n = samples.control.len();
    let treatment_n = samples.treatment.len();

    if control_n < config.min_sample_size || treatment_n < config.min_sample_size {
        tracing::info!(
            "{}: skipping test, {} samples for {} and {} for {}",
            spec.id,
            control_n,
            spec.control,
            treatment_n,
            spec.treatment
        );
        return Ok(HypothesisAssessment {
            spec: spec.clone(),
            outcome: HypothesisOutcome::InsufficientData {
                control_n,
                treatment_n,
                required: config.min_sample_size,
            },
            config: config.clone(),
        });
    }

    let (kind, test) = if samples.paired {
        (
            TestKind::WilcoxonSignedRank,
            wilcoxon_signed_rank(&samples.control, &samples.treatment, spec.alternative)?,
        )
    } else {
        (
            TestKind::MannWhitneyU,
            mann_whitney_u(&samples.control, &samples.treatment, spec.alternative)?,
        )
    };

    // both groups are non-empty past the sample-size gate
    let control_mean = mean(&samples.control).unwrap_or_default();
    let treatment_mean = mean(&samples.treatment).unwrap_or_default();

    let effect_size = if spec.effect_size {
        EffectSize::from_samples(&samples.control, &samples.treatment)
    } else {
        None
    };

    Ok(HypothesisAssessment {
        spec: spec.clone(),
        outcome: HypothesisOutcome::Tested(TestedHypothesis {
            kind,
            significant: test.pvalue < config.significance_level,
            test,
            control_n,
            treatment_n,
            control_mean,
            treatment_mean,
            reduction_pct: percent_change(control_mean, treatment_mean),
            effect_size,
        }),
        config: config.clone(),
    })
}

/// Assess every hypothesis of a pipeline
pub fn assess_all(
    records: &[DerivedRecord],
    specs: &[HypothesisSpec],
    config: &HypothesisConfig,
) -> Result<Vec<HypothesisAssessment>> {
    specs
        .iter()
        .map(|spec| assess_hypothesis(records, spec, config))
        .collect()
}
