// Hypothesis testing for the strategy comparisons
//
// H1: does TIA lower wall time / energy compared with the sequential
//     baseline?
// H2: does the parallel strategy change the Energy-Delay Product compared
//     with the baseline?
//
// Both use rank tests (no normality assumption on a handful of CI runs):
// Wilcoxon signed-rank when the runs are paired by round, Mann-Whitney U
// otherwise. Groups below the minimum sample size are reported as
// insufficient data and never tested.

mod config;
mod verdict;

pub use config::HypothesisConfig;
pub use rank_tests::{
    mann_whitney_u, normal_cdf, normal_sf, rank_with_ties, wilcoxon_signed_rank, Alternative,
    PValueMethod, RankTestResult,
};
pub use verdict::{
    assess_all, assess_hypothesis, eco_hypotheses, simple_hypotheses, EffectSize,
    HypothesisAssessment, HypothesisOutcome, HypothesisSpec, TestKind, TestedHypothesis,
};
