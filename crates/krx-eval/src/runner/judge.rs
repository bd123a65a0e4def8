//! Pairwise judging of a finished long-form pass

use std::path::PathBuf;

use super::{EvalConfig, ResultWriter, load_longform};
use crate::error::EvalResult;
use crate::judge::{PairwiseComparison, PairwiseJudge, SidePlacement};
use crate::report::JudgeSummary;

/// Name the reference answers appear under when used as the baseline
pub const REFERENCE_BASELINE: &str = "reference";

/// What the evaluated model is compared against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Baseline {
    /// The reference answers stored next to the model's own answers
    References,
    /// Another model's result directory
    ResultDir(PathBuf),
}

impl Baseline {
    /// `reference` selects the reference answers; anything else is a directory
    pub fn parse(value: &str) -> Self {
        if value == REFERENCE_BASELINE {
            Baseline::References
        } else {
            Baseline::ResultDir(PathBuf::from(value))
        }
    }
}

/// Judges the long-form answers in a model's result directory
pub struct JudgeRunner<J> {
    comparison: PairwiseComparison<J>,
    writer: ResultWriter,
}

impl<J: PairwiseJudge> JudgeRunner<J> {
    /// Judge results of `config.model` under `config.output_dir`
    pub fn new(config: &EvalConfig, judge: J) -> EvalResult<Self> {
        config.validate()?;
        Ok(Self {
            comparison: PairwiseComparison::new(judge, config.batch_size)?,
            writer: ResultWriter::new(&config.output_dir, &config.model),
        })
    }

    /// Compare against `baseline` once per placement, writing one tally file each
    pub async fn run(
        &self,
        baseline: &Baseline,
        placements: &[SidePlacement],
    ) -> EvalResult<Vec<JudgeSummary>> {
        let candidate = load_longform(self.writer.root()).await?;
        let baseline = match baseline {
            Baseline::References => candidate.reference_baseline(REFERENCE_BASELINE),
            Baseline::ResultDir(dir) => load_longform(dir).await?,
        };

        let mut summaries = Vec::with_capacity(placements.len());
        for &placement in placements {
            tracing::info!(placement = %placement, "[EVALUATION] starting pairwise judge");
            let tally = self
                .comparison
                .compare(&candidate, &baseline, placement)
                .await?;
            let output_path = self.writer.write_judge(&tally).await?;
            summaries.push(JudgeSummary::from_tally(&tally, output_path));
        }
        Ok(summaries)
    }
}
