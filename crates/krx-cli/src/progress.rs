//! Progress bar for benchmark runs

use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};
use krx_eval::{RunProgress, RunStage};

/// One progress bar, restarted for every stage
pub struct RunProgressBar {
    state: Mutex<Option<(RunStage, ProgressBar)>>,
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{prefix:>22} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

impl RunProgressBar {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Apply a progress event
    pub fn update(&self, progress: RunProgress) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };

        let same_stage = matches!(&*state, Some((stage, _)) if *stage == progress.stage);
        if !same_stage {
            if let Some((_, bar)) = state.take() {
                bar.finish();
            }
            let bar = ProgressBar::new(progress.total as u64);
            bar.set_style(bar_style());
            bar.set_prefix(progress.stage.to_string());
            *state = Some((progress.stage, bar));
        }

        if let Some((_, bar)) = &*state {
            bar.set_position(progress.completed as u64);
        }
    }

    /// Finish the last bar
    pub fn finish(&self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some((_, bar)) = state.take() {
                bar.finish();
            }
        }
    }
}

impl Default for RunProgressBar {
    fn default() -> Self {
        Self::new()
    }
}
