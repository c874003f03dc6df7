//! Progress indicators for long-running operations.
//!
//! Spinners are shown on stderr while install and check fan out to the
//! filesystem and the store. They are hidden when:
//! - `SUPERFACE_NO_PROGRESS` is set (also set by `--no-progress`)
//! - the caller asks for a hidden spinner (`--quiet`, `--json`)

use crate::constants::NO_PROGRESS_ENV;
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};
use std::time::Duration;

/// Checks if progress indicators should be disabled.
fn is_progress_disabled() -> bool {
    std::env::var(NO_PROGRESS_ENV).is_ok()
}

/// A spinner with consistent styling.
#[derive(Clone)]
pub struct Spinner {
    inner: IndicatifBar,
}

impl Spinner {
    /// Creates and starts a spinner with the given message.
    ///
    /// When `hidden` is true or progress is disabled through the environment,
    /// the spinner silently ignores all operations.
    #[must_use]
    pub fn new(message: impl Into<String>, hidden: bool) -> Self {
        let inner = if hidden || is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
                bar.set_style(style);
            }
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        inner.set_message(message.into());
        Self {
            inner,
        }
    }

    /// Stop the spinner and remove it from the terminal.
    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}
