use std::time::{Duration, Instant};

use indicatif::{HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::bootstrap::BootReport;
use crate::nav::NavOutcome;

/// Stage spinner on stderr. A disabled instance ignores every call.
pub struct Progress {
    enabled: bool,
    start: Instant,
    stage: ProgressBar,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        let start = Instant::now();
        if !enabled {
            return Self::hidden();
        }

        let stage = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}  [{elapsed_precise}]") {
            stage.set_style(style);
        }
        stage.enable_steady_tick(Duration::from_millis(80));
        stage.set_message("starting");

        Self {
            enabled: true,
            start,
            stage,
        }
    }

    pub fn hidden() -> Self {
        Self {
            enabled: false,
            start: Instant::now(),
            stage: ProgressBar::hidden(),
        }
    }

    pub fn set_stage(&self, msg: impl Into<String>) {
        if !self.enabled {
            return;
        }
        self.stage.set_message(msg.into());
    }

    pub fn finish(&self, report: &BootReport) {
        if !self.enabled {
            return;
        }
        let nav = match &report.nav {
            NavOutcome::Skipped => "nav skipped".to_string(),
            NavOutcome::Injected { placeholders } => format!("nav -> {placeholders}"),
            NavOutcome::Failed { .. } => "nav failed".to_string(),
        };
        self.stage.finish_with_message(format!(
            "{} theme | {nav} | {} accordion buttons | {} year slots | done in {}",
            report.theme,
            report.accordion_buttons,
            report.year_slots,
            HumanDuration(self.start.elapsed()),
        ));
    }
}
