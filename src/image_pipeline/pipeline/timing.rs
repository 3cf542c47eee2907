use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Stages of one frame, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Convert,
    Detect,
    Overlay,
    Present,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Convert => "convert_frame",
            Stage::Detect => "detect_markers",
            Stage::Overlay => "overlay_markers",
            Stage::Present => "present_frame",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StepTiming {
    pub stage: Stage,
    pub duration: Duration,
}

/// Wall-clock durations of the stages of one frame. Each stage runs at most once.
#[derive(Debug, Clone, Default)]
pub struct PipelineTimings {
    steps: Vec<StepTiming>,
}

impl PipelineTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops `timer` and records its stage.
    pub fn record(&mut self, timer: StageTimer) {
        self.steps.push(StepTiming {
            stage: timer.stage,
            duration: timer.start.elapsed(),
        });
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    pub fn get(&self, stage: Stage) -> Option<Duration> {
        self.steps.iter().find(|s| s.stage == stage).map(|s| s.duration)
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// Stage table with per-stage share of the total.
    pub fn table(&self) -> String {
        let total = self.total_duration().as_secs_f64();
        let mut out = String::new();
        for step in &self.steps {
            let ms = step.duration.as_secs_f64() * 1000.0;
            let share = if total > 0.0 {
                step.duration.as_secs_f64() / total * 100.0
            } else {
                0.0
            };
            let _ = writeln!(out, "{:<20} {:>10.3}ms ({:>5.1}%)", step.stage.name(), ms, share);
        }
        let _ = writeln!(out, "{:-<42}", "");
        let _ = write!(out, "{:<20} {:>10.3}ms", "total", total * 1000.0);
        out
    }
}

/// Running clock for one stage; hand it to [`PipelineTimings::record`].
pub struct StageTimer {
    stage: Stage,
    start: Instant,
}

impl StageTimer {
    pub fn start(stage: Stage) -> Self {
        Self {
            stage,
            start: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_stage() {
        let mut timings = PipelineTimings::new();
        timings.record(StageTimer::start(Stage::Convert));
        timings.record(StageTimer::start(Stage::Detect));

        assert!(timings.get(Stage::Convert).is_some());
        assert!(timings.get(Stage::Present).is_none());
        assert_eq!(timings.steps().len(), 2);
        assert_eq!(timings.steps()[1].stage, Stage::Detect);
    }

    #[test]
    fn test_table_lists_stages_in_order() {
        let mut timings = PipelineTimings::new();
        timings.record(StageTimer::start(Stage::Convert));
        timings.record(StageTimer::start(Stage::Overlay));

        let table = timings.table();
        let convert = table.find("convert_frame").unwrap();
        let overlay = table.find("overlay_markers").unwrap();
        assert!(convert < overlay);
        assert!(table.ends_with("ms"));
        assert!(table.contains("total"));
    }
}
