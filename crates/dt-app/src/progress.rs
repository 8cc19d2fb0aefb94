#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    ValidatingConfig,
    Draining,
    Completed,
}

impl RunStage {
    pub fn label(self) -> &'static str {
        match self {
            RunStage::ValidatingConfig => "validating",
            RunStage::Draining => "draining",
            RunStage::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DrainStepProgress {
    pub step: usize,
    pub sim_time_s: f64,
    pub time_cap_s: f64,
    pub level_m: f64,
    pub v2_mps: f64,
    pub fraction_drained: f64,
}

impl From<&dt_sim::DrainProgress> for DrainStepProgress {
    fn from(p: &dt_sim::DrainProgress) -> Self {
        Self {
            step: p.step,
            sim_time_s: p.time_s,
            time_cap_s: p.time_cap_s,
            level_m: p.level_m,
            v2_mps: p.v2_mps,
            fraction_drained: p.fraction_drained,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub tube_length_m: f64,
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub drain: Option<DrainStepProgress>,
}

impl RunProgressEvent {
    pub fn stage(
        tube_length_m: f64,
        stage: RunStage,
        elapsed_wall_s: f64,
        message: Option<String>,
    ) -> Self {
        Self {
            tube_length_m,
            stage,
            elapsed_wall_s,
            message,
            drain: None,
        }
    }
}
