#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    name: String,          // Unique identifier for the job
    deadline: f64,         // d_j : Time by which the job should complete
    penalty: f64,          // p_j : Paid when the job is rejected
    tardiness_weight: f64, // w_j : Paid per time unit past the deadline
}

impl Job {
    pub fn new(name: impl Into<String>, deadline: f64, penalty: f64, tardiness_weight: f64) -> Self {
        Self {
            name: name.into(),
            deadline,
            penalty,
            tardiness_weight,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    pub fn tardiness_weight(&self) -> f64 {
        self.tardiness_weight
    }

    /// Lateness of a run that takes `duration` time units.
    pub fn tardiness_for(&self, duration: f64) -> f64 {
        (duration - self.deadline).max(0.0)
    }
}
