//! Planner policy configuration.

use chrono::Duration;

use crate::error::{PlanError, PlanResult};
use crate::time::WorkingHours;

/// Policy values used by the [`Planner`](crate::Planner).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// The daily window within which placements are preferred.
    pub working_hours: WorkingHours,
    /// Gap left after the last existing event when a new event cannot be
    /// placed in any free slot.
    pub overflow_gap: Duration,
    /// Buffer between re-placed meetings when the caller does not pass one.
    pub default_buffer: Duration,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            working_hours: WorkingHours::default(),
            overflow_gap: Duration::minutes(5),
            default_buffer: Duration::minutes(15),
        }
    }
}

impl PlannerConfig {
    /// Builder: set working hours.
    #[must_use]
    pub fn with_working_hours(mut self, hours: WorkingHours) -> Self {
        self.working_hours = hours;
        self
    }

    /// Builder: set the overflow gap.
    #[must_use]
    pub fn with_overflow_gap(mut self, gap: Duration) -> Self {
        self.overflow_gap = gap;
        self
    }

    /// Builder: set the default buffer.
    #[must_use]
    pub fn with_default_buffer(mut self, buffer: Duration) -> Self {
        self.default_buffer = buffer;
        self
    }

    /// Checks that the working window is non-empty and durations are not
    /// negative.
    pub fn validate(&self) -> PlanResult<()> {
        self.working_hours.validate()?;
        if self.overflow_gap < Duration::zero() {
            return Err(PlanError::invalid_duration("overflow gap", self.overflow_gap));
        }
        if self.default_buffer < Duration::zero() {
            return Err(PlanError::invalid_duration(
                "default buffer",
                self.default_buffer,
            ));
        }
        Ok(())
    }
}
