//! Scenarios: a city configuration plus a script of steps
//!
//! Scenarios are plain JSON so runs can be stored and replayed:
//!
//! ```json
//! {
//!   "config": { "neighborhoods": [{ "id": 1, "name": "Centro" }], "units": [] },
//!   "steps": [
//!     { "step": "receive", "neighborhood_id": 1, "category": "fire", "severity": 2 },
//!     { "step": "dispatch" },
//!     { "step": "advance", "ticks": 3 }
//!   ]
//! }
//! ```

use crate::dispatch::{Dispatch, DispatchConfig, DispatchEngine, DispatchError};
use crate::models::incident::{IncidentId, ServiceCategory, Severity};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One scripted action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Report a new incident at the current tick
    Receive {
        neighborhood_id: i32,
        category: ServiceCategory,
        severity: Severity,
    },

    /// One matching round without advancing time
    Dispatch,

    /// Run `ticks` full ticks
    Advance { ticks: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: DispatchConfig,

    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

/// What happened while a scenario's steps were applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// Ids assigned to accepted arrivals, in arrival order
    pub accepted: Vec<IncidentId>,

    /// Arrivals skipped because the engine refused them
    pub rejected: usize,

    pub dispatches: Vec<Dispatch>,

    /// Unit ids in release order (a unit may appear more than once)
    pub released: Vec<u32>,
}

impl Scenario {
    /// The built-in demonstration run on [`DispatchConfig::city_default`]
    pub fn demo() -> Self {
        use ServiceCategory::{Fire, Medical, Police};
        use Severity::{High, Low, Medium};

        let receive = |neighborhood_id, category, severity| ScenarioStep::Receive {
            neighborhood_id,
            category,
            severity,
        };

        Self {
            config: DispatchConfig::city_default(),
            steps: vec![
                receive(1, Medical, High),
                receive(2, Fire, Medium),
                receive(3, Police, Low),
                receive(1, Medical, Medium),
                receive(4, Fire, High),
                ScenarioStep::Dispatch,
                ScenarioStep::Advance { ticks: 3 },
                receive(5, Police, High),
                receive(2, Medical, Low),
                ScenarioStep::Advance { ticks: 5 },
            ],
        }
    }

    /// Parse a scenario from JSON text
    pub fn from_json(json: &str) -> Result<Self, DispatchError> {
        serde_json::from_str(json)
            .map_err(|e| DispatchError::Serialization(format!("scenario: {}", e)))
    }

    /// Append an `advance` step (no-op for zero ticks)
    pub fn with_extra_ticks(mut self, ticks: u32) -> Self {
        if ticks > 0 {
            self.steps.push(ScenarioStep::Advance { ticks });
        }
        self
    }

    /// Build an engine from the config and apply every step
    pub fn run(&self) -> Result<(DispatchEngine, ScenarioReport), DispatchError> {
        let mut engine = DispatchEngine::new(self.config.clone())?;
        let report = self.apply(&mut engine);
        Ok((engine, report))
    }

    /// Apply the steps to an existing engine
    ///
    /// Rejected arrivals are logged and skipped; they never abort the run.
    pub fn apply(&self, engine: &mut DispatchEngine) -> ScenarioReport {
        let mut report = ScenarioReport::default();

        for step in &self.steps {
            match *step {
                ScenarioStep::Receive {
                    neighborhood_id,
                    category,
                    severity,
                } => match engine.receive_incident(neighborhood_id, category, severity) {
                    Ok(id) => report.accepted.push(id),
                    Err(err) => {
                        warn!(neighborhood_id, %category, %err, "Skipping rejected arrival");
                        report.rejected += 1;
                    }
                },
                ScenarioStep::Dispatch => {
                    report.dispatches.extend(engine.process_dispatches());
                }
                ScenarioStep::Advance { ticks } => {
                    for result in engine.advance_time(ticks) {
                        report.released.extend(result.released);
                        report.dispatches.extend(result.dispatched);
                    }
                }
            }
        }

        info!(
            accepted = report.accepted.len(),
            rejected = report.rejected,
            dispatches = report.dispatches.len(),
            tick = engine.current_tick(),
            "Scenario complete"
        );
        report
    }
}
