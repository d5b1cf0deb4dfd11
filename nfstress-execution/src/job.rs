//! Per-job preparation: identifier draw, target selection, payload build

use nfstress_core::{
    random_uuid, IdentifierSource, JobDraw, JobSpec, PayloadSynthesizer, RequestPayload, Scenario,
    TargetSelector,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Everything the dispatcher needs to run one job
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedJob {
    pub spec: JobSpec,
    /// Execution context (sender container) issuing the request
    pub context: String,
    pub payload: RequestPayload,
    pub labels: Vec<(String, String)>,
}

/// Produces jobs on admission
///
/// The dispatcher calls `prepare` once per index, in index order, from a
/// single task; implementations may keep mutable state.
pub trait JobFactory: Send {
    fn prepare(&mut self, spec: JobSpec) -> PreparedJob;
}

impl<F> JobFactory for F
where
    F: FnMut(JobSpec) -> PreparedJob + Send,
{
    fn prepare(&mut self, spec: JobSpec) -> PreparedJob {
        self(spec)
    }
}

/// Builds jobs for one stress scenario
///
/// Owns the identifier source and the RNG, so with a fixed seed the whole
/// stream of identifiers, senders, targets and embedded UUIDs repeats.
pub struct ScenarioJobFactory {
    scenario: Scenario,
    selector: TargetSelector,
    identifiers: Option<IdentifierSource>,
    synthesizer: PayloadSynthesizer,
    rng: StdRng,
}

impl ScenarioJobFactory {
    pub fn new(
        scenario: Scenario,
        selector: TargetSelector,
        identifiers: Option<IdentifierSource>,
        synthesizer: PayloadSynthesizer,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            scenario,
            selector,
            identifiers,
            synthesizer,
            rng,
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn selector(&self) -> &TargetSelector {
        &self.selector
    }

    fn next_identifier(&mut self) -> Option<String> {
        match self.scenario {
            // Registrations are keyed by a fresh NF instance id
            Scenario::Registration => Some(random_uuid(&mut self.rng).to_string()),
            _ => self
                .identifiers
                .as_mut()
                .map(|source| source.next_id(&mut self.rng)),
        }
    }
}

impl JobFactory for ScenarioJobFactory {
    fn prepare(&mut self, spec: JobSpec) -> PreparedJob {
        let selection = self.selector.select(&mut self.rng);
        let identifier = self.next_identifier();
        let draw = JobDraw::new(selection, identifier);
        let payload = self.synthesizer.build(self.scenario, &draw, &mut self.rng);

        PreparedJob {
            spec,
            context: draw.sender.clone(),
            labels: draw.labels(self.scenario),
            payload,
        }
    }
}
