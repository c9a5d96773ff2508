use crate::fetch::Fetch;
use crate::sink::{persist, PersistOutcome, Sink};
use crate::sources::{collect, Source};
use chrono::{DateTime, Utc};
use log::info;
use std::fmt;

/// How a run went, one outcome per source in the order they ran
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<(&'static str, PersistOutcome)>,
}

impl RunReport {
    pub fn written(&self) -> usize {
        self.count(|outcome| matches!(outcome, PersistOutcome::Written { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| *outcome == PersistOutcome::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, PersistOutcome::Failed(_)))
    }

    fn count<P: Fn(&PersistOutcome) -> bool>(&self, predicate: P) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }

    pub fn outcome(&self, name: &str) -> Option<&PersistOutcome> {
        self.outcomes
            .iter()
            .find(|(source, _)| *source == name)
            .map(|(_, outcome)| outcome)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Run finished in {}s: {} written, {} skipped, {} failed",
            (self.finished_at - self.started_at).num_seconds(),
            self.written(),
            self.skipped(),
            self.failed()
        )?;
        for (name, outcome) in &self.outcomes {
            writeln!(f, "  {}: {}", name, outcome)?;
        }
        Ok(())
    }
}

/// Collects and stores every source, strictly one after the other. Nothing in here fails, a
/// source that goes wrong is only a line in the report.
pub async fn run<F, S>(fetcher: &F, sink: &mut S, sources: &[Source]) -> RunReport
where
    F: Fetch + ?Sized,
    S: Sink + ?Sized,
{
    let started_at = Utc::now();
    let mut outcomes = Vec::with_capacity(sources.len());
    for source in sources {
        info!("Collecting {}", source.name);
        let dataset = collect(fetcher, source).await;
        let outcome = persist(sink, source.name, &dataset).await;
        outcomes.push((source.name, outcome));
    }
    RunReport {
        started_at,
        finished_at: Utc::now(),
        outcomes,
    }
}
