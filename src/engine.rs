//! The diagnose-and-remediate orchestrator.
//!
//! `Engine::diagnose` is the single entry point: classify the query, take a
//! snapshot, and depending on the intent either answer with status, fetch
//! advice, or plan and run fixes under the interface lock. Operational
//! problems end up inside the report; only a broken setup is an `Err`.

use crate::config::Config;
use crate::diagnostics::{Collector, CollectorSettings, DiagnosticSnapshot, NetworkState};
use crate::error::EngineError;
use crate::intent::{Classification, Intent, IssueTag, classify};
use crate::knowledge::{KnowledgeRetriever, StaticKnowledgeBase};
use crate::remediation::{
    ActionId, ActionRegistry, BandComparator, ExecutionSummary, Executor, FixAction,
    InterfaceGuard, InterfaceLocks, Planner, RemediationEvent, event_channel,
};
use crate::report::{RemediationReport, RunOutcome, Synthesis, synthesize};
use crate::runner::{CommandRunner, SystemCommandRunner};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Classification and plan for a query, computed without changing anything.
#[derive(Debug, Clone)]
pub struct PlanPreview {
    pub classification: Classification,
    pub intent: Intent,
    pub tags: BTreeSet<IssueTag>,
    pub state: NetworkState,
    pub actions: Vec<FixAction>,
}

#[derive(Default)]
pub struct EngineBuilder {
    config: Option<Config>,
    runner: Option<Arc<dyn CommandRunner>>,
    retriever: Option<Arc<dyn KnowledgeRetriever>>,
    registry: Option<ActionRegistry>,
    locks: Option<Arc<InterfaceLocks>>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn retriever(mut self, retriever: Arc<dyn KnowledgeRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use a private lock table instead of the process-wide one.
    pub fn locks(mut self, locks: Arc<InterfaceLocks>) -> Self {
        self.locks = Some(locks);
        self
    }

    pub fn build(self) -> Result<Engine, EngineError> {
        let runner = self
            .runner
            .ok_or(EngineError::MissingCollaborator("command runner"))?;
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let registry = match self.registry {
            Some(registry) => registry,
            None => ActionRegistry::builtin()?,
        }
        .with_rank_overrides(&config.remediation.disruption_ranks)?;

        let collector = Collector::new(Arc::clone(&runner), CollectorSettings::from_config(&config));
        let comparator = BandComparator::new(
            Arc::clone(&runner),
            collector.clone(),
            config.remediation.action_timeout(),
            config.band.noise_threshold_pct,
        );
        let executor = Executor::new(
            Arc::clone(&runner),
            collector.clone(),
            comparator,
            config.remediation.action_timeout(),
        );
        let planner = Planner::new(Arc::new(registry), &config.remediation);

        tracing::debug!(
            runner = runner.name(),
            interface = %config.network.interface,
            "engine ready"
        );

        Ok(Engine {
            retriever: self
                .retriever
                .unwrap_or_else(|| Arc::new(StaticKnowledgeBase::new())),
            locks: self.locks.unwrap_or_else(InterfaceLocks::global),
            config: Arc::new(config),
            runner,
            collector,
            planner,
            executor,
        })
    }
}

pub struct Engine {
    config: Arc<Config>,
    runner: Arc<dyn CommandRunner>,
    retriever: Arc<dyn KnowledgeRetriever>,
    collector: Collector,
    planner: Planner,
    executor: Executor,
    locks: Arc<InterfaceLocks>,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// An engine driving the host's own network tools.
    pub fn system(config: Config) -> Result<Self, EngineError> {
        let runner = Arc::new(SystemCommandRunner::from_config(&config));
        Self::builder().config(config).runner(runner).build()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot only; never changes anything.
    pub async fn status(&self, allow_slow: bool) -> DiagnosticSnapshot {
        self.collector.collect(allow_slow).await
    }

    /// Classify and plan without running anything.
    pub async fn plan(&self, query: &str) -> PlanPreview {
        let classification = classify(query);
        let before = self.collector.collect(false).await;
        let tags = self.effective_tags(&classification, &before);
        let state = before.network_state();
        let actions = if classification.intent == Intent::Fix {
            self.planner.plan(&tags, &state, self.runner.as_ref())
        } else {
            Vec::new()
        };
        let intent = if classification.intent == Intent::Fix && actions.is_empty() {
            Intent::Suggestion
        } else {
            classification.intent
        };
        PlanPreview {
            classification,
            intent,
            tags,
            state,
            actions,
        }
    }

    /// Answer `query`. Always returns a report unless the engine itself is
    /// misconfigured.
    pub async fn diagnose(
        &self,
        query: &str,
        allow_slow: bool,
    ) -> Result<RemediationReport, EngineError> {
        let started = Instant::now();
        let classification = classify(query);
        tracing::info!(
            intent = %classification.intent,
            tags = ?classification.tags,
            rule = ?classification.rule,
            "query classified"
        );

        let before = self.collector.collect(allow_slow).await;
        let tags = self.effective_tags(&classification, &before);
        let mut warnings = Vec::new();
        let mut intent = classification.intent;
        let mut plan = Vec::new();
        let mut execution = ExecutionSummary::default();
        let mut knowledge = None;
        let mut outcome = RunOutcome::NotAttempted;

        if intent == Intent::Fix {
            let state = before.network_state();
            plan = self.planner.plan(&tags, &state, self.runner.as_ref());
            if plan.is_empty() {
                tracing::info!(tags = ?tags, "no applicable fix action, answering with advice");
                intent = Intent::Suggestion;
            } else {
                let deadline = started + self.config.remediation.deadline();
                (execution, outcome) = self
                    .remediate(&plan, &state, deadline, &mut warnings)
                    .await?;
            }
        }

        if intent == Intent::Suggestion {
            knowledge = self.lookup_knowledge(query, &mut warnings).await;
        }

        Ok(synthesize(Synthesis {
            query,
            classification,
            intent,
            tags,
            before,
            plan: &plan,
            execution,
            knowledge,
            outcome,
            warnings,
        }))
    }

    /// Tags to plan for. A fix request that names no specific symptom is
    /// planned against what the snapshot shows.
    fn effective_tags(
        &self,
        classification: &Classification,
        before: &DiagnosticSnapshot,
    ) -> BTreeSet<IssueTag> {
        let mut tags = classification.tags.clone();
        if classification.intent == Intent::Fix && tags.iter().all(|t| *t == IssueTag::Unknown) {
            tags.extend(before.observed_issues());
        }
        tags
    }

    async fn lookup_knowledge(&self, query: &str, warnings: &mut Vec<String>) -> Option<String> {
        match self.retriever.lookup(query).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(retriever = self.retriever.name(), error = %e, "knowledge lookup failed");
                warnings.push(format!("knowledge lookup failed: {e}"));
                None
            }
        }
    }

    async fn remediate(
        &self,
        plan: &[FixAction],
        state: &NetworkState,
        deadline: Instant,
        warnings: &mut Vec<String>,
    ) -> Result<(ExecutionSummary, RunOutcome), EngineError> {
        let remediation = &self.config.remediation;
        let wait = remediation
            .lock_wait()
            .min(deadline.saturating_duration_since(Instant::now()));
        let guard = match self
            .locks
            .acquire(&state.interface, remediation.lock_mode, wait)
            .await
        {
            Ok(guard) => guard,
            Err(contention) => {
                tracing::warn!(interface = %contention.interface, "lock contention, not remediating");
                warnings.push(contention.to_string());
                let summary = ExecutionSummary {
                    skipped: plan.iter().map(|a| a.id).collect(),
                    ..ExecutionSummary::default()
                };
                return Ok((summary, RunOutcome::RemediationInProgress));
            }
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        self.run_guarded(plan, state, guard, remaining, warnings).await
    }

    /// Run the plan on a separate task that owns the interface guard. If the
    /// deadline passes first, the task is told to stop before its next
    /// action and left to finish the current one on its own.
    async fn run_guarded(
        &self,
        plan: &[FixAction],
        state: &NetworkState,
        guard: InterfaceGuard,
        remaining: Duration,
        warnings: &mut Vec<String>,
    ) -> Result<(ExecutionSummary, RunOutcome), EngineError> {
        let cancel = CancellationToken::new();
        let (tx, mut rx) = event_channel();
        let task = {
            let executor = self.executor.clone();
            let plan = plan.to_vec();
            let state = state.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let _guard = guard;
                executor.execute(&plan, &state, &cancel, &tx).await
            })
        };

        match tokio::time::timeout(remaining, task).await {
            Ok(Ok(summary)) => Ok((summary, RunOutcome::Completed)),
            Ok(Err(e)) => Err(EngineError::Internal(format!("remediation task failed: {e}"))),
            Err(_) => {
                cancel.cancel();
                let mut partial = ExecutionSummary::default();
                let mut in_flight: Option<ActionId> = None;
                while let Ok(event) = rx.try_recv() {
                    match event {
                        RemediationEvent::ActionStarted { action_id } => in_flight = Some(action_id),
                        RemediationEvent::ActionFinished { result } => {
                            in_flight = None;
                            partial.attempts.push(result);
                        }
                        RemediationEvent::ActionSkipped { .. } => {}
                        RemediationEvent::AfterSnapshot { snapshot } => partial.after = Some(*snapshot),
                    }
                }
                partial.skipped = plan
                    .iter()
                    .map(|a| a.id)
                    .filter(|id| {
                        Some(*id) != in_flight && !partial.attempts.iter().any(|r| r.action_id == *id)
                    })
                    .collect();

                tracing::warn!(
                    finished = partial.attempts.len(),
                    in_flight = ?in_flight,
                    skipped = ?partial.skipped,
                    "remediation deadline exceeded, returning partial report"
                );
                warnings.push("remediation deadline exceeded; report is partial".into());
                if let Some(id) = in_flight {
                    warnings.push(format!("{id} was still running and has been left to complete"));
                }
                Ok((partial, RunOutcome::DeadlineExceeded))
            }
        }
    }
}
