//! Research service orchestrating one reasoned research run
//!
//! A run is a single sequential pipeline: plan, planned searches, analyses,
//! gap analysis, then (advanced depth with gaps only) gap-driven searches and
//! a final synthesis. Every transition is reported through a
//! [`ProgressEmitter`]. Search failures are recorded on the result and the run
//! continues; plan and reasoning failures end the run after an error event.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::Utc;
use reason_core::{
    AnalysisStage, Depth, EventKind, QuerySource, ResearchError, ResultSource, RunResult,
    SearchQuery, SearchResultGroup, Step, StepId, StepKind, StepOutcome, StepPhase,
};
use reason_research::{
    academic_search, analyze_gaps, gap_queries, generate_plan, results_for_priority,
    run_analysis, sequence_plan, should_deepen, synthesize, web_search, AcademicSearchProvider,
    ExaClient, OpenAIClient, StructuredGenerator, TavilyClient, WebSearchProvider,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::config::ResearchConfig;
use crate::progress::{ProgressEmitter, ProgressSink, StepUpdate};
use crate::run_state::RunState;

/// Service running reasoned research against external search and LLM providers
#[derive(Clone)]
pub struct ResearchService {
    generator: Arc<dyn StructuredGenerator>,
    web: Arc<dyn WebSearchProvider>,
    academic: Arc<dyn AcademicSearchProvider>,
    config: ResearchConfig,
}

/// One search to execute, planned or gap-driven
struct SearchTask<'q> {
    id: StepId,
    source: ResultSource,
    query: &'q SearchQuery,
    max_results: u32,
}

impl SearchTask<'_> {
    fn is_gap(&self) -> bool {
        self.id.phase == StepPhase::GapSearch
    }

    fn running_update(&self) -> StepUpdate {
        let q = &self.query.query;
        let (title, message) = match (self.is_gap(), self.source) {
            (false, ResultSource::Web) => (
                format!("Searching the web for \"{}\"", q),
                format!("Searching {} sources...", source_label(self.query.source)),
            ),
            (false, ResultSource::Academic) => (
                format!("Searching academic papers for \"{}\"", q),
                format!("Searching {} sources...", source_label(self.query.source)),
            ),
            (true, ResultSource::Web) => (
                format!("Additional search for \"{}\"", q),
                format!("Searching to fill knowledge gap: {}", self.query.rationale),
            ),
            (true, ResultSource::Academic) => (
                format!("Additional academic search for \"{}\"", q),
                format!(
                    "Searching academic sources to fill knowledge gap: {}",
                    self.query.rationale
                ),
            ),
        };
        StepUpdate::new(self.id, self.source.into(), title, message).query(q)
    }

    fn completed_update(&self, found: usize) -> StepUpdate {
        let q = &self.query.query;
        let (title, message) = match (self.is_gap(), self.source) {
            (false, ResultSource::Web) => (
                format!("Searched the web for \"{}\"", q),
                format!("Found {} results", found),
            ),
            (false, ResultSource::Academic) => (
                format!("Searched academic papers for \"{}\"", q),
                format!("Found {} results", found),
            ),
            (true, ResultSource::Web) => (
                format!("Additional web search for \"{}\"", q),
                format!("Found {} results", found),
            ),
            (true, ResultSource::Academic) => (
                format!("Additional academic search for \"{}\"", q),
                format!("Found {} academic sources", found),
            ),
        };
        StepUpdate::new(self.id, self.source.into(), title, message).query(q)
    }

    fn error_update(&self, reason: &str) -> StepUpdate {
        StepUpdate::new(
            self.id,
            self.source.into(),
            format!("Search failed for \"{}\"", self.query.query),
            format!("No results recorded: {}", reason),
        )
        .query(&self.query.query)
    }
}

fn source_label(source: QuerySource) -> &'static str {
    match source {
        QuerySource::Web => "web",
        QuerySource::Academic => "academic",
        QuerySource::Both => "both",
    }
}

/// Everything a phase needs besides the service itself
struct Run<'a> {
    emitter: &'a ProgressEmitter,
    cancel: &'a CancellationToken,
    state: RunState,
}

impl ResearchService {
    pub fn new(
        generator: Arc<dyn StructuredGenerator>,
        web: Arc<dyn WebSearchProvider>,
        academic: Arc<dyn AcademicSearchProvider>,
        config: ResearchConfig,
    ) -> Self {
        Self {
            generator,
            web,
            academic,
            config,
        }
    }

    /// Create a service backed by Tavily, Exa and OpenAI
    ///
    /// Requires TAVILY_API_KEY, EXA_API_KEY and OPENAI_API_KEY environment variables to be set.
    pub fn from_env() -> Result<Self, ResearchError> {
        let config = ResearchConfig::from_env()?;
        let web = TavilyClient::new()?;
        let academic = ExaClient::new()?;
        let generator = OpenAIClient::new()?;

        info!(
            "Research service configured (model: {}, accounting: {:?})",
            generator.model(),
            config.step_accounting
        );

        Ok(Self::new(
            Arc::new(generator),
            Arc::new(web),
            Arc::new(academic),
            config,
        ))
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Run one research pipeline, reporting progress to `sink`
    pub async fn run_research(
        &self,
        topic: &str,
        depth: Depth,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<RunResult, ResearchError> {
        self.run_research_with_cancel(topic, depth, sink, CancellationToken::new())
            .await
    }

    /// Like [`run_research`](Self::run_research), stopping early once `cancel` fires
    #[instrument(skip(self, sink, cancel))]
    pub async fn run_research_with_cancel(
        &self,
        topic: &str,
        depth: Depth,
        sink: Arc<dyn ProgressSink>,
        cancel: CancellationToken,
    ) -> Result<RunResult, ResearchError> {
        let emitter = ProgressEmitter::new(sink);
        let progress = StepUpdate::new(
            StepId::PROGRESS,
            EventKind::Progress,
            "Research Progress",
            "Research started",
        );
        emitter.running(progress.clone());

        let mut run = Run {
            emitter: &emitter,
            cancel: &cancel,
            state: RunState::new(depth, self.config.step_accounting),
        };

        match self.run_pipeline(&mut run, topic).await {
            Ok(result) => {
                info!(
                    "Research complete: {} result groups, {} failed steps",
                    result.results.len(),
                    result.failed_steps.len()
                );
                Ok(result)
            }
            Err(e) => {
                error!("Research failed: {}", e);
                let (completed, total) = (run.state.completed_steps(), run.state.reported_total());
                emitter.errored(
                    progress
                        .title("Research failed")
                        .message(format!("Research stopped: {}", e))
                        .counts(completed, total),
                    e.to_string(),
                );
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self, run: &mut Run<'_>, topic: &str) -> Result<RunResult, ResearchError> {
        let depth = run.state.depth();

        // Step 1: Plan
        let plan_update = StepUpdate::new(
            StepId::PLAN,
            EventKind::Plan,
            "Research Plan",
            "Creating research plan...",
        );
        run.emitter.running(plan_update.clone());

        let today = Utc::now().date_naive();
        let plan = match self
            .guarded(
                run.cancel,
                self.config.generation_timeout,
                generate_plan(self.generator.as_ref(), topic, today),
            )
            .await
        {
            Ok(plan) => plan,
            Err(e) => {
                let e = as_plan_error(e);
                run.emitter.errored(plan_update, e.to_string());
                return Err(e);
            }
        };

        // Step 2: Sequence
        let sequence = sequence_plan(&plan);
        run.state.set_planned_steps(sequence.total_steps());
        info!(
            "Plan expands to {} search steps and {} analysis steps",
            sequence.search_steps.len(),
            sequence.analysis_steps.len()
        );

        run.emitter.completed(
            plan_update
                .message("Research plan created")
                .counts(0, run.state.planned_steps()),
            Some(StepOutcome::Plan {
                plan: plan.clone(),
                total_steps: run.state.planned_steps(),
            }),
        );

        // Step 3: Planned searches, in step order
        for step in &sequence.search_steps {
            if let StepKind::Search { source, query } = &step.kind {
                let cap = match source {
                    ResultSource::Web => self.config.web_result_cap,
                    ResultSource::Academic => self.config.academic_result_cap,
                };
                let task = SearchTask {
                    id: step.id,
                    source: *source,
                    query,
                    max_results: results_for_priority(query.priority, cap),
                };
                self.execute_search(run, &task).await?;
                run.state.advance_search_index();
                run.state.complete_step();
            }
        }

        // Step 4: Analyses, in plan order
        for step in &sequence.analysis_steps {
            self.execute_analysis(run, step).await?;
            run.state.complete_step();
        }

        // Step 5: Gap analysis
        let gap_update = StepUpdate::new(
            StepId::GAP_ANALYSIS,
            EventKind::Analysis,
            "Research Gaps and Limitations",
            "Analyzing research gaps and limitations...",
        )
        .analysis_type("gaps");
        run.emitter.running(gap_update.clone());

        let gaps = match self
            .guarded(
                run.cancel,
                self.config.generation_timeout,
                analyze_gaps(
                    self.generator.as_ref(),
                    run.state.results(),
                    &plan.required_analyses,
                ),
            )
            .await
        {
            Ok(gaps) => gaps,
            Err(e) => {
                let e = as_analysis_error(AnalysisStage::GapAnalysis, e);
                run.emitter.errored(gap_update, e.to_string());
                return Err(e);
            }
        };
        run.state.complete_step();

        let (completed, total) = run.state.gap_analysis_counts();
        run.emitter.completed(
            gap_update
                .message(format!(
                    "Identified {} limitations and {} knowledge gaps",
                    gaps.limitations.len(),
                    gaps.knowledge_gaps.len()
                ))
                .counts(completed, total),
            Some(StepOutcome::gaps(&gaps)),
        );

        // Step 6: Deepening loop and synthesis (advanced depth with gaps only)
        let mut synthesis = None;
        if should_deepen(depth, &gaps) {
            let additional = gap_queries(&gaps, self.config.gap_query_priority);
            // Each gap query plus the synthesis
            run.state.discover_steps(additional.len() + 1);
            info!("Deepening research with {} gap queries", additional.len());

            for query in &additional {
                for &source in query.source.providers() {
                    let max_results = match source {
                        ResultSource::Web => self.config.gap_web_results,
                        ResultSource::Academic => self.config.gap_academic_results,
                    };
                    let task = SearchTask {
                        id: run.state.next_gap_search_id(source),
                        source,
                        query,
                        max_results,
                    };
                    self.execute_search(run, &task).await?;
                }
                run.state.complete_step();
            }

            let synthesis_update = StepUpdate::new(
                StepId::SYNTHESIS,
                EventKind::Analysis,
                "Final Research Synthesis",
                "Synthesizing all research findings...",
            )
            .analysis_type("synthesis");
            run.emitter.running(synthesis_update.clone());

            let result = match self
                .guarded(
                    run.cancel,
                    self.config.generation_timeout,
                    synthesize(
                        self.generator.as_ref(),
                        run.state.results(),
                        &gaps,
                        &additional,
                    ),
                )
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    let e = as_analysis_error(AnalysisStage::Synthesis, e);
                    run.emitter.errored(synthesis_update, e.to_string());
                    return Err(e);
                }
            };
            run.state.complete_step();

            let (completed, total) = run.state.synthesis_counts();
            run.emitter.completed(
                synthesis_update
                    .message(format!(
                        "Synthesized {} key findings",
                        result.key_findings.len()
                    ))
                    .counts(completed, total),
                Some(StepOutcome::synthesis(&result)),
            );
            synthesis = Some(result);
        }

        // Final progress update
        let (completed, total) = run.state.final_counts();
        run.emitter.completed(
            StepUpdate::new(
                StepId::PROGRESS,
                EventKind::Progress,
                "Research Progress",
                "Research complete",
            )
            .counts(completed, total)
            .finished(),
            None,
        );

        let (results, failed_steps) = run.state.take_parts();

        Ok(RunResult {
            plan,
            results,
            synthesis,
            failed_steps,
        })
    }

    /// Run one search step. Provider failures and timeouts are recorded and
    /// swallowed; only cancellation is returned as an error.
    async fn execute_search(&self, run: &mut Run<'_>, task: &SearchTask<'_>) -> Result<(), ResearchError> {
        run.emitter.running(task.running_update());

        let query = task.query.query.as_str();
        let outcome = match task.source {
            ResultSource::Web => {
                self.guarded(
                    run.cancel,
                    self.config.search_timeout,
                    web_search(self.web.as_ref(), query, run.state.depth(), task.max_results),
                )
                .await
            }
            ResultSource::Academic => {
                self.guarded(
                    run.cancel,
                    self.config.search_timeout,
                    academic_search(self.academic.as_ref(), query, task.max_results),
                )
                .await
            }
        };

        let (records, failure) = match outcome {
            Ok(records) => (records, None),
            Err(ResearchError::Cancelled) => {
                run.emitter
                    .errored(task.error_update("cancelled"), "cancelled");
                return Err(ResearchError::Cancelled);
            }
            Err(e) => {
                let reason = e.to_string();
                warn!("Search step {} failed: {}", task.id, reason);
                (Vec::new(), Some(reason))
            }
        };

        match failure {
            None => {
                run.emitter.completed(
                    task.completed_update(records.len()),
                    Some(StepOutcome::Results(records.clone())),
                );
            }
            Some(reason) => {
                run.emitter
                    .errored(task.error_update(&reason), reason.clone());
                run.state.record_failure(task.id, reason);
            }
        }

        run.state.push_results(SearchResultGroup {
            source: task.source,
            query: task.query.clone(),
            results: records,
        });

        Ok(())
    }

    async fn execute_analysis(&self, run: &mut Run<'_>, step: &Step) -> Result<(), ResearchError> {
        let StepKind::Analysis(analysis) = &step.kind else {
            return Err(ResearchError::internal(format!(
                "step {} is not an analysis",
                step.id
            )));
        };

        let kind = &analysis.analysis_type;
        let update = StepUpdate::new(
            step.id,
            EventKind::Analysis,
            format!("Analyzing {}", kind),
            format!("Analyzing {}...", kind),
        )
        .analysis_type(kind);
        run.emitter.running(update.clone());

        let result = match self
            .guarded(
                run.cancel,
                self.config.generation_timeout,
                run_analysis(self.generator.as_ref(), analysis, run.state.results()),
            )
            .await
        {
            Ok(result) => result,
            Err(e) => {
                let e = as_analysis_error(AnalysisStage::Analysis, e);
                run.emitter.errored(update, e.to_string());
                return Err(e);
            }
        };

        run.emitter.completed(
            update
                .title(format!("Analysis of {} complete", kind))
                .message("Analysis complete"),
            Some(StepOutcome::Findings(result.findings)),
        );
        Ok(())
    }

    /// Await an external call under the run's cancellation token and a timeout
    async fn guarded<T, F>(
        &self,
        cancel: &CancellationToken,
        limit: Duration,
        call: F,
    ) -> Result<T, ResearchError>
    where
        F: Future<Output = Result<T, ResearchError>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ResearchError::Cancelled),
            outcome = tokio::time::timeout(limit, call) => match outcome {
                Ok(result) => result,
                Err(_) => Err(ResearchError::Timeout(limit)),
            },
        }
    }
}

fn as_plan_error(e: ResearchError) -> ResearchError {
    match e {
        ResearchError::Cancelled | ResearchError::PlanGeneration(_) => e,
        other => ResearchError::plan_generation(other.to_string()),
    }
}

fn as_analysis_error(stage: AnalysisStage, e: ResearchError) -> ResearchError {
    match e {
        ResearchError::Cancelled | ResearchError::AnalysisGeneration { .. } => e,
        other => ResearchError::analysis_generation(stage, other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping_preserves_cancellation() {
        assert!(as_plan_error(ResearchError::Cancelled).is_cancellation());
        assert!(matches!(
            as_plan_error(ResearchError::Timeout(Duration::from_secs(1))),
            ResearchError::PlanGeneration(msg) if msg.contains("Timed out")
        ));
        assert!(matches!(
            as_analysis_error(AnalysisStage::Synthesis, ResearchError::api("500")),
            ResearchError::AnalysisGeneration { stage: AnalysisStage::Synthesis, .. }
        ));
    }

    #[test]
    fn test_search_task_titles() {
        let query = SearchQuery {
            query: "lithium recycling".to_string(),
            rationale: "no cost data".to_string(),
            source: QuerySource::Both,
            priority: 3,
        };
        let planned = SearchTask {
            id: StepId::search(ResultSource::Academic, 2),
            source: ResultSource::Academic,
            query: &query,
            max_results: 3,
        };
        assert_eq!(
            planned.running_update().title,
            "Searching academic papers for \"lithium recycling\""
        );
        assert_eq!(planned.running_update().message, "Searching both sources...");

        let gap = SearchTask {
            id: StepId::gap_search(ResultSource::Academic, 9),
            source: ResultSource::Academic,
            query: &query,
            max_results: 3,
        };
        assert_eq!(
            gap.running_update().message,
            "Searching academic sources to fill knowledge gap: no cost data"
        );
        assert_eq!(gap.completed_update(2).message, "Found 2 academic sources");
    }
}
