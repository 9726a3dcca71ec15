//! The deep-research iteration loop
//!
//! Rounds are strictly sequential: build queries, search wide, integrate
//! findings, analyze gaps, check convergence, optionally suspend for
//! guidance. The loop always exits with a completion reason; partial
//! failures inside a round are absorbed, never surfaced.

use super::convergence::ConvergenceDetector;
use super::gaps::{CoverageGap, GapAnalyzer};
use super::integrator::FindingIntegrator;
use super::queries::QueryGenerator;
use super::types::{
    CompletionReason, DeepResearchQuery, DeepResearchResult, GuidanceAction, IterationRecord,
    Phase, ResearchProgress, ResearchStatistics, SourceRef, UserGuidance,
};
use crate::agent::Finding;
use crate::cancel::CancellationToken;
use crate::graph::{GraphSnapshot, KnowledgeGraph, NodeKind};
use crate::wide::{ResearchError, WideResearchEngine, WideResearchQuery};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Queries run through the wide engine per round.
const MAX_QUERIES_PER_ROUND: usize = 3;

/// Buffered progress events before emission applies backpressure.
const PROGRESS_CHANNEL_CAPACITY: usize = 32;

/// Top-level iteration controller.
pub struct DeepResearchOrchestrator {
    engine: Arc<WideResearchEngine>,
    graph: Arc<dyn KnowledgeGraph>,
    integrator: Arc<FindingIntegrator>,
    gap_analyzer: Arc<GapAnalyzer>,
    query_generator: Arc<QueryGenerator>,
    detector: Arc<ConvergenceDetector>,
}

impl DeepResearchOrchestrator {
    pub fn new(engine: Arc<WideResearchEngine>, graph: Arc<dyn KnowledgeGraph>) -> Self {
        Self {
            engine,
            graph,
            integrator: Arc::new(FindingIntegrator::new()),
            gap_analyzer: Arc::new(GapAnalyzer::new()),
            query_generator: Arc::new(QueryGenerator::new()),
            detector: Arc::new(ConvergenceDetector::new()),
        }
    }

    /// Validate the query and start a run.
    ///
    /// Only invalid queries and bad configuration fail here; everything
    /// after this point is absorbed into the progress stream and the
    /// final result. Each call produces an independent session; runs are
    /// restartable per call, not resumable.
    pub fn start(&self, query: DeepResearchQuery) -> Result<ResearchSession, ResearchError> {
        query.validate()?;

        let requested = query
            .sources
            .clone()
            .unwrap_or_else(|| query.depth.sources());
        let available = self.engine.available_sources();
        if !requested.iter().any(|s| available.contains(s)) {
            return Err(ResearchError::Configuration(
                "no agents registered for the requested sources".into(),
            ));
        }

        let (progress_tx, progress_rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let (guidance_tx, guidance_rx) = mpsc::channel(1);
        let token = CancellationToken::new();

        let worker = RunWorker {
            engine: self.engine.clone(),
            graph: self.graph.clone(),
            integrator: self.integrator.clone(),
            gap_analyzer: self.gap_analyzer.clone(),
            query_generator: self.query_generator.clone(),
            detector: self.detector.clone(),
            query,
            token: token.clone(),
            progress: progress_tx,
            guidance: guidance_rx,
        };
        let handle = tokio::spawn(worker.run());

        Ok(ResearchSession {
            progress_rx,
            guidance_tx,
            token,
            handle,
        })
    }

    /// Start a run and drive it to its result, discarding progress.
    pub async fn run_to_completion(
        &self,
        query: DeepResearchQuery,
    ) -> Result<DeepResearchResult, ResearchError> {
        let session = self.start(query)?;
        session.finish().await
    }
}

/// A live research run: progress out, guidance in, result at the end.
pub struct ResearchSession {
    progress_rx: mpsc::Receiver<ResearchProgress>,
    guidance_tx: mpsc::Sender<UserGuidance>,
    token: CancellationToken,
    handle: JoinHandle<DeepResearchResult>,
}

impl ResearchSession {
    /// Next progress event; `None` once the run has completed.
    pub async fn next_progress(&mut self) -> Option<ResearchProgress> {
        self.progress_rx.recv().await
    }

    /// Supply guidance for the pending (or next) `WaitingGuidance`
    /// suspension point.
    pub async fn guide(&self, guidance: UserGuidance) {
        let _ = self.guidance_tx.send(guidance).await;
    }

    /// Cancel the whole run, aborting in-flight agent calls.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token observing this run's cancellation state.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the run to finish and return its result.
    pub async fn finish(self) -> Result<DeepResearchResult, ResearchError> {
        let ResearchSession {
            progress_rx,
            guidance_tx,
            token: _token,
            handle,
        } = self;
        // Unblock any pending emission, and let a pending guidance
        // suspension observe the closed channel as "continue".
        drop(progress_rx);
        drop(guidance_tx);
        handle
            .await
            .map_err(|e| ResearchError::Internal(format!("research task failed: {}", e)))
    }
}

/// State owned by the spawned run task.
struct RunWorker {
    engine: Arc<WideResearchEngine>,
    graph: Arc<dyn KnowledgeGraph>,
    integrator: Arc<FindingIntegrator>,
    gap_analyzer: Arc<GapAnalyzer>,
    query_generator: Arc<QueryGenerator>,
    detector: Arc<ConvergenceDetector>,
    query: DeepResearchQuery,
    token: CancellationToken,
    progress: mpsc::Sender<ResearchProgress>,
    guidance: mpsc::Receiver<UserGuidance>,
}

impl RunWorker {
    async fn run(mut self) -> DeepResearchResult {
        let started = Instant::now();
        let topic = self.query.topic.clone();
        let mut focus_areas = self.query.focus_areas.clone();
        let mut exclude_areas = self.query.exclude_areas.clone();

        let mut novelty_history: Vec<f32> = Vec::new();
        let mut iterations: Vec<IterationRecord> = Vec::new();
        let mut gaps: Vec<CoverageGap> = Vec::new();
        let mut all_findings: Vec<Finding> = Vec::new();
        let mut last_score: Option<f32> = None;
        let mut total_queries = 0usize;
        let mut nodes_created = 0usize;
        let mut edges_created = 0usize;

        info!(topic = %topic, "starting deep research run");

        let completion_reason = 'run: loop {
            let iteration = iterations.len() + 1;

            // Budget checks happen before any work for the round.
            if started.elapsed() >= self.query.total_timeout {
                info!(iteration, "run timeout reached");
                break CompletionReason::Timeout;
            }
            if self.token.is_cancelled() {
                break CompletionReason::UserStopped;
            }

            let queries = if iterations.is_empty() {
                self.query_generator.generate_initial(
                    &topic,
                    &focus_areas,
                    self.query.context.as_deref(),
                )
            } else {
                self.query_generator
                    .generate_from_gaps(&gaps, self.graph.as_ref(), &exclude_areas)
            };
            let queries: Vec<String> =
                queries.into_iter().take(MAX_QUERIES_PER_ROUND).collect();
            if queries.is_empty() {
                // Nothing left worth asking.
                info!(iteration, "no queries remain; research has converged");
                break CompletionReason::Converged;
            }
            total_queries += queries.len();

            self.emit(ResearchProgress {
                iteration,
                phase: Phase::Searching,
                current_query: queries.first().cloned(),
                total_findings: all_findings.len(),
                novelty_rate: novelty_history.last().copied(),
                convergence_score: last_score,
                gaps: gaps.clone(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            })
            .await;

            let round_started = Instant::now();
            let mut round_findings: Vec<Finding> = Vec::new();
            for query_text in &queries {
                let wide_query = self.wide_query(query_text);
                match self
                    .engine
                    .research_with_cancel(&wide_query, &self.token)
                    .await
                {
                    Ok(result) => round_findings.extend(result.findings),
                    Err(ResearchError::Cancelled) => break 'run CompletionReason::UserStopped,
                    Err(e) => {
                        // One failing query never aborts the round.
                        warn!(query = %query_text, error = %e, "query failed; continuing round");
                    }
                }
            }

            self.emit(ResearchProgress {
                iteration,
                phase: Phase::Integrating,
                current_query: None,
                total_findings: all_findings.len(),
                novelty_rate: novelty_history.last().copied(),
                convergence_score: last_score,
                gaps: gaps.clone(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            })
            .await;

            let nodes_before = self.graph.node_count();
            let outcome = self
                .integrator
                .integrate(self.graph.as_ref(), &round_findings, &topic);
            nodes_created += outcome.new_nodes;
            edges_created += outcome.new_edges;
            let novelty = if nodes_before > 0 {
                (outcome.new_nodes as f32 / nodes_before as f32).min(1.0)
            } else {
                1.0
            };

            for finding in round_findings.iter() {
                if !all_findings.iter().any(|f| f.url == finding.url) {
                    all_findings.push(finding.clone());
                }
            }

            iterations.push(IterationRecord {
                iteration,
                queries: queries.clone(),
                findings_count: round_findings.len(),
                new_nodes_count: outcome.new_nodes,
                new_edges_count: outcome.new_edges,
                novelty_rate: novelty,
                duration_ms: round_started.elapsed().as_millis() as u64,
            });
            debug!(
                iteration,
                findings = round_findings.len(),
                new_nodes = outcome.new_nodes,
                novelty,
                "round integrated"
            );

            gaps = self
                .gap_analyzer
                .analyze(self.graph.as_ref(), &topic, &focus_areas);
            let score = self.detector.calculate(&novelty_history, novelty);
            last_score = Some(score);

            self.emit(ResearchProgress {
                iteration,
                phase: Phase::Analyzing,
                current_query: None,
                total_findings: all_findings.len(),
                novelty_rate: Some(novelty),
                convergence_score: Some(score),
                gaps: gaps.clone(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            })
            .await;

            let converged = self.detector.has_converged(
                &novelty_history,
                novelty,
                self.query.convergence_threshold,
            );
            novelty_history.push(novelty);

            if converged {
                info!(iteration, score, "novelty has saturated");
                break CompletionReason::Converged;
            }
            if iterations.len() >= self.query.max_iterations {
                info!(iteration, "iteration budget exhausted");
                break CompletionReason::MaxIterations;
            }

            if self.query.interactive && !gaps.is_empty() {
                self.emit(ResearchProgress {
                    iteration,
                    phase: Phase::WaitingGuidance,
                    current_query: None,
                    total_findings: all_findings.len(),
                    novelty_rate: Some(novelty),
                    convergence_score: Some(score),
                    gaps: gaps.clone(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                })
                .await;

                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => break CompletionReason::UserStopped,
                    guidance = self.guidance.recv() => match guidance {
                        Some(g) if g.action == GuidanceAction::Stop => {
                            info!(iteration, "user requested stop");
                            break CompletionReason::UserStopped;
                        }
                        Some(g) => {
                            for area in g.add_focus_areas {
                                if !focus_areas.contains(&area) {
                                    focus_areas.push(area);
                                }
                            }
                            for area in g.exclude_areas {
                                if !exclude_areas.contains(&area) {
                                    exclude_areas.push(area);
                                }
                            }
                        }
                        // Guidance side dropped: treated as continue.
                        None => {}
                    }
                }
            }
        };

        let statistics = ResearchStatistics {
            total_queries,
            total_findings: all_findings.len(),
            total_nodes_created: nodes_created,
            total_edges_created: edges_created,
            findings_by_source: all_findings.iter().fold(Default::default(), |mut map, f| {
                *map.entry(f.source_type).or_insert(0) += 1;
                map
            }),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        self.emit(ResearchProgress {
            iteration: iterations.len(),
            phase: Phase::Completed,
            current_query: None,
            total_findings: all_findings.len(),
            novelty_rate: novelty_history.last().copied(),
            convergence_score: last_score,
            gaps: gaps.clone(),
            elapsed_ms: statistics.duration_ms,
        })
        .await;

        info!(
            topic = %topic,
            rounds = iterations.len(),
            reason = ?completion_reason,
            "deep research run complete"
        );

        let graph_snapshot = GraphSnapshot::capture(self.graph.as_ref());
        let summary = build_summary(&topic, &graph_snapshot, &iterations, completion_reason);
        let key_findings = rank_key_findings(&all_findings);
        let sources = all_findings
            .iter()
            .map(|f| SourceRef {
                title: f.title.clone(),
                url: f.url.clone(),
                source_type: f.source_type,
            })
            .collect();

        DeepResearchResult {
            topic,
            graph: graph_snapshot,
            summary,
            key_findings,
            sources,
            iterations,
            remaining_gaps: gaps,
            statistics,
            completion_reason,
        }
    }

    fn wide_query(&self, topic: &str) -> WideResearchQuery {
        let mut query = WideResearchQuery::new(topic).with_depth(self.query.depth);
        query.sources = self.query.sources.clone();
        query.max_parallel_agents = self.query.max_parallel_agents;
        query.agent_timeout = self.query.agent_timeout;
        // The per-iteration budget bounds each wide call, not the run.
        query.total_timeout = self.query.iteration_timeout;
        query.languages = self.query.languages.clone();
        query.date_range = self.query.date_range;
        query.max_results_per_source = self.query.max_results_per_source;
        query
    }

    async fn emit(&self, progress: ResearchProgress) {
        // A dropped receiver just means nobody is watching.
        let _ = self.progress.send(progress).await;
    }
}

/// Ranked slice of the most valuable findings, at most ten.
fn rank_key_findings(findings: &[Finding]) -> Vec<Finding> {
    let mut ranked: Vec<Finding> = findings.to_vec();
    ranked.sort_by(|a, b| {
        let score_a = a.relevance_score * a.credibility_score;
        let score_b = b.relevance_score * b.credibility_score;
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked.truncate(10);
    ranked
}

/// Deterministic run summary from the final graph and iteration history.
fn build_summary(
    topic: &str,
    graph: &GraphSnapshot,
    iterations: &[IterationRecord],
    reason: CompletionReason,
) -> String {
    let concepts: Vec<&str> = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Concept)
        .map(|n| n.label.as_str())
        .collect();
    let entities = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Entity)
        .count();
    let findings = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Finding)
        .count();

    let reason_text = match reason {
        CompletionReason::Converged => "information saturated",
        CompletionReason::MaxIterations => "the iteration budget ran out",
        CompletionReason::Timeout => "the time budget ran out",
        CompletionReason::UserStopped => "the user stopped the run",
    };

    let mut summary = format!(
        "Research on '{}' ran {} iteration{} and stopped because {}. \
         The knowledge graph holds {} finding{}, {} concept{}, and {} entit{} \
         across {} nodes and {} edges.",
        topic,
        iterations.len(),
        if iterations.len() == 1 { "" } else { "s" },
        reason_text,
        findings,
        if findings == 1 { "" } else { "s" },
        concepts.len(),
        if concepts.len() == 1 { "" } else { "s" },
        entities,
        if entities == 1 { "y" } else { "ies" },
        graph.nodes.len(),
        graph.edges.len(),
    );

    if !concepts.is_empty() {
        let sample: Vec<&str> = concepts.iter().take(5).copied().collect();
        summary.push_str(&format!(" Central themes: {}.", sample.join("; ")));
    }
    summary
}
