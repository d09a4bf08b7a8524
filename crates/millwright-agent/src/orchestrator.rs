//! The orchestrator - per-request pipeline from query to validated response

use crate::assemble::{assemble, Section, SectionOutcome};
use crate::{AgentConfig, AgentError, AuditLog, KeywordPlanner, Planner};
use millwright_cache::{CacheKey, ResponseCache};
use millwright_domain::traits::Narrator;
use millwright_domain::{AgentResponse, AuditRecord, Clock, ResponseId, SystemClock};
use millwright_grounding::{GroundingEngine, GroundingOutcome};
use millwright_llm::TemplateNarrator;
use millwright_tools::ToolRegistry;
use std::fmt::Display;
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};

/// The query orchestrator.
///
/// Owns the planner, the registry handle, the response cache, the
/// grounding engine, and the audit log. One instance serves all requests;
/// `handle` is `&self` and safe to call concurrently.
pub struct Agent<N = TemplateNarrator> {
    registry: Arc<ToolRegistry>,
    planner: Box<dyn Planner>,
    cache: Arc<ResponseCache>,
    engine: GroundingEngine,
    narrator: Arc<N>,
    audit: AuditLog,
    config: AgentConfig,
    clock: Arc<dyn Clock>,
}

impl Agent<TemplateNarrator> {
    /// Create an agent with the default planner, narrator, cache, and
    /// grounding policy
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            planner: Box::new(KeywordPlanner::default()),
            cache: Arc::new(ResponseCache::new()),
            engine: GroundingEngine::default(),
            narrator: Arc::new(TemplateNarrator),
            audit: AuditLog::new(),
            config: AgentConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

impl<N> Agent<N>
where
    N: Narrator + Send + Sync + 'static,
    N::Error: Display + Send,
{
    /// Replace the orchestrator configuration
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the planning strategy
    pub fn with_planner(mut self, planner: Box<dyn Planner>) -> Self {
        self.planner = planner;
        self
    }

    /// Share an externally-owned response cache
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Replace the grounding engine
    pub fn with_grounding(mut self, engine: GroundingEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Replace the clock (deterministic timestamps in tests)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the narrator
    pub fn with_narrator<M>(self, narrator: Arc<M>) -> Agent<M>
    where
        M: Narrator + Send + Sync + 'static,
        M::Error: Display + Send,
    {
        Agent {
            registry: self.registry,
            planner: self.planner,
            cache: self.cache,
            engine: self.engine,
            narrator,
            audit: self.audit,
            config: self.config,
            clock: self.clock,
        }
    }

    /// The audit log of delivered responses
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Handle one query end to end.
    ///
    /// Always returns a well-formed [`AgentResponse`] unless nothing at
    /// all could be answered: zero tool sections completing - whether the
    /// budget ran out or every tool failed upstream - is a hard error.
    pub async fn handle(&self, query: &str) -> Result<AgentResponse, AgentError> {
        let response_id = ResponseId::new();
        tracing::debug!(%response_id, phase = "received", query);

        tracing::debug!(%response_id, phase = "tool_selection");
        let mut calls = self.planner.plan(query, self.clock.now());
        calls.retain(|call| {
            let known = self.registry.contains(&call.tool);
            if !known {
                tracing::warn!(tool = %call.tool, "planner selected unknown capability, dropping");
            }
            known
        });

        if calls.is_empty() {
            return Ok(self.no_capability_response(response_id, query));
        }

        tracing::debug!(%response_id, phase = "fan_out_invoke", tools = calls.len());
        let mut handles = Vec::new();
        for call in calls {
            let tool = match self.registry.get(&call.tool) {
                Some(tool) => tool,
                None => continue,
            };
            let cache = Arc::clone(&self.cache);
            let key = CacheKey::new(&call.tool, &call.args);
            let args = call.args;
            let handle = tokio::spawn(async move {
                cache
                    .get_or_compute(key, || async move { tool.invoke(args).await })
                    .await
            });
            handles.push((call.tool, handle));
        }

        // All invocations share one deadline; waiting on them in turn
        // still gives all-or-timeout semantics because they already run
        // concurrently.
        let deadline = Instant::now() + self.config.budget;
        let mut sections = Vec::new();
        let mut timed_out = false;
        for (tool, mut handle) in handles {
            let outcome = match timeout_at(deadline, &mut handle).await {
                Ok(Ok(Ok(result))) => SectionOutcome::Completed(result),
                Ok(Ok(Err(err))) => {
                    tracing::warn!(%tool, error = %err, "tool failed, section marked unavailable");
                    SectionOutcome::Unavailable
                }
                Ok(Err(join_err)) => {
                    tracing::warn!(%tool, error = %join_err, "tool task lost, section marked unavailable");
                    SectionOutcome::Unavailable
                }
                Err(_) => {
                    handle.abort();
                    timed_out = true;
                    tracing::warn!(%tool, "budget exhausted, invocation cancelled");
                    SectionOutcome::TimedOut
                }
            };
            sections.push(Section { tool, outcome });
        }

        tracing::debug!(%response_id, phase = "draft_assembly");
        let assembled = assemble(sections);
        if assembled.completed == 0 {
            // Zero completed sections is catastrophic either way; the
            // variant distinguishes a blown budget from a dead data layer
            return Err(if timed_out {
                AgentError::NoSectionsCompleted(self.config.budget.as_secs())
            } else {
                AgentError::AllSectionsUnavailable
            });
        }

        let narrated = self.narrate(&assembled.outline).await?;

        tracing::debug!(%response_id, phase = "grounding_check");
        let validated = self.engine.validate(&narrated, &assembled.citations)?;
        match validated.outcome {
            GroundingOutcome::Fallback => tracing::debug!(%response_id, phase = "fallback"),
            _ => tracing::debug!(%response_id, phase = "respond"),
        }

        let response = AgentResponse {
            response_id,
            message: validated.message.clone(),
            citations: assembled.citations.clone(),
            follow_up_questions: assembled.follow_ups,
            grounding_score: validated.grounding_score,
            low_confidence: validated.low_confidence(),
        };

        self.audit.append(AuditRecord {
            response_id,
            query_text: query.to_string(),
            response_text: validated.message,
            citations: assembled.citations,
            grounding_score: validated.grounding_score,
            ungrounded_claims: validated.ungrounded_claims,
            validated_at: self.clock.now(),
        });

        Ok(response)
    }

    /// Terminal response when no capability matches the query: names what
    /// can be answered instead of guessing.
    fn no_capability_response(&self, response_id: ResponseId, query: &str) -> AgentResponse {
        tracing::debug!(%response_id, phase = "respond", "no matching capability");

        let topics: Vec<String> = self
            .registry
            .all()
            .iter()
            .map(|tool| format!("- {}: {}", tool.name(), tool.description()))
            .collect();
        let message = format!(
            "I don't have a capability that matches that question. I can answer about:\n{}",
            topics.join("\n")
        );

        self.audit.append(AuditRecord {
            response_id,
            query_text: query.to_string(),
            response_text: message.clone(),
            citations: vec![],
            grounding_score: 1.0,
            ungrounded_claims: vec![],
            validated_at: self.clock.now(),
        });

        AgentResponse {
            response_id,
            message,
            citations: vec![],
            follow_up_questions: vec![],
            grounding_score: 1.0,
            low_confidence: false,
        }
    }

    /// Narrate the outline on a blocking thread. Narration failure is
    /// contained: the outline itself is already a deliverable draft.
    async fn narrate(&self, outline: &str) -> Result<String, AgentError> {
        let narrator = Arc::clone(&self.narrator);
        let text = outline.to_string();
        let narrated = tokio::task::spawn_blocking(move || narrator.narrate(&text))
            .await
            .map_err(|e| AgentError::Internal(format!("narration task failed: {}", e)))?;

        match narrated {
            Ok(prose) => Ok(prose),
            Err(e) => {
                tracing::warn!(error = %e, "narration failed, delivering the outline");
                Ok(outline.to_string())
            }
        }
    }
}
