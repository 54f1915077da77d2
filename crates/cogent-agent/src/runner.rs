// SPDX-FileCopyrightText: 2026 Cogent Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The agent orchestration loop.
//!
//! [`AgentRunner::run`] drives a task to completion: seed the buffer with the
//! system prompt and relevant prior memories, then alternate model turns and
//! tool dispatches until the model produces final text or the step budget
//! runs out. Every model turn consumes one step regardless of outcome, so a
//! model that loops on tool calls cannot run forever. Outcomes are persisted
//! to long-term memory as experiences for future runs.

use std::sync::Arc;

use cogent_core::{ChatMessage, CogentError, ModelProvider};
use cogent_memory::{LongTermMemory, MemoryType};
use cogent_tools::ToolRegistry;
use tracing::{debug, error, info, warn};

use crate::buffer::ConversationBuffer;

/// Answer returned when the step budget is exhausted before the model
/// produces final text.
pub const FALLBACK_ANSWER: &str =
    "I was unable to complete the task within the allotted number of steps.";

/// Characters of the answer kept when persisting an outcome experience.
const OUTCOME_SNIPPET_CHARS: usize = 400;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The model produced a final text answer.
    Final,
    /// The step budget ran out; the answer is [`FALLBACK_ANSWER`].
    StepLimitExceeded,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub answer: String,
    pub status: RunStatus,
    pub steps: usize,
}

/// Tunables for the agent loop. Defaults mirror the shipped configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub agent_name: String,
    /// Overrides the built-in system prompt when set.
    pub system_prompt: Option<String>,
    pub max_steps: usize,
    pub buffer_capacity: usize,
    pub temperature: f32,
    /// Floor for memories considered relevant enough to inject.
    pub min_importance: f64,
    /// How many memories to retrieve per task.
    pub search_results: usize,
    /// How many of the retrieved memories actually get injected.
    pub inject_limit: usize,
    /// Injected memory content is truncated to this many characters.
    pub snippet_chars: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            agent_name: "cogent".to_string(),
            system_prompt: None,
            max_steps: 6,
            buffer_capacity: 100,
            temperature: 0.2,
            min_importance: 0.6,
            search_results: 3,
            inject_limit: 2,
            snippet_chars: 500,
        }
    }
}

/// Drives one task through the model/tool loop.
pub struct AgentRunner {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<ToolRegistry>,
    memory: Arc<LongTermMemory>,
    config: RunnerConfig,
}

impl AgentRunner {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        tools: Arc<ToolRegistry>,
        memory: Arc<LongTermMemory>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            memory,
            config,
        }
    }

    /// Runs a task to completion or to the step budget.
    ///
    /// Only fatal provider errors (rate limiting, exhausted quota) abort the
    /// run; transient provider failures consume a step and the loop retries.
    pub async fn run(&self, task: &str) -> Result<RunOutcome, CogentError> {
        let mut buffer = ConversationBuffer::new(self.config.buffer_capacity);
        buffer.push(ChatMessage::system(self.system_prompt()));

        if let Some(memories) = self.relevant_memories(task).await {
            buffer.push(ChatMessage::system(memories));
        }
        buffer.push(ChatMessage::user(task));

        let specs = self.tools.specs();
        let mut steps_used = 0;

        info!(task, max_steps = self.config.max_steps, "starting run");

        while steps_used < self.config.max_steps {
            let turn = match self
                .provider
                .complete(buffer.messages(), &specs, self.config.temperature)
                .await
            {
                Ok(turn) => turn,
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "provider returned a fatal error, aborting run");
                    return Err(e);
                }
                Err(e) => {
                    warn!(error = %e, step = steps_used, "provider error, consuming a step");
                    steps_used += 1;
                    continue;
                }
            };

            if !turn.tool_calls.is_empty() {
                buffer.push(ChatMessage::assistant_tool_calls(
                    turn.content.clone(),
                    turn.tool_calls.clone(),
                ));
                for call in &turn.tool_calls {
                    let input = serde_json::from_str(&call.arguments)
                        .unwrap_or(serde_json::Value::Null);
                    debug!(tool = %call.name, "dispatching tool call");
                    let output = self.tools.dispatch(&call.name, input).await;
                    buffer.push(ChatMessage::tool_result(&call.id, &call.name, output.content));
                }
                steps_used += 1;
                continue;
            }

            if let Some(answer) = turn.final_text() {
                let answer = answer.to_string();
                buffer.push(ChatMessage::assistant(answer.clone()));
                steps_used += 1;
                info!(steps = steps_used, "run finished with a final answer");
                self.persist_outcome(task, &answer, true).await;
                return Ok(RunOutcome {
                    answer,
                    status: RunStatus::Final,
                    steps: steps_used,
                });
            }

            debug!(step = steps_used, "model turn carried neither text nor tool calls");
            steps_used += 1;
        }

        warn!(steps = steps_used, "step budget exhausted without a final answer");
        // Logged at warn so the tail is visible at the default level.
        for message in buffer.tail(6) {
            warn!(role = message.role.as_str(), content = ?message.content, "buffer tail");
        }
        self.persist_outcome(task, FALLBACK_ANSWER, false).await;
        Ok(RunOutcome {
            answer: FALLBACK_ANSWER.to_string(),
            status: RunStatus::StepLimitExceeded,
            steps: steps_used,
        })
    }

    fn system_prompt(&self) -> String {
        if let Some(prompt) = &self.config.system_prompt {
            return prompt.clone();
        }
        let tool_list: Vec<String> = self
            .tools
            .list()
            .into_iter()
            .map(|(name, description)| format!("- {name}: {description}"))
            .collect();
        format!(
            "You are {name}, an autonomous task-solving agent.\n\
             Work step by step. Use the available tools when they help, and \
             reply with plain text once you have the final answer.\n\n\
             Available tools:\n{tools}",
            name = self.config.agent_name,
            tools = tool_list.join("\n"),
        )
    }

    /// Prior experience relevant to this task, rendered as a system block.
    /// Returns `None` when memory is disabled or nothing clears the
    /// importance floor.
    async fn relevant_memories(&self, task: &str) -> Option<String> {
        let matches = self
            .memory
            .search(
                task,
                self.config.search_results,
                None,
                Some(self.config.min_importance),
            )
            .await;
        if matches.is_empty() {
            return None;
        }

        let mut block = String::from("## Relevant prior experience\n");
        for m in matches.iter().take(self.config.inject_limit) {
            let snippet: String = m.record.content.chars().take(self.config.snippet_chars).collect();
            block.push_str(&format!(
                "- [{kind}, importance {importance:.2}] {snippet}\n",
                kind = m.record.memory_type.as_str(),
                importance = m.record.importance,
            ));
        }
        debug!(injected = matches.len().min(self.config.inject_limit), "injecting prior memories");
        Some(block)
    }

    /// Stores the run outcome as an experience. Successful runs weigh more
    /// than step-limit failures so consolidation favors what worked.
    async fn persist_outcome(&self, task: &str, answer: &str, success: bool) {
        let snippet: String = answer.chars().take(OUTCOME_SNIPPET_CHARS).collect();
        let content = format!("Task: {task}\nOutcome: {snippet}");
        let (importance, metadata) = if success {
            (0.7, serde_json::json!({"success": true}))
        } else {
            (
                0.3,
                serde_json::json!({"success": false, "failure_reason": "step_limit"}),
            )
        };
        self.memory
            .store(&content, MemoryType::Experience, importance, metadata)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use cogent_core::{ModelTurn, ToolCallRequest, ToolSpec};
    use cogent_memory::{Embedder, MemoryStore};
    use cogent_tools::builtin::CalculatorTool;
    use tokio::sync::Mutex;

    /// Scripted provider: pops one response per call, records what it saw.
    /// An empty script yields empty turns.
    struct FakeProvider {
        script: Mutex<VecDeque<Result<ModelTurn, CogentError>>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl FakeProvider {
        fn new(script: Vec<Result<ModelTurn, CogentError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for FakeProvider {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            _tools: &[ToolSpec],
            _temperature: f32,
        ) -> Result<ModelTurn, CogentError> {
            self.seen.lock().await.push(messages.to_vec());
            self.script
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Ok(ModelTurn::default()))
        }
    }

    fn text_turn(text: &str) -> Result<ModelTurn, CogentError> {
        Ok(ModelTurn {
            content: Some(text.to_string()),
            tool_calls: Vec::new(),
        })
    }

    async fn open_memory() -> Arc<LongTermMemory> {
        let store = MemoryStore::open_in_memory().await.unwrap();
        Arc::new(LongTermMemory::new(store, Embedder::Hash { dim: 64 }))
    }

    fn runner_with(
        provider: Arc<FakeProvider>,
        tools: ToolRegistry,
        memory: Arc<LongTermMemory>,
    ) -> AgentRunner {
        AgentRunner::new(provider, Arc::new(tools), memory, RunnerConfig::default())
    }

    #[tokio::test]
    async fn immediate_answer_finishes_in_one_step() {
        let provider = Arc::new(FakeProvider::new(vec![text_turn("Paris")]));
        let memory = open_memory().await;
        let runner = runner_with(Arc::clone(&provider), ToolRegistry::new(), Arc::clone(&memory));

        let outcome = runner.run("capital of France?").await.unwrap();
        assert_eq!(outcome.status, RunStatus::Final);
        assert_eq!(outcome.answer, "Paris");
        assert_eq!(outcome.steps, 1);

        // The outcome was persisted as a high-importance experience.
        let recent = memory.recent(5, Some(MemoryType::Experience)).await;
        assert_eq!(recent.len(), 1);
        assert!(recent[0].content.contains("capital of France?"));
        assert!((recent[0].importance - 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn step_budget_exhaustion_returns_fallback() {
        // Empty script: every turn is empty, so the budget runs out.
        let provider = Arc::new(FakeProvider::new(vec![]));
        let memory = open_memory().await;
        let runner = runner_with(Arc::clone(&provider), ToolRegistry::new(), Arc::clone(&memory));

        let outcome = runner.run("impossible task").await.unwrap();
        assert_eq!(outcome.status, RunStatus::StepLimitExceeded);
        assert_eq!(outcome.answer, FALLBACK_ANSWER);
        assert_eq!(outcome.steps, RunnerConfig::default().max_steps);

        let recent = memory.recent(5, Some(MemoryType::Experience)).await;
        assert_eq!(recent.len(), 1);
        assert!((recent[0].importance - 0.3).abs() < 1e-9);
    }

    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;
        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn exhaustion_diagnostics_visible_at_warn_level() {
        use tracing::instrument::WithSubscriber;

        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(writer.clone())
            .with_ansi(false)
            .finish();

        let provider = Arc::new(FakeProvider::new(vec![]));
        let memory = Arc::new(LongTermMemory::disabled());
        let runner = runner_with(provider, ToolRegistry::new(), memory);

        runner
            .run("stuck task")
            .with_subscriber(subscriber)
            .await
            .unwrap();

        let output = String::from_utf8(writer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("step budget exhausted"));
        assert!(output.contains("buffer tail"));
    }

    #[tokio::test]
    async fn tool_call_turn_then_answer() {
        let tool_turn = Ok(ModelTurn {
            content: None,
            tool_calls: vec![ToolCallRequest {
                id: "call_1".to_string(),
                name: "calculator".to_string(),
                arguments: "{\"expression\": \"2 + 2 * 3\"}".to_string(),
            }],
        });
        let provider = Arc::new(FakeProvider::new(vec![tool_turn, text_turn("8")]));

        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(CalculatorTool));
        let memory = open_memory().await;
        let runner = runner_with(Arc::clone(&provider), tools, memory);

        let outcome = runner.run("what is 2 + 2 * 3?").await.unwrap();
        assert_eq!(outcome.status, RunStatus::Final);
        assert_eq!(outcome.answer, "8");
        assert_eq!(outcome.steps, 2);

        // The second model call saw the tool result in the buffer.
        let seen = provider.seen.lock().await;
        let second_call = &seen[1];
        let tool_msg = second_call
            .iter()
            .find(|m| m.tool_call_id.as_deref() == Some("call_1"))
            .unwrap();
        assert!(tool_msg.content.as_ref().unwrap().contains("8"));
    }

    #[tokio::test]
    async fn fatal_provider_error_aborts_without_persisting() {
        let provider = Arc::new(FakeProvider::new(vec![Err(CogentError::RateLimited(
            "quota exhausted".to_string(),
        ))]));
        let memory = open_memory().await;
        let runner = runner_with(provider, ToolRegistry::new(), Arc::clone(&memory));

        let result = runner.run("anything").await;
        assert!(matches!(result, Err(CogentError::RateLimited(_))));
        assert!(memory.recent(5, None).await.is_empty());
    }

    #[tokio::test]
    async fn transient_provider_error_consumes_a_step() {
        let provider = Arc::new(FakeProvider::new(vec![
            Err(CogentError::Provider {
                message: "server hiccup".to_string(),
                source: None,
            }),
            text_turn("done"),
        ]));
        let memory = open_memory().await;
        let runner = runner_with(provider, ToolRegistry::new(), memory);

        let outcome = runner.run("resilient task").await.unwrap();
        assert_eq!(outcome.status, RunStatus::Final);
        assert_eq!(outcome.steps, 2);
    }

    #[tokio::test]
    async fn relevant_memories_are_injected_as_system_block() {
        let memory = open_memory().await;
        memory
            .store(
                "Task: deploy the service\nOutcome: used the staging runbook",
                MemoryType::Experience,
                0.8,
                serde_json::json!({"success": true}),
            )
            .await;

        let provider = Arc::new(FakeProvider::new(vec![text_turn("ok")]));
        let runner = runner_with(Arc::clone(&provider), ToolRegistry::new(), memory);

        // Hash embeddings give similarity 1.0 for identical text, so query
        // with the stored content to guarantee a hit above the floor.
        runner
            .run("Task: deploy the service\nOutcome: used the staging runbook")
            .await
            .unwrap();

        let seen = provider.seen.lock().await;
        let first_call = &seen[0];
        let injected = first_call.iter().any(|m| {
            m.role == cogent_core::Role::System
                && m.content
                    .as_deref()
                    .is_some_and(|c| c.contains("Relevant prior experience"))
        });
        assert!(injected);
    }

    #[tokio::test]
    async fn disabled_memory_runs_without_injection() {
        let provider = Arc::new(FakeProvider::new(vec![text_turn("fine")]));
        let memory = Arc::new(LongTermMemory::disabled());
        let runner = runner_with(Arc::clone(&provider), ToolRegistry::new(), memory);

        let outcome = runner.run("simple task").await.unwrap();
        assert_eq!(outcome.answer, "fine");

        let seen = provider.seen.lock().await;
        // System prompt + user task only.
        assert_eq!(seen[0].len(), 2);
    }
}
