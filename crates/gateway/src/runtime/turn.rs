//! The conversational turn orchestrator.
//!
//! One inbound user message drives a four-stage state machine:
//! context enrichment, a model round-trip, zero or more tool rounds
//! (each followed by another model round-trip), and final formatting.
//! Progress streams to the caller as [`OutputEvent`]s over an mpsc
//! channel; the HTTP layer turns those into SSE frames.

use std::collections::BTreeMap;

use chrono::Utc;
use qc_domain::error::{Error, Result};
use qc_domain::event::OutputEvent;
use qc_domain::message::Message;
use qc_domain::prompts::{REFUSAL_MESSAGE, TOOL_RESULT_REMINDER};
use qc_domain::snapshot::ContextSnapshot;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::runtime::context::SnapshotBuilder;
use crate::runtime::policy::Scope;
use crate::runtime::prompt::{build_system_prompt, conversation_context};
use crate::runtime::tools::ToolContext;
use crate::state::AppState;

/// Shown to clients when a run aborts. Internal detail stays in the logs.
const GENERIC_ERROR: &str = "Something went wrong while generating the response.";

/// One inbound message addressed to one thread.
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub thread_id: String,
    pub user_id: String,
    pub message: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Turn state machine
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Stages a turn moves through, in order. Tool rounds may repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Start,
    ContextEnriched,
    AgentResponse,
    Tools,
    ResponseFormatted,
}

impl Step {
    fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ContextEnriched => "context_enriched",
            Self::AgentResponse => "agent_response",
            Self::Tools => "tools",
            Self::ResponseFormatted => "response_formatted",
        }
    }
}

/// Mutable state threaded through one turn. All context a stage needs is
/// carried here explicitly; nothing lives in globals.
pub struct TurnState {
    step: Step,
    /// Every stage entered, in order. Useful when debugging a trace.
    pub trace: Vec<Step>,
    pub system_prompt_injected: bool,
    pub messages: Vec<Message>,
    /// Read-only context bundle built during enrichment.
    pub snapshot: ContextSnapshot,
    /// Rendered key/value context, force-refreshed every turn.
    pub conversation_context: BTreeMap<String, String>,
}

impl TurnState {
    pub fn new(messages: Vec<Message>) -> Self {
        let system_prompt_injected = messages.first().map(Message::is_system).unwrap_or(false);
        Self {
            step: Step::Start,
            trace: vec![Step::Start],
            system_prompt_injected,
            messages,
            snapshot: ContextSnapshot::default(),
            conversation_context: BTreeMap::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// Move to `to`, rejecting any transition the machine does not allow.
    pub fn advance(&mut self, to: Step) -> Result<()> {
        let legal = matches!(
            (self.step, to),
            (Step::Start, Step::ContextEnriched)
                | (Step::ContextEnriched, Step::AgentResponse)
                | (Step::AgentResponse, Step::Tools)
                | (Step::Tools, Step::AgentResponse)
                | (Step::AgentResponse, Step::ResponseFormatted)
        );
        if !legal {
            return Err(Error::IllegalTransition {
                from: self.step.name().to_string(),
                to: to.name().to_string(),
            });
        }
        debug!(from = self.step.name(), to = to.name(), "turn transition");
        self.step = to;
        self.trace.push(to);
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Entry point
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Run one turn, streaming events as they happen.
///
/// Always returns a receiver; failures inside the turn arrive as a
/// single generic `error` event rather than a dropped channel.
pub fn run_turn(state: AppState, input: TurnInput) -> mpsc::Receiver<OutputEvent> {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(async move {
        // Policy gate before anything touches the model or the stores.
        if state.policy.classify(&input.message) == Scope::Refused {
            info!(thread_id = %input.thread_id, "message refused by content policy");
            // Spaces separate words; the concatenated stream must equal
            // the canned sentence byte for byte.
            let mut words = REFUSAL_MESSAGE.split_whitespace().peekable();
            while let Some(word) = words.next() {
                let text = if words.peek().is_some() {
                    format!("{word} ")
                } else {
                    word.to_string()
                };
                if tx.send(OutputEvent::Token { text }).await.is_err() {
                    return;
                }
            }
            return;
        }

        if let Err(e) = run_turn_inner(&state, &input, &tx).await {
            error!(thread_id = %input.thread_id, error = %e, "turn failed");
            let _ = tx
                .send(OutputEvent::Error {
                    message: GENERIC_ERROR.to_string(),
                })
                .await;
        }
    });
    rx
}

async fn run_turn_inner(
    state: &AppState,
    input: &TurnInput,
    tx: &mpsc::Sender<OutputEvent>,
) -> Result<()> {
    let today = Utc::now().date_naive();
    let coach = state.config.coach.clone();

    let history = state.checkpoints.load(&input.thread_id).await?;
    let mut turn = TurnState::new(repair_head(history));
    turn.advance(Step::ContextEnriched)?;

    // Snapshot failures degrade to an empty snapshot inside the builder;
    // the turn itself never aborts on a broken data source.
    let builder = SnapshotBuilder::new(state.user_data.clone(), &coach);
    turn.snapshot = builder.build(&input.user_id, today).await;
    turn.conversation_context = conversation_context(&turn.snapshot);

    if !turn.system_prompt_injected {
        let prompt = build_system_prompt(&turn.conversation_context, state.tools.definitions());
        turn.messages.insert(0, Message::system(prompt));
        turn.system_prompt_injected = true;
    }
    turn.messages.push(Message::user(&input.message));

    let tool_ctx = ToolContext {
        user_id: input.user_id.clone(),
        today,
        snapshot: turn.snapshot.clone(),
    };

    turn.advance(Step::AgentResponse)?;
    let mut final_text = String::new();
    let mut rounds = 0usize;
    loop {
        if rounds >= coach.max_tool_loops {
            return Err(Error::Other(format!(
                "tool loop limit ({}) reached on thread {}",
                coach.max_tool_loops, input.thread_id
            )));
        }
        rounds += 1;

        let request = qc_providers::ChatRequest {
            messages: turn.messages.clone(),
            tools: state.tools.definitions().to_vec(),
            temperature: Some(state.config.llm.temperature),
            max_tokens: None,
        };
        let response = state.model.chat(&request).await?;

        // Per model turn: tool_call events in emission order, then a token
        // event for any accompanying text, then one tool_result per
        // execution.
        for call in &response.tool_calls {
            tx.send(OutputEvent::ToolCall {
                tool: call.tool_name.clone(),
                args: call.arguments.clone(),
            })
            .await
            .map_err(|_| Error::Other("event channel closed".into()))?;
        }
        if !response.text.is_empty() {
            tx.send(OutputEvent::Token {
                text: response.text.clone(),
            })
            .await
            .map_err(|_| Error::Other("event channel closed".into()))?;
        }

        if response.tool_calls.is_empty() {
            final_text = response.text.clone();
            turn.messages.push(Message::assistant(response.text));
            turn.advance(Step::ResponseFormatted)?;
            break;
        }

        turn.messages.push(Message::assistant_with_calls(
            response.text,
            response.tool_calls.clone(),
        ));
        turn.advance(Step::Tools)?;
        for call in &response.tool_calls {
            let content = state.tools.dispatch(call, &tool_ctx).await;

            tx.send(OutputEvent::ToolResult {
                tool: call.tool_name.clone(),
                content: content.clone(),
            })
            .await
            .map_err(|_| Error::Other("event channel closed".into()))?;

            turn.messages
                .push(Message::tool_result(&call.call_id, &call.tool_name, content));
        }
        turn.advance(Step::AgentResponse)?;
    }

    // Advisory only. The response has already streamed; retracting it
    // would be worse than logging the miss.
    if let Some(label) = state.policy.post_check(&input.message, &final_text) {
        warn!(
            thread_id = %input.thread_id,
            pattern = label,
            "response passed the pre-check but matched a bypass pattern"
        );
    }

    state.checkpoints.save(&input.thread_id, &turn.messages).await?;
    info!(
        thread_id = %input.thread_id,
        rounds,
        messages = turn.messages.len(),
        "turn completed"
    );
    Ok(())
}

/// Model APIs reject a history that opens with a tool result. If stored
/// history ever does (e.g. after external truncation), replace the head
/// with a reminder and re-wrap the orphaned result as user text.
fn repair_head(mut messages: Vec<Message>) -> Vec<Message> {
    if let Some(Message::ToolResult { content, .. }) = messages.first().cloned() {
        messages[0] = Message::user(content);
        messages.insert(0, Message::system(TOOL_RESULT_REMINDER));
    }
    messages
}
