//! Interactive chat session.
//!
//! Reads user messages from stdin, sends them to the reasoning engine along
//! with the tool catalog, runs whatever tools the model asks for, and prints
//! the final answer. History is bounded so a long session cannot grow the
//! prompt without limit.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::chat::engine::{ReasoningEngine, ToolSpec, Turn};
use crate::chat::history::ConversationHistory;
use crate::chat::provider::ToolProvider;
use crate::chat::when::date_hints;

/// Upper bound on tool rounds for a single user message.
const MAX_TOOL_ROUNDS: usize = 8;

pub struct ChatSession<E, P> {
    engine: E,
    provider: P,
    tools: Vec<ToolSpec>,
    history: ConversationHistory,
}

impl<E: ReasoningEngine, P: ToolProvider> ChatSession<E, P> {
    /// Fetch the tool catalog and prepare a session.
    pub async fn new(engine: E, provider: P) -> Result<Self> {
        let tools = provider.tools().await?;
        Ok(Self {
            engine,
            provider,
            tools,
            history: ConversationHistory::new(),
        })
    }

    /// Run the interactive loop until the user exits or stdin closes.
    pub async fn run(&mut self) -> Result<()> {
        println!("🔔 Agent ready. Ask about your calendar (type 'exit' to quit).");
        if !self.tools.is_empty() {
            let names: Vec<&str> = self.tools.iter().map(|t| t.name.as_str()).collect();
            println!("Tools: {}", names.join(", "));
        }

        let mut input = String::new();
        loop {
            print!("You: ");
            io::stdout().flush()?;

            input.clear();
            if io::stdin().lock().read_line(&mut input)? == 0 {
                break; // stdin closed
            }
            let line = input.trim();
            if line.is_empty() {
                continue;
            }
            if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
                println!("Goodbye!");
                break;
            }

            match self.respond(line).await {
                Ok(answer) => println!("Assistant: {}", answer),
                Err(e) => {
                    warn!("Turn failed: {}", e);
                    println!("Error: {}", e);
                }
            }
        }
        Ok(())
    }

    /// Produce the assistant answer for one user message.
    async fn respond(&mut self, line: &str) -> Result<String> {
        let today = Local::now().date_naive();
        let annotated = annotate(line, today);

        // Working transcript: system prompt, bounded history, current message.
        let mut turns: Vec<Turn> = Vec::with_capacity(self.history.len() + 2);
        turns.push(Turn::System(system_prompt(today, &self.tools)));
        turns.extend(self.history.turns().cloned());
        turns.push(Turn::User(annotated.clone()));

        let mut rounds = 0;
        let answer = loop {
            let reply = self.engine.chat(&turns, &self.tools).await?;
            if !reply.wants_tools() {
                break reply.content;
            }

            rounds += 1;
            if rounds > MAX_TOOL_ROUNDS {
                warn!("Tool round limit reached, stopping");
                break "I could not finish that request within the tool call limit.".to_string();
            }

            turns.push(Turn::Assistant {
                content: reply.content.clone(),
                tool_calls: reply.tool_calls.clone(),
            });
            for call in &reply.tool_calls {
                debug!("Tool call: {} {}", call.name, call.arguments);
                let output = match self.provider.call(&call.name, call.arguments.clone()).await {
                    Ok(text) => text,
                    // Fed back as a result so the model can recover or apologize.
                    Err(e) => format!("Tool call failed: {}", e),
                };
                turns.push(Turn::ToolResult {
                    name: call.name.clone(),
                    content: output,
                });
            }
        };

        self.history.push(Turn::User(annotated));
        self.history.push(Turn::Assistant {
            content: answer.clone(),
            tool_calls: Vec::new(),
        });
        Ok(answer)
    }
}

fn system_prompt(today: NaiveDate, tools: &[ToolSpec]) -> String {
    let mut prompt = format!(
        "You are a helpful calendar assistant. Today is {} ({}).\n\
         Use the tools below to inspect or change the user's calendar.\n\
         Resolve relative dates against today before calling a tool.\n\
         Dates are YYYY-MM-DD; datetimes are ISO format, e.g. 2025-06-11T14:00:00.\n\
         \nTools:\n",
        today,
        today.format("%A"),
    );
    for tool in tools {
        prompt.push_str(&format!("- {}: {}\n", tool.name, tool.description));
    }
    prompt
}

/// Append resolved dates so the model does not have to do calendar math.
fn annotate(line: &str, today: NaiveDate) -> String {
    let hints = date_hints(line, today);
    if hints.is_empty() {
        return line.to_string();
    }
    let resolved: Vec<String> = hints
        .iter()
        .map(|h| format!("{} is {}", h.phrase, h.date))
        .collect();
    format!("{} ({})", line, resolved.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::engine::{EngineReply, ToolCall};
    use crate::error::EngineError;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replays scripted replies in order; the last one repeats forever.
    struct ScriptedEngine {
        replies: Mutex<Vec<EngineReply>>,
        seen: Arc<Mutex<Vec<Turn>>>,
    }

    impl ScriptedEngine {
        fn new(replies: Vec<EngineReply>) -> (Self, Arc<Mutex<Vec<Turn>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    replies: Mutex::new(replies),
                    seen: seen.clone(),
                },
                seen,
            )
        }
    }

    #[async_trait]
    impl ReasoningEngine for ScriptedEngine {
        async fn chat(
            &self,
            turns: &[Turn],
            _tools: &[ToolSpec],
        ) -> Result<EngineReply, EngineError> {
            *self.seen.lock().unwrap() = turns.to_vec();
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                Ok(replies.remove(0))
            } else {
                Ok(replies[0].clone())
            }
        }
    }

    struct CannedProvider {
        output: String,
        fail: bool,
        calls: Arc<AtomicUsize>,
    }

    impl CannedProvider {
        fn new(output: &str, fail: bool) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    output: output.to_string(),
                    fail,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl ToolProvider for CannedProvider {
        async fn tools(&self) -> Result<Vec<ToolSpec>> {
            Ok(vec![ToolSpec {
                name: "list_events_for_day".to_string(),
                description: "List events for a day".to_string(),
                parameters: json!({"type": "object"}),
            }])
        }

        async fn call(&self, _name: &str, _arguments: Value) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(anyhow!("connection reset"));
            }
            Ok(self.output.clone())
        }
    }

    fn tool_call_reply(name: &str) -> EngineReply {
        EngineReply {
            content: String::new(),
            tool_calls: vec![ToolCall {
                name: name.to_string(),
                arguments: json!({"date": "2025-06-12"}),
            }],
        }
    }

    fn final_reply(text: &str) -> EngineReply {
        EngineReply {
            content: text.to_string(),
            tool_calls: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_respond_runs_tools_then_answers() {
        let (engine, seen) = ScriptedEngine::new(vec![
            tool_call_reply("list_events_for_day"),
            final_reply("You have one event."),
        ]);
        let (provider, calls) = CannedProvider::new("Events on 2025-06-12:\n- 09:00: Standup", false);

        let mut session = ChatSession::new(engine, provider).await.unwrap();
        let answer = session.respond("what's on tomorrow?").await.unwrap();

        assert_eq!(answer, "You have one event.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.history.len(), 2);

        // Second engine call saw the tool output in the transcript.
        let transcript = seen.lock().unwrap();
        assert!(transcript.iter().any(|t| matches!(
            t,
            Turn::ToolResult { name, content }
                if name == "list_events_for_day" && content.contains("Standup")
        )));
        assert!(matches!(transcript.first(), Some(Turn::System(_))));
    }

    #[tokio::test]
    async fn test_tool_failure_is_fed_back_to_model() {
        let (engine, seen) = ScriptedEngine::new(vec![
            tool_call_reply("list_events_for_day"),
            final_reply("I could not reach the calendar."),
        ]);
        let (provider, _calls) = CannedProvider::new("", true);

        let mut session = ChatSession::new(engine, provider).await.unwrap();
        let answer = session.respond("what's on tomorrow?").await.unwrap();

        assert_eq!(answer, "I could not reach the calendar.");
        let transcript = seen.lock().unwrap();
        assert!(transcript.iter().any(|t| matches!(
            t,
            Turn::ToolResult { content, .. } if content.starts_with("Tool call failed:")
        )));
    }

    #[tokio::test]
    async fn test_round_cap_stops_runaway_tool_loops() {
        // Engine never produces a final answer.
        let (engine, _seen) = ScriptedEngine::new(vec![tool_call_reply("list_events_for_day")]);
        let (provider, calls) = CannedProvider::new("No events found on 2025-06-12.", false);

        let mut session = ChatSession::new(engine, provider).await.unwrap();
        let answer = session.respond("keep checking").await.unwrap();

        assert!(answer.contains("tool call limit"));
        assert_eq!(calls.load(Ordering::SeqCst), MAX_TOOL_ROUNDS);
    }

    #[tokio::test]
    async fn test_history_stays_bounded_across_exchanges() {
        let (engine, _seen) = ScriptedEngine::new(vec![final_reply("ok")]);
        let (provider, _calls) = CannedProvider::new("", false);

        let mut session = ChatSession::new(engine, provider).await.unwrap();
        for i in 0..7 {
            session.respond(&format!("message {}", i)).await.unwrap();
        }

        assert_eq!(session.history.len(), 10);
    }

    #[test]
    fn test_annotate_appends_resolved_dates() {
        let today = chrono::NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let annotated = annotate("am I free tomorrow?", today);
        assert_eq!(annotated, "am I free tomorrow? (tomorrow is 2025-06-12)");

        let untouched = annotate("cancel the standup", today);
        assert_eq!(untouched, "cancel the standup");
    }

    #[test]
    fn test_system_prompt_names_the_tools() {
        let today = chrono::NaiveDate::from_ymd_opt(2025, 6, 11).unwrap();
        let prompt = system_prompt(
            today,
            &[ToolSpec {
                name: "is_free_at".to_string(),
                description: "Check availability".to_string(),
                parameters: json!({}),
            }],
        );

        assert!(prompt.contains("Today is 2025-06-11 (Wednesday)."));
        assert!(prompt.contains("- is_free_at: Check availability"));
    }
}
