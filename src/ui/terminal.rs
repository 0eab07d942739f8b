//! Interactive terminal chat.

use super::{sprout_error, DESCRIPTION, EXAMPLES, TITLE};
use crate::agent::{AgentInput, AgentOrchestrator};
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

const RESET_COMMAND: &str = "/reset";
const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

/// Chat on stdin/stdout, or answer a single `message` and return.
pub async fn run_chat(agent: &dyn AgentOrchestrator, message: Option<String>) -> Result<()> {
    let mut stdout = std::io::stdout();

    if let Some(message) = message {
        let reply = reply_to(agent, &message, false).await;
        writeln!(stdout, "{reply}")?;
        return Ok(());
    }

    print_banner(&mut stdout)?;
    let stdin = BufReader::new(tokio::io::stdin());
    chat_loop(agent, stdin, &mut stdout).await
}

fn print_banner<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{TITLE}")?;
    writeln!(out, "{DESCRIPTION}")?;
    writeln!(out)?;
    writeln!(out, "Try asking:")?;
    for example in EXAMPLES {
        writeln!(out, "  • {example}")?;
    }
    writeln!(out)?;
    writeln!(out, "Type /reset to start over, /quit to leave.")?;
    Ok(())
}

async fn reply_to(agent: &dyn AgentOrchestrator, message: &str, reset: bool) -> String {
    match agent.run(&AgentInput::new(message, reset)).await {
        Ok(output) => output.response,
        Err(e) => {
            tracing::error!(error = %e, "Chat turn failed");
            sprout_error(&e)
        }
    }
}

/// Read lines until EOF or a quit command. `/reset` makes the next turn
/// start from an empty history.
pub(crate) async fn chat_loop<R, W>(
    agent: &dyn AgentOrchestrator,
    reader: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();
    let mut reset_next = false;

    loop {
        write!(out, "\n🧑 You: ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if QUIT_COMMANDS.contains(&line) {
            break;
        }
        if line == RESET_COMMAND {
            reset_next = true;
            writeln!(out, "🧹 Conversation cleared.")?;
            continue;
        }

        let reply = reply_to(agent, line, std::mem::take(&mut reset_next)).await;
        writeln!(out, "🌱 GreenThumb: {reply}")?;
    }

    writeln!(out, "Goodbye! Happy gardening.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentOutput;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingAgent {
        turns: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl AgentOrchestrator for RecordingAgent {
        async fn run(&self, input: &AgentInput) -> Result<AgentOutput> {
            self.turns
                .lock()
                .push((input.message.clone(), input.reset_history));
            if input.message == "break" {
                anyhow::bail!("model offline");
            }
            Ok(AgentOutput {
                response: format!("echo {}", input.message),
                tool_calls_made: 0,
                steps: 1,
            })
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    async fn run_script(agent: &RecordingAgent, script: &str) -> String {
        let mut out = Vec::new();
        chat_loop(agent, script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn each_line_is_one_turn() {
        let agent = RecordingAgent::default();
        let out = run_script(&agent, "hello\n\nwater ficus\n").await;
        assert!(out.contains("🌱 GreenThumb: echo hello"));
        assert!(out.contains("🌱 GreenThumb: echo water ficus"));
        assert_eq!(
            agent.turns.lock().as_slice(),
            &[("hello".to_string(), false), ("water ficus".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn reset_applies_to_next_turn_only() {
        let agent = RecordingAgent::default();
        run_script(&agent, "a\n/reset\nb\nc\n").await;
        let resets: Vec<bool> = agent.turns.lock().iter().map(|(_, r)| *r).collect();
        assert_eq!(resets, vec![false, true, false]);
    }

    #[tokio::test]
    async fn quit_stops_reading() {
        let agent = RecordingAgent::default();
        let out = run_script(&agent, "one\n/quit\ntwo\n").await;
        assert_eq!(agent.turns.lock().len(), 1);
        assert!(out.contains("Goodbye"));
    }

    #[tokio::test]
    async fn failures_render_as_sprout_error() {
        let agent = RecordingAgent::default();
        let out = run_script(&agent, "break\n").await;
        assert!(out.contains("🌱 I ran into a bit of a sprout-error: model offline"));
    }

    #[test]
    fn banner_lists_examples() {
        let mut out = Vec::new();
        print_banner(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(TITLE));
        assert!(text.contains("Is Aloe Vera toxic to cats?"));
    }
}
