//! Line-oriented console front end.

use assistant::AssistantError;
use async_trait::async_trait;
use orchestrator::Orchestrator;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::error;

pub const GREETING: &str = "\
Hey! How can I help you today?
You can ask me to:
  - Create a PR (e.g., 'create me a PR in the repo my-org/my-repo from branch feature-x to main')
  - List branches (e.g., 'list all open branches in my-org/my-repo')
Type 'exit' or 'quit' to end the conversation.

";

pub const GOODBYE: &str = "Goodbye! Have a great day!\n";

const PROMPT: &[u8] = b"> ";

/// Something that answers one user line at a time.
#[async_trait]
pub trait Session: Send {
    async fn respond(&mut self, line: &str) -> Result<String, AssistantError>;
}

#[async_trait]
impl Session for Orchestrator {
    async fn respond(&mut self, line: &str) -> Result<String, AssistantError> {
        self.run(line).await
    }
}

fn is_exit(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Runs the prompt loop until `exit`, `quit`, or end of input.
///
/// A failed request is reported and the session carries on.
pub async fn run<S, R, W>(session: &mut S, input: R, mut output: W) -> std::io::Result<()>
where
    S: Session,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output.write_all(GREETING.as_bytes()).await?;
    let mut lines = input.lines();

    loop {
        output.write_all(PROMPT).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            output.write_all(b"\n").await?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            break;
        }

        let text = match session.respond(line).await {
            Ok(reply) => format!("\nResponse: {reply}\n\n"),
            Err(err) => {
                error!(error = %err, "Request failed");
                format!("\nOops! Something went wrong: {err}\n\n")
            }
        };
        output.write_all(text.as_bytes()).await?;
    }

    output.write_all(GOODBYE.as_bytes()).await?;
    output.flush().await
}
