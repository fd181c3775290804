use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use super::{run_turn, CliMode};
use crate::error::Result;
use crate::runtime::Runtime;

/// Interactive loop: one turn per input line until EOF, `exit` or `quit`.
/// Blank lines are skipped. A failed turn is reported and the loop goes on.
pub async fn run_loop<R, W>(runtime: &Runtime, mode: CliMode, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        output.write_all(mode.prompt().as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            return Ok(());
        }
        if line.is_empty() {
            continue;
        }

        match run_turn(runtime, mode, line).await {
            Ok(text) => {
                output.write_all(text.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }
            Err(e) => {
                tracing::error!(error = %e, "turn failed");
                output
                    .write_all(format!("scopebridge: turn failed: {e}\n").as_bytes())
                    .await?;
            }
        }
    }
}
