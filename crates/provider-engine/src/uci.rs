//! Line-oriented adapter around a UCI engine subprocess.
//!
//! The exchange is strictly synchronous: one command sequence at a time,
//! each fully drained before the next is issued. The adapter knows just
//! enough UCI to handshake, set `MultiPV`, load a position and run a
//! fixed-depth search; everything else passes through untouched.

use std::io;
use std::process::Stdio;

use bytes::Bytes;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, warn};

use crate::api::Work;

/// Fixed search depth requested for every analysis job.
///
/// Jobs carry no depth of their own; this value is also advertised as the
/// shallow and deep depth at registration.
pub const SEARCH_DEPTH: u32 = 25;

/// Errors from the engine subprocess or the protocol exchange.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    /// The configured engine command was empty.
    #[error("engine command is empty")]
    EmptyCommand,
    /// The engine process could not be spawned.
    #[error("failed to spawn engine `{command}`: {source}")]
    Spawn {
        /// The command that failed to spawn.
        command: String,
        /// The underlying spawn error.
        source: io::Error,
    },
    /// The engine closed its output stream.
    #[error("engine closed its output stream")]
    EndOfStream,
    /// An exhausted [`Analysis`] was polled again.
    #[error("analysis already finished")]
    Exhausted,
    /// I/O failure on the engine's stdin or stdout.
    #[error("engine i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Handle to a running UCI engine subprocess.
///
/// The process is launched once at startup and killed when the handle is
/// dropped. At most one exchange is in flight at any time.
pub struct UciEngine {
    child: Child,
    pid: u32,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl UciEngine {
    /// Spawn the engine, splitting `command` on whitespace.
    ///
    /// Stdin and stdout are piped for the protocol exchange; stderr is
    /// inherited so engine diagnostics stay visible.
    pub fn launch(command: &str) -> Result<UciEngine, UciError> {
        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or(UciError::EmptyCommand)?;

        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| UciError::Spawn {
                command: command.to_string(),
                source,
            })?;

        let pid = child.id().unwrap_or(0);
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(UciError::Io(io::Error::other("engine stdio not captured")));
        };

        Ok(UciEngine {
            child,
            pid,
            stdin,
            stdout: BufReader::new(stdout).lines(),
        })
    }

    /// Write one command line to the engine and flush it.
    pub async fn send(&mut self, command: &str) -> Result<(), UciError> {
        debug!(pid = self.pid, "<< {command}");
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Read the next non-empty line, with trailing whitespace stripped.
    ///
    /// Blank lines are logged and skipped. Fails with
    /// [`UciError::EndOfStream`] once the engine closes stdout.
    pub async fn recv(&mut self) -> Result<String, UciError> {
        loop {
            let Some(raw) = self.stdout.next_line().await? else {
                let status = self.child.try_wait().ok().flatten();
                warn!(pid = self.pid, ?status, "engine closed its output stream");
                return Err(UciError::EndOfStream);
            };
            let line = raw.trim_end();
            debug!(pid = self.pid, ">> {line}");
            if !line.is_empty() {
                return Ok(line.to_string());
            }
        }
    }

    /// Send `uci` and discard output until the engine answers `uciok`.
    pub async fn handshake(&mut self) -> Result<(), UciError> {
        self.send("uci").await?;
        loop {
            let line = self.recv().await?;
            if line.split_whitespace().next() == Some("uciok") {
                return Ok(());
            }
        }
    }

    /// Send `isready` and discard output until the engine answers `readyok`.
    pub async fn ensure_ready(&mut self) -> Result<(), UciError> {
        self.send("isready").await?;
        loop {
            let line = self.recv().await?;
            if line.split_whitespace().next() == Some("readyok") {
                return Ok(());
            }
        }
    }

    /// Set up and start one search, returning the output stream.
    ///
    /// Sets `MultiPV`, waits for readiness, loads the position and issues
    /// `go depth 25`. The returned [`Analysis`] borrows the engine
    /// exclusively; it must be drained to its final line before the next
    /// search, or the following exchange would read stale output.
    pub async fn analyse(&mut self, work: &Work) -> Result<Analysis<'_>, UciError> {
        self.send(&setoption_command(work.multi_pv)).await?;
        self.ensure_ready().await?;
        self.send(&position_command(work)).await?;
        self.send(&go_command()).await?;
        Ok(Analysis {
            engine: self,
            state: AnalysisState::Streaming,
        })
    }
}

/// One-shot stream of engine output for a single search.
///
/// Yields each line as a newline-terminated chunk, ending with the
/// `bestmove` line. The call after the final chunk returns `Ok(None)`
/// exactly once; polling again fails with [`UciError::Exhausted`].
pub struct Analysis<'a> {
    engine: &'a mut UciEngine,
    state: AnalysisState,
}

enum AnalysisState {
    Streaming,
    Finished,
    Spent,
}

impl Analysis<'_> {
    /// Produce the next output chunk, or `Ok(None)` when the search ended.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, UciError> {
        match self.state {
            AnalysisState::Streaming => {
                let line = self.engine.recv().await?;
                if line.starts_with("bestmove") {
                    self.state = AnalysisState::Finished;
                }
                let mut chunk = line.into_bytes();
                chunk.push(b'\n');
                Ok(Some(Bytes::from(chunk)))
            }
            AnalysisState::Finished => {
                self.state = AnalysisState::Spent;
                Ok(None)
            }
            AnalysisState::Spent => Err(UciError::Exhausted),
        }
    }
}

fn setoption_command(multi_pv: u32) -> String {
    format!("setoption name MultiPV value {multi_pv}")
}

fn position_command(work: &Work) -> String {
    format!(
        "position fen {} moves {}",
        work.initial_fen,
        work.moves.join(" ")
    )
}

fn go_command() -> String {
    format!("go depth {SEARCH_DEPTH}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(multi_pv: u32, initial_fen: &str, moves: &[&str]) -> Work {
        Work {
            multi_pv,
            initial_fen: initial_fen.to_string(),
            moves: moves.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn setoption_command_carries_multipv() {
        assert_eq!(setoption_command(1), "setoption name MultiPV value 1");
        assert_eq!(setoption_command(5), "setoption name MultiPV value 5");
    }

    #[test]
    fn position_command_joins_moves_with_spaces() {
        let work = work(1, "startpos", &["e2e4", "e7e5", "g1f3"]);
        assert_eq!(
            position_command(&work),
            "position fen startpos moves e2e4 e7e5 g1f3"
        );
    }

    #[test]
    fn position_command_keeps_moves_keyword_without_moves() {
        let work = work(1, "startpos", &[]);
        assert_eq!(position_command(&work), "position fen startpos moves ");
    }

    #[test]
    fn position_command_passes_full_fen_through() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
        let work = work(2, fen, &["d2d4"]);
        assert_eq!(
            position_command(&work),
            format!("position fen {fen} moves d2d4")
        );
    }

    #[test]
    fn go_command_uses_fixed_depth() {
        assert_eq!(go_command(), "go depth 25");
    }

    #[test]
    fn work_deserializes_from_broker_json() {
        let work: Work = serde_json::from_str(
            r#"{"multiPv":1,"initialFen":"startpos","moves":["e2e4"],"sessionId":"abc"}"#,
        )
        .unwrap();
        assert_eq!(work.multi_pv, 1);
        assert_eq!(work.initial_fen, "startpos");
        assert_eq!(work.moves, vec!["e2e4".to_string()]);
    }

    #[test]
    fn launch_rejects_empty_command() {
        assert!(matches!(UciEngine::launch(""), Err(UciError::EmptyCommand)));
        assert!(matches!(
            UciEngine::launch("   "),
            Err(UciError::EmptyCommand)
        ));
    }
}
