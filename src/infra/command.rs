//! # Command Execution Module / 命令执行模块
//!
//! Spawns the agent process for a test case and exposes its stdout and stderr
//! as a single stream of lines, so the caller can react to each line as soon as
//! the agent prints it.
//!
//! 为测试用例派生代理进程，并将其 stdout 和 stderr 合并为单个行流，
//! 以便调用者在代理打印每一行时立即做出响应。

use anyhow::{Context, Result, bail};
use std::io;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio_stream::{Stream, StreamExt};
use tracing::debug;

/// One line of agent output, tagged with the stream it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    Stdout(String),
    Stderr(String),
}

type LineStream = Pin<Box<dyn Stream<Item = io::Result<OutputLine>> + Send>>;

/// A running agent process.
/// The process is killed if this value is dropped before it exits.
///
/// 一个正在运行的代理进程。如果在进程退出前丢弃此值，进程将被终止。
pub struct AgentProcess {
    child: Child,
    lines: LineStream,
}

impl AgentProcess {
    /// The next line from either output stream, or `None` once both are closed.
    pub async fn next_line(&mut self) -> Option<io::Result<OutputLine>> {
        self.lines.next().await
    }

    /// Kills the process. Errors are ignored if it already exited.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            debug!(error = %e, "agent process could not be killed, it has most likely exited");
        }
    }

    pub async fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait().await
    }
}

/// Splits a command line into a program and its arguments.
///
/// `~` and `$VAR` / `${VAR}` are expanded first, then the string is split with
/// POSIX shell quoting rules.
///
/// 将命令行拆分为程序及其参数。先展开 `~` 和环境变量，再按 POSIX shell 引号规则拆分。
pub fn parse_command_line(command_line: &str) -> Result<(String, Vec<String>)> {
    let expanded = shellexpand::full(command_line)
        .with_context(|| format!("Failed to expand command line: {command_line}"))?;
    let mut words = shlex::split(&expanded)
        .with_context(|| format!("Unbalanced quotes in command line: {command_line}"))?
        .into_iter();

    match words.next() {
        Some(program) => Ok((program, words.collect())),
        None => bail!("Command line is empty"),
    }
}

/// Spawns `program`, writes `stdin_payload` to its stdin and closes it, and
/// returns a handle that streams the process output line by line.
///
/// # Arguments
/// * `program` - The executable to run
/// * `args` - Arguments passed to the executable
/// * `envs` - Extra environment variables for the child
/// * `stdin_payload` - Bytes written to the child's stdin
///
/// 派生 `program`，将 `stdin_payload` 写入其 stdin 并关闭，
/// 然后返回逐行流式输出进程输出的句柄。
pub fn spawn_streaming(
    program: &str,
    args: &[String],
    envs: &[(&str, String)],
    stdin_payload: Vec<u8>,
) -> Result<AgentProcess> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .envs(envs.iter().map(|(k, v)| (*k, v.as_str())))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to start agent command: {program}"))?;

    let stdin = child.stdin.take().context("Failed to open agent stdin")?;
    let stdout = child.stdout.take().context("Failed to capture agent stdout")?;
    let stderr = child.stderr.take().context("Failed to capture agent stderr")?;

    // Writing happens in the background so an agent that prints before it
    // reads its input cannot deadlock against a full pipe.
    tokio::spawn(async move {
        let mut stdin = stdin;
        if let Err(e) = stdin.write_all(&stdin_payload).await {
            debug!(error = %e, "agent did not read its test plan from stdin");
            return;
        }
        let _ = stdin.shutdown().await;
    });

    let out = lossy_lines(stdout).map(|line| line.map(OutputLine::Stdout));
    let err = lossy_lines(stderr).map(|line| line.map(OutputLine::Stderr));

    Ok(AgentProcess {
        child,
        lines: Box::pin(out.merge(err)),
    })
}

/// Lines of `reader` without their line ending. Invalid UTF-8 is replaced
/// with U+FFFD instead of ending the stream. A read error is yielded once,
/// then the stream ends.
fn lossy_lines<R>(reader: R) -> impl Stream<Item = io::Result<String>> + Send
where
    R: AsyncRead + Unpin + Send + 'static,
{
    futures::stream::unfold(Some(BufReader::new(reader)), |state| async move {
        let mut reader = state?;
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                let line = String::from_utf8_lossy(&buf).into_owned();
                Some((Ok(line), Some(reader)))
            }
            Err(e) => Some((Err(e), None)),
        }
    })
}
