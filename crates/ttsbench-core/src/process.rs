use crate::errors::BenchError;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Runs `program` to completion, optionally feeding `stdin`, and returns its
/// output whatever the exit status.
pub async fn run_command_unchecked(
    program: &str,
    args: &[String],
    stdin: Option<&str>,
) -> anyhow::Result<Output> {
    if !command_exists(program) {
        return Err(BenchError::CommandMissing {
            command: program.to_owned(),
        }
        .into());
    }

    let mut command = Command::new(program);
    command
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    let mut child = command.spawn()?;
    if let Some(input) = stdin {
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input.as_bytes()).await?;
            pipe.shutdown().await?;
        }
    }
    Ok(child.wait_with_output().await?)
}

/// Like [`run_command_unchecked`], but a non-zero exit becomes
/// [`BenchError::CommandFailed`].
pub async fn run_command(
    program: &str,
    args: &[String],
    stdin: Option<&str>,
) -> anyhow::Result<Output> {
    let output = run_command_unchecked(program, args, stdin).await?;
    if !output.status.success() {
        let rendered = format!("{} {}", program, args.join(" "));
        return Err(BenchError::from_command_failure(
            rendered.trim_end().to_string(),
            output.status.code().unwrap_or(-1),
            &String::from_utf8_lossy(&output.stderr),
        )
        .into());
    }
    Ok(output)
}
