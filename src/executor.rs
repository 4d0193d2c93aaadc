use std::io;
use std::process::{self, Stdio};

use os_pipe::{PipeReader, PipeWriter};

use crate::command::{Command, CommandSet};
use crate::jobs::Session;
use crate::redirect;

/// Hard ceiling on launched stages per pipeline, independent of the
/// parser's stage cap.
const MAX_PIPELINE: usize = 128;

/// Run a command set as one pipeline: spawn every runnable stage with its
/// standard output fed into the next stage's standard input, then block
/// until the foreground stages have terminated.
///
/// Returns the last foreground stage's exit code.
pub fn execute(set: &CommandSet, session: &mut Session) -> i32 {
    if let Err(e) = run_pipeline(set, session) {
        eprintln!("mysh: pipe: {e}");
        // Already-launched stages are left running; fall through to the
        // foreground wait so they are still reaped this iteration.
    }
    session.wait_foreground()
}

/// Launch the stages in pipeline order. The only error that escapes is
/// pipe allocation failure, which aborts the remainder of the chain.
fn run_pipeline(set: &CommandSet, session: &mut Session) -> io::Result<()> {
    // Read end of the previous stage's output pipe, owned here until the
    // next runnable stage claims it as standard input.
    let mut carried_input: Option<PipeReader> = None;

    for (i, stage) in set.iter().enumerate().take(MAX_PIPELINE) {
        // A degenerate stage consumes no pipe; the carried read end stays
        // in place for whatever runnable stage comes next.
        if !stage.is_runnable() {
            continue;
        }

        let input = carried_input.take();

        let output = if i == set.len() - 1 {
            None
        } else {
            let (reader, writer) = os_pipe::pipe()?;
            carried_input = Some(reader);
            Some(writer)
        };

        // Both endpoints move into the stage builder inside `launch` and
        // are dropped with it, so the parent's copy of the write end is
        // closed before the next stage spawns.
        launch(stage, input, output, session);
    }

    Ok(())
}

/// Spawn one stage. File redirections bind first, pipe endpoints second,
/// so a pipe is the final binding when both target the same stream. On any
/// failure the stage is reported and dropped; its pipe endpoints close with
/// it, and the rest of the pipeline proceeds against a severed stream.
fn launch(
    stage: &Command,
    input: Option<PipeReader>,
    output: Option<PipeWriter>,
    session: &mut Session,
) {
    if !stage.is_runnable() {
        return;
    }

    let program = &stage.args[0];
    let mut child = process::Command::new(program);
    child.args(&stage.args[1..]);

    if let Err(message) = redirect::apply(stage, &mut child) {
        eprintln!("mysh: {message}");
        return;
    }
    if let Some(reader) = input {
        child.stdin(Stdio::from(reader));
    }
    if let Some(writer) = output {
        child.stdout(Stdio::from(writer));
    }

    match child.spawn() {
        Ok(spawned) => {
            if stage.background {
                println!("[Background PID {}]", spawned.id());
                session.adopt_background(spawned, stage.command_line());
            } else {
                session.track_foreground(spawned);
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            eprintln!("mysh: command not found: {program}");
        }
        Err(e) => {
            eprintln!("mysh: {program}: {e}");
        }
    }
}
