use std::fs::{File, OpenOptions};
use std::io;
use std::process::{self, Stdio};

use crate::command::Command;

/// Open a stage's input redirection file for reading.
pub fn open_input(path: &str) -> io::Result<File> {
    File::open(path)
}

/// Open a stage's output redirection file for writing, creating it with
/// owner-only permissions, truncating unless `append` is set.
pub fn open_output(path: &str, append: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true);
    if append {
        options.append(true);
    } else {
        options.truncate(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

/// Bind a stage's file redirections onto the process builder.
///
/// Called before any pipe endpoint is bound, so that when a file and a pipe
/// both target the same stream, the pipe ends up as the final binding.
///
/// An open failure is returned as a ready-to-print message naming the path
/// and the reason; the caller reports it and drops the stage, leaving
/// siblings and the pipe chain untouched.
pub fn apply(stage: &Command, child: &mut process::Command) -> Result<(), String> {
    if let Some(path) = &stage.input_file {
        let file = open_input(path).map_err(|e| format!("cannot open {path}: {e}"))?;
        child.stdin(Stdio::from(file));
    }

    if let Some(path) = &stage.output_file {
        let file = open_output(path, stage.append)
            .map_err(|e| format!("cannot open {path}: {e}"))?;
        child.stdout(Stdio::from(file));
    }

    Ok(())
}
