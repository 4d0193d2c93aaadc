use std::collections::HashMap;
use std::process::{Child, ExitStatus};

use crate::command::MAX_STAGES;

/// Shell-style exit code for a finished process.
/// On Unix a signal-terminated child has no exit code; the convention is
/// `128 + signal`.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

/// One spawned-and-forgotten background stage, held only until the
/// collector observes its termination.
struct BackgroundJob {
    id: usize,
    command: String,
    child: Child,
}

/// Background children awaiting collection. The table owns the child
/// handles, so nothing else in the interpreter can reap (or double-reap)
/// them.
#[derive(Default)]
struct BackgroundTable {
    jobs: HashMap<usize, BackgroundJob>,
    next_id: usize,
}

impl BackgroundTable {
    fn add(&mut self, child: Child, command: String) {
        self.next_id += 1;
        let id = self.next_id;
        self.jobs.insert(id, BackgroundJob { id, command, child });
    }

    /// Non-blocking sweep: announce and drop every job whose process has
    /// already terminated, discarding its exit status. Jobs still running
    /// stay in the table for a later sweep.
    fn collect(&mut self) {
        let mut done_ids = Vec::new();

        for (id, job) in self.jobs.iter_mut() {
            match job.child.try_wait() {
                Ok(Some(_)) => {
                    println!("[{}]  Done  {}", job.id, job.command);
                    done_ids.push(*id);
                }
                Ok(None) => {} // still running
                Err(e) => {
                    eprintln!("mysh: error checking job {id}: {e}");
                }
            }
        }

        for id in done_ids {
            self.jobs.remove(&id);
        }
    }
}

/// Process bookkeeping for one interpreter session: the foreground registry
/// the interpreter must drain before the next prompt, and the table of
/// background children collected opportunistically.
///
/// The two registries own disjoint `Child` handles, so the foreground and
/// background reaping paths can never race for the same process — each
/// termination is consumed exactly once, by the registry that owns it.
#[derive(Default)]
pub struct Session {
    foreground: Vec<Child>,
    background: BackgroundTable,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly spawned foreground stage. The registry is bounded
    /// by the pipeline stage cap; an overflowing child is left untracked
    /// and the condition is reported.
    pub fn track_foreground(&mut self, child: Child) {
        if self.foreground.len() >= MAX_STAGES {
            eprintln!("mysh: foreground registry full; not waiting for PID {}", child.id());
            return;
        }
        self.foreground.push(child);
    }

    /// Hand a background stage over to the collector.
    pub fn adopt_background(&mut self, child: Child, command: String) {
        self.background.add(child, command);
    }

    /// Block until every registered foreground stage has terminated,
    /// in whatever order the terminations actually happen.
    ///
    /// Returns the exit code of the last-launched stage, the pipeline's
    /// result by shell convention. A wait failure is reported and stops the
    /// wait; the registry is emptied either way.
    pub fn wait_foreground(&mut self) -> i32 {
        let mut last_code = 0;

        for mut child in self.foreground.drain(..) {
            match child.wait() {
                Ok(status) => last_code = exit_code(status),
                Err(e) => {
                    eprintln!("mysh: wait: {e}");
                    break;
                }
            }
        }

        last_code
    }

    /// Non-blocking collection of finished background children. Also the
    /// stray-process cleanup run on the interpreter's exit paths.
    pub fn collect_background(&mut self) {
        self.background.collect();
    }
}
