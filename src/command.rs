/// Upper bound on pipeline stages per input line. Exceeding it is a reported
/// parse condition; the stages accumulated up to the limit still run.
pub const MAX_STAGES: usize = 10;

/// Upper bound on arguments in a single stage, program name included.
pub const MAX_ARGS: usize = 100;

/// Upper bound on one input line, in bytes. An oversized line is fatal to
/// the interpreter (checked by the read loop, before tokenization).
pub const MAX_LINE: usize = 1024;

/// One pipeline stage: an argument vector plus its I/O and scheduling flags.
///
/// Built up incrementally by the parser; read-only once the stage is closed
/// by a `|` or by end of input. Redirections and the background flag belong
/// to this stage alone and never carry across a `|` boundary.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Command {
    /// Program name first, then its arguments.
    pub args: Vec<String>,
    /// Read standard input from this file instead of the pipe/inherited input.
    pub input_file: Option<String>,
    /// Write standard output to this file instead of the pipe/inherited output.
    pub output_file: Option<String>,
    /// With `output_file`: append instead of truncating.
    pub append: bool,
    /// Spawn and return to the prompt without waiting for this stage.
    pub background: bool,
}

impl Command {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this stage can be launched at all. A stage closed by `|`
    /// with no arguments is legal in the command set but is skipped by the
    /// executor without consuming a pipe.
    pub fn is_runnable(&self) -> bool {
        match self.args.first() {
            Some(program) => !program.is_empty() && program.len() < MAX_LINE,
            None => false,
        }
    }

    /// The stage as one display line, for background-job announcements.
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// An ordered pipeline: stage `i`'s standard output feeds stage `i + 1`'s
/// standard input. Bounded at [`MAX_STAGES`].
#[derive(Debug, Default)]
pub struct CommandSet {
    stages: Vec<Command>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized stage. Returns `false` when the set is full; the
    /// stage is discarded and the caller reports the condition.
    pub fn push(&mut self, stage: Command) -> bool {
        if self.stages.len() >= MAX_STAGES {
            return false;
        }
        self.stages.push(stage);
        true
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.stages.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Command> {
        self.stages.get(index)
    }
}
