use std::fmt;
use std::mem;

use crate::command::{Command, CommandSet, MAX_ARGS, MAX_STAGES};

/// Split one input line into whitespace-separated tokens. Operators are
/// recognized downstream, and only as standalone tokens: `a|b` is one
/// ordinary argument, `a | b` is two stages.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Why a scan stopped before consuming every token. The stages accumulated
/// up to that point are still returned and still run.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A redirection operator was the last token on the line.
    MissingFilename(&'static str),
    /// More than [`MAX_STAGES`] stages; the rest of the line is dropped.
    TooManyStages,
    /// More than [`MAX_ARGS`] arguments in one stage.
    TooManyArgs,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingFilename(op) => {
                write!(f, "syntax error: expected filename after '{op}'")
            }
            ParseError::TooManyStages => {
                write!(f, "too many pipeline stages (limit {MAX_STAGES})")
            }
            ParseError::TooManyArgs => {
                write!(f, "too many arguments in one command (limit {MAX_ARGS})")
            }
        }
    }
}

/// Outcome of scanning one token list: a (possibly partial) command set,
/// plus the error that cut the scan short, if any.
#[derive(Debug)]
pub struct Parsed {
    pub set: CommandSet,
    pub error: Option<ParseError>,
}

/// Scan tokens left to right into pipeline stages.
///
/// `&` marks the stage currently being accumulated as background — it does
/// not end the stage. `<`, `>` and `>>` consume the following token as a
/// file path; a repeated operator overwrites the earlier path. `|` closes
/// the current stage (argument-less stages included) and resets every flag
/// for the next one. Any other token is an argument.
///
/// On error the scan stops, but arguments already accumulated for the
/// current stage are still finalized, so a line like `cmd <` runs `cmd`
/// after the missing-filename report.
pub fn parse(tokens: &[String]) -> Parsed {
    let mut set = CommandSet::new();
    let mut current = Command::new();
    let mut error = None;

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].as_str() {
            "&" => {
                current.background = true;
            }
            op @ ("<" | ">" | ">>") => {
                i += 1;
                let Some(path) = tokens.get(i) else {
                    error = Some(ParseError::MissingFilename(match op {
                        "<" => "<",
                        ">" => ">",
                        _ => ">>",
                    }));
                    break;
                };
                match op {
                    "<" => current.input_file = Some(path.clone()),
                    ">" => {
                        current.output_file = Some(path.clone());
                        current.append = false;
                    }
                    _ => {
                        current.output_file = Some(path.clone());
                        current.append = true;
                    }
                }
            }
            "|" => {
                if !set.push(mem::take(&mut current)) {
                    error = Some(ParseError::TooManyStages);
                    break;
                }
            }
            arg => {
                if current.args.len() >= MAX_ARGS {
                    error = Some(ParseError::TooManyArgs);
                    break;
                }
                current.args.push(arg.to_string());
            }
        }
        i += 1;
    }

    // Whatever the current stage accumulated before the scan ended still
    // counts, error or not.
    if !current.args.is_empty() && !set.push(current) && error.is_none() {
        error = Some(ParseError::TooManyStages);
    }

    Parsed { set, error }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_line(line: &str) -> Parsed {
        parse(&tokenize(line))
    }

    fn args(parsed: &Parsed, stage: usize) -> Vec<&str> {
        parsed.set.get(stage).unwrap().args.iter().map(String::as_str).collect()
    }

    // ── Tokenizer ──

    #[test]
    fn tokenize_splits_on_whitespace() {
        assert_eq!(tokenize("echo  hello\tworld "), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn tokenize_blank_line_is_empty() {
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn glued_operator_is_an_ordinary_argument() {
        let parsed = parse_line("echo a|b");
        assert_eq!(parsed.set.len(), 1);
        assert_eq!(args(&parsed, 0), vec!["echo", "a|b"]);
    }

    // ── Stage accumulation ──

    #[test]
    fn single_command() {
        let parsed = parse_line("ls -l /tmp");
        assert!(parsed.error.is_none());
        assert_eq!(parsed.set.len(), 1);
        assert_eq!(args(&parsed, 0), vec!["ls", "-l", "/tmp"]);
    }

    #[test]
    fn empty_token_list_yields_empty_set() {
        let parsed = parse(&[]);
        assert!(parsed.error.is_none());
        assert!(parsed.set.is_empty());
    }

    #[test]
    fn pipeline_splits_into_stages() {
        let parsed = parse_line("cat f | sort | uniq -c");
        assert_eq!(parsed.set.len(), 3);
        assert_eq!(args(&parsed, 0), vec!["cat", "f"]);
        assert_eq!(args(&parsed, 1), vec!["sort"]);
        assert_eq!(args(&parsed, 2), vec!["uniq", "-c"]);
    }

    #[test]
    fn pipe_closes_an_argumentless_stage() {
        // `|` always closes the current stage, even an empty one. The
        // executor later skips empty stages without consuming a pipe.
        let parsed = parse_line("| echo hi");
        assert!(parsed.error.is_none());
        assert_eq!(parsed.set.len(), 2);
        assert!(parsed.set.get(0).unwrap().args.is_empty());
        assert_eq!(args(&parsed, 1), vec!["echo", "hi"]);
    }

    #[test]
    fn trailing_pipe_leaves_no_empty_final_stage() {
        let parsed = parse_line("echo hi |");
        assert!(parsed.error.is_none());
        assert_eq!(parsed.set.len(), 1);
    }

    // ── Redirections ──

    #[test]
    fn input_redirection() {
        let parsed = parse_line("sort < data.txt");
        let stage = parsed.set.get(0).unwrap();
        assert_eq!(args(&parsed, 0), vec!["sort"]);
        assert_eq!(stage.input_file.as_deref(), Some("data.txt"));
    }

    #[test]
    fn output_redirection_truncates() {
        let parsed = parse_line("echo hi > out.txt");
        let stage = parsed.set.get(0).unwrap();
        assert_eq!(stage.output_file.as_deref(), Some("out.txt"));
        assert!(!stage.append);
    }

    #[test]
    fn output_redirection_appends() {
        let parsed = parse_line("echo hi >> out.txt");
        let stage = parsed.set.get(0).unwrap();
        assert_eq!(stage.output_file.as_deref(), Some("out.txt"));
        assert!(stage.append);
    }

    #[test]
    fn later_redirection_wins() {
        let parsed = parse_line("cmd > first >> second");
        let stage = parsed.set.get(0).unwrap();
        assert_eq!(stage.output_file.as_deref(), Some("second"));
        assert!(stage.append);
    }

    #[test]
    fn redirections_do_not_cross_pipe_boundary() {
        let parsed = parse_line("cat < in.txt | sort > out.txt");
        let first = parsed.set.get(0).unwrap();
        let second = parsed.set.get(1).unwrap();
        assert_eq!(first.input_file.as_deref(), Some("in.txt"));
        assert!(first.output_file.is_none());
        assert!(second.input_file.is_none());
        assert_eq!(second.output_file.as_deref(), Some("out.txt"));
    }

    // ── Background flag ──

    #[test]
    fn background_marks_current_stage_only() {
        // `&` applies to the stage it appears in; earlier stages of the
        // pipeline stay foreground.
        let parsed = parse_line("cat f | sort &");
        assert!(!parsed.set.get(0).unwrap().background);
        assert!(parsed.set.get(1).unwrap().background);
    }

    #[test]
    fn background_does_not_carry_across_pipe() {
        let parsed = parse_line("sleep 5 & | echo next");
        assert!(parsed.set.get(0).unwrap().background);
        assert!(!parsed.set.get(1).unwrap().background);
    }

    #[test]
    fn background_does_not_end_the_stage() {
        // Tokens after `&` keep accumulating into the same argument vector.
        let parsed = parse_line("sleep 5 & now");
        assert_eq!(parsed.set.len(), 1);
        assert_eq!(args(&parsed, 0), vec!["sleep", "5", "now"]);
        assert!(parsed.set.get(0).unwrap().background);
    }

    // ── Errors stop the scan but keep partial results ──

    #[test]
    fn missing_input_filename() {
        let parsed = parse_line("cat <");
        assert_eq!(parsed.error, Some(ParseError::MissingFilename("<")));
        // The accumulated arguments still form a runnable stage.
        assert_eq!(parsed.set.len(), 1);
        assert_eq!(args(&parsed, 0), vec!["cat"]);
    }

    #[test]
    fn missing_output_filename_after_pipe() {
        let parsed = parse_line("echo one | echo two >");
        assert_eq!(parsed.error, Some(ParseError::MissingFilename(">")));
        assert_eq!(parsed.set.len(), 2);
        assert_eq!(args(&parsed, 1), vec!["echo", "two"]);
    }

    #[test]
    fn missing_append_filename() {
        let parsed = parse_line("echo hi >>");
        assert_eq!(parsed.error, Some(ParseError::MissingFilename(">>")));
    }

    #[test]
    fn redirection_consumes_the_next_token_verbatim() {
        // Only end of line triggers the missing-filename error; an operator
        // in filename position is consumed as the filename.
        let parsed = parse_line("echo kept < | echo more");
        assert!(parsed.error.is_none());
        assert_eq!(parsed.set.len(), 1);
        assert_eq!(args(&parsed, 0), vec!["echo", "kept", "echo", "more"]);
        assert_eq!(parsed.set.get(0).unwrap().input_file.as_deref(), Some("|"));
    }

    #[test]
    fn stage_overflow_keeps_first_ten() {
        let line = (1..=11).map(|n| format!("echo {n}")).collect::<Vec<_>>().join(" | ");
        let parsed = parse_line(&line);
        assert_eq!(parsed.error, Some(ParseError::TooManyStages));
        assert_eq!(parsed.set.len(), MAX_STAGES);
        assert_eq!(args(&parsed, MAX_STAGES - 1), vec!["echo", "10"]);
    }

    #[test]
    fn argument_overflow_is_reported() {
        let line = vec!["x"; MAX_ARGS + 1].join(" ");
        let parsed = parse_line(&line);
        assert_eq!(parsed.error, Some(ParseError::TooManyArgs));
        assert_eq!(parsed.set.get(0).unwrap().args.len(), MAX_ARGS);
    }
}
