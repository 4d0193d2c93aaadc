mod command;
mod executor;
mod jobs;
mod parser;
mod redirect;

use std::io::{self, IsTerminal, Write};

use crate::command::MAX_LINE;
use crate::jobs::Session;

fn main() {
    ctrlc::set_handler(|| {
        println!();
        let _ = io::stdout().flush();
    })
    .expect("Failed to set Ctrl-C handler");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    // Piped input gets no prompt, so the binary stays scriptable.
    let interactive = stdin.is_terminal();

    let mut session = Session::new();
    let mut last_exit_code: i32 = 0;

    loop {
        session.collect_background();

        if interactive {
            print!("mysh: ");
            if stdout.flush().is_err() {
                break;
            }
        }

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => break, // end of input
            Ok(_) => {
                if input.len() >= MAX_LINE {
                    eprintln!("mysh: input line too long");
                    break;
                }

                let trimmed = input.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let tokens = parser::tokenize(trimmed);
                let parsed = parser::parse(&tokens);
                if let Some(error) = &parsed.error {
                    eprintln!("mysh: {error}");
                }
                if !parsed.set.is_empty() {
                    last_exit_code = executor::execute(&parsed.set, &mut session);
                }
            }
            Err(error) => {
                eprintln!("mysh: error reading input: {error}");
                break;
            }
        }
    }

    // Sweep up any already-finished stray children on the way out.
    session.collect_background();
    std::process::exit(last_exit_code);
}
