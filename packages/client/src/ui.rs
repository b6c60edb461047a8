//! UI utilities for the terminal client.

use std::io::Write;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

/// Redisplay the prompt after printing something
pub fn redisplay_prompt(label: &str) {
    print!("{}> ", label);
    std::io::stdout().flush().ok();
}

/// Print a block of output, then the prompt again
pub fn print_above_prompt(text: &str, label: &str) {
    print!("{}", text);
    redisplay_prompt(label);
}

/// Read lines on a blocking thread (rustyline is synchronous).
///
/// The receiver yields `None` on Ctrl+C / Ctrl+D or when the terminal fails.
pub fn spawn_line_reader(label: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", label);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim_end();
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

/// Successive contents of an input field while `line` is typed word by word,
/// each word followed by a space.
pub fn keystrokes(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    for word in line.split_whitespace() {
        let mut typed = String::new();
        for c in word.chars() {
            typed.push(c);
            values.push(typed.clone());
        }
        typed.push(' ');
        values.push(typed);
    }
    values
}
