//! Interactive device picker on the terminal.

use impterm_ble::{DevicePicker, DeviceSummary, LinkError, Selection};
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

/// Numbered device menu on stderr, answered on stdin.
///
/// An empty answer, `q` or end of input dismisses the prompt.
pub struct StdinPicker;

impl DevicePicker for StdinPicker {
    async fn choose(&self, candidates: &[DeviceSummary]) -> impterm_ble::Result<Selection> {
        let mut menu = String::from("Terminals in range:\n");
        for (index, candidate) in candidates.iter().enumerate() {
            let _ = writeln!(menu, "  [{}] {candidate}", index + 1);
        }
        let count = candidates.len();

        tokio::task::spawn_blocking(move || prompt(&menu, count))
            .await
            .map_err(|e| LinkError::communication(format!("Device prompt failed: {e}")))?
            .map_err(|e| LinkError::communication(format!("Failed to read selection: {e}")))
    }
}

fn prompt(menu: &str, count: usize) -> io::Result<Selection> {
    let stdin = io::stdin();
    let mut stderr = io::stderr();
    write!(stderr, "{menu}")?;

    let mut line = String::new();
    loop {
        write!(stderr, "Select a terminal [1-{count}, empty to cancel]: ")?;
        stderr.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(Selection::Cancelled);
        }
        match parse_selection(&line, count) {
            Some(selection) => return Ok(selection),
            None => writeln!(stderr, "Enter a number between 1 and {count}")?,
        }
    }
}

/// Parse an operator answer. `None` means the answer should be asked again.
pub fn parse_selection(answer: &str, count: usize) -> Option<Selection> {
    let answer = answer.trim();
    if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
        return Some(Selection::Cancelled);
    }
    match answer.parse::<usize>() {
        Ok(number) if (1..=count).contains(&number) => Some(Selection::Device(number - 1)),
        _ => None,
    }
}
