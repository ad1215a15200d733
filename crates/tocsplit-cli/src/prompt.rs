use std::io::{BufRead, Write};
use std::path::PathBuf;

use tocsplit_core::{CoreError, ManualRequest, OperatorInput};

/// Asks the person at the terminal for the first chapter's physical page.
///
/// Re-prompts until the answer is a whole number within the document.
pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl TerminalOperator<std::io::StdinLock<'static>, std::io::Stderr> {
    pub fn stdin() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, request: &ManualRequest<'_>) -> std::io::Result<Option<usize>> {
        let entry = request.entry;
        writeln!(self.output)?;
        writeln!(self.output, "--- MANUAL PAGE OFFSET REQUIRED (Fallback) ---")?;
        writeln!(
            self.output,
            "Automatic detection failed. We need the file page where chapter '{}' (Printed Page {}) appears.",
            entry.label(),
            entry.printed_page
        )?;
        writeln!(
            self.output,
            "1. Open your PDF and navigate to the start of that chapter."
        )?;

        loop {
            write!(
                self.output,
                "2. Enter the actual file page number (1-{}) shown in your PDF viewer for that page: ",
                request.page_count
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            match line.trim().parse::<usize>() {
                Ok(page) if (1..=request.page_count).contains(&page) => return Ok(Some(page)),
                Ok(page) => writeln!(
                    self.output,
                    "Invalid input: page {page} is outside 1-{}. Please try again.",
                    request.page_count
                )?,
                Err(_) => writeln!(
                    self.output,
                    "Invalid input: '{}'. Please enter a valid whole number.",
                    line.trim()
                )?,
            }
        }
    }
}

impl<R: BufRead, W: Write> OperatorInput for TerminalOperator<R, W> {
    fn first_chapter_page(&mut self, request: &ManualRequest<'_>) -> Result<usize, CoreError> {
        match self.ask(request) {
            Ok(Some(page)) => Ok(page),
            Ok(None) => Err(CoreError::OperatorInput(
                "input closed before a page number was entered".to_string(),
            )),
            Err(e) => Err(CoreError::OperatorInput(e.to_string())),
        }
    }
}

/// Ask for the input PDF path when none was given.
pub fn ask_input_path(input: &mut impl BufRead, output: &mut impl Write) -> anyhow::Result<PathBuf> {
    write!(output, "Enter the path to the PDF file to split: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    let trimmed = line.trim().trim_matches(|c: char| c == '"' || c == '\'');
    if trimmed.is_empty() {
        anyhow::bail!("no input PDF given");
    }
    Ok(PathBuf::from(trimmed))
}
