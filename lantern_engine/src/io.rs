//! The I/O boundary.
//!
//! Handlers and the engine print into a buffer; the buffer is drained once
//! per turn. [`ConsoleIo`] drains to stdout with prose wrapped to the
//! terminal; [`BufferedIo`] just hands the drained text back, which is what
//! the tests assert against.

use crate::style::GameStyle;
use log::{error, warn};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::VecDeque;
use textwrap::{fill, termwidth};

/// Line-oriented, buffered I/O used by the engine.
pub trait IoHandler {
    /// Buffer one block of prose for this turn.
    fn print(&mut self, text: &str);

    /// Atomically drain the buffer, returning everything printed since the
    /// last flush. Implementations may also emit the text somewhere.
    fn flush(&mut self) -> String;

    /// Read the next input line, or `None` when input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Option<String>;
}

/// In-memory I/O for tests and scripted runs.
#[derive(Debug, Default)]
pub struct BufferedIo {
    buffer: Vec<String>,
    input: VecDeque<String>,
}

impl BufferedIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a line for a later `read_line`.
    pub fn queue_input(&mut self, line: &str) {
        self.input.push_back(line.to_string());
    }

    /// Peek at the pending output without draining it.
    pub fn pending(&self) -> &[String] {
        &self.buffer
    }
}

impl IoHandler for BufferedIo {
    fn print(&mut self, text: &str) {
        self.buffer.push(text.to_string());
    }

    fn flush(&mut self) -> String {
        let drained = self.buffer.join("\n");
        self.buffer.clear();
        drained
    }

    fn read_line(&mut self, _prompt: &str) -> Option<String> {
        self.input.pop_front()
    }
}

/// Interactive console I/O: rustyline for input with history, wrapped
/// prose on stdout.
pub struct ConsoleIo {
    buffer: Vec<String>,
    editor: DefaultEditor,
}

impl ConsoleIo {
    /// # Errors
    /// Fails if the line editor cannot be initialized (e.g. no terminal).
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            buffer: Vec::new(),
            editor: DefaultEditor::new()?,
        })
    }
}

impl IoHandler for ConsoleIo {
    fn print(&mut self, text: &str) {
        self.buffer.push(text.to_string());
    }

    fn flush(&mut self) -> String {
        let drained = self.buffer.join("\n");
        let width = termwidth();
        for block in &self.buffer {
            for line in block.lines() {
                println!("{}", fill(line, width));
            }
        }
        if !self.buffer.is_empty() {
            println!();
        }
        self.buffer.clear();
        drained
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        match self.editor.readline(&prompt.prompt_style().to_string()) {
            Ok(line) => {
                if !line.trim().is_empty()
                    && let Err(err) = self.editor.add_history_entry(line.as_str())
                {
                    warn!("failed to record input history: {err}");
                }
                Some(line)
            },
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => None,
            Err(err) => {
                error!("failed to read input: {err}");
                None
            },
        }
    }
}
