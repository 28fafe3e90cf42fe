// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A line-oriented terminal display.

use feedback_engine::{
    display::{FeedbackDisplay, RunMessage},
    errors::DisplayError,
    list::{EntryTag, FeedbackColor, FeedbackEntry},
    progress::{ProgressState, ProgressUpdate},
    summary::RunSummary,
};
use owo_colors::{OwoColorize, Style, style};
use std::io::{self, Write};

/// Writes every change it's sent as a line of text, and keeps a mirror of the list so the final
/// state can be printed at the end.
#[derive(Debug)]
pub(crate) struct ConsoleDisplay<W> {
    writer: W,
    styles: ConsoleStyles,
    entries: Vec<FeedbackEntry>,
}

impl<W: Write> ConsoleDisplay<W> {
    pub(crate) fn new(writer: W, colorize: bool) -> Self {
        let mut styles = ConsoleStyles::default();
        if colorize {
            styles.colorize();
        }
        Self {
            writer,
            styles,
            entries: Vec::new(),
        }
    }

    /// Prints the entries still in the list, then flushes and returns the writer.
    pub(crate) fn finish(mut self) -> io::Result<W> {
        let count = self.entries.len();
        writeln!(
            self.writer,
            "{} remaining {}",
            count.style(self.styles.bold),
            if count == 1 { "entry" } else { "entries" },
        )?;
        for entry in &self.entries {
            writeln!(
                self.writer,
                "  {}: {}",
                entry.category,
                entry.text.style(self.styles.for_color(entry.color)),
            )?;
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_entry_line(&mut self, marker: &str, entry: &FeedbackEntry) -> io::Result<()> {
        let text_style = if marker == "-" {
            self.styles.dimmed
        } else {
            self.styles.for_color(entry.color)
        };
        writeln!(
            self.writer,
            "  {} {}: {}",
            marker.style(self.styles.bold),
            entry.category,
            entry.text.style(text_style),
        )
    }
}

impl<W: Write> FeedbackDisplay for ConsoleDisplay<W> {
    fn insert_entry(&mut self, index: usize, entry: &FeedbackEntry) -> Result<(), DisplayError> {
        self.entries.insert(index, entry.clone());
        self.write_entry_line("+", entry).map_err(DisplayError::Write)
    }

    fn remove_entry(&mut self, index: usize, entry: &FeedbackEntry) -> Result<(), DisplayError> {
        if index < self.entries.len() {
            self.entries.remove(index);
        }
        self.write_entry_line("-", entry).map_err(DisplayError::Write)
    }

    fn clear_entries(&mut self) -> Result<(), DisplayError> {
        let count = self.entries.len();
        self.entries.clear();
        writeln!(
            self.writer,
            "  {}",
            format!("(cleared {count} entries)").style(self.styles.dimmed)
        )
        .map_err(DisplayError::Write)
    }

    fn set_progress(&mut self, update: &ProgressUpdate) -> Result<(), DisplayError> {
        let (label, label_style) = match update.state {
            ProgressState::None => ("idle", self.styles.dimmed),
            ProgressState::Progress => ("running", self.styles.bold),
            ProgressState::Green => ("passed", self.styles.green),
            ProgressState::Red => ("failed", self.styles.red),
        };
        if update.information.is_empty() {
            writeln!(self.writer, "[{}]", label.style(label_style))
        } else {
            writeln!(
                self.writer,
                "[{}] {}",
                label.style(label_style),
                update.information
            )
        }
        .map_err(DisplayError::Write)
    }

    fn set_summary(&mut self, summary: Option<&RunSummary>) -> Result<(), DisplayError> {
        // Nothing is shown for a cleared summary; the next run's messages replace it.
        let Some(summary) = summary else {
            return Ok(());
        };
        writeln!(
            self.writer,
            "{} {}",
            "summary:".style(self.styles.bold),
            summary.text()
        )
        .map_err(DisplayError::Write)
    }

    fn print_message(&mut self, message: &RunMessage) -> Result<(), DisplayError> {
        let mut text_style = self.styles.for_color(message.color());
        if !message.is_normal() {
            text_style = text_style.bold();
        }
        writeln!(self.writer, "{}", message.text.style(text_style)).map_err(DisplayError::Write)
    }

    fn selected_tags(&self) -> Vec<EntryTag> {
        // A terminal has no selection.
        Vec::new()
    }

    fn select_tags(&mut self, _tags: &[EntryTag]) -> Result<(), DisplayError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ConsoleStyles {
    bold: Style,
    dimmed: Style,
    red: Style,
    green: Style,
}

impl ConsoleStyles {
    fn colorize(&mut self) {
        self.bold = style().bold();
        self.dimmed = style().dimmed();
        self.red = style().red();
        self.green = style().green();
    }

    fn for_color(&self, color: FeedbackColor) -> Style {
        match color {
            FeedbackColor::Black => Style::new(),
            FeedbackColor::Red => self.red,
            FeedbackColor::Green => self.green,
        }
    }
}
