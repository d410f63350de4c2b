// src/progress.rs
// =============================================================================
// The running progress line.
//
// Every item fetched overwrites the same terminal line with its path, cut to
// the terminal width so the line never wraps. Log output goes to stderr, so
// warnings end up between progress lines instead of inside them.
// =============================================================================

use crossterm::cursor::MoveToColumn;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::Write;
use unicode_width::UnicodeWidthChar;

const FALLBACK_WIDTH: usize = 80;

#[derive(Debug, Clone)]
pub struct Progress {
    enabled: bool,
    width: usize,
}

impl Progress {
    /// Progress on stdout, sized to the current terminal.
    pub fn terminal() -> Self {
        let width = crossterm::terminal::size()
            .map(|(cols, _)| cols as usize)
            .ok()
            .filter(|w| *w > 0)
            .unwrap_or(FALLBACK_WIDTH);
        Progress {
            enabled: true,
            width,
        }
    }

    pub fn disabled() -> Self {
        Progress {
            enabled: false,
            width: FALLBACK_WIDTH,
        }
    }

    pub fn item(&self, path: &str) {
        if !self.enabled {
            return;
        }
        let line = truncate_to_width(path, self.width);
        let mut out = std::io::stdout();
        // Progress is best effort; a closed stdout must not stop the crawl
        let _ = out
            .queue(Clear(ClearType::CurrentLine))
            .and_then(|o| o.queue(MoveToColumn(0)))
            .and_then(|o| o.queue(SetForegroundColor(Color::Green)))
            .and_then(|o| o.queue(Print(line)))
            .and_then(|o| o.queue(ResetColor))
            .and_then(|o| o.flush());
    }

    /// Ends the progress line so the summary starts on a fresh one.
    pub fn finish(&self) {
        if self.enabled {
            println!();
        }
    }
}

/// Cuts `text` so it occupies at most `width` terminal columns.
pub fn truncate_to_width(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            return &text[..idx];
        }
        used += w;
    }
    text
}
