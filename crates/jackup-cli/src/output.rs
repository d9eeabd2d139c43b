//! Terminal rendering: tables and result colouring

use chrono::TimeDelta;
use colored::{Color, Colorize};
use jackup_core::{ProfileResult, ProfileStatus, SyncTier};

/// A table cell, optionally coloured.
#[derive(Debug, Clone)]
pub struct Cell {
    text: String,
    color: Option<Color>,
}

impl Cell {
    pub fn colored(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }

    pub fn render(&self) -> String {
        match self.color {
            Some(color) => self.text.color(color).to_string(),
            None => self.text.clone(),
        }
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self { text, color: None }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::from(text.to_string())
    }
}

/// Left-aligned columns separated by two spaces, with a bold header.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.text.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let mut out = String::new();

        let header = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:<w$}", h, w = *w))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(&header.trim_end().bold().to_string());
        out.push('\n');

        for row in &self.rows {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| {
                    let pad = w.saturating_sub(cell.text.chars().count());
                    format!("{}{}", cell.render(), " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ");
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

pub fn tier_color(tier: SyncTier) -> Color {
    match tier {
        SyncTier::Full => Color::Green,
        SyncTier::Partial => Color::Yellow,
        SyncTier::Failed => Color::Red,
    }
}

/// One-cell description of how a profile's run went.
pub fn outcome_cell(result: &ProfileResult) -> Cell {
    let ratio = format!("{}/{}", result.completed, result.total);
    match result.status {
        ProfileStatus::Completed if result.total == 0 => Cell::from("nothing to do"),
        ProfileStatus::Completed => Cell::colored(ratio, tier_color(result.tier())),
        ProfileStatus::Interrupted => Cell::colored(format!("{} (interrupted)", ratio), Color::Red),
        ProfileStatus::AlreadyRunning { .. } => Cell::colored("already running", Color::Red),
        ProfileStatus::NotFound => Cell::colored("no such profile", Color::Red),
        ProfileStatus::Cancelled => Cell::colored("cancelled", Color::Red),
        ProfileStatus::Failed { .. } => Cell::colored("failed", Color::Red),
    }
}

/// `1h 02m 03s`, `2m 05s` or `4.2s`.
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let millis = elapsed.num_milliseconds().max(0);
    let secs = millis / 1000;
    if secs >= 3600 {
        format!("{}h {:02}m {:02}s", secs / 3600, secs % 3600 / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{}.{}s", secs, millis % 1000 / 100)
    }
}
