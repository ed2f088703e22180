use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::binder::{CellRender, WindowSnapshot};
use crate::window::{WEEK_DAYS, WeekStart, month_name};

const CELL_WIDTH: usize = 6;

/// Paints a window snapshot as a plain-text month grid followed by the
/// visible events of each in-month day.
#[derive(Debug, Clone)]
pub struct TextPainter {
    color: bool,
    week_start: WeekStart,
}

impl TextPainter {
    pub fn new(color: bool, week_start: WeekStart) -> Self {
        Self { color, week_start }
    }

    #[tracing::instrument(skip(self, snapshot))]
    pub fn print_window(&self, snapshot: &WindowSnapshot) -> anyhow::Result<()> {
        let color = self.color && io::stdout().is_terminal();
        let mut out = io::stdout().lock();
        self.with_color(color).write_window(&mut out, snapshot)
    }

    fn with_color(&self, color: bool) -> Self {
        Self {
            color,
            week_start: self.week_start,
        }
    }

    pub fn write_window<W: Write>(&self, mut out: W, snapshot: &WindowSnapshot) -> anyhow::Result<()> {
        let title = format!("{} {}", month_name(snapshot.month), snapshot.year);
        let grid_width = CELL_WIDTH * WEEK_DAYS;
        let padding = grid_width.saturating_sub(UnicodeWidthStr::width(title.as_str())) / 2;
        writeln!(out, "{}{}", " ".repeat(padding), title)?;

        for label in self.week_start.day_labels() {
            write!(out, "{}", pad(label, CELL_WIDTH))?;
        }
        writeln!(out)?;

        for week in snapshot.cells.chunks(WEEK_DAYS) {
            for cell in week {
                write!(out, "{}", self.day_cell(cell))?;
            }
            writeln!(out)?;
        }

        let with_events: Vec<&CellRender> = snapshot
            .cells
            .iter()
            .filter(|cell| cell.has_event_list())
            .collect();
        if with_events.is_empty() {
            return Ok(());
        }

        writeln!(out)?;
        for cell in with_events {
            for event in &cell.events {
                let name = self.paint(&event.name, ansi_for(&event.color));
                writeln!(out, "{}  {}  [{}]", cell.date.format("%Y-%m-%d"), name, event.tag)?;
            }
        }

        Ok(())
    }

    fn day_cell(&self, cell: &CellRender) -> String {
        let mut text = if cell.selected {
            format!("[{:>2}]", cell.day)
        } else {
            format!(" {:>2} ", cell.day)
        };
        if cell.has_event_list() {
            text.push('*');
        }

        let text = pad(&text, CELL_WIDTH);
        if !cell.in_month {
            self.paint(&text, "2")
        } else if cell.is_today {
            self.paint(&text, "7")
        } else {
            text
        }
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || code.is_empty() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn pad(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(visible)))
}

/// Closest ANSI foreground for common color names; anything else is unpainted.
fn ansi_for(color: &str) -> &'static str {
    let name = color.trim().to_ascii_lowercase();
    let base = name.trim_end_matches(|c: char| c.is_ascii_digit());
    match base {
        "red" => "31",
        "green" => "32",
        "yellow" | "orange" => "33",
        "blue" | "lightblue" => "34",
        "violet" | "magenta" | "purple" => "35",
        "cyan" => "36",
        "gray" | "grey" => "90",
        _ => "",
    }
}
