//! Hotkey legend shown under the dev-loop output.

use crossterm::terminal;
use owo_colors::OwoColorize;

use super::{Task, TaskColor};
use crate::logger;
use crate::utils::exec::strip_ansi;

/// Renders the legend and remembers where it left it.
#[derive(Debug, Default)]
pub struct Legend {
    /// Lines printed by the last render
    lines: usize,
    /// Output generation right after the last render
    mark: Option<usize>,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print the legend for the enabled tasks.
    ///
    /// The previous legend is cleared first when nothing has been printed
    /// after it; otherwise it stays in the scrollback.
    pub fn render<C>(&mut self, tasks: &[Task<C>]) {
        let width = terminal::size().map(|(cols, _)| cols as usize).unwrap_or(80);
        let text = format_legend(tasks, width);

        if self.mark == Some(logger::output_mark()) {
            logger::clear_lines_above(self.lines);
        }
        self.lines = text.split('\n').count();
        logger::raw(&text);
        self.mark = Some(logger::output_mark());
    }
}

fn paint(key: &str, color: TaskColor) -> String {
    match color {
        TaskColor::Red => key.red().to_string(),
        TaskColor::Green => key.green().to_string(),
        TaskColor::Cyan => key.cyan().to_string(),
        TaskColor::Yellow => key.yellow().to_string(),
        TaskColor::Magenta => key.magenta().to_string(),
    }
}

/// `key to Label` for each enabled task (first key only), on one line when
/// it fits in `width` columns, one entry per line otherwise.
pub fn format_legend<C>(tasks: &[Task<C>], width: usize) -> String {
    let prefix = format!("🦌 Press{} ", ":".bright_black());
    let separator = format!(" {} ", "•".bright_black());

    let entries: Vec<String> = tasks
        .iter()
        .filter(|task| !task.disabled)
        .filter_map(|task| {
            let key = task.keys.first()?;
            Some(format!("{} to {}", paint(key, task.color), task.label.bold()))
        })
        .collect();

    let line = format!("{prefix}{}", entries.join(&separator));
    if strip_ansi(&line).chars().count() <= width {
        return line;
    }

    let mut wrapped = prefix;
    for entry in &entries {
        wrapped.push('\n');
        wrapped.push_str(&separator);
        wrapped.push_str(entry);
    }
    wrapped
}
