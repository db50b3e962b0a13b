//! Interactive line-oriented shell.
//!
//! Holds the current year and tile selection. Changing either triggers a
//! render, the way a selection widget would. No command ever ends the
//! session except `quit` or end of input.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::error;
use viewer_common::TileId;

use crate::pipeline::{CycleOutcome, Viewer, NO_DATA_MESSAGE};

const HELP: &str = "\
Commands:
  years                 list years in the lookup table
  tiles                 list tiles in the lookup table
  year <YEAR>           select a year and render
  select <T1,T2,..|all> select tiles and render
  render                render the current selection
  status                show the selection and cache statistics
  clear-cache           drop every downloaded dataset
  help                  show this help
  quit                  leave the viewer";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Years,
    Tiles,
    Year(i32),
    /// `None` selects every tile
    Select(Option<Vec<TileId>>),
    Render,
    Status,
    ClearCache,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Option<Result<Command, String>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let parsed = match word.to_lowercase().as_str() {
            "years" => Ok(Command::Years),
            "tiles" => Ok(Command::Tiles),
            "year" => rest
                .parse::<i32>()
                .map(Command::Year)
                .map_err(|_| format!("invalid year '{}'", rest)),
            "select" => parse_selection(rest).map(Command::Select),
            "render" => Ok(Command::Render),
            "status" => Ok(Command::Status),
            "clear-cache" => Ok(Command::ClearCache),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{}' (try 'help')", other)),
        };
        Some(parsed)
    }
}

/// Comma or space separated tile list, or `all`.
pub fn parse_selection(text: &str) -> Result<Option<Vec<TileId>>, String> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    let tiles: Vec<TileId> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(TileId::from)
        .collect();
    if tiles.is_empty() {
        return Err("select needs tile ids or 'all'".to_string());
    }
    Ok(Some(tiles))
}

/// Shell state over a loaded viewer.
pub struct Shell {
    viewer: Viewer,
    year: i32,
    selection: Vec<TileId>,
}

impl Shell {
    /// Start on `year` (default: earliest year) with `selection` (default:
    /// every tile).
    pub fn new(viewer: Viewer, year: Option<i32>, selection: Option<Vec<TileId>>) -> Self {
        let index = viewer.index();
        let year = year
            .or_else(|| index.years().into_iter().next())
            .unwrap_or_default();
        let selection = selection.unwrap_or_else(|| index.tiles().into_iter().collect());
        Self {
            viewer,
            year,
            selection,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn selection(&self) -> &[TileId] {
        &self.selection
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Render once, then read commands until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "Arizona Prison Heatmap Viewer. Type 'help' for commands.")?;
        self.render(out).await?;

        let mut lines = input.lines();
        loop {
            write!(out, "viewer> ")?;
            out.flush()?;

            let Some(line) = lines.next_line().await? else {
                writeln!(out)?;
                break;
            };
            match Command::parse(&line) {
                None => continue,
                Some(Err(message)) => writeln!(out, "error: {}", message)?,
                Some(Ok(Command::Quit)) => break,
                Some(Ok(command)) => self.execute(command, out).await?,
            }
        }
        Ok(())
    }

    /// Apply one command. Output errors are the only failures.
    pub async fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Years => {
                let years: Vec<String> = self
                    .viewer
                    .index()
                    .years()
                    .iter()
                    .map(|y| y.to_string())
                    .collect();
                writeln!(out, "{}", years.join(" "))?;
            }
            Command::Tiles => {
                let tiles: Vec<String> = self
                    .viewer
                    .index()
                    .tiles()
                    .iter()
                    .map(|t| t.to_string())
                    .collect();
                writeln!(out, "{}", tiles.join(" "))?;
            }
            Command::Year(year) => {
                if !self.viewer.index().years().contains(&year) {
                    writeln!(out, "note: year {} is not in the lookup table", year)?;
                }
                self.year = year;
                self.render(out).await?;
            }
            Command::Select(selection) => {
                self.selection =
                    selection.unwrap_or_else(|| self.viewer.index().tiles().into_iter().collect());
                self.render(out).await?;
            }
            Command::Render => self.render(out).await?,
            Command::Status => {
                let stats = self.viewer.cache_stats();
                writeln!(out, "year: {}", self.year)?;
                writeln!(out, "tiles: {}", join_tiles(&self.selection))?;
                writeln!(
                    out,
                    "cache: {} datasets, {:.1} MiB, {} hits, {} misses",
                    stats.entries,
                    stats.memory_bytes as f64 / (1024.0 * 1024.0),
                    stats.hits,
                    stats.misses
                )?;
                writeln!(
                    out,
                    "layers: {} prisons, {} cities",
                    self.viewer.prisons().len(),
                    self.viewer.cities().len()
                )?;
            }
            Command::ClearCache => {
                self.viewer.clear_cache();
                writeln!(out, "cache cleared")?;
            }
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Quit => {}
        }
        Ok(())
    }

    async fn render<W: Write>(&mut self, out: &mut W) -> Result<()> {
        match self.viewer.render_cycle(self.year, &self.selection).await {
            Ok(report) => {
                for warning in &report.warnings {
                    writeln!(out, "warning: {}", warning)?;
                }
                match report.outcome {
                    CycleOutcome::Rendered { path, points } => {
                        writeln!(out, "Rendered {} points to {}", points, path.display())?
                    }
                    CycleOutcome::NoData => writeln!(out, "{}", NO_DATA_MESSAGE)?,
                }
            }
            Err(e) => {
                error!(error = %e, year = self.year, "Render failed");
                writeln!(out, "error: {}", e)?;
            }
        }
        Ok(())
    }
}

fn join_tiles(tiles: &[TileId]) -> String {
    if tiles.is_empty() {
        return "(none)".to_string();
    }
    tiles
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
