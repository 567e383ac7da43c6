//! Projection of [`AppState`] into something displayable.
//!
//! The view owns no state: [`View::project`] is a pure function of the
//! current snapshot, and the only interaction it offers back is toggling
//! a result's expansion through the orchestrator.

use std::fmt;

use crate::data_models::SearchResult;
use crate::state::AppState;

pub const LOADING_MESSAGE: &str = "Loading...";
pub const NO_SOURCE_PLACEHOLDER: &str = "No HTML available";
pub const EMPTY_BEFORE_SEARCH: &str = "Enter a URL and a query, then search.";
pub const EMPTY_AFTER_SEARCH: &str = "No results found.";

const SOURCE_WRAP_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// Show the source exactly as the service sent it.
    #[default]
    Raw,
    /// Render HTML sources to wrapped plain text.
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub snippet_chars: usize,
    pub source_format: SourceFormat,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            snippet_chars: 200,
            source_format: SourceFormat::Raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub submit_enabled: bool,
    pub body: ViewBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewBody {
    Loading,
    Results(Vec<ResultCard>),
    Empty { searched: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    /// Position in the result set, 0-based.
    pub index: usize,
    pub title: String,
    pub path: String,
    pub score_percent: Option<i64>,
    pub snippet_preview: String,
    /// The source panel text when this entry is expanded.
    pub source: Option<String>,
}

impl ResultCard {
    pub fn toggle_label(&self) -> &'static str {
        if self.source.is_some() {
            "▼ View HTML"
        } else {
            "► View HTML"
        }
    }
}

impl View {
    pub fn project(state: &AppState, options: &ViewOptions) -> View {
        let running = state.status.is_running();
        let body = if running {
            ViewBody::Loading
        } else if state.store.is_empty() {
            ViewBody::Empty {
                searched: state.store.has_searched(),
            }
        } else {
            ViewBody::Results(
                state
                    .store
                    .results()
                    .iter()
                    .enumerate()
                    .map(|(index, result)| {
                        ResultCard::project(index, result, state.store.is_expanded(index), options)
                    })
                    .collect(),
            )
        };
        View {
            submit_enabled: state.input.submit_enabled() && !running,
            body,
        }
    }
}

impl ResultCard {
    fn project(
        index: usize,
        result: &SearchResult,
        expanded: bool,
        options: &ViewOptions,
    ) -> ResultCard {
        ResultCard {
            index,
            title: result.title.clone(),
            path: result.path.clone(),
            score_percent: score_percent(result.score),
            snippet_preview: preview(&result.snippet, options.snippet_chars),
            source: expanded.then(|| source_text(result, options.source_format)),
        }
    }
}

/// Rounds half up, like the browser client did. Zero, NaN and absent
/// scores get no badge.
pub fn score_percent(score: Option<f64>) -> Option<i64> {
    let score = score?;
    if !score.is_finite() || score == 0.0 {
        return None;
    }
    Some((score + 0.5).floor() as i64)
}

/// Cuts `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// `html`, else `snippet`, else a placeholder. Empty strings count as absent.
pub fn source_text(result: &SearchResult, format: SourceFormat) -> String {
    if let Some(html) = result.html.as_deref().filter(|h| !h.is_empty()) {
        return match format {
            SourceFormat::Raw => html.to_string(),
            SourceFormat::Text => html_to_text(html),
        };
    }
    if !result.snippet.is_empty() {
        return result.snippet.clone();
    }
    NO_SOURCE_PLACEHOLDER.to_string()
}

fn html_to_text(html: &str) -> String {
    match html2text::from_read(html.as_bytes(), SOURCE_WRAP_WIDTH) {
        Ok(text) => text.trim_end().to_string(),
        Err(e) => {
            log::warn!("could not render html as text, showing raw source: {e}");
            html.to_string()
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            ViewBody::Loading => writeln!(f, "{LOADING_MESSAGE}"),
            ViewBody::Empty { searched: false } => writeln!(f, "{EMPTY_BEFORE_SEARCH}"),
            ViewBody::Empty { searched: true } => writeln!(f, "{EMPTY_AFTER_SEARCH}"),
            ViewBody::Results(cards) => {
                for card in cards {
                    write!(f, "{card}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for ResultCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index + 1, self.title)?;
        if let Some(score) = self.score_percent {
            write!(f, "  ({score}% match)")?;
        }
        writeln!(f)?;
        writeln!(f, "    Path: {}", self.path)?;
        if !self.snippet_preview.is_empty() {
            writeln!(f, "    {}", self.snippet_preview)?;
        }
        writeln!(f, "    {}", self.toggle_label())?;
        if let Some(source) = &self.source {
            for line in source.lines() {
                writeln!(f, "    | {line}")?;
            }
        }
        writeln!(f)
    }
}
