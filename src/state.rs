use crate::data_models::SearchResult;

/// Which remote call a running sequence is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Indexing,
    Searching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrchestrationStatus {
    #[default]
    Idle,
    Running(Phase),
}

impl OrchestrationStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, OrchestrationStatus::Running(_))
    }
}

/// The two free-text fields the user fills in before searching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputForm {
    url: String,
    query: String,
}

impl InputForm {
    pub fn new(url: &str, query: &str) -> Self {
        Self {
            url: url.to_string(),
            query: query.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_url(&mut self, url: &str) {
        self.url = url.to_string();
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn submit_enabled(&self) -> bool {
        is_submittable(&self.url, &self.query)
    }
}

pub(crate) fn is_submittable(url: &str, query: &str) -> bool {
    !url.trim().is_empty() && !query.trim().is_empty()
}

/// Results of the latest successful search plus the one expanded entry.
///
/// `expanded` always indexes into `results`; every replacement clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultStore {
    results: Vec<SearchResult>,
    expanded: Option<usize>,
    searched: bool,
}

impl ResultStore {
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded == Some(index)
    }

    /// True once any search has completed, even with zero hits.
    pub fn has_searched(&self) -> bool {
        self.searched
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub(crate) fn replace(&mut self, results: Vec<SearchResult>) {
        self.results = results;
        self.expanded = None;
        self.searched = true;
    }

    /// Collapses `index` if it is the expanded entry, otherwise expands it.
    /// Indexes outside the current results are ignored. Returns whether the
    /// expansion changed.
    pub fn toggle_expansion(&mut self, index: usize) -> bool {
        if index >= self.results.len() {
            return false;
        }
        self.expanded = if self.expanded == Some(index) {
            None
        } else {
            Some(index)
        };
        true
    }
}

/// Everything the view reads, owned by a single [`crate::orchestrator::Orchestrator`].
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub input: InputForm,
    pub status: OrchestrationStatus,
    pub store: ResultStore,
    /// Bumped each time a run starts; results are only applied for the
    /// generation that is still current.
    pub(crate) generation: u64,
}

impl AppState {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
