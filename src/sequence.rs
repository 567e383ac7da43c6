use crate::api::ServiceError;
use crate::data_models::SearchResult;
use crate::state::{Phase, is_submittable};

/// Index-then-search as an explicit state machine, free of any I/O.
///
/// The driver executes the [`Step`] it is handed and feeds the completion
/// back as an [`Event`]:
/// ```text
///     start(url, query)            -> Index { url }
///     Indexed(Ok)      @ Indexing  -> Search { query }
///     Indexed(Err)     @ Indexing  -> Finish(IndexFailed)
///     Searched(Ok(rs)) @ Searching -> Finish(Searched(rs))
///     Searched(Err)    @ Searching -> Finish(SearchFailed)
///     anything else                -> Finish(Unexpected)
/// ```
/// A `Search` step is only ever produced after a successful `Indexed`.
#[derive(Debug)]
pub struct Sequence {
    url: String,
    query: String,
    state: SequenceState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SequenceState {
    Indexing,
    Searching,
    Finished,
}

#[derive(Debug, PartialEq)]
pub enum Step {
    Index { url: String },
    Search { query: String },
    Finish(Outcome),
}

#[derive(Debug)]
pub enum Event {
    Indexed(Result<(), ServiceError>),
    Searched(Result<Vec<SearchResult>, ServiceError>),
}

#[derive(Debug)]
pub enum Outcome {
    Searched(Vec<SearchResult>),
    IndexFailed(ServiceError),
    SearchFailed(ServiceError),
    Unexpected(String),
}

impl PartialEq for Outcome {
    // ServiceError carries reqwest errors, so failures compare by kind only.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Outcome::Searched(a), Outcome::Searched(b)) => a == b,
            (Outcome::IndexFailed(_), Outcome::IndexFailed(_)) => true,
            (Outcome::SearchFailed(_), Outcome::SearchFailed(_)) => true,
            (Outcome::Unexpected(a), Outcome::Unexpected(b)) => a == b,
            _ => false,
        }
    }
}

impl Sequence {
    /// Returns `None` when either input is blank after trimming; nothing
    /// should be sent in that case.
    pub fn start(url: &str, query: &str) -> Option<(Sequence, Step)> {
        if !is_submittable(url, query) {
            return None;
        }
        // The service receives the trimmed values, the same ones the blank
        // check looked at; surrounding whitespace never reaches the wire.
        let seq = Sequence {
            url: url.trim().to_string(),
            query: query.trim().to_string(),
            state: SequenceState::Indexing,
        };
        let step = Step::Index {
            url: seq.url.clone(),
        };
        Some((seq, step))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The remote call currently outstanding, `None` once finished.
    pub fn phase(&self) -> Option<Phase> {
        match self.state {
            SequenceState::Indexing => Some(Phase::Indexing),
            SequenceState::Searching => Some(Phase::Searching),
            SequenceState::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == SequenceState::Finished
    }

    pub fn advance(&mut self, event: Event) -> Step {
        let (next, step) = match (self.state, event) {
            (SequenceState::Indexing, Event::Indexed(Ok(()))) => (
                SequenceState::Searching,
                Step::Search {
                    query: self.query.clone(),
                },
            ),
            (SequenceState::Indexing, Event::Indexed(Err(e))) => (
                SequenceState::Finished,
                Step::Finish(Outcome::IndexFailed(e)),
            ),
            (SequenceState::Searching, Event::Searched(Ok(results))) => (
                SequenceState::Finished,
                Step::Finish(Outcome::Searched(results)),
            ),
            (SequenceState::Searching, Event::Searched(Err(e))) => (
                SequenceState::Finished,
                Step::Finish(Outcome::SearchFailed(e)),
            ),
            (state, event) => (
                SequenceState::Finished,
                Step::Finish(Outcome::Unexpected(format!(
                    "event {} while {state:?}",
                    event.name()
                ))),
            ),
        };
        self.state = next;
        step
    }
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::Indexed(_) => "Indexed",
            Event::Searched(_) => "Searched",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Operation;
    use reqwest::StatusCode;

    fn index_error() -> ServiceError {
        ServiceError::Status {
            operation: Operation::Index,
            status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn search_error() -> ServiceError {
        ServiceError::Status {
            operation: Operation::Search,
            status: StatusCode::BAD_GATEWAY,
        }
    }

    #[test]
    fn test_blank_inputs_do_not_start() {
        for (url, query) in [("", "q"), ("u", ""), ("  ", "q"), ("u", " \t "), ("", "")] {
            assert!(Sequence::start(url, query).is_none(), "{url:?} {query:?}");
        }
    }

    #[test]
    fn test_start_issues_index_first() {
        let (seq, step) = Sequence::start(" https://example.com ", " pricing ").unwrap();
        assert_eq!(
            step,
            Step::Index {
                url: "https://example.com".to_string()
            }
        );
        assert_eq!(seq.phase(), Some(Phase::Indexing));
        assert_eq!(seq.query(), "pricing");
    }

    #[test]
    fn test_search_only_after_index_success() {
        let (mut seq, _) = Sequence::start("https://example.com", "pricing").unwrap();
        let step = seq.advance(Event::Indexed(Ok(())));
        assert_eq!(
            step,
            Step::Search {
                query: "pricing".to_string()
            }
        );
        assert_eq!(seq.phase(), Some(Phase::Searching));
    }

    #[test]
    fn test_index_failure_finishes_without_search() {
        let (mut seq, _) = Sequence::start("https://example.com", "pricing").unwrap();
        let step = seq.advance(Event::Indexed(Err(index_error())));
        assert_eq!(step, Step::Finish(Outcome::IndexFailed(index_error())));
        assert!(seq.is_finished());
        assert_eq!(seq.phase(), None);
    }

    #[test]
    fn test_search_success_carries_results_in_order() {
        let results = vec![
            SearchResult::new("Pricing", "/pricing", "Our plans start at $9").with_score(87.4),
            SearchResult::new("About", "/about", ""),
        ];
        let (mut seq, _) = Sequence::start("https://example.com", "pricing").unwrap();
        seq.advance(Event::Indexed(Ok(())));
        let step = seq.advance(Event::Searched(Ok(results.clone())));
        assert_eq!(step, Step::Finish(Outcome::Searched(results)));
        assert!(seq.is_finished());
    }

    #[test]
    fn test_search_failure() {
        let (mut seq, _) = Sequence::start("https://example.com", "pricing").unwrap();
        seq.advance(Event::Indexed(Ok(())));
        let step = seq.advance(Event::Searched(Err(search_error())));
        assert_eq!(step, Step::Finish(Outcome::SearchFailed(search_error())));
    }

    #[test]
    fn test_search_event_while_indexing_is_unexpected() {
        let (mut seq, _) = Sequence::start("https://example.com", "pricing").unwrap();
        let step = seq.advance(Event::Searched(Ok(vec![])));
        assert!(matches!(step, Step::Finish(Outcome::Unexpected(_))));
        assert!(seq.is_finished());
    }

    #[test]
    fn test_events_after_finish_are_unexpected() {
        let (mut seq, _) = Sequence::start("https://example.com", "pricing").unwrap();
        seq.advance(Event::Indexed(Err(index_error())));
        let step = seq.advance(Event::Indexed(Ok(())));
        assert!(matches!(step, Step::Finish(Outcome::Unexpected(_))));
    }
}
