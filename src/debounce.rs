//! # Suggestion Feed
//!
//! Debounced name lookups for the gate's name input.
//!
//! - Each keystroke bumps a sequence number and cancels the pending lookup
//! - A lookup only fires after [`QUIET_PERIOD`] without input
//! - Results come back tagged with their sequence number; anything older than
//!   the latest input is dropped, however late it arrives
//! - Backend failures are logged and shown as no suggestions
use std::{sync::Arc, time::Duration};

use invite::{MAX_SUGGESTIONS, search_term};
use tokio::{
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
    task::JoinHandle,
    time::sleep,
};
use tracing::{debug, warn};

use crate::api::RsvpApi;

pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

struct Tagged {
    seq: u64,
    suggestions: Vec<String>,
}

pub struct SuggestionFeed {
    api: Arc<dyn RsvpApi>,
    quiet_period: Duration,
    seq: u64,
    awaiting: bool,
    pending: Option<JoinHandle<()>>,
    tx: UnboundedSender<Tagged>,
    rx: UnboundedReceiver<Tagged>,
    suggestions: Vec<String>,
    highlighted: Option<usize>,
}

impl SuggestionFeed {
    pub fn new(api: Arc<dyn RsvpApi>) -> Self {
        Self::with_quiet_period(api, QUIET_PERIOD)
    }

    pub fn with_quiet_period(api: Arc<dyn RsvpApi>, quiet_period: Duration) -> Self {
        let (tx, rx) = unbounded_channel();

        Self {
            api,
            quiet_period,
            seq: 0,
            awaiting: false,
            pending: None,
            tx,
            rx,
            suggestions: Vec::new(),
            highlighted: None,
        }
    }

    /// Feeds the current contents of the name input.
    ///
    /// Must be called from within a tokio runtime.
    pub fn input(&mut self, raw: &str) {
        self.supersede();

        let Some(term) = search_term(raw) else {
            self.clear();
            return;
        };

        let api = self.api.clone();
        let tx = self.tx.clone();
        let seq = self.seq;
        let quiet_period = self.quiet_period;
        let term = term.to_string();

        self.awaiting = true;
        self.pending = Some(tokio::spawn(async move {
            sleep(quiet_period).await;

            let mut suggestions = match api.search_names(&term).await {
                Ok(suggestions) => suggestions,
                Err(e) => {
                    warn!(term, "Name suggestions unavailable: {e}");
                    Vec::new()
                }
            };
            suggestions.truncate(MAX_SUGGESTIONS);

            let _ = tx.send(Tagged { seq, suggestions });
        }));
    }

    /// Applies whatever results already arrived. Returns true if the list changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        while let Ok(tagged) = self.rx.try_recv() {
            changed |= self.apply(tagged);
        }

        changed
    }

    /// Waits for the latest input's lookup, if one is pending.
    pub async fn settled(&mut self) -> &[String] {
        while self.awaiting {
            match self.rx.recv().await {
                Some(tagged) => {
                    self.apply(tagged);
                }
                None => break,
            }
        }

        &self.suggestions
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted
            .and_then(|i| self.suggestions.get(i))
            .map(String::as_str)
    }

    pub fn highlight_next(&mut self) {
        let len = self.suggestions.len();
        if len == 0 {
            return;
        }

        self.highlighted = Some(match self.highlighted {
            Some(i) => (i + 1) % len,
            None => 0,
        });
    }

    pub fn highlight_prev(&mut self) {
        let len = self.suggestions.len();
        if len == 0 {
            return;
        }

        self.highlighted = Some(match self.highlighted {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
    }

    /// Takes the highlighted suggestion and closes the list.
    pub fn accept(&mut self) -> Option<String> {
        let index = self.highlighted?;
        self.select(index)
    }

    /// Takes the suggestion at `index` and closes the list.
    pub fn select(&mut self, index: usize) -> Option<String> {
        let chosen = self.suggestions.get(index).cloned()?;
        self.dismiss();

        Some(chosen)
    }

    /// Closes the list and drops any lookup still in flight.
    pub fn dismiss(&mut self) {
        self.supersede();
        self.clear();
    }

    fn supersede(&mut self) {
        self.seq += 1;

        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    fn clear(&mut self) {
        self.awaiting = false;
        self.suggestions.clear();
        self.highlighted = None;
    }

    fn apply(&mut self, tagged: Tagged) -> bool {
        if tagged.seq != self.seq {
            debug!(seq = tagged.seq, latest = self.seq, "Dropping stale suggestions");
            return false;
        }

        self.awaiting = false;
        self.pending = None;
        self.highlighted = None;
        self.suggestions = tagged.suggestions;

        true
    }
}

impl Drop for SuggestionFeed {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use invite::{
        Admission, GateStrategy, RsvpSubmission,
        payloads::{ConfirmationRequest, SubmitResponse},
    };
    use tokio::time::{Instant, advance};

    use super::*;
    use crate::api::ApiError;

    const GUESTS: [&str; 3] = ["Jane Doe", "Anesu Banda", "Anna Lee"];

    #[derive(Default)]
    struct Directory {
        searches: Mutex<Vec<String>>,
        down: bool,
    }

    impl Directory {
        fn searches(&self) -> Vec<String> {
            self.searches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RsvpApi for Directory {
        fn strategy(&self) -> GateStrategy {
            GateStrategy::Names
        }

        async fn verify(&self, _candidate: &str) -> Result<Admission, ApiError> {
            Ok(Admission::NotAdmitted)
        }

        async fn search_names(&self, term: &str) -> Result<Vec<String>, ApiError> {
            self.searches.lock().unwrap().push(term.to_string());

            if self.down {
                return Err(ApiError::Status {
                    status: 500,
                    error: "Database error".to_string(),
                });
            }

            let term = term.to_lowercase();
            Ok(GUESTS
                .iter()
                .filter(|name| name.to_lowercase().contains(&term))
                .map(|name| name.to_string())
                .collect())
        }

        async fn submit_rsvp(&self, _submission: &RsvpSubmission) -> Result<SubmitResponse, ApiError> {
            unreachable!()
        }

        async fn send_confirmation(&self, _request: &ConfirmationRequest) -> Result<bool, ApiError> {
            unreachable!()
        }
    }

    fn feed(directory: &Arc<Directory>) -> SuggestionFeed {
        SuggestionFeed::new(directory.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_keystroke_is_looked_up() {
        let directory = Arc::new(Directory::default());
        let mut feed = feed(&directory);

        feed.input("a");
        feed.input("an");
        feed.input("ann");

        assert_eq!(feed.settled().await, ["Anna Lee"]);
        assert_eq!(directory.searches(), ["ann"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_quiet_period() {
        let directory = Arc::new(Directory::default());
        let mut feed = feed(&directory);
        let started = Instant::now();

        feed.input("an");
        advance(Duration::from_millis(299)).await;
        assert!(!feed.poll());
        assert!(directory.searches().is_empty());

        assert_eq!(feed.settled().await, ["Jane Doe", "Anesu Banda", "Anna Lee"]);
        assert!(started.elapsed() >= QUIET_PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_resets_the_timer() {
        let directory = Arc::new(Directory::default());
        let mut feed = feed(&directory);

        feed.input("ja");
        advance(Duration::from_millis(200)).await;
        feed.input("jan");
        advance(Duration::from_millis(200)).await;
        assert!(directory.searches().is_empty());

        assert_eq!(feed.settled().await, ["Jane Doe"]);
        assert_eq!(directory.searches(), ["jan"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_input_clears_without_lookup() {
        let directory = Arc::new(Directory::default());
        let mut feed = feed(&directory);

        feed.input("an");
        feed.settled().await;
        assert_eq!(feed.suggestions().len(), 3);

        feed.input(" a ");
        assert!(feed.suggestions().is_empty());
        assert!(feed.settled().await.is_empty());
        assert_eq!(directory.searches(), ["an"]);
    }

    #[tokio::test]
    async fn test_stale_results_are_dropped() {
        let directory = Arc::new(Directory::default());
        let mut feed = feed(&directory);

        feed.input("an");
        feed.input("ann");

        let _ = feed.tx.send(Tagged {
            seq: feed.seq - 1,
            suggestions: vec!["Anesu Banda".to_string()],
        });
        assert!(!feed.poll());
        assert!(feed.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backend_failure_degrades_to_empty() {
        let directory = Arc::new(Directory {
            down: true,
            ..Directory::default()
        });
        let mut feed = feed(&directory);

        feed.input("an");

        assert!(feed.settled().await.is_empty());
        assert_eq!(directory.searches(), ["an"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_highlight_wraps_and_accepts() {
        let directory = Arc::new(Directory::default());
        let mut feed = feed(&directory);

        feed.input("ne");
        feed.settled().await;

        feed.highlight_prev();
        assert_eq!(feed.highlighted(), Some("Anesu Banda"));
        feed.highlight_next();
        assert_eq!(feed.highlighted(), Some("Jane Doe"));
        feed.highlight_next();
        feed.highlight_next();
        assert_eq!(feed.highlighted(), Some("Jane Doe"));

        assert_eq!(feed.accept().as_deref(), Some("Jane Doe"));
        assert!(feed.suggestions().is_empty());
        assert_eq!(feed.accept(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_drops_in_flight_lookup() {
        let directory = Arc::new(Directory::default());
        let mut feed = feed(&directory);

        feed.input("an");
        feed.dismiss();
        advance(QUIET_PERIOD * 2).await;

        assert!(!feed.poll());
        assert!(feed.suggestions().is_empty());
        assert!(directory.searches().is_empty());
    }
}
