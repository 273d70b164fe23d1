//! Scripted text generator standing in for the external service.
//!
//! Reads the numbered list back out of the rendered request and answers with
//! one numbered line per title, with knobs for dropping lines, failing calls
//! and panicking.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use enricher_core::translation::aligner::tokenize_numbered_lines;
use enricher_core::translation::{ServiceError, TextGenerator};

const LIST_HEADER: &str = "번역할 제목들:";

type Translator = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub struct MockGenerator {
    translator: Translator,
    overrides: Mutex<HashMap<String, String>>,
    /// Titles whose numbered line is left out of the response
    omitted: Mutex<HashSet<String>>,
    /// Any request containing one of these titles fails
    failing: Mutex<HashSet<String>>,
    /// Any request containing one of these titles panics
    panicking: Mutex<HashSet<String>>,
    /// The next N calls fail regardless of content
    transient_failures: AtomicUsize,
    calls: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::with_translator(|title| format!("[ko] {title}"))
    }
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translator<F>(translator: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            translator: Arc::new(translator),
            overrides: Mutex::new(HashMap::new()),
            omitted: Mutex::new(HashSet::new()),
            failing: Mutex::new(HashSet::new()),
            panicking: Mutex::new(HashSet::new()),
            transient_failures: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn translate_as(self, title: &str, translated: &str) -> Self {
        self.overrides
            .lock()
            .insert(title.to_string(), translated.to_string());
        self
    }

    pub fn omit(self, title: &str) -> Self {
        self.omitted.lock().insert(title.to_string());
        self
    }

    pub fn fail_batches_containing(self, title: &str) -> Self {
        self.failing.lock().insert(title.to_string());
        self
    }

    pub fn panic_on_batches_containing(self, title: &str) -> Self {
        self.panicking.lock().insert(title.to_string());
        self
    }

    pub fn fail_next_calls(self, calls: usize) -> Self {
        self.transient_failures.store(calls, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// What a title is expected to be stored as when nothing goes wrong
    pub fn expected_translation(&self, title: &str) -> String {
        self.overrides
            .lock()
            .get(title)
            .cloned()
            .unwrap_or_else(|| (self.translator)(title))
    }

    fn titles_in(request: &str) -> Vec<(usize, String)> {
        let list = request
            .rsplit_once(LIST_HEADER)
            .map(|(_, list)| list)
            .unwrap_or(request);
        tokenize_numbered_lines(list)
            .into_iter()
            .map(|line| (line.position, line.text))
            .collect()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _system_message: &str, user_message: &str) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(user_message.to_string());

        let titles = Self::titles_in(user_message);

        let should_panic = {
            let panicking = self.panicking.lock();
            titles.iter().any(|(_, title)| panicking.contains(title))
        };
        if should_panic {
            panic!("mock generator asked to panic");
        }

        if self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ServiceError::RateLimited);
        }

        {
            let failing = self.failing.lock();
            if titles.iter().any(|(_, title)| failing.contains(title)) {
                return Err(ServiceError::Status {
                    status: 503,
                    body: "service unavailable".to_string(),
                });
            }
        }

        let omitted = self.omitted.lock().clone();
        let lines: Vec<String> = titles
            .iter()
            .filter(|(_, title)| !omitted.contains(title))
            .map(|(position, title)| format!("{position}. {}", self.expected_translation(title)))
            .collect();

        Ok(lines.join("\n"))
    }
}
