use crate::model::{Job, SubmitEvent};
use crate::normalize::normalize;
use crate::progress::Progress;
use crate::store::StateStore;
use crate::view::{sanitize, TableView};
use std::sync::Arc;

/// Show/hide state of the three result regions, driven as one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visibility {
    pub job_badge: bool,
    pub aux_links: bool,
    pub result_area: bool,
}

/// UiState is owned by the UI thread only; no cross-thread mutation.
pub struct UiState {
    pub store: Arc<dyn StateStore>,
    pub visibility: Visibility,
    pub job: Option<Job>,
    pub table: Option<TableView>,
    pub error: Option<String>,
    pub progress: Progress,
    pub submitting: bool,
    pub info: String,
    pub base_url: String,
    pub default_page_size: usize,
    pub sort_cursor: usize,
    pub search_editing: bool,
    pub show_help: bool,
}

impl UiState {
    pub fn new(store: Arc<dyn StateStore>, default_page_size: usize, base_url: String) -> Self {
        Self {
            store,
            // All three regions start hidden until a result renders.
            visibility: Visibility::default(),
            job: None,
            table: None,
            error: None,
            progress: Progress::default(),
            submitting: false,
            info: String::new(),
            base_url,
            default_page_size,
            sort_cursor: 0,
            search_editing: false,
            show_help: false,
        }
    }

    /// Hide every region and purge the stored identity. Hiding the badge is
    /// never cosmetic: a hidden badge always means no identity is held
    /// anywhere. Idempotent.
    pub fn hide_all(&mut self) {
        self.visibility = Visibility::default();
        self.job = None;
        self.store.clear_job();
    }

    /// Show the auxiliary links and result area; the badge only when a fresh
    /// identity is supplied. `None` leaves the badge untouched, which is how
    /// a cache restore renders without resurrecting a stale identity.
    pub fn show_all(&mut self, job: Option<Job>) {
        if let Some(job) = job {
            self.job = Some(job);
            self.visibility.job_badge = true;
        }
        self.visibility.aux_links = true;
        self.visibility.result_area = true;
    }

    pub fn apply_event(&mut self, ev: SubmitEvent) {
        match ev {
            SubmitEvent::SubmissionStarted => {
                self.hide_all();
                self.table = None;
                self.error = None;
                self.sort_cursor = 0;
                self.search_editing = false;
                self.submitting = true;
                self.progress.start();
                self.info = "Submitting...".into();
            }
            SubmitEvent::ResultReady { payload, job } => {
                let mut view = TableView::new(normalize(&payload));
                view.set_page_size(self.default_page_size);
                self.table = Some(view);
                self.error = None;
                self.sort_cursor = 0;
                // Identity is disclosed only after the table has been
                // rebuilt from this payload.
                self.show_all(job);
            }
            SubmitEvent::SubmissionFailed { message } => {
                self.hide_all();
                self.table = None;
                // Failure text is backend-supplied and shown inline in the
                // result area.
                self.error = Some(sanitize(&message));
                self.visibility.result_area = true;
            }
            SubmitEvent::SubmissionFinished => {
                self.progress.stop();
                self.submitting = false;
            }
            SubmitEvent::Info(info) => self.info = info.to_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResultPayload;
    use crate::store::MemStore;
    use serde_json::json;

    fn state() -> (UiState, Arc<MemStore>) {
        let store = Arc::new(MemStore::default());
        (UiState::new(store.clone(), 10, "http://backend".into()), store)
    }

    fn payload() -> Box<ResultPayload> {
        Box::new(
            serde_json::from_value(json!({
                "columns": ["epitope", "count"],
                "rows": [["SIINFEKL", 3]]
            }))
            .unwrap(),
        )
    }

    fn job() -> Job {
        Job {
            job_id: "uuid".into(),
            short_id: "3f2c9a54".into(),
        }
    }

    #[test]
    fn success_cycle_shows_badge_after_the_table_is_built() {
        let (mut state, store) = state();
        store.set_job(job());

        state.apply_event(SubmitEvent::SubmissionStarted);
        assert!(state.submitting);
        assert!(state.progress.running());
        assert_eq!(state.visibility, Visibility::default());
        // Entry purge.
        assert!(store.job().is_none());

        state.apply_event(SubmitEvent::ResultReady {
            payload: payload(),
            job: Some(job()),
        });
        assert!(state.visibility.job_badge);
        assert!(state.visibility.aux_links);
        assert!(state.visibility.result_area);
        assert_eq!(state.table.as_ref().unwrap().total_rows(), 1);

        state.apply_event(SubmitEvent::SubmissionFinished);
        assert!(!state.submitting);
        assert!(!state.progress.running());
    }

    #[test]
    fn cache_restore_never_shows_a_badge() {
        let (mut state, _) = state();
        state.apply_event(SubmitEvent::ResultReady {
            payload: payload(),
            job: None,
        });
        assert!(!state.visibility.job_badge);
        assert!(state.job.is_none());
        assert!(state.visibility.aux_links);
        assert!(state.visibility.result_area);
    }

    #[test]
    fn failure_shows_the_message_and_purges_identity() {
        let (mut state, store) = state();
        store.set_job(job());
        state.apply_event(SubmitEvent::SubmissionStarted);
        state.apply_event(SubmitEvent::SubmissionFailed {
            message: "server\x1berror".into(),
        });

        assert_eq!(state.error.as_deref(), Some("server error"));
        assert!(!state.visibility.job_badge);
        assert!(!state.visibility.aux_links);
        assert!(state.visibility.result_area);
        assert!(state.table.is_none());
        assert!(store.job().is_none());
    }

    #[test]
    fn hide_all_is_idempotent() {
        let (mut state, store) = state();
        state.show_all(Some(job()));
        store.set_job(job());

        state.hide_all();
        assert_eq!(state.visibility, Visibility::default());
        assert!(store.job().is_none());

        state.hide_all();
        assert_eq!(state.visibility, Visibility::default());
        assert!(state.job.is_none());
    }

    #[test]
    fn new_result_replaces_the_previous_view_state() {
        let (mut state, _) = state();
        state.apply_event(SubmitEvent::ResultReady {
            payload: payload(),
            job: None,
        });
        state
            .table
            .as_mut()
            .unwrap()
            .set_search("SIINFEKL");
        state.sort_cursor = 1;

        state.apply_event(SubmitEvent::ResultReady {
            payload: payload(),
            job: Some(job()),
        });
        let table = state.table.as_ref().unwrap();
        assert!(table.search().is_empty());
        assert_eq!(state.sort_cursor, 0);
        assert_eq!(state.job, Some(job()));
    }
}
