use crate::error::AppError;
use crate::models::analysis_types::{ImageInput, Phase, PredictionResult, SessionView};
use crate::services::presentation;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Screen state. Exactly one variant is active at any time; every render is
/// derived from this, so contradictory flag combinations cannot exist.
#[derive(Debug, Clone)]
enum UiState {
    Idle,
    PreviewReady(ImageInput),
    Submitting(ImageInput),
    Result {
        result: PredictionResult,
        source: Option<ImageInput>,
    },
    Error(String),
}

/// A claimed submission slot. Completion must present the generation it was
/// issued for; completions superseded by a later selection are discarded.
#[derive(Debug)]
pub struct SubmitTicket {
    pub input: ImageInput,
    pub generation: u64,
}

/// Single source of truth for the analysis screen, shared across commands as
/// cheap clones over the same state.
#[derive(Clone)]
pub struct AnalysisSession {
    state: Arc<Mutex<UiState>>,
    generation: Arc<AtomicU64>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(UiState::Idle)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// File selected. Valid from every state; while `Submitting` it
    /// supersedes the in-flight request, whose completion will then fail the
    /// generation check.
    pub fn select_image(&self, input: ImageInput) -> SessionView {
        let mut state = self.state.lock().unwrap();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = UiState::PreviewReady(input);
        view_of(&state)
    }

    /// Submit trigger. `Ok(None)` while a submission is already in flight
    /// (the trigger is ignored, not queued); `Validation` when there is no
    /// selection to submit.
    pub fn begin_submit(&self) -> Result<Option<SubmitTicket>, AppError> {
        let mut state = self.state.lock().unwrap();
        match &*state {
            UiState::Submitting(_) => Ok(None),
            UiState::PreviewReady(input) => {
                let input = input.clone();
                let generation = self.generation.load(Ordering::SeqCst);
                *state = UiState::Submitting(input.clone());
                Ok(Some(SubmitTicket { input, generation }))
            }
            _ => Err(AppError::validation("No image selected")),
        }
    }

    /// Apply the outcome of a submission. Returns false when the completion
    /// is stale (superseded by a later selection or a reset) and was dropped
    /// without a transition.
    pub fn complete_submit(
        &self,
        generation: u64,
        outcome: &Result<PredictionResult, AppError>,
    ) -> bool {
        let mut state = self.state.lock().unwrap();
        if generation != self.generation.load(Ordering::SeqCst) {
            return false;
        }
        let source = match &*state {
            UiState::Submitting(input) => input.clone(),
            _ => return false,
        };
        *state = match outcome {
            Ok(result) => UiState::Result {
                result: result.clone(),
                source: Some(source),
            },
            Err(err) => UiState::Error(err.user_message()),
        };
        true
    }

    /// Show a stored result. The source preview is cleared so a historical
    /// result is never displayed against a stale selection.
    pub fn select_history_entry(&self, result: PredictionResult) -> SessionView {
        let mut state = self.state.lock().unwrap();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = UiState::Result {
            result,
            source: None,
        };
        view_of(&state)
    }

    pub fn reset(&self) -> SessionView {
        let mut state = self.state.lock().unwrap();
        self.generation.fetch_add(1, Ordering::SeqCst);
        *state = UiState::Idle;
        view_of(&state)
    }

    pub fn view(&self) -> SessionView {
        let state = self.state.lock().unwrap();
        view_of(&state)
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

fn view_of(state: &UiState) -> SessionView {
    let empty = SessionView {
        phase: Phase::Idle,
        file_name: None,
        preview: None,
        result: None,
        ranking: Vec::new(),
        error: None,
    };
    match state {
        UiState::Idle => empty,
        UiState::PreviewReady(input) => SessionView {
            phase: Phase::PreviewReady,
            file_name: Some(input.file_name.clone()),
            preview: Some(input.preview.clone()),
            ..empty
        },
        UiState::Submitting(input) => SessionView {
            phase: Phase::Submitting,
            file_name: Some(input.file_name.clone()),
            preview: Some(input.preview.clone()),
            ..empty
        },
        UiState::Result { result, source } => SessionView {
            phase: Phase::Result,
            file_name: source.as_ref().map(|s| s.file_name.clone()),
            preview: source.as_ref().map(|s| s.preview.clone()),
            ranking: presentation::rank_probabilities(&result.probabilities),
            result: Some(result.clone()),
            ..empty
        },
        UiState::Error(message) => SessionView {
            phase: Phase::Error,
            error: Some(message.clone()),
            ..empty
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn input(name: &str) -> ImageInput {
        ImageInput {
            file_name: name.to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: Arc::new(vec![0xFF, 0xD8, 0xFF]),
            preview: format!("data:image/jpeg;base64,{}", name),
        }
    }

    fn pneumonia_result() -> PredictionResult {
        let mut probabilities = HashMap::new();
        probabilities.insert("Pneumonia".to_string(), 0.82);
        probabilities.insert("Normal".to_string(), 0.18);
        PredictionResult {
            prediction: "Pneumonia".to_string(),
            probabilities,
            gradcam_image: Some("data:image/png;base64,aGVhdG1hcA==".to_string()),
        }
    }

    #[test]
    fn starts_idle() {
        let session = AnalysisSession::new();
        let view = session.view();
        assert_eq!(view.phase, Phase::Idle);
        assert!(view.result.is_none());
        assert!(view.error.is_none());
    }

    #[test]
    fn selecting_a_file_shows_its_preview() {
        let session = AnalysisSession::new();
        let view = session.select_image(input("scan.jpg"));
        assert_eq!(view.phase, Phase::PreviewReady);
        assert_eq!(view.file_name.as_deref(), Some("scan.jpg"));
        assert!(view.preview.is_some());
    }

    #[test]
    fn reselecting_replaces_the_previous_selection() {
        let session = AnalysisSession::new();
        session.select_image(input("first.jpg"));
        let view = session.select_image(input("second.jpg"));
        assert_eq!(view.phase, Phase::PreviewReady);
        assert_eq!(view.file_name.as_deref(), Some("second.jpg"));
    }

    #[test]
    fn submit_without_selection_is_rejected_before_any_call() {
        let session = AnalysisSession::new();
        let err = session.begin_submit().unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
        // state unchanged
        assert_eq!(session.view().phase, Phase::Idle);
    }

    #[test]
    fn successful_analysis_shows_ranked_result() {
        let session = AnalysisSession::new();
        session.select_image(input("xray.jpg"));
        let ticket = session.begin_submit().unwrap().unwrap();
        assert_eq!(session.view().phase, Phase::Submitting);

        let applied = session.complete_submit(ticket.generation, &Ok(pneumonia_result()));
        assert!(applied);

        let view = session.view();
        assert_eq!(view.phase, Phase::Result);
        assert_eq!(view.result.as_ref().unwrap().prediction, "Pneumonia");
        assert_eq!(view.ranking[0].label, "Pneumonia");
        assert_eq!(view.ranking[0].percentage, 82.0);
        assert_eq!(view.ranking[1].label, "Normal");
        assert_eq!(view.ranking[1].percentage, 18.0);
        // the source image stays visible next to the live result
        assert!(view.preview.is_some());
        assert!(view.error.is_none());
    }

    #[test]
    fn backend_failure_shows_error_and_no_result() {
        let session = AnalysisSession::new();
        session.select_image(input("xray.jpg"));
        let ticket = session.begin_submit().unwrap().unwrap();

        let outcome = Err(AppError::backend(500, "internal error"));
        assert!(session.complete_submit(ticket.generation, &outcome));

        let view = session.view();
        assert_eq!(view.phase, Phase::Error);
        assert!(view.error.as_ref().is_some_and(|m| !m.is_empty()));
        assert!(view.result.is_none());
        assert!(view.ranking.is_empty());
    }

    #[test]
    fn second_submit_while_in_flight_is_a_noop() {
        let session = AnalysisSession::new();
        session.select_image(input("xray.jpg"));
        let first = session.begin_submit().unwrap();
        assert!(first.is_some());

        let second = session.begin_submit().unwrap();
        assert!(second.is_none());
        assert_eq!(session.view().phase, Phase::Submitting);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let session = AnalysisSession::new();
        session.select_image(input("first.jpg"));
        let ticket = session.begin_submit().unwrap().unwrap();

        // user picks a new file while the request is in flight
        session.select_image(input("second.jpg"));

        let applied = session.complete_submit(ticket.generation, &Ok(pneumonia_result()));
        assert!(!applied);

        let view = session.view();
        assert_eq!(view.phase, Phase::PreviewReady);
        assert_eq!(view.file_name.as_deref(), Some("second.jpg"));
        assert!(view.result.is_none());
    }

    #[test]
    fn completion_after_reset_is_discarded() {
        let session = AnalysisSession::new();
        session.select_image(input("xray.jpg"));
        let ticket = session.begin_submit().unwrap().unwrap();
        session.reset();

        assert!(!session.complete_submit(ticket.generation, &Ok(pneumonia_result())));
        assert_eq!(session.view().phase, Phase::Idle);
    }

    #[test]
    fn history_entry_clears_the_source_preview() {
        let session = AnalysisSession::new();
        session.select_image(input("xray.jpg"));
        let ticket = session.begin_submit().unwrap().unwrap();
        session.complete_submit(ticket.generation, &Ok(pneumonia_result()));
        assert!(session.view().preview.is_some());

        let view = session.select_history_entry(pneumonia_result());
        assert_eq!(view.phase, Phase::Result);
        assert!(view.preview.is_none());
        assert!(view.result.is_some());
        assert!(view.error.is_none());
    }

    #[test]
    fn new_selection_clears_a_previous_error() {
        let session = AnalysisSession::new();
        session.select_image(input("bad.jpg"));
        let ticket = session.begin_submit().unwrap().unwrap();
        let failure = Err(AppError::Transport {
            message: "unreachable".to_string(),
        });
        session.complete_submit(ticket.generation, &failure);
        assert_eq!(session.view().phase, Phase::Error);

        let view = session.select_image(input("good.jpg"));
        assert_eq!(view.phase, Phase::PreviewReady);
        assert!(view.error.is_none());
    }

    #[test]
    fn error_and_result_are_never_both_populated() {
        let session = AnalysisSession::new();
        let assert_exclusive = |view: &SessionView| {
            assert!(!(view.error.is_some() && view.result.is_some()));
        };

        assert_exclusive(&session.view());
        assert_exclusive(&session.select_image(input("a.jpg")));
        let ticket = session.begin_submit().unwrap().unwrap();
        session.complete_submit(ticket.generation, &Err(AppError::parse("garbage")));
        assert_exclusive(&session.view());

        assert_exclusive(&session.select_image(input("b.jpg")));
        let ticket = session.begin_submit().unwrap().unwrap();
        session.complete_submit(ticket.generation, &Ok(pneumonia_result()));
        assert_exclusive(&session.view());
        assert_exclusive(&session.reset());
    }
}
