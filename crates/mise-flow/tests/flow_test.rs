use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mise_client::{
    AccountBackend, ClientError, ErrorKind, MemoryBackend, Result, ScriptedSource,
    SuggestionBackend,
};
use mise_flow::{
    render_card, AcceptOutcome, Operation, RejectOutcome, SignupWizard, SuggestionThread,
    ThreadFetcher, ValidationError, WizardError,
};
use mise_types::{
    Credentials, Ingredient, MeasurementUnit, Profile, ProfileUpdateRequest, RecipeBody, SetupStep,
    Skill, Suggestion, ThreadState, TokenResponse,
};
use proptest::prelude::*;

fn recipe(title: &str) -> RecipeBody {
    RecipeBody::new(title, "Quick supper")
        .with_ingredient(Ingredient::new("tomatoes", 400.0, MeasurementUnit::G))
        .with_step("Chop")
        .with_step("Simmer")
        .with_servings(2)
        .with_total_time(30)
}

fn memory_backend() -> (Arc<ScriptedSource>, Arc<MemoryBackend>) {
    let source = Arc::new(ScriptedSource::new().with_suggestion(recipe("Shakshuka"), "Eggs in sauce"));
    let backend = Arc::new(MemoryBackend::new(source.clone()));
    (source, backend)
}

// ===== FETCHER + CONTROLLER AGAINST THE MEMORY BACKEND =====

#[tokio::test]
async fn test_start_reject_accept_round() {
    let (source, backend) = memory_backend();
    source.push_suggestion(recipe("Tomato Soup"), "Something warm");
    let fetcher = ThreadFetcher::new(backend.clone());

    let thread = fetcher.start("tomatoes").await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread.current_index(), 0);

    let outcome = thread.reject(Some("soup please".to_string())).await;
    assert!(matches!(outcome, RejectOutcome::Fetched { index: 1 }));

    let card = render_card(&thread.snapshot());
    assert!(card.contains("Suggestion for: tomatoes\nRefined: soup please"));
    assert!(card.contains("[2/2] Tomato Soup"));

    let accepted = Arc::new(Mutex::new(None));
    let outcome = thread
        .accept_then({
            let accepted = accepted.clone();
            move |id| *accepted.lock().unwrap() = Some(id.to_string())
        })
        .await;
    let AcceptOutcome::Accepted(recipe) = outcome else {
        panic!("accept failed");
    };
    assert_eq!(recipe.recipe.title, "Tomato Soup");
    assert_eq!(accepted.lock().unwrap().as_deref(), Some(recipe.id.as_str()));

    let stored = backend.get_thread(&thread.thread_id()).await.unwrap();
    assert!(stored.suggestions[1].accepted);
    assert_eq!(stored.current_prompt, "soup please");
}

#[tokio::test]
async fn test_load_resumes_at_first_open_suggestion() {
    let (source, backend) = memory_backend();
    source.push_suggestion(recipe("Gazpacho"), "Cold soup");
    let first = backend.start_thread("tomatoes").await.unwrap();
    backend.request_next_suggestion(&first.id, None).await.unwrap();
    backend
        .reject_suggestion(&first.id, &first.suggestions[0].id)
        .await
        .unwrap();

    let thread = ThreadFetcher::new(backend.clone()).load(&first.id).await.unwrap();

    assert_eq!(thread.len(), 2);
    assert_eq!(thread.current_index(), 1);
    assert_eq!(thread.current_suggestion().unwrap().suggestion.title, "Gazpacho");
}

#[tokio::test]
async fn test_load_unknown_thread_is_not_found() {
    let (_, backend) = memory_backend();
    let err = ThreadFetcher::new(backend).load("missing").await.unwrap_err();

    assert_eq!(err.operation, Operation::Load);
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_exhausted_source_surfaces_as_error() {
    let (_, backend) = memory_backend();
    let thread = ThreadFetcher::new(backend).start("tomatoes").await.unwrap();

    let outcome = thread.reject(None).await;

    assert!(matches!(outcome, RejectOutcome::Failed(_)));
    assert_eq!(thread.len(), 1);
    assert!(render_card(&thread.snapshot()).contains("Error:"));
}

#[tokio::test]
async fn test_fetcher_persists_rejections_when_enabled() {
    let (source, backend) = memory_backend();
    source.push_suggestion(recipe("Salsa"), "Fresh");
    let fetcher = ThreadFetcher::new(backend.clone()).with_persisted_rejections(true);

    let thread = fetcher.start("tomatoes").await.unwrap();
    thread.reject(None).await;

    let stored = backend.get_thread(&thread.thread_id()).await.unwrap();
    assert!(stored.suggestions[0].rejected);
    assert!(!stored.suggestions[1].rejected);
}

#[tokio::test]
async fn test_accepting_twice_yields_same_recipe() {
    let (_, backend) = memory_backend();
    let thread = ThreadFetcher::new(backend.clone()).start("tomatoes").await.unwrap();

    let AcceptOutcome::Accepted(first) = thread.accept().await else {
        panic!("accept failed");
    };
    let AcceptOutcome::Accepted(second) = thread.accept().await else {
        panic!("accept failed");
    };

    assert_eq!(first.id, second.id);
    assert_eq!(backend.recipe_count().await, 1);
}

// ===== SIGNUP WIZARD =====

#[derive(Default)]
struct RecordingAccounts {
    saved: Mutex<Vec<ProfileUpdateRequest>>,
    fail_save: bool,
}

#[async_trait]
impl AccountBackend for RecordingAccounts {
    async fn signup(&self, _credentials: &Credentials) -> Result<TokenResponse> {
        Ok(TokenResponse {
            token: "token".to_string(),
        })
    }

    async fn login(&self, _credentials: &Credentials) -> Result<TokenResponse> {
        Ok(TokenResponse {
            token: "token".to_string(),
        })
    }

    async fn get_profile(&self) -> Result<Profile> {
        Ok(Profile::default())
    }

    async fn save_profile(&self, update: &ProfileUpdateRequest) -> Result<Profile> {
        if self.fail_save {
            return Err(ClientError::Internal("save failed".to_string()));
        }
        self.saved.lock().unwrap().push(update.clone());
        Ok(Profile {
            setup_step: update.setup_step,
            name: update.name.clone().unwrap_or_default(),
            ..Default::default()
        })
    }
}

#[tokio::test]
async fn test_wizard_saves_each_step_with_next_step() {
    let accounts = RecordingAccounts::default();
    let mut wizard = SignupWizard::new();

    wizard
        .signup(&accounts, &Credentials::new("ada@example.com", "hunter22"))
        .await
        .unwrap();

    let profile = wizard
        .advance(&accounts, ProfileUpdateRequest::new(SetupStep::Profile).name("Ada"))
        .await
        .unwrap();
    assert_eq!(profile.setup_step, SetupStep::Skill);
    assert_eq!(wizard.step(), SetupStep::Skill);

    wizard
        .advance(&accounts, ProfileUpdateRequest::default().skill(Skill::Beginner))
        .await
        .unwrap();
    assert_eq!(wizard.step(), SetupStep::Cuisines);

    let saved = accounts.saved.lock().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0].setup_step, SetupStep::Skill);
    assert_eq!(saved[1].setup_step, SetupStep::Cuisines);
}

#[tokio::test]
async fn test_wizard_rejects_invalid_step_without_saving() {
    let accounts = RecordingAccounts::default();
    let mut wizard = SignupWizard::new();

    let err = wizard
        .advance(&accounts, ProfileUpdateRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WizardError::Invalid(ValidationError::MissingName)));
    assert_eq!(wizard.step(), SetupStep::Profile);
    assert!(accounts.saved.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_wizard_keeps_step_when_save_fails() {
    let accounts = RecordingAccounts {
        fail_save: true,
        ..Default::default()
    };
    let mut wizard = SignupWizard::from_profile(&Profile {
        setup_step: SetupStep::Diet,
        ..Default::default()
    });

    let err = wizard
        .advance(&accounts, ProfileUpdateRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WizardError::Backend(_)));
    assert_eq!(wizard.step(), SetupStep::Diet);
}

#[tokio::test]
async fn test_wizard_finished_and_bad_credentials() {
    let accounts = RecordingAccounts::default();
    let mut done = SignupWizard::from_profile(&Profile {
        setup_step: SetupStep::Done,
        ..Default::default()
    });
    assert!(matches!(
        done.advance(&accounts, ProfileUpdateRequest::default()).await,
        Err(WizardError::Finished)
    ));

    let err = SignupWizard::new()
        .signup(&accounts, &Credentials::new("not-an-email", "hunter22"))
        .await
        .unwrap_err();
    assert!(matches!(err, WizardError::Invalid(ValidationError::InvalidEmail)));
}

// ===== CURSOR PROPERTIES =====

#[derive(Debug, Clone)]
enum Nav {
    Back,
    Forward,
}

fn nav() -> impl Strategy<Value = Nav> {
    prop_oneof![Just(Nav::Back), Just(Nav::Forward)]
}

fn thread_from_flags(flags: &[(bool, bool)]) -> ThreadState {
    flags
        .iter()
        .enumerate()
        .fold(ThreadState::new("t1", "prop"), |t, (i, (accepted, rejected))| {
            let mut s = Suggestion::new(format!("s{}", i), "t1", recipe("Any"), "");
            s.accepted = *accepted;
            s.rejected = *rejected;
            t.with_suggestion(s)
        })
}

proptest! {
    #[test]
    fn prop_navigation_stays_in_bounds(
        flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..8),
        moves in prop::collection::vec(nav(), 0..32),
    ) {
        let (_, backend) = memory_backend();
        let thread = SuggestionThread::new(backend, thread_from_flags(&flags));
        let len = flags.len();

        for step in moves {
            let before = thread.current_index();
            let after = match step {
                Nav::Back => thread.back(),
                Nav::Forward => thread.forward(),
            };
            prop_assert!(len == 0 || after < len);
            let expected = match step {
                Nav::Back => before.saturating_sub(1),
                Nav::Forward if before + 1 < len => before + 1,
                Nav::Forward => before,
            };
            prop_assert_eq!(after, expected);
        }
        prop_assert_eq!(thread.len(), len);
    }

    #[test]
    fn prop_initial_cursor_is_first_open_or_last(
        flags in prop::collection::vec((any::<bool>(), any::<bool>()), 1..8),
    ) {
        let (_, backend) = memory_backend();
        let thread = SuggestionThread::new(backend, thread_from_flags(&flags));

        let expected = flags
            .iter()
            .position(|(a, r)| !a && !r)
            .unwrap_or(flags.len() - 1);
        prop_assert_eq!(thread.current_index(), expected);
    }
}
