//! Turn controller
//!
//! Owns the session and drives one turn at a time:
//! input -> request -> response -> store update -> display.
//! Both window variants (single-shot text box and chat input line) run the
//! same state machine; [`InputMode`] only changes seeding, draft handling and
//! how the latest outcome is surfaced.

#[cfg(test)]
mod proptests;

use crate::completion::{build_request, ChatModel, CompletionError, CompletionRequest};
#[cfg(test)]
use crate::completion::CompletionService;
use crate::session::{ConversationStore, ReplayEntry, Turn};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Multi-line text box plus a Send button; the latest answer or error is
    /// shown as a banner.
    Batch,
    /// Chat transcript with an input line that submits on Enter.
    Stream,
}

impl InputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Batch => "single-shot",
            Self::Stream => "chat",
        }
    }

    fn seeds_welcome(self) -> bool {
        matches!(self, Self::Stream)
    }

    fn clears_draft_on_submit(self) -> bool {
        matches!(self, Self::Stream)
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown input mode '{0}' (expected 'chat' or 'single-shot')")]
pub struct ParseModeError(String);

impl FromStr for InputMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" | "stream" => Ok(Self::Stream),
            "single-shot" | "single" | "batch" => Ok(Self::Batch),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Per-window settings, editable at any time from the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub model: ChatModel,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model: ChatModel::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    AwaitingInput,
    RequestInFlight,
    Displaying,
}

/// Latest outcome in single-shot mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

/// Issued by a successful submit. The generation must be handed back to
/// [`TurnController::complete`] together with the call's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnTicket {
    pub generation: u64,
    pub request: CompletionRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Ready,
    InFlight { generation: u64, query: String },
    Displaying,
}

/// Render snapshot. Rebuilt from scratch on every call to
/// [`TurnController::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub turns: Vec<Turn>,
    pub pending_query: Option<String>,
    pub banner: Option<Banner>,
    pub history: Vec<ReplayEntry>,
    pub replay: Option<ReplayEntry>,
    pub in_flight: bool,
}

pub fn format_failure(err: &CompletionError) -> String {
    format!("Error: {err}")
}

pub struct TurnController {
    mode: InputMode,
    settings: ChatSettings,
    store: ConversationStore,
    draft: String,
    phase: Phase,
    generation: u64,
    banner: Option<Banner>,
    selected_replay: Option<usize>,
}

impl TurnController {
    pub fn new(mode: InputMode, settings: ChatSettings) -> Self {
        let mut store = ConversationStore::new();
        if mode.seeds_welcome() {
            store.append(Turn::welcome());
        }

        Self {
            mode,
            settings,
            store,
            draft: String::new(),
            phase: Phase::Ready,
            generation: 0,
            banner: None,
            selected_replay: None,
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn settings_mut(&mut self) -> &mut ChatSettings {
        &mut self.settings
    }

    #[cfg(test)]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn state(&self) -> TurnState {
        match &self.phase {
            Phase::InFlight { .. } => TurnState::RequestInFlight,
            Phase::Displaying => TurnState::Displaying,
            Phase::Ready if self.draft.trim().is_empty() => TurnState::Idle,
            Phase::Ready => TurnState::AwaitingInput,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.phase, Phase::InFlight { .. })
    }

    /// Submits the current draft.
    pub fn submit(&mut self) -> Option<TurnTicket> {
        let text = self.draft.clone();
        let ticket = self.submit_text(&text)?;
        if self.mode.clears_draft_on_submit() {
            self.draft.clear();
        }
        Some(ticket)
    }

    /// Returns `None`, leaving every piece of state untouched, for blank text
    /// or while another request is outstanding.
    pub fn submit_text(&mut self, text: &str) -> Option<TurnTicket> {
        let query = text.trim();
        if query.is_empty() || self.is_in_flight() {
            return None;
        }

        self.generation += 1;
        let request = build_request(
            self.settings.model,
            &self.settings.system_prompt,
            self.store.all(),
            query,
        );

        tracing::debug!(
            generation = self.generation,
            mode = %self.mode,
            model = %self.settings.model,
            messages = request.messages.len(),
            "turn submitted"
        );

        self.banner = None;
        self.phase = Phase::InFlight {
            generation: self.generation,
            query: query.to_string(),
        };

        Some(TurnTicket {
            generation: self.generation,
            request,
        })
    }

    /// Applies the result of the call issued for `generation`. Returns
    /// `false` when the result is stale and was dropped.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<String, CompletionError>,
    ) -> bool {
        let query = match &self.phase {
            Phase::InFlight {
                generation: current,
                query,
            } if *current == generation => query.clone(),
            _ => {
                tracing::debug!(generation, current = self.generation, "dropping stale completion");
                return false;
            }
        };

        let (response, banner) = match result {
            Ok(text) => (text.clone(), Banner::Success(text)),
            Err(err) => {
                let message = format_failure(&err);
                (message.clone(), Banner::Error(message))
            }
        };

        self.store.record_exchange(query, response);
        tracing::debug!(generation, turns = self.store.len(), "turn recorded");
        if self.mode == InputMode::Batch {
            self.banner = Some(banner);
        }
        self.phase = Phase::Displaying;
        true
    }

    /// Clears the session. A result still in flight will be dropped on
    /// arrival because its generation no longer matches.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.store.reset();
        self.banner = None;
        self.selected_replay = None;
        self.phase = Phase::Ready;
        tracing::debug!(generation = self.generation, "session reset");
    }

    pub fn select_replay(&mut self, index: usize) -> bool {
        if self.store.replay(index).is_some() {
            self.selected_replay = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear_replay_selection(&mut self) {
        self.selected_replay = None;
    }

    pub fn render(&mut self) -> View {
        if self.phase == Phase::Displaying {
            self.phase = Phase::Ready;
        }

        let pending_query = match &self.phase {
            Phase::InFlight { query, .. } => Some(query.clone()),
            _ => None,
        };

        View {
            turns: self.store.all().to_vec(),
            pending_query,
            banner: self.banner.clone(),
            history: self.store.replay_entries().to_vec(),
            replay: self
                .selected_replay
                .and_then(|index| self.store.replay(index))
                .cloned(),
            in_flight: self.is_in_flight(),
        }
    }

    /// Submits `text` and waits for the service in place.
    #[cfg(test)]
    pub async fn run_turn(&mut self, service: &dyn CompletionService, text: &str) -> bool {
        let Some(ticket) = self.submit_text(text) else {
            return false;
        };
        let result = service.complete(&ticket.request).await;
        self.complete(ticket.generation, result)
    }
}

#[cfg(test)]
mod tests {
    use super::{Banner, ChatSettings, InputMode, TurnController, TurnState};
    use crate::completion::{
        ChatModel, CompletionError, CompletionRequest, CompletionService, RequestMessage,
    };
    use crate::session::{Role, Turn};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct ScriptedService {
        replies: Mutex<VecDeque<Result<String, CompletionError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedService {
        fn new(replies: Vec<Result<String, CompletionError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().expect("lock").len()
        }

        fn request(&self, index: usize) -> CompletionRequest {
            self.requests.lock().expect("lock")[index].clone()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedService {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.requests.lock().expect("lock").push(request.clone());
            self.replies
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| Err(CompletionError::new("script exhausted")))
        }
    }

    fn batch() -> TurnController {
        TurnController::new(InputMode::Batch, ChatSettings::default())
    }

    #[tokio::test]
    async fn hello_scenario_resends_prior_turns_in_order() {
        let service = ScriptedService::new(vec![
            Ok("Hi there".to_string()),
            Ok("You said Hello".to_string()),
        ]);
        let mut controller = batch();

        assert!(controller.run_turn(&service, "Hello").await);
        assert_eq!(
            controller.store().all(),
            &[Turn::user("Hello"), Turn::assistant("Hi there")]
        );

        assert!(controller.run_turn(&service, "What did I just say?").await);
        let second = service.request(1);
        assert_eq!(
            second.messages,
            vec![
                RequestMessage::new(Role::System, "You are a helpful assistant."),
                RequestMessage::new(Role::User, "Hello"),
                RequestMessage::new(Role::Assistant, "Hi there"),
                RequestMessage::new(Role::User, "What did I just say?"),
            ]
        );
        assert_eq!(controller.store().len(), 4);
    }

    #[tokio::test]
    async fn failure_becomes_one_error_turn() {
        let service = ScriptedService::new(vec![Err(CompletionError::network("connection refused"))]);
        let mut controller = batch();

        assert!(controller.run_turn(&service, "  Hello  ").await);

        let turns = controller.store().all().to_vec();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0], Turn::user("Hello"));
        assert_eq!(turns[1].role(), Role::Assistant);
        assert!(turns[1].content().starts_with("Error: "));
        assert!(turns[1].content().contains("connection refused"));

        let view = controller.render();
        assert!(matches!(view.banner, Some(Banner::Error(ref m)) if m.contains("connection refused")));
        assert_eq!(view.history[0].response, turns[1].content());
    }

    #[tokio::test]
    async fn chat_mode_seeds_welcome_and_skips_banner() {
        let service = ScriptedService::new(vec![Err(CompletionError::new("boom"))]);
        let mut controller = TurnController::new(InputMode::Stream, ChatSettings::default());
        assert_eq!(controller.store().all(), &[Turn::welcome()]);

        assert!(controller.run_turn(&service, "Hello").await);

        assert_eq!(service.request(0).messages.len(), 3);
        assert_eq!(controller.store().len(), 3);
        assert!(controller.render().banner.is_none());
    }

    #[tokio::test]
    async fn blank_input_issues_no_call() {
        let service = ScriptedService::default();
        let mut controller = batch();

        assert!(!controller.run_turn(&service, "   \n\t").await);
        assert!(controller.submit().is_none());
        assert_eq!(service.calls(), 0);
        assert_eq!(controller.store().len(), 0);
        assert_eq!(controller.state(), TurnState::Idle);
    }

    #[test]
    fn second_submit_while_in_flight_is_refused() {
        let mut controller = batch();
        let ticket = controller.submit_text("first").expect("first submit should issue a ticket");
        assert_eq!(controller.state(), TurnState::RequestInFlight);

        assert!(controller.submit_text("second").is_none());
        assert!(controller.complete(ticket.generation, Ok("done".to_string())));
        assert_eq!(controller.state(), TurnState::Displaying);
    }

    #[test]
    fn reset_during_flight_drops_stale_result() {
        let mut controller = batch();
        let ticket_generation = controller.submit_text("Hello").expect("ticket").generation;

        controller.reset();
        assert_eq!(controller.state(), TurnState::Idle);

        assert!(!controller.complete(ticket_generation, Ok("late".to_string())));
        assert_eq!(controller.store().len(), 0);
        assert!(controller.store().replay_entries().is_empty());

        let fresh = controller.submit_text("again").expect("new ticket after reset");
        assert_ne!(fresh.generation, ticket_generation);
        assert_eq!(fresh.request.messages.len(), 2);
    }

    #[tokio::test]
    async fn selecting_history_entry_issues_no_call() {
        let service = ScriptedService::new(vec![Ok("one".to_string()), Ok("two".to_string())]);
        let mut controller = batch();
        controller.run_turn(&service, "first").await;
        controller.run_turn(&service, "second").await;
        assert_eq!(service.calls(), 2);

        assert!(controller.select_replay(0));
        let view = controller.render();
        let replay = view.replay.expect("selection should be rendered");
        assert_eq!(replay.query, "first");
        assert_eq!(replay.response, "one");
        assert_eq!(service.calls(), 2);

        assert!(!controller.select_replay(5));
        controller.clear_replay_selection();
        assert!(controller.render().replay.is_none());
    }

    #[test]
    fn draft_handling_depends_on_mode() {
        let mut chat = TurnController::new(InputMode::Stream, ChatSettings::default());
        chat.draft_mut().push_str("hi");
        assert_eq!(chat.state(), TurnState::AwaitingInput);
        chat.submit().expect("ticket");
        assert!(chat.draft_mut().is_empty());

        let mut single = batch();
        single.draft_mut().push_str("hi");
        single.submit().expect("ticket");
        assert_eq!(single.draft_mut().as_str(), "hi");
    }

    #[test]
    fn render_returns_to_idle_and_shows_pending_query() {
        let mut controller = batch();
        let ticket = controller.submit_text("Hello").expect("ticket");

        let in_flight = controller.render();
        assert!(in_flight.in_flight);
        assert_eq!(in_flight.pending_query.as_deref(), Some("Hello"));
        assert!(in_flight.turns.is_empty());

        controller.complete(ticket.generation, Ok("Hi".to_string()));
        let shown = controller.render();
        assert_eq!(shown.turns.len(), 2);
        assert_eq!(shown.banner, Some(Banner::Success("Hi".to_string())));
        assert_eq!(controller.state(), TurnState::Idle);
    }

    #[test]
    fn settings_apply_to_next_request() {
        let mut controller = batch();
        controller.settings_mut().model = ChatModel::Gemma2_9b;
        controller.settings_mut().system_prompt = "Answer in French.".to_string();

        let ticket = controller.submit_text("Hello").expect("ticket");
        assert_eq!(ticket.request.model, ChatModel::Gemma2_9b);
        assert_eq!(ticket.request.messages[0].content, "Answer in French.");
    }

    #[test]
    fn input_mode_parses_variant_names() {
        assert_eq!("chat".parse::<InputMode>(), Ok(InputMode::Stream));
        assert_eq!("Single-Shot".parse::<InputMode>(), Ok(InputMode::Batch));
        assert!("modal".parse::<InputMode>().is_err());
        assert_eq!(InputMode::Batch.to_string(), "single-shot");
    }
}
