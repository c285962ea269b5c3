//! Game lifecycle state machine.
//!
//! Central authority on whether player input is currently allowed. All
//! systems read the same machine; transitions are validated against a
//! declared adjacency table and never throw — an illegal transition is a
//! logged `false` with the state unchanged.

use crate::events::BoardEvent;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Lifecycle states. Exactly one is current at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    /// Engine object exists, nothing loaded yet
    Booting,
    /// Board being populated
    Loading,
    /// Accepting player input
    Ready,
    /// A swap transaction is resolving; input locked
    Processing,
    /// Suspended; resumes to the pre-pause state
    Paused,
    /// Terminal until an explicit restart (GameOver -> Loading)
    GameOver,
}

impl GameState {
    /// All states, used to verify the transition table covers every variant
    pub const ALL: [GameState; 6] = [
        GameState::Booting,
        GameState::Loading,
        GameState::Ready,
        GameState::Processing,
        GameState::Paused,
        GameState::GameOver,
    ];
}

/// Who requested a transition; carried on notifications for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionSource {
    System,
    Gameplay,
    UserInterface,
    Debug,
}

/// Per-state rules: input flag plus legal outgoing transitions
struct StateDefinition {
    allows_input: bool,
    transitions: HashSet<GameState>,
}

impl StateDefinition {
    fn new(allows_input: bool, transitions: &[GameState]) -> Self {
        Self {
            allows_input,
            transitions: transitions.iter().copied().collect(),
        }
    }
}

/// Validating state machine over [`GameState`].
///
/// Committed transitions queue a [`BoardEvent::StateChanged`] notification
/// (plus a one-time [`BoardEvent::GameStarted`] on first entry into Ready);
/// callers drain the queue with [`GameStateMachine::drain_notifications`].
pub struct GameStateMachine {
    current: GameState,
    previous: GameState,
    definitions: HashMap<GameState, StateDefinition>,
    state_before_pause: Option<GameState>,
    has_game_started: bool,
    notifications: Vec<BoardEvent>,
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStateMachine {
    /// Create the machine in `Booting` with the full adjacency table.
    pub fn new() -> Self {
        let mut definitions = HashMap::new();
        definitions.insert(
            GameState::Booting,
            StateDefinition::new(false, &[GameState::Loading]),
        );
        definitions.insert(
            GameState::Loading,
            StateDefinition::new(false, &[GameState::Ready, GameState::GameOver]),
        );
        definitions.insert(
            GameState::Ready,
            StateDefinition::new(
                true,
                &[GameState::Processing, GameState::Paused, GameState::GameOver],
            ),
        );
        definitions.insert(
            GameState::Processing,
            StateDefinition::new(
                false,
                &[GameState::Ready, GameState::Paused, GameState::GameOver],
            ),
        );
        definitions.insert(
            GameState::Paused,
            StateDefinition::new(false, &[GameState::Ready, GameState::GameOver]),
        );
        definitions.insert(
            GameState::GameOver,
            StateDefinition::new(false, &[GameState::Loading]),
        );

        let machine = Self {
            current: GameState::Booting,
            previous: GameState::Booting,
            definitions,
            state_before_pause: None,
            has_game_started: false,
            notifications: Vec::new(),
        };
        // Every declared state must have a definition; a gap here is a
        // fatal configuration bug, not a runtime condition.
        for state in GameState::ALL {
            assert!(
                machine.definitions.contains_key(&state),
                "missing state definition for {state:?}"
            );
        }
        machine
    }

    /// The current state
    pub fn current(&self) -> GameState {
        self.current
    }

    /// The state immediately prior to the current one
    pub fn previous(&self) -> GameState {
        self.previous
    }

    /// Whether the current state accepts player input
    pub fn is_player_input_allowed(&self) -> bool {
        self.definition(self.current).allows_input
    }

    fn definition(&self, state: GameState) -> &StateDefinition {
        self.definitions
            .get(&state)
            .unwrap_or_else(|| panic!("missing state definition for {state:?}"))
    }

    /// Whether a transition from the current state to `target` is legal
    pub fn can_transition(&self, target: GameState) -> bool {
        self.definition(self.current).transitions.contains(&target)
    }

    /// Attempt a transition. Returns `true` without side effects when the
    /// target equals the current state; returns `false` (logged, state
    /// unchanged) for transitions absent from the adjacency table.
    pub fn try_set_state(&mut self, target: GameState, source: TransitionSource) -> bool {
        if self.current == target {
            return true;
        }
        if !self.can_transition(target) {
            warn!(
                current = ?self.current,
                ?target,
                ?source,
                "rejected illegal state transition"
            );
            return false;
        }
        self.apply(target, source);
        true
    }

    /// Pause, remembering the current state for resume. Returns `false`
    /// when already paused or pausing is illegal from the current state.
    pub fn try_pause(&mut self, source: TransitionSource) -> bool {
        if self.current == GameState::Paused || !self.can_transition(GameState::Paused) {
            return false;
        }
        self.state_before_pause = Some(self.current);
        if self.try_set_state(GameState::Paused, source) {
            true
        } else {
            self.state_before_pause = None;
            false
        }
    }

    /// Resume to the remembered pre-pause state (Ready when the remembered
    /// state is unusable). Returns `false` when not paused.
    pub fn try_resume(&mut self, source: TransitionSource) -> bool {
        if self.current != GameState::Paused {
            return false;
        }
        let target = match self.state_before_pause {
            Some(GameState::Paused) | None => GameState::Ready,
            Some(state) => state,
        };
        // Processing is not reachable from Paused; fall back to Ready so a
        // pause taken mid-resolution still resumes.
        let target = if self.can_transition(target) {
            target
        } else {
            GameState::Ready
        };
        if self.try_set_state(target, source) {
            self.state_before_pause = None;
            true
        } else {
            false
        }
    }

    /// Take all queued change notifications, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.notifications)
    }

    /// Full teardown: back to `Booting`, queue and lifecycle flags cleared.
    pub fn reset(&mut self) {
        self.current = GameState::Booting;
        self.previous = GameState::Booting;
        self.state_before_pause = None;
        self.has_game_started = false;
        self.notifications.clear();
    }

    fn apply(&mut self, target: GameState, source: TransitionSource) {
        self.previous = self.current;
        self.current = target;
        if self.previous == GameState::Paused {
            self.state_before_pause = None;
        }

        let input_allowed = self.is_player_input_allowed();
        self.notifications.push(BoardEvent::StateChanged {
            previous: self.previous,
            current: self.current,
            source,
            input_allowed,
        });
        if target == GameState::Ready && !self.has_game_started {
            self.has_game_started = true;
            self.notifications.push(BoardEvent::GameStarted);
        }
    }
}
