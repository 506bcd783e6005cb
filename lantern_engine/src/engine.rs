//! The engine: one turn at a time.
//!
//! `GameEngine` owns the [`GameState`], the vocabulary, the handler and
//! hook registries, and the I/O boundary. `execute` runs the full turn
//! pipeline for one input line: parse, expand ALL/AND, gate on light, fire
//! before-hooks, validate, process, apply atomically, update pronouns,
//! post-process, fire after-hooks, then advance fuses and daemons and
//! flush the output buffer.

use crate::command::Command;
use crate::handler::{ActionContext, ActionHandler};
use crate::handlers::{join_names, set_pronoun};
use crate::hooks::{HookRegistry, ItemEvent, LocationEvent};
use crate::io::IoHandler;
use crate::parser;
use crate::response::{ActionResponse, DARKNESS_MESSAGE};
use crate::save_files;
use crate::scope;
use crate::state::GameState;
use crate::timers::{TimerContext, TimerRegistry};
use crate::vocabulary::Vocabulary;
use lantern_data::{
    ActionResult, AttributeKey, DaemonId, EntityReference, FuseId, ItemId, LocationId, SideEffect, StateChange,
    StateValue, VerbId,
};
use log::{error, info, warn};
use std::collections::HashMap;
use std::rc::Rc;

/// Whether the REPL should keep running after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineControl {
    Continue,
    Quit,
}

/// What one executed turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Everything flushed from the I/O buffer this turn.
    pub output: String,
    pub control: EngineControl,
}

/// The one engine per running game.
pub struct GameEngine {
    state: GameState,
    vocabulary: Vocabulary,
    handlers: HashMap<VerbId, Rc<dyn ActionHandler>>,
    hooks: HookRegistry,
    timers: TimerRegistry,
    io: Box<dyn IoHandler>,
}

impl GameEngine {
    /// Assemble an engine from already-validated parts. The vocabulary is
    /// expected to cover every handler; use [`crate::GameBlueprint`] to
    /// build an engine with validation.
    pub fn from_parts(
        state: GameState,
        handlers: Vec<Box<dyn ActionHandler>>,
        vocabulary: Vocabulary,
        hooks: HookRegistry,
        timers: TimerRegistry,
        io: Box<dyn IoHandler>,
    ) -> Self {
        let mut handler_map: HashMap<VerbId, Rc<dyn ActionHandler>> = HashMap::new();
        for handler in handlers {
            handler_map.insert(handler.verb(), Rc::from(handler));
        }
        Self {
            state,
            vocabulary,
            handlers: handler_map,
            hooks,
            timers,
            io,
        }
    }

    /// Read-only view of the world, for tests and front-ends.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// An owned snapshot of the world.
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    /// Run the interactive loop until the player quits or input ends.
    pub fn run(&mut self) -> anyhow::Result<()> {
        self.print_surroundings();
        self.io.flush();
        loop {
            let Some(line) = self.io.read_line("> ") else {
                info!("input exhausted; leaving the game loop");
                break;
            };
            if self.execute(&line).control == EngineControl::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Execute one full turn for an input line and flush the output.
    pub fn execute(&mut self, input: &str) -> TurnOutcome {
        let control = self.execute_inner(input);
        TurnOutcome {
            output: self.io.flush(),
            control,
        }
    }

    fn execute_inner(&mut self, input: &str) -> EngineControl {
        info!("---- turn {} | input: {input:?}", self.state.player.moves + 1);

        if let Some(control) = self.system_command(input) {
            return control;
        }

        let command = match parser::parse(input, &self.vocabulary, &self.state) {
            Ok(command) => command,
            Err(parse_error) => {
                // Parse failures end the turn without any mutation.
                self.io.print(&parse_error.to_string());
                return EngineControl::Continue;
            },
        };

        let Some(handler) = self.handlers.get(&command.verb).cloned() else {
            error!("no handler registered for parsed verb '{}'", command.verb);
            let rendered = ActionResponse::InternalEngineError(format!("verb '{}' has no handler", command.verb))
                .render(&self.state);
            self.io.print(&rendered);
            return EngineControl::Continue;
        };

        if command.direct_objects.len() > 1 && !handler.supports_multiple_objects() {
            self.io
                .print(&format!("The verb '{}' doesn't support multiple objects.", command.verb));
            return EngineControl::Continue;
        }

        // Multi-object expansion: ALL resolves against the verb's own
        // scope, in id order; explicit lists keep their parsed order.
        let objects: Vec<Option<EntityReference>> = if command.is_all {
            let mut ids = handler.all_scope(&self.state);
            ids.sort();
            if ids.is_empty() {
                self.io.print(&handler.empty_all_message());
                self.advance_turn();
                return EngineControl::Continue;
            }
            ids.into_iter().map(|id| Some(EntityReference::Item(id))).collect()
        } else if command.direct_objects.is_empty() {
            vec![None]
        } else {
            command.direct_objects.iter().cloned().map(Some).collect()
        };

        if handler.requires_light() && !scope::is_location_lit(&self.state, &self.state.player.current_location) {
            self.io.print(DARKNESS_MESSAGE);
            self.advance_turn();
            return EngineControl::Continue;
        }

        let aggregate = command.is_all || objects.len() > 1;
        let mut succeeded: Vec<ItemId> = Vec::new();

        for object in objects {
            if let Some(id) = self.run_object_pipeline(handler.as_ref(), &command, object, aggregate) {
                succeeded.push(id);
            }
        }

        if aggregate && !succeeded.is_empty() {
            let names: Vec<String> = succeeded.iter().map(|id| format!("the {}", self.state.item_name(id))).collect();
            self.io
                .print(&format!("You {} {}.", handler.aggregate_verb(), join_names(&names)));
        }
        self.update_pronouns(&succeeded, aggregate);

        self.advance_turn();
        EngineControl::Continue
    }

    /// Run steps 4–10 of the pipeline for one direct object. Returns the
    /// object's id when the action succeeded.
    fn run_object_pipeline(
        &mut self,
        handler: &dyn ActionHandler,
        command: &Command,
        object: Option<EntityReference>,
        aggregate: bool,
    ) -> Option<ItemId> {
        let location_before = self.state.player.current_location.clone();

        // Location beforeTurn hook.
        let before = LocationEvent::BeforeTurn(command.clone());
        if let Some(result) = self.hooks.fire_location(&self.state, &location_before, &before) {
            let proceed = result.should_yield_to_engine;
            self.apply_result_now(&result, "location beforeTurn hook");
            if !proceed {
                self.fire_on_enter_if_moved(&location_before);
                return None;
            }
        }

        // Item beforeTurn hooks on the direct and indirect objects.
        let item_before = ItemEvent::BeforeTurn(command.clone());
        for target in [&object, &command.indirect_object] {
            if let Some(EntityReference::Item(id)) = target
                && let Some(result) = self.hooks.fire_item(&self.state, id, &item_before)
            {
                let proceed = result.should_yield_to_engine;
                self.apply_result_now(&result, "item beforeTurn hook");
                if !proceed {
                    self.fire_on_enter_if_moved(&location_before);
                    return None;
                }
            }
        }

        // Validate and process against an immutable snapshot.
        let snapshot = self.state.clone();
        let context = ActionContext {
            command,
            direct_object: object.clone(),
            indirect_object: command.indirect_object.clone(),
            state: &snapshot,
            from_all_expansion: command.is_all,
        };

        let result = match handler.validate(&context).and_then(|()| handler.process(&context)) {
            Ok(result) => result,
            Err(response) => {
                self.report_failure(&response, &snapshot, command.is_all);
                return None;
            },
        };

        // Apply atomically; a validation failure surfaces as an internal
        // error and leaves the state untouched.
        if let Err(response) = self.state.apply(&result.changes) {
            error!("handler '{}' produced rejected changes: {response}", command.verb);
            let rendered = ActionResponse::InternalEngineError(response.to_string()).render(&self.state);
            self.io.print(&rendered);
            return None;
        }
        self.apply_side_effects(&result.effects);

        // Post-process with a fresh snapshot (movement prints the new room).
        if aggregate {
            // Individual messages fold into one aggregate sentence.
        } else {
            let after_apply = self.state.clone();
            let post_context = ActionContext {
                command,
                direct_object: object.clone(),
                indirect_object: command.indirect_object.clone(),
                state: &after_apply,
                from_all_expansion: command.is_all,
            };
            handler.post_process(&post_context, &result, self.io.as_mut());
        }

        // afterTurn hooks: item(s) first, then the location; results apply
        // in addition to default processing.
        let item_after = ItemEvent::AfterTurn(command.clone());
        for target in [&object, &command.indirect_object] {
            if let Some(EntityReference::Item(id)) = target
                && let Some(result) = self.hooks.fire_item(&self.state, id, &item_after)
            {
                self.apply_result_now(&result, "item afterTurn hook");
            }
        }
        let location_now = self.state.player.current_location.clone();
        if let Some(result) = self
            .hooks
            .fire_location(&self.state, &location_now, &LocationEvent::AfterTurn(command.clone()))
        {
            self.apply_result_now(&result, "location afterTurn hook");
        }

        self.fire_on_enter_if_moved(&location_before);

        match object {
            Some(EntityReference::Item(id)) => Some(id),
            _ => None,
        }
    }

    /// Render a validation/process failure, honoring the ALL-expansion
    /// policy: objects the player didn't name fail silently.
    fn report_failure(&mut self, response: &ActionResponse, snapshot: &GameState, from_all: bool) {
        if response.is_internal() {
            error!("internal failure during turn: {response}");
            let rendered = response.render(snapshot);
            self.io.print(&rendered);
            return;
        }
        if !from_all {
            let rendered = response.render(snapshot);
            self.io.print(&rendered);
        }
    }

    /// Apply a hook or timer result: changes first (atomically), then side
    /// effects, then the message.
    fn apply_result_now(&mut self, result: &ActionResult, origin: &str) -> bool {
        if let Err(response) = self.state.apply(&result.changes) {
            error!("{origin} produced rejected changes: {response}");
            let rendered = ActionResponse::InternalEngineError(response.to_string()).render(&self.state);
            self.io.print(&rendered);
            return false;
        }
        self.apply_side_effects(&result.effects);
        if let Some(message) = &result.message {
            self.io.print(message);
        }
        true
    }

    /// Fire `onEnter` when the player's location changed since `before`.
    fn fire_on_enter_if_moved(&mut self, before: &LocationId) {
        let now = self.state.player.current_location.clone();
        if now == *before {
            return;
        }
        if let Some(result) = self.hooks.fire_location(&self.state, &now, &LocationEvent::OnEnter) {
            self.apply_result_now(&result, "location onEnter hook");
        }
    }

    /// Step 8: pronouns. Single-object verbs point "it" at the principal
    /// object; multi-object verbs point "it" at the last object and
    /// "them" at the ordered set.
    fn update_pronouns(&mut self, succeeded: &[ItemId], aggregate: bool) {
        let mut changes: Vec<StateChange> = Vec::new();
        if aggregate {
            if let Some(last) = succeeded.last() {
                changes.push(set_pronoun("it", vec![EntityReference::Item(last.clone())]));
                changes.push(set_pronoun(
                    "them",
                    succeeded.iter().map(|id| EntityReference::Item(id.clone())).collect(),
                ));
            }
        } else if let [only] = succeeded {
            changes.push(set_pronoun("it", vec![EntityReference::Item(only.clone())]));
        }
        if let Err(response) = self.state.apply(&changes) {
            error!("pronoun update rejected: {response}");
        }
    }

    /// Apply an action's side effects. `now` is the turn currently being
    /// executed, so nothing armed mid-turn can fire before the next one.
    fn apply_side_effects(&mut self, effects: &[SideEffect]) {
        let now = self.state.player.moves + 1;
        for effect in effects {
            match effect {
                SideEffect::StartFuse { fuse, turns, payload } => {
                    let Some(default_turns) = self.timers.fuse(fuse).map(|def| def.default_turns) else {
                        warn!("ignoring StartFuse for unregistered fuse '{fuse}'");
                        continue;
                    };
                    self.state
                        .arm_fuse(fuse.clone(), turns.unwrap_or(default_turns), payload.clone(), now);
                },
                SideEffect::StopFuse { fuse } => self.state.stop_fuse(fuse),
                SideEffect::RunDaemon { daemon } => {
                    if self.timers.daemon(daemon).is_none() {
                        warn!("ignoring RunDaemon for unregistered daemon '{daemon}'");
                        continue;
                    }
                    self.state.start_daemon(daemon.clone(), now);
                },
                SideEffect::StopDaemon { daemon } => self.state.stop_daemon(daemon),
                SideEffect::ScheduleEvent { fuse, turns, payload } => {
                    if self.timers.fuse(fuse).is_none() {
                        warn!("ignoring ScheduleEvent for unregistered fuse '{fuse}'");
                        continue;
                    }
                    self.state.schedule_event(fuse.clone(), *turns, payload.clone(), now);
                },
            }
        }
    }

    /// Steps 11: count the move, then advance fuses, daemons, and the
    /// scheduler against the new turn number.
    fn advance_turn(&mut self) {
        let moves = self.state.player.moves;
        let tick = StateChange::guarded(
            EntityReference::Player,
            AttributeKey::PlayerMoves,
            StateValue::Int(moves),
            StateValue::Int(moves + 1),
        );
        if let Err(response) = self.state.apply(&[tick]) {
            error!("move counter update rejected: {response}");
        }
        self.advance_timers();
    }

    fn advance_timers(&mut self) {
        let now = self.state.player.moves;

        let fuse_ids: Vec<FuseId> = self.state.active_fuses.keys().cloned().collect();
        for id in fuse_ids {
            let Some(fuse) = self.state.active_fuses.get_mut(&id) else {
                continue;
            };
            if fuse.armed_on >= now {
                continue;
            }
            fuse.remaining = fuse.remaining.saturating_sub(1);
            if fuse.remaining > 0 {
                continue;
            }
            let payload = fuse.payload.clone();
            self.state.active_fuses.remove(&id);
            info!("fuse '{id}' fired on turn {now}");
            self.run_fuse_behavior(&id, payload);
        }

        let daemon_ids: Vec<DaemonId> = self.state.active_daemons.keys().cloned().collect();
        for id in daemon_ids {
            let runnable = self
                .state
                .active_daemons
                .get(&id)
                .is_some_and(|daemon| daemon.active && daemon.started_on < now);
            if runnable {
                self.run_daemon_behavior(&id);
            }
        }

        for event in self.state.scheduler.pop_due(now) {
            info!("scheduled event '{}' firing on turn {now}", event.fuse);
            self.run_fuse_behavior(&event.fuse, event.payload);
        }
    }

    fn run_fuse_behavior(&mut self, id: &FuseId, payload: Option<StateValue>) {
        let outcome = {
            let Some(definition) = self.timers.fuse(id) else {
                warn!("fuse '{id}' fired but is not registered");
                return;
            };
            let snapshot = self.state.clone();
            let context = TimerContext {
                state: &snapshot,
                payload: payload.as_ref(),
            };
            (definition.behavior)(&context)
        };
        match outcome {
            Ok(Some(result)) => {
                self.apply_result_now(&result, "fuse behavior");
            },
            Ok(None) => {},
            Err(err) => error!("fuse '{id}' behavior failed: {err}"),
        }
    }

    fn run_daemon_behavior(&mut self, id: &DaemonId) {
        let outcome = {
            let Some(definition) = self.timers.daemon(id) else {
                warn!("daemon '{id}' is active but not registered");
                return;
            };
            let snapshot = self.state.clone();
            let context = TimerContext {
                state: &snapshot,
                payload: None,
            };
            (definition.behavior)(&context)
        };
        match outcome {
            Ok(Some(result)) => {
                self.apply_result_now(&result, "daemon behavior");
            },
            Ok(None) => {},
            Err(err) => error!("daemon '{id}' behavior failed: {err}"),
        }
    }

    /// SAVE/RESTORE/QUIT are CLI surface, handled before the parser.
    fn system_command(&mut self, input: &str) -> Option<EngineControl> {
        let mut words = input.trim().split_whitespace();
        let head = words.next()?.to_lowercase();
        let slot = words.next().unwrap_or("default").to_string();
        match head.as_str() {
            "quit" | "q" => {
                self.io.print("Goodbye.");
                Some(EngineControl::Quit)
            },
            "save" => {
                match save_files::save_state(&self.state, &slot) {
                    Ok(path) => {
                        info!("saved game to {}", path.display());
                        self.io.print("Saved.");
                    },
                    Err(err) => {
                        error!("save to slot '{slot}' failed: {err:#}");
                        self.io.print("The save failed; see the log for details.");
                    },
                }
                Some(EngineControl::Continue)
            },
            "restore" => {
                match save_files::load_state(&slot) {
                    Ok(loaded) => {
                        self.state = loaded;
                        self.io.print("Restored.");
                        self.print_surroundings();
                    },
                    Err(err) => {
                        error!("restore from slot '{slot}' failed: {err:#}");
                        self.io.print("The restore failed; see the log for details.");
                    },
                }
                Some(EngineControl::Continue)
            },
            _ => None,
        }
    }

    fn print_surroundings(&mut self) {
        if scope::is_location_lit(&self.state, &self.state.player.current_location) {
            let description = crate::handlers::perception::describe_location(&self.state);
            self.io.print(&description);
        } else {
            self.io.print(DARKNESS_MESSAGE);
        }
    }
}
