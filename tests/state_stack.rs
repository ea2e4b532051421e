use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use driftbelt::entity::registry::EntityRegistry;
use driftbelt::error::{GameError, GameResult, StateError};
use driftbelt::input::InputFrame;
use driftbelt::render::DrawContext;
use driftbelt::save::SaveStore;
use driftbelt::state::{Below, StackCommand, State, StateContext, StateKind, StateStack};

mod common;

/// Everything observable about a probe state's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Saw {
    Input,
    Update,
    Enter(f32),
    Exit(f32),
    Quit(StateKind),
}

#[derive(Default)]
struct Trace {
    events: Mutex<Vec<Saw>>,
    quits: AtomicU32,
}

impl Trace {
    fn record(&self, saw: Saw) {
        self.events.lock().unwrap().push(saw);
    }

    fn events(&self) -> Vec<Saw> {
        self.events.lock().unwrap().clone()
    }

    fn quits(&self) -> u32 {
        self.quits.load(Ordering::SeqCst)
    }
}

/// A state that does nothing but write its lifecycle into a shared trace.
struct ProbeState {
    kind: StateKind,
    enter: f32,
    exit: f32,
    transition_input: bool,
    trace: Arc<Trace>,
}

impl ProbeState {
    fn new(kind: StateKind) -> (Self, Arc<Trace>) {
        let trace = Arc::new(Trace::default());
        (Self::sharing(kind, &trace), trace)
    }

    fn sharing(kind: StateKind, trace: &Arc<Trace>) -> Self {
        Self {
            kind,
            enter: 0.0,
            exit: 0.0,
            transition_input: false,
            trace: Arc::clone(trace),
        }
    }

    fn with_enter(mut self, ticks: f32) -> Self {
        self.enter = ticks;
        self
    }

    fn with_exit(mut self, ticks: f32) -> Self {
        self.exit = ticks;
        self
    }

    fn with_transition_input(mut self) -> Self {
        self.transition_input = true;
        self
    }
}

impl State for ProbeState {
    fn kind(&self) -> StateKind {
        self.kind
    }

    fn enter_duration(&self) -> f32 {
        self.enter
    }

    fn exit_duration(&self) -> f32 {
        self.exit
    }

    fn input_during_transitions(&self) -> bool {
        self.transition_input
    }

    fn userinput(&mut self, _ctx: &mut StateContext) {
        self.trace.record(Saw::Input);
    }

    fn update(&mut self, _ctx: &mut StateContext) {
        self.trace.record(Saw::Update);
    }

    fn update_on_enter(&mut self, _ctx: &mut StateContext, fraction: f32) {
        self.trace.record(Saw::Enter(fraction));
    }

    fn update_on_exit(&mut self, _ctx: &mut StateContext, fraction: f32) {
        self.trace.record(Saw::Exit(fraction));
    }

    fn draw(&self, _gfx: &mut DrawContext, _below: Below) -> GameResult<()> {
        Ok(())
    }

    fn quit(&mut self, _saves: &SaveStore) -> GameResult<()> {
        self.trace.record(Saw::Quit(self.kind));
        self.trace.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Fixture {
    input: InputFrame,
    registry: EntityRegistry,
    saves: common::TempSaves,
}

impl Fixture {
    fn new(label: &str) -> Self {
        Self {
            input: InputFrame::default(),
            registry: EntityRegistry::standard(),
            saves: common::TempSaves::new(label),
        }
    }

    fn ctx(&self) -> StateContext<'_> {
        StateContext {
            input: &self.input,
            data: common::game_data(),
            registry: &self.registry,
            saves: &self.saves.store,
            sounds: Vec::new(),
            commands: Vec::new(),
        }
    }
}

#[test]
fn test_duplicate_kind_is_refused_and_the_stack_unchanged() {
    let fixture = Fixture::new("duplicate");
    let mut stack = StateStack::new();
    let (menu, _) = ProbeState::new(StateKind::Menu);
    let (play, _) = ProbeState::new(StateKind::Play);
    stack.push(Box::new(menu)).unwrap();
    stack.push(Box::new(play)).unwrap();

    let (second_play, refused_trace) = ProbeState::new(StateKind::Play);
    let result = stack.push(Box::new(second_play));

    assert!(matches!(
        result,
        Err(GameError::State(StateError::DuplicateState(_)))
    ));
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.top_kind(), Some(StateKind::Play));

    // The refused state never runs
    let mut ctx = fixture.ctx();
    stack.update(&mut ctx).unwrap();
    assert!(refused_trace.events().is_empty());
}

#[test]
fn test_instant_pop_quits_synchronously_exactly_once() {
    let fixture = Fixture::new("instant_pop");
    let mut stack = StateStack::new();
    let (menu, _) = ProbeState::new(StateKind::Menu);
    let (pause, trace) = ProbeState::new(StateKind::Pause);
    stack.push(Box::new(menu)).unwrap();
    stack.push(Box::new(pause)).unwrap();

    stack.pop(&fixture.saves.store).unwrap();

    assert_eq!(stack.len(), 1);
    assert_eq!(trace.quits(), 1);
    assert_eq!(trace.events(), vec![Saw::Quit(StateKind::Pause)]);
}

#[test]
fn test_pop_with_an_exit_timer_defers_and_feeds_fractions() {
    let fixture = Fixture::new("deferred_pop");
    let mut stack = StateStack::new();
    let (menu, _) = ProbeState::new(StateKind::Menu);
    let (pause, trace) = ProbeState::new(StateKind::Pause);
    stack.push(Box::new(menu)).unwrap();
    stack.push(Box::new(pause.with_exit(4.0))).unwrap();

    stack.pop(&fixture.saves.store).unwrap();

    // Still on the stack, winding down
    assert_eq!(stack.len(), 2);
    assert_eq!(trace.quits(), 0);

    for _ in 0..4 {
        let mut ctx = fixture.ctx();
        stack.update(&mut ctx).unwrap();
    }

    assert_eq!(stack.len(), 1);
    assert_eq!(trace.quits(), 1);
    assert_eq!(
        trace.events(),
        vec![
            Saw::Exit(0.25),
            Saw::Exit(0.5),
            Saw::Exit(0.75),
            Saw::Exit(1.0),
            Saw::Quit(StateKind::Pause),
        ]
    );
}

#[test]
fn test_popping_an_exiting_state_is_a_noop() {
    let fixture = Fixture::new("double_pop");
    let mut stack = StateStack::new();
    let (pause, trace) = ProbeState::new(StateKind::Pause);
    stack.push(Box::new(pause.with_exit(3.0))).unwrap();

    stack.pop(&fixture.saves.store).unwrap();
    stack.pop(&fixture.saves.store).unwrap();

    for _ in 0..3 {
        let mut ctx = fixture.ctx();
        stack.update(&mut ctx).unwrap();
    }

    assert!(stack.is_empty());
    assert_eq!(trace.quits(), 1);
}

#[test]
fn test_an_enter_transition_feeds_fractions_then_updates() {
    let fixture = Fixture::new("enter");
    let mut stack = StateStack::new();
    let (menu, trace) = ProbeState::new(StateKind::Menu);
    stack.push(Box::new(menu.with_enter(2.0))).unwrap();

    for _ in 0..3 {
        let mut ctx = fixture.ctx();
        stack.update(&mut ctx).unwrap();
    }

    assert_eq!(
        trace.events(),
        vec![Saw::Enter(0.5), Saw::Enter(1.0), Saw::Update]
    );
}

#[test]
fn test_input_is_gated_while_transitioning() {
    let fixture = Fixture::new("gated_input");
    let mut stack = StateStack::new();
    let (menu, trace) = ProbeState::new(StateKind::Menu);
    stack.push(Box::new(menu.with_enter(2.0))).unwrap();

    for _ in 0..2 {
        let mut ctx = fixture.ctx();
        stack.userinput(&mut ctx);
        stack.update(&mut ctx).unwrap();
    }

    // Transition over, input flows again
    let mut ctx = fixture.ctx();
    stack.userinput(&mut ctx);

    assert_eq!(
        trace.events(),
        vec![Saw::Enter(0.5), Saw::Enter(1.0), Saw::Input]
    );
}

#[test]
fn test_a_state_may_opt_into_transition_input() {
    let fixture = Fixture::new("transition_input");
    let mut stack = StateStack::new();
    let (menu, trace) = ProbeState::new(StateKind::Menu);
    stack
        .push(Box::new(menu.with_enter(2.0).with_transition_input()))
        .unwrap();

    let mut ctx = fixture.ctx();
    stack.userinput(&mut ctx);

    assert_eq!(trace.events(), vec![Saw::Input]);
}

#[test]
fn test_only_the_top_state_runs() {
    let fixture = Fixture::new("top_only");
    let mut stack = StateStack::new();
    let (menu, menu_trace) = ProbeState::new(StateKind::Menu);
    let (play, play_trace) = ProbeState::new(StateKind::Play);
    stack.push(Box::new(menu)).unwrap();
    stack.push(Box::new(play)).unwrap();

    let mut ctx = fixture.ctx();
    stack.userinput(&mut ctx);
    stack.update(&mut ctx).unwrap();

    assert_eq!(play_trace.events(), vec![Saw::Input, Saw::Update]);
    assert!(menu_trace.events().is_empty());
}

#[test]
fn test_batched_commands_apply_in_order() {
    let fixture = Fixture::new("batched");
    let mut stack = StateStack::new();
    let (menu, menu_trace) = ProbeState::new(StateKind::Menu);
    let (play, play_trace) = ProbeState::new(StateKind::Play);
    let (game_over, _) = ProbeState::new(StateKind::GameOver);
    stack.push(Box::new(menu)).unwrap();
    stack.push(Box::new(play)).unwrap();

    let commands = vec![
        StackCommand::Pop,
        StackCommand::Pop,
        StackCommand::Push(Box::new(game_over)),
    ];
    stack.apply(commands, &fixture.saves.store).unwrap();

    assert_eq!(stack.len(), 1);
    assert_eq!(stack.top_kind(), Some(StateKind::GameOver));
    assert_eq!(menu_trace.quits(), 1);
    assert_eq!(play_trace.quits(), 1);
}

#[test]
fn test_pop_on_an_empty_stack_is_an_error() {
    let fixture = Fixture::new("pop_empty");
    let mut stack = StateStack::new();

    let result = stack.pop(&fixture.saves.store);

    assert!(matches!(
        result,
        Err(GameError::State(StateError::PopOnEmpty))
    ));
}

#[test]
fn test_quit_all_tears_down_the_top_first() {
    let fixture = Fixture::new("quit_all");
    let mut stack = StateStack::new();
    let (menu, trace) = ProbeState::new(StateKind::Menu);
    let play = ProbeState::sharing(StateKind::Play, &trace);
    stack.push(Box::new(menu)).unwrap();
    stack.push(Box::new(play)).unwrap();

    stack.quit_all(&fixture.saves.store).unwrap();

    assert!(stack.is_empty());
    assert_eq!(
        trace.events(),
        vec![Saw::Quit(StateKind::Play), Saw::Quit(StateKind::Menu)]
    );
}
