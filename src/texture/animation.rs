//! Tick-driven animation clips and the controller that switches between them.
//!
//! Clips advance only when the simulation ticks, but frame lookups accept
//! the render loop's interpolation amount so a clip can show the frame it
//! is *about* to be on between ticks. The controller owns a set of clips,
//! groups them into named states, and moves between states when data-driven
//! rules match the signals an entity reports about itself.

use std::collections::HashMap;

use glam::U16Vec2;
use serde::Deserialize;
use smallvec::SmallVec;

use crate::error::AnimationError;
use crate::texture::sprite::AtlasTile;

/// How many rule-driven state switches a single update may chain through
/// before the controller declares the rule data cyclic.
pub const MAX_TRANSITION_STEPS: usize = 8;

/// A single keyframe: the tile shown once the clip reaches `at` ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub at: f32,
    pub tile: AtlasTile,
}

/// A timeline of frames played back at tick granularity.
///
/// `update` advances the clip by its speed once per simulation tick.
/// Between ticks, `frame` previews ahead by `speed * lerp_amount` so the
/// render loop never shows a stale frame for a fast clip.
#[derive(Debug, Clone)]
pub struct Animation {
    timeline: Vec<Frame>,
    duration: f32,
    looping: bool,
    speed: f32,
    elapsed: f32,
    complete: bool,
}

impl Animation {
    /// Creates a clip from an explicit keyframe timeline.
    ///
    /// Panics when the timeline is empty or the duration is not positive;
    /// data files are validated before they get here, so either is a bug
    /// at the call site.
    pub fn new(mut timeline: Vec<Frame>, duration: f32, looping: bool) -> Self {
        assert!(!timeline.is_empty(), "animation timeline cannot be empty");
        assert!(duration > 0.0, "animation duration must be positive, got {duration}");
        timeline.sort_by(|a, b| a.at.total_cmp(&b.at));

        Self {
            timeline,
            duration,
            looping,
            speed: 1.0,
            elapsed: 0.0,
            complete: false,
        }
    }

    /// Creates a clip that shows each tile for `frame_ticks` ticks in order.
    pub fn flipbook(tiles: Vec<AtlasTile>, frame_ticks: f32, looping: bool) -> Self {
        assert!(frame_ticks > 0.0, "frame length must be positive, got {frame_ticks}");
        let duration = tiles.len() as f32 * frame_ticks;
        let timeline = tiles
            .into_iter()
            .enumerate()
            .map(|(index, tile)| Frame {
                at: index as f32 * frame_ticks,
                tile,
            })
            .collect();
        Self::new(timeline, duration, looping)
    }

    /// Advances the clip by one tick (scaled by its speed).
    ///
    /// A completed one-shot clip stays on its final frame.
    pub fn update(&mut self) {
        if self.complete {
            return;
        }
        self.elapsed += self.speed;
        if self.elapsed >= self.duration {
            if self.looping {
                self.elapsed %= self.duration;
            } else {
                self.elapsed = self.duration;
                self.complete = true;
            }
        }
    }

    /// Returns the tile for the current playback position.
    ///
    /// `lerp_amount` is the render loop's progress into the current tick;
    /// the lookup position runs ahead by that fraction of one update so
    /// sub-tick frame flips show up as soon as they happen.
    pub fn frame(&self, lerp_amount: f32) -> Option<AtlasTile> {
        let mut t = if self.complete {
            self.elapsed
        } else {
            self.elapsed + self.speed * lerp_amount
        };
        if t >= self.duration {
            if self.looping {
                t %= self.duration;
            } else {
                t = self.duration;
            }
        }
        self.timeline.iter().rev().find(|frame| frame.at <= t).map(|frame| frame.tile)
    }

    /// The largest frame size in the timeline, in pixels.
    pub fn size(&self) -> U16Vec2 {
        self.timeline
            .iter()
            .map(|frame| frame.tile.size)
            .max_by_key(|size| size.x as u32 * size.y as u32)
            .unwrap_or(U16Vec2::ZERO)
    }

    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.complete = false;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn complete(&self) -> bool {
        self.complete
    }

    pub fn looping(&self) -> bool {
        self.looping
    }
}

/// The signals an entity exposes for rule evaluation each tick.
#[derive(Debug, Clone, Default)]
pub struct AnimSignals {
    pub speed: f32,
    pub health_zero: bool,
    pub thrusting: bool,
    pub flags: SmallVec<[&'static str; 4]>,
}

/// A closed set of predicates the rule data can reference.
///
/// Being an enum, a typo in a data file fails deserialization instead of
/// silently never matching.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Thrusting,
    NotThrusting,
    HealthZero,
    HealthPositive,
    SpeedAbove { value: f32 },
    SpeedAtMost { value: f32 },
    AnimationsComplete,
    Flag { name: String },
    NotFlag { name: String },
    Always,
}

impl Condition {
    fn evaluate(&self, signals: &AnimSignals, animations_complete: bool) -> bool {
        match self {
            Condition::Thrusting => signals.thrusting,
            Condition::NotThrusting => !signals.thrusting,
            Condition::HealthZero => signals.health_zero,
            Condition::HealthPositive => !signals.health_zero,
            Condition::SpeedAbove { value } => signals.speed > *value,
            Condition::SpeedAtMost { value } => signals.speed <= *value,
            Condition::AnimationsComplete => animations_complete,
            Condition::Flag { name } => signals.flags.iter().any(|flag| flag == name),
            Condition::NotFlag { name } => !signals.flags.iter().any(|flag| flag == name),
            Condition::Always => true,
        }
    }
}

/// A transition rule: switch to `to` when `when` holds.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimRule {
    pub when: Condition,
    pub to: String,
}

/// A named controller state: the clips it plays and the rules leading out.
#[derive(Debug, Clone, Deserialize)]
pub struct AnimState {
    pub clips: Vec<String>,
    #[serde(default)]
    pub rules: Vec<AnimRule>,
}

/// Switches between animation states based on entity signals.
///
/// Rules are checked in order and the first match wins. A switch may chain
/// when the target state's rules also match, bounded by
/// [`MAX_TRANSITION_STEPS`]; a chain that fails to settle is reported as an
/// error and the controller stays where it got to.
#[derive(Debug, Clone)]
pub struct AnimController {
    name: String,
    clips: HashMap<String, Animation>,
    states: HashMap<String, AnimState>,
    current: String,
}

impl AnimController {
    /// Wires up a controller.
    ///
    /// Panics when `start` is not a state, or when any state references a
    /// clip or rule target that does not exist. Data-driven controllers
    /// are validated when the data loads; building one by hand with bad
    /// references is a bug.
    pub fn new(name: impl Into<String>, states: HashMap<String, AnimState>, clips: HashMap<String, Animation>, start: &str) -> Self {
        let name = name.into();
        assert!(states.contains_key(start), "controller {name}: start state {start} does not exist");
        for (state_name, state) in &states {
            for clip in &state.clips {
                assert!(clips.contains_key(clip), "controller {name}: state {state_name} references unknown clip {clip}");
            }
            for rule in &state.rules {
                assert!(states.contains_key(&rule.to), "controller {name}: state {state_name} targets unknown state {}", rule.to);
            }
        }

        Self {
            name,
            clips,
            states,
            current: start.to_string(),
        }
    }

    /// Applies transitions for this tick's signals, then advances the
    /// current state's clips by one tick.
    pub fn update(&mut self, signals: &AnimSignals) -> Result<(), AnimationError> {
        let result = self.apply_transitions(signals);
        let state = self.states.get(&self.current).expect("current state is always a valid key");
        for clip_name in &state.clips {
            if let Some(clip) = self.clips.get_mut(clip_name) {
                clip.update();
            }
        }
        result
    }

    fn apply_transitions(&mut self, signals: &AnimSignals) -> Result<(), AnimationError> {
        for _ in 0..MAX_TRANSITION_STEPS {
            let complete = self.animations_complete();
            let state = self.states.get(&self.current).expect("current state is always a valid key");
            let Some(rule) = state.rules.iter().find(|rule| rule.when.evaluate(signals, complete)) else {
                return Ok(());
            };
            let target = rule.to.clone();
            self.enter_state(&target);
        }
        Err(AnimationError::TransitionOverflow {
            controller: self.name.clone(),
            steps: MAX_TRANSITION_STEPS,
        })
    }

    /// Forces the controller into `state`, restarting that state's clips.
    ///
    /// Panics on an unknown state name.
    pub fn set_state(&mut self, state: &str) {
        assert!(self.states.contains_key(state), "controller {}: unknown state {state}", self.name);
        self.enter_state(state);
    }

    fn enter_state(&mut self, name: &str) {
        let state = self.states.get(name).expect("transition targets are validated at construction");
        for clip_name in &state.clips {
            let clip = self.clips.get_mut(clip_name).expect("state clips are validated at construction");
            clip.restart();
        }
        self.current = name.to_string();
    }

    /// The tiles to draw for the current state, in clip order.
    pub fn frames(&self, lerp_amount: f32) -> SmallVec<[AtlasTile; 2]> {
        let state = self.states.get(&self.current).expect("current state is always a valid key");
        state
            .clips
            .iter()
            .filter_map(|clip_name| self.clips.get(clip_name).and_then(|clip| clip.frame(lerp_amount)))
            .collect()
    }

    /// Whether every clip of the current state has finished.
    ///
    /// Looping clips never finish, so states meant to end must use
    /// one-shot clips.
    pub fn animations_complete(&self) -> bool {
        let state = self.states.get(&self.current).expect("current state is always a valid key");
        state
            .clips
            .iter()
            .all(|clip_name| self.clips.get(clip_name).map(Animation::complete).unwrap_or(true))
    }

    /// The largest frame size across the current state's clips, in pixels.
    pub fn size(&self) -> U16Vec2 {
        let state = self.states.get(&self.current).expect("current state is always a valid key");
        state
            .clips
            .iter()
            .filter_map(|clip_name| self.clips.get(clip_name))
            .map(Animation::size)
            .max_by_key(|size| size.x as u32 * size.y as u32)
            .unwrap_or(U16Vec2::ZERO)
    }

    pub fn current_state(&self) -> &str {
        &self.current
    }
}
