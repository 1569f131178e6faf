use super::clip::AnimationClip;
use super::mixer::{ActionId, AnimationMixer, LoopMode};
use std::collections::HashMap;
use std::sync::Arc;

/// Blend window, in mixer seconds, between the outgoing and incoming action.
pub const CROSSFADE_SECONDS: f32 = 0.5;

/// Plays once and holds its last pose.
pub const TERMINAL_ACTION: &str = "Die";

/// The action currently playing. Replaced wholesale on every transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionState {
    pub name: String,
    pub action: ActionId,
}

/// What `set_action` did. Callers may log it; nothing here is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Requested action is already playing.
    Unchanged,
    /// No clip with that name.
    Unknown,
    /// First action, nothing to fade from.
    Started,
    CrossFaded { from: String },
}

/// Named-clip table plus the current action.
///
/// The table is built once from a single asset and never refilled.
pub struct ActionController {
    clips: HashMap<String, Arc<AnimationClip>>,
    current: Option<ActionState>,
    crossfade: f32,
    terminal: String,
}

impl ActionController {
    /// Build the table, exposing clips listed in `renames` under their new
    /// name. Later clips win on duplicate names.
    pub fn from_clips(clips: Vec<AnimationClip>, renames: &[(String, String)]) -> Self {
        let mut table = HashMap::with_capacity(clips.len());
        for mut clip in clips {
            if let Some((_, to)) = renames.iter().find(|(from, _)| *from == clip.name) {
                clip.name = to.clone();
            }
            table.insert(clip.name.clone(), Arc::new(clip));
        }

        Self {
            clips: table,
            current: None,
            crossfade: CROSSFADE_SECONDS,
            terminal: TERMINAL_ACTION.to_string(),
        }
    }

    pub fn with_crossfade(mut self, seconds: f32) -> Self {
        self.crossfade = seconds;
        self
    }

    pub fn with_terminal(mut self, name: impl Into<String>) -> Self {
        self.terminal = name.into();
        self
    }

    #[cfg(test)]
    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    #[cfg(test)]
    pub fn clip(&self, name: &str) -> Option<&Arc<AnimationClip>> {
        self.clips.get(name)
    }

    /// Clip names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clips.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[cfg(test)]
    pub fn current(&self) -> Option<&ActionState> {
        self.current.as_ref()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.name.as_str())
    }

    /// Switch to the action called `name`, cross-fading from the current one.
    ///
    /// Does nothing when `name` is already playing or not in the table.
    pub fn set_action(&mut self, name: &str, mixer: &mut AnimationMixer) -> Transition {
        if self.current_name() == Some(name) {
            return Transition::Unchanged;
        }

        let Some(clip) = self.clips.get(name) else {
            return Transition::Unknown;
        };

        let action = mixer.clip_action(clip);
        if name == self.terminal {
            let state = mixer.action_mut(action);
            state.loop_mode = LoopMode::Once;
            state.clamp_when_finished = true;
        }

        let previous = self.current.take();
        if let Some(prev) = &previous {
            mixer.cross_fade(prev.action, action, self.crossfade);
        }

        mixer.action_mut(action).enabled = true;
        mixer.play(action);

        self.current = Some(ActionState {
            name: name.to_string(),
            action,
        });

        match previous {
            Some(prev) => Transition::CrossFaded { from: prev.name },
            None => Transition::Started,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::{Interpolation, Track, TrackProperty};
    use crate::model::{Model, Node};

    fn clip(name: &str) -> AnimationClip {
        AnimationClip::new(
            name,
            vec![Track {
                node: 0,
                property: TrackProperty::Translation,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 2.0],
                values: vec![[0.0; 4], [1.0, 0.0, 0.0, 0.0]],
            }],
        )
    }

    fn default_renames() -> Vec<(String, String)> {
        vec![
            ("Look Around".to_string(), "Idle".to_string()),
            ("Walking".to_string(), "Walk".to_string()),
        ]
    }

    fn knight() -> (ActionController, AnimationMixer, Model) {
        let controller = ActionController::from_clips(
            vec![clip("Look Around"), clip("Walking"), clip("Die")],
            &default_renames(),
        );
        let model = Model {
            nodes: vec![Node::default()],
            roots: vec![0],
            ..Default::default()
        };
        let mixer = AnimationMixer::new(&model);
        (controller, mixer, model)
    }

    #[test]
    fn known_clips_are_renamed() {
        let (controller, _, _) = knight();
        assert_eq!(controller.names(), vec!["Die", "Idle", "Walk"]);
        assert!(!controller.contains("Look Around"));
        assert!(!controller.contains("Walking"));
        assert_eq!(controller.clip("Idle").map(|c| c.name.as_str()), Some("Idle"));
    }

    #[test]
    fn other_names_pass_through() {
        let controller =
            ActionController::from_clips(vec![clip("Run"), clip("Attack")], &default_renames());
        assert_eq!(controller.names(), vec!["Attack", "Run"]);
    }

    #[test]
    fn first_action_starts_without_fade() {
        let (mut controller, mut mixer, _) = knight();
        assert_eq!(controller.set_action("Idle", &mut mixer), Transition::Started);
        let state = controller.current().cloned().expect("current action");
        assert_eq!(state.name, "Idle");
        assert!(mixer.action(state.action).is_running());
        assert!(!mixer.action(state.action).is_fading());
    }

    #[test]
    fn switching_cross_fades_from_previous() {
        let (mut controller, mut mixer, mut model) = knight();
        controller.set_action("Idle", &mut mixer);
        let idle = controller.current().map(|s| s.action).expect("idle");
        mixer.update(0.2, &mut model);

        let transition = controller.set_action("Walk", &mut mixer);
        assert_eq!(
            transition,
            Transition::CrossFaded {
                from: "Idle".to_string()
            }
        );
        let walk = controller.current().map(|s| s.action).expect("walk");
        assert!(mixer.action(idle).is_fading());
        assert!(mixer.action(walk).is_fading());

        mixer.update(CROSSFADE_SECONDS / 2.0, &mut model);
        assert!((mixer.action(walk).effective_weight() - 0.5).abs() < 1e-4);
        mixer.update(CROSSFADE_SECONDS, &mut model);
        assert!(!mixer.action(idle).enabled);
        assert_eq!(mixer.action(walk).effective_weight(), 1.0);
    }

    #[test]
    fn repeating_the_current_action_is_a_noop() {
        let (mut controller, mut mixer, mut model) = knight();
        controller.set_action("Walk", &mut mixer);
        mixer.update(0.7, &mut model);
        let before = controller.current().cloned();
        let time_before = mixer.action(before.as_ref().expect("walk").action).time;

        assert_eq!(controller.set_action("Walk", &mut mixer), Transition::Unchanged);
        assert_eq!(controller.current().cloned(), before);
        let walk = mixer.action(before.expect("walk").action);
        assert_eq!(walk.time, time_before);
        assert!(!walk.is_fading());
        assert_eq!(walk.loop_mode, LoopMode::Repeat);
    }

    #[test]
    fn unknown_action_changes_nothing() {
        let (mut controller, mut mixer, _) = knight();
        controller.set_action("Walk", &mut mixer);
        let before = controller.current().cloned();
        let running_before = mixer.running_actions().count();

        assert_eq!(controller.set_action("Dance", &mut mixer), Transition::Unknown);
        assert_eq!(controller.current().cloned(), before);
        assert_eq!(mixer.running_actions().count(), running_before);
        assert_eq!(controller.current_name(), Some("Walk"));
    }

    #[test]
    fn unknown_action_before_any_action_stays_idle() {
        let (mut controller, mut mixer, _) = knight();
        assert_eq!(controller.set_action("Dance", &mut mixer), Transition::Unknown);
        assert!(controller.current().is_none());
        assert_eq!(mixer.running_actions().count(), 0);
    }

    #[test]
    fn die_plays_once_and_clamps() {
        let (mut controller, mut mixer, _) = knight();
        controller.set_action("Die", &mut mixer);
        let die = mixer.action(controller.current().expect("die").action);
        assert_eq!(die.loop_mode, LoopMode::Once);
        assert!(die.clamp_when_finished);
    }

    #[test]
    fn other_actions_keep_looping() {
        let (mut controller, mut mixer, _) = knight();
        for name in ["Idle", "Walk"] {
            controller.set_action(name, &mut mixer);
            let action = mixer.action(controller.current().expect("action").action);
            assert_eq!(action.loop_mode, LoopMode::Repeat);
            assert!(!action.clamp_when_finished);
        }
    }

    #[test]
    fn leaving_die_is_not_blocked() {
        let (mut controller, mut mixer, mut model) = knight();
        controller.set_action("Die", &mut mixer);
        mixer.update(5.0, &mut model);
        assert!(matches!(
            controller.set_action("Idle", &mut mixer),
            Transition::CrossFaded { .. }
        ));
        assert_eq!(controller.current_name(), Some("Idle"));
    }

    #[test]
    fn configured_crossfade_is_used() {
        let (controller, mut mixer, mut model) = knight();
        let mut controller = controller.with_crossfade(2.0);
        controller.set_action("Idle", &mut mixer);
        controller.set_action("Walk", &mut mixer);
        mixer.update(1.0, &mut model);
        let walk = controller.current().expect("walk").action;
        assert!((mixer.action(walk).effective_weight() - 0.5).abs() < 1e-4);
    }
}
