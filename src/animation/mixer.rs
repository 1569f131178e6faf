// Blends clip actions onto a model's node transforms.
// Weighted accumulation and rest-pose fill follow the usual scene-graph mixer:
// each bound property starts from the first contributing action's value, later
// actions are mixed in by weight / cumulative_weight, and a cumulative weight
// below one is topped up with the rest pose.

use super::clip::{AnimationClip, TrackProperty};
use super::interpolation::{lerp4, quat_slerp};
use crate::model::Model;
use nalgebra_glm as glm;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Play to the end, then pause (clamped) or disable.
    Once,
    Repeat,
}

#[derive(Debug, Clone, Copy)]
struct Fade {
    start: f32,
    duration: f32,
    from: f32,
    to: f32,
}

impl Fade {
    fn value(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = ((now - self.start) / self.duration).clamp(0.0, 1.0);
        self.from + (self.to - self.from) * t
    }

    fn finished(&self, now: f32) -> bool {
        now > self.start + self.duration
    }
}

/// Playback state of one clip inside a mixer.
#[derive(Debug, Clone)]
pub struct ClipAction {
    clip: Arc<AnimationClip>,
    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub clamp_when_finished: bool,
    pub enabled: bool,
    pub paused: bool,
    running: bool,
    fade: Option<Fade>,
    effective_weight: f32,
}

impl ClipAction {
    fn new(clip: Arc<AnimationClip>) -> Self {
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Repeat,
            clamp_when_finished: false,
            enabled: true,
            paused: false,
            running: false,
            fade: None,
            effective_weight: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.clip.name
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Weight used in the last mixer update.
    pub fn effective_weight(&self) -> f32 {
        self.effective_weight
    }

    fn update_time(&mut self, delta: f32) -> f32 {
        let duration = self.clip.duration;
        let time = self.time + delta;

        match self.loop_mode {
            LoopMode::Once => {
                if (0.0..duration).contains(&time) {
                    self.time = time;
                } else {
                    self.time = time.clamp(0.0, duration);
                    if self.clamp_when_finished {
                        self.paused = true;
                    } else {
                        self.enabled = false;
                    }
                }
            }
            LoopMode::Repeat => {
                self.time = if duration > 0.0 {
                    time.rem_euclid(duration)
                } else {
                    0.0
                };
            }
        }

        self.time
    }

    fn update_weight(&mut self, now: f32) -> f32 {
        let mut weight = 0.0;
        if self.enabled {
            weight = self.weight;
            if let Some(fade) = self.fade {
                let value = fade.value(now);
                weight *= value;
                if fade.finished(now) {
                    self.fade = None;
                    if value == 0.0 {
                        self.enabled = false;
                    }
                }
            }
        }
        self.effective_weight = weight;
        weight
    }
}

#[derive(Debug, Clone, Copy)]
struct PropertyAccum {
    bound: bool,
    value: [f32; 4],
    weight: f32,
}

impl Default for PropertyAccum {
    fn default() -> Self {
        Self {
            bound: false,
            value: [0.0; 4],
            weight: 0.0,
        }
    }
}

/// Owns every action created for one model and drives them by time.
pub struct AnimationMixer {
    actions: Vec<ClipAction>,
    by_clip: HashMap<String, ActionId>,
    rest: Vec<[[f32; 4]; 3]>,
    time: f32,
}

impl AnimationMixer {
    /// Bind a mixer to `model`, capturing its current pose as the rest pose.
    pub fn new(model: &Model) -> Self {
        let rest = model
            .nodes
            .iter()
            .map(|node| {
                let r = node.rotation.coords;
                [
                    [node.translation.x, node.translation.y, node.translation.z, 0.0],
                    [r.x, r.y, r.z, r.w],
                    [node.scale.x, node.scale.y, node.scale.z, 0.0],
                ]
            })
            .collect();

        Self {
            actions: Vec::new(),
            by_clip: HashMap::new(),
            rest,
            time: 0.0,
        }
    }

    /// Action for `clip`, created on first request and reused afterwards.
    pub fn clip_action(&mut self, clip: &Arc<AnimationClip>) -> ActionId {
        if let Some(&id) = self.by_clip.get(&clip.name) {
            return id;
        }
        let id = ActionId(self.actions.len());
        self.actions.push(ClipAction::new(Arc::clone(clip)));
        self.by_clip.insert(clip.name.clone(), id);
        id
    }

    #[cfg(test)]
    pub fn action(&self, id: ActionId) -> &ClipAction {
        &self.actions[id.0]
    }

    pub fn action_mut(&mut self, id: ActionId) -> &mut ClipAction {
        &mut self.actions[id.0]
    }

    pub fn play(&mut self, id: ActionId) {
        self.actions[id.0].running = true;
    }

    /// Fade `from` out and `to` in over `duration` seconds of mixer time.
    pub fn cross_fade(&mut self, from: ActionId, to: ActionId, duration: f32) {
        self.schedule_fade(from, duration, 1.0, 0.0);
        self.schedule_fade(to, duration, 0.0, 1.0);
    }

    fn schedule_fade(&mut self, id: ActionId, duration: f32, from: f32, to: f32) {
        let start = self.time;
        self.actions[id.0].fade = Some(Fade {
            start,
            duration,
            from,
            to,
        });
    }

    pub fn running_actions(&self) -> impl Iterator<Item = (ActionId, &ClipAction)> {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, a)| a.running)
            .map(|(i, a)| (ActionId(i), a))
    }

    /// Advance by `delta` seconds and write the blended pose into `model`.
    pub fn update(&mut self, delta: f32, model: &mut Model) {
        self.time += delta;
        let now = self.time;

        let mut accum = vec![[PropertyAccum::default(); 3]; model.nodes.len()];

        for action in self.actions.iter_mut().filter(|a| a.running) {
            let weight;
            let clip_time;
            if action.enabled {
                let scaled = if action.paused {
                    0.0
                } else {
                    delta * action.time_scale
                };
                clip_time = action.update_time(scaled);
                weight = action.update_weight(now);
            } else {
                clip_time = action.time;
                weight = action.update_weight(now);
            }

            for track in &action.clip.tracks {
                let Some(slots) = accum.get_mut(track.node) else {
                    continue;
                };
                let slot = &mut slots[track.property.slot()];
                slot.bound = true;
                if weight <= 0.0 {
                    continue;
                }

                let value = track.sample(clip_time);
                if slot.weight == 0.0 {
                    slot.value = value;
                    slot.weight = weight;
                } else {
                    slot.weight += weight;
                    let mix = weight / slot.weight;
                    slot.value = mix_property(track.property, &slot.value, &value, mix);
                }
            }
        }

        for (index, slots) in accum.iter().enumerate() {
            for property in TrackProperty::ALL {
                let slot = &slots[property.slot()];
                if !slot.bound {
                    continue;
                }
                let mut value = slot.value;
                if slot.weight < 1.0 {
                    let rest = self
                        .rest
                        .get(index)
                        .map(|r| r[property.slot()])
                        .unwrap_or_else(|| property.identity());
                    value = if slot.weight == 0.0 {
                        rest
                    } else {
                        mix_property(property, &value, &rest, 1.0 - slot.weight)
                    };
                }
                apply_property(model, index, property, &value);
            }
        }
    }
}

fn mix_property(property: TrackProperty, a: &[f32; 4], b: &[f32; 4], t: f32) -> [f32; 4] {
    match property {
        TrackProperty::Rotation => quat_slerp(a, b, t),
        _ => lerp4(a, b, t),
    }
}

fn apply_property(model: &mut Model, index: usize, property: TrackProperty, value: &[f32; 4]) {
    let Some(node) = model.nodes.get_mut(index) else {
        return;
    };
    match property {
        TrackProperty::Translation => node.translation = glm::vec3(value[0], value[1], value[2]),
        TrackProperty::Rotation => {
            node.rotation = glm::quat(value[0], value[1], value[2], value[3])
        }
        TrackProperty::Scale => node.scale = glm::vec3(value[0], value[1], value[2]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::clip::{Interpolation, Track};
    use crate::model::Node;

    fn slide_clip(name: &str, x: f32, duration: f32) -> Arc<AnimationClip> {
        Arc::new(AnimationClip::new(
            name,
            vec![Track {
                node: 0,
                property: TrackProperty::Translation,
                interpolation: Interpolation::Linear,
                times: vec![0.0, duration],
                values: vec![[x, 0.0, 0.0, 0.0], [x, 1.0, 0.0, 0.0]],
            }],
        ))
    }

    fn one_node_model() -> Model {
        Model {
            nodes: vec![Node::default()],
            roots: vec![0],
            ..Default::default()
        }
    }

    #[test]
    fn clip_action_is_cached_per_clip() {
        let model = one_node_model();
        let mut mixer = AnimationMixer::new(&model);
        let walk = slide_clip("Walk", 1.0, 1.0);
        let a = mixer.clip_action(&walk);
        let b = mixer.clip_action(&walk);
        assert_eq!(a, b);
        let idle = slide_clip("Idle", 0.0, 1.0);
        assert_ne!(a, mixer.clip_action(&idle));
    }

    #[test]
    fn single_action_drives_node() {
        let mut model = one_node_model();
        let mut mixer = AnimationMixer::new(&model);
        let walk = mixer.clip_action(&slide_clip("Walk", 2.0, 1.0));
        mixer.play(walk);
        mixer.update(0.5, &mut model);
        assert_eq!(model.nodes[0].translation, glm::vec3(2.0, 0.5, 0.0));
    }

    #[test]
    fn repeat_wraps_time() {
        let mut model = one_node_model();
        let mut mixer = AnimationMixer::new(&model);
        let walk = mixer.clip_action(&slide_clip("Walk", 0.0, 1.0));
        mixer.play(walk);
        mixer.update(1.25, &mut model);
        assert!((mixer.action(walk).time - 0.25).abs() < 1e-5);
        assert!(mixer.action(walk).enabled);
    }

    #[test]
    fn once_with_clamp_pauses_on_last_frame() {
        let mut model = one_node_model();
        let mut mixer = AnimationMixer::new(&model);
        let die = mixer.clip_action(&slide_clip("Die", 0.0, 1.0));
        {
            let action = mixer.action_mut(die);
            action.loop_mode = LoopMode::Once;
            action.clamp_when_finished = true;
        }
        mixer.play(die);
        mixer.update(3.0, &mut model);
        let action = mixer.action(die);
        assert_eq!(action.time, 1.0);
        assert!(action.paused);
        assert!(action.enabled);
        assert_eq!(model.nodes[0].translation.y, 1.0);

        mixer.update(1.0, &mut model);
        assert_eq!(mixer.action(die).time, 1.0);
        assert_eq!(model.nodes[0].translation.y, 1.0);
    }

    #[test]
    fn once_without_clamp_disables_and_restores_rest_pose() {
        let mut model = one_node_model();
        let mut mixer = AnimationMixer::new(&model);
        let jump = mixer.clip_action(&slide_clip("Jump", 5.0, 1.0));
        mixer.action_mut(jump).loop_mode = LoopMode::Once;
        mixer.play(jump);
        mixer.update(2.0, &mut model);
        assert!(!mixer.action(jump).enabled);
        // disabled in this very update, so nothing was accumulated
        assert_eq!(model.nodes[0].translation, glm::vec3(0.0, 0.0, 0.0));
    }

    #[test]
    fn cross_fade_blends_then_disables_the_old_action() {
        let mut model = one_node_model();
        let mut mixer = AnimationMixer::new(&model);
        let idle = mixer.clip_action(&slide_clip("Idle", 0.0, 10.0));
        let walk = mixer.clip_action(&slide_clip("Walk", 4.0, 10.0));
        mixer.play(idle);
        mixer.update(0.1, &mut model);

        mixer.cross_fade(idle, walk, 0.5);
        mixer.play(walk);
        mixer.update(0.25, &mut model);

        assert!((mixer.action(idle).effective_weight() - 0.5).abs() < 1e-5);
        assert!((mixer.action(walk).effective_weight() - 0.5).abs() < 1e-5);
        assert!((model.nodes[0].translation.x - 2.0).abs() < 1e-4);

        mixer.update(0.3, &mut model);
        assert!(!mixer.action(idle).enabled);
        assert!(!mixer.action(walk).is_fading());
        assert_eq!(mixer.action(walk).effective_weight(), 1.0);
        assert!((model.nodes[0].translation.x - 4.0).abs() < 1e-5);
    }

    #[test]
    fn partial_weight_is_topped_up_with_rest_pose() {
        let mut model = one_node_model();
        model.nodes[0].translation = glm::vec3(10.0, 0.0, 0.0);
        let mut mixer = AnimationMixer::new(&model);
        let walk = mixer.clip_action(&slide_clip("Walk", 0.0, 10.0));
        mixer.action_mut(walk).weight = 0.25;
        mixer.play(walk);
        mixer.update(0.0, &mut model);
        assert!((model.nodes[0].translation.x - 7.5).abs() < 1e-5);
    }

    #[test]
    fn tracks_for_missing_nodes_are_ignored() {
        let mut model = one_node_model();
        let mut mixer = AnimationMixer::new(&model);
        let clip = Arc::new(AnimationClip::new(
            "Stray",
            vec![Track {
                node: 7,
                property: TrackProperty::Scale,
                interpolation: Interpolation::Step,
                times: vec![0.0],
                values: vec![[2.0, 2.0, 2.0, 0.0]],
            }],
        ));
        let stray = mixer.clip_action(&clip);
        mixer.play(stray);
        mixer.update(0.1, &mut model);
        assert_eq!(model.nodes[0].scale, glm::vec3(1.0, 1.0, 1.0));
    }
}
