// Animation clips, the mixer that blends them onto a model, and the
// name-driven controller the UI talks to.

pub mod actions;
pub mod clip;
pub mod interpolation;
pub mod mixer;

pub use actions::{ActionController, CROSSFADE_SECONDS, TERMINAL_ACTION, Transition};
pub use clip::{AnimationClip, Interpolation, Track, TrackProperty};
pub use mixer::AnimationMixer;
