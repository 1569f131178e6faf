use super::interpolation::{hermite4, lerp4, quat_normalize, quat_slerp, scale4};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackProperty {
    Translation,
    Rotation,
    Scale,
}

impl TrackProperty {
    pub const ALL: [TrackProperty; 3] = [Self::Translation, Self::Rotation, Self::Scale];

    pub fn slot(self) -> usize {
        match self {
            Self::Translation => 0,
            Self::Rotation => 1,
            Self::Scale => 2,
        }
    }

    pub fn identity(self) -> [f32; 4] {
        match self {
            Self::Translation => [0.0, 0.0, 0.0, 0.0],
            Self::Rotation => [0.0, 0.0, 0.0, 1.0],
            Self::Scale => [1.0, 1.0, 1.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    CubicSpline,
}

/// Keyframes for one property of one node.
///
/// For `CubicSpline` tracks `values` holds three entries per key:
/// in-tangent, value, out-tangent.
#[derive(Debug, Clone)]
pub struct Track {
    pub node: usize,
    pub property: TrackProperty,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub values: Vec<[f32; 4]>,
}

impl Track {
    fn key_value(&self, key: usize) -> [f32; 4] {
        let index = match self.interpolation {
            Interpolation::CubicSpline => key * 3 + 1,
            _ => key,
        };
        self.values
            .get(index)
            .copied()
            .unwrap_or_else(|| self.property.identity())
    }

    fn tangent(&self, key: usize, out: bool) -> [f32; 4] {
        let index = key * 3 + if out { 2 } else { 0 };
        self.values.get(index).copied().unwrap_or([0.0; 4])
    }

    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Value at `time`, held at the first/last key outside the keyed range.
    pub fn sample(&self, time: f32) -> [f32; 4] {
        let count = self.times.len();
        if count == 0 {
            return self.property.identity();
        }

        if time <= self.times[0] {
            return self.key_value(0);
        }
        if time >= self.times[count - 1] {
            return self.key_value(count - 1);
        }

        // first key strictly after `time`; in 1..count thanks to the checks above
        let next = self.times.partition_point(|&k| k <= time);
        let prev = next - 1;
        let span = self.times[next] - self.times[prev];
        let t = if span > 0.0 {
            (time - self.times[prev]) / span
        } else {
            0.0
        };

        match self.interpolation {
            Interpolation::Step => self.key_value(prev),
            Interpolation::Linear => {
                let a = self.key_value(prev);
                let b = self.key_value(next);
                if self.property == TrackProperty::Rotation {
                    quat_slerp(&a, &b, t)
                } else {
                    lerp4(&a, &b, t)
                }
            }
            Interpolation::CubicSpline => {
                let p0 = self.key_value(prev);
                let p1 = self.key_value(next);
                let m0 = scale4(&self.tangent(prev, true), span);
                let m1 = scale4(&self.tangent(next, false), span);
                let value = hermite4(&p0, &m0, &p1, &m1, t);
                if self.property == TrackProperty::Rotation {
                    quat_normalize(&value)
                } else {
                    value
                }
            }
        }
    }
}

/// Named, immutable set of tracks.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, tracks: Vec<Track>) -> Self {
        let duration = tracks.iter().map(Track::end_time).fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            tracks,
        }
    }
}
