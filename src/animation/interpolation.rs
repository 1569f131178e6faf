// Interpolation utilities for keyframe values. Vectors are carried as
// `[f32; 4]` with the fourth lane unused; quaternions are `[x, y, z, w]`.

pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn lerp4(a: &[f32; 4], b: &[f32; 4], t: f32) -> [f32; 4] {
    [
        lerp_f32(a[0], b[0], t),
        lerp_f32(a[1], b[1], t),
        lerp_f32(a[2], b[2], t),
        lerp_f32(a[3], b[3], t),
    ]
}

pub fn quat_normalize(q: &[f32; 4]) -> [f32; 4] {
    let len = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    if len <= f32::EPSILON {
        return [0.0, 0.0, 0.0, 1.0];
    }
    [q[0] / len, q[1] / len, q[2] / len, q[3] / len]
}

/// Shortest-path spherical interpolation.
pub fn quat_slerp(a: &[f32; 4], b: &[f32; 4], t: f32) -> [f32; 4] {
    let mut cos = a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3];
    let mut b = *b;
    if cos < 0.0 {
        cos = -cos;
        b = [-b[0], -b[1], -b[2], -b[3]];
    }

    // Nearly parallel: fall back to normalized lerp
    if cos > 0.9995 {
        return quat_normalize(&lerp4(a, &b, t));
    }

    let theta = cos.acos();
    let sin = theta.sin();
    let wa = ((1.0 - t) * theta).sin() / sin;
    let wb = (t * theta).sin() / sin;
    [
        a[0] * wa + b[0] * wb,
        a[1] * wa + b[1] * wb,
        a[2] * wa + b[2] * wb,
        a[3] * wa + b[3] * wb,
    ]
}

/// Cubic Hermite spline between `p0` and `p1` with tangents already scaled
/// by the key interval.
pub fn hermite4(p0: &[f32; 4], m0: &[f32; 4], p1: &[f32; 4], m1: &[f32; 4], t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    let h1 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h2 = -2.0 * t3 + 3.0 * t2;
    let h3 = t3 - 2.0 * t2 + t;
    let h4 = t3 - t2;

    let mut out = [0.0; 4];
    for i in 0..4 {
        out[i] = h1 * p0[i] + h2 * p1[i] + h3 * m0[i] + h4 * m1[i];
    }
    out
}

pub fn scale4(v: &[f32; 4], s: f32) -> [f32; 4] {
    [v[0] * s, v[1] * s, v[2] * s, v[3] * s]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: &[f32; 4], b: &[f32; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn slerp_halfway_around_y() {
        let half = std::f32::consts::FRAC_PI_4;
        let a = [0.0, 0.0, 0.0, 1.0];
        // 90 degrees about +Y
        let b = [0.0, (half).sin(), 0.0, (half).cos()];
        let mid = quat_slerp(&a, &b, 0.5);
        let quarter = std::f32::consts::FRAC_PI_8;
        assert!(approx(&mid, &[0.0, quarter.sin(), 0.0, quarter.cos()]));
    }

    #[test]
    fn slerp_takes_the_short_way() {
        let a = [0.0, 0.0, 0.0, 1.0];
        let b = [0.0, 0.0, 0.0, -1.0];
        let mid = quat_slerp(&a, &b, 0.5);
        assert!(approx(&mid, &[0.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn hermite_hits_endpoints() {
        let p0 = [1.0, 2.0, 3.0, 0.0];
        let p1 = [4.0, 5.0, 6.0, 0.0];
        let m = [10.0, -10.0, 3.0, 0.0];
        assert!(approx(&hermite4(&p0, &m, &p1, &m, 0.0), &p0));
        assert!(approx(&hermite4(&p0, &m, &p1, &m, 1.0), &p1));
    }
}
