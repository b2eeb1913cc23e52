//! Parametric curve evaluation and fixed-resolution sampling.

use glam::Vec2;

/// Evaluate the Bezier curve defined by `points` at `t` (de Casteljau).
pub fn bezier(points: &[Vec2], t: f32) -> Vec2 {
    match points.len() {
        0 => Vec2::ZERO,
        1 => points[0],
        _ => {
            let mut scratch = points.to_vec();
            for level in (1..scratch.len()).rev() {
                for i in 0..level {
                    scratch[i] = scratch[i].lerp(scratch[i + 1], t);
                }
            }
            scratch[0]
        }
    }
}

/// Evaluate a centripetal Catmull-Rom spline through every point of
/// `points` at global parameter `t` in 0..=1.
///
/// The curve passes through the first and last control points; the missing
/// outer neighbours are mirrored so the end segments keep their tangent.
pub fn catmull_rom(points: &[Vec2], t: f32) -> Vec2 {
    match points.len() {
        0 => return Vec2::ZERO,
        1 => return points[0],
        _ => {}
    }
    let n = points.len();
    let segments = n - 1;
    let s = t.clamp(0.0, 1.0) * segments as f32;
    let index = (s.floor() as usize).min(segments - 1);
    let u = s - index as f32;

    let p1 = points[index];
    let p2 = points[index + 1];
    let p0 = if index == 0 { 2.0 * p1 - p2 } else { points[index - 1] };
    let p3 = if index + 2 < n {
        points[index + 2]
    } else {
        2.0 * p2 - p1
    };
    centripetal_segment(p0, p1, p2, p3, u)
}

/// Barry-Goldman evaluation of the P1..P2 segment with alpha = 0.5.
fn centripetal_segment(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, u: f32) -> Vec2 {
    fn knot(a: Vec2, b: Vec2) -> f32 {
        a.distance(b).sqrt().max(1e-4)
    }
    let t0 = 0.0;
    let t1 = t0 + knot(p0, p1);
    let t2 = t1 + knot(p1, p2);
    let t3 = t2 + knot(p2, p3);
    let t = t1 + (t2 - t1) * u;

    let a1 = p0 * ((t1 - t) / (t1 - t0)) + p1 * ((t - t0) / (t1 - t0));
    let a2 = p1 * ((t2 - t) / (t2 - t1)) + p2 * ((t - t1) / (t2 - t1));
    let a3 = p2 * ((t3 - t) / (t3 - t2)) + p3 * ((t - t2) / (t3 - t2));
    let b1 = a1 * ((t2 - t) / (t2 - t0)) + a2 * ((t - t0) / (t2 - t0));
    let b2 = a2 * ((t3 - t) / (t3 - t1)) + a3 * ((t - t1) / (t3 - t1));
    b1 * ((t2 - t) / (t2 - t1)) + b2 * ((t - t1) / (t2 - t1))
}

/// Sample `curve` at `count` evenly spaced parameters from 0 to 1 inclusive.
pub fn sample(count: usize, curve: impl Fn(f32) -> Vec2) -> Vec<Vec2> {
    match count {
        0 => Vec::new(),
        1 => vec![curve(0.0)],
        _ => (0..count)
            .map(|i| curve(i as f32 / (count - 1) as f32))
            .collect(),
    }
}

/// `count` points on a half circle: `radius` rotated counter-clockwise
/// from 0 to 180 degrees around `center`.
pub fn semi_circle(center: Vec2, radius: Vec2, count: usize) -> Vec<Vec2> {
    sample(count, |t| {
        let rotation = Vec2::from_angle(t * std::f32::consts::PI);
        center + rotation.rotate(radius)
    })
}
