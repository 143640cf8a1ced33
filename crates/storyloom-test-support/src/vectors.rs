//! Embedding vector fixtures.

/// A 2-D unit vector at the given angle. The cosine similarity of two
/// such vectors is the cosine of the angle between them, which makes
/// similarity thresholds easy to hit (or miss) precisely in tests:
/// `unit_vec(0.0)` vs `unit_vec(35.0)` ≈ 0.82, vs `unit_vec(50.0)` ≈ 0.64.
#[must_use]
pub fn unit_vec(angle_deg: f32) -> Vec<f32> {
    let rad = angle_deg.to_radians();
    vec![rad.cos(), rad.sin()]
}
