use crate::math::{Real, Vec2};

/// Normalized implicit line `a·x + b·y + c = 0` with its norm cached, for
/// the matcher's perpendicular-distance test.
#[derive(Debug, Clone, Copy)]
pub struct ImplicitLine2 {
    pub a: Real,
    pub b: Real,
    pub c: Real,
    pub norm: Real,
}

impl ImplicitLine2 {
    pub fn from_points(p: Vec2, q: Vec2) -> Self {
        let a = q.y - p.y;
        let b = p.x - q.x;
        let c = -(a * p.x + b * p.y);
        let norm = (a * a + b * b).sqrt().max(Real::EPSILON);
        Self { a, b, c, norm }
    }

    pub fn distance_to(&self, p: Vec2) -> Real {
        (self.a * p.x + self.b * p.y + self.c).abs() / self.norm
    }
}
