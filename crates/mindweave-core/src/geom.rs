#![forbid(unsafe_code)]

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Angle = euclid::Angle<f64>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

/// Unit vector pointing along `angle`, scaled by `distance`.
pub fn polar(angle: Angle, distance: f64) -> Vector {
    let (sin, cos) = angle.sin_cos();
    vector(cos * distance, sin * distance)
}
