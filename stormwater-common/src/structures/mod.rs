// private sub-module defined in other files
mod point2d;
mod polyline;

// exports identifiers from private sub-modules in the current module namespace
pub use self::point2d::Point2D;
pub use self::polyline::Polyline;
