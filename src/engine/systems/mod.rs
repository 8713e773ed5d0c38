pub mod gesture;
pub mod picking;
pub mod pointer_tracking;

pub use gesture::{GestureController, GestureSettings};
pub use picking::{pick, Aabb, Hit};
pub use pointer_tracking::{pointer_rotation, JointTracker};
