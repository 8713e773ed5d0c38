pub mod animation;
pub mod camera;
pub mod material;
pub mod mesh;
pub mod mixer;
pub mod skeleton;
pub mod transform;

pub use animation::{AnimationChannel, AnimationClip, AnimationType};
pub use camera::Camera;
pub use material::Material;
pub use mesh::Mesh;
pub use mixer::{Action, AnimationMixer, LoopMode};
pub use skeleton::{Node, Skeleton};
pub use transform::Transform;
