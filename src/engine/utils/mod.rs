pub mod gltf_loader;
pub mod math;
