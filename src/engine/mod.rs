pub mod components;
pub mod managers;
pub mod systems;
pub mod utils;
