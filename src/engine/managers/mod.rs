pub mod assets_manager;

pub use assets_manager::{get_character_copy, get_skinned_shader, initialize, CharacterAsset};
