// mascot: an interactive rigged-character viewer.
//
// The character's head and torso follow the pointer, and clicking the
// character plays a randomly chosen gesture clip that cross-fades back
// into the looping idle animation.

pub mod config;
pub mod engine;
pub mod game;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
