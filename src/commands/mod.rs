// ABOUTME: Command implementations behind the CLI surface
// ABOUTME: Exports the sync and layers commands

pub mod layers;
pub mod sync;

pub use layers::layers;
pub use sync::sync;
