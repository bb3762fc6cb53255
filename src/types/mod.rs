// ottmarks shared type definitions
// Each submodule defines types used across the crate.

pub mod bookmark;
pub mod errors;
pub mod session;
pub mod settings;
pub mod view;
pub mod voice;
