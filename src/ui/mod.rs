//! # User Interface Module
//!
//! Two layers sit on top of the rendered scene:
//!
//! - the menu, a page-selected mask image composited by the post-process
//!   pass ([`menu`])
//! - the ImGui debug stats window, drawn after post-processing
//!   ([`UiManager`], [`overlay`])
//!
//! When ImGui wants the mouse or keyboard, camera input is not updated.

pub mod manager;
pub mod menu;
pub mod overlay;

// Re-export main types
pub use manager::UiManager;
pub use menu::{MenuPage, MenuState};
pub use overlay::{FrameTimer, OverlayStats};
