//! # room-viewer
//!
//! A drag-to-look viewer for a glTF room, rendered with WebGPU, plus the
//! hash router that switches the page between its Home and About panels.
//!
//! ## Features
//! - First-person look control from mouse or single-finger touch drags
//! - Per-frame look-at target derived from two clamped spherical angles
//! - glTF/GLB import with external, embedded and data-URI buffers
//! - Fragment router with a default-panel redirect
//! - Cross-platform: Native + WASM support
//!
//! ## Example
//! ```rust,ignore
//! use room_viewer::{PointerInput, Viewer, ViewerConfig};
//! use glam::Vec2;
//!
//! let mut viewer = Viewer::new(ViewerConfig::default());
//! viewer.apply(PointerInput::Down(Vec2::new(100.0, 100.0)));
//! viewer.apply(PointerInput::Move(Vec2::new(140.0, 90.0)));
//! viewer.apply(PointerInput::Up);
//!
//! let (_scene, camera) = viewer.prepare_frame();
//! println!("looking at {:?}", camera.target);
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod input;
pub mod math;
pub mod render;
pub mod router;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use input::{PointerInput, PointerTracker};
pub use math::Transform;
pub use router::{HostEnvironment, Panel, PanelHost, PanelTemplates, Resolution, Router};
pub use viewer::Viewer;
