/*
 * Quesuene Library
 * Version: 1.0
 * Copyright (c) 2025 Peter Leukanič
 * Under MIT License
 * Feel free to share and modify
 */

pub mod audio;
pub mod config;
pub mod control;
pub mod idle;
pub mod style;
pub mod ui;

// Re-export main functionality
pub use audio::{AudioControl, AudioError, Pactl, SinkInput, parse_sink_inputs};
pub use config::OverlayConfig;
pub use control::VolumeBinding;
pub use idle::{IdleSession, IdleState, IdleTimer, Scheduler};
pub use ui::{FatalSlot, GlibScheduler, Overlay, StreamControl, centered_origin};
