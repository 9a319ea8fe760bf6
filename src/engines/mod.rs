//! Voice cloning engines.
//!
//! This module contains implementations of voice cloning engines.
//!
//! # Available Engines
//!
//! Enable engines via Cargo features:
//! - `zonos` - Zonos-v0.1 (ONNX format)

#[cfg(feature = "zonos")]
pub mod zonos;
