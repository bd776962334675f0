//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the renderer:
//! - Math types and projection helpers
//! - Generational handle tables
//! - Logging setup

pub mod collections;
pub mod logging;
pub mod math;
