//! Test module for flightdeck-core
//!
//! This module contains tests that exercise several components together:
//! - Keymap cache seeding, fallback and replacement
//! - Session lifecycle (gesture, type-ahead, overlay, commit)
//! - Timing properties of the gesture detector and type-ahead filter

mod fixtures;
