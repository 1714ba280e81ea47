// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! NeuroSync: privacy-first wellness tracking
//!
//! Journaling with sentiment and emotion detection, simulated wearable data,
//! heuristic wellness and stress scoring, AI coaching with offline fallbacks,
//! and a meditation zen garden, served through a web dashboard.

pub mod analysis;
pub mod coaching;
pub mod config;
pub mod error;
pub mod garden;
pub mod journal;
pub mod llm;
pub mod privacy;
pub mod sentiment;
pub mod store;
pub mod timeline;
pub mod wearable;
pub mod web;

pub use config::AppConfig;
pub use error::{NeuroSyncError, Result};
