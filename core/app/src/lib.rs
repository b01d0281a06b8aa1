//! Application layer for Tascboard.
//!
//! This module provides:
//! - Form state for the board, track and tasc detail editors
//! - Detail editors wiring a form to an auto-sync controller
//! - The sign-in flow context object
//! - Application configuration loading
//!
//! # Architecture
//! Editors receive their collaborators (store, activity log, capability
//! check) through a [`Workspace`] context rather than reaching for
//! globals.

pub mod auth_flow;
pub mod config;
pub mod editor;
pub mod form;

pub use auth_flow::{SignInFlow, SignInStage};
pub use config::AppConfig;
pub use editor::{BoardEditor, DetailEditor, EditGate, TascEditor, TrackEditor, Workspace};
pub use form::FormState;
