//! Divide-and-conquer closest pair of points, replayed as drawing events.
//!
//! Main components:
//! - [`geometry`] — distances, brute-force search and sorted views.
//! - [`engine`] — the recursive algorithm as a lazy [`engine::EventStream`].
//! - [`event`] — the events it emits and the per-call result.
//! - [`player`] — applies events to a [`player::Renderer`] with pacing.
//! - [`scene`] — an in-memory renderer.
//! - [`session`] — upload / clear / run orchestration.
//! - [`point_set`] — loading and generating points.
//! - [`config`] — playback and parsing settings.
//! - [`types`] — points, bounds, pairs and handles.

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod player;
pub mod point_set;
pub mod scene;
pub mod session;
pub mod types;

pub use error::{Error, Result};
