//! multiplot-rs: stacked multi-plot charts driven by role-tagged columns.
//!
//! A host hands over a column-oriented data view whose columns carry roles
//! (x-axis, y-axis, legend, tooltip, overlays). The [`api`] pipeline turns it
//! into a view model of vertically stacked plots sharing one x-axis, the
//! [`render`] layer draws that model into a backend-neutral scene, and the
//! [`interaction`] layer computes zoom, legend and tooltip state for the
//! drawn scene.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{DataView, Visual, VisualConfig, visual_transform};
pub use error::{ChartError, ChartResult};
