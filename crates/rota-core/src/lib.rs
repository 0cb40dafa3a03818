//! Multi-ring spinning wheels: ring layout, spin animation, sector
//! resolution, editing and persistence, independent of any toolkit.
//!
//! | Module | Role |
//! |--------|------|
//! | [`wheel`] | The wheel aggregate and its editing operations |
//! | [`layer`] | Rings, sectors and their stored form |
//! | [`geometry`] | Canvas size and ring radii |
//! | [`sector`] | Rotation to sector mapping and snapping |
//! | [`spin`] | Spin state machine and frame step |
//! | [`render`] | Drawing over a canvas-like surface, cairo adapter |
//! | [`store`] | Key-value persistence |
//! | [`config`] | TOML/env configuration |
//! | [`ipc`] | Commands sent to the running app |

pub mod macros;

pub mod color;
pub mod config;
pub mod geometry;
pub mod ipc;
pub mod layer;
pub mod render;
pub mod sector;
pub mod spin;
pub mod store;
pub mod text;
pub mod wheel;

pub use geometry::{CanvasSize, Point};
pub use layer::{Layer, LayerId, Sector};
pub use wheel::{EditError, LayerResult, TickOutcome, Wheel, WheelSettings};
