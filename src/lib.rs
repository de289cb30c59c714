//! # truss
//!
//! A retained-mode box layout engine for real-time UIs.
//!
//! Truss solves layout as pure geometry: callers build a tree of abstract
//! items carrying flex-like flags, margins and size constraints, and
//! [`TrussContext::update`] computes a concrete rectangle for every item in
//! two independent single-axis passes (size bottom-up, arrange top-down; X
//! before Y). Widgets, rendering, input and accessibility live in the layer
//! above — the engine only ever sees flags and produces rectangles.
//!
//! ## Architecture
//!
//! Items live in an arena of two parallel arrays (metadata and computed
//! rectangles) addressed by stable integer [`ItemKey`]s, with a
//! doubly-linked sibling list for topology. The arena is created with an
//! implicit root sized to the canvas; trees are rebuilt by the caller and
//! torn down wholesale with [`TrussContext::clear`].
//!
//! ```rust
//! use truss::prelude::*;
//!
//! let mut ctx = TrussContext::new(Vector2::new(800.0, 600.0));
//! let toolbar = ctx.create_item();
//! ctx.set_box_flags(toolbar, ControlFlags::ROW)?;
//! ctx.set_layout_flags(toolbar, ControlFlags::ANCHOR_LEFT | ControlFlags::ANCHOR_TOP)?;
//! ctx.set_fixed_size(toolbar, Vector2::new(800.0, 32.0))?;
//! ctx.append(ctx.root(), toolbar)?;
//!
//! let button = ctx.create_item();
//! ctx.set_fixed_size(button, Vector2::new(96.0, 24.0))?;
//! ctx.append(toolbar, button)?;
//!
//! ctx.update()?;
//! let rect = ctx.rect(button)?;
//! assert_eq!(rect.width, 96.0);
//! # Ok::<(), truss::LayoutError>(())
//! ```
//!
//! ## Modules
//!
//! - [`math`] - Axes, vectors, rectangles and margins
//! - [`flags`] - The packed flag word and its typed views
//! - [`layout`] - Declarative container/child style configuration
//! - [`engine`] - The arena, topology operations and the update driver
//! - [`errors`] - The failure taxonomy

pub mod errors;
pub mod flags;
pub mod layout;
pub mod math;
pub mod prelude;

pub mod engine;

mod arrange;
mod sizing;

pub use engine::{Children, ItemKey, LayoutItem, TrussContext, DEFAULT_CAPACITY};
pub use errors::LayoutError;
pub use flags::{Alignment, AxisAnchor, BoxModel, ControlFlags};
pub use layout::{Arrangement, ChildStyle, ContainerStyle};
pub use math::{Axis, Margins, Rect, Vector2};
