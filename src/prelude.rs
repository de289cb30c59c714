//! The truss prelude — a single import for everything you need.
//!
//! ```rust
//! use truss::prelude::*;
//! ```

// Core types
pub use crate::engine::{Children, ItemKey, LayoutItem, TrussContext};
pub use crate::errors::LayoutError;

// Geometry
pub use crate::math::{Axis, Margins, Rect, Vector2};

// Flags — alignment globbed, the packed word as a type
pub use crate::flags::Alignment::{self, *};
pub use crate::flags::ControlFlags;
pub use crate::flags::{AxisAnchor, BoxModel};

// Declarative configuration
pub use crate::layout::{Arrangement, ChildStyle, ContainerStyle};
