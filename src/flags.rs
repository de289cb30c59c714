//! Per-item flag storage and the typed views the layout passes dispatch on.
//!
//! Flags are stored as a single packed word per item, split into four
//! disjoint mask groups (box model, container, layout, internal). Setters
//! enforce the group masks; the passes never bit-test raw flags directly but
//! go through [`BoxModel`], [`Alignment`] and [`AxisAnchor`].

use bitflags::bitflags;

use crate::math::Axis;

bitflags! {
    /// The packed per-item flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ControlFlags: u32 {
        // Box model: how an item arranges its children.
        /// Arrange child items left-to-right.
        const ROW = 1 << 0;
        /// Arrange child items top-to-bottom.
        const COLUMN = 1 << 1;
        /// Wrap child items to additional lines when out of space. Also
        /// enables `FORCE_BREAK` on child items.
        const WRAP = 1 << 2;

        // Container: how a container treats its children as a group.
        /// Place child items against the start of the line.
        const ALIGN_START = 1 << 3;
        /// Place child items against the end of the line.
        const ALIGN_END = 1 << 4;
        /// Spread child items across the line by inserting empty space.
        const ALIGN_JUSTIFY = Self::ALIGN_START.bits() | Self::ALIGN_END.bits();
        /// Prevents child items from growing past the container's bounds.
        const CONSTRAIN_SIZE = 1 << 5;
        /// The container reports zero wrapped content width of its own.
        const NO_EXPAND_X = 1 << 6;
        /// The container reports zero wrapped content height of its own.
        const NO_EXPAND_Y = 1 << 7;
        /// The container never shrinks below its children's required width.
        const PREVENT_CRUSH_X = 1 << 8;
        /// The container never shrinks below its children's required height.
        const PREVENT_CRUSH_Y = 1 << 9;

        // Layout: how an item is placed inside its parent.
        /// Anchor to the left edge.
        const ANCHOR_LEFT = 1 << 10;
        /// Anchor to the top edge.
        const ANCHOR_TOP = 1 << 11;
        /// Anchor to the right edge.
        const ANCHOR_RIGHT = 1 << 12;
        /// Anchor to the bottom edge.
        const ANCHOR_BOTTOM = 1 << 13;
        /// Anchor to both left and right: consume the available width.
        const FILL_X = Self::ANCHOR_LEFT.bits() | Self::ANCHOR_RIGHT.bits();
        /// Anchor to both top and bottom: consume the available height.
        const FILL_Y = Self::ANCHOR_TOP.bits() | Self::ANCHOR_BOTTOM.bits();
        /// Anchor in all four directions.
        const FILL = Self::FILL_X.bits() | Self::FILL_Y.bits();
        /// Start a new line at this item. Only honored inside a wrapping
        /// container.
        const FORCE_BREAK = 1 << 14;
        /// The item is excluded from sibling flow and placed at its floating
        /// position; it does not contribute to its parent's size.
        const FLOATING = 1 << 15;
        /// The item does not contribute to its siblings' layout but is still
        /// sized against its parent.
        const STACKED = 1 << 16;

        // Internal: computed by the engine, never set by callers.
        const FIXED_WIDTH = 1 << 17;
        const FIXED_HEIGHT = 1 << 18;
        const BREAK = 1 << 19;
    }
}

impl ControlFlags {
    /// Mask group for [`TrussContext::set_box_flags`](crate::TrussContext::set_box_flags).
    pub const BOX_MODEL: ControlFlags = ControlFlags::ROW
        .union(ControlFlags::COLUMN)
        .union(ControlFlags::WRAP);

    /// Mask group for [`TrussContext::set_container_flags`](crate::TrussContext::set_container_flags).
    pub const CONTAINER: ControlFlags = ControlFlags::ALIGN_JUSTIFY
        .union(ControlFlags::CONSTRAIN_SIZE)
        .union(ControlFlags::NO_EXPAND_X)
        .union(ControlFlags::NO_EXPAND_Y)
        .union(ControlFlags::PREVENT_CRUSH_X)
        .union(ControlFlags::PREVENT_CRUSH_Y);

    /// Mask group for [`TrussContext::set_layout_flags`](crate::TrussContext::set_layout_flags).
    pub const LAYOUT: ControlFlags = ControlFlags::FILL
        .union(ControlFlags::FORCE_BREAK)
        .union(ControlFlags::FLOATING)
        .union(ControlFlags::STACKED);

    /// Engine-maintained flags, rejected by every setter.
    pub const INTERNAL: ControlFlags = ControlFlags::FIXED_WIDTH
        .union(ControlFlags::FIXED_HEIGHT)
        .union(ControlFlags::BREAK);

    /// True when the item starts a new line, whether from an explicit
    /// force-break or a computed break marker.
    #[inline]
    pub fn is_break(self) -> bool {
        self.intersects(ControlFlags::FORCE_BREAK | ControlFlags::BREAK)
    }

    /// True when the item is excluded from normal sibling flow.
    #[inline]
    pub fn is_out_of_flow(self) -> bool {
        self.intersects(ControlFlags::FLOATING | ControlFlags::STACKED)
    }

    /// The internal fixed-size marker for the given axis.
    #[inline]
    pub fn fixed_flag(axis: Axis) -> ControlFlags {
        match axis {
            Axis::X => ControlFlags::FIXED_WIDTH,
            Axis::Y => ControlFlags::FIXED_HEIGHT,
        }
    }

    /// The prevent-crush container flag for the given axis.
    #[inline]
    pub fn prevent_crush_flag(axis: Axis) -> ControlFlags {
        match axis {
            Axis::X => ControlFlags::PREVENT_CRUSH_X,
            Axis::Y => ControlFlags::PREVENT_CRUSH_Y,
        }
    }

    /// The no-expansion container flag for the given axis.
    #[inline]
    pub fn no_expand_flag(axis: Axis) -> ControlFlags {
        match axis {
            Axis::X => ControlFlags::NO_EXPAND_X,
            Axis::Y => ControlFlags::NO_EXPAND_Y,
        }
    }
}

/// How an item arranges its children, decoded from the box-model flag group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BoxModel {
    /// Children overlay each other, positioned by their own anchors.
    #[default]
    Free,
    /// Children stack left-to-right on a single line.
    Row,
    /// Children stack top-to-bottom in a single column.
    Column,
    /// Children stack left-to-right, breaking into new lines.
    RowWrap,
    /// Children stack top-to-bottom, breaking into new columns.
    ColumnWrap,
}

impl BoxModel {
    pub fn from_flags(flags: ControlFlags) -> BoxModel {
        let wrap = flags.contains(ControlFlags::WRAP);
        if flags.contains(ControlFlags::ROW) {
            if wrap { BoxModel::RowWrap } else { BoxModel::Row }
        } else if flags.contains(ControlFlags::COLUMN) {
            if wrap { BoxModel::ColumnWrap } else { BoxModel::Column }
        } else {
            BoxModel::Free
        }
    }

    pub fn to_flags(self) -> ControlFlags {
        match self {
            BoxModel::Free => ControlFlags::empty(),
            BoxModel::Row => ControlFlags::ROW,
            BoxModel::Column => ControlFlags::COLUMN,
            BoxModel::RowWrap => ControlFlags::ROW | ControlFlags::WRAP,
            BoxModel::ColumnWrap => ControlFlags::COLUMN | ControlFlags::WRAP,
        }
    }

    /// The axis children are concatenated along, if any.
    pub fn main_axis(self) -> Option<Axis> {
        match self {
            BoxModel::Row | BoxModel::RowWrap => Some(Axis::X),
            BoxModel::Column | BoxModel::ColumnWrap => Some(Axis::Y),
            BoxModel::Free => None,
        }
    }

    pub fn wraps(self) -> bool {
        matches!(self, BoxModel::RowWrap | BoxModel::ColumnWrap)
    }
}

/// Container alignment along the stacking axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Alignment {
    /// Center the line inside leftover space.
    #[default]
    Middle,
    /// Keep items flush to the near edge.
    Start,
    /// Push items to the far edge.
    End,
    /// Distribute leftover space into the gaps between items.
    Justify,
}

impl Alignment {
    pub fn from_flags(flags: ControlFlags) -> Alignment {
        let start = flags.contains(ControlFlags::ALIGN_START);
        let end = flags.contains(ControlFlags::ALIGN_END);
        match (start, end) {
            (true, true) => Alignment::Justify,
            (true, false) => Alignment::Start,
            (false, true) => Alignment::End,
            (false, false) => Alignment::Middle,
        }
    }

    pub fn to_flags(self) -> ControlFlags {
        match self {
            Alignment::Middle => ControlFlags::empty(),
            Alignment::Start => ControlFlags::ALIGN_START,
            Alignment::End => ControlFlags::ALIGN_END,
            Alignment::Justify => ControlFlags::ALIGN_JUSTIFY,
        }
    }
}

/// An item's anchoring on a single axis, decoded from its anchor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AxisAnchor {
    /// No anchors: centered in leftover space.
    Center,
    /// Leading anchor only: flush to the near edge.
    Start,
    /// Trailing anchor only: flush to the far edge.
    End,
    /// Both anchors: consume the available space.
    Fill,
}

impl AxisAnchor {
    pub fn from_flags(flags: ControlFlags, axis: Axis) -> AxisAnchor {
        let (leading, trailing) = match axis {
            Axis::X => (ControlFlags::ANCHOR_LEFT, ControlFlags::ANCHOR_RIGHT),
            Axis::Y => (ControlFlags::ANCHOR_TOP, ControlFlags::ANCHOR_BOTTOM),
        };
        match (flags.contains(leading), flags.contains(trailing)) {
            (false, false) => AxisAnchor::Center,
            (true, false) => AxisAnchor::Start,
            (false, true) => AxisAnchor::End,
            (true, true) => AxisAnchor::Fill,
        }
    }

    #[inline]
    pub fn is_fill(self) -> bool {
        matches!(self, AxisAnchor::Fill)
    }
}
