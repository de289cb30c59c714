//! Declarative flag configuration.
//!
//! [`ContainerStyle`] and [`ChildStyle`] describe an item the way callers
//! think about it (direction, alignment, anchors) and convert into the
//! packed [`ControlFlags`] word the engine stores.

use crate::flags::{Alignment, BoxModel, ControlFlags};

/// How a container stacks its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Arrangement {
    /// Children overlay each other (the free model).
    #[default]
    Overlay,
    /// Arranges children from left to right.
    Row,
    /// Arranges children from top to bottom.
    Column,
}

/// Container-side configuration: stacking direction, wrap behavior,
/// alignment and the size-policy toggles.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerStyle {
    pub arrangement: Arrangement,
    /// Wrap children to additional lines when they run out of space. Also
    /// enables per-child force-breaks.
    pub wrap: bool,
    pub alignment: Alignment,
    /// Prevents children from growing past this container's bounds.
    pub constrain_size: bool,
    /// The container reports no wrapped content width of its own.
    pub no_expansion_x: bool,
    /// The container reports no wrapped content height of its own.
    pub no_expansion_y: bool,
    /// Never shrink below the width the children require.
    pub prevent_crush_x: bool,
    /// Never shrink below the height the children require.
    pub prevent_crush_y: bool,
}

impl ContainerStyle {
    pub fn row() -> Self {
        Self {
            arrangement: Arrangement::Row,
            ..Self::default()
        }
    }

    pub fn column() -> Self {
        Self {
            arrangement: Arrangement::Column,
            ..Self::default()
        }
    }

    pub fn wrap(mut self) -> Self {
        self.wrap = true;
        self
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// The box-model portion (row/column/wrap), for
    /// [`TrussContext::set_box_flags`](crate::TrussContext::set_box_flags).
    pub fn box_flags(&self) -> ControlFlags {
        let model = match (self.arrangement, self.wrap) {
            (Arrangement::Overlay, _) => BoxModel::Free,
            (Arrangement::Row, false) => BoxModel::Row,
            (Arrangement::Row, true) => BoxModel::RowWrap,
            (Arrangement::Column, false) => BoxModel::Column,
            (Arrangement::Column, true) => BoxModel::ColumnWrap,
        };
        model.to_flags()
    }

    /// The container portion (alignment and size policies), for
    /// [`TrussContext::set_container_flags`](crate::TrussContext::set_container_flags).
    pub fn container_flags(&self) -> ControlFlags {
        let none = ControlFlags::empty();
        self.alignment.to_flags()
            | if self.constrain_size { ControlFlags::CONSTRAIN_SIZE } else { none }
            | if self.no_expansion_x { ControlFlags::NO_EXPAND_X } else { none }
            | if self.no_expansion_y { ControlFlags::NO_EXPAND_Y } else { none }
            | if self.prevent_crush_x { ControlFlags::PREVENT_CRUSH_X } else { none }
            | if self.prevent_crush_y { ControlFlags::PREVENT_CRUSH_Y } else { none }
    }
}

/// Child-side configuration: edge anchors and flow behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChildStyle {
    pub anchor_left: bool,
    pub anchor_top: bool,
    pub anchor_right: bool,
    pub anchor_bottom: bool,
    /// Anchor left and right: consume the available width.
    pub fill_x: bool,
    /// Anchor top and bottom: consume the available height.
    pub fill_y: bool,
    /// Start a new line at this item inside a wrapping container.
    pub force_break: bool,
    /// Lay this item out as if its parent had no other children.
    pub floating: bool,
    /// This item does not contribute to its siblings' layout.
    pub stacked: bool,
}

impl ChildStyle {
    /// Anchored to the top-left corner, the common case for flow content.
    pub fn top_left() -> Self {
        Self {
            anchor_left: true,
            anchor_top: true,
            ..Self::default()
        }
    }

    /// Fills the parent on both axes.
    pub fn fill() -> Self {
        Self {
            fill_x: true,
            fill_y: true,
            ..Self::default()
        }
    }

    /// For [`TrussContext::set_layout_flags`](crate::TrussContext::set_layout_flags).
    pub fn layout_flags(&self) -> ControlFlags {
        let none = ControlFlags::empty();
        (if self.anchor_left { ControlFlags::ANCHOR_LEFT } else { none })
            | if self.anchor_top { ControlFlags::ANCHOR_TOP } else { none }
            | if self.anchor_right { ControlFlags::ANCHOR_RIGHT } else { none }
            | if self.anchor_bottom { ControlFlags::ANCHOR_BOTTOM } else { none }
            | if self.fill_x { ControlFlags::FILL_X } else { none }
            | if self.fill_y { ControlFlags::FILL_Y } else { none }
            | if self.force_break { ControlFlags::FORCE_BREAK } else { none }
            | if self.floating { ControlFlags::FLOATING } else { none }
            | if self.stacked { ControlFlags::STACKED } else { none }
    }
}

impl From<ContainerStyle> for ControlFlags {
    /// The combined box-model and container word. Split it with the group
    /// masks when feeding the individual setters.
    fn from(style: ContainerStyle) -> Self {
        style.box_flags() | style.container_flags()
    }
}

impl From<ChildStyle> for ControlFlags {
    fn from(style: ChildStyle) -> Self {
        style.layout_flags()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn container_style_splits_into_groups() {
        let style = ContainerStyle::row().wrap().align(Alignment::Justify);
        assert_eq!(style.box_flags(), ControlFlags::ROW | ControlFlags::WRAP);
        assert_eq!(style.container_flags(), ControlFlags::ALIGN_JUSTIFY);
        assert!(ControlFlags::BOX_MODEL.contains(style.box_flags()));
        assert!(ControlFlags::CONTAINER.contains(style.container_flags()));
    }

    #[test]
    fn overlay_ignores_wrap() {
        let style = ContainerStyle::default().wrap();
        assert_eq!(style.box_flags(), ControlFlags::empty());
    }

    #[test]
    fn crush_and_expansion_toggles() {
        let style = ContainerStyle {
            arrangement: Arrangement::Column,
            prevent_crush_x: true,
            no_expansion_y: true,
            constrain_size: true,
            ..ContainerStyle::default()
        };
        let flags = style.container_flags();
        assert!(flags.contains(ControlFlags::PREVENT_CRUSH_X));
        assert!(flags.contains(ControlFlags::NO_EXPAND_Y));
        assert!(flags.contains(ControlFlags::CONSTRAIN_SIZE));
        assert!(!flags.contains(ControlFlags::PREVENT_CRUSH_Y));
    }

    #[test]
    fn child_style_builds_layout_flags() {
        let flags = ChildStyle::top_left().layout_flags();
        assert_eq!(flags, ControlFlags::ANCHOR_LEFT | ControlFlags::ANCHOR_TOP);

        let fill = ChildStyle::fill().layout_flags();
        assert_eq!(fill, ControlFlags::FILL);
        assert!(ControlFlags::LAYOUT.contains(fill));

        let float = ChildStyle {
            floating: true,
            force_break: true,
            ..ChildStyle::default()
        }
        .layout_flags();
        assert!(float.contains(ControlFlags::FLOATING));
        assert!(float.contains(ControlFlags::FORCE_BREAK));
    }
}
