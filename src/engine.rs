//! The layout arena and its update driver.
//!
//! Items and their computed rectangles live in two parallel arrays indexed
//! by [`ItemKey`]. Topology is a doubly-linked sibling list per parent.
//! Per-axis passes touch rectangles far more often than item metadata, so
//! the two arrays are deliberately kept separate.

use tracing::{debug, trace};

use crate::errors::LayoutError;
use crate::flags::ControlFlags;
use crate::math::{Axis, Margins, Rect, Vector2};

// ============================================================================
// Keys and items
// ============================================================================

/// A stable handle to one layout item. Keys are never reused while the
/// arena is alive; [`ItemKey::INVALID`] means "no item".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey(i32);

impl ItemKey {
    pub const INVALID: ItemKey = ItemKey(-1);

    #[inline]
    pub fn is_invalid(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        debug_assert!(self.0 >= 0);
        self.0 as usize
    }
}

impl Default for ItemKey {
    fn default() -> Self {
        ItemKey::INVALID
    }
}

/// Per-item layout state: flags, tree links, spacing and size constraints.
#[derive(Debug, Clone, Copy)]
pub struct LayoutItem {
    key: ItemKey,
    pub flags: ControlFlags,
    pub parent: ItemKey,
    pub first_child: ItemKey,
    pub last_child: ItemKey,
    pub prev_sibling: ItemKey,
    pub next_sibling: ItemKey,
    pub margins: Margins,
    pub padding: Margins,
    /// `> 0` on an axis makes that axis authoritative; the size pass never
    /// overwrites it.
    pub fixed_size: Vector2,
    pub minimum_size: Vector2,
    pub maximum_size: Vector2,
    /// Minimum extent required by the children, written by the size pass.
    pub computed_content_size: Vector2,
    /// Explicit offset for floating and stacked items.
    pub floating_position: Vector2,
}

impl LayoutItem {
    /// Sentinel for "no constraint" on an axis.
    pub const NO_VALUE: f32 = -1.0;
    /// Sentinel size with both axes unconstrained.
    pub const NO_SIZE: Vector2 = Vector2 {
        x: Self::NO_VALUE,
        y: Self::NO_VALUE,
    };

    fn new(key: ItemKey) -> Self {
        Self {
            key,
            flags: ControlFlags::empty(),
            parent: ItemKey::INVALID,
            first_child: ItemKey::INVALID,
            last_child: ItemKey::INVALID,
            prev_sibling: ItemKey::INVALID,
            next_sibling: ItemKey::INVALID,
            margins: Margins::default(),
            padding: Margins::default(),
            fixed_size: Self::NO_SIZE,
            minimum_size: Self::NO_SIZE,
            maximum_size: Self::NO_SIZE,
            computed_content_size: Vector2::default(),
            floating_position: Vector2::default(),
        }
    }

    pub fn key(&self) -> ItemKey {
        self.key
    }
}

/// Forward iterator over a parent's children.
pub struct Children<'a> {
    items: &'a [LayoutItem],
    next: ItemKey,
}

impl Iterator for Children<'_> {
    type Item = ItemKey;

    fn next(&mut self) -> Option<ItemKey> {
        if self.next.is_invalid() {
            return None;
        }
        let key = self.next;
        self.next = self.items[key.index()].next_sibling;
        Some(key)
    }
}

// ============================================================================
// TrussContext - the layout arena
// ============================================================================

pub const DEFAULT_CAPACITY: usize = 1024;

/// The layout arena: item metadata and computed rectangles in two parallel
/// arrays, plus the implicit root item sized to the canvas.
///
/// Single-threaded and non-reentrant by construction: every mutation and
/// [`update`](TrussContext::update) takes `&mut self`.
pub struct TrussContext {
    pub(crate) items: Vec<LayoutItem>,
    pub(crate) rects: Vec<Rect>,
    root: ItemKey,
    canvas_size: Vector2,
    version: u64,
}

impl TrussContext {
    pub fn new(canvas_size: Vector2) -> Self {
        let mut ctx = Self {
            items: Vec::with_capacity(DEFAULT_CAPACITY),
            rects: Vec::with_capacity(DEFAULT_CAPACITY),
            root: ItemKey::INVALID,
            canvas_size,
            version: 0,
        };
        ctx.initialize();
        ctx
    }

    fn initialize(&mut self) {
        self.version += 1;
        let root = self.create_item();
        self.root = root;
        self.set_fixed_size(root, self.canvas_size)
            .expect("fresh root key is valid");
    }

    /// Invalidates every key and recreates the root. The only way to remove
    /// items from the arena.
    pub fn clear(&mut self) {
        debug!(items = self.items.len(), "clearing layout arena");
        self.version += 1;
        self.items.clear();
        self.rects.clear();
        self.root = ItemKey::INVALID;
        self.initialize();
    }

    /// Pre-grows the backing arrays to hold at least `capacity` items.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        self.version += 1;
        let additional = capacity.saturating_sub(self.items.len());
        self.items.reserve(additional);
        self.rects.reserve(additional);
    }

    /// Number of live items, including the root.
    pub fn count(&self) -> usize {
        debug_assert_eq!(self.items.len(), self.rects.len());
        self.items.len()
    }

    /// Bumped on every structural mutation. A raw view captured outside the
    /// context is stale once this changes.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn root(&self) -> ItemKey {
        self.root
    }

    pub fn canvas_size(&self) -> Vector2 {
        self.canvas_size
    }

    /// Resizes the canvas and re-fixes the root to it. Typically called once
    /// per frame or on resize, before [`update`](TrussContext::update).
    pub fn set_canvas_size(&mut self, size: Vector2) {
        if size == self.canvas_size {
            return;
        }
        self.canvas_size = size;
        let root = self.root;
        if root.is_valid() {
            self.set_fixed_size(root, size)
                .expect("root key is valid while the arena lives");
        }
    }

    /// Allocates a zero-initialized item plus a zero rectangle.
    pub fn create_item(&mut self) -> ItemKey {
        self.version += 1;
        let key = ItemKey(self.items.len() as i32);
        self.items.push(LayoutItem::new(key));
        self.rects.push(Rect::default());
        key
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn item(&self, key: ItemKey) -> Result<&LayoutItem, LayoutError> {
        if key.is_invalid() || key.index() >= self.items.len() {
            return Err(LayoutError::InvalidKey(key));
        }
        let item = &self.items[key.index()];
        if item.key != key {
            return Err(LayoutError::InvalidState("item key does not match its slot"));
        }
        Ok(item)
    }

    fn item_mut(&mut self, key: ItemKey) -> Result<&mut LayoutItem, LayoutError> {
        if key.is_invalid() || key.index() >= self.items.len() {
            return Err(LayoutError::InvalidKey(key));
        }
        let item = &mut self.items[key.index()];
        if item.key != key {
            return Err(LayoutError::InvalidState("item key does not match its slot"));
        }
        Ok(item)
    }

    /// Internal access for the passes: keys reached through tree links are
    /// valid by invariant, anything else is corruption and aborts.
    #[inline]
    pub(crate) fn node(&self, key: ItemKey) -> &LayoutItem {
        let item = &self.items[key.index()];
        debug_assert_eq!(item.key, key, "item key does not match its slot");
        item
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, key: ItemKey) -> &mut LayoutItem {
        let item = &mut self.items[key.index()];
        debug_assert_eq!(item.key, key, "item key does not match its slot");
        item
    }

    /// The computed rectangle for an item.
    pub fn rect(&self, key: ItemKey) -> Result<Rect, LayoutError> {
        self.item(key)?;
        Ok(self.rects[key.index()])
    }

    /// The computed rectangle minus the item's padding. For the root this is
    /// the canvas rectangle, which the padding insets.
    pub fn content_rect(&self, key: ItemKey) -> Result<Rect, LayoutError> {
        self.item(key)?;
        Ok(self.content_rect_of(key))
    }

    pub(crate) fn content_rect_of(&self, key: ItemKey) -> Rect {
        let item = self.node(key);
        let exterior = if key == self.root {
            Rect::new(0.0, 0.0, self.canvas_size.x, self.canvas_size.y)
        } else {
            self.rects[key.index()]
        };
        let mut interior = exterior;
        interior.x = (exterior.x + item.padding.left).min(exterior.right());
        interior.y = (exterior.y + item.padding.top).min(exterior.bottom());
        interior.width = (exterior.width - item.padding.axis_sum(Axis::X)).max(0.0);
        interior.height = (exterior.height - item.padding.axis_sum(Axis::Y)).max(0.0);
        interior
    }

    /// Bounding box of the children's margin boxes. Arrangement clips
    /// children to their container, which would hide overflow from a
    /// scrolling caller, so fixed-size children are measured at their fixed
    /// size instead of their clipped one.
    pub fn measure_content(&self, parent: ItemKey) -> Result<Rect, LayoutError> {
        let item = self.item(parent)?;
        if item.first_child.is_invalid() {
            return Ok(Rect::default());
        }

        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for child in self.children(parent)? {
            let child_item = self.node(child);
            let mut child_rect = self.rects[child.index()];
            if child_item.flags.contains(ControlFlags::FIXED_WIDTH) {
                child_rect.width = child_item.fixed_size.x;
            }
            if child_item.flags.contains(ControlFlags::FIXED_HEIGHT) {
                child_rect.height = child_item.fixed_size.y;
            }

            min_x = min_x.min(child_rect.x - child_item.margins.left);
            max_x = max_x.max(child_rect.right() + child_item.margins.right);
            min_y = min_y.min(child_rect.y - child_item.margins.top);
            max_y = max_y.max(child_rect.bottom() + child_item.margins.bottom);
        }

        Ok(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    // ========================================================================
    // Tree queries
    // ========================================================================

    pub fn parent_of(&self, key: ItemKey) -> Result<ItemKey, LayoutError> {
        Ok(self.item(key)?.parent)
    }

    pub fn first_child(&self, key: ItemKey) -> Result<ItemKey, LayoutError> {
        Ok(self.item(key)?.first_child)
    }

    pub fn last_child(&self, key: ItemKey) -> Result<ItemKey, LayoutError> {
        Ok(self.item(key)?.last_child)
    }

    pub fn prev_sibling(&self, key: ItemKey) -> Result<ItemKey, LayoutError> {
        Ok(self.item(key)?.prev_sibling)
    }

    pub fn next_sibling(&self, key: ItemKey) -> Result<ItemKey, LayoutError> {
        Ok(self.item(key)?.next_sibling)
    }

    /// Iterates a parent's children front to back without allocating.
    pub fn children(&self, parent: ItemKey) -> Result<Children<'_>, LayoutError> {
        let first = self.item(parent)?.first_child;
        Ok(Children {
            items: &self.items,
            next: first,
        })
    }

    // ========================================================================
    // Topology
    // ========================================================================

    fn check_insertable(&self, reference: ItemKey, inserted: ItemKey) -> Result<(), LayoutError> {
        self.item(reference)?;
        let item = self.item(inserted)?;
        if inserted == self.root {
            return Err(LayoutError::RootNotAllowed);
        }
        if reference == inserted {
            return Err(LayoutError::EqualKeys(inserted));
        }
        if item.parent.is_valid() {
            return Err(LayoutError::AlreadyInserted(inserted));
        }
        Ok(())
    }

    /// Links `child` as the last child of `parent`.
    pub fn append(&mut self, parent: ItemKey, child: ItemKey) -> Result<(), LayoutError> {
        self.check_insertable(parent, child)?;
        self.version += 1;

        let last = self.node(parent).last_child;
        if last.is_invalid() {
            if self.node(parent).first_child.is_valid() {
                return Err(LayoutError::InvalidState(
                    "parent has a first child but no last child",
                ));
            }
            let parent_item = self.node_mut(parent);
            parent_item.first_child = child;
            parent_item.last_child = child;
            self.node_mut(child).parent = parent;
        } else {
            self.link_after(last, child);
        }
        Ok(())
    }

    /// Links `child` as the first child of `parent`.
    pub fn insert_at_start(&mut self, parent: ItemKey, child: ItemKey) -> Result<(), LayoutError> {
        self.check_insertable(parent, child)?;
        self.version += 1;

        let old_first = self.node(parent).first_child;
        {
            let child_item = self.node_mut(child);
            child_item.parent = parent;
            child_item.prev_sibling = ItemKey::INVALID;
            child_item.next_sibling = old_first;
        }
        let parent_item = self.node_mut(parent);
        parent_item.first_child = child;
        if parent_item.last_child.is_invalid() {
            parent_item.last_child = child;
        }
        if old_first.is_valid() {
            self.node_mut(old_first).prev_sibling = child;
        }
        Ok(())
    }

    /// Links `new_sibling` immediately before `later` in its parent's list.
    pub fn insert_before(
        &mut self,
        later: ItemKey,
        new_sibling: ItemKey,
    ) -> Result<(), LayoutError> {
        self.check_insertable(later, new_sibling)?;
        if later == self.root {
            return Err(LayoutError::RootNotAllowed);
        }
        self.version += 1;

        let (parent, prev) = {
            let later_item = self.node(later);
            (later_item.parent, later_item.prev_sibling)
        };
        {
            let item = self.node_mut(new_sibling);
            item.parent = parent;
            item.prev_sibling = prev;
            item.next_sibling = later;
        }
        if prev.is_valid() {
            self.node_mut(prev).next_sibling = new_sibling;
        } else if parent.is_valid() {
            self.node_mut(parent).first_child = new_sibling;
        }
        self.node_mut(later).prev_sibling = new_sibling;
        Ok(())
    }

    /// Links `new_sibling` immediately after `earlier` in its parent's list.
    pub fn insert_after(
        &mut self,
        earlier: ItemKey,
        new_sibling: ItemKey,
    ) -> Result<(), LayoutError> {
        self.check_insertable(earlier, new_sibling)?;
        if earlier == self.root {
            return Err(LayoutError::RootNotAllowed);
        }
        self.version += 1;
        self.link_after(earlier, new_sibling);
        Ok(())
    }

    fn link_after(&mut self, earlier: ItemKey, new_sibling: ItemKey) {
        let (parent, next) = {
            let earlier_item = self.node(earlier);
            (earlier_item.parent, earlier_item.next_sibling)
        };
        {
            let item = self.node_mut(new_sibling);
            item.parent = parent;
            item.prev_sibling = earlier;
            item.next_sibling = next;
        }
        self.node_mut(earlier).next_sibling = new_sibling;
        if next.is_valid() {
            self.node_mut(next).prev_sibling = new_sibling;
        } else if parent.is_valid() {
            debug_assert_eq!(self.node(parent).last_child, earlier);
            self.node_mut(parent).last_child = new_sibling;
        }
    }

    // ========================================================================
    // Flags and layout data
    // ========================================================================

    fn set_masked_flags(
        &mut self,
        key: ItemKey,
        flags: ControlFlags,
        mask: ControlFlags,
    ) -> Result<(), LayoutError> {
        if !mask.contains(flags) {
            return Err(LayoutError::MaskViolation { flags, mask });
        }
        let item = self.item_mut(key)?;
        item.flags = (item.flags - mask) | flags;
        Ok(())
    }

    /// Sets the row/column/wrap group. Row and column are mutually
    /// exclusive; neither means the free overlay model.
    pub fn set_box_flags(&mut self, key: ItemKey, flags: ControlFlags) -> Result<(), LayoutError> {
        if flags.contains(ControlFlags::ROW | ControlFlags::COLUMN) {
            return Err(LayoutError::IncompatibleFlags(flags));
        }
        self.set_masked_flags(key, flags, ControlFlags::BOX_MODEL)
    }

    /// Sets the alignment/constrain/no-expansion/prevent-crush group.
    pub fn set_container_flags(
        &mut self,
        key: ItemKey,
        flags: ControlFlags,
    ) -> Result<(), LayoutError> {
        self.set_masked_flags(key, flags, ControlFlags::CONTAINER)
    }

    /// Sets the anchor/force-break/floating/stacked group.
    pub fn set_layout_flags(
        &mut self,
        key: ItemKey,
        flags: ControlFlags,
    ) -> Result<(), LayoutError> {
        self.set_masked_flags(key, flags, ControlFlags::LAYOUT)
    }

    pub fn flags(&self, key: ItemKey) -> Result<ControlFlags, LayoutError> {
        Ok(self.item(key)?.flags)
    }

    pub fn box_flags(&self, key: ItemKey) -> Result<ControlFlags, LayoutError> {
        Ok(self.item(key)?.flags & ControlFlags::BOX_MODEL)
    }

    pub fn container_flags(&self, key: ItemKey) -> Result<ControlFlags, LayoutError> {
        Ok(self.item(key)?.flags & ControlFlags::CONTAINER)
    }

    pub fn layout_flags(&self, key: ItemKey) -> Result<ControlFlags, LayoutError> {
        Ok(self.item(key)?.flags & ControlFlags::LAYOUT)
    }

    /// Toggles the explicit new-line flag honored by wrapping containers.
    pub fn set_force_break(&mut self, key: ItemKey, state: bool) -> Result<(), LayoutError> {
        let item = self.item_mut(key)?;
        item.flags.set(ControlFlags::FORCE_BREAK, state);
        Ok(())
    }

    pub fn set_margins(&mut self, key: ItemKey, margins: Margins) -> Result<(), LayoutError> {
        self.item_mut(key)?.margins = margins;
        Ok(())
    }

    pub fn margins(&self, key: ItemKey) -> Result<Margins, LayoutError> {
        Ok(self.item(key)?.margins)
    }

    pub fn set_padding(&mut self, key: ItemKey, padding: Margins) -> Result<(), LayoutError> {
        self.item_mut(key)?.padding = padding;
        Ok(())
    }

    pub fn padding(&self, key: ItemKey) -> Result<Margins, LayoutError> {
        Ok(self.item(key)?.padding)
    }

    /// Fixes the item's size. A value `<= 0` on an axis releases that axis
    /// back to content-driven sizing.
    pub fn set_fixed_size(&mut self, key: ItemKey, size: Vector2) -> Result<(), LayoutError> {
        let item = self.item_mut(key)?;
        item.fixed_size = size;
        item.flags.set(ControlFlags::FIXED_WIDTH, size.x > 0.0);
        item.flags.set(ControlFlags::FIXED_HEIGHT, size.y > 0.0);
        Ok(())
    }

    pub fn fixed_size(&self, key: ItemKey) -> Result<Vector2, LayoutError> {
        Ok(self.item(key)?.fixed_size)
    }

    /// Sets minimum/maximum sizes. [`LayoutItem::NO_SIZE`] (or any negative
    /// axis value) leaves that bound unconstrained.
    pub fn set_size_constraints(
        &mut self,
        key: ItemKey,
        minimum: Vector2,
        maximum: Vector2,
    ) -> Result<(), LayoutError> {
        let item = self.item_mut(key)?;
        item.minimum_size = minimum;
        item.maximum_size = maximum;
        Ok(())
    }

    pub fn size_constraints(&self, key: ItemKey) -> Result<(Vector2, Vector2), LayoutError> {
        let item = self.item(key)?;
        Ok((item.minimum_size, item.maximum_size))
    }

    /// Explicit position for floating and stacked items, relative to the
    /// parent's content origin.
    pub fn set_floating_position(
        &mut self,
        key: ItemKey,
        position: Vector2,
    ) -> Result<(), LayoutError> {
        self.item_mut(key)?.floating_position = position;
        Ok(())
    }

    /// The per-axis minimum extent the item's children required during the
    /// last size pass.
    pub fn computed_content_size(&self, key: ItemKey) -> Result<Vector2, LayoutError> {
        Ok(self.item(key)?.computed_content_size)
    }

    // ========================================================================
    // Constraint helpers shared by the passes
    // ========================================================================

    /// A child's minimum contribution to its parent on one axis.
    pub(crate) fn calc_minimum_size(&self, key: ItemKey, axis: Axis) -> f32 {
        let item = self.node(key);
        let mut result = item
            .minimum_size
            .axis(axis)
            .max(item.fixed_size.axis(axis))
            .max(0.0);
        if item.flags.contains(ControlFlags::prevent_crush_flag(axis)) {
            result = result.max(item.computed_content_size.axis(axis));
        }
        result
    }

    /// The effective minimum size: fixed where set, else the explicit
    /// minimum, raised to the computed content size under prevent-crush.
    pub(crate) fn computed_minimum_size(&self, key: ItemKey) -> Vector2 {
        let item = self.node(key);
        let mut result = item.fixed_size;
        if result.x < 0.0 {
            result.x = item.minimum_size.x;
        }
        if result.y < 0.0 {
            result.y = item.minimum_size.y;
        }

        for axis in [Axis::X, Axis::Y] {
            if item.flags.contains(ControlFlags::prevent_crush_flag(axis)) {
                let content = item.computed_content_size.axis(axis);
                if content > 0.0 {
                    result.set_axis(axis, result.axis(axis).max(content));
                }
            }
        }
        result
    }

    /// The effective maximum size: fixed where set, else the explicit
    /// maximum, optionally tightened by a parent-imposed bound.
    pub(crate) fn computed_maximum_size(
        &self,
        key: ItemKey,
        parent_constraint: Option<Vector2>,
    ) -> Vector2 {
        let item = self.node(key);
        let mut result = item.fixed_size;
        if result.x < 0.0 {
            result.x = item.maximum_size.x;
        }
        if result.y < 0.0 {
            result.y = item.maximum_size.y;
        }

        if let Some(bound) = parent_constraint {
            for axis in [Axis::X, Axis::Y] {
                let value = result.axis(axis);
                let bounded = if value < 0.0 {
                    bound.axis(axis)
                } else {
                    bound.axis(axis).min(value)
                };
                result.set_axis(axis, bounded);
            }
        }
        result
    }

    /// Clamps `value` to the item's effective minimum/maximum on `axis`.
    pub(crate) fn constrain(&self, value: f32, key: ItemKey, axis: Axis) -> f32 {
        let minimum = self.computed_minimum_size(key).axis(axis);
        let maximum = self.computed_maximum_size(key, None).axis(axis);
        constrain_value(value, minimum, maximum)
    }

    // ========================================================================
    // Update driver
    // ========================================================================

    /// Runs the full two-axis layout: size then arrange on X, size then
    /// arrange on Y, from the root down. Rectangles are unspecified (but the
    /// arena is structurally intact) if an error escapes.
    pub fn update(&mut self) -> Result<(), LayoutError> {
        if self.items.len() != self.rects.len() {
            return Err(LayoutError::InvalidState("item and rect counts diverged"));
        }
        let root = self.root;
        if root.is_invalid() || self.item(root)?.key != root {
            return Err(LayoutError::InvalidState("the arena has no valid root"));
        }

        trace!(items = self.items.len(), "layout update");
        for axis in [Axis::X, Axis::Y] {
            trace!(?axis, "size pass");
            self.calc_size(root, axis);
            trace!(?axis, "arrange pass");
            self.arrange(root, axis);
        }
        Ok(())
    }
}

impl Default for TrussContext {
    fn default() -> Self {
        Self::new(Vector2::default())
    }
}

/// Clamps `value` into `[minimum, maximum]`, ignoring negative (unset)
/// bounds. The minimum wins when the bounds cross.
#[inline]
pub(crate) fn constrain_value(value: f32, minimum: f32, maximum: f32) -> f32 {
    let mut result = value;
    if maximum >= 0.0 {
        result = result.min(maximum);
    }
    if minimum >= 0.0 {
        result = result.max(minimum);
    }
    result
}
