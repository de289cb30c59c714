//! Top-down arrangement.
//!
//! Runs after the size pass for the same axis: distributes and positions
//! children inside the now-sized parent, handling fill, justify, wrap and
//! squeeze. Parents are placed before their children, so a child's rect is
//! final once its parent's arrangement for the axis has executed.

use crate::engine::{constrain_value, ItemKey, TrussContext};
use crate::flags::{Alignment, AxisAnchor, BoxModel, ControlFlags};
use crate::math::{Axis, Rect, Vector2};

/// One break-delimited line of a stacked container, as discovered by
/// [`TrussContext::build_stacked_line`].
struct StackedLine {
    /// Space consumed by the accepted children, margins included.
    used: f32,
    filler_count: u32,
    squeezed_count: u32,
    total: u32,
    /// The line ended at an explicit force-break rather than overflow.
    hard_break: bool,
    /// First child of the next line; invalid when this line is the last.
    end_child: ItemKey,
}

impl TrussContext {
    /// Arranges the item's children on one axis, then recurses.
    pub(crate) fn arrange(&mut self, key: ItemKey, axis: Axis) {
        let model = BoxModel::from_flags(self.node(key).flags);
        let content_rect = self.content_rect_of(key);

        match (model, axis) {
            (BoxModel::ColumnWrap, Axis::Y) => {
                self.arrange_stacked(key, Axis::Y, true);
                let extent = self.arrange_wrapped_overlay_squeezed(key, Axis::X, true);
                // The columns' accumulated extent corrects the container's
                // own width, which was computed before the fresh break
                // markers existed.
                if !self.node(key).flags.contains(ControlFlags::FIXED_WIDTH) {
                    let padding = self.node(key).padding.axis_sum(Axis::X);
                    let width = self
                        .constrain(extent - content_rect.x + padding, key, Axis::X)
                        .max(0.0);
                    self.rects[key.index()].set_size(Axis::X, width);
                }
                // The late horizontal placement moved the children, so their
                // subtrees need a second horizontal arrangement.
                let mut child = self.node(key).first_child;
                while child.is_valid() {
                    self.arrange(child, Axis::X);
                    child = self.node(child).next_sibling;
                }
            }
            (BoxModel::ColumnWrap, Axis::X) => {
                // handled while arranging Y
            }
            (BoxModel::RowWrap, Axis::X) => self.arrange_stacked(key, Axis::X, true),
            (BoxModel::RowWrap, Axis::Y) => {
                self.arrange_wrapped_overlay_squeezed(key, Axis::Y, true);
            }
            (BoxModel::Row, Axis::X) | (BoxModel::Column, Axis::Y) => {
                self.arrange_stacked(key, axis, false);
            }
            (BoxModel::Row, Axis::Y) | (BoxModel::Column, Axis::X) => {
                let first = self.node(key).first_child;
                self.arrange_overlay_squeezed_range(
                    key,
                    content_rect,
                    axis,
                    first,
                    ItemKey::INVALID,
                    content_rect.origin(axis),
                    content_rect.size(axis),
                );
            }
            (BoxModel::Free, _) => self.arrange_overlay(key, axis),
        }

        let content_rect = self.content_rect_of(key);
        let mut child = self.node(key).first_child;
        while child.is_valid() {
            self.apply_floating_position(child, content_rect, axis);
            // recursion depth matches tree depth
            self.arrange(child, axis);
            child = self.node(child).next_sibling;
        }
    }

    // ========================================================================
    // Stacking axis
    // ========================================================================

    /// Walks the children line by line, distributing leftover space or
    /// squeezing overflow, and writes each child's final origin and extent
    /// on the stacking axis.
    fn arrange_stacked(&mut self, key: ItemKey, axis: Axis, wrap: bool) {
        if self.node(key).first_child.is_invalid() {
            return;
        }

        // Computed markers from a previous arrangement are stale; lines are
        // rebuilt from scratch every pass.
        let mut child = self.node(key).first_child;
        while child.is_valid() {
            let item = self.node_mut(child);
            item.flags.remove(ControlFlags::BREAK);
            child = item.next_sibling;
        }

        let alignment = Alignment::from_flags(self.node(key).flags);
        let rect = self.content_rect_of(key);
        let space = rect.size(axis);
        let max_extent = rect.origin(axis) + space;

        let mut start_child = self.node(key).first_child;
        while start_child.is_valid() {
            let line = self.build_stacked_line(axis, wrap, space, start_child);

            let extra_space = space - line.used;
            let mut filler = 0.0;
            let mut spacer = 0.0;
            let mut extra_margin = 0.0;
            let mut eater = 0.0;

            if extra_space > 0.0 {
                if line.filler_count > 0 {
                    filler = extra_space / line.filler_count as f32;
                } else if line.total > 0 {
                    match alignment {
                        Alignment::Justify => {
                            // justify everywhere except a final or
                            // explicitly broken wrapped line
                            let last_line = wrap && (line.end_child.is_invalid() || line.hard_break);
                            if !last_line && line.total > 1 {
                                spacer = extra_space / (line.total - 1) as f32;
                            }
                        }
                        Alignment::Start => {}
                        Alignment::End => extra_margin = extra_space,
                        Alignment::Middle => extra_margin = extra_space / 2.0,
                    }
                }
            } else if !wrap && line.squeezed_count > 0 {
                eater = extra_space / line.squeezed_count as f32;
            }

            self.arrange_stacked_line(
                key,
                axis,
                wrap,
                max_extent,
                start_child,
                line.end_child,
                line.filler_count,
                filler,
                spacer,
                extra_margin,
                eater,
                rect.origin(axis),
            );

            start_child = line.end_child;
        }
    }

    /// Accepts children from `start_child` until the line breaks, counting
    /// how many can fill, be squeezed, or are fixed. Line-ending children
    /// under wrap are marked with the internal break flag.
    fn build_stacked_line(
        &mut self,
        axis: Axis,
        wrap: bool,
        space: f32,
        start_child: ItemKey,
    ) -> StackedLine {
        let mut line = StackedLine {
            used: 0.0,
            filler_count: 0,
            squeezed_count: 0,
            total: 0,
            hard_break: false,
            end_child: ItemKey::INVALID,
        };

        let mut child = start_child;
        while child.is_valid() {
            let child_item = self.node(child);
            let flags = child_item.flags;
            let trailing = child_item.margins.trailing(axis);
            let next = child_item.next_sibling;
            if flags.is_out_of_flow() {
                child = next;
                continue;
            }

            if child != start_child && flags.contains(ControlFlags::FORCE_BREAK) {
                line.end_child = child;
                line.hard_break = true;
                if wrap {
                    self.node_mut(child).flags.insert(ControlFlags::BREAK);
                }
                break;
            }

            let anchor = AxisAnchor::from_flags(flags, axis);
            let is_fixed = flags.contains(ControlFlags::fixed_flag(axis));
            let child_rect = self.rects[child.index()];
            let reserved = child_rect.origin(axis) + trailing;
            let full = reserved + child_rect.size(axis);

            // fill children reserve only their margins; the filler share
            // replaces their extent
            let extend = line.used + if anchor.is_fill() && !is_fixed { reserved } else { full };

            if wrap && line.total != 0 && extend > space {
                line.end_child = child;
                self.node_mut(child).flags.insert(ControlFlags::BREAK);
                break;
            }

            if is_fixed {
                // fixed extents are never redistributed
            } else if anchor.is_fill() {
                line.filler_count += 1;
            } else {
                line.squeezed_count += 1;
            }
            line.used = extend;
            line.total += 1;
            child = next;
        }

        line
    }

    /// Positions one line. Two walks: the first measures how much the
    /// per-child constraints give back or consume, the second hands that
    /// correction to the unconstrained fill children and writes the rects.
    #[allow(clippy::too_many_arguments)]
    fn arrange_stacked_line(
        &mut self,
        parent: ItemKey,
        axis: Axis,
        wrap: bool,
        max_extent: f32,
        start_child: ItemKey,
        end_child: ItemKey,
        filler_count: u32,
        filler: f32,
        spacer: f32,
        first_margin: f32,
        eater: f32,
        start: f32,
    ) {
        if start_child == end_child {
            return;
        }

        let parent_rect = self.content_rect_of(parent);
        let constrain_to_parent = self.node(parent).flags.contains(ControlFlags::CONSTRAIN_SIZE);
        let mut constrained_count: u32 = 0;
        let mut extra_from_constraints: f32 = 0.0;

        for pass in 0..2 {
            let mut child = start_child;
            let mut extra_margin = first_margin;
            let mut x = start;

            while child != end_child && child.is_valid() {
                let child_item = self.node(child);
                let flags = child_item.flags;
                let next = child_item.next_sibling;
                if flags.is_out_of_flow() {
                    child = next;
                    continue;
                }

                let anchor = AxisAnchor::from_flags(flags, axis);
                let is_fixed = flags.contains(ControlFlags::fixed_flag(axis));
                let margins = child_item.margins;
                let fixed_size = child_item.fixed_size.axis(axis);
                let child_rect = self.rects[child.index()];

                x += child_rect.origin(axis) + extra_margin;

                let mut computed_size = if is_fixed {
                    child_rect.size(axis)
                } else if anchor.is_fill() {
                    filler
                } else {
                    (child_rect.size(axis) + eater).max(0.0)
                };

                if pass == 1 && filler_count > constrained_count && constrained_count > 0 && !is_fixed
                {
                    computed_size += extra_from_constraints / (filler_count - constrained_count) as f32;
                }

                let mut constrained_size = self.constrain(computed_size, child, axis);
                if wrap {
                    let line_cap = max_extent - margins.trailing(axis) - x;
                    constrained_size = self.constrain(line_cap.min(constrained_size), child, axis);
                }
                if pass == 0 {
                    let delta = computed_size - constrained_size;
                    if delta.abs() >= 0.1 {
                        extra_from_constraints += delta;
                        constrained_count += 1;
                    }
                }

                let ix0 = x;
                let mut ix1 = x + constrained_size;
                if constrain_to_parent && fixed_size < 0.0 {
                    let parent_extent = (parent_rect.origin(axis) + parent_rect.size(axis)).max(0.0);
                    ix1 = constrain_value(ix1, -1.0, parent_extent);
                }

                if pass == 1 {
                    let rect = &mut self.rects[child.index()];
                    rect.set_origin(axis, ix0);
                    rect.set_size(axis, (ix1 - ix0).max(0.0));
                }

                x += constrained_size + margins.trailing(axis);
                extra_margin = spacer;
                child = next;
            }
        }
    }

    // ========================================================================
    // Cross axis
    // ========================================================================

    /// Positions each child of a free container by its own anchors relative
    /// to the parent's content span. Sizes are untouched except for fill.
    fn arrange_overlay(&mut self, key: ItemKey, axis: Axis) {
        if self.node(key).first_child.is_invalid() {
            return;
        }

        let content_rect = self.content_rect_of(key);
        let offset = content_rect.origin(axis);
        let space = content_rect.size(axis);

        let mut child = self.node(key).first_child;
        while child.is_valid() {
            let child_item = self.node(child);
            let flags = child_item.flags;
            let margins = child_item.margins;
            let next = child_item.next_sibling;
            if flags.is_out_of_flow() {
                child = next;
                continue;
            }

            let mut rect = self.rects[child.index()];
            match AxisAnchor::from_flags(flags, axis) {
                AxisAnchor::Center => {
                    let shift = (space - rect.size(axis)) / 2.0 - margins.trailing(axis);
                    rect.set_origin(axis, rect.origin(axis) + shift);
                }
                AxisAnchor::End => {
                    let shift = space - rect.size(axis) - margins.axis_sum(axis);
                    rect.set_origin(axis, rect.origin(axis) + shift);
                }
                AxisAnchor::Fill => {
                    let available =
                        (space - rect.origin(axis) - margins.trailing(axis)).max(0.0);
                    rect.set_size(axis, self.constrain(available, child, axis));
                }
                AxisAnchor::Start => {}
            }
            rect.set_origin(axis, rect.origin(axis) + offset);
            self.rects[child.index()] = rect;

            child = next;
        }
    }

    /// Anchor placement for `[start_child, end_child)` with the extra rule
    /// that no child may exceed `space`: the one place arrangement shrinks
    /// a child's extent rather than just moving it.
    #[allow(clippy::too_many_arguments)]
    fn arrange_overlay_squeezed_range(
        &mut self,
        parent: ItemKey,
        parent_rect: Rect,
        axis: Axis,
        start_child: ItemKey,
        end_child: ItemKey,
        offset: f32,
        space: f32,
    ) {
        if start_child == end_child {
            return;
        }

        let constrain_to_parent = self.node(parent).flags.contains(ControlFlags::CONSTRAIN_SIZE);
        let parent_padding = self.node(parent).padding;

        let mut child = start_child;
        while child != end_child && child.is_valid() {
            let child_item = self.node(child);
            let flags = child_item.flags;
            let margins = child_item.margins;
            let next = child_item.next_sibling;
            if flags.is_out_of_flow() {
                child = next;
                continue;
            }

            let mut rect = self.rects[child.index()];
            let max_size = (space - rect.origin(axis) - margins.trailing(axis)).max(0.0);

            match AxisAnchor::from_flags(flags, axis) {
                AxisAnchor::Center => {
                    rect.set_size(axis, rect.size(axis).min(max_size));
                    let shift = (space - rect.size(axis)) / 2.0 - margins.trailing(axis);
                    rect.set_origin(axis, rect.origin(axis) + shift);
                }
                AxisAnchor::End => {
                    rect.set_size(axis, rect.size(axis).min(max_size));
                    rect.set_origin(axis, space - rect.size(axis) - margins.trailing(axis));
                }
                AxisAnchor::Fill => {
                    rect.set_size(axis, max_size);
                }
                AxisAnchor::Start => {
                    rect.set_size(axis, rect.size(axis).min(max_size));
                }
            }
            rect.set_origin(axis, rect.origin(axis) + offset);

            let parent_constraint = if constrain_to_parent {
                let mut bound = Vector2::new(
                    parent_rect.right() - rect.x,
                    parent_rect.bottom() - rect.y,
                );
                bound.x = (bound.x - margins.right - parent_padding.right).max(0.0);
                bound.y = (bound.y - margins.bottom - parent_padding.bottom).max(0.0);
                Some(bound)
            } else {
                None
            };
            let minimum = self.computed_minimum_size(child).axis(axis);
            let maximum = self.computed_maximum_size(child, parent_constraint).axis(axis);
            rect.set_size(axis, constrain_value(rect.size(axis), minimum, maximum).max(0.0));
            self.rects[child.index()] = rect;

            child = next;
        }
    }

    /// Partitions children at break markers into lines, gives each line its
    /// required cross extent (max over members) at an advancing offset, and
    /// expands the last line into whatever content span remains. Returns
    /// the accumulated extent.
    fn arrange_wrapped_overlay_squeezed(
        &mut self,
        key: ItemKey,
        axis: Axis,
        expand_last_line: bool,
    ) -> f32 {
        let content_rect = self.content_rect_of(key);
        let mut offset = content_rect.origin(axis);
        let mut need_size: f32 = 0.0;

        let mut start_child = self.node(key).first_child;
        let mut child = start_child;
        while child.is_valid() {
            let child_item = self.node(child);
            let flags = child_item.flags;
            let trailing = child_item.margins.trailing(axis);
            let next = child_item.next_sibling;
            if flags.is_out_of_flow() {
                child = next;
                continue;
            }

            if flags.is_break() {
                self.arrange_overlay_squeezed_range(
                    key,
                    content_rect,
                    axis,
                    start_child,
                    child,
                    offset,
                    need_size,
                );
                offset += need_size;
                start_child = child;
                need_size = 0.0;
            }

            let rect = self.rects[child.index()];
            need_size = need_size.max(rect.origin(axis) + rect.size(axis) + trailing);
            child = next;
        }

        let space = if expand_last_line {
            need_size.max(content_rect.size(axis) - offset + content_rect.origin(axis))
        } else {
            need_size
        };
        self.arrange_overlay_squeezed_range(
            key,
            content_rect,
            axis,
            start_child,
            ItemKey::INVALID,
            offset,
            space,
        );
        offset + need_size
    }

    // ========================================================================
    // Out-of-flow items
    // ========================================================================

    /// Places a floating or stacked item at its explicit position (or far
    /// edge when end-anchored), sized to its fixed/natural extent or to the
    /// parent's span under fill.
    fn apply_floating_position(&mut self, key: ItemKey, parent_rect: Rect, axis: Axis) {
        let item = self.node(key);
        if !item.flags.is_out_of_flow() {
            return;
        }

        let fixed = item.fixed_size.axis(axis);
        let margins_sum = item.margins.axis_sum(axis);
        let anchor = AxisAnchor::from_flags(item.flags, axis);
        let leading_margin = item.margins.leading(axis);
        let floating_offset = item.floating_position.axis(axis);
        let minimum = item.minimum_size.axis(axis);
        let maximum = item.maximum_size.axis(axis);

        let mut rect = self.rects[key.index()];
        let mut size = if fixed > 0.0 {
            fixed
        } else {
            rect.size(axis).max(minimum)
        };
        if anchor.is_fill() {
            size = size.max(parent_rect.size(axis) - margins_sum);
        }
        if maximum > 0.0 && fixed < 0.0 {
            size = size.min(maximum);
        }

        let origin = if anchor == AxisAnchor::End {
            parent_rect.origin(axis) + parent_rect.size(axis) - size - margins_sum
        } else {
            parent_rect.origin(axis) + leading_margin + floating_offset
        };
        rect.set_origin(axis, origin);
        rect.set_size(axis, size.max(0.0));
        self.rects[key.index()] = rect;
    }
}
