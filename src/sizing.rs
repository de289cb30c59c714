//! Bottom-up size computation.
//!
//! For each axis, an item's extent is derived from its children's extents
//! according to its box model; the arrangement pass then repositions (and
//! sometimes shrinks) children inside the now-sized item. A child
//! contributes its rect origin on the axis (its leading margin after this
//! pass) plus its extent plus its trailing margin.

use crate::engine::{ItemKey, TrussContext};
use crate::flags::{AxisAnchor, BoxModel, ControlFlags};
use crate::math::Axis;

impl TrussContext {
    /// Computes the item's extent on one axis, children first. Fixed axes
    /// are authoritative and skip the box-model computation entirely.
    pub(crate) fn calc_size(&mut self, key: ItemKey, axis: Axis) {
        let mut child = self.node(key).first_child;
        while child.is_valid() {
            // recursion depth matches tree depth
            self.calc_size(child, axis);
            child = self.node(child).next_sibling;
        }

        self.node_mut(key).computed_content_size.set_axis(axis, 0.0);
        let margin = self.node(key).margins.leading(axis);
        self.rects[key.index()].set_origin(axis, margin);

        let fixed = self.node(key).fixed_size.axis(axis);
        if fixed > 0.0 {
            let size = self.constrain(fixed, key, axis);
            self.rects[key.index()].set_size(axis, size);
            return;
        }

        let model = BoxModel::from_flags(self.node(key).flags);
        let mut result = match (model, axis) {
            (BoxModel::ColumnWrap, Axis::Y) => self.calc_stacked_size(key, axis),
            // The wrapped column's width follows the same overlay-of-runs
            // formula as the wrapped row's height: each break-delimited run
            // is one column, runs concatenate horizontally. The markers read
            // here are the ones the arrangement pass left behind; arranging
            // corrects the width from the fresh markers afterwards.
            (BoxModel::ColumnWrap, Axis::X) => self.calc_wrapped_overlaid_size(key, axis),
            (BoxModel::RowWrap, Axis::X) => self.calc_wrapped_stacked_size(key, axis),
            (BoxModel::RowWrap, Axis::Y) => self.calc_wrapped_overlaid_size(key, axis),
            (BoxModel::Row, Axis::X) | (BoxModel::Column, Axis::Y) => {
                self.calc_stacked_size(key, axis)
            }
            _ => self.calc_overlay_size(key, axis),
        };

        // A floating fill item sizes against its parent's content span
        // rather than its own content.
        let item = self.node(key);
        if item.flags.contains(ControlFlags::FLOATING)
            && item.parent.is_valid()
            && AxisAnchor::from_flags(item.flags, axis).is_fill()
        {
            let parent_rect = self.content_rect_of(item.parent);
            if parent_rect.size(axis) > 0.0 {
                result = parent_rect.size(axis) - item.margins.axis_sum(axis);
            }
        }

        let size = self.constrain(result, key, axis);
        self.rects[key.index()].set_size(axis, size.max(0.0));
    }

    /// Concatenation along the stacking axis: children accumulate, stacked
    /// items overlay, floating items are invisible.
    fn calc_stacked_size(&mut self, key: ItemKey, axis: Axis) -> f32 {
        let outer_padding = self.node(key).padding.axis_sum(axis);
        let mut result: f32 = 0.0;
        let mut minimum: f32 = 0.0;

        let mut child = self.node(key).first_child;
        while child.is_valid() {
            let child_item = self.node(child);
            let flags = child_item.flags;
            let child_margin = child_item.margins.trailing(axis);
            let next = child_item.next_sibling;

            let child_minimum = self.calc_minimum_size(child, axis) + child_margin;
            if flags.contains(ControlFlags::FLOATING) {
                minimum = minimum.max(child_minimum);
            } else {
                minimum += child_minimum;
            }

            let child_rect = self.rects[child.index()];
            let sum = child_rect.origin(axis) + child_rect.size(axis) + child_margin;
            if flags.contains(ControlFlags::FLOATING) {
                // no contribution
            } else if flags.contains(ControlFlags::STACKED) {
                result = result.max(sum);
            } else {
                result += sum;
            }
            child = next;
        }

        self.node_mut(key)
            .computed_content_size
            .set_axis(axis, minimum + outer_padding);
        result + outer_padding
    }

    /// Max of child extents: the cross axis of a single-direction container
    /// and both axes of the free model.
    fn calc_overlay_size(&mut self, key: ItemKey, axis: Axis) -> f32 {
        let outer_padding = self.node(key).padding.axis_sum(axis);
        if self.node(key).first_child.is_invalid() {
            self.node_mut(key).computed_content_size.set_axis(axis, 0.0);
            return outer_padding;
        }

        let mut result: f32 = 0.0;
        let mut minimum: f32 = 0.0;

        let mut child = self.node(key).first_child;
        while child.is_valid() {
            let child_item = self.node(child);
            let flags = child_item.flags;
            let child_margin = child_item.margins.trailing(axis);
            let next = child_item.next_sibling;

            let child_minimum = self.calc_minimum_size(child, axis) + child_margin;
            minimum = minimum.max(child_minimum);
            if !flags.contains(ControlFlags::FLOATING) {
                let child_rect = self.rects[child.index()];
                let child_size = child_rect.origin(axis) + child_rect.size(axis) + child_margin;
                result = result.max(child_size);
            }
            child = next;
        }

        self.node_mut(key)
            .computed_content_size
            .set_axis(axis, minimum + outer_padding);
        result + outer_padding
    }

    /// Per-run max, runs summed: the height of a wrapped row (lines stack)
    /// and the width of a wrapped column (columns concatenate).
    fn calc_wrapped_overlaid_size(&mut self, key: ItemKey, axis: Axis) -> f32 {
        self.calc_wrapped_size(key, axis, true, false)
    }

    /// Per-run sum, max across runs: the width of a wrapped row. Only
    /// explicit force-breaks delimit runs here; computed markers for this
    /// axis are rebuilt by the arrangement pass after this one runs.
    fn calc_wrapped_stacked_size(&mut self, key: ItemKey, axis: Axis) -> f32 {
        self.calc_wrapped_size(key, axis, false, true)
    }

    fn calc_wrapped_size(
        &mut self,
        key: ItemKey,
        axis: Axis,
        overlaid: bool,
        forced_break_only: bool,
    ) -> f32 {
        let item = self.node(key);
        let no_expand = item
            .flags
            .contains(ControlFlags::no_expand_flag(axis));
        let outer_padding = item.padding.axis_sum(axis);

        let mut need_size: f32 = 0.0;
        let mut need_size2: f32 = 0.0;

        let mut child = self.node(key).first_child;
        while child.is_valid() {
            let child_item = self.node(child);
            let flags = child_item.flags;
            let next = child_item.next_sibling;
            if flags.is_out_of_flow() {
                child = next;
                continue;
            }

            let child_rect = self.rects[child.index()];
            let child_size =
                child_rect.origin(axis) + child_rect.size(axis) + child_item.margins.trailing(axis);

            let breaks = if forced_break_only {
                flags.contains(ControlFlags::FORCE_BREAK)
            } else {
                flags.is_break()
            };
            if breaks {
                if overlaid {
                    need_size2 += need_size;
                } else {
                    need_size2 = need_size2.max(need_size);
                }
                need_size = 0.0;
            }

            if overlaid {
                need_size = need_size.max(child_size);
            } else {
                need_size += child_size;
            }
            child = next;
        }

        let result = if no_expand {
            0.0
        } else if overlaid {
            need_size + need_size2
        } else {
            need_size.max(need_size2)
        };

        self.node_mut(key).computed_content_size.set_axis(axis, result);
        result + outer_padding
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::{Margins, Vector2};

    fn context() -> TrussContext {
        TrussContext::new(Vector2::new(800.0, 600.0))
    }

    fn fixed_child(ctx: &mut TrussContext, parent: ItemKey, width: f32, height: f32) -> ItemKey {
        let key = ctx.create_item();
        ctx.set_fixed_size(key, Vector2::new(width, height)).unwrap();
        ctx.append(parent, key).unwrap();
        key
    }

    #[test]
    fn stacked_size_sums_children_and_margins() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW).unwrap();
        ctx.append(ctx.root(), row).unwrap();
        let a = fixed_child(&mut ctx, row, 30.0, 10.0);
        let b = fixed_child(&mut ctx, row, 50.0, 10.0);
        ctx.set_margins(a, Margins::new(2.0, 0.0, 3.0, 0.0)).unwrap();
        ctx.set_margins(b, Margins::new(1.0, 0.0, 4.0, 0.0)).unwrap();

        ctx.calc_size(row, Axis::X);
        // (2 + 30 + 3) + (1 + 50 + 4)
        assert_eq!(ctx.rects[row.index()].width, 90.0);
    }

    #[test]
    fn overlay_size_takes_max_child_extent() {
        let mut ctx = context();
        let free = ctx.create_item();
        ctx.append(ctx.root(), free).unwrap();
        fixed_child(&mut ctx, free, 30.0, 25.0);
        fixed_child(&mut ctx, free, 70.0, 15.0);

        ctx.calc_size(free, Axis::X);
        ctx.calc_size(free, Axis::Y);
        assert_eq!(ctx.rects[free.index()].width, 70.0);
        assert_eq!(ctx.rects[free.index()].height, 25.0);
    }

    #[test]
    fn row_cross_axis_overlays() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW).unwrap();
        ctx.append(ctx.root(), row).unwrap();
        fixed_child(&mut ctx, row, 30.0, 25.0);
        fixed_child(&mut ctx, row, 40.0, 45.0);

        ctx.calc_size(row, Axis::Y);
        assert_eq!(ctx.rects[row.index()].height, 45.0);
    }

    #[test]
    fn fixed_size_skips_content() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW).unwrap();
        ctx.set_fixed_size(row, Vector2::new(100.0, -1.0)).unwrap();
        ctx.append(ctx.root(), row).unwrap();
        fixed_child(&mut ctx, row, 90.0, 10.0);
        fixed_child(&mut ctx, row, 90.0, 10.0);

        ctx.calc_size(row, Axis::X);
        assert_eq!(ctx.rects[row.index()].width, 100.0);
    }

    #[test]
    fn origin_is_leading_margin() {
        let mut ctx = context();
        let a = ctx.create_item();
        ctx.append(ctx.root(), a).unwrap();
        ctx.set_margins(a, Margins::new(7.0, 11.0, 0.0, 0.0)).unwrap();

        ctx.calc_size(a, Axis::X);
        ctx.calc_size(a, Axis::Y);
        assert_eq!(ctx.rects[a.index()].x, 7.0);
        assert_eq!(ctx.rects[a.index()].y, 11.0);
    }

    #[test]
    fn padding_grows_content_size() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW).unwrap();
        ctx.set_padding(row, Margins::new(5.0, 0.0, 6.0, 0.0)).unwrap();
        ctx.append(ctx.root(), row).unwrap();
        fixed_child(&mut ctx, row, 40.0, 10.0);

        ctx.calc_size(row, Axis::X);
        assert_eq!(ctx.rects[row.index()].width, 51.0);
    }

    #[test]
    fn floating_children_are_invisible_to_sizing() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW).unwrap();
        ctx.append(ctx.root(), row).unwrap();
        fixed_child(&mut ctx, row, 40.0, 10.0);
        let float = fixed_child(&mut ctx, row, 500.0, 10.0);
        ctx.set_layout_flags(float, ControlFlags::FLOATING).unwrap();

        ctx.calc_size(row, Axis::X);
        assert_eq!(ctx.rects[row.index()].width, 40.0);
    }

    #[test]
    fn stacked_children_overlay_in_stacked_sizing() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW).unwrap();
        ctx.append(ctx.root(), row).unwrap();
        fixed_child(&mut ctx, row, 40.0, 10.0);
        let stacked = fixed_child(&mut ctx, row, 90.0, 10.0);
        ctx.set_layout_flags(stacked, ControlFlags::STACKED).unwrap();

        ctx.calc_size(row, Axis::X);
        // max(40, 90) because the stacked child overlays the flow
        assert_eq!(ctx.rects[row.index()].width, 90.0);
    }

    #[test]
    fn wrapped_stacked_width_concatenates_without_breaks() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW | ControlFlags::WRAP)
            .unwrap();
        ctx.append(ctx.root(), row).unwrap();
        fixed_child(&mut ctx, row, 30.0, 10.0);
        fixed_child(&mut ctx, row, 50.0, 10.0);

        ctx.calc_size(row, Axis::X);
        assert_eq!(ctx.rects[row.index()].width, 80.0);
    }

    #[test]
    fn wrapped_stacked_width_maxes_over_forced_runs() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW | ControlFlags::WRAP)
            .unwrap();
        ctx.append(ctx.root(), row).unwrap();
        fixed_child(&mut ctx, row, 30.0, 10.0);
        fixed_child(&mut ctx, row, 50.0, 10.0);
        let c = fixed_child(&mut ctx, row, 70.0, 10.0);
        ctx.set_force_break(c, true).unwrap();

        ctx.calc_size(row, Axis::X);
        // runs: 30 + 50 = 80 and 70; widest run wins
        assert_eq!(ctx.rects[row.index()].width, 80.0);
    }

    #[test]
    fn wrapped_column_width_sums_forced_column_maxes() {
        let mut ctx = context();
        let column = ctx.create_item();
        ctx.set_box_flags(column, ControlFlags::COLUMN | ControlFlags::WRAP)
            .unwrap();
        ctx.append(ctx.root(), column).unwrap();
        fixed_child(&mut ctx, column, 30.0, 10.0);
        fixed_child(&mut ctx, column, 50.0, 10.0);
        let c = fixed_child(&mut ctx, column, 20.0, 10.0);
        ctx.set_force_break(c, true).unwrap();

        ctx.calc_size(column, Axis::X);
        // columns: max(30, 50) and 20, concatenated
        assert_eq!(ctx.rects[column.index()].width, 70.0);
    }

    #[test]
    fn no_expansion_reports_zero_wrapped_size() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW | ControlFlags::WRAP)
            .unwrap();
        ctx.set_container_flags(row, ControlFlags::NO_EXPAND_X).unwrap();
        ctx.append(ctx.root(), row).unwrap();
        fixed_child(&mut ctx, row, 30.0, 10.0);

        ctx.calc_size(row, Axis::X);
        assert_eq!(ctx.rects[row.index()].width, 0.0);
    }

    #[test]
    fn minimum_and_maximum_bound_the_result() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW).unwrap();
        ctx.set_size_constraints(
            row,
            Vector2::new(100.0, -1.0),
            Vector2::new(150.0, -1.0),
        )
        .unwrap();
        ctx.append(ctx.root(), row).unwrap();
        let child = fixed_child(&mut ctx, row, 40.0, 10.0);

        ctx.calc_size(row, Axis::X);
        assert_eq!(ctx.rects[row.index()].width, 100.0);

        ctx.set_fixed_size(child, Vector2::new(400.0, 10.0)).unwrap();
        ctx.calc_size(row, Axis::X);
        assert_eq!(ctx.rects[row.index()].width, 150.0);
    }

    #[test]
    fn content_minimum_accumulates_for_prevent_crush() {
        let mut ctx = context();
        let row = ctx.create_item();
        ctx.set_box_flags(row, ControlFlags::ROW).unwrap();
        ctx.set_container_flags(row, ControlFlags::PREVENT_CRUSH_X)
            .unwrap();
        ctx.append(ctx.root(), row).unwrap();
        fixed_child(&mut ctx, row, 60.0, 10.0);
        fixed_child(&mut ctx, row, 60.0, 10.0);

        ctx.calc_size(row, Axis::X);
        assert_eq!(ctx.computed_content_size(row).unwrap().x, 120.0);
        // the accumulated minimum now backs the container's own floor
        assert_eq!(ctx.constrain(10.0, row, Axis::X), 120.0);
    }
}
