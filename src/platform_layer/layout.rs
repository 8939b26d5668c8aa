/*
 * Computes control rectangles from `LayoutRule`s.
 *
 * Rules are grouped by container. For each container the rules run in ascending
 * `order`: every edge dock takes its fixed-size strip off the remaining area,
 * and `Fill` receives whatever remains at that point. Margins shrink the
 * control inside its slot without changing how much area the slot consumes.
 * The arithmetic is kept free of native types so it can be checked anywhere;
 * the Win32 backend only moves windows to the rectangles returned here.
 */
use super::types::{ControlId, DockStyle, LayoutRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl LayoutRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        LayoutRect {
            x,
            y,
            width: width.max(0),
            height: height.max(0),
        }
    }

    fn shrink_by_margin(self, margin: (i32, i32, i32, i32)) -> Self {
        let (top, right, bottom, left) = margin;
        LayoutRect::new(
            self.x + left,
            self.y + top,
            self.width - left - right,
            self.height - top - bottom,
        )
    }
}

/*
 * Lays out the rules whose container is `parent_control_id` inside `container`.
 * Rectangles are relative to the container's client area. Controls in nested
 * containers are not included; call again with the child container's rectangle
 * (moved to the origin) to lay those out.
 */
pub fn calculate_layout(
    rules: &[LayoutRule],
    parent_control_id: Option<ControlId>,
    container: LayoutRect,
) -> Vec<(ControlId, LayoutRect)> {
    let mut applicable: Vec<&LayoutRule> = rules
        .iter()
        .filter(|rule| rule.parent_control_id == parent_control_id)
        .collect();
    applicable.sort_by_key(|rule| rule.order);

    let mut remaining = container;
    let mut placements = Vec::with_capacity(applicable.len());
    for rule in applicable {
        let size = rule.fixed_size.unwrap_or(0).max(0);
        let slot = match rule.dock_style {
            DockStyle::Top => {
                let height = size.min(remaining.height);
                let slot = LayoutRect::new(remaining.x, remaining.y, remaining.width, height);
                remaining = LayoutRect::new(
                    remaining.x,
                    remaining.y + height,
                    remaining.width,
                    remaining.height - height,
                );
                slot
            }
            DockStyle::Bottom => {
                let height = size.min(remaining.height);
                let slot = LayoutRect::new(
                    remaining.x,
                    remaining.y + remaining.height - height,
                    remaining.width,
                    height,
                );
                remaining =
                    LayoutRect::new(remaining.x, remaining.y, remaining.width, remaining.height - height);
                slot
            }
            DockStyle::Left => {
                let width = size.min(remaining.width);
                let slot = LayoutRect::new(remaining.x, remaining.y, width, remaining.height);
                remaining = LayoutRect::new(
                    remaining.x + width,
                    remaining.y,
                    remaining.width - width,
                    remaining.height,
                );
                slot
            }
            DockStyle::Right => {
                let width = size.min(remaining.width);
                let slot = LayoutRect::new(
                    remaining.x + remaining.width - width,
                    remaining.y,
                    width,
                    remaining.height,
                );
                remaining =
                    LayoutRect::new(remaining.x, remaining.y, remaining.width - width, remaining.height);
                slot
            }
            DockStyle::Fill => remaining,
        };
        placements.push((rule.control_id, slot.shrink_by_margin(rule.margin)));
    }
    placements
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: ControlId = ControlId::new(1);
    const STATUS: ControlId = ControlId::new(2);
    const PREVIEW: ControlId = ControlId::new(3);
    const NESTED: ControlId = ControlId::new(4);

    fn rule(control_id: ControlId, dock_style: DockStyle, order: u32, size: Option<i32>) -> LayoutRule {
        LayoutRule {
            control_id,
            parent_control_id: None,
            dock_style,
            order,
            fixed_size: size,
            margin: (0, 0, 0, 0),
        }
    }

    fn rect_of(placements: &[(ControlId, LayoutRect)], id: ControlId) -> LayoutRect {
        placements
            .iter()
            .find(|(control_id, _)| *control_id == id)
            .map(|(_, rect)| *rect)
            .unwrap()
    }

    #[test]
    fn test_bottom_left_fill_partition_the_client_area() {
        // Arrange
        let rules = vec![
            rule(PREVIEW, DockStyle::Fill, 10, None),
            rule(STATUS, DockStyle::Bottom, 0, Some(20)),
            rule(TREE, DockStyle::Left, 1, Some(300)),
        ];

        // Act
        let placements = calculate_layout(&rules, None, LayoutRect::new(0, 0, 1000, 600));

        // Assert
        assert_eq!(rect_of(&placements, STATUS), LayoutRect::new(0, 580, 1000, 20));
        assert_eq!(rect_of(&placements, TREE), LayoutRect::new(0, 0, 300, 580));
        assert_eq!(rect_of(&placements, PREVIEW), LayoutRect::new(300, 0, 700, 580));
        assert_eq!(placements[0].0, STATUS, "Rules are applied in ascending order.");
    }

    #[test]
    fn test_top_and_right_docks() {
        let rules = vec![
            rule(TREE, DockStyle::Top, 0, Some(50)),
            rule(STATUS, DockStyle::Right, 1, Some(100)),
            rule(PREVIEW, DockStyle::Fill, 2, None),
        ];

        let placements = calculate_layout(&rules, None, LayoutRect::new(0, 0, 400, 300));

        assert_eq!(rect_of(&placements, TREE), LayoutRect::new(0, 0, 400, 50));
        assert_eq!(rect_of(&placements, STATUS), LayoutRect::new(300, 50, 100, 250));
        assert_eq!(rect_of(&placements, PREVIEW), LayoutRect::new(0, 50, 300, 250));
    }

    #[test]
    fn test_margins_shrink_the_control_inside_its_slot() {
        let mut status = rule(STATUS, DockStyle::Bottom, 0, Some(20));
        status.margin = (2, 4, 2, 4);
        let rules = vec![status, rule(PREVIEW, DockStyle::Fill, 1, None)];

        let placements = calculate_layout(&rules, None, LayoutRect::new(0, 0, 200, 100));

        assert_eq!(rect_of(&placements, STATUS), LayoutRect::new(4, 82, 192, 16));
        assert_eq!(rect_of(&placements, PREVIEW), LayoutRect::new(0, 0, 200, 80));
    }

    #[test]
    fn test_too_small_client_area_never_yields_negative_sizes() {
        let rules = vec![
            rule(STATUS, DockStyle::Bottom, 0, Some(20)),
            rule(TREE, DockStyle::Left, 1, Some(300)),
            rule(PREVIEW, DockStyle::Fill, 2, None),
        ];

        let placements = calculate_layout(&rules, None, LayoutRect::new(0, 0, 100, 10));

        for (_, rect) in &placements {
            assert!(rect.width >= 0 && rect.height >= 0, "Negative size in {rect:?}");
        }
        assert_eq!(rect_of(&placements, STATUS), LayoutRect::new(0, 0, 100, 10));
        assert_eq!(rect_of(&placements, PREVIEW).width, 0);
    }

    #[test]
    fn test_only_rules_of_the_requested_container_are_placed() {
        let mut nested = rule(NESTED, DockStyle::Fill, 0, None);
        nested.parent_control_id = Some(PREVIEW);
        let rules = vec![rule(PREVIEW, DockStyle::Fill, 0, None), nested];

        let top_level = calculate_layout(&rules, None, LayoutRect::new(0, 0, 50, 50));
        let inside_preview = calculate_layout(&rules, Some(PREVIEW), LayoutRect::new(0, 0, 50, 50));

        assert_eq!(top_level.len(), 1);
        assert_eq!(top_level[0].0, PREVIEW);
        assert_eq!(inside_preview.len(), 1);
        assert_eq!(inside_preview[0].0, NESTED);
    }
}
