use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke};

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn draw_background(
    painter: &Painter,
    rect: Rect,
    background: Color32,
    grid: Color32,
    origin: Pos2,
    zoom: f32,
) {
    painter.rect_filled(rect, 0.0, background);

    let step = (56.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let stroke = Stroke::new(1.0, grid);

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

/// Bend of each link relative to its length. Links in opposite
/// directions bend to opposite sides.
pub(super) const LINK_CURVATURE: f32 = 0.1;

pub(super) fn link_control_point(start: Pos2, end: Pos2, curvature: f32) -> Pos2 {
    start.lerp(end, 0.5) + (end - start).rot90() * curvature
}

pub(super) fn quadratic_point(start: Pos2, control: Pos2, end: Pos2, t: f32) -> Pos2 {
    let inverse = 1.0 - t;
    let x = inverse * inverse * start.x + 2.0 * inverse * t * control.x + t * t * end.x;
    let y = inverse * inverse * start.y + 2.0 * inverse * t * control.y + t * t * end.y;
    Pos2::new(x, y)
}

/// Filled triangle whose tip touches the target node's rim. `start` sets
/// the approach direction, so pass the curve's control point for bent links.
pub(super) fn arrow_head(
    start: Pos2,
    end: Pos2,
    target_radius: f32,
    length: f32,
    color: Color32,
) -> Option<Shape> {
    let direction = (end - start).normalized();
    if !direction.is_finite() || (end - start).length() <= target_radius + length {
        return None;
    }

    let tip = end - direction * target_radius;
    let base = tip - direction * length;
    let wing = direction.rot90() * (length * 0.5);
    Some(Shape::convex_polygon(
        vec![tip, base + wing, base - wing],
        color,
        Stroke::NONE,
    ))
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let top_left = rect.left_top();
    let top_right = rect.right_top();
    let bottom_left = rect.left_bottom();
    let bottom_right = rect.right_bottom();

    segments_intersect(start, end, top_left, top_right)
        || segments_intersect(start, end, top_right, bottom_right)
        || segments_intersect(start, end, bottom_right, bottom_left)
        || segments_intersect(start, end, bottom_left, top_left)
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let a_min_x = a1.x.min(a2.x);
    let a_max_x = a1.x.max(a2.x);
    let a_min_y = a1.y.min(a2.y);
    let a_max_y = a1.y.max(a2.y);
    let b_min_x = b1.x.min(b2.x);
    let b_max_x = b1.x.max(b2.x);
    let b_min_y = b1.y.min(b2.y);
    let b_max_y = b1.y.max(b2.y);

    if a_max_x < b_min_x || b_max_x < a_min_x || a_max_y < b_min_y || b_max_y < a_min_y {
        return false;
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0))
    }

    #[test]
    fn reciprocal_links_bend_to_opposite_sides() {
        let a = pos2(0.0, 0.0);
        let b = pos2(100.0, 0.0);
        let forward = link_control_point(a, b, LINK_CURVATURE);
        let backward = link_control_point(b, a, LINK_CURVATURE);

        assert_eq!(forward.x, 50.0);
        assert_eq!(backward.x, 50.0);
        assert!((forward.y + backward.y).abs() < 1e-4);
        assert!((forward.y.abs() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn quadratic_curve_passes_through_its_ends() {
        let (a, control, b) = (pos2(0.0, 0.0), pos2(50.0, -20.0), pos2(100.0, 0.0));
        assert_eq!(quadratic_point(a, control, b, 0.0), a);
        assert_eq!(quadratic_point(a, control, b, 1.0), b);
        assert_eq!(quadratic_point(a, control, b, 0.5), pos2(50.0, -10.0));
    }

    #[test]
    fn blending_is_clamped() {
        let blended = blend_color(Color32::BLACK, Color32::WHITE, 2.0);
        assert_eq!(blended, Color32::WHITE);
    }

    #[test]
    fn edges_crossing_the_viewport_are_visible() {
        assert!(edge_visible(viewport(), pos2(-50.0, 50.0), pos2(150.0, 50.0), 0.0));
        assert!(!edge_visible(viewport(), pos2(-50.0, -50.0), pos2(-10.0, -5.0), 0.0));
    }

    #[test]
    fn arrow_tip_sits_on_the_target_rim() {
        let Some(Shape::Path(path)) =
            arrow_head(pos2(0.0, 0.0), pos2(100.0, 0.0), 10.0, 6.0, Color32::RED)
        else {
            panic!("expected a triangle");
        };
        assert_eq!(path.points[0], pos2(90.0, 0.0));
        assert!(arrow_head(pos2(0.0, 0.0), pos2(12.0, 0.0), 10.0, 6.0, Color32::RED).is_none());
    }
}
