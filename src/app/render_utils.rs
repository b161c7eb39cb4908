use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke};

use crate::interaction::ViewTransform;
use crate::model::Category;

pub(super) fn draw_background(painter: &Painter, rect: Rect, view: ViewTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = (56.0 * view.scale.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.center() + view.translate;
    let grid = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 70));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], grid);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], grid);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    rect.intersects(bounds)
}

pub(super) fn category_color(category: Category) -> Color32 {
    match category {
        Category::Source => Color32::from_rgb(96, 170, 232),
        Category::Target => Color32::from_rgb(236, 132, 92),
    }
}

pub(super) fn highlight_color(base: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let lift = |channel: u8| (channel as f32 + (255.0 - channel as f32) * amount) as u8;
    Color32::from_rgb(lift(base.r()), lift(base.g()), lift(base.b()))
}

pub(super) fn edge_width(weight: u32, scale: f32) -> f32 {
    let base = 1.0 + (weight.max(1) as f32).ln() * 1.4;
    (base * scale.sqrt()).clamp(0.6, 9.0)
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn heavier_edges_draw_thicker_but_bounded() {
        assert!(edge_width(1, 1.0) < edge_width(5, 1.0));
        assert!(edge_width(5, 1.0) < edge_width(50, 1.0));
        assert_eq!(edge_width(1_000_000, 8.0), 9.0);
    }

    #[test]
    fn offscreen_shapes_are_culled() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(100.0, 100.0));
        assert!(circle_visible(rect, pos2(-4.0, 50.0), 5.0));
        assert!(!circle_visible(rect, pos2(-6.0, 50.0), 5.0));
        assert!(segment_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 1.0));
        assert!(!segment_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, -5.0), 1.0));
    }
}
