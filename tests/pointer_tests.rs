use hover_scene::input::{InputTracker, PointerState, Viewport};

fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[cfg(test)]
mod pointer_normalization_tests {
    use super::*;

    #[test]
    fn test_corners_map_to_ndc_extremes() {
        let viewport = Viewport::new(800.0, 600.0, 1.0);

        let top_left = PointerState::from_client(0.0, 0.0, &viewport);
        assert_close(top_left.x, -1.0);
        assert_close(top_left.y, 1.0);

        let bottom_right = PointerState::from_client(800.0, 600.0, &viewport);
        assert_close(bottom_right.x, 1.0);
        assert_close(bottom_right.y, -1.0);

        let center = PointerState::from_client(400.0, 300.0, &viewport);
        assert_close(center.x, 0.0);
        assert_close(center.y, 0.0);
    }

    #[test]
    fn test_formula_holds_across_sizes() {
        let cases = [
            (10.0, 20.0, 100.0, 50.0),
            (1919.0, 3.0, 1920.0, 1080.0),
            (0.5, 0.5, 1.0, 1.0),
            (333.0, 777.0, 640.0, 960.0),
        ];

        for (px, py, w, h) in cases {
            let pointer = PointerState::from_client(px, py, &Viewport::new(w, h, 1.0));
            assert_close(pointer.x, (px / w) * 2.0 - 1.0);
            assert_close(pointer.y, -(py / h) * 2.0 + 1.0);
        }
    }

    #[test]
    fn test_outside_viewport_is_not_clamped() {
        let viewport = Viewport::new(100.0, 100.0, 1.0);
        let pointer = PointerState::from_client(150.0, -50.0, &viewport);
        assert_close(pointer.x, 2.0);
        assert_close(pointer.y, 2.0);
    }

    #[test]
    fn test_tracker_stores_latest_position() {
        let viewport = Viewport::new(200.0, 100.0, 2.0);
        let mut tracker = InputTracker::new();

        tracker.pointer_moved(50.0, 25.0, &viewport);
        tracker.pointer_moved(150.0, 75.0, &viewport);

        assert_eq!(tracker.pointer(), PointerState::from_client(150.0, 75.0, &viewport));
        assert_close(tracker.pointer().x, 0.5);
        assert_close(tracker.pointer().y, -0.5);
    }
}
