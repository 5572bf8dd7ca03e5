//! Horizontal paging between slides and the drag gesture that drives it.
//!
//! A gesture moves Idle -> Dragging -> (Commit | Cancel) -> Idle. A vertical
//! drag cancels on the spot; every other gesture is settled on release.

/// Share of the viewport width a slow drag must cover to turn the page.
pub const COMMIT_DISTANCE_RATIO: f64 = 0.18;
/// Shortest drag that can still turn the page as a flick.
pub const FLICK_MIN_DISTANCE: f64 = 10.0;
/// Release speed, in px/ms, that makes a short drag a flick.
pub const FLICK_MIN_VELOCITY: f64 = 0.6;
pub const MIN_SLIDE_HEIGHT: f64 = 80.0;
pub const MISSING_SLIDE_HEIGHT: f64 = 120.0;
pub const TRACK_TRANSITION: &str = "transform .26s ease";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub start: Point,
    pub current_x: f64,
    pub last_move_at: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragState),
}

/// What a pointer move did to the gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEffect {
    /// No gesture in flight.
    Ignored,
    /// Horizontal drag; the caller must suppress the default scroll.
    Tracking { offset: f64 },
    /// Judged a vertical scroll: snapped back and released.
    Canceled,
}

impl DragEffect {
    pub fn locks_scroll(&self) -> bool {
        matches!(self, DragEffect::Tracking { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDecision {
    Next,
    Previous,
    Stay,
}

impl SwipeDecision {
    pub fn target(self, current: usize) -> i64 {
        let current = current as i64;
        match self {
            SwipeDecision::Next => current + 1,
            SwipeDecision::Previous => current - 1,
            SwipeDecision::Stay => current,
        }
    }
}

/// Distance-or-flick rule. A leftward drag (`dx < 0`) advances.
pub fn decide(dx: f64, velocity: f64, width: f64) -> SwipeDecision {
    let threshold = width * COMMIT_DISTANCE_RATIO;
    let flick = velocity > FLICK_MIN_VELOCITY;
    if dx < -threshold || (dx < -FLICK_MIN_DISTANCE && flick) {
        SwipeDecision::Next
    } else if dx > threshold || (dx > FLICK_MIN_DISTANCE && flick) {
        SwipeDecision::Previous
    } else {
        SwipeDecision::Stay
    }
}

/// Track translation and whether it should ease into place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackStyle {
    pub offset: f64,
    pub animated: bool,
}

impl TrackStyle {
    pub fn to_css(&self) -> String {
        format!(
            "transition: {}; transform: translate3d({}px,0,0);",
            if self.animated { TRACK_TRANSITION } else { "none" },
            self.offset
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pager {
    width: f64,
    gesture: Gesture,
    track: TrackStyle,
    height: f64,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new()
    }
}

impl Pager {
    pub fn new() -> Self {
        Self {
            width: 1.0,
            gesture: Gesture::Idle,
            track: TrackStyle {
                offset: 0.0,
                animated: false,
            },
            height: MISSING_SLIDE_HEIGHT,
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn track(&self) -> TrackStyle {
        self.track
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    fn offset_for(&self, index: usize) -> f64 {
        -(index as f64) * self.width
    }

    /// Moves the track to `index`, easing unless `animated` is false.
    pub fn settle(&mut self, index: usize, animated: bool) {
        self.track = TrackStyle {
            offset: self.offset_for(index),
            animated,
        };
    }

    /// Pointer down: any earlier gesture is dropped and tracking becomes 1:1.
    pub fn press(&mut self, point: Point, now: f64) {
        self.gesture = Gesture::Dragging(DragState {
            start: point,
            current_x: point.x,
            last_move_at: now,
        });
        self.track.animated = false;
    }

    pub fn drag(&mut self, point: Point, now: f64, index: usize) -> DragEffect {
        let Gesture::Dragging(mut state) = self.gesture else {
            return DragEffect::Ignored;
        };

        let dx = point.x - state.start.x;
        let dy = point.y - state.start.y;
        if dy.abs() > dx.abs() {
            self.gesture = Gesture::Idle;
            self.settle(index, false);
            return DragEffect::Canceled;
        }

        state.current_x = point.x;
        state.last_move_at = now;
        self.gesture = Gesture::Dragging(state);

        let offset = self.offset_for(index) + dx;
        self.track = TrackStyle {
            offset,
            animated: false,
        };
        DragEffect::Tracking { offset }
    }

    /// Pointer up. `None` when no gesture was in flight.
    pub fn release(&mut self, now: f64) -> Option<SwipeDecision> {
        let Gesture::Dragging(state) = self.gesture else {
            return None;
        };
        self.gesture = Gesture::Idle;

        let dx = state.current_x - state.start.x;
        let elapsed = (now - state.last_move_at).max(1.0);
        let velocity = dx.abs() / elapsed;
        Some(decide(dx, velocity, self.width))
    }

    /// Drops an in-flight gesture, e.g. after the slides were rebuilt.
    pub fn abandon(&mut self) {
        self.gesture = Gesture::Idle;
    }

    /// New viewport width; snaps to `index` without easing.
    pub fn resize(&mut self, width: f64, index: usize) {
        self.width = if width > 0.0 { width } else { 1.0 };
        self.settle(index, false);
    }

    /// Fits the viewport to the active slide's measured height, if any.
    pub fn fit_height(&mut self, measured: Option<f64>) -> f64 {
        self.height = match measured {
            Some(height) => height.ceil().max(MIN_SLIDE_HEIGHT),
            None => MISSING_SLIDE_HEIGHT,
        };
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f64 = 400.0;

    fn pager_at_width() -> Pager {
        let mut pager = Pager::new();
        pager.resize(WIDTH, 0);
        pager
    }

    fn swipe(pager: &mut Pager, dx: f64, move_at: f64, release_at: f64) -> Option<SwipeDecision> {
        pager.press(Point::new(200.0, 50.0), 0.0);
        pager.drag(Point::new(200.0 + dx, 50.0), move_at, 1);
        pager.release(release_at)
    }

    #[test]
    fn press_starts_untransitioned_drag() {
        let mut pager = pager_at_width();
        pager.settle(1, true);
        pager.press(Point::new(10.0, 10.0), 5.0);

        assert!(matches!(pager.gesture(), Gesture::Dragging(_)));
        assert!(!pager.track().animated);
    }

    #[test]
    fn horizontal_move_tracks_one_to_one() {
        let mut pager = pager_at_width();
        pager.press(Point::new(200.0, 50.0), 0.0);
        let effect = pager.drag(Point::new(170.0, 55.0), 16.0, 2);

        assert_eq!(effect, DragEffect::Tracking { offset: -830.0 });
        assert!(effect.locks_scroll());
        assert_eq!(
            pager.track(),
            TrackStyle {
                offset: -830.0,
                animated: false
            }
        );
    }

    #[test]
    fn vertical_move_cancels_and_snaps_back() {
        let mut pager = pager_at_width();
        pager.press(Point::new(200.0, 50.0), 0.0);
        pager.drag(Point::new(190.0, 52.0), 10.0, 1);
        let effect = pager.drag(Point::new(185.0, 90.0), 20.0, 1);

        assert_eq!(effect, DragEffect::Canceled);
        assert!(!effect.locks_scroll());
        assert_eq!(pager.gesture(), Gesture::Idle);
        assert_eq!(pager.track().offset, -WIDTH);
        assert_eq!(pager.release(30.0), None);
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let mut pager = pager_at_width();
        assert_eq!(pager.drag(Point::new(1.0, 1.0), 1.0, 0), DragEffect::Ignored);
        assert_eq!(pager.release(2.0), None);
    }

    #[test]
    fn distance_threshold() {
        let threshold = WIDTH * COMMIT_DISTANCE_RATIO;
        let mut pager = pager_at_width();

        assert_eq!(swipe(&mut pager, -(threshold + 0.5), 0.0, 1000.0), Some(SwipeDecision::Next));
        assert_eq!(swipe(&mut pager, threshold + 0.5, 0.0, 1000.0), Some(SwipeDecision::Previous));
        assert_eq!(swipe(&mut pager, -(threshold - 0.5), 0.0, 1000.0), Some(SwipeDecision::Stay));
        assert_eq!(swipe(&mut pager, threshold - 0.5, 0.0, 1000.0), Some(SwipeDecision::Stay));
    }

    #[test]
    fn quick_flick_commits_under_distance() {
        let mut pager = pager_at_width();
        // 15 px over 10 ms is 1.5 px/ms.
        assert_eq!(swipe(&mut pager, -15.0, 0.0, 10.0), Some(SwipeDecision::Next));
        assert_eq!(swipe(&mut pager, 15.0, 0.0, 10.0), Some(SwipeDecision::Previous));
    }

    #[test]
    fn flick_needs_minimum_distance() {
        let mut pager = pager_at_width();
        assert_eq!(swipe(&mut pager, -8.0, 0.0, 1.0), Some(SwipeDecision::Stay));
    }

    #[test]
    fn release_without_move_stays() {
        let mut pager = pager_at_width();
        pager.press(Point::new(100.0, 100.0), 0.0);
        assert_eq!(pager.release(0.0), Some(SwipeDecision::Stay));
    }

    #[test]
    fn decision_targets() {
        assert_eq!(SwipeDecision::Next.target(2), 3);
        assert_eq!(SwipeDecision::Previous.target(0), -1);
        assert_eq!(SwipeDecision::Stay.target(1), 1);
    }

    #[test]
    fn resize_snaps_without_easing() {
        let mut pager = pager_at_width();
        pager.settle(2, true);
        pager.resize(300.0, 2);
        assert_eq!(
            pager.track(),
            TrackStyle {
                offset: -600.0,
                animated: false
            }
        );

        pager.resize(0.0, 2);
        assert_eq!(pager.width(), 1.0);
    }

    #[test]
    fn height_has_floor_and_fallback() {
        let mut pager = Pager::new();
        assert_eq!(pager.fit_height(Some(312.2)), 313.0);
        assert_eq!(pager.fit_height(Some(20.0)), MIN_SLIDE_HEIGHT);
        assert_eq!(pager.fit_height(None), MISSING_SLIDE_HEIGHT);
    }

    #[test]
    fn track_css() {
        let style = TrackStyle {
            offset: -400.0,
            animated: true,
        };
        assert_eq!(
            style.to_css(),
            "transition: transform .26s ease; transform: translate3d(-400px,0,0);"
        );
        assert!(TrackStyle {
            offset: 0.0,
            animated: false
        }
        .to_css()
        .starts_with("transition: none;"));
    }
}
