//! Segment intersection tests used to find where the path travelled by the ball during one step enters a paddle.

/// Parallel segments have a cross product below this value.
const PARALLEL_EPSILON: f64 = 1.0e-10;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }
}

/// Axis-aligned rectangle, `(x, y)` being its top-left corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Whether the point is inside the rectangle or on its border.
    pub fn contains(&self, point: Point) -> bool {
        self.x <= point.x
            && point.x <= self.x + self.width
            && self.y <= point.y
            && point.y <= self.y + self.height
    }

    /// Left, right, top and bottom edges, in this order.
    fn edges(&self) -> [(Point, Point); 4] {
        let (left, right) = (self.x, self.x + self.width);
        let (top, bottom) = (self.y, self.y + self.height);
        [
            (Point::new(left, top), Point::new(left, bottom)),
            (Point::new(right, top), Point::new(right, bottom)),
            (Point::new(left, top), Point::new(right, top)),
            (Point::new(left, bottom), Point::new(right, bottom)),
        ]
    }
}

/// Intersection of segments `[p1, p2]` and `[p3, p4]`, as the fraction of `[p1, p2]` travelled to reach it.
///
/// Parallel segments never intersect, including overlapping collinear ones.
pub fn segment_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<f64> {
    let denominator = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if denominator.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / denominator;
    let u = -((p1.x - p2.x) * (p1.y - p3.y) - (p1.y - p2.y) * (p1.x - p3.x)) / denominator;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// Point where the travel from `start` to `end` hits the rectangle, if it does.
///
/// * If `end` already lies in the rectangle, it is returned as is.
/// * Otherwise, the crossing of the rectangle's border nearest to `start` is returned.
pub fn sweep_into_rect(start: Point, end: Point, rect: &Rect) -> Option<Point> {
    if rect.contains(end) {
        return Some(end);
    }
    rect.edges()
        .into_iter()
        .filter_map(|(a, b)| segment_intersection(start, end, a, b))
        .min_by(f64::total_cmp)
        .map(|t| Point::new(start.x + t * (end.x - start.x), start.y + t * (end.y - start.y)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BIAS: f64 = 1.0e-9;

    const RECT: Rect = Rect {
        x: 25.0,
        y: 245.0,
        width: 15.0,
        height: 110.0,
    };

    #[test]
    fn crossing_segments() {
        let t = segment_intersection(
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 0.0),
        );
        assert!(matches!(t, Some(t) if (t - 0.5).abs() < BIAS));
    }

    #[test]
    fn disjoint_and_parallel_segments() {
        let (a, b) = (Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(
            segment_intersection(a, b, Point::new(0.0, 1.0), Point::new(10.0, 1.0)),
            None
        );
        assert_eq!(
            segment_intersection(a, b, Point::new(11.0, -1.0), Point::new(11.0, 1.0)),
            None
        );
    }

    #[test]
    fn endpoint_inside_is_a_hit() {
        let end = Point::new(30.0, 300.0);
        assert_eq!(sweep_into_rect(Point::new(45.0, 300.0), end, &RECT), Some(end));
    }

    #[test]
    fn fast_travel_through_the_rect_is_caught() {
        // Far more than the width of the rect in one step.
        let hit = sweep_into_rect(Point::new(200.0, 300.0), Point::new(-300.0, 300.0), &RECT)
            .expect("the ball went through the paddle");
        assert!((hit.x - 40.0).abs() < BIAS && (hit.y - 300.0).abs() < BIAS);
    }

    #[test]
    fn nearest_crossing_wins() {
        // Diagonal travel entering through the top edge before reaching the left edge.
        let hit = sweep_into_rect(Point::new(20.0, 235.0), Point::new(50.0, 265.0), &RECT)
            .expect("the travel crosses the rect");
        assert!((hit.x - 30.0).abs() < BIAS && (hit.y - 245.0).abs() < BIAS);
    }

    #[test]
    fn miss() {
        assert_eq!(
            sweep_into_rect(Point::new(200.0, 100.0), Point::new(-100.0, 120.0), &RECT),
            None
        );
    }
}
