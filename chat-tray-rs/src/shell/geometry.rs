//! Screen-space geometry primitives.
//!
//! All coordinates are physical pixels in virtual-screen space, matching
//! what the tray icon and the OS monitor APIs report.

/// Position in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [i32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Window or icon extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

impl From<[i32; 2]> for Size {
    fn from([width, height]: [i32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<Size> for [i32; 2] {
    fn from(s: Size) -> Self {
        [s.width, s.height]
    }
}

/// Rectangle in screen coordinates, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(position: Point, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    /// Zero-sized rectangle at a point. Used as a tray anchor where the
    /// platform cannot report icon bounds.
    pub fn at_point(point: Point) -> Self {
        Self::new(point.x, point.y, 0, 0)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Edge-inclusive hit test: a cursor resting on the border counts as inside.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// True if `other` lies entirely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_edge_inclusive() {
        let rect = Rect::new(10, 20, 40, 30);
        assert!(rect.contains(Point::new(10, 20)));
        assert!(rect.contains(Point::new(50, 50)));
        assert!(!rect.contains(Point::new(51, 50)));
        assert!(!rect.contains(Point::new(30, 19)));
    }

    #[test]
    fn test_zero_sized_anchor_contains_only_its_point() {
        let anchor = Rect::at_point(Point::new(5, 5));
        assert!(anchor.contains(Point::new(5, 5)));
        assert!(!anchor.contains(Point::new(6, 5)));
    }

    #[test]
    fn test_contains_rect() {
        let outer = Rect::new(0, 0, 1920, 1040);
        assert!(outer.contains_rect(&Rect::new(1500, 580, 420, 460)));
        assert!(!outer.contains_rect(&Rect::new(1501, 580, 420, 460)));
    }
}
