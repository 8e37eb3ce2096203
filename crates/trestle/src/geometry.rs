//! Geometric primitives for layout.
//!
//! Coordinates follow SVG: origin at the top-left, X grows rightward and
//! Y grows downward.

/// A 2D point in diagram space.
///
/// # Examples
///
/// ```
/// # use trestle::geometry::Point;
/// let p = Point::new(10.0, 20.0).add_point(Point::new(5.0, 5.0));
/// assert_eq!(p.x(), 15.0);
/// assert_eq!(p.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    pub fn add_point(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub(crate) fn sub_point(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }

    pub(crate) fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub(crate) fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }
}

/// An axis-aligned rectangle given by its minimum and maximum coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a center point and a size
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the top-left corner as a Point
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// The smallest bounds containing both `self` and `other`.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Where a ray from the center towards `target` leaves the rectangle.
    ///
    /// Returns the center itself when `target` coincides with it.
    pub fn exit_point(&self, target: Point) -> Point {
        let center = self.center();
        let direction = target.sub_point(center);
        if direction.is_zero() {
            return center;
        }

        let half_width = self.width() / 2.0;
        let half_height = self.height() / 2.0;
        let tx = if direction.x() == 0.0 {
            f32::INFINITY
        } else {
            half_width / direction.x().abs()
        };
        let ty = if direction.y() == 0.0 {
            f32::INFINITY
        } else {
            half_height / direction.y().abs()
        };

        center.add_point(direction.scale(tx.min(ty)))
    }
}
