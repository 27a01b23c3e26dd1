//! Screen rectangles in virtual-desktop pixel coordinates.
//!
//! Origins are signed: a monitor placed left of or above the primary one has
//! negative coordinates, and nothing here clamps them.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds the rectangle spanned by two opposite corners, in either order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            width: a.x.abs_diff(b.x),
            height: a.y.abs_diff(b.y),
        }
    }

    /// Rejects rectangles that no encoder can open a stream for.
    pub fn validate(&self) -> Result<(), RegionError> {
        if self.width == 0 || self.height == 0 {
            return Err(RegionError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// One past the last column, widened so large extents cannot overflow.
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    /// The overlapping part of two rectangles, or `None` if they only touch
    /// or are disjoint.
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left as i64 || bottom <= top as i64 {
            return None;
        }
        Some(Region::new(
            left,
            top,
            (right - left as i64) as u32,
            (bottom - top as i64) as u32,
        ))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.left, self.top
        )
    }
}

/// Parses `left,top,width,height`.
impl FromStr for Region {
    type Err = RegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(RegionError::Malformed(s.to_string()));
        }
        let malformed = |_| RegionError::Malformed(s.to_string());
        Ok(Region {
            left: parts[0].parse().map_err(malformed)?,
            top: parts[1].parse().map_err(malformed)?,
            width: parts[2].parse().map_err(malformed)?,
            height: parts[3].parse().map_err(malformed)?,
        })
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("Region has zero width or height ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },

    #[error("Expected LEFT,TOP,WIDTH,HEIGHT but got {0:?}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_normalize_to_min_origin_and_abs_extent() {
        let region = Region::from_corners(Point::new(100, 500), Point::new(400, 300));
        assert_eq!(region, Region::new(100, 300, 300, 200));
    }

    #[test]
    fn corner_order_does_not_matter() {
        let pairs = [
            (Point::new(-50, 20), Point::new(30, -10)),
            (Point::new(0, 0), Point::new(1920, 1080)),
            (Point::new(7, 7), Point::new(7, 7)),
        ];
        for (a, b) in pairs {
            let forward = Region::from_corners(a, b);
            let backward = Region::from_corners(b, a);
            assert_eq!(forward, backward);
            assert_eq!(forward.left, a.x.min(b.x));
            assert_eq!(forward.top, a.y.min(b.y));
            assert_eq!(forward.width as i64, (b.x as i64 - a.x as i64).abs());
            assert_eq!(forward.height as i64, (b.y as i64 - a.y as i64).abs());
        }
    }

    #[test]
    fn negative_origin_is_kept() {
        let region = Region::from_corners(Point::new(-1920, -200), Point::new(-900, 400));
        assert_eq!(region, Region::new(-1920, -200, 1020, 600));
        assert!(region.validate().is_ok());
    }

    #[test]
    fn zero_extent_is_rejected() {
        assert_eq!(
            Region::new(10, 10, 0, 50).validate(),
            Err(RegionError::ZeroDimension {
                width: 0,
                height: 50
            })
        );
        assert!(Region::new(10, 10, 50, 0).validate().is_err());
    }

    #[test]
    fn intersection_clips_to_the_shared_area() {
        let left_monitor = Region::new(-1280, -200, 1280, 1024);
        let call = Region::new(-300, 100, 900, 700);
        assert_eq!(
            call.intersection(&left_monitor),
            Some(Region::new(-300, 100, 300, 700))
        );
        assert_eq!(
            left_monitor.intersection(&call),
            call.intersection(&left_monitor)
        );

        let primary = Region::new(0, 0, 1920, 1080);
        assert_eq!(call.intersection(&primary), Some(Region::new(0, 100, 600, 700)));
    }

    #[test]
    fn touching_or_disjoint_regions_do_not_intersect() {
        let a = Region::new(0, 0, 100, 100);
        assert_eq!(a.intersection(&Region::new(100, 0, 50, 50)), None);
        assert_eq!(a.intersection(&Region::new(0, 100, 50, 50)), None);
        assert_eq!(a.intersection(&Region::new(-500, -500, 10, 10)), None);
    }

    #[test]
    fn parses_comma_separated_region() {
        let region: Region = "500, 200,900,700".parse().unwrap();
        assert_eq!(region, Region::new(500, 200, 900, 700));
        assert!("1,2,3".parse::<Region>().is_err());
        assert!("a,2,3,4".parse::<Region>().is_err());
        assert!("1,2,-3,4".parse::<Region>().is_err());
    }
}
