//! Pixel-coordinate extraction from free-text vision replies.
//!
//! Vision models are asked for "only x,y pixel coordinates" but answer in
//! prose often enough that the parser only looks for the first two runs of
//! decimal digits, left to right.  Bounds are not checked here.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    /// Fewer than two integers in the reply.
    #[error("no coordinates found")]
    NotFound,

    /// A digit run too long to be a pixel index.
    #[error("coordinate out of range: {0}")]
    OutOfRange(String),
}

/// An `(x, y)` pixel position reported by one camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoordinate {
    pub x: i64,
    pub y: i64,
}

impl PixelCoordinate {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for PixelCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i64, i64)> for PixelCoordinate {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Extract the first two decimal integers in `reply` as `(x, y)`.
///
/// ```
/// use waldo_assistant::vision::{parse_coords, PixelCoordinate};
///
/// let p = parse_coords("I see it around 45, 60 pixels").unwrap();
/// assert_eq!(p, PixelCoordinate::new(45, 60));
/// assert!(parse_coords("I cannot locate it").is_err());
/// ```
pub fn parse_coords(reply: &str) -> Result<PixelCoordinate, CoordError> {
    let mut numbers = INTEGER_RE.find_iter(reply).map(|m| {
        m.as_str()
            .parse::<i64>()
            .map_err(|_| CoordError::OutOfRange(m.as_str().to_string()))
    });

    match (numbers.next(), numbers.next()) {
        (Some(x), Some(y)) => Ok(PixelCoordinate::new(x?, y?)),
        _ => Err(CoordError::NotFound),
    }
}
