//! Subscriber identifier generation from a closed numeric range

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A closed range of numeric identifiers rendered at a fixed digit width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierRange {
    start: u64,
    end: u64,
    width: usize,
}

impl IdentifierRange {
    /// Digits in `u64::MAX`
    pub const MAX_WIDTH: usize = 20;

    /// Build a range, rejecting bounds that could produce out-of-range or
    /// wrongly sized identifiers.
    pub fn new(start: u64, end: u64, width: usize) -> Result<Self> {
        if start > end {
            return Err(CoreError::InvalidRange(format!(
                "start {} is greater than end {}",
                start, end
            )));
        }
        if width == 0 || width > Self::MAX_WIDTH {
            return Err(CoreError::InvalidRange(format!(
                "width must be between 1 and {}, got {}",
                Self::MAX_WIDTH,
                width
            )));
        }
        let end_digits = digit_count(end);
        if end_digits > width {
            return Err(CoreError::InvalidRange(format!(
                "end {} has {} digits, which does not fit width {}",
                end, end_digits, width
            )));
        }

        Ok(Self { start, end, width })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of identifiers in the range
    pub fn len(&self) -> u128 {
        u128::from(self.end - self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Draw a uniformly random identifier
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let offset = rng.random_range(0..=self.end - self.start);
        self.render(self.start + offset)
    }

    /// Zero-pad a value to the range width
    pub fn render(&self, value: u64) -> String {
        format!("{:0width$}", value, width = self.width)
    }

    /// Whether `identifier` is a well-formed member of this range
    pub fn contains(&self, identifier: &str) -> bool {
        identifier.len() == self.width
            && identifier.bytes().all(|b| b.is_ascii_digit())
            && identifier
                .parse::<u64>()
                .map(|v| v >= self.start && v <= self.end)
                .unwrap_or(false)
    }
}

/// Order in which identifiers are taken from the range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DrawOrder {
    /// Uniform random sampling
    #[default]
    Random,
    /// Walk the range from `start`, wrapping after `end`
    Sequential,
}

/// Stateful identifier source owned by a single job factory
#[derive(Debug, Clone)]
pub struct IdentifierSource {
    range: IdentifierRange,
    order: DrawOrder,
    cursor: u64,
}

impl IdentifierSource {
    pub fn new(range: IdentifierRange, order: DrawOrder) -> Self {
        Self {
            range,
            order,
            cursor: range.start(),
        }
    }

    pub fn range(&self) -> &IdentifierRange {
        &self.range
    }

    /// Produce the next identifier
    pub fn next_id<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        match self.order {
            DrawOrder::Random => self.range.draw(rng),
            DrawOrder::Sequential => {
                let value = self.cursor;
                self.cursor = if value == self.range.end() {
                    self.range.start()
                } else {
                    value + 1
                };
                self.range.render(value)
            }
        }
    }
}

fn digit_count(mut value: u64) -> usize {
    let mut digits = 1;
    while value >= 10 {
        value /= 10;
        digits += 1;
    }
    digits
}
