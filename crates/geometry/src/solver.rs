//! Aspect-ratio and minimum-size resize solver
//!
//! The ratio is held against the content area: the chrome strip adds to
//! the total height without taking part in the ratio. Every function here
//! is pure and runs exactly one corrective pass per call.

use crate::Size;

/// Axis reported as changed by a resize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

/// Inputs to a single resize correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    /// width / height of the content area
    pub ratio: f64,
    pub min_width: i32,
    pub min_height: i32,
    /// Chrome height when the chrome is shown, zero otherwise
    pub chrome_offset: i32,
}

impl Constraints {
    /// Derive the axis that did not change from the one that did.
    ///
    /// The result is clamped to its own minimum. The driving axis is not
    /// re-derived from a clamped result; the next user event corrects it.
    pub fn solve(&self, changed: Axis, value: i32) -> i32 {
        match changed {
            Axis::Width => {
                let height =
                    round_px(f64::from(value) / self.ratio).saturating_add(self.chrome_offset);
                height.max(self.min_height)
            }
            Axis::Height => {
                let content = value.saturating_sub(self.chrome_offset);
                let width = round_px(f64::from(content) * self.ratio);
                width.max(self.min_width)
            }
        }
    }
}

/// Minimum (width, height) for a selection.
///
/// Only one axis is scaled: height keeps `min_size` and width follows the
/// ratio. A square selection keeps `min_size` on both. Neither floor drops
/// below one pixel.
pub fn min_size_for(region: Size, ratio: f64, min_size: i32) -> (i32, i32) {
    let min_size = min_size.max(1);
    if region.width != region.height {
        (round_px(f64::from(min_size) * ratio).max(1), min_size)
    } else {
        (min_size, min_size)
    }
}

/// Initial overlay size for a selection on a display.
///
/// Each axis is capped to `percentage` of the display independently, the
/// other axis being recomputed from the ratio after each cap.
pub fn default_size_for(region: Size, display: Size, ratio: f64, percentage: f64) -> (i32, i32) {
    let mut width = region.width as i32;
    let mut height = region.height as i32;

    let max_height = f64::from(display.height) * percentage;
    if f64::from(height) > max_height {
        height = max_height.floor() as i32;
        width = round_px(f64::from(height) * ratio);
    }

    let max_width = f64::from(display.width) * percentage;
    if f64::from(width) > max_width {
        width = max_width.floor() as i32;
        height = round_px(f64::from(width) / ratio);
    }

    (width, height)
}

/// Round half away from zero to whole pixels, saturating at the `i32` range.
pub(crate) fn round_px(value: f64) -> i32 {
    value.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATIO_16_9: f64 = 1920.0 / 1080.0;

    fn hidden(ratio: f64) -> Constraints {
        Constraints {
            ratio,
            min_width: 178,
            min_height: 100,
            chrome_offset: 0,
        }
    }

    #[test]
    fn width_drives_height() {
        assert_eq!(hidden(RATIO_16_9).solve(Axis::Width, 300), 169);
        assert_eq!(hidden(RATIO_16_9).solve(Axis::Width, 480), 270);
    }

    #[test]
    fn height_drives_width() {
        assert_eq!(hidden(RATIO_16_9).solve(Axis::Height, 270), 480);
        assert_eq!(hidden(RATIO_16_9).solve(Axis::Height, 169), 300);
    }

    #[test]
    fn chrome_is_outside_the_ratio() {
        let c = Constraints {
            chrome_offset: 30,
            min_height: 130,
            ..hidden(RATIO_16_9)
        };
        assert_eq!(c.solve(Axis::Width, 300), 199);
        assert_eq!(c.solve(Axis::Height, 199), 300);
    }

    #[test]
    fn derived_axis_is_clamped_without_feedback() {
        let c = Constraints {
            ratio: 0.25,
            min_width: 25,
            min_height: 100,
            chrome_offset: 0,
        };
        // 20 / 0.25 = 80, below the 100 floor
        assert_eq!(c.solve(Axis::Width, 20), 100);
        // 40 * 0.25 = 10, below the 25 floor
        assert_eq!(c.solve(Axis::Height, 40), 25);
    }

    #[test]
    fn extreme_ratios_saturate_instead_of_overflowing() {
        let tall = Constraints {
            ratio: 1.0 / 100_000.0,
            min_width: 1,
            min_height: 130,
            chrome_offset: 30,
        };
        assert_eq!(tall.solve(Axis::Width, 30_000), i32::MAX);
        assert_eq!(tall.solve(Axis::Height, i32::MIN), 1);

        let wide = Constraints {
            ratio: 100_000.0,
            min_width: 10_000_000,
            min_height: 100,
            chrome_offset: 30,
        };
        assert_eq!(wide.solve(Axis::Height, i32::MAX), i32::MAX);
    }

    #[test]
    fn min_size_never_rounds_to_zero() {
        assert_eq!(min_size_for(Size::new(1, 100_000), 1e-5, 100), (1, 100));
        assert_eq!(min_size_for(Size::new(10, 10), 1.0, 0), (1, 1));
    }

    #[test]
    fn min_size_landscape_scales_width() {
        assert_eq!(min_size_for(Size::new(1920, 1080), RATIO_16_9, 100), (178, 100));
    }

    #[test]
    fn min_size_portrait_scales_width_down() {
        assert_eq!(min_size_for(Size::new(100, 400), 0.25, 100), (25, 100));
    }

    #[test]
    fn min_size_square_is_unscaled() {
        assert_eq!(min_size_for(Size::new(500, 500), 1.0, 100), (100, 100));
    }

    #[test]
    fn default_size_caps_height_first() {
        let size = default_size_for(
            Size::new(1920, 1080),
            Size::new(1920, 1080),
            RATIO_16_9,
            0.25,
        );
        assert_eq!(size, (480, 270));
    }

    #[test]
    fn default_size_caps_width_after_height() {
        // Very wide strip: height fits, width does not.
        let ratio = 1800.0 / 100.0;
        let size = default_size_for(Size::new(1800, 100), Size::new(1920, 1080), ratio, 0.25);
        assert_eq!(size, (480, 27));
    }

    #[test]
    fn default_size_leaves_small_selection_alone() {
        let size = default_size_for(Size::new(320, 200), Size::new(1920, 1080), 1.6, 0.25);
        assert_eq!(size, (320, 200));
    }
}
