//! Command-line interface for `pip-tool`.

use std::time::Duration;

use clap::Parser;
use geometry::{GeometryResult, PipConfig, Rect};

/// Command-line interface for the `pip-tool` binary.
#[derive(Parser, Debug)]
#[command(
    name = "pip-tool",
    about = "Picture-in-picture overlay for any window",
    version
)]
pub struct Cli {
    /// Mirror the first window whose title contains this text (case-insensitive).
    /// Without it, the window in the foreground after the countdown is used.
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Mirror only this part of the source window, in window-relative pixels.
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_region)]
    pub region: Option<Rect>,

    /// Seconds to wait before taking the foreground window as the source.
    #[arg(long, default_value_t = 3, value_name = "SECS")]
    pub countdown: u64,

    /// Height of the hover chrome strip.
    #[arg(long, default_value_t = PipConfig::CHROME_HEIGHT, value_name = "PX")]
    pub chrome_height: i32,

    /// Thumbnail opacity, 0 (transparent) to 255 (opaque).
    #[arg(long, default_value_t = 255)]
    pub opacity: u8,

    /// Delay before re-checking the cursor after it leaves the overlay.
    #[arg(long, default_value_t = 50, value_name = "MS")]
    pub hover_settle_ms: u64,

    /// Floor for the overlay's short side.
    #[arg(long, default_value_t = PipConfig::MIN_SIZE, value_name = "PX")]
    pub min_size: i32,

    /// Largest share of the display the initial overlay may take on each axis.
    #[arg(long, default_value_t = PipConfig::DEFAULT_SIZE_PERCENTAGE, value_name = "FRACTION")]
    pub default_size_percentage: f64,

    /// Initial left edge of the overlay.
    #[arg(long, default_value_t = PipConfig::INITIAL_POSITION.0, allow_hyphen_values = true)]
    pub left: i32,

    /// Initial top edge of the overlay.
    #[arg(long, default_value_t = PipConfig::INITIAL_POSITION.1, allow_hyphen_values = true)]
    pub top: i32,

    /// Enable debug logging; `RUST_LOG` then overrides the level.
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Validated session configuration from the flags.
    pub fn to_config(&self) -> GeometryResult<PipConfig> {
        let config = PipConfig {
            min_size: self.min_size,
            chrome_height: self.chrome_height,
            default_size_percentage: self.default_size_percentage,
            initial_position: (self.left, self.top),
            hover_settle: Duration::from_millis(self.hover_settle_ms),
            opacity: self.opacity,
        };
        config.validate()?;
        Ok(config)
    }

    #[cfg_attr(not(windows), allow(dead_code))]
    pub fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown)
    }
}

fn parse_region(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, w, h] = parts.as_slice() else {
        return Err(format!("expected X,Y,W,H, got {s:?}"));
    };

    let coord = |v: &str| v.parse::<i32>().map_err(|e| format!("{v:?}: {e}"));
    let extent = |v: &str| v.parse::<u32>().map_err(|e| format!("{v:?}: {e}"));

    let rect = Rect::new(coord(x)?, coord(y)?, extent(w)?, extent(h)?);
    if rect.is_empty() {
        return Err("region width and height must be non-zero".to_string());
    }
    Ok(rect)
}
