//! # Filter Planner
//!
//! Computes the ffmpeg `-vf` filter graph that turns a source resolution into
//! the configured aspect ratio and output size.
//!
//! The planner is a pure function: no I/O, no state. A source whose ratio is
//! within `epsilon` of the target is only scaled. Anything else is first
//! center-cropped along its longer axis, then scaled:
//!
//! ```text
//! 1920x1080 -> 4:3 @ 960x720   crop=1440:1080:240:0,scale=960:720
//!  640x480  -> 4:3 @ 960x720   scale=960:720
//! 1080x1920 -> 4:3 @ 960x720   crop=1080:810:0:555,scale=960:720
//! ```
//!
//! Crop sizes are rounded half-to-even and offsets truncated, so a crop may be
//! one pixel away from the exact ratio. That is accepted and not corrected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default tolerance for treating a source as already having the target ratio
pub const DEFAULT_RATIO_EPSILON: f64 = 1e-3;

/// Width and height of a video stream, both strictly positive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Target aspect ratio, written `4:3` on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Filename-safe form, e.g. `4x3`
    pub fn tag(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self { width: 4, height: 3 }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = parse_pair(s, &[':', 'x', '/'])
            .ok_or_else(|| format!("invalid aspect ratio '{}', expected W:H (e.g. 4:3)", s))?;
        Ok(Self { width, height })
    }
}

/// Output resolution, written `960x720` on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl Default for TargetSize {
    fn default() -> Self {
        Self { width: 960, height: 720 }
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for TargetSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (width, height) = parse_pair(s, &['x', ':'])
            .ok_or_else(|| format!("invalid size '{}', expected WxH (e.g. 960x720)", s))?;
        Ok(Self { width, height })
    }
}

fn parse_pair(s: &str, separators: &[char]) -> Option<(u32, u32)> {
    let (left, right) = s.trim().split_once(separators)?;
    let left = left.trim().parse().ok()?;
    let right = right.trim().parse().ok()?;
    Some((left, right))
}

/// Everything the planner needs besides the source resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanSettings {
    pub ratio: AspectRatio,
    pub target: TargetSize,
    pub epsilon: f64,
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            ratio: AspectRatio::default(),
            target: TargetSize::default(),
            epsilon: DEFAULT_RATIO_EPSILON,
        }
    }
}

/// A `crop=W:H:X:Y` region in source pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// Filter graph applied to one video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPlan {
    Scale { target: TargetSize },
    CropAndScale { crop: CropRegion, target: TargetSize },
}

impl FilterPlan {
    pub fn crop(&self) -> Option<CropRegion> {
        match self {
            FilterPlan::Scale { .. } => None,
            FilterPlan::CropAndScale { crop, .. } => Some(*crop),
        }
    }

    pub fn target(&self) -> TargetSize {
        match self {
            FilterPlan::Scale { target } | FilterPlan::CropAndScale { target, .. } => *target,
        }
    }
}

impl fmt::Display for FilterPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(crop) = self.crop() {
            write!(f, "crop={}:{}:{}:{},", crop.width, crop.height, crop.x, crop.y)?;
        }
        let target = self.target();
        write!(f, "scale={}:{}", target.width, target.height)
    }
}

/// Plan the crop (if any) and scale for a source resolution
pub fn plan(resolution: Resolution, settings: &PlanSettings) -> FilterPlan {
    let (width, height) = (resolution.width(), resolution.height());
    let input_ratio = resolution.ratio();
    let desired_ratio = settings.ratio.as_f64();
    let target = settings.target;

    if (input_ratio - desired_ratio).abs() < settings.epsilon {
        return FilterPlan::Scale { target };
    }

    let crop = if input_ratio > desired_ratio {
        // Too wide: keep full height, trim the sides
        let new_width = round_dimension(height as f64 * desired_ratio).min(width);
        CropRegion {
            width: new_width,
            height,
            x: (width - new_width) / 2,
            y: 0,
        }
    } else {
        // Too tall: keep full width, trim top and bottom
        let new_height = round_dimension(width as f64 / desired_ratio).min(height);
        CropRegion {
            width,
            height: new_height,
            x: 0,
            y: (height - new_height) / 2,
        }
    };

    FilterPlan::CropAndScale { crop, target }
}

fn round_dimension(value: f64) -> u32 {
    value.round_ties_even().max(1.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(width: u32, height: u32) -> Resolution {
        Resolution::new(width, height).unwrap()
    }

    #[test]
    fn test_wide_source_is_cropped_horizontally() {
        let plan = plan(res(1920, 1080), &PlanSettings::default());
        assert_eq!(plan.to_string(), "crop=1440:1080:240:0,scale=960:720");
    }

    #[test]
    fn test_matching_ratio_is_scale_only() {
        let plan = plan(res(640, 480), &PlanSettings::default());
        assert_eq!(plan, FilterPlan::Scale { target: TargetSize::default() });
        assert_eq!(plan.to_string(), "scale=960:720");
    }

    #[test]
    fn test_portrait_source_is_cropped_vertically() {
        let plan = plan(res(1080, 1920), &PlanSettings::default());
        assert_eq!(plan.to_string(), "crop=1080:810:0:555,scale=960:720");
    }

    #[test]
    fn test_rounding_ties_go_to_even() {
        // 6 / (4/3) == 4.5 exactly
        let plan = plan(res(6, 100), &PlanSettings::default());
        assert_eq!(plan.to_string(), "crop=6:4:0:48,scale=960:720");
    }

    #[test]
    fn test_ratio_within_epsilon_is_scale_only() {
        // 1442/1080 differs from 4/3 by ~0.0019, 1441/1080 by ~0.0009
        assert!(plan(res(1441, 1080), &PlanSettings::default()).crop().is_none());
        assert!(plan(res(1442, 1080), &PlanSettings::default()).crop().is_some());

        let loose = PlanSettings { epsilon: 0.01, ..PlanSettings::default() };
        assert!(plan(res(1442, 1080), &loose).crop().is_none());
    }

    #[test]
    fn test_wide_sources_keep_full_height() {
        let settings = PlanSettings::default();
        let desired = settings.ratio.as_f64();
        for height in (90..=2160).step_by(37) {
            for extra in [1.2, 1.5, 1.777, 2.0, 2.39, 3.5] {
                let width = (height as f64 * extra) as u32;
                let resolution = res(width, height);
                if (resolution.ratio() - desired).abs() < settings.epsilon || resolution.ratio() < desired {
                    continue;
                }
                let crop = plan(resolution, &settings).crop().unwrap();
                assert_eq!(crop.height, height);
                assert_eq!(crop.y, 0);
                assert_eq!(crop.width, (height as f64 * desired).round_ties_even() as u32);
                assert_eq!(crop.x, (width - crop.width) / 2);
                assert!(crop.x + crop.width <= width);
            }
        }
    }

    #[test]
    fn test_tall_sources_keep_full_width() {
        let settings = PlanSettings::default();
        let desired = settings.ratio.as_f64();
        for width in (90..=2160).step_by(41) {
            for extra in [1.0, 1.1, 1.25, 1.777, 2.0] {
                let height = (width as f64 * extra) as u32;
                let resolution = res(width, height);
                if (resolution.ratio() - desired).abs() < settings.epsilon {
                    continue;
                }
                let crop = plan(resolution, &settings).crop().unwrap();
                assert_eq!(crop.width, width);
                assert_eq!(crop.x, 0);
                assert_eq!(crop.height, (width as f64 / desired).round_ties_even() as u32);
                assert_eq!(crop.y, (height - crop.height) / 2);
                assert!(crop.y + crop.height <= height);
            }
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        let settings = PlanSettings {
            ratio: AspectRatio { width: 16, height: 9 },
            target: TargetSize { width: 1280, height: 720 },
            epsilon: DEFAULT_RATIO_EPSILON,
        };
        for (w, h) in [(1920, 1080), (720, 576), (1080, 1920), (3840, 1600)] {
            assert_eq!(plan(res(w, h), &settings), plan(res(w, h), &settings));
        }
        assert_eq!(plan(res(1920, 1080), &settings).to_string(), "scale=1280:720");
    }

    #[test]
    fn test_resolution_rejects_zero() {
        assert!(Resolution::new(0, 1080).is_none());
        assert!(Resolution::new(1920, 0).is_none());
        assert_eq!(res(1920, 1080).to_string(), "1920x1080");
    }

    #[test]
    fn test_parse_ratio_and_size() {
        assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio { width: 16, height: 9 });
        assert_eq!("4x3".parse::<AspectRatio>().unwrap().tag(), "4x3");
        assert_eq!("960x720".parse::<TargetSize>().unwrap(), TargetSize::default());
        assert!("4".parse::<AspectRatio>().is_err());
        assert!("wide".parse::<TargetSize>().is_err());
    }
}
