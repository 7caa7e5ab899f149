//! Target size computation for a longest-side cap.

use serde::{Deserialize, Serialize};

/// Whether images smaller than the cap may be enlarged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpscalePolicy {
    /// Images that already fit are left at their source size.
    #[default]
    Never,
    /// Images are always scaled so their longest side equals the cap.
    Allow,
}

/// Compute the output size for a source image and a longest-side cap.
///
/// With `UpscalePolicy::Never`, a source whose width and height are both
/// within `longest_side` is returned unchanged. Otherwise the larger source
/// dimension becomes exactly `longest_side` and the other follows the aspect
/// ratio, rounded to the nearest pixel and never below 1.
///
/// Zero-sized sources are returned as-is; a zero cap is treated as 1.
pub fn plan_dimensions(
    width: u32,
    height: u32,
    longest_side: u32,
    policy: UpscalePolicy,
) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let longest_side = longest_side.max(1);

    if policy == UpscalePolicy::Never && width <= longest_side && height <= longest_side {
        return (width, height);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        // Landscape or square: constrain by width
        let new_height = (longest_side as f64 / ratio).round() as u32;
        (longest_side, new_height.clamp(1, longest_side))
    } else {
        // Portrait: constrain by height
        let new_width = (longest_side as f64 * ratio).round() as u32;
        (new_width.clamp(1, longest_side), longest_side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_downscale() {
        assert_eq!(
            plan_dimensions(4000, 3000, 2300, UpscalePolicy::Never),
            (2300, 1725)
        );
    }

    #[test]
    fn test_portrait_downscale() {
        assert_eq!(
            plan_dimensions(4000, 6000, 2560, UpscalePolicy::Never),
            (1707, 2560)
        );
    }

    #[test]
    fn test_square_downscale() {
        assert_eq!(
            plan_dimensions(4000, 4000, 256, UpscalePolicy::Never),
            (256, 256)
        );
    }

    #[test]
    fn test_fits_is_unchanged() {
        assert_eq!(
            plan_dimensions(4000, 3000, 4500, UpscalePolicy::Never),
            (4000, 3000)
        );
        assert_eq!(
            plan_dimensions(800, 600, 800, UpscalePolicy::Never),
            (800, 600)
        );
    }

    #[test]
    fn test_allow_upscale() {
        assert_eq!(
            plan_dimensions(800, 600, 2300, UpscalePolicy::Allow),
            (2300, 1725)
        );
    }

    #[test]
    fn test_extreme_aspect_floors_at_one_pixel() {
        assert_eq!(
            plan_dimensions(10000, 1, 100, UpscalePolicy::Never),
            (100, 1)
        );
        assert_eq!(plan_dimensions(1, 10000, 100, UpscalePolicy::Never), (1, 100));
    }

    #[test]
    fn test_zero_inputs() {
        assert_eq!(plan_dimensions(0, 0, 256, UpscalePolicy::Never), (0, 0));
        assert_eq!(plan_dimensions(10, 10, 0, UpscalePolicy::Never), (1, 1));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn source_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=20_000, 1u32..=20_000)
    }

    proptest! {
        /// Property: Images that already fit are never resized.
        #[test]
        fn prop_fitting_images_unchanged(
            (width, height) in source_strategy(),
            slack in 0u32..=5_000,
        ) {
            let cap = width.max(height) + slack;
            prop_assert_eq!(plan_dimensions(width, height, cap, UpscalePolicy::Never), (width, height));
        }

        /// Property: Oversized images land exactly on the cap.
        #[test]
        fn prop_longest_side_equals_cap(
            (width, height) in source_strategy(),
            cap in 1u32..=10_000,
        ) {
            prop_assume!(width.max(height) > cap);
            let (w, h) = plan_dimensions(width, height, cap, UpscalePolicy::Never);
            prop_assert_eq!(w.max(h), cap);
            prop_assert!(w >= 1 && h >= 1);
        }

        /// Property: Aspect ratio is preserved within one pixel of rounding.
        #[test]
        fn prop_aspect_ratio_within_rounding(
            (width, height) in source_strategy(),
            cap in 1u32..=10_000,
        ) {
            let (w, h) = plan_dimensions(width, height, cap, UpscalePolicy::Never);
            if width >= height {
                let exact = height as f64 * w as f64 / width as f64;
                prop_assert!((h as f64 - exact).abs() <= 1.0, "h={} exact={}", h, exact);
            } else {
                let exact = width as f64 * h as f64 / height as f64;
                prop_assert!((w as f64 - exact).abs() <= 1.0, "w={} exact={}", w, exact);
            }
        }

        /// Property: Planning never enlarges under the default policy.
        #[test]
        fn prop_never_upscales(
            (width, height) in source_strategy(),
            cap in 1u32..=30_000,
        ) {
            let (w, h) = plan_dimensions(width, height, cap, UpscalePolicy::Never);
            prop_assert!(w <= width && h <= height);
        }
    }
}
