//! Resolution negotiation
//!
//! A contact source only serves a fixed set of resolutions. This module
//! resolves a caller's requested resolution against that set with a single
//! explicit policy, and reports whether a substitution took place.

use crate::core::error::{ConfigurationError, Result};
use log::{info, warn};

/// Position (counted from the finest) of the resolution used when none is requested
pub const DEFAULT_RESOLUTION_RANK: usize = 4;

/// What to do when the requested resolution is not offered by the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Substitute the closest supported resolution (ties go to the coarser one)
    #[default]
    Nearest,
    /// Refuse with a configuration error
    Strict,
}

/// Outcome of resolution negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionChoice {
    /// What the caller asked for (None = use the default)
    pub requested: Option<u32>,
    /// What will actually be used
    pub resolution: u32,
    /// True when `resolution` differs from an explicit request
    pub substituted: bool,
}

/// Pick the resolution to use
///
/// * `requested == None` selects the fourth finest resolution
///   (or the coarsest when fewer than four are offered).
/// * An unsupported request follows `policy`.
///
/// # Examples
/// ```
/// use fast_plothic::core::{negotiate_resolution, FallbackPolicy};
///
/// let available = [2_500_000, 1_000_000, 500_000, 250_000, 100_000];
/// let choice = negotiate_resolution(&available, Some(260_000), FallbackPolicy::Nearest).unwrap();
/// assert_eq!(choice.resolution, 250_000);
/// assert!(choice.substituted);
///
/// let choice = negotiate_resolution(&available, None, FallbackPolicy::Nearest).unwrap();
/// assert_eq!(choice.resolution, 1_000_000);
/// ```
pub fn negotiate_resolution(
    available: &[u32],
    requested: Option<u32>,
    policy: FallbackPolicy,
) -> Result<ResolutionChoice> {
    if available.is_empty() {
        return Err(ConfigurationError::NoResolutions.into());
    }
    info!("Contact source has resolutions: {:?}", available);

    let mut sorted = available.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let requested_res = match requested {
        None => {
            let rank = DEFAULT_RESOLUTION_RANK.min(sorted.len());
            let resolution = sorted[rank - 1];
            info!("Resolution not set, use the default resolution: {}", resolution);
            return Ok(ResolutionChoice {
                requested: None,
                resolution,
                substituted: false,
            });
        }
        Some(r) => r,
    };

    if sorted.binary_search(&requested_res).is_ok() {
        info!("Use the resolution: {}", requested_res);
        return Ok(ResolutionChoice {
            requested,
            resolution: requested_res,
            substituted: false,
        });
    }

    match policy {
        FallbackPolicy::Strict => Err(ConfigurationError::UnsupportedResolution {
            requested: requested_res,
            available: available.to_vec(),
        }
        .into()),
        FallbackPolicy::Nearest => {
            let resolution = nearest_resolution(&sorted, requested_res);
            warn!(
                "Resolution {} not in {:?}, substituting {}",
                requested_res, available, resolution
            );
            Ok(ResolutionChoice {
                requested,
                resolution,
                substituted: true,
            })
        }
    }
}

/// Closest value in an ascending, non-empty list; ties go to the larger value
fn nearest_resolution(sorted: &[u32], requested: u32) -> u32 {
    let mut best = sorted[0];
    for &candidate in sorted {
        if candidate.abs_diff(requested) <= best.abs_diff(requested) {
            best = candidate;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PlotHicError;

    const AVAILABLE: [u32; 6] = [2_500_000, 1_000_000, 500_000, 250_000, 100_000, 50_000];

    #[test]
    fn test_exact_match_is_not_substituted() {
        let choice = negotiate_resolution(&AVAILABLE, Some(500_000), FallbackPolicy::Strict).unwrap();
        assert_eq!(choice.resolution, 500_000);
        assert!(!choice.substituted);
        assert_eq!(choice.requested, Some(500_000));
    }

    #[test]
    fn test_default_is_fourth_finest() {
        let choice = negotiate_resolution(&AVAILABLE, None, FallbackPolicy::Nearest).unwrap();
        assert_eq!(choice.resolution, 500_000);
        assert!(!choice.substituted);
    }

    #[test]
    fn test_default_with_few_resolutions_is_coarsest() {
        let choice = negotiate_resolution(&[1000, 5000], None, FallbackPolicy::Nearest).unwrap();
        assert_eq!(choice.resolution, 5000);
    }

    #[test]
    fn test_nearest_substitution() {
        let choice = negotiate_resolution(&AVAILABLE, Some(90_000), FallbackPolicy::Nearest).unwrap();
        assert_eq!(choice.resolution, 100_000);
        assert!(choice.substituted);
    }

    #[test]
    fn test_nearest_tie_goes_coarser() {
        // 75_000 is equidistant from 50_000 and 100_000
        let choice = negotiate_resolution(&AVAILABLE, Some(75_000), FallbackPolicy::Nearest).unwrap();
        assert_eq!(choice.resolution, 100_000);
    }

    #[test]
    fn test_strict_rejects_unsupported() {
        let err = negotiate_resolution(&AVAILABLE, Some(123), FallbackPolicy::Strict).unwrap_err();
        assert!(matches!(
            err,
            PlotHicError::Configuration(ConfigurationError::UnsupportedResolution { requested: 123, .. })
        ));
    }

    #[test]
    fn test_empty_resolution_list() {
        let err = negotiate_resolution(&[], Some(100), FallbackPolicy::Nearest).unwrap_err();
        assert!(matches!(
            err,
            PlotHicError::Configuration(ConfigurationError::NoResolutions)
        ));
    }
}
