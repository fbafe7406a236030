//! Pipeline configuration.
//!
//! Every threshold of the reconstruction is exposed here with the default
//! values tuned on 20 cm aerial surveys. All sections deserialize with
//! defaults, so a partial JSON config only overrides what it names.

use roofline_core::Real;
use serde::{Deserialize, Serialize};

/// Footprint preparation thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintConfig {
    /// Consecutive ring edges whose unit directions have a dot product
    /// above this are merged into one polygon edge.
    pub smoothing_dot: Real,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self { smoothing_dot: 0.99 }
    }
}

/// Cross-image building association thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Cell size of the uniform grid used to index footprint bounding
    /// boxes, meters.
    pub grid_cell: Real,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self { grid_cell: 50.0 }
    }
}

/// Building-height estimation thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationConfig {
    /// Image pairs with a correlation score above this do not vote.
    pub max_correlation_score: Real,
    /// Height applied when no pair qualifies, meters.
    pub default_height: Real,
    /// Estimates outside `[min_height, max_height)` fall back to the
    /// default.
    pub min_height: Real,
    pub max_height: Real,
}

impl Default for ElevationConfig {
    fn default() -> Self {
        Self {
            max_correlation_score: 0.2,
            default_height: 10.0,
            min_height: 0.0,
            max_height: 20.0,
        }
    }
}

/// Two-pass segment matching thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Footprint pairs need at least this IoU before their segments are
    /// compared.
    pub min_pair_iou: Real,
    /// |dot| of the planimetric directions required for a match.
    pub direction_dot: Real,
    /// Midpoint-to-line distance bound of the coarse pass, meters.
    pub coarse_line_distance: Real,
    /// Midpoint-to-line distance bound of the fine pass, after the median
    /// translation is applied, meters.
    pub fine_line_distance: Real,
    /// Segment pairs voting for the translation must agree in length
    /// within this, meters.
    pub length_similarity: Real,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            min_pair_iou: 0.5,
            direction_dot: 0.98,
            coarse_line_distance: 1.5,
            fine_line_distance: 1.0,
            length_similarity: 2.0,
        }
    }
}

/// Plane-intersection solve and validity thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveConfig {
    /// Studentized-residual bound of the outlier rejection.
    pub studentized_threshold: Real,
    /// Weight of the horizontal-edge pseudo-constraint.
    pub horizontal_weight: Real,
    /// Collocation abscissa offset of the least-squares rows.
    pub collocation_lambda: Real,
    /// A group is degenerate when every other apex lies closer than this
    /// to the first segment's viewing plane, meters.
    pub degenerate_apex_distance: Real,
    /// Solved edges longer than this are rejected, meters.
    pub max_length: Real,
    /// Solved edges whose mean apex-ray distance exceeds this are
    /// rejected, meters.
    pub max_d_mean: Real,
    /// Accepted height band of a solved edge above the terrain, meters.
    pub min_height_above_terrain: Real,
    pub max_height_above_terrain: Real,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            studentized_threshold: 2.0,
            horizontal_weight: 10.0,
            collocation_lambda: 1e5,
            degenerate_apex_distance: 200.0,
            max_length: 1000.0,
            max_d_mean: 1.0,
            min_height_above_terrain: -10.0,
            max_height_above_terrain: 150.0,
        }
    }
}

/// Outline closure thresholds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosureConfig {
    /// |dot| above which two adjacent edges count as parallel: their
    /// corner is bridged instead of intersected.
    pub parallel_dot: Real,
    /// |dot| below which two edges count as perpendicular in the
    /// two-edge repair case.
    pub perpendicular_dot: Real,
    /// |dot| bound for the base edge of the three-edge repair case.
    pub base_dot: Real,
    /// Upper bound on the degree-pruning fixpoint iterations.
    pub prune_rounds: usize,
    /// Consecutive ring corners further apart than this mark the outline
    /// as incoherent, meters.
    pub max_corner_gap: Real,
    /// Closed outlines covering less than this fraction of the mean
    /// source-footprint area are replaced by the re-projection fallback.
    pub min_area_ratio: Real,
    /// Wall-clock budget per building group, seconds. `None` disables the
    /// deadline.
    pub group_deadline_secs: Option<Real>,
}

impl Default for ClosureConfig {
    fn default() -> Self {
        Self {
            parallel_dot: 0.8,
            perpendicular_dot: 0.1,
            base_dot: 0.2,
            prune_rounds: 15,
            max_corner_gap: 150.0,
            min_area_ratio: 0.2,
            group_deadline_secs: None,
        }
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    pub footprint: FootprintConfig,
    pub grouping: GroupingConfig,
    pub elevation: ElevationConfig,
    pub matching: MatchingConfig,
    pub solve: SolveConfig,
    pub closure: ClosureConfig,
}
