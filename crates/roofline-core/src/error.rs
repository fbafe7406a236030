use thiserror::Error;

/// Failure taxonomy shared by the reconstruction stages.
///
/// `GeometricFailure` and `TopologyInconsistency` are recoverable: the
/// affected segment or group is marked invalid and the building degrades to
/// a cruder closure method. `ValidationFailure` discards a single ring or
/// group. `Configuration` is the only fatal variant and can only occur
/// while assembling the input scene.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    /// Degenerate or parallel geometry, singular normal-equation matrix,
    /// NaN residual.
    #[error("geometric failure: {0}")]
    GeometricFailure(String),

    /// Adjacency graph is not a simple cycle, a walk revisited a node, or
    /// the loose-end count did not allow bridging.
    #[error("topology inconsistency: {0}")]
    TopologyInconsistency(String),

    /// A solved group or closed ring failed a sanity gate.
    #[error("validation failure: {0}")]
    ValidationFailure(String),

    /// Missing camera, empty scene, malformed terrain raster.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, ReconstructionError>;
