//! Engine-level error types
//!
//! Structural misuse of the scene graph is reported to the caller as a
//! failed operation; geometry problems inside the per-frame hot path are
//! resolved locally (clamping, fallbacks) and never surface here.

use thiserror::Error;

/// Errors produced by scene-graph structural operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A node key did not resolve to a live node
    #[error("node not found in scene")]
    NodeNotFound,

    /// The node is already a member of the target container
    #[error("node is already a member")]
    DuplicateMember,

    /// The node already has a parent; detach it first
    #[error("node already has a parent")]
    AlreadyParented,

    /// Re-parenting would make the node an ancestor of itself
    #[error("re-parenting would create a cycle")]
    CycleDetected,

    /// The operation requires a sphere collider on the node
    #[error("node does not carry a sphere collider")]
    NotASphereCollider,

    /// The operation requires a plane collider on the node
    #[error("node does not carry a plane collider")]
    NotAPlaneCollider,

    /// The operation requires a curve collider on the node
    #[error("node does not carry a curve collider")]
    NotACurveCollider,

    /// The operation requires a camera node
    #[error("node is not a camera")]
    NotACamera,

    /// A curve segment index was past the corridor's last segment
    #[error("curve segment index out of range")]
    SegmentOutOfRange,
}
