//! Floating-origin reference frames for large-world simulation
//!
//! Absolute state is held in double precision and never moves when the scene
//! frame changes. The scene, its physics bodies and anything rendered only see
//! single-precision values relative to the scene's current reference frame,
//! which is recentered on a target object whenever it drifts too far or too
//! fast.

pub mod config;
pub mod core;
pub mod error;
pub mod physics;
pub mod reference_frame;
pub mod scene;
pub mod transform;

// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ConfigError, SimulationConfig};
    pub use crate::core::SimulationClock;
    pub use crate::error::{FrameError, FrameResult};
    pub use crate::physics::Rigidbody;

    pub use crate::reference_frame::{
        AbsoluteState, FrameKind, ReferenceFrame, ReferenceFrameModel,
        SceneReferenceFrameManager, SceneReferenceFrameSwitchData,
    };

    pub use crate::scene::{Scene, TransformView, TransformViewMut};

    pub use crate::transform::{
        DummyTransform, FixedTransform, FrameContext, FreeTransform, KinematicTransform,
        PinnedTransform, ReferenceFrameTransform, SceneTransform, TransformEvent, TransformKind,
    };

    pub use glam::{DQuat, DVec3, Quat, Vec3};
    pub use hecs::Entity;
}

/// Initialize logging for the simulation
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
