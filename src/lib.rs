//! Scenewright turns untrusted, model-generated drawing commands into safe, deterministic
//! mutations of a shared 2-D scene graph.
//!
//! Raw text flows through a fixed chain of synchronous stages before it may touch the scene:
//!
//! - extract and [normalize](normalize_envelope) the JSON payload
//! - [validate](validate_envelope) it against the closed command grammar
//! - strip unauthorized deletions and retags with the [safety guard](apply_safety_guard)
//! - [stabilize](stabilize_envelope) geometry and [enrich](enrich_object) thin objects
//! - [apply] the result with the pure reducer
//!
//! [`SceneSession`] owns the canonical scene and its event log; [`SceneServer`] serializes access
//! to one session across threads.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod enrich;
pub(crate) mod guard;
pub(crate) mod normalize;
pub(crate) mod pipeline;
pub(crate) mod reduce;
pub(crate) mod scene;
pub(crate) mod schema;
pub(crate) mod session;
pub(crate) mod stabilize;

pub use crate::foundation::config::{EnrichmentOpts, Limits, PipelineConfig, StabilizerOpts};
pub use crate::foundation::core::{
    Affine, HORIZON_Y, Point, Rect, Transform, TransformPatch, Vec2, WORLD_MAX, WORLD_MIN,
};
pub use crate::foundation::error::{SceneError, SceneResult};

pub use crate::enrich::{enrich_envelope, enrich_object};
pub use crate::guard::safety::{GuardReport, apply_safety_guard};
pub use crate::normalize::extract::{extract_json_region, parse_raw_json};
pub use crate::normalize::pass::{Normalized, Repair, normalize_envelope};
pub use crate::pipeline::process::{Outcome, Pipeline, Processed};
pub use crate::reduce::order::order_key;
pub use crate::reduce::reducer::{BACKGROUND_ID, GROUND_ID, apply, apply_with_limit};
pub use crate::scene::command::{
    CommandEnvelope, DrawingCommand, ObjectPatch, PatchField, REFUSAL_JSON_PARSE_FAILED,
    REFUSAL_SCHEMA_VALIDATION_FAILED,
};
pub use crate::scene::model::{
    CircleShape, EllipseShape, GradientStop, GradientStops, Layer, LineShape, MAX_SHAPES,
    ObjectStatus, PathShape, PolyShape, RectShape, SceneGraph, SceneIntent, SceneObject,
    ShapeStyle, TextShape, VectorShape,
};
pub use crate::scene::semantic::Category;
pub use crate::schema::validate::{SchemaError, SchemaPathElem, validate_envelope};
pub use crate::session::events::{EventStatus, SessionEvent, diff_summary};
pub use crate::session::scene_session::{SceneSession, SceneUpdate, UpstreamModel, parse_scene};
pub use crate::session::server::{SceneHandle, SceneServer, SharedModel};
pub use crate::stabilize::{StabilizeReport, stabilize_envelope};
