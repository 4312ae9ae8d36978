/// Errors that can occur when resolving a scene description.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// A connection references a scene id that names neither an input nor a
    /// destination.
    #[error("scene endpoint '{id}' not found (referenced by a connection)")]
    EndpointNotFound { id: String },

    /// A connection's target references an input; only destinations can
    /// receive flow.
    #[error("scene endpoint '{id}' is an input and cannot receive flow")]
    TargetIsInput { id: String },

    /// Two scene elements share the same id.
    #[error("duplicate scene id '{id}'")]
    DuplicateId { id: String },

    /// The scene document failed to parse.
    #[error("scene parse error: {detail}")]
    Parse { detail: String },
}
