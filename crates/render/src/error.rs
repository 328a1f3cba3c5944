/// Load-time failures of the render core.
///
/// Both variants are fatal: they are raised before any frame is planned, so
/// a half-built renderer never draws.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The grid needs more vertices than 16-bit indices can address.
    #[error(
        "grid {width}x{height} needs {vertices} vertices, 16-bit indices address at most {max}"
    )]
    CapacityExceeded {
        width: u32,
        height: u32,
        vertices: u64,
        max: u64,
    },
    /// A required texture mapping is missing or names something unknown.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl RenderError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
