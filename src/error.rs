use thiserror::Error;

/// A failed GL call, as reported by whatever implements
/// [`QuadTarget`](crate::stream::QuadTarget).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{call} failed with {error}")]
pub struct GpuFault {
    pub call: &'static str,
    pub error: String,
}

impl GpuFault {
    pub fn new(call: &'static str, error: impl Into<String>) -> GpuFault {
        GpuFault {
            call,
            error: error.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("entity store is full ({capacity} entities)")]
    CapacityExceeded { capacity: usize },
    #[error("cannot reserve room for {capacity} entities")]
    Reserve { capacity: usize },
    #[error("uploading chunk {chunk} failed")]
    GpuUpload {
        chunk: usize,
        #[source]
        source: GpuFault,
    },
    #[error("drawing chunk {chunk} failed")]
    GpuDraw {
        chunk: usize,
        #[source]
        source: GpuFault,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
