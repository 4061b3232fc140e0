// Model introspection.
//
// The patch pipeline optionally derives deployment metadata (runtime ABI,
// operator-set and I/O fingerprints, arena estimate) and weight ranges from
// the target artifact. Parsing is a pluggable strategy: the pipeline takes a
// `&dyn ModelIntrospector`, and an unavailable or failing introspector only
// disables the automatic metadata.
//
// - `fingerprint` fingerprint and arena arithmetic shared by introspectors
// - `tflite`      TFLite flatbuffer introspector (feature `tflite`)

pub mod fingerprint;
#[cfg(feature = "tflite")]
pub mod tflite;

use thiserror::Error;

use crate::diff::ByteRange;
use crate::format::MetadataValues;

#[cfg(feature = "tflite")]
pub use tflite::TfliteIntrospector;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum IntrospectError {
    /// No schema support compiled in or configured.
    #[error("model introspection unavailable: {0}")]
    Unavailable(&'static str),

    /// The artifact could not be parsed.
    #[error("malformed model: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Values derived from a target artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelInfo {
    /// Runtime ABI / schema version.
    pub abi: u16,
    pub opset_fingerprint: u32,
    pub io_fingerprint: u32,
    /// Estimated arena bytes; 0 when no arena factor was given.
    pub required_arena_bytes: u32,
}

impl ModelInfo {
    /// Automatic metadata values; zero fields count as absent.
    pub fn metadata(&self) -> MetadataValues {
        let nonzero32 = |v: u32| (v != 0).then_some(v);
        MetadataValues {
            req_arena_bytes: nonzero32(self.required_arena_bytes),
            abi_version: (self.abi != 0).then_some(self.abi),
            opset_fingerprint: nonzero32(self.opset_fingerprint),
            io_fingerprint: nonzero32(self.io_fingerprint),
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy trait
// ---------------------------------------------------------------------------

/// Structural view of a model artifact.
pub trait ModelIntrospector {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Derive deployment metadata from the target bytes.
    ///
    /// `arena_factor` scales the activation-memory sum; `None` or a
    /// non-positive factor yields `required_arena_bytes == 0`.
    fn introspect(&self, target: &[u8], arena_factor: Option<f64>)
    -> Result<ModelInfo, IntrospectError>;

    /// Byte ranges holding constant weight data.
    fn weight_ranges(&self, target: &[u8]) -> Result<Vec<ByteRange>, IntrospectError>;
}

/// Introspector used when no model schema is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoIntrospector;

impl ModelIntrospector for NoIntrospector {
    fn name(&self) -> &'static str {
        "none"
    }

    fn introspect(
        &self,
        _target: &[u8],
        _arena_factor: Option<f64>,
    ) -> Result<ModelInfo, IntrospectError> {
        Err(IntrospectError::Unavailable("no model schema support"))
    }

    fn weight_ranges(&self, _target: &[u8]) -> Result<Vec<ByteRange>, IntrospectError> {
        Err(IntrospectError::Unavailable("no model schema support"))
    }
}

/// The best introspector compiled into this build.
pub fn default_introspector() -> Box<dyn ModelIntrospector> {
    #[cfg(feature = "tflite")]
    {
        Box::new(TfliteIntrospector)
    }
    #[cfg(not(feature = "tflite"))]
    {
        Box::new(NoIntrospector)
    }
}
