//! Flashpatch: compact in-place binary patches for firmware-resident
//! model artifacts.
//!
//! The crate provides:
//! - A byte differ with gap merging and run coalescing (`diff`)
//! - Per-chunk run-length encoding (`rle`)
//! - The versioned patch wire format and metadata TLV block (`format`)
//! - The patch build pipeline (`encoder`) and a host-side reader (`decoder`)
//! - Pluggable model introspection for automatic metadata (`introspect`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use flashpatch::decoder::PatchFile;
//! use flashpatch::encoder::{PatchOptions, build_patch};
//! use flashpatch::introspect::NoIntrospector;
//!
//! let base = b"hello old world";
//! let target = b"hello new world";
//!
//! let built = build_patch(base, target, &PatchOptions::default(), &NoIntrospector).unwrap();
//! let patch = PatchFile::parse(&built.bytes).unwrap();
//! assert_eq!(patch.apply(base).unwrap(), target);
//! ```

pub mod decoder;
pub mod diff;
pub mod encoder;
pub mod format;
pub mod hash;
pub mod introspect;
pub mod io;
pub mod rle;

#[cfg(feature = "cli")]
pub mod cli;
