// Patch encoder and build pipeline.
//
// `PatchEncoder` streams the wire format into any `Write` sink: the header,
// the metadata block verbatim, then one record per chunk. `build_patch`
// runs the whole pipeline in memory:
//
//   introspect (optional) -> diff + coalesce -> split -> RLE per run -> encode
//
// Introspection failures never abort a build. They are logged and the
// patch is produced without automatic metadata (or over the whole artifact
// when weight ranges were requested).

use std::io::{self, Write};
use std::path::PathBuf;

use log::{debug, info, warn};
use thiserror::Error;

use crate::diff::{DiffMode, DiffRun, compute_runs};
use crate::format::metadata::build_metadata;
use crate::format::{
    Chunk, DigestAlgo, Encoding, HEADER_LEN, MAX_CHUNK_PAYLOAD, MAX_CHUNKS, MetadataError,
    MetadataValues, PatchHeader,
};
use crate::introspect::ModelIntrospector;

/// Default maximum gap bridged when merging runs.
pub const DEFAULT_MERGE_GAP: u32 = 16;
/// Default length below which a run is folded into its predecessor.
pub const DEFAULT_MIN_CHUNK: u32 = 8;
/// Default multiplier applied to activation bytes for the arena estimate.
pub const DEFAULT_ARENA_FACTOR: f64 = 1.4;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for [`build_patch`].
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOptions {
    /// Digest algorithm for the header digests and per-chunk CRCs.
    pub digest: DigestAlgo,
    /// Runs separated by at most this many unchanged bytes are merged.
    pub merge_gap: u32,
    /// Runs shorter than this are folded into a nearby predecessor.
    pub min_chunk: u32,
    /// Whole artifact, introspected weight ranges, or explicit ranges.
    pub mode: DiffMode,
    /// Derive metadata from the target through the introspector.
    pub auto_meta: bool,
    /// Arena multiplier; `None` omits the arena record unless set manually.
    pub arena_factor: Option<f64>,
    /// Manual metadata values; present non-zero values win over automatic ones.
    pub manual: MetadataValues,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            digest: DigestAlgo::Crc32,
            merge_gap: DEFAULT_MERGE_GAP,
            min_chunk: DEFAULT_MIN_CHUNK,
            mode: DiffMode::WholeArtifact,
            auto_meta: false,
            arena_factor: Some(DEFAULT_ARENA_FACTOR),
            manual: MetadataValues::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File-level failure, with the offending path.
    #[error("{role} file {}: {source}", path.display())]
    File {
        role: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("{which} artifact is {len} bytes; offsets are limited to 32 bits")]
    ArtifactTooLarge { which: &'static str, len: usize },

    #[error("chunk at offset {offset} has a {len}-byte payload (max {max})", max = MAX_CHUNK_PAYLOAD)]
    ChunkTooLarge { offset: u32, len: usize },

    #[error("patch needs {0} chunks (max {max})", max = MAX_CHUNKS)]
    TooManyChunks(usize),

    #[error("header declares {declared} chunks but {written} were written")]
    ChunkCountMismatch { declared: u16, written: usize },

    #[error("header declares {declared} metadata bytes but the block is {actual}")]
    MetadataLengthMismatch { declared: u16, actual: usize },
}

// ---------------------------------------------------------------------------
// PatchEncoder
// ---------------------------------------------------------------------------

/// Streaming patch writer.
///
/// The header is written up front, so its `chunk_count` and
/// `metadata_length` must already be final; both are checked against what
/// is actually written.
///
/// # Example
/// ```no_run
/// use flashpatch::encoder::PatchEncoder;
/// use flashpatch::format::{DigestAlgo, PatchHeader};
/// let header = PatchHeader::for_artifacts(DigestAlgo::Crc32, b"base", b"base").unwrap();
/// let mut out = Vec::new();
/// let enc = PatchEncoder::new(&mut out, header, &[]).unwrap();
/// enc.finish().unwrap();
/// ```
pub struct PatchEncoder<W: Write> {
    writer: W,
    declared_chunks: u16,
    chunks_written: usize,
    bytes_written: u64,
}

impl<W: Write> PatchEncoder<W> {
    /// Write the header and metadata block.
    pub fn new(mut writer: W, header: PatchHeader, metadata: &[u8]) -> Result<Self, BuildError> {
        if metadata.len() != header.metadata_length as usize {
            return Err(BuildError::MetadataLengthMismatch {
                declared: header.metadata_length,
                actual: metadata.len(),
            });
        }
        header.encode(&mut writer)?;
        writer.write_all(metadata)?;
        Ok(Self {
            writer,
            declared_chunks: header.chunk_count,
            chunks_written: 0,
            bytes_written: (HEADER_LEN + metadata.len()) as u64,
        })
    }

    /// Append one chunk record.
    ///
    /// A payload longer than [`MAX_CHUNK_PAYLOAD`] is rejected and nothing
    /// is written for it.
    pub fn write_chunk(&mut self, chunk: &Chunk) -> Result<(), BuildError> {
        if self.chunks_written >= self.declared_chunks as usize {
            return Err(BuildError::ChunkCountMismatch {
                declared: self.declared_chunks,
                written: self.chunks_written + 1,
            });
        }
        chunk.encode(&mut self.writer)?;
        self.chunks_written += 1;
        self.bytes_written += chunk.encoded_len() as u64;
        Ok(())
    }

    /// Total bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and return the writer.
    pub fn finish(mut self) -> Result<W, BuildError> {
        if self.chunks_written != self.declared_chunks as usize {
            return Err(BuildError::ChunkCountMismatch {
                declared: self.declared_chunks,
                written: self.chunks_written,
            });
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Serialize a complete patch.
///
/// `chunk_count` and `metadata_length` are taken from `chunks` and
/// `metadata`; the remaining header fields come from `header`.
pub fn encode(header: &PatchHeader, metadata: &[u8], chunks: &[Chunk]) -> Result<Vec<u8>, BuildError> {
    let chunk_count =
        u16::try_from(chunks.len()).map_err(|_| BuildError::TooManyChunks(chunks.len()))?;
    let metadata_length = u16::try_from(metadata.len())
        .map_err(|_| MetadataError::BlockTooLarge(metadata.len()))?;
    let header = PatchHeader {
        chunk_count,
        metadata_length,
        ..header.clone()
    };

    let capacity =
        HEADER_LEN + metadata.len() + chunks.iter().map(Chunk::encoded_len).sum::<usize>();
    let mut out = Vec::with_capacity(capacity);
    let mut enc = PatchEncoder::new(&mut out, header, metadata)?;
    for chunk in chunks {
        enc.write_chunk(chunk)?;
    }
    enc.finish()?;
    Ok(out)
}

/// Split runs longer than a chunk payload can carry into consecutive pieces.
pub fn split_long_runs(runs: Vec<DiffRun>) -> Vec<DiffRun> {
    if runs.iter().all(|r| r.len() <= MAX_CHUNK_PAYLOAD) {
        return runs;
    }
    let mut out = Vec::with_capacity(runs.len() + 1);
    for run in runs {
        if run.len() <= MAX_CHUNK_PAYLOAD {
            out.push(run);
            continue;
        }
        let mut offset = run.offset;
        for piece in run.bytes.chunks(MAX_CHUNK_PAYLOAD) {
            out.push(DiffRun::new(offset, piece.to_vec()));
            offset += piece.len() as u32;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Summary of a built patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub base_len: usize,
    pub target_len: usize,
    pub chunks: usize,
    pub raw_chunks: usize,
    pub rle_chunks: usize,
    /// Sum of encoded payload bytes, excluding chunk headers and CRCs.
    pub payload_bytes: usize,
    pub metadata_len: usize,
    pub patch_len: usize,
    /// Whether the introspector contributed metadata values.
    pub auto_metadata: bool,
}

/// Patch bytes plus statistics.
#[derive(Debug, Clone)]
pub struct BuiltPatch {
    pub bytes: Vec<u8>,
    pub stats: BuildStats,
}

/// Build a patch turning `base` into `target`.
pub fn build_patch(
    base: &[u8],
    target: &[u8],
    opts: &PatchOptions,
    introspector: &dyn ModelIntrospector,
) -> Result<BuiltPatch, BuildError> {
    let header = PatchHeader::for_artifacts(opts.digest, base, target)?;

    let mut auto = MetadataValues::default();
    let mut auto_metadata = false;
    if opts.auto_meta {
        match introspector.introspect(target, opts.arena_factor) {
            Ok(info) => {
                debug!("{}: {info:?}", introspector.name());
                auto = info.metadata();
                auto_metadata = true;
            }
            Err(e) => warn!(
                "{}: automatic metadata disabled: {e}",
                introspector.name()
            ),
        }
    }
    let metadata = build_metadata(&opts.manual, &auto)?;
    debug!("metadata block: {} bytes", metadata.len());

    let ranges = match &opts.mode {
        DiffMode::WholeArtifact => None,
        DiffMode::Ranges(ranges) => Some(ranges.clone()),
        DiffMode::WeightRanges => match introspector.weight_ranges(target) {
            Ok(ranges) => {
                debug!("{}: {} weight ranges", introspector.name(), ranges.len());
                Some(ranges)
            }
            Err(e) => {
                warn!(
                    "{}: weight ranges unavailable, diffing whole artifact: {e}",
                    introspector.name()
                );
                None
            }
        },
    };

    let runs = compute_runs(
        base,
        target,
        ranges.as_deref(),
        opts.merge_gap,
        opts.min_chunk,
    );
    debug!("diff: {} runs", runs.len());
    let runs = split_long_runs(runs);
    if runs.len() > MAX_CHUNKS {
        return Err(BuildError::TooManyChunks(runs.len()));
    }

    let with_crc = opts.digest == DigestAlgo::Crc32;
    let chunks: Vec<Chunk> = runs.iter().map(|r| Chunk::from_run(r, with_crc)).collect();

    let bytes = encode(&header, &metadata, &chunks)?;

    let rle_chunks = chunks
        .iter()
        .filter(|c| c.encoding == Encoding::Rle)
        .count();
    let stats = BuildStats {
        base_len: base.len(),
        target_len: target.len(),
        chunks: chunks.len(),
        raw_chunks: chunks.len() - rle_chunks,
        rle_chunks,
        payload_bytes: chunks.iter().map(|c| c.payload.len()).sum(),
        metadata_len: metadata.len(),
        patch_len: bytes.len(),
        auto_metadata,
    };
    info!(
        "patch: {} chunks ({} rle), {} bytes for a {}-byte target",
        stats.chunks, stats.rle_chunks, stats.patch_len, stats.target_len
    );
    Ok(BuiltPatch { bytes, stats })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
