// TFLite flatbuffer introspector.
//
// Walks just enough of the TFLite schema to derive patch metadata and
// weight ranges, with every read bounds-checked against the artifact.
//
// Schema fields used (schema.fbs):
//   Model         0 version:u32  1 operator_codes  2 subgraphs  4 buffers
//   OperatorCode  0 deprecated_builtin_code:i8  3 builtin_code:i32
//   SubGraph      0 tensors  1 inputs:[i32]  2 outputs:[i32]
//   Tensor        0 shape:[i32]  1 type:i8  2 buffer:u32
//   Buffer        0 data:[u8]  1 offset:u64  2 size:u64
//
// Only the first subgraph is considered.

use log::debug;

use super::fingerprint::{self, TensorSignature};
use super::{IntrospectError, ModelInfo, ModelIntrospector};
use crate::diff::ByteRange;

/// Flatbuffer file identifier of TFLite models.
pub const FILE_IDENTIFIER: &[u8; 4] = b"TFL3";

/// Introspector for `.tflite` flatbuffers.
#[derive(Debug, Default, Clone, Copy)]
pub struct TfliteIntrospector;

impl ModelIntrospector for TfliteIntrospector {
    fn name(&self) -> &'static str {
        "tflite"
    }

    fn introspect(
        &self,
        target: &[u8],
        arena_factor: Option<f64>,
    ) -> Result<ModelInfo, IntrospectError> {
        let model = ParsedModel::parse(target)?;

        let io_sig = |indices: &[i32]| -> Result<Vec<TensorSignature>, IntrospectError> {
            indices
                .iter()
                .map(|&idx| model.tensor(idx).map(|t| t.signature.clone()))
                .collect()
        };
        let inputs = io_sig(&model.inputs)?;
        let outputs = io_sig(&model.outputs)?;

        let activation_bytes: u64 = model
            .tensors
            .iter()
            .filter(|t| !model.is_constant(t))
            .map(|t| fingerprint::tensor_bytes(&t.signature))
            .fold(0, u64::saturating_add);

        let info = ModelInfo {
            abi: (model.version & 0xFFFF) as u16,
            opset_fingerprint: fingerprint::opset_fingerprint(&model.operator_codes),
            io_fingerprint: fingerprint::io_fingerprint(&inputs, &outputs),
            required_arena_bytes: fingerprint::estimate_arena(activation_bytes, arena_factor),
        };
        debug!(
            "tflite: version={} opcodes={} tensors={} activation_bytes={activation_bytes}",
            model.version,
            model.operator_codes.len(),
            model.tensors.len()
        );
        Ok(info)
    }

    fn weight_ranges(&self, target: &[u8]) -> Result<Vec<ByteRange>, IntrospectError> {
        let model = ParsedModel::parse(target)?;
        model
            .buffers
            .iter()
            .filter_map(|b| b.span)
            .filter(|&(_, len)| len > 0)
            .map(|(start, len)| {
                let end = start + len;
                let start = u32::try_from(start).map_err(|_| too_large(start))?;
                let end = u32::try_from(end).map_err(|_| too_large(end))?;
                Ok(ByteRange { start, end })
            })
            .collect()
    }
}

fn malformed(msg: impl Into<String>) -> IntrospectError {
    IntrospectError::Malformed(msg.into())
}

fn too_large(pos: usize) -> IntrospectError {
    malformed(format!("buffer position {pos} exceeds 32-bit offsets"))
}

// ---------------------------------------------------------------------------
// Parsed model
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct TensorDesc {
    signature: TensorSignature,
    buffer: u32,
}

#[derive(Debug)]
struct BufferDesc {
    /// Absolute `(start, len)` of the buffer contents, if any.
    span: Option<(usize, usize)>,
}

#[derive(Debug)]
struct ParsedModel {
    version: u32,
    operator_codes: Vec<u32>,
    tensors: Vec<TensorDesc>,
    inputs: Vec<i32>,
    outputs: Vec<i32>,
    buffers: Vec<BufferDesc>,
}

impl ParsedModel {
    fn parse(data: &[u8]) -> Result<Self, IntrospectError> {
        let fb = FlatBuffer::new(data)?;
        let model = fb.root()?;

        let version = fb.scalar_u32(model, 0, 0)?;

        let mut operator_codes = Vec::new();
        for op in fb.tables(model, 1)? {
            let deprecated = fb.scalar_i8(op, 0, 0)? as i32;
            let builtin = fb.scalar_i32(op, 3, 0)?;
            operator_codes.push((deprecated.max(builtin) as u32) & 0xFFFF);
        }

        let subgraphs = fb.tables(model, 2)?;
        let Some(&subgraph) = subgraphs.first() else {
            return Err(malformed("model has no subgraphs"));
        };

        let mut tensors = Vec::new();
        for t in fb.tables(subgraph, 0)? {
            tensors.push(TensorDesc {
                signature: TensorSignature {
                    dtype: fb.scalar_i8(t, 1, 0)? as i32,
                    shape: fb.i32s(t, 0)?,
                },
                buffer: fb.scalar_u32(t, 2, 0)?,
            });
        }
        let inputs = fb.i32s(subgraph, 1)?;
        let outputs = fb.i32s(subgraph, 2)?;

        let mut buffers = Vec::new();
        for b in fb.tables(model, 4)? {
            let span = match fb.vector(b, 0, 1)? {
                Some((start, len)) if len > 0 => Some((start, len)),
                _ => external_span(&fb, b)?,
            };
            buffers.push(BufferDesc { span });
        }

        Ok(Self {
            version,
            operator_codes,
            tensors,
            inputs,
            outputs,
            buffers,
        })
    }

    fn tensor(&self, index: i32) -> Result<&TensorDesc, IntrospectError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.tensors.get(i))
            .ok_or_else(|| malformed(format!("tensor index {index} out of range")))
    }

    /// A tensor is constant when its buffer holds data.
    fn is_constant(&self, tensor: &TensorDesc) -> bool {
        self.buffers
            .get(tensor.buffer as usize)
            .and_then(|b| b.span)
            .is_some_and(|(_, len)| len > 0)
    }
}

/// Buffers of large models may live after the flatbuffer, addressed by an
/// absolute offset and size; an offset of 0 or 1 means "not external".
fn external_span(fb: &FlatBuffer<'_>, buffer: Table) -> Result<Option<(usize, usize)>, IntrospectError> {
    let offset = fb.scalar_u64(buffer, 1, 0)?;
    let size = fb.scalar_u64(buffer, 2, 0)?;
    if offset <= 1 || size == 0 {
        return Ok(None);
    }
    let start = usize::try_from(offset).map_err(|_| malformed("external buffer offset overflow"))?;
    let len = usize::try_from(size).map_err(|_| malformed("external buffer size overflow"))?;
    fb.bytes(start, len)?;
    Ok(Some((start, len)))
}

// ---------------------------------------------------------------------------
// Flatbuffer reader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Table {
    pos: usize,
    vtable: usize,
    vtable_len: usize,
}

struct FlatBuffer<'a> {
    data: &'a [u8],
}

impl<'a> FlatBuffer<'a> {
    fn new(data: &'a [u8]) -> Result<Self, IntrospectError> {
        if data.len() < 8 {
            return Err(malformed("file too small for a flatbuffer"));
        }
        if &data[4..8] != FILE_IDENTIFIER {
            return Err(malformed("missing TFL3 file identifier"));
        }
        Ok(Self { data })
    }

    fn bytes(&self, pos: usize, len: usize) -> Result<&'a [u8], IntrospectError> {
        pos.checked_add(len)
            .and_then(|end| self.data.get(pos..end))
            .ok_or_else(|| malformed(format!("read of {len} bytes at {pos} out of bounds")))
    }

    fn read_u16(&self, pos: usize) -> Result<u16, IntrospectError> {
        let b = self.bytes(pos, 2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn read_u32(&self, pos: usize) -> Result<u32, IntrospectError> {
        let b = self.bytes(pos, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&self, pos: usize) -> Result<u64, IntrospectError> {
        let b = self.bytes(pos, 8)?;
        let mut word = [0u8; 8];
        word.copy_from_slice(b);
        Ok(u64::from_le_bytes(word))
    }

    fn root(&self) -> Result<Table, IntrospectError> {
        let pos = self.read_u32(0)? as usize;
        self.table(pos)
    }

    fn table(&self, pos: usize) -> Result<Table, IntrospectError> {
        let soffset = self.read_u32(pos)? as i32 as i64;
        let vtable = usize::try_from(pos as i64 - soffset)
            .map_err(|_| malformed(format!("vtable before start of file (table at {pos})")))?;
        let vtable_len = self.read_u16(vtable)? as usize;
        if vtable_len < 4 || vtable_len % 2 != 0 {
            return Err(malformed(format!("bad vtable length {vtable_len} at {vtable}")));
        }
        self.bytes(vtable, vtable_len)?;
        Ok(Table {
            pos,
            vtable,
            vtable_len,
        })
    }

    /// Absolute position of field `index`, or `None` when absent.
    fn field(&self, t: Table, index: usize) -> Result<Option<usize>, IntrospectError> {
        let entry = 4 + index * 2;
        if entry + 2 > t.vtable_len {
            return Ok(None);
        }
        let off = self.read_u16(t.vtable + entry)? as usize;
        Ok((off != 0).then_some(t.pos + off))
    }

    fn follow(&self, pos: usize) -> Result<usize, IntrospectError> {
        let off = self.read_u32(pos)? as usize;
        pos.checked_add(off)
            .ok_or_else(|| malformed(format!("offset overflow at {pos}")))
    }

    /// `(first element position, element count)` of a vector field.
    fn vector(
        &self,
        t: Table,
        index: usize,
        elem_size: usize,
    ) -> Result<Option<(usize, usize)>, IntrospectError> {
        let Some(field) = self.field(t, index)? else {
            return Ok(None);
        };
        let vec_pos = self.follow(field)?;
        let count = self.read_u32(vec_pos)? as usize;
        let start = vec_pos + 4;
        let byte_len = count
            .checked_mul(elem_size)
            .ok_or_else(|| malformed("vector length overflow"))?;
        self.bytes(start, byte_len)?;
        Ok(Some((start, count)))
    }

    fn tables(&self, t: Table, index: usize) -> Result<Vec<Table>, IntrospectError> {
        let Some((start, count)) = self.vector(t, index, 4)? else {
            return Ok(Vec::new());
        };
        (0..count)
            .map(|i| self.follow(start + i * 4).and_then(|pos| self.table(pos)))
            .collect()
    }

    fn i32s(&self, t: Table, index: usize) -> Result<Vec<i32>, IntrospectError> {
        let Some((start, count)) = self.vector(t, index, 4)? else {
            return Ok(Vec::new());
        };
        (0..count)
            .map(|i| self.read_u32(start + i * 4).map(|v| v as i32))
            .collect()
    }

    fn scalar_i8(&self, t: Table, index: usize, default: i8) -> Result<i8, IntrospectError> {
        match self.field(t, index)? {
            Some(pos) => Ok(self.bytes(pos, 1)?[0] as i8),
            None => Ok(default),
        }
    }

    fn scalar_i32(&self, t: Table, index: usize, default: i32) -> Result<i32, IntrospectError> {
        match self.field(t, index)? {
            Some(pos) => Ok(self.read_u32(pos)? as i32),
            None => Ok(default),
        }
    }

    fn scalar_u32(&self, t: Table, index: usize, default: u32) -> Result<u32, IntrospectError> {
        match self.field(t, index)? {
            Some(pos) => self.read_u32(pos),
            None => Ok(default),
        }
    }

    fn scalar_u64(&self, t: Table, index: usize, default: u64) -> Result<u64, IntrospectError> {
        match self.field(t, index)? {
            Some(pos) => self.read_u64(pos),
            None => Ok(default),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash;

    /// Forward-only flatbuffer writer: parents are written before children
    /// and reference slots are linked once the child position is known.
    struct Builder {
        buf: Vec<u8>,
    }

    enum Field {
        Absent,
        U8(u8),
        I32(i32),
        U32(u32),
        U64(u64),
        Ref,
    }

    impl Builder {
        fn new() -> Self {
            Self { buf: vec![0; 8] }
        }

        fn align(&mut self) {
            while self.buf.len() % 4 != 0 {
                self.buf.push(0);
            }
        }

        fn table(&mut self, fields: &[Field]) -> (usize, Vec<usize>) {
            self.align();
            let vt_pos = self.buf.len();
            let mut offsets = Vec::new();
            let mut cursor = 4usize;
            for f in fields {
                let size = match f {
                    Field::Absent => 0,
                    Field::U64(_) => 8,
                    _ => 4,
                };
                offsets.push(if size == 0 { 0 } else { cursor as u16 });
                cursor += size;
            }
            let vt_len = (4 + 2 * fields.len()) as u16;
            self.buf.extend_from_slice(&vt_len.to_le_bytes());
            self.buf.extend_from_slice(&(cursor as u16).to_le_bytes());
            for off in offsets {
                self.buf.extend_from_slice(&off.to_le_bytes());
            }
            self.align();
            let table_pos = self.buf.len();
            self.buf
                .extend_from_slice(&((table_pos - vt_pos) as i32).to_le_bytes());
            let mut refs = Vec::new();
            for f in fields {
                match f {
                    Field::Absent => {}
                    Field::U8(v) => self.buf.extend_from_slice(&[*v, 0, 0, 0]),
                    Field::I32(v) => self.buf.extend_from_slice(&v.to_le_bytes()),
                    Field::U32(v) => self.buf.extend_from_slice(&v.to_le_bytes()),
                    Field::U64(v) => self.buf.extend_from_slice(&v.to_le_bytes()),
                    Field::Ref => {
                        refs.push(self.buf.len());
                        self.buf.extend_from_slice(&[0; 4]);
                    }
                }
            }
            (table_pos, refs)
        }

        fn vec_u8(&mut self, data: &[u8]) -> usize {
            self.align();
            let pos = self.buf.len();
            self.buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
            self.buf.extend_from_slice(data);
            pos
        }

        fn vec_i32(&mut self, data: &[i32]) -> usize {
            self.align();
            let pos = self.buf.len();
            self.buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
            for v in data {
                self.buf.extend_from_slice(&v.to_le_bytes());
            }
            pos
        }

        fn vec_refs(&mut self, count: usize) -> (usize, Vec<usize>) {
            self.align();
            let pos = self.buf.len();
            self.buf.extend_from_slice(&(count as u32).to_le_bytes());
            let slots = (0..count)
                .map(|i| pos + 4 + i * 4)
                .collect::<Vec<_>>();
            self.buf.resize(pos + 4 + count * 4, 0);
            (pos, slots)
        }

        fn link(&mut self, slot: usize, target: usize) {
            assert!(target > slot);
            let off = (target - slot) as u32;
            self.buf[slot..slot + 4].copy_from_slice(&off.to_le_bytes());
        }

        fn finish(mut self, root: usize) -> Vec<u8> {
            self.buf[0..4].copy_from_slice(&(root as u32).to_le_bytes());
            self.buf[4..8].copy_from_slice(FILE_IDENTIFIER);
            self.buf
        }
    }

    struct TestTensor {
        dtype: u8,
        shape: Vec<i32>,
        buffer: u32,
    }

    struct TestModel {
        version: u32,
        opcodes: Vec<i32>,
        tensors: Vec<TestTensor>,
        inputs: Vec<i32>,
        outputs: Vec<i32>,
        buffers: Vec<Vec<u8>>,
        /// Buffers stored after the flatbuffer and addressed by offset/size.
        external: Vec<usize>,
    }

    impl TestModel {
        fn to_bytes(&self) -> Vec<u8> {
            self.to_bytes_with_offset_slots().0
        }

        /// Also returns where each external buffer's `offset` field lives.
        fn to_bytes_with_offset_slots(&self) -> (Vec<u8>, Vec<usize>) {
            let mut b = Builder::new();
            let (model, model_refs) = b.table(&[
                Field::U32(self.version),
                Field::Ref,
                Field::Ref,
                Field::Absent,
                Field::Ref,
            ]);

            let (ops_vec, op_slots) = b.vec_refs(self.opcodes.len());
            b.link(model_refs[0], ops_vec);
            for (slot, &code) in op_slots.into_iter().zip(&self.opcodes) {
                let deprecated = code.min(127) as u8;
                let (op, _) = b.table(&[
                    Field::U8(deprecated),
                    Field::Absent,
                    Field::I32(1),
                    Field::I32(code),
                ]);
                b.link(slot, op);
            }

            let (sg_vec, sg_slots) = b.vec_refs(1);
            b.link(model_refs[1], sg_vec);
            let (subgraph, sg_refs) = b.table(&[Field::Ref, Field::Ref, Field::Ref]);
            b.link(sg_slots[0], subgraph);

            let (tensor_vec, tensor_slots) = b.vec_refs(self.tensors.len());
            b.link(sg_refs[0], tensor_vec);
            for (slot, t) in tensor_slots.into_iter().zip(&self.tensors) {
                let (tensor, refs) =
                    b.table(&[Field::Ref, Field::U8(t.dtype), Field::U32(t.buffer)]);
                b.link(slot, tensor);
                let shape = b.vec_i32(&t.shape);
                b.link(refs[0], shape);
            }
            let inputs = b.vec_i32(&self.inputs);
            b.link(sg_refs[1], inputs);
            let outputs = b.vec_i32(&self.outputs);
            b.link(sg_refs[2], outputs);

            let (buf_vec, buf_slots) = b.vec_refs(self.buffers.len());
            b.link(model_refs[2], buf_vec);
            let mut pending = Vec::new();
            for (i, (slot, data)) in buf_slots.into_iter().zip(&self.buffers).enumerate() {
                if self.external.contains(&i) {
                    let (buffer, _) = b.table(&[
                        Field::Absent,
                        Field::U64(0),
                        Field::U64(data.len() as u64),
                    ]);
                    b.link(slot, buffer);
                    pending.push((buffer + 4, data));
                } else if data.is_empty() {
                    let (buffer, _) = b.table(&[]);
                    b.link(slot, buffer);
                } else {
                    let (buffer, refs) = b.table(&[Field::Ref]);
                    b.link(slot, buffer);
                    let bytes = b.vec_u8(data);
                    b.link(refs[0], bytes);
                }
            }

            let mut bytes = b.finish(model);
            let mut slots = Vec::new();
            for (slot, data) in pending {
                bytes.resize(bytes.len().next_multiple_of(16), 0);
                let offset = bytes.len() as u64;
                bytes[slot..slot + 8].copy_from_slice(&offset.to_le_bytes());
                bytes.extend_from_slice(data);
                slots.push(slot);
            }
            (bytes, slots)
        }
    }

    /// input(int8 1x4) -> FULLY_CONNECTED(weights, bias) -> output(int8 1x2)
    fn sample_model() -> TestModel {
        TestModel {
            version: 3,
            opcodes: vec![9, 22, 9],
            tensors: vec![
                TestTensor { dtype: 9, shape: vec![1, 4], buffer: 0 },
                TestTensor { dtype: 9, shape: vec![2, 4], buffer: 1 },
                TestTensor { dtype: 2, shape: vec![2], buffer: 2 },
                TestTensor { dtype: 9, shape: vec![-1, 2], buffer: 0 },
            ],
            inputs: vec![0],
            outputs: vec![3],
            buffers: vec![vec![], vec![7; 8], vec![1, 0, 0, 0, 2, 0, 0, 0]],
            external: vec![],
        }
    }

    #[test]
    fn introspect_sample_model() {
        let bytes = sample_model().to_bytes();
        let info = TfliteIntrospector.introspect(&bytes, Some(1.5)).unwrap();

        assert_eq!(info.abi, 3);
        assert_eq!(info.opset_fingerprint, hash::hash_list_u32(&[9, 9, 22]));

        let mut words = Vec::new();
        for w in [9u32, 1, 4, 0xDEAD_BEEF, 9, (-1i32) as u32, 2] {
            words.extend_from_slice(&w.to_le_bytes());
        }
        assert_eq!(info.io_fingerprint, crc32fast::hash(&words));

        // Non-constant tensors: input 1x4 int8 (4) + output 1x2 int8 (2) = 6 bytes.
        assert_eq!(info.required_arena_bytes, 9);
    }

    #[test]
    fn arena_is_zero_without_factor() {
        let bytes = sample_model().to_bytes();
        let info = TfliteIntrospector.introspect(&bytes, None).unwrap();
        assert_eq!(info.required_arena_bytes, 0);
        assert_eq!(info.metadata().req_arena_bytes, None);
    }

    #[test]
    fn weight_ranges_point_at_buffer_data() {
        let model = sample_model();
        let bytes = model.to_bytes();
        let ranges = TfliteIntrospector.weight_ranges(&bytes).unwrap();
        assert_eq!(ranges.len(), 2);
        for (range, data) in ranges.iter().zip(&model.buffers[1..]) {
            assert_eq!(&bytes[range.start as usize..range.end as usize], &data[..]);
        }
    }

    #[test]
    fn opset_ignores_operator_declaration_order() {
        let a = sample_model().to_bytes();
        let mut reordered = sample_model();
        reordered.opcodes = vec![22, 9, 9];
        let b = reordered.to_bytes();
        let fa = TfliteIntrospector.introspect(&a, None).unwrap();
        let fb = TfliteIntrospector.introspect(&b, None).unwrap();
        assert_eq!(fa.opset_fingerprint, fb.opset_fingerprint);
    }

    #[test]
    fn extended_builtin_codes_use_the_wide_field() {
        let mut model = sample_model();
        model.opcodes = vec![150];
        let info = TfliteIntrospector.introspect(&model.to_bytes(), None).unwrap();
        assert_eq!(info.opset_fingerprint, hash::hash_list_u32(&[150]));
    }

    #[test]
    fn rejects_non_tflite_bytes() {
        let err = TfliteIntrospector.introspect(b"definitely not a model", None);
        assert!(matches!(err, Err(IntrospectError::Malformed(_))));
        assert!(TfliteIntrospector.weight_ranges(b"tiny").is_err());
    }

    #[test]
    fn rejects_truncated_model() {
        let bytes = sample_model().to_bytes();
        for cut in [9, bytes.len() / 2, bytes.len() - 1] {
            assert!(
                TfliteIntrospector.introspect(&bytes[..cut], None).is_err(),
                "cut at {cut} should fail"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_io_index() {
        let mut model = sample_model();
        model.outputs = vec![17];
        let err = TfliteIntrospector.introspect(&model.to_bytes(), None);
        assert!(matches!(err, Err(IntrospectError::Malformed(_))));
    }

    #[test]
    fn external_buffers_are_read_past_the_flatbuffer() {
        let mut model = sample_model();
        model.external = vec![1];
        let (bytes, slots) = model.to_bytes_with_offset_slots();
        assert_eq!(slots.len(), 1);

        let ranges = TfliteIntrospector.weight_ranges(&bytes).unwrap();
        assert_eq!(ranges.len(), 2);
        let external = ranges
            .iter()
            .find(|r| r.end as usize == bytes.len())
            .expect("external range at end of file");
        assert_eq!(external.end - external.start, 8);
        assert_eq!(&bytes[external.start as usize..], &[7; 8]);

        // The weights tensor stays constant, so the arena is unchanged.
        let info = TfliteIntrospector.introspect(&bytes, Some(1.5)).unwrap();
        assert_eq!(info.required_arena_bytes, 9);
    }

    #[test]
    fn external_offset_of_one_is_not_external() {
        let mut model = sample_model();
        model.external = vec![1];
        let (mut bytes, slots) = model.to_bytes_with_offset_slots();
        bytes[slots[0]..slots[0] + 8].copy_from_slice(&1u64.to_le_bytes());

        let ranges = TfliteIntrospector.weight_ranges(&bytes).unwrap();
        assert_eq!(ranges.len(), 1);

        // Weights 2x4 int8 now count as activations: 4 + 8 + 2 = 14 bytes.
        let info = TfliteIntrospector.introspect(&bytes, Some(1.0)).unwrap();
        assert_eq!(info.required_arena_bytes, 14);
    }

    #[test]
    fn external_buffer_past_end_of_file_is_rejected() {
        let mut model = sample_model();
        model.external = vec![1];
        let bytes = model.to_bytes();
        let err = TfliteIntrospector.weight_ranges(&bytes[..bytes.len() - 1]);
        assert!(matches!(err, Err(IntrospectError::Malformed(_))));
    }
}
