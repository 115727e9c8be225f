// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! One live instance of the analysis binary.
//!
//! ## Host-to-binary protocol
//! 1. Host calls `alloc(len)` where `len` is the UTF-8 byte length + 1
//! 2. Host writes the source bytes and a NUL terminator at the returned pointer
//! 3. Host calls one `ASL_*` entry point with that pointer (and a position)
//! 4. Host reads the returned result handle through accessor exports only
//! 5. Host calls `dealloc(ptr, len)` when the binary exports it
//!
//! The instance is dropped after a single request.

use crate::bridge::abi;
use crate::bridge::decode::HandleReader;
use crate::bridge::error::{BridgeError, BridgeResult};
use crate::bridge::handle::{Handle, Span};
use crate::codec::TextCodec;
use wasmtime::{
    Engine, Instance, Linker, Memory, Module, Store, TypedFunc, WasmParams, WasmResults,
};

/// The source text uploaded into linear memory for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceBuffer {
    ptr: i32,
    len: i32,
}

impl SourceBuffer {
    pub fn ptr(&self) -> i32 {
        self.ptr
    }

    /// Byte length including the NUL terminator.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len <= 1
    }
}

type Accessor = TypedFunc<i32, i32>;
type PositionQuery = TypedFunc<(i32, i32, i32), i32>;

struct Exports {
    alloc: TypedFunc<i32, i32>,
    dealloc: Option<TypedFunc<(i32, i32), ()>>,
    compile: Accessor,
    hover: PositionQuery,
    go_to_definition: PositionQuery,
    find_all_references: PositionQuery,
    result_is_ok: Accessor,
    result_ok: Accessor,
    result_error: Accessor,
    buf_as_ptr: Accessor,
    buf_len: Accessor,
    error_msg_ptr: Accessor,
    error_msg_len: Accessor,
    error_span: Accessor,
    span_line_from: Accessor,
    span_column_from: Accessor,
    span_line_to: Accessor,
    span_column_to: Accessor,
    hover_ty: Accessor,
    hover_span: Accessor,
    spans_get: TypedFunc<(i32, i32), i32>,
}

impl Exports {
    fn resolve(store: &mut Store<()>, instance: &Instance) -> BridgeResult<Self> {
        Ok(Self {
            alloc: typed(store, instance, abi::ALLOC)?,
            dealloc: typed(store, instance, abi::DEALLOC).ok(),
            compile: typed(store, instance, abi::COMPILE)?,
            hover: typed(store, instance, abi::HOVER)?,
            go_to_definition: typed(store, instance, abi::GO_TO_DEFINITION)?,
            find_all_references: typed(store, instance, abi::FIND_ALL_REFERENCES)?,
            result_is_ok: typed(store, instance, abi::RESULT_IS_OK)?,
            result_ok: typed(store, instance, abi::RESULT_OK)?,
            result_error: typed(store, instance, abi::RESULT_ERROR)?,
            buf_as_ptr: typed(store, instance, abi::BUF_AS_PTR)?,
            buf_len: typed(store, instance, abi::BUF_LEN)?,
            error_msg_ptr: typed(store, instance, abi::ERROR_MSG_PTR)?,
            error_msg_len: typed(store, instance, abi::ERROR_MSG_LEN)?,
            error_span: typed(store, instance, abi::ERROR_SPAN)?,
            span_line_from: typed(store, instance, abi::SPAN_LINE_FROM)?,
            span_column_from: typed(store, instance, abi::SPAN_COLUMN_FROM)?,
            span_line_to: typed(store, instance, abi::SPAN_LINE_TO)?,
            span_column_to: typed(store, instance, abi::SPAN_COLUMN_TO)?,
            hover_ty: typed(store, instance, abi::HOVER_TY)?,
            hover_span: typed(store, instance, abi::HOVER_SPAN)?,
            spans_get: typed(store, instance, abi::SPANS_GET)?,
        })
    }
}

fn typed<P, R>(
    store: &mut Store<()>,
    instance: &Instance,
    name: &'static str,
) -> BridgeResult<TypedFunc<P, R>>
where
    P: WasmParams,
    R: WasmResults,
{
    instance
        .get_typed_func::<P, R>(&mut *store, name)
        .map_err(|e| BridgeError::MissingExport {
            name,
            reason: e.to_string(),
        })
}

/// A fresh store and instance of the analysis binary.
pub struct AnalysisInstance {
    store: Store<()>,
    memory: Memory,
    exports: Exports,
    fuel: u64,
}

impl AnalysisInstance {
    pub(crate) fn new(engine: &Engine, module: &Module, fuel: u64) -> BridgeResult<Self> {
        let mut store = Store::new(engine, ());
        store.set_fuel(fuel)?;

        // No host functions are provided to the analysis binary.
        let linker = Linker::new(engine);
        let instance = linker
            .instantiate(&mut store, module)
            .map_err(|e| BridgeError::ModuleError(e.to_string()))?;

        let memory = instance
            .get_memory(&mut store, abi::MEMORY)
            .ok_or_else(|| BridgeError::MissingExport {
                name: abi::MEMORY,
                reason: "not exported".to_string(),
            })?;
        let exports = Exports::resolve(&mut store, &instance)?;

        Ok(Self {
            store,
            memory,
            exports,
            fuel,
        })
    }

    /// Fuel burnt so far by this instance.
    pub fn fuel_consumed(&self) -> u64 {
        self.fuel.saturating_sub(self.store.get_fuel().unwrap_or(0))
    }

    /// Allocates and writes `text` as a NUL-terminated buffer.
    pub fn upload_source(&mut self, codec: TextCodec, text: &str) -> BridgeResult<SourceBuffer> {
        let bytes = codec.encode_source(text);
        let len = i32::try_from(bytes.len()).map_err(|_| BridgeError::SourceTooLarge {
            size: bytes.len(),
            max: i32::MAX as usize,
        })?;

        let ptr = self.exports.alloc.call(&mut self.store, len)?;
        if ptr == 0 {
            return Err(BridgeError::AllocationFailed(bytes.len()));
        }

        self.check_bounds(ptr, len)?;
        self.memory
            .write(&mut self.store, ptr as u32 as usize, &bytes)
            .map_err(|_| self.out_of_bounds(ptr, len))?;

        Ok(SourceBuffer { ptr, len })
    }

    /// Returns the buffer to the binary's allocator when it exports `dealloc`.
    pub fn release(&mut self, buffer: SourceBuffer) -> BridgeResult<()> {
        if let Some(dealloc) = &self.exports.dealloc {
            dealloc.call(&mut self.store, (buffer.ptr, buffer.len))?;
        }
        Ok(())
    }

    pub fn compile(&mut self, source: &SourceBuffer) -> BridgeResult<Handle> {
        let raw = self.exports.compile.call(&mut self.store, source.ptr)?;
        Ok(Handle::from_raw(raw))
    }

    pub fn hover(&mut self, source: &SourceBuffer, line: u32, column: u32) -> BridgeResult<Handle> {
        let (line, column) = position(line, column)?;
        let raw = self
            .exports
            .hover
            .call(&mut self.store, (source.ptr, line, column))?;
        Ok(Handle::from_raw(raw))
    }

    pub fn go_to_definition(
        &mut self,
        source: &SourceBuffer,
        line: u32,
        column: u32,
    ) -> BridgeResult<Handle> {
        let (line, column) = position(line, column)?;
        let raw = self
            .exports
            .go_to_definition
            .call(&mut self.store, (source.ptr, line, column))?;
        Ok(Handle::from_raw(raw))
    }

    pub fn find_all_references(
        &mut self,
        source: &SourceBuffer,
        line: u32,
        column: u32,
    ) -> BridgeResult<Handle> {
        let (line, column) = position(line, column)?;
        let raw = self
            .exports
            .find_all_references
            .call(&mut self.store, (source.ptr, line, column))?;
        Ok(Handle::from_raw(raw))
    }

    /// Copies `len` bytes at `ptr` out of linear memory.
    pub fn read_bytes(&mut self, ptr: i32, len: i32) -> BridgeResult<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        self.check_bounds(ptr, len)?;
        let mut buf = vec![0u8; len as u32 as usize];
        self.memory
            .read(&self.store, ptr as u32 as usize, &mut buf)
            .map_err(|_| self.out_of_bounds(ptr, len))?;
        Ok(buf)
    }

    fn check_bounds(&self, ptr: i32, len: i32) -> BridgeResult<()> {
        let start = ptr as u32 as usize;
        let end = start.checked_add(len as u32 as usize);
        match end {
            Some(end) if end <= self.memory.data_size(&self.store) => Ok(()),
            _ => Err(self.out_of_bounds(ptr, len)),
        }
    }

    fn out_of_bounds(&self, ptr: i32, len: i32) -> BridgeError {
        BridgeError::OutOfBounds {
            ptr: ptr as u32,
            len: len as u32,
            memory_size: self.memory.data_size(&self.store),
        }
    }

}

fn invoke(func: &Accessor, store: &mut Store<()>, handle: Handle) -> BridgeResult<i32> {
    Ok(func.call(store, handle.raw())?)
}

fn position(line: u32, column: u32) -> BridgeResult<(i32, i32)> {
    match (i32::try_from(line), i32::try_from(column)) {
        (Ok(l), Ok(c)) => Ok((l, c)),
        _ => Err(BridgeError::InvalidPosition { line, column }),
    }
}

impl HandleReader for AnalysisInstance {
    fn result_is_ok(&mut self, result: Handle) -> BridgeResult<bool> {
        Ok(invoke(&self.exports.result_is_ok, &mut self.store, result)? != 0)
    }

    fn result_ok(&mut self, result: Handle) -> BridgeResult<Handle> {
        invoke(&self.exports.result_ok, &mut self.store, result).map(Handle::from_raw)
    }

    fn result_error(&mut self, result: Handle) -> BridgeResult<Handle> {
        invoke(&self.exports.result_error, &mut self.store, result).map(Handle::from_raw)
    }

    fn buf_bytes(&mut self, buf: Handle) -> BridgeResult<Vec<u8>> {
        let ptr = invoke(&self.exports.buf_as_ptr, &mut self.store, buf)?;
        let len = invoke(&self.exports.buf_len, &mut self.store, buf)?;
        self.read_bytes(ptr, len)
    }

    fn error_message(&mut self, error: Handle) -> BridgeResult<Vec<u8>> {
        let ptr = invoke(&self.exports.error_msg_ptr, &mut self.store, error)?;
        let len = invoke(&self.exports.error_msg_len, &mut self.store, error)?;
        self.read_bytes(ptr, len)
    }

    fn error_span(&mut self, error: Handle) -> BridgeResult<Handle> {
        invoke(&self.exports.error_span, &mut self.store, error).map(Handle::from_raw)
    }

    fn span(&mut self, span: Handle) -> BridgeResult<Span> {
        Ok(Span {
            line_from: invoke(&self.exports.span_line_from, &mut self.store, span)? as u32,
            column_from: invoke(&self.exports.span_column_from, &mut self.store, span)? as u32,
            line_to: invoke(&self.exports.span_line_to, &mut self.store, span)? as u32,
            column_to: invoke(&self.exports.span_column_to, &mut self.store, span)? as u32,
        })
    }

    fn hover_ty(&mut self, hover: Handle) -> BridgeResult<Handle> {
        invoke(&self.exports.hover_ty, &mut self.store, hover).map(Handle::from_raw)
    }

    fn hover_span(&mut self, hover: Handle) -> BridgeResult<Handle> {
        invoke(&self.exports.hover_span, &mut self.store, hover).map(Handle::from_raw)
    }

    fn spans_get(&mut self, spans: Handle, index: u32) -> BridgeResult<Handle> {
        let index = i32::try_from(index).map_err(|_| BridgeError::MalformedResult {
            entry_point: abi::SPANS_GET,
            reason: format!("index {} exceeds the wasm32 range", index),
        })?;
        let raw = self
            .exports
            .spans_get
            .call(&mut self.store, (spans.raw(), index))?;
        Ok(Handle::from_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::binary::AnalysisBinary;
    use crate::bridge::testing::stub_binary_bytes;

    fn instance() -> AnalysisInstance {
        AnalysisBinary::from_bytes(&stub_binary_bytes(), 10_000_000)
            .unwrap()
            .instantiate()
            .unwrap()
    }

    #[test]
    fn test_upload_writes_nul_terminated_source() {
        let mut instance = instance();
        let buffer = instance
            .upload_source(TextCodec::Native, "start { true }")
            .unwrap();

        assert_eq!(buffer.len(), 15);
        let bytes = instance.read_bytes(buffer.ptr(), buffer.len() as i32).unwrap();
        assert_eq!(&bytes[..14], b"start { true }");
        assert_eq!(bytes[14], 0);
        assert!(instance.release(buffer).is_ok());
    }

    #[test]
    fn test_empty_source_buffer() {
        let mut instance = instance();
        let buffer = instance.upload_source(TextCodec::Manual, "").unwrap();
        assert_eq!(buffer.len(), 1);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_out_of_bounds_read_is_an_error() {
        let mut instance = instance();
        match instance.read_bytes(65_530, 64) {
            Err(BridgeError::OutOfBounds { ptr, len, memory_size }) => {
                assert_eq!(ptr, 65_530);
                assert_eq!(len, 64);
                assert_eq!(memory_size, 65_536);
            }
            other => panic!("Expected OutOfBounds, got {:?}", other),
        }
        assert!(matches!(
            instance.read_bytes(-1, 8),
            Err(BridgeError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_zero_length_read_never_touches_memory() {
        let mut instance = instance();
        assert!(instance.read_bytes(-1, 0).unwrap().is_empty());
    }

    #[test]
    fn test_fuel_is_consumed_by_calls() {
        let mut instance = instance();
        let buffer = instance.upload_source(TextCodec::Native, "start { false }").unwrap();
        instance.compile(&buffer).unwrap();
        assert!(instance.fuel_consumed() > 0);
    }

    #[test]
    fn test_position_outside_wasm32_range() {
        let mut instance = instance();
        let buffer = instance.upload_source(TextCodec::Native, "x").unwrap();
        assert!(matches!(
            instance.hover(&buffer, u32::MAX, 1),
            Err(BridgeError::InvalidPosition { .. })
        ));
    }
}
