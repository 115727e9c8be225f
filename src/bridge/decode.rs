// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Decoding of result handles through accessor calls.
//!
//! Every entry point returns a result handle tagged ok/error. The functions in
//! this module turn such a handle into native values using nothing but the
//! [`HandleReader`] accessors, so they work the same against a live instance
//! and against a scripted reader in tests.
//!
//! Handle space per entry point:
//!
//! | handle            | compile                 | hover / definition / references |
//! |-------------------|-------------------------|---------------------------------|
//! | ok, value present | `CompileOutcome::Compiled` | `Some(..)`                   |
//! | ok, zero value    | malformed               | `None`                          |
//! | error             | `CompileOutcome::Failed`   | `None` (logged)              |

use crate::bridge::error::{BridgeError, BridgeResult};
use crate::bridge::handle::{CompileOutcome, CompiledModule, ErrorInfo, Handle, HoverInfo, Span};
use crate::codec::TextCodec;
use crate::observability::messages::bridge::{OptionalQueryErrorSuppressed, ReferenceCapReached};

/// Accessor exports of the analysis binary.
pub trait HandleReader {
    fn result_is_ok(&mut self, result: Handle) -> BridgeResult<bool>;
    fn result_ok(&mut self, result: Handle) -> BridgeResult<Handle>;
    fn result_error(&mut self, result: Handle) -> BridgeResult<Handle>;

    /// Contents of a byte buffer handle.
    fn buf_bytes(&mut self, buf: Handle) -> BridgeResult<Vec<u8>>;

    /// Message bytes of an error handle.
    fn error_message(&mut self, error: Handle) -> BridgeResult<Vec<u8>>;
    fn error_span(&mut self, error: Handle) -> BridgeResult<Handle>;

    /// All four fields of a span handle.
    fn span(&mut self, span: Handle) -> BridgeResult<Span>;

    fn hover_ty(&mut self, hover: Handle) -> BridgeResult<Handle>;
    fn hover_span(&mut self, hover: Handle) -> BridgeResult<Handle>;

    /// Positional access into a span list; zero past the end.
    fn spans_get(&mut self, spans: Handle, index: u32) -> BridgeResult<Handle>;
}

/// Decodes an error handle into message and optional span.
pub fn decode_error<R: HandleReader>(
    reader: &mut R,
    codec: TextCodec,
    error: Handle,
) -> BridgeResult<ErrorInfo> {
    let message = codec.decode(&reader.error_message(error)?);
    let span = match reader.error_span(error)?.present() {
        Some(span) => Some(reader.span(span)?),
        None => None,
    };
    Ok(ErrorInfo { message, span })
}

/// Decodes the result of the compile entry point.
pub fn decode_compile<R: HandleReader>(
    reader: &mut R,
    codec: TextCodec,
    result: Handle,
    entry_point: &'static str,
) -> BridgeResult<CompileOutcome> {
    if result.is_none() {
        return Err(BridgeError::MalformedResult {
            entry_point,
            reason: "null result handle".to_string(),
        });
    }

    if reader.result_is_ok(result)? {
        let buf = reader.result_ok(result)?.present().ok_or_else(|| {
            BridgeError::MalformedResult {
                entry_point,
                reason: "ok result without a module buffer".to_string(),
            }
        })?;
        let bytes = reader.buf_bytes(buf)?;
        Ok(CompileOutcome::Compiled(CompiledModule { bytes }))
    } else {
        let error = reader.result_error(result)?.present().ok_or_else(|| {
            BridgeError::MalformedResult {
                entry_point,
                reason: "error result without error value".to_string(),
            }
        })?;
        Ok(CompileOutcome::Failed(decode_error(reader, codec, error)?))
    }
}

/// Unwraps the result of an optional query.
///
/// The error variant is not surfaced: the query simply has no answer while the
/// source does not type check.
pub fn optional_value<R: HandleReader>(
    reader: &mut R,
    codec: TextCodec,
    result: Handle,
    entry_point: &'static str,
) -> BridgeResult<Option<Handle>> {
    if result.is_none() {
        return Err(BridgeError::MalformedResult {
            entry_point,
            reason: "null result handle".to_string(),
        });
    }

    if reader.result_is_ok(result)? {
        return Ok(reader.result_ok(result)?.present());
    }

    if let Some(error) = reader.result_error(result)?.present() {
        let info = decode_error(reader, codec, error)?;
        tracing::debug!(
            "{}",
            OptionalQueryErrorSuppressed {
                entry_point,
                message: &info.message,
            }
        );
    }
    Ok(None)
}

pub fn decode_hover<R: HandleReader>(
    reader: &mut R,
    codec: TextCodec,
    result: Handle,
    entry_point: &'static str,
) -> BridgeResult<Option<HoverInfo>> {
    let Some(hover) = optional_value(reader, codec, result, entry_point)? else {
        return Ok(None);
    };
    let ty = reader.hover_ty(hover)?;
    let ty = codec.decode(&reader.buf_bytes(ty)?);
    let span = reader.hover_span(hover)?.present().ok_or_else(|| {
        BridgeError::MalformedResult {
            entry_point,
            reason: "hover without span".to_string(),
        }
    })?;
    let span = reader.span(span)?;
    Ok(Some(HoverInfo { ty, span }))
}

pub fn decode_definition<R: HandleReader>(
    reader: &mut R,
    codec: TextCodec,
    result: Handle,
    entry_point: &'static str,
) -> BridgeResult<Option<Span>> {
    match optional_value(reader, codec, result, entry_point)? {
        Some(span) => Ok(Some(reader.span(span)?)),
        None => Ok(None),
    }
}

pub fn decode_references<R: HandleReader>(
    reader: &mut R,
    codec: TextCodec,
    result: Handle,
    entry_point: &'static str,
    cap: usize,
) -> BridgeResult<Option<Vec<Span>>> {
    let Some(list) = optional_value(reader, codec, result, entry_point)? else {
        return Ok(None);
    };
    let mut iter = SpanIter::new(reader, list, cap);
    let spans = iter.by_ref().collect::<BridgeResult<Vec<_>>>()?;
    if iter.truncated() {
        tracing::warn!("{}", ReferenceCapReached { cap });
    }
    Ok(Some(spans))
}

/// Lazy, finite view of a sentinel-terminated span list.
///
/// Queries `Spans_get` with increasing indices and stops at the first zero
/// handle, at the first error, or after `cap` spans, whichever comes first.
pub struct SpanIter<'r, R: HandleReader> {
    reader: &'r mut R,
    list: Handle,
    index: u32,
    cap: usize,
    finished: bool,
    truncated: bool,
}

impl<'r, R: HandleReader> SpanIter<'r, R> {
    pub fn new(reader: &'r mut R, list: Handle, cap: usize) -> Self {
        Self {
            reader,
            list,
            index: 0,
            cap,
            finished: false,
            truncated: false,
        }
    }

    /// True when iteration stopped at the cap rather than at the sentinel.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

impl<R: HandleReader> Iterator for SpanIter<'_, R> {
    type Item = BridgeResult<Span>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.index as usize >= self.cap {
            self.finished = true;
            self.truncated = true;
            return None;
        }

        let item = match self.reader.spans_get(self.list, self.index) {
            Ok(handle) if handle.is_none() => None,
            Ok(handle) => Some(self.reader.span(handle)),
            Err(e) => Some(Err(e)),
        };
        match &item {
            None | Some(Err(_)) => self.finished = true,
            Some(Ok(_)) => self.index += 1,
        }
        item
    }
}
