// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Export surface of the analysis binary.
//!
//! Names are bit-exact with the exports of the compiled analysis binary. All
//! pointers and handles are wasm32 `i32` values; a handle of zero means "no
//! value".

pub const MEMORY: &str = "memory";

pub const ALLOC: &str = "alloc";
/// Optional. Released after decoding when present.
pub const DEALLOC: &str = "dealloc";

pub const COMPILE: &str = "ASL_compile";
pub const HOVER: &str = "ASL_hover";
pub const GO_TO_DEFINITION: &str = "ASL_go_to_definition";
pub const FIND_ALL_REFERENCES: &str = "ASL_find_all_references";

pub const RESULT_IS_OK: &str = "Result_is_ok";
pub const RESULT_OK: &str = "Result_ok";
pub const RESULT_ERROR: &str = "Result_error";

pub const BUF_AS_PTR: &str = "Buf_as_ptr";
pub const BUF_LEN: &str = "Buf_len";

pub const ERROR_MSG_PTR: &str = "Error_msg_ptr";
pub const ERROR_MSG_LEN: &str = "Error_msg_len";
pub const ERROR_SPAN: &str = "Error_span";

pub const SPAN_LINE_FROM: &str = "Span_line_from";
pub const SPAN_COLUMN_FROM: &str = "Span_column_from";
pub const SPAN_LINE_TO: &str = "Span_line_to";
pub const SPAN_COLUMN_TO: &str = "Span_column_to";

pub const HOVER_TY: &str = "Hover_ty";
pub const HOVER_SPAN: &str = "Hover_span";

pub const SPANS_GET: &str = "Spans_get";

/// Function exports every analysis binary must provide.
pub const REQUIRED_FUNCTIONS: &[&str] = &[
    ALLOC,
    COMPILE,
    HOVER,
    GO_TO_DEFINITION,
    FIND_ALL_REFERENCES,
    RESULT_IS_OK,
    RESULT_OK,
    RESULT_ERROR,
    BUF_AS_PTR,
    BUF_LEN,
    ERROR_MSG_PTR,
    ERROR_MSG_LEN,
    ERROR_SPAN,
    SPAN_LINE_FROM,
    SPAN_COLUMN_FROM,
    SPAN_LINE_TO,
    SPAN_COLUMN_TO,
    HOVER_TY,
    HOVER_SPAN,
    SPANS_GET,
];
