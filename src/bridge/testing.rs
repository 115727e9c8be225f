// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stub analysis binary shared by the unit tests.

pub(crate) const STUB_WAT: &str = include_str!("../../tests/fixtures/analysis_stub.wat");

pub(crate) fn stub_binary_bytes() -> Vec<u8> {
    wat::parse_str(STUB_WAT).expect("stub analysis binary must assemble")
}
