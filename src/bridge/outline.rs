// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Text outline of a compiled module for the read-only output buffer.

use crate::bridge::error::BridgeResult;
use wasmparser::{ExternalKind, Parser, Payload, TypeRef};

/// Renders the sections of `bytes` as a WAST-flavoured outline.
///
/// ```
/// use asl_bridge::bridge::outline::render_outline;
///
/// let empty = b"\0asm\x01\0\0\0";
/// assert_eq!(render_outline(empty).unwrap(), "(module)");
/// ```
pub fn render_outline(bytes: &[u8]) -> BridgeResult<String> {
    let mut lines = Vec::new();

    for payload in Parser::new(0).parse_all(bytes) {
        match payload? {
            Payload::TypeSection(reader) => {
                lines.push(format!(";; types: {}", reader.count()));
            }
            Payload::ImportSection(reader) => {
                for import in reader {
                    let import = import?;
                    let kind = match import.ty {
                        TypeRef::Func(index) => format!("(func (type {}))", index),
                        TypeRef::Table(_) => "(table)".to_string(),
                        TypeRef::Memory(memory) => format!("(memory {})", memory.initial),
                        TypeRef::Global(_) => "(global)".to_string(),
                        TypeRef::Tag(_) => "(tag)".to_string(),
                    };
                    lines.push(format!(
                        "(import \"{}\" \"{}\" {})",
                        import.module, import.name, kind
                    ));
                }
            }
            Payload::FunctionSection(reader) => {
                lines.push(format!(";; functions: {}", reader.count()));
            }
            Payload::MemorySection(reader) => {
                for memory in reader {
                    let memory = memory?;
                    match memory.maximum {
                        Some(max) => lines.push(format!("(memory {} {})", memory.initial, max)),
                        None => lines.push(format!("(memory {})", memory.initial)),
                    }
                }
            }
            Payload::GlobalSection(reader) => {
                lines.push(format!(";; globals: {}", reader.count()));
            }
            Payload::ExportSection(reader) => {
                for export in reader {
                    let export = export?;
                    let kind = match export.kind {
                        ExternalKind::Func => "func",
                        ExternalKind::Table => "table",
                        ExternalKind::Memory => "memory",
                        ExternalKind::Global => "global",
                        ExternalKind::Tag => "tag",
                    };
                    lines.push(format!(
                        "(export \"{}\" ({} {}))",
                        export.name, kind, export.index
                    ));
                }
            }
            Payload::StartSection { func, .. } => {
                lines.push(format!("(start {})", func));
            }
            Payload::DataSection(reader) => {
                lines.push(format!(";; data segments: {}", reader.count()));
            }
            _ => {}
        }
    }

    if lines.is_empty() {
        return Ok("(module)".to_string());
    }

    let mut text = String::from("(module\n");
    for line in lines {
        text.push_str("  ");
        text.push_str(&line);
        text.push('\n');
    }
    text.push(')');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_lists_sections() {
        let bytes = wat::parse_str(
            r#"(module
                (import "env" "tick" (func))
                (memory 1 2)
                (func $split (result i32) i32.const 1)
                (export "split" (func $split))
                (export "memory" (memory 0))
                (data (i32.const 0) "hi"))"#,
        )
        .unwrap();

        let outline = render_outline(&bytes).unwrap();
        assert!(outline.starts_with("(module\n"));
        assert!(outline.contains("(import \"env\" \"tick\" (func (type 0)))"));
        assert!(outline.contains("(memory 1 2)"));
        assert!(outline.contains(";; functions: 1"));
        assert!(outline.contains("(export \"split\" (func 1))"));
        assert!(outline.contains("(export \"memory\" (memory 0))"));
        assert!(outline.contains(";; data segments: 1"));
        assert!(outline.ends_with(')'));
    }

    #[test]
    fn test_truncated_module_is_an_error() {
        assert!(render_outline(b"\0asm\x01\0\0\0\x01\x05").is_err());
    }
}
