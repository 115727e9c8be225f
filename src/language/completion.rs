// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Static snippet completions for ASL.
//!
//! Insert texts use tab-stop syntax: `${1:placeholder}` for numbered stops and
//! `$0` / `${0:...}` for the final cursor position.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionItemKind {
    Keyword,
    Snippet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionItem {
    pub label: &'static str,
    pub kind: CompletionItemKind,
    pub insert_text: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<&'static str>,
}

const fn keyword(label: &'static str, insert_text: &'static str) -> CompletionItem {
    CompletionItem {
        label,
        kind: CompletionItemKind::Keyword,
        insert_text,
        documentation: None,
    }
}

pub const COMPLETION_ITEMS: &[CompletionItem] = &[
    keyword("state", "state(\"${1:game.exe}\") {\n    $0\n}"),
    keyword("fn ", "fn ${1:name}(${2:params}) ${3:-> }${4:type} {\n    $0\n}"),
    keyword("start", "start {\n    ${0:false}\n}"),
    keyword("split", "split {\n    ${0:false}\n}"),
    keyword("reset", "reset {\n    ${0:false}\n}"),
    keyword("isLoading", "isLoading {\n    ${0:false}\n}"),
    keyword("gameTime", "gameTime {\n    ${0:0.0}\n}"),
    CompletionItem {
        label: "Pointer Path",
        kind: CompletionItemKind::Snippet,
        insert_text: "${1:name}: ${2:type} = \"${3:module}\", ${4:0x0};",
        documentation: Some("Pointer Path"),
    },
    keyword("current", "current.${0:field}"),
    keyword("old", "old.${0:field}"),
    keyword("for", "for ${1:index} in ${2:from}..${3:to} {\n    ${0}\n};"),
    keyword("while", "while ${1:condition} {\n    ${0}\n};"),
];

/// Items whose label starts with `prefix`, ignoring a trailing space in the label.
pub fn matching(prefix: &str) -> impl Iterator<Item = &'static CompletionItem> + '_ {
    COMPLETION_ITEMS
        .iter()
        .filter(move |item| item.label.trim_end().starts_with(prefix))
}
