// src/pages/mod.rs
/// The fixed HTML pages served alongside the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Page {
    Index,
    GlobalReach,
    RaisingAwareness,
    UnderstandingTheIssue,
    WhatYouCanDo,
}

const API_BASE_SLOT: &str = "{{ api_base }}";

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Index,
        Page::GlobalReach,
        Page::RaisingAwareness,
        Page::UnderstandingTheIssue,
        Page::WhatYouCanDo,
    ];

    /// Path segment the page is mounted under; the index lives at `/`.
    pub fn segment(&self) -> &'static str {
        match self {
            Page::Index => "",
            Page::GlobalReach => "global-reach",
            Page::RaisingAwareness => "raising-awareness",
            Page::UnderstandingTheIssue => "understanding-the-issue",
            Page::WhatYouCanDo => "what-you-can-do",
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Page::Index => include_str!("../../templates/index.html"),
            Page::GlobalReach => include_str!("../../templates/worldmap.html"),
            Page::RaisingAwareness => include_str!("../../templates/awareness.html"),
            Page::UnderstandingTheIssue => include_str!("../../templates/the-issue.html"),
            Page::WhatYouCanDo => include_str!("../../templates/what-you-can-do.html"),
        }
    }

    /// Render the page. Only the index receives the API base.
    pub fn render(&self, api_base: &str) -> String {
        match self {
            Page::Index => self
                .template()
                .replace(API_BASE_SLOT, &js_string_literal(api_base)),
            _ => self.template().to_string(),
        }
    }
}

/// Quote text as a JavaScript string literal safe to embed in a `<script>` block.
pub fn js_string_literal(raw: &str) -> String {
    serde_json::Value::from(raw)
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
