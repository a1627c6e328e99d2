//! CSS reference extraction, backing [`crate::collaborators::DefaultCssParser`].
//!
//! Uses `cssparser`'s low-level [`Tokenizer`] rather than its at-rule/
//! qualified-rule grammar machinery: the content scanner only needs a flat
//! stream of `url(...)`/`@import` occurrences plus enough brace-nesting
//! context to tell a `@font-face` `src` from any other `url(...)`, not a
//! fully parsed stylesheet AST.

use cssparser::{Token, Tokenizer};

use crate::collaborators::{CssReference, CssReferenceType, CssReferences};

#[must_use]
pub fn extract_css_references(css: &str) -> CssReferences {
    let mut tokenizer = Tokenizer::new(css);
    let mut references = Vec::new();
    let mut brace_depth: i32 = 0;
    let mut font_face_start_depth: Option<i32> = None;
    let mut awaiting_font_face_block = false;
    let mut awaiting_import = false;
    let mut awaiting_url_string = false;

    while let Ok(token) = tokenizer.next() {
        match token {
            Token::AtKeyword(name) => {
                let lower = name.to_lowercase();
                awaiting_font_face_block = lower == "font-face";
                awaiting_import = lower == "import";
            }
            Token::Function(name) => {
                awaiting_url_string = name.eq_ignore_ascii_case("url");
            }
            Token::CurlyBracketBlock => {
                brace_depth += 1;
                if awaiting_font_face_block && font_face_start_depth.is_none() {
                    font_face_start_depth = Some(brace_depth);
                }
                awaiting_font_face_block = false;
            }
            Token::CloseCurlyBracket => {
                if font_face_start_depth.is_some_and(|start| brace_depth <= start) {
                    font_face_start_depth = None;
                }
                brace_depth -= 1;
            }
            Token::Semicolon => {
                awaiting_import = false;
            }
            Token::CloseParenthesis => {
                awaiting_url_string = false;
            }
            Token::UnquotedUrl(url) => {
                push_reference(&mut references, &url, font_face_start_depth.is_some(), awaiting_import);
                awaiting_import = false;
            }
            Token::QuotedString(value) => {
                if awaiting_url_string {
                    push_reference(&mut references, &value, font_face_start_depth.is_some(), awaiting_import);
                    awaiting_url_string = false;
                    awaiting_import = false;
                } else if awaiting_import {
                    push_reference(&mut references, &value, false, true);
                    awaiting_import = false;
                }
            }
            _ => {}
        }
    }
    CssReferences { references }
}

fn push_reference(references: &mut Vec<CssReference>, url: &str, in_font_face: bool, is_import: bool) {
    let reference_type = if is_import {
        CssReferenceType::Import
    } else if in_font_face {
        CssReferenceType::Font
    } else {
        CssReferenceType::Image
    };
    references.push(CssReference { reference_type, url: url.to_string(), line: None });
}
