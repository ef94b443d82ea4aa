//! Merging of documentation comment lines into `CommentStmt` nodes.

use bough_core::Span;

use crate::context::AstContext;
use crate::error::AstResult;
use crate::refs::NodeRef;

/// One documentation comment line as delivered by the lexer, with the
/// comment marker already stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentLine {
    pub line: u32,
    pub text: String,
    pub span: Span,
}

impl AstContext {
    /// Group comment lines on consecutive source lines into one
    /// `CommentStmt` each. Texts are joined with `\n`; the node span covers
    /// the whole group.
    ///
    /// Lines must arrive in source order.
    pub fn merge_comment_lines(
        &mut self,
        lines: impl IntoIterator<Item = CommentLine>,
    ) -> AstResult<Vec<NodeRef>> {
        let mut groups: Vec<(u32, String, Span)> = Vec::new();
        for line in lines {
            match groups.last_mut() {
                Some((last, text, span)) if line.line == *last + 1 => {
                    text.push('\n');
                    text.push_str(&line.text);
                    *span = span.cover(line.span);
                    *last = line.line;
                }
                _ => groups.push((line.line, line.text, line.span)),
            }
        }

        let mut nodes = Vec::with_capacity(groups.len());
        for (_, text, span) in groups {
            let node = self.comment(&text);
            self.set_span(node, span)?;
            nodes.push(node);
        }
        Ok(nodes)
    }
}
