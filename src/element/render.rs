//! Text rendering of element trees

use super::{Block, Fragment, Node};
use thiserror::Error;

/// Indentation added per nesting level
const INDENT: &str = "  ";

/// Deepest nesting the renderer accepts
pub const MAX_DEPTH: usize = 64;

/// Structural defects in an element tree
///
/// These are programming errors in whatever built the tree, not problems
/// with user input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    #[error("block with empty name at {path}")]
    EmptyBlockName { path: String },

    #[error("directive with empty key in block {path}")]
    EmptyDirectiveKey { path: String },

    #[error("blocks nested deeper than {max} levels at {path}")]
    TooDeep { path: String, max: usize },
}

/// Render fragments into configuration text
///
/// Consecutive blocks are separated by one blank line unless the earlier
/// block is marked tight. The result always ends with a newline.
pub fn render(fragments: &[Fragment]) -> Result<String, RenderError> {
    let mut out = Renderer::default();

    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 && separated(&fragments[i - 1]) {
            out.blank();
        }
        match fragment {
            Fragment::Block(block) => out.block(block, 0, "")?,
            Fragment::Raw(text) => out.raw(text),
        }
    }

    Ok(out.finish())
}

fn separated(previous: &Fragment) -> bool {
    match previous {
        Fragment::Block(b) => !b.no_blank_after,
        Fragment::Raw(_) => true,
    }
}

#[derive(Default)]
struct Renderer {
    lines: Vec<String>,
}

impl Renderer {
    fn line(&mut self, depth: usize, text: &str) {
        self.lines.push(format!("{}{}", INDENT.repeat(depth), text));
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    fn raw(&mut self, text: &str) {
        self.lines
            .extend(text.trim_end_matches('\n').lines().map(str::to_string));
    }

    fn block(&mut self, block: &Block, depth: usize, parent: &str) -> Result<(), RenderError> {
        let path = describe(parent, block);
        if block.name.is_empty() {
            return Err(RenderError::EmptyBlockName { path });
        }
        if depth >= MAX_DEPTH {
            return Err(RenderError::TooDeep { path, max: MAX_DEPTH });
        }

        if let Some(comment) = &block.comment {
            self.line(depth, comment);
        }
        match &block.selector {
            Some(selector) => self.line(depth, &format!("<{} {}>", block.name, selector)),
            None => self.line(depth, &format!("<{}>", block.name)),
        }

        let mut previous_block: Option<&Block> = None;
        for node in &block.body {
            match node {
                Node::Directive(d) => {
                    if d.key.is_empty() {
                        return Err(RenderError::EmptyDirectiveKey { path });
                    }
                    let value = d.value.to_text();
                    if value.is_empty() {
                        self.line(depth + 1, &d.key);
                    } else {
                        self.line(depth + 1, &format!("{} {}", d.key, value));
                    }
                    previous_block = None;
                }
                Node::Comment(text) => {
                    self.line(depth + 1, text);
                    previous_block = None;
                }
                Node::Block(child) => {
                    if let Some(prev) = previous_block {
                        if !prev.no_blank_after {
                            self.blank();
                        }
                    }
                    self.block(child, depth + 1, &path)?;
                    previous_block = Some(child);
                }
            }
        }

        self.line(depth, &format!("</{}>", block.name));
        Ok(())
    }

    fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

fn describe(parent: &str, block: &Block) -> String {
    let this = match &block.selector {
        Some(s) => format!("<{} {}>", block.name, s),
        None => format!("<{}>", block.name),
    };
    if parent.is_empty() {
        this
    } else {
        format!("{}/{}", parent, this)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_nested_block() {
        let block = Block::label("@OUT").child(
            Block::matching("**")
                .directive("@type", "relabel")
                .directive("@label", "@OTHER"),
        );

        let text = render(&[block.into()]).unwrap();
        assert_eq!(
            text,
            "<label @OUT>\n  <match **>\n    @type relabel\n    @label @OTHER\n  </match>\n</label>\n"
        );
    }

    #[test]
    fn test_blank_line_between_sibling_blocks() {
        let block = Block::new("outer")
            .child(Block::new("a"))
            .child(Block::new("b"));

        let text = render(&[block.into()]).unwrap();
        assert_eq!(text, "<outer>\n  <a>\n  </a>\n\n  <b>\n  </b>\n</outer>\n");
    }

    #[test]
    fn test_tight_block_suppresses_blank_line() {
        let block = Block::new("outer")
            .child(Block::new("a").tight())
            .child(Block::new("b"));

        let text = render(&[block.into()]).unwrap();
        assert_eq!(text, "<outer>\n  <a>\n  </a>\n  <b>\n  </b>\n</outer>\n");
    }

    #[test]
    fn test_no_blank_line_after_directive() {
        let block = Block::new("match")
            .directive("k", "v")
            .child(Block::new("buffer"));

        let text = render(&[block.into()]).unwrap();
        assert_eq!(text, "<match>\n  k v\n  <buffer>\n  </buffer>\n</match>\n");
    }

    #[test]
    fn test_comments_and_quoting() {
        let block = Block::filter("**")
            .comment("#header")
            .line_comment("# inline")
            .quoted("path", "/tmp/x")
            .double_quoted("user", "#{x}");

        let text = render(&[block.into()]).unwrap();
        assert_eq!(
            text,
            "#header\n<filter **>\n  # inline\n  path '/tmp/x'\n  user \"#{x}\"\n</filter>\n"
        );
    }

    #[test]
    fn test_empty_value_renders_key() {
        let block = Block::new("b").directive("placeholder", "");
        let text = render(&[block.into()]).unwrap();
        assert_eq!(text, "<b>\n  placeholder\n</b>\n");
    }

    #[test]
    fn test_top_level_fragments_separated() {
        let fragments = vec![
            Fragment::Raw("# header\n".to_string()),
            Block::new("a").into(),
            Block::new("b").into(),
        ];
        let text = render(&fragments).unwrap();
        assert_eq!(text, "# header\n\n<a>\n</a>\n\n<b>\n</b>\n");
    }

    #[test]
    fn test_empty_block_name_fails() {
        let block = Block::label("@X").child(Block::new(""));
        let err = render(&[block.into()]).unwrap_err();
        assert!(matches!(err, RenderError::EmptyBlockName { .. }));
        assert!(err.to_string().contains("<label @X>"));
    }

    #[test]
    fn test_empty_directive_key_fails() {
        let block = Block::new("b").directive("", "v");
        assert!(matches!(
            render(&[block.into()]),
            Err(RenderError::EmptyDirectiveKey { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let mut block = Block::new("leaf");
        for _ in 0..MAX_DEPTH {
            block = Block::new("wrap").child(block);
        }
        assert!(matches!(
            render(&[block.into()]),
            Err(RenderError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_render_is_idempotent() {
        let fragments = vec![Fragment::from(
            Block::label("@A").child(Block::matching("**").directive("@type", "null")),
        )];
        assert_eq!(render(&fragments).unwrap(), render(&fragments).unwrap());
    }
}
