//! Resolving a screen point to the text run under it.
//!
//! The lookup core does not know about any concrete UI toolkit; it only
//! needs the [`TextSource`] contract. This module also provides a
//! reference implementation over a minimal laid-out document tree with
//! blocks, inline spans, text runs, and ruby annotations, mirroring what
//! a caret-from-point query gives a browser extension: the text from the
//! caret through the end of the nearest enclosing block, with furigana
//! excluded.

/// What the lookup layer requires from an embedder: the visible text
/// starting at a point, or `None` when the point is not on text (or is on
/// an annotation).
pub trait TextSource {
    fn text_at_point(&self, x: f32, y: f32) -> Option<String>;
}

/// Axis-aligned layout rectangle, y growing downward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// A contiguous run of text with its layout rectangle.
#[derive(Clone, Debug)]
pub struct TextRun {
    pub text: String,
    pub rect: Rect,
}

impl TextRun {
    pub fn new(text: impl Into<String>, rect: Rect) -> Self {
        Self {
            text: text.into(),
            rect,
        }
    }

    /// Character index of the caret at `(x, y)`, assuming evenly spaced
    /// glyph cells across the run's rectangle.
    fn caret_at(&self, x: f32, y: f32) -> Option<usize> {
        if !self.rect.contains(x, y) {
            return None;
        }
        let chars = self.text.chars().count().max(1);
        let cell = self.rect.width / chars as f32;
        if cell <= 0.0 {
            return Some(0);
        }
        let index = ((x - self.rect.x) / cell) as usize;
        Some(index.min(chars - 1))
    }

    /// Byte offset of the `index`-th character.
    fn byte_offset(&self, index: usize) -> usize {
        self.text
            .char_indices()
            .nth(index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

/// One node of the laid-out document.
#[derive(Clone, Debug)]
pub enum Node {
    /// Block-level container; text collection never crosses out of the
    /// innermost block holding the caret.
    Block(Vec<Node>),
    /// Inline container, transparent to text collection.
    Inline(Vec<Node>),
    Text(TextRun),
    /// Ruby base text with its furigana annotation. The annotation is
    /// never collected, and pointing at it yields no text at all.
    Ruby {
        base: Vec<Node>,
        annotation: TextRun,
    },
}

/// A laid-out document; the root behaves as a block.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Text from the caret at `(x, y)` through the end of the enclosing
    /// block, ruby annotations excluded.
    pub fn text_at_point(&self, x: f32, y: f32) -> Option<String> {
        match locate(&self.nodes, x, y)? {
            Located::Annotation => None,
            Located::Caret { run, offset, block } => {
                let scope = block.unwrap_or(&self.nodes);
                let mut out = String::new();
                let mut reached = false;
                collect_from(scope, run, offset, &mut reached, &mut out);
                Some(out)
            }
        }
    }
}

impl TextSource for Document {
    fn text_at_point(&self, x: f32, y: f32) -> Option<String> {
        Document::text_at_point(self, x, y)
    }
}

enum Located<'a> {
    Annotation,
    Caret {
        run: &'a TextRun,
        offset: usize,
        block: Option<&'a [Node]>,
    },
}

/// Find the run under the point and the innermost block containing it.
fn locate<'a>(nodes: &'a [Node], x: f32, y: f32) -> Option<Located<'a>> {
    for node in nodes {
        let located = match node {
            Node::Text(run) => run.caret_at(x, y).map(|offset| Located::Caret {
                run,
                offset,
                block: None,
            }),
            Node::Ruby { base, annotation } => {
                if annotation.rect.contains(x, y) {
                    Some(Located::Annotation)
                } else {
                    locate(base, x, y)
                }
            }
            Node::Inline(children) => locate(children, x, y),
            Node::Block(children) => locate(children, x, y).map(|found| match found {
                Located::Caret {
                    run,
                    offset,
                    block: None,
                } => Located::Caret {
                    run,
                    offset,
                    block: Some(children.as_slice()),
                },
                other => other,
            }),
        };
        if located.is_some() {
            return located;
        }
    }
    None
}

/// Walk `nodes` in document order, appending run text from the target
/// caret onward and skipping annotations.
fn collect_from(
    nodes: &[Node],
    target: &TextRun,
    offset: usize,
    reached: &mut bool,
    out: &mut String,
) {
    for node in nodes {
        match node {
            Node::Text(run) => {
                if *reached {
                    out.push_str(&run.text);
                } else if std::ptr::eq(run, target) {
                    *reached = true;
                    out.push_str(&run.text[run.byte_offset(offset)..]);
                }
            }
            Node::Ruby { base, .. } => collect_from(base, target, offset, reached, out),
            Node::Inline(children) | Node::Block(children) => {
                collect_from(children, target, offset, reached, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One paragraph of furigana-annotated text above a second paragraph.
    // Base glyphs are 20 units wide on the line y=10..30; annotations sit
    // on y=0..10.
    fn sample_document() -> Document {
        Document::new(vec![
            Node::Block(vec![
                Node::Text(TextRun::new("毎日", Rect::new(0.0, 10.0, 40.0, 20.0))),
                Node::Ruby {
                    base: vec![Node::Text(TextRun::new(
                        "雨",
                        Rect::new(40.0, 10.0, 20.0, 20.0),
                    ))],
                    annotation: TextRun::new("あめ", Rect::new(40.0, 0.0, 20.0, 10.0)),
                },
                Node::Inline(vec![Node::Text(TextRun::new(
                    "が降る。",
                    Rect::new(60.0, 10.0, 80.0, 20.0),
                ))]),
            ]),
            Node::Block(vec![Node::Text(TextRun::new(
                "次の段落",
                Rect::new(0.0, 40.0, 80.0, 20.0),
            ))]),
        ])
    }

    #[test]
    fn caret_in_run_collects_through_end_of_block() {
        let doc = sample_document();
        // Point inside 雨: the rest of the paragraph follows, but not the
        // next block.
        assert_eq!(doc.text_at_point(45.0, 20.0), Some("雨が降る。".to_string()));
    }

    #[test]
    fn caret_offset_is_proportional_within_the_run() {
        let doc = sample_document();
        assert_eq!(
            doc.text_at_point(5.0, 20.0),
            Some("毎日雨が降る。".to_string())
        );
        // 25 units in lands on the second glyph of 毎日.
        assert_eq!(
            doc.text_at_point(25.0, 20.0),
            Some("日雨が降る。".to_string())
        );
    }

    #[test]
    fn annotations_are_skipped_and_not_hoverable() {
        let doc = sample_document();
        // Pointing at the furigana itself gives nothing.
        assert_eq!(doc.text_at_point(45.0, 5.0), None);
        // Text collected across the ruby element omits the annotation.
        let text = doc.text_at_point(5.0, 20.0).unwrap();
        assert!(!text.contains("あめ"));
    }

    #[test]
    fn points_outside_any_text_yield_none() {
        let doc = sample_document();
        assert_eq!(doc.text_at_point(500.0, 500.0), None);
        assert_eq!(Document::default().text_at_point(0.0, 0.0), None);
    }

    #[test]
    fn second_block_is_its_own_scope() {
        let doc = sample_document();
        assert_eq!(doc.text_at_point(5.0, 50.0), Some("次の段落".to_string()));
    }
}
