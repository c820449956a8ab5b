//! Box tree generation.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! Turns a tree of styled source elements into a [`BoxTree`]. Every block
//! container ends up holding either only block-level boxes or only
//! inline-level content; where the two mix, the inline content is wrapped
//! in anonymous block boxes. Each block container of inlines gets one
//! anonymous root inline box that holds its inline content.

use std::sync::Arc;

use super::box_tree::{BlockContainer, BoxId, BoxKind, BoxTree, FloatBox, InlineBox, Replaced, TextRun};
use crate::style::{DisplayValue, Float, InnerDisplayType, Style, create_child_style};

/// Tags of elements whose content is outside the formatting model.
const REPLACED_TAGS: [&str; 7] = ["img", "video", "audio", "canvas", "iframe", "embed", "object"];

/// An element of the source tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceElement {
    /// Host identifier, copied onto every box the element generates.
    pub id: String,
    /// Lower-case tag name. Decides replaced elements and `br`.
    pub tag: String,
    /// Computed style.
    pub style: Arc<Style>,
    /// Children in document order.
    pub children: Vec<SourceNode>,
    /// Natural width of a replaced element.
    pub intrinsic_width: Option<f32>,
    /// Natural height of a replaced element.
    pub intrinsic_height: Option<f32>,
}

/// A node of the source tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceNode {
    /// An element.
    Element(SourceElement),
    /// Text, styled by its parent element.
    Text(String),
}

impl SourceNode {
    /// An element node without natural dimensions.
    #[must_use]
    pub fn element(id: impl Into<String>, tag: impl Into<String>, style: Style, children: Vec<Self>) -> Self {
        Self::Element(SourceElement {
            id: id.into(),
            tag: tag.into(),
            style: Arc::new(style),
            children,
            intrinsic_width: None,
            intrinsic_height: None,
        })
    }

    /// A text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    fn as_element(&self) -> Option<&SourceElement> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }
}

impl SourceElement {
    fn is_replaced(&self) -> bool {
        REPLACED_TAGS.contains(&self.tag.as_str())
    }

    fn is_floated(&self) -> bool {
        self.style.float != Float::None
    }

    /// [§ 9.2.1 Block-level elements and block boxes](https://www.w3.org/TR/CSS2/visuren.html#block-boxes)
    ///
    /// Whether the element becomes a sibling of block boxes: in-flow
    /// block-level elements, and absolutely positioned ones, which are kept
    /// out of inline content where possible.
    fn is_block_part(&self) -> bool {
        if self.style.display.is_none() {
            return false;
        }
        if self.style.is_absolute() {
            return true;
        }
        !self.is_floated() && self.style.display.is_block_level()
    }

    /// Whether the element generates a non-atomic inline box.
    fn is_plain_inline(&self) -> bool {
        let display = self.style.display;
        display.is_inline_level()
            && display.inner == InnerDisplayType::Flow
            && !self.is_replaced()
            && !self.is_floated()
            && !self.style.is_absolute()
    }
}

/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// Whether `children` hold an in-flow block-level box, directly or inside
/// inline boxes.
fn has_block_descendant(children: &[SourceNode]) -> bool {
    children.iter().filter_map(SourceNode::as_element).any(|element| {
        let style = &element.style;
        if style.display.is_none() || style.is_absolute() || element.is_floated() {
            return false;
        }
        style.display.is_block_level()
            || (element.is_plain_inline() && has_block_descendant(&element.children))
    })
}

/// What a block container of blocks holds, after inline boxes were broken
/// around their block-level descendants.
enum Part<'a> {
    Inline(SourceNode),
    Block(&'a SourceElement),
}

/// "When an inline box contains an in-flow block-level box, the inline box
/// (and its inline ancestors within the same line box) are broken around the
/// block-level box ..., splitting the inline box into two boxes (even if
/// either side is empty), one on each side of the block-level box(es)."
fn split_around_blocks<'a>(node: &'a SourceNode, out: &mut Vec<Part<'a>>) {
    let Some(element) = node.as_element() else {
        out.push(Part::Inline(node.clone()));
        return;
    };
    if element.is_block_part() {
        out.push(Part::Block(element));
        return;
    }
    if !element.is_plain_inline() || !has_block_descendant(&element.children) {
        out.push(Part::Inline(node.clone()));
        return;
    }

    let empty = || SourceElement {
        children: Vec::new(),
        ..element.clone()
    };
    let mut current = empty();
    for child in &element.children {
        let mut inner = Vec::new();
        split_around_blocks(child, &mut inner);
        for part in inner {
            match part {
                Part::Inline(inline) => current.children.push(inline),
                Part::Block(block) => {
                    let before = std::mem::replace(&mut current, empty());
                    out.push(Part::Inline(SourceNode::Element(before)));
                    out.push(Part::Block(block));
                }
            }
        }
    }
    out.push(Part::Inline(SourceNode::Element(current)));
}

/// Whether wrapping `parts` would only produce white space that collapses
/// away.
fn is_collapsible_whitespace(parts: &[SourceNode], style: &Style) -> bool {
    style.is_ws_collapsible()
        && parts.iter().all(|part| match part {
            SourceNode::Text(text) => text.chars().all(char::is_whitespace),
            SourceNode::Element(_) => false,
        })
}

struct Builder<'t> {
    tree: &'t mut BoxTree,
}

impl Builder<'_> {
    /// Style of an anonymous block box inside `parent`.
    fn anonymous_block_style(parent: &Style) -> Arc<Style> {
        Arc::new(Style {
            display: DisplayValue::block(),
            ..create_child_style(parent, &[])
        })
    }

    /// Fill block container of blocks `parent` with `children`.
    fn block_children(&mut self, parent: BoxId, children: &[SourceNode]) {
        let style = self.tree[parent].style.clone();
        let mut parts = Vec::new();
        for child in children {
            split_around_blocks(child, &mut parts);
        }

        let mut pending: Vec<SourceNode> = Vec::new();
        for part in parts {
            match part {
                Part::Inline(node) => pending.push(node),
                Part::Block(element) => {
                    self.flush_inline_run(parent, &style, &mut pending);
                    self.element(parent, element);
                }
            }
        }
        self.flush_inline_run(parent, &style, &mut pending);
    }

    /// Wrap a run of inline-level content in an anonymous block container
    /// of inlines.
    ///
    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "if a block container box has a block-level box inside it, then we
    /// force it to have only block-level boxes inside it."
    fn flush_inline_run(&mut self, parent: BoxId, style: &Style, pending: &mut Vec<SourceNode>) {
        let run = std::mem::take(pending);
        if run.is_empty() || is_collapsible_whitespace(&run, style) {
            return;
        }
        let anonymous_style = Self::anonymous_block_style(style);
        let kind = BoxKind::BlockContainerOfInlines(BlockContainer::default(), Box::default());
        let block = self.tree.push(parent, anonymous_style, kind, None);
        self.inline_root(block, &run);
    }

    /// Push the anonymous root inline of block container of inlines `block`
    /// and fill it with `children`.
    fn inline_root(&mut self, block: BoxId, children: &[SourceNode]) {
        let style = Arc::new(create_child_style(&self.tree[block].style, &[]));
        let root = self.tree.push(block, style, BoxKind::Inline(InlineBox::default()), None);
        self.inline_children(root, children);
    }

    /// Fill inline box `parent` with `children`.
    fn inline_children(&mut self, parent: BoxId, children: &[SourceNode]) {
        for child in children {
            match child {
                SourceNode::Text(text) => {
                    let style = self.tree[parent].style.clone();
                    let _ = self.tree.push(parent, style, BoxKind::Run(TextRun::new(text.clone())), None);
                }
                SourceNode::Element(element) => self.element(parent, element),
            }
        }
    }

    /// Generate the boxes of `element` under `parent`.
    fn element(&mut self, parent: BoxId, element: &SourceElement) {
        if element.style.display.is_none() {
            return;
        }

        // [§ 9.7 Relationships between 'display', 'position', and 'float'](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
        //
        // "Otherwise, if 'position' has the value 'absolute' or 'fixed', the
        // box is absolutely positioned, the computed value of 'float' is
        // 'none', and display is set according to the table below."
        let mut style = element.style.clone();
        if style.is_absolute() && style.float != Float::None {
            style = Arc::new(Style {
                float: Float::None,
                ..(*style).clone()
            });
        }
        let out_of_flow = style.is_out_of_flow();
        if out_of_flow && style.display.is_inline_level() {
            style = Arc::new(style.blockified());
        }
        let id = Some(element.id.clone());

        // STEP 1: forced line breaks.
        if element.tag == "br" {
            let _ = self.tree.push(parent, style, BoxKind::Break, id);
            return;
        }

        // STEP 2: plain inline boxes.
        if element.is_plain_inline() {
            let inline = self.tree.push(parent, style, BoxKind::Inline(InlineBox::default()), id);
            self.inline_children(inline, &element.children);
            return;
        }

        let inline_level = !out_of_flow && style.display.is_inline_level();
        let float = style.float;
        let wrap = |kind: BoxKind| {
            if float == Float::None {
                kind
            } else {
                BoxKind::FloatBox(FloatBox {
                    side: float,
                    content: Box::new(kind),
                })
            }
        };

        // STEP 3: replaced elements.
        if element.is_replaced() {
            let kind = wrap(BoxKind::ReplacedBox(Replaced {
                intrinsic_width: element.intrinsic_width,
                intrinsic_height: element.intrinsic_height,
                inline_level,
            }));
            let _ = self.tree.push(parent, style, kind, id);
            return;
        }

        // STEP 4: block containers.
        let container = BlockContainer {
            bfc_root: style.creates_bfc(),
            inline_level,
        };
        if has_block_descendant(&element.children) {
            let kind = wrap(BoxKind::BlockContainerOfBlocks(container));
            let block = self.tree.push(parent, style, kind, id);
            self.block_children(block, &element.children);
        } else {
            let kind = wrap(BoxKind::BlockContainerOfInlines(container, Box::default()));
            let block = self.tree.push(parent, style, kind, id);
            self.inline_root(block, &element.children);
        }
    }
}

/// [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
///
/// Generate the box tree of `roots`, laid out in a viewport of
/// `viewport_width` by `viewport_height` pixels. The roots become children
/// of the initial containing block.
#[must_use]
pub fn build_box_tree(roots: &[SourceNode], viewport_width: f32, viewport_height: f32) -> BoxTree {
    let mut tree = BoxTree::new(viewport_width, viewport_height);
    let mut builder = Builder { tree: &mut tree };
    builder.block_children(BoxId::ICB, roots);

    #[cfg(feature = "layout-trace")]
    log::trace!("[BUILD] {} boxes\n{}", tree.len(), tree.dump());

    tree
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline() -> Style {
        Style::default()
    }

    fn block() -> Style {
        Style::block()
    }

    #[test]
    fn test_inline_box_is_split_around_block() {
        let span = SourceNode::element(
            "span",
            "span",
            inline(),
            vec![
                SourceNode::text("a"),
                SourceNode::element("div", "div", block(), vec![]),
                SourceNode::text("b"),
            ],
        );
        let mut parts = Vec::new();
        split_around_blocks(&span, &mut parts);

        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[0], Part::Inline(SourceNode::Element(e)) if e.children.len() == 1));
        assert!(matches!(&parts[1], Part::Block(e) if e.id == "div"));
        assert!(matches!(&parts[2], Part::Inline(SourceNode::Element(e)) if e.children.len() == 1));
    }

    #[test]
    fn test_floats_do_not_count_as_blocks() {
        let float = Style {
            float: Float::Left,
            ..block()
        };
        let children = vec![SourceNode::element("f", "div", float, vec![]), SourceNode::text("x")];
        assert!(!has_block_descendant(&children));
    }

    #[test]
    fn test_collapsible_whitespace_between_blocks_is_dropped() {
        assert!(is_collapsible_whitespace(&[SourceNode::text(" \n ")], &block()));
        let pre = Style {
            white_space: crate::style::WhiteSpace::Pre,
            ..block()
        };
        assert!(!is_collapsible_whitespace(&[SourceNode::text(" ")], &pre));
    }
}
