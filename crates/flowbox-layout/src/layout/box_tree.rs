//! The box tree.
//!
//! [§ 2 Box Layout Modes: the display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
//!
//! "The display property defines an element's display type, which consists
//! of the two basic qualities of how an element generates boxes."
//!
//! Boxes live in an arena owned by [`BoxTree`] and refer to each other by
//! [`BoxId`]. Children are owned through the arena; the parent index is only
//! used for upward queries. Index 0 is the initial containing block.

use std::fmt::Write as _;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use serde::Serialize;

use super::box_model::{AreaKind, AreaRef, BoxArea};
use crate::inline::Paragraph;
use crate::style::{ContainingBlock, Float, LengthPercentageAuto, Style, WritingMode};
use crate::text::InlineMetrics;

/// Index of a box in its [`BoxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BoxId(pub usize);

impl BoxId {
    /// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// "The containing block in which the root element lives is a rectangle
    /// called the initial containing block."
    pub const ICB: Self = Self(0);
}

/// Payload shared by both kinds of block container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BlockContainer {
    /// Whether the box establishes a new block formatting context.
    pub bfc_root: bool,
    /// Whether the box is inline-level (an `inline-block`).
    pub inline_level: bool,
}

/// An inline box.
///
/// [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct InlineBox {
    /// Used vertical metrics, set in prelayout.
    pub metrics: InlineMetrics,
    /// Start of the box's text in the paragraph buffer.
    pub text_start: usize,
    /// End of the box's text in the paragraph buffer.
    pub text_end: usize,
}

/// A text leaf.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TextRun {
    /// Text as supplied by the host, before white space processing.
    pub source: String,
    /// Start in the paragraph buffer (after white space processing).
    pub text_start: usize,
    /// End in the paragraph buffer.
    pub text_end: usize,
}

impl TextRun {
    /// A run that has not been placed in a paragraph yet.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text_start: 0,
            text_end: 0,
        }
    }
}

/// [§ 3.1 Replaced elements](https://www.w3.org/TR/css-display-3/#replaced-element)
///
/// "An element whose content is outside the scope of the CSS formatting
/// model, such as an image or embedded document."
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Replaced {
    /// Natural width in CSS pixels, if known.
    pub intrinsic_width: Option<f32>,
    /// Natural height in CSS pixels, if known.
    pub intrinsic_height: Option<f32>,
    /// Whether the box participates in an inline formatting context.
    pub inline_level: bool,
}

impl Replaced {
    /// Natural aspect ratio (width / height), 1 when unknown.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        match (self.intrinsic_width, self.intrinsic_height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => w / h,
            _ => 1.0,
        }
    }
}

/// A floated box and the kind of box it would be if it were not floated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FloatBox {
    /// Side the box floats to.
    pub side: Float,
    /// A block container (of blocks or inlines) or a replaced box.
    pub content: Box<BoxKind>,
}

/// Closed set of box kinds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BoxKind {
    /// A block container whose children are block-level.
    BlockContainerOfBlocks(BlockContainer),
    /// A block container establishing an inline formatting context. Its only
    /// child is the anonymous root [`BoxKind::Inline`].
    BlockContainerOfInlines(BlockContainer, Box<Paragraph>),
    /// An inline box.
    Inline(InlineBox),
    /// Text.
    Run(TextRun),
    /// A replaced element.
    ReplacedBox(Replaced),
    /// A float.
    FloatBox(FloatBox),
    /// A forced line break (`<br>`).
    Break,
}

impl BoxKind {
    /// The kind that determines how the box lays out its content: for a
    /// float its content kind, otherwise itself.
    #[must_use]
    pub fn formatting(&self) -> &Self {
        match self {
            Self::FloatBox(float) => float.content.formatting(),
            other => other,
        }
    }

    /// Mutable counterpart of [`BoxKind::formatting`].
    pub fn formatting_mut(&mut self) -> &mut Self {
        match self {
            Self::FloatBox(float) => float.content.formatting_mut(),
            other => other,
        }
    }

    /// Block container payload.
    #[must_use]
    pub fn block_container(&self) -> Option<&BlockContainer> {
        match self.formatting() {
            Self::BlockContainerOfBlocks(bc) | Self::BlockContainerOfInlines(bc, _) => Some(bc),
            _ => None,
        }
    }

    /// Whether the box is a block container.
    #[must_use]
    pub fn is_block_container(&self) -> bool {
        self.block_container().is_some()
    }

    /// Whether the box contains block-level boxes.
    #[must_use]
    pub fn is_block_container_of_blocks(&self) -> bool {
        matches!(self.formatting(), Self::BlockContainerOfBlocks(_))
    }

    /// Whether the box establishes an inline formatting context.
    #[must_use]
    pub fn is_block_container_of_inlines(&self) -> bool {
        matches!(self.formatting(), Self::BlockContainerOfInlines(..))
    }

    /// Whether the box establishes a block formatting context.
    #[must_use]
    pub fn is_bfc_root(&self) -> bool {
        self.block_container().is_some_and(|bc| bc.bfc_root)
    }

    /// The paragraph of a block container of inlines.
    #[must_use]
    pub fn paragraph(&self) -> Option<&Paragraph> {
        match self.formatting() {
            Self::BlockContainerOfInlines(_, paragraph) => Some(paragraph),
            _ => None,
        }
    }

    /// Mutable paragraph of a block container of inlines.
    pub fn paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match self.formatting_mut() {
            Self::BlockContainerOfInlines(_, paragraph) => Some(paragraph),
            _ => None,
        }
    }

    /// Replaced payload.
    #[must_use]
    pub fn replaced(&self) -> Option<&Replaced> {
        match self.formatting() {
            Self::ReplacedBox(replaced) => Some(replaced),
            _ => None,
        }
    }

    /// Whether this is a float.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Self::FloatBox(_))
    }

    /// Whether this is an inline box.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self, Self::Inline(_))
    }

    /// Whether the box has areas that layout sizes (block containers,
    /// replaced boxes and floats).
    #[must_use]
    pub fn is_formatting_box(&self) -> bool {
        matches!(
            self.formatting(),
            Self::BlockContainerOfBlocks(_)
                | Self::BlockContainerOfInlines(..)
                | Self::ReplacedBox(_)
        )
    }

    /// Whether the box sits on a line as a single unit: inline-blocks and
    /// inline replaced boxes.
    #[must_use]
    pub fn is_atomic_inline(&self) -> bool {
        if self.is_float() {
            return false;
        }
        match self {
            Self::BlockContainerOfBlocks(bc) | Self::BlockContainerOfInlines(bc, _) => {
                bc.inline_level
            }
            Self::ReplacedBox(replaced) => replaced.inline_level,
            _ => false,
        }
    }

    /// Short label used in tree dumps.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::BlockContainerOfBlocks(_) => "Block",
            Self::BlockContainerOfInlines(..) => "Block(inlines)",
            Self::Inline(_) => "Inline",
            Self::Run(_) => "Run",
            Self::ReplacedBox(_) => "Replaced",
            Self::FloatBox(_) => "Float",
            Self::Break => "Break",
        }
    }
}

/// Resolved margins of a laid out box, `auto` replaced by its used value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct UsedMargins {
    /// Block-start margin.
    pub block_start: f32,
    /// Line-right margin.
    pub line_right: f32,
    /// Block-end margin.
    pub block_end: f32,
    /// Line-left margin.
    pub line_left: f32,
}

/// One box.
#[derive(Debug, Clone, Serialize)]
pub struct BoxNode {
    /// Computed style, shared with every box of the same element.
    pub style: Arc<Style>,
    /// What kind of box this is.
    pub kind: BoxKind,
    /// Parent box. Only `None` for the initial containing block.
    pub parent: Option<BoxId>,
    /// Children in document order.
    pub children: Vec<BoxId>,
    /// Host element that generated the box, `None` for anonymous boxes.
    pub element: Option<String>,
    /// Border area.
    pub border_area: BoxArea,
    /// Padding area.
    pub padding_area: BoxArea,
    /// Content area.
    pub content_area: BoxArea,
    /// Area the border area is positioned in, set in prelayout.
    pub containing_block: Option<AreaRef>,
    /// Used margins.
    pub margins: UsedMargins,
    /// Whether the content block size resolves without layout.
    pub(crate) block_size_definite: bool,
}

impl BoxNode {
    fn new(style: Arc<Style>, kind: BoxKind, parent: Option<BoxId>, element: Option<String>) -> Self {
        Self {
            style,
            kind,
            parent,
            children: Vec::new(),
            element,
            border_area: BoxArea::default(),
            padding_area: BoxArea::default(),
            content_area: BoxArea::default(),
            containing_block: None,
            margins: UsedMargins::default(),
            block_size_definite: false,
        }
    }

    /// One of the box's areas.
    #[must_use]
    pub const fn area(&self, kind: AreaKind) -> &BoxArea {
        match kind {
            AreaKind::Border => &self.border_area,
            AreaKind::Padding => &self.padding_area,
            AreaKind::Content => &self.content_area,
        }
    }

    /// Mutable access to one of the box's areas.
    pub const fn area_mut(&mut self, kind: AreaKind) -> &mut BoxArea {
        match kind {
            AreaKind::Border => &mut self.border_area,
            AreaKind::Padding => &mut self.padding_area,
            AreaKind::Content => &mut self.content_area,
        }
    }

    /// Whether the box was generated by a host element.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.element.is_none()
    }
}

/// Arena of boxes. Created fresh for every layout.
#[derive(Debug, Clone, Serialize)]
pub struct BoxTree {
    nodes: Vec<BoxNode>,
    viewport: BoxArea,
    frozen: bool,
}

impl Index<BoxId> for BoxTree {
    type Output = BoxNode;

    fn index(&self, id: BoxId) -> &BoxNode {
        &self.nodes[id.0]
    }
}

impl IndexMut<BoxId> for BoxTree {
    fn index_mut(&mut self, id: BoxId) -> &mut BoxNode {
        &mut self.nodes[id.0]
    }
}

impl BoxTree {
    /// A tree holding only the initial containing block, sized to the
    /// viewport.
    #[must_use]
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        let style = Style {
            width: LengthPercentageAuto::Px(viewport_width),
            height: LengthPercentageAuto::Px(viewport_height),
            ..Style::block()
        };
        let icb = BoxNode::new(
            Arc::new(style),
            BoxKind::BlockContainerOfBlocks(BlockContainer {
                bfc_root: true,
                inline_level: false,
            }),
            None,
            None,
        );
        Self {
            nodes: vec![icb],
            viewport: BoxArea::physical(viewport_width, viewport_height),
            frozen: false,
        }
    }

    /// Append a box as the last child of `parent`.
    pub fn push(
        &mut self,
        parent: BoxId,
        style: Arc<Style>,
        kind: BoxKind,
        element: Option<String>,
    ) -> BoxId {
        let id = BoxId(self.nodes.len());
        self.nodes
            .push(BoxNode::new(style, kind, Some(parent), element));
        self[parent].children.push(id);
        id
    }

    /// Number of boxes, including the initial containing block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the initial containing block exists from the start.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The box with this id, if it exists.
    #[must_use]
    pub fn get(&self, id: BoxId) -> Option<&BoxNode> {
        self.nodes.get(id.0)
    }

    /// The viewport rectangle.
    #[must_use]
    pub const fn viewport(&self) -> &BoxArea {
        &self.viewport
    }

    /// Whether postlayout has run. Areas are final once frozen.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub(crate) const fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Every box id under `root` (inclusive) in document order.
    #[must_use]
    pub fn preorder(&self, root: BoxId) -> Vec<BoxId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self[id].children.iter().rev().copied());
        }
        order
    }

    /// One area of one box.
    #[must_use]
    pub fn area(&self, area: AreaRef) -> &BoxArea {
        self[area.id].area(area.kind)
    }

    /// The area `area` is positioned in: the next area out in the same box,
    /// or the containing block for a border area. `None` means the
    /// viewport.
    #[must_use]
    pub fn parent_area(&self, area: AreaRef) -> Option<AreaRef> {
        match area.kind.outer() {
            Some(kind) => Some(AreaRef { id: area.id, kind }),
            None => self[area.id].containing_block,
        }
    }

    /// [§ 10.1 Definition of "containing block"](https://www.w3.org/TR/CSS2/visudet.html#containing-block-details)
    ///
    /// The containing block of `id` as the style getters need it.
    #[must_use]
    pub fn containing_block(&self, id: BoxId) -> ContainingBlock {
        let Some(cb) = self[id].containing_block else {
            return ContainingBlock::new(self.viewport.width, Some(self.viewport.height));
        };
        let owner = &self[cb.id];
        let area = owner.area(cb.kind);
        // Absolutely positioned boxes are laid out after the flow, so a
        // padding area containing block always has its final size.
        let definite = owner.block_size_definite || cb.kind == AreaKind::Padding;
        ContainingBlock {
            writing_mode: owner.style.writing_mode,
            direction: owner.style.direction,
            inline_size: area.inline_size,
            block_size: definite.then_some(area.block_size),
        }
    }

    /// [§ 10.5 Content height](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    ///
    /// Whether the content block size of `id` is known before its content is
    /// laid out, given whether its containing block's is.
    pub(crate) fn compute_block_size_definite(&self, id: BoxId, cb_definite: bool) -> bool {
        let node = &self[id];
        if id == BoxId::ICB {
            return true;
        }
        let cb_writing_mode = node
            .containing_block
            .map_or(WritingMode::HorizontalTb, |cb| {
                self[cb.id].style.writing_mode
            });
        let property = if cb_writing_mode.is_horizontal() {
            node.style.height
        } else {
            node.style.width
        };
        match property {
            LengthPercentageAuto::Auto => false,
            LengthPercentageAuto::Px(_) => true,
            LengthPercentageAuto::Percent(_) => cb_definite || node.style.is_absolute(),
        }
    }

    /// Set the insets of the padding and content areas from the box's border
    /// and padding widths.
    pub(crate) fn fill_areas(&mut self, id: BoxId) {
        let cb = self.containing_block(id);
        let node = &mut self[id];
        let style = &node.style;
        node.padding_area.block_start = style.border_block_start_width(&cb);
        node.padding_area.line_left = style.border_line_left_width(&cb);
        node.content_area.block_start = style.padding_block_start(&cb);
        node.content_area.line_left = style.padding_line_left(&cb);
    }

    /// Position the border area along the block axis.
    pub(crate) fn set_block_position(&mut self, id: BoxId, position: f32) {
        self[id].border_area.block_start = position;
    }

    /// Set the content block size and derive the outer areas from it.
    pub(crate) fn set_block_size(&mut self, id: BoxId, size: f32) {
        let cb = self.containing_block(id);
        let node = &mut self[id];
        let style = &node.style;
        node.content_area.block_size = size;
        node.padding_area.block_size =
            size + style.padding_block_start(&cb) + style.padding_block_end(&cb);
        node.border_area.block_size = node.padding_area.block_size
            + style.border_block_start_width(&cb)
            + style.border_block_end_width(&cb);
    }

    /// Position the border area along the inline axis.
    pub(crate) fn set_inline_position(&mut self, id: BoxId, position: f32) {
        self[id].border_area.line_left = position;
    }

    /// Set the border-box inline size and derive the inner areas from it.
    pub(crate) fn set_inline_outer_size(&mut self, id: BoxId, size: f32) {
        let cb = self.containing_block(id);
        let node = &mut self[id];
        let style = &node.style;
        node.border_area.inline_size = size;
        node.padding_area.inline_size =
            size - style.border_line_left_width(&cb) - style.border_line_right_width(&cb);
        node.content_area.inline_size = node.padding_area.inline_size
            - style.padding_line_left(&cb)
            - style.padding_line_right(&cb);
    }

    /// Margins with `auto` treated as zero.
    #[must_use]
    pub fn margins_auto_is_zero(&self, id: BoxId) -> UsedMargins {
        let cb = self.containing_block(id);
        let style = &self[id].style;
        UsedMargins {
            block_start: style.margin_block_start(&cb).to_px_or(0.0),
            line_right: style.margin_line_right(&cb).to_px_or(0.0),
            block_end: style.margin_block_end(&cb).to_px_or(0.0),
            line_left: style.margin_line_left(&cb).to_px_or(0.0),
        }
    }

    /// Render the tree as indented text, one box per line.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(BoxId::ICB, 0, &mut out);
        out
    }

    fn dump_node(&self, id: BoxId, depth: usize, out: &mut String) {
        let node = &self[id];
        let indent = "  ".repeat(depth);
        let name = node.element.as_deref().unwrap_or("(anonymous)");
        let area = &node.border_area;
        let _ = write!(out, "{indent}{} {} {name}", node.kind.label(), id.0);
        match &node.kind {
            BoxKind::Run(run) => {
                let _ = writeln!(out, " {:?}", run.source);
            }
            BoxKind::Inline(_) | BoxKind::Break => {
                let _ = writeln!(out);
            }
            _ => {
                let _ = writeln!(
                    out,
                    " ({}, {}) {}x{}",
                    area.x, area.y, area.width, area.height
                );
            }
        }
        for &child in &node.children {
            self.dump_node(child, depth + 1, out);
        }
    }
}
