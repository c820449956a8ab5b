//! Integration tests for the layout passes: prelayout, absolutely and
//! relatively positioned boxes, and postlayout.

use flowbox_layout::style::{
    Direction, DisplayValue, LengthPercentage, LengthPercentageAuto, PhysicalSide, Position,
};
use flowbox_layout::{
    ApproximateShaper, BoxArea, BoxId, BoxTree, Declaration, LayoutContext, SourceNode, Style,
    UnicodeGraphemeBreaker, UnicodeLineBreakerFactory, build_box_tree, create_child_style,
    layout_tree,
};

fn div(id: &str, declarations: &[Declaration], children: Vec<SourceNode>) -> SourceNode {
    let mut all = vec![Declaration::Display(DisplayValue::block())];
    all.extend_from_slice(declarations);
    SourceNode::element(id, "div", create_child_style(&Style::block(), &all), children)
}

fn px(value: f32) -> LengthPercentageAuto {
    LengthPercentageAuto::Px(value)
}

fn inset(side: PhysicalSide, value: f32) -> Declaration {
    Declaration::Inset(side, px(value))
}

fn ctx_layout(tree: &mut BoxTree) {
    let shaper = ApproximateShaper::new();
    let ctx = LayoutContext::new(&shaper, &UnicodeLineBreakerFactory, &UnicodeGraphemeBreaker);
    layout_tree(tree, &ctx);
}

fn layout(roots: &[SourceNode]) -> BoxTree {
    let mut tree = build_box_tree(roots, 800.0, 600.0);
    ctx_layout(&mut tree);
    tree
}

fn find(tree: &BoxTree, id: &str) -> BoxId {
    tree.preorder(BoxId::ICB)
        .into_iter()
        .find(|&b| tree[b].element.as_deref() == Some(id))
        .unwrap_or_else(|| panic!("no box for {id}"))
}

fn border(tree: &BoxTree, id: &str) -> BoxArea {
    tree[find(tree, id)].border_area
}

fn approx(actual: f32, expected: f32) -> bool {
    (actual - expected).abs() < 0.01
}

// ---------------------------------------------------------------------------
// Passes
// ---------------------------------------------------------------------------

#[test]
fn test_initial_containing_block_is_the_viewport() {
    let tree = layout(&[div("a", &[Declaration::Height(px(10.0))], vec![])]);
    let icb = tree[BoxId::ICB].border_area;
    assert!(approx(icb.width, 800.0));
    assert!(approx(icb.height, 600.0));
    assert!(tree[BoxId::ICB].element.is_none());
}

#[test]
fn test_every_box_gets_a_containing_block() {
    let tree = layout(&[div(
        "a",
        &[],
        vec![div("b", &[], vec![SourceNode::text("text")])],
    )]);
    for id in tree.preorder(BoxId::ICB).into_iter().skip(1) {
        assert!(tree[id].containing_block.is_some(), "{id:?} has no containing block");
    }
}

#[test]
fn test_tree_is_frozen_after_layout() {
    let mut tree = build_box_tree(&[div("a", &[Declaration::Height(px(10.0))], vec![])], 800.0, 600.0);
    assert!(!tree.is_frozen());
    ctx_layout(&mut tree);
    assert!(tree.is_frozen());

    let before = border(&tree, "a");
    ctx_layout(&mut tree);
    assert_eq!(border(&tree, "a"), before);
}

#[test]
fn test_areas_are_nested() {
    let mut declarations = vec![
        Declaration::Width(px(100.0)),
        Declaration::Height(px(50.0)),
        Declaration::Padding(PhysicalSide::Left, LengthPercentage::Px(10.0)),
        Declaration::Padding(PhysicalSide::Top, LengthPercentage::Px(5.0)),
    ];
    declarations.extend(Declaration::solid_border(2.0));
    let tree = layout(&[div("a", &declarations, vec![])]);
    let node = &tree[find(&tree, "a")];

    assert!(approx(node.border_area.width, 100.0 + 10.0 + 4.0));
    assert!(approx(node.padding_area.x, 2.0));
    assert!(approx(node.padding_area.y, 2.0));
    assert!(approx(node.content_area.x, 12.0));
    assert!(approx(node.content_area.y, 7.0));
    assert!(approx(node.content_area.width, 100.0));
    assert!(approx(node.content_area.height, 50.0));
}

#[test]
fn test_inline_box_area_covers_its_text() {
    let span = SourceNode::element("s", "span", Style::default(), vec![SourceNode::text("ab")]);
    let tree = layout(&[div("p", &[], vec![SourceNode::text("xy "), span])]);
    let s = border(&tree, "s");
    assert!(approx(s.x, 20.0));
    assert!(approx(s.width, 16.0));
    assert!(approx(s.height, 16.0));
}

#[test]
fn test_positions_snap_to_whole_pixels() {
    let tree = layout(&[
        div("a", &[Declaration::Height(px(10.4))], vec![]),
        div("b", &[Declaration::Height(px(10.4))], vec![]),
    ]);
    let a = border(&tree, "a");
    let b = border(&tree, "b");
    assert!(approx(a.height, 10.0));
    assert!(approx(b.y, 10.0));
    assert!(approx(b.height, 11.0));
    assert!(approx(a.y + a.height, b.y));
}

#[test]
fn test_dump_lists_boxes() {
    let tree = layout(&[div("outer", &[], vec![div("inner", &[], vec![])])]);
    let dump = tree.dump();
    assert!(dump.contains("outer"));
    assert!(dump.contains("inner"));
    assert!(dump.lines().count() >= 3);
}

// ---------------------------------------------------------------------------
// Absolute positioning
//
// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
// ---------------------------------------------------------------------------

#[test]
fn test_absolute_box_is_out_of_flow() {
    let tree = layout(&[div(
        "parent",
        &[],
        vec![
            div(
                "abs",
                &[Declaration::Position(Position::Absolute), Declaration::Height(px(100.0))],
                vec![],
            ),
            div("flow", &[Declaration::Height(px(20.0))], vec![]),
        ],
    )]);
    assert!(approx(border(&tree, "flow").y, 0.0));
    assert!(approx(border(&tree, "parent").height, 20.0));
}

#[test]
fn test_absolute_insets_against_positioned_ancestor() {
    let tree = layout(&[
        div("spacer", &[Declaration::Height(px(40.0))], vec![]),
        div(
            "cb",
            &[
                Declaration::Position(Position::Relative),
                Declaration::Height(px(100.0)),
                Declaration::Margin(PhysicalSide::Left, px(30.0)),
            ],
            vec![div(
                "abs",
                &[
                    Declaration::Position(Position::Absolute),
                    inset(PhysicalSide::Top, 5.0),
                    inset(PhysicalSide::Left, 6.0),
                    Declaration::Width(px(20.0)),
                    Declaration::Height(px(20.0)),
                ],
                vec![],
            )],
        ),
    ]);
    let abs = border(&tree, "abs");
    assert!(approx(abs.x, 36.0));
    assert!(approx(abs.y, 45.0));
}

#[test]
fn test_absolute_right_and_bottom_insets() {
    let tree = layout(&[div(
        "abs",
        &[
            Declaration::Position(Position::Absolute),
            inset(PhysicalSide::Right, 10.0),
            inset(PhysicalSide::Bottom, 20.0),
            Declaration::Width(px(100.0)),
            Declaration::Height(px(50.0)),
        ],
        vec![],
    )]);
    let abs = border(&tree, "abs");
    assert!(approx(abs.x, 690.0));
    assert!(approx(abs.y, 530.0));
}

#[test]
fn test_absolute_without_insets_sits_at_content_origin() {
    let tree = layout(&[div(
        "cb",
        &[
            Declaration::Position(Position::Relative),
            Declaration::Padding(PhysicalSide::Left, LengthPercentage::Px(10.0)),
            Declaration::Padding(PhysicalSide::Top, LengthPercentage::Px(12.0)),
        ],
        vec![div(
            "abs",
            &[
                Declaration::Position(Position::Absolute),
                Declaration::Width(px(30.0)),
                Declaration::Height(px(30.0)),
            ],
            vec![],
        )],
    )]);
    let abs = border(&tree, "abs");
    assert!(approx(abs.x, 10.0));
    assert!(approx(abs.y, 12.0));
}

#[test]
fn test_absolute_auto_width_shrinks_to_fit() {
    let tree = layout(&[div(
        "abs",
        &[
            Declaration::Position(Position::Absolute),
            inset(PhysicalSide::Top, 0.0),
            inset(PhysicalSide::Left, 0.0),
        ],
        vec![SourceNode::text("abcd")],
    )]);
    let abs = border(&tree, "abs");
    assert!(approx(abs.width, 32.0));
    assert!(approx(abs.height, 16.0));
}

// ---------------------------------------------------------------------------
// Relative positioning
//
// [§ 3.4 Relative positioning](https://www.w3.org/TR/css-position-3/#relpos-insets)
// ---------------------------------------------------------------------------

#[test]
fn test_relative_offset_moves_descendants() {
    let tree = layout(&[div(
        "rel",
        &[
            Declaration::Position(Position::Relative),
            inset(PhysicalSide::Top, 10.0),
            inset(PhysicalSide::Left, 4.0),
        ],
        vec![div("child", &[Declaration::Height(px(20.0))], vec![])],
    )]);
    let child = border(&tree, "child");
    assert!(approx(child.x, 4.0));
    assert!(approx(child.y, 10.0));
}

#[test]
fn test_relative_bottom_moves_up() {
    let tree = layout(&[
        div("spacer", &[Declaration::Height(px(50.0))], vec![]),
        div(
            "rel",
            &[
                Declaration::Position(Position::Relative),
                inset(PhysicalSide::Bottom, 15.0),
                Declaration::Height(px(10.0)),
            ],
            vec![],
        ),
    ]);
    assert!(approx(border(&tree, "rel").y, 35.0));
}

#[test]
fn test_relative_rtl_uses_right_inset() {
    let tree = layout(&[div(
        "outer",
        &[Declaration::Direction(Direction::Rtl)],
        vec![div(
            "rel",
            &[
                Declaration::Position(Position::Relative),
                inset(PhysicalSide::Left, 10.0),
                inset(PhysicalSide::Right, 30.0),
                Declaration::Height(px(10.0)),
            ],
            vec![],
        )],
    )]);
    assert!(approx(border(&tree, "rel").x, -30.0));
}
