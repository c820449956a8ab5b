//! Integration tests for block formatting: widths, heights and margin
//! collapsing.

use flowbox_layout::style::{
    BoxSizing, DisplayValue, LengthPercentage, LengthPercentageAuto, MaxSize, PhysicalSide,
};
use flowbox_layout::{
    ApproximateShaper, BoxArea, BoxId, BoxTree, Declaration, LayoutContext, SourceNode, Style,
    UnicodeGraphemeBreaker, UnicodeLineBreakerFactory, build_box_tree, create_child_style,
    layout_tree,
};

/// Helper: a `div` with block display and the given declarations.
fn div(id: &str, declarations: &[Declaration], children: Vec<SourceNode>) -> SourceNode {
    let mut all = vec![Declaration::Display(DisplayValue::block())];
    all.extend_from_slice(declarations);
    SourceNode::element(id, "div", create_child_style(&Style::block(), &all), children)
}

fn px(value: f32) -> LengthPercentageAuto {
    LengthPercentageAuto::Px(value)
}

fn height(value: f32) -> Declaration {
    Declaration::Height(px(value))
}

fn margin(side: PhysicalSide, value: f32) -> Declaration {
    Declaration::Margin(side, px(value))
}

/// Helper: lay out `roots` in a viewport of the given width.
fn layout(roots: &[SourceNode], width: f32) -> BoxTree {
    let shaper = ApproximateShaper::new();
    let ctx = LayoutContext::new(&shaper, &UnicodeLineBreakerFactory, &UnicodeGraphemeBreaker);
    let mut tree = build_box_tree(roots, width, 600.0);
    layout_tree(&mut tree, &ctx);
    tree
}

/// Helper: border area of the first box generated by element `id`.
fn border(tree: &BoxTree, id: &str) -> BoxArea {
    let found = tree
        .preorder(BoxId::ICB)
        .into_iter()
        .find(|&b| tree[b].element.as_deref() == Some(id))
        .unwrap_or_else(|| panic!("no box for {id}"));
    tree[found].border_area
}

fn approx(actual: f32, expected: f32) -> bool {
    (actual - expected).abs() < 0.01
}

// ---------------------------------------------------------------------------
// Widths
//
// [§ 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
// ---------------------------------------------------------------------------

#[test]
fn test_auto_width_fills_viewport() {
    let tree = layout(&[div("a", &[height(10.0)], vec![])], 800.0);
    let a = border(&tree, "a");
    assert!(approx(a.x, 0.0));
    assert!(approx(a.width, 800.0));
}

#[test]
fn test_auto_width_subtracts_margins() {
    let tree = layout(
        &[div(
            "a",
            &[margin(PhysicalSide::Left, 30.0), margin(PhysicalSide::Right, 20.0)],
            vec![],
        )],
        800.0,
    );
    let a = border(&tree, "a");
    assert!(approx(a.x, 30.0));
    assert!(approx(a.width, 750.0));
}

#[test]
fn test_auto_margins_centre_fixed_width() {
    let tree = layout(
        &[div(
            "a",
            &[
                Declaration::Width(px(200.0)),
                Declaration::Margin(PhysicalSide::Left, LengthPercentageAuto::Auto),
                Declaration::Margin(PhysicalSide::Right, LengthPercentageAuto::Auto),
            ],
            vec![],
        )],
        400.0,
    );
    let a = border(&tree, "a");
    assert!(approx(a.x, 100.0));
    assert!(approx(a.width, 200.0));
}

#[test]
fn test_content_box_adds_padding_and_border() {
    let mut declarations = vec![
        Declaration::Width(px(100.0)),
        Declaration::BoxSizing(BoxSizing::ContentBox),
        Declaration::Padding(PhysicalSide::Left, LengthPercentage::Px(10.0)),
        Declaration::Padding(PhysicalSide::Right, LengthPercentage::Px(10.0)),
    ];
    declarations.extend(Declaration::solid_border(5.0));
    let tree = layout(&[div("a", &declarations, vec![])], 800.0);
    assert!(approx(border(&tree, "a").width, 130.0));
}

#[test]
fn test_border_box_includes_padding_and_border() {
    let mut declarations = vec![
        Declaration::Width(px(100.0)),
        Declaration::BoxSizing(BoxSizing::BorderBox),
        Declaration::Padding(PhysicalSide::Left, LengthPercentage::Px(10.0)),
    ];
    declarations.extend(Declaration::solid_border(5.0));
    let tree = layout(&[div("a", &declarations, vec![])], 800.0);
    assert!(approx(border(&tree, "a").width, 100.0));
}

#[test]
fn test_percentage_width_of_containing_block() {
    let tree = layout(
        &[div(
            "outer",
            &[Declaration::Width(px(400.0))],
            vec![div("inner", &[Declaration::Width(LengthPercentageAuto::Percent(25.0))], vec![])],
        )],
        800.0,
    );
    assert!(approx(border(&tree, "inner").width, 100.0));
}

#[test]
fn test_max_width_clamps_auto_width() {
    let tree = layout(&[div("a", &[Declaration::MaxWidth(MaxSize::Px(300.0))], vec![])], 800.0);
    assert!(approx(border(&tree, "a").width, 300.0));
}

#[test]
fn test_min_width_beats_max_width() {
    let tree = layout(
        &[div(
            "a",
            &[
                Declaration::MaxWidth(MaxSize::Px(100.0)),
                Declaration::MinWidth(LengthPercentage::Px(150.0)),
            ],
            vec![],
        )],
        800.0,
    );
    assert!(approx(border(&tree, "a").width, 150.0));
}

// ---------------------------------------------------------------------------
// Heights
//
// [§ 10.6.3 Block-level non-replaced elements in normal flow when 'overflow'
// computes to 'visible'](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
// ---------------------------------------------------------------------------

#[test]
fn test_auto_height_sums_children() {
    let tree = layout(
        &[div(
            "parent",
            &[],
            vec![div("a", &[height(50.0)], vec![]), div("b", &[height(30.0)], vec![])],
        )],
        800.0,
    );
    assert!(approx(border(&tree, "parent").height, 80.0));
    assert!(approx(border(&tree, "b").y, 50.0));
}

#[test]
fn test_empty_block_has_zero_height() {
    let tree = layout(&[div("a", &[], vec![])], 800.0);
    assert!(approx(border(&tree, "a").height, 0.0));
}

#[test]
fn test_min_height_applies_to_auto_height() {
    let tree = layout(
        &[div("a", &[Declaration::MinHeight(LengthPercentage::Px(40.0))], vec![])],
        800.0,
    );
    assert!(approx(border(&tree, "a").height, 40.0));
}

#[test]
fn test_max_height_clamps_fixed_height() {
    let tree = layout(
        &[div("a", &[height(200.0), Declaration::MaxHeight(MaxSize::Px(120.0))], vec![])],
        800.0,
    );
    assert!(approx(border(&tree, "a").height, 120.0));
}

#[test]
fn test_percentage_height_of_auto_parent_is_auto() {
    let tree = layout(
        &[div(
            "parent",
            &[],
            vec![div(
                "child",
                &[Declaration::Height(LengthPercentageAuto::Percent(100.0))],
                vec![div("content", &[height(25.0)], vec![])],
            )],
        )],
        800.0,
    );
    assert!(approx(border(&tree, "child").height, 25.0));
}

#[test]
fn test_percentage_height_of_definite_parent() {
    let tree = layout(
        &[div(
            "parent",
            &[height(200.0)],
            vec![div("child", &[Declaration::Height(LengthPercentageAuto::Percent(50.0))], vec![])],
        )],
        800.0,
    );
    assert!(approx(border(&tree, "child").height, 100.0));
}

// ---------------------------------------------------------------------------
// Margin collapsing
//
// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
//
// "When two or more margins collapse, the resulting margin width is the
// maximum of the collapsing margins' widths."
// ---------------------------------------------------------------------------

#[test]
fn test_sibling_margins_collapse_to_larger() {
    let tree = layout(
        &[
            div("a", &[height(50.0), margin(PhysicalSide::Bottom, 20.0)], vec![]),
            div("b", &[height(50.0), margin(PhysicalSide::Top, 30.0)], vec![]),
        ],
        800.0,
    );
    assert!(approx(border(&tree, "a").y, 0.0));
    assert!(approx(border(&tree, "b").y, 80.0));
}

#[test]
fn test_negative_margin_is_deducted() {
    let tree = layout(
        &[
            div("a", &[height(50.0), margin(PhysicalSide::Bottom, -10.0)], vec![]),
            div("b", &[height(50.0), margin(PhysicalSide::Top, 30.0)], vec![]),
        ],
        800.0,
    );
    assert!(approx(border(&tree, "b").y, 70.0));
}

#[test]
fn test_first_child_margin_collapses_through_parent() {
    let tree = layout(
        &[div(
            "parent",
            &[margin(PhysicalSide::Top, 10.0)],
            vec![div("child", &[height(20.0), margin(PhysicalSide::Top, 25.0)], vec![])],
        )],
        800.0,
    );
    assert!(approx(border(&tree, "parent").y, 25.0));
    assert!(approx(border(&tree, "child").y, 25.0));
    assert!(approx(border(&tree, "parent").height, 20.0));
}

#[test]
fn test_padding_separates_parent_and_child_margins() {
    let tree = layout(
        &[div(
            "parent",
            &[
                margin(PhysicalSide::Top, 10.0),
                Declaration::Padding(PhysicalSide::Top, LengthPercentage::Px(5.0)),
            ],
            vec![div("child", &[height(20.0), margin(PhysicalSide::Top, 25.0)], vec![])],
        )],
        800.0,
    );
    assert!(approx(border(&tree, "parent").y, 10.0));
    assert!(approx(border(&tree, "child").y, 40.0));
    assert!(approx(border(&tree, "parent").height, 50.0));
}

#[test]
fn test_last_child_margin_collapses_through_parent_bottom() {
    let tree = layout(
        &[
            div(
                "parent",
                &[],
                vec![div("child", &[height(20.0), margin(PhysicalSide::Bottom, 15.0)], vec![])],
            ),
            div("next", &[height(10.0)], vec![]),
        ],
        800.0,
    );
    assert!(approx(border(&tree, "parent").height, 20.0));
    assert!(approx(border(&tree, "next").y, 35.0));
}

#[test]
fn test_margins_collapse_through_empty_block() {
    // "If the top and bottom margins of a box are adjoining, then it is
    // possible for margins to collapse through it."
    let tree = layout(
        &[
            div("a", &[height(20.0)], vec![]),
            div(
                "empty",
                &[margin(PhysicalSide::Top, 10.0), margin(PhysicalSide::Bottom, 15.0)],
                vec![],
            ),
            div("b", &[height(20.0), margin(PhysicalSide::Top, 5.0)], vec![]),
        ],
        800.0,
    );
    assert!(approx(border(&tree, "b").y, 35.0));
    assert!(approx(border(&tree, "empty").height, 0.0));
}

#[test]
fn test_bfc_root_contains_child_margins() {
    let tree = layout(
        &[div(
            "root",
            &[Declaration::Display(DisplayValue::flow_root())],
            vec![div("child", &[height(20.0), margin(PhysicalSide::Top, 25.0)], vec![])],
        )],
        800.0,
    );
    assert!(approx(border(&tree, "root").y, 0.0));
    assert!(approx(border(&tree, "child").y, 25.0));
    assert!(approx(border(&tree, "root").height, 45.0));
}

#[test]
fn test_used_margins_are_recorded() {
    let tree = layout(
        &[div(
            "a",
            &[Declaration::Width(px(200.0)), margin(PhysicalSide::Left, 50.0)],
            vec![],
        )],
        800.0,
    );
    let id = tree
        .preorder(BoxId::ICB)
        .into_iter()
        .find(|&b| tree[b].element.as_deref() == Some("a"))
        .expect("box for a");
    let margins = tree[id].margins;
    assert!(approx(margins.line_left, 50.0));
    // Over-constrained: the end margin takes up the rest.
    assert!(approx(margins.line_right, 550.0));
}
