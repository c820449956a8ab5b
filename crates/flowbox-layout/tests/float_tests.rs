//! Integration tests for float placement, line shortening and clearance.

use flowbox_layout::style::{Clear, DisplayValue, Float, LengthPercentageAuto};
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

/// Helper: a float of the given side and size.
fn float(id: &str, side: Float, width: f32, height: f32) -> SourceNode {
    div(
        id,
        &[
            Declaration::Float(side),
            Declaration::Width(LengthPercentageAuto::Px(width)),
            Declaration::Height(LengthPercentageAuto::Px(height)),
        ],
        vec![],
    )
}

fn width(value: f32) -> Declaration {
    Declaration::Width(LengthPercentageAuto::Px(value))
}

fn layout(roots: &[SourceNode], viewport_width: f32) -> BoxTree {
    let shaper = ApproximateShaper::new();
    let ctx = LayoutContext::new(&shaper, &UnicodeLineBreakerFactory, &UnicodeGraphemeBreaker);
    let mut tree = build_box_tree(roots, viewport_width, 600.0);
    layout_tree(&mut tree, &ctx);
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
// Placement
//
// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
// ---------------------------------------------------------------------------

#[test]
fn test_left_float_at_line_left_edge() {
    let tree = layout(&[div("c", &[], vec![float("f", Float::Left, 100.0, 50.0)])], 400.0);
    let f = border(&tree, "f");
    assert!(approx(f.x, 0.0));
    assert!(approx(f.y, 0.0));
    assert!(approx(f.width, 100.0));
    assert!(approx(f.height, 50.0));
}

#[test]
fn test_right_float_at_line_right_edge() {
    let tree = layout(&[div("c", &[], vec![float("f", Float::Right, 100.0, 50.0)])], 400.0);
    assert!(approx(border(&tree, "f").x, 300.0));
}

#[test]
fn test_left_floats_stack_along_the_line() {
    // "If the current box is left-floating, and there are any left-floating
    // boxes generated by elements earlier in the source document, then for
    // each such earlier box, either the left outer edge of the current box
    // must be to the right of the right outer edge of the earlier box, or
    // its top must be lower than the bottom of the earlier box."
    let tree = layout(
        &[div(
            "c",
            &[],
            vec![float("a", Float::Left, 100.0, 50.0), float("b", Float::Left, 100.0, 50.0)],
        )],
        400.0,
    );
    assert!(approx(border(&tree, "b").x, 100.0));
    assert!(approx(border(&tree, "b").y, 0.0));
}

#[test]
fn test_float_that_does_not_fit_moves_down() {
    let tree = layout(
        &[div(
            "c",
            &[width(150.0)],
            vec![float("a", Float::Left, 100.0, 20.0), float("b", Float::Left, 100.0, 20.0)],
        )],
        400.0,
    );
    let b = border(&tree, "b");
    assert!(approx(b.x, 0.0));
    assert!(approx(b.y, 20.0));
}

#[test]
fn test_opposite_floats_share_a_band() {
    let tree = layout(
        &[div(
            "c",
            &[],
            vec![float("l", Float::Left, 100.0, 30.0), float("r", Float::Right, 100.0, 30.0)],
        )],
        400.0,
    );
    assert!(approx(border(&tree, "l").y, 0.0));
    assert!(approx(border(&tree, "r").y, 0.0));
    assert!(approx(border(&tree, "r").x, 300.0));
}

#[test]
fn test_float_with_auto_width_shrinks_to_fit() {
    let tree = layout(
        &[div(
            "c",
            &[],
            vec![div("f", &[Declaration::Float(Float::Left)], vec![SourceNode::text("abcd")])],
        )],
        400.0,
    );
    let f = border(&tree, "f");
    assert!(approx(f.width, 32.0));
    assert!(approx(f.height, 16.0));
}

#[test]
fn test_float_does_not_add_to_parent_height() {
    let tree = layout(&[div("c", &[], vec![float("f", Float::Left, 100.0, 50.0)])], 400.0);
    assert!(approx(border(&tree, "c").height, 0.0));
}

// ---------------------------------------------------------------------------
// Lines beside floats
//
// "A line box is next to a float when there exists a vertical position that
// satisfies all of these four conditions ... In that case, the line box is
// shortened."
// ---------------------------------------------------------------------------

#[test]
fn test_line_is_shortened_beside_float() {
    let tree = layout(
        &[div(
            "c",
            &[],
            vec![float("f", Float::Left, 100.0, 50.0), SourceNode::text("abc")],
        )],
        400.0,
    );
    let c = find(&tree, "c");
    let para = tree[c].kind.paragraph().expect("inline content");
    assert_eq!(para.lineboxes.len(), 1);
    assert!(approx(para.lineboxes[0].line_left, 100.0));
}

#[test]
fn test_right_float_leaves_line_left_edge() {
    let tree = layout(
        &[div(
            "c",
            &[],
            vec![float("f", Float::Right, 100.0, 50.0), SourceNode::text("abc")],
        )],
        400.0,
    );
    let c = find(&tree, "c");
    let para = tree[c].kind.paragraph().expect("inline content");
    assert!(approx(para.lineboxes[0].line_left, 0.0));
}

#[test]
fn test_lines_return_to_full_width_below_float() {
    // 100px beside the float: "aaaa bbbb" (68px) fits, "cccc" does not.
    let tree = layout(
        &[div(
            "c",
            &[width(200.0)],
            vec![
                float("f", Float::Left, 100.0, 16.0),
                SourceNode::text("aaaa bbbb cccc dddd"),
            ],
        )],
        400.0,
    );
    let c = find(&tree, "c");
    let para = tree[c].kind.paragraph().expect("inline content");
    assert_eq!(para.lineboxes.len(), 2);
    assert!(approx(para.lineboxes[0].line_left, 100.0));
    assert!(approx(para.lineboxes[1].line_left, 0.0));
    assert!(approx(para.lineboxes[1].block_offset, 16.0));
}

#[test]
fn test_text_skips_band_too_narrow_for_a_word() {
    // 20px beside the float cannot hold "abcd" (32px).
    let tree = layout(
        &[div(
            "c",
            &[width(120.0)],
            vec![float("f", Float::Left, 100.0, 40.0), SourceNode::text("abcd")],
        )],
        400.0,
    );
    let c = find(&tree, "c");
    let para = tree[c].kind.paragraph().expect("inline content");
    assert_eq!(para.lineboxes.len(), 1);
    assert!(approx(para.lineboxes[0].block_offset, 40.0));
    assert!(approx(para.lineboxes[0].line_left, 0.0));
}

// ---------------------------------------------------------------------------
// Clearance and containment
//
// [§ 9.5.2 Controlling flow next to floats: the 'clear' property](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
// ---------------------------------------------------------------------------

#[test]
fn test_clear_left_moves_below_left_float() {
    let tree = layout(
        &[div(
            "c",
            &[],
            vec![
                float("f", Float::Left, 100.0, 50.0),
                div(
                    "cleared",
                    &[Declaration::Clear(Clear::Left), Declaration::Height(LengthPercentageAuto::Px(10.0))],
                    vec![],
                ),
            ],
        )],
        400.0,
    );
    assert!(approx(border(&tree, "cleared").y, 50.0));
}

#[test]
fn test_clear_right_ignores_left_float() {
    let tree = layout(
        &[div(
            "c",
            &[],
            vec![
                float("f", Float::Left, 100.0, 50.0),
                div(
                    "cleared",
                    &[Declaration::Clear(Clear::Right), Declaration::Height(LengthPercentageAuto::Px(10.0))],
                    vec![],
                ),
            ],
        )],
        400.0,
    );
    assert!(approx(border(&tree, "cleared").y, 0.0));
}

#[test]
fn test_clear_both_moves_below_tallest_float() {
    let tree = layout(
        &[div(
            "c",
            &[],
            vec![
                float("l", Float::Left, 100.0, 30.0),
                float("r", Float::Right, 100.0, 70.0),
                div(
                    "cleared",
                    &[Declaration::Clear(Clear::Both), Declaration::Height(LengthPercentageAuto::Px(10.0))],
                    vec![],
                ),
            ],
        )],
        400.0,
    );
    assert!(approx(border(&tree, "cleared").y, 70.0));
}

#[test]
fn test_flow_root_height_contains_floats() {
    // [§ 10.6.7](https://www.w3.org/TR/CSS2/visudet.html#root-height)
    //
    // "In addition, if the element has any floating descendants whose bottom
    // margin edge is below the element's bottom content edge, then the
    // height is increased to include those edges."
    let tree = layout(
        &[div(
            "root",
            &[Declaration::Display(DisplayValue::flow_root())],
            vec![float("f", Float::Left, 100.0, 80.0)],
        )],
        400.0,
    );
    assert!(approx(border(&tree, "root").height, 80.0));
}

#[test]
fn test_floats_do_not_leak_out_of_flow_root() {
    let tree = layout(
        &[
            div(
                "root",
                &[Declaration::Display(DisplayValue::flow_root())],
                vec![float("f", Float::Left, 100.0, 80.0)],
            ),
            div("after", &[], vec![SourceNode::text("abc")]),
        ],
        400.0,
    );
    let after = find(&tree, "after");
    let para = tree[after].kind.paragraph().expect("inline content");
    assert!(approx(border(&tree, "after").y, 80.0));
    assert!(approx(para.lineboxes[0].line_left, 0.0));
}
