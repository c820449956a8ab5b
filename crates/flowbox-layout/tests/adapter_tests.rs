//! Integration tests for the host adapter: flat element lists with JSON
//! styles in, absolute rectangles out.

use flowbox_layout::{
    ApproximateShaper, ComputedLayout, ElementLayout, HostElement, LayoutContext, LayoutError,
    UnicodeGraphemeBreaker, UnicodeLineBreakerFactory, Viewport, calculate_block_layout,
};
use flowbox_common::warning::has_warned;
use serde_json::{Value, json};

const VIEWPORT: Viewport = Viewport {
    width: 800.0,
    height: 600.0,
};

/// Helper: a `div` host element.
fn element(id: &str, parent: Option<&str>, style: Value) -> HostElement {
    tagged(id, "div", parent, style)
}

fn tagged(id: &str, tag: &str, parent: Option<&str>, style: Value) -> HostElement {
    serde_json::from_value(json!({
        "id": id,
        "tag": tag,
        "props": { "style": style },
        "parentId": parent,
    }))
    .expect("valid host element")
}

fn with_text(mut element: HostElement, text: &str) -> HostElement {
    element.props.children = Some(Value::String(text.to_string()));
    element
}

fn with_order(mut element: HostElement, order: i64) -> HostElement {
    element.order_num = order;
    element
}

fn compute(elements: &[HostElement]) -> ComputedLayout {
    let shaper = ApproximateShaper::new();
    let ctx = LayoutContext::new(&shaper, &UnicodeLineBreakerFactory, &UnicodeGraphemeBreaker);
    calculate_block_layout(elements, VIEWPORT, &ctx)
}

fn get<'a>(layout: &'a ComputedLayout, id: &str) -> &'a ElementLayout {
    layout.get(id).unwrap_or_else(|| panic!("no layout for {id}"))
}

fn approx(actual: f32, expected: f32) -> bool {
    (actual - expected).abs() < 0.01
}

// ---------------------------------------------------------------------------
// Block flow through the adapter
// ---------------------------------------------------------------------------

#[test]
fn test_children_stack_vertically() {
    let layout = compute(&[
        element("root", None, json!({})),
        element("a", Some("root"), json!({ "height": 100 })),
        element("b", Some("root"), json!({ "height": "50px" })),
    ]);
    assert!(layout.errors.is_empty());

    let root = get(&layout, "root");
    assert!(approx(root.width, 800.0));
    assert!(approx(root.height, 150.0));
    assert!(approx(get(&layout, "a").y, 0.0));
    assert!(approx(get(&layout, "b").y, 100.0));
}

#[test]
fn test_elements_are_reported_in_document_order() {
    let layout = compute(&[
        element("root", None, json!({})),
        element("a", Some("root"), json!({ "height": 10 })),
        element("b", Some("root"), json!({ "height": 10 })),
    ]);
    let ids: Vec<&str> = layout.elements.iter().map(|e| e.element_id.as_str()).collect();
    assert_eq!(ids, ["root", "a", "b"]);
}

#[test]
fn test_order_num_sorts_siblings() {
    let layout = compute(&[
        element("root", None, json!({})),
        with_order(element("second", Some("root"), json!({ "height": 10 })), 2),
        with_order(element("first", Some("root"), json!({ "height": 20 })), 1),
    ]);
    assert!(approx(get(&layout, "first").y, 0.0));
    assert!(approx(get(&layout, "second").y, 20.0));
}

#[test]
fn test_padding_insets_children() {
    let layout = compute(&[
        element("root", None, json!({ "padding": "10px" })),
        element("child", Some("root"), json!({ "height": 20 })),
    ]);
    let child = get(&layout, "child");
    assert!(approx(child.x, 10.0));
    assert!(approx(child.y, 10.0));
    assert!(approx(child.width, 780.0));
    assert!(approx(get(&layout, "root").height, 40.0));
}

#[test]
fn test_box_sizing_defaults_to_border_box() {
    let layout = compute(&[element(
        "root",
        None,
        json!({ "width": 200, "padding": 20, "borderWidth": 5 }),
    )]);
    assert!(approx(get(&layout, "root").width, 200.0));
}

#[test]
fn test_explicit_content_box() {
    let layout = compute(&[element(
        "root",
        None,
        json!({ "width": 200, "padding": 20, "boxSizing": "content-box" }),
    )]);
    assert!(approx(get(&layout, "root").width, 240.0));
}

#[test]
fn test_margin_shorthand_and_reported_margins() {
    let layout = compute(&[
        element("root", None, json!({ "padding": 1 })),
        element("child", Some("root"), json!({ "margin": "10px 20px", "height": 10 })),
    ]);
    let child = get(&layout, "child");
    assert!(approx(child.x, 21.0));
    assert!(approx(child.y, 11.0));
    assert!(approx(child.width, 758.0));
    assert!(approx(child.margin.top, 10.0));
    assert!(approx(child.margin.right, 20.0));
    assert!(approx(child.margin.bottom, 10.0));
    assert!(approx(child.margin.left, 20.0));
}

#[test]
fn test_auto_margins_centre() {
    let layout = compute(&[element(
        "root",
        None,
        json!({ "width": 400, "marginLeft": "auto", "marginRight": "auto" }),
    )]);
    let root = get(&layout, "root");
    assert!(approx(root.x, 200.0));
    assert!(approx(root.margin.left, 200.0));
}

#[test]
fn test_percentages_and_viewport_units() {
    let layout = compute(&[
        element("root", None, json!({})),
        element("half", Some("root"), json!({ "width": "50%", "height": 10 })),
        element("quarter", Some("root"), json!({ "width": "25vw", "height": "5vh" })),
    ]);
    assert!(approx(get(&layout, "half").width, 400.0));
    let quarter = get(&layout, "quarter");
    assert!(approx(quarter.width, 200.0));
    assert!(approx(quarter.height, 30.0));
}

#[test]
fn test_unsupported_value_uses_initial_value() {
    let layout = compute(&[element(
        "root",
        None,
        json!({ "width": "calc(100% - 10px)", "height": 10 }),
    )]);
    assert!(layout.errors.is_empty());
    assert!(approx(get(&layout, "root").width, 800.0));
}

#[test]
fn test_non_finite_numbers_use_initial_value() {
    let layout = compute(&[
        element("root", None, json!({})),
        element(
            "n",
            Some("root"),
            json!({ "width": "nan", "height": "inf", "marginTop": "-infinity", "lineHeight": "NaN" }),
        ),
        element("after", Some("root"), json!({ "height": 10 })),
    ]);
    assert!(layout.errors.is_empty());

    let n = get(&layout, "n");
    assert!(approx(n.width, 800.0));
    assert!(approx(n.height, 0.0));
    assert!(approx(n.margin.top, 0.0));
    let after = get(&layout, "after");
    assert!(approx(after.y, 0.0));
    assert!(approx(after.height, 10.0));
    assert!(approx(get(&layout, "root").height, 10.0));
    assert!(has_warned(
        "Style",
        "invalid length 'inf' for 'height', using the initial value"
    ));
}

#[test]
fn test_flex_is_laid_out_as_block() {
    let layout = compute(&[
        element("root", None, json!({ "display": "flex" })),
        element("a", Some("root"), json!({ "height": 10 })),
        element("b", Some("root"), json!({ "height": 10 })),
    ]);
    assert!(approx(get(&layout, "b").y, 10.0));
}

#[test]
fn test_display_none_generates_nothing() {
    let layout = compute(&[
        element("root", None, json!({})),
        element("hidden", Some("root"), json!({ "display": "none", "height": 50 })),
        element("inner", Some("hidden"), json!({ "height": 50 })),
        element("shown", Some("root"), json!({ "height": 10 })),
    ]);
    assert!(layout.get("hidden").is_none());
    assert!(layout.get("inner").is_none());
    assert!(approx(get(&layout, "shown").y, 0.0));
}

// ---------------------------------------------------------------------------
// Text and replaced content
// ---------------------------------------------------------------------------

#[test]
fn test_text_content_gives_height() {
    let layout = compute(&[with_text(element("root", None, json!({})), "Hello world")]);
    assert!(approx(get(&layout, "root").height, 16.0));
}

#[test]
fn test_text_wraps_in_narrow_element() {
    let layout = compute(&[with_text(element("root", None, json!({ "width": 30 })), "ab cd ef")]);
    assert!(approx(get(&layout, "root").height, 48.0));
}

#[test]
fn test_font_size_scales_line() {
    let layout = compute(&[with_text(
        element("root", None, json!({ "fontSize": 32 })),
        "Hi",
    )]);
    assert!(approx(get(&layout, "root").height, 32.0));
}

#[test]
fn test_image_uses_its_size() {
    let layout = compute(&[
        element("root", None, json!({})),
        tagged("img", "img", Some("root"), json!({ "width": 120, "height": 80 })),
    ]);
    let img = get(&layout, "img");
    assert!(approx(img.width, 120.0));
    assert!(approx(img.height, 80.0));
}

#[test]
fn test_image_sizes_do_not_depend_on_earlier_calls() {
    let elements = [
        element("root", None, json!({ "width": 200 })),
        tagged("natural", "img", Some("root"), json!({})),
        tagged("half", "img", Some("root"), json!({ "width": "50%" })),
    ];
    let first = compute(&elements);
    let _ = compute(&[
        element("other", None, json!({})),
        tagged("big", "img", Some("other"), json!({ "width": 640, "height": 480 })),
    ]);
    let second = compute(&elements);
    assert_eq!(first, second);

    let natural = get(&second, "natural");
    assert!(approx(natural.width, 300.0));
    assert!(approx(natural.height, 150.0));
    assert!(approx(get(&second, "half").width, 100.0));
}

// ---------------------------------------------------------------------------
// Floats and positioning
// ---------------------------------------------------------------------------

#[test]
fn test_floats_line_up() {
    let layout = compute(&[
        element("root", None, json!({})),
        element("a", Some("root"), json!({ "float": "left", "width": 100, "height": 40 })),
        element("b", Some("root"), json!({ "float": "left", "width": 100, "height": 40 })),
        element("c", Some("root"), json!({ "float": "right", "width": 100, "height": 40 })),
    ]);
    assert!(approx(get(&layout, "a").x, 0.0));
    assert!(approx(get(&layout, "b").x, 100.0));
    assert!(approx(get(&layout, "c").x, 700.0));
}

#[test]
fn test_absolute_child_of_relative_parent() {
    let layout = compute(&[
        element("spacer", None, json!({ "height": 50 })),
        element("root", None, json!({ "position": "relative", "height": 200 })),
        element(
            "abs",
            Some("root"),
            json!({ "position": "absolute", "top": 10, "left": 20, "width": 50, "height": 50 }),
        ),
    ]);
    let abs = get(&layout, "abs");
    assert!(approx(abs.x, 20.0));
    assert!(approx(abs.y, 60.0));
    assert!(approx(abs.width, 50.0));
    assert!(approx(get(&layout, "root").height, 200.0));
}

#[test]
fn test_fixed_is_treated_as_absolute() {
    let layout = compute(&[
        element("root", None, json!({ "height": 100 })),
        element(
            "fixed",
            Some("root"),
            json!({ "position": "fixed", "right": 0, "bottom": 0, "width": 100, "height": 50 }),
        ),
    ]);
    let fixed = get(&layout, "fixed");
    assert!(approx(fixed.x, 700.0));
    assert!(approx(fixed.y, 550.0));
    assert!(approx(get(&layout, "root").height, 100.0));
}

#[test]
fn test_relative_offset_does_not_move_siblings() {
    let layout = compute(&[
        element("root", None, json!({})),
        element("moved", Some("root"), json!({ "position": "relative", "top": 5, "left": 7, "height": 10 })),
        element("next", Some("root"), json!({ "height": 10 })),
    ]);
    let moved = get(&layout, "moved");
    assert!(approx(moved.x, 7.0));
    assert!(approx(moved.y, 5.0));
    assert!(approx(get(&layout, "next").y, 10.0));
}

// ---------------------------------------------------------------------------
// Structural errors
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_parent_is_reported_and_skipped() {
    let layout = compute(&[
        element("root", None, json!({ "height": 10 })),
        element("orphan", Some("missing"), json!({ "height": 10 })),
        element("orphan-child", Some("orphan"), json!({ "height": 10 })),
    ]);
    assert_eq!(
        layout.errors,
        vec![LayoutError::UnknownParent {
            element: "orphan".to_string(),
            parent: "missing".to_string(),
        }]
    );
    assert!(layout.get("orphan").is_none());
    assert!(layout.get("orphan-child").is_none());
    assert!(layout.get("root").is_some());
}

#[test]
fn test_cycle_is_reported_once() {
    let layout = compute(&[
        element("root", None, json!({})),
        element("a", Some("b"), json!({})),
        element("b", Some("a"), json!({})),
    ]);
    let cycles = layout
        .errors
        .iter()
        .filter(|error| matches!(error, LayoutError::Cycle { .. }))
        .count();
    assert_eq!(cycles, 1);
    assert!(layout.get("a").is_none());
    assert!(layout.get("b").is_none());
}

#[test]
fn test_only_a_cycle_is_missing_root() {
    let layout = compute(&[element("a", Some("b"), json!({})), element("b", Some("a"), json!({}))]);
    assert!(layout.errors.contains(&LayoutError::MissingRoot));
    assert!(layout.elements.is_empty());
}

#[test]
fn test_duplicate_id_keeps_first() {
    let layout = compute(&[
        element("root", None, json!({ "height": 10 })),
        element("root", None, json!({ "height": 99 })),
    ]);
    assert_eq!(
        layout.errors,
        vec![LayoutError::DuplicateElement {
            element: "root".to_string(),
        }]
    );
    assert_eq!(layout.elements.len(), 1);
    assert!(approx(get(&layout, "root").height, 10.0));
}

#[test]
fn test_empty_list_is_empty_layout() {
    let layout = compute(&[]);
    assert!(layout.elements.is_empty());
    assert!(layout.errors.is_empty());
}

// ---------------------------------------------------------------------------
// Serialization and determinism
// ---------------------------------------------------------------------------

#[test]
fn test_host_elements_accept_snake_case_fields() {
    let element: HostElement = serde_json::from_value(json!({
        "id": "x",
        "tag": "div",
        "parent_id": "root",
        "order_num": 3,
    }))
    .expect("valid host element");
    assert_eq!(element.parent_id.as_deref(), Some("root"));
    assert_eq!(element.order_num, 3);
    assert!(element.props.style.is_empty());
}

#[test]
fn test_layout_serializes_camel_case() {
    let layout = compute(&[element("root", None, json!({ "height": 10 }))]);
    let value = serde_json::to_value(&layout).expect("serializable");
    assert_eq!(value["elements"][0]["elementId"], json!("root"));
    assert_eq!(value["elements"][0]["height"], json!(10.0));
}

#[test]
fn test_same_input_same_output() {
    let elements = [
        element("root", None, json!({ "padding": 8 })),
        with_text(element("p", Some("root"), json!({ "width": 120 })), "some words to wrap"),
        element("f", Some("root"), json!({ "float": "left", "width": 30, "height": 30 })),
    ];
    assert_eq!(compute(&elements), compute(&elements));
}
