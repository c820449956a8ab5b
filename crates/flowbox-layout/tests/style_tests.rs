//! Integration tests for the computed style model.

use flowbox_common::warning::has_warned;
use flowbox_layout::style::{
    AutoOr, BorderStyle, BoxSizing, ContainingBlock, Direction, DisplayValue, Float,
    LengthPercentage, LengthPercentageAuto, MaxSize, Overflow, PhysicalSide, Position, Property,
    Sides, TextAlign, WhiteSpace, WritingMode, parse_display_value,
};
use flowbox_layout::{Declaration, Style, create_child_style};

fn cb(inline_size: f32) -> ContainingBlock {
    ContainingBlock::new(inline_size, Some(400.0))
}

// ---------------------------------------------------------------------------
// Inheritance
//
// [§ 7 Inheritance](https://www.w3.org/TR/css-cascade-4/#inheriting)
//
// "Inheritance propagates property values from parent elements to their
// children."
// ---------------------------------------------------------------------------

#[test]
fn test_initial_values() {
    let style = Style::default();
    assert!((style.font_size - 16.0).abs() < f32::EPSILON);
    assert_eq!(style.font_weight, 400);
    assert_eq!(style.display, DisplayValue::inline());
    assert_eq!(style.position, Position::Static);
    assert_eq!(style.box_sizing, BoxSizing::ContentBox);
    assert_eq!(style.width, LengthPercentageAuto::Auto);
    assert_eq!(style.max_width, MaxSize::None);
    assert_eq!(style.float, Float::None);
    assert_eq!(style.overflow, Overflow::Visible);
    assert_eq!(style.font_family, vec!["Helvetica".to_string()]);
}

#[test]
fn test_inherited_properties_copy_from_parent() {
    let parent = create_child_style(
        &Style::block(),
        &[
            Declaration::FontSize(24.0),
            Declaration::WhiteSpace(WhiteSpace::Pre),
            Declaration::TextAlign(TextAlign::Center),
            Declaration::Direction(Direction::Rtl),
        ],
    );
    let child = create_child_style(&parent, &[]);
    assert!((child.font_size - 24.0).abs() < f32::EPSILON);
    assert_eq!(child.white_space, WhiteSpace::Pre);
    assert_eq!(child.text_align, TextAlign::Center);
    assert_eq!(child.direction, Direction::Rtl);
}

#[test]
fn test_non_inherited_properties_reset() {
    let parent = create_child_style(
        &Style::block(),
        &[
            Declaration::Margin(PhysicalSide::Top, LengthPercentageAuto::Px(10.0)),
            Declaration::Width(LengthPercentageAuto::Px(100.0)),
            Declaration::Position(Position::Relative),
        ],
    );
    let child = create_child_style(&parent, &[]);
    assert_eq!(child.margin.top, LengthPercentageAuto::Px(0.0));
    assert_eq!(child.width, LengthPercentageAuto::Auto);
    assert_eq!(child.position, Position::Static);
    assert_eq!(child.display, DisplayValue::inline());
}

#[test]
fn test_explicit_inherit_of_non_inherited_property() {
    let parent = create_child_style(&Style::block(), &[Declaration::Width(LengthPercentageAuto::Px(120.0))]);
    let child = create_child_style(&parent, &[Declaration::Inherit(Property::Width)]);
    assert_eq!(child.width, LengthPercentageAuto::Px(120.0));
}

#[test]
fn test_later_declaration_wins() {
    let style = create_child_style(
        &Style::block(),
        &[Declaration::FontSize(10.0), Declaration::FontSize(20.0)],
    );
    assert!((style.font_size - 20.0).abs() < f32::EPSILON);
}

#[test]
fn test_parent_is_not_modified() {
    let parent = Style::block();
    let before = parent.clone();
    let _ = create_child_style(&parent, &[Declaration::FontSize(40.0)]);
    assert_eq!(parent, before);
}

// ---------------------------------------------------------------------------
// Logical accessors
//
// [§ 6 Abstract Box Terminology](https://www.w3.org/TR/css-writing-modes-4/#abstract-box)
// ---------------------------------------------------------------------------

#[test]
fn test_percent_padding_resolves_against_inline_size() {
    let style = create_child_style(
        &Style::block(),
        &[Declaration::Padding(PhysicalSide::Top, LengthPercentage::Percent(10.0))],
    );
    // Vertical percentages also refer to the containing block's width.
    assert!((style.padding_block_start(&cb(300.0)) - 30.0).abs() < f32::EPSILON);
}

#[test]
fn test_border_needs_a_style() {
    let hidden = create_child_style(
        &Style::block(),
        &[Declaration::BorderWidth(PhysicalSide::Left, 4.0)],
    );
    assert!(hidden.border_line_left_width(&cb(100.0)).abs() < f32::EPSILON);
    assert!(!hidden.has_border_area());

    let solid = create_child_style(
        &Style::block(),
        &[
            Declaration::BorderWidth(PhysicalSide::Left, 4.0),
            Declaration::BorderStyle(PhysicalSide::Left, BorderStyle::Solid),
        ],
    );
    assert!((solid.border_line_left_width(&cb(100.0)) - 4.0).abs() < f32::EPSILON);
    assert!(solid.has_border_area());
}

#[test]
fn test_border_box_inline_size() {
    let style = create_child_style(
        &Style::block(),
        &[
            Declaration::Width(LengthPercentageAuto::Px(100.0)),
            Declaration::BoxSizing(BoxSizing::BorderBox),
            Declaration::Padding(PhysicalSide::Left, LengthPercentage::Px(10.0)),
            Declaration::Padding(PhysicalSide::Right, LengthPercentage::Px(10.0)),
        ],
    );
    assert_eq!(style.inline_size(&cb(500.0)), AutoOr::Length(80.0));
}

#[test]
fn test_percent_height_of_indefinite_block_is_auto() {
    let style = create_child_style(
        &Style::block(),
        &[Declaration::Height(LengthPercentageAuto::Percent(100.0))],
    );
    assert_eq!(style.block_size(&ContainingBlock::new(500.0, None)), AutoOr::Auto);
    assert_eq!(style.block_size(&cb(500.0)), AutoOr::Length(400.0));
}

#[test]
fn test_vertical_lr_maps_left_to_block_start() {
    let style = Style {
        margin: Sides {
            top: LengthPercentageAuto::Px(1.0),
            right: LengthPercentageAuto::Px(2.0),
            bottom: LengthPercentageAuto::Px(3.0),
            left: LengthPercentageAuto::Px(4.0),
        },
        ..Style::block()
    };
    let vertical = ContainingBlock {
        writing_mode: WritingMode::VerticalLr,
        ..cb(100.0)
    };
    assert_eq!(style.margin_block_start(&vertical), AutoOr::Length(4.0));
    assert_eq!(style.margin_block_end(&vertical), AutoOr::Length(2.0));
    assert_eq!(style.margin_line_right(&vertical), AutoOr::Length(3.0));
}

#[test]
fn test_min_and_max_clamp_inline_size() {
    let style = create_child_style(
        &Style::block(),
        &[
            Declaration::MinWidth(LengthPercentage::Px(50.0)),
            Declaration::MaxWidth(MaxSize::Percent(50.0)),
        ],
    );
    assert!((style.clamp_inline_size(&cb(400.0), 10.0) - 50.0).abs() < f32::EPSILON);
    assert!((style.clamp_inline_size(&cb(400.0), 300.0) - 200.0).abs() < f32::EPSILON);
}

// ---------------------------------------------------------------------------
// Derived predicates
// ---------------------------------------------------------------------------

#[test]
fn test_formatting_context_roots() {
    let flow_root = create_child_style(&Style::block(), &[Declaration::Display(DisplayValue::flow_root())]);
    assert!(flow_root.creates_bfc());

    let floated = create_child_style(&Style::block(), &[Declaration::Float(Float::Left)]);
    assert!(floated.creates_bfc());

    let hidden = create_child_style(
        &Style::block(),
        &[
            Declaration::Display(DisplayValue::block()),
            Declaration::Overflow(Overflow::Hidden),
        ],
    );
    assert!(hidden.creates_bfc());

    assert!(!Style::block().creates_bfc());
}

#[test]
fn test_blockified_inline_becomes_block_level() {
    let inline = Style::default();
    assert!(inline.display.is_inline_level());
    assert!(inline.blockified().display.is_block_level());

    let inline_block = create_child_style(&Style::block(), &[Declaration::Display(DisplayValue::inline_block())]);
    assert!(inline_block.blockified().display.is_block_level());
}

#[test]
fn test_whitespace_collapsibility() {
    let with = |white_space| create_child_style(&Style::block(), &[Declaration::WhiteSpace(white_space)]);
    assert!(with(WhiteSpace::Normal).is_ws_collapsible());
    assert!(with(WhiteSpace::Nowrap).is_ws_collapsible());
    assert!(with(WhiteSpace::PreLine).is_ws_collapsible());
    assert!(!with(WhiteSpace::Pre).is_ws_collapsible());
    assert!(!with(WhiteSpace::PreWrap).is_ws_collapsible());
}

// ---------------------------------------------------------------------------
// Keywords
// ---------------------------------------------------------------------------

#[test]
fn test_keywords_parse_and_print_kebab_case() {
    assert_eq!("pre-wrap".parse::<WhiteSpace>(), Ok(WhiteSpace::PreWrap));
    assert_eq!("border-box".parse::<BoxSizing>(), Ok(BoxSizing::BorderBox));
    assert_eq!(WritingMode::VerticalRl.to_string(), "vertical-rl");
    assert!("sideways".parse::<WritingMode>().is_err());
}

#[test]
fn test_display_keywords() {
    assert_eq!(parse_display_value("block"), DisplayValue::block());
    assert_eq!(parse_display_value("list-item"), DisplayValue::block());
    assert_eq!(parse_display_value("inline"), DisplayValue::inline());
    assert_eq!(parse_display_value("flow-root"), DisplayValue::flow_root());
    assert!(parse_display_value("none").is_none());
}

#[test]
fn test_unsupported_display_warns_and_falls_back() {
    assert_eq!(parse_display_value("table-cell"), DisplayValue::block());
    assert!(has_warned("Style", "unsupported display value 'table-cell'"));
}
