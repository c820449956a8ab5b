//! Flowbox CLI
//!
//! Lays out a host element tree given as JSON and prints the computed
//! rectangles.
//!
//! Input is an array of elements:
//!
//! ```json
//! [
//!   { "id": "root", "tag": "div", "props": { "style": { "padding": 8 } } },
//!   { "id": "p", "tag": "p", "parentId": "root", "props": { "children": "Hello" } }
//! ]
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use flowbox_common::warning::clear_warnings;
use flowbox_layout::{
    ApproximateShaper, HostElement, LayoutContext, LayoutError, UnicodeGraphemeBreaker,
    UnicodeLineBreakerFactory, Viewport, build_host_box_tree, calculate_block_layout, layout_tree,
};
use owo_colors::OwoColorize;

/// Flowbox: block and inline flow layout for host element trees
#[derive(Parser, Debug)]
#[command(name = "flowbox")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Lay out a file and print JSON
    flowbox tree.json

    # Pretty-printed JSON for a narrow viewport
    flowbox --width 320 --pretty tree.json

    # Inline input
    flowbox --json '[{"id":"a","tag":"div","props":{"children":"Hi"}}]'

    # Print the laid out box tree
    flowbox --tree tree.json
"#)]
struct Cli {
    /// Path to a JSON file holding the element array
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Read the element array from this string instead of a file
    #[arg(long, value_name = "STRING")]
    json: Option<String>,

    /// Viewport width in CSS pixels
    #[arg(long, default_value = "800")]
    width: f32,

    /// Viewport height in CSS pixels
    #[arg(long, default_value = "600")]
    height: f32,

    /// Content language passed to the shaper
    #[arg(long, default_value = flowbox_layout::layout::DEFAULT_LANG)]
    lang: String,

    /// Print the box tree instead of JSON
    #[arg(long)]
    tree: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let elements = load_elements(&cli)?;
    let viewport = Viewport {
        width: cli.width,
        height: cli.height,
    };

    let shaper = ApproximateShaper::new();
    let ctx = LayoutContext::new(&shaper, &UnicodeLineBreakerFactory, &UnicodeGraphemeBreaker)
        .with_lang(&cli.lang);

    log::debug!(
        "laying out {} elements in {}x{} ({})",
        elements.len(),
        viewport.width,
        viewport.height,
        ctx.lang
    );

    // Tree mode
    if cli.tree {
        clear_warnings();
        let (mut tree, errors) = build_host_box_tree(&elements, viewport);
        layout_tree(&mut tree, &ctx);
        print!("{}", tree.dump());
        report_errors(&errors);
        return Ok(());
    }

    // JSON mode
    let layout = calculate_block_layout(&elements, viewport, &ctx);
    let output = if cli.pretty {
        serde_json::to_string_pretty(&layout)?
    } else {
        serde_json::to_string(&layout)?
    };
    println!("{output}");
    report_errors(&layout.errors);

    Ok(())
}

/// Load the element array from CLI arguments
fn load_elements(cli: &Cli) -> anyhow::Result<Vec<HostElement>> {
    let source = if let Some(ref json) = cli.json {
        json.clone()
    } else if let Some(ref path) = cli.path {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    } else {
        anyhow::bail!("expected a file path or --json")
    };
    serde_json::from_str(&source).context("input is not an array of host elements")
}

/// Structural errors do not fail the run; they are listed on stderr.
fn report_errors(errors: &[LayoutError]) {
    if errors.is_empty() {
        return;
    }
    eprintln!(
        "{} {} structural error(s):",
        "warning:".yellow().bold(),
        errors.len()
    );
    for error in errors {
        eprintln!("  {} {error}", "-".red());
    }
}
