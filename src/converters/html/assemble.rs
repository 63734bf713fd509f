//! Builds the HTML fragment and stylesheet for a converted template.

use super::{
    config::ConverterConfig,
    constants::*,
    css::{write_box_declarations, write_group_declarations, write_text_declarations},
    error::Result,
    extract::background_markup,
    placeholders::primary_placeholder,
    utils::{escape_html_attr, escape_html_text},
};
use crate::models::{
    dimensions::Dimensions,
    elements::{walk_text, Bounds, DrawingElement, GroupElement, ShapeElement, ShapeKind, TextElement},
    request::LayoutMode,
};
use std::fmt::Write;

/// The HTML fragment and CSS of one template page.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPage {
    pub html: String,
    pub css: String,
}

/// Lays out the extracted elements as HTML and CSS.
///
/// # Arguments
/// * `elements` - The extracted elements, in document order.
/// * `markup` - The decoded SVG markup (used as the overlay background).
/// * `dims` - The document's coordinate space.
/// * `mode` - Which layout to produce.
/// * `page_type` - Emitted as `data-page-type` on the page container.
/// * `config` - Supplies fallback text color.
///
/// # Returns
/// The assembled page, or a formatting error.
pub fn assemble_page(
    elements: &[DrawingElement],
    markup: &str,
    dims: &Dimensions,
    mode: LayoutMode,
    page_type: &str,
    config: &ConverterConfig,
) -> Result<AssembledPage> {
    let mut html = String::new();
    let mut rules = String::new();

    writeln!(
        html,
        r#"<div class="{}" data-page-type="{}" data-layout="{}">"#,
        PAGE_CLASS,
        escape_html_attr(page_type),
        layout_name(mode)
    )?;

    match mode {
        LayoutMode::Overlay => {
            writeln!(html, r#"  <div class="{}" aria-hidden="true">"#, BACKGROUND_CLASS)?;
            let background = background_markup(markup);
            if !background.is_empty() {
                writeln!(html, "{}", background)?;
            }
            writeln!(html, "  </div>")?;

            writeln!(html, r#"  <div class="{}">"#, OVERLAY_CLASS)?;
            let mut texts: Vec<&TextElement> = Vec::new();
            walk_text(elements, &mut |text| texts.push(text));
            for text in texts {
                write_text_html(text, 2, &mut html)?;
                write_text_rule(text, dims, config, &mut rules)?;
            }
            writeln!(html, "  </div>")?;
        }
        LayoutMode::Decomposed => {
            for element in elements {
                write_element(element, 1, dims, config, &mut html, &mut rules)?;
            }
        }
    }

    writeln!(html, "</div>")?;

    let css = build_stylesheet(dims, &rules)?;
    Ok(AssembledPage { html, css })
}

fn layout_name(mode: LayoutMode) -> &'static str {
    match mode {
        LayoutMode::Overlay => "overlay",
        LayoutMode::Decomposed => "decomposed",
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

// --- Elements ---

fn write_element(
    element: &DrawingElement,
    depth: usize,
    dims: &Dimensions,
    config: &ConverterConfig,
    html: &mut String,
    rules: &mut String,
) -> Result<()> {
    match element {
        DrawingElement::Text(text) => {
            write_text_html(text, depth, html)?;
            write_text_rule(text, dims, config, rules)?;
        }
        DrawingElement::Shape(shape) => {
            write_shape_html(shape, depth, html)?;
            let mut declarations = String::new();
            write_box_declarations(&shape.bounds, dims, &mut declarations)?;
            writeln!(rules, "#{} {{ {} }}", shape.id, declarations)?;
        }
        DrawingElement::Group(group) => write_group(group, depth, dims, config, html, rules)?,
    }
    Ok(())
}

fn write_source_id(source_id: Option<&str>, html: &mut String) -> Result<()> {
    if let Some(source_id) = source_id {
        write!(html, r#" data-svg-id="{}""#, escape_html_attr(source_id))?;
    }
    Ok(())
}

fn write_text_html(text: &TextElement, depth: usize, html: &mut String) -> Result<()> {
    write!(html, r#"{}<div class="{}" id="{}""#, indent(depth), TEXT_CLASS, text.id)?;
    write_source_id(text.source_id.as_deref(), html)?;
    if let Some(name) = &text.placeholder_name {
        write!(html, r#" data-placeholder="{}""#, escape_html_attr(name))?;
    }
    writeln!(html, ">{}</div>", escape_html_text(&text.content))?;
    Ok(())
}

fn write_text_rule(
    text: &TextElement,
    dims: &Dimensions,
    config: &ConverterConfig,
    rules: &mut String,
) -> Result<()> {
    let mut declarations = String::new();
    write_text_declarations(text, dims, &config.default_fill, &mut declarations)?;
    writeln!(rules, "#{} {{ {} }}", text.id, declarations)?;
    Ok(())
}

fn write_shape_html(shape: &ShapeElement, depth: usize, html: &mut String) -> Result<()> {
    write!(
        html,
        r#"{}<div class="{}" id="{}" data-shape="{}""#,
        indent(depth),
        SHAPE_CLASS,
        shape.id,
        shape.kind.tag()
    )?;
    write_source_id(shape.source_id.as_deref(), html)?;

    match &shape.kind {
        ShapeKind::Image { href: Some(href) } => {
            if let Some(name) = primary_placeholder(href) {
                write!(html, r#" data-placeholder="{}""#, escape_html_attr(&name))?;
            }
            writeln!(
                html,
                r#"><img src="{}" alt="" draggable="false"></div>"#,
                escape_html_attr(href)
            )?;
        }
        _ => {
            write!(html, ">")?;
            write_inline_svg(shape, html)?;
            writeln!(html, "</div>")?;
        }
    }
    Ok(())
}

/// Wraps a shape's original markup in an `<svg>` whose viewBox is the shape's
/// page-space bounds, so the shape fills its box. Degenerate extents (e.g. a
/// horizontal line) get a unit extent; the box overflows visibly.
fn write_inline_svg(shape: &ShapeElement, html: &mut String) -> Result<()> {
    let Bounds { x, y, width, height } = shape.bounds;
    write!(
        html,
        r#"<svg xmlns="{}" xmlns:xlink="{}" viewBox="{} {} {} {}" preserveAspectRatio="none" overflow="visible">"#,
        SVG_NS,
        XLINK_NS,
        x,
        y,
        width.max(1.0),
        height.max(1.0)
    )?;
    if shape.offset.is_zero() {
        write!(html, "{}", shape.markup)?;
    } else {
        write!(
            html,
            r#"<g transform="translate({} {})">{}</g>"#,
            shape.offset.dx, shape.offset.dy, shape.markup
        )?;
    }
    write!(html, "</svg>")?;
    Ok(())
}

fn write_group(
    group: &GroupElement,
    depth: usize,
    dims: &Dimensions,
    config: &ConverterConfig,
    html: &mut String,
    rules: &mut String,
) -> Result<()> {
    write!(html, r#"{}<div class="{}" id="{}""#, indent(depth), GROUP_CLASS, group.id)?;
    write_source_id(group.source_id.as_deref(), html)?;
    writeln!(html, ">")?;

    let mut declarations = String::new();
    write_group_declarations(group, &mut declarations)?;
    if !declarations.is_empty() {
        writeln!(rules, "#{} {{ {} }}", group.id, declarations)?;
    }

    for child in &group.children {
        write_element(child, depth + 1, dims, config, html, rules)?;
    }
    writeln!(html, "{}</div>", indent(depth))?;
    Ok(())
}

// --- Stylesheet ---

fn build_stylesheet(dims: &Dimensions, element_rules: &str) -> Result<String> {
    let mut css = String::new();
    let page = format!(".{}", PAGE_CLASS);

    writeln!(css, "{} {{", page)?;
    writeln!(css, "  position: relative;")?;
    writeln!(css, "  width: 100%;")?;
    writeln!(
        css,
        "  aspect-ratio: {} / {};",
        dims.view_box_width, dims.view_box_height
    )?;
    writeln!(css, "  overflow: hidden;")?;
    writeln!(css, "  box-sizing: border-box;")?;
    writeln!(css, "}}")?;

    writeln!(
        css,
        "{0} .{1}, {0} .{2} {{ position: absolute; inset: 0; }}",
        page, BACKGROUND_CLASS, OVERLAY_CLASS
    )?;
    writeln!(
        css,
        "{} .{} > svg {{ display: block; width: 100%; height: 100%; }}",
        page, BACKGROUND_CLASS
    )?;
    writeln!(
        css,
        "{} .{} {{ position: absolute; margin: 0; white-space: pre; line-height: 1; }}",
        page, TEXT_CLASS
    )?;
    writeln!(css, "{} .{} {{ position: absolute; }}", page, SHAPE_CLASS)?;
    writeln!(
        css,
        "{0} .{1} > svg, {0} .{1} > img {{ display: block; width: 100%; height: 100%; overflow: visible; }}",
        page, SHAPE_CLASS
    )?;
    writeln!(
        css,
        "{} .{} {{ position: absolute; inset: 0; pointer-events: none; }}",
        page, GROUP_CLASS
    )?;
    writeln!(
        css,
        "{0} .{1} > * {{ pointer-events: auto; }}",
        page, GROUP_CLASS
    )?;

    css.push_str(element_rules);

    writeln!(css, "@media print {{")?;
    writeln!(css, "  {} {{", page)?;
    writeln!(css, "    width: {};", PRINT_PAGE_WIDTH)?;
    writeln!(css, "    height: {};", PRINT_PAGE_HEIGHT)?;
    writeln!(css, "    aspect-ratio: auto;")?;
    writeln!(css, "    page-break-after: always;")?;
    writeln!(css, "  }}")?;
    writeln!(css, "}}")?;

    Ok(css)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::html::extract::extract_elements;

    fn assemble(markup: &str, dims: Dimensions, mode: LayoutMode) -> AssembledPage {
        let config = ConverterConfig::default();
        let elements = extract_elements(markup, &config);
        assemble_page(&elements, markup, &dims, mode, "text", &config).unwrap()
    }

    #[test]
    fn test_overlay_lifts_text_out_of_background() {
        let markup = r##"<svg viewBox="0 0 200 100"><rect width="200" height="100" fill="#eee"/><text x="100" y="50" text-anchor="middle">{{name}}</text></svg>"##;
        let page = assemble(markup, Dimensions::uniform(200.0, 100.0), LayoutMode::Overlay);

        assert!(page.html.contains(r#"<div class="svg-template-background" aria-hidden="true">"#));
        assert!(page.html.contains(r##"<svg viewBox="0 0 200 100"><rect width="200" height="100" fill="#eee"/></svg>"##));
        assert!(page.html.contains(
            r#"<div class="text-element" id="text-0" data-placeholder="name">{{name}}</div>"#
        ));
        assert!(page.css.contains("#text-0 { left: 50.00%; top: 50.00%;"));
        assert!(page.css.contains("text-align: center;"));
        assert!(page.css.contains("aspect-ratio: 200 / 100;"));
    }

    #[test]
    fn test_decomposed_boxes_every_element() {
        let markup = r#"<svg viewBox="0 0 200 200"><g id="badge" opacity="0.5"><circle cx="50" cy="50" r="10" fill="red"/></g><image x="0" y="0" width="20" height="20" href="{{logo}}"/></svg>"#;
        let page = assemble(markup, Dimensions::uniform(200.0, 200.0), LayoutMode::Decomposed);

        assert!(page.html.contains(r#"<div class="group-element" id="group-0" data-svg-id="badge">"#));
        assert!(page.html.contains(r#"<div class="shape-element" id="shape-0" data-shape="circle">"#));
        assert!(page.html.contains(r#"viewBox="40 40 20 20""#));
        assert!(page.html.contains(r#"<circle cx="50" cy="50" r="10" fill="red"/>"#));
        assert!(page.html.contains(
            r#"data-shape="image" data-placeholder="logo"><img src="{{logo}}" alt="" draggable="false"></div>"#
        ));
        assert!(page.css.contains("#shape-0 { left: 20.00%; top: 20.00%; width: 10.00%; height: 10.00%; }"));
        assert!(page.css.contains("#group-0 { opacity: 0.5; }"));
    }

    #[test]
    fn test_group_offset_is_reapplied_inside_inline_svg() {
        let markup = r#"<svg viewBox="0 0 100 100"><g transform="translate(10 20)"><rect width="5" height="5"/></g></svg>"#;
        let page = assemble(markup, Dimensions::uniform(100.0, 100.0), LayoutMode::Decomposed);
        assert!(page.html.contains(r#"viewBox="10 20 5 5""#));
        assert!(page.html.contains(r#"<g transform="translate(10 20)"><rect width="5" height="5"/></g>"#));
    }

    #[test]
    fn test_text_content_is_escaped() {
        let markup = r#"<svg viewBox="0 0 10 10"><text x="1" y="1">a &lt;b&gt; &amp; c</text></svg>"#;
        let page = assemble(markup, Dimensions::uniform(10.0, 10.0), LayoutMode::Overlay);
        assert!(page.html.contains(">a &lt;b&gt; &amp; c</div>"));
    }

    #[test]
    fn test_print_rule_and_base_styles() {
        let page = assemble("<svg/>", Dimensions::uniform(612.0, 792.0), LayoutMode::Overlay);
        assert!(page.css.contains("@media print {"));
        assert!(page.css.contains("width: 8.5in;"));
        assert!(page.css.contains("height: 11in;"));
        assert!(page.css.contains("page-break-after: always;"));
        assert!(page.css.contains("aspect-ratio: 612 / 792;"));
    }

    #[test]
    fn test_page_type_is_escaped() {
        let config = ConverterConfig::default();
        let page = assemble_page(
            &[],
            "",
            &Dimensions::uniform(1.0, 1.0),
            LayoutMode::Overlay,
            r#"x" onclick="y"#,
            &config,
        )
        .unwrap();
        assert!(page.html.contains(r#"data-page-type="x&quot; onclick=&quot;y""#));
    }
}
