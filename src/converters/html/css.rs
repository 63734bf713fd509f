//! Maps SVG user-space coordinates to percentage-based CSS declarations.

use super::error::Result;
use crate::models::{
    dimensions::Dimensions,
    elements::{Bounds, GroupElement, TextAnchor, TextElement},
};
use std::fmt::Write;

/// Rounds to `places` decimals and folds `-0` into `0`.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `value / total * 100`, rounded to 2 decimals. A non-positive total, or a
/// quotient that overflows (e.g. a denormal total), maps to 0.
pub fn percent(value: f64, total: f64) -> f64 {
    if total <= 0.0 || !value.is_finite() {
        return 0.0;
    }
    let share = value / total * 100.0;
    if !share.is_finite() {
        return 0.0;
    }
    round_to(share, 2)
}

/// Formats a percentage of `total`, e.g. `50.00%`.
pub fn format_percent(value: f64, total: f64) -> String {
    format!("{:.2}%", percent(value, total))
}

/// Formats a font size as a share of the viewBox width in `vw`, with 3 decimals,
/// so that text scales with a full-width container.
pub fn format_font_size_vw(font_size: f64, view_box_width: f64) -> String {
    let share = font_size / view_box_width * 100.0;
    let vw = if view_box_width <= 0.0 || !share.is_finite() {
        0.0
    } else {
        round_to(share, 3)
    };
    format!("{:.3}vw", vw)
}

/// Strips characters that could terminate a declaration or rule.
pub fn sanitize_css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, ';' | '{' | '}' | '<' | '>' | '\n' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Converts an SVG paint value into a CSS color for HTML text.
/// Paint servers (`url(...)`) have no HTML equivalent and fall back to `fallback`;
/// `none` becomes `transparent`.
pub fn css_color(fill: &str, fallback: &str) -> String {
    let value = fill.trim();
    if value.is_empty() || value.starts_with("url(") {
        sanitize_css_value(fallback)
    } else if value == "none" {
        "transparent".to_string()
    } else {
        sanitize_css_value(value)
    }
}

/// The transform that moves a text box so its anchor point sits at `left/top`.
///
/// SVG `y` is the baseline while CSS `top` is the box's top edge, so the box is
/// lifted by its own height. This approximates the baseline without font
/// metrics (descenders end up below the anchor).
fn anchor_transform(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "translateY(-100%)",
        TextAnchor::Middle => "translate(-50%, -100%)",
        TextAnchor::End => "translate(-100%, -100%)",
    }
}

/// Writes the declarations placing one text element.
///
/// # Arguments
/// * `text` - The extracted text element.
/// * `dims` - The document's coordinate space.
/// * `default_fill` - Color used when the text fill has no CSS equivalent.
/// * `out` - Buffer the declarations are appended to.
pub fn write_text_declarations(
    text: &TextElement,
    dims: &Dimensions,
    default_fill: &str,
    out: &mut String,
) -> Result<()> {
    write!(out, "left: {}; ", format_percent(text.x, dims.view_box_width))?;
    write!(out, "top: {}; ", format_percent(text.y, dims.view_box_height))?;
    write!(
        out,
        "font-size: {}; ",
        format_font_size_vw(text.font_size, dims.view_box_width)
    )?;
    write!(out, "font-family: {}; ", sanitize_css_value(&text.font_family))?;
    write!(out, "font-weight: {}; ", sanitize_css_value(&text.font_weight))?;
    write!(out, "color: {}; ", css_color(&text.fill, default_fill))?;
    write!(out, "text-align: {}; ", text.text_anchor.text_align())?;
    write!(out, "transform: {};", anchor_transform(text.text_anchor))?;
    Ok(())
}

/// Writes the `left/top/width/height` declarations of a box.
pub fn write_box_declarations(bounds: &Bounds, dims: &Dimensions, out: &mut String) -> Result<()> {
    write!(out, "left: {}; ", format_percent(bounds.x, dims.view_box_width))?;
    write!(out, "top: {}; ", format_percent(bounds.y, dims.view_box_height))?;
    write!(out, "width: {}; ", format_percent(bounds.width, dims.view_box_width))?;
    write!(out, "height: {};", format_percent(bounds.height, dims.view_box_height))?;
    Ok(())
}

/// Writes the declarations a group box carries. Groups cover the whole page so
/// children keep page-relative percentages; only opacity is carried over.
pub fn write_group_declarations(group: &GroupElement, out: &mut String) -> Result<()> {
    if let Some(opacity) = group
        .attributes
        .get("opacity")
        .and_then(|v| v.trim().parse::<f64>().ok())
    {
        write!(out, "opacity: {};", opacity.clamp(0.0, 1.0))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(x: f64, y: f64, anchor: TextAnchor) -> TextElement {
        TextElement {
            id: "text-0".to_string(),
            source_id: None,
            content: "x".to_string(),
            x,
            y,
            font_size: 16.0,
            font_family: "Inter, sans-serif".to_string(),
            font_weight: "700".to_string(),
            fill: "#112233".to_string(),
            text_anchor: anchor,
            placeholder_name: None,
        }
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(format_percent(100.0, 200.0), "50.00%");
        assert_eq!(format_percent(1.0, 3.0), "33.33%");
        assert_eq!(format_percent(2.0, 3.0), "66.67%");
        assert_eq!(format_percent(-0.0001, 3.0), "0.00%");
        assert_eq!(format_percent(5.0, 0.0), "0.00%");
    }

    #[test]
    fn test_denormal_total_does_not_overflow() {
        assert_eq!(percent(1.0, 1e-320), 0.0);
        assert_eq!(format_percent(1.0, 1e-320), "0.00%");
        assert_eq!(format_font_size_vw(16.0, 1e-320), "0.000vw");
    }

    #[test]
    fn test_percent_stays_in_range_inside_view_box() {
        for total in [1.0, 7.0, 595.0, 612.0, 842.0] {
            for step in 0..=20 {
                let value = total * step as f64 / 20.0;
                let p = percent(value, total);
                assert!((0.0..=100.0).contains(&p), "{} of {} gave {}", value, total, p);
            }
        }
    }

    #[test]
    fn test_font_size_in_vw() {
        assert_eq!(format_font_size_vw(16.0, 200.0), "8.000vw");
        assert_eq!(format_font_size_vw(12.0, 612.0), "1.961vw");
    }

    #[test]
    fn test_text_declarations() {
        let dims = Dimensions::uniform(200.0, 100.0);
        let mut out = String::new();
        write_text_declarations(&text(100.0, 50.0, TextAnchor::Middle), &dims, "#000000", &mut out)
            .unwrap();
        assert_eq!(
            out,
            "left: 50.00%; top: 50.00%; font-size: 8.000vw; font-family: Inter, sans-serif; \
             font-weight: 700; color: #112233; text-align: center; transform: translate(-50%, -100%);"
        );

        let mut out = String::new();
        write_text_declarations(&text(0.0, 10.0, TextAnchor::Start), &dims, "#000000", &mut out)
            .unwrap();
        assert!(out.contains("text-align: left;"));
        assert!(out.ends_with("transform: translateY(-100%);"));
    }

    #[test]
    fn test_box_declarations_for_circle_bounds() {
        let dims = Dimensions::uniform(200.0, 200.0);
        let mut out = String::new();
        let bounds = Bounds { x: 40.0, y: 40.0, width: 20.0, height: 20.0 };
        write_box_declarations(&bounds, &dims, &mut out).unwrap();
        assert_eq!(out, "left: 20.00%; top: 20.00%; width: 10.00%; height: 10.00%;");
    }

    #[test]
    fn test_css_color() {
        assert_eq!(css_color("url(#grad)", "#000000"), "#000000");
        assert_eq!(css_color("none", "#000000"), "transparent");
        assert_eq!(css_color("red;}body{", "#000000"), "redbody");
    }
}
