use super::error::DiffError;
use crate::models::result::ConversionResult;
use indexmap::IndexSet;
use similar::{ChangeTag, TextDiff};
use std::fmt::Write;

/// Holds the results of a template revision comparison, formatted as a Markdown report.
#[derive(Debug)]
pub struct TemplateDiffReport {
    pub markdown_report: String,
    pub has_differences: bool,
    /// Placeholders present only in the changed revision, in its order.
    pub added_placeholders: Vec<String>,
    /// Placeholders present only in the base revision, in its order.
    pub removed_placeholders: Vec<String>,
}

/// Splits two placeholder lists into (added, removed).
pub fn placeholder_changes(base: &[String], changed: &[String]) -> (Vec<String>, Vec<String>) {
    let base_set: IndexSet<&String> = base.iter().collect();
    let changed_set: IndexSet<&String> = changed.iter().collect();
    let added = changed
        .iter()
        .filter(|p| !base_set.contains(p))
        .cloned()
        .collect();
    let removed = base
        .iter()
        .filter(|p| !changed_set.contains(p))
        .cloned()
        .collect();
    (added, removed)
}

/// Writes one `### title` section holding a line diff of `base` and `changed`.
fn write_text_section(
    out: &mut String,
    title: &str,
    base: &str,
    changed: &str,
    base_file: &str,
    changed_file: &str,
) -> Result<(), DiffError> {
    writeln!(out, "### {}\n", title)?;
    if base == changed {
        writeln!(out, "> No changes.\n")?;
        return Ok(());
    }

    let diff = TextDiff::from_lines(base, changed);
    let (mut added_lines, mut removed_lines) = (0, 0);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added_lines += 1,
            ChangeTag::Delete => removed_lines += 1,
            ChangeTag::Equal => (),
        }
    }
    writeln!(out, "> - Lines Added: {}", added_lines)?;
    writeln!(out, "> - Lines Removed: {}\n", removed_lines)?;

    let mut hunks = String::new();
    write!(
        hunks,
        "{}",
        diff.unified_diff()
            .header(base_file, changed_file)
            .context_radius(3)
    )?;
    writeln!(out, "```diff")?;
    out.push_str(&hunks);
    if !hunks.ends_with('\n') {
        out.push('\n');
    }
    writeln!(out, "```\n")?;
    Ok(())
}

/// Compares two conversions of a template and generates a Markdown report.
///
/// # Arguments
/// * `base` - The earlier conversion.
/// * `changed` - The later conversion.
/// * `base_label` - Name of the base revision in headers, e.g. a file name.
/// * `changed_label` - Name of the changed revision.
///
/// # Returns
/// A `TemplateDiffReport`; differences in HTML, CSS or placeholders set `has_differences`.
pub fn compare_results(
    base: &ConversionResult,
    changed: &ConversionResult,
    base_label: &str,
    changed_label: &str,
) -> Result<TemplateDiffReport, DiffError> {
    let (added_placeholders, removed_placeholders) =
        placeholder_changes(&base.placeholders, &changed.placeholders);
    let has_differences = base.html != changed.html
        || base.css != changed.css
        || base.placeholders != changed.placeholders;

    let mut report = String::new();
    writeln!(report, "# Summary of Template Changes\n")?;
    writeln!(report, "---")?;
    writeln!(report, "## Comparison: `{}` vs `{}`\n", base_label, changed_label)?;

    if !has_differences {
        writeln!(report, "> No differences found between template revisions.")?;
        writeln!(report, "\n---")?;
        return Ok(TemplateDiffReport {
            markdown_report: report,
            has_differences,
            added_placeholders,
            removed_placeholders,
        });
    }

    writeln!(report, "> Template revisions differ.")?;
    writeln!(
        report,
        "> - Text Elements: {} -> {}",
        base.text_elements, changed.text_elements
    )?;
    writeln!(
        report,
        "> - Icon Elements: {} -> {}\n",
        base.icon_elements, changed.icon_elements
    )?;

    writeln!(report, "### Placeholders\n")?;
    if added_placeholders.is_empty() && removed_placeholders.is_empty() {
        if base.placeholders == changed.placeholders {
            writeln!(report, "> No placeholder changes.\n")?;
        } else {
            writeln!(report, "> Placeholders reordered.\n")?;
        }
    } else {
        for name in &added_placeholders {
            writeln!(report, "> - Added: `{}`", name)?;
        }
        for name in &removed_placeholders {
            writeln!(report, "> - Removed: `{}`", name)?;
        }
        writeln!(report)?;
    }

    write_text_section(
        &mut report,
        "HTML",
        &base.html,
        &changed.html,
        &format!("a/{}.html", base_label),
        &format!("b/{}.html", changed_label),
    )?;
    write_text_section(
        &mut report,
        "CSS",
        &base.css,
        &changed.css,
        &format!("a/{}.css", base_label),
        &format!("b/{}.css", changed_label),
    )?;

    writeln!(report, "---")?;

    Ok(TemplateDiffReport {
        markdown_report: report,
        has_differences,
        added_placeholders,
        removed_placeholders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::html::{convert_svg_to_template, ConvertOptions, ConverterConfig};

    fn convert(svg: &str) -> ConversionResult {
        convert_svg_to_template(svg, &ConvertOptions::default(), &ConverterConfig::default())
            .unwrap()
    }

    const BASE_SVG: &str = r#"<svg viewBox="0 0 200 100"><text x="10" y="20">{{title}}</text><text x="10" y="40">{{subtitle}}</text></svg>"#;

    #[test]
    fn test_identical_results_have_no_differences() {
        let base = convert(BASE_SVG);
        let report = compare_results(&base, &base.clone(), "v1", "v2").unwrap();
        assert!(!report.has_differences);
        assert!(report.added_placeholders.is_empty());
        assert!(report.removed_placeholders.is_empty());
        assert!(report.markdown_report.contains("# Summary of Template Changes"));
        assert!(report.markdown_report.contains("## Comparison: `v1` vs `v2`"));
        assert!(report
            .markdown_report
            .contains("> No differences found between template revisions."));
        assert!(report.markdown_report.ends_with("---\n"));
    }

    #[test]
    fn test_added_and_removed_placeholders() {
        let base = convert(BASE_SVG);
        let changed = convert(
            r#"<svg viewBox="0 0 200 100"><text x="10" y="20">{{title}}</text><text x="10" y="60">{{date}}</text></svg>"#,
        );
        let report = compare_results(&base, &changed, "v1", "v2").unwrap();

        assert!(report.has_differences);
        assert_eq!(report.added_placeholders, vec!["date"]);
        assert_eq!(report.removed_placeholders, vec!["subtitle"]);

        let md = &report.markdown_report;
        assert!(md.contains("> Template revisions differ."));
        assert!(md.contains("> - Added: `date`"));
        assert!(md.contains("> - Removed: `subtitle`"));
        assert!(md.contains("```diff"));
        assert!(md.contains("--- a/v1.html"));
        assert!(md.contains("+++ b/v2.html"));
        assert!(md.contains(
            r#"-    <div class="text-element" id="text-1" data-placeholder="subtitle">{{subtitle}}</div>"#
        ));
        assert!(md.contains(
            r#"+    <div class="text-element" id="text-1" data-placeholder="date">{{date}}</div>"#
        ));
        assert!(md.contains("--- a/v1.css"));
        assert!(md.ends_with("---\n"));
    }

    #[test]
    fn test_style_only_change() {
        let base = convert(BASE_SVG);
        let changed = convert(&BASE_SVG.replace(r#"y="40""#, r#"y="50""#));
        let report = compare_results(&base, &changed, "a", "b").unwrap();
        assert!(report.has_differences);
        let md = &report.markdown_report;
        assert!(md.contains("> No placeholder changes."));
        assert!(md.contains("### HTML\n\n> No changes."));
        assert!(md.contains("> - Lines Added: 1"));
        assert!(md.contains("> - Lines Removed: 1"));
        assert!(md.contains("top: 50.00%"));
    }

    #[test]
    fn test_placeholder_changes_keep_order() {
        let base: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let changed: Vec<String> = ["c", "d", "a", "e"].iter().map(|s| s.to_string()).collect();
        let (added, removed) = placeholder_changes(&base, &changed);
        assert_eq!(added, vec!["d", "e"]);
        assert_eq!(removed, vec!["b"]);
    }
}
