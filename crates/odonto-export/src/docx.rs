use std::io::Cursor;

use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Run, RunFonts, Style, StyleType};

use crate::error::ExportError;
use crate::styles::DocumentStyles;

/// Generate a DOCX document from rendered Markdown-ish template output.
///
/// Supported subset:
/// - `# Title` and `## Section` headings
/// - `- item` bullet lines
/// - `**bold**` inline runs
/// - `---` on its own line starts a new page
/// - anything else is a left-aligned paragraph; blank lines are dropped
pub fn generate_docx(rendered: &str, styles: &DocumentStyles) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new()
        .add_style(heading_style("Title", "title", styles.title_size, styles))
        .add_style(heading_style("Heading1", "heading 1", styles.section_size, styles));

    for line in rendered.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let paragraph = if let Some(text) = trimmed.strip_prefix("## ") {
            heading_paragraph(text, "Heading1")
        } else if let Some(text) = trimmed.strip_prefix("# ") {
            heading_paragraph(text, "Title").align(AlignmentType::Center)
        } else if let Some(text) = trimmed.strip_prefix("- ") {
            let mut para = Paragraph::new().add_run(plain_run("\u{2022} ", styles));
            for run in inline_runs(text, styles) {
                para = para.add_run(run);
            }
            para
        } else if trimmed == "---" {
            Paragraph::new().add_run(Run::new().add_break(BreakType::Page))
        } else {
            let mut para = Paragraph::new().align(AlignmentType::Left);
            for run in inline_runs(trimmed, styles) {
                para = para.add_run(run);
            }
            para
        };
        docx = docx.add_paragraph(paragraph);
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    Ok(buf.into_inner())
}

fn heading_style(style_id: &str, name: &str, size_pt: usize, styles: &DocumentStyles) -> Style {
    Style::new(style_id, StyleType::Paragraph)
        .name(name)
        .bold()
        .fonts(RunFonts::new().ascii(&styles.heading_font))
        .size(size_pt * 2) // OOXML uses half-points
}

fn heading_paragraph(text: &str, style_id: &str) -> Paragraph {
    Paragraph::new()
        .style(style_id)
        .add_run(Run::new().add_text(text))
}

fn plain_run(text: &str, styles: &DocumentStyles) -> Run {
    Run::new()
        .add_text(text)
        .size(styles.body_size * 2)
        .fonts(RunFonts::new().ascii(&styles.body_font))
}

/// Split `**bold**` segments into separate runs. An unclosed `**` is kept as
/// literal text.
fn inline_runs(text: &str, styles: &DocumentStyles) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let Some(len) = rest[open + 2..].find("**") else {
            break;
        };
        if open > 0 {
            runs.push(plain_run(&rest[..open], styles));
        }
        runs.push(plain_run(&rest[open + 2..open + 2 + len], styles).bold());
        rest = &rest[open + 2 + len + 2..];
    }

    if !rest.is_empty() {
        runs.push(plain_run(rest, styles));
    }
    runs
}
