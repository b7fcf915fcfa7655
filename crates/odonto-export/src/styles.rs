use serde::{Deserialize, Serialize};

/// Fonts and sizes for DOCX output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStyles {
    pub body_font: String,
    pub heading_font: String,
    /// Points.
    pub body_size: usize,
    /// Document title (`# `), points.
    pub title_size: usize,
    /// Section headings (`## `), points.
    pub section_size: usize,
}

impl Default for DocumentStyles {
    fn default() -> Self {
        Self {
            body_font: "Calibri".to_string(),
            heading_font: "Calibri".to_string(),
            body_size: 11,
            title_size: 16,
            section_size: 13,
        }
    }
}
