use serde::Serialize;
use tera::{Context, Tera};

use crate::error::ExportError;

/// Templates compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    ContractHtml,
    ContractMarkdown,
    BudgetHtml,
}

impl Template {
    /// Tera autoescapes names ending in `.html`, so HTML templates are
    /// escaped and the Markdown one (fed to the DOCX writer) is not.
    pub fn name(self) -> &'static str {
        match self {
            Template::ContractHtml => "contract.html",
            Template::ContractMarkdown => "contract.md",
            Template::BudgetHtml => "budget.html",
        }
    }

    fn source(self) -> &'static str {
        match self {
            Template::ContractHtml => include_str!("../templates/contract.html.tera"),
            Template::ContractMarkdown => include_str!("../templates/contract.md.tera"),
            Template::BudgetHtml => include_str!("../templates/budget.html.tera"),
        }
    }
}

/// Render a template with any serializable value as the context.
///
/// The `template_content` is the raw template string (Jinja2 syntax).
/// The value's top-level fields become the template variables.
pub fn render_template<T: Serialize>(
    template_name: &str,
    template_content: &str,
    data: &T,
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(template_name, template_content)
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let value = serde_json::to_value(data)?;
    let context =
        Context::from_value(value).map_err(|e| ExportError::TemplateRender(e.to_string()))?;

    let rendered = tera.render(template_name, &context)?;
    Ok(rendered)
}

pub fn render<T: Serialize>(template: Template, data: &T) -> Result<String, ExportError> {
    render_template(template.name(), template.source(), data)
}
