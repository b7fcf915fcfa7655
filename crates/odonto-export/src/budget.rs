use jiff::civil::Date;
use serde::Serialize;

use odonto_core::models::budget::Budget;
use odonto_core::models::patient::Patient;
use odonto_core::models::settings::ClinicSettings;
use odonto_core::money::format_brl;

use crate::contract::{ClinicHeader, ItemLine, PartyBlock, br_date, item_lines};
use crate::error::ExportError;
use crate::render::{Template, render};

/// Printable budget (orçamento) handed to the patient before approval.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetPrint {
    pub clinic: ClinicHeader,
    pub patient: PartyBlock,
    pub dentist: Option<String>,
    pub items: Vec<ItemLine>,
    pub subtotal: String,
    pub discount: Option<String>,
    pub total: String,
    pub valid_until: Option<String>,
    pub notes: Option<String>,
    pub issued_on: String,
}

impl BudgetPrint {
    pub fn build(
        settings: &ClinicSettings,
        patient: &Patient,
        dentist: Option<&str>,
        budget: &Budget,
        issued_on: Date,
    ) -> Self {
        Self {
            clinic: ClinicHeader::from(settings),
            patient: PartyBlock::from(patient),
            dentist: dentist.map(str::to_string),
            items: item_lines(budget),
            subtotal: format_brl(budget.subtotal()),
            discount: (budget.discount > 0.0).then(|| format_brl(budget.discount)),
            total: format_brl(budget.total),
            valid_until: budget.valid_until.map(br_date),
            notes: budget.notes.clone(),
            issued_on: br_date(issued_on),
        }
    }
}

pub fn render_budget_html(data: &BudgetPrint) -> Result<String, ExportError> {
    render(Template::BudgetHtml, data)
}
