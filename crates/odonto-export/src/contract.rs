//! Treatment and payment contract.
//!
//! Every figure comes from the persisted plan and its installments. Nothing
//! here re-runs the calculator, so a printed contract always matches what
//! the patient agreed to.

use jiff::civil::Date;
use serde::Serialize;

use odonto_core::models::budget::Budget;
use odonto_core::models::installment::Installment;
use odonto_core::models::patient::Patient;
use odonto_core::models::payment_plan::PaymentPlan;
use odonto_core::models::settings::ClinicSettings;
use odonto_core::money::{format_brl, format_rate};
use odonto_core::validation::format_cpf;

use crate::docx::generate_docx;
use crate::error::ExportError;
use crate::render::{Template, render};
use crate::styles::DocumentStyles;

/// Labels of the copies printed one after the other.
pub const COPIES: [&str; 2] = ["Via da clínica", "Via do paciente"];

pub fn br_date(date: Date) -> String {
    date.strftime("%d/%m/%Y").to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct ClinicHeader {
    pub name: String,
    pub document: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl From<&ClinicSettings> for ClinicHeader {
    fn from(settings: &ClinicSettings) -> Self {
        Self {
            name: settings.clinic_name.clone(),
            document: settings.document.clone(),
            address: settings.address.clone(),
            city: settings.city.clone(),
            phone: settings.phone.clone(),
            email: settings.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PartyBlock {
    pub name: String,
    pub cpf: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    /// Signs in the patient's place when set.
    pub guardian_name: Option<String>,
    pub guardian_cpf: Option<String>,
}

impl From<&Patient> for PartyBlock {
    fn from(patient: &Patient) -> Self {
        let address = [
            patient.address.as_deref(),
            patient.city.as_deref(),
            patient.state.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

        Self {
            name: patient.name.clone(),
            cpf: patient.cpf.as_deref().map(format_cpf),
            address: (!address.is_empty()).then_some(address),
            phone: patient.phone.clone(),
            guardian_name: patient.guardian_name.clone(),
            guardian_cpf: patient.guardian_cpf.as_deref().map(format_cpf),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemLine {
    pub description: String,
    pub location: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

/// Itemized budget lines with pre-formatted money.
pub fn item_lines(budget: &Budget) -> Vec<ItemLine> {
    budget
        .items
        .iter()
        .map(|item| ItemLine {
            description: item.description.clone(),
            location: item.location(),
            quantity: item.quantity,
            unit_price: format_brl(item.unit_price),
            line_total: format_brl(item.line_total()),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleLine {
    pub number: u32,
    pub due_date: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanTerms {
    pub total: String,
    pub down_payment: Option<String>,
    pub installments: u32,
    pub installment_amount: String,
    pub method: String,
    /// Only for plans with interest.
    pub monthly_rate: Option<String>,
    pub interest_amount: Option<String>,
    pub total_payable: String,
    pub first_due_date: String,
}

impl From<&PaymentPlan> for PlanTerms {
    fn from(plan: &PaymentPlan) -> Self {
        let with_interest = plan.monthly_rate > 0.0;
        Self {
            total: format_brl(plan.total),
            down_payment: (plan.down_payment > 0.0).then(|| format_brl(plan.down_payment)),
            installments: plan.installments,
            installment_amount: format_brl(plan.installment_amount),
            method: plan.method.label().to_string(),
            monthly_rate: with_interest.then(|| format_rate(plan.monthly_rate)),
            interest_amount: with_interest.then(|| format_brl(plan.interest_amount)),
            total_payable: format_brl(plan.total_payable),
            first_due_date: br_date(plan.first_due_date),
        }
    }
}

/// Everything the contract templates need, already formatted for print.
#[derive(Debug, Clone, Serialize)]
pub struct ContractData {
    pub clinic: ClinicHeader,
    pub patient: PartyBlock,
    pub items: Vec<ItemLine>,
    pub subtotal: Option<String>,
    pub discount: Option<String>,
    pub terms: PlanTerms,
    pub schedule: Vec<ScheduleLine>,
    pub clauses: Vec<String>,
    pub issued_on: String,
    pub copies: Vec<String>,
}

impl ContractData {
    pub fn build(
        settings: &ClinicSettings,
        patient: &Patient,
        budget: Option<&Budget>,
        plan: &PaymentPlan,
        installments: &[Installment],
        issued_on: Date,
    ) -> Self {
        let mut rows: Vec<&Installment> = installments.iter().collect();
        rows.sort_by_key(|i| i.number);

        Self {
            clinic: ClinicHeader::from(settings),
            patient: PartyBlock::from(patient),
            items: budget.map(item_lines).unwrap_or_default(),
            subtotal: budget.map(|b| format_brl(b.subtotal())),
            discount: budget
                .filter(|b| b.discount > 0.0)
                .map(|b| format_brl(b.discount)),
            terms: PlanTerms::from(plan),
            schedule: rows
                .into_iter()
                .map(|i| ScheduleLine {
                    number: i.number,
                    due_date: br_date(i.due_date),
                    amount: format_brl(i.amount),
                })
                .collect(),
            clauses: settings.contract_clauses.clone(),
            issued_on: br_date(issued_on),
            copies: COPIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Printable HTML with one copy per entry in [`COPIES`], page break between.
pub fn render_contract_html(data: &ContractData) -> Result<String, ExportError> {
    render(Template::ContractHtml, data)
}

/// The same copies as DOCX, for clinics that edit the contract before printing.
pub fn render_contract_docx(
    data: &ContractData,
    styles: &DocumentStyles,
) -> Result<Vec<u8>, ExportError> {
    let markdown = render(Template::ContractMarkdown, data)?;
    generate_docx(&markdown, styles)
}
