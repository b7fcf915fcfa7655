use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::Document;
use super::installment::Installment;
use crate::installments::{self, PaymentMethod, Quote, QuoteRequest};
use crate::s3_keys::Collection;
use crate::validation::{ValidationError, blank_to_none};

/// Plano de pagamento: a down payment plus a run of installments.
///
/// All money figures are the ones quoted when the plan was created (or last
/// edited) and are never recomputed from the rates afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentPlan {
    pub budget_id: Option<Uuid>,
    pub patient_id: Uuid,
    pub total: f64,
    pub down_payment: f64,
    pub installments: u32,
    pub installment_amount: f64,
    pub method: PaymentMethod,
    pub monthly_rate: f64,
    pub total_payable: f64,
    pub interest_amount: f64,
    pub first_due_date: Date,
    #[serde(default)]
    pub status: PlanStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PlanStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

/// What a client sends to create or edit a plan.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentPlanRequest {
    pub patient_id: Uuid,
    pub budget_id: Option<Uuid>,
    #[serde(flatten)]
    pub quote: QuoteRequest,
    pub first_due_date: Date,
    pub notes: Option<String>,
}

impl PaymentPlan {
    pub fn from_quote(request: &PaymentPlanRequest, quote: &Quote) -> Self {
        Self {
            budget_id: request.budget_id,
            patient_id: request.patient_id,
            total: quote.total,
            down_payment: quote.down_payment,
            installments: quote.installments,
            installment_amount: quote.installment_amount,
            method: quote.method,
            monthly_rate: quote.monthly_rate,
            total_payable: quote.total_payable,
            interest_amount: quote.interest_amount,
            first_due_date: request.first_due_date,
            status: PlanStatus::Active,
            notes: request.notes.clone(),
        }
    }

    /// The persisted quote, exactly as it was computed.
    pub fn quote(&self) -> Quote {
        Quote {
            total: self.total,
            down_payment: self.down_payment,
            financed: crate::money::round_cents(self.total - self.down_payment),
            installments: self.installments,
            method: self.method,
            monthly_rate: self.monthly_rate,
            installment_amount: self.installment_amount,
            total_payable: self.total_payable,
            interest_amount: self.interest_amount,
        }
    }

    /// Build the installment rows for this plan.
    pub fn installment_rows(&self, plan_id: Uuid) -> Result<Vec<Installment>, jiff::Error> {
        let rows = installments::schedule(&self.quote(), self.first_due_date)?
            .into_iter()
            .map(|s| Installment::scheduled(plan_id, self.patient_id, &s, self.method))
            .collect();
        Ok(rows)
    }
}

impl Document for PaymentPlan {
    const COLLECTION: Collection = Collection::PaymentPlans;

    fn prepare(&mut self, _today: Date) -> Result<(), ValidationError> {
        if self.patient_id.is_nil() {
            return Err(ValidationError::new("patient_id", "Selecione o paciente."));
        }
        if self.installments == 0 {
            return Err(ValidationError::new(
                "installments",
                "Informe um valor maior que zero.",
            ));
        }
        self.notes = blank_to_none(self.notes.take());
        Ok(())
    }
}
