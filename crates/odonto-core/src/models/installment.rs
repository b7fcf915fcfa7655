use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::Document;
use crate::installments::{PaymentMethod, ScheduledInstallment};
use crate::money::round_cents;
use crate::s3_keys::Collection;
use crate::validation::{self, ValidationError, blank_to_none};

/// Parcela: one scheduled payment of a plan.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Installment {
    pub plan_id: Uuid,
    pub patient_id: Uuid,
    /// 1-based position within the plan.
    pub number: u32,
    pub amount: f64,
    pub due_date: Date,
    pub paid_date: Option<Date>,
    #[serde(default)]
    pub status: InstallmentStatus,
    pub method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum InstallmentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl InstallmentStatus {
    pub fn label(self) -> &'static str {
        match self {
            InstallmentStatus::Pending => "Pendente",
            InstallmentStatus::Paid => "Pago",
            InstallmentStatus::Overdue => "Atrasado",
            InstallmentStatus::Cancelled => "Cancelado",
        }
    }
}

impl Installment {
    pub fn scheduled(
        plan_id: Uuid,
        patient_id: Uuid,
        scheduled: &ScheduledInstallment,
        method: PaymentMethod,
    ) -> Self {
        Self {
            plan_id,
            patient_id,
            number: scheduled.number,
            amount: scheduled.amount,
            due_date: scheduled.due_date,
            paid_date: None,
            status: InstallmentStatus::Pending,
            method: Some(method),
            notes: None,
        }
    }

    /// Status as of `today`: an unpaid installment past its due date is
    /// overdue. Paid and cancelled are final.
    pub fn effective_status(&self, today: Date) -> InstallmentStatus {
        match self.status {
            InstallmentStatus::Pending | InstallmentStatus::Overdue if self.due_date < today => {
                InstallmentStatus::Overdue
            }
            InstallmentStatus::Overdue => InstallmentStatus::Pending,
            other => other,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            InstallmentStatus::Pending | InstallmentStatus::Overdue
        )
    }

    pub fn mark_paid(&mut self, paid_date: Date, method: Option<PaymentMethod>) {
        self.status = InstallmentStatus::Paid;
        self.paid_date = Some(paid_date);
        if method.is_some() {
            self.method = method;
        }
    }

    pub fn reopen(&mut self, today: Date) {
        self.paid_date = None;
        self.status = InstallmentStatus::Pending;
        self.status = self.effective_status(today);
    }

    pub fn cancel(&mut self) {
        self.status = InstallmentStatus::Cancelled;
    }
}

/// The part of an installment that can be edited directly. Amount, status and
/// the plan link follow the plan's quote and the pay, reopen and cancel
/// actions. Absent fields are left as they are; blank notes clear them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InstallmentEdit {
    pub due_date: Option<Date>,
    pub method: Option<PaymentMethod>,
    pub notes: Option<String>,
}

impl InstallmentEdit {
    pub fn apply(self, installment: &mut Installment) {
        if let Some(due_date) = self.due_date {
            installment.due_date = due_date;
        }
        if let Some(method) = self.method {
            installment.method = Some(method);
        }
        if let Some(notes) = self.notes {
            installment.notes = Some(notes);
        }
    }
}

impl Document for Installment {
    const COLLECTION: Collection = Collection::Installments;

    fn prepare(&mut self, _today: Date) -> Result<(), ValidationError> {
        if self.number == 0 {
            return Err(ValidationError::new("number", "Informe um valor maior que zero."));
        }
        validation::non_negative("amount", self.amount)?;
        self.amount = round_cents(self.amount);
        match (self.status, self.paid_date) {
            (InstallmentStatus::Paid, None) => {
                return Err(ValidationError::new("paid_date", "Informe a data de pagamento."));
            }
            (InstallmentStatus::Pending | InstallmentStatus::Overdue, Some(_)) => {
                self.paid_date = None;
            }
            _ => {}
        }
        self.notes = blank_to_none(self.notes.take());
        Ok(())
    }
}
