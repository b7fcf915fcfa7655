use std::collections::BTreeSet;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::Document;
use crate::money::{round_cents, sum_cents};
use crate::odontogram::{Face, Tooth, ToothSelection};
use crate::s3_keys::Collection;
use crate::validation::{self, ValidationError, blank_to_none};

/// Orçamento: an itemized treatment quote for a patient.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Budget {
    pub patient_id: Uuid,
    pub dentist_id: Option<Uuid>,
    pub items: Vec<BudgetItem>,
    #[serde(default)]
    pub discount: f64,
    /// Sum of line totals minus the discount. Recomputed on every write;
    /// whatever the client sent is ignored.
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub status: BudgetStatus,
    pub valid_until: Option<Date>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BudgetItem {
    pub procedure_id: Option<Uuid>,
    pub description: String,
    pub tooth: Option<Tooth>,
    #[serde(default)]
    pub faces: BTreeSet<Face>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub unit_price: f64,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BudgetStatus {
    #[default]
    Draft,
    Sent,
    Approved,
    Rejected,
}

impl BudgetItem {
    /// One line per selected tooth on the chart, all for the same procedure.
    pub fn from_selections(
        procedure_id: Option<Uuid>,
        description: &str,
        unit_price: f64,
        selections: &[ToothSelection],
    ) -> Vec<BudgetItem> {
        selections
            .iter()
            .map(|s| BudgetItem {
                procedure_id,
                description: description.to_string(),
                tooth: Some(s.tooth),
                faces: s.faces.clone(),
                quantity: 1,
                unit_price,
            })
            .collect()
    }

    pub fn line_total(&self) -> f64 {
        round_cents(self.unit_price * f64::from(self.quantity))
    }

    /// Tooth and faces as shown on printouts, e.g. `16 (M, O)`.
    pub fn location(&self) -> Option<String> {
        self.tooth.map(|tooth| {
            ToothSelection {
                tooth,
                faces: self.faces.clone(),
            }
            .describe()
        })
    }
}

impl Budget {
    pub fn subtotal(&self) -> f64 {
        sum_cents(self.items.iter().map(BudgetItem::line_total))
    }

    pub fn compute_total(&self) -> f64 {
        round_cents(self.subtotal() - self.discount)
    }
}

impl Document for Budget {
    const COLLECTION: Collection = Collection::Budgets;

    fn prepare(&mut self, _today: Date) -> Result<(), ValidationError> {
        if self.patient_id.is_nil() {
            return Err(ValidationError::new("patient_id", "Selecione o paciente."));
        }
        if self.items.is_empty() {
            return Err(ValidationError::new(
                "items",
                "Adicione ao menos um procedimento.",
            ));
        }
        for item in &mut self.items {
            item.description = item.description.trim().to_string();
            validation::required("items.description", &item.description)?;
            validation::non_negative("items.unit_price", item.unit_price)?;
            item.unit_price = round_cents(item.unit_price);
            if item.quantity == 0 {
                return Err(ValidationError::new(
                    "items.quantity",
                    "Informe um valor maior que zero.",
                ));
            }
            if item.tooth.is_none() && !item.faces.is_empty() {
                return Err(ValidationError::new(
                    "items.faces",
                    "Selecione o dente antes das faces.",
                ));
            }
        }

        validation::non_negative("discount", self.discount)?;
        self.discount = round_cents(self.discount);
        if self.discount > self.subtotal() {
            return Err(ValidationError::new(
                "discount",
                "Desconto maior que o valor do orçamento.",
            ));
        }

        self.total = self.compute_total();
        self.notes = blank_to_none(self.notes.take());
        Ok(())
    }
}
