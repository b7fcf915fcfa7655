//! CSV report exports: RFC 4180 quoting, header row, `\n` line endings,
//! amounts with two decimals and ISO dates so spreadsheets parse them.

use std::collections::HashMap;

use uuid::Uuid;

use odonto_core::models::Record;
use odonto_core::models::appointment::Appointment;
use odonto_core::models::installment::Installment;
use odonto_core::reports::ProcedureCount;

/// Which report a `/reports/export/{kind}.csv` request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Revenue,
    Appointments,
    Procedures,
}

impl ExportKind {
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "revenue" => Some(ExportKind::Revenue),
            "appointments" => Some(ExportKind::Appointments),
            "procedures" => Some(ExportKind::Procedures),
            _ => None,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ExportKind::Revenue => "revenue",
            ExportKind::Appointments => "appointments",
            ExportKind::Procedures => "procedures",
        }
    }
}

/// Quote a field when it contains the delimiter, a quote or a line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn amount(value: f64) -> String {
    format!("{value:.2}")
}

/// Accumulates rows into a CSV document.
pub struct CsvWriter {
    out: String,
    columns: usize,
}

impl CsvWriter {
    pub fn new(headers: &[&str]) -> Self {
        let mut writer = Self {
            out: String::new(),
            columns: headers.len(),
        };
        writer.push_line(headers.iter().copied());
        writer
    }

    /// Append a row. Rows are padded or truncated to the header width.
    pub fn row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields: Vec<String> = fields
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect();
        fields.resize(self.columns, String::new());
        self.push_line(fields.iter().map(String::as_str));
    }

    fn push_line<'a>(&mut self, fields: impl Iterator<Item = &'a str>) {
        let line: Vec<String> = fields.map(escape_field).collect();
        self.out.push_str(&line.join(","));
        self.out.push('\n');
    }

    pub fn finish(self) -> String {
        self.out
    }
}

fn name_of(names: &HashMap<Uuid, String>, id: Option<Uuid>) -> &str {
    id.and_then(|id| names.get(&id))
        .map(String::as_str)
        .unwrap_or("")
}

/// One line per paid installment, in payment order.
pub fn revenue_csv(paid: &[&Record<Installment>], patients: &HashMap<Uuid, String>) -> String {
    let mut rows: Vec<_> = paid.to_vec();
    rows.sort_by_key(|i| (i.data.paid_date, i.data.number));

    let mut csv = CsvWriter::new(&[
        "data_pagamento",
        "paciente",
        "parcela",
        "vencimento",
        "forma_pagamento",
        "valor",
    ]);
    for r in rows {
        let i = &r.data;
        csv.row([
            i.paid_date.map(|d| d.to_string()).unwrap_or_default(),
            name_of(patients, Some(i.patient_id)).to_string(),
            i.number.to_string(),
            i.due_date.to_string(),
            i.method.map(|m| m.label()).unwrap_or("").to_string(),
            amount(i.amount),
        ]);
    }
    csv.finish()
}

pub fn appointments_csv(
    appointments: &[Record<Appointment>],
    patients: &HashMap<Uuid, String>,
    dentists: &HashMap<Uuid, String>,
) -> String {
    let mut csv = CsvWriter::new(&[
        "data",
        "inicio",
        "fim",
        "paciente",
        "dentista",
        "procedimento",
        "status",
    ]);
    for r in appointments {
        let a = &r.data;
        let end = a
            .ends_at()
            .map(|t| t.time().strftime("%H:%M").to_string())
            .unwrap_or_default();
        csv.row([
            a.date().to_string(),
            a.starts_at.time().strftime("%H:%M").to_string(),
            end,
            name_of(patients, Some(a.patient_id)).to_string(),
            name_of(dentists, a.dentist_id).to_string(),
            a.procedure.clone().unwrap_or_default(),
            a.status.label().to_string(),
        ]);
    }
    csv.finish()
}

pub fn procedure_counts_csv(counts: &[ProcedureCount]) -> String {
    let mut csv = CsvWriter::new(&["procedimento", "quantidade"]);
    for c in counts {
        csv.row([c.procedure.clone(), c.count.to_string()]);
    }
    csv.finish()
}
