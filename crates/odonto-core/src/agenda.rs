//! Agenda queries: date-range filtering of appointments and the per-day view
//! that overlays schedule blocks.

use jiff::ToSpan;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Record;
use crate::models::appointment::{Appointment, AppointmentStatus};
use crate::models::schedule_block::ScheduleBlock;
use crate::validation::ValidationError;

/// Longest range the day view will expand.
pub const MAX_DAYS: usize = 62;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgendaFilter {
    /// Inclusive.
    pub from: Option<Date>,
    /// Inclusive.
    pub to: Option<Date>,
    pub dentist_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}

impl AgendaFilter {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        let date = appointment.date();
        self.from.is_none_or(|from| date >= from)
            && self.to.is_none_or(|to| date <= to)
            && self
                .dentist_id
                .is_none_or(|d| appointment.dentist_id == Some(d))
            && self.patient_id.is_none_or(|p| appointment.patient_id == p)
            && self.status.is_none_or(|s| appointment.status == s)
    }
}

/// Matching appointments, earliest first.
pub fn filter_appointments(
    appointments: Vec<Record<Appointment>>,
    filter: &AgendaFilter,
) -> Vec<Record<Appointment>> {
    let mut matching: Vec<_> = appointments
        .into_iter()
        .filter(|a| filter.matches(&a.data))
        .collect();
    matching.sort_by_key(|a| a.data.starts_at);
    matching
}

/// Blocks that close `dentist`'s agenda on `date`.
pub fn blocks_on<'a>(
    blocks: &'a [Record<ScheduleBlock>],
    dentist: Option<Uuid>,
    date: Date,
) -> Vec<&'a Record<ScheduleBlock>> {
    blocks
        .iter()
        .filter(|b| b.data.blocks(dentist, date))
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaDay {
    pub date: Date,
    pub appointments: Vec<Record<Appointment>>,
    pub blocks: Vec<Record<ScheduleBlock>>,
}

impl AgendaDay {
    pub fn is_blocked(&self) -> bool {
        !self.blocks.is_empty()
    }
}

/// Expand `from..=to` into days, each carrying its appointments (filtered by
/// dentist when given) and the blocks covering it.
pub fn days(
    from: Date,
    to: Date,
    dentist: Option<Uuid>,
    appointments: Vec<Record<Appointment>>,
    blocks: &[Record<ScheduleBlock>],
) -> Result<Vec<AgendaDay>, ValidationError> {
    if to < from {
        return Err(ValidationError::new("to", "Data final anterior à data inicial."));
    }
    let dates: Vec<Date> = from
        .series(1.day())
        .take_while(|d| *d <= to)
        .take(MAX_DAYS + 1)
        .collect();
    if dates.len() > MAX_DAYS {
        return Err(ValidationError::new(
            "to",
            format!("Período máximo de {MAX_DAYS} dias."),
        ));
    }

    let filter = AgendaFilter {
        from: Some(from),
        to: Some(to),
        dentist_id: dentist,
        ..AgendaFilter::default()
    };
    let matching = filter_appointments(appointments, &filter);

    Ok(dates
        .into_iter()
        .map(|date| AgendaDay {
            date,
            appointments: matching
                .iter()
                .filter(|a| a.data.date() == date)
                .cloned()
                .collect(),
            blocks: blocks_on(blocks, dentist, date)
                .into_iter()
                .cloned()
                .collect(),
        })
        .collect())
}
