//! Odontogram: which permanent teeth, and which of their surfaces, a
//! procedure applies to.
//!
//! Teeth use FDI two-digit numbering: the first digit is the quadrant
//! (1 upper right, 2 upper left, 3 lower left, 4 lower right), the second the
//! position from the midline (1 central incisor … 8 third molar).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::validation::ValidationError;

pub const PERMANENT_TEETH: usize = 32;

/// Chart rows as drawn, left to right from the viewer's side.
pub const UPPER_ROW: [u8; 16] = [18, 17, 16, 15, 14, 13, 12, 11, 21, 22, 23, 24, 25, 26, 27, 28];
pub const LOWER_ROW: [u8; 16] = [48, 47, 46, 45, 44, 43, 42, 41, 31, 32, 33, 34, 35, 36, 37, 38];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(try_from = "u8", into = "u8")]
#[ts(export)]
pub struct Tooth(u8);

impl Tooth {
    pub fn new(number: u8) -> Result<Self, ValidationError> {
        let quadrant = number / 10;
        let position = number % 10;
        if !(1..=4).contains(&quadrant) || !(1..=8).contains(&position) {
            return Err(ValidationError::new(
                "tooth",
                format!("Dente {number} não existe na dentição permanente."),
            ));
        }
        Ok(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn quadrant(self) -> u8 {
        self.0 / 10
    }

    pub fn is_upper(self) -> bool {
        matches!(self.quadrant(), 1 | 2)
    }

    /// Incisors and canines, whose biting surface is incisal, not occlusal.
    pub fn is_anterior(self) -> bool {
        self.0 % 10 <= 3
    }

    pub fn all() -> impl Iterator<Item = Tooth> {
        UPPER_ROW.into_iter().chain(LOWER_ROW).map(Tooth)
    }
}

impl TryFrom<u8> for Tooth {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Tooth::new(value)
    }
}

impl From<Tooth> for u8 {
    fn from(tooth: Tooth) -> Self {
        tooth.0
    }
}

impl fmt::Display for Tooth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The five surfaces selectable on every tooth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Face {
    Mesial,
    Distal,
    /// Occlusal on posterior teeth, incisal on anterior ones.
    Occlusal,
    /// Vestibular.
    Buccal,
    /// Lingual on lower teeth, palatal on upper ones.
    Lingual,
}

impl Face {
    pub const ALL: [Face; 5] = [
        Face::Mesial,
        Face::Distal,
        Face::Occlusal,
        Face::Buccal,
        Face::Lingual,
    ];

    /// Clinical name of this surface on the given tooth.
    pub fn label(self, tooth: Tooth) -> &'static str {
        match self {
            Face::Mesial => "Mesial",
            Face::Distal => "Distal",
            Face::Occlusal if tooth.is_anterior() => "Incisal",
            Face::Occlusal => "Oclusal",
            Face::Buccal => "Vestibular",
            Face::Lingual if tooth.is_upper() => "Palatina",
            Face::Lingual => "Lingual",
        }
    }

    /// One-letter chart abbreviation (M, D, O/I, V, L/P).
    pub fn code(self, tooth: Tooth) -> char {
        self.label(tooth).chars().next().unwrap_or('?')
    }
}

/// One tooth in a selection with the surfaces picked on it. An empty
/// `faces` set means the whole tooth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ToothSelection {
    pub tooth: Tooth,
    #[serde(default)]
    pub faces: BTreeSet<Face>,
}

impl ToothSelection {
    /// Human description, e.g. `16 (M, O)` or `11`.
    pub fn describe(&self) -> String {
        if self.faces.is_empty() {
            return self.tooth.to_string();
        }
        let codes: Vec<String> = self
            .faces
            .iter()
            .map(|f| f.code(self.tooth).to_string())
            .collect();
        format!("{} ({})", self.tooth, codes.join(", "))
    }
}

/// Selection state of the chart: tooth → selected surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ToothSelection>", into = "Vec<ToothSelection>")]
pub struct Odontogram {
    selected: BTreeMap<Tooth, BTreeSet<Face>>,
}

impl Odontogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a tooth as selected without touching its faces.
    pub fn select_tooth(&mut self, tooth: Tooth) {
        self.selected.entry(tooth).or_default();
    }

    /// Flip one surface, selecting the tooth first if needed. Returns whether
    /// the face is selected afterwards.
    pub fn toggle_face(&mut self, tooth: Tooth, face: Face) -> bool {
        let faces = self.selected.entry(tooth).or_default();
        if faces.remove(&face) {
            false
        } else {
            faces.insert(face);
            true
        }
    }

    pub fn clear_tooth(&mut self, tooth: Tooth) -> bool {
        self.selected.remove(&tooth).is_some()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, tooth: Tooth) -> bool {
        self.selected.contains_key(&tooth)
    }

    pub fn faces(&self, tooth: Tooth) -> Option<&BTreeSet<Face>> {
        self.selected.get(&tooth)
    }

    pub fn selected_teeth(&self) -> Vec<Tooth> {
        self.selected.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn selections(&self) -> Vec<ToothSelection> {
        self.selected
            .iter()
            .map(|(tooth, faces)| ToothSelection {
                tooth: *tooth,
                faces: faces.clone(),
            })
            .collect()
    }
}

impl From<Vec<ToothSelection>> for Odontogram {
    fn from(selections: Vec<ToothSelection>) -> Self {
        let mut chart = Odontogram::new();
        for selection in selections {
            chart
                .selected
                .entry(selection.tooth)
                .or_default()
                .extend(selection.faces);
        }
        chart
    }
}

impl From<Odontogram> for Vec<ToothSelection> {
    fn from(chart: Odontogram) -> Self {
        chart.selections()
    }
}
