use std::collections::BTreeSet;

use odonto_core::odontogram::{Face, Odontogram, PERMANENT_TEETH, Tooth, ToothSelection};

fn tooth(n: u8) -> Tooth {
    Tooth::new(n).unwrap()
}

#[test]
fn chart_has_thirty_two_distinct_permanent_teeth() {
    let all: BTreeSet<u8> = Tooth::all().map(Tooth::number).collect();
    assert_eq!(all.len(), PERMANENT_TEETH);
    assert!(all.contains(&11));
    assert!(all.contains(&48));
}

#[test]
fn rejects_numbers_outside_the_permanent_dentition() {
    for n in [0, 9, 10, 19, 29, 50, 51, 55, 85] {
        assert!(Tooth::new(n).is_err(), "{n} should be rejected");
    }
    let err = Tooth::new(19).unwrap_err();
    assert_eq!(err.field, "tooth");
}

#[test]
fn toggling_a_face_selects_the_tooth_and_flips_the_face() {
    let mut chart = Odontogram::new();
    assert!(chart.toggle_face(tooth(16), Face::Mesial));
    assert!(chart.is_selected(tooth(16)));
    assert!(chart.toggle_face(tooth(16), Face::Occlusal));
    assert!(!chart.toggle_face(tooth(16), Face::Mesial));

    let faces = chart.faces(tooth(16)).unwrap();
    assert_eq!(faces.len(), 1);
    assert!(faces.contains(&Face::Occlusal));
}

#[test]
fn whole_tooth_selection_keeps_faces_empty() {
    let mut chart = Odontogram::new();
    chart.select_tooth(tooth(21));
    chart.toggle_face(tooth(36), Face::Distal);
    assert_eq!(chart.selected_teeth(), vec![tooth(21), tooth(36)]);
    assert!(chart.faces(tooth(21)).unwrap().is_empty());

    assert!(chart.clear_tooth(tooth(21)));
    assert!(!chart.clear_tooth(tooth(21)));
    assert_eq!(chart.len(), 1);
    chart.clear();
    assert!(chart.is_empty());
}

#[test]
fn face_labels_depend_on_tooth_position() {
    assert_eq!(Face::Occlusal.label(tooth(11)), "Incisal");
    assert_eq!(Face::Occlusal.label(tooth(46)), "Oclusal");
    assert_eq!(Face::Lingual.label(tooth(26)), "Palatina");
    assert_eq!(Face::Lingual.label(tooth(33)), "Lingual");
    assert_eq!(Face::Buccal.code(tooth(14)), 'V');
}

#[test]
fn selection_description_lists_face_codes() {
    let mut chart = Odontogram::new();
    chart.toggle_face(tooth(16), Face::Mesial);
    chart.toggle_face(tooth(16), Face::Occlusal);
    chart.select_tooth(tooth(11));

    let described: Vec<String> = chart.selections().iter().map(ToothSelection::describe).collect();
    assert_eq!(described, vec!["11".to_string(), "16 (M, O)".to_string()]);
}

#[test]
fn serializes_as_a_list_of_selections() {
    let mut chart = Odontogram::new();
    chart.toggle_face(tooth(47), Face::Buccal);
    let json = serde_json::to_value(&chart).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "tooth": 47, "faces": ["buccal"] }])
    );

    let parsed: Odontogram = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, chart);

    let invalid = serde_json::from_value::<Odontogram>(serde_json::json!([{ "tooth": 19 }]));
    assert!(invalid.is_err());
}
