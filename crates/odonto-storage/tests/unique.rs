use odonto_core::messages::UniqueField::{PatientCpf, PatientEmail};
use odonto_storage::unique::ClaimChanges;

#[test]
fn create_acquires_every_present_value() {
    let changes = ClaimChanges::between(
        &[],
        &[(PatientCpf, Some("12345678909")), (PatientEmail, None)],
    );
    assert_eq!(changes.acquire, vec![(PatientCpf, Some("12345678909"))]);
    assert!(changes.release.is_empty());
}

#[test]
fn unchanged_values_are_left_alone() {
    let values = [(PatientCpf, Some("12345678909")), (PatientEmail, Some("ana@x.com"))];
    assert!(ClaimChanges::between(&values, &values).is_empty());
}

#[test]
fn editing_two_fields_claims_both_before_releasing_either() {
    let old = [(PatientCpf, Some("11111111111")), (PatientEmail, Some("old@x.com"))];
    let new = [(PatientCpf, Some("22222222222")), (PatientEmail, Some("new@x.com"))];

    let changes = ClaimChanges::between(&old, &new);

    assert_eq!(
        changes.acquire,
        vec![(PatientCpf, Some("22222222222")), (PatientEmail, Some("new@x.com"))]
    );
    assert_eq!(
        changes.release,
        vec![(PatientCpf, Some("11111111111")), (PatientEmail, Some("old@x.com"))]
    );
}

#[test]
fn clearing_a_field_only_releases_it() {
    let old = [(PatientCpf, Some("12345678909")), (PatientEmail, Some("ana@x.com"))];
    let new = [(PatientCpf, Some("12345678909")), (PatientEmail, None)];

    let changes = ClaimChanges::between(&old, &new);

    assert!(changes.acquire.is_empty());
    assert_eq!(changes.release, vec![(PatientEmail, Some("ana@x.com"))]);
}
