use odonto_storage::error::StorageError;
use odonto_storage::objects::{content_disposition, is_precondition_failure};
use odonto_core::messages::UniqueField;

#[test]
fn conditional_write_failures_are_recognized_by_code() {
    assert!(is_precondition_failure(Some("PreconditionFailed"), ""));
    assert!(is_precondition_failure(Some("ConditionalRequestConflict"), ""));
    assert!(!is_precondition_failure(Some("AccessDenied"), "access denied"));
}

#[test]
fn conditional_write_failures_fall_back_to_message() {
    assert!(is_precondition_failure(
        None,
        "unhandled error (PreconditionFailed): At least one of the pre-conditions you specified did not hold"
    ));
    assert!(!is_precondition_failure(None, "dispatch failure"));
}

#[test]
fn download_names_are_quoted_and_ascii() {
    assert_eq!(
        content_disposition("raio-x panorâmico.png"),
        "attachment; filename=\"raio-x panor_mico.png\""
    );
    assert_eq!(
        content_disposition("a\"b.pdf"),
        "attachment; filename=\"a_b.pdf\""
    );
}

#[test]
fn claim_conflicts_name_the_index() {
    let err = StorageError::AlreadyClaimed {
        field: UniqueField::PatientCpf,
    };
    assert_eq!(err.to_string(), "patient-cpf already claimed by another record");
}
