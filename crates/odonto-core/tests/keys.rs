use uuid::Uuid;

use odonto_core::s3_keys;

#[test]
fn distinct_claim_values_get_distinct_keys() {
    let clinic = Uuid::nil();
    let pairs = [
        ("josé@x.com", "jos_@x.com"),
        ("CRO/SP 1234", "CRO_SP_1234"),
        ("a b", "a_b"),
        ("..", "__"),
    ];
    for (a, b) in pairs {
        assert_ne!(
            s3_keys::unique_claim(clinic, "patient-email", a),
            s3_keys::unique_claim(clinic, "patient-email", b),
            "{a} vs {b}"
        );
    }
}

#[test]
fn claim_keys_stay_under_the_clinic_index() {
    let clinic = Uuid::nil();
    let key = s3_keys::unique_claim(clinic, "patient-cpf", "12345678909");

    assert!(key.starts_with(&s3_keys::unique_prefix(clinic, "patient-cpf")));
    assert_eq!(key.matches('/').count(), 4);
    assert!(key.ends_with("3132333435363738393039"));
}

#[test]
fn claim_keys_do_not_depend_on_other_clinics() {
    let a = s3_keys::unique_claim(Uuid::nil(), "dentist-cro", "SP-1234");
    let b = s3_keys::unique_claim(Uuid::max(), "dentist-cro", "SP-1234");
    assert_ne!(a, b);
}
