//! trybuild compile-time tests for service_macros

#[test]
fn trybuild_service_macros() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/service_ok.rs");
    t.pass("tests/trybuild/injectable_ok.rs");
}
