use abx_protocol::ndjson;
use abx_protocol::{Experiment, ProtocolError};

#[test]
fn test_encode_one_document_per_line() {
    let exps = vec![Experiment::with_defaults("a"), Experiment::with_defaults("b")];
    let body = ndjson::encode(&exps).unwrap();
    assert_eq!(body.lines().count(), 2);
    assert!(body.ends_with('\n'));
    assert_eq!(ndjson::count_records(&body), 2);
}

#[test]
fn test_decode_skips_blank_lines() {
    let body = "{\"id\":\"a\",\"name\":\"A\"}\n\n{\"id\":\"b\",\"name\":\"B\",\"enabled\":true}\n";
    let exps: Vec<Experiment> = ndjson::decode(body).unwrap();
    assert_eq!(exps.len(), 2);
    assert!(!exps[0].enabled);
    assert!(exps[1].enabled);
    assert!(exps[1].variants.is_empty());
}

#[test]
fn test_decode_reports_failing_line() {
    let body = "{\"id\":\"a\",\"name\":\"A\"}\nnot json\n";
    let err = ndjson::decode::<Experiment>(body).unwrap_err();
    match err {
        ProtocolError::InvalidRecord { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_decode_encoded_experiments() {
    let exps = vec![Experiment::with_defaults("shop:cart")];
    let body = ndjson::encode(&exps).unwrap();
    let back: Vec<Experiment> = ndjson::decode(&body).unwrap();
    assert_eq!(back, exps);
}
