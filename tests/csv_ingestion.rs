use tabular_intake::ingestion::csv::{parse_csv_bytes, parse_csv_from_reader};
use tabular_intake::types::Value;
use tabular_intake::{ParseCause, UploadError};

#[test]
fn parse_csv_fixture_happy_path() {
    let bytes = std::fs::read("tests/fixtures/people.csv").unwrap();
    let t = parse_csv_bytes(&bytes).unwrap();

    assert_eq!(t.row_count(), 2);
    assert_eq!(t.column_names(), ["id", "name", "score", "active"]);
    assert_eq!(
        t.rows()[0],
        vec![
            Value::Int64(1),
            Value::Utf8("Ada".to_string()),
            Value::Float64(98.5),
            Value::Bool(true),
        ]
    );
}

#[test]
fn parse_csv_tolerates_ragged_rows() {
    let bytes = std::fs::read("tests/fixtures/ragged.csv").unwrap();
    let t = parse_csv_bytes(&bytes).unwrap();

    assert_eq!(t.row_count(), 3);
    assert_eq!(t.column_count(), 3);
    assert_eq!(t.rows()[1], vec![Value::Int64(2), Value::Utf8("Bo".into()), Value::Null]);
    assert_eq!(
        t.rows()[2],
        vec![Value::Int64(3), Value::Utf8("Cy".into()), Value::Utf8("late".into())]
    );
}

#[test]
fn parse_csv_mixed_types_degrade_per_cell() {
    let t = parse_csv_bytes(b"v\n1\nabc\n2.5\n\n").unwrap();
    assert_eq!(t.row_count(), 3);
    assert_eq!(
        t.rows().iter().map(|r| r[0].clone()).collect::<Vec<_>>(),
        vec![Value::Int64(1), Value::Utf8("abc".into()), Value::Float64(2.5)]
    );
}

#[test]
fn parse_csv_header_only_yields_zero_rows() {
    let t = parse_csv_bytes(b"id,name\n").unwrap();
    assert_eq!(t.row_count(), 0);
    assert_eq!(t.column_names(), ["id", "name"]);
}

#[test]
fn parse_csv_keeps_duplicate_headers() {
    let t = parse_csv_bytes(b"a,a\n1,2\n").unwrap();
    assert_eq!(t.column_names(), ["a", "a"]);
    assert_eq!(t.rows()[0], vec![Value::Int64(1), Value::Int64(2)]);
}

#[test]
fn parse_csv_zero_bytes_is_a_parse_error() {
    for input in [&b""[..], &b"\n\n"[..], &b"   "[..]] {
        let err = parse_csv_bytes(input).unwrap_err();
        assert!(
            matches!(err, UploadError::ParseError(ParseCause::EmptyInput)),
            "input={input:?} err={err}"
        );
    }
}

#[test]
fn parse_csv_invalid_utf8_is_an_encoding_error() {
    let err = parse_csv_bytes(b"id,name\n1,\xff\xfe\n").unwrap_err();
    assert!(matches!(err, UploadError::ParseError(ParseCause::Encoding { .. })));
    assert!(err.to_string().contains("invalid text encoding"));
}

#[test]
fn parse_csv_quoted_fields_and_crlf() {
    let t =
        parse_csv_bytes(b"id,comment\r\n1,\"hello, world\"\r\n2,\"say \"\"hi\"\"\"\r\n").unwrap();
    assert_eq!(t.row_count(), 2);
    assert_eq!(t.rows()[0][1], Value::Utf8("hello, world".into()));
    assert_eq!(t.rows()[1][1], Value::Utf8("say \"hi\"".into()));
}

#[test]
fn parse_csv_from_custom_reader() {
    let input = "name;id\nAda;1\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b';')
        .from_reader(input.as_bytes());

    let t = parse_csv_from_reader(&mut rdr).unwrap();
    assert_eq!(t.column_names(), ["name", "id"]);
    assert_eq!(t.rows()[0][1], Value::Int64(1));
}
