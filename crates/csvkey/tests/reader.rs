use csvkey::{Bom, CsvRecord, MemorySource, RawRow, Reader, ReaderError};

fn row(fields: &[&str]) -> RawRow {
    fields.iter().map(|f| Some(f.to_string())).collect()
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn keyed(record: &CsvRecord) -> Vec<(String, Option<String>)> {
    record
        .as_keyed()
        .expect("record should be keyed")
        .iter()
        .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
        .collect()
}

fn people() -> MemorySource {
    MemorySource::new(vec![
        row(&["id", "name"]),
        row(&["1", "Alice"]),
        row(&["2", "Bob"]),
    ])
}

#[test]
fn end_to_end_with_header_row() {
    let mut reader = Reader::new(people()).with_header_offset(Some(0)).unwrap();

    assert_eq!(reader.header().unwrap().names(), &names(&["id", "name"])[..]);

    let records = reader
        .records(&[])
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(
        keyed(&records[0]),
        vec![
            ("id".to_string(), Some("1".to_string())),
            ("name".to_string(), Some("Alice".to_string()))
        ]
    );
    assert_eq!(
        keyed(&records[1]),
        vec![
            ("id".to_string(), Some("2".to_string())),
            ("name".to_string(), Some("Bob".to_string()))
        ]
    );
    assert_eq!(reader.count().unwrap(), 2);
}

#[test]
fn no_header_passes_rows_through_minus_blank_lines() {
    let source = MemorySource::new(vec![
        row(&["\u{feff}a", "b"]),
        vec![None],
        row(&["1"]),
        vec![],
        row(&["2", "3", "4"]),
    ])
    .with_bom(Bom::Utf8);
    let mut reader = Reader::new(source);

    let rows: Vec<_> = reader
        .records(&[])
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(
        rows,
        vec![
            CsvRecord::Row(row(&["a", "b"])),
            CsvRecord::Row(row(&["1"])),
            CsvRecord::Row(row(&["2", "3", "4"])),
        ]
    );
}

#[test]
fn header_is_cached_without_rereading() {
    let mut reader = Reader::new(people()).with_header_offset(Some(0)).unwrap();

    let first = reader.header().unwrap();
    let reads = reader.source().reads();
    let second = reader.header().unwrap();

    assert_eq!(first, second);
    assert_eq!(reader.source().reads(), reads);
}

#[test]
fn width_is_reconciled_against_header() {
    let source = MemorySource::new(vec![
        row(&["a", "b", "c"]),
        row(&["1", "2"]),
        row(&["1", "2", "3", "4"]),
    ]);
    let mut reader = Reader::new(source).with_header_offset(Some(0)).unwrap();
    let records = reader.fetch_all().unwrap();

    let short = records[0].as_keyed().unwrap();
    assert_eq!(short.get("a"), Some(Some("1")));
    assert_eq!(short.get("b"), Some(Some("2")));
    assert_eq!(short.get("c"), Some(None));

    let long = records[1].as_keyed().unwrap();
    assert_eq!(long.values(), &row(&["1", "2", "3"])[..]);
}

#[test]
fn bom_and_exposed_enclosure_are_stripped() {
    let source = MemorySource::new(vec![row(&["\u{feff}\"name\"", "age"])]).with_bom(Bom::Utf8);
    let mut reader = Reader::new(source);

    let first = reader.fetch_one(0).unwrap().unwrap();
    assert_eq!(first, CsvRecord::Row(row(&["name", "age"])));
}

#[test]
fn duplicate_header_is_invalid() {
    let source = MemorySource::new(vec![row(&["a", "a"]), row(&["1", "2"])]);
    let mut reader = Reader::new(source).with_header_offset(Some(0)).unwrap();

    assert!(matches!(
        reader.header(),
        Err(ReaderError::InvalidHeader { .. })
    ));
    assert!(matches!(
        reader.records(&[]).map(|_| ()),
        Err(ReaderError::InvalidHeader { .. })
    ));

    let mut plain = Reader::new(people());
    assert!(matches!(
        plain.records(&names(&["x", "x"])).map(|_| ()),
        Err(ReaderError::InvalidHeader { .. })
    ));
}

#[test]
fn null_header_field_is_invalid() {
    let source = MemorySource::new(vec![vec![Some("a".into()), None], row(&["1", "2"])]);
    let mut reader = Reader::new(source).with_header_offset(Some(0)).unwrap();
    assert!(matches!(
        reader.header(),
        Err(ReaderError::InvalidHeader { .. })
    ));
}

#[test]
fn negative_offset_is_invalid() {
    let mut reader = Reader::new(people());
    assert!(matches!(
        reader.set_header_offset(Some(-1)),
        Err(ReaderError::InvalidOffset(-1))
    ));
}

#[test]
fn missing_header_row() {
    let mut reader = Reader::new(people()).with_header_offset(Some(10)).unwrap();
    assert!(matches!(
        reader.header(),
        Err(ReaderError::MissingHeader { offset: 10 })
    ));
    assert!(matches!(
        reader.count(),
        Err(ReaderError::MissingHeader { offset: 10 })
    ));
}

#[test]
fn count_is_rederived_after_offset_change() {
    let mut reader = Reader::new(people()).with_header_offset(Some(0)).unwrap();
    assert_eq!(reader.count().unwrap(), 2);

    reader.set_header_offset(Some(1)).unwrap();
    assert_eq!(reader.header().unwrap().names(), &names(&["1", "Alice"])[..]);
    assert_eq!(reader.count().unwrap(), 2);
    let ids: Vec<_> = reader
        .fetch_column("1")
        .unwrap()
        .map(|v| v.unwrap())
        .collect();
    assert_eq!(ids, vec![Some("id".to_string()), Some("2".to_string())]);

    reader.set_header_offset(None).unwrap();
    assert_eq!(reader.count().unwrap(), 3);
}

#[test]
fn header_exclusion_uses_source_offsets() {
    let source = MemorySource::new(vec![
        vec![None],
        row(&["id", "name"]),
        row(&["1", "Alice"]),
    ]);
    let mut reader = Reader::new(source).with_header_offset(Some(1)).unwrap();

    assert_eq!(reader.header().unwrap().names(), &names(&["id", "name"])[..]);
    let records = reader.fetch_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].as_keyed().unwrap().get("name"),
        Some(Some("Alice"))
    );
}

#[test]
fn override_header_keys_records() {
    let mut reader = Reader::new(people()).with_header_offset(Some(0)).unwrap();
    let records = reader
        .records(&names(&["key", "label", "extra"]))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    assert_eq!(records.len(), 2);
    let first = records[0].as_keyed().unwrap();
    assert_eq!(first.get("label"), Some(Some("Alice")));
    assert_eq!(first.get("extra"), Some(None));

    // The override is not cached as the header.
    assert_eq!(reader.header().unwrap().names(), &names(&["id", "name"])[..]);
}

#[test]
fn traversals_restart_from_the_first_row() {
    let mut reader = Reader::new(people());

    let mut partial = reader.records(&[]).unwrap();
    partial.next();
    drop(partial);

    let all: Vec<_> = (&mut reader).into_iter().map(|r| r.unwrap()).collect();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0], CsvRecord::Row(row(&["id", "name"])));
}

#[test]
fn serializes_records_as_json() {
    let mut reader = Reader::new(people()).with_header_offset(Some(0)).unwrap();
    assert_eq!(
        reader.to_json().unwrap(),
        r#"[{"id":"1","name":"Alice"},{"id":"2","name":"Bob"}]"#
    );

    let mut out = Vec::new();
    reader.set_header_offset(None).unwrap();
    reader.to_json_writer(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        r#"[["id","name"],["1","Alice"],["2","Bob"]]"#
    );
}
