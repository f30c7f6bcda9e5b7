use volunteer_sheets_import::ingestion::{discover_input_files, read_records_from_path, read_records_from_reader};

#[test]
fn read_records_from_path_happy_path() {
    let records = read_records_from_path("tests/fixtures/volunteers/people.csv").unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(
        records[0].keys().collect::<Vec<_>>(),
        vec!["email", "phone", "firstnamestring", "signupdatestring", "status"]
    );
    assert_eq!(records[0].get("phone").map(String::as_str), Some("(555) 123-4567"));
    assert_eq!(records[2].get("phone").map(String::as_str), Some(""));
}

#[test]
fn quoted_cells_keep_their_commas() {
    let records = read_records_from_path("tests/fixtures/volunteers/shifts.csv").unwrap();
    assert_eq!(records[0].get("EventDate").map(String::as_str), Some("Sep 14, 2025"));
}

#[test]
fn header_only_file_has_no_records() {
    let records = read_records_from_path("tests/fixtures/volunteers/empty.csv").unwrap();
    assert!(records.is_empty());
}

#[test]
fn missing_file_is_an_io_error() {
    let err = read_records_from_path("tests/fixtures/volunteers/does_not_exist.csv").unwrap_err();
    assert!(err.to_string().contains("csv error"));
}

#[test]
fn read_from_reader_keeps_row_order() {
    let input = "email,phone\nb@x.com,1\na@x.com,2\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let records = read_records_from_reader(&mut rdr).unwrap();
    let emails: Vec<&str> = records.iter().filter_map(|r| r.get("email")).map(String::as_str).collect();
    assert_eq!(emails, vec!["b@x.com", "a@x.com"]);
}

#[test]
fn discovery_finds_every_csv_once() {
    let mut files = discover_input_files("tests/fixtures/volunteers", "*.csv").unwrap();
    files.sort();
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["empty.csv", "people.csv", "shifts.csv", "zz_late.csv"]);
}

#[test]
fn discovery_rejects_a_bad_pattern() {
    let err = discover_input_files("tests/fixtures/volunteers", "[*.csv").unwrap_err();
    assert!(err.to_string().contains("invalid input pattern"));
}
