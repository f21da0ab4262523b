//! End-to-end integration tests
//!
//! The fixture tests run the `convert` command over tests/fixtures/{name}/input.csv and
//! compare the written file with expected.csv byte for byte. Fixtures cover:
//! - Every member kind of the bundled example record, in each accepted input form
//! - Rows that fail to convert or have too few fields (skipped) next to good rows, with
//!   extra and reordered columns
//! - Output column selection and quoting
//! - CRLF output without a header
//!
//! The remaining tests drive the library API directly.

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use clap::Parser;
    use csvdoc::cli::{self, CliArgs};
    use csvdoc::{
        ConversionError, CsvDocError, CsvReader, CsvWriter, FieldSpec, HeaderError,
        ReaderOptions, Record, SchemaError, Value, WriterOptions,
    };
    use rstest::rstest;
    use rust_decimal::Decimal;
    use std::fs;
    use std::io::{Cursor, Write};
    use std::path::Path;
    use std::str::FromStr;
    use std::thread;
    use tempfile::{tempdir, NamedTempFile};

    /// Run a fixture through `convert` and compare the output with expected.csv
    ///
    /// # Arguments
    ///
    /// * `fixture_name` - Name of the fixture directory (e.g., "all_members")
    /// * `flags` - Extra `convert` flags placed before the positional arguments
    ///
    /// # Panics
    ///
    /// Panics if fixture files are missing, the command fails, or the output differs.
    fn run_test_fixture(fixture_name: &str, flags: &[&str]) -> cli::Summary {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        let dir = tempdir().expect("Failed to create temp dir");
        let output_path = dir.path().join("output.csv");
        let output = output_path.to_str().expect("temp path is not UTF-8");

        let mut argv = vec!["csvdoc", "convert"];
        argv.extend_from_slice(flags);
        argv.extend([input_path.as_str(), output]);
        let args = CliArgs::try_parse_from(argv).expect("Failed to parse arguments");

        let summary = cli::run(&args.command, &mut std::io::sink())
            .unwrap_or_else(|e| panic!("Failed to convert {}: {}", fixture_name, e));

        let actual_output = fs::read_to_string(&output_path)
            .unwrap_or_else(|e| panic!("Failed to read output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {}\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, actual_output, expected_output
        );
        summary
    }

    #[rstest]
    #[case::all_members("all_members", &[], 4, 0)]
    #[case::bad_rows("bad_rows", &[], 2, 5)]
    #[case::selected_columns(
        "selected_columns",
        &["--input-delimiter", ";", "--columns", "userId,Id,MonYear"],
        2,
        0
    )]
    #[case::crlf_no_header(
        "crlf_no_header",
        &["--crlf", "--no-header", "--columns", "Id,DoProcess"],
        4,
        0
    )]
    fn test_fixtures(
        #[case] fixture: &str,
        #[case] flags: &[&str],
        #[case] rows: u64,
        #[case] skipped: u64,
    ) {
        let summary = run_test_fixture(fixture, flags);
        assert_eq!((summary.rows, summary.skipped), (rows, skipped));
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct User {
        id: i64,
        name: String,
    }

    impl Record for User {
        fn fields() -> Vec<FieldSpec<Self>> {
            vec![
                FieldSpec::new("id", |u: &User| &u.id, |u: &mut User| &mut u.id),
                FieldSpec::new("name", |u: &User| &u.name, |u: &mut User| &mut u.name),
            ]
        }
    }

    fn user_reader(content: &str) -> Result<CsvReader<User, Cursor<Vec<u8>>>, CsvDocError> {
        CsvReader::from_reader(
            Cursor::new(content.as_bytes().to_vec()),
            ReaderOptions::default(),
        )
    }

    #[test]
    fn test_read_ignores_extra_columns() {
        let mut reader = user_reader("id,name,extra\n7,alice,ignored\n").unwrap();
        assert_eq!(
            reader.read().unwrap(),
            Some(User {
                id: 7,
                name: "alice".to_string()
            })
        );
        assert_eq!(reader.read().unwrap(), None);
    }

    #[test]
    fn test_write_in_requested_order() {
        let options = WriterOptions::default().with_output_columns(["name", "id"]);
        let writer = CsvWriter::<User, _>::from_writer(Vec::new(), options).unwrap();
        writer
            .write(&User {
                id: 7,
                name: "alice".to_string(),
            })
            .unwrap();
        let output = String::from_utf8(writer.close().unwrap()).unwrap();
        assert_eq!(output, "name,id\nalice,7\n");
    }

    #[test]
    fn test_missing_required_column() {
        let result = user_reader("id\n1\n");
        assert!(matches!(
            result,
            Err(CsvDocError::Header(HeaderError::MissingRequiredColumn { ref name })) if name == "name"
        ));
    }

    #[test]
    fn test_duplicate_header_column() {
        let result = user_reader("id,name,id\n1,a,1\n");
        assert!(matches!(
            result,
            Err(CsvDocError::Header(HeaderError::DuplicateHeaderColumn { ref name, position: 2 }))
                if name == "id"
        ));
    }

    #[rstest]
    #[case::unknown(&["id", "email"], HeaderError::UnknownColumn { name: "email".to_string() })]
    #[case::duplicate(&["id", "id"], HeaderError::DuplicateHeaderColumn { name: "id".to_string(), position: 1 })]
    #[case::overspecified(&["id", "name", "id"], HeaderError::OutputOverspecified { requested: 3, available: 2 })]
    fn test_bad_output_columns(#[case] columns: &[&str], #[case] expected: HeaderError) {
        let options = WriterOptions::default().with_output_columns(columns.iter().copied());
        let result = CsvWriter::<User, _>::from_writer(Vec::new(), options);
        match result {
            Err(CsvDocError::Header(err)) => assert_eq!(err, expected),
            other => panic!("Expected header error, got {:?}", other.map(|_| ())),
        }
    }

    #[derive(Debug, Default)]
    struct Clashing {
        first: String,
        second: String,
    }

    impl Record for Clashing {
        fn fields() -> Vec<FieldSpec<Self>> {
            vec![
                FieldSpec::new("a,out", |c: &Clashing| &c.first, |c: &mut Clashing| {
                    &mut c.first
                }),
                FieldSpec::new("b,out", |c: &Clashing| &c.second, |c: &mut Clashing| {
                    &mut c.second
                }),
            ]
        }
    }

    #[test]
    fn test_duplicate_field_name() {
        // read names are distinct, so reading works
        let mut reader = CsvReader::<Clashing, _>::from_reader(
            Cursor::new(b"a,b\nx,y\n".to_vec()),
            ReaderOptions::default(),
        )
        .unwrap();
        let row = reader.read().unwrap().unwrap();
        assert_eq!((row.first.as_str(), row.second.as_str()), ("x", "y"));

        let result = CsvWriter::<Clashing, _>::from_writer(Vec::new(), WriterOptions::default());
        assert!(matches!(
            result,
            Err(CsvDocError::Schema(SchemaError::DuplicateFieldName { ref name, index: 1, .. }))
                if name == "out"
        ));
    }

    #[test]
    fn test_unknown_override_leaves_table_unchanged() {
        let mut reader = user_reader("id,name\n5,eve\n").unwrap();
        let result = reader.add_override("nickname", |_: &str| Ok(Value::Text("x".to_string())));
        assert_eq!(
            result,
            Err(HeaderError::UnknownColumn {
                name: "nickname".to_string()
            })
        );

        // defaults still apply to every column
        assert_eq!(
            reader.read().unwrap(),
            Some(User {
                id: 5,
                name: "eve".to_string()
            })
        );
    }

    #[derive(Debug, Default, PartialEq)]
    struct Counts {
        required: i32,
        optional: Option<i32>,
    }

    impl Record for Counts {
        fn fields() -> Vec<FieldSpec<Self>> {
            vec![
                FieldSpec::new("required", |c: &Counts| &c.required, |c: &mut Counts| {
                    &mut c.required
                }),
                FieldSpec::new("optional", |c: &Counts| &c.optional, |c: &mut Counts| {
                    &mut c.optional
                }),
            ]
        }
    }

    #[test]
    fn test_empty_cell_required_vs_nullable() {
        let mut reader = CsvReader::<Counts, _>::from_reader(
            Cursor::new(b"required,optional\n1,\n,2\n".to_vec()),
            ReaderOptions::default(),
        )
        .unwrap();

        assert_eq!(
            reader.read().unwrap(),
            Some(Counts {
                required: 1,
                optional: None
            })
        );
        match reader.read() {
            Err(CsvDocError::Conversion { column, source, .. }) => {
                assert_eq!(column, "required");
                assert!(matches!(
                    source,
                    ConversionError::EmptyValueForNonNullable { .. }
                ));
            }
            other => panic!("Expected conversion error, got {:?}", other),
        }
        assert_eq!(reader.read().unwrap(), None);
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Everything {
        small: i8,
        short: i16,
        int: i32,
        long: i64,
        word: isize,
        byte: u8,
        ushort: u16,
        uint: u32,
        ulong: u64,
        uword: usize,
        single: f32,
        double: f64,
        flag: bool,
        text: String,
        at: NaiveDateTime,
        amount: Decimal,
        maybe_int: Option<i32>,
        maybe_double: Option<f64>,
        maybe_flag: Option<bool>,
        maybe_text: Option<String>,
        maybe_at: Option<NaiveDateTime>,
        maybe_amount: Option<Decimal>,
    }

    impl Record for Everything {
        fn fields() -> Vec<FieldSpec<Self>> {
            type E = Everything;
            vec![
                FieldSpec::new("small", |e: &E| &e.small, |e: &mut E| &mut e.small),
                FieldSpec::new("short", |e: &E| &e.short, |e: &mut E| &mut e.short),
                FieldSpec::new("int", |e: &E| &e.int, |e: &mut E| &mut e.int),
                FieldSpec::new("long", |e: &E| &e.long, |e: &mut E| &mut e.long),
                FieldSpec::new("word", |e: &E| &e.word, |e: &mut E| &mut e.word),
                FieldSpec::new("byte", |e: &E| &e.byte, |e: &mut E| &mut e.byte),
                FieldSpec::new("ushort", |e: &E| &e.ushort, |e: &mut E| &mut e.ushort),
                FieldSpec::new("uint", |e: &E| &e.uint, |e: &mut E| &mut e.uint),
                FieldSpec::new("ulong", |e: &E| &e.ulong, |e: &mut E| &mut e.ulong),
                FieldSpec::new("uword", |e: &E| &e.uword, |e: &mut E| &mut e.uword),
                FieldSpec::new("single", |e: &E| &e.single, |e: &mut E| &mut e.single),
                FieldSpec::new("double", |e: &E| &e.double, |e: &mut E| &mut e.double),
                FieldSpec::new("flag", |e: &E| &e.flag, |e: &mut E| &mut e.flag),
                FieldSpec::new("text", |e: &E| &e.text, |e: &mut E| &mut e.text),
                FieldSpec::new("at", |e: &E| &e.at, |e: &mut E| &mut e.at),
                FieldSpec::new("amount", |e: &E| &e.amount, |e: &mut E| &mut e.amount),
                FieldSpec::new("maybe_int", |e: &E| &e.maybe_int, |e: &mut E| {
                    &mut e.maybe_int
                }),
                FieldSpec::new("maybe_double", |e: &E| &e.maybe_double, |e: &mut E| {
                    &mut e.maybe_double
                }),
                FieldSpec::new("maybe_flag", |e: &E| &e.maybe_flag, |e: &mut E| {
                    &mut e.maybe_flag
                }),
                FieldSpec::new("maybe_text", |e: &E| &e.maybe_text, |e: &mut E| {
                    &mut e.maybe_text
                }),
                FieldSpec::new("maybe_at", |e: &E| &e.maybe_at, |e: &mut E| &mut e.maybe_at),
                FieldSpec::new("maybe_amount", |e: &E| &e.maybe_amount, |e: &mut E| {
                    &mut e.maybe_amount
                }),
            ]
        }
    }

    fn timestamp(nanos: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 29)
            .and_then(|d| d.and_hms_nano_opt(13, 45, 6, nanos))
            .unwrap()
    }

    fn everything_extremes() -> Everything {
        Everything {
            small: i8::MIN,
            short: i16::MAX,
            int: -42,
            long: i64::MIN,
            word: isize::MAX,
            byte: u8::MAX,
            ushort: 0,
            uint: u32::MAX,
            ulong: u64::MAX,
            uword: 7,
            single: 1.5,
            double: -0.1,
            flag: true,
            text: "comma, \"quote\"\nnewline".to_string(),
            at: timestamp(123_456_789),
            amount: Decimal::from_str("-123.4500").unwrap(),
            maybe_int: Some(i32::MIN),
            maybe_double: Some(2.5e-10),
            maybe_flag: Some(false),
            maybe_text: Some("present".to_string()),
            maybe_at: Some(timestamp(0)),
            maybe_amount: Some(Decimal::from_str("0.001").unwrap()),
        }
    }

    #[test]
    fn test_round_trip_every_default_kind() {
        let nulls = Everything {
            text: String::new(),
            ..Everything::default()
        };
        let records = vec![everything_extremes(), nulls];

        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        let writer = CsvWriter::<Everything, _>::from_writer(
            file.as_file_mut(),
            WriterOptions::default(),
        )
        .unwrap();
        for record in &records {
            writer.write(record).unwrap();
        }
        writer.close().unwrap().flush().unwrap();

        let reader = CsvReader::<Everything>::open(file.path()).unwrap();
        let read_back: Vec<Everything> = reader.map(Result::unwrap).collect();
        assert_eq!(read_back, records);
    }

    #[test]
    fn test_concurrent_writers_share_one_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.csv");
        let writer = CsvWriter::<User>::create(&path).unwrap();

        thread::scope(|scope| {
            for worker in 0..8i64 {
                let writer = &writer;
                scope.spawn(move || {
                    for n in 0..50 {
                        let user = User {
                            id: worker * 1000 + n,
                            name: format!("worker-{worker}"),
                        };
                        writer.write(&user).unwrap();
                    }
                });
            }
        });
        writer.close().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("id,name").count(), 1);
        assert!(content.starts_with("id,name\n"));

        let reader = CsvReader::<User>::open(&path).unwrap();
        let mut ids: Vec<i64> = reader.map(|r| r.unwrap().id).collect();
        ids.sort_unstable();
        let mut expected: Vec<i64> = (0..8)
            .flat_map(|w| (0..50).map(move |n| w * 1000 + n))
            .collect();
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_no_header_when_nothing_written() {
        let writer = CsvWriter::<User, _>::from_writer(Vec::new(), WriterOptions::default()).unwrap();
        assert!(writer.close().unwrap().is_empty());
    }
}
