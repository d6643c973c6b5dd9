use chrono::{DateTime, FixedOffset, TimeZone};
use rowmap::{
    decode_all_into, decode_into, decode_new, encode_all_to_rows, encode_to_row, row, CellError,
    CellKind, CellValue, Entity, ErrorKind, MapError, Row, SemanticType, StrategyKind,
};

#[derive(Debug, Default, Clone, PartialEq, Entity)]
struct Player {
    #[row(read_only)]
    id: i64,
    name: String,
    score: Option<f64>,
}

#[test]
fn scenario_decode_and_encode() {
    let p: Player = decode_new(&row![7_i64, "Ann", CellValue::Null]).unwrap();
    assert_eq!(
        p,
        Player {
            id: 7,
            name: "Ann".into(),
            score: None,
        }
    );

    let write = encode_to_row(&p, false).unwrap();
    assert_eq!(write, row!["Ann", CellValue::Null]);

    let full = encode_to_row(&p, true).unwrap();
    assert_eq!(full, row![7_i64, "Ann", CellValue::Null]);
}

#[test]
fn read_only_omission_matches_descriptor_columns() {
    let desc = rowmap::descriptor::<Player>().unwrap();
    assert_eq!(desc.entity_name(), "Player");
    assert_eq!(desc.columns(false), vec!["name", "score"]);
    assert_eq!(desc.columns(true), vec!["id", "name", "score"]);

    let p = Player {
        id: 1,
        name: "x".into(),
        score: Some(1.0),
    };
    let read_only = desc.fields().iter().filter(|f| f.is_read_only()).count();
    assert_eq!(encode_to_row(&p, false).unwrap().len(), desc.len() - read_only);
    assert_eq!(encode_to_row(&p, true).unwrap().len(), desc.len());
}

#[test]
fn batch_decode_into_ignores_surplus_rows() {
    let rows = vec![
        row![1_i64, "a", 1.0],
        row![2_i64, "b", CellValue::Null],
        row![3_i64, "c", 3.0],
    ];
    let mut players = vec![Player::default(), Player::default()];
    decode_all_into(&rows, &mut players).unwrap();
    assert_eq!(players[0].name, "a");
    assert_eq!(players[1].name, "b");
    assert_eq!(players[1].score, None);
}

#[test]
fn encode_all_is_one_row_per_entity() {
    let players = vec![
        Player {
            id: 1,
            name: "a".into(),
            score: None,
        },
        Player {
            id: 2,
            name: "b".into(),
            score: Some(2.0),
        },
    ];
    let rows = encode_all_to_rows(&players, true).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], row![2_i64, "b", 2.0]);
}

// --- overrides ---

fn parse_tags(cell: &CellValue) -> Result<Vec<String>, CellError> {
    Ok(cell
        .as_text()?
        .split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect())
}

fn join_tags(tags: &Vec<String>) -> CellValue {
    CellValue::Text(tags.join(","))
}

#[derive(Debug, Default, PartialEq, Entity)]
struct Tagged {
    #[row(decode_with = "parse_tags", encode_with = "join_tags")]
    tags: Vec<String>,
    #[row(decode_expr = "|cell: &CellValue| cell.as_text().map(str::to_uppercase)")]
    code: String,
    #[row(encode_expr = "|v: &i32| CellValue::Integer(i64::from(*v) * 100)")]
    cents: i32,
}

#[test]
fn overrides_apply_per_direction() {
    let t: Tagged = decode_new(&row!["red,blue", "ab", 3_i64]).unwrap();
    assert_eq!(t.tags, vec!["red".to_string(), "blue".to_string()]);
    assert_eq!(t.code, "AB");
    assert_eq!(t.cents, 3);

    // code has no encode override, cents has no decode override.
    let r = encode_to_row(&t, false).unwrap();
    assert_eq!(r, row!["red,blue", "AB", 300_i64]);

    let desc = rowmap::descriptor::<Tagged>().unwrap();
    let kinds: Vec<_> = desc
        .fields()
        .iter()
        .map(|f| (f.decode_kind(), f.encode_kind()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (Some(StrategyKind::Function), Some(StrategyKind::Function)),
            (Some(StrategyKind::Expression), Some(StrategyKind::BuiltIn)),
            (Some(StrategyKind::BuiltIn), Some(StrategyKind::Expression)),
        ]
    );
}

fn parse_count(cell: &CellValue) -> Result<i64, CellError> {
    cell.as_text()?
        .trim()
        .parse::<i64>()
        .map_err(|e| CellError::custom(format!("not a count: {e}")))
}

#[derive(Debug, Default, PartialEq, Entity)]
struct WithOverride {
    #[row(decode_with = "parse_count")]
    n: i64,
}

#[derive(Debug, Default, PartialEq, Entity)]
struct WithoutOverride {
    n: i64,
}

#[test]
fn removing_the_override_switches_to_builtin() {
    let text = row![" 5"];
    let int = row![5_i64];

    let with: WithOverride = decode_new(&text).unwrap();
    assert_eq!(with.n, 5);
    let err = decode_new::<WithOverride>(&int).unwrap_err();
    assert_eq!(
        err,
        MapError::TypeMismatch {
            field: "n",
            index: 0,
            expected: CellKind::Text,
            actual: CellKind::Integer,
        }
    );

    let without: WithoutOverride = decode_new(&int).unwrap();
    assert_eq!(without.n, 5);
    let err = decode_new::<WithoutOverride>(&text).unwrap_err();
    assert_eq!(
        err,
        MapError::TypeMismatch {
            field: "n",
            index: 0,
            expected: CellKind::Integer,
            actual: CellKind::Text,
        }
    );

    let err = decode_new::<WithOverride>(&row!["five"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conversion);
}

// --- unsupported types ---

#[derive(Debug, Default, PartialEq, Entity)]
struct Blobby {
    label: String,
    blob: Vec<u8>,
}

#[test]
fn unsupported_type_fails_before_reading_cells() {
    let mut b = Blobby {
        label: "untouched".into(),
        blob: vec![1],
    };
    let err = decode_into(&row!["new", "bytes"], &mut b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    match &err {
        MapError::UnsupportedType { field, type_name } => {
            assert_eq!(*field, "blob");
            assert!(type_name.contains("Vec<u8>"), "{type_name}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // No field was touched, not even the supported one before it.
    assert_eq!(b.label, "untouched");

    let err = encode_to_row(&b, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);
}

// --- skip, rename, i32, timestamps ---

#[derive(Debug, Default, PartialEq, Entity)]
struct Event {
    #[row(rename = "event_id")]
    id: i32,
    at: Option<DateTime<FixedOffset>>,
    active: bool,
    #[row(skip)]
    cache: Vec<u8>,
}

#[test]
fn skipped_fields_are_not_mapped() {
    let desc = rowmap::descriptor::<Event>().unwrap();
    assert_eq!(desc.columns(true), vec!["event_id", "at", "active"]);
    assert_eq!(desc.fields()[0].semantic_type(), &SemanticType::Integer32);
    assert_eq!(
        desc.fields()[1].semantic_type(),
        &SemanticType::Optional(Box::new(SemanticType::Timestamp))
    );

    let at = FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2023, 11, 2, 8, 0, 0)
        .unwrap();
    let e: Event = decode_new(&row![42_i64, at, true]).unwrap();
    assert_eq!(e.id, 42);
    assert_eq!(e.at, Some(at));
    assert!(e.active);
    assert!(e.cache.is_empty());

    assert_eq!(encode_to_row(&e, false).unwrap(), row![42_i64, at, true]);
}

#[test]
fn narrowing_overflow_names_the_field() {
    let err = decode_new::<Event>(&row![i64::MAX, CellValue::Null, false]).unwrap_err();
    assert_eq!(
        err,
        MapError::OutOfRange {
            field: "event_id",
            index: 0,
            value: i64::MAX,
            target: "i32",
        }
    );
}

#[test]
fn row_survives_json_snapshot() {
    let e = Event {
        id: 1,
        at: None,
        active: false,
        cache: Vec::new(),
    };
    let r = encode_to_row(&e, true).unwrap();
    let json = serde_json::to_string(&r).unwrap();
    let back: Row = serde_json::from_str(&json).unwrap();
    assert_eq!(decode_new::<Event>(&back).unwrap(), e);
}

// --- aliases and nested optionals ---

type Rating = f64;
type Count = i64;
type MaybeCount = Option<i64>;

#[derive(Debug, Default, PartialEq, Entity)]
struct Aliased {
    rating: Rating,
    total: MaybeCount,
    extra: Option<Count>,
}

#[test]
fn aliased_builtins_use_builtin_converters() {
    let desc = rowmap::descriptor::<Aliased>().unwrap();
    let semantics: Vec<_> = desc.fields().iter().map(|f| f.semantic_type().clone()).collect();
    assert_eq!(
        semantics,
        vec![
            SemanticType::Float,
            SemanticType::Optional(Box::new(SemanticType::Integer64)),
            SemanticType::Optional(Box::new(SemanticType::Integer64)),
        ]
    );

    let a: Aliased = decode_new(&row![1.5, 4_i64, CellValue::Null]).unwrap();
    assert_eq!(
        a,
        Aliased {
            rating: 1.5,
            total: Some(4),
            extra: None,
        }
    );
    assert_eq!(
        encode_to_row(&a, false).unwrap(),
        row![1.5, 4_i64, CellValue::Null]
    );
}

#[derive(Debug, Default, PartialEq, Entity)]
struct Nested {
    v: Option<Option<i64>>,
}

#[test]
fn nested_optional_is_unsupported() {
    let desc = rowmap::descriptor::<Nested>().unwrap();
    assert!(!desc.fields()[0].semantic_type().is_builtin());

    let err = decode_new::<Nested>(&row![CellValue::Null]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedType);

    let err = encode_to_row(&Nested { v: Some(None) }, false).unwrap_err();
    match err {
        MapError::UnsupportedType { field, type_name } => {
            assert_eq!(field, "v");
            assert_eq!(type_name.matches("Option<").count(), 2, "{type_name}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
