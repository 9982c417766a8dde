//! List codec, entries, formats and registry through the public API.

use tilepack::{
    Config, EntryView, FormatKind, FormatSpec, FormatValue, ListCodec, ListError, ListKind,
    ListRegistry, Record,
};

const DEFINITIONS: [&str; 5] = [
    "Ev:Event|Click|Enter|Exit|",
    "Ts:TileSize|Fixed|T:Top|TL:Top Left|",
    "Test|NameF:[%12]First Name|XY:[P]XY Dim|Cost:[$]Dollar Price|",
    "Plain|a|b|c|",
    "   Sub:Indented|x:[#=7]Seven|",
];

#[test]
fn test_event_list_scenario() {
    let list = ListCodec::parse("Ev:Event|Click|Enter|Exit|").unwrap();
    assert_eq!(list.name(), "Ev");
    assert_eq!(list.desc(), "Event");
    assert_eq!(list.delimiter(), '|');
    assert_eq!(list.count(), 3);
    assert_eq!(list.id_by_name("Click"), Some(1));
    assert_eq!(list.id_by_name("Enter"), Some(2));
    assert_eq!(list.id_by_name("Exit"), Some(3));
    assert_eq!(list.kind(), ListKind::NameOnly);
}

#[test]
fn test_reserialized_lists_reparse_identically() {
    for definition in DEFINITIONS {
        let list = ListCodec::parse(definition).unwrap();
        let again = ListCodec::parse(&list.to_string()).unwrap();

        assert_eq!(again.name(), list.name());
        assert_eq!(again.desc(), list.desc());
        assert_eq!(again.name_list(), list.name_list());
        assert_eq!(again.entries(), list.entries(), "{}", definition);
    }
}

#[test]
fn test_format_annotation_scenario() {
    let (format, text) = FormatSpec::split_description("[#=42]Meaning");
    let format = format.unwrap();
    assert_eq!(format.kind(), Some(FormatKind::Num));
    assert_eq!(format.value(), &FormatValue::Number(42.0));
    assert_eq!(text, "Meaning");

    let entry = EntryView::new("Answer", "[#=42]Meaning");
    assert_eq!(entry.desc(), "Meaning");
    assert_eq!(entry.format().unwrap().kind(), Some(FormatKind::Num));
}

#[test]
fn test_unknown_format_is_data_not_error() {
    let list = ListCodec::parse("Bad|x:[Z]Broken|y:Fine|").unwrap();
    let entry = list.entry("x").unwrap();
    let format = entry.format().unwrap();
    assert!(!format.is_valid());
    assert!(format.error().is_some());
    assert_eq!(list.desc_of("y"), Some("Fine"));
}

#[test]
fn test_update_then_delete_restores_count() {
    let mut list = ListCodec::parse("Ev:Event|Click|Enter|Exit|").unwrap();

    let entry = EntryView::new("Drop", "Dropped");
    list.update(&entry, false).unwrap();
    assert_eq!(list.count(), 4);
    assert_eq!(list.id_by_name("Drop"), Some(4));

    list.update(&entry, true).unwrap();
    assert_eq!(list.count(), 3);
    assert!(list.entry("Drop").is_none());

    list.update(&EntryView::new("Enter", ""), true).unwrap();
    assert_eq!(list.count(), 2);
    assert!(list.entry("Enter").is_none());
    assert_eq!(list.id_by_name("Exit"), Some(2));
}

#[test]
fn test_update_with_attached_format() {
    let mut list = ListCodec::parse("Test|Max:250|").unwrap();
    let mut entry = EntryView::new("Cost", "Dollar Price");
    entry.set_format(Some(FormatSpec::parse("$")));
    assert_eq!(entry.to_entry_string(), "Cost:[$]Dollar Price");

    list.update(&entry, false).unwrap();
    assert_eq!(list.to_string(), "Test|Max:250|Cost:[$]Dollar Price|");
    let stored = list.entry("Cost").unwrap();
    assert_eq!(stored.desc(), "Dollar Price");
    assert_eq!(stored.format().unwrap().kind(), Some(FormatKind::Dollar));

    entry.set_format(None);
    list.update(&entry, false).unwrap();
    assert!(list.entry("Cost").unwrap().format().is_none());
    assert_eq!(list.count(), 2);
}

#[test]
fn test_delete_missing_is_noop() {
    let mut list = ListCodec::parse("Ev:Event|Click|").unwrap();
    let before = list.to_string();
    assert!(!list.update(&EntryView::new("Nope", ""), true).unwrap());
    assert_eq!(list.to_string(), before);
}

#[test]
fn test_bubble_boundaries() {
    let mut list = ListCodec::parse("Ev:Event|Click|Enter|Exit|").unwrap();
    let before = list.to_string();

    list.bubble("Click", -1).unwrap();
    assert_eq!(list.to_string(), before);
    list.bubble("Exit", 1).unwrap();
    assert_eq!(list.to_string(), before);

    list.bubble("Exit", -1).unwrap();
    assert_eq!(list.to_string(), "Ev:Event|Click|Exit|Enter|");
}

#[test]
fn test_merge_replace_and_append() {
    let mut list = ListCodec::parse("Ts:TileSize|Fixed|T:Top|").unwrap();
    let other = ListCodec::parse("Other|T:Upper|B:Bottom|Fixed|").unwrap();
    list.merge(&other).unwrap();

    assert_eq!(list.desc_of("T"), Some("Upper"));
    assert_eq!(list.desc_of("B"), Some("Bottom"));
    assert_eq!(list.id_by_name("Fixed"), Some(1));
    assert_eq!(list.count(), 3);
}

#[test]
fn test_nested_list_children() {
    let list = ListCodec::from_lines(&[
        "Tiles:All tiles",
        "/ comment",
        "",
        "Btn:Buttons|Ok|Cancel|",
        "Img:Images|Logo|",
    ])
    .unwrap();
    assert!(list.is_nested());
    assert_eq!(list.name(), "Tiles");
    assert_eq!(list.children().len(), 2);
    assert_eq!(list.child("Img").unwrap().id_by_name("Logo"), Some(1));

    let again = ListCodec::parse(&list.to_string()).unwrap();
    assert_eq!(again.children().len(), 2);
}

#[test]
fn test_persist_through_record() {
    let list = ListCodec::parse(DEFINITIONS[2]).unwrap();
    let bytes = list.to_record().encode().unwrap();
    let restored = ListCodec::from_record(&Record::decode(&bytes).unwrap()).unwrap();
    assert_eq!(restored, list);

    assert_eq!(
        ListCodec::from_record(&Record::default()).unwrap_err(),
        ListError::MissingData
    );
}

#[test]
fn test_persist_after_delimiter_change() {
    let mut list = ListCodec::parse("Ts:TileSize|Fixed|T:Top|TL:Top Left|").unwrap();
    list.set_delimiter('~').unwrap();
    assert_eq!(list.to_string(), "Ts:TileSize~Fixed~T:Top~TL:Top Left~");

    let bytes = list.to_record().encode().unwrap();
    let restored = ListCodec::from_record(&Record::decode(&bytes).unwrap()).unwrap();
    assert_eq!(restored.delimiter(), '~');
    assert_eq!(restored.desc_of("TL"), Some("Top Left"));
    assert_eq!(restored, list);
}

#[test]
fn test_registry_from_default_config() {
    let registry = ListRegistry::from_config(&Config::load_default().unwrap()).unwrap();
    let test = registry.list("Test").unwrap();
    let lang = test.entry("Lang").unwrap();
    let format = lang.format().unwrap();

    assert_eq!(format.kind(), Some(FormatKind::Member));
    assert_eq!(registry.member_list(format).unwrap().name(), "Lg");
    assert!(format.validate("Es", Some(&registry)).is_ok());

    let directory = registry.to_aggregate_list().unwrap();
    assert!(directory.id_by_name("Ev").is_some());
    assert_eq!(directory.desc_of("Lg"), Some("Language"));
}

#[test]
fn test_validate_inputs() {
    let cost = FormatSpec::parse("$");
    assert!(cost.validate("12.50", None).is_ok());
    assert!(cost.validate("12.505", None).is_err());

    let short = FormatSpec::parse("%4");
    assert!(short.validate("abcd", None).is_ok());
    assert!(short.validate("abcde", None).is_err());
}
