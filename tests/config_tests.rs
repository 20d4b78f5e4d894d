use std::sync::Arc;

use doc_cleaner::{
    register_id_generator, CleanerConfig, CleanerParams, ConfigError, Document, DocumentCleaner,
    IdGenerator, CLEANER_TYPE, DEFAULT_ID_GENERATOR, KEEP_ID,
};

#[test]
fn default_config_lists_all_parameters() {
    let cleaner = DocumentCleaner::default();
    let config = cleaner.to_config();
    assert_eq!(config.type_name, CLEANER_TYPE);
    assert!(config.init_parameters.remove_empty_lines);
    assert!(config.init_parameters.remove_extra_whitespaces);
    assert!(!config.init_parameters.remove_repeated_substrings);
    assert_eq!(config.init_parameters.remove_substrings, None);
    assert_eq!(config.init_parameters.remove_regex, None);
    assert_eq!(config.init_parameters.id_generator, DEFAULT_ID_GENERATOR);

    let as_json = serde_json::to_value(&config).expect("serialize ok");
    assert_eq!(as_json["type"], "doc_cleaner.DocumentCleaner");
    assert_eq!(
        as_json["init_parameters"]["id_generator"],
        "doc_cleaner.default_id_generator"
    );
}

#[test]
fn config_round_trips_with_keep_id_generator() {
    let cleaner = DocumentCleaner {
        remove_empty_lines: false,
        remove_extra_whitespaces: false,
        remove_repeated_substrings: true,
        remove_substrings: Some(vec!["random".to_string()]),
        remove_regex: Some("(.*)".to_string()),
        id_generator: IdGenerator::keep(),
    };
    let config = cleaner.to_config();
    assert_eq!(config.init_parameters.id_generator, KEEP_ID);

    let restored = DocumentCleaner::from_config(&config).expect("restore ok");
    assert!(!restored.remove_empty_lines);
    assert!(!restored.remove_extra_whitespaces);
    assert!(restored.remove_repeated_substrings);
    assert_eq!(restored.remove_substrings, Some(vec!["random".to_string()]));
    assert_eq!(restored.remove_regex, Some("(.*)".to_string()));
    assert_eq!(restored.id_generator.name(), KEEP_ID);

    // the restored generator behaves like keep_id
    let doc = Document::new("Text. ");
    let result = restored.run(std::slice::from_ref(&doc)).expect("clean ok");
    assert_eq!(result.documents[0].id, doc.id);
}

#[test]
fn registered_generator_survives_the_round_trip() {
    register_id_generator(
        "tests.suffixed_id",
        Arc::new(|old: &Document, _new: &Document| format!("{}-suffixed", old.id)),
    );
    let params = CleanerParams {
        id_generator: "tests.suffixed_id".to_string(),
        ..Default::default()
    };
    let cleaner = DocumentCleaner::from_params(&params).expect("resolve ok");
    assert_eq!(cleaner.id_generator.name(), "tests.suffixed_id");

    let doc = Document::new("Text. ");
    let result = cleaner.run(std::slice::from_ref(&doc)).expect("clean ok");
    assert_eq!(result.documents[0].id, format!("{}-suffixed", doc.id));
}

#[test]
fn anonymous_generator_serializes_as_marker_and_cannot_be_restored() {
    let cleaner = DocumentCleaner {
        id_generator: IdGenerator::custom(Arc::new(|old: &Document, _new: &Document| {
            old.id.clone()
        })),
        ..Default::default()
    };
    let config = cleaner.to_config();
    assert_eq!(config.init_parameters.id_generator, "<anonymous>");

    let err = DocumentCleaner::from_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::AnonymousIdGenerator));
}

#[test]
fn unknown_generator_name_fails_descriptively() {
    let params = CleanerParams {
        id_generator: "no.such.generator".to_string(),
        ..Default::default()
    };
    let err = DocumentCleaner::from_params(&params).unwrap_err();
    assert!(err.to_string().contains("no.such.generator"));
}

#[test]
fn wrong_component_type_is_rejected() {
    let config = CleanerConfig {
        type_name: "doc_cleaner.SomethingElse".to_string(),
        init_parameters: CleanerParams::default(),
    };
    let err = DocumentCleaner::from_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::WrongType { .. }));
    assert!(err.to_string().contains(CLEANER_TYPE));
}

#[test]
fn invalid_regex_in_params_is_rejected() {
    let params = CleanerParams { remove_regex: Some("(".to_string()), ..Default::default() };
    let err = DocumentCleaner::from_params(&params).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidRegex(_)));
}

#[test]
fn params_deserialize_with_defaults_for_omitted_fields() {
    let params: CleanerParams = serde_json::from_str("{}").expect("parse ok");
    assert_eq!(params, CleanerParams::default());
    assert_eq!(params.id_generator, DEFAULT_ID_GENERATOR);
}
