use doc_cleaner::{DocumentCleaner, EmptyDocumentRemover};

#[test]
fn single_object_is_rejected() {
    let cleaner = DocumentCleaner::default();
    let input = serde_json::json!({"id": "doc-1", "content": "some text"});
    let err = cleaner.run_value(&input).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("expected a list of documents"), "got: {}", msg);
    assert!(msg.contains("a single object"), "got: {}", msg);
}

#[test]
fn scalar_input_is_rejected() {
    let cleaner = DocumentCleaner::default();
    let err = cleaner.run_value(&serde_json::json!(42)).unwrap_err();
    assert!(err.to_string().contains("a number"));
}

#[test]
fn array_of_non_documents_is_rejected() {
    let cleaner = DocumentCleaner::default();
    let err = cleaner.run_value(&serde_json::json!([1, 2, 3])).unwrap_err();
    assert!(err.to_string().contains("non-document element"));
}

#[test]
fn empty_array_is_fine() {
    let cleaner = DocumentCleaner::default();
    let result = cleaner.run_value(&serde_json::json!([])).expect("clean ok");
    assert!(result.documents.is_empty());
}

#[test]
fn documents_without_an_id_get_a_content_addressed_one() {
    let cleaner = DocumentCleaner::default();
    let input = serde_json::json!([
        {"content": "Some  spaced  text", "meta": {"source": "a"}},
        {"content": "Some  spaced  text", "meta": {"source": "a"}}
    ]);
    let result = cleaner.run_value(&input).expect("clean ok");
    assert_eq!(result.documents.len(), 2);
    assert!(!result.documents[0].id.is_empty());
    assert_eq!(result.documents[0].id, result.documents[1].id);
    assert_eq!(result.documents[0].content.as_deref(), Some("Some spaced text"));
}

#[test]
fn remover_shares_the_input_gate() {
    let remover = EmptyDocumentRemover;
    let err = remover
        .run_value(&serde_json::json!({"content": "not a list"}))
        .unwrap_err();
    assert!(err.to_string().contains("expected a list of documents"));
}
