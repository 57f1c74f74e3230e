use super::*;

#[test]
fn lifecycle_errors_map_to_statuses() {
    assert_eq!(
        lifecycle_error_to_status(&lifecycle::LifecycleError::EmptyText),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        lifecycle_error_to_status(&lifecycle::LifecycleError::MissingUser),
        StatusCode::UNAUTHORIZED
    );
}

#[test]
fn delete_query_defaults_to_unconfirmed() {
    let query: DeleteQuery = serde_json::from_str("{}").unwrap();
    assert!(!query.confirm);

    let query: DeleteQuery = serde_json::from_str(r#"{"confirm": true}"#).unwrap();
    assert!(query.confirm);
}

#[test]
fn create_body_defaults_color_to_yellow() {
    let body: CreateNoteBody = serde_json::from_str(r#"{"text": "hi"}"#).unwrap();
    assert_eq!(body.color, NoteColor::Yellow);

    let body: CreateNoteBody = serde_json::from_str(r##"{"text": "hi", "color": "#bbf7d0"}"##).unwrap();
    assert_eq!(body.color, NoteColor::Green);
}
