use std::error::Error;
use std::fs;
use std::io::Cursor;

use xmlops_document::{EditError, NodeEditor, StreamStore, XmlEditor};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn test_users_scenario() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("users.xml");

    let mut editor = XmlEditor::create(&path, "Users")?;
    editor.add_node("Users", "User", "<Id>1</Id><Name>Ann</Name>")?;

    let user = editor
        .query_single("//Users//User[Id='1']")
        .ok_or("user not found")?;
    assert!(user.inner_text().contains("Ann"));
    assert_eq!(user.inner_xml(), "<Id>1</Id><Name>Ann</Name>");

    let written = fs::read_to_string(&path)?;
    assert!(written.starts_with(r#"<?xml version="1.0" encoding="gb2312"?>"#));
    assert!(written.contains("<Name>Ann</Name>"));
    Ok(())
}

#[test]
fn test_reopen_sees_persisted_changes() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("users.xml");

    {
        let mut editor = XmlEditor::open_or_create(&path, "Users")?;
        editor.add_node("Users", "User", "<Id>1</Id><Name>Ann</Name>")?;
        editor.add_fragment("Users", "<User><Id>2</Id><Name>Bob</Name></User>")?;
    }

    let editor = XmlEditor::open_or_create(&path, "Ignored")?;
    let root = editor.document().root().ok_or("no root")?;
    assert_eq!(root.name(), "Users");
    assert_eq!(editor.query_children("Users").len(), 2);
    let bob = editor.query_single("//Users//User[Name='Bob']").ok_or("bob")?;
    assert_eq!(bob.inner_text(), "2Bob");
    Ok(())
}

#[test]
fn test_open_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = XmlEditor::open(dir.path().join("missing.xml"));
    assert!(matches!(result, Err(EditError::Io(_))));
}

#[test]
fn test_open_or_create_replaces_invalid_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.xml");
    fs::write(&path, "not xml at all <")?;

    let editor = XmlEditor::open_or_create(&path, "Root")?;
    assert_eq!(editor.document().root().map(|r| r.name()), Some("Root"));
    Ok(())
}

#[test]
fn test_query_missing_path_is_absent() -> TestResult {
    let dir = tempfile::tempdir()?;
    let editor = XmlEditor::create(dir.path().join("a.xml"), "Users")?;
    assert!(editor.query_single("//Users//User[Id='42']").is_none());
    assert!(editor.query_single("Nothing").is_none());
    Ok(())
}

#[test]
fn test_failed_add_leaves_document_unchanged() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("users.xml");
    let mut editor = XmlEditor::create(&path, "Users")?;
    editor.add_node("Users", "User", "<Id>1</Id>")?;

    let before_tree = editor.document().to_xml_string()?;
    let before_file = fs::read_to_string(&path)?;

    let result = editor.add_node("//Missing", "User", "<Id>2</Id>");
    assert!(matches!(result, Err(EditError::Unresolved { .. })));

    let result = editor.add_node("Users", "User", "<Id>2</Id><Broken>");
    assert!(matches!(result, Err(EditError::Parse(_))));

    assert_eq!(editor.document().to_xml_string()?, before_tree);
    assert_eq!(fs::read_to_string(&path)?, before_file);
    Ok(())
}

#[test]
fn test_delete_requires_parent_child_relation() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut editor = XmlEditor::create(dir.path().join("d.xml"), "Users")?;
    editor.add_node("Users", "User", "<Id>1</Id><Name>Ann</Name>")?;

    let result = editor.delete_node("Users", "//Users//User/Id");
    assert!(matches!(result, Err(EditError::NotAChild { .. })));

    editor.delete_node("Users", "//Users//User[Id='1']")?;
    assert!(editor.query_children("Users").is_empty());
    Ok(())
}

#[test]
fn test_modify_replaces_inner_content() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut editor = XmlEditor::create(dir.path().join("m.xml"), "Users")?;
    editor.add_node("Users", "User", "<Id>1</Id><Name>Ann</Name>")?;

    editor.modify_node("//Users//User[Id='1']", "<Id>1</Id><Name>Anna</Name>")?;
    let user = editor.query_single("//Users//User[Id='1']").ok_or("user")?;
    assert_eq!(user.inner_text(), "1Anna");
    Ok(())
}

#[test]
fn test_replace_appends_at_end_of_parent() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut editor = XmlEditor::create(dir.path().join("r.xml"), "Users")?;
    editor.add_node("Users", "User", "<Id>1</Id>")?;
    editor.add_node("Users", "User", "<Id>2</Id>")?;

    editor.replace_node("//Users//User[Id='1']", "<User><Id>10</Id></User>")?;

    let ids: Vec<String> = editor
        .query_children("Users")
        .into_iter()
        .map(|n| n.inner_text())
        .collect();
    assert_eq!(ids, vec!["2", "10"]);
    Ok(())
}

#[test]
fn test_stream_backed_editor_rewrites_stream() -> TestResult {
    let stream = Cursor::new(b"<Users><User><Id>1</Id></User></Users>".to_vec());
    let mut editor = XmlEditor::from_stream(stream)?;
    editor.delete_node("Users", "//Users//User[Id='1']")?;

    let bytes = editor.into_stream().into_inner();
    let text = String::from_utf8(bytes)?;
    assert!(text.contains("<Users/>"));
    assert!(!text.contains("User>"));
    Ok(())
}

#[test]
fn test_stream_borrowed_from_caller() -> TestResult {
    let mut buffer = Cursor::new(b"<Users/>".to_vec());
    {
        let mut editor = XmlEditor::load(StreamStore::new(&mut buffer))?;
        editor.add_node("Users", "User", "<Id>7</Id>")?;
    }
    let text = String::from_utf8(buffer.into_inner())?;
    assert!(text.contains("<Id>7</Id>"));
    Ok(())
}
