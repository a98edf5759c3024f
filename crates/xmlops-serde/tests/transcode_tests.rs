use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use xmlops_document::{NodeEditor, XmlEditor};
use xmlops_serde::{
    KnownTypes, Reflect, Result, TranscodeError, to_json_fragment, to_object, to_object_list,
    to_xml_fragment, to_xml_list_fragment,
};
use xmlops_support::ReflectError;

#[derive(Debug, Clone, PartialEq, Reflect)]
enum Status {
    Pending,
    Shipped = 5,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
struct Customer {
    name: String,
    vip: bool,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
struct Order {
    id: u64,
    total: Decimal,
    placed: DateTime<Utc>,
    note: Option<String>,
    grade: char,
    status: Status,
    customer: Customer,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
struct User {
    id: i32,
    name: String,
}

fn order(id: u64) -> Order {
    Order {
        id,
        total: dec!(12.50),
        placed: Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap(),
        note: None,
        grade: 'A',
        status: Status::Shipped,
        customer: Customer {
            name: "Ann <ann@example.com>".to_string(),
            vip: true,
        },
    }
}

#[test]
fn test_object_round_trip() -> Result<()> {
    let mut known = KnownTypes::new();
    let original = order(7);

    let xml = to_xml_fragment(&original, &mut known)?;
    assert!(xml.contains("<Status>Shipped</Status>"));
    assert!(xml.contains("<Customer><Name>\"Ann &lt;ann@example.com&gt;\"</Name>"));
    assert_eq!(known.len(), 3);

    let rebuilt: Order = to_object(&xml, &mut known)?;
    assert_eq!(rebuilt, original);
    Ok(())
}

#[test]
fn test_json_fragment_of_serialized_object() -> Result<()> {
    let mut known = KnownTypes::new();
    let xml = to_xml_fragment(&order(1), &mut known)?;
    let json = to_json_fragment::<Order>(&xml)?;

    assert!(json.starts_with(r#""Order":{"Id":1,"#));
    assert!(json.contains(r#""Note":null"#));
    assert!(json.contains(r#""Status":5"#));
    assert!(json.contains(r#""Customer":{"Name":"Ann <ann@example.com>","Vip":true}"#));
    assert!(json.ends_with("}}"));
    Ok(())
}

#[test]
fn test_reconstruction_requires_registered_nested_types() -> Result<()> {
    let xml = to_xml_fragment(&order(2), &mut KnownTypes::new())?;

    let mut fresh = KnownTypes::new();
    let result = to_object::<Order>(&xml, &mut fresh);
    assert!(matches!(
        result,
        Err(TranscodeError::Reflect(ReflectError::UnregisteredType { .. }))
    ));

    fresh.register_all::<Order>();
    let rebuilt: Order = to_object(&xml, &mut fresh)?;
    assert_eq!(rebuilt.id, 2);
    Ok(())
}

#[test]
fn test_missing_element_is_propagated() {
    let mut known = KnownTypes::new();
    let result = to_object::<User>("<User><Id>1</Id></User>", &mut known);
    assert!(matches!(result, Err(TranscodeError::MissingElement { .. })));
}

#[test]
fn test_bad_enum_text_is_propagated() {
    let mut known = KnownTypes::new();
    known.register_all::<Order>();
    let mut xml = to_xml_fragment(&order(3), &mut known).unwrap();
    xml = xml.replace("<Status>Shipped</Status>", "<Status>\"Lost\"</Status>");
    let result = to_object::<Order>(&xml, &mut known);
    assert!(matches!(
        result,
        Err(TranscodeError::Reflect(ReflectError::Member { .. }))
    ));
}

#[test]
fn test_list_round_trip_preserves_order() -> Result<()> {
    let mut known = KnownTypes::new();
    let orders = vec![order(1), order(2), order(3)];
    let xml = to_xml_list_fragment(&orders, &mut known)?;
    assert!(xml.starts_with("<OrderList>"));

    let rebuilt = to_object_list::<Order>(&xml, &mut known)?;
    assert_eq!(rebuilt, Some(orders));
    Ok(())
}

#[test]
fn test_empty_list_reports_no_list() -> Result<()> {
    let mut known = KnownTypes::new();
    let xml = to_xml_list_fragment::<User>(&[], &mut known)?;
    assert_eq!(xml, "<UserList></UserList>");

    // A present but empty wrapper is reported exactly like a missing one.
    assert_eq!(to_object_list::<User>(&xml, &mut known)?, None);
    assert_eq!(to_object_list::<User>("<Other/>", &mut known)?, None);
    Ok(())
}

#[test]
fn test_users_document_scenario() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut editor = XmlEditor::create(dir.path().join("users.xml"), "Users")?;
    editor.add_node("Users", "User", "<Id>1</Id><Name>Ann</Name>")?;

    let user = editor
        .query_single("//Users//User[Id='1']")
        .ok_or("user not found")?;
    assert!(user.inner_text().contains("Ann"));

    let json = to_json_fragment::<User>(&user.outer_xml())?;
    assert_eq!(json, r#""User":{"Id":1,"Name":Ann}"#);

    // Unquoted string leaves are not valid JSON, so they cannot be rebuilt.
    let mut known = KnownTypes::new();
    let result = to_object::<User>(&user.outer_xml(), &mut known);
    assert!(matches!(result, Err(TranscodeError::Json(_))));
    Ok(())
}

#[test]
fn test_objects_stored_in_a_document_round_trip() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let mut editor = XmlEditor::create(dir.path().join("users.xml"), "Users")?;
    let mut known = KnownTypes::new();

    let ann = User {
        id: 1,
        name: "Ann".to_string(),
    };
    editor.add_fragment("Users", &to_xml_fragment(&ann, &mut known)?)?;

    let node = editor
        .query_single(r#"//Users//User[Name='"Ann"']"#)
        .ok_or("user not found")?;
    let rebuilt: User = to_object(&node.outer_xml(), &mut known)?;
    assert_eq!(rebuilt, ann);
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Reflect)]
struct Wide {
    big: u128,
    small: i128,
    limit: Option<u64>,
}

#[test]
fn test_wide_integers_round_trip() -> Result<()> {
    let mut known = KnownTypes::new();
    let original = Wide {
        big: u128::MAX,
        small: i128::MIN,
        limit: Some(u64::MAX),
    };

    let xml = to_xml_fragment(&original, &mut known)?;
    assert!(xml.contains(&format!("<Big>{}</Big>", u128::MAX)));

    let rebuilt: Wide = to_object(&xml, &mut known)?;
    assert_eq!(rebuilt, original);
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Reflect)]
struct Point {
    x: i32,
}

#[derive(Debug, Clone, PartialEq, Reflect)]
struct Segment {
    from: Point,
    to: Point,
}

#[test]
fn test_members_sharing_an_element_are_rejected() {
    let mut known = KnownTypes::new();
    let segment = Segment {
        from: Point { x: 1 },
        to: Point { x: 2 },
    };
    assert!(matches!(
        to_xml_fragment(&segment, &mut known),
        Err(TranscodeError::Reflect(ReflectError::DuplicateElement {
            type_name: "Segment",
            element: "Point"
        }))
    ));

    known.register_all::<Segment>();
    let xml = "<Segment><Point><X>1</X></Point><Point><X>2</X></Point></Segment>";
    assert!(matches!(
        to_object::<Segment>(xml, &mut known),
        Err(TranscodeError::Reflect(ReflectError::DuplicateElement { .. }))
    ));
    assert!(to_json_fragment::<Segment>(xml).is_err());
}

#[derive(Debug, Clone, PartialEq, Reflect)]
struct Reading {
    value: f64,
    spare: Option<f32>,
}

#[test]
fn test_non_finite_floats_are_rejected() -> Result<()> {
    let mut known = KnownTypes::new();
    let result = to_xml_fragment(
        &Reading {
            value: f64::INFINITY,
            spare: None,
        },
        &mut known,
    );
    assert!(matches!(
        result,
        Err(TranscodeError::Reflect(ReflectError::Member { member: "Value", .. }))
    ));

    let result = to_xml_fragment(
        &Reading {
            value: 1.0,
            spare: Some(f32::NAN),
        },
        &mut known,
    );
    assert!(matches!(
        result,
        Err(TranscodeError::Reflect(ReflectError::Member { member: "Spare", .. }))
    ));

    let finite = Reading {
        value: -2.5,
        spare: Some(0.25),
    };
    let xml = to_xml_fragment(&finite, &mut known)?;
    assert_eq!(to_object::<Reading>(&xml, &mut known)?, finite);
    Ok(())
}

#[test]
fn test_foreign_list_item_is_an_error() -> Result<()> {
    let mut known = KnownTypes::new();
    let result = to_object_list::<Point>(
        "<PointList><Point><X>1</X></Point><Other><X>5</X></Other></PointList>",
        &mut known,
    );
    assert!(matches!(
        result,
        Err(TranscodeError::MissingElement { ref element, ref parent })
            if element == "Point" && parent == "PointList"
    ));

    let points = to_object_list::<Point>("<PointList><Point><X>1</X></Point></PointList>", &mut known)?;
    assert_eq!(points, Some(vec![Point { x: 1 }]));
    Ok(())
}
