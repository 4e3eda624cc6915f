use cool_asserts::assert_matches;
use serde_json::json;

use super::*;

fn request(title: &str, numbers: serde_json::Value) -> CreateAssignmentRequest {
    serde_json::from_value(json!({
        "title": title,
        "description": "",
        "numbers": numbers,
    }))
    .unwrap()
}

#[test]
fn owner_id_should_not_be_blank() {
    assert!(OwnerId::parse("").is_err());
    assert!(OwnerId::parse("  ").is_err());
    assert_eq!(OwnerId::parse("user-1").unwrap().as_ref(), "user-1");
}

#[test]
fn it_should_validate_a_request() {
    let new = NewAssignment::validate(request(" Week 1 ", json!(["dp10", 2, " DP0003 "]))).unwrap();

    assert_eq!(new.title(), "Week 1");
    assert_eq!(new.description(), None);
    let numbers: Vec<String> = new.numbers().iter().map(ToString::to_string).collect();
    assert_eq!(numbers, ["DP0010", "DP0002", "DP0003"]);
}

#[test]
fn title_is_checked_before_numbers() {
    assert_matches!(
        NewAssignment::validate(request("", json!([]))),
        Err(AssignmentErr::EmptyTitle)
    );
    assert_matches!(
        NewAssignment::validate(CreateAssignmentRequest {
            title: Some("t".to_string()),
            ..Default::default()
        }),
        Err(AssignmentErr::EmptyBatch)
    );
}

#[test]
fn assignment_should_serialize_camel_case() {
    let owner = OwnerId::parse("user-1").unwrap();
    let assignment = NewAssignment::validate(CreateAssignmentRequest {
        title: Some("t".to_string()),
        description: Some("d".to_string()),
        numbers: Some(vec!["12".into()]),
    })
    .unwrap()
    .into_assignment(owner);

    let value = serde_json::to_value(&assignment).unwrap();
    assert_eq!(value["createdBy"], "user-1");
    assert_eq!(value["numbers"], json!(["DP0012"]));
    assert_eq!(value["description"], "d");
    assert!(value.get("createdAt").is_some());

    let back: Assignment = serde_json::from_value(value).unwrap();
    assert_eq!(back, assignment);
}

#[test]
fn errors_should_name_the_numbers() {
    let numbers = vec![
        DpNumber::from_value(2).unwrap(),
        DpNumber::from_value(10).unwrap(),
    ];
    assert_eq!(
        AssignmentErr::CrossRecordDuplicate(numbers.clone()).to_string(),
        "DP numbers already assigned: DP0002, DP0010"
    );
    assert_eq!(
        AssignmentErr::from(RepoErr::NumbersTaken(numbers)).to_string(),
        "DP numbers already assigned: DP0002, DP0010"
    );
    assert_matches!(
        AssignmentErr::from(RepoErr::StorageLayerError(anyhow::anyhow!("boom"))),
        AssignmentErr::StorageUnavailable(_)
    );
}
