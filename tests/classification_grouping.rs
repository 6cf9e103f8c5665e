use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradesd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradesd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn grouped_classifications_follow_input_order() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let begin = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "classification.refreshBegin",
        json!({ "courseCode": "BI-PPA" }),
    );
    let snapshot_id = begin
        .get("snapshotId")
        .and_then(|v| v.as_str())
        .expect("snapshotId")
        .to_string();

    let commit = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "classification.refreshCommit",
        json!({
            "courseCode": "BI-PPA",
            "snapshotId": snapshot_id,
            "classifications": [
                { "id": 10, "parentId": null, "type": "HOMEWORK", "name": "Homework" },
                { "id": 20, "parentId": null, "type": "EXAM", "name": "Exam" },
                // Child listed before its own parent record appears below.
                { "id": 13, "parentId": 11, "type": "SUB", "value": 2.5 },
                { "id": 11, "parentId": 10, "type": "SUB", "value": 5 },
                { "id": 21, "parentId": 20, "type": "SUB", "value": "B" },
                { "id": 30, "parentId": null, "type": "POINTS_TOTAL", "name": "Total", "value": 42 }
            ]
        }),
    );
    assert_eq!(commit.get("committed").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        commit.get("finalValue").and_then(|v| v.as_f64()),
        Some(42.0)
    );

    let groups = commit.get("groups").and_then(|v| v.as_array()).expect("groups");
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].get("id").and_then(|v| v.as_i64()), Some(10));
    assert_eq!(
        groups[0].get("header").and_then(|v| v.as_str()),
        Some("Homework")
    );
    assert_eq!(groups[1].get("id").and_then(|v| v.as_i64()), Some(20));
    assert_eq!(groups[2].get("id").and_then(|v| v.as_i64()), Some(30));

    // Deep child 13 rolled up into the Homework root, input order kept.
    let hw_items: Vec<i64> = groups[0]
        .get("items")
        .and_then(|v| v.as_array())
        .expect("items")
        .iter()
        .map(|i| i.get("id").and_then(|v| v.as_i64()).expect("item id"))
        .collect();
    assert_eq!(hw_items, vec![13, 11]);

    // POINTS_TOTAL root has no descendants but still gets a group.
    assert_eq!(
        groups[2]
            .get("items")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0)
    );

    let summary = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "classification.summary",
        json!({ "courseCode": "BI-PPA" }),
    );
    assert_eq!(summary.get("groupCount").and_then(|v| v.as_u64()), Some(3));
    assert_eq!(summary.get("itemCount").and_then(|v| v.as_u64()), Some(3));
    assert_eq!(summary.get("recordCount").and_then(|v| v.as_u64()), Some(6));
    assert_eq!(summary.get("finalValue").and_then(|v| v.as_f64()), Some(42.0));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn empty_course_is_valid_and_empty() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let begin = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "classification.refreshBegin",
        json!({ "courseCode": "BI-ZMA" }),
    );
    let snapshot_id = begin.get("snapshotId").and_then(|v| v.as_str()).unwrap().to_string();

    let commit = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "classification.refreshCommit",
        json!({
            "courseCode": "BI-ZMA",
            "snapshotId": snapshot_id,
            "classifications": []
        }),
    );
    assert_eq!(commit.get("committed").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        commit.get("groups").and_then(|v| v.as_array()).map(|a| a.len()),
        Some(0)
    );
    assert!(commit.get("finalValue").map(|v| v.is_null()).unwrap_or(true));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn numeric_input_parses_with_comma_separator() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let parsed = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "value.parseNumber",
        json!({ "text": "3,5" }),
    );
    assert_eq!(parsed.get("value").and_then(|v| v.as_f64()), Some(3.5));

    let unresolved = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "value.parseNumber",
        json!({ "text": "abc" }),
    );
    assert!(unresolved.get("value").map(|v| v.is_null()).unwrap_or(false));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn final_score_is_fallback_when_no_points_total() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let begin = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "classification.refreshBegin",
        json!({ "courseCode": "BI-PST" }),
    );
    let snapshot_id = begin.get("snapshotId").and_then(|v| v.as_str()).unwrap().to_string();

    let commit = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "classification.refreshCommit",
        json!({
            "courseCode": "BI-PST",
            "snapshotId": snapshot_id,
            "classifications": [
                { "id": 1, "parentId": null, "type": "FINAL_SCORE", "value": "C" }
            ]
        }),
    );
    assert_eq!(
        commit.get("finalValue").and_then(|v| v.as_str()),
        Some("C")
    );

    drop(stdin);
    let _ = child.wait();
}
