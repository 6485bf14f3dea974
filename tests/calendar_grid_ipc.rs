use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_maktabd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn maktabd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
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
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn grid(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    year: i32,
    month: u32,
) -> serde_json::Value {
    request_ok(
        stdin,
        reader,
        id,
        "calendar.monthGrid",
        json!({ "year": year, "month": month }),
    )
}

#[test]
fn grid_renders_whole_weeks_with_correct_shape() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    // January 2025: 31 days, starts on a Wednesday.
    let result = grid(&mut stdin, &mut reader, "1", 2025, 1);
    assert_eq!(result.get("daysInMonth").and_then(|v| v.as_u64()), Some(31));
    assert_eq!(result.get("firstWeekday").and_then(|v| v.as_u64()), Some(3));

    let cells = result.get("cells").and_then(|v| v.as_array()).expect("cells");
    assert_eq!(cells.len() % 7, 0);
    assert!(cells.len() >= 3 + 31);
    assert!(cells[0].is_null() && cells[1].is_null() && cells[2].is_null());
    assert_eq!(
        cells[3].get("day").and_then(|v| v.as_u64()),
        Some(1),
        "first real cell is day 1"
    );
    let populated = cells.iter().filter(|c| !c.is_null()).count();
    assert_eq!(populated, 31);
    assert!(cells.last().map(|c| c.is_null()).unwrap_or(false));
}

#[test]
fn february_grid_respects_leap_years() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let leap = grid(&mut stdin, &mut reader, "1", 2024, 2);
    assert_eq!(leap.get("daysInMonth").and_then(|v| v.as_u64()), Some(29));
    let common = grid(&mut stdin, &mut reader, "2", 2023, 2);
    assert_eq!(common.get("daysInMonth").and_then(|v| v.as_u64()), Some(28));
}

#[test]
fn events_group_onto_their_day_and_truncate_past_two() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    for i in 0..4 {
        let _ = request_ok(
            &mut stdin,
            &mut reader,
            &format!("e{}", i),
            "events.create",
            json!({ "title": format!("Event {}", i), "date": "2025-06-15" }),
        );
    }
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "other",
        "events.create",
        json!({ "title": "July event", "date": "2025-07-01" }),
    );

    let result = grid(&mut stdin, &mut reader, "g", 2025, 6);
    let cells = result.get("cells").and_then(|v| v.as_array()).expect("cells");

    let day15 = cells
        .iter()
        .find(|c| c.get("day").and_then(|v| v.as_u64()) == Some(15))
        .expect("day 15 cell");
    let shown = day15.get("events").and_then(|v| v.as_array()).expect("events");
    assert_eq!(shown.len(), 2);
    assert_eq!(
        shown[0].get("title").and_then(|v| v.as_str()),
        Some("Event 0")
    );
    assert_eq!(day15.get("moreCount").and_then(|v| v.as_u64()), Some(2));

    let day16 = cells
        .iter()
        .find(|c| c.get("day").and_then(|v| v.as_u64()) == Some(16))
        .expect("day 16 cell");
    assert_eq!(
        day16
            .get("events")
            .and_then(|v| v.as_array())
            .map(|a| a.len()),
        Some(0)
    );
    assert_eq!(day16.get("moreCount").and_then(|v| v.as_u64()), Some(0));

    // The July event only shows up in July.
    let july = grid(&mut stdin, &mut reader, "g2", 2025, 7);
    let july_cells = july.get("cells").and_then(|v| v.as_array()).expect("cells");
    let total_events: usize = july_cells
        .iter()
        .filter(|c| !c.is_null())
        .filter_map(|c| c.get("events").and_then(|v| v.as_array()).map(|a| a.len()))
        .sum();
    assert_eq!(total_events, 1);
}

#[test]
fn month_outside_range_is_rejected() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "calendar.monthGrid",
        json!({ "year": 2025, "month": 13 }),
    );
    assert_eq!(resp.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        resp.get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("bad_params")
    );
}

#[test]
fn deleted_events_leave_the_grid() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "events.create",
        json!({ "title": "Exam", "date": "2025-03-12" }),
    );
    let event_id = created
        .get("eventId")
        .and_then(|v| v.as_str())
        .expect("eventId")
        .to_string();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "events.delete",
        json!({ "eventId": event_id }),
    );

    let result = grid(&mut stdin, &mut reader, "3", 2025, 3);
    let cells = result.get("cells").and_then(|v| v.as_array()).expect("cells");
    let total_events: usize = cells
        .iter()
        .filter(|c| !c.is_null())
        .filter_map(|c| c.get("events").and_then(|v| v.as_array()).map(|a| a.len()))
        .sum();
    assert_eq!(total_events, 0);
}
