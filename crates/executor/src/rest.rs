//! REST verb mapping
//!
//! Maps an HTTP-style request onto a [`Command`] without depending on any
//! HTTP library. Paths look like `/v1/<service>/<catalog>[/...]`; only the
//! third segment is used.
//!
//! | Verb | Query | Command |
//! |------|-------|---------|
//! | GET | `_id` | `FindRecord` |
//! | GET | `q` | `QueryCatalog` |
//! | GET | none | `GetCatalog` |
//! | POST | | `InsertRecord` (body required) |
//! | PUT | | `UpdateRecord` (body required) |
//! | DELETE | `_id` | `DeleteRecord` |
//! | DELETE | none | `DeleteCatalog` |
//! | DELETE | other params | nothing |
//!
//! A DELETE with parameters but no `_id` is ignored.

use serde_json::json;
use tracing::debug;

use crate::{Command, Error, Executor, Output, Result, Value};

/// Transport-neutral response
#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    /// HTTP status code
    pub status: u16,
    /// JSON body: `{"statusCode": .., "result": ..}`, `result` omitted when empty
    pub body: serde_json::Value,
}

impl RestResponse {
    fn new(status: u16, result: Option<serde_json::Value>) -> Self {
        let mut body = json!({ "statusCode": status });
        if let (Some(result), Some(obj)) = (result, body.as_object_mut()) {
            obj.insert("result".to_string(), result);
        }
        RestResponse { status, body }
    }

    fn from_error(err: &Error) -> Self {
        Self::new(err.status_code(), Some(json!({ "reason": err.to_string() })))
    }
}

/// Map a request to the command it stands for
///
/// Returns `Ok(None)` for requests that are accepted but do nothing.
///
/// # Errors
///
/// `InvalidInput` for a short path or a missing/malformed body,
/// `MethodNotImplemented` for verbs other than GET, POST, PUT and DELETE.
pub fn route(verb: &str, path: &str, query: &str, body: Option<&str>) -> Result<Option<Command>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 3 {
        return Err(Error::invalid_input(format!("invalid request path '{}'", path)));
    }
    let catalog = percent_decode(segments[2]);
    let params = parse_query(query);
    let param = |key: &str| {
        params
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.clone())
    };

    let command = match verb {
        "GET" => match (param("_id"), param("q")) {
            (Some(id), _) => Command::FindRecord { catalog, id },
            (None, Some(filter)) => Command::QueryCatalog { catalog, filter },
            (None, None) => Command::GetCatalog { catalog },
        },
        "POST" => {
            let document = parse_body(body)
                .filter(Value::is_object)
                .ok_or_else(|| Error::invalid_input("Missing document body"))?;
            Command::InsertRecord { catalog, document }
        }
        "PUT" => {
            let document =
                parse_body(body).ok_or_else(|| Error::invalid_input("Invalid JSON data?"))?;
            Command::UpdateRecord { catalog, document }
        }
        "DELETE" => match param("_id") {
            Some(id) => Command::DeleteRecord { catalog, id },
            None if params.is_empty() => Command::DeleteCatalog { catalog },
            None => {
                debug!(target: "catalogdb::executor", %catalog, query, "DELETE without _id ignored");
                return Ok(None);
            }
        },
        other => {
            return Err(Error::MethodNotImplemented {
                method: other.to_string(),
            })
        }
    };
    Ok(Some(command))
}

/// Route and execute a request
pub fn handle(
    executor: &Executor,
    verb: &str,
    path: &str,
    query: &str,
    body: Option<&str>,
) -> RestResponse {
    let command = match route(verb, path, query, body) {
        Ok(Some(command)) => command,
        Ok(None) => return RestResponse::new(200, None),
        Err(e) => return RestResponse::from_error(&e),
    };
    match executor.execute(command) {
        Ok(output) => respond(output),
        Err(e) => RestResponse::from_error(&e),
    }
}

fn respond(output: Output) -> RestResponse {
    let ok = |result: Option<serde_json::Value>| RestResponse::new(200, result);
    match output {
        Output::Unit | Output::Bool(_) => ok(None),
        Output::Pong { version } => ok(Some(json!({ "version": version }))),
        Output::Records(records) => ok(records.map(|r| Value::Array(r).into())),
        Output::MaybeRecord(record) => ok(record.map(Into::into)),
        Output::Query(outcome) => ok(serde_json::to_value(outcome).ok()),
        Output::Inserted { id } => RestResponse::new(201, Some(json!({ "_id": id }))),
        Output::Catalogs(names) => ok(Some(json!(names))),
        Output::Saved { catalogs } => ok(Some(json!({ "catalogs": catalogs }))),
    }
}

fn parse_body(body: Option<&str>) -> Option<Value> {
    let text = body?.trim();
    if text.is_empty() {
        return None;
    }
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .map(Value::from)
}

/// Split a query string into decoded key/value pairs
///
/// `+` decodes to a space and `%XX` to its byte; malformed escapes are kept
/// literally. A key without `=` gets an empty value.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(k), percent_decode(v))
        })
        .collect()
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => match bytes.get(i + 1..i + 3).and_then(|h| hex_pair(h[0], h[1])) {
                Some(b) => {
                    out.push(b);
                    i += 2;
                }
                None => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_pair(hi: u8, lo: u8) -> Option<u8> {
    let hex = |c: u8| (c as char).to_digit(16);
    Some((hex(hi)? * 16 + hex(lo)?) as u8)
}
