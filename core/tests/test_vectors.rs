//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes the resource, the expected request, a simulated
//! response and either the normalized result or the error message a caller
//! would see. Bodies are compared as parsed JSON so key order never matters.

use crm_core::{HttpMethod, HttpRequest, HttpResponse, Record, Resource, ResourceClient, WriteOutcome};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:5026";
const TOKEN: Option<&str> = Some("tok");

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn client_for(case: &Value) -> ResourceClient {
    let resource: Resource = case["resource"].as_str().unwrap().parse().unwrap();
    ResourceClient::new(BASE_URL, resource)
}

fn input_id(case: &Value) -> i64 {
    case["input_id"].as_i64().unwrap()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let pair = h.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(sim["status"].as_u64().unwrap() as u16, sim["body"].as_str().unwrap())
}

fn record(value: &Value) -> Record {
    serde_json::from_value(value.clone()).unwrap()
}

fn assert_write(name: &str, case: &Value, result: Result<WriteOutcome, crm_core::ApiError>) {
    if let Some(expected) = case.get("expected_error") {
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), expected.as_str().unwrap(), "{name}: error");
        return;
    }
    let outcome = result.unwrap();
    assert_eq!(outcome.message, case["expected_message"].as_str().unwrap(), "{name}: message");
    let expected = match &case["expected_result"] {
        Value::Null => None,
        value => Some(record(value)),
    };
    assert_eq!(outcome.record, expected, "{name}: record");
}

#[test]
fn list_test_vectors() {
    for case in load(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case);

        let req = c.build_list(TOKEN).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_list(simulated(&case));
        match case.get("expected_error") {
            Some(expected) => {
                assert_eq!(result.unwrap_err().to_string(), expected.as_str().unwrap(), "{name}: error")
            }
            None => {
                let expected: Vec<Record> = serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(result.unwrap(), expected, "{name}: records");
            }
        }
    }
}

#[test]
fn get_test_vectors() {
    for case in load(include_str!("../../test-vectors/get.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case);
        let id = input_id(&case);

        let req = c.build_get(TOKEN, id).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_get(id, simulated(&case));
        match case.get("expected_error") {
            Some(expected) => {
                assert_eq!(result.unwrap_err().to_string(), expected.as_str().unwrap(), "{name}: error")
            }
            None => assert_eq!(result.unwrap(), record(&case["expected_result"]), "{name}: record"),
        }
    }
}

#[test]
fn create_test_vectors() {
    for case in load(include_str!("../../test-vectors/create.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case);

        let req = c.build_create(TOKEN, &record(&case["input"])).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        assert_write(name, &case, c.parse_create(simulated(&case)));
    }
}

#[test]
fn update_test_vectors() {
    for case in load(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case);

        let req = c.build_update(TOKEN, input_id(&case), &record(&case["input"])).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        assert_write(name, &case, c.parse_update(simulated(&case)));
    }
}

#[test]
fn delete_test_vectors() {
    for case in load(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let c = client_for(&case);

        let req = c.build_delete(TOKEN, input_id(&case)).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete(simulated(&case));
        match case.get("expected_error") {
            Some(expected) => {
                assert_eq!(result.unwrap_err().to_string(), expected.as_str().unwrap(), "{name}: error")
            }
            None => assert_eq!(
                result.unwrap().message,
                case["expected_message"].as_str().unwrap(),
                "{name}: message"
            ),
        }
    }
}
