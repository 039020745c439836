//! Client and server exchanging text in-process

use jrpc_client::Client;
use jrpc_core::{params, Binary, Error, Fault, FaultKind, Value};
use jrpc_server::Server;
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn server() -> Server {
    Server::builder()
        .method("add", |a: i32, b: i32| a + b)
        .method("concat", |a: String, b: String| a + &b)
        .method("reverse", |data: Binary| {
            let mut bytes = data.into_inner();
            bytes.reverse();
            Binary::new(bytes)
        })
        .method("describe", |members: BTreeMap<String, Value>| {
            members
                .into_iter()
                .map(|(key, value)| format!("{}={}", key, value))
                .collect::<Vec<_>>()
        })
        .method("log", |_line: String| {})
        .alias("concat", "greet", params!["hello "])
        .build()
        .unwrap()
}

#[test]
fn test_call_round_trip() {
    let server = server();
    let client = Client::new();

    let reply = server.handle_request(&client.build_request("add", params![3, 2]));
    assert_eq!(client.parse_result::<i32>(&reply).unwrap(), 5);

    let reply = server.handle_request(&client.build_request("greet", params!["world"]));
    assert_eq!(client.parse_result::<String>(&reply).unwrap(), "hello world");
}

#[test]
fn test_reply_ids_follow_client_counter() {
    let server = server();
    let client = Client::new();

    for expected in 0..3i64 {
        let reply = server.handle_request(&client.build_request("add", params![1, 1]));
        let response = client.parse_response(&reply).unwrap();
        assert_eq!(Value::from(response.id().clone()), Value::Integer32(expected as i32));
    }
}

#[test]
fn test_binary_round_trip() {
    let server = server();
    let client = Client::new();

    let reply = server.handle_request(
        &client.build_request("reverse", params![Binary::new(b"abc".to_vec())]),
    );
    let reversed: Binary = client.parse_result(&reply).unwrap();
    assert_eq!(reversed.as_bytes(), b"cba");
}

#[test]
fn test_struct_parameters() {
    let server = server();
    let client = Client::new();

    let mut members = BTreeMap::new();
    members.insert("a".to_string(), 1);
    members.insert("b".to_string(), 2);

    let reply = server.handle_request(&client.build_request("describe", params![members]));
    let described: Vec<String> = client.parse_result(&reply).unwrap();
    assert_eq!(described, vec!["a=1", "b=2"]);
}

#[test]
fn test_faults_reach_the_caller() {
    let server = server();
    let client = Client::new();

    let reply = server.handle_request(&client.build_request("missing", params![]));
    match client.parse_response(&reply) {
        Err(Error::Fault(fault)) => {
            assert_eq!(fault.kind(), FaultKind::MethodNotFound);
            assert_eq!(fault.message, "Method not found: missing");
        }
        other => panic!("expected a fault, got {:?}", other),
    }

    let reply = server.handle_request(&client.build_request("concat", params!["only one"]));
    let err = client.parse_result::<String>(&reply).unwrap_err();
    assert_eq!(err.into_fault(), Fault::invalid_parameters());
}

#[test]
fn test_notifications_get_no_reply() {
    let server = server();
    let client = Client::new();

    let reply = server.handle_request(&client.build_notification("log", params!["started"]));
    assert!(reply.is_empty());
    assert_eq!(client.next_id(), 0);
}
