//! Simple JSON-RPC client example
//!
//! Builds a few calls, runs them against an in-process server and prints
//! both sides of each exchange.

use chrono::Utc;
use jrpc::core::{init_logging, params, Binary, LoggingConfig, Value};
use jrpc::{Client, Server};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::new("simple-client").with_log_level("warn"))?;

    let server = Server::builder()
        .method("add", |a: i32, b: i32| a + b)
        .method("checksum", |data: Binary| {
            data.as_bytes().iter().map(|b| i64::from(*b)).sum::<i64>()
        })
        .method("stamp", |label: String, at: chrono::DateTime<Utc>| {
            format!("{} at {}", label, at.to_rfc3339())
        })
        .method("log", |_line: String| {})
        .build()?;

    let client = Client::new();

    let calls = vec![
        client.build_request("add", params![5, 3]),
        client.build_request("checksum", params![Binary::new(b"jrpc".to_vec())]),
        client.build_request("stamp", params!["built", Utc::now()]),
        client.build_request("missing", params![]),
        client.build_notification("log", params!["done"]),
    ];

    for call in calls {
        println!("--> {}", call);
        let reply = server.handle_request(&call);
        if reply.is_empty() {
            println!("    (notification, no reply)");
            continue;
        }
        println!("<-- {}", reply);

        match client.parse_result::<Value>(&reply) {
            Ok(result) => println!("    result: {}", result),
            Err(err) => println!("    failed: {}", err),
        }
    }

    Ok(())
}
