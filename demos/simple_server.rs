//! Simple JSON-RPC server example
//!
//! Reads one request per line from stdin and writes each reply on its own
//! line to stdout. Notifications produce no line.
//!
//! ```text
//! $ echo '{"jsonrpc":"2.0","method":"add","id":0,"params":[3,2]}' | cargo run --example simple_server
//! {"id":0,"jsonrpc":"2.0","result":5}
//! ```

use jrpc::core::{init_logging, params, LoggingConfig};
use jrpc::{procedure, Server};
use std::io::{self, BufRead, Write};

/// Add two integers
#[procedure]
fn add(a: i32, b: i32) -> i32 {
    a + b
}

/// Concatenate two strings
#[procedure]
fn concat(a: String, b: String) -> String {
    a + &b
}

/// Sum an array of integers
#[procedure]
fn add_array(items: Vec<i64>) -> i64 {
    items.iter().sum()
}

/// Print a message on the server side
#[procedure]
fn print_notification(message: String) {
    tracing::info!(%message, "notification received");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::new("simple-server").with_ansi(false))?;

    let server = Server::builder()
        .procedure(add_procedure())
        .procedure(concat_procedure())
        .procedure(add_array_procedure())
        .procedure(print_notification_procedure())
        .alias("add", "add3", params![3])
        .with_introspection()
        .build()?;

    tracing::info!(
        methods = ?server.dispatcher().method_names(false),
        "server ready, reading requests from stdin"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = server.handle_request(&line);
        if !reply.is_empty() {
            writeln!(stdout, "{}", reply)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
