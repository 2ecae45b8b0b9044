// crates/quint-mcp/src/transport.rs
// ============================================================================
// Module: Quint Stdio Transport
// Description: Line-delimited JSON-RPC 2.0 framing over stdin/stdout.
// Purpose: Read one JSON object per line from stdin, dispatch it, and write
//          one JSON object per line back to stdout.
// Dependencies: quint-core, serde_json, std::io
// ============================================================================

//! ## Overview
//! Unlike the Content-Length-prefixed framing used by many MCP transports,
//! Quint frames each JSON-RPC message as exactly one line: no header block,
//! no explicit byte count. A blank line is skipped rather than treated as an
//! error, since some clients emit a trailing newline after the final
//! request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::Write;

use quint_core::Store;

use crate::dispatcher::Dispatcher;
use crate::errors::DispatchError;

// ============================================================================
// SECTION: Serve Loop
// ============================================================================

/// Runs the line-delimited JSON-RPC serve loop over the given reader/writer,
/// dispatching every request to `dispatcher` until the input stream closes.
///
/// # Errors
///
/// Returns [`DispatchError::Transport`] when stdio reads or writes fail.
/// Malformed request lines are reported back to the caller as JSON-RPC parse
/// errors, not as a [`DispatchError`]; only transport-level I/O failure
/// aborts the loop.
pub fn serve_stdio<S: Store>(
    dispatcher: &mut Dispatcher<S>,
    reader: &mut impl BufRead,
    writer: &mut impl Write,
) -> Result<(), DispatchError> {
    let mut line = String::new();
    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .map_err(|err| DispatchError::Transport(err.to_string()))?;
        if bytes_read == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let Some(response) = dispatcher.handle_line(trimmed) else {
            continue;
        };
        let mut payload = serde_json::to_string(&response)
            .map_err(|err| DispatchError::Transport(err.to_string()))?;
        payload.push('\n');
        writer
            .write_all(payload.as_bytes())
            .map_err(|err| DispatchError::Transport(err.to_string()))?;
        writer.flush().map_err(|err| DispatchError::Transport(err.to_string()))?;
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "Test-only assertions are permitted to unwrap."
)]
mod tests {
    use std::io::Cursor;

    use quint_core::ContextId;
    use quint_core::Timestamp;
    use quint_store_sqlite::SqliteStore;

    use super::serve_stdio;
    use crate::dispatcher::Dispatcher;

    #[test]
    fn replies_one_line_per_request() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut dispatcher = Dispatcher::new_with_clock(store, ContextId::new("ctx"), || {
            Timestamp::from_unix_millis(0)
        });
        let input =
            "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"tools/list\"}\n\n{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"unknown/thing\"}\n";
        let mut reader = Cursor::new(input.as_bytes());
        let mut output = Vec::new();
        serve_stdio(&mut dispatcher, &mut reader, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().next().unwrap().contains("\"result\""));
        assert!(text.lines().nth(1).unwrap().contains("-32601"));
    }
}
