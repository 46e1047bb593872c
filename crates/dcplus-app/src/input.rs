//! Debug adapter stream reader
//!
//! Accepts three shapes on the same stream, line by line:
//! - `Content-Length: N` headers followed by a blank line and an N-byte JSON body
//! - one JSON protocol message per line
//! - anything else, taken as raw program output on `stdout`

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;

use dcplus_core::prelude::*;
use dcplus_core::{parse_protocol_message, InboundEvent, OutputEvent};
use tokio::sync::mpsc;

use crate::message::Message;

const CONTENT_LENGTH: &str = "content-length:";

/// Largest framed body accepted; anything bigger is a corrupt header
pub const MAX_FRAME_BODY: usize = 16 * 1024 * 1024;

/// Category given to lines that are not protocol messages
pub const RAW_CATEGORY: &str = "stdout";

/// Where to read the stream from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` means stdin
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }
}

/// Decode events from `reader`, handing each to `sink` until it returns
/// `false` or the stream ends. Returns the number of events delivered.
pub fn read_events<R: BufRead>(
    mut reader: R,
    mut sink: impl FnMut(InboundEvent) -> bool,
) -> Result<usize> {
    let mut delivered = 0;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        // Program output is not guaranteed to be UTF-8
        let line = String::from_utf8_lossy(&buf);
        let trimmed = line.trim_end_matches(['\r', '\n']);

        let event = if let Some(length) = parse_content_length(trimmed) {
            let body = read_framed_body(&mut reader, length)?;
            parse_protocol_message(&body)
        } else if trimmed.trim().is_empty() {
            None
        } else if trimmed.trim_start().starts_with('{')
            && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
        {
            parse_protocol_message(trimmed)
        } else {
            Some(InboundEvent::Output(OutputEvent::new(trimmed, RAW_CATEGORY)))
        };

        if let Some(event) = event {
            delivered += 1;
            if !sink(event) {
                break;
            }
        }
    }

    Ok(delivered)
}

fn parse_content_length(line: &str) -> Option<usize> {
    let lower = line.to_ascii_lowercase();
    lower
        .strip_prefix(CONTENT_LENGTH)
        .and_then(|rest| rest.trim().parse().ok())
}

/// Skip the remaining headers up to the blank line, then read the body.
fn read_framed_body<R: BufRead>(reader: &mut R, length: usize) -> Result<String> {
    if length > MAX_FRAME_BODY {
        return Err(Error::protocol(format!(
            "Content-Length {} exceeds the {} byte limit",
            length, MAX_FRAME_BODY
        )));
    }

    let mut header = Vec::new();
    loop {
        header.clear();
        if reader.read_until(b'\n', &mut header)? == 0 {
            return Err(Error::protocol("stream ended inside message headers"));
        }
        if header.trim_ascii().is_empty() {
            break;
        }
    }

    let mut body = vec![0; length];
    reader.read_exact(&mut body)?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Read `source` on a dedicated thread, forwarding events to the message
/// channel. Sends [`Message::InputClosed`] when the stream ends.
pub fn spawn_input_reader(source: InputSource, msg_tx: mpsc::Sender<Message>) {
    std::thread::spawn(move || {
        let result = match &source {
            InputSource::Stdin => forward(std::io::stdin().lock(), &msg_tx),
            InputSource::File(path) => match File::open(path) {
                Ok(file) => forward(BufReader::new(file), &msg_tx),
                Err(e) => Err(Error::from(e)),
            },
        };

        match result {
            Ok(count) => info!("Input reader finished after {} events", count),
            Err(Error::ChannelClosed) => {
                debug!("Input reader stopped: event loop is gone");
                return;
            }
            Err(e) => error!("Input reader failed on {:?}: {}", source, e),
        }
        if msg_tx.blocking_send(Message::InputClosed).is_err() {
            debug!("Input closed after the event loop exited");
        }
    });
}

fn forward<R: BufRead>(reader: R, msg_tx: &mpsc::Sender<Message>) -> Result<usize> {
    let mut closed = false;
    let count = read_events(reader, |event| {
        closed = msg_tx.blocking_send(Message::Inbound(event)).is_err();
        !closed
    })?;
    if closed {
        return Err(Error::ChannelClosed);
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcplus_core::GroupMarker;

    fn collect(input: &str) -> Vec<InboundEvent> {
        let mut events = Vec::new();
        read_events(input.as_bytes(), |e| {
            events.push(e);
            true
        })
        .unwrap();
        events
    }

    fn output_text(event: &InboundEvent) -> &str {
        match event {
            InboundEvent::Output(o) => &o.output,
            other => panic!("expected output, got {:?}", other),
        }
    }

    #[test]
    fn test_content_length_framing() {
        let body = r#"{"type":"event","event":"output","body":{"output":"hi\n","category":"stdout"}}"#;
        let stream = format!("Content-Length: {}\r\n\r\n{}", body.len(), body);
        let events = collect(&stream);
        assert_eq!(events.len(), 1);
        assert_eq!(output_text(&events[0]), "hi\n");
    }

    #[test]
    fn test_back_to_back_frames() {
        let a = r#"{"type":"event","event":"initialized"}"#;
        let b = r#"{"type":"event","event":"output","body":{"output":"x","group":"start"}}"#;
        let stream = format!(
            "Content-Length: {}\r\n\r\n{}Content-Length: {}\r\n\r\n{}",
            a.len(),
            a,
            b.len(),
            b
        );
        let events = collect(&stream);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], InboundEvent::SessionStarted);
        match &events[1] {
            InboundEvent::Output(o) => assert_eq!(o.group, Some(GroupMarker::Start)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ndjson_lines() {
        let stream = concat!(
            r#"{"type":"event","event":"output","body":{"output":"one"}}"#,
            "\n",
            r#"{"type":"event","event":"terminated"}"#,
            "\n"
        );
        let events = collect(stream);
        assert_eq!(output_text(&events[0]), "one");
        assert_eq!(events[1], InboundEvent::SessionEnded);
    }

    #[test]
    fn test_raw_lines_become_stdout() {
        let events = collect("flutter: hello\n\nplain text\n");
        assert_eq!(events.len(), 2);
        match &events[0] {
            InboundEvent::Output(o) => {
                assert_eq!(o.output, "flutter: hello");
                assert_eq!(o.category, RAW_CATEGORY);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_ignored_json_is_not_raw_output() {
        let events = collect("{\"type\":\"response\",\"command\":\"threads\"}\n{not json\n");
        assert_eq!(events.len(), 1);
        assert_eq!(output_text(&events[0]), "{not json");
    }

    #[test]
    fn test_sink_can_stop_reading() {
        let mut seen = 0;
        let count = read_events("a\nb\nc\n".as_bytes(), |_| {
            seen += 1;
            seen < 2
        })
        .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_truncated_headers_error() {
        let result = read_events("Content-Length: 10\r\n".as_bytes(), |_| true);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_utf8_line_does_not_end_stream() {
        let mut stream = b"first line\n".to_vec();
        stream.extend_from_slice(b"bad \xff\xfe byte\n");
        stream.extend_from_slice(b"third line\n");

        let mut texts = Vec::new();
        let count = read_events(stream.as_slice(), |e| {
            texts.push(output_text(&e).to_string());
            true
        })
        .unwrap();
        assert_eq!(count, 3);
        assert_eq!(texts[0], "first line");
        assert!(texts[1].starts_with("bad "));
        assert!(texts[1].contains('\u{FFFD}'));
        assert_eq!(texts[2], "third line");
    }

    #[test]
    fn test_framed_body_decoded_lossily() {
        let mut body = br#"{"type":"event","event":"output","body":{"output":"x"#.to_vec();
        body.push(0xff);
        body.extend_from_slice(br#""}}"#);
        let mut stream = format!("Content-Length: {}\r\n\r\n", body.len()).into_bytes();
        stream.extend_from_slice(&body);

        let mut events = Vec::new();
        read_events(stream.as_slice(), |e| {
            events.push(e);
            true
        })
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(output_text(&events[0]), "x\u{FFFD}");
    }

    #[test]
    fn test_oversized_content_length_rejected() {
        let stream = "Content-Length: 99999999999\r\n\r\n{}";
        let result = read_events(stream.as_bytes(), |_| true);
        assert!(matches!(result, Err(Error::Protocol { .. })));
    }

    #[test]
    fn test_forward_reports_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let result = forward("a\nb\n".as_bytes(), &tx);
        assert!(matches!(result, Err(Error::ChannelClosed)));
    }

    #[test]
    fn test_input_source_from_arg() {
        assert_eq!(InputSource::from_arg("-"), InputSource::Stdin);
        assert_eq!(
            InputSource::from_arg("dap.log"),
            InputSource::File(PathBuf::from("dap.log"))
        );
    }

    #[tokio::test]
    async fn test_spawn_reader_sends_events_then_closed() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("stream.txt");
        std::fs::write(&path, "line one\nline two\n").unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        spawn_input_reader(InputSource::File(path), tx);

        let mut outputs = 0;
        while let Some(msg) = rx.recv().await {
            match msg {
                Message::Inbound(_) => outputs += 1,
                Message::InputClosed => break,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(outputs, 2);
    }
}
