use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::RelayError;

#[derive(Debug)]
pub struct LineTap {
    pub line: String,
    pub stream: LineStream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStream {
    Stdout,
    Stderr,
}

impl LineStream {
    pub fn label(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

/// Split `rd` into lines and forward them to `line_tx` until EOF.
///
/// Several pumps may share one sender; the receiver then sees the streams merged
/// in arrival order. Returns the number of bytes read.
pub fn pump_lines<R>(
    mut rd: R,
    stream: LineStream,
    line_tx: mpsc::Sender<LineTap>,
) -> JoinHandle<Result<u64, RelayError>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; 16 * 1024];
        let mut total = 0u64;
        let mut line_buf: Vec<u8> = Vec::with_capacity(8 * 1024);

        loop {
            let n = rd.read(&mut buf).await.map_err(|e| RelayError::StreamIo {
                stream: stream.label(),
                source: e,
            })?;
            if n == 0 {
                break;
            }
            total += n as u64;

            line_buf.extend_from_slice(&buf[..n]);
            while let Some(pos) = line_buf.iter().position(|&b| b == b'\n') {
                let mut one = line_buf.drain(..=pos).collect::<Vec<u8>>();
                trim_newline(&mut one);
                let line = String::from_utf8_lossy(&one).to_string();
                // receiver gone: keep draining so the child never blocks on a full pipe
                let _ = line_tx.send(LineTap { line, stream }).await;
            }
        }

        // EOF flush: deliver the last partial line if it doesn't end with '\n'.
        if !line_buf.is_empty() {
            trim_newline(&mut line_buf);
            let line = String::from_utf8_lossy(&line_buf).to_string();
            let _ = line_tx.send(LineTap { line, stream }).await;
        }

        Ok(total)
    })
}

fn trim_newline(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn flushes_last_line_without_newline_on_eof() {
        let (mut wr, rd) = tokio::io::duplex(1024);
        let (tx, mut rx) = mpsc::channel::<LineTap>(8);

        let task = pump_lines(rd, LineStream::Stdout, tx);

        wr.write_all(b"hello").await.unwrap();
        drop(wr);

        let tap = rx.recv().await.expect("expected one line");
        assert_eq!(tap.line, "hello");
        assert_eq!(tap.stream, LineStream::Stdout);

        assert_eq!(task.await.unwrap().unwrap(), 5);
    }

    #[tokio::test]
    async fn splits_crlf_and_keeps_empty_lines() {
        let (tx, mut rx) = mpsc::channel::<LineTap>(8);
        let input: &'static [u8] = b"one\r\n\ntwo\n";

        pump_lines(input, LineStream::Stderr, tx)
            .await
            .unwrap()
            .unwrap();

        let mut lines = Vec::new();
        while let Some(tap) = rx.recv().await {
            assert_eq!(tap.stream, LineStream::Stderr);
            lines.push(tap.line);
        }
        assert_eq!(lines, vec!["one", "", "two"]);
    }
}
