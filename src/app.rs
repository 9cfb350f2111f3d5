// src/app.rs
use std::io::BufRead;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    services::{
        backend::ChatBackend,
        dispatcher::{Completion, Dispatcher, InputField},
        renderer::Renderer,
    },
};

/// Typing this line ends the session without waiting for pending replies.
pub const QUIT_COMMAND: &str = "/quit";

/// Reads `reader` line by line on a dedicated thread.
///
/// The thread is not part of the runtime, so a read blocked on an open
/// terminal never holds up shutdown. Invalid UTF-8 is replaced rather than
/// ending input. The channel closes at end of input or on a read error.
pub fn spawn_line_reader<R>(mut reader: R) -> mpsc::UnboundedReceiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if buf.ends_with(b"\n") {
                        buf.pop();
                        if buf.ends_with(b"\r") {
                            buf.pop();
                        }
                    }
                    let line = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "failed to read input");
                    break;
                }
            }
        }
    });
    rx
}

/// Drives the conversation: every input line is one send, every completion
/// is rendered as it comes back. All rendering happens on this task.
///
/// When input runs out, replies still in flight are awaited and rendered
/// before returning.
pub async fn run<B, R>(
    mut dispatcher: Dispatcher<B>,
    mut completions: mpsc::UnboundedReceiver<Completion>,
    mut lines: mpsc::UnboundedReceiver<String>,
    renderer: &mut R,
) -> Result<()>
where
    B: ChatBackend,
    R: Renderer + ?Sized,
{
    let mut field = InputField::default();
    let mut reading = true;

    loop {
        if !reading && dispatcher.in_flight() == 0 {
            break;
        }

        tokio::select! {
            line = lines.recv(), if reading => match line {
                Some(line) if line.trim() == QUIT_COMMAND => {
                    info!(pending = dispatcher.in_flight(), "quit requested");
                    return Ok(());
                }
                Some(line) => {
                    field.set(line);
                    dispatcher.submit(&mut field, &mut *renderer);
                }
                None => {
                    debug!(pending = dispatcher.in_flight(), "input closed");
                    reading = false;
                }
            },
            Some(completion) = completions.recv() => {
                dispatcher.complete(completion, &mut *renderer);
            }
            else => break,
        }
    }

    Ok(())
}
