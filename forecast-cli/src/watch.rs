use anyhow::{Context, Result, bail};
use console::{Key, Term};
use forecast_core::{Config, Projector, Session, source_from_config};
use std::{io, thread, time::Duration};
use tokio::{sync::mpsc, time::interval};
use tracing::{debug, warn};

use crate::view;

const SPINNER_TICK: Duration = Duration::from_millis(120);

/// Live forecast screen: every keystroke edits the query and the pipeline
/// debounces, fetches and redraws.
pub async fn run(config: &Config, initial: String) -> Result<()> {
    let term = Term::stdout();
    if !term.is_term() {
        bail!(
            "`forecast watch` needs an interactive terminal.\n\
             Hint: use `forecast show <city>` for one-shot output."
        );
    }

    let source = source_from_config(config)?;
    let projector = Projector::new(config.icon_base());
    let mut session = Session::new(source, config.debounce_window());
    let (mut keys, reader) = spawn_key_reader(term.clone());
    let mut ticks = interval(SPINNER_TICK);
    let mut frame = 0usize;

    let mut buffer = initial;
    session.input(buffer.clone());
    let mut quit_by_key = false;

    let drawn: Result<()> = loop {
        let screen = projector.project(session.query(), session.outcome());
        if let Err(err) = view::draw(&term, &buffer, &screen, frame) {
            break Err(err).context("Failed to draw screen");
        }

        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else { break Ok(()) };
                match key {
                    key if is_exit_key(&key) => {
                        quit_by_key = true;
                        break Ok(());
                    }
                    Key::Backspace => {
                        buffer.pop();
                    }
                    Key::Char(c) if !c.is_control() => buffer.push(c),
                    _ => continue,
                }
                session.input(buffer.clone());
            }
            step = session.step() => {
                let Some(step) = step else { break Ok(()) };
                debug!(?step, fetches = session.fetch_count(), "pipeline step");
            }
            _ = ticks.tick(), if session.outcome().is_loading() => {
                frame = frame.wrapping_add(1);
            }
        }
    };

    // The reader has stopped after an exit key and restored the tty mode.
    // Otherwise it may still be parked in a raw-mode read.
    if quit_by_key && reader.join().is_err() {
        warn!("key reader thread panicked");
    }

    drawn?;
    term.clear_screen().context("Failed to clear screen")?;
    Ok(())
}

fn is_exit_key(key: &Key) -> bool {
    matches!(key, Key::Escape | Key::CtrlC)
}

/// `Term::read_key_raw` blocks, so keys are read on a plain thread and forwarded.
/// Raw reads hand Ctrl-C over as `Key::CtrlC` instead of raising SIGINT.
fn spawn_key_reader(term: Term) -> (mpsc::UnboundedReceiver<Key>, thread::JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = thread::spawn(move || forward_keys(|| term.read_key_raw(), &tx));

    (rx, handle)
}

/// Forward keys until an exit key has been sent, the receiver is gone or
/// reading fails. Never starts another read after an exit key.
fn forward_keys<R>(mut read: R, tx: &mpsc::UnboundedSender<Key>)
where
    R: FnMut() -> io::Result<Key>,
{
    loop {
        match read() {
            Ok(key) => {
                let exit = is_exit_key(&key);
                if tx.send(key).is_err() || exit {
                    break;
                }
            }
            Err(err) => {
                warn!(error = %err, "stopped reading keys");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, collections::VecDeque, rc::Rc};

    /// Replays `keys`, then fails; counts every read attempt.
    fn scripted(keys: Vec<Key>) -> (impl FnMut() -> io::Result<Key>, Rc<Cell<usize>>) {
        let reads = Rc::new(Cell::new(0));
        let counter = reads.clone();
        let mut queue: VecDeque<Key> = keys.into();
        let read = move || {
            counter.set(counter.get() + 1);
            queue
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        };
        (read, reads)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Key>) -> Vec<Key> {
        let mut keys = Vec::new();
        while let Ok(key) = rx.try_recv() {
            keys.push(key);
        }
        keys
    }

    #[test]
    fn escape_stops_reading_after_forwarding() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (read, reads) = scripted(vec![Key::Char('a'), Key::Escape, Key::Char('b')]);

        forward_keys(read, &tx);

        assert_eq!(reads.get(), 2);
        assert_eq!(drain(&mut rx), vec![Key::Char('a'), Key::Escape]);
    }

    #[test]
    fn ctrl_c_is_forwarded_as_an_exit_key() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (read, reads) = scripted(vec![Key::CtrlC, Key::Char('x')]);

        forward_keys(read, &tx);

        assert_eq!(reads.get(), 1);
        assert_eq!(drain(&mut rx), vec![Key::CtrlC]);
        assert!(is_exit_key(&Key::CtrlC));
        assert!(!is_exit_key(&Key::Enter));
    }

    #[test]
    fn closed_receiver_stops_reading() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let (read, reads) = scripted(vec![Key::Char('a'), Key::Char('b')]);

        forward_keys(read, &tx);

        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn read_error_stops_reading() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (read, reads) = scripted(vec![Key::Char('a')]);

        forward_keys(read, &tx);

        assert_eq!(reads.get(), 2);
        assert_eq!(drain(&mut rx), vec![Key::Char('a')]);
    }
}
