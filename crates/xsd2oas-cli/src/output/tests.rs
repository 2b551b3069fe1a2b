// Tests for status output
//
// The writer is pointed at a shared buffer so each test can inspect exactly
// what would have reached the terminal.

use super::*;
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

fn writer(quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let output = OutputWriter::with_writer(false, quiet, Box::new(buffer.clone()));
    (output, buffer)
}

#[test]
fn test_plain_messages() {
    let (mut output, buffer) = writer(false);
    output.success("Wrote 12 schemas").unwrap();
    output.warning("Mask line matched nothing").unwrap();
    assert_eq!(
        buffer.contents(),
        "Wrote 12 schemas\nWARNING: Mask line matched nothing\n"
    );
}

#[test]
fn test_quiet_keeps_only_warnings() {
    let (mut output, buffer) = writer(true);
    output.success("Wrote 12 schemas").unwrap();
    output.path("/Body/Amt", true).unwrap();
    output.warning("Mask line matched nothing").unwrap();
    assert_eq!(buffer.contents(), "WARNING: Mask line matched nothing\n");
}

#[test]
fn test_paths_are_listed_verbatim() {
    let (mut output, buffer) = writer(false);
    output.path("/Body", false).unwrap();
    output.path("/Body/Amt", true).unwrap();
    assert_eq!(buffer.contents(), "/Body\n/Body/Amt\n");
}

#[test]
fn test_colored_success_keeps_text() {
    colored::control::set_override(true);
    let buffer = SharedBuffer::default();
    let mut output = OutputWriter::with_writer(true, false, Box::new(buffer.clone()));
    output.success("done").unwrap();
    assert!(buffer.contents().contains("done"));
}

struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_write_failure_is_io_error() {
    let mut output = OutputWriter::with_writer(false, false, Box::new(ClosedPipe));
    let err = output.success("done").unwrap_err();
    assert!(matches!(err, crate::error::Error::Io { .. }));
    assert_eq!(err.exit_code(), crate::error::EXIT_IO);
    assert_eq!(err.to_string(), "Cannot write to stdout");
}
