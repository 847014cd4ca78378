#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Cursor, Write};
use std::rc::Rc;

use rox as lox;

use lox::{Lox, LoxError};

/// In-memory sink that stays readable after being boxed into the interpreter.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A driver whose `print` output lands in the returned buffer and whose
/// `readLine()` reads from `input`.
pub fn lox_with_input(input: &str) -> (Lox, SharedBuf) {
    let out = SharedBuf::default();
    let lox = Lox::with_io(
        Box::new(out.clone()),
        Box::new(Cursor::new(input.as_bytes().to_vec())),
    );

    (lox, out)
}

/// Run one program; return everything it printed plus the outcome.
pub fn run(source: &str) -> (String, Result<(), Vec<LoxError>>) {
    let (mut lox, out) = lox_with_input("");
    let result = lox.run(source);

    (out.contents(), result)
}

/// Run a program that must succeed; return its printed lines.
pub fn run_ok(source: &str) -> Vec<String> {
    let (out, result) = run(source);

    if let Err(errors) = result {
        let rendered: Vec<String> = errors.iter().map(ToString::to_string).collect();
        panic!("program failed: {:?}\noutput so far:\n{}", rendered, out);
    }

    out.lines().map(str::to_owned).collect()
}

/// Run a program that must fail; return its diagnostics rendered as text.
pub fn run_err(source: &str) -> Vec<String> {
    let (_, result) = run(source);

    match result {
        Ok(()) => panic!("program unexpectedly succeeded"),
        Err(errors) => errors.iter().map(ToString::to_string).collect(),
    }
}
