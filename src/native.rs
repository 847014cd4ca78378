//! Built-in functions pre-registered in the global scope.

use chrono::Utc;
use log::{debug, info};

use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::value::{NativeFunction, Value};

/// `clock()`: seconds since the Unix epoch, with sub-second precision.
fn clock(_interpreter: &mut Interpreter, _args: &[Value]) -> Result<Value> {
    debug!("Calling native function 'clock'");

    let micros: i64 = Utc::now().timestamp_micros();

    Ok(Value::Number(micros as f64 / 1_000_000.0))
}

/// `readLine()`: one line of input without its terminator; `""` at end of input.
fn read_line(interpreter: &mut Interpreter, _args: &[Value]) -> Result<Value> {
    debug!("Calling native function 'readLine'");

    let line: String = interpreter.read_input_line()?.unwrap_or_default();

    Ok(Value::String(line))
}

/// Every native the interpreter installs before running a program.
pub fn globals() -> Vec<NativeFunction> {
    info!("Registering native functions");

    vec![
        NativeFunction {
            name: "clock",
            arity: 0,
            func: clock,
        },
        NativeFunction {
            name: "readLine",
            arity: 0,
            func: read_line,
        },
    ]
}
