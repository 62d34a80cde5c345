//! Standard host functions.
//!
//! - `print(...)`: writes its arguments, separated by spaces, as one line to
//!   a [`PrintHandlerImpl`]
//! - `wait(ms)`: suspension point; hands `ms` to the host
//! - `type_of(v)`: the kind name of `v`

mod print_handler;

use tracing::debug;

use dsl_value::Value;

use crate::Registry;

pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler, StdoutPrintHandler,
};

/// Register the standard host functions on `registry`.
pub fn install(registry: &Registry, handler: SharedPrintHandler) {
    registry.register_variadic("print", move |args: &[Value]| {
        handler.println(&join(args));
        Ok(Value::void())
    });
    registry.register_yielding_fn("wait", wait);
    registry.register_fn("type_of", |value: Value| value.type_name());
    debug!("standard host functions installed");
}

fn wait(ms: i64) -> Result<i64, String> {
    if ms < 0 {
        return Err(format!("delay must not be negative, got {ms}"));
    }
    Ok(ms)
}

fn join(args: &[Value]) -> String {
    let mut line = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&arg.to_string());
    }
    line
}
