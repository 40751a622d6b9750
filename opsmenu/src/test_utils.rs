//! Test utilities for driving menus with scripted input

use crate::console::Console;
use crate::menu::MenuEnv;
use opsmenu_core::{Session, Settings};
use opsmenu_exec::RecordingRunner;
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

/// In-memory writer that can be read back after the console is done with it
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Console reading `input` and writing to a shared buffer
pub fn scripted_console(input: &str) -> (Console, SharedBuffer) {
    let out = SharedBuffer::default();
    let console = Console::new(Cursor::new(input.as_bytes().to_vec()), out.clone());
    (console, out)
}

/// Menu environment over scripted input and a recording runner
///
/// Prerequisite checks are skipped so tests don't depend on installed tools.
pub fn scripted_env(
    input: &str,
    working_directory: &std::path::Path,
) -> (MenuEnv, Arc<RecordingRunner>, SharedBuffer) {
    let (console, out) = scripted_console(input);
    let runner = Arc::new(RecordingRunner::new());
    let env = MenuEnv::new(
        console,
        runner.clone(),
        Session::new(working_directory),
        Settings::default(),
    )
    .skip_prerequisite_checks();
    (env, runner, out)
}
