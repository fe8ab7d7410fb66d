//! The session facade every operation goes through.

use std::path::Path;
use std::sync::OnceLock;

use parking_lot::Mutex;

use super::files::{self, DatabaseVersion, OpenMode};
use super::handle::NodeId;
use super::state::SessionState;
use crate::config::{EngineConfig, ErrorState};
use crate::error::{error_message, Error, Result};
use crate::version;

/// Entry point to the engine.
///
/// A session owns the open-file table and every handle it lends out.
/// It is initialised lazily by the first [`Session::open`] and torn
/// down again when the last file is closed, so most calls fail with
/// [`Error::NoOpenDatabase`] until a file is open.
///
/// ```no_run
/// use common::prelude::*;
///
/// let mut session = Session::default();
/// let root = session.open("mesh.adf", "NEW", "")?;
/// let zone = session.create(root, "Zone")?;
/// session.set_dimensions(zone, "I4", &[3])?;
/// session.write_all_from(zone, &[1i32, 2, 3])?;
/// session.close(root)?;
/// # Ok::<(), common::error::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct Session {
    config: EngineConfig,
    state: Option<SessionState>,
}

static GLOBAL: OnceLock<Mutex<Session>> = OnceLock::new();

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Session {
            config,
            state: None,
        }
    }

    /// Process-wide session with the default config.
    pub fn global() -> &'static Mutex<Session> {
        GLOBAL.get_or_init(|| Mutex::new(Session::default()))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn open_file_count(&self) -> usize {
        self.state.as_ref().map(SessionState::slots_in_use).unwrap_or(0)
    }

    /// Run `f` against the live state, honouring the error state.
    pub(crate) fn run<'a, T>(
        &'a mut self,
        f: impl FnOnce(&'a mut SessionState) -> Result<T>,
    ) -> Result<T> {
        let abort = self.abort_on_error();
        let result = match self.state.as_mut() {
            Some(state) => f(state),
            None => Err(Error::NoOpenDatabase),
        };
        match result {
            Err(e) if abort => abort_with(&e),
            result => result,
        }
    }

    fn abort_on_error(&self) -> bool {
        let state = self
            .state
            .as_ref()
            .map(|s| s.error_state)
            .unwrap_or(self.config.error_state);
        state == ErrorState::Abort
    }

    fn teardown_if_idle(&mut self) -> Result<()> {
        if self.open_file_count() > 0 {
            return Ok(());
        }
        match self.state.take() {
            Some(state) => {
                tracing::debug!("last file closed, shutting session down");
                state.shutdown()
            }
            None => Ok(()),
        }
    }

    /// Open or create a database file and lend a handle to its root.
    ///
    /// `status` is one of `NEW`, `OLD`, `READ_ONLY` or `UNKNOWN` in any
    /// case. `format` is accepted for compatibility and ignored; files
    /// are always written in the machine's native format.
    pub fn open(&mut self, path: impl AsRef<Path>, status: &str, format: &str) -> Result<NodeId> {
        let path = path.as_ref();
        if self.state.is_none() {
            self.state = Some(SessionState::new(self.config.clone()));
        }
        let result = self.run(|st| {
            let mode: OpenMode = status.parse()?;
            st.open_database(path, mode, format)
        });
        if result.is_err() {
            if let Err(e) = self.teardown_if_idle() {
                tracing::warn!(error = %e, "failed to tear down idle session");
            }
        }
        result
    }

    /// Close the file `root` belongs to. Handles into it become invalid.
    pub fn close(&mut self, root: NodeId) -> Result<()> {
        self.run(|st| st.close_database(root))?;
        self.teardown_if_idle()
    }

    /// Write the file holding `node` to disk.
    pub fn flush(&mut self, node: NodeId) -> Result<()> {
        self.run(|st| st.flush_node(node))
    }

    /// Space is reclaimed on every write, so this only checks the handle.
    pub fn garbage_collect(&mut self, node: NodeId) -> Result<()> {
        self.run(|st| st.node(node).map(|_| ()))
    }

    pub fn get_format(&mut self, node: NodeId) -> Result<String> {
        self.run(|st| st.format_of(node))
    }

    pub fn set_format(&mut self, node: NodeId, _format: &str) -> Result<()> {
        self.run(|st| {
            st.node(node)?;
            Err(Error::NotImplemented("changing the numeric format of a file"))
        })
    }

    pub fn database_version(&mut self, node: NodeId) -> Result<DatabaseVersion> {
        self.run(|st| st.version_of(node))
    }

    /// `0` returns error codes, `1` prints the message and exits.
    pub fn set_error_state(&mut self, value: i32) -> Result<()> {
        self.run(|st| {
            st.error_state = match value {
                0 => ErrorState::ReturnCode,
                1 => ErrorState::Abort,
                other => return Err(Error::BadErrorState(other)),
            };
            Ok(())
        })
    }

    pub fn error_state(&mut self) -> Result<i32> {
        self.run(|st| Ok(st.error_state.as_i32()))
    }

    /// Delete a database file. It must not be open in any session.
    pub fn delete_database(path: impl AsRef<Path>) -> Result<()> {
        files::delete_database(path.as_ref())
    }

    pub fn is_valid_database(path: impl AsRef<Path>) -> bool {
        object_store::Store::is_store_file(path.as_ref())
    }

    pub fn library_version() -> String {
        version::library_version()
    }

    pub fn error_message(code: i32) -> String {
        error_message(code)
    }
}

fn abort_with(e: &Error) -> ! {
    tracing::error!(code = e.code().as_i32(), error = %e, "aborting on error");
    eprintln!("ERROR:{}", e);
    std::process::exit(1)
}
