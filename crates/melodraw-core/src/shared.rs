//! Board shared between threads.
//!
//! Hosts that deliver gestures on more than one thread wrap the board here so
//! every mutation and read is serialized behind one lock.

use crate::board::{Board, BoardError, BoardResult};
use crate::palette::RandomColors;
use std::sync::{Arc, Mutex};

/// Cloneable handle to a mutex-guarded board.
#[derive(Debug)]
pub struct SharedBoard<C = RandomColors> {
    inner: Arc<Mutex<Board<C>>>,
}

impl<C> Clone for SharedBoard<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> SharedBoard<C> {
    pub fn new(board: Board<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(board)),
        }
    }

    /// Run `f` with exclusive access to the board.
    pub fn with<T>(&self, f: impl FnOnce(&mut Board<C>) -> T) -> BoardResult<T> {
        let mut board = self
            .inner
            .lock()
            .map_err(|e| BoardError::Poisoned(e.to_string()))?;
        Ok(f(&mut board))
    }
}
