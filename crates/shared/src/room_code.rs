//! Room code allocation
//!
//! Codes are three decimal digits drawn uniformly at random and retried on
//! collision with a live room. The space only holds 1000 codes, so retries
//! are capped instead of looping forever.

use std::collections::{HashMap, VecDeque};

use rand::Rng;

use crate::error::{SessionError, SessionResult};
use crate::types::{Room, RoomCode};

/// Default number of draws before giving up
pub const DEFAULT_MAX_ATTEMPTS: usize = 50;

/// Source of raw code draws in `0..RoomCode::SPACE`
pub trait CodeSource: Send {
    fn draw(&mut self) -> u16;
}

/// Uniform draws from the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCodeSource;

impl CodeSource for RandomCodeSource {
    fn draw(&mut self) -> u16 {
        rand::thread_rng().gen_range(0..RoomCode::SPACE)
    }
}

/// Replays a fixed list of draws, then cycles through it again.
/// Used to get predictable codes in tests and local demos.
#[derive(Debug, Clone)]
pub struct SequenceCodeSource {
    draws: VecDeque<u16>,
}

impl SequenceCodeSource {
    pub fn new(draws: impl IntoIterator<Item = u16>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl CodeSource for SequenceCodeSource {
    fn draw(&mut self) -> u16 {
        match self.draws.pop_front() {
            Some(value) => {
                self.draws.push_back(value);
                value
            }
            None => 0,
        }
    }
}

/// Produces room codes that are unique among live rooms
pub struct RoomCodeGenerator {
    source: Box<dyn CodeSource>,
    max_attempts: usize,
}

impl RoomCodeGenerator {
    pub fn new(source: impl CodeSource + 'static, max_attempts: usize) -> Self {
        Self {
            source: Box::new(source),
            max_attempts: max_attempts.max(1),
        }
    }

    /// Random generator with the default retry cap
    pub fn random() -> Self {
        Self::new(RandomCodeSource, DEFAULT_MAX_ATTEMPTS)
    }

    /// Draw a code not used by any room in `live`
    pub fn generate(&mut self, live: &HashMap<RoomCode, Room>) -> SessionResult<RoomCode> {
        if live.len() >= usize::from(RoomCode::SPACE) {
            return Err(SessionError::RoomSpaceExhausted { attempts: 0 });
        }

        for attempt in 1..=self.max_attempts {
            let code = RoomCode::from_number(self.source.draw());
            if !live.contains_key(&code) {
                return Ok(code);
            }
            tracing::debug!(room_code = %code, attempt, "Room code collision, redrawing");
        }

        Err(SessionError::RoomSpaceExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl Default for RoomCodeGenerator {
    fn default() -> Self {
        Self::random()
    }
}

impl std::fmt::Debug for RoomCodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomCodeGenerator")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
