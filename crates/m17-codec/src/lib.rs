//! Forward error correction components for M17
//!
//! Golay(24,12), the K=5 rate-1/2 convolutional code with its three
//! puncture schedules, the soft Viterbi decoder, the QPP interleaver and
//! the payload randomizer. Everything here is a stateless pure function
//! or a small value-typed state machine; no I/O, no logging.

pub mod convenc;
pub mod golay;
pub mod interleaver;
pub mod randomizer;
pub mod viterbi;
