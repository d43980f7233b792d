//! Scores how closely a vocal imitation matches a short reference clip.
//!
//! Two decoded signals go through [`extract`] to get a [`FeatureSet`] each
//! (a single-frame spectral snapshot, a windowed RMS envelope and the
//! duration), then [`compare`] turns the pair into a bounded
//! [`ComparisonResult`]. The reported score is the amplitude sub-score; the
//! spectral snapshot is computed and reported but not weighted into it.
//!
//! ```no_run
//! use mimicry::{compare, decode_file, extract};
//! use std::path::Path;
//!
//! let reference = extract(&decode_file(Path::new("clip.mp3"))?)?;
//! let attempt = extract(&decode_file(Path::new("attempt.wav"))?)?;
//! let result = compare(&reference, &attempt);
//! println!("Score: {}%", result.score);
//! # Ok::<(), mimicry::DecodeError>(())
//! ```

pub mod audio;
pub mod config;
pub mod game;

pub use audio::analysis::{extract, extract_with};
pub use audio::compare::{compare, compare_with};
pub use audio::decode::{decode_bytes, decode_file, AudioSignal, DecodeError};
pub use audio::features::{ComparisonResult, FeatureSet};
pub use game::library::{ClipLibrary, LoadedClip};
pub use game::session::{RoundScore, Session, SessionError};
