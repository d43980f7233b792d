//! Collaborators around the scoring core: the reference clip library and
//! round bookkeeping for a game session.

pub mod library;
pub mod session;
