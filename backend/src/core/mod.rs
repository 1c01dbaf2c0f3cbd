//! Core bookkeeping shared by the engine

pub mod time;
