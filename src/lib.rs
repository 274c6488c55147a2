//! # daily-post
//!
//! Posts one new photo a day from a watched folder. Drop images into the
//! folder; once a day the newest one that has not been posted yet is
//! normalized, uploaded with a dated caption, and recorded so it is never
//! posted twice.
//!
//! # Architecture: One Run
//!
//! ```text
//! UPLOADS/ ──select──▶ candidate ──normalize──▶ artifact ──upload──▶ service
//!    ▲                     │                        │                   │
//!    │                     ▼                        ▼                   ▼
//!    └── ledger ◀──── original name        deleted at cleanup     logout at cleanup
//! ```
//!
//! [`pipeline::Pipeline::run_once`] executes the stages and always returns a
//! [`types::RunReport`]. The image backend, remote service, pacer and clock
//! are trait seams, so every stage is testable without a network or real
//! sleeps.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Orchestrates a run; owns cleanup of generated files |
//! | [`select`] | Lists images in the watched folder, newest first, and picks one |
//! | [`ledger`] | Append-only record of posted filenames |
//! | [`imaging`] | Format conversion and aspect-ratio cropping (pure Rust) |
//! | [`session`] | Login/logout with pacing; scoped session guard |
//! | [`service`] | Remote service trait and its HTTP client |
//! | [`retry`] | Exponential backoff with jitter |
//! | [`caption`] | Caption template and the clock it reads |
//! | [`schedule`] | Once-a-day trigger for daemon mode |
//! | [`config`] | `daily-post.toml` loading, merging, and validation |
//! | [`credentials`] | `login.txt` parsing |
//! | [`naming`] | Extension rules and generated file names |
//! | [`pacing`] | The sleep seam |
//! | [`types`] | Stages, outcomes, and run reports |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Ledger Records Originals
//!
//! The ledger stores the filename the user dropped in, never the name of a
//! converted or cropped copy. Generated copies are deleted after every run,
//! so the original name is the only stable identity an image has.
//!
//! ## Cleanup Is Unconditional
//!
//! Generated files are registered before they are written, and the session
//! is a guard that logs out on drop. Whatever stage a run fails in, the
//! folder ends up holding only what the user put there and no session is
//! left open.
//!
//! ## Only Transient Errors Are Retried
//!
//! Rate limits, server errors and dropped connections are retried with
//! exponential backoff. A rejected caption or bad credentials will not get
//! better by asking again, so those fail the run at once.

pub mod caption;
pub mod config;
pub mod credentials;
pub mod imaging;
pub mod ledger;
pub mod naming;
pub mod output;
pub mod pacing;
pub mod pipeline;
pub mod retry;
pub mod schedule;
pub mod select;
pub mod service;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
