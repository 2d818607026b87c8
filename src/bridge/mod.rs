//! Transcode bridge: one inbound download piped through one external
//! transcoder process per invocation.
//!
//! Data flow:
//! ```text
//! [source url] ─► GET (streamed) ─► tool stdin ─► ffmpeg ─► tool stdout ─► [gif buffer]
//!                                                   │
//!                                                   └─► tool stderr ─► [bounded diagnostics]
//! ```
//!
//! The stdin feed and both output drains run as independent tasks joined
//! before the exit status is read; running them sequentially deadlocks once
//! a pipe buffer fills on either side.

pub mod convert;
pub mod error;

pub use convert::{ConvertOptions, Converter, Gif};
pub use error::Failure;

use std::sync::LazyLock;

/// Converter shared by all requests, built from the process config.
pub fn shared() -> &'static Converter {
    static SHARED: LazyLock<Converter> =
        LazyLock::new(|| Converter::new(ConvertOptions::from_config()));
    &SHARED
}
