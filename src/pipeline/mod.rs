//! Pipeline stages for slide-deck-to-PDF download.
//!
//! Each submodule implements one step. The HTTP layer sits behind the
//! [`transport::Transport`] trait so every stage above it runs offline in
//! tests.
//!
//! ## Data Flow
//!
//! ```text
//! source ──▶ extract ──▶ probe? ──▶ fetch ──▶ encode ──▶ assemble
//! (URL)     (metadata)  (HEAD)    (GET)     (JPEG)     (PDF)
//! ```
//!
//! 1. [`source`]: validate the presentation URL and fetch the landing page
//! 2. [`extract`]: identifier, slide count and title from the HTML, each
//!    through its own fallback chain
//! 3. [`probe`]: binary-search the slide count with HEAD requests when
//!    the page does not state it
//! 4. [`fetch`]: GET each slide image with optional retry
//! 5. [`encode`]: decode, read dimensions and produce an embeddable JPEG;
//!    runs in `spawn_blocking`
//! 6. [`assemble`]: one full-bleed page per slide, geometry fixed by the
//!    first slide, atomic write
//!
//! [`transport`] is the only module that talks to the network.

pub mod assemble;
pub mod encode;
pub mod extract;
pub mod fetch;
pub mod probe;
pub mod source;
pub mod transport;
