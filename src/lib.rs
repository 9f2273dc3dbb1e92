//! # Wedding RSVP
//!
//! Guest side of the Kimberly & Anesu RSVP flow. The backend lives in the
//! `server` crate, shared types in `invite`.
//!
//! ## Overall Flow
//!
//! 1. Guest opens the RSVP screen. The gate asks for their name (or the shared PIN,
//!    depending on which strategy the backend runs).
//!
//! 2. While they type, [`debounce::SuggestionFeed`] waits 300ms after the last keystroke
//!    and asks `/search-names` for up to 10 names containing the input. Older answers are
//!    thrown away by sequence number. Picking a suggestion only fills the input.
//!
//! 3. On submit the gate runs. An unknown name shakes the input and shows a
//!    "check the spelling" message; an unreachable backend shows a "try again" message.
//!    Either way the guest can edit and retry.
//!
//! 4. Admitted guests get the form, pre-filled with the stored spelling of their name.
//!    - attending yes: special requests
//!    - attending no: well wishes, at most 400 characters
//!
//! 5. The form is validated locally with the same rules the server uses, then sent to
//!    `/rsvp-submit` with a submission id minted when the form opened. Retries reuse it,
//!    so a lost response never records the guest twice.
//!
//! 6. Only after the record is stored, `/send-confirmation` is called. If the email fails
//!    the guest still lands on success, with a note that no email went out.
//!
//! ## States
//!
//! See [`workflow`]. A failed write keeps every field the guest typed.
//!
//! ## Timeouts
//!
//! Each backend call is bounded by [`api::REQUEST_TIMEOUT`] and a timeout counts as that
//! call's failure.

pub mod api;
pub mod debounce;
pub mod workflow;

pub use api::{ApiError, HttpApi, RsvpApi};
pub use debounce::SuggestionFeed;
pub use workflow::{FormData, GateFailure, GateFailureKind, Phase, RsvpWorkflow, WorkflowError};
