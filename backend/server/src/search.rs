//! # Name Suggestions
//!
//! Autocomplete for the gate's name input, so a typo does not lock a guest out.
//!
//! - Only runs for 2+ characters after trimming, otherwise answers with nothing
//! - Case-insensitive substring match against the invitation list
//! - At most [`MAX_SUGGESTIONS`] names, in whatever order the store hands them back
//!
//! Suggestions never admit anyone. Picking one only fills the input; the gate
//! still checks the name on submit.
//!
//! Debouncing and dropping stale answers is the caller's job, see the guest
//! workflow crate.
use std::time::Duration;

use invite::{MAX_SUGGESTIONS, search_term};

use crate::{
    database::{GuestDirectory, StoreError},
    utils::bounded,
};

/// Names containing `term`, ignoring case, capped at `limit`.
pub fn matching_names<I>(names: I, term: &str, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let needle = term.to_lowercase();

    names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

pub async fn suggest(
    directory: &dyn GuestDirectory,
    raw: &str,
    limit: Duration,
) -> Result<Vec<String>, StoreError> {
    let Some(term) = search_term(raw) else {
        return Ok(Vec::new());
    };

    let mut suggestions = bounded(limit, directory.search(term, MAX_SUGGESTIONS)).await?;
    suggestions.truncate(MAX_SUGGESTIONS);

    Ok(suggestions)
}
