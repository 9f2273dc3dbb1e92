//! # Guest Seeding
//!
//! Fills the `<prefix>:guests` hash the identity gate and name search read from.
//!
//! ## Input
//! - Plain text, one guest per line
//! - Blank lines and lines starting with `#` are ignored
//! - Whitespace inside a name is collapsed, outer whitespace trimmed
//! - Names equal ignoring case are loaded once, first spelling wins
//!
//! ## Notes
//! - Without `--replace` names are merged into whatever is already stored. An
//!   existing entry with a different spelling is overwritten by the file's.
//! - Loading is idempotent, the hash field is the lowercased name.
use std::{path::Path, time::Duration};

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use server::database::{DEFAULT_PREFIX, RedisStore, init_redis};

pub mod utils;

use utils::parse_guests;

const CHUNK: usize = 50;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn load_guests(path: &Path, redis_url: &str, replace: bool) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    let parsed = parse_guests(&raw);
    println!("Loaded Guests: {}", parsed.names.len());
    println!("Skipped Duplicates: {}\n", parsed.duplicates);

    if parsed.names.is_empty() {
        println!("No guests found. Exiting.");
        return Ok(());
    }

    let connection = init_redis(redis_url, CONNECT_TIMEOUT)
        .await
        .with_context(|| format!("connecting to {redis_url}"))?;
    let store = RedisStore::new(connection, DEFAULT_PREFIX, Duration::ZERO);

    if replace {
        store.clear_guests().await.context("clearing guest list")?;
        println!("Cleared existing guest list");
    }

    let pb = ProgressBar::new(parsed.names.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut written = 0;
    for chunk in parsed.names.chunks(CHUNK) {
        pb.set_message(format!("Writing {}", chunk[0]));

        written += store
            .insert_guests(chunk)
            .await
            .context("writing guests")?;

        pb.inc(chunk.len() as u64);
    }

    pb.finish_with_message("Done");
    println!("\nGuests Written: {written}");

    Ok(())
}
