use std::time::Duration;

use tokio::time::{error::Elapsed, timeout};

/// Runs `future` with a deadline, folding expiry into the caller's error type.
pub async fn bounded<T, E, F>(limit: Duration, future: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: From<Elapsed>,
{
    timeout(limit, future).await?
}

/// Hides most of the local part so logs can tell guests apart without
/// carrying their addresses, e.g. `jane@x.com` -> `j***@x.com`.
pub fn mask_email(email: &str) -> String {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            let first = local.chars().next().map(String::from).unwrap_or_default();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}
