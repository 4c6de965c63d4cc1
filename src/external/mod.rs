pub mod checkout;
pub mod sms;
pub mod supabase;

pub use checkout::*;
pub use sms::*;
pub use supabase::*;

use crate::error::AppResult;
use reqwest::Client;
use std::time::Duration;

/// Outbound calls give up after this long; nothing is retried.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) fn http_client(agent: &str) -> AppResult<Client> {
    let client = Client::builder()
        .user_agent(agent)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    Ok(client)
}
