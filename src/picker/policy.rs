use crate::error::{PickerError, Result};
use crate::settings::PickerSettings;
use url::Url;

/// Hostnames where the picker is always permitted
pub const LOCAL_DEV_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0", "[::1]"];

pub fn is_local_dev_host(hostname: &str) -> bool {
    LOCAL_DEV_HOSTS.contains(&hostname)
}

/// Whether the picker may activate on `hostname`
///
/// Local development hosts always pass; anything else must appear verbatim in the allow-list.
pub fn is_allowed_site(hostname: &str, settings: &PickerSettings) -> bool {
    is_local_dev_host(hostname) || settings.allowed_sites.iter().any(|site| site == hostname)
}

/// Hostname as the page's location API reports it (IPv6 hosts keep their brackets)
pub fn hostname_of(page_url: &str) -> Result<String> {
    let url = Url::parse(page_url)
        .map_err(|e| PickerError::InvalidUrl { url: page_url.to_string(), reason: e.to_string() })?;
    Ok(url.host_str().unwrap_or_default().to_string())
}
