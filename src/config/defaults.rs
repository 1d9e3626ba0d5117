//! Default values for configuration fields.

pub(super) fn host() -> String {
    "127.0.0.1".to_owned()
}

pub(super) const fn port() -> u16 {
    5001
}

pub(super) fn log_level() -> String {
    "info".to_owned()
}

pub(super) const fn pool_size() -> u32 {
    8
}

pub(super) const fn enabled() -> bool {
    true
}

pub(super) const fn default_lead_minutes() -> u32 {
    5
}

pub(super) const fn relay_timeout_secs() -> u64 {
    10
}
