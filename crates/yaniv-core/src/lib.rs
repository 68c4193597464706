#![deny(warnings)]
pub mod ai;
pub mod belief;
pub mod game;
pub mod meld;
pub mod model;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "yaniv"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::AppInfo;

    #[test]
    fn exposes_static_metadata() {
        assert_eq!(AppInfo::name(), "yaniv");
        assert!(!AppInfo::version().is_empty());
    }
}
