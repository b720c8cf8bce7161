pub mod commands {
    pub const FORMAT: &str = "WSF100";
    pub const CONFIGS: &str = "WSF200";
    pub const GENERIC: &str = "WSF000";
}
