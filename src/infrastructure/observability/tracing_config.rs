#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub environment: String,
    pub json_format: bool,
}

impl TracingConfig {
    pub fn new(environment: impl Into<String>, log_format: Option<&str>) -> Self {
        Self {
            environment: environment.into(),
            json_format: log_format.is_some_and(|v| v.eq_ignore_ascii_case("json")),
        }
    }
}
