use super::*;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct General {
    // how often the runtime is sampled
    #[serde(default = "poll_interval")]
    poll_interval: String,

    // how often buffered records are sent to the collector
    #[serde(default = "report_interval")]
    report_interval: String,

    // collector host[:port] or full URL
    #[serde(default = "address")]
    address: String,

    #[serde(default = "buffer_capacity")]
    buffer_capacity: usize,

    // an override that did not parse as an integer
    #[serde(skip)]
    invalid_capacity: Option<String>,
}

impl Default for General {
    fn default() -> Self {
        Self {
            poll_interval: poll_interval(),
            report_interval: report_interval(),
            address: address(),
            buffer_capacity: buffer_capacity(),
            invalid_capacity: None,
        }
    }
}

impl General {
    pub fn apply(&mut self, overrides: &Overrides) {
        if let Some(v) = present(&overrides.poll_interval) {
            self.poll_interval = v.to_string();
        }

        if let Some(v) = present(&overrides.report_interval) {
            self.report_interval = v.to_string();
        }

        if let Some(v) = present(&overrides.address) {
            self.address = v.to_string();
        }

        if let Some(v) = present(&overrides.buffer_capacity) {
            match v.parse() {
                Ok(capacity) => {
                    self.buffer_capacity = capacity;
                    self.invalid_capacity = None;
                }
                Err(_) => self.invalid_capacity = Some(v.to_string()),
            }
        }
    }

    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        parse_interval("poll interval", &self.poll_interval, poll_interval())
    }

    pub fn report_interval(&self) -> Result<Duration, ConfigError> {
        parse_interval("report interval", &self.report_interval, report_interval())
    }

    pub fn address(&self) -> String {
        let address = self.address.trim();

        if address.is_empty() {
            super::address()
        } else {
            address.to_string()
        }
    }

    pub fn buffer_capacity(&self) -> Result<usize, ConfigError> {
        if let Some(ref raw) = self.invalid_capacity {
            return Err(ConfigError::Capacity(raw.clone()));
        }

        if self.buffer_capacity == 0 {
            return Err(ConfigError::Capacity(self.buffer_capacity.to_string()));
        }

        Ok(self.buffer_capacity)
    }
}

fn parse_interval(
    name: &'static str,
    value: &str,
    default: String,
) -> Result<Duration, ConfigError> {
    let value = match value.trim() {
        "" => default,
        v => v.to_string(),
    };

    let duration: Duration = value
        .parse::<humantime::Duration>()
        .map_err(|source| ConfigError::Duration {
            name,
            value: value.clone(),
            source,
        })?
        .into();

    if duration.is_zero() {
        return Err(ConfigError::ZeroDuration(name));
    }

    Ok(duration)
}
