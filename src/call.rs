use crate::{
    error::{CallFileError, Result},
    preflight::{check_directive_value, check_variable, ValidationReport},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// The dialable side of a call file: which channel to ring and how to dial it.
///
/// `wait_time`, `retry_time` and `max_retries` are rendered whenever they are
/// set, including when they are `0`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Call {
    channel: String,
    #[serde(default)]
    callerid: Option<String>,
    #[serde(default)]
    variables: Option<BTreeMap<String, String>>,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    wait_time: Option<u32>,
    #[serde(default)]
    retry_time: Option<u32>,
    #[serde(default)]
    max_retries: Option<u32>,
}

impl Call {
    pub fn new(channel: impl Into<String>) -> Result<Self> {
        let channel = channel.into();
        if channel.is_empty() {
            return Err(CallFileError::MissingField("channel"));
        }
        Ok(Self {
            channel,
            callerid: None,
            variables: None,
            account: None,
            wait_time: None,
            retry_time: None,
            max_retries: None,
        })
    }

    /// Dial `number` out of a named trunk, e.g. `SIP/flowroute/18002223333`.
    /// `Local` trunks use the `Local/<number>@<context>` form instead.
    pub fn from_trunk(kind: &str, trunk: &str, number: &str) -> Result<Self> {
        if kind.is_empty() {
            return Err(CallFileError::MissingField("trunk_type"));
        }
        if trunk.is_empty() {
            return Err(CallFileError::MissingField("trunk_name"));
        }
        if number.is_empty() {
            return Err(CallFileError::MissingField("number"));
        }
        let channel = if kind.eq_ignore_ascii_case("local") {
            format!("{}/{}@{}", kind, number, trunk)
        } else {
            format!("{}/{}/{}", kind, trunk, number)
        };
        Self::new(channel)
    }

    /// An empty caller ID clears the directive.
    pub fn with_callerid(mut self, callerid: impl Into<String>) -> Self {
        self.callerid = Some(callerid.into()).filter(|c| !c.is_empty());
        self
    }

    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_wait_time(mut self, seconds: u32) -> Self {
        self.wait_time = Some(seconds);
        self
    }

    pub fn with_retry_time(mut self, seconds: u32) -> Self {
        self.retry_time = Some(seconds);
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn callerid(&self) -> Option<&str> {
        self.callerid.as_deref()
    }

    pub fn variables(&self) -> Option<&BTreeMap<String, String>> {
        self.variables.as_ref()
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn wait_time(&self) -> Option<u32> {
        self.wait_time
    }

    pub fn retry_time(&self) -> Option<u32> {
        self.retry_time
    }

    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        if self.channel.is_empty() {
            report.push("call.channel", "must not be empty");
        }
        check_directive_value(&mut report, "call.channel", &self.channel);
        if let Some(callerid) = &self.callerid {
            check_directive_value(&mut report, "call.callerid", callerid);
        }
        if let Some(account) = &self.account {
            check_directive_value(&mut report, "call.account", account);
        }
        if let Some(variables) = &self.variables {
            for (key, value) in variables {
                check_variable(&mut report, "call.variables", key, value);
            }
        }
        report
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![format!("Channel: {}", self.channel)];
        if let Some(callerid) = self.callerid.as_deref().filter(|c| !c.is_empty()) {
            lines.push(format!("Callerid: {}", callerid));
        }
        if let Some(variables) = &self.variables {
            for (key, value) in variables {
                lines.push(format!("Set: {}={}", key, value));
            }
        }
        if let Some(account) = &self.account {
            lines.push(format!("Account: {}", account));
        }
        if let Some(wait_time) = self.wait_time {
            lines.push(format!("WaitTime: {}", wait_time));
        }
        if let Some(retry_time) = self.retry_time {
            lines.push(format!("RetryTime: {}", retry_time));
        }
        if let Some(max_retries) = self.max_retries {
            lines.push(format!("Maxretries: {}", max_retries));
        }
        lines
    }
}

/// Caller ID assembled from a display name and a number,
/// rendered as `"name" <number>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerId {
    pub name: Option<String>,
    pub number: Option<String>,
}

impl CallerId {
    pub fn new(name: Option<&str>, number: Option<&str>) -> Self {
        Self {
            name: name.filter(|s| !s.is_empty()).map(str::to_string),
            number: number.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.number) {
            (Some(name), Some(number)) => write!(f, "\"{}\" <{}>", name, number),
            (Some(name), None) => write!(f, "\"{}\"", name),
            (None, Some(number)) => write!(f, "<{}>", number),
            (None, None) => Ok(()),
        }
    }
}

impl From<CallerId> for String {
    fn from(callerid: CallerId) -> Self {
        callerid.to_string()
    }
}
