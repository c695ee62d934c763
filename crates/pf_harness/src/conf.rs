//! Keyword configuration text front-end. One option per line,
//! `keyword [value]`, `#` comment lines; keywords map 1:1 onto the flag
//! set so both front-ends funnel into the same handler.

use anyhow::{bail, Result};

use crate::config::ConfOption;

pub fn parse_conf_text(text: &str) -> Result<Vec<ConfOption>> {
    let mut options = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (keyword, arg) = match line.split_once(char::is_whitespace) {
            Some((keyword, value)) => (keyword, Some(value.trim())),
            None => (line, None),
        };

        let option = match keyword {
            "verbose" => ConfOption::Verbosity(arg.map(str::to_owned)),
            "device" => ConfOption::Device(arg.unwrap_or_default().to_owned()),
            "frequency" => ConfOption::Frequency(required(keyword, arg, lineno)?),
            "sample_rate" => ConfOption::SampleRate(required(keyword, arg, lineno)?),
            "protocol" => ConfOption::Protocol(required(keyword, arg, lineno)?),
            "register_all" => ConfOption::RegisterAll,
            _ => bail!("unknown keyword {keyword:?} on config line {}", lineno + 1),
        };
        options.push(option);
    }
    Ok(options)
}

fn required(keyword: &str, arg: Option<&str>, lineno: usize) -> Result<String> {
    match arg {
        Some(value) if !value.is_empty() => Ok(value.to_owned()),
        _ => bail!(
            "missing value for keyword {keyword:?} on config line {}",
            lineno + 1
        ),
    }
}
