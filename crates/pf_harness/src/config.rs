//! Harness configuration and the single option handler both front-ends
//! feed. Any `Err` out of [`apply_option`] is fatal: the caller stops
//! processing options and exits with status 1.

use anyhow::{bail, Context, Result};

use crate::registry::{ActivationSet, DescriptorTable};

pub const MAX_FREQS: usize = 32;
pub const DEFAULT_SAMPLE_RATE: u32 = 250_000;
/// Center frequencies above this need the wider FSK sample rate.
pub const FSK_PULSE_DETECTOR_LIMIT: u32 = 800_000_000;
const RAISED_SAMPLE_RATE: u32 = 1_000_000;

/// One normalized option, regardless of which front-end produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfOption {
    Verbosity(Option<String>),
    Frequency(String),
    SampleRate(String),
    RegisterAll,
    Protocol(String),
    /// Recognized by the config lexer for compatibility, unsupported here.
    Device(String),
}

#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub verbosity: u32,
    pub sample_rate: u32,
    pub frequencies: Vec<u32>,
    pub no_default_protocols: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            frequencies: Vec::new(),
            no_default_protocols: false,
        }
    }
}

pub fn apply_option(
    cfg: &mut HarnessConfig,
    table: &DescriptorTable,
    set: &mut ActivationSet,
    opt: &ConfOption,
) -> Result<()> {
    match opt {
        ConfOption::Verbosity(None) => cfg.verbosity += 1,
        ConfOption::Verbosity(Some(arg)) => cfg.verbosity = parse_bool_or_count(arg),
        ConfOption::Frequency(arg) => {
            if cfg.frequencies.len() < MAX_FREQS {
                let hz = parse_metric_u32(arg).context("-f")?;
                if hz > FSK_PULSE_DETECTOR_LIMIT && cfg.sample_rate == DEFAULT_SAMPLE_RATE {
                    cfg.sample_rate = RAISED_SAMPLE_RATE;
                    eprintln!(
                        "Frequency above 800 MHz, raising sample rate to 1000 kS/s (use -s to override)"
                    );
                }
                cfg.frequencies.push(hz);
            } else {
                eprintln!("Max number of frequencies reached {MAX_FREQS}");
            }
        }
        ConfOption::SampleRate(arg) => cfg.sample_rate = parse_metric_u32(arg).context("-s")?,
        ConfOption::RegisterAll => {
            cfg.no_default_protocols = true;
            set.activate_all(table)?;
        }
        ConfOption::Protocol(arg) => apply_protocol_select(cfg, table, set, arg)?,
        ConfOption::Device(_) => bail!("input devices are not supported by this harness"),
    }
    Ok(())
}

/// The `-R n[:params]` directive: activate n, deactivate -n, or clear on 0.
fn apply_protocol_select(
    cfg: &mut HarnessConfig,
    table: &DescriptorTable,
    set: &mut ActivationSet,
    arg: &str,
) -> Result<()> {
    let (number, params) = split_protocol_arg(arg);
    let n = parse_leading_i32(number);

    // Magnitude check via unsigned_abs: negating i32::MIN would overflow.
    if n.unsigned_abs() > table.len() as u32 {
        bail!("protocol number specified ({n}) is larger than number of protocols");
    }
    if n != 0 {
        let Some(descriptor) = table.get(n.unsigned_abs()) else {
            bail!("protocol number specified ({n}) is larger than number of protocols");
        };
        if !descriptor.tier().selectable() {
            bail!("protocol number specified ({n}) is invalid");
        }

        if n < 0 && !cfg.no_default_protocols {
            // "Everything except this one": populate the defaults first.
            set.activate_defaults(table)?;
        }
        cfg.no_default_protocols = true;

        if n > 0 {
            set.activate(descriptor, params)?;
        } else {
            set.deactivate(n.unsigned_abs());
        }
    } else {
        cfg.no_default_protocols = true;
        eprintln!("Disabling all protocol decoders.");
        set.clear();
    }
    Ok(())
}

/// Runs exactly once, after every option source is exhausted: if no
/// explicit selection suppressed them, activate the defaults.
pub fn finalize_activation(
    cfg: &HarnessConfig,
    table: &DescriptorTable,
    set: &mut ActivationSet,
) -> Result<()> {
    if !cfg.no_default_protocols {
        set.activate_defaults(table)?;
    }
    Ok(())
}

fn split_protocol_arg(arg: &str) -> (&str, Option<&str>) {
    match arg.split_once(':') {
        Some((number, params)) => (number, Some(params)),
        None => (arg, None),
    }
}

/// atoi-style leading integer: optional sign, digits, trailing text
/// ignored, 0 when no digits are present. Saturates on overflow.
fn parse_leading_i32(arg: &str) -> i32 {
    let arg = arg.trim_start();
    let (negative, rest) = match arg.as_bytes().first() {
        Some(b'-') => (true, &arg[1..]),
        Some(b'+') => (false, &arg[1..]),
        _ => (false, arg),
    };
    let digits: &str = &rest[..rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len())];
    if digits.is_empty() {
        return 0;
    }
    // A parse failure here can only be overflow, so it saturates too.
    let magnitude: i64 = digits
        .parse()
        .unwrap_or(i64::MAX)
        .min(i64::from(i32::MAX) + 1);
    let value = if negative { -magnitude } else { magnitude };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Boolean-or-count argument: truthy words mean 1, otherwise the leading
/// non-negative integer, 0 when neither applies.
pub fn parse_bool_or_count(arg: &str) -> u32 {
    if ["true", "yes", "on", "enable"]
        .iter()
        .any(|word| arg.eq_ignore_ascii_case(word))
    {
        return 1;
    }
    parse_leading_i32(arg).max(0) as u32
}

/// Unsigned value with an optional metric suffix (`k`, `M`, `G`, any
/// case); a fractional part is allowed, e.g. `433.92M`.
pub fn parse_metric_u32(arg: &str) -> Result<u32> {
    let arg = arg.trim();
    if arg.is_empty() {
        bail!("missing numeric value");
    }
    let (number, scale) = match arg.as_bytes()[arg.len() - 1] {
        b'k' | b'K' => (&arg[..arg.len() - 1], 1e3),
        b'M' | b'm' => (&arg[..arg.len() - 1], 1e6),
        b'G' | b'g' => (&arg[..arg.len() - 1], 1e9),
        _ => (arg, 1.0),
    };
    let value: f64 = number
        .parse()
        .with_context(|| format!("invalid numeric value {arg:?}"))?;
    let scaled = value * scale;
    if !scaled.is_finite() || scaled < 0.0 || scaled > f64::from(u32::MAX) {
        bail!("numeric value {arg:?} out of range");
    }
    Ok(scaled.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ActivationSet, DescriptorTable};

    fn fresh() -> (HarnessConfig, DescriptorTable, ActivationSet) {
        (
            HarnessConfig::default(),
            DescriptorTable::builtin(),
            ActivationSet::new(),
        )
    }

    #[test]
    fn metric_suffixes() {
        assert_eq!(parse_metric_u32("433920000").expect("plain"), 433_920_000);
        assert_eq!(parse_metric_u32("433.92M").expect("mega"), 433_920_000);
        assert_eq!(parse_metric_u32("250k").expect("kilo"), 250_000);
        assert_eq!(parse_metric_u32("1G").expect("giga"), 1_000_000_000);
        assert!(parse_metric_u32("fast").is_err());
        assert!(parse_metric_u32("-1M").is_err());
        assert!(parse_metric_u32("5G").is_err());
        assert!(parse_metric_u32("").is_err());
    }

    #[test]
    fn bool_or_count_values() {
        assert_eq!(parse_bool_or_count("true"), 1);
        assert_eq!(parse_bool_or_count("YES"), 1);
        assert_eq!(parse_bool_or_count("3"), 3);
        assert_eq!(parse_bool_or_count("2x"), 2);
        assert_eq!(parse_bool_or_count("nope"), 0);
    }

    #[test]
    fn leading_int_is_atoi_compatible() {
        assert_eq!(parse_leading_i32("3"), 3);
        assert_eq!(parse_leading_i32("-2"), -2);
        assert_eq!(parse_leading_i32("+7"), 7);
        assert_eq!(parse_leading_i32("4:extra"), 4);
        assert_eq!(parse_leading_i32("xyz"), 0);
        assert_eq!(parse_leading_i32("-"), 0);
        assert_eq!(parse_leading_i32("99999999999"), i32::MAX);
        assert_eq!(parse_leading_i32("-99999999999"), i32::MIN);
        // Magnitudes past i64 must still saturate, not read as zero.
        assert_eq!(parse_leading_i32("99999999999999999999"), i32::MAX);
        assert_eq!(parse_leading_i32("-99999999999999999999"), i32::MIN);
    }

    #[test]
    fn verbosity_increments_and_assigns() {
        let (mut cfg, table, mut set) = fresh();
        apply_option(&mut cfg, &table, &mut set, &ConfOption::Verbosity(None))
            .expect("increment");
        apply_option(&mut cfg, &table, &mut set, &ConfOption::Verbosity(None))
            .expect("increment");
        assert_eq!(cfg.verbosity, 2);
        apply_option(
            &mut cfg,
            &table,
            &mut set,
            &ConfOption::Verbosity(Some("5".into())),
        )
        .expect("assign");
        assert_eq!(cfg.verbosity, 5);
    }

    #[test]
    fn frequency_raises_default_sample_rate_once() {
        let (mut cfg, table, mut set) = fresh();
        apply_option(
            &mut cfg,
            &table,
            &mut set,
            &ConfOption::Frequency("915M".into()),
        )
        .expect("frequency");
        assert_eq!(cfg.frequencies, vec![915_000_000]);
        assert_eq!(cfg.sample_rate, 1_000_000);

        // An explicit sample rate is never overridden.
        let (mut cfg, table, mut set) = fresh();
        apply_option(
            &mut cfg,
            &table,
            &mut set,
            &ConfOption::SampleRate("2M".into()),
        )
        .expect("sample rate");
        apply_option(
            &mut cfg,
            &table,
            &mut set,
            &ConfOption::Frequency("915M".into()),
        )
        .expect("frequency");
        assert_eq!(cfg.sample_rate, 2_000_000);
    }

    #[test]
    fn frequency_list_is_capped_not_fatal() {
        let (mut cfg, table, mut set) = fresh();
        for _ in 0..MAX_FREQS + 3 {
            apply_option(
                &mut cfg,
                &table,
                &mut set,
                &ConfOption::Frequency("433.92M".into()),
            )
            .expect("capped frequency must not be fatal");
        }
        assert_eq!(cfg.frequencies.len(), MAX_FREQS);
    }

    #[test]
    fn register_all_forces_every_selectable_protocol() {
        let (mut cfg, table, mut set) = fresh();
        apply_option(&mut cfg, &table, &mut set, &ConfOption::RegisterAll)
            .expect("register all");
        assert!(cfg.no_default_protocols);
        assert_eq!(set.ids(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn protocol_select_positive_activates_with_params() {
        let (mut cfg, table, mut set) = fresh();
        apply_option(
            &mut cfg,
            &table,
            &mut set,
            &ConfOption::Protocol("3:fast".into()),
        )
        .expect("select");
        assert!(cfg.no_default_protocols);
        assert_eq!(set.ids(), vec![3]);
    }

    #[test]
    fn protocol_select_negative_removes_from_defaults() {
        let (mut cfg, table, mut set) = fresh();
        apply_option(&mut cfg, &table, &mut set, &ConfOption::Protocol("-2".into()))
            .expect("deselect");
        assert!(cfg.no_default_protocols);
        assert_eq!(set.ids(), vec![1]);
    }

    #[test]
    fn protocol_select_zero_clears_everything() {
        let (mut cfg, table, mut set) = fresh();
        apply_option(&mut cfg, &table, &mut set, &ConfOption::Protocol("1".into()))
            .expect("select");
        apply_option(&mut cfg, &table, &mut set, &ConfOption::Protocol("0".into()))
            .expect("clear");
        assert!(set.is_empty());
        assert!(cfg.no_default_protocols);
    }

    #[test]
    fn protocol_select_out_of_range_is_fatal() {
        let (mut cfg, table, mut set) = fresh();
        for arg in ["6", "-6", "99"] {
            let err = apply_option(
                &mut cfg,
                &table,
                &mut set,
                &ConfOption::Protocol(arg.into()),
            )
            .expect_err("out of range must be fatal");
            assert!(err.to_string().contains("larger than"), "got: {err}");
        }
    }

    #[test]
    fn protocol_select_extreme_magnitudes_are_fatal() {
        let (mut cfg, table, mut set) = fresh();
        // i32::MIN, saturated-negative, and a magnitude past i64 must
        // all hit the out-of-range error, never clear-all or panic.
        for arg in [
            "-2147483648",
            "-99999999999",
            "99999999999999999999",
            "-99999999999999999999",
        ] {
            let err = apply_option(
                &mut cfg,
                &table,
                &mut set,
                &ConfOption::Protocol(arg.into()),
            )
            .expect_err("extreme magnitude must be fatal");
            assert!(err.to_string().contains("larger than"), "got: {err}");
        }
        assert!(!cfg.no_default_protocols);
    }

    #[test]
    fn protocol_select_unavailable_tier_is_fatal() {
        let (mut cfg, table, mut set) = fresh();
        for arg in ["5", "-5"] {
            let err = apply_option(
                &mut cfg,
                &table,
                &mut set,
                &ConfOption::Protocol(arg.into()),
            )
            .expect_err("unavailable tier must be fatal");
            assert!(err.to_string().contains("invalid"), "got: {err}");
        }
    }

    #[test]
    fn suppression_latches_across_selections() {
        let (mut cfg, table, mut set) = fresh();
        apply_option(&mut cfg, &table, &mut set, &ConfOption::Protocol("3".into()))
            .expect("select");
        // A later negative selection must not re-populate the defaults.
        apply_option(&mut cfg, &table, &mut set, &ConfOption::Protocol("-3".into()))
            .expect("deselect");
        assert!(set.is_empty());
        finalize_activation(&cfg, &table, &mut set).expect("finalize");
        assert!(set.is_empty());
    }

    #[test]
    fn finalize_populates_defaults_when_untouched() {
        let (mut cfg, table, mut set) = fresh();
        apply_option(&mut cfg, &table, &mut set, &ConfOption::Verbosity(None))
            .expect("verbosity");
        finalize_activation(&cfg, &table, &mut set).expect("finalize");
        assert_eq!(set.ids(), vec![1, 2]);
    }

    #[test]
    fn device_option_is_fatal() {
        let (mut cfg, table, mut set) = fresh();
        assert!(apply_option(
            &mut cfg,
            &table,
            &mut set,
            &ConfOption::Device("rtl=0".into())
        )
        .is_err());
    }
}
