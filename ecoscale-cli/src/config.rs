use std::time::Duration;

use clap::{Parser, ValueEnum};
use ecoscale_core::{label::DEFAULT_LOCATION, label::LabelLocale, ports::DEFAULT_COLLECTION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LocaleArg {
    Id,
    En,
}

impl From<LocaleArg> for LabelLocale {
    fn from(arg: LocaleArg) -> Self {
        match arg {
            LocaleArg::Id => LabelLocale::Indonesian,
            LocaleArg::En => LabelLocale::English,
        }
    }
}

/// Live waste collection totals from an EcoScale document endpoint.
#[derive(Parser, Debug, Clone)]
#[command(name = "ecoscale", version)]
#[command(about = "Print today's and this week's waste totals as they change", long_about = None)]
pub(crate) struct Args {
    /// Base URL of the document endpoint
    #[arg(long, env = "ECOSCALE_ENDPOINT", value_name = "URL")]
    pub(crate) endpoint: String,

    /// Collection holding the weighing records
    #[arg(long, env = "ECOSCALE_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub(crate) collection: String,

    /// Seconds between polls of the endpoint
    #[arg(long, env = "ECOSCALE_POLL_SECS", default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) poll_secs: u64,

    /// Location shown in the date label; empty to omit it
    #[arg(long, env = "ECOSCALE_LOCATION", default_value = DEFAULT_LOCATION)]
    pub(crate) location: String,

    /// Language of the date label
    #[arg(long, env = "ECOSCALE_LOCALE", value_enum, default_value_t = LocaleArg::Id)]
    pub(crate) locale: LocaleArg,
}

impl Args {
    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_dashboard() {
        let args = Args::try_parse_from(["ecoscale", "--endpoint", "http://localhost:8080"])
            .expect("endpoint is the only required argument");

        assert_eq!(args.collection, "sampah");
        assert_eq!(args.poll_interval(), Duration::from_secs(5));
        assert_eq!(args.location, "Semarang, Indonesia");
        assert_eq!(LabelLocale::from(args.locale), LabelLocale::Indonesian);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let parsed = Args::try_parse_from([
            "ecoscale",
            "--endpoint",
            "http://localhost:8080",
            "--poll-secs",
            "0",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn english_locale_is_selectable() {
        let args = Args::try_parse_from([
            "ecoscale",
            "--endpoint",
            "http://localhost:8080",
            "--locale",
            "en",
        ])
        .expect("valid arguments");
        assert_eq!(LabelLocale::from(args.locale), LabelLocale::English);
    }
}
