//! Console rendering of watcher updates

use rust_decimal::Decimal;
use std::io::{self, Stdout, Write};

use crate::exchange::FetchError;

/// One status update produced by a poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport<'a> {
    pub symbol: &'a str,
    pub interval: &'a str,
    pub average: Decimal,
    pub precision: u32,
    /// The sample behind this report opened a new interval
    pub new_interval: bool,
}

/// Output sink for watcher updates
pub trait Reporter {
    /// Render one poll cycle
    fn report(&mut self, status: &StatusReport<'_>) -> io::Result<()>;

    /// Render the diagnostic for the error that ended the run
    fn fatal(&mut self, error: &FetchError) -> io::Result<()>;

    /// Close off the status line on a clean stop
    fn finish(&mut self) -> io::Result<()>;
}

/// Single-line in-place status display.
///
/// The status line starts with a carriage return and carries no newline,
/// so each update overwrites the previous one on a terminal.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn report(&mut self, status: &StatusReport<'_>) -> io::Result<()> {
        if status.new_interval {
            write!(
                self.out,
                "\n\n---New {} interval started---\n",
                status.interval
            )?;
        }
        write!(
            self.out,
            "\rTrading Pair: {}, {} average: {:.*}",
            status.symbol, status.interval, status.precision as usize, status.average
        )?;
        self.out.flush()
    }

    fn fatal(&mut self, error: &FetchError) -> io::Result<()> {
        writeln!(self.out, "\nError: {}. Is this a valid trading pair?", error)?;
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn render(status: &StatusReport<'_>) -> String {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.report(status).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_status_line_overwrites() {
        let out = render(&StatusReport {
            symbol: "BTCUSDT",
            interval: "1m",
            average: dec!(50005),
            precision: 2,
            new_interval: false,
        });
        assert_eq!(out, "\rTrading Pair: BTCUSDT, 1m average: 50005.00");
    }

    #[test]
    fn test_new_interval_notice_precedes_status() {
        let out = render(&StatusReport {
            symbol: "ETHBTC",
            interval: "5m",
            average: dec!(0.05123456),
            precision: 8,
            new_interval: true,
        });
        assert_eq!(
            out,
            "\n\n---New 5m interval started---\n\rTrading Pair: ETHBTC, 5m average: 0.05123456"
        );
    }

    #[test]
    fn test_fatal_diagnostic_names_cause() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.fatal(&FetchError::Empty).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            out,
            "\nError: exchange returned no candles. Is this a valid trading pair?\n"
        );
    }
}
