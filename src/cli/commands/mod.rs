//! CLI command implementations.

pub mod fetch;
pub mod init;
pub mod run;
pub mod show;
pub mod validate;
pub mod watch;

use ticker_core::types::{Row, Timeframe};

/// Plain-text rendering of rows for terminal output.
pub fn format_rows<'a>(rows: impl IntoIterator<Item = &'a Row>) -> String {
    let mut out = format!(
        "{:<12} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Stock", "Open", "High", "Low", "CMP", "Volume"
    );
    for tf in Timeframe::ALL {
        out.push_str(&format!(" {:<12}", tf.label()));
    }
    let header_len = out.trim_end().len();
    out.truncate(header_len);
    out.push('\n');

    for row in rows {
        let mut line = format!("{:<12}", row.symbol());
        match row.quote {
            Some(q) => line.push_str(&format!(
                " {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>12.0}",
                q.open, q.high, q.low, q.close, q.volume
            )),
            None => line.push_str(&format!(
                " {:>10} {:>10} {:>10} {:>10} {:>12}",
                "unknown", "unknown", "unknown", "unknown", "unknown"
            )),
        }
        for tf in Timeframe::ALL {
            let signal = row.signal(tf).map_or("unknown", |s| s.as_str());
            line.push_str(&format!(" {:<12}", signal));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticker_core::types::{Instrument, Quote, Signal};

    #[test]
    fn test_format_rows() {
        let rows = vec![
            Row::unknown(Instrument::new("TCS", "NSE"))
                .with_quote(Quote::untimed(4000.0, 4010.5, 3990.0, 4005.25, 120_000.0))
                .with_signal(Timeframe::Daily, Signal::StrongBuy),
            Row::unknown(Instrument::new("INFY", "NSE")),
        ];

        let text = format_rows(&rows);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Stock"));
        assert!(lines[0].ends_with("1 Day"));
        assert!(lines[1].contains("4005.25"));
        assert!(lines[1].ends_with("STRONG_BUY"));
        assert!(lines[2].starts_with("INFY"));
        assert!(lines[2].contains("unknown"));
    }
}
