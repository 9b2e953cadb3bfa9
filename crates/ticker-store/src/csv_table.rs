//! CSV encoding of the snapshot table.

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use std::io::{Read, Write};
use ticker_core::types::{Instrument, Quote, Row, Signal, Snapshot, Timeframe};
use tracing::warn;

/// Cell value for a field with no known value.
pub const UNKNOWN: &str = "unknown";

const KEY_COLUMN: &str = "stock";
const QUOTE_COLUMNS: [&str; 5] = ["Open", "High", "Low", "CMP", "Volume"];

/// Header row: key, quote fields, then one column per timeframe.
pub fn header() -> Vec<&'static str> {
    let mut columns = Vec::with_capacity(1 + QUOTE_COLUMNS.len() + Timeframe::ALL.len());
    columns.push(KEY_COLUMN);
    columns.extend(QUOTE_COLUMNS);
    columns.extend(Timeframe::ALL.iter().map(|tf| tf.label()));
    columns
}

/// Parse a table. Rows get `exchange` as their exchange qualifier.
///
/// An empty input is an empty snapshot. Any structural problem is returned
/// as a human-readable reason.
pub fn read_table<R: Read>(reader: R, exchange: &str) -> Result<Snapshot, String> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    if headers.is_empty() {
        return Ok(Snapshot::new());
    }
    let expected = header();
    if headers.iter().ne(expected.iter().copied()) {
        return Err(format!(
            "unexpected header [{}], expected [{}]",
            headers.iter().collect::<Vec<_>>().join(","),
            expected.join(",")
        ));
    }

    let mut snapshot = Snapshot::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| e.to_string())?;
        let line = index + 2;
        let row = parse_row(&record, exchange).map_err(|reason| format!("line {line}: {reason}"))?;

        if snapshot.contains(row.symbol()) {
            warn!(symbol = row.symbol(), line, "duplicate key in snapshot table, keeping first row");
            continue;
        }
        snapshot.upsert(row);
    }

    Ok(snapshot)
}

/// Serialize a table. Numbers use the shortest representation that parses
/// back to the same value, so reading and re-writing is byte-identical.
pub fn write_table<W: Write>(writer: W, snapshot: &Snapshot) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    writer.write_record(header())?;
    for row in snapshot.iter() {
        writer.write_record(format_row(row))?;
    }
    writer.flush()?;
    Ok(())
}

fn parse_row(record: &StringRecord, exchange: &str) -> Result<Row, String> {
    let expected = header().len();
    if record.len() != expected {
        return Err(format!("expected {expected} fields, found {}", record.len()));
    }

    let symbol = record[0].trim();
    if symbol.is_empty() {
        return Err("empty instrument key".to_string());
    }
    let mut row = Row::unknown(Instrument::new(symbol, exchange));

    let quote_cells: Vec<&str> = (1..=QUOTE_COLUMNS.len()).map(|i| record[i].trim()).collect();
    let unknown_count = quote_cells.iter().filter(|c| **c == UNKNOWN).count();
    if unknown_count == 0 {
        let mut values = [0.0f64; 5];
        for (slot, (cell, column)) in values.iter_mut().zip(quote_cells.iter().zip(QUOTE_COLUMNS)) {
            *slot = cell
                .parse::<f64>()
                .map_err(|_| format!("{column}: not a number: {cell:?}"))?;
        }
        let [open, high, low, close, volume] = values;
        row.quote = Some(Quote::untimed(open, high, low, close, volume));
    } else if unknown_count != QUOTE_COLUMNS.len() {
        return Err("quote fields must be all known or all unknown".to_string());
    }

    let offset = 1 + QUOTE_COLUMNS.len();
    for (i, timeframe) in Timeframe::ALL.iter().enumerate() {
        let cell = record[offset + i].trim();
        if cell == UNKNOWN {
            continue;
        }
        let signal: Signal = cell.parse().map_err(|e| format!("{}: {e}", timeframe.label()))?;
        row.signals.insert(*timeframe, signal);
    }

    Ok(row)
}

fn format_row(row: &Row) -> Vec<String> {
    let mut fields = Vec::with_capacity(header().len());
    fields.push(row.symbol().to_string());

    match &row.quote {
        Some(q) => fields.extend(
            [q.open, q.high, q.low, q.close, q.volume]
                .iter()
                .map(|v| v.to_string()),
        ),
        None => fields.extend(std::iter::repeat(UNKNOWN.to_string()).take(QUOTE_COLUMNS.len())),
    }

    for timeframe in Timeframe::ALL {
        fields.push(
            row.signal(timeframe)
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
        );
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
stock,Open,High,Low,CMP,Volume,1 Minute,15 Minute,1 Hour,1 Day
RELIANCE,2950.5,2961,2948.15,2955.35,120345,BUY,NEUTRAL,STRONG_BUY,SELL
TCS,unknown,unknown,unknown,unknown,unknown,unknown,SELL,unknown,NEUTRAL
";

    #[test]
    fn test_header_layout() {
        assert_eq!(
            header(),
            vec![
                "stock", "Open", "High", "Low", "CMP", "Volume", "1 Minute", "15 Minute",
                "1 Hour", "1 Day"
            ]
        );
    }

    #[test]
    fn test_read_table() {
        let snapshot = read_table(TABLE.as_bytes(), "NSE").unwrap();
        assert_eq!(snapshot.symbols(), vec!["RELIANCE", "TCS"]);

        let reliance = snapshot.get("RELIANCE").unwrap();
        assert_eq!(reliance.instrument.exchange, "NSE");
        let quote = reliance.quote.unwrap();
        assert_eq!(quote.open, 2950.5);
        assert_eq!(quote.close, 2955.35);
        assert_eq!(quote.timestamp, None);
        assert_eq!(reliance.signal(Timeframe::Hour1), Some(Signal::StrongBuy));

        let tcs = snapshot.get("TCS").unwrap();
        assert!(tcs.quote.is_none());
        assert_eq!(tcs.signal(Timeframe::Minute1), None);
        assert_eq!(tcs.signal(Timeframe::Minute15), Some(Signal::Sell));
    }

    #[test]
    fn test_resave_is_byte_identical() {
        let snapshot = read_table(TABLE.as_bytes(), "NSE").unwrap();
        let mut out = Vec::new();
        write_table(&mut out, &snapshot).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), TABLE);
    }

    #[test]
    fn test_empty_input_is_empty_snapshot() {
        let snapshot = read_table("".as_bytes(), "NSE").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_header_only_is_empty_snapshot() {
        let mut out = Vec::new();
        write_table(&mut out, &Snapshot::new()).unwrap();
        let snapshot = read_table(out.as_slice(), "NSE").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_rejects_foreign_header() {
        let err = read_table("symbol,price\nTCS,1\n".as_bytes(), "NSE").unwrap_err();
        assert!(err.contains("unexpected header"));
    }

    #[test]
    fn test_rejects_bad_cells() {
        let bad_number = TABLE.replace("2961", "abc");
        assert!(read_table(bad_number.as_bytes(), "NSE")
            .unwrap_err()
            .contains("High"));

        let bad_signal = TABLE.replace("STRONG_BUY", "HOLD");
        assert!(read_table(bad_signal.as_bytes(), "NSE")
            .unwrap_err()
            .contains("1 Hour"));

        let mixed = TABLE.replace("2950.5", UNKNOWN);
        assert!(read_table(mixed.as_bytes(), "NSE")
            .unwrap_err()
            .contains("all known or all unknown"));
    }

    #[test]
    fn test_duplicate_key_keeps_first() {
        let table = format!(
            "{TABLE}RELIANCE,1,1,1,1,1,SELL,SELL,SELL,SELL\n"
        );
        let snapshot = read_table(table.as_bytes(), "NSE").unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("RELIANCE").unwrap().quote.unwrap().open, 2950.5);
    }
}
