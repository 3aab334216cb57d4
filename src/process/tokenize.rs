// src/process/tokenize.rs

pub const DEFAULT_DELIMITER: char = ',';
const QUOTE: char = '"';

/// Split one line into trimmed fields.
///
/// - `delimiter` only separates fields outside quotes
/// - `""` inside a quoted section is one literal quote
/// - an unterminated quote runs to end of line; the partial field is still emitted
/// - the last field is always emitted, so `""` yields `[""]`
pub fn tokenize_row(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == QUOTE {
            if in_quotes && chars.peek() == Some(&QUOTE) {
                current.push(QUOTE);
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }

    fields.push(current.trim().to_string());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn splits_and_trims() {
        assert_eq!(
            tokenize_row(" a , b,c ", ','),
            vec!["a".to_string(), "b".into(), "c".into()]
        );
    }

    #[test]
    fn quoted_delimiter_is_literal() {
        assert_eq!(
            tokenize_row(r#""Acme, Inc",5"#, ','),
            vec!["Acme, Inc".to_string(), "5".into()]
        );
    }

    #[test]
    fn doubled_quote_is_escaped() {
        assert_eq!(
            tokenize_row(r#""say ""hi""",x"#, ','),
            vec![r#"say "hi""#.to_string(), "x".into()]
        );
    }

    #[test]
    fn empty_line_and_trailing_delimiter() {
        assert_eq!(tokenize_row("", ','), vec![String::new()]);
        assert_eq!(
            tokenize_row("a,", ','),
            vec!["a".to_string(), String::new()]
        );
    }

    #[test]
    fn unterminated_quote_flushes_remainder() {
        assert_eq!(
            tokenize_row(r#"a,"b,c"#, ','),
            vec!["a".to_string(), "b,c".into()]
        );
    }

    #[test]
    fn other_delimiters() {
        assert_eq!(
            tokenize_row("a;\"b;c\";d", ';'),
            vec!["a".to_string(), "b;c".into(), "d".into()]
        );
    }

    #[test]
    fn round_trips_rows_written_by_csv_writer() -> Result<()> {
        let row = vec![
            "Greenko Energies Private Limited".to_string(),
            "Andhra Pradesh, Telangana".into(),
            r#"Phase "A""#.into(),
            "1,200.50".into(),
            String::new(),
        ];

        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        wtr.write_record(&row)?;
        let bytes = wtr.into_inner().map_err(|e| anyhow::anyhow!(e.to_string()))?;
        let line = String::from_utf8(bytes)?;

        assert_eq!(tokenize_row(line.trim_end_matches('\n'), ','), row);
        Ok(())
    }
}
