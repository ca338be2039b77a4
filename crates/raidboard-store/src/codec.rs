//! CSV record encoding and decoding.
//!
//! The record files are plain RFC-4180 CSV: fields containing a comma,
//! double quote, CR, or LF are wrapped in double quotes with embedded quotes
//! doubled; everything else is written bare. The encoder is deterministic,
//! so serializing is a pure function of the in-memory model and
//! `save(load(file))` is byte-stable after one normalizing pass.

/// One decoded record with the physical line it started on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/// A parse failure at a specific physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub line: usize,
    pub reason: String,
}

fn needs_quoting(field: &str) -> bool {
    field.contains([',', '"', '\r', '\n'])
}

/// Encode one record as a comma-separated line, without a line terminator.
pub fn encode_record(fields: &[&str]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        if needs_quoting(field) {
            out.push('"');
            for c in field.chars() {
                if c == '"' {
                    out.push('"');
                }
                out.push(c);
            }
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out
}

/// Decode a whole file into records, honoring quoted fields.
///
/// Accepts both `\n` and `\r\n` line endings and skips blank lines. Quoted
/// fields may span multiple physical lines.
pub fn decode_records(input: &str) -> Result<Vec<Record>, DecodeError> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();

    let mut line = 1usize;
    let mut record_line = 1usize;
    let mut in_quotes = false;
    let mut after_quote = false;
    // Whether the current record has seen any content (a quoted empty
    // string counts; a bare newline does not).
    let mut has_content = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                        after_quote = true;
                    }
                }
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() && !after_quote => {
                in_quotes = true;
                has_content = true;
            }
            '"' => {
                return Err(DecodeError {
                    line,
                    reason: "unexpected quote inside field".to_string(),
                });
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                after_quote = false;
                has_content = true;
            }
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    return Err(DecodeError {
                        line,
                        reason: "bare carriage return in unquoted field".to_string(),
                    });
                }
                // The following '\n' terminates the record.
            }
            '\n' => {
                if has_content || !fields.is_empty() || !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                    records.push(Record {
                        line: record_line,
                        fields: std::mem::take(&mut fields),
                    });
                }
                line += 1;
                record_line = line;
                after_quote = false;
                has_content = false;
            }
            _ if after_quote => {
                return Err(DecodeError {
                    line,
                    reason: "expected delimiter after closing quote".to_string(),
                });
            }
            _ => {
                field.push(c);
                has_content = true;
            }
        }
    }

    if in_quotes {
        return Err(DecodeError {
            line,
            reason: "unterminated quoted field".to_string(),
        });
    }

    // Final record without a trailing newline.
    if has_content || !fields.is_empty() || !field.is_empty() {
        fields.push(field);
        records.push(Record {
            line: record_line,
            fields,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields_of(input: &str) -> Vec<Vec<String>> {
        decode_records(input)
            .unwrap()
            .into_iter()
            .map(|r| r.fields)
            .collect()
    }

    #[test]
    fn plain_fields_round_trip() {
        let line = encode_record(&["alice", "abc123"]);
        assert_eq!(line, "alice,abc123");
        assert_eq!(fields_of(&line), vec![vec!["alice", "abc123"]]);
    }

    #[test]
    fn fields_with_commas_and_quotes_are_quoted() {
        let line = encode_record(&["do x, then y", "say \"hi\""]);
        assert_eq!(line, "\"do x, then y\",\"say \"\"hi\"\"\"");
        assert_eq!(fields_of(&line), vec![vec!["do x, then y", "say \"hi\""]]);
    }

    #[test]
    fn multiline_field_round_trips() {
        let notes = "first objective\nsecond objective";
        let line = encode_record(&["Vow", notes]);
        let decoded = fields_of(&line);
        assert_eq!(decoded, vec![vec!["Vow".to_string(), notes.to_string()]]);
    }

    #[test]
    fn crlf_and_lf_both_terminate_records() {
        assert_eq!(
            fields_of("a,b\r\nc,d\n"),
            vec![vec!["a", "b"], vec!["c", "d"]]
        );
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(fields_of("a,b\n\n\nc,d\n"), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn empty_trailing_field_is_kept() {
        assert_eq!(fields_of("a,\n"), vec![vec!["a", ""]]);
    }

    #[test]
    fn record_lines_account_for_embedded_newlines() {
        let records = decode_records("h1,h2\n\"multi\nline\",x\nlast,y\n").unwrap();
        assert_eq!(records[0].line, 1);
        assert_eq!(records[1].line, 2);
        assert_eq!(records[2].line, 4);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = decode_records("\"never closed").unwrap_err();
        assert!(err.reason.contains("unterminated"));
    }

    #[test]
    fn stray_quote_is_an_error() {
        assert!(decode_records("ab\"cd\n").is_err());
        assert!(decode_records("\"ab\"cd\n").is_err());
    }
}
