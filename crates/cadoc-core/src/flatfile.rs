//! Latin-1 flat files: one header line followed by fixed-width records.

use std::path::Path;

use encoding_rs::WINDOWS_1252;

use crate::entities::Record;
use crate::error::{CoreError, Result};
use crate::header::Header;

/// Header plus decoded records of one flat file.
#[derive(Debug, Clone)]
pub struct ParsedFile<R> {
    pub header: Header,
    pub records: Vec<R>,
}

/// Decode Latin-1 bytes. Every byte maps to a character, so this never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    let (decoded, _, _) = WINDOWS_1252.decode(bytes);
    decoded.into_owned()
}

/// Encode text as Latin-1, rejecting characters outside the code page.
pub fn encode_latin1(text: &str) -> Result<Vec<u8>> {
    let (encoded, _, unmappable) = WINDOWS_1252.encode(text);
    if unmappable {
        let offending = text
            .chars()
            .find(|ch| {
                let mut buf = [0u8; 4];
                WINDOWS_1252.encode(ch.encode_utf8(&mut buf)).2
            })
            .map(String::from)
            .unwrap_or_default();
        return Err(CoreError::Unencodable(offending));
    }
    Ok(encoded.into_owned())
}

/// Parse already-decoded file content, validating the header against the
/// kind's token and the number of data lines.
pub fn parse_flat_text<R: Record>(content: &str) -> Result<ParsedFile<R>> {
    let mut lines = content.lines();
    let header_line = lines.next().ok_or(CoreError::EmptyFile)?;
    if header_line.trim().is_empty() {
        return Err(CoreError::EmptyFile);
    }
    let header = Header::parse(header_line)?;

    let data: Vec<&str> = lines.collect();
    let data = trim_trailing_blank(data);
    header.validate(R::KIND.file_token(), data.len() as u64)?;

    let records = data
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            R::decode(line).map_err(|source| CoreError::Line {
                line: idx + 2,
                source,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ParsedFile { header, records })
}

/// Read and parse one flat file from disk.
pub fn read_flat_file<R: Record>(path: &Path) -> Result<ParsedFile<R>> {
    let bytes = std::fs::read(path)?;
    parse_flat_text(&decode_latin1(&bytes))
}

fn trim_trailing_blank(mut lines: Vec<&str>) -> Vec<&str> {
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::InfraEstablishment;
    use crate::error::HeaderError;
    use crate::header::ORIGINATOR_ID;

    fn header(token: &str, lines: usize) -> String {
        format!("{token:<8}20251015{ORIGINATOR_ID}{lines:014}")
    }

    const ROW_SP: &str = "20253SP01557006007785030046710200311358";
    const ROW_MG: &str = "20253MG00722601003613000021678100144520";

    #[test]
    fn parses_header_and_records() {
        let content = format!("{}\n{ROW_SP}\n{ROW_MG}\n", header("INFRESTA", 2));
        let parsed = parse_flat_text::<InfraEstablishment>(&content).expect("parse file");
        assert_eq!(parsed.header.lines, 2);
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1].uf, "MG");
        assert_eq!(parsed.records[0].total, 1_557_006);
    }

    #[test]
    fn line_count_mismatch_rejects_file() {
        let content = format!("{}\n{ROW_SP}\n", header("INFRESTA", 2));
        let err = parse_flat_text::<InfraEstablishment>(&content).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Header(HeaderError::LineCountMismatch {
                expected: 1,
                found: 2
            })
        ));
    }

    #[test]
    fn wrong_token_rejects_file() {
        let content = format!("{}\n{ROW_SP}\n", header("INFRTERM", 1));
        let err = parse_flat_text::<InfraEstablishment>(&content).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Header(HeaderError::NameMismatch { .. })
        ));
    }

    #[test]
    fn bad_line_reports_its_position() {
        let content = format!("{}\n{ROW_SP}\n20253MG0072X601\n", header("INFRESTA", 2));
        let err = parse_flat_text::<InfraEstablishment>(&content).unwrap_err();
        assert!(matches!(err, CoreError::Line { line: 3, .. }));
    }

    #[test]
    fn empty_content_is_rejected() {
        assert!(matches!(
            parse_flat_text::<InfraEstablishment>(""),
            Err(CoreError::EmptyFile)
        ));
    }

    #[test]
    fn latin1_round_trip_and_rejection() {
        let bytes = encode_latin1("Educação").unwrap();
        assert_eq!(bytes.len(), 8);
        assert_eq!(decode_latin1(&bytes), "Educação");
        assert!(matches!(
            encode_latin1("Educação ✓"),
            Err(CoreError::Unencodable(ch)) if ch == "✓"
        ));
    }

    #[test]
    fn reads_files_from_disk() {
        let dir = std::env::temp_dir().join(format!("cadoc_flat_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("INFRESTA.TXT");
        let content = format!("{}\r\n{ROW_SP}\r\n", header("INFRESTA", 1));
        std::fs::write(&path, encode_latin1(&content).unwrap()).unwrap();

        let parsed = read_flat_file::<InfraEstablishment>(&path).unwrap();
        assert_eq!(parsed.records.len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}
