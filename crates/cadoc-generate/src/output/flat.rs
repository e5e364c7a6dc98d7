use std::path::Path;

use cadoc_core::{CoreError, Header, Record, encode_latin1};
use chrono::NaiveDate;

use crate::errors::GenerationError;
use crate::output::{WrittenFile, write_hashed};

/// Render a report file: header line, then one line per record sorted by key.
pub fn render_flat_file<R: Record>(records: &[R], date: NaiveDate) -> Result<String, GenerationError> {
    let mut keyed: Vec<(String, &R)> = records.iter().map(|record| (record.key(), record)).collect();
    keyed.sort_by(|left, right| left.0.cmp(&right.0));

    let header = Header::new(R::KIND.file_token(), records.len() as u64, date);
    let mut out = header.encode().map_err(CoreError::from)?;
    out.push('\n');
    for (key, record) in keyed {
        let line = record.encode().map_err(|source| GenerationError::Encode {
            kind: R::KIND,
            key,
            source,
        })?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Write `<TOKEN>.TXT` into `dir` as Latin-1.
pub fn write_flat_file<R: Record>(
    dir: &Path,
    records: &[R],
    date: NaiveDate,
) -> Result<WrittenFile, GenerationError> {
    let text = render_flat_file(records, date)?;
    let bytes = encode_latin1(&text)?;
    let path = dir.join(R::KIND.file_name());
    Ok(write_hashed(&path, &bytes, records.len() as u64)?)
}
