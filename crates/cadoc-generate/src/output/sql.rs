use std::path::Path;

use cadoc_core::Record;

use crate::errors::GenerationError;
use crate::output::{WrittenFile, write_hashed};

/// One insert statement per line, in record order.
pub fn render_insert_script<R: Record>(records: &[R]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.insert_statement());
        out.push('\n');
    }
    out
}

/// Write `<table>.sql` into `dir` as UTF-8.
pub fn write_insert_script<R: Record>(
    dir: &Path,
    records: &[R],
) -> Result<WrittenFile, GenerationError> {
    let path = dir.join(format!("{}.sql", R::KIND.table_name()));
    let script = render_insert_script(records);
    Ok(write_hashed(&path, script.as_bytes(), records.len() as u64)?)
}

#[cfg(test)]
mod tests {
    use cadoc_core::{Amount, ConcCred};

    use super::*;

    #[test]
    fn renders_amounts_with_two_decimals() {
        let record = ConcCred {
            year: 2025,
            quarter: 3,
            brand: 1,
            function: "D".to_string(),
            credentialed_establishments: 10,
            active_establishments: 7,
            transaction_value: Amount::from_cents(123_456),
            transaction_quantity: 8,
        };
        let script = render_insert_script(&[record]);
        assert_eq!(
            script,
            "INSERT INTO cadoc_6334_conccred (ano, trimestre, bandeira, funcao, \
             quantidade_estabelecimentos_credenciados, quantidade_estabelecimentos_ativos, \
             valor_transacoes, quantidade_transacoes) VALUES (2025, 3, 1, 'D', 10, 7, 1234.56, 8);\n"
        );
    }
}
