//! Rewrite of BIN fixture insert scripts.
//!
//! Each `insert ... (bin, bandeira) values (...);` line gains the
//! `modalidade_final` and `produto_final` columns. The values are chosen from
//! the zero-based line number so reruns produce identical scripts.

use std::sync::LazyLock;

use regex::Regex;

const CARD_PRODUCTS: [&str; 18] = [
    "3", "4", "5", "6", "7", "8", "10", "11", "13", "17", "31", "32", "33", "34", "35", "36", "37",
    "38",
];

static COLUMN_LIST: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*bin\s*,\s*bandeira\s*\)").ok());

static STATEMENT_END: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\)\s*;").ok());

/// Card model and product assigned to line `line`.
pub fn bin_attributes(line: usize) -> (&'static str, &'static str) {
    let product = CARD_PRODUCTS[line % CARD_PRODUCTS.len()];
    let model = match line % 10 {
        2 | 8 => "C",
        _ => "P",
    };
    (model, product)
}

/// Rewrite one line. Lines without the `(bin, bandeira)` column list are
/// returned unchanged.
pub fn rewrite_bin_line(text: &str, line: usize) -> String {
    let (Some(columns), Some(end)) = (COLUMN_LIST.as_ref(), STATEMENT_END.as_ref()) else {
        return text.to_string();
    };
    if !columns.is_match(text) {
        return text.to_string();
    }
    let (model, product) = bin_attributes(line);
    let widened = columns.replace_all(text, "(bin, bandeira, modalidade_final, produto_final)");
    end.replace_all(&widened, format!(", '{model}', {product});").as_str())
        .into_owned()
}

/// Rewrite a whole script, numbering lines from zero.
pub fn rewrite_bin_script(script: &str) -> String {
    let mut out = String::with_capacity(script.len() + script.len() / 4);
    for (line, text) in script.lines().enumerate() {
        out.push_str(&rewrite_bin_line(text, line));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attributes_cycle_with_the_line_number() {
        assert_eq!(bin_attributes(0), ("P", "3"));
        assert_eq!(bin_attributes(2), ("C", "5"));
        assert_eq!(bin_attributes(8), ("C", "13"));
        assert_eq!(bin_attributes(17), ("P", "38"));
        assert_eq!(bin_attributes(18), ("C", "3"));
    }

    #[test]
    fn widens_insert_statements() {
        let line = "insert into bins (bin, bandeira) values ('411111', 1);";
        assert_eq!(
            rewrite_bin_line(line, 2),
            "insert into bins (bin, bandeira, modalidade_final, produto_final) \
             values ('411111', 1, 'C', 5);"
        );
    }

    #[test]
    fn leaves_other_lines_alone() {
        let script = "-- fixtures\ninsert into bins (bin, bandeira) values ('5', 2);\n";
        let rewritten = rewrite_bin_script(script);
        let lines: Vec<&str> = rewritten.lines().collect();
        assert_eq!(lines[0], "-- fixtures");
        assert!(lines[1].ends_with("values ('5', 2, 'P', 4);"));
    }
}
