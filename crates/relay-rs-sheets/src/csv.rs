//! Naive CSV splitting for the public export fallback.
//!
//! Lines are split on `\n` and cells on `,`. Quoted fields are not
//! understood, so cells containing commas or newlines come back split.
//! A trailing newline yields a final row holding one empty cell.

/// Split an exported CSV document into rows of cells.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .map(|line| {
            line.strip_suffix('\r')
                .unwrap_or(line)
                .split(',')
                .map(str::to_string)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::parse_csv;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_lines_and_cells() {
        let rows = parse_csv("42,TEXTO: hola\r\n7,IMAGEN: abc\r\n");
        assert_eq!(
            rows,
            vec![
                vec!["42".to_string(), "TEXTO: hola".to_string()],
                vec!["7".to_string(), "IMAGEN: abc".to_string()],
                vec![String::new()],
            ]
        );
    }

    #[test]
    fn document_without_trailing_newline_has_no_empty_row() {
        let rows = parse_csv("42,TEXTO: hola\n7,IMAGEN: abc");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["7".to_string(), "IMAGEN: abc".to_string()]);
    }

    #[test]
    fn quoted_commas_are_split() {
        let rows = parse_csv("42,\"hola, mundo\"");
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0][1], "\"hola");
    }
}
