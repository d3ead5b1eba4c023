use std::collections::BTreeSet;

/// Excludes files by their final extension.
///
/// Extensions are stored with their leading dot and compared case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionFilter {
    excluded: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Build a filter from extensions, with or without the leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let excluded = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().to_string())
            .filter(|ext| !ext.is_empty() && ext != ".")
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{}", ext)
                }
            })
            .collect();
        Self { excluded }
    }

    /// Whether a file with this base name should be skipped.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        file_suffix(file_name).is_some_and(|suffix| self.excluded.contains(suffix))
    }
}

/// The final extension of a file name, including its dot.
///
/// A name whose only dot is the leading one (`.csv`) or which ends in a dot
/// has no extension.
pub fn file_suffix(file_name: &str) -> Option<&str> {
    let dot = file_name.rfind('.')?;
    if dot == 0 || dot + 1 == file_name.len() {
        return None;
    }
    Some(&file_name[dot..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_filter() -> ExtensionFilter {
        ExtensionFilter::new([".csv", ".xlsx", ".xls", ".parquet"])
    }

    #[test]
    fn test_file_suffix() {
        assert_eq!(file_suffix("a.txt"), Some(".txt"));
        assert_eq!(file_suffix("archive.tar.gz"), Some(".gz"));
        assert_eq!(file_suffix("Makefile"), None);
        assert_eq!(file_suffix(".csv"), None);
        assert_eq!(file_suffix("trailing."), None);
    }

    #[test]
    fn test_excludes_data_files() {
        let filter = data_filter();
        assert!(filter.is_excluded("b.csv"));
        assert!(filter.is_excluded("sheet.xlsx"));
        assert!(filter.is_excluded("old.xls"));
        assert!(filter.is_excluded("table.snappy.parquet"));
        assert!(!filter.is_excluded("a.txt"));
        assert!(!filter.is_excluded("notebook.ipynb"));
    }

    #[test]
    fn test_case_sensitive() {
        let filter = data_filter();
        assert!(!filter.is_excluded("B.CSV"));
        assert!(!filter.is_excluded("b.Csv"));
        assert!(filter.is_excluded("UPPER.csv"));
    }

    #[test]
    fn test_hidden_names_are_not_extensions() {
        assert!(!data_filter().is_excluded(".csv"));
    }

    #[test]
    fn test_extensions_without_dot_are_normalized() {
        let filter = ExtensionFilter::new(["csv", " .log ", "", "."]);
        assert_eq!(filter, ExtensionFilter::new([".csv", ".log"]));
        assert!(filter.is_excluded("x.csv"));
        assert!(filter.is_excluded("run.log"));
    }
}
