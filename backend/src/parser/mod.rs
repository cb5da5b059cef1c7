//! Raw CSV reader with encoding auto-detection.
//!
//! Turns file content into a [`RawTable`]: the first line is the header row,
//! every following line is split on bare commas and trimmed. Rows with the
//! wrong number of cells or with only empty cells are dropped.
//!
//! Quoted cells are not supported: a comma inside quotes still splits the
//! cell. Routine exports from the dashboard never quote.

use std::path::Path;

use crate::config::MAX_FILE_SIZE;
use crate::error::{CsvError, CsvResult};
use crate::models::RawTable;

const DELIMITER: char = ',';

/// A decoded table plus the encoding that was used.
#[derive(Debug, Clone)]
pub struct ReadResult {
    pub table: RawTable,
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => {
            let (decoded, _, had_errors) = encoding_rs::ISO_8859_15.decode(bytes);
            if had_errors {
                return Err(CsvError::EncodingError(format!(
                    "invalid {} sequence",
                    encoding
                )));
            }
            decoded.into_owned()
        }
        "windows-1252" | "cp1252" => {
            let (decoded, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
            if had_errors {
                return Err(CsvError::EncodingError(format!(
                    "invalid {} sequence",
                    encoding
                )));
            }
            decoded.into_owned()
        }
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    Ok(text)
}

/// Split text into a [`RawTable`].
///
/// # Example
/// ```ignore
/// use routine_import::read_raw_table;
///
/// let table = read_raw_table("ejercicio,reps\nSentadilla,10\n").unwrap();
/// assert_eq!(table.headers, vec!["ejercicio", "reps"]);
/// assert_eq!(table.rows, vec![vec!["Sentadilla", "10"]]);
/// ```
pub fn read_raw_table(content: &str) -> CsvResult<RawTable> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 2 {
        return Err(CsvError::EmptyFile);
    }

    let headers = split_line(lines[0]);
    let width = headers.len();

    let rows: Vec<Vec<String>> = lines[1..]
        .iter()
        .map(|line| split_line(line))
        .filter(|cells| cells.len() == width && cells.iter().any(|c| !c.is_empty()))
        .collect();

    if rows.is_empty() {
        return Err(CsvError::NoDataRows { expected: width });
    }

    Ok(RawTable { headers, rows })
}

fn split_line(line: &str) -> Vec<String> {
    line.split(DELIMITER).map(|s| s.trim().to_string()).collect()
}

/// Reject inputs over [`MAX_FILE_SIZE`].
pub fn check_size(size: u64) -> CsvResult<()> {
    let size = usize::try_from(size).unwrap_or(usize::MAX);
    if size > MAX_FILE_SIZE {
        return Err(CsvError::FileTooLarge {
            size,
            limit: MAX_FILE_SIZE,
        });
    }
    Ok(())
}

/// Decode bytes with encoding auto-detection, then read the table.
pub fn read_bytes(bytes: &[u8]) -> CsvResult<ReadResult> {
    check_size(bytes.len() as u64)?;
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let table = read_raw_table(&content)?;
    Ok(ReadResult { table, encoding })
}

/// Read a CSV file from disk. The size is checked before the file is read.
pub fn read_file<P: AsRef<Path>>(path: P) -> CsvResult<ReadResult> {
    let path = path.as_ref();
    check_size(std::fs::metadata(path)?.len())?;
    let bytes = std::fs::read(path)?;
    read_bytes(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_table() {
        let table = read_raw_table("ejercicio,reps,peso\nSentadilla,10,80\nPress,8,40").unwrap();

        assert_eq!(table.headers, vec!["ejercicio", "reps", "peso"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["Sentadilla", "10", "80"]);
        assert_eq!(table.rows[1], vec!["Press", "8", "40"]);
    }

    #[test]
    fn test_cells_are_trimmed() {
        let table = read_raw_table(" a , b \r\n  Curl ,  12 \r\n").unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows[0], vec!["Curl", "12"]);
    }

    #[test]
    fn test_mismatched_and_empty_rows_dropped() {
        let csv = "a,b,c\n1,2,3\n\n,,\n4,5\n6,7,8,9\n10,11,12";
        let table = read_raw_table(csv).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["10", "11", "12"]);
    }

    #[test]
    fn test_row_with_some_empty_cells_kept() {
        let table = read_raw_table("a,b,c\n1,,3").unwrap();
        assert_eq!(table.rows[0], vec!["1", "", "3"]);
    }

    #[test]
    fn test_empty_file_error() {
        assert!(matches!(read_raw_table(""), Err(CsvError::EmptyFile)));
        assert!(matches!(read_raw_table("a,b,c"), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_no_valid_rows_error() {
        let result = read_raw_table("a,b,c\n1,2\n,,\n");
        assert!(matches!(result, Err(CsvError::NoDataRows { expected: 3 })));
    }

    #[test]
    fn test_quoted_comma_is_not_special() {
        let table = read_raw_table("a,b,c\n\"x,y\",z").unwrap();
        assert_eq!(table.rows[0], vec!["\"x", "y\"", "z"]);
    }

    #[test]
    fn test_bom_stripped() {
        let table = read_raw_table("\u{feff}ejercicio,reps\nCurl,10").unwrap();
        assert_eq!(table.headers[0], "ejercicio");
    }

    #[test]
    fn test_read_bytes_utf8() {
        let result = read_bytes("ejercicio,reps\nPress banca,8\n".as_bytes()).unwrap();
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.table.rows[0][0], "Press banca");
    }

    #[test]
    fn test_read_file_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rutina.csv");
        let file = std::fs::File::create(&path).unwrap();
        file.set_len(MAX_FILE_SIZE as u64 + 1).unwrap();

        let result = read_file(&path);
        assert!(matches!(
            result,
            Err(CsvError::FileTooLarge { size, limit }) if size == MAX_FILE_SIZE + 1 && limit == MAX_FILE_SIZE
        ));
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rutina.csv");
        std::fs::write(&path, "ejercicio,reps\nCurl,10\n").unwrap();

        let result = read_file(&path).unwrap();
        assert_eq!(result.table.rows, vec![vec!["Curl", "10"]]);
    }

    #[test]
    fn test_windows_1252_decoding() {
        // "Extensión" in Windows-1252
        let bytes: &[u8] = &[0x45, 0x78, 0x74, 0x65, 0x6E, 0x73, 0x69, 0xF3, 0x6E];
        let decoded = decode_content(bytes, "windows-1252").unwrap();
        assert_eq!(decoded, "Extensión");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Rodillo abdómen" fragment in ISO-8859-1
        let bytes: &[u8] = &[0x61, 0x62, 0x64, 0xF3, 0x6D, 0x65, 0x6E];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert!(decoded.contains("abd"));
        assert!(decoded.ends_with("men"));
    }
}
