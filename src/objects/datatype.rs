//! Data type synonyms accepted for routine arguments and return types.

/// Synonym to canonical name. The routine API only accepts the canonical set.
const SYNONYMS: &[(&str, &str)] = &[
    ("VARCHAR", "TEXT"),
    ("STRING", "TEXT"),
    ("CHAR", "TEXT"),
    ("INTEGER", "INT"),
    ("BIGINT", "INT"),
    ("SMALLINT", "INT"),
    ("FLOAT", "REAL"),
    ("DOUBLE", "REAL"),
    ("DECIMAL", "NUMBER"),
    ("NUMERIC", "NUMBER"),
    ("TIMESTAMP", "TIMESTAMP_TZ"),
    ("DATETIME", "TIMESTAMP_TZ"),
    ("BOOL", "BOOLEAN"),
];

/// Upper-cases a declared type and maps known synonyms.
///
/// Only bare names are mapped. A type with a length, precision or scale
/// suffix (`DECIMAL(38,2)`) passes through unchanged.
pub fn normalize(datatype: &str) -> String {
    let upper = datatype.trim().to_uppercase();
    SYNONYMS
        .iter()
        .find(|(synonym, _)| *synonym == upper)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(upper)
}
