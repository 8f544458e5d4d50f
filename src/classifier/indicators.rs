use serde::{Deserialize, Serialize};

use crate::errors::ProbeKitError;
use super::predicate::SuccessPredicate;

/// Database error strings that leak into pages when a query breaks.
pub const SQLI_ERROR_INDICATORS: &[&str] = &[
    "you have an error in your sql syntax",
    "unclosed quotation mark after the character string",
    "warning: mysql",
    "pg_query()",
    "syntax error",
    "database error",
    "sqlstate",
    "mysql_fetch",
    "native client",
    "unterminated quoted string",
    "quoted string not properly terminated",
    "sql command not properly ended",
    "ora-01756",
    "ora-00933",
    "invalid column name",
    "mysql_num_rows()",
    "mssql_query()",
    "odbc sql server driver",
    "sqlite3_",
    "sqlite error",
    "group by clause",
    "order by clause",
    "union select",
    "procedure expects parameter",
    "sql injection",
];

/// Markers of a local file read or a failed include.
pub const LFI_INDICATORS: &[&str] = &[
    "root:",
    "bin/bash",
    "etc/passwd",
    "No such file or directory",
    "Warning",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectionKind {
    Sqli,
    Xss,
    Lfi,
}

impl InjectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqli => "sqli",
            Self::Xss => "xss",
            Self::Lfi => "lfi",
        }
    }

    pub fn indicators(&self) -> &'static [&'static str] {
        match self {
            Self::Sqli => SQLI_ERROR_INDICATORS,
            Self::Lfi => LFI_INDICATORS,
            Self::Xss => &[],
        }
    }

    /// Detection rules for this kind, before operator overrides.
    pub fn predicate(&self) -> SuccessPredicate {
        SuccessPredicate {
            keywords: self.indicators().iter().map(|s| s.to_string()).collect(),
            reflect_payload: matches!(self, Self::Xss),
            ..SuccessPredicate::default()
        }
    }
}

impl std::str::FromStr for InjectionKind {
    type Err = ProbeKitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqli" | "sql" => Ok(Self::Sqli),
            "xss" => Ok(Self::Xss),
            "lfi" => Ok(Self::Lfi),
            other => Err(ProbeKitError::Config(format!("Unknown injection kind: {}", other))),
        }
    }
}

impl std::fmt::Display for InjectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
