//! Reading and writing the classified (9-column) CSV.

use std::io::{Read, Write};
use std::path::Path;

use commitscope_core::{
    Category, ClassifiedCommit, CommitRecord, ScopeError, SeverityLevel, CLASSIFIED_COLUMNS,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct ClassifiedRow {
    #[serde(rename = "Hash")]
    hash: String,
    #[serde(rename = "Author")]
    author: String,
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Message")]
    message: String,
    #[serde(rename = "Branches")]
    branches: String,
    #[serde(rename = "Code Changes")]
    code_changes: String,
    #[serde(rename = "Category", default)]
    category: Option<Category>,
    #[serde(rename = "Severity", default)]
    severity: Option<SeverityLevel>,
}

impl From<&ClassifiedCommit> for ClassifiedRow {
    fn from(commit: &ClassifiedCommit) -> Self {
        let r = &commit.record;
        Self {
            hash: r.hash.clone(),
            author: r.author.clone(),
            email: r.email.clone(),
            date: r.date.clone(),
            message: r.message.clone(),
            branches: r.branches.clone(),
            code_changes: r.code_changes.clone(),
            category: commit.category,
            severity: commit.severity,
        }
    }
}

impl From<ClassifiedRow> for ClassifiedCommit {
    fn from(row: ClassifiedRow) -> Self {
        Self {
            record: CommitRecord {
                hash: row.hash,
                author: row.author,
                email: row.email,
                date: row.date,
                message: row.message,
                branches: row.branches,
                code_changes: row.code_changes,
            },
            category: row.category,
            severity: row.severity,
        }
    }
}

/// Write classified commits as a 9-column CSV at `path`.
///
/// Placeholder rows from severity completion are never written.
///
/// # Errors
///
/// Returns [`ScopeError::Csv`] or [`ScopeError::Io`] on write failure.
pub fn write_classified(path: &Path, commits: &[ClassifiedCommit]) -> Result<(), ScopeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_classified_to(file, commits)
}

/// Write classified commits as a 9-column CSV to any writer.
pub fn write_classified_to<W: Write>(
    writer: W,
    commits: &[ClassifiedCommit],
) -> Result<(), ScopeError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CLASSIFIED_COLUMNS)?;
    for commit in commits.iter().filter(|c| !c.is_placeholder()) {
        csv_writer.serialize(ClassifiedRow::from(commit))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Read classified commits from `path`.
///
/// A plain 7-column history CSV is accepted and yields unlabeled commits.
///
/// # Errors
///
/// Returns [`ScopeError::FileNotFound`] if `path` does not exist, or
/// [`ScopeError::Csv`] if a row is malformed or carries a label outside the
/// fixed sets.
pub fn read_classified(path: &Path) -> Result<Vec<ClassifiedCommit>, ScopeError> {
    if !path.exists() {
        return Err(ScopeError::FileNotFound(path.to_path_buf()));
    }
    let file = std::fs::File::open(path)?;
    read_classified_from(file)
}

/// Read classified commits from any reader.
pub fn read_classified_from<R: Read>(reader: R) -> Result<Vec<ClassifiedCommit>, ScopeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let mut commits = Vec::new();
    for row in csv_reader.deserialize() {
        let row: ClassifiedRow = row?;
        commits.push(row.into());
    }
    Ok(commits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(hash: &str, category: Option<Category>, severity: Option<u8>) -> ClassifiedCommit {
        ClassifiedCommit {
            record: CommitRecord {
                hash: hash.into(),
                author: "alice".into(),
                email: "alice@example.com".into(),
                date: "2024-03-01 12:00:00".into(),
                message: "fix: login, again".into(),
                branches: "main".into(),
                code_changes: "commit abc\n\n src/a.rs | 1 +\n".into(),
            },
            category,
            severity: severity.map(|s| SeverityLevel::new(s).unwrap()),
        }
    }

    #[test]
    fn every_row_has_nine_fields() {
        let commits = vec![
            labeled(&"a".repeat(40), Some(Category::BugFix), Some(3)),
            labeled(&"b".repeat(40), None, Some(1)),
            labeled(&"c".repeat(40), Some(Category::Other), None),
        ];
        let mut out = Vec::new();
        write_classified_to(&mut out, &commits).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(out.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|r| r.len() == 9));
        assert_eq!(&rows[1][7], "Bug Fix");
        assert_eq!(&rows[1][8], "3");
        assert_eq!(&rows[2][7], "");
        assert_eq!(&rows[3][8], "");
    }

    #[test]
    fn labels_survive_a_write_read_cycle() {
        let commits = vec![
            labeled(&"a".repeat(40), Some(Category::LocationsCrud), Some(5)),
            labeled(&"b".repeat(40), None, None),
        ];
        let mut out = Vec::new();
        write_classified_to(&mut out, &commits).unwrap();
        assert_eq!(read_classified_from(out.as_slice()).unwrap(), commits);
    }

    #[test]
    fn placeholders_are_not_written() {
        let commits = vec![
            labeled(&"a".repeat(40), Some(Category::Testing), Some(2)),
            ClassifiedCommit::placeholder(SeverityLevel::new(4).unwrap()),
        ];
        let mut out = Vec::new();
        write_classified_to(&mut out, &commits).unwrap();
        let back = read_classified_from(out.as_slice()).unwrap();
        assert_eq!(back.len(), 1);
        assert!(!String::from_utf8(out).unwrap().contains("DUMMY_"));
    }

    #[test]
    fn history_csv_reads_as_unlabeled() {
        let csv = "Hash,Author,Email,Date,Message,Branches,Code Changes\n\
                   abc,alice,a@x.io,2024-01-01 00:00:00,init,main,none\n";
        let commits = read_classified_from(csv.as_bytes()).unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].category, None);
        assert_eq!(commits[0].severity, None);
    }

    #[test]
    fn out_of_set_labels_are_rejected() {
        let header = "Hash,Author,Email,Date,Message,Branches,Code Changes,Category,Severity\n";
        let bad_category = format!("{header}abc,a,a@x.io,d,m,b,c,Feature,2\n");
        assert!(read_classified_from(bad_category.as_bytes()).is_err());

        let bad_severity = format!("{header}abc,a,a@x.io,d,m,b,c,Other,7\n");
        assert!(read_classified_from(bad_severity.as_bytes()).is_err());
    }
}
