use std::fmt::Display;
use std::io::{self, BufRead, BufReader, Read, Write};

use bio::io::fasta;
use getset::Getters;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

pub const SYNTHETIC_PREFIX: &str = "g_";

/// Characters that would corrupt a Newick tree if left in a leaf label.
const TREE_UNSAFE_CHARS: [char; 5] = [':', '(', ')', ',', ';'];

static TREE_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bg_(\d+):").expect("static regex is valid"));

#[derive(Error, Debug)]
pub enum IdentifierError {
    #[error("Malformed FASTA input: {0}")]
    MalformedInput(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct SequenceRecord {
    #[getset(get = "pub")]
    id: String,
    #[getset(get = "pub")]
    desc: Option<String>,
    #[getset(get = "pub")]
    sequence_data: Vec<u8>,
}

impl SequenceRecord {
    fn from_fasta(record: &fasta::Record) -> Self {
        SequenceRecord {
            id: record.id().to_string(),
            desc: record.desc().map(|d| d.to_string()),
            sequence_data: record.seq().to_vec(),
        }
    }

    /// Full header text following `>`.
    pub fn original_identifier(&self) -> String {
        match &self.desc {
            Some(desc) => format!("{} {}", self.id, desc),
            None => self.id.clone(),
        }
    }
}

/// Positional `g_<n>` -> original identifier mapping, `n` is the record's
/// ordinal in the input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierMapping {
    records: Vec<SequenceRecord>,
}

impl IdentifierMapping {
    pub fn from_fasta<R: Read>(reader: R) -> Result<Self, IdentifierError> {
        Ok(IdentifierMapping {
            records: read_records(reader)?,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&SequenceRecord> {
        self.records.get(ordinal)
    }

    /// Pairs of synthetic label and original identifier, ascending by ordinal.
    pub fn iter(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(n, r)| (synthetic_label(n), r.original_identifier()))
    }

    /// Replaces every `g_<n>:` in a Newick blob with the tree-safe label of
    /// record `n`. Labels without a mapping entry are left as they are.
    pub fn restore_tree(&self, blob: &str) -> String {
        TREE_LABEL_RE
            .replace_all(blob, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| self.records.get(n))
                    .map(|r| restored_tree_label(r.id()))
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }

    /// Renames `>g_<n>` headers of an alignment back to the full original
    /// header. Unknown headers are written unchanged.
    pub fn restore_alignment<R: Read, W: Write>(
        &self,
        reader: R,
        writer: W,
    ) -> Result<usize, IdentifierError> {
        let mut fasta_writer = fasta::Writer::new(writer);
        let mut renamed = 0;

        for record in read_records(reader)? {
            let original = parse_synthetic_label(record.id())
                .and_then(|n| self.records.get(n))
                .map(|r| r.original_identifier());

            match original {
                Some(header) => {
                    fasta_writer.write(&header, None, record.sequence_data())?;
                    renamed += 1;
                }
                None => fasta_writer.write(
                    record.id(),
                    record.desc().as_deref(),
                    record.sequence_data(),
                )?,
            }
        }
        fasta_writer.flush()?;
        Ok(renamed)
    }
}

impl Display for IdentifierMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (label, original) in self.iter() {
            writeln!(f, "{}\t{}", label, original)?;
        }
        Ok(())
    }
}

/// Writes every record with its header replaced by `g_<n>` and returns the
/// mapping built by the same scan.
pub fn sanitize<R: Read, W: Write>(
    reader: R,
    writer: W,
) -> Result<IdentifierMapping, IdentifierError> {
    let mapping = IdentifierMapping::from_fasta(reader)?;
    let mut fasta_writer = fasta::Writer::new(writer);
    for (n, record) in mapping.records.iter().enumerate() {
        fasta_writer.write(&synthetic_label(n), None, record.sequence_data())?;
    }
    fasta_writer.flush()?;
    Ok(mapping)
}

pub fn synthetic_label(ordinal: usize) -> String {
    format!("{}{}", SYNTHETIC_PREFIX, ordinal)
}

pub fn parse_synthetic_label(label: &str) -> Option<usize> {
    let digits = label.strip_prefix(SYNTHETIC_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Newick-safe form of a record id, with the branch-length `:` re-appended.
pub fn restored_tree_label(id: &str) -> String {
    let mut label: String = id
        .chars()
        .map(|c| if TREE_UNSAFE_CHARS.contains(&c) { '_' } else { c })
        .collect();
    label.push(':');
    label
}

fn read_records<R: Read>(reader: R) -> Result<Vec<SequenceRecord>, IdentifierError> {
    let mut buffered = BufReader::new(reader);
    ensure_header_first(&mut buffered)?;

    let mut records = Vec::new();
    for record in fasta::Reader::new(buffered).records() {
        let record = record.map_err(|e| IdentifierError::MalformedInput(e.to_string()))?;
        records.push(SequenceRecord::from_fasta(&record));
    }
    Ok(records)
}

// Leading blank lines are tolerated, anything else before the first header is not.
fn ensure_header_first<R: BufRead>(reader: &mut R) -> Result<(), IdentifierError> {
    loop {
        let buf = reader.fill_buf()?;
        match buf.first() {
            None | Some(b'>') => return Ok(()),
            Some(b'\n') => reader.consume(1),
            Some(b'\r') if buf.get(1) == Some(&b'\n') => reader.consume(2),
            Some(_) => {
                let line = buf.split(|b| *b == b'\n').next().unwrap_or_default();
                return Err(IdentifierError::MalformedInput(format!(
                    "sequence line before any header: {}",
                    String::from_utf8_lossy(line).trim_end()
                )));
            }
        }
    }
}
