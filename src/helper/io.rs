use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use bio::io::fasta;
use flate2::read::MultiGzDecoder;

#[derive(Debug, PartialEq)]
pub enum DataType {
    Fasta,
    FastaGz,
}

impl DataType {
    pub fn from_path(path: &Path) -> Self {
        if path.extension().map(|ext| ext == "gz").unwrap_or(false) {
            DataType::FastaGz
        } else {
            DataType::Fasta
        }
    }
}

/// Opens a FASTA file for reading, transparently decompressing `.gz` input.
pub fn open_fasta(path: &Path) -> io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let stream: Box<dyn Read> = match DataType::from_path(path) {
        DataType::Fasta => Box::new(BufReader::new(file)),
        DataType::FastaGz => Box::new(MultiGzDecoder::new(BufReader::new(file))),
    };
    Ok(stream)
}

/// File name used to derive every artifact name of a run. The `.gz` suffix
/// is dropped since intermediates are written uncompressed.
pub fn artifact_base_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    Some(name.strip_suffix(".gz").unwrap_or(name).to_string())
}

/// Number of records in a FASTA file.
pub fn count_fasta_records(path: &Path) -> io::Result<usize> {
    let reader = fasta::Reader::new(open_fasta(path)?);
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}
