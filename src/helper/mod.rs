pub mod fasta_ids;
pub mod gblocks;
pub mod io;
pub mod json;
pub mod muscle;
pub mod phylip;
pub mod prottest;
pub mod raxml;
pub mod runner;
pub mod utils;
