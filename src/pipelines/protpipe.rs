use std::fs::{self, File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use getset::Getters;
use itertools::Itertools;

use crate::cli::RunArgs;
use crate::config::ToolConfig;
use crate::helper::fasta_ids::{IdentifierMapping, sanitize};
use crate::helper::gblocks::{self, BlockParams, FilterMode};
use crate::helper::io::{artifact_base_name, count_fasta_records, open_fasta};
use crate::helper::muscle::get_muscle_version;
use crate::helper::phylip;
use crate::helper::prottest::{self, ModelChoice, SupportedModel};
use crate::helper::raxml::{RaxmlArtifact, RaxmlRun, TreeModel};
use crate::helper::runner::describe;
use crate::helper::utils::{log_line, with_spinner};
use crate::pipelines::PipelineError;
use crate::pipelines::restore::{RestoreSummary, restore_tree_artifacts};

/// Validated run configuration.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct RunOptions {
    input: PathBuf,
    run_name: String,
    threads: u32,
    bootstraps: u32,
    mode: FilterMode,
    pre_aligned: bool,
    model_override: Option<String>,
    stop_after_model_selection: bool,
    config: Option<PathBuf>,
    work_dir: PathBuf,
    clean: bool,
}

impl RunOptions {
    /// Checks every argument without touching the filesystem.
    pub fn from_args(args: &RunArgs) -> Result<Self, PipelineError> {
        let threads = positive_count("threads", args.threads)?;
        let bootstraps = positive_count("bootstraps", args.bootstraps)?;
        let mode = args
            .mode
            .parse::<FilterMode>()
            .map_err(PipelineError::InvalidArgument)?;
        let pre_aligned = match args.aligned.as_str() {
            "T" => true,
            "F" => false,
            other => {
                return Err(PipelineError::InvalidArgument(format!(
                    "aligned needs to be T or F, got '{}'",
                    other
                )));
            }
        };
        let model_override = match args.model.as_deref().map(str::trim) {
            Some("") => {
                return Err(PipelineError::InvalidArgument(
                    "model override must not be empty".to_string(),
                ));
            }
            other => other.map(str::to_string),
        };

        let input = PathBuf::from(&args.input);
        let run_name = artifact_base_name(&input).ok_or_else(|| {
            PipelineError::InvalidArgument(format!("no file name in input path '{}'", args.input))
        })?;

        Ok(RunOptions {
            input,
            run_name,
            threads,
            bootstraps,
            mode,
            pre_aligned,
            model_override,
            stop_after_model_selection: args.stop_after_model_selection,
            config: args.config.as_ref().map(PathBuf::from),
            work_dir: PathBuf::from(&args.work_dir),
            clean: args.clean,
        })
    }
}

fn positive_count(name: &str, value: i64) -> Result<u32, PipelineError> {
    if value <= 0 {
        return Err(PipelineError::InvalidArgument(format!(
            "{} must be a positive integer, got {}",
            name, value
        )));
    }
    u32::try_from(value)
        .map_err(|_| PipelineError::InvalidArgument(format!("{} is too large: {}", name, value)))
}

/// File names of every stage, relative to the work directory.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct StagePaths {
    renamed: PathBuf,
    aligned: PathBuf,
    staging: PathBuf,
    filtered: PathBuf,
    phylip: PathBuf,
    model_report: PathBuf,
    run_log: PathBuf,
}

impl StagePaths {
    pub fn new(run_name: &str) -> Self {
        let named = |suffix: &str| PathBuf::from(format!("{}{}", run_name, suffix));
        StagePaths {
            renamed: named(".rename"),
            aligned: named(".al"),
            staging: named(".tmp"),
            filtered: named(&format!(".tmp{}", gblocks::FILTERED_SUFFIX)),
            phylip: named(".phy"),
            model_report: named(".model"),
            run_log: named(".protpipe.log"),
        }
    }

    fn intermediates(&self) -> Vec<&PathBuf> {
        vec![
            &self.renamed,
            &self.aligned,
            &self.staging,
            &self.filtered,
            &self.phylip,
            &self.model_report,
        ]
    }
}

/// RAxML outputs of an earlier run with the same name that would make RAxML
/// refuse to start, or mix two runs.
pub fn conflicting_outputs(work_dir: &Path, run_name: &str) -> Vec<PathBuf> {
    RaxmlArtifact::ALL
        .iter()
        .map(|artifact| work_dir.join(artifact.file_name(run_name)))
        .filter(|path| path.exists())
        .collect()
}

pub fn ensure_no_conflicting_outputs(work_dir: &Path, run_name: &str) -> Result<(), PipelineError> {
    match conflicting_outputs(work_dir, run_name).into_iter().next() {
        Some(path) => Err(PipelineError::ConflictingOutputExists(path)),
        None => Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub model: TreeModel,
    /// `None` when the run stopped after model selection.
    pub restored: Option<RestoreSummary>,
}

pub fn protpipe(args: &RunArgs) -> Result<RunOutcome, PipelineError> {
    let options = RunOptions::from_args(args)?;
    let tools = ToolConfig::resolve(options.config.as_deref())?;
    run_pipeline(&options, &tools)
}

pub fn run_pipeline(options: &RunOptions, tools: &ToolConfig) -> Result<RunOutcome, PipelineError> {
    if !options.input.is_file() {
        return Err(PipelineError::InvalidArgument(format!(
            "input file {} does not exist",
            options.input.display()
        )));
    }
    ensure_no_conflicting_outputs(&options.work_dir, &options.run_name)?;
    fs::create_dir_all(&options.work_dir)?;

    let paths = StagePaths::new(&options.run_name);
    let logfile = OpenOptions::new()
        .create(true)
        .append(true)
        .open(options.work_dir.join(&paths.run_log))?;

    let mut pipeline = Pipeline {
        options,
        tools,
        paths,
        logger: BufWriter::new(logfile),
    };

    pipeline.log("Script started ...")?;
    pipeline.log(&format!("Input file: {}", options.input.display()))?;
    pipeline.log(&format!("Tools: {}", tools))?;

    match pipeline.execute() {
        Ok(outcome) => {
            pipeline.log("Script finished...")?;
            Ok(outcome)
        }
        Err(e) => {
            pipeline.log(&format!("Error running pipeline: {}", e))?;
            Err(e)
        }
    }
}

struct Pipeline<'a> {
    options: &'a RunOptions,
    tools: &'a ToolConfig,
    paths: StagePaths,
    logger: BufWriter<File>,
}

impl Pipeline<'_> {
    fn log(&mut self, message: &str) -> Result<(), PipelineError> {
        println!("{}", message);
        log_line(&mut self.logger, message)?;
        Ok(())
    }

    fn warn(&mut self, message: &str) -> Result<(), PipelineError> {
        eprintln!("Warning: {}", message);
        log_line(&mut self.logger, &format!("WARNING {}", message))?;
        Ok(())
    }

    fn work_path(&self, file: &Path) -> PathBuf {
        self.options.work_dir.join(file)
    }

    /// Deletes a stage output left by an earlier run, so an existence check
    /// after the stage only passes for files this run produced.
    fn remove_stale(&self, file: &Path) -> Result<PathBuf, PipelineError> {
        let path = self.work_path(file);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(path)
    }

    fn execute(&mut self) -> Result<RunOutcome, PipelineError> {
        let mapping = self.rename_sequences()?;
        self.align()?;
        let sequence_count = self.stage_alignment()?;
        self.filter_blocks(sequence_count)?;
        self.convert_to_phylip()?;

        let model = self.choose_model()?;
        if self.options.stop_after_model_selection {
            self.log("Stopping after model selection")?;
            return Ok(RunOutcome {
                model,
                restored: None,
            });
        }

        self.infer_tree(&model)?;
        let summary = self.restore_trees(&mapping)?;
        if self.options.clean {
            self.remove_intermediates()?;
        }

        Ok(RunOutcome {
            model,
            restored: Some(summary),
        })
    }

    fn rename_sequences(&mut self) -> Result<IdentifierMapping, PipelineError> {
        self.log("-- Renaming input fasta sequences")?;
        let reader = open_fasta(&self.options.input)?;
        let writer = BufWriter::new(File::create(self.work_path(&self.paths.renamed))?);
        let mapping = sanitize(reader, writer)?;
        if mapping.is_empty() {
            return Err(PipelineError::InvalidSequenceCount(0));
        }

        self.log(&format!(
            "Renamed {} sequences to g_0..g_{}",
            mapping.len(),
            mapping.len().saturating_sub(1)
        ))?;
        log_line(&mut self.logger, &format!("Identifier mapping:\n{}", mapping))?;
        Ok(mapping)
    }

    fn align(&mut self) -> Result<(), PipelineError> {
        let renamed = self.paths.renamed.clone();
        let aligned = self.paths.aligned.clone();

        if self.options.pre_aligned {
            self.log("Input file is aligned fasta so copy input file to input file .al")?;
            fs::copy(self.work_path(&renamed), self.work_path(&aligned))?;
            return Ok(());
        }

        self.log(&format!("-- Starting muscle MSA on {}", renamed.display()))?;
        let version = get_muscle_version(&self.tools.muscle);
        self.log(&format!("MUSCLE version: {:?}", version))?;

        let program = self.tools.muscle.as_str();
        let work_dir = self.options.work_dir.as_path();
        with_spinner("Aligning with MUSCLE", || {
            version.run(program, work_dir, &renamed, &aligned)
        })
        .map_err(PipelineError::tool("alignment"))?;

        self.log("-- done with muscle")
    }

    /// Copies the alignment to the Gblocks staging file and counts its sequences.
    fn stage_alignment(&mut self) -> Result<usize, PipelineError> {
        self.log("-- Converting to phylip format and cleaning up")?;
        let aligned = self.work_path(&self.paths.aligned);
        if !aligned.is_file() {
            return Err(PipelineError::UpstreamArtifactMissing(aligned));
        }
        fs::copy(&aligned, self.work_path(&self.paths.staging))?;

        let count = count_fasta_records(&aligned)?;
        self.log(&format!("The number of sequences in alignment file = {}", count))?;
        if count == 0 {
            return Err(PipelineError::InvalidSequenceCount(count));
        }
        Ok(count)
    }

    fn filter_blocks(&mut self, sequence_count: usize) -> Result<(), PipelineError> {
        let staging = self.work_path(&self.paths.staging);
        let filtered = self.remove_stale(&self.paths.filtered)?;

        match BlockParams::for_sequences(sequence_count, self.options.mode) {
            None if self.options.mode == FilterMode::None => {
                self.log("-- Skipping Gblocks (mode none)")?;
                fs::rename(&staging, &filtered)?;
            }
            None => return Err(PipelineError::InvalidSequenceCount(sequence_count)),
            Some(params) => {
                self.log("-- Running Gblocks to detect conserved regions in the MSA")?;
                let staging_name = self.paths.staging.clone();
                let program = self.tools.gblocks.as_str();
                let command = gblocks::build_command(program, &staging_name, &params);
                self.log(&format!("cmd = {}", describe(&command)))?;

                let work_dir = self.options.work_dir.as_path();
                let result = with_spinner("Filtering blocks with Gblocks", || {
                    gblocks::run(program, work_dir, &staging_name, &params)
                });
                // Gblocks exits non-zero even on some successful runs
                if let Err(e) = result {
                    self.warn(&e.to_string())?;
                }
                self.log("-- done with Gblocks")?;
            }
        }

        if !filtered.is_file() {
            return Err(PipelineError::UpstreamArtifactMissing(filtered));
        }
        Ok(())
    }

    fn convert_to_phylip(&mut self) -> Result<(), PipelineError> {
        self.log(&format!("-- Converting {} to phylip", self.paths.filtered.display()))?;
        let output = self.remove_stale(&self.paths.phylip)?;
        phylip::convert(
            &self.tools.fasta2phy,
            &self.options.work_dir,
            &self.paths.filtered,
            &self.paths.phylip,
        )
        .map_err(PipelineError::tool("format conversion"))?;

        if !output.is_file() {
            return Err(PipelineError::UpstreamArtifactMissing(output));
        }
        Ok(())
    }

    fn choose_model(&mut self) -> Result<TreeModel, PipelineError> {
        if let Some(model) = &self.options.model_override {
            self.log(&format!("Skipping ProtTest, using model {}", model))?;
            return Ok(TreeModel::Override(model.clone()));
        }

        self.log("-- Starting ProtTest")?;
        self.remove_stale(&self.paths.model_report)?;
        let run = with_spinner("Selecting a model with ProtTest", || {
            prottest::run(
                &self.tools.java,
                &self.tools.prottest_jar,
                &self.options.work_dir,
                &self.paths.phylip,
                &self.paths.model_report,
                self.options.threads,
            )
        });
        let model = match run.map_err(|e| e.to_string()).and_then(|_| self.parse_model_report()) {
            Ok(parsed) => {
                let choice = prottest::select_model(&parsed);
                if let ModelChoice::Fallback { rejected } = &choice {
                    self.warn(&format!(
                        "Model {} is not supported by pplacer. Selecting a fallback model {}.",
                        rejected,
                        SupportedModel::FALLBACK
                    ))?;
                }
                choice.model()
            }
            Err(reason) => {
                self.warn(&format!(
                    "{}, selecting the fallback model {}",
                    reason,
                    SupportedModel::FALLBACK
                ))?;
                SupportedModel::FALLBACK
            }
        };

        self.log(&format!("Best model from ProtTest was: {}", model))?;
        Ok(TreeModel::Selected(model))
    }

    fn parse_model_report(&self) -> Result<String, String> {
        let report = fs::read_to_string(self.work_path(&self.paths.model_report))
            .map_err(|e| format!("cannot read {}: {}", self.paths.model_report.display(), e))?;
        prottest::parse_best_model(&report).map_err(|e| e.to_string())
    }

    fn infer_tree(&mut self, model: &TreeModel) -> Result<(), PipelineError> {
        let program = self.tools.raxml.clone();
        let run_name = self.options.run_name.clone();
        let alignment = self.paths.phylip.clone();
        let run = RaxmlRun {
            program: &program,
            model,
            run_name: &run_name,
            alignment: &alignment,
            bootstraps: self.options.bootstraps,
            threads: self.options.threads,
            parsimony_seed: self.tools.parsimony_seed,
            bootstrap_seed: self.tools.bootstrap_seed,
        };

        self.log("--Starting raxmlHPC")?;
        self.log(&format!("cmd = {}", describe(&run.build_command())))?;
        if let Err(e) = run.run(&self.options.work_dir) {
            self.warn(&format!("{}, trying to recover partial trees", e))?;
        }
        Ok(())
    }

    fn restore_trees(&mut self, mapping: &IdentifierMapping) -> Result<RestoreSummary, PipelineError> {
        self.log("Renaming output trees to use original names")?;
        let summary = restore_tree_artifacts(
            &self.options.work_dir,
            &self.options.run_name,
            self.options.mode,
            mapping,
        )?;

        for output in summary.restored() {
            log_line(&mut self.logger, &format!("Wrote {}", output.display()))?;
        }
        if !summary.missing().is_empty() {
            let missing = summary
                .missing()
                .iter()
                .map(|a| a.file_name(&self.options.run_name).display().to_string())
                .join(", ");
            self.warn(&format!("RAxML did not make {}", missing))?;
        }

        if summary.is_missing(RaxmlArtifact::BestTree) {
            let best = self.work_path(&RaxmlArtifact::BestTree.file_name(&self.options.run_name));
            return Err(PipelineError::UpstreamArtifactMissing(best));
        }
        Ok(summary)
    }

    fn remove_intermediates(&mut self) -> Result<(), PipelineError> {
        self.log("--removing unneeded files")?;
        let reduced = PathBuf::from(format!("{}.reduced", self.paths.phylip.display()));
        let mut targets: Vec<PathBuf> = self.paths.intermediates().into_iter().cloned().collect();
        targets.push(reduced);

        for target in targets {
            let path = self.work_path(&target);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}
