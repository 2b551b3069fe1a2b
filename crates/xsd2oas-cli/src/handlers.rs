//! Command handlers
//!
//! This module contains the conversion flow behind the command line and the
//! completion generator.

use crate::cli::{Cli, Shell};
use crate::config::Config;
use crate::error::{Error, ErrorContext, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use clap::CommandFactory;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use xsd2oas_core::{
    emit_example, emit_openapi, parse_xsd, tag, EmitterConfig, ExampleConfig, Mask, Synthesizer,
    Tagging,
};

/// Title used when the output path has no usable file name
const FALLBACK_TITLE: &str = "api";

/// Settings for one conversion after merging flags over the config file
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mask: Option<PathBuf>,
    pub example: Option<PathBuf>,
    pub paths: Option<PathBuf>,
    pub root: Option<String>,
    pub all: bool,
    pub list_paths: bool,
    pub emitter: EmitterConfig,
    pub example_config: ExampleConfig,
    pub example_full: bool,
    pub seed: Option<u64>,
    pub repeat_limit: u32,
}

impl ConvertOptions {
    /// Merge command-line flags over the configuration file
    pub fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let input = cli
            .input
            .clone()
            .ok_or_else(|| Error::usage("missing required argument -in <XSD>"))?;
        let output = cli
            .output
            .clone()
            .ok_or_else(|| Error::usage("missing required argument -out <YAML>"))?;

        let title = config.title.clone().unwrap_or_else(|| {
            output
                .file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| !stem.is_empty())
                .unwrap_or(FALLBACK_TITLE)
                .to_string()
        });
        let fixup = cli.fixup || config.fixup;

        let mut emitter = EmitterConfig::new(title).with_fixup(fixup);
        if let Some(url) = cli.domain.as_ref().or(config.server_url.as_ref()) {
            emitter = emitter.with_server_url(url.clone());
        }
        if let Some(path) = &config.path {
            emitter = emitter.with_path(path.clone());
        }

        Ok(Self {
            input,
            output,
            mask: cli.mask.clone(),
            example: cli.example.clone(),
            paths: cli.paths.clone(),
            root: cli.root.clone(),
            all: cli.all || config.all,
            list_paths: cli.verbosity_level() > 0,
            emitter,
            example_config: ExampleConfig {
                max_depth: config.example.max_depth,
                fixup,
            },
            example_full: cli.example_full || config.example.full_graph,
            seed: cli.seed.or(config.example.seed),
            repeat_limit: config.example.repeat_limit,
        })
    }
}

/// Handle a conversion run
#[instrument(skip_all, fields(input = %options.input.display(), output = %options.output.display()))]
pub fn handle_convert(options: &ConvertOptions, output: &mut OutputWriter) -> Result<()> {
    let xsd = fs::read_to_string(&options.input).with_path("read", &options.input)?;
    let mask = options
        .mask
        .as_ref()
        .map(|path| read_mask(path))
        .transpose()?;

    // Open every output before converting so a bad path fails fast
    let mut yaml_sink = create(&options.output)?;
    let mut example_sink = options.example.as_deref().map(create).transpose()?;
    let mut paths_sink = options.paths.as_deref().map(create).transpose()?;

    let graph = {
        let _timer = Timer::new("parse_xsd");
        parse_xsd(&xsd, options.root.as_deref()).with_path("convert", &options.input)?
    };
    info!(types = graph.len(), root = graph.root_name(), "Schema read");

    let tagging = {
        let _timer = Timer::new("tag");
        tag(&graph, mask.as_ref(), options.all).with_path("convert", &options.input)?
    };

    if options.list_paths {
        for tagged in &tagging.paths {
            output.path(&tagged.path, tagged.leaf)?;
        }
    }
    if let Some(mask) = &mask {
        report_unmatched(mask, &tagging, output)?;
    }

    if let (Some(sink), Some(path)) = (paths_sink.as_mut(), options.paths.as_deref()) {
        for leaf in tagging.leaf_paths() {
            writeln!(sink, "{}", leaf).with_path("write", path)?;
        }
        sink.flush().with_path("write", path)?;
        debug!(path = %path.display(), "Leaf paths written");
    }

    {
        let _timer = Timer::new("emit_openapi");
        emit_openapi(&graph, &tagging.inclusion, &options.emitter, &mut yaml_sink)
            .with_path("write", &options.output)?;
    }

    if let (Some(sink), Some(path)) = (example_sink.as_mut(), options.example.as_deref()) {
        let _timer = Timer::new("emit_example");
        let mut synth = match options.seed {
            Some(seed) => Synthesizer::with_seed(seed),
            None => Synthesizer::new(),
        }
        .with_repeat_limit(options.repeat_limit);
        let inclusion = (!options.example_full).then_some(&tagging.inclusion);
        emit_example(&graph, inclusion, &options.example_config, &mut synth, sink)
            .with_path("convert", path)?;
    }

    output.success(&format!(
        "Wrote {} schemas for {} elements to {}",
        tagging.inclusion.type_count(),
        tagging.inclusion.element_count(),
        options.output.display()
    ))
}

fn read_mask(path: &Path) -> Result<Mask> {
    let text = fs::read_to_string(path).with_path("read mask", path)?;
    let mask = Mask::parse(&text);
    debug!(path = %path.display(), lines = mask.len(), "Mask loaded");
    Ok(mask)
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .with_path("create", path)
}

/// Warn about mask lines that name no element of the schema
fn report_unmatched(mask: &Mask, tagging: &Tagging, output: &mut OutputWriter) -> Result<()> {
    for line in mask.lines() {
        if !tagging.paths.iter().any(|tagged| &tagged.path == line) {
            output.warning(&format!("Mask line {} matched no element", line))?;
        }
    }
    Ok(())
}

/// Handle the completions request
pub fn handle_completions(shell: Shell) -> Result<()> {
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell.to_clap_shell(), &mut cmd, name, &mut io::stdout());

    Ok(())
}
