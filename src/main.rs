use clap::{Parser, Subcommand, ValueEnum};
use devbox::archive::ZipCodec;
use devbox::error::Error;
use devbox::imaging::{self, Quality, RustCodec, Target};
use devbox::prompt::{GeminiClient, PromptSession, image_mime_type};
use devbox::types::{ConversionResult, InputFile};
use devbox::{convert, output};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "devbox")]
#[command(about = "Batch file-conversion toolbox")]
#[command(long_about = "\
Batch file-conversion toolbox

Every command reads its inputs, performs one conversion, and writes exactly
one artifact into --output-dir:

  zip      rewrite .php/.sql entry names to .txt inside a zip archive
           (content bytes untouched) → <name>_converted.zip
  convert  convert loose .php/.sql files to .txt; one file stays a plain
           file, several are packed into converted_files.zip
  images   re-encode images and keep whichever of original/re-encoded is
           smaller; one image stays a plain file, several are packed into
           compressed_images.zip
  prompt   send an image to Gemini and print a detailed English generation
           prompt plus an Arabic explanation; --refine applies follow-up
           changes to the prompt

Directories given to convert/images are walked recursively.

The prompt command needs GEMINI_API_KEY in the environment.")]
#[command(version)]
struct Cli {
    /// Directory artifacts are written to
    #[arg(long, default_value = ".", global = true)]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rewrite .php/.sql entry names inside a zip archive
    Zip {
        /// The archive to transcode
        archive: PathBuf,
    },
    /// Convert loose .php/.sql files to .txt
    Convert {
        /// Files (or directories to walk) to convert
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Recompress images, never producing a larger artifact
    Images {
        /// Image files (or directories to walk)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output encoding; default derives it from each file's extension
        #[arg(long, value_enum, default_value = "default")]
        format: FormatArg,
    },
    /// Derive an AI image-generation prompt from an image
    Prompt {
        /// The image to analyze
        image: PathBuf,

        /// Follow-up change request applied to the derived prompt
        /// (repeatable; applied in order)
        #[arg(long)]
        refine: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

/// CLI spelling of the image output target.
#[derive(ValueEnum, Clone, Copy)]
enum FormatArg {
    /// Keep each file's own format (png stays png, jpg stays jpg,
    /// anything else becomes png)
    Default,
    Webp,
    Png,
    Jpg,
}

impl From<FormatArg> for Target {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Default => Target::KeepOriginal,
            FormatArg::Webp => Target::Webp,
            FormatArg::Png => Target::Png,
            FormatArg::Jpg => Target::Jpeg,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Zip { archive } => {
            let name = file_name_of(&archive)?;
            let bytes = std::fs::read(&archive).map_err(Error::Io)?;
            let result = convert::transcode_archive(&ZipCodec::new(), &name, &bytes)?;
            let path = save_artifact(&cli.output_dir, &result)?;
            println!("Wrote {}", path.display());
            println!("{}", output::size_summary(&result));
        }
        Command::Convert { inputs } => {
            let files = collect_inputs(&inputs)?;
            let result = convert::convert_files(&ZipCodec::new(), &files)?;
            let path = save_artifact(&cli.output_dir, &result)?;
            println!("Wrote {}", path.display());
        }
        Command::Images { inputs, format } => {
            let files: Vec<InputFile> = collect_inputs(&inputs)?
                .into_iter()
                .filter(|f| imaging::is_supported_image(&f.name))
                .collect();
            if files.is_empty() {
                return Err(Error::UnsupportedInput(
                    "no image files among the inputs".into(),
                )
                .into());
            }

            let report = imaging::recompress(
                &RustCodec::new(),
                &ZipCodec::new(),
                &files,
                format.into(),
                Quality::default(),
            )?;
            for (name, outcome) in &report.outcomes {
                println!("{}", output::outcome_line(name, outcome));
            }
            let path = save_artifact(&cli.output_dir, &report.result)?;
            println!("Wrote {}", path.display());
            println!("{}", output::size_summary(&report.result));
        }
        Command::Prompt {
            image,
            refine,
            json,
        } => {
            let name = file_name_of(&image)?;
            let mime = image_mime_type(&name).ok_or_else(|| {
                Error::UnsupportedInput(format!("{name}: not a recognized image file"))
            })?;
            let bytes = std::fs::read(&image).map_err(Error::Io)?;

            let mut session = PromptSession::new(GeminiClient::from_env()?);
            session.derive(&bytes, mime)?;
            for request in &refine {
                session.refine(request)?;
            }

            // derive() just succeeded, so the state is present.
            let state = session
                .state()
                .ok_or_else(|| Error::Generation("no prompt state".into()))?;
            if json {
                let value = serde_json::json!({
                    "englishPrompt": state.english_prompt,
                    "arabicExplanation": state.arabic_explanation,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("English prompt:\n{}\n", state.english_prompt);
                println!("Arabic explanation:\n{}", state.arabic_explanation);
            }
        }
    }

    Ok(())
}

/// Bare file name of a path, as a string.
fn file_name_of(path: &Path) -> Result<String, Error> {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| Error::UnsupportedInput(format!("{}: not a file", path.display())))
}

/// Expand the CLI inputs into buffered files; directories are walked
/// recursively in name order so batches are deterministic.
fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<InputFile>, Error> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.map_err(std::io::Error::from)?;
                if entry.file_type().is_file() {
                    files.push(read_input(entry.path())?);
                }
            }
        } else {
            files.push(read_input(path)?);
        }
    }
    Ok(files)
}

fn read_input(path: &Path) -> Result<InputFile, Error> {
    let name = file_name_of(path)?;
    let data = std::fs::read(path)?;
    Ok(InputFile::new(name, data))
}

/// Write the artifact into the output directory under its suggested name.
fn save_artifact(dir: &Path, result: &ConversionResult) -> Result<PathBuf, Error> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&result.output_name);
    std::fs::write(&path, &result.output)?;
    Ok(path)
}
