// crates/formsmith-cli/src/main.rs
// ============================================================================
// Module: formsmith CLI Entry Point
// Description: Command dispatcher for export, store, and preview workflows.
// Purpose: Provide a safe command-line front end over the formsmith crates.
// Dependencies: clap, formsmith-config, formsmith-core, formsmith-export,
//               formsmith-store-sqlite, formsmith-submit, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The `formsmith` binary renders forms to artifacts, imports data artifacts
//! into the saved-forms store, and previews validation and submission. All
//! user-facing strings are routed through the message catalog. Inputs are
//! untrusted: files are read with size limits and outputs are written
//! atomically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use formsmith_cli::audit::AuditEvent;
use formsmith_cli::audit::AuditEventParams;
use formsmith_cli::audit::AuditOutcome;
use formsmith_cli::audit::AuditSink;
use formsmith_cli::audit::EVENT_DELETE;
use formsmith_cli::audit::EVENT_EXPORT;
use formsmith_cli::audit::EVENT_IMPORT;
use formsmith_cli::audit::EVENT_SUBMIT;
use formsmith_cli::audit::sink_from_config;
use formsmith_cli::output::ReadLimitError;
use formsmith_cli::output::read_bytes_with_limit;
use formsmith_cli::output::write_atomic;
use formsmith_cli::t;
use formsmith_config::FormsmithConfig;
use formsmith_core::FieldError;
use formsmith_core::FormDefinition;
use formsmith_core::FormId;
use formsmith_core::FormLibrary;
use formsmith_core::FormPreview;
use formsmith_core::SubmitError;
use formsmith_core::SubmitOutcome;
use formsmith_export::MAX_DATA_BYTES;
use formsmith_export::dispatch_with;
use formsmith_export::parse_data;
use formsmith_store_sqlite::SqliteFormStore;
use formsmith_submit::HttpTransport;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum preview values file size in bytes.
const MAX_VALUES_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "formsmith", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Config file path (overrides `FORMSMITH_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a form to an artifact.
    Export(ExportCommand),
    /// Import a data artifact into the saved-forms store.
    Import(ImportCommand),
    /// Saved-forms store utilities.
    Forms {
        /// Selected forms subcommand.
        #[command(subcommand)]
        command: FormsCommand,
    },
    /// Validate or submit values against a form.
    Preview {
        /// Selected preview subcommand.
        #[command(subcommand)]
        command: PreviewCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `export`.
#[derive(Args, Debug)]
struct ExportCommand {
    /// Data artifact holding the form.
    #[arg(long, value_name = "FILE", conflicts_with = "id", required_unless_present = "id")]
    form: Option<PathBuf>,
    /// Saved form id to export instead of a file.
    #[arg(long, value_name = "ID")]
    id: Option<String>,
    /// Artifact format (`component`, `data`, `markup`, `script`).
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,
    /// Output file; the artifact goes to stdout when omitted.
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

/// Arguments for `import`.
#[derive(Args, Debug)]
struct ImportCommand {
    /// Data artifact to import.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,
}

/// Saved-forms subcommands.
#[derive(Subcommand, Debug)]
enum FormsCommand {
    /// List saved forms.
    List,
    /// Print a saved form as a data artifact.
    Show(FormIdArgs),
    /// Delete a saved form.
    Delete(FormIdArgs),
    /// List stored snapshot versions.
    History,
}

/// Selects one saved form.
#[derive(Args, Debug)]
struct FormIdArgs {
    /// Saved form id.
    #[arg(long, value_name = "ID")]
    id: String,
}

/// Preview subcommands.
#[derive(Subcommand, Debug)]
enum PreviewCommand {
    /// Validate values and print the normalized payload.
    Validate(PreviewArgs),
    /// Validate values and submit them to the form endpoint.
    Submit(PreviewArgs),
}

/// Preview inputs.
#[derive(Args, Debug)]
struct PreviewArgs {
    /// Data artifact holding the form.
    #[arg(long, value_name = "FILE")]
    form: PathBuf,
    /// JSON object of values keyed by field key.
    #[arg(long, value_name = "FILE")]
    values: PathBuf,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the config file.
    Validate,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Context
// ============================================================================

/// Loaded config and audit sink shared by commands.
struct Context {
    /// Effective configuration.
    config: FormsmithConfig,
    /// Audit destination.
    sink: Box<dyn AuditSink>,
}

impl Context {
    /// Records an audit event.
    fn audit(&self, event: &'static str, params: AuditEventParams) {
        self.sink.record(&AuditEvent::new(event, params));
    }

    /// Returns the configured store key.
    fn store_key(&self) -> &str {
        &self.config.store.key
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        write_stdout_line(&t!("main.version", version = env!("CARGO_PKG_VERSION")))?;
        return Ok(ExitCode::SUCCESS);
    }
    let Some(command) = cli.command else {
        let help = Cli::command().render_help().to_string();
        write_stdout_line(&help)?;
        return Ok(ExitCode::SUCCESS);
    };

    let config = FormsmithConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let sink = sink_from_config(&config.audit).map_err(|err| {
        let path = config.audit.path.as_deref().map(|path| path.display().to_string()).unwrap_or_default();
        CliError::new(t!("audit.open_failed", path = path, error = err))
    })?;
    let context = Context {
        config,
        sink,
    };

    match command {
        Commands::Export(command) => command_export(&context, &command),
        Commands::Import(command) => command_import(&context, &command),
        Commands::Forms {
            command,
        } => command_forms(&context, &command),
        Commands::Preview {
            command,
        } => command_preview(&context, &command),
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(&context),
    }
}

// ============================================================================
// SECTION: Export and Import
// ============================================================================

/// Executes `export`.
fn command_export(context: &Context, command: &ExportCommand) -> CliResult<ExitCode> {
    let form = match (&command.form, &command.id) {
        (Some(path), _) => read_form_file(path)?,
        (None, Some(id)) => saved_form(context, &FormId::new(id.as_str()))?,
        (None, None) => return Err(CliError::new(t!("export.source_missing"))),
    };
    let format = command
        .format
        .clone()
        .unwrap_or_else(|| context.config.export.default_format.as_str().to_string());
    let form_id = form.id.as_ref().map(ToString::to_string);

    let rendered = match dispatch_with(&form, &format, &context.config.export.options) {
        Ok(rendered) => rendered,
        Err(err) => {
            context.audit(
                EVENT_EXPORT,
                AuditEventParams {
                    outcome: AuditOutcome::Failure,
                    form_id,
                    format: Some(format),
                    error: Some(err.to_string()),
                    ..AuditEventParams::default()
                },
            );
            return Err(CliError::new(t!("export.failed", error = err)));
        }
    };
    context.audit(
        EVENT_EXPORT,
        AuditEventParams {
            form_id,
            format: Some(format.clone()),
            bytes: Some(rendered.len()),
            ..AuditEventParams::default()
        },
    );

    match &command.out {
        Some(path) => {
            write_atomic(path, rendered.as_bytes()).map_err(|err| {
                CliError::new(t!("export.write_failed", format = format, path = path.display(), error = err))
            })?;
            write_stdout_line(&t!(
                "export.written",
                format = format,
                path = path.display(),
                bytes = rendered.len()
            ))?;
        }
        None => write_stdout_line(&rendered)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `import`.
fn command_import(context: &Context, command: &ImportCommand) -> CliResult<ExitCode> {
    let form = read_form_file(&command.input)?;
    let mut library = open_library(context)?;
    let saved = match library.save_form(form) {
        Ok(saved) => saved,
        Err(err) => {
            context.audit(
                EVENT_IMPORT,
                AuditEventParams {
                    outcome: AuditOutcome::Failure,
                    store_key: Some(context.store_key().to_string()),
                    error: Some(err.to_string()),
                    ..AuditEventParams::default()
                },
            );
            return Err(CliError::new(t!("store.save_failed", error = err)));
        }
    };
    let id = saved.id.as_ref().map(ToString::to_string).unwrap_or_default();
    context.audit(
        EVENT_IMPORT,
        AuditEventParams {
            form_id: Some(id.clone()),
            store_key: Some(context.store_key().to_string()),
            ..AuditEventParams::default()
        },
    );
    write_stdout_line(&t!("import.ok", id = id, name = display_name(&saved), key = context.store_key()))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Forms Commands
// ============================================================================

/// Dispatches `forms` subcommands.
fn command_forms(context: &Context, command: &FormsCommand) -> CliResult<ExitCode> {
    match command {
        FormsCommand::List => command_forms_list(context),
        FormsCommand::Show(args) => command_forms_show(context, args),
        FormsCommand::Delete(args) => command_forms_delete(context, args),
        FormsCommand::History => command_forms_history(context),
    }
}

/// Executes `forms list`.
fn command_forms_list(context: &Context) -> CliResult<ExitCode> {
    let library = open_library(context)?;
    let key = context.store_key();
    if library.forms().is_empty() {
        write_stdout_line(&t!("forms.list.none", key = key))?;
        return Ok(ExitCode::SUCCESS);
    }
    let mut output = t!("forms.list.header", key = key);
    for form in library.forms() {
        output.push('\n');
        output.push_str(&t!(
            "forms.list.entry",
            id = form.id.as_ref().map(ToString::to_string).unwrap_or_default(),
            name = display_name(form),
            fields = form.fields.len()
        ));
    }
    write_stdout_line(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `forms show`.
fn command_forms_show(context: &Context, args: &FormIdArgs) -> CliResult<ExitCode> {
    let form = saved_form(context, &FormId::new(args.id.as_str()))?;
    let rendered = dispatch_with(&form, "data", &context.config.export.options)
        .map_err(|err| CliError::new(t!("export.failed", error = err)))?;
    write_stdout_line(&rendered)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `forms delete`.
fn command_forms_delete(context: &Context, args: &FormIdArgs) -> CliResult<ExitCode> {
    let mut library = open_library(context)?;
    let id = FormId::new(args.id.as_str());
    let removed = library.delete_form(&id).map_err(|err| {
        context.audit(
            EVENT_DELETE,
            AuditEventParams {
                outcome: AuditOutcome::Failure,
                form_id: Some(args.id.clone()),
                store_key: Some(context.store_key().to_string()),
                error: Some(err.to_string()),
                ..AuditEventParams::default()
            },
        );
        CliError::new(t!("store.save_failed", error = err))
    })?;
    if !removed {
        return Err(CliError::new(t!("forms.not_found", id = args.id)));
    }
    context.audit(
        EVENT_DELETE,
        AuditEventParams {
            form_id: Some(args.id.clone()),
            store_key: Some(context.store_key().to_string()),
            ..AuditEventParams::default()
        },
    );
    write_stdout_line(&t!("forms.delete.ok", id = args.id))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `forms history`.
fn command_forms_history(context: &Context) -> CliResult<ExitCode> {
    let store = open_store(context)?;
    let key = context.store_key();
    let versions =
        store.list_versions(key).map_err(|err| CliError::new(t!("store.history_failed", error = err)))?;
    if versions.is_empty() {
        write_stdout_line(&t!("forms.history.none", key = key))?;
        return Ok(ExitCode::SUCCESS);
    }
    let mut output = t!("forms.history.header", key = key);
    for version in &versions {
        output.push('\n');
        output.push_str(&t!(
            "forms.history.entry",
            version = version.version,
            saved_at = version.saved_at,
            forms = version.form_count,
            algorithm = version.hash_algorithm,
            hash = version.payload_hash
        ));
    }
    write_stdout_line(&output)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Preview Commands
// ============================================================================

/// Dispatches `preview` subcommands.
fn command_preview(context: &Context, command: &PreviewCommand) -> CliResult<ExitCode> {
    match command {
        PreviewCommand::Validate(args) => command_preview_validate(args),
        PreviewCommand::Submit(args) => command_preview_submit(context, args),
    }
}

/// Executes `preview validate`.
fn command_preview_validate(args: &PreviewArgs) -> CliResult<ExitCode> {
    let form = read_form_file(&args.form)?;
    let values = read_values_file(&args.values)?;
    let preview =
        FormPreview::new(&form).map_err(|err| CliError::new(t!("preview.form_invalid", error = err)))?;
    match preview.validate(&values) {
        Ok(payload) => {
            write_stdout_line(&render_json(&payload)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            write_stdout_line(&render_field_errors(&errors))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Executes `preview submit`.
fn command_preview_submit(context: &Context, args: &PreviewArgs) -> CliResult<ExitCode> {
    let form = read_form_file(&args.form)?;
    let values = read_values_file(&args.values)?;
    let preview =
        FormPreview::new(&form).map_err(|err| CliError::new(t!("preview.form_invalid", error = err)))?;
    let transport = HttpTransport::with_config(context.config.submit.clone())
        .map_err(|err| CliError::new(t!("submit.transport_failed", error = err)))?;
    let form_id = form.id.as_ref().map(ToString::to_string);

    let outcome = preview.submit(&transport, &values);
    let status = match &outcome {
        Ok(SubmitOutcome::Sent {
            response,
            ..
        }) => Some(response.status),
        Err(SubmitError::Rejected(response)) => Some(response.status),
        _ => None,
    };
    context.audit(
        EVENT_SUBMIT,
        AuditEventParams {
            outcome: if outcome.is_ok() { AuditOutcome::Success } else { AuditOutcome::Failure },
            form_id,
            status,
            error: outcome.as_ref().err().map(ToString::to_string),
            ..AuditEventParams::default()
        },
    );

    match outcome {
        Ok(SubmitOutcome::Local(payload)) => {
            write_stdout_line(&t!("preview.submit.local"))?;
            write_stdout_line(&render_json(&payload)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(SubmitOutcome::Sent {
            response,
            ..
        }) => {
            write_stdout_line(&t!("preview.submit.sent", status = response.status))?;
            write_stdout_line(&response.body)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(SubmitError::Validation(errors)) => {
            write_stdout_line(&render_field_errors(&errors))?;
            Ok(ExitCode::FAILURE)
        }
        Err(SubmitError::Rejected(response)) => Err(CliError::new(t!(
            "preview.submit.rejected",
            status = response.status,
            body = response.body
        ))),
        Err(err) => Err(CliError::new(t!("preview.submit.failed", error = err))),
    }
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes `config validate`.
fn command_config_validate(context: &Context) -> CliResult<ExitCode> {
    let source = context
        .config
        .source_path
        .as_deref()
        .map_or_else(|| t!("config.source.defaults"), |path| path.display().to_string());
    write_stdout_line(&t!("config.validate.ok", source = source))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Store Helpers
// ============================================================================

/// Opens the configured `SQLite` store.
fn open_store(context: &Context) -> CliResult<SqliteFormStore> {
    SqliteFormStore::new(context.config.store.to_sqlite_config())
        .map_err(|err| CliError::new(t!("store.open_failed", error = err)))
}

/// Opens and loads the saved-forms library.
fn open_library(context: &Context) -> CliResult<FormLibrary<SqliteFormStore>> {
    let mut library = FormLibrary::with_key(open_store(context)?, context.store_key());
    library.load().map_err(|err| CliError::new(t!("store.load_failed", error = err)))?;
    Ok(library)
}

/// Looks up one saved form.
fn saved_form(context: &Context, id: &FormId) -> CliResult<FormDefinition> {
    let library = open_library(context)?;
    library.get(id).cloned().ok_or_else(|| CliError::new(t!("forms.not_found", id = id)))
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads a size-limited UTF-8 file.
fn read_text_file(path: &Path, max_bytes: usize, kind: &str) -> CliResult<String> {
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(t!("input.read_failed", kind = kind, path = path.display(), error = err))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    String::from_utf8(bytes)
        .map_err(|_| CliError::new(t!("input.not_utf8", kind = kind, path = path.display())))
}

/// Reads a form from a data artifact file.
fn read_form_file(path: &Path) -> CliResult<FormDefinition> {
    let text = read_text_file(path, MAX_DATA_BYTES, &t!("input.kind.form"))?;
    parse_data(&text).map_err(|err| CliError::new(t!("form.parse_failed", path = path.display(), error = err)))
}

/// Reads preview values from a JSON object file.
fn read_values_file(path: &Path) -> CliResult<Map<String, Value>> {
    let text = read_text_file(path, MAX_VALUES_BYTES, &t!("input.kind.values"))?;
    serde_json::from_str(&text).map_err(|err| CliError::new(t!("preview.values_invalid", error = err)))
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Returns the form name or the untitled placeholder.
fn display_name(form: &FormDefinition) -> String {
    if form.name.trim().is_empty() { t!("forms.untitled") } else { form.name.clone() }
}

/// Pretty-prints a JSON payload.
fn render_json(payload: &Map<String, Value>) -> CliResult<String> {
    serde_json::to_string_pretty(payload).map_err(|err| CliError::new(t!("preview.encode_failed", error = err)))
}

/// Renders field validation errors, one per line.
fn render_field_errors(errors: &[FieldError]) -> String {
    let mut output = t!("preview.validate.failed");
    for error in errors {
        output.push('\n');
        output.push_str(&t!("preview.field_error", key = error.key, label = error.label, issue = error.issue));
    }
    output
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}").map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
