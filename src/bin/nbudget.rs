//! Command-line front end: insert a record, list tags or show the balance.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use nbudget_rs::NBudgetError;
use nbudget_rs::delivery::{ErrorDelivery, ReportAndHalt};
use nbudget_rs::models::{Record, RecordKind};
use nbudget_rs::nbudget::{CreatedPage, NBudget};
use nbudget_rs::settings::Settings;
use nbudget_rs::transport::HttpTransport;
use owo_colors::OwoColorize;
use secrecy::SecretString;

/// Environment variable overriding the API key of the settings file.
const API_KEY_ENV: &str = "NBUDGET_API_KEY";

/// Environment variable overriding the database id of the settings file.
const DATABASE_ID_ENV: &str = "NBUDGET_DATABASE_ID";

/// Directory below the user config dir holding the settings file.
const CONFIG_DIR_NAME: &str = "nbudget-rs";

/// Settings file name.
const SETTINGS_FILE_NAME: &str = "settings.json";

/// Interface for a budget database in Notion.
///
/// The database needs a Type (select, with "INCOME" and "EXPENSE"
/// options), Date (date), Concept (title), Amount (number) and Tags
/// (multi_select) column. Other column names can be used if the settings
/// file is edited to match.
#[derive(Debug, Parser)]
#[command(name = "nbudget", version, about)]
struct Cli {
    /// Run the settings wizard and exit.
    #[arg(short, long)]
    wizard: bool,
    /// Output the current tag names in the database and exit.
    #[arg(short, long)]
    tags: bool,
    /// Output the current balance of the database and exit.
    #[arg(short, long)]
    count: bool,
    /// Record is an INCOME instead of an EXPENSE.
    #[arg(short, long)]
    income: bool,
    /// Date of the record in the configured input format (default: today).
    #[arg(short, long, value_name = "DATE")]
    date: Option<String>,
    /// Override the settings file location.
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,
    /// Print the request body instead of inserting the record.
    #[arg(long)]
    dry_run: bool,
    /// The concept for the record.
    #[arg(
        value_name = "CONCEPT",
        required_unless_present_any = ["wizard", "tags", "count"]
    )]
    concept: Option<String>,
    /// The amount value for the record.
    #[arg(
        value_name = "AMOUNT",
        value_parser = parse_amount,
        required_unless_present_any = ["wizard", "tags", "count"]
    )]
    amount: Option<f64>,
    /// Tags for the record. Each must be an option of the tags column.
    #[arg(value_name = "TAG")]
    tag: Vec<String>,
}

/// Clears the spinner before reporting an error and exiting.
struct ClearSpinner {
    /// Spinner shown during API calls.
    spinner: ProgressBar,
    /// Reporting strategy applied after clearing.
    report: ReportAndHalt,
}

impl core::fmt::Debug for ClearSpinner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClearSpinner")
            .field("report", &self.report)
            .finish_non_exhaustive()
    }
}

impl ErrorDelivery for ClearSpinner {
    fn deliver(&self, error: NBudgetError) -> NBudgetError {
        self.spinner.finish_and_clear();
        self.report.deliver(error)
    }
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let Some(path) = cli.settings.clone().or_else(default_settings_path) else {
        writeln!(
            io::stderr().lock(),
            "{} could not determine the config directory, use --settings",
            "error:".red().bold()
        )?;
        return Ok(ExitCode::FAILURE);
    };

    if cli.wizard {
        let mut input = io::stdin().lock();
        let mut output = io::stdout().lock();
        return match settings_wizard(&mut input, &mut output, &path) {
            Ok(_settings) => Ok(ExitCode::SUCCESS),
            Err(err) => report_settings_error(&err, &path),
        };
    }

    let settings = match read_settings(&path) {
        Ok(Some(settings)) => apply_env_overrides(
            settings,
            non_empty_var(API_KEY_ENV),
            non_empty_var(DATABASE_ID_ENV),
        ),
        Ok(None) => {
            writeln!(
                io::stderr().lock(),
                "{} no settings file at {}",
                "error:".red().bold(),
                path.display()
            )?;
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return report_settings_error(&err, &path),
    };

    let spinner = make_spinner();
    let mut client = match build_client(settings, &spinner) {
        Ok(client) => client,
        Err(err) => {
            writeln!(
                io::stderr().lock(),
                "{} failed to build client: {err}",
                "error:".red().bold()
            )?;
            return Ok(ExitCode::FAILURE);
        }
    };

    if cli.tags {
        return cmd_tags(&mut client, &spinner);
    }
    if cli.count {
        return cmd_count(&client, &spinner);
    }
    let (Some(concept), Some(amount)) = (cli.concept, cli.amount) else {
        writeln!(
            io::stderr().lock(),
            "{} CONCEPT and AMOUNT are required",
            "error:".red().bold()
        )?;
        return Ok(ExitCode::FAILURE);
    };

    let mut record = Record::new(concept, amount, RecordKind::from(cli.income)).tags(cli.tag);
    if let Some(date) = cli.date {
        record = record.date(date);
    }
    if cli.dry_run {
        cmd_dry_run(&mut client, &record, &spinner)
    } else {
        cmd_insert(&mut client, &record, &spinner)
    }
}

/// Parses a finite record amount.
fn parse_amount(raw: &str) -> Result<f64, String> {
    let amount: f64 = raw.parse().map_err(|err| format!("{err}: {raw}"))?;
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(format!("amount must be a finite number, got {raw}"))
    }
}

/// Returns the settings path below the user config directory.
fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(SETTINGS_FILE_NAME))
}

/// Reads an environment variable, ignoring empty values.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Replaces the API key and database id with values from the environment.
fn apply_env_overrides(
    mut settings: Settings,
    api_key: Option<String>,
    database_id: Option<String>,
) -> Settings {
    if let Some(key) = api_key {
        tracing::debug!("API key taken from the environment");
        settings.api_key = SecretString::from(key);
    }
    if let Some(id) = database_id {
        tracing::debug!("database id taken from the environment");
        settings.database_id = id;
    }
    settings
}

/// Loads the settings file, offering the wizard when it does not exist.
///
/// Returns `Ok(None)` if the file is missing and the user declined.
fn read_settings(path: &Path) -> nbudget_rs::Result<Option<Settings>> {
    if path.exists() {
        return Settings::load(path).map(Some);
    }
    let mut input = io::stdin().lock();
    let mut output = io::stdout().lock();
    let answer = choose_option(
        &mut input,
        &mut output,
        "Settings file does not exist. Create one?",
        &["Y", "N"],
    )?;
    if answer == "Y" {
        settings_wizard(&mut input, &mut output, path).map(Some)
    } else {
        Ok(None)
    }
}

/// Prints a settings error with a hint to run the wizard.
fn report_settings_error(err: &NBudgetError, path: &Path) -> io::Result<ExitCode> {
    let mut out = io::stderr().lock();
    writeln!(
        out,
        "{} {} ({})",
        "error:".red().bold(),
        err,
        path.display()
    )?;
    writeln!(
        out,
        "  {} consider running the settings wizard with {}",
        "hint:".cyan(),
        "--wizard".bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Asks for the database id and API key and writes default settings.
fn settings_wizard<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    path: &Path,
) -> nbudget_rs::Result<Settings> {
    let database_id = prompt(
        input,
        output,
        "Please enter the database_id of the Notion budget database:",
    )?;
    let api_key = prompt(
        input,
        output,
        "Please enter the Notion API key associated with this database_id:",
    )?;
    let settings = Settings::new(database_id, api_key);
    settings.save(path)?;
    writeln!(output, "Settings written to {}", path.display())?;
    Ok(settings)
}

/// Prompts until the answer is one of `options`, ignoring case.
///
/// Returns the matching option.
fn choose_option<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
    options: &[&str],
) -> io::Result<String> {
    let question = format!("{message} [{}]", options.join("/"));
    loop {
        let answer = prompt(input, output, &question)?;
        if let Some(option) = options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(&answer))
        {
            return Ok((*option).to_owned());
        }
    }
}

/// Writes `[>] message` and reads one trimmed line.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> io::Result<String> {
    write!(output, "[>] {message} ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before an answer was given",
        ));
    }
    Ok(line.trim().to_owned())
}

/// Builds the client; errors from its operations are reported and exit.
fn build_client(
    settings: Settings,
    spinner: &ProgressBar,
) -> nbudget_rs::Result<NBudget<HttpTransport>> {
    let transport = HttpTransport::from_settings(&settings)?;
    NBudget::builder()
        .settings(settings)
        .transport(transport)
        .delivery(ClearSpinner {
            spinner: spinner.clone(),
            report: ReportAndHalt::stderr(),
        })
        .build()
}

/// Executes `--tags`: prints the tag names joined by the separator.
fn cmd_tags(client: &mut NBudget<HttpTransport>, spinner: &ProgressBar) -> io::Result<ExitCode> {
    start_spinner(spinner, "Fetching tags...");
    let result = client.fetch_tags();
    spinner.finish_and_clear();
    match result {
        Ok(tags) => {
            let separator = client.settings().tag_separator.as_str();
            writeln!(io::stdout().lock(), "{}", tags.join(separator))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error(&err),
    }
}

/// Executes `--count`: prints the running balance.
fn cmd_count(client: &NBudget<HttpTransport>, spinner: &ProgressBar) -> io::Result<ExitCode> {
    start_spinner(spinner, "Summing records...");
    let result = client.balance();
    spinner.finish_and_clear();
    match result {
        Ok(balance) => {
            writeln!(io::stdout().lock(), "$ {}", balance.total)?;
            if balance.skipped > 0 {
                writeln!(
                    io::stderr().lock(),
                    "{}",
                    format_args!(
                        "({} of {} records had no amount)",
                        balance.skipped,
                        balance.counted + balance.skipped
                    )
                    .dimmed()
                )?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error(&err),
    }
}

/// Executes `--dry-run`: prints the payload that would be sent.
fn cmd_dry_run(
    client: &mut NBudget<HttpTransport>,
    record: &Record,
    spinner: &ProgressBar,
) -> io::Result<ExitCode> {
    if !record.tags.is_empty() {
        start_spinner(spinner, "Validating tags...");
    }
    let result = client.build_payload(record);
    spinner.finish_and_clear();
    match result {
        Ok(payload) => {
            let json = serde_json::to_string_pretty(&payload).map_err(io::Error::other)?;
            writeln!(io::stdout().lock(), "{json}")?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error(&err),
    }
}

/// Inserts the record and prints a summary.
fn cmd_insert(
    client: &mut NBudget<HttpTransport>,
    record: &Record,
    spinner: &ProgressBar,
) -> io::Result<ExitCode> {
    start_spinner(spinner, "Inserting record...");
    let result = client.insert_record(record);
    spinner.finish_and_clear();
    match result {
        Ok(page) => {
            print_record_summary(record, &page)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => report_error(&err),
    }
}

/// Prints an error that reached the CLI without halting.
fn report_error(err: &NBudgetError) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {}",
        "error:".red().bold(),
        ReportAndHalt::report_line(err)
    )?;
    Ok(ExitCode::FAILURE)
}

// ── Output formatting ────────────────────────────────────────────────

/// Prints the inserted record in a table.
fn print_record_summary(record: &Record, page: &CreatedPage) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", "Record inserted".green().bold())?;
    if let Some(url) = page.url.as_deref() {
        writeln!(out, "{}", url.dimmed())?;
    }
    writeln!(out)?;
    writeln!(out, "{}", record_table(record, page))?;
    Ok(())
}

/// Lays out an inserted record with the date that was sent.
fn record_table(record: &Record, page: &CreatedPage) -> Table {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    _ = table.set_header(vec![
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Date").fg(Color::Cyan),
        Cell::new("Concept").fg(Color::Cyan),
        Cell::new("Amount").fg(Color::Cyan),
        Cell::new("Tags").fg(Color::Cyan),
    ]);

    let amount = record.kind.signed_amount(record.amount);
    let amount_cell = match record.kind {
        RecordKind::Expense => Cell::new(format!("{amount:.2}")).fg(Color::Red),
        RecordKind::Income => Cell::new(format!("{amount:.2}")).fg(Color::Green),
    };
    let date = page
        .date
        .map_or_else(|| "-".to_owned(), |date| date.format("%Y-%m-%d").to_string());
    _ = table.add_row(vec![
        Cell::new(record.kind),
        Cell::new(date),
        Cell::new(&record.concept),
        amount_cell,
        Cell::new(record.tags.join(", ")),
    ]);
    table
}

/// Creates an idle spinner.
fn make_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner
}

/// Shows the spinner with the given message.
fn start_spinner(spinner: &ProgressBar, message: &str) {
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use secrecy::ExposeSecret as _;

    use super::*;

    #[test]
    fn parses_record_arguments() {
        let cli = Cli::try_parse_from([
            "nbudget", "-i", "-d", "12/1/2019", "Salary", "1200", "Work", "Bonus",
        ])
        .unwrap();
        assert!(cli.income);
        assert_eq!(cli.date.as_deref(), Some("12/1/2019"));
        assert_eq!(cli.concept.as_deref(), Some("Salary"));
        assert_eq!(cli.amount, Some(1200.0));
        assert_eq!(cli.tag, ["Work", "Bonus"]);
    }

    #[test]
    fn record_arguments_required_without_flags() {
        assert!(Cli::try_parse_from(["nbudget"]).is_err());
        assert!(Cli::try_parse_from(["nbudget", "Lunch"]).is_err());
    }

    #[test]
    fn flags_make_record_arguments_optional() {
        for flag in ["-t", "--count", "-w"] {
            let cli = Cli::try_parse_from(["nbudget", flag]).unwrap();
            assert!(cli.concept.is_none(), "{flag}");
        }
    }

    #[test]
    fn amount_must_be_a_number() {
        assert!(Cli::try_parse_from(["nbudget", "Lunch", "twelve"]).is_err());
    }

    #[test]
    fn amount_must_be_finite() {
        for amount in ["NaN", "nan", "inf", "infinity", "-inf"] {
            let result = Cli::try_parse_from(["nbudget", "Lunch", "--", amount]);
            assert!(result.is_err(), "{amount}");
        }
        let cli = Cli::try_parse_from(["nbudget", "Lunch", "12.5"]).unwrap();
        assert_eq!(cli.amount, Some(12.5));
    }

    #[test]
    fn summary_shows_resolved_date() {
        let record = Record::expense("Lunch", 12.0).date("12/1/2019").tags(["Food"]);
        let page = CreatedPage {
            date: chrono::NaiveDate::from_ymd_opt(2019, 1, 12),
            ..CreatedPage::default()
        };
        let rendered = record_table(&record, &page).to_string();
        assert!(rendered.contains("2019-01-12"), "{rendered}");
        assert!(!rendered.contains("12/1/2019"), "{rendered}");
        assert!(rendered.contains("-12.00"), "{rendered}");
    }

    #[test]
    fn summary_without_date_never_says_today() {
        let record = Record::income("Salary", 5.0);
        let rendered = record_table(&record, &CreatedPage::default()).to_string();
        assert!(!rendered.contains("today"), "{rendered}");
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let settings = apply_env_overrides(
            Settings::new("file-db", "file-key"),
            Some("env-key".to_owned()),
            None,
        );
        assert_eq!(settings.api_key.expose_secret(), "env-key");
        assert_eq!(settings.database_id, "file-db");

        let settings = apply_env_overrides(settings, None, Some("env-db".to_owned()));
        assert_eq!(settings.database_id, "env-db");
    }

    #[test]
    fn choose_option_repeats_until_valid() {
        let mut input = Cursor::new("maybe\n\nn\n");
        let mut output = Vec::new();
        let answer = choose_option(&mut input, &mut output, "Create one?", &["Y", "N"]).unwrap();
        assert_eq!(answer, "N");
        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches("[>] Create one? [Y/N]").count(), 3);
    }

    #[test]
    fn choose_option_fails_on_closed_input() {
        let mut input = Cursor::new("x\n");
        let mut output = Vec::new();
        let err = choose_option(&mut input, &mut output, "Create one?", &["Y", "N"]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn wizard_writes_default_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);
        let mut input = Cursor::new("  my-db \nsecret_key\n");
        let mut output = Vec::new();
        let settings = settings_wizard(&mut input, &mut output, &path).unwrap();
        assert_eq!(settings.database_id, "my-db");

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.database_id, "my-db");
        assert_eq!(loaded.api_key.expose_secret(), "secret_key");
        assert_eq!(loaded.date_input_format, "D/M/Y");
        assert_eq!(loaded.columns.tags_name, "Tags");
    }

    #[test]
    fn default_path_ends_with_settings_file() {
        if let Some(path) = default_settings_path() {
            assert!(path.ends_with(Path::new(CONFIG_DIR_NAME).join(SETTINGS_FILE_NAME)));
        }
    }
}
