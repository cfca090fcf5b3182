//! The interactive console: presentation surface and command reader.
//!
//! Thin glue between stdin/stdout and the dispatcher. Every line is
//! parsed into a [`Command`], gated on the latest capability
//! projection, and handed to the dispatcher; the message stream comes
//! back through the [`Surface`] impl below.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use owo_colors::OwoColorize;
use secrecy::SecretString;

use limsctl_client::{DateFilter, QueryParameters};
use limsctl_core::{
    Capability, CapabilitySet, Command, Dispatcher, ExportChooser, LoginRequest, Surface,
};

use crate::config::Profile;
use crate::error::CliError;

// ── Presentation surface ──

/// Renders dispatcher output to stdout and mirrors each capability
/// projection into a cell the command loop can consult.
struct Console {
    caps: Rc<RefCell<CapabilitySet>>,
}

impl Surface for Console {
    fn replace(&mut self, text: &str) {
        println!();
        println!("{text}");
    }

    fn append(&mut self, text: &str) {
        println!("{text}");
    }

    fn capabilities(&mut self, capabilities: &CapabilitySet) {
        *self.caps.borrow_mut() = capabilities.clone();
    }
}

// ── Export destination prompt ──

/// Asks for an export path on stdin. An empty answer cancels.
pub struct PromptChooser {
    default_dir: Option<PathBuf>,
}

impl PromptChooser {
    pub fn new(default_dir: Option<PathBuf>) -> Self {
        Self { default_dir }
    }
}

impl ExportChooser for PromptChooser {
    fn choose(&mut self, initial: Option<&Path>) -> Option<PathBuf> {
        let seed = initial.map(Path::to_path_buf).or_else(|| {
            self.default_dir
                .as_ref()
                .map(|dir| dir.join("experiment.json"))
        });

        let mut input = dialoguer::Input::<String>::new()
            .with_prompt("Export destination (empty cancels)")
            .allow_empty(true);
        if let Some(seed) = seed {
            input = input.with_initial_text(seed.display().to_string());
        }

        match input.interact_text() {
            Ok(answer) if answer.trim().is_empty() => None,
            Ok(answer) => Some(PathBuf::from(answer.trim())),
            // A failed prompt (closed tty) behaves like a cancel.
            Err(_) => None,
        }
    }
}

// ── Query draft ──

/// Query parameters accumulated across `query` subcommands until
/// `query run` submits them.
#[derive(Debug, Default)]
struct QueryDraft {
    name: String,
    owner: String,
    object_type: String,
    date_filter: DateFilter,
}

impl QueryDraft {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn to_parameters(&self) -> QueryParameters {
        QueryParameters {
            name: self.name.clone(),
            object_type: self.object_type.clone(),
            owner: self.owner.clone(),
            date_filter: self.date_filter,
            ..QueryParameters::default()
        }
    }
}

// ── Command loop ──

pub fn run(dispatcher: &mut Dispatcher, profile: &Profile) -> Result<(), CliError> {
    let caps = Rc::new(RefCell::new(CapabilitySet::default()));
    dispatcher.attach(Box::new(Console {
        caps: Rc::clone(&caps),
    }));

    println!("limsctl interactive console. Type 'help' for commands, 'quit' to leave.");

    let stdin = io::stdin();
    let mut draft = QueryDraft::default();
    let mut experiment = String::new();
    let mut line = String::new();

    loop {
        print!("limsctl> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, rest)) = tokens.split_first() else {
            continue;
        };

        match verb {
            "quit" | "exit" => break,
            "help" => print_help(),
            "caps" => print_capabilities(&caps.borrow()),
            _ => handle(
                dispatcher,
                &caps,
                &mut draft,
                &mut experiment,
                profile,
                verb,
                rest,
            )?,
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle(
    dispatcher: &mut Dispatcher,
    caps: &Rc<RefCell<CapabilitySet>>,
    draft: &mut QueryDraft,
    experiment: &mut String,
    profile: &Profile,
    verb: &str,
    rest: &[&str],
) -> Result<(), CliError> {
    match verb {
        "acquire" => gated(dispatcher, caps, Capability::AcquireLibrary, Command::AcquireLibrary),
        "release" => gated(dispatcher, caps, Capability::ReleaseLibrary, Command::ReleaseLibrary),
        "login" => {
            if !enabled(caps, Capability::Login) {
                disabled(Capability::Login);
                return Ok(());
            }
            let request = login_request(profile)?;
            dispatcher.dispatch(Command::Login(request));
        }
        "logout" => gated(dispatcher, caps, Capability::Logout, Command::Logout),
        "reserve" => gated(dispatcher, caps, Capability::Reserve, Command::Reserve),
        "unreserve" => gated(dispatcher, caps, Capability::Unreserve, Command::Unreserve),
        "door" => match rest.first() {
            Some(&"open") => gated(dispatcher, caps, Capability::OpenDoor, Command::OpenDoor),
            Some(&"close") => gated(dispatcher, caps, Capability::CloseDoor, Command::CloseDoor),
            _ => println!("usage: door open|close"),
        },
        "abort" => gated(dispatcher, caps, Capability::AbortRun, Command::AbortRun),
        "status" => gated(
            dispatcher,
            caps,
            Capability::InstrumentStatus,
            Command::InstrumentStatus,
        ),
        "barcode" => gated(
            dispatcher,
            caps,
            Capability::ContainerBarcode,
            Command::ContainerBarcode,
        ),
        "sensor" => gated(dispatcher, caps, Capability::ReadSensor, Command::ReadSensor),
        "toggle" => gated(dispatcher, caps, Capability::ToggleSensor, Command::ToggleSensor),
        "experiment" => {
            if !enabled(caps, Capability::ExperimentFields) {
                disabled(Capability::ExperimentFields);
            } else if rest.is_empty() {
                println!("experiment name: '{experiment}'");
            } else {
                *experiment = rest.join(" ");
                println!("Experiment name set to '{experiment}'.");
            }
        }
        "exp-status" => gated(
            dispatcher,
            caps,
            Capability::ExperimentStatus,
            Command::ExperimentStatus {
                name: experiment.clone(),
            },
        ),
        "exp-summary" => gated(
            dispatcher,
            caps,
            Capability::ExperimentSummary,
            Command::ExperimentSummary {
                name: experiment.clone(),
            },
        ),
        "export" => gated(
            dispatcher,
            caps,
            Capability::ExportExperiment,
            Command::ExportExperiment {
                name: experiment.clone(),
            },
        ),
        "query" => handle_query(dispatcher, caps, draft, rest),
        other => println!("unknown command '{other}'. Type 'help' for the list."),
    }
    Ok(())
}

fn handle_query(
    dispatcher: &mut Dispatcher,
    caps: &Rc<RefCell<CapabilitySet>>,
    draft: &mut QueryDraft,
    rest: &[&str],
) {
    match rest.split_first() {
        Some((&"run", _)) => gated(
            dispatcher,
            caps,
            Capability::ExecuteQuery,
            Command::ExecuteQuery(draft.to_parameters()),
        ),
        Some((&"clear", _)) => {
            if enabled(caps, Capability::ClearQuery) {
                draft.clear();
                println!("Query parameters cleared.");
            } else {
                disabled(Capability::ClearQuery);
            }
        }
        Some((&"name", values)) => set_query_field(caps, &mut draft.name, values),
        Some((&"owner", values)) => set_query_field(caps, &mut draft.owner, values),
        Some((&"type", values)) => set_query_field(caps, &mut draft.object_type, values),
        Some((&"date", values)) => {
            if !enabled(caps, Capability::QueryFields) {
                disabled(Capability::QueryFields);
                return;
            }
            match values.first() {
                Some(&"all") => draft.date_filter = DateFilter::All,
                Some(&"created") => draft.date_filter = DateFilter::Created,
                Some(&"modified") => draft.date_filter = DateFilter::Modified,
                _ => {
                    println!("usage: query date all|created|modified");
                    return;
                }
            }
            println!("Query date filter set to {:?}.", draft.date_filter);
        }
        _ => println!("usage: query name|owner|type|date|clear|run ..."),
    }
}

fn set_query_field(caps: &Rc<RefCell<CapabilitySet>>, field: &mut String, values: &[&str]) {
    if enabled(caps, Capability::QueryFields) {
        *field = values.join(" ");
        println!("Query field updated.");
    } else {
        disabled(Capability::QueryFields);
    }
}

fn gated(
    dispatcher: &mut Dispatcher,
    caps: &Rc<RefCell<CapabilitySet>>,
    capability: Capability,
    command: Command,
) {
    if enabled(caps, capability) {
        dispatcher.dispatch(command);
    } else {
        disabled(capability);
    }
}

fn enabled(caps: &Rc<RefCell<CapabilitySet>>, capability: Capability) -> bool {
    caps.borrow().enabled(capability)
}

fn disabled(capability: Capability) {
    println!("'{capability}' is disabled in the current state (see 'caps').");
}

// ── Prompts ──

fn login_request(profile: &Profile) -> Result<LoginRequest, CliError> {
    let hostname = match &profile.hostname {
        Some(hostname) => hostname.clone(),
        None => prompt_text("Hostname")?,
    };
    let username = match &profile.username {
        Some(username) => username.clone(),
        None => prompt_text("Username")?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    Ok(LoginRequest {
        hostname,
        username,
        password: SecretString::from(password),
    })
}

fn prompt_text(prompt: &str) -> Result<String, CliError> {
    dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(CliError::Prompt)
}

// ── Rendering ──

fn print_capabilities(caps: &CapabilitySet) {
    for (capability, enabled) in caps.iter() {
        if enabled {
            println!("  {} {}", "*".green(), capability.green());
        } else {
            println!("  {} {}", "-".dimmed(), capability.dimmed());
        }
    }
}

fn print_help() {
    println!("session:     acquire release login logout reserve unreserve");
    println!("instrument:  door open|close  abort  status  barcode  sensor  toggle");
    println!("experiment:  experiment <name>  exp-status  exp-summary  export");
    println!("query:       query name|owner|type <value>  query date all|created|modified");
    println!("             query clear  query run");
    println!("console:     caps  help  quit");
}
