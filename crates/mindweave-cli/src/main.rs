mod logging;

use mindweave::store::{SESSION_KEY, load_json_strict, save_json};
use mindweave::{
    DraftQuotaManager, EditingSession, EditorConfig, Graph, JsonFileStore, LocalDraft, NodeId,
    SessionState, StyleEngine, StyleSelection,
};
use serde::Serialize;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Mindweave(mindweave::Error),
    Json(serde_json::Error),
    NoMap,
    UnknownNode(String),
    Refused(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Mindweave(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::NoMap => write!(f, "No mind map in this store; run `new <text>` first"),
            CliError::UnknownNode(node) => write!(f, "No node matches `{node}`"),
            CliError::Refused(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<mindweave::Error> for CliError {
    fn from(value: mindweave::Error) -> Self {
        Self::Mindweave(value)
    }
}

impl From<mindweave::StoreError> for CliError {
    fn from(value: mindweave::StoreError) -> Self {
        Self::Mindweave(value.into())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    New,
    Add,
    Delete,
    Text,
    Note,
    Reason,
    Move,
    Undo,
    Redo,
    Outline,
    Show,
    Favorites,
    FavoriteSave,
    Unify,
    DraftSave,
    Drafts,
    Quota,
}

impl Command {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "new" => Self::New,
            "add" => Self::Add,
            "delete" => Self::Delete,
            "text" => Self::Text,
            "note" => Self::Note,
            "reason" => Self::Reason,
            "move" => Self::Move,
            "undo" => Self::Undo,
            "redo" => Self::Redo,
            "outline" => Self::Outline,
            "show" => Self::Show,
            "favorites" => Self::Favorites,
            "favorite-save" => Self::FavoriteSave,
            "unify" => Self::Unify,
            "draft-save" => Self::DraftSave,
            "drafts" => Self::Drafts,
            "quota" => Self::Quota,
            _ => return None,
        })
    }

    /// Number of operands: (required, optional).
    fn arity(self) -> (usize, usize) {
        match self {
            Self::New => (1, 0),
            Self::Add => (1, 1),
            Self::Delete => (1, 0),
            Self::Text | Self::Note | Self::Reason => (2, 0),
            Self::Move => (3, 0),
            Self::FavoriteSave => (2, 0),
            Self::Unify => (1, 0),
            Self::Undo
            | Self::Redo
            | Self::Outline
            | Self::Show
            | Self::Favorites
            | Self::DraftSave
            | Self::Drafts
            | Self::Quota => (0, 0),
        }
    }
}

#[derive(Debug)]
struct Args {
    command: Command,
    operands: Vec<String>,
    store: String,
    config: Option<String>,
    today: Option<chrono::NaiveDate>,
    pretty: bool,
    verbose: bool,
}

fn usage() -> &'static str {
    "mindweave-cli\n\
\n\
USAGE:\n\
  mindweave-cli [--store <path>] [--config <path>] [--today <yyyy-mm-dd>] [--pretty] [-v] <command> [<args>...]\n\
\n\
COMMANDS:\n\
  new <center-text>            start a new map (replaces the current one, undoable)\n\
  add <parent> [<text>]        add a child node; prints its id\n\
  delete <node>                delete a node and everything below it\n\
  text <node> <text>           set a node's label\n\
  note <node> <text>           set a node's note\n\
  reason <node> <text>         label the connection leading into a node\n\
  move <node> <dx> <dy>        move a node\n\
  undo | redo\n\
  outline                      print the indented outline\n\
  show                         print the map as JSON\n\
  favorites                    list favorite style slots\n\
  favorite-save <slot> <node>  store a node's style (and its connection's) in slot 1-3\n\
  unify <slot>                 apply a favorite style to every node and connection\n\
  draft-save                   keep the current map as a local draft\n\
  drafts                       list local drafts\n\
  quota                        print draft and server-save quota state\n\
\n\
NOTES:\n\
  - <node> is `center`, a node id, or the node's index as printed by `outline`.\n\
  - State lives in a single JSON file (default: ./mindweave.json).\n\
  - Set MINDWEAVE_LOG (e.g. `debug`) to see log output on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut command = None;
    let mut operands = Vec::new();
    let mut store = "mindweave.json".to_string();
    let mut config = None;
    let mut today = None;
    let mut pretty = false;
    let mut verbose = false;

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--pretty" => pretty = true,
            "--verbose" | "-v" => verbose = true,
            "--store" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                store = path.clone();
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                config = Some(path.clone());
            }
            "--today" => {
                let Some(date) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                today = Some(
                    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--" => operands.extend(it.by_ref().cloned()),
            other if command.is_none() => {
                if other.starts_with('-') {
                    return Err(CliError::Usage(usage()));
                }
                command = Some(Command::parse(other).ok_or(CliError::Usage(usage()))?);
            }
            // Negative numbers are valid `move` operands.
            other if other.starts_with('-') && other.parse::<f64>().is_err() => {
                return Err(CliError::Usage(usage()));
            }
            other => operands.push(other.to_string()),
        }
    }

    let Some(command) = command else {
        return Err(CliError::Usage(usage()));
    };
    let (required, optional) = command.arity();
    if operands.len() < required || operands.len() > required + optional {
        return Err(CliError::Usage(usage()));
    }

    Ok(Args {
        command,
        operands,
        store,
        config,
        today,
        pretty,
        verbose,
    })
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    println!();
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<EditorConfig, CliError> {
    match path {
        None => Ok(EditorConfig::default()),
        Some(path) => Ok(EditorConfig::from_json_str(&std::fs::read_to_string(path)?)?),
    }
}

fn load_session(store: &JsonFileStore, config: &EditorConfig) -> Result<EditingSession, CliError> {
    let Some(state) = load_json_strict::<SessionState>(store, SESSION_KEY)? else {
        return Err(CliError::NoMap);
    };
    Ok(EditingSession::restore(state, config.clone())?)
}

fn save_session(store: &mut JsonFileStore, session: &EditingSession) -> Result<(), CliError> {
    save_json(store, SESSION_KEY, &session.to_state())?;
    Ok(())
}

fn resolve_node(graph: &Graph, raw: &str) -> Result<NodeId, CliError> {
    let unknown = || CliError::UnknownNode(raw.to_string());
    if raw == "center" {
        return graph.center_id().ok_or_else(unknown);
    }
    if let Ok(index) = raw.parse::<usize>() {
        return graph.nodes().get(index).map(|n| n.id).ok_or_else(unknown);
    }
    let id = raw.parse::<NodeId>().map_err(|_| unknown())?;
    if graph.contains_node(id) {
        Ok(id)
    } else {
        Err(unknown())
    }
}

fn parse_slot(raw: &str) -> Result<usize, CliError> {
    match raw.parse::<usize>() {
        Ok(n) if (1..=mindweave::FAVORITE_SLOT_COUNT).contains(&n) => Ok(n - 1),
        _ => Err(CliError::Usage(usage())),
    }
}

fn parse_offset(raw: &str) -> Result<f64, CliError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(CliError::Usage(usage()))
}

fn print_outline(session: &EditingSession) {
    let graph = session.graph();
    for row in session.outline() {
        let Some(node) = graph.node(row.node_id) else {
            continue;
        };
        let label = if node.text.is_empty() {
            "(empty)"
        } else {
            node.text.as_str()
        };
        println!("{}[{}] {}", "  ".repeat(row.depth), row.index, label);
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteOut<'a> {
    slot: usize,
    name: &'a str,
    configured: bool,
    selection: StyleSelection,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DraftOut<'a> {
    id: String,
    title: &'a str,
    nodes: usize,
    saved_at: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuotaOut {
    local_draft_count: usize,
    remaining_local_slots: usize,
    server_save_count: u32,
    remaining_server_saves: u32,
    last_reset_year_month: i32,
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    let mut store = JsonFileStore::open(&args.store);
    tracing::debug!(store = %args.store, command = ?args.command, "running command");
    let ops = &args.operands;

    match args.command {
        Command::New => {
            let session = match load_session(&store, &config) {
                Ok(mut session) => {
                    session.reset_graph(ops[0].as_str());
                    session
                }
                Err(CliError::NoMap) => EditingSession::new(ops[0].as_str(), config.clone()),
                Err(err) => return Err(err),
            };
            save_session(&mut store, &session)?;
            if let Some(center) = session.graph().center_id() {
                println!("{center}");
            }
        }
        Command::Add => {
            let mut session = load_session(&store, &config)?;
            let parent = resolve_node(session.graph(), &ops[0])?;
            let text = ops.get(1).map(String::as_str).unwrap_or_default();
            let id = session.add_child_node(parent, text)?;
            save_session(&mut store, &session)?;
            println!("{id}");
        }
        Command::Delete => {
            let mut session = load_session(&store, &config)?;
            let id = resolve_node(session.graph(), &ops[0])?;
            let removed = session.delete_node(id)?;
            save_session(&mut store, &session)?;
            println!("removed {} node(s)", removed.len());
        }
        Command::Text | Command::Note | Command::Reason => {
            let mut session = load_session(&store, &config)?;
            let id = resolve_node(session.graph(), &ops[0])?;
            let value = ops[1].as_str();
            match args.command {
                Command::Text => session.update_node_text(id, value)?,
                Command::Note => session.update_node_note(id, value)?,
                _ => {
                    let Some(connection) = session.graph().incoming_connection(id) else {
                        return Err(CliError::Refused(
                            "the center node has no incoming connection".to_string(),
                        ));
                    };
                    let connection = connection.id;
                    session.update_connection_reason(connection, value)?;
                }
            }
            save_session(&mut store, &session)?;
        }
        Command::Move => {
            let mut session = load_session(&store, &config)?;
            let id = resolve_node(session.graph(), &ops[0])?;
            let dx = parse_offset(&ops[1])?;
            let dy = parse_offset(&ops[2])?;
            let position = session.move_node(id, dx, dy)?;
            save_session(&mut store, &session)?;
            println!("{} {}", position.x, position.y);
        }
        Command::Undo | Command::Redo => {
            let mut session = load_session(&store, &config)?;
            let changed = if args.command == Command::Undo {
                session.undo()
            } else {
                session.redo()
            };
            if !changed {
                return Err(CliError::Refused("nothing to do".to_string()));
            }
            save_session(&mut store, &session)?;
        }
        Command::Outline => print_outline(&load_session(&store, &config)?),
        Command::Show => write_json(load_session(&store, &config)?.graph(), args.pretty)?,
        Command::Favorites => {
            let styles = StyleEngine::load(&mut store)?;
            let out: Vec<FavoriteOut<'_>> = styles
                .slots()
                .iter()
                .enumerate()
                .map(|(i, fav)| FavoriteOut {
                    slot: i + 1,
                    name: &fav.name,
                    configured: fav.is_configured(),
                    selection: fav.selection(),
                })
                .collect();
            write_json(&out, args.pretty)?;
        }
        Command::FavoriteSave => {
            let slot = parse_slot(&ops[0])?;
            let session = load_session(&store, &config)?;
            let graph = session.graph();
            let id = resolve_node(graph, &ops[1])?;
            let selection = StyleSelection {
                node_style: graph.node(id).map(|n| n.style).unwrap_or_default(),
                connection_style: graph
                    .incoming_connection(id)
                    .map(|c| c.style)
                    .unwrap_or_default(),
            };
            let mut styles = StyleEngine::load(&mut store)?;
            styles.save_to_slot(slot, selection)?;
        }
        Command::Unify => {
            let slot = parse_slot(&ops[0])?;
            let selection = StyleEngine::load(&mut store)?.apply_favorite(slot)?;
            let mut session = load_session(&store, &config)?;
            session.unify_style(&selection);
            save_session(&mut store, &session)?;
        }
        Command::DraftSave => {
            let session = load_session(&store, &config)?;
            let mut drafts = quota_manager(&mut store, &config, args.today);
            let draft = LocalDraft::new(session.graph().clone());
            let id = draft.id;
            if !drafts.save_local_draft(draft)? {
                return Err(CliError::Refused(format!(
                    "local draft storage is full ({} drafts)",
                    config.quota.local_draft_capacity
                )));
            }
            println!("{id}");
        }
        Command::Drafts => {
            let drafts = quota_manager(&mut store, &config, args.today).local_drafts()?;
            let out: Vec<DraftOut<'_>> = drafts
                .iter()
                .map(|d| DraftOut {
                    id: d.id.to_string(),
                    title: &d.title,
                    nodes: d.graph.node_count(),
                    saved_at: d.saved_at.to_rfc3339(),
                })
                .collect();
            write_json(&out, args.pretty)?;
        }
        Command::Quota => {
            let mut quota = quota_manager(&mut store, &config, args.today);
            let state = quota.state()?;
            let out = QuotaOut {
                local_draft_count: state.local_draft_count,
                remaining_local_slots: quota.remaining_local_slots()?,
                server_save_count: state.server_save_count,
                remaining_server_saves: quota.remaining_server_saves()?,
                last_reset_year_month: state.last_reset_year_month,
            };
            write_json(&out, args.pretty)?;
        }
    }
    Ok(())
}

fn quota_manager<'a>(
    store: &'a mut JsonFileStore,
    config: &EditorConfig,
    today: Option<chrono::NaiveDate>,
) -> DraftQuotaManager<&'a mut JsonFileStore> {
    DraftQuotaManager::new(store, config.quota).with_fixed_today(today)
}

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let args = match parse_args(&argv) {
        Ok(args) => args,
        Err(CliError::Usage(msg)) => {
            eprint!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    logging::init_logging(args.verbose);

    match run(args) {
        Ok(()) => {}
        Err(CliError::Usage(msg)) => {
            eprint!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
