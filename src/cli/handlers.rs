use std::path::PathBuf;
use std::time::Instant;

use crate::cli::commands::*;
use crate::cli::output;
use crate::io::config_io;
use crate::io::saver::{SaveScheduler, SaveUrgency};
use crate::io::store::{ListStore, StoreError};
use crate::model::{EngineConfig, Section, TodoList};
use crate::ops::move_ops::DropTarget;
use crate::ops::{check, item_ops, move_ops, tree};

/// A mutated list waiting to be scheduled for save.
type Dirty = Option<(TodoList, SaveUrgency)>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let (store, config) = open_store(cli.data_dir.as_deref())?;

    let dirty = match cli.command {
        Commands::Lists => {
            cmd_lists(&store, json)?;
            None
        }
        Commands::Show(args) => {
            cmd_show(&store, &config, args, json)?;
            None
        }
        Commands::Add(args) => cmd_add(&store, &config, args)?,
        Commands::Toggle(args) => cmd_toggle(&store, &config, args)?,
        Commands::Indent(args) => cmd_indent(&store, &config, args, 1)?,
        Commands::Outdent(args) => cmd_indent(&store, &config, args, -1)?,
        Commands::Mv(args) => cmd_mv(&store, &config, args)?,
        Commands::Rm(args) => cmd_rm(&store, &config, args)?,
        Commands::Check(args) => {
            cmd_check(&store, &config, args, json)?;
            None
        }
    };

    // One command per process: schedule the mutated list, then treat exit
    // as the shutdown path and flush the scheduler straight into the store.
    if let Some((list, urgency)) = dirty {
        let mut saver = SaveScheduler::new(&config.save);
        saver.schedule(&list.name, urgency, Instant::now());
        if saver.flush().is_some() {
            store.save_list(&list)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_store(
    override_dir: Option<&str>,
) -> Result<(ListStore, EngineConfig), Box<dyn std::error::Error>> {
    let dir = match override_dir {
        Some(dir) => PathBuf::from(dir),
        None => default_data_dir(),
    };
    let store = ListStore::open(&dir)?;
    let config = config_io::read_config(store.dir());
    Ok((store, config))
}

/// Data directory: $SPRIG_DATA, then XDG_DATA_HOME, then ~/.local/share.
fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SPRIG_DATA") {
        return PathBuf::from(dir);
    }
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    base.join("sprig")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

fn load(store: &ListStore, config: &EngineConfig, name: &str) -> Result<TodoList, StoreError> {
    store.load_list(name, config)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_lists(store: &ListStore, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let names = store.list_names()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else {
        for name in names {
            println!("{}", name);
        }
    }
    Ok(())
}

fn cmd_show(
    store: &ListStore,
    config: &EngineConfig,
    args: ShowArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let list = load(store, config, &args.list)?;
    let hide_completed = config.hide_completed && !args.all;
    if json {
        let out = output::list_to_json(&list, config, hide_completed);
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", output::render_outline(&list, config, hide_completed));
    }
    Ok(())
}

fn cmd_add(
    store: &ListStore,
    config: &EngineConfig,
    args: AddArgs,
) -> Result<Dirty, Box<dyn std::error::Error>> {
    let mut list = store.load_or_create(&args.list, config)?;
    let index = match args.below {
        Some(id) => list
            .index_of(id)
            .ok_or_else(|| format!("no item {} in {}", id, args.list))?,
        None => list.items.len() - 1,
    };
    match item_ops::insert_below(&mut list, index, args.text) {
        Some(id) => {
            println!("added ·{} to {}", id, args.list);
            Ok(Some((list, SaveUrgency::Structural)))
        }
        None => Err("could not add item".into()),
    }
}

fn cmd_toggle(
    store: &ListStore,
    config: &EngineConfig,
    args: ItemArgs,
) -> Result<Dirty, Box<dyn std::error::Error>> {
    let mut list = load(store, config, &args.list)?;
    if !item_ops::toggle(&mut list, args.id) {
        return Err(format!("no item {} in {}", args.id, args.list).into());
    }
    let state = if list.get(args.id).is_some_and(|i| i.completed) {
        "done"
    } else {
        "todo"
    };
    println!("·{} is now {}", args.id, state);
    Ok(Some((list, SaveUrgency::Structural)))
}

fn cmd_indent(
    store: &ListStore,
    config: &EngineConfig,
    args: ItemArgs,
    delta: i64,
) -> Result<Dirty, Box<dyn std::error::Error>> {
    let mut list = load(store, config, &args.list)?;
    if !item_ops::change_indent(&mut list, args.id, delta, config) {
        // No-op means the request was structurally impossible.
        return Err(format!("cannot change indent of ·{}", args.id).into());
    }
    Ok(Some((list, SaveUrgency::Structural)))
}

fn cmd_mv(
    store: &ListStore,
    config: &EngineConfig,
    args: MvArgs,
) -> Result<Dirty, Box<dyn std::error::Error>> {
    let mut list = load(store, config, &args.list)?;
    let target = if let Some(tid) = args.before {
        DropTarget::Before(tid)
    } else if let Some(tid) = args.after {
        DropTarget::After(tid)
    } else if args.section_end {
        let section: Section = tree::section_of(&list.items, args.id);
        DropTarget::SectionEnd(section)
    } else {
        return Err("mv needs --before, --after, or --section-end".into());
    };
    if !move_ops::move_block(&mut list, args.id, target, config) {
        return Err(format!("cannot move ·{} there", args.id).into());
    }
    Ok(Some((list, SaveUrgency::Structural)))
}

fn cmd_rm(
    store: &ListStore,
    config: &EngineConfig,
    args: ItemArgs,
) -> Result<Dirty, Box<dyn std::error::Error>> {
    let mut list = load(store, config, &args.list)?;
    let index = list
        .index_of(args.id)
        .ok_or_else(|| format!("no item {} in {}", args.id, args.list))?;
    item_ops::remove_at(&mut list, index, config);
    Ok(Some((list, SaveUrgency::Structural)))
}

fn cmd_check(
    store: &ListStore,
    config: &EngineConfig,
    args: ListArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let list = load(store, config, &args.list)?;
    let result = check::check_list(&list);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.valid {
        println!("{}: ok", args.list);
    } else {
        for error in &result.errors {
            println!("{}: {:?}", args.list, error);
        }
    }
    if result.valid {
        Ok(())
    } else {
        Err(format!("{} invariant violations", result.errors.len()).into())
    }
}
