//! Subcommand definitions and dispatch.

use anyhow::Context;
use clap::{Args, Subcommand};
use log::info;
use serde_json::Value;
use shortcuts_core::{
    resolve_load_order, JsonFileRepository, ShortcutStore, StoreConfig, Task, TaskDraft,
};
use std::path::{Path, PathBuf};

type Store = ShortcutStore<JsonFileRepository>;

#[derive(Subcommand)]
pub enum Command {
    #[command(flatten)]
    Store(StoreCommand),
    /// Print add-on modules of a folder in load order
    AddonOrder {
        addons_dir: PathBuf,
        /// Entry file extension
        #[arg(long, default_value = "py")]
        extension: String,
    },
}

/// Subcommands that read or change the save file.
#[derive(Subcommand)]
pub enum StoreCommand {
    /// List groups as `id<TAB>name<TAB>task count`
    Groups,
    /// List tasks as `id<TAB>name<TAB>urls`
    Tasks {
        /// Only tasks that belong to this group, in member order
        #[arg(long)]
        group: Option<String>,
    },
    /// Show one group and its member tasks
    ShowGroup { group_id: String },
    /// Create a group and print its id
    AddGroup {
        name: String,
        /// Use this id instead of a generated one
        #[arg(long)]
        id: Option<String>,
    },
    RenameGroup { group_id: String, name: String },
    /// Delete a group together with all of its tasks
    DeleteGroup { group_id: String },
    /// Create a task inside a group and print its id
    AddTask {
        group_id: String,
        #[command(flatten)]
        fields: TaskFields,
        /// Use this id instead of a generated one
        #[arg(long)]
        id: Option<String>,
    },
    /// Replace every field of a task
    EditTask {
        task_id: String,
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Delete a task and detach it from its group
    DeleteTask { task_id: String },
    /// Move a task to a group (the same group reorders it)
    MoveTask {
        task_id: String,
        group_id: String,
        /// Target position; appends when omitted
        #[arg(long)]
        index: Option<usize>,
    },
    /// Put the listed groups first, in the given order
    ReorderGroups {
        #[arg(required = true)]
        group_ids: Vec<String>,
    },
    /// Put the listed tasks first in the save file, in the given order
    ReorderTasks {
        #[arg(required = true)]
        task_ids: Vec<String>,
    },
    /// Read or change launcher settings
    #[command(subcommand)]
    Setting(SettingCommand),
    /// Resolve a URL through its redirects
    VerifyUrl { url: String },
}

#[derive(Subcommand)]
pub enum SettingCommand {
    Get { name: String },
    /// Store a value; text that is not valid JSON is stored as a string
    Set { name: String, value: String },
    Remove { name: String },
}

#[derive(Args)]
pub struct TaskFields {
    name: String,
    #[arg(long)]
    button_text: Option<String>,
    /// Comma or whitespace separated URLs
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    file: Option<String>,
    #[arg(long)]
    dir: Option<String>,
}

impl From<TaskFields> for TaskDraft {
    fn from(fields: TaskFields) -> Self {
        let mut draft = TaskDraft::new(fields.name).url(fields.url);
        if let Some(text) = fields.button_text {
            draft = draft.button_text(text);
        }
        if let Some(path) = fields.file {
            draft = draft.file_path(path);
        }
        if let Some(path) = fields.dir {
            draft = draft.directory_path(path);
        }
        draft
    }
}

pub fn run(command: Command, config: &StoreConfig) -> anyhow::Result<()> {
    match command {
        Command::AddonOrder {
            addons_dir,
            extension,
        } => print_addon_order(&addons_dir, &extension),
        Command::Store(command) => {
            let store = ShortcutStore::open(config)
                .with_context(|| format!("failed to open {}", config.path.display()))?;
            info!(
                "event=cli_start module=cli status=ok store={}",
                store.repository().path().display()
            );
            run_with_store(&store, command)
        }
    }
}

fn run_with_store(store: &Store, command: StoreCommand) -> anyhow::Result<()> {
    match command {
        StoreCommand::Groups => {
            for group_id in store.load_groups() {
                let group = store.get_group_by_id(&group_id)?;
                println!("{}\t{}\t{}", group.id, group.group_name, group.len());
            }
        }
        StoreCommand::Tasks { group } => {
            let tasks = match group {
                Some(group_id) => store.group_tasks(&group_id)?,
                None => all_tasks(store)?,
            };
            for task in &tasks {
                print_task(task);
            }
        }
        StoreCommand::ShowGroup { group_id } => {
            let group = store.get_group_by_id(&group_id)?;
            println!("{}\t{}", group.id, group.group_name);
            for task in store.group_tasks(&group_id)? {
                print!("  ");
                print_task(&task);
            }
        }
        StoreCommand::AddGroup { name, id } => {
            let group = store.create_group_with(&name, id.as_deref(), Vec::new())?;
            println!("{}", group.id);
        }
        StoreCommand::RenameGroup { group_id, name } => {
            store.rename_group(&group_id, &name)?;
        }
        StoreCommand::DeleteGroup { group_id } => {
            let removed = store.delete_group_by_id(&group_id)?;
            println!("deleted {group_id} and {} task(s)", removed.len());
        }
        StoreCommand::AddTask {
            group_id,
            fields,
            id,
        } => {
            let task = match id {
                Some(task_id) => store.create_task_with_id(&group_id, &task_id, fields.into())?,
                None => store.create_task(&group_id, fields.into())?,
            };
            print_task(&task);
        }
        StoreCommand::EditTask { task_id, fields } => {
            let task = store.edit_task(&task_id, fields.into())?;
            print_task(&task);
        }
        StoreCommand::DeleteTask { task_id } => {
            store.delete_task_by_id(&task_id)?;
        }
        StoreCommand::MoveTask {
            task_id,
            group_id,
            index,
        } => {
            let group = store.move_task_to_group(&task_id, &group_id, index)?;
            println!("{}\t{}", group.id, group.task_ids().join(","));
        }
        StoreCommand::ReorderGroups { group_ids } => store.reorder_groups(&group_ids)?,
        StoreCommand::ReorderTasks { task_ids } => store.reorder_tasks(&task_ids)?,
        StoreCommand::Setting(setting) => run_setting(store, setting)?,
        StoreCommand::VerifyUrl { url } => println!("{}", store.verify_url(&url)?),
    }
    Ok(())
}

fn print_addon_order(addons_dir: &Path, extension: &str) -> anyhow::Result<()> {
    let modules = resolve_load_order(addons_dir, extension)
        .with_context(|| format!("failed to order add-ons in {}", addons_dir.display()))?;
    for module in modules {
        println!("{module}");
    }
    Ok(())
}

fn run_setting(store: &Store, command: SettingCommand) -> anyhow::Result<()> {
    match command {
        SettingCommand::Get { name } => println!("{}", store.get_setting(&name)?),
        SettingCommand::Set { name, value } => {
            store.apply_setting(&name, parse_setting_value(value))?;
        }
        SettingCommand::Remove { name } => {
            let previous = store.remove_setting(&name)?;
            println!("{previous}");
        }
    }
    Ok(())
}

fn parse_setting_value(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

fn all_tasks(store: &Store) -> anyhow::Result<Vec<Task>> {
    store
        .load_tasks()
        .iter()
        .map(|task_id| store.get_task_by_id(task_id).map_err(Into::into))
        .collect()
}

fn print_task(task: &Task) {
    println!("{}\t{}\t{}", task.id, task.display_label(), task.url.join(" "));
}

#[cfg(test)]
mod tests {
    use super::parse_setting_value;
    use serde_json::json;

    #[test]
    fn setting_values_parse_as_json_first() {
        assert_eq!(parse_setting_value("0.5".to_string()), json!(0.5));
        assert_eq!(parse_setting_value("true".to_string()), json!(true));
        assert_eq!(parse_setting_value("\"x\"".to_string()), json!("x"));
        assert_eq!(parse_setting_value("dark mode".to_string()), json!("dark mode"));
    }
}
