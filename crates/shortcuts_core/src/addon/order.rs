//! `order.json` handling for add-on loading.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// File name of the order document inside the add-ons folder.
pub const ORDER_FILE_NAME: &str = "order.json";
/// Package prefix of discovered add-on modules.
pub const ADDONS_PACKAGE: &str = "addons";

/// Error reading or writing the add-ons folder.
#[derive(Debug)]
pub enum AddonError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for AddonError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "add-on folder i/o failed: {err}"),
            Self::Json(err) => write!(f, "add-on order file is invalid: {err}"),
        }
    }
}

impl Error for AddonError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for AddonError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AddonError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Priority lists declared in `order.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonOrder {
    #[serde(rename = "_comment", default)]
    pub comment: Vec<String>,
    pub high_priority: Vec<String>,
    pub medium_priority: Vec<String>,
    pub low_priority: Vec<String>,
}

impl Default for AddonOrder {
    fn default() -> Self {
        Self {
            comment: vec![
                "High priority addons. These addons will be loaded first.".to_string(),
                "Those addons which not specified will be considered as 'medium_priority' and will be loaded after loading high_priority addons.".to_string(),
                "Low priority addons. These addons will be loaded after loading all the addons.".to_string(),
                "Names are case insensitive.".to_string(),
            ],
            high_priority: vec![
                "shortcuts".to_string(),
                "notes".to_string(),
                "youtube_downloader".to_string(),
            ],
            medium_priority: Vec::new(),
            low_priority: vec!["settings".to_string()],
        }
    }
}

/// Reads `order.json` from `addons_dir`, writing the default when absent.
///
/// Returns `Ok(None)` when the file exists but cannot be parsed; callers keep
/// discovery order in that case.
pub fn load_or_create_order(addons_dir: &Path) -> Result<Option<AddonOrder>, AddonError> {
    let path = addons_dir.join(ORDER_FILE_NAME);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            let order = AddonOrder::default();
            fs::write(&path, serde_json::to_string_pretty(&order)?)?;
            info!(
                "event=addon_order_create module=addon status=ok path={}",
                path.display()
            );
            return Ok(Some(order));
        }
        Err(err) => return Err(err.into()),
    };

    match serde_json::from_str::<AddonOrder>(&text) {
        Ok(order) => Ok(Some(order)),
        Err(err) => {
            warn!(
                "event=addon_order_load module=addon status=error error_code=invalid_order error={}",
                err
            );
            Ok(None)
        }
    }
}

/// Sorts discovered module names by the priorities in `order`.
///
/// Each module is placed once; names listed in several priorities take the
/// first (highest) one.
pub fn apply_order(modules: &[String], order: &AddonOrder) -> Vec<String> {
    let mut by_short_name: HashMap<String, usize> = HashMap::with_capacity(modules.len());
    for (index, module) in modules.iter().enumerate() {
        by_short_name.entry(short_name(module)).or_insert(index);
    }

    let mut taken = vec![false; modules.len()];
    let mut take_listed = |names: &[String]| -> Vec<String> {
        let mut picked = Vec::new();
        for name in names {
            if let Some(&index) = by_short_name.get(&name.to_lowercase()) {
                if !taken[index] {
                    taken[index] = true;
                    picked.push(modules[index].clone());
                }
            }
        }
        picked
    };

    let high = take_listed(order.high_priority.as_slice());
    let medium = take_listed(order.medium_priority.as_slice());
    let low = take_listed(order.low_priority.as_slice());

    let rest = modules
        .iter()
        .zip(&taken)
        .filter(|(_, taken)| !**taken)
        .map(|(module, _)| module.clone());

    high.into_iter()
        .chain(medium)
        .chain(rest)
        .chain(low)
        .collect()
}

/// Lists `addons.<name>.<name>` modules for sub-directories of `addons_dir`
/// that contain `<name>.<extension>`, sorted by directory name.
pub fn discover_addons(addons_dir: &Path, extension: &str) -> Result<Vec<String>, AddonError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(addons_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.path().join(format!("{name}.{extension}")).is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names
        .into_iter()
        .map(|name| format!("{ADDONS_PACKAGE}.{name}.{name}"))
        .collect())
}

/// Discovers add-ons and returns them in load order.
///
/// A missing add-ons folder loads nothing and creates no `order.json`.
pub fn resolve_load_order(addons_dir: &Path, extension: &str) -> Result<Vec<String>, AddonError> {
    if !addons_dir.is_dir() {
        info!(
            "event=addon_order module=addon status=skipped reason=missing_folder path={}",
            addons_dir.display()
        );
        return Ok(Vec::new());
    }
    let modules = discover_addons(addons_dir, extension)?;
    let ordered = match load_or_create_order(addons_dir)? {
        Some(order) => apply_order(&modules, &order),
        None => modules,
    };
    info!(
        "event=addon_order module=addon status=ok count={}",
        ordered.len()
    );
    Ok(ordered)
}

fn short_name(module: &str) -> String {
    module
        .rsplit('.')
        .next()
        .unwrap_or(module)
        .to_lowercase()
}
