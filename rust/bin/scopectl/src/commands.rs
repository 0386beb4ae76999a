use std::path::Path;

use scope::model::{Choice, Level};
use scope::store::{Directory, KvDirectory, MemoryDirectory, load_data_dir};
use scope::{ScopeConfig, ScopeService};
use tracing::info;

/// Build the service over whichever directory the config points at.
fn open_service(config: &ScopeConfig) -> anyhow::Result<ScopeService<Box<dyn Directory>>> {
    let directory: Box<dyn Directory> = match (&config.data_dir, &config.db_path) {
        (Some(data_dir), None) => {
            info!("Reading directory from {}", data_dir.display());
            Box::new(MemoryDirectory::from(load_data_dir(data_dir)?))
        }
        _ => {
            let db_path = config.resolve_db_path();
            info!("Opening directory {}", db_path.display());
            Box::new(
                KvDirectory::open(&db_path)
                    .map_err(|e| anyhow::anyhow!("failed to open directory: {}", e))?,
            )
        }
    };
    Ok(ScopeService::new(directory, config.clone()))
}

pub fn resolve(config: &ScopeConfig, actor: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let session = service.resolve_scope(actor)?;
    println!("{}", serde_json::to_string_pretty(&session.view())?);
    Ok(())
}

/// Selections are applied region → group, so each one sees the cascade of
/// the previous. Values the session refuses are left as resolved.
pub fn select(config: &ScopeConfig, actor: &str, values: [Option<String>; 4]) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let mut session = service.resolve_scope(actor)?;
    let levels = [Level::Region, Level::Area, Level::Church, Level::Group];
    for (level, value) in levels.into_iter().zip(values) {
        if let Some(value) = value {
            let wanted = Choice::from(value);
            session.set(level, wanted.clone());
            if *session.selection().choice(level) != wanted {
                eprintln!("{:?} selection '{}' was not applied", level, wanted);
            }
        }
    }
    println!("{}", serde_json::to_string_pretty(&session.view())?);
    Ok(())
}

pub fn can(config: &ScopeConfig, actor: &str, module: &str, action: &str) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let allowed = service.can(actor, module, action)?;
    println!("{}", if allowed { "allow" } else { "deny" });
    Ok(())
}

pub fn issues(config: &ScopeConfig) -> anyhow::Result<()> {
    let service = open_service(config)?;
    let issues = service.hierarchy()?.issues();
    if issues.is_empty() {
        println!("no issues");
    }
    for issue in issues {
        println!("{}", issue);
    }
    Ok(())
}

pub fn import(config: &ScopeConfig, source: &Path) -> anyhow::Result<()> {
    let snapshot = load_data_dir(source)?;
    let db_path = config.resolve_db_path();
    let directory = KvDirectory::open(&db_path)
        .map_err(|e| anyhow::anyhow!("failed to open directory: {}", e))?;
    let count = directory.import(&snapshot)?;
    println!("imported {} records into {}", count, db_path.display());
    Ok(())
}
