//! Info command - Report connection state without connecting

use crate::config::ConfigLoader;
use crate::session::Session;
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load_valid(config_path)?;
    let session = Session::open(&config)?;

    let info = session.connection_info().await;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
