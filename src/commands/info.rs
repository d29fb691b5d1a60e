use anyhow::Result;

use crate::about::{self, package_info};

/// Package identity as aligned text or JSON.
pub(crate) fn render_info(json: bool) -> Result<String> {
    let info = package_info();
    if json {
        return Ok(serde_json::to_string_pretty(&info)?);
    }

    let rows = [
        ("Title", info.title),
        ("Description", info.description),
        ("Version", info.version),
        ("Revision", about::GIT_REVISION),
        ("Author", info.author),
        ("Email", info.author_email),
        ("License", info.license),
        ("URL", info.url),
        ("Download", info.download_url),
    ];
    Ok(rows
        .iter()
        .map(|(label, value)| format!("{:<12} {}", label, value))
        .collect::<Vec<_>>()
        .join("\n"))
}

#[tracing::instrument]
pub fn info(json: bool) -> Result<()> {
    println!("{}", render_info(json)?);
    Ok(())
}
