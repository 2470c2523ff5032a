use anyhow::Result;
use respaldo_console::cli::{actions, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Parse the command line and configure logging
    let (action, globals) = start()?;

    // Handle the action
    actions::console::handle(action, &globals).await?;

    Ok(())
}
