use anyhow::Result;

pub fn execute() -> Result<()> {
    println!("livegrab version {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
