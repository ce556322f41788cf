use std::path::Path;

use crate::cli::signed_in;
use crate::error::Result;
use crate::importer::import_file;

pub fn run(file: &str) -> Result<()> {
    let ctx = signed_in()?;
    let result = import_file(&ctx.conn, Path::new(file))?;
    println!("Imported {} transaction(s) from {file}", result.imported);
    if result.skipped > 0 {
        println!("Skipped {} duplicate row(s)", result.skipped);
    }
    Ok(())
}
