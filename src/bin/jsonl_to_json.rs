use std::path::Path;

use anyhow::{Result, anyhow};

use flashscore_sync::audit;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(src), Some(dst)) = (args.next(), args.next()) else {
        return Err(anyhow!("usage: jsonl_to_json <src.jsonl> <dst.json>"));
    };

    let rows = audit::read_jsonl(Path::new(&src))?;
    audit::write_json_array(Path::new(&dst), &rows)?;
    println!("wrote {} rows -> {dst}", rows.len());

    Ok(())
}
