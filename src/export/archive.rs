//! GL-014: Single-situation zip archive with `situation.json` and `glosses.jsonl`.

use super::payload::SituationExport;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Write the archive into any seekable writer.
pub fn write_situation_archive<W: Write + Seek>(export: &SituationExport, writer: W) -> Result<W, String> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(writer);
    for (name, content) in [
        ("situation.json", export.situation_json()?),
        ("glosses.jsonl", export.glosses_jsonl()?),
    ] {
        zip.start_file(name, options)
            .map_err(|e| format!("zip error on {}: {}", name, e))?;
        zip.write_all(content.as_bytes())
            .map_err(|e| format!("zip write error on {}: {}", name, e))?;
    }
    zip.finish().map_err(|e| format!("zip finish error: {}", e))
}

/// Build the archive in memory.
pub fn situation_archive_bytes(export: &SituationExport) -> Result<Vec<u8>, String> {
    write_situation_archive(export, Cursor::new(Vec::new())).map(Cursor::into_inner)
}

/// Write the archive to a file.
pub fn save_situation_archive(export: &SituationExport, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| format!("cannot create {}: {}", parent.display(), e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| format!("cannot create {}: {}", path.display(), e))?;
    write_situation_archive(export, file)?;
    Ok(())
}
