//! Styled terminal messages and tables.

use std::path::Path;

use bytesize::ByteSize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::encoding;
use crate::header::Header;
use crate::types::Processing;
use crate::vault::VaultRecord;

pub fn show_success(processing: Processing, path: &Path) {
    println!();
    println!("{} {}", style("✓").green(), style(format!("File {} successfully: {}", processing.done(), path.display())).bold());
}

/// Prints the share key as a link fragment. The share key is the only copy of
/// a raw container's key; nothing else records it.
pub fn show_share_key(share_key: &str) {
    println!("{} {}", style("!").yellow(), style("Share key (keep it secret, it cannot be recovered):").bold());
    println!("  {}", style(format!("#k={share_key}")).cyan());
}

pub fn show_vault_saved(path: &Path) {
    println!("{} {}", style("✓").green(), style(format!("Recorded in vault: {}", path.display())).bold());
}

pub fn show_partial_removed(path: &Path) {
    eprintln!("{} {}", style("✗").red(), style(format!("Removed partial output: {}", path.display())).dim());
}

pub fn format_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

pub fn header_table(header: &Header) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic).set_header(vec!["Field", "Value"]);

    table.add_row(vec!["Version".to_owned(), header.version.to_string()]);
    table.add_row(vec!["Name".to_owned(), header.name.clone()]);
    table.add_row(vec!["MIME".to_owned(), header.mime.clone()]);
    table.add_row(vec!["File size".to_owned(), format!("{} ({} bytes)", format_size(header.file_size), header.file_size)]);
    table.add_row(vec!["Chunk size".to_owned(), format_size(u64::from(header.chunk_size))]);
    table.add_row(vec!["Chunks".to_owned(), header.chunk_count().to_string()]);
    table.add_row(vec!["Key mode".to_owned(), header.key_mode.to_string()]);
    table.add_row(vec!["IV".to_owned(), header.iv_text()]);

    if let Some(kdf) = &header.kdf {
        table.add_row(vec!["KDF".to_owned(), format!("PBKDF2-HMAC-{} × {}", kdf.hash, kdf.iterations)]);
        table.add_row(vec!["Salt".to_owned(), encoding::encode(kdf.salt)]);
    }

    table.add_row(vec!["Created (ms)".to_owned(), header.created_at.to_string()]);
    table
}

pub fn show_header(header: &Header) {
    println!("{}", header_table(header));
}

pub fn vault_table(records: &[&VaultRecord]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_content_arrangement(ContentArrangement::Dynamic).set_header(vec!["Id", "Name", "Size", "Mode", "Container"]);

    for record in records {
        table.add_row(vec![record.id.clone(), record.name.clone(), format_size(record.original_size), record.key_mode.to_string(), record.container.display().to_string()]);
    }

    table
}

pub fn show_vault(records: &[&VaultRecord]) {
    if records.is_empty() {
        println!("{}", style("Vault is empty").yellow());
        return;
    }

    println!("{}", vault_table(records));
}
