use jarsmith_core::archive::{EntryInfo, JarContents};
use std::path::Path;
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Method")]
    method: &'static str,
    #[tabled(rename = "Size")]
    size: u32,
    #[tabled(rename = "Packed")]
    packed: u32,
    #[tabled(rename = "CRC-32")]
    crc32: String,
}

impl From<&EntryInfo> for EntryRow {
    fn from(entry: &EntryInfo) -> Self {
        Self {
            name: entry.name.clone(),
            method: entry.method_name(),
            size: entry.size,
            packed: entry.compressed_size,
            crc32: format!("{:08x}", entry.crc32),
        }
    }
}

pub fn run(jar: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let contents = JarContents::open(jar)?;
    let rows: Vec<EntryRow> = contents.entries().iter().map(EntryRow::from).collect();
    println!("{}", Table::new(&rows).with(Style::psql()));

    match contents.manifest()? {
        Some(manifest) => {
            println!();
            for (name, value) in manifest.iter() {
                println!("{}: {}", name, value);
            }
        }
        None => println!("\n(no manifest)"),
    }
    Ok(())
}
